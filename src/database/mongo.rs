use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, DateTime, Document};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use std::error::Error;

use super::{DiscoveryQuery, Store, StoreResult, UserFlag, UserList, UserUpdate};
use crate::models::{Application, Member, Message, Notification, User};

const USERS: &str = "users";
const MESSAGES: &str = "messages";
const NOTIFICATIONS: &str = "notifications";
const APPLICATIONS: &str = "applications";
const MEMBERS: &str = "members";

#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        // Fail fast so the server can fall back to memory instead of hanging
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        let collections = db.list_collection_names().await?;
        log::info!("[DB] Available collections: {:?}", collections);

        let store = Self { client, db };
        store.ensure_indexes().await?;

        Ok(store)
    }

    /// Creates the indexes the hot queries rely on
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        let users = self.db.collection::<Document>(USERS);
        for keys in [
            doc! { "username": 1 },
            doc! { "isVerified": 1 },
            doc! { "isMember": 1 },
            doc! { "location.city": 1 },
        ] {
            let label = format!("users({:?})", keys.keys().collect::<Vec<_>>());
            match users.create_index(IndexModel::builder().keys(keys).build()).await {
                Ok(_) => log::info!("   ✅ Index created: {}", label),
                Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
            }
        }

        let email_unique = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        match users.create_index(email_unique).await {
            Ok(_) => log::info!("   ✅ Index created: users(email) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let messages = self.db.collection::<Document>(MESSAGES);
        for keys in [doc! { "sender": 1, "receiver": 1 }, doc! { "createdAt": -1 }] {
            match messages.create_index(IndexModel::builder().keys(keys).build()).await {
                Ok(_) => log::info!("   ✅ Index created on messages"),
                Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
            }
        }

        let notifications = self.db.collection::<Document>(NOTIFICATIONS);
        let recipient_index = IndexModel::builder()
            .keys(doc! { "recipient": 1, "createdAt": -1 })
            .build();
        match notifications.create_index(recipient_index).await {
            Ok(_) => log::info!("   ✅ Index created: notifications(recipient, createdAt)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(USERS)
    }

    fn messages(&self) -> Collection<Message> {
        self.db.collection(MESSAGES)
    }

    fn notifications(&self) -> Collection<Notification> {
        self.db.collection(NOTIFICATIONS)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn with_inserted_id(inserted: mongodb::bson::Bson, id: &mut Option<ObjectId>) {
    if id.is_none() {
        *id = inserted.as_object_id();
    }
}

/// Builds the feed filter: visible users with photos, minus the exclusions.
pub fn discovery_filter(query: &DiscoveryQuery) -> Document {
    let mut filter = doc! {
        "isAnonymous": { "$ne": true },
        "username": { "$nin": query.exclude.clone() },
        "photos.0": { "$exists": true },
    };
    if !query.genders.is_empty() {
        filter.insert("details.gender", doc! { "$in": query.genders.clone() });
    }
    filter
}

/// Case-insensitive search on username or full name with the input taken literally.
pub fn search_filter(query: &str) -> Document {
    let pattern = regex_lite::escape(query);
    doc! {
        "$or": [
            { "username": { "$regex": pattern.clone(), "$options": "i" } },
            { "fullName": { "$regex": pattern.clone(), "$options": "i" } },
        ],
        "isVerified": true,
        "isAnonymous": { "$ne": true },
    }
}

/// `$set` body for a field-level user update. Empty when nothing is set.
pub fn update_document(update: &UserUpdate) -> StoreResult<Document> {
    let mut set = Document::new();
    let strings = [
        ("username", &update.username),
        ("password", &update.password),
        ("fullName", &update.full_name),
        ("bio", &update.bio),
        ("avatar", &update.avatar),
    ];
    for (field, value) in strings {
        if let Some(value) = value {
            set.insert(field, value.as_str());
        }
    }
    let flags = [
        ("isMember", update.is_member),
        ("isVerified", update.is_verified),
        ("isAnonymous", update.is_anonymous),
        ("notifications", update.notifications),
    ];
    for (field, value) in flags {
        if let Some(value) = value {
            set.insert(field, value);
        }
    }
    if let Some(millis) = update.last_username_change {
        set.insert("lastUsernameChange", DateTime::from_millis(millis));
    }
    if let Some(details) = &update.details {
        set.insert("details", to_bson(details)?);
    }
    if let Some(interested_in) = &update.interested_in {
        set.insert("interestedIn", interested_in.clone());
    }
    if let Some(location) = &update.location {
        set.insert("location", to_bson(location)?);
    }
    if let Some(photos) = &update.photos {
        set.insert("photos", photos.clone());
    }
    Ok(set)
}

#[async_trait]
impl Store for MongoStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client.database("admin").run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn insert_user(&self, mut user: User) -> StoreResult<User> {
        let result = self.users().insert_one(&user).await?;
        with_inserted_id(result.inserted_id, &mut user.id);
        Ok(user)
    }

    async fn find_user_by_id(&self, id: &ObjectId) -> StoreResult<Option<User>> {
        Ok(self.users().find_one(doc! { "_id": *id }).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.users().find_one(doc! { "username": username }).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.users().find_one(doc! { "email": email }).await?)
    }

    async fn find_user_by_login(&self, handle: &str) -> StoreResult<Option<User>> {
        let filter = doc! { "$or": [ { "email": handle }, { "username": handle } ] };
        Ok(self.users().find_one(filter).await?)
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        if let Some(id) = user.id {
            self.users().replace_one(doc! { "_id": id }, user).await?;
        }
        Ok(())
    }

    async fn update_user(&self, user_id: &ObjectId, update: &UserUpdate) -> StoreResult<Option<User>> {
        let set = update_document(update)?;
        if set.is_empty() {
            return self.find_user_by_id(user_id).await;
        }
        Ok(self
            .users()
            .find_one_and_update(doc! { "_id": *user_id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn add_to_list(&self, user_id: &ObjectId, list: UserList, value: &str) -> StoreResult<bool> {
        let operator = if list == UserList::Photos { "$push" } else { "$addToSet" };
        let mut entry = Document::new();
        entry.insert(list.field(), value);
        let mut update = Document::new();
        update.insert(operator, entry);

        let result = self.users().update_one(doc! { "_id": *user_id }, update).await?;
        Ok(result.modified_count > 0)
    }

    async fn remove_from_list(&self, user_id: &ObjectId, list: UserList, values: &[String]) -> StoreResult<bool> {
        let mut pull = Document::new();
        pull.insert(list.field(), doc! { "$in": values.to_vec() });
        let result = self
            .users()
            .update_one(doc! { "_id": *user_id }, doc! { "$pull": pull })
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let cursor = self.users().find(doc! {}).sort(doc! { "createdAt": -1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_users_by_usernames(&self, usernames: &[String]) -> StoreResult<Vec<User>> {
        let cursor = self.users().find(doc! { "username": { "$in": usernames.to_vec() } }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn search_users(&self, query: &str, limit: usize) -> StoreResult<Vec<User>> {
        let cursor = self.users().find(search_filter(query)).limit(limit as i64).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn member_users(&self, limit: usize) -> StoreResult<Vec<User>> {
        let cursor = self
            .users()
            .find(doc! { "isMember": true })
            .sort(doc! { "createdAt": -1 })
            .limit(limit as i64)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn users_who_liked(&self, username: &str) -> StoreResult<Vec<User>> {
        let cursor = self.users().find(doc! { "likedUsers": username }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn discovery_candidates(&self, query: &DiscoveryQuery) -> StoreResult<Vec<User>> {
        let cursor = self.users().find(discovery_filter(query)).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn add_like(&self, user_id: &ObjectId, target: &str) -> StoreResult<Option<User>> {
        let update = doc! {
            "$addToSet": { "likedUsers": target, "seenUsers": target }
        };
        Ok(self
            .users()
            .find_one_and_update(doc! { "_id": *user_id }, update)
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn set_flag(&self, usernames: &[String], flag: UserFlag, value: bool) -> StoreResult<u64> {
        let mut set = Document::new();
        set.insert(flag.field(), value);
        let result = self
            .users()
            .update_many(doc! { "username": { "$in": usernames.to_vec() } }, doc! { "$set": set })
            .await?;
        Ok(result.modified_count)
    }

    async fn delete_users(&self, usernames: &[String]) -> StoreResult<u64> {
        let result = self.users().delete_many(doc! { "username": { "$in": usernames.to_vec() } }).await?;
        Ok(result.deleted_count)
    }

    async fn delete_users_by_email_suffix(&self, suffix: &str) -> StoreResult<u64> {
        let pattern = format!("{}$", regex_lite::escape(suffix));
        let result = self.users().delete_many(doc! { "email": { "$regex": pattern } }).await?;
        Ok(result.deleted_count)
    }

    async fn reset_interactions(&self) -> StoreResult<u64> {
        let result = self
            .users()
            .update_many(doc! {}, doc! { "$set": { "seenUsers": [], "likedUsers": [] } })
            .await?;
        Ok(result.modified_count)
    }

    async fn count_users(&self, flag: Option<UserFlag>) -> StoreResult<u64> {
        let mut filter = Document::new();
        if let Some(flag) = flag {
            filter.insert(flag.field(), true);
        }
        Ok(self.users().count_documents(filter).await?)
    }

    async fn insert_messages(&self, mut messages: Vec<Message>) -> StoreResult<Vec<Message>> {
        if messages.is_empty() {
            return Ok(messages);
        }
        let result = self.messages().insert_many(&messages).await?;
        for (index, id) in result.inserted_ids {
            if let Some(message) = messages.get_mut(index) {
                with_inserted_id(id, &mut message.id);
            }
        }
        Ok(messages)
    }

    async fn find_message(&self, id: &ObjectId) -> StoreResult<Option<Message>> {
        Ok(self.messages().find_one(doc! { "_id": *id }).await?)
    }

    async fn delete_message(&self, id: &ObjectId) -> StoreResult<bool> {
        let result = self.messages().delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn messages_for(&self, username: &str) -> StoreResult<Vec<Message>> {
        let filter = doc! { "$or": [ { "sender": username }, { "receiver": username } ] };
        let cursor = self.messages().find(filter).sort(doc! { "createdAt": -1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn conversation(&self, a: &str, b: &str) -> StoreResult<Vec<Message>> {
        let filter = doc! {
            "$or": [
                { "sender": a, "receiver": b },
                { "sender": b, "receiver": a },
            ]
        };
        let cursor = self.messages().find(filter).sort(doc! { "createdAt": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_notifications(&self, mut notifications: Vec<Notification>) -> StoreResult<Vec<Notification>> {
        if notifications.is_empty() {
            return Ok(notifications);
        }
        let result = self.notifications().insert_many(&notifications).await?;
        for (index, id) in result.inserted_ids {
            if let Some(notification) = notifications.get_mut(index) {
                with_inserted_id(id, &mut notification.id);
            }
        }
        Ok(notifications)
    }

    async fn notifications_for(&self, recipient: &str, limit: usize) -> StoreResult<Vec<Notification>> {
        let cursor = self
            .notifications()
            .find(doc! { "recipient": recipient })
            .sort(doc! { "createdAt": -1 })
            .limit(limit as i64)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn all_notifications(&self) -> StoreResult<Vec<Notification>> {
        let cursor = self.notifications().find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn mark_notifications_read(&self, recipient: &str, id: Option<&ObjectId>) -> StoreResult<u64> {
        let mut filter = doc! { "recipient": recipient, "isRead": false };
        if let Some(id) = id {
            filter.insert("_id", *id);
        }
        let result = self
            .notifications()
            .update_many(filter, doc! { "$set": { "isRead": true } })
            .await?;
        Ok(result.modified_count)
    }

    async fn delete_notification(&self, recipient: &str, id: &ObjectId) -> StoreResult<bool> {
        let result = self
            .notifications()
            .delete_one(doc! { "_id": *id, "recipient": recipient })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_notifications_for(&self, recipient: &str) -> StoreResult<u64> {
        let result = self.notifications().delete_many(doc! { "recipient": recipient }).await?;
        Ok(result.deleted_count)
    }

    async fn insert_application(&self, mut application: Application) -> StoreResult<Application> {
        let result = self
            .db
            .collection::<Application>(APPLICATIONS)
            .insert_one(&application)
            .await?;
        with_inserted_id(result.inserted_id, &mut application.id);
        Ok(application)
    }

    async fn insert_member(&self, mut member: Member) -> StoreResult<Member> {
        let result = self.db.collection::<Member>(MEMBERS).insert_one(&member).await?;
        with_inserted_id(result.inserted_id, &mut member.id);
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_filter_shape() {
        let filter = discovery_filter(&DiscoveryQuery {
            exclude: vec!["me".into()],
            genders: vec![],
        });
        assert!(filter.contains_key("photos.0"));
        assert!(!filter.contains_key("details.gender"));

        let filter = discovery_filter(&DiscoveryQuery {
            exclude: vec![],
            genders: vec!["Kadın".into()],
        });
        assert!(filter.contains_key("details.gender"));
    }

    #[test]
    fn test_search_filter_escapes_input() {
        let filter = search_filter("a.b*");
        let or = filter.get_array("$or").unwrap();
        let first = or[0].as_document().unwrap().get_document("username").unwrap();
        assert_eq!(first.get_str("$regex").unwrap(), r"a\.b\*");
    }

    #[test]
    fn test_update_document_sets_only_given_fields() {
        assert!(update_document(&UserUpdate::default()).unwrap().is_empty());

        let set = update_document(&UserUpdate {
            username: Some("yeni".into()),
            last_username_change: Some(1_000),
            is_verified: Some(true),
            location: Some(crate::models::Location {
                city: "İzmir".into(),
                lat: None,
                lng: None,
            }),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(set.len(), 4);
        assert_eq!(set.get_str("username").unwrap(), "yeni");
        assert_eq!(set.get_datetime("lastUsernameChange").unwrap().timestamp_millis(), 1_000);
        assert!(set.get_bool("isVerified").unwrap());
        assert_eq!(set.get_document("location").unwrap().get_str("city").unwrap(), "İzmir");
        assert!(!set.contains_key("likedUsers"));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let store = MongoStore::connect(&uri, "the_vault_test").await;
        assert!(store.is_ok());
    }
}
