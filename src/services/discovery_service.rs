//! Swipe feed ranking plus the like / pass / match flow.

use rand::seq::SliceRandom;
use serde::Serialize;

use crate::database::{DiscoveryQuery, Store, UserList};
use crate::models::{
    Location, Message, Notification, NotificationKind, ProfileCard, ProfileDetails, User,
    MATCH_GREETING, SYSTEM_SENDER,
};
use crate::utils::error::AppError;
use crate::utils::time::now_millis;

pub const FEED_LIMIT: usize = 50;
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Assumed distance when only the city names match
pub const SAME_CITY_KM: f64 = 20.0;
/// Assumed distance when nothing is known
pub const UNKNOWN_DISTANCE_KM: f64 = 100_000.0;

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub photo: String,
    pub username: String,
    pub avatar: String,
    pub is_member: bool,
    pub details: ProfileDetails,
    pub location: Location,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FeedResponse {
    pub success: bool,
    pub photos: Vec<FeedItem>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LikeResponse {
    pub success: bool,
    #[serde(rename = "match")]
    pub is_match: bool,
}

pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Distance used for ordering: coordinates first, then a same-city guess.
pub fn distance_km(viewer: Option<&Location>, candidate: &Location) -> f64 {
    let Some(viewer) = viewer else {
        return UNKNOWN_DISTANCE_KM;
    };

    if let (Some(a), Some(b)) = (viewer.coordinates(), candidate.coordinates()) {
        return haversine_km(a, b);
    }

    let city = viewer.normalized_city();
    if !city.is_empty() && candidate.normalized_city() == city {
        SAME_CITY_KM
    } else {
        UNKNOWN_DISTANCE_KM
    }
}

/// Featured users first, then nearest first. The sort is stable, so ties
/// keep store order.
pub fn rank(candidates: Vec<User>, viewer: Option<&User>) -> Vec<User> {
    let origin = viewer.map(|v| &v.location);
    let mut scored: Vec<(bool, f64, User)> = candidates
        .into_iter()
        .map(|user| (user.is_featured(), distance_km(origin, &user.location), user))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.total_cmp(&b.1)));
    scored.into_iter().map(|(_, _, user)| user).collect()
}

pub fn discovery_query(viewer: Option<&User>) -> DiscoveryQuery {
    match viewer {
        Some(me) => {
            let mut exclude = me.seen_users.clone();
            exclude.extend(me.blocked_users.iter().cloned());
            exclude.push(me.username.clone());
            DiscoveryQuery {
                exclude,
                genders: me.interested_in.clone(),
            }
        }
        None => DiscoveryQuery::default(),
    }
}

fn feed_items(ranked: Vec<User>) -> Vec<FeedItem> {
    let mut rng = rand::thread_rng();
    ranked
        .into_iter()
        .filter_map(|user| {
            let photo = user.photos.choose(&mut rng)?.clone();
            Some(FeedItem {
                photo,
                username: user.username,
                avatar: user.avatar,
                is_member: user.is_member,
                details: user.details,
                location: user.location,
            })
        })
        .take(FEED_LIMIT)
        .collect()
}

pub async fn build_feed(store: &dyn Store, viewer: Option<&User>) -> Result<Vec<FeedItem>, AppError> {
    let query = discovery_query(viewer);
    log::debug!(
        "🔎 Feed for {}: excluding {} users",
        viewer.map(|v| v.username.as_str()).unwrap_or("anonymous"),
        query.exclude.len()
    );

    let candidates = store.discovery_candidates(&query).await?;
    Ok(feed_items(rank(candidates, viewer)))
}

fn match_notification(recipient: &str, partner: &str, now: i64) -> Notification {
    Notification::new(
        recipient,
        NotificationKind::Match,
        MATCH_GREETING,
        format!("You matched with @{}!", partner),
        partner,
        now,
    )
    .with_chat_user(partner)
}

/// Stores the match announcement once per pair.
async fn record_match(store: &dyn Store, me: &str, other: &str) -> Result<(), AppError> {
    let history = store.conversation(me, other).await?;
    if history.iter().any(|m| m.text == MATCH_GREETING) {
        return Ok(());
    }

    let now = now_millis();
    store
        .insert_messages(vec![
            Message::new(SYSTEM_SENDER, me, &format!("You matched with @{}!", other), now),
            Message::new(SYSTEM_SENDER, other, &format!("You matched with @{}!", me), now),
            Message::new(me, other, MATCH_GREETING, now),
        ])
        .await?;
    store
        .insert_notifications(vec![
            match_notification(me, other, now),
            match_notification(other, me, now),
        ])
        .await?;

    log::info!("💘 Match: {} <-> {}", me, other);
    Ok(())
}

pub async fn like(store: &dyn Store, me: &User, target_username: &str) -> Result<bool, AppError> {
    if me.username == target_username {
        return Err(AppError::InvalidRequest("Cannot like self".to_string()));
    }

    let target = store
        .find_user_by_username(target_username)
        .await?
        .ok_or_else(|| AppError::NotFound("Target user not found".to_string()))?;

    let me_id = me.id.ok_or_else(AppError::user_not_found)?;
    let me = store
        .add_like(&me_id, &target.username)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    let mut is_match = target.has_liked(&me.username);
    if target.is_bot() && !is_match {
        let bot_id = target.id.ok_or_else(AppError::user_not_found)?;
        store.add_to_list(&bot_id, UserList::Liked, &me.username).await?;
        log::info!("🤖 Bot {} liked back {}", target.username, me.username);
        is_match = true;
    }

    if is_match {
        record_match(store, &me.username, &target.username).await?;
    }

    Ok(is_match)
}

pub async fn pass(store: &dyn Store, me: &User, target_username: &str) -> Result<(), AppError> {
    let id = me.id.ok_or_else(AppError::user_not_found)?;
    store.add_to_list(&id, UserList::Seen, target_username).await?;
    Ok(())
}

pub async fn unlike(store: &dyn Store, me: &User, target_username: &str) -> Result<(), AppError> {
    let id = me.id.ok_or_else(AppError::user_not_found)?;
    store
        .remove_from_list(&id, UserList::Liked, &[target_username.to_string()])
        .await?;
    Ok(())
}

/// Forgets passed users so they show up again. Liked and blocked users stay
/// hidden. Returns how many entries remain.
pub async fn reset_seen(store: &dyn Store, me: &User) -> Result<usize, AppError> {
    let id = me.id.ok_or_else(AppError::user_not_found)?;
    let current = store.find_user_by_id(&id).await?.ok_or_else(AppError::user_not_found)?;
    let passed: Vec<String> = current
        .seen_users
        .iter()
        .filter(|u| !current.has_liked(u) && !current.has_blocked(u))
        .cloned()
        .collect();

    if !passed.is_empty() {
        store.remove_from_list(&id, UserList::Seen, &passed).await?;
    }
    let remaining = current.seen_users.len() - passed.len();
    log::info!("🔄 Discovery reset for {}: {} -> {} seen", me.username, current.seen_users.len(), remaining);
    Ok(remaining)
}

pub async fn my_likes(store: &dyn Store, me: &User) -> Result<Vec<ProfileCard>, AppError> {
    let users = store.find_users_by_usernames(&me.liked_users).await?;
    Ok(users.iter().map(ProfileCard::from).collect())
}

pub async fn liked_me(store: &dyn Store, me: &User) -> Result<Vec<ProfileCard>, AppError> {
    let users = store.users_who_liked(&me.username).await?;
    Ok(users.iter().map(ProfileCard::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::services::testing;

    fn located(city: &str, coords: Option<(f64, f64)>) -> Location {
        Location {
            city: city.to_string(),
            lat: coords.map(|c| c.0),
            lng: coords.map(|c| c.1),
        }
    }

    async fn candidate(store: &MemoryStore, username: &str, location: Location, member: bool) -> User {
        let mut user = testing::user(store, username).await;
        user.photos = vec![format!("{}.jpg", username)];
        user.location = location;
        user.is_member = member;
        store.save_user(&user).await.unwrap();
        user
    }

    #[test]
    fn test_haversine_istanbul_ankara() {
        let istanbul = (41.0082, 28.9784);
        let ankara = (39.9334, 32.8597);
        let d = haversine_km(istanbul, ankara);
        assert!((d - 350.0).abs() < 5.0, "got {}", d);
        assert_eq!(haversine_km(istanbul, istanbul), 0.0);
    }

    #[test]
    fn test_distance_fallbacks() {
        let me = located(" Izmir ", None);
        assert_eq!(distance_km(Some(&me), &located("izmir", Some((38.4, 27.1)))), SAME_CITY_KM);
        assert_eq!(distance_km(Some(&me), &located("Bursa", None)), UNKNOWN_DISTANCE_KM);
        assert_eq!(distance_km(None, &located("izmir", None)), UNKNOWN_DISTANCE_KM);

        let blank = located("", None);
        assert_eq!(distance_km(Some(&blank), &located("", None)), UNKNOWN_DISTANCE_KM);
    }

    #[tokio::test]
    async fn test_feed_excludes_and_orders() {
        let store = MemoryStore::new();
        let mut me = testing::user(&store, "ben").await;
        me.photos = vec!["ben.jpg".into()];
        me.location = located("Istanbul", Some((41.0, 29.0)));
        me.seen_users = vec!["gorulen".into()];
        me.blocked_users = vec!["engelli".into()];
        store.save_user(&me).await.unwrap();

        candidate(&store, "uzak", located("Van", Some((38.5, 43.4))), false).await;
        candidate(&store, "yakin", located("Istanbul", Some((41.01, 29.01))), false).await;
        candidate(&store, "vip_uzak", located("Van", Some((38.5, 43.4))), true).await;
        candidate(&store, "gorulen", Location::default(), false).await;
        candidate(&store, "engelli", Location::default(), false).await;
        let mut hidden = candidate(&store, "gizli", Location::default(), true).await;
        hidden.is_anonymous = true;
        store.save_user(&hidden).await.unwrap();
        testing::user(&store, "fotosuz").await;

        let feed = build_feed(&store, Some(&me)).await.unwrap();
        let names: Vec<_> = feed.iter().map(|f| f.username.as_str()).collect();
        assert_eq!(names, vec!["vip_uzak", "yakin", "uzak"]);
        assert_eq!(feed[1].photo, "yakin.jpg");
    }

    #[tokio::test]
    async fn test_feed_gender_filter_and_limit() {
        let store = MemoryStore::new();
        let mut me = testing::user(&store, "ben").await;
        me.interested_in = vec!["Kadın".into()];
        store.save_user(&me).await.unwrap();

        for i in 0..60 {
            let mut user = candidate(&store, &format!("k{}", i), Location::default(), false).await;
            user.details.gender = "Kadın".into();
            store.save_user(&user).await.unwrap();
        }
        let mut man = candidate(&store, "erkek", Location::default(), false).await;
        man.details.gender = "Erkek".into();
        store.save_user(&man).await.unwrap();

        let feed = build_feed(&store, Some(&me)).await.unwrap();
        assert_eq!(feed.len(), FEED_LIMIT);
        assert!(feed.iter().all(|f| f.username != "erkek"));
    }

    #[tokio::test]
    async fn test_mutual_like_matches_once() {
        let store = MemoryStore::new();
        let a = testing::user(&store, "ayse").await;
        let b = testing::user(&store, "berk").await;

        assert!(!like(&store, &a, "berk").await.unwrap());
        assert!(like(&store, &b, "ayse").await.unwrap());
        // liking again must not duplicate the announcement
        assert!(like(&store, &b, "ayse").await.unwrap());

        let history = store.conversation("ayse", "berk").await.unwrap();
        let greetings = history.iter().filter(|m| m.text == MATCH_GREETING).count();
        assert_eq!(greetings, 1);
        assert_eq!(history[0].sender, "berk");

        let system = store.messages_for("ayse").await.unwrap();
        assert!(system.iter().any(|m| m.sender == SYSTEM_SENDER && m.text == "You matched with @berk!"));

        let notes = store.notifications_for("ayse", 50).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Match);

        let stored = testing::reload(&store, "berk").await;
        assert_eq!(stored.liked_users, vec!["ayse".to_string()]);
        assert_eq!(stored.seen_users, vec!["ayse".to_string()]);
    }

    #[tokio::test]
    async fn test_bot_likes_back() {
        let store = MemoryStore::new();
        let me = testing::user(&store, "insan").await;
        let bot = User::new("bot_1", "bot_1@bot.com", "x".into(), "Bot", 0);
        store.insert_user(bot).await.unwrap();

        assert!(like(&store, &me, "bot_1").await.unwrap());
        assert_eq!(testing::reload(&store, "bot_1").await.liked_users, vec!["insan".to_string()]);
        assert!(matches!(like(&store, &me, "kimse").await, Err(AppError::NotFound(_))));
        assert!(matches!(like(&store, &me, "insan").await, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_pass_with_old_snapshot_keeps_recent_like() {
        let store = MemoryStore::new();
        let snapshot = testing::user(&store, "a").await;
        testing::user(&store, "c").await;

        like(&store, &snapshot, "c").await.unwrap();
        pass(&store, &snapshot, "z").await.unwrap();
        reset_seen(&store, &snapshot).await.unwrap();

        let a = testing::reload(&store, "a").await;
        assert_eq!(a.liked_users, vec!["c".to_string()]);
        assert_eq!(a.seen_users, vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn test_pass_unlike_and_reset() {
        let store = MemoryStore::new();
        let me = testing::user(&store, "ben").await;
        testing::user(&store, "sevilen").await;

        like(&store, &me, "sevilen").await.unwrap();
        pass(&store, &testing::reload(&store, "ben").await, "gecilen").await.unwrap();

        let mut me = testing::reload(&store, "ben").await;
        me.blocked_users = vec!["engel".into()];
        me.seen_users.push("engel".into());
        store.save_user(&me).await.unwrap();

        let remaining = reset_seen(&store, &me).await.unwrap();
        assert_eq!(remaining, 2);
        let me = testing::reload(&store, "ben").await;
        assert_eq!(me.seen_users, vec!["sevilen".to_string(), "engel".to_string()]);

        assert_eq!(my_likes(&store, &me).await.unwrap().len(), 1);
        let likers = liked_me(&store, &testing::reload(&store, "sevilen").await).await.unwrap();
        assert_eq!(likers[0].username, "ben");

        unlike(&store, &me, "sevilen").await.unwrap();
        assert!(testing::reload(&store, "ben").await.liked_users.is_empty());
    }
}
