use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{ProfileDetails, User, BOT_EMAIL_SUFFIX};

/// Plaintext password shared by every demo account
pub const BOT_PASSWORD: &str = "password123";
pub const BOT_COUNT: usize = 100;
const PHOTOS_PER_BOT: usize = 6;

const FIRST_NAMES: &[&str] = &[
    "Selin", "Elif", "Ayşe", "Fatma", "Zeynep", "Melis", "Deniz", "Ece", "Gizem", "Pelin", "Damla",
    "Gamze", "Buse", "Ceren", "Derya", "Ezgi", "İrem", "Kübra", "Merve", "Nazlı", "Özge", "Pınar",
    "Seda", "Sinem", "Tuğba", "Yağmur", "Leyla", "Bahar", "Aslı", "Didem", "Esra", "Funda", "Gözde",
    "Hande", "Işıl", "Jale", "Lale", "Mine", "Nihan", "Oya", "Sibel", "Yelda", "Zehra",
];

const LAST_NAMES: &[&str] = &[
    "Yılmaz", "Kaya", "Demir", "Çelik", "Şahin", "Öztürk", "Aydın", "Özdemir", "Arslan", "Doğan",
    "Kılıç", "Aslan", "Çetin", "Kara", "Koç", "Kurt", "Özkan", "Şimşek", "Polat", "Erdoğan",
    "Yıldız", "Yalçın",
];

const HOBBIES: &[&str] = &[
    "Müzik", "Seyahat", "Spor", "Sanat", "Dans", "Yemek", "Kitap", "Fotoğraf", "Doğa", "Moda",
    "Sinema", "Teknoloji",
];

const SMOKING: &[&str] = &["Sigara Kullanıyorum", "Sigara Kullanmıyorum", "Sosyal İçici"];

const RELATIONSHIP_GOALS: &[&str] = &[
    "Ciddi İlişki", "Sadece Eğlence", "Arkadaşlık", "Belirsiz", "Uzun Dönem",
];

const BIO: &str = "Hayatı dolu dolu yaşayan, maceraperest bir ruh. ✈️📸 📍İstanbul";

const PHOTOS: &[&str] = &[
    "https://images.unsplash.com/photo-1529626455594-4ff0802cfb7e?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1494790108377-be9c29b29330?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1517841905240-472988babdf9?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1534528741775-53994a69daeb?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1524504388940-b1c1722653e1?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1506956191951-7a88da4435e5?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1524250502761-1ac6f2e30d43?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1531746020798-e6953c6e8e04?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1554151228-14d9def656ec?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1588953936179-d2a4734c5490?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1488426862026-3ee34a7d66df?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1517365830460-955ce3ccd263?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1464863979621-258859e62245?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1438761681033-6461ffad8d80?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1544005313-94ddf0286df2?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1500917293891-ef795e70e1f6?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1542596594-649edbc13630?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
    "https://images.unsplash.com/photo-1532074205216-d0e1f4b87368?ixlib=rb-1.2.1&auto=format&fit=crop&w=634&q=80",
];

fn pick<R: Rng>(rng: &mut R, list: &[&'static str]) -> &'static str {
    list.choose(rng).copied().unwrap_or_default()
}

/// Builds `count` verified demo accounts. Roughly one in five is a member.
/// Every bot shares `password_hash` so seeding hashes only once.
pub fn generate_bots(count: usize, password_hash: &str, now: i64) -> Vec<User> {
    let mut rng = rand::thread_rng();

    (0..count)
        .map(|_| {
            let first = pick(&mut rng, FIRST_NAMES);
            let last = pick(&mut rng, LAST_NAMES);
            let username = format!(
                "{}_{}_{}",
                first.to_lowercase(),
                last.to_lowercase(),
                rng.gen_range(0..100_000)
            );
            let email = format!("{}{}", username, BOT_EMAIL_SUFFIX);

            let photos: Vec<String> = PHOTOS
                .choose_multiple(&mut rng, PHOTOS_PER_BOT)
                .map(|p| p.to_string())
                .collect();
            let hobbies: Vec<String> = HOBBIES
                .choose_multiple(&mut rng, 2)
                .map(|h| h.to_string())
                .collect();

            let mut bot = User::new(
                &username,
                &email,
                password_hash.to_string(),
                &format!("{} {}", first, last),
                now,
            );
            bot.bio = BIO.to_string();
            bot.avatar = photos.first().cloned().unwrap_or_default();
            bot.photos = photos;
            bot.is_verified = true;
            bot.is_member = rng.gen_bool(0.2);
            bot.details = ProfileDetails {
                hobbies,
                smoking: pick(&mut rng, SMOKING).to_string(),
                relationship_goal: pick(&mut rng, RELATIONSHIP_GOALS).to_string(),
                gender: "Kadın".to_string(),
            };
            bot
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_bots_are_complete() {
        let bots = generate_bots(BOT_COUNT, "$2b$04$hash", 1);
        assert_eq!(bots.len(), BOT_COUNT);

        for bot in &bots {
            assert!(bot.is_bot());
            assert!(bot.is_verified);
            assert_eq!(bot.photos.len(), PHOTOS_PER_BOT);
            assert_eq!(bot.avatar, bot.photos[0]);
            assert_eq!(bot.details.hobbies.len(), 2);
            assert_ne!(bot.details.hobbies[0], bot.details.hobbies[1]);
            assert_eq!(bot.details.gender, "Kadın");
        }
    }
}
