use chrono::{DateTime, SecondsFormat, Utc};

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Renders a stored millisecond timestamp the way the web client expects dates.
pub fn to_rfc3339(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter for timestamp fields: written as a BSON Date, read back from
/// a BSON Date, a number of milliseconds or an RFC 3339 string.
pub mod bson_millis {
    use mongodb::bson::{Bson, DateTime as BsonDateTime};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(millis: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        BsonDateTime::from_millis(*millis).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let value = Bson::deserialize(deserializer)?;
        from_bson(&value).ok_or_else(|| D::Error::custom(format!("expected a date, found {}", value)))
    }

    pub(super) fn from_bson(value: &Bson) -> Option<i64> {
        match value {
            Bson::DateTime(date) => Some(date.timestamp_millis()),
            Bson::Int64(n) => Some(*n),
            Bson::Int32(n) => Some(i64::from(*n)),
            Bson::Double(n) if n.is_finite() => Some(*n as i64),
            Bson::String(s) => chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|date| date.timestamp_millis()),
            _ => None,
        }
    }

    /// Same as the parent module for optional fields; `null` reads as `None`.
    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(millis: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
            match millis {
                Some(millis) => serializer.serialize_some(&BsonDateTime::from_millis(*millis)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
            match Option::<Bson>::deserialize(deserializer)? {
                None | Some(Bson::Null) => Ok(None),
                Some(value) => from_bson(&value)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("expected a date, found {}", value))),
            }
        }
    }
}
