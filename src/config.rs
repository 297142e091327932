use std::{env, fmt::Display, str::FromStr};

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub mongo_uri: Option<String>,
    pub database_name: String,
    pub admin_username: String,
    pub admin_password: Option<String>,
    pub bcrypt_cost: u32,
    pub json_limit: usize,
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            mongo_uri: None,
            database_name: "the_vault".to_string(),
            admin_username: "admin".to_string(),
            admin_password: None,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            json_limit: 100 * 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mongo_uri = optional("MONGO_URI");
        let database_name = optional("MONGO_DATABASE")
            .or_else(|| mongo_uri.as_deref().and_then(database_from_uri))
            .unwrap_or(defaults.database_name);

        Self {
            host: optional("HOST").unwrap_or(defaults.host),
            port: try_load("PORT", defaults.port),
            mongo_uri,
            database_name,
            admin_username: optional("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_password: optional("ADMIN_PASSWORD"),
            bcrypt_cost: try_load("BCRYPT_COST", defaults.bcrypt_cost),
            json_limit: try_load("JSON_LIMIT_BYTES", defaults.json_limit),
            cors_origins: optional("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr + Display>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match optional(key) {
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            log::warn!("Invalid {} value '{}': {}, using default: {}", key, raw, e, default);
            default
        }),
        None => {
            log::debug!("{} not set, using default: {}", key, default);
            default
        }
    }
}

/// Extracts the database name from the path segment of a MongoDB URI.
pub fn database_from_uri(uri: &str) -> Option<String> {
    let without_scheme = uri.split("://").nth(1)?;
    let path = without_scheme.split_once('/')?.1;
    let name = path.split('?').next()?.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_from_uri() {
        assert_eq!(
            database_from_uri("mongodb+srv://u:p@cluster0.example.net/vault?retryWrites=true"),
            Some("vault".to_string())
        );
        assert_eq!(database_from_uri("mongodb://localhost:27017"), None);
        assert_eq!(database_from_uri("mongodb://localhost:27017/"), None);
        assert_eq!(database_from_uri("mongodb://localhost:27017/?w=majority"), None);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.admin_username, "admin");
        assert!(config.mongo_uri.is_none());
        assert_eq!(config.json_limit, 100 * 1024 * 1024);
    }
}
