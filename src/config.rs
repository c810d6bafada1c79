//! Process configuration from the environment (and `.env`, when present).

use std::sync::Arc;

use crate::{
    error::StoreError,
    service::SenderPolicy,
    store::{MemoryMessageStore, MessageStore, SqliteMessageStore},
};

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://pairchat.db?mode=rwc";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 16;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Where messages live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Database {
    Memory,
    Sqlite { url: String },
}

impl Database {
    fn parse(url: &str) -> Self {
        if url.eq_ignore_ascii_case("memory") {
            Self::Memory
        } else {
            Self::Sqlite {
                url: url.to_owned(),
            }
        }
    }

    /// Build the store this process will hand to the chat service.
    pub async fn open(&self, max_connections: u32) -> Result<Arc<dyn MessageStore>, StoreError> {
        let store: Arc<dyn MessageStore> = match self {
            Self::Memory => Arc::new(MemoryMessageStore::new()),
            Self::Sqlite { url } => Arc::new(SqliteMessageStore::connect(url, max_connections).await?),
        };
        Ok(store)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub database: Database,
    pub max_connections: u32,
    pub sender_policy: SenderPolicy,
    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let max_connections = get(
            "PAIRCHAT_MAX_CONNECTIONS",
            &DEFAULT_MAX_CONNECTIONS.to_string(),
        );
        let max_connections = match max_connections.parse::<u32>() {
            Ok(0) => {
                return Err(invalid(
                    "PAIRCHAT_MAX_CONNECTIONS",
                    max_connections,
                    "must be at least 1",
                ));
            }
            Ok(n) => n,
            Err(e) => return Err(invalid("PAIRCHAT_MAX_CONNECTIONS", max_connections, e)),
        };

        let sender_policy = get("PAIRCHAT_SENDER_POLICY", "participant");
        let sender_policy = sender_policy
            .parse::<SenderPolicy>()
            .map_err(|e| invalid("PAIRCHAT_SENDER_POLICY", sender_policy.clone(), e))?;

        let log_json = get("PAIRCHAT_LOG_JSON", "false");
        let log_json = match log_json.to_ascii_lowercase().as_str() {
            "true" | "1" => true,
            "false" | "0" | "" => false,
            _ => return Err(invalid("PAIRCHAT_LOG_JSON", log_json, "expected true or false")),
        };

        Ok(Self {
            bind: get("PAIRCHAT_BIND", DEFAULT_BIND),
            database: Database::parse(&get("DATABASE_URL", DEFAULT_DATABASE_URL)),
            max_connections,
            sender_policy,
            log_level: get("PAIRCHAT_LOG", "info"),
            log_json,
        })
    }
}

fn invalid(key: &'static str, value: String, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value,
        reason: reason.to_string(),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(
            config.database,
            Database::Sqlite {
                url: DEFAULT_DATABASE_URL.into()
            }
        );
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.sender_policy, SenderPolicy::Participant);
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("PAIRCHAT_BIND", "127.0.0.1:9000"),
            ("DATABASE_URL", "MEMORY"),
            ("PAIRCHAT_MAX_CONNECTIONS", "4"),
            ("PAIRCHAT_SENDER_POLICY", "any"),
            ("PAIRCHAT_LOG_JSON", "TRUE"),
        ])
        .unwrap();
        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.database, Database::Memory);
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.sender_policy, SenderPolicy::Any);
        assert!(config.log_json);
    }

    #[test]
    fn bad_values_name_their_key() {
        for (key, value) in [
            ("PAIRCHAT_MAX_CONNECTIONS", "lots"),
            ("PAIRCHAT_MAX_CONNECTIONS", "0"),
            ("PAIRCHAT_SENDER_POLICY", "nobody"),
            ("PAIRCHAT_LOG_JSON", "maybe"),
        ] {
            let err = config(&[(key, value)]).unwrap_err();
            assert!(err.to_string().contains(key), "{err}");
        }
    }

    #[tokio::test]
    async fn memory_database_opens_without_io() {
        let store = Database::Memory.open(1).await.unwrap();
        let room = crate::identity::canonicalize("a:b").unwrap();
        store.append(&room, "a", "hi").await.unwrap();
    }
}
