use crate::error::{FruitBotError, Result};

/// What `update` should do when the fruit does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePolicy {
    /// Silently leave the catalog unchanged.
    #[default]
    Permissive,
    /// Report the missing name as an error.
    Strict,
}

impl UpdatePolicy {
    fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(UpdatePolicy::Permissive),
            "strict" => Ok(UpdatePolicy::Strict),
            other => Err(FruitBotError::Config(format!(
                "CATALOG_UPDATE_POLICY must be \"permissive\" or \"strict\", got \"{other}\""
            ))),
        }
    }
}

/// Process configuration, read once at startup and passed by reference
/// into the components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub admin_user_id: Option<i64>,
    pub db_path: String,
    pub update_policy: UpdatePolicy,
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// Only the bot token is mandatory; a missing Gemini key degrades
    /// classification to the absence signal instead of failing startup.
    pub fn from_env() -> Result<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(FruitBotError::MissingBotToken)?;

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let gemini_model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-pro".to_string());

        let admin_user_id = match std::env::var("ADMIN_USER_ID") {
            Ok(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                FruitBotError::Config(format!("ADMIN_USER_ID must be a numeric id, got \"{raw}\""))
            })?),
            Err(_) => None,
        };

        let db_path = std::env::var("FRUIT_DB_PATH").unwrap_or_else(|_| "fruits.db".to_string());

        let update_policy = match std::env::var("CATALOG_UPDATE_POLICY") {
            Ok(raw) => UpdatePolicy::parse(&raw)?,
            Err(_) => UpdatePolicy::default(),
        };

        Ok(Self {
            bot_token,
            gemini_api_key,
            gemini_model,
            admin_user_id,
            db_path,
            update_policy,
        })
    }

    /// True when `user_id` is the configured admin.
    ///
    /// With no admin configured every mutating command is refused.
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_user_id == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_policy_parse() {
        assert_eq!(
            UpdatePolicy::parse("permissive").unwrap(),
            UpdatePolicy::Permissive
        );
        assert_eq!(UpdatePolicy::parse("STRICT").unwrap(), UpdatePolicy::Strict);
        assert_eq!(
            UpdatePolicy::parse(" strict \n").unwrap(),
            UpdatePolicy::Strict
        );
        assert!(UpdatePolicy::parse("lenient").is_err());
    }

    #[test]
    fn test_is_admin() {
        let config = Config {
            bot_token: "token".into(),
            gemini_api_key: None,
            gemini_model: "gemini-2.5-pro".into(),
            admin_user_id: Some(42),
            db_path: "fruits.db".into(),
            update_policy: UpdatePolicy::Permissive,
        };
        assert!(config.is_admin(42));
        assert!(!config.is_admin(7));

        let no_admin = Config {
            admin_user_id: None,
            ..config
        };
        assert!(!no_admin.is_admin(42));
    }
}
