use thiserror::Error;

#[derive(Error, Debug)]
pub enum FruitBotError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("TELEGRAM_BOT_TOKEN is not set")]
    MissingBotToken,

    #[error("no fruit named \"{0}\" in the catalog")]
    UnknownFruit(String),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FruitBotError>;
