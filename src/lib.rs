//! fruitbot: Telegram bot that recognizes a fruit photo with Gemini and
//! looks the label up in a local price catalog.

pub mod bot;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod recognizer;
pub mod telegram;

pub use catalog::{CatalogItem, CatalogStore};
pub use config::{Config, UpdatePolicy};
pub use error::{FruitBotError, Result};
pub use matcher::{ExactMatch, MatchStrategy};
pub use pipeline::{ResolutionOutcome, Resolver};
pub use recognizer::{GeminiClient, Recognizer};
