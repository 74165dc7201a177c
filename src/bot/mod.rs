//! Chat adapter: long-poll loop, photo handler, admin commands.

mod commands;
pub mod replies;

pub use commands::Command;

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::error::{FruitBotError, Result};
use crate::pipeline::Resolver;
use crate::telegram::{Message, TelegramClient, Update};

// Pause after a failed poll so a Telegram outage does not spin the loop.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct FruitBot {
    telegram: Arc<TelegramClient>,
    resolver: Arc<Resolver>,
    catalog: CatalogStore,
    config: Arc<Config>,
}

impl FruitBot {
    pub fn new(
        telegram: TelegramClient,
        resolver: Resolver,
        catalog: CatalogStore,
        config: Arc<Config>,
    ) -> Self {
        Self {
            telegram: Arc::new(telegram),
            resolver: Arc::new(resolver),
            catalog,
            config,
        }
    }

    /// Poll for updates forever, handling each one in its own task so a
    /// slow recognition call cannot stall delivery of other events.
    pub async fn run(&self) -> Result<()> {
        tracing::info!("bot is running, send a photo to try it");
        let mut offset = 0i64;

        loop {
            let updates = match self.telegram.get_updates(offset).await {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!("getUpdates failed: {e}");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                let bot = self.clone();
                tokio::spawn(async move {
                    bot.handle_update(update).await;
                });
            }
        }
    }

    async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };

        if message.largest_photo().is_some() {
            self.handle_photo(&message).await;
        } else if let Some(text) = message.text.as_deref() {
            if let Some(command) = Command::parse(text) {
                self.handle_command(&message, command).await;
            }
            // Plain chatter is ignored, photos and commands only.
        }
    }

    async fn handle_photo(&self, message: &Message) {
        let chat_id = message.chat.id;

        let status = match self.telegram.send_message(chat_id, replies::RECOGNIZING).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(chat_id, "could not send status message: {e}");
                return;
            }
        };

        let reply = match self.resolve_photo(message).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(chat_id, "photo resolution failed: {e}");
                replies::GENERIC_FAILURE.to_string()
            }
        };

        if let Err(e) = self
            .telegram
            .edit_message_text(chat_id, status.message_id, &reply)
            .await
        {
            tracing::warn!(chat_id, "could not edit status message: {e}");
        }
    }

    async fn resolve_photo(&self, message: &Message) -> Result<String> {
        // Checked by handle_update.
        let photo = match message.largest_photo() {
            Some(photo) => photo,
            None => return Ok(replies::IMAGE_LOAD_FAILED.to_string()),
        };

        let image = match self.download_photo(&photo.file_id).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("image download failed: {e}");
                return Ok(replies::IMAGE_LOAD_FAILED.to_string());
            }
        };

        // Telegram recompresses uploaded photos to JPEG.
        let outcome = self.resolver.resolve(&image, "image/jpeg").await?;
        Ok(replies::outcome(&outcome))
    }

    async fn download_photo(&self, file_id: &str) -> Result<Vec<u8>> {
        let file = self.telegram.get_file(file_id).await?;
        let file_path = file
            .file_path
            .ok_or_else(|| FruitBotError::Telegram("getFile returned no file_path".into()))?;
        self.telegram.download_file(&file_path).await
    }

    async fn handle_command(&self, message: &Message, command: Command) {
        let chat_id = message.chat.id;
        let is_admin = message
            .from
            .as_ref()
            .is_some_and(|user| self.config.is_admin(user.id));

        if command.requires_admin() && !is_admin {
            let user_id = message.from.as_ref().map(|u| u.id);
            tracing::warn!(chat_id, ?user_id, "unauthorized admin command");
        }

        let Some(reply) = command_reply(&self.catalog, command, is_admin).await else {
            return;
        };

        if let Err(e) = self.telegram.send_message(chat_id, &reply).await {
            tracing::warn!(chat_id, "could not send reply: {e}");
        }
    }
}

/// Compute the reply text for a parsed command. `None` means no reply.
///
/// The admin gate runs here; rejected commands never reach the store.
async fn command_reply(
    catalog: &CatalogStore,
    command: Command,
    is_admin: bool,
) -> Option<String> {
    let reply = match command {
        Command::Start => replies::WELCOME.to_string(),
        Command::Help => replies::help(is_admin),
        Command::Invalid { usage } => replies::usage(usage),
        Command::Unknown => return None,

        _ if !is_admin => replies::FORBIDDEN.to_string(),

        Command::AddFruit {
            name,
            price,
            description,
        } => add_fruit(catalog, &name, &price, &description)
            .await
            .unwrap_or_else(command_failure),

        Command::UpdateFruit {
            name,
            price,
            description,
        } => update_fruit(catalog, &name, &price, &description)
            .await
            .unwrap_or_else(command_failure),

        Command::DeleteFruit { name } => delete_fruit(catalog, &name)
            .await
            .unwrap_or_else(command_failure),

        Command::ListFruits => list_fruits(catalog).await.unwrap_or_else(command_failure),
    };

    Some(reply)
}

async fn add_fruit(
    catalog: &CatalogStore,
    name: &str,
    price: &str,
    description: &str,
) -> Result<String> {
    if catalog.insert_if_absent(name, price, description).await? {
        tracing::info!(name, "fruit added");
        Ok(replies::added(name))
    } else {
        Ok(replies::already_present(name))
    }
}

async fn update_fruit(
    catalog: &CatalogStore,
    name: &str,
    price: &str,
    description: &str,
) -> Result<String> {
    match catalog.update(name, price, description).await {
        Ok(()) => {
            tracing::info!(name, "fruit updated");
            Ok(replies::updated(name))
        }
        Err(FruitBotError::UnknownFruit(name)) => Ok(replies::not_in_catalog(&name)),
        Err(e) => Err(e),
    }
}

async fn delete_fruit(catalog: &CatalogStore, name: &str) -> Result<String> {
    if catalog.delete(name).await? {
        tracing::info!(name, "fruit deleted");
        Ok(replies::deleted(name))
    } else {
        Ok(replies::not_in_catalog(name))
    }
}

async fn list_fruits(catalog: &CatalogStore) -> Result<String> {
    let items = catalog.list_all().await?;
    Ok(replies::fruit_list(&items))
}

fn command_failure(error: FruitBotError) -> String {
    tracing::error!("admin command failed: {error}");
    replies::GENERIC_FAILURE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::init_schema;
    use crate::config::UpdatePolicy;
    use sqlx::SqlitePool;

    async fn seeded_store() -> CatalogStore {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("in-memory pool failed");
        init_schema(&pool).await.expect("schema init failed");

        let store = CatalogStore::new(pool, UpdatePolicy::Permissive);
        store
            .insert_if_absent("cam", "35.000đ/kg", "Cam mọng nước.")
            .await
            .expect("seed failed");
        store
    }

    #[tokio::test]
    async fn test_non_admin_delete_is_rejected_and_catalog_unchanged() {
        let store = seeded_store().await;

        let reply = command_reply(
            &store,
            Command::DeleteFruit { name: "cam".into() },
            false,
        )
        .await;

        assert_eq!(reply.as_deref(), Some(replies::FORBIDDEN));
        let items = store.list_all().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "cam");
    }

    #[tokio::test]
    async fn test_non_admin_catalog_commands_are_all_rejected() {
        let store = seeded_store().await;

        for command in [
            Command::AddFruit {
                name: "kiwi".into(),
                price: "70.000đ/kg".into(),
                description: "Kiwi xanh".into(),
            },
            Command::UpdateFruit {
                name: "cam".into(),
                price: "1đ".into(),
                description: "khác".into(),
            },
            Command::ListFruits,
        ] {
            let reply = command_reply(&store, command, false).await;
            assert_eq!(reply.as_deref(), Some(replies::FORBIDDEN));
        }

        // Nothing was added or altered.
        let items = store.list_all().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, "35.000đ/kg");
    }

    #[tokio::test]
    async fn test_admin_delete_removes_the_fruit() {
        let store = seeded_store().await;

        let reply = command_reply(
            &store,
            Command::DeleteFruit { name: "CAM".into() },
            true,
        )
        .await
        .expect("reply missing");

        assert!(reply.contains("Đã xóa"));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_add_and_list() {
        let store = seeded_store().await;

        let reply = command_reply(
            &store,
            Command::AddFruit {
                name: "kiwi".into(),
                price: "70.000đ/kg".into(),
                description: "Kiwi xanh New Zealand".into(),
            },
            true,
        )
        .await
        .expect("reply missing");
        assert!(reply.contains("Đã thêm"));

        let listing = command_reply(&store, Command::ListFruits, true)
            .await
            .expect("reply missing");
        assert!(listing.contains("1. *cam*"));
        assert!(listing.contains("2. *kiwi*"));
    }

    #[tokio::test]
    async fn test_start_and_unknown_need_no_admin() {
        let store = seeded_store().await;

        let reply = command_reply(&store, Command::Start, false).await;
        assert_eq!(reply.as_deref(), Some(replies::WELCOME));

        assert_eq!(command_reply(&store, Command::Unknown, false).await, None);
    }
}
