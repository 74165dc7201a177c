//! Fruit catalog storage.
//!
//! One SQLite table. Names are normalized to lower-case on every write and
//! every lookup, which makes the UNIQUE constraint case-insensitive in
//! practice and keeps lookups to a plain equality match.

use std::path::Path;

use sqlx::SqlitePool;

use crate::config::UpdatePolicy;
use crate::error::{FruitBotError, Result};

/// A catalog row. `price` is a display string with the currency embedded
/// ("25.000đ/kg"), opaque to the bot.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub description: String,
}

/// Open (or create) the catalog database and ensure the schema exists.
pub async fn init_pool(db_path: &str) -> Result<SqlitePool> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{db_path}?mode=rwc");
    tracing::debug!("connecting to catalog database: {db_url}");

    let pool = SqlitePool::connect(&db_url).await?;
    init_schema(&pool).await?;

    Ok(pool)
}

/// Create the fruits table if it does not exist.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fruits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE,
            price TEXT,
            description TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Catalog operations over the shared pool.
///
/// Each call acquires a connection from the pool for just that statement,
/// so there is no cross-request state to leak.
#[derive(Clone)]
pub struct CatalogStore {
    pool: SqlitePool,
    update_policy: UpdatePolicy,
}

impl CatalogStore {
    pub fn new(pool: SqlitePool, update_policy: UpdatePolicy) -> Self {
        Self {
            pool,
            update_policy,
        }
    }

    fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Point lookup by case-insensitive name.
    pub async fn lookup(&self, name: &str) -> Result<Option<CatalogItem>> {
        let item = sqlx::query_as::<_, CatalogItem>(
            "SELECT id, name, price, description FROM fruits WHERE name = ?",
        )
        .bind(Self::normalize(name))
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Insert a fruit unless one with the same name already exists.
    ///
    /// Returns `true` when a row was inserted, `false` when the name was
    /// already present. Idempotent.
    pub async fn insert_if_absent(
        &self,
        name: &str,
        price: &str,
        description: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO fruits (name, price, description) VALUES (?, ?, ?)",
        )
        .bind(Self::normalize(name))
        .bind(price)
        .bind(description)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Update price and description of an existing fruit.
    ///
    /// A missing name is a silent no-op under `UpdatePolicy::Permissive`
    /// and an `UnknownFruit` error under `UpdatePolicy::Strict`.
    pub async fn update(&self, name: &str, price: &str, description: &str) -> Result<()> {
        let normalized = Self::normalize(name);

        let result = sqlx::query("UPDATE fruits SET price = ?, description = ? WHERE name = ?")
            .bind(price)
            .bind(description)
            .bind(&normalized)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 && self.update_policy == UpdatePolicy::Strict {
            return Err(FruitBotError::UnknownFruit(normalized));
        }

        Ok(())
    }

    /// Delete by case-insensitive name. Returns `true` when a row was
    /// removed; deleting an absent name is a no-op, not an error.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM fruits WHERE name = ?")
            .bind(Self::normalize(name))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Full scan in insertion order.
    pub async fn list_all(&self) -> Result<Vec<CatalogItem>> {
        let items = sqlx::query_as::<_, CatalogItem>(
            "SELECT id, name, price, description FROM fruits ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Seed the ten sample fruits. Existing names are left untouched.
    /// Returns how many rows were actually inserted.
    pub async fn seed_defaults(&self) -> Result<usize> {
        let mut inserted = 0;
        for (name, price, description) in DEFAULT_FRUITS {
            if self.insert_if_absent(name, price, description).await? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

const DEFAULT_FRUITS: &[(&str, &str, &str)] = &[
    (
        "chuối",
        "25.000đ/kg",
        "Chuối chín vàng, vị ngọt tự nhiên, giàu kali và vitamin B6, tốt cho tim mạch.",
    ),
    (
        "táo",
        "45.000đ/kg",
        "Táo đỏ tươi, giòn ngọt, chứa nhiều chất chống oxy hóa, giúp đẹp da và hỗ trợ tiêu hóa.",
    ),
    (
        "cam",
        "35.000đ/kg",
        "Cam mọng nước, giàu vitamin C, giúp tăng cường miễn dịch và làm đẹp da.",
    ),
    (
        "xoài",
        "40.000đ/kg",
        "Xoài chín vàng, thơm ngọt, chứa nhiều vitamin A và C, tốt cho thị lực.",
    ),
    (
        "nho",
        "60.000đ/kg",
        "Nho tươi ngon, nhiều dưỡng chất, giúp giảm căng thẳng và tốt cho tim mạch.",
    ),
    (
        "dưa hấu",
        "20.000đ/kg",
        "Dưa hấu ngọt mát, chứa nhiều nước, giúp giải nhiệt và hỗ trợ tiêu hóa.",
    ),
    (
        "dứa",
        "30.000đ/kg",
        "Dứa (thơm) có vị chua ngọt, chứa enzyme hỗ trợ tiêu hóa và làm đẹp da.",
    ),
    (
        "dâu tây",
        "120.000đ/kg",
        "Dâu tây đỏ mọng, giàu vitamin C và chất chống oxy hóa, giúp làm đẹp và tốt cho da.",
    ),
    (
        "lê",
        "50.000đ/kg",
        "Lê ngọt mát, nhiều nước, giúp thanh lọc cơ thể và tốt cho phổi.",
    ),
    (
        "thanh long",
        "25.000đ/kg",
        "Thanh long tươi mát, ít calo, nhiều chất xơ, giúp hỗ trợ tiêu hóa và giảm cân.",
    ),
];
