//! SQLiteVenueStore
//! --------------------
//! SQLite-backed implementation of the `VenueStore` trait. Holds the venue's
//! administrative reference data:
//!
//!  - bookable tables (capacities, floor zone, commercial terms)
//!  - curated table-combination rules
//!
//! The engine only reads this data; writes come from admin tooling.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

use super::VenueStore;
use crate::model::{Location, Table, TableCombination, VenueId};

/// SQLite persistence backend for tables and combination rules.
///
/// Schema is created on startup; `save_*` methods use upsert semantics so
/// admin edits and seeding share one code path.
pub struct SQLiteVenueStore {
    pool: SqlitePool,
}

impl SQLiteVenueStore {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect and ensure the schema exists.
    pub async fn new(path: &str) -> anyhow::Result<Self> {
        let pool = SqlitePool::connect(path).await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create tables if they do not exist. Idempotent.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS venue_tables (
                id TEXT PRIMARY KEY,
                venue_id TEXT NOT NULL,
                label TEXT NOT NULL,
                location TEXT NOT NULL,

                min_capacity INTEGER NOT NULL,
                preferred_capacity INTEGER NOT NULL,
                max_capacity INTEGER NOT NULL,

                is_premium INTEGER NOT NULL,
                is_booth INTEGER NOT NULL,

                min_spend INTEGER NOT NULL,
                deposit INTEGER NOT NULL,

                is_active INTEGER NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS table_combinations (
                id TEXT PRIMARY KEY,
                venue_id TEXT NOT NULL,
                table_ids_json TEXT NOT NULL,
                combined_capacity INTEGER NOT NULL,
                is_preferred INTEGER NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn decode_table(row: &SqliteRow) -> anyhow::Result<Table> {
    let id_str: String = row.get("id");
    let venue_str: String = row.get("venue_id");

    let location_str: String = row.get("location");
    let location = Location::from_str(&location_str)?;

    Ok(Table {
        id: uuid::Uuid::parse_str(&id_str)?,
        venue_id: uuid::Uuid::parse_str(&venue_str)?,
        label: row.get("label"),
        location,
        min_capacity: row.get::<i64, _>("min_capacity") as u32,
        preferred_capacity: row.get::<i64, _>("preferred_capacity") as u32,
        max_capacity: row.get::<i64, _>("max_capacity") as u32,
        is_premium: row.get::<i64, _>("is_premium") != 0,
        is_booth: row.get::<i64, _>("is_booth") != 0,
        min_spend: row.get::<i64, _>("min_spend") as u64,
        deposit: row.get::<i64, _>("deposit") as u64,
        is_active: row.get::<i64, _>("is_active") != 0,
    })
}

#[async_trait]
impl VenueStore for SQLiteVenueStore {
    async fn load_tables(&self, venue_id: VenueId) -> anyhow::Result<Vec<Table>> {
        let rows = sqlx::query("SELECT * FROM venue_tables WHERE venue_id = ? ORDER BY id")
            .bind(venue_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            tables.push(decode_table(&row)?);
        }

        Ok(tables)
    }

    async fn load_combinations(&self, venue_id: VenueId) -> anyhow::Result<Vec<TableCombination>> {
        let rows = sqlx::query("SELECT * FROM table_combinations WHERE venue_id = ? ORDER BY id")
            .bind(venue_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        let mut combos = Vec::with_capacity(rows.len());

        for row in rows {
            let id_str: String = row.get("id");
            let venue_str: String = row.get("venue_id");

            let table_ids_json: String = row.get("table_ids_json");
            let id_strings: Vec<String> = serde_json::from_str(&table_ids_json).map_err(|e| {
                anyhow::anyhow!("Invalid table_ids JSON '{}': {}", table_ids_json, e)
            })?;

            let mut table_ids = Vec::with_capacity(id_strings.len());
            for s in &id_strings {
                table_ids.push(uuid::Uuid::parse_str(s)?);
            }

            combos.push(TableCombination {
                id: uuid::Uuid::parse_str(&id_str)?,
                venue_id: uuid::Uuid::parse_str(&venue_str)?,
                table_ids,
                combined_capacity: row.get::<i64, _>("combined_capacity") as u32,
                is_preferred: row.get::<i64, _>("is_preferred") != 0,
            });
        }

        Ok(combos)
    }

    async fn save_table(&self, table: &Table) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO venue_tables (
                id, venue_id, label, location,
                min_capacity, preferred_capacity, max_capacity,
                is_premium, is_booth,
                min_spend, deposit, is_active
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                venue_id = excluded.venue_id,
                label = excluded.label,
                location = excluded.location,
                min_capacity = excluded.min_capacity,
                preferred_capacity = excluded.preferred_capacity,
                max_capacity = excluded.max_capacity,
                is_premium = excluded.is_premium,
                is_booth = excluded.is_booth,
                min_spend = excluded.min_spend,
                deposit = excluded.deposit,
                is_active = excluded.is_active;
        "#,
        )
        .bind(table.id.to_string())
        .bind(table.venue_id.to_string())
        .bind(&table.label)
        .bind(table.location.to_string())
        .bind(table.min_capacity as i64)
        .bind(table.preferred_capacity as i64)
        .bind(table.max_capacity as i64)
        .bind(table.is_premium as i64)
        .bind(table.is_booth as i64)
        .bind(table.min_spend as i64)
        .bind(table.deposit as i64)
        .bind(table.is_active as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_combination(&self, combination: &TableCombination) -> anyhow::Result<()> {
        let id_strings: Vec<String> = combination
            .table_ids
            .iter()
            .map(|id| id.to_string())
            .collect();
        let table_ids_json = serde_json::to_string(&id_strings)?;

        sqlx::query(
            r#"
            INSERT INTO table_combinations (
                id, venue_id, table_ids_json, combined_capacity, is_preferred
            )
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                venue_id = excluded.venue_id,
                table_ids_json = excluded.table_ids_json,
                combined_capacity = excluded.combined_capacity,
                is_preferred = excluded.is_preferred;
        "#,
        )
        .bind(combination.id.to_string())
        .bind(combination.venue_id.to_string())
        .bind(table_ids_json)
        .bind(combination.combined_capacity as i64)
        .bind(combination.is_preferred as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
