//! SQLiteReservationStore
//! --------------------
//! SQLite-backed implementation of the `ReservationStore` trait. Responsible
//! for durable persistence of reservations so that:
//!
//!  - holds survive restarts
//!  - the commit path re-reads the freshest rows before inserting
//!  - status transitions (confirm / cancel / expire) are recorded
//!
//! Rows are flat; the held table ids and the customer record are JSON
//! columns. Times are stored as `HH:MM` / `YYYY-MM-DD` text.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

use super::ReservationStore;
use crate::model::{CustomerInfo, Reservation, ReservationId, ReservationStatus};
use crate::window::TimeWindow;
use venue::model::VenueId;

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M";

pub struct SQLiteReservationStore {
    pool: SqlitePool,
}

impl SQLiteReservationStore {
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

    /// Create the reservations table if it does not exist. Idempotent.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reservations (
                id TEXT PRIMARY KEY,
                venue_id TEXT NOT NULL,
                table_ids_json TEXT NOT NULL,

                booking_date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                party_size INTEGER NOT NULL,

                status TEXT NOT NULL,
                customer_json TEXT NOT NULL,

                deposit_total INTEGER NOT NULL,
                min_spend_total INTEGER NOT NULL,
                created_at_ms INTEGER NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_reservations_venue_date
                ON reservations (venue_id, booking_date);
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn decode_reservation(row: &SqliteRow) -> anyhow::Result<Reservation> {
    let id_str: String = row.get("id");
    let venue_str: String = row.get("venue_id");

    let table_ids_json: String = row.get("table_ids_json");
    let id_strings: Vec<String> = serde_json::from_str(&table_ids_json)
        .map_err(|e| anyhow::anyhow!("Invalid table_ids JSON '{}': {}", table_ids_json, e))?;
    let mut table_ids = Vec::with_capacity(id_strings.len());
    for s in &id_strings {
        table_ids.push(uuid::Uuid::parse_str(s)?);
    }

    let date_str: String = row.get("booking_date");
    let start_str: String = row.get("start_time");
    let end_str: String = row.get("end_time");
    let window = TimeWindow::new(
        NaiveDate::parse_from_str(&date_str, DATE_FMT)?,
        NaiveTime::parse_from_str(&start_str, TIME_FMT)?,
        NaiveTime::parse_from_str(&end_str, TIME_FMT)?,
    )?;

    let status_str: String = row.get("status");
    let status = ReservationStatus::from_str(&status_str)?;

    let customer_json: String = row.get("customer_json");
    let customer: CustomerInfo = serde_json::from_str(&customer_json)
        .map_err(|e| anyhow::anyhow!("Invalid customer JSON '{}': {}", customer_json, e))?;

    Ok(Reservation {
        id: uuid::Uuid::parse_str(&id_str)?,
        venue_id: uuid::Uuid::parse_str(&venue_str)?,
        table_ids,
        window,
        party_size: row.get::<i64, _>("party_size") as u32,
        status,
        customer,
        deposit_total: row.get::<i64, _>("deposit_total") as u64,
        min_spend_total: row.get::<i64, _>("min_spend_total") as u64,
        created_at_ms: row.get::<i64, _>("created_at_ms") as u64,
    })
}

#[async_trait]
impl ReservationStore for SQLiteReservationStore {
    async fn load_window(
        &self,
        venue_id: VenueId,
        window: &TimeWindow,
    ) -> anyhow::Result<Vec<Reservation>> {
        let dates = window.query_dates();

        // One query, one snapshot: the whole date band a window can touch.
        let rows = sqlx::query(
            r#"
            SELECT * FROM reservations
            WHERE venue_id = ? AND booking_date IN (?, ?, ?)
            ORDER BY id;
        "#,
        )
        .bind(venue_id.to_string())
        .bind(dates[0].format(DATE_FMT).to_string())
        .bind(dates[1].format(DATE_FMT).to_string())
        .bind(dates[2].format(DATE_FMT).to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut reservations = Vec::with_capacity(rows.len());
        for row in rows {
            reservations.push(decode_reservation(&row)?);
        }

        Ok(reservations)
    }

    async fn insert(&self, reservation: &Reservation) -> anyhow::Result<()> {
        let id_strings: Vec<String> = reservation
            .table_ids
            .iter()
            .map(|id| id.to_string())
            .collect();
        let table_ids_json = serde_json::to_string(&id_strings)?;
        let customer_json = serde_json::to_string(&reservation.customer)?;

        // Plain INSERT: a duplicate id must fail, never silently overwrite.
        sqlx::query(
            r#"
            INSERT INTO reservations (
                id, venue_id, table_ids_json,
                booking_date, start_time, end_time, party_size,
                status, customer_json,
                deposit_total, min_spend_total, created_at_ms
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?);
        "#,
        )
        .bind(reservation.id.to_string())
        .bind(reservation.venue_id.to_string())
        .bind(table_ids_json)
        .bind(reservation.window.date.format(DATE_FMT).to_string())
        .bind(reservation.window.start.format(TIME_FMT).to_string())
        .bind(reservation.window.end.format(TIME_FMT).to_string())
        .bind(reservation.party_size as i64)
        .bind(reservation.status.to_string())
        .bind(customer_json)
        .bind(reservation.deposit_total as i64)
        .bind(reservation.min_spend_total as i64)
        .bind(reservation.created_at_ms as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load(&self, id: ReservationId) -> anyhow::Result<Option<Reservation>> {
        let row = sqlx::query("SELECT * FROM reservations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(decode_reservation(&row)?)),
            None => Ok(None),
        }
    }

    async fn update_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> anyhow::Result<()> {
        let result = sqlx::query("UPDATE reservations SET status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            anyhow::bail!("reservation {} not found", id);
        }

        Ok(())
    }

    async fn load_all(&self) -> anyhow::Result<Vec<Reservation>> {
        let rows = sqlx::query("SELECT * FROM reservations ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let mut reservations = Vec::with_capacity(rows.len());
        for row in rows {
            reservations.push(decode_reservation(&row)?);
        }

        Ok(reservations)
    }
}
