//! Append-only tick storage
//!
//! Persists price observations to SQLite via sqlx. A fetch batch is
//! committed in a single transaction; rows are never updated or deleted
//! by this process. Prices are stored as text so that decimal values
//! survive the round trip without floating-point drift.

mod types;

pub use types::{normalize_ticker, PriceTick, RangeQuery};

use rust_decimal::Decimal;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

const CREATE_TABLE_SQL: &str = "\
CREATE TABLE IF NOT EXISTS price_ticks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ticker TEXT NOT NULL,
    price TEXT NOT NULL,
    ts BIGINT NOT NULL,
    created_at TEXT NOT NULL
)";

const CREATE_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS ix_price_ticks_ticker_ts ON price_ticks (ticker, ts)";

/// Handle to the tick store; cheap to clone, shares one pool
#[derive(Debug, Clone)]
pub struct TickStore {
    pool: SqlitePool,
}

impl TickStore {
    /// Connect to the database and ensure the schema exists
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        let store = Self { pool };
        store.create_schema().await?;
        Ok(store)
    }

    async fn create_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Commit a fetch batch atomically: all rows land or none do
    pub async fn append_batch(&self, ticks: &[PriceTick]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let created_at = types::insertion_time().to_rfc3339();

        for tick in ticks {
            sqlx::query(
                "INSERT INTO price_ticks (ticker, price, ts, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(&tick.ticker)
            .bind(tick.price.to_string())
            .bind(tick.ts)
            .bind(&created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Most recent tick for a ticker, or None when nothing is stored yet
    pub async fn latest(&self, ticker: &str) -> Result<Option<PriceTick>, sqlx::Error> {
        let row: Option<(String, i64, String)> = sqlx::query_as(
            "SELECT ticker, ts, price FROM price_ticks WHERE ticker = ? \
             ORDER BY ts DESC LIMIT 1",
        )
        .bind(ticker)
        .fetch_optional(&self.pool)
        .await?;

        row.map(decode_row).transpose()
    }

    /// Ticks for a ticker ordered by descending timestamp, paginated
    pub async fn range(
        &self,
        ticker: &str,
        query: &RangeQuery,
    ) -> Result<Vec<PriceTick>, sqlx::Error> {
        let mut sql = String::from("SELECT ticker, ts, price FROM price_ticks WHERE ticker = ?");
        if query.from_ts.is_some() {
            sql.push_str(" AND ts >= ?");
        }
        if query.to_ts.is_some() {
            sql.push_str(" AND ts <= ?");
        }
        sql.push_str(" ORDER BY ts DESC LIMIT ? OFFSET ?");

        let mut stmt = sqlx::query_as::<_, (String, i64, String)>(&sql).bind(ticker);
        if let Some(from_ts) = query.from_ts {
            stmt = stmt.bind(from_ts);
        }
        if let Some(to_ts) = query.to_ts {
            stmt = stmt.bind(to_ts);
        }

        let rows = stmt
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(decode_row).collect()
    }

    /// Cheap liveness probe used by the health endpoint
    pub async fn healthcheck(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn decode_row((ticker, ts, price): (String, i64, String)) -> Result<PriceTick, sqlx::Error> {
    let price = Decimal::from_str(&price).map_err(|e| sqlx::Error::Decode(e.into()))?;
    Ok(PriceTick { ticker, ts, price })
}
