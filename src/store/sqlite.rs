// src/store/sqlite.rs
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use super::{BidAlert, BidStore, InsertOutcome, NewBidAlert};

const SELECT_COLUMNS: &str = "id, source, title, url, description, bid_category, services_json, \
     publish_date, closing_date, notified, created_at";

#[derive(Debug, Clone)]
pub struct SqliteBidStore {
    pool: SqlitePool,
}

impl SqliteBidStore {
    /// Open (creating if missing) and migrate. `url` is an sqlx SQLite URL,
    /// e.g. `sqlite:data/bid_alerts.db` or `sqlite::memory:`.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url {url}"))?
            .create_if_missing(true);

        if let Some(parent) = db_file(url).and_then(|f| f.parent()) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }

        // In-memory databases live and die with their connection; pin exactly one.
        let mut pool_opts = SqlitePoolOptions::new().max_connections(5);
        if url.contains(":memory:") {
            pool_opts = pool_opts
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_opts
            .connect_with(options)
            .await
            .context("connecting to bid store")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bid_alerts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source TEXT NOT NULL,
                title TEXT NOT NULL,
                url TEXT NOT NULL,
                description TEXT,
                bid_category TEXT NOT NULL
                    CHECK (bid_category IN ('Communication', 'Connectivity', 'Collaboration', 'ICT')),
                services_json TEXT NOT NULL DEFAULT '[]',
                publish_date INTEGER NOT NULL,
                closing_date INTEGER,
                notified INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                UNIQUE(url, title)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("creating bid_alerts table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_bid_alerts_created_at ON bid_alerts(created_at DESC)",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl BidStore for SqliteBidStore {
    async fn insert_if_unique(&self, alert: &NewBidAlert) -> Result<InsertOutcome> {
        let services = serde_json::to_string(&alert.services)?;
        let res = sqlx::query(
            r#"
            INSERT INTO bid_alerts (source, title, url, description, bid_category, services_json,
                                    publish_date, closing_date, notified, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url, title) DO NOTHING
            "#,
        )
        .bind(&alert.source)
        .bind(&alert.title)
        .bind(&alert.url)
        .bind(&alert.description)
        .bind(alert.bid_category.as_str())
        .bind(services)
        .bind(alert.publish_date.timestamp_millis())
        .bind(alert.closing_date.map(|d| d.timestamp_millis()))
        .bind(alert.notified)
        .bind(alert.created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .context("inserting bid alert")?;

        if res.rows_affected() == 0 {
            return Ok(InsertOutcome::AlreadyExists);
        }
        // Timestamps are stored as millis.
        let mut stored = alert.clone();
        stored.publish_date = stored.publish_date.trunc_subsecs(3);
        stored.closing_date = stored.closing_date.map(|d| d.trunc_subsecs(3));
        stored.created_at = stored.created_at.trunc_subsecs(3);
        Ok(InsertOutcome::Inserted(BidAlert::from_new(
            res.last_insert_rowid(),
            stored,
        )))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<BidAlert>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM bid_alerts ORDER BY created_at DESC, id DESC LIMIT ?"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .context("listing bid alerts")?;
        rows.iter().map(row_to_alert).collect()
    }

    async fn set_notified(&self, id: i64, notified: bool) -> Result<bool> {
        let res = sqlx::query("UPDATE bid_alerts SET notified = ? WHERE id = ?")
            .bind(notified)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("updating bid alert")?;
        Ok(res.rows_affected() > 0)
    }
}

/// Filesystem path behind an sqlx SQLite URL; `None` for in-memory databases.
fn db_file(url: &str) -> Option<&Path> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Some(Path::new(path))
}

fn millis_to_utc(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| anyhow!("timestamp {ms} out of range"))
}

fn row_to_alert(row: &SqliteRow) -> Result<BidAlert> {
    let category: String = row.try_get("bid_category")?;
    let services_json: String = row.try_get("services_json")?;
    let closing: Option<i64> = row.try_get("closing_date")?;
    Ok(BidAlert {
        id: row.try_get("id")?,
        source: row.try_get("source")?,
        title: row.try_get("title")?,
        url: row.try_get("url")?,
        description: row.try_get("description")?,
        bid_category: category.parse()?,
        services: serde_json::from_str(&services_json).context("decoding services_json")?,
        publish_date: millis_to_utc(row.try_get("publish_date")?)?,
        closing_date: closing.map(millis_to_utc).transpose()?,
        notified: row.try_get("notified")?,
        created_at: millis_to_utc(row.try_get("created_at")?)?,
    })
}
