use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::StoreError;
use crate::store::{NewScanRecord, RecordKind, SavedScan, ScanRecordStore};

/// Postgres-backed record store.
#[derive(Debug, Clone)]
pub struct PgScanRecordStore {
    pool: PgPool,
}

impl PgScanRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SavedScanRow {
    id: i64,
    record_kind: String,
    barcode_data: String,
    scan_type: Option<String>,
    source: String,
    product_name: Option<String>,
    category: Option<String>,
    price: Option<f64>,
    metadata: Option<serde_json::Value>,
    saved_at: DateTime<Utc>,
}

impl From<SavedScanRow> for SavedScan {
    fn from(row: SavedScanRow) -> Self {
        SavedScan {
            id: row.id,
            kind: match row.record_kind.as_str() {
                "save" => RecordKind::Save,
                _ => RecordKind::Ingest,
            },
            barcode_data: row.barcode_data,
            scan_type: row.scan_type,
            source: row.source,
            product_name: row.product_name,
            category: row.category,
            price: row.price,
            metadata: row.metadata,
            saved_at: row.saved_at,
        }
    }
}

#[async_trait]
impl ScanRecordStore for PgScanRecordStore {
    async fn initialize_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS saved_scans (
                id BIGSERIAL PRIMARY KEY,
                record_kind TEXT NOT NULL DEFAULT 'save',
                barcode_data TEXT NOT NULL,
                scan_type TEXT,
                source TEXT NOT NULL,
                product_name TEXT,
                category TEXT,
                price DOUBLE PRECISION,
                metadata JSONB,
                saved_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_saved_scans_barcode
                ON saved_scans (barcode_data, record_kind, saved_at DESC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert(&self, record: NewScanRecord) -> Result<i64, StoreError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO saved_scans (
                record_kind, barcode_data, scan_type, source, product_name,
                category, price, metadata, saved_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(record.kind.as_str())
        .bind(&record.barcode_data)
        .bind(&record.scan_type)
        .bind(&record.source)
        .bind(&record.product_name)
        .bind(&record.category)
        .bind(record.price)
        .bind(&record.metadata)
        .bind(record.saved_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn latest_by_barcode(
        &self,
        barcode: &str,
        kind: RecordKind,
    ) -> Result<Option<SavedScan>, StoreError> {
        let row = sqlx::query_as::<_, SavedScanRow>(
            r#"
            SELECT id, record_kind, barcode_data, scan_type, source,
                   product_name, category, price, metadata, saved_at
            FROM saved_scans
            WHERE barcode_data = $1 AND record_kind = $2
            ORDER BY saved_at DESC
            LIMIT 1
            "#,
        )
        .bind(barcode)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SavedScan>, StoreError> {
        let rows = sqlx::query_as::<_, SavedScanRow>(
            r#"
            SELECT id, record_kind, barcode_data, scan_type, source,
                   product_name, category, price, metadata, saved_at
            FROM saved_scans
            ORDER BY saved_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
