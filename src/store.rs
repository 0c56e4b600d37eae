use sqlx::SqlitePool;

use crate::db;
use crate::models::entry::now_timestamp;
use crate::models::{EntryChanges, EntryFilter, EntryPage, VisitorEntry};

/// Handle to the `visitor_entries` table.
///
/// Cheap to clone; every clone shares the same connection pool. Writes run in
/// their own transaction, which rolls back when dropped on an error path.
#[derive(Clone)]
pub struct EntryStore {
    pool: SqlitePool,
}

impl EntryStore {
    /// Wrap an already-migrated pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (and migrate) the database at `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = db::init_pool(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Wait for in-flight queries and close every connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn create(
        &self,
        license_plate: &str,
        house_number: &str,
    ) -> Result<VisitorEntry, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let entry: VisitorEntry = sqlx::query_as(
            r#"
            INSERT INTO visitor_entries (license_plate, house_number, timestamp)
            VALUES (?, ?, ?)
            RETURNING id, license_plate, house_number, timestamp
            "#,
        )
        .bind(license_plate)
        .bind(house_number)
        .bind(now_timestamp())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(entry)
    }

    pub async fn get(&self, id: i64) -> Result<Option<VisitorEntry>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, license_plate, house_number, timestamp FROM visitor_entries WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Apply `changes` to entry `id`. Returns `None` if the entry does not exist.
    pub async fn update(
        &self,
        id: i64,
        changes: &EntryChanges,
    ) -> Result<Option<VisitorEntry>, sqlx::Error> {
        if changes.is_empty() {
            return self.get(id).await;
        }

        let mut tx = self.pool.begin().await?;

        let entry: Option<VisitorEntry> = sqlx::query_as(
            r#"
            UPDATE visitor_entries
            SET license_plate = COALESCE(?, license_plate),
                house_number = COALESCE(?, house_number)
            WHERE id = ?
            RETURNING id, license_plate, house_number, timestamp
            "#,
        )
        .bind(&changes.license_plate)
        .bind(&changes.house_number)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(entry)
    }

    /// Returns `false` if there was nothing to delete.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM visitor_entries WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Most recent first. Pages past the end come back empty.
    pub async fn list(&self, page: i64, per_page: i64) -> Result<EntryPage, sqlx::Error> {
        let page = page.max(1);
        let per_page = per_page.max(1);

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visitor_entries")
            .fetch_one(&self.pool)
            .await?;

        let offset = (page - 1).saturating_mul(per_page);
        let entries: Vec<VisitorEntry> = if offset >= total {
            Vec::new()
        } else {
            sqlx::query_as(
                r#"
                SELECT id, license_plate, house_number, timestamp
                FROM visitor_entries
                ORDER BY timestamp DESC, id DESC
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(EntryPage {
            entries,
            total,
            pages: total_pages(total, per_page),
            page,
            per_page,
        })
    }

    /// Case-sensitive substring match on every filter that is set.
    pub async fn search(&self, filter: &EntryFilter) -> Result<Vec<VisitorEntry>, sqlx::Error> {
        let license_plate = filter.license_plate.as_deref().filter(|s| !s.is_empty());
        let house_number = filter.house_number.as_deref().filter(|s| !s.is_empty());

        sqlx::query_as(
            r#"
            SELECT id, license_plate, house_number, timestamp
            FROM visitor_entries
            WHERE (?1 IS NULL OR instr(license_plate, ?1) > 0)
              AND (?2 IS NULL OR instr(house_number, ?2) > 0)
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(license_plate)
        .bind(house_number)
        .fetch_all(&self.pool)
        .await
    }
}

fn total_pages(total: i64, per_page: i64) -> i64 {
    if total == 0 {
        0
    } else {
        total / per_page + i64::from(total % per_page != 0)
    }
}
