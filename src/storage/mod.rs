use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub display_name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LocationRow {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Facility kind: `toilet` | `nursing_room`.
    pub kind: String,
    pub lat: f64,
    pub lng: f64,
    pub floor: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: String,
    pub user_id: String,
    pub location_id: String,
    pub rating: i64,
    pub content: String,
    /// Moderation state: `pending` | `approved` | `rejected`.
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportRow {
    pub id: String,
    pub user_id: String,
    pub location_id: String,
    pub kind: String,
    pub detail: String,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FacilityRequestRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub kind: String,
    pub lat: f64,
    pub lng: f64,
    pub floor: Option<String>,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CheckInRow {
    pub id: String,
    pub user_id: String,
    pub location_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AchievementRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub criteria_type: String,
    pub threshold: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UnlockRow {
    pub user_id: String,
    pub achievement_id: String,
    pub unlocked_at: String,
}

/// Per-user activity totals derived on each read; never persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityCounts {
    pub reviews: i64,
    pub reports: i64,
    pub approved_requests: i64,
}

/// Aggregate of approved reviews for one location.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewSummary {
    pub count: i64,
    pub mean_rating: Option<f64>,
}

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("facilityd.db");
        let opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::migrate!("src/storage/migrations")
            .run(pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    // ─── Users ──────────────────────────────────────────────────────────────

    pub async fn create_user(&self, display_name: &str) -> Result<UserRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query("INSERT INTO users (id, display_name, created_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(display_name)
            .bind(&now)
            .execute(&self.pool)
            .await?;
        self.get_user(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user not found after insert"))
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<UserRow>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    // ─── Locations ──────────────────────────────────────────────────────────

    pub async fn create_location(
        &self,
        name: &str,
        description: &str,
        kind: &str,
        lat: f64,
        lng: f64,
        floor: Option<&str>,
    ) -> Result<LocationRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO locations (id, name, description, kind, lat, lng, floor, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(description)
        .bind(kind)
        .bind(lat)
        .bind(lng)
        .bind(floor)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_location(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("location not found after insert"))
    }

    pub async fn get_location(&self, id: &str) -> Result<Option<LocationRow>> {
        Ok(sqlx::query_as("SELECT * FROM locations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn list_locations(&self, kind: Option<&str>) -> Result<Vec<LocationRow>> {
        if let Some(kind) = kind {
            Ok(
                sqlx::query_as("SELECT * FROM locations WHERE kind = ? ORDER BY name ASC")
                    .bind(kind)
                    .fetch_all(&self.pool)
                    .await?,
            )
        } else {
            Ok(sqlx::query_as("SELECT * FROM locations ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?)
        }
    }

    // ─── Reviews ────────────────────────────────────────────────────────────

    pub async fn create_review(
        &self,
        user_id: &str,
        location_id: &str,
        rating: i64,
        content: &str,
    ) -> Result<ReviewRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO reviews (id, user_id, location_id, rating, content, status, created_at)
             VALUES (?, ?, ?, ?, ?, 'pending', ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(location_id)
        .bind(rating)
        .bind(content)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_review(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("review not found after insert"))
    }

    pub async fn get_review(&self, id: &str) -> Result<Option<ReviewRow>> {
        Ok(sqlx::query_as("SELECT * FROM reviews WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Approved reviews for a location, newest first.
    pub async fn list_approved_reviews(&self, location_id: &str) -> Result<Vec<ReviewRow>> {
        Ok(sqlx::query_as(
            "SELECT * FROM reviews WHERE location_id = ? AND status = 'approved'
             ORDER BY created_at DESC",
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Transition a pending review to `approved` or `rejected`.  Returns
    /// `false` when the review does not exist or was already moderated.
    pub async fn set_review_status(&self, id: &str, status: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE reviews SET status = ? WHERE id = ? AND status = 'pending'")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn review_summary(&self, location_id: &str) -> Result<ReviewSummary> {
        let row: (i64, Option<f64>) = sqlx::query_as(
            "SELECT COUNT(*), AVG(rating) FROM reviews
             WHERE location_id = ? AND status = 'approved'",
        )
        .bind(location_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(ReviewSummary {
            count: row.0,
            mean_rating: row.1,
        })
    }

    // ─── Reports ────────────────────────────────────────────────────────────

    pub async fn create_report(
        &self,
        user_id: &str,
        location_id: &str,
        kind: &str,
        detail: &str,
    ) -> Result<ReportRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO reports (id, user_id, location_id, kind, detail, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(location_id)
        .bind(kind)
        .bind(detail)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(sqlx::query_as("SELECT * FROM reports WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.pool)
            .await?)
    }

    /// Report kinds filed against a location since `cutoff`.
    ///
    /// RFC 3339 UTC strings compare lexicographically in time order, so the
    /// cutoff is passed as a plain string bound.
    pub async fn recent_report_kinds(
        &self,
        location_id: &str,
        cutoff: &DateTime<Utc>,
    ) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT kind FROM reports WHERE location_id = ? AND created_at >= ?",
        )
        .bind(location_id)
        .bind(cutoff.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(k,)| k).collect())
    }

    // ─── Facility requests ──────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    pub async fn create_facility_request(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        kind: &str,
        lat: f64,
        lng: f64,
        floor: Option<&str>,
    ) -> Result<FacilityRequestRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO facility_requests
             (id, user_id, name, description, kind, lat, lng, floor, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(name)
        .bind(description)
        .bind(kind)
        .bind(lat)
        .bind(lng)
        .bind(floor)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_facility_request(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("facility request not found after insert"))
    }

    pub async fn get_facility_request(&self, id: &str) -> Result<Option<FacilityRequestRow>> {
        Ok(sqlx::query_as("SELECT * FROM facility_requests WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn list_facility_requests(
        &self,
        status: Option<&str>,
    ) -> Result<Vec<FacilityRequestRow>> {
        if let Some(status) = status {
            Ok(sqlx::query_as(
                "SELECT * FROM facility_requests WHERE status = ? ORDER BY created_at ASC",
            )
            .bind(status)
            .fetch_all(&self.pool)
            .await?)
        } else {
            Ok(
                sqlx::query_as("SELECT * FROM facility_requests ORDER BY created_at ASC")
                    .fetch_all(&self.pool)
                    .await?,
            )
        }
    }

    /// Transition a pending request to `approved` or `rejected`.  Returns
    /// `false` when the request does not exist or was already moderated.
    pub async fn set_facility_request_status(&self, id: &str, status: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE facility_requests SET status = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(status)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ─── Check-ins ──────────────────────────────────────────────────────────

    pub async fn create_check_in(&self, user_id: &str, location_id: &str) -> Result<CheckInRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO check_ins (id, user_id, location_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(location_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(sqlx::query_as("SELECT * FROM check_ins WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.pool)
            .await?)
    }

    /// All check-in timestamps for a user, parsed back to UTC instants.
    pub async fn check_in_times(&self, user_id: &str) -> Result<Vec<DateTime<Utc>>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT created_at FROM check_ins WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        let mut times = Vec::with_capacity(rows.len());
        for (raw,) in rows {
            let parsed = DateTime::parse_from_rfc3339(&raw)
                .with_context(|| format!("bad check_in timestamp: {raw}"))?;
            times.push(parsed.with_timezone(&Utc));
        }
        Ok(times)
    }

    // ─── Activity counts ────────────────────────────────────────────────────

    pub async fn activity_counts(&self, user_id: &str) -> Result<ActivityCounts> {
        let reviews: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        let reports: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reports WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        let approved_requests: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM facility_requests WHERE user_id = ? AND status = 'approved'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(ActivityCounts {
            reviews: reviews.0,
            reports: reports.0,
            approved_requests: approved_requests.0,
        })
    }

    // ─── Achievements ───────────────────────────────────────────────────────

    /// Seed path: create or refresh a static achievement definition.
    pub async fn upsert_achievement(
        &self,
        id: &str,
        name: &str,
        description: &str,
        icon: &str,
        criteria_type: &str,
        threshold: i64,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO achievements (id, name, description, icon, criteria_type, threshold)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
               name = excluded.name,
               description = excluded.description,
               icon = excluded.icon,
               criteria_type = excluded.criteria_type,
               threshold = excluded.threshold",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(icon)
        .bind(criteria_type)
        .bind(threshold)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_achievements(&self) -> Result<Vec<AchievementRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM achievements ORDER BY threshold ASC, id ASC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn list_unlocks(&self, user_id: &str) -> Result<Vec<UnlockRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM achievement_unlocks WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// Record a first unlock.  The (user, achievement) pair is unique, so a
    /// concurrent duplicate insert degrades to a no-op; returns whether this
    /// call actually wrote the row.
    pub async fn insert_unlock(
        &self,
        user_id: &str,
        achievement_id: &str,
        unlocked_at: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO achievement_unlocks (user_id, achievement_id, unlocked_at)
             VALUES (?, ?, ?)
             ON CONFLICT(user_id, achievement_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(achievement_id)
        .bind(unlocked_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
