//! SQLite-backed storage for users and reports.
//!
//! The stores sit behind traits so business logic can be exercised against
//! the in-memory fakes at the bottom of this file.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::dtos::reports::{CreateReportRequest, EstimateQuery};
use crate::models::{Report, User};

/// Changes applied by [`UserStore::update`]. `None` leaves a column as is.
#[derive(Debug, Default, Clone)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, anyhow::Error>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error>;
    async fn list(&self, email: Option<&str>) -> Result<Vec<User>, anyhow::Error>;
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, anyhow::Error>;
    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, anyhow::Error>;
    async fn delete(&self, id: i64) -> Result<Option<User>, anyhow::Error>;
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn create(&self, user_id: i64, req: &CreateReportRequest)
        -> Result<Report, anyhow::Error>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Report>, anyhow::Error>;
    async fn set_approved(&self, id: i64, approved: bool)
        -> Result<Option<Report>, anyhow::Error>;
    async fn estimate(&self, query: &EstimateQuery) -> Result<Option<f64>, anyhow::Error>;
}

const USER_COLUMNS: &str = "id, email, password_hash, admin, created_utc";
const REPORT_COLUMNS: &str =
    "id, user_id, make, model, year, mileage, lng, lat, price, approved, created_utc";

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<(), anyhow::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for Database {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, anyhow::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list(&self, email: Option<&str>) -> Result<Vec<User>, anyhow::Error> {
        let users = match email {
            Some(email) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE email = ?1 ORDER BY id"
                ))
                .bind(email)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users ORDER BY id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(users)
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<User, anyhow::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, admin, created_utc) \
             VALUES (?1, ?2, 1, ?3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(user_id = user.id, "Inserted user");
        Ok(user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, anyhow::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
                 email = COALESCE(?2, email), \
                 password_hash = COALESCE(?3, password_hash) \
             WHERE id = ?1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.email)
        .bind(changes.password_hash)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(user) = &user {
            tracing::info!(user_id = user.id, "Updated user");
        }
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<Option<User>, anyhow::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "DELETE FROM users WHERE id = ?1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(user) = &user {
            tracing::info!(user_id = user.id, "Removed user");
        }
        Ok(user)
    }
}

#[async_trait]
impl ReportStore for Database {
    async fn create(
        &self,
        user_id: i64,
        req: &CreateReportRequest,
    ) -> Result<Report, anyhow::Error> {
        let report = sqlx::query_as::<_, Report>(&format!(
            "INSERT INTO reports \
                 (user_id, make, model, year, mileage, lng, lat, price, approved, created_utc) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9) \
             RETURNING {REPORT_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&req.make)
        .bind(&req.model)
        .bind(req.year)
        .bind(req.mileage)
        .bind(req.lng)
        .bind(req.lat)
        .bind(req.price)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(report_id = report.id, user_id, "Inserted report");
        Ok(report)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Report>, anyhow::Error> {
        let report = sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(report)
    }

    async fn set_approved(
        &self,
        id: i64,
        approved: bool,
    ) -> Result<Option<Report>, anyhow::Error> {
        let report = sqlx::query_as::<_, Report>(&format!(
            "UPDATE reports SET approved = ?2 WHERE id = ?1 RETURNING {REPORT_COLUMNS}"
        ))
        .bind(id)
        .bind(approved)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(report) = &report {
            tracing::info!(report_id = report.id, approved, "Updated report");
        }
        Ok(report)
    }

    // Average price of the three approved reports closest in mileage, among
    // same-make/model reports within +-3 years and +-5 degrees of the query.
    async fn estimate(&self, query: &EstimateQuery) -> Result<Option<f64>, anyhow::Error> {
        let price = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(price) FROM ( \
                 SELECT price FROM reports \
                 WHERE make = ?1 AND model = ?2 \
                   AND year BETWEEN ?3 - 3 AND ?3 + 3 \
                   AND lng BETWEEN ?4 - 5 AND ?4 + 5 \
                   AND lat BETWEEN ?5 - 5 AND ?5 + 5 \
                   AND approved = 1 \
                 ORDER BY ABS(mileage - ?6) \
                 LIMIT 3 \
             )",
        )
        .bind(&query.make)
        .bind(&query.model)
        .bind(query.year)
        .bind(query.lng)
        .bind(query.lat)
        .bind(query.mileage)
        .fetch_one(&self.pool)
        .await?;
        Ok(price)
    }
}

/// In-memory user store for tests.
pub struct MockUserStore {
    users: std::sync::Mutex<Vec<User>>,
    next_id: std::sync::atomic::AtomicI64,
}

impl Default for MockUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUserStore {
    pub fn new() -> Self {
        Self {
            users: std::sync::Mutex::new(Vec::new()),
            next_id: std::sync::atomic::AtomicI64::new(1),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<User>>, anyhow::Error> {
        self.users
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock user store mutex poisoned: {}", e))
    }
}

#[async_trait]
impl UserStore for MockUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, anyhow::Error> {
        Ok(self.lock()?.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        Ok(self.lock()?.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self, email: Option<&str>) -> Result<Vec<User>, anyhow::Error> {
        Ok(self
            .lock()?
            .iter()
            .filter(|u| email.map_or(true, |e| u.email == e))
            .cloned()
            .collect())
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<User, anyhow::Error> {
        let id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let user = User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            admin: true,
            created_utc: Utc::now(),
        };
        self.lock()?.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, anyhow::Error> {
        let mut users = self.lock()?;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i64) -> Result<Option<User>, anyhow::Error> {
        let mut users = self.lock()?;
        let Some(pos) = users.iter().position(|u| u.id == id) else {
            return Ok(None);
        };
        Ok(Some(users.remove(pos)))
    }
}

/// In-memory report store for tests. Mirrors the SQL estimate semantics.
pub struct MockReportStore {
    reports: std::sync::Mutex<Vec<Report>>,
    next_id: std::sync::atomic::AtomicI64,
}

impl Default for MockReportStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockReportStore {
    pub fn new() -> Self {
        Self {
            reports: std::sync::Mutex::new(Vec::new()),
            next_id: std::sync::atomic::AtomicI64::new(1),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Report>>, anyhow::Error> {
        self.reports
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock report store mutex poisoned: {}", e))
    }
}

#[async_trait]
impl ReportStore for MockReportStore {
    async fn create(
        &self,
        user_id: i64,
        req: &CreateReportRequest,
    ) -> Result<Report, anyhow::Error> {
        let id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let report = Report {
            id,
            user_id,
            make: req.make.clone(),
            model: req.model.clone(),
            year: req.year,
            mileage: req.mileage,
            lng: req.lng,
            lat: req.lat,
            price: req.price,
            approved: false,
            created_utc: Utc::now(),
        };
        self.lock()?.push(report.clone());
        Ok(report)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Report>, anyhow::Error> {
        Ok(self.lock()?.iter().find(|r| r.id == id).cloned())
    }

    async fn set_approved(
        &self,
        id: i64,
        approved: bool,
    ) -> Result<Option<Report>, anyhow::Error> {
        let mut reports = self.lock()?;
        let Some(report) = reports.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        report.approved = approved;
        Ok(Some(report.clone()))
    }

    async fn estimate(&self, query: &EstimateQuery) -> Result<Option<f64>, anyhow::Error> {
        let mut matching: Vec<&Report> = Vec::new();
        let reports = self.lock()?;
        for report in reports.iter() {
            if report.approved
                && report.make == query.make
                && report.model == query.model
                && (report.year - query.year).abs() <= 3
                && (report.lng - query.lng).abs() <= 5.0
                && (report.lat - query.lat).abs() <= 5.0
            {
                matching.push(report);
            }
        }
        matching.sort_by_key(|r| (r.mileage - query.mileage).abs());
        matching.truncate(3);
        if matching.is_empty() {
            return Ok(None);
        }
        let sum: f64 = matching.iter().map(|r| r.price).sum();
        Ok(Some(sum / matching.len() as f64))
    }
}
