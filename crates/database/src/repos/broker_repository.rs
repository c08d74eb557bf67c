//! Broker profile repository for database operations.

use crate::entities::{BrokerProfile, BrokerProfileUpdate, WeeklySchedule};
use crate::repos::timestamp;
use crate::types::{BrokerError, BrokerResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

const PROFILE_SELECT: &str = "SELECT u.public_id AS public_id, p.user_id, p.name, p.creci, p.phone, \
     p.email, p.photo_url, p.whatsapp, p.facebook_username, p.instagram_username, p.schedule, \
     p.is_public, p.created_at, p.updated_at \
     FROM broker_profiles p JOIN users u ON u.id = p.user_id";

/// Repository for broker profile operations
#[derive(Clone)]
pub struct BrokerRepository {
    pool: SqlitePool,
}

impl BrokerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Profiles shown on public pages, sorted by name.
    pub async fn list_public(&self) -> BrokerResult<Vec<BrokerProfile>> {
        let rows = sqlx::query(&format!(
            "{PROFILE_SELECT} WHERE p.is_public = 1 ORDER BY p.name COLLATE NOCASE, p.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_profile).collect()
    }

    pub async fn list_all(&self) -> BrokerResult<Vec<BrokerProfile>> {
        let rows = sqlx::query(&format!(
            "{PROFILE_SELECT} ORDER BY p.name COLLATE NOCASE, p.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_profile).collect()
    }

    pub async fn find_by_user_id(&self, user_id: i64) -> BrokerResult<Option<BrokerProfile>> {
        let row = sqlx::query(&format!("{PROFILE_SELECT} WHERE p.user_id = ?"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_profile).transpose()
    }

    pub async fn find_by_public_id(&self, public_id: &str) -> BrokerResult<Option<BrokerProfile>> {
        let row = sqlx::query(&format!("{PROFILE_SELECT} WHERE u.public_id = ?"))
            .bind(public_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_profile).transpose()
    }

    /// Create the profile for `user_id`, or overwrite its editable fields.
    pub async fn upsert_for_user(
        &self,
        user_id: i64,
        profile: &BrokerProfileUpdate,
    ) -> BrokerResult<BrokerProfile> {
        let now = timestamp();
        let schedule = serde_json::to_string(&WeeklySchedule::default())?;

        sqlx::query(
            "INSERT INTO broker_profiles (user_id, name, creci, phone, email, photo_url, whatsapp, \
             facebook_username, instagram_username, schedule, is_public, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET name = excluded.name, creci = excluded.creci, \
             phone = excluded.phone, email = excluded.email, photo_url = excluded.photo_url, \
             whatsapp = excluded.whatsapp, facebook_username = excluded.facebook_username, \
             instagram_username = excluded.instagram_username, updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(&profile.name)
        .bind(&profile.creci)
        .bind(&profile.phone)
        .bind(&profile.email)
        .bind(&profile.photo_url)
        .bind(&profile.whatsapp)
        .bind(&profile.facebook_username)
        .bind(&profile.instagram_username)
        .bind(&schedule)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.find_by_user_id(user_id)
            .await?
            .ok_or(BrokerError::ProfileNotFound)
    }

    /// Overwrite the editable fields of an existing profile.
    pub async fn update(
        &self,
        user_id: i64,
        profile: &BrokerProfileUpdate,
    ) -> BrokerResult<BrokerProfile> {
        let result = sqlx::query(
            "UPDATE broker_profiles SET name = ?, creci = ?, phone = ?, email = ?, photo_url = ?, \
             whatsapp = ?, facebook_username = ?, instagram_username = ?, updated_at = ? \
             WHERE user_id = ?",
        )
        .bind(&profile.name)
        .bind(&profile.creci)
        .bind(&profile.phone)
        .bind(&profile.email)
        .bind(&profile.photo_url)
        .bind(&profile.whatsapp)
        .bind(&profile.facebook_username)
        .bind(&profile.instagram_username)
        .bind(timestamp())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(BrokerError::ProfileNotFound);
        }

        info!(user_id, "updated broker profile");
        self.find_by_user_id(user_id)
            .await?
            .ok_or(BrokerError::ProfileNotFound)
    }

    pub async fn set_visibility(&self, user_id: i64, is_public: bool) -> BrokerResult<BrokerProfile> {
        let result =
            sqlx::query("UPDATE broker_profiles SET is_public = ?, updated_at = ? WHERE user_id = ?")
                .bind(is_public)
                .bind(timestamp())
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(BrokerError::ProfileNotFound);
        }

        info!(user_id, is_public, "changed broker profile visibility");
        self.find_by_user_id(user_id)
            .await?
            .ok_or(BrokerError::ProfileNotFound)
    }

    pub async fn update_schedule(
        &self,
        user_id: i64,
        schedule: &WeeklySchedule,
    ) -> BrokerResult<BrokerProfile> {
        let result =
            sqlx::query("UPDATE broker_profiles SET schedule = ?, updated_at = ? WHERE user_id = ?")
                .bind(serde_json::to_string(schedule)?)
                .bind(timestamp())
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(BrokerError::ProfileNotFound);
        }

        self.find_by_user_id(user_id)
            .await?
            .ok_or(BrokerError::ProfileNotFound)
    }
}

fn map_profile(row: &SqliteRow) -> BrokerResult<BrokerProfile> {
    let schedule: String = row.try_get("schedule")?;

    Ok(BrokerProfile {
        id: row.try_get("public_id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        creci: row.try_get("creci")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        photo_url: row.try_get("photo_url")?,
        whatsapp: row.try_get("whatsapp")?,
        facebook_username: row.try_get("facebook_username")?,
        instagram_username: row.try_get("instagram_username")?,
        schedule: serde_json::from_str(&schedule)?,
        is_public: row.try_get("is_public")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::DaySchedule;
    use crate::test_support::{insert_user, test_pool};

    fn profile(name: &str) -> BrokerProfileUpdate {
        BrokerProfileUpdate {
            name: name.to_string(),
            creci: "12345-F".to_string(),
            phone: "86999998888".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn upsert_creates_then_overwrites() {
        let (pool, _dir) = test_pool().await;
        let repo = BrokerRepository::new(pool.clone());
        let (user_id, public_id) = insert_user(&pool, "genilson@example.com").await;

        let created = repo.upsert_for_user(user_id, &profile("Genilson")).await.unwrap();
        assert_eq!(created.id, public_id);
        assert!(created.is_public);
        assert_eq!(created.schedule, WeeklySchedule::default());

        let mut changes = profile("Genilson Rios");
        changes.instagram_username = Some("genilson_corretor".to_string());
        let updated = repo.upsert_for_user(user_id, &changes).await.unwrap();
        assert_eq!(updated.name, "Genilson Rios");
        assert_eq!(updated.instagram_username.as_deref(), Some("genilson_corretor"));
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_public_hides_private_profiles_and_sorts_by_name() {
        let (pool, _dir) = test_pool().await;
        let repo = BrokerRepository::new(pool.clone());

        let (zelia, _) = insert_user(&pool, "zelia@example.com").await;
        let (ana, _) = insert_user(&pool, "ana@example.com").await;
        let (bruno, _) = insert_user(&pool, "bruno@example.com").await;
        repo.upsert_for_user(zelia, &profile("Zélia")).await.unwrap();
        repo.upsert_for_user(ana, &profile("ana")).await.unwrap();
        repo.upsert_for_user(bruno, &profile("Bruno")).await.unwrap();
        repo.set_visibility(bruno, false).await.unwrap();

        let names: Vec<String> = repo
            .list_public()
            .await
            .unwrap()
            .into_iter()
            .map(|profile| profile.name)
            .collect();
        assert_eq!(names, vec!["ana".to_string(), "Zélia".to_string()]);
    }

    #[tokio::test]
    async fn update_schedule_persists_days() {
        let (pool, _dir) = test_pool().await;
        let repo = BrokerRepository::new(pool.clone());
        let (user_id, public_id) = insert_user(&pool, "corretor@example.com").await;
        repo.upsert_for_user(user_id, &profile("Corretor")).await.unwrap();

        let mut schedule = WeeklySchedule::default();
        schedule.sunday = DaySchedule::open("09:00", "12:00");
        repo.update_schedule(user_id, &schedule).await.unwrap();

        let stored = repo.find_by_public_id(&public_id).await.unwrap().unwrap();
        assert_eq!(stored.schedule.sunday, DaySchedule::open("09:00", "12:00"));
    }

    #[tokio::test]
    async fn missing_profile_is_reported() {
        let (pool, _dir) = test_pool().await;
        let repo = BrokerRepository::new(pool);

        assert!(matches!(
            repo.update(42, &profile("Ninguém")).await,
            Err(BrokerError::ProfileNotFound)
        ));
    }
}
