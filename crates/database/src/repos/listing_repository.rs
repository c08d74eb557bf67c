//! Listing repository for database operations.

use crate::entities::{Listing, ListingStats, ListingStatus, NewListing, PropertyType};
use crate::repos::{new_public_id, timestamp};
use crate::types::{ListingError, ListingResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

const LISTING_COLUMNS: &str = "public_id, title, description, price, neighborhood, city, address, \
     bedrooms, bathrooms, suites, closets, garage_spaces, area, property_type, status, featured, \
     images, features, created_at, updated_at";

/// Marks a listing as featured only while fewer than `limit` listings carry
/// the flag. Re-featuring an already featured listing always matches.
const GUARDED_FEATURE_SQL: &str = "UPDATE listings SET featured = 1, updated_at = ? \
     WHERE public_id = ? \
       AND (featured = 1 OR (SELECT COUNT(*) FROM listings WHERE featured = 1) < ?)";

/// Repository for listing database operations
#[derive(Clone)]
pub struct ListingRepository {
    pool: SqlitePool,
}

impl ListingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All listings, newest first.
    pub async fn list_all(&self) -> ListingResult<Vec<Listing>> {
        let rows = sqlx::query(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_listing).collect()
    }

    /// Featured listings, newest first, at most `limit` of them.
    pub async fn list_featured(&self, limit: usize) -> ListingResult<Vec<Listing>> {
        let rows = sqlx::query(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE featured = 1 \
             ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(clamp_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_listing).collect()
    }

    /// The `limit` most recently created listings.
    pub async fn list_recent(&self, limit: usize) -> ListingResult<Vec<Listing>> {
        let rows = sqlx::query(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(clamp_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_listing).collect()
    }

    pub async fn find_by_public_id(&self, public_id: &str) -> ListingResult<Option<Listing>> {
        let row = sqlx::query(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_listing).transpose()
    }

    /// Insert a listing. A featured listing is rejected when `featured_limit`
    /// listings are already featured, and nothing is written.
    pub async fn create(&self, listing: &NewListing, featured_limit: usize) -> ListingResult<Listing> {
        let now = timestamp();
        let public_id = new_public_id();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO listings (public_id, title, description, price, neighborhood, city, address, \
             bedrooms, bathrooms, suites, closets, garage_spaces, area, property_type, status, featured, \
             images, features, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(&listing.neighborhood)
        .bind(&listing.city)
        .bind(&listing.address)
        .bind(listing.bedrooms)
        .bind(listing.bathrooms)
        .bind(listing.suites)
        .bind(listing.closets)
        .bind(listing.garage_spaces)
        .bind(listing.area)
        .bind(listing.property_type.as_str())
        .bind(listing.status.as_str())
        .bind(serde_json::to_string(&listing.images)?)
        .bind(serde_json::to_string(&listing.features)?)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        if listing.featured {
            feature_guarded(&mut tx, &public_id, featured_limit).await?;
        }

        let created = fetch_in_tx(&mut tx, &public_id).await?;
        tx.commit().await?;

        info!(listing = %public_id, featured = listing.featured, "created listing");
        Ok(created)
    }

    /// Replace every editable field of a listing.
    pub async fn update(
        &self,
        public_id: &str,
        listing: &NewListing,
        featured_limit: usize,
    ) -> ListingResult<Listing> {
        let now = timestamp();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE listings SET title = ?, description = ?, price = ?, neighborhood = ?, city = ?, \
             address = ?, bedrooms = ?, bathrooms = ?, suites = ?, closets = ?, garage_spaces = ?, \
             area = ?, property_type = ?, status = ?, images = ?, features = ?, updated_at = ? \
             WHERE public_id = ?",
        )
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(&listing.neighborhood)
        .bind(&listing.city)
        .bind(&listing.address)
        .bind(listing.bedrooms)
        .bind(listing.bathrooms)
        .bind(listing.suites)
        .bind(listing.closets)
        .bind(listing.garage_spaces)
        .bind(listing.area)
        .bind(listing.property_type.as_str())
        .bind(listing.status.as_str())
        .bind(serde_json::to_string(&listing.images)?)
        .bind(serde_json::to_string(&listing.features)?)
        .bind(&now)
        .bind(public_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ListingError::ListingNotFound);
        }

        if listing.featured {
            feature_guarded(&mut tx, public_id, featured_limit).await?;
        } else {
            sqlx::query("UPDATE listings SET featured = 0 WHERE public_id = ?")
                .bind(public_id)
                .execute(&mut *tx)
                .await?;
        }

        let updated = fetch_in_tx(&mut tx, public_id).await?;
        tx.commit().await?;

        info!(listing = %public_id, "updated listing");
        Ok(updated)
    }

    pub async fn delete(&self, public_id: &str) -> ListingResult<()> {
        let result = sqlx::query("DELETE FROM listings WHERE public_id = ?")
            .bind(public_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ListingError::ListingNotFound);
        }

        info!(listing = %public_id, "deleted listing");
        Ok(())
    }

    pub async fn set_status(&self, public_id: &str, status: ListingStatus) -> ListingResult<Listing> {
        let result = sqlx::query("UPDATE listings SET status = ?, updated_at = ? WHERE public_id = ?")
            .bind(status.as_str())
            .bind(timestamp())
            .bind(public_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ListingError::ListingNotFound);
        }

        debug!(listing = %public_id, status = %status, "changed listing status");
        self.find_by_public_id(public_id)
            .await?
            .ok_or(ListingError::ListingNotFound)
    }

    /// Set or clear the featured flag. Setting it is a single conditional
    /// statement, so concurrent callers cannot push the count past `limit`.
    pub async fn set_featured(
        &self,
        public_id: &str,
        featured: bool,
        limit: usize,
    ) -> ListingResult<Listing> {
        let mut tx = self.pool.begin().await?;

        if featured {
            feature_guarded(&mut tx, public_id, limit).await?;
        } else {
            let result =
                sqlx::query("UPDATE listings SET featured = 0, updated_at = ? WHERE public_id = ?")
                    .bind(timestamp())
                    .bind(public_id)
                    .execute(&mut *tx)
                    .await?;
            if result.rows_affected() == 0 {
                return Err(ListingError::ListingNotFound);
            }
        }

        let listing = fetch_in_tx(&mut tx, public_id).await?;
        tx.commit().await?;

        debug!(listing = %public_id, featured, "changed featured flag");
        Ok(listing)
    }

    pub async fn count_featured(&self) -> ListingResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM listings WHERE featured = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    pub async fn stats(&self) -> ListingResult<ListingStats> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, \
             COALESCE(SUM(CASE WHEN status = 'disponivel' THEN 1 ELSE 0 END), 0) AS available, \
             COALESCE(SUM(CASE WHEN status = 'indisponivel' THEN 1 ELSE 0 END), 0) AS unavailable, \
             COALESCE(SUM(CASE WHEN status = 'vendido' THEN 1 ELSE 0 END), 0) AS sold, \
             COALESCE(SUM(CASE WHEN status = 'alugado' THEN 1 ELSE 0 END), 0) AS rented, \
             COALESCE(SUM(CASE WHEN featured = 1 THEN 1 ELSE 0 END), 0) AS featured \
             FROM listings",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(ListingStats {
            total: row.try_get("total")?,
            available: row.try_get("available")?,
            unavailable: row.try_get("unavailable")?,
            sold: row.try_get("sold")?,
            rented: row.try_get("rented")?,
            featured: row.try_get("featured")?,
        })
    }
}

async fn feature_guarded(
    tx: &mut Transaction<'_, Sqlite>,
    public_id: &str,
    limit: usize,
) -> ListingResult<()> {
    let result = sqlx::query(GUARDED_FEATURE_SQL)
        .bind(timestamp())
        .bind(public_id)
        .bind(clamp_limit(limit))
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() > 0 {
        return Ok(());
    }

    let exists = sqlx::query("SELECT 1 FROM listings WHERE public_id = ?")
        .bind(public_id)
        .fetch_optional(&mut **tx)
        .await?;

    match exists {
        Some(_) => Err(ListingError::FeaturedLimitReached { limit }),
        None => Err(ListingError::ListingNotFound),
    }
}

async fn fetch_in_tx(tx: &mut Transaction<'_, Sqlite>, public_id: &str) -> ListingResult<Listing> {
    let row = sqlx::query(&format!(
        "SELECT {LISTING_COLUMNS} FROM listings WHERE public_id = ?"
    ))
    .bind(public_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(ListingError::ListingNotFound)?;

    map_listing(&row)
}

fn clamp_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn map_listing(row: &SqliteRow) -> ListingResult<Listing> {
    let property_type: String = row.try_get("property_type")?;
    let status: String = row.try_get("status")?;
    let images: String = row.try_get("images")?;
    let features: String = row.try_get("features")?;

    Ok(Listing {
        id: row.try_get("public_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        neighborhood: row.try_get("neighborhood")?,
        city: row.try_get("city")?,
        address: row.try_get("address")?,
        bedrooms: row.try_get("bedrooms")?,
        bathrooms: row.try_get("bathrooms")?,
        suites: row.try_get("suites")?,
        closets: row.try_get("closets")?,
        garage_spaces: row.try_get("garage_spaces")?,
        area: row.try_get("area")?,
        property_type: PropertyType::parse(&property_type).ok_or_else(|| {
            ListingError::CorruptRow(format!("unknown property type {property_type}"))
        })?,
        status: ListingStatus::parse(&status)
            .ok_or_else(|| ListingError::CorruptRow(format!("unknown status {status}")))?,
        featured: row.try_get("featured")?,
        images: serde_json::from_str(&images)?,
        features: serde_json::from_str(&features)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_pool, test_pool_with_connections};

    fn sample(title: &str, featured: bool) -> NewListing {
        NewListing {
            title: title.to_string(),
            description: "Casa ampla com quintal".to_string(),
            price: Some(450_000.0),
            neighborhood: "Jóquei".to_string(),
            city: "Teresina".to_string(),
            address: Some("Rua das Palmeiras, 100".to_string()),
            bedrooms: 3,
            bathrooms: 2,
            suites: 1,
            closets: 0,
            garage_spaces: 2,
            area: Some(180.0),
            property_type: PropertyType::House,
            status: ListingStatus::Available,
            featured,
            images: vec!["https://i.ibb.co/cover.jpg".to_string()],
            features: vec!["Piscina".to_string()],
        }
    }

    #[tokio::test]
    async fn create_and_find_round_trips_fields() {
        let (pool, _dir) = test_pool().await;
        let repo = ListingRepository::new(pool);

        let created = repo.create(&sample("Casa no Jóquei", false), 5).await.unwrap();
        let found = repo.find_by_public_id(&created.id).await.unwrap().unwrap();

        assert_eq!(found, created);
        assert_eq!(found.images, vec!["https://i.ibb.co/cover.jpg".to_string()]);
        assert_eq!(found.property_type, PropertyType::House);
        assert!(!found.featured);
    }

    #[tokio::test]
    async fn set_featured_rejects_past_limit_without_changes() {
        let (pool, _dir) = test_pool().await;
        let repo = ListingRepository::new(pool);

        let mut ids = Vec::new();
        for index in 0..3 {
            let listing = repo.create(&sample(&format!("Imóvel {index}"), false), 2).await.unwrap();
            ids.push(listing.id);
        }

        repo.set_featured(&ids[0], true, 2).await.unwrap();
        repo.set_featured(&ids[1], true, 2).await.unwrap();

        let error = repo.set_featured(&ids[2], true, 2).await.unwrap_err();
        assert!(matches!(error, ListingError::FeaturedLimitReached { limit: 2 }));
        assert_eq!(repo.count_featured().await.unwrap(), 2);
        assert!(!repo.find_by_public_id(&ids[2]).await.unwrap().unwrap().featured);

        // Re-featuring an already featured listing is idempotent.
        repo.set_featured(&ids[0], true, 2).await.unwrap();

        repo.set_featured(&ids[0], false, 2).await.unwrap();
        repo.set_featured(&ids[2], true, 2).await.unwrap();
        assert_eq!(repo.count_featured().await.unwrap(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_featuring_never_exceeds_limit() {
        let (pool, _dir) = test_pool_with_connections(8).await;
        let repo = ListingRepository::new(pool);

        let mut ids = Vec::new();
        for index in 0..12 {
            let listing = repo.create(&sample(&format!("Imóvel {index}"), false), 5).await.unwrap();
            ids.push(listing.id);
        }

        let tasks: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.set_featured(&id, true, 5).await })
            })
            .collect();

        let mut featured = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(listing) => {
                    assert!(listing.featured);
                    featured += 1;
                }
                Err(error) => {
                    assert!(
                        matches!(error, ListingError::FeaturedLimitReached { limit: 5 }),
                        "unexpected error: {error:?}"
                    );
                }
            }
        }

        assert_eq!(featured, 5);
        assert_eq!(repo.count_featured().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn create_featured_at_limit_writes_nothing() {
        let (pool, _dir) = test_pool().await;
        let repo = ListingRepository::new(pool);

        repo.create(&sample("Destaque", true), 1).await.unwrap();
        let error = repo.create(&sample("Outro destaque", true), 1).await.unwrap_err();

        assert!(matches!(error, ListingError::FeaturedLimitReached { .. }));
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_listing_is_not_found() {
        let (pool, _dir) = test_pool().await;
        let repo = ListingRepository::new(pool);

        assert!(matches!(
            repo.set_featured("missing", true, 5).await,
            Err(ListingError::ListingNotFound)
        ));
        assert!(matches!(
            repo.set_status("missing", ListingStatus::Sold).await,
            Err(ListingError::ListingNotFound)
        ));
        assert!(matches!(repo.delete("missing").await, Err(ListingError::ListingNotFound)));
    }

    #[tokio::test]
    async fn stats_count_each_status() {
        let (pool, _dir) = test_pool().await;
        let repo = ListingRepository::new(pool);

        let sold = repo.create(&sample("Vendido", false), 5).await.unwrap();
        repo.create(&sample("Disponível", true), 5).await.unwrap();
        repo.set_status(&sold.id, ListingStatus::Sold).await.unwrap();

        let stats = repo.stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.available, 1);
        assert_eq!(stats.sold, 1);
        assert_eq!(stats.rented, 0);
        assert_eq!(stats.featured, 1);
    }

    #[tokio::test]
    async fn update_replaces_fields_and_clears_featured() {
        let (pool, _dir) = test_pool().await;
        let repo = ListingRepository::new(pool);

        let created = repo.create(&sample("Antigo", true), 5).await.unwrap();
        let mut changes = sample("Novo título", false);
        changes.price = None;
        changes.features = vec![];

        let updated = repo.update(&created.id, &changes, 5).await.unwrap();
        assert_eq!(updated.title, "Novo título");
        assert_eq!(updated.price, None);
        assert!(!updated.featured);
        assert_eq!(updated.created_at, created.created_at);
    }
}
