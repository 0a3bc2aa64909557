//! Rating Repository

use shared::models::Rating;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoResult};

#[derive(Clone)]
pub struct RatingRepository {
    base: BaseRepository,
}

impl RatingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, rating: Rating) -> RepoResult<Rating> {
        self.base
            .db()
            .query("CREATE rating CONTENT $rating RETURN NONE")
            .bind(("rating", rating.clone()))
            .await?
            .check()?;
        Ok(rating)
    }

    /// Ratings of one product, newest first
    pub async fn find_by_product(&self, product_id: i64) -> RepoResult<Vec<Rating>> {
        let ratings: Vec<Rating> = self
            .base
            .db()
            .query(
                "SELECT * OMIT id FROM rating WHERE product_id = $product_id \
                 ORDER BY created_at DESC",
            )
            .bind(("product_id", product_id))
            .await?
            .take(0)?;
        Ok(ratings)
    }
}
