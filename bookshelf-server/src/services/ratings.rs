//! Product ratings
//!
//! Adding a rating updates the product's running average under the product
//! lock, so two concurrent ratings never lose an update. The average is
//! written first and restored if the rating itself cannot be stored.

use std::sync::Arc;

use shared::models::{Rating, RatingCreate, next_average};
use shared::now_millis;

use crate::db::repository::{ProductRepository, RatingRepository};
use crate::orders::OrderLocks;
use crate::utils::validation::validate_payload;
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Clone)]
pub struct RatingService {
    products: ProductRepository,
    ratings: RatingRepository,
    locks: Arc<OrderLocks>,
}

impl RatingService {
    pub fn new(products: ProductRepository, ratings: RatingRepository, locks: Arc<OrderLocks>) -> Self {
        Self {
            products,
            ratings,
            locks,
        }
    }

    pub async fn add_rating(&self, data: RatingCreate) -> AppResult<Rating> {
        if !(1..=5).contains(&data.stars) {
            return Err(AppError::new(ErrorCode::RatingOutOfRange)
                .with_detail("stars", data.stars));
        }
        validate_payload(&data)?;

        let _guard = self.locks.products.lock(&data.product_id).await;

        let product = self
            .products
            .find_by_product_id(data.product_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::ProductNotFound,
                    format!("Book with ID {} not found.", data.product_id),
                )
            })?;

        // 先更新平均分，评分写入失败时回滚
        let (avg, count) = next_average(product.avg_star_rating, product.num_of_ratings, data.stars);
        self.products
            .update_rating(product.product_id, avg, count)
            .await?;

        let created = self
            .ratings
            .create(Rating {
                product_id: data.product_id,
                user_name: data.user_name,
                user_email: data.user_email.trim().to_lowercase(),
                stars: data.stars,
                created_at: now_millis(),
            })
            .await;
        let rating = match created {
            Ok(rating) => rating,
            Err(e) => {
                if let Err(revert) = self
                    .products
                    .update_rating(product.product_id, product.avg_star_rating, product.num_of_ratings)
                    .await
                {
                    tracing::error!(
                        product_id = product.product_id,
                        error = %revert,
                        "Failed to restore rating average"
                    );
                }
                return Err(e.into());
            }
        };

        tracing::info!(product_id = product.product_id, stars = rating.stars, avg, count, "Rating added");
        Ok(rating)
    }

    /// Newest first
    pub async fn ratings_for_product(&self, product_id: i64) -> AppResult<Vec<Rating>> {
        Ok(self.ratings.find_by_product(product_id).await?)
    }
}
