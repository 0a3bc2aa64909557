//! Rating Model

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub product_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub stars: u8,
    pub created_at: i64,
}

/// Create rating payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RatingCreate {
    pub product_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub user_name: String,
    #[validate(email)]
    pub user_email: String,
    #[validate(range(min = 1, max = 5))]
    pub stars: u8,
}

/// Running average after adding one more rating
pub fn next_average(avg: f64, count: i64, stars: u8) -> (f64, i64) {
    let n = count + 1;
    ((avg * count as f64 + f64::from(stars)) / n as f64, n)
}
