//! Product Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stock assigned to a new product when none is given
pub const DEFAULT_AVAILABLE_COUNT: i32 = 2;

/// Book in the catalog
///
/// `product_id` is the catalog key carts and orders refer to. It is distinct
/// from the database record id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub category: String,
    /// Price in currency unit (INR)
    pub price: f64,
    pub published_year: i32,
    pub language: String,
    pub image_link: String,
    pub pdf_link: String,
    pub description: String,
    #[serde(default)]
    pub avg_star_rating: f64,
    #[serde(default)]
    pub num_of_ratings: i64,
    /// Always equals `available_count > 0` after an order is placed
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default = "default_available_count")]
    pub available_count: i32,
}

fn default_true() -> bool {
    true
}

fn default_available_count() -> i32 {
    DEFAULT_AVAILABLE_COUNT
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(range(min = 1))]
    pub product_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 200))]
    pub author: String,
    #[validate(length(max = 100))]
    pub genre: String,
    #[validate(length(max = 100))]
    pub category: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub published_year: i32,
    #[validate(length(max = 100))]
    pub language: String,
    #[validate(length(max = 2048))]
    pub image_link: String,
    #[validate(length(max = 2048))]
    pub pdf_link: String,
    #[validate(length(max = 5000))]
    pub description: String,
    #[validate(range(min = 0))]
    pub available_count: Option<i32>,
}

impl From<ProductCreate> for Product {
    fn from(data: ProductCreate) -> Self {
        let available_count = data.available_count.unwrap_or(DEFAULT_AVAILABLE_COUNT);
        Self {
            product_id: data.product_id,
            title: data.title,
            author: data.author,
            genre: data.genre,
            category: data.category,
            price: data.price,
            published_year: data.published_year,
            language: data.language,
            image_link: data.image_link,
            pdf_link: data.pdf_link,
            description: data.description,
            avg_star_rating: 0.0,
            num_of_ratings: 0,
            is_available: available_count > 0,
            available_count,
        }
    }
}
