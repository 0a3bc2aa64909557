//! Product Repository

use async_trait::async_trait;
use shared::models::{Product, ProductCreate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::orders::traits::{ProductCatalog, StockChange, StockWrite};

const TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Whole catalog ordered by product id
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * OMIT id FROM product ORDER BY product_id")
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn find_by_product_id(&self, product_id: i64) -> RepoResult<Option<Product>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * OMIT id FROM product WHERE product_id = $product_id LIMIT 1")
            .bind(("product_id", product_id))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Create a product; `product_id` must be unused
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        if self.find_by_product_id(data.product_id).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Product {} already exists",
                data.product_id
            )));
        }

        let product = Product::from(data);
        self.base
            .db()
            .query("CREATE type::table($table) CONTENT $product RETURN NONE")
            .bind(("table", TABLE))
            .bind(("product", product.clone()))
            .await?
            .check()?;
        Ok(product)
    }

    /// Store a new running rating average
    pub async fn update_rating(
        &self,
        product_id: i64,
        avg_star_rating: f64,
        num_of_ratings: i64,
    ) -> RepoResult<()> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE product SET avg_star_rating = $avg, num_of_ratings = $count \
                 WHERE product_id = $product_id RETURN VALUE product_id",
            )
            .bind(("avg", avg_star_rating))
            .bind(("count", num_of_ratings))
            .bind(("product_id", product_id))
            .await?;
        let updated: Vec<i64> = result.take(0)?;
        if updated.is_empty() {
            return Err(RepoError::NotFound(format!("Product {product_id} not found")));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductCatalog for ProductRepository {
    async fn get_products_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * OMIT id FROM product WHERE product_id IN $ids")
            .bind(("ids", ids.to_vec()))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// One conditional UPDATE statement per change, sent as a single
    /// (non-transactional) query; statement `i` answers change `i`.
    async fn apply_stock_changes(&self, changes: &[StockChange]) -> RepoResult<Vec<StockWrite>> {
        if changes.is_empty() {
            return Ok(Vec::new());
        }

        let sql: String = (0..changes.len())
            .map(|i| {
                format!(
                    "UPDATE product SET available_count = $count{i}, is_available = $available{i} \
                     WHERE product_id = $id{i} AND available_count = $expected{i} \
                     RETURN VALUE product_id;"
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut query = self.base.db().query(sql);
        for (i, change) in changes.iter().enumerate() {
            query = query
                .bind((format!("id{i}"), change.product_id))
                .bind((format!("expected{i}"), change.expected))
                .bind((format!("count{i}"), change.available_count))
                .bind((format!("available{i}"), change.is_available));
        }

        let mut response = query.await?;
        let mut results = Vec::with_capacity(changes.len());
        for i in 0..changes.len() {
            let updated: Vec<i64> = response.take(i)?;
            results.push(if updated.is_empty() {
                StockWrite::Conflict
            } else {
                StockWrite::Applied
            });
        }
        Ok(results)
    }
}
