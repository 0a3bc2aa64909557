//! Shared fixtures: a temporary RocksDB-backed state with a scripted
//! payment provider and a mailer that keeps the codes it was handed.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use bookshelf_server::api::build_app;
use bookshelf_server::core::{Config, ServerState};
use bookshelf_server::db::DbService;
use bookshelf_server::payment::{
    LinkStatus, PaymentError, PaymentGateway, PaymentLink, PaymentLinkRequest,
};
use bookshelf_server::services::OtpMailer;
use bookshelf_server::utils::AppResult;
use http::{Request, Response, StatusCode};
use serde_json::Value;
use shared::models::{Product, ProductCreate};
use tempfile::TempDir;
use tower::Service;

/// Provider whose link status is set by the test
#[derive(Default)]
pub struct ScriptedGateway {
    pub status: Mutex<String>,
    pub created: Mutex<Vec<PaymentLinkRequest>>,
}

impl ScriptedGateway {
    pub fn set_status(&self, status: &str) {
        *self.status.lock().unwrap() = status.to_string();
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn create_link(&self, request: &PaymentLinkRequest) -> Result<PaymentLink, PaymentError> {
        self.created.lock().unwrap().push(request.clone());
        Ok(PaymentLink {
            order_id: request.link_id.clone(),
            payment_link: Some(format!("https://pay.test/{}", request.link_id)),
        })
    }

    async fn link_status(&self, link_id: &str) -> Result<LinkStatus, PaymentError> {
        if link_id == "ORDER_MISSING" {
            return Err(PaymentError::LinkNotFound(link_id.to_string()));
        }
        Ok(LinkStatus {
            link_id: link_id.to_string(),
            status: self.status.lock().unwrap().clone(),
            payment_method: "N/A".into(),
            amount_paid: 0.0,
            transaction_id: None,
            customer_email: None,
        })
    }
}

/// Keeps every delivered code, newest last
#[derive(Default)]
pub struct InboxMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl InboxMailer {
    pub fn last_code(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl OtpMailer for InboxMailer {
    async fn send_code(&self, email: &str, code: &str, _ttl_secs: u64) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

pub struct TestEnv {
    /// Keeps the database directory alive
    pub _dir: TempDir,
    pub state: ServerState,
    pub gateway: Arc<ScriptedGateway>,
    pub mailer: Arc<InboxMailer>,
}

pub async fn setup() -> TestEnv {
    setup_with(|_| {}).await
}

/// Same as [`setup`], with the config adjusted before the state is built
pub async fn setup_with(adjust: impl FnOnce(&mut Config)) -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::with_work_dir(dir.path().to_string_lossy());
    adjust(&mut config);
    config.ensure_work_dir_structure().unwrap();

    let db = DbService::new(
        &config.database_path().to_string_lossy(),
        &config.db_namespace,
        &config.db_database,
    )
    .await
    .unwrap();

    let gateway = Arc::new(ScriptedGateway::default());
    gateway.set_status("ACTIVE");
    let mailer = Arc::new(InboxMailer::default());
    let state = ServerState::from_parts(config, db, gateway.clone(), mailer.clone());

    TestEnv {
        _dir: dir,
        state,
        gateway,
        mailer,
    }
}

pub fn book(product_id: i64, title: &str, price: f64, available_count: i32) -> ProductCreate {
    ProductCreate {
        product_id,
        title: title.into(),
        author: "Unknown".into(),
        genre: "Fiction".into(),
        category: "Novel".into(),
        price,
        published_year: 2001,
        language: "English".into(),
        image_link: String::new(),
        pdf_link: String::new(),
        description: String::new(),
        available_count: Some(available_count),
    }
}

pub async fn seed(state: &ServerState, products: Vec<ProductCreate>) -> Vec<Product> {
    let mut created = Vec::with_capacity(products.len());
    for p in products {
        created.push(state.products.create(p).await.unwrap());
    }
    created
}

pub async fn stock_of(state: &ServerState, product_id: i64) -> (i32, bool) {
    let p = state
        .products
        .find_by_product_id(product_id)
        .await
        .unwrap()
        .unwrap();
    (p.available_count, p.is_available)
}

/// Send one request through the fully layered router
pub async fn call(state: &ServerState, request: Request<Body>) -> (StatusCode, Value) {
    let mut app = build_app(state.clone());
    let response: Response<Body> = app.call(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
