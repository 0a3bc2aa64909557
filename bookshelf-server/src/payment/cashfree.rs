//! Cashfree payment links via REST API (no SDK dependency)

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{LinkStatus, PaymentError, PaymentGateway, PaymentLink, PaymentLinkRequest};

const API_VERSION: &str = "2022-09-01";
const CURRENCY: &str = "INR";
const LINK_PURPOSE: &str = "Payment for services";
const PLACEHOLDER_NAME: &str = "Test User";
const PLACEHOLDER_EMAIL: &str = "test@example.com";

#[derive(Debug, Serialize)]
struct CreateLinkBody<'a> {
    link_id: &'a str,
    link_amount: f64,
    link_currency: &'a str,
    link_purpose: &'a str,
    customer_details: CustomerDetails<'a>,
    link_notify: LinkNotify,
    link_auto_reminders: bool,
}

#[derive(Debug, Serialize)]
struct CustomerDetails<'a> {
    customer_id: &'a str,
    customer_phone: &'a str,
    customer_name: &'a str,
    customer_email: &'a str,
}

#[derive(Debug, Serialize)]
struct LinkNotify {
    send_email: bool,
    send_sms: bool,
}

#[derive(Debug, Default, Deserialize)]
struct LinkResponse {
    link_url: Option<String>,
    link_status: Option<String>,
    payment_method: Option<String>,
    #[serde(alias = "link_amount_paid")]
    amount_paid: Option<f64>,
    transaction_id: Option<String>,
    customer_email: Option<String>,
}

#[derive(Clone)]
pub struct CashfreeClient {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
    secret: String,
}

impl CashfreeClient {
    pub fn new(
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            app_id: app_id.into(),
            secret: secret.into(),
        }
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("x-api-version", API_VERSION)
            .header("x-client-id", &self.app_id)
            .header("x-client-secret", &self.secret)
    }

    async fn read(resp: reqwest::Response, link_id: &str) -> Result<LinkResponse, PaymentError> {
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PaymentError::LinkNotFound(link_id.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PaymentError::Gateway {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl PaymentGateway for CashfreeClient {
    async fn create_link(&self, request: &PaymentLinkRequest) -> Result<PaymentLink, PaymentError> {
        let body = CreateLinkBody {
            link_id: &request.link_id,
            link_amount: request.amount,
            link_currency: CURRENCY,
            link_purpose: LINK_PURPOSE,
            customer_details: CustomerDetails {
                customer_id: &request.customer_ref,
                customer_phone: &request.customer_phone,
                customer_name: PLACEHOLDER_NAME,
                customer_email: PLACEHOLDER_EMAIL,
            },
            link_notify: LinkNotify {
                send_email: false,
                send_sms: true,
            },
            link_auto_reminders: true,
        };

        let resp = self
            .authorized(self.http.post(format!("{}/links", self.base_url)))
            .json(&body)
            .send()
            .await?;
        let link = Self::read(resp, &request.link_id).await?;

        tracing::info!(link_id = %request.link_id, "Payment link created");
        Ok(PaymentLink {
            order_id: request.link_id.clone(),
            payment_link: link.link_url,
        })
    }

    async fn link_status(&self, link_id: &str) -> Result<LinkStatus, PaymentError> {
        let resp = self
            .authorized(self.http.get(format!("{}/links/{link_id}", self.base_url)))
            .send()
            .await?;
        let link = Self::read(resp, link_id).await?;

        Ok(LinkStatus {
            link_id: link_id.to_string(),
            status: link.link_status.unwrap_or_default(),
            payment_method: link.payment_method.unwrap_or_else(|| "N/A".to_string()),
            amount_paid: link.amount_paid.unwrap_or(0.0),
            transaction_id: link.transaction_id,
            customer_email: link.customer_email,
        })
    }
}
