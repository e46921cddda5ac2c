pub mod order;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde_json::Value;

use crate::data::{CartItem, CreateOrderRequest};
use order::{CaptureResponse, OrderResponse, Reply};

/// HTTP client for the backend order endpoints.
#[derive(Clone)]
pub struct OrdersClient {
    client: Client,
    base_url: String,
}

impl OrdersClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building http client")?;

        Ok(OrdersClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[tracing::instrument(skip_all)]
    pub async fn create(&self, cart: &[CartItem]) -> Result<Reply<OrderResponse>> {
        let res = self
            .client
            .post(format!("{}/api/orders", self.base_url))
            .json(&CreateOrderRequest { cart })
            .send()
            .await?;

        Reply::parse(read_json(res).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn capture(&self, order_id: &str) -> Result<Reply<CaptureResponse>> {
        let res = self
            .client
            .post(format!("{}/api/orders/{order_id}/capture", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        Reply::parse(read_json(res).await?)
    }
}

/// Error shapes come back with non-2xx statuses, so the body is read regardless of status.
async fn read_json(res: Response) -> Result<Value> {
    let status = res.status();

    tracing::debug!(orders_status = ?status);

    let body = res.bytes().await?;

    serde_json::from_slice(&body).with_context(|| format!("invalid JSON body ({status})"))
}
