mod capture;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::{
    api::OrdersClient,
    data::CartItem,
    report::{Operation, ResultReporter, report_failure},
};
use capture::{CaptureOutcome, classify, creation_error};

/// Data the SDK hands to the approval hook.
#[derive(Debug, Clone, Default)]
pub struct ApproveData {
    pub order_id: String,
    /// Present when the card fields component submitted the payment.
    pub card: Option<Value>,
}

/// Restart capability offered by the buttons component.
pub trait OrderActions: Send + Sync {
    fn restart(&self);
}

/// Bridges the SDK's `createOrder` / `onApprove` hooks to the backend.
pub struct OrderBridge {
    orders: OrdersClient,
    cart: Vec<CartItem>,
    reporter: Arc<dyn ResultReporter>,
    creating: AtomicBool,
}

impl OrderBridge {
    pub fn new(orders: OrdersClient, cart: Vec<CartItem>, reporter: Arc<dyn ResultReporter>) -> Self {
        OrderBridge {
            orders,
            cart,
            reporter,
            creating: AtomicBool::new(false),
        }
    }

    /// `createOrder` hook. `None` tells the SDK that creation failed.
    pub async fn create_order(&self) -> Option<String> {
        let Some(_guard) = InFlight::acquire(&self.creating) else {
            tracing::warn!("order creation already in flight");
            return None;
        };

        match self.try_create().await {
            Ok(id) => Some(id),
            Err(err) => {
                report_failure(self.reporter.as_ref(), Operation::CreateOrder, &err);
                None
            }
        }
    }

    #[tracing::instrument(skip_all)]
    async fn try_create(&self) -> Result<String> {
        let reply = self.orders.create(&self.cart).await?;

        match reply.body.order_id() {
            Some(id) => {
                tracing::info!(order_id = id, "order_created");
                Ok(id.to_string())
            }
            None => Err(creation_error(&reply)),
        }
    }

    /// `onApprove` hook.
    pub async fn on_approve(&self, data: &ApproveData, actions: Option<&dyn OrderActions>) {
        if let Err(err) = self.try_capture(data, actions).await {
            report_failure(self.reporter.as_ref(), Operation::CaptureOrder, &err);
        }
    }

    #[tracing::instrument(skip_all, fields(order_id = %data.order_id))]
    async fn try_capture(&self, data: &ApproveData, actions: Option<&dyn OrderActions>) -> Result<()> {
        let reply = self.orders.capture(&data.order_id).await?;

        match classify(&reply, data.card.is_some(), actions.is_some()) {
            CaptureOutcome::Restart => {
                tracing::info!("instrument_declined_restart");

                if let Some(actions) = actions {
                    actions.restart();
                }
            }
            CaptureOutcome::Failed(message) => return Err(anyhow::anyhow!(message)),
            CaptureOutcome::Completed(summary) => {
                self.reporter
                    .report(&format!("{summary}<br><br>See console for all available details"));

                let details = serde_json::to_string_pretty(&reply.raw).context("capture result")?;
                tracing::info!(%details, "capture_result");
            }
        }

        Ok(())
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        match flag.swap(true, Ordering::AcqRel) {
            true => None,
            false => Some(InFlight(flag)),
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::AtomicUsize,
        time::Duration,
    };

    use axum::{Json, Router, extract::Path, routing};
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;
    use crate::{api::testing::serve, report::testing::Recorder};

    #[derive(Default)]
    struct CountRestarts(AtomicUsize);

    impl OrderActions for CountRestarts {
        fn restart(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn bridge(base_url: &str) -> (OrderBridge, Arc<Recorder>) {
        bridge_with_timeout(base_url, Duration::from_secs(2))
    }

    fn bridge_with_timeout(base_url: &str, timeout: Duration) -> (OrderBridge, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let orders = OrdersClient::new(base_url, timeout).expect("client");
        let cart = vec!["SKU-1:2".parse().expect("item")];

        (OrderBridge::new(orders, cart, recorder.clone()), recorder)
    }

    fn create_replies(body: Value) -> Router {
        Router::new().route(
            "/api/orders",
            routing::post(move |Json(req): Json<Value>| {
                let body = body.clone();
                async move {
                    assert_eq!(req, json!({ "cart": [{ "id": "SKU-1", "quantity": "2" }] }));
                    Json(body)
                }
            }),
        )
    }

    fn capture_replies(body: Value) -> Router {
        Router::new().route(
            "/api/orders/{id}/capture",
            routing::post(move |Path(id): Path<String>| {
                let body = body.clone();
                async move {
                    assert_eq!(id, "O1");
                    Json(body)
                }
            }),
        )
    }

    fn approve() -> ApproveData {
        ApproveData {
            order_id: "O1".into(),
            card: None,
        }
    }

    #[tokio::test]
    async fn create_returns_order_id() {
        let url = serve(create_replies(json!({ "id": "O1", "status": "CREATED" }))).await;
        let (bridge, recorder) = bridge(&url);

        assert_eq!(bridge.create_order().await.as_deref(), Some("O1"));
        assert!(recorder.messages().is_empty());
    }

    #[tokio::test]
    async fn create_reports_error_detail() {
        let url = serve(create_replies(json!({
            "details": [{ "issue": "X", "description": "Y" }],
            "debug_id": "D"
        })))
        .await;
        let (bridge, recorder) = bridge(&url);

        assert_eq!(bridge.create_order().await, None);

        let messages = recorder.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with(Operation::CreateOrder.prefix()));
        assert!(messages[0].contains("X Y (D)"));
    }

    #[tokio::test]
    async fn create_transport_failure_reports_once() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let url = format!("http://{}", listener.local_addr().expect("addr"));
        drop(listener);

        let (bridge, recorder) = bridge(&url);

        assert_eq!(bridge.create_order().await, None);

        let messages = recorder.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with(Operation::CreateOrder.prefix()));
    }

    #[tokio::test]
    async fn create_times_out_on_hung_backend() {
        let app = Router::new().route(
            "/api/orders",
            routing::post(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Json(json!({ "id": "O1" }))
            }),
        );
        let url = serve(app).await;
        let (bridge, recorder) = bridge_with_timeout(&url, Duration::from_millis(300));

        let started = std::time::Instant::now();
        assert_eq!(bridge.create_order().await, None);
        assert!(started.elapsed() < Duration::from_secs(5));

        let messages = recorder.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with(Operation::CreateOrder.prefix()));
    }

    #[tokio::test]
    async fn create_rejects_overlapping_request() {
        let app = Router::new().route(
            "/api/orders",
            routing::post(|| async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Json(json!({ "id": "O1" }))
            }),
        );
        let url = serve(app).await;
        let (bridge, recorder) = bridge(&url);

        let (first, second) = tokio::join!(bridge.create_order(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            bridge.create_order().await
        });

        assert_eq!(first.as_deref(), Some("O1"));
        assert_eq!(second, None);
        assert!(recorder.messages().is_empty());

        assert_eq!(bridge.create_order().await.as_deref(), Some("O1"));
    }

    #[tokio::test]
    async fn capture_completed_reports_success() {
        let url = serve(capture_replies(json!({
            "purchase_units": [{ "payments": { "captures": [{ "id": "T1", "status": "COMPLETED" }] } }]
        })))
        .await;
        let (bridge, recorder) = bridge(&url);
        let restarts = CountRestarts::default();

        bridge.on_approve(&approve(), Some(&restarts)).await;

        assert_eq!(restarts.0.load(Ordering::SeqCst), 0);
        assert_eq!(
            recorder.messages(),
            vec!["Transaction COMPLETED: T1<br><br>See console for all available details"]
        );
    }

    #[tokio::test]
    async fn capture_instrument_declined_restarts() {
        let url = serve(capture_replies(json!({
            "details": [{ "issue": "INSTRUMENT_DECLINED", "description": "declined" }],
            "debug_id": "D"
        })))
        .await;
        let (bridge, recorder) = bridge(&url);
        let restarts = CountRestarts::default();

        bridge.on_approve(&approve(), Some(&restarts)).await;

        assert_eq!(restarts.0.load(Ordering::SeqCst), 1);
        assert!(recorder.messages().is_empty());
    }

    #[tokio::test]
    async fn capture_declined_reports_failure() {
        let url = serve(capture_replies(json!({
            "purchase_units": [{ "payments": { "captures": [{ "id": "T1", "status": "DECLINED" }] } }]
        })))
        .await;
        let (bridge, recorder) = bridge(&url);

        bridge.on_approve(&approve(), None).await;

        let messages = recorder.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with(Operation::CaptureOrder.prefix()));
        assert!(messages[0].contains("Transaction DECLINED: T1"));
    }

    #[tokio::test]
    async fn capture_invalid_body_reports_once() {
        let app = Router::new().route("/api/orders/{id}/capture", routing::post(|| async { "<html>" }));
        let url = serve(app).await;
        let (bridge, recorder) = bridge(&url);

        bridge.on_approve(&approve(), None).await;

        let messages = recorder.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with(Operation::CaptureOrder.prefix()));
    }
}
