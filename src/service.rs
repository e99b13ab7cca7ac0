//! Booking service: order creation, webhook reconciliation and lookup.
//!
//! [`BookingService`] is what the HTTP layer calls into. It owns the booking
//! store, the gateway and the webhook verifier.
//!
//! # Order creation
//!
//! Validate the form, price it, create the order with the gateway and only
//! then persist the record. Nothing is written when validation or the
//! gateway call fails.
//!
//! # Webhooks
//!
//! The signature is checked against the raw body before anything else. Past
//! that point every notification is acknowledged, unknown order ids
//! included, so the gateway stops retrying.
//!
//! # Store access
//!
//! [`BookingStore`] does blocking file I/O under a blocking lock, so every
//! call into it runs on tokio's blocking pool via
//! [`tokio::task::spawn_blocking`].

use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::client::{CashfreeClient, PaymentGateway, WebhookVerifier};
use crate::config::Config;
use crate::error::Error;
use crate::pricing::Quote;
use crate::store::BookingStore;
use crate::types::{
    BookingForm, BookingRecord, BookingStatus, CreateGatewayOrder, CreatedOrder, CustomerDetails,
    OrderMeta, TimestampMs,
};
use crate::webhook::WebhookNotification;

/// Length of the random part of an order id
const ORDER_ID_SUFFIX_LEN: usize = 8;

/// What a verified webhook did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A known booking got a new status
    Updated {
        /// Order id
        order_id: String,
        /// New status
        status: BookingStatus,
    },
    /// The order id is not in the store; nothing changed
    UnknownOrder {
        /// Order id from the payload
        order_id: String,
    },
    /// The payload carried no order id; nothing changed
    MissingOrderId,
}

/// Booking relay between the frontend, the gateway and the booking file
#[derive(Clone)]
pub struct BookingService {
    config: Config,
    store: BookingStore,
    gateway: Arc<dyn PaymentGateway>,
    verifier: WebhookVerifier,
}

impl std::fmt::Debug for BookingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingService")
            .field("store", &self.store)
            .field("currency", &self.config.currency())
            .finish_non_exhaustive()
    }
}

impl BookingService {
    /// Create a service from its parts
    pub fn new(config: Config, store: BookingStore, gateway: Arc<dyn PaymentGateway>) -> Self {
        let verifier = WebhookVerifier::new(config.webhook_secret());
        Self {
            config,
            store,
            gateway,
            verifier,
        }
    }

    /// Create a service talking to the real gateway
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway client cannot be built.
    pub fn from_config(config: Config) -> Result<Self, Error> {
        let gateway = Arc::new(CashfreeClient::new(&config)?);
        let store = BookingStore::open(config.bookings_file());
        Ok(Self::new(config, store, gateway))
    }

    /// The booking store
    pub fn store(&self) -> &BookingStore {
        &self.store
    }

    /// The configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Price a booking, open a payment session and persist the booking
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if a required field is missing or the amount
    ///   is invalid
    /// - [`Error::Gateway`] if the gateway rejects the order or is unreachable
    pub async fn create_order(&self, form: BookingForm) -> Result<CreatedOrder, Error> {
        let request = form.validate()?;
        let quote = Quote::compute(&request)?;

        let order_id = generate_order_id();
        let order = CreateGatewayOrder {
            order_id: order_id.clone(),
            order_amount: quote.total,
            order_currency: self.config.currency().to_string(),
            customer_details: CustomerDetails::from_request(&request),
            order_meta: OrderMeta {
                return_url: self.config.return_url(&order_id),
                notify_url: self.config.notify_url(),
            },
            order_note: Some(format!("{} plan on {}", request.plan, request.booking_date)),
        };

        debug!(
            order_id = %order_id,
            total = %quote.total,
            free_game = quote.free_game().map(|g| g.name.as_str()).unwrap_or(""),
            "booking priced"
        );

        let created = self.gateway.create_order(&order).await.inspect_err(|e| {
            error!(order_id = %order_id, error = %e, "gateway order creation failed");
        })?;
        let payment_session_id = created.payment_session_id().map(str::to_string);
        let gateway_status = created.order_status().unwrap_or("").to_string();

        let record = BookingRecord::new(&order_id, request, quote, Some(created.into_raw()));
        let amount = record.amount;
        info!(
            order_id = %order_id,
            amount = %amount,
            status = ?record.status,
            gateway_status = %gateway_status,
            "booking created"
        );
        self.with_store(move |store| store.insert(record)).await?;

        Ok(CreatedOrder {
            success: true,
            order_id,
            amount,
            payment_session_id,
        })
    }

    /// Verify a webhook and reconcile the booking it refers to
    ///
    /// `raw` must be the request body exactly as received.
    ///
    /// # Errors
    ///
    /// - [`Error::Signature`] if the signature does not verify (the store is
    ///   not touched)
    /// - [`Error::Json`] if the verified body is not JSON
    pub async fn handle_webhook(
        &self,
        raw: &[u8],
        signature: Option<&str>,
        timestamp: Option<&str>,
    ) -> Result<WebhookOutcome, Error> {
        self.verifier
            .verify(signature, timestamp, raw)
            .inspect_err(|e| warn!(error = %e, "rejected webhook"))?;

        let notification = WebhookNotification::parse(raw)?;
        let Some(order_id) = notification.order_id.clone() else {
            warn!("webhook without order id, acknowledging");
            return Ok(WebhookOutcome::MissingOrderId);
        };

        let status = notification.booking_status();
        let payload = notification.payload;
        let key = order_id.clone();
        let updated = self
            .with_store(move |store| {
                store.update(&key, |record| record.apply_webhook(status, payload))
            })
            .await?;
        match updated {
            Some(_) => {
                info!(
                    order_id = %order_id,
                    status = ?status,
                    gateway_status = notification.status.as_deref().unwrap_or(""),
                    "booking status updated"
                );
                Ok(WebhookOutcome::Updated { order_id, status })
            }
            None => {
                warn!(order_id = %order_id, "webhook for unknown order, acknowledging");
                Ok(WebhookOutcome::UnknownOrder { order_id })
            }
        }
    }

    /// Look up a booking
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown order id.
    pub async fn get_booking(&self, order_id: &str) -> Result<BookingRecord, Error> {
        let key = order_id.to_string();
        self.with_store(move |store| store.get(&key))
            .await?
            .ok_or_else(|| Error::NotFound(format!("booking {}", order_id)))
    }

    /// Run a store operation on the blocking pool
    async fn with_store<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&BookingStore) -> T + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| Error::Store(format!("store task failed: {}", e)))
    }
}

/// Time-based, collision-resistant order id: `order_<unix ms>_<random>`
pub fn generate_order_id() -> String {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as TimestampMs)
        .unwrap_or_default();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_ID_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("order_{}_{}", millis, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::types::{Amount, GatewayOrder};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeGateway {
        fail: bool,
        seen: Mutex<Vec<CreateGatewayOrder>>,
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_order(&self, order: &CreateGatewayOrder) -> Result<GatewayOrder, Error> {
            self.seen.lock().push(order.clone());
            if self.fail {
                return Err(GatewayError::new(401, "authentication Failed")
                    .with_body(json!({"message": "authentication Failed"}))
                    .into());
            }
            Ok(GatewayOrder(json!({
                "order_id": order.order_id,
                "order_status": "ACTIVE",
                "payment_session_id": "session_test"
            })))
        }
    }

    fn service(fail: bool) -> (BookingService, Arc<FakeGateway>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new("app", "secret")
            .with_frontend_url("https://leazo.in")
            .with_backend_url("https://api.leazo.in");
        let store = BookingStore::open(dir.path().join("bookings.json"));
        let gateway = Arc::new(FakeGateway {
            fail,
            ..Default::default()
        });
        (BookingService::new(config, store, gateway.clone()), gateway, dir)
    }

    fn form(overrides: serde_json::Value) -> BookingForm {
        let mut value = json!({
            "plan": "hourly",
            "hours": 3,
            "games": [],
            "bookingDate": "2026-10-20",
            "name": "Asha",
            "phone": "98765 43210",
            "address": "12 MG Road",
            "city": "Neemuch",
            "paymentMethod": "cod"
        });
        for (k, v) in overrides.as_object().unwrap() {
            value[k] = v.clone();
        }
        serde_json::from_value(value).unwrap()
    }

    fn signed(service: &BookingService, body: &str) -> (String, String) {
        let ts = "1760000000".to_string();
        (WebhookVerifier::new(service.config().webhook_secret()).sign(&ts, body.as_bytes()), ts)
    }

    #[test]
    fn test_order_id_format() {
        let ids: HashSet<String> = (0..100).map(|_| generate_order_id()).collect();
        assert_eq!(ids.len(), 100);
        for id in &ids {
            let parts: Vec<&str> = id.split('_').collect();
            assert_eq!(parts.len(), 3);
            assert_eq!(parts[0], "order");
            assert!(parts[1].parse::<u64>().is_ok());
            assert_eq!(parts[2].len(), ORDER_ID_SUFFIX_LEN);
        }
    }

    #[tokio::test]
    async fn test_create_cod_order() {
        let (service, gateway, _dir) = service(false);
        let created = service.create_order(form(json!({}))).await.unwrap();

        assert!(created.success);
        assert_eq!(created.amount, Amount::rupees(793));
        assert_eq!(created.payment_session_id.as_deref(), Some("session_test"));

        let record = service.get_booking(&created.order_id).await.unwrap();
        assert_eq!(record.status, BookingStatus::BookedCod);
        assert_eq!(record.calc.plan_price, Amount::rupees(594));
        assert_eq!(record.calc.delivery_charge, Amount::rupees(199));
        assert_eq!(record.amount, record.calc.total);
        assert_eq!(record.gateway_response.unwrap()["order_status"], "ACTIVE");

        let seen = gateway.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].order_amount, Amount::rupees(793));
        assert_eq!(seen[0].order_currency, "INR");
        assert_eq!(seen[0].customer_details.customer_id, "cust_9876543210");
        assert_eq!(
            seen[0].order_meta.return_url,
            format!("https://leazo.in/payment-status?order_id={}", created.order_id)
        );
        assert_eq!(seen[0].order_meta.notify_url, "https://api.leazo.in/api/webhook");
    }

    #[tokio::test]
    async fn test_create_online_order_is_pending_payment() {
        let (service, _gateway, _dir) = service(false);
        let created = service
            .create_order(form(json!({"paymentMethod": "upi"})))
            .await
            .unwrap();
        let record = service.get_booking(&created.order_id).await.unwrap();
        assert_eq!(record.status, BookingStatus::PendingPayment);
        assert_eq!(created.amount, Amount::rupees(753));
    }

    #[tokio::test]
    async fn test_validation_failure_writes_nothing() {
        let (service, gateway, _dir) = service(false);
        let mut bad = form(json!({}));
        bad.city = None;

        let err = service.create_order(bad).await.unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("city")));
        assert!(service.store().is_empty());
        assert!(gateway.seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_gateway_failure_writes_nothing() {
        let (service, _gateway, _dir) = service(true);
        let err = service.create_order(form(json!({}))).await.unwrap_err();
        match err {
            Error::Gateway(e) => {
                assert_eq!(e.status, Some(401));
                assert!(e.body.is_some());
            }
            other => panic!("expected gateway error, got {:?}", other),
        }
        assert!(service.store().is_empty());
    }

    #[tokio::test]
    async fn test_webhook_marks_paid() {
        let (service, _gateway, _dir) = service(false);
        let created = service
            .create_order(form(json!({"paymentMethod": "upi"})))
            .await
            .unwrap();

        let body = json!({
            "data": {
                "order": {"order_id": created.order_id},
                "payment": {"payment_status": "SUCCESS"}
            },
            "type": "PAYMENT_SUCCESS_WEBHOOK"
        })
        .to_string();
        let (sig, ts) = signed(&service, &body);

        let outcome = service
            .handle_webhook(body.as_bytes(), Some(&sig), Some(&ts))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Updated {
                order_id: created.order_id.clone(),
                status: BookingStatus::Paid
            }
        );

        let record = service.get_booking(&created.order_id).await.unwrap();
        assert_eq!(record.status, BookingStatus::Paid);
        assert_eq!(record.webhook.unwrap()["type"], "PAYMENT_SUCCESS_WEBHOOK");
    }

    #[tokio::test]
    async fn test_webhook_bad_signature_leaves_store_alone() {
        let (service, _gateway, _dir) = service(false);
        let created = service.create_order(form(json!({}))).await.unwrap();
        let before = service.get_booking(&created.order_id).await.unwrap();

        let body = json!({"order_id": created.order_id, "payment_status": "SUCCESS"}).to_string();
        let (_, ts) = signed(&service, &body);
        let wrong = WebhookVerifier::new("not-the-secret").sign(&ts, body.as_bytes());

        let err = service
            .handle_webhook(body.as_bytes(), Some(&wrong), Some(&ts))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Signature(_)));

        let err = service
            .handle_webhook(body.as_bytes(), None, Some(&ts))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Signature(_)));

        assert_eq!(service.get_booking(&created.order_id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_store_contention_does_not_stall_runtime() {
        let (service, _gateway, _dir) = service(false);
        let created = service.create_order(form(json!({}))).await.unwrap();

        let store = service.store().clone();
        let (locked_tx, locked_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let holder = std::thread::spawn(move || {
            let _guard = store.lock_for_test();
            locked_tx.send(()).unwrap();
            release_rx.recv().unwrap();
        });
        locked_rx.recv().unwrap();

        let body = json!({"order_id": created.order_id, "payment_status": "SUCCESS"}).to_string();
        let (sig, ts) = signed(&service, &body);
        let update = tokio::spawn({
            let service = service.clone();
            async move {
                service
                    .handle_webhook(body.as_bytes(), Some(&sig), Some(&ts))
                    .await
            }
        });

        // single-threaded runtime: this only completes if the update waits
        // for the lock off the runtime thread
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!update.is_finished());
        assert_eq!(
            service.get_booking(&created.order_id).await.unwrap().status,
            BookingStatus::BookedCod
        );

        release_tx.send(()).unwrap();
        let outcome = update.await.unwrap().unwrap();
        holder.join().unwrap();
        assert!(matches!(outcome, WebhookOutcome::Updated { status: BookingStatus::Paid, .. }));
        assert_eq!(
            service.get_booking(&created.order_id).await.unwrap().status,
            BookingStatus::Paid
        );
    }

    #[tokio::test]
    async fn test_webhook_unknown_order_is_acknowledged() {
        let (service, _gateway, _dir) = service(false);
        let body = json!({"order_id": "order_missing", "payment_status": "SUCCESS"}).to_string();
        let (sig, ts) = signed(&service, &body);

        let outcome = service
            .handle_webhook(body.as_bytes(), Some(&sig), Some(&ts))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::UnknownOrder {
                order_id: "order_missing".into()
            }
        );
        assert!(service.store().is_empty());
    }

    #[tokio::test]
    async fn test_webhook_without_order_id() {
        let (service, _gateway, _dir) = service(false);
        let body = r#"{"type":"WEBHOOK_TEST"}"#;
        let (sig, ts) = signed(&service, body);
        let outcome = service
            .handle_webhook(body.as_bytes(), Some(&sig), Some(&ts))
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::MissingOrderId);
    }

    #[tokio::test]
    async fn test_webhook_verified_but_not_json() {
        let (service, _gateway, _dir) = service(false);
        let body = "definitely not json";
        let (sig, ts) = signed(&service, body);
        let err = service
            .handle_webhook(body.as_bytes(), Some(&sig), Some(&ts))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_get_unknown_booking() {
        let (service, _gateway, _dir) = service(false);
        let err = service.get_booking("order_nope").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(err.status_code(), 404);
    }
}
