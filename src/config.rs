//! Configuration and credentials for the booking relay.
//!
//! This module provides the [`Config`] struct for gateway credentials, public
//! URLs and server settings. [`Config::from_env`] builds one from the process
//! environment.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Gateway environment (production or sandbox)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Sandbox environment (test payments)
    #[default]
    Sandbox,
    /// Production environment (real money)
    Production,
}

impl Environment {
    /// Get the base URL for the PG REST API
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://sandbox.cashfree.com/pg",
            Environment::Production => "https://api.cashfree.com/pg",
        }
    }

    /// Parse an environment name; anything but production means sandbox
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Sandbox,
        }
    }
}

/// Configuration for the booking relay
///
/// # Example
///
/// ```rust
/// use leazo_booking::Config;
/// use leazo_booking::config::Environment;
///
/// let config = Config::new("app-id", "secret-key")
///     .with_environment(Environment::Production)
///     .with_timeout(std::time::Duration::from_secs(30));
///
/// assert!(config.orders_url().starts_with("https://api.cashfree.com"));
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Gateway client id (`x-client-id`)
    client_id: String,

    /// Gateway client secret (`x-client-secret`)
    client_secret: String,

    /// Gateway API version (`x-api-version`)
    api_version: String,

    /// Gateway environment
    environment: Environment,

    /// Secret used to verify webhook signatures
    webhook_secret: Option<String>,

    /// Currency every order is created in
    currency: String,

    /// Public URL of the booking frontend
    frontend_url: String,

    /// Public URL of this service, used for the notify URL
    backend_url: String,

    /// HTTP request timeout for gateway calls
    timeout: Duration,

    /// Address the HTTP server binds to
    listen_addr: SocketAddr,

    /// Path of the booking file
    bookings_file: PathBuf,
}

impl Config {
    /// Default gateway API version
    pub const DEFAULT_API_VERSION: &'static str = "2023-08-01";

    /// Create a new configuration with gateway credentials
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_version: Self::DEFAULT_API_VERSION.to_string(),
            environment: Environment::default(),
            webhook_secret: None,
            currency: "INR".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            backend_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(10),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            bookings_file: PathBuf::from("bookings.json"),
        }
    }

    /// Build a configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the gateway credentials are missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let client_id =
            get("CASHFREE_APP_ID").ok_or_else(|| Error::Config("CASHFREE_APP_ID is not set".into()))?;
        let client_secret = get("CASHFREE_SECRET_KEY")
            .ok_or_else(|| Error::Config("CASHFREE_SECRET_KEY is not set".into()))?;

        let mut config = Config::new(client_id, client_secret);

        if let Some(env) = get("CASHFREE_ENV") {
            config = config.with_environment(Environment::parse(&env));
        }
        if let Some(version) = get("CASHFREE_API_VERSION") {
            config = config.with_api_version(version);
        }
        if let Some(secret) = get("CASHFREE_WEBHOOK_SECRET") {
            config = config.with_webhook_secret(secret);
        }
        if let Some(currency) = get("CURRENCY") {
            config = config.with_currency(currency);
        }
        if let Some(url) = get("FRONTEND_URL") {
            config = config.with_frontend_url(url);
        }
        if let Some(url) = get("BACKEND_URL") {
            config = config.with_backend_url(url);
        }
        if let Some(path) = get("BOOKINGS_FILE") {
            config = config.with_bookings_file(path);
        }
        if let Some(secs) = get("GATEWAY_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| Error::Config(format!("GATEWAY_TIMEOUT_SECS is not a number: {}", secs)))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = get("PORT").unwrap_or_else(|| "5000".into());
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|_| Error::Config(format!("invalid listen address {}:{}", host, port)))?;
        config = config.with_listen_addr(addr);

        config.validate()?;
        Ok(config)
    }

    /// Check that the public URLs parse
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending URL.
    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in [("FRONTEND_URL", &self.frontend_url), ("BACKEND_URL", &self.backend_url)] {
            Url::parse(value).map_err(|e| Error::Config(format!("{} is not a valid URL: {}", name, e)))?;
        }
        Ok(())
    }

    /// Set the gateway environment (production or sandbox)
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set the gateway API version
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set a webhook secret distinct from the client secret
    #[must_use]
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    /// Set the order currency
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Set the public frontend URL
    #[must_use]
    pub fn with_frontend_url(mut self, url: impl Into<String>) -> Self {
        self.frontend_url = url.into();
        self
    }

    /// Set the public backend URL
    #[must_use]
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    /// Set the HTTP request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the listen address
    #[must_use]
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// Set the booking file path
    #[must_use]
    pub fn with_bookings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.bookings_file = path.into();
        self
    }

    /// Get the client id
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Get the client secret
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Get the API version
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Get the environment
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Get the webhook secret, falling back to the client secret
    pub fn webhook_secret(&self) -> &str {
        self.webhook_secret.as_deref().unwrap_or(&self.client_secret)
    }

    /// Get the currency
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Get the timeout duration
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the listen address
    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    /// Get the booking file path
    pub fn bookings_file(&self) -> &Path {
        &self.bookings_file
    }

    /// Gateway endpoint for order creation
    pub fn orders_url(&self) -> String {
        format!("{}/orders", self.environment.base_url())
    }

    /// Where the customer lands after paying
    pub fn return_url(&self, order_id: &str) -> String {
        format!(
            "{}/payment-status?order_id={}",
            self.frontend_url.trim_end_matches('/'),
            order_id
        )
    }

    /// Where the gateway posts payment webhooks
    pub fn notify_url(&self) -> String {
        format!("{}/api/webhook", self.backend_url.trim_end_matches('/'))
    }
}
