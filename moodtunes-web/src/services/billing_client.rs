//! Billing collaborator
//!
//! Checkout, customer portal and subscription status behind
//! [`BillingProvider`]. Both redirecting operations hand back a URL the page
//! opens in a new tab; nothing here handles the return trip.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use moodtunes_common::config::{BillingBackend, BillingConfig};
use moodtunes_common::{Entitlement, Error, Identity, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::Plan;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const DEMO_SUBSCRIPTION_DAYS: i64 = 30;

/// Subscription billing backend
#[async_trait]
pub trait BillingProvider: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Start a checkout for `plan`, returning the redirect URL
    async fn create_checkout_session(&self, user: &Identity, plan: &Plan) -> Result<String>;

    /// Customer self-service portal URL
    async fn open_customer_portal(&self, user: &Identity) -> Result<String>;

    /// Current subscription status
    async fn check_subscription(&self, user: &Identity) -> Result<Entitlement>;
}

// ============================================================================
// Demo backend
// ============================================================================

/// In-process stand-in
///
/// Checkout immediately marks the user subscribed to the chosen tier and
/// returns the configured success URL.
pub struct DemoBillingProvider {
    checkout_url: String,
    portal_url: String,
    entitlements: RwLock<HashMap<Uuid, Entitlement>>,
}

impl DemoBillingProvider {
    pub fn new(checkout_url: impl Into<String>, portal_url: impl Into<String>) -> Self {
        Self {
            checkout_url: checkout_url.into(),
            portal_url: portal_url.into(),
            entitlements: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for DemoBillingProvider {
    fn default() -> Self {
        let config = BillingConfig::default();
        Self::new(config.demo_checkout_url, config.demo_portal_url)
    }
}

#[async_trait]
impl BillingProvider for DemoBillingProvider {
    fn backend_name(&self) -> &'static str {
        "demo"
    }

    async fn create_checkout_session(&self, user: &Identity, plan: &Plan) -> Result<String> {
        let end = Utc::now() + ChronoDuration::days(DEMO_SUBSCRIPTION_DAYS);
        self.entitlements
            .write()
            .await
            .insert(user.id, Entitlement::subscribed(plan.name, Some(end)));

        info!("Demo checkout: user {} subscribed to {}", user.id, plan.name);
        Ok(self.checkout_url.clone())
    }

    async fn open_customer_portal(&self, user: &Identity) -> Result<String> {
        let subscribed = self
            .entitlements
            .read()
            .await
            .get(&user.id)
            .map(|e| e.subscribed)
            .unwrap_or(false);

        if !subscribed {
            return Err(Error::Billing("No active subscription found".to_string()));
        }
        Ok(self.portal_url.clone())
    }

    async fn check_subscription(&self, user: &Identity) -> Result<Entitlement> {
        Ok(self
            .entitlements
            .read()
            .await
            .get(&user.id)
            .cloned()
            .unwrap_or_default())
    }
}

// ============================================================================
// Hosted billing functions
// ============================================================================

#[derive(Debug, Serialize)]
struct CheckoutRequest<'a> {
    tier: &'a str,
    user_id: Uuid,
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct UserRequest<'a> {
    user_id: Uuid,
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct RedirectResponse {
    url: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionResponse {
    #[serde(default)]
    subscribed: bool,
    subscription_tier: Option<String>,
    subscription_end: Option<DateTime<Utc>>,
}

/// Client for the hosted `create-checkout`, `customer-portal` and
/// `check-subscription` functions
pub struct FunctionsBillingClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl FunctionsBillingClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Billing(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, function: &str) -> String {
        format!("{}/{}", self.base_url, function)
    }

    async fn invoke<B: Serialize + Sync>(&self, function: &str, body: &B) -> Result<reqwest::Response> {
        let mut request = self.http_client.post(self.endpoint(function)).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!("Invoking billing function {}", function);
        let response = request
            .send()
            .await
            .map_err(|e| Error::Billing(format!("{} request failed: {}", function, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<RedirectResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| format!("{} returned {}", function, status));
            return Err(Error::Billing(message));
        }

        Ok(response)
    }

    async fn redirect_url(&self, function: &str, response: reqwest::Response) -> Result<String> {
        let body: RedirectResponse = response
            .json()
            .await
            .map_err(|e| Error::Billing(format!("{} response unreadable: {}", function, e)))?;

        match (body.url, body.error) {
            (Some(url), _) => Ok(url),
            (None, Some(error)) => Err(Error::Billing(error)),
            (None, None) => Err(Error::Billing(format!("{} returned no URL", function))),
        }
    }
}

#[async_trait]
impl BillingProvider for FunctionsBillingClient {
    fn backend_name(&self) -> &'static str {
        "functions"
    }

    async fn create_checkout_session(&self, user: &Identity, plan: &Plan) -> Result<String> {
        let body = CheckoutRequest {
            tier: plan.name,
            user_id: user.id,
            email: &user.email,
        };
        let response = self.invoke("create-checkout", &body).await?;
        self.redirect_url("create-checkout", response).await
    }

    async fn open_customer_portal(&self, user: &Identity) -> Result<String> {
        let body = UserRequest {
            user_id: user.id,
            email: &user.email,
        };
        let response = self.invoke("customer-portal", &body).await?;
        self.redirect_url("customer-portal", response).await
    }

    async fn check_subscription(&self, user: &Identity) -> Result<Entitlement> {
        let body = UserRequest {
            user_id: user.id,
            email: &user.email,
        };
        let response = self.invoke("check-subscription", &body).await?;
        let status: SubscriptionResponse = response
            .json()
            .await
            .map_err(|e| Error::Billing(format!("check-subscription response unreadable: {}", e)))?;

        Ok(Entitlement {
            subscribed: status.subscribed,
            tier: status.subscription_tier,
            subscription_end: status.subscription_end,
        })
    }
}

/// Construct the configured billing backend
///
/// `functions` without a usable URL falls back to the demo backend.
pub fn build_billing_provider(config: &BillingConfig) -> Arc<dyn BillingProvider> {
    if config.backend == BillingBackend::Functions {
        match config.functions_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => {
                match FunctionsBillingClient::new(url, config.api_key.clone()) {
                    Ok(client) => {
                        info!("Billing backend: hosted functions at {}", url);
                        return Arc::new(client);
                    }
                    Err(e) => warn!("Billing client unavailable ({}); using demo backend", e),
                }
            }
            _ => warn!("billing.backend = \"functions\" but no functions_url; using demo backend"),
        }
    }

    info!("Billing backend: demo");
    Arc::new(DemoBillingProvider::new(
        config.demo_checkout_url.clone(),
        config.demo_portal_url.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_plan;

    fn user() -> Identity {
        Identity::new(Uuid::new_v4(), "dev@example.com", None)
    }

    #[tokio::test]
    async fn test_demo_checkout_subscribes_user() {
        let billing = DemoBillingProvider::default();
        let user = user();
        let plan = find_plan("standard").unwrap();

        assert!(!billing.check_subscription(&user).await.unwrap().subscribed);

        let url = billing.create_checkout_session(&user, plan).await.unwrap();
        assert_eq!(url, "/subscription-success");

        let entitlement = billing.check_subscription(&user).await.unwrap();
        assert!(entitlement.subscribed);
        assert_eq!(entitlement.tier.as_deref(), Some("Standard"));
        assert!(entitlement.subscription_end.is_some());
    }

    #[tokio::test]
    async fn test_demo_portal_requires_subscription() {
        let billing = DemoBillingProvider::default();
        let user = user();

        let err = billing.open_customer_portal(&user).await.unwrap_err();
        assert_eq!(err.to_string(), "No active subscription found");

        billing
            .create_checkout_session(&user, find_plan("basic").unwrap())
            .await
            .unwrap();
        assert_eq!(billing.open_customer_portal(&user).await.unwrap(), "/pricing");
    }

    #[test]
    fn test_functions_endpoint_joins_cleanly() {
        let client = FunctionsBillingClient::new("https://billing.example.com/functions/v1/", None).unwrap();
        assert_eq!(
            client.endpoint("create-checkout"),
            "https://billing.example.com/functions/v1/create-checkout"
        );
    }

    #[test]
    fn test_subscription_response_parses() {
        let json = r#"{"subscribed": true, "subscription_tier": "Premium", "subscription_end": "2026-01-31T00:00:00Z"}"#;
        let status: SubscriptionResponse = serde_json::from_str(json).unwrap();
        assert!(status.subscribed);
        assert_eq!(status.subscription_tier.as_deref(), Some("Premium"));

        let empty: SubscriptionResponse = serde_json::from_str("{}").unwrap();
        assert!(!empty.subscribed);
    }

    #[test]
    fn test_build_without_url_falls_back_to_demo() {
        let config = BillingConfig {
            backend: BillingBackend::Functions,
            ..Default::default()
        };
        assert_eq!(build_billing_provider(&config).backend_name(), "demo");
    }
}
