//! Session and entitlement gate
//!
//! [`SessionContext`] is built once at startup and handed to the router and
//! the flow registry. It fronts the authentication provider and the billing
//! collaborator, and announces sign-in, sign-out and entitlement changes to
//! explicit subscribers.

use chrono::Utc;
use moodtunes_common::{Entitlement, EventBus, Identity, MoodTunesEvent, Result};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::Plan;
use crate::services::{AuthProvider, BillingProvider, SessionToken};

const SESSION_CHANNEL_CAPACITY: usize = 64;

/// Session lifecycle notification
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(Identity),
    /// One session closed; the user may still hold others
    SignedOut {
        identity: Identity,
        token: SessionToken,
    },
    EntitlementChanged {
        user_id: Uuid,
        entitlement: Entitlement,
    },
}

/// Handle returned by [`SessionContext::subscribe`]
///
/// Dropping it also detaches; `unsubscribe` makes the intent explicit at
/// shutdown.
pub struct SessionSubscription {
    rx: broadcast::Receiver<SessionEvent>,
}

impl SessionSubscription {
    /// Next session event, or `None` once the context is gone
    ///
    /// A subscriber that falls behind skips the dropped events.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Session subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {
        drop(self.rx);
    }
}

/// Current user, credentials and entitlement
pub struct SessionContext {
    auth: Arc<dyn AuthProvider>,
    billing: Arc<dyn BillingProvider>,
    tx: broadcast::Sender<SessionEvent>,
    events: Arc<EventBus>,
}

impl SessionContext {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        billing: Arc<dyn BillingProvider>,
        events: Arc<EventBus>,
    ) -> Self {
        let (tx, _) = broadcast::channel(SESSION_CHANNEL_CAPACITY);
        Self {
            auth,
            billing,
            tx,
            events,
        }
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn billing(&self) -> &Arc<dyn BillingProvider> {
        &self.billing
    }

    fn announce(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    /// Identity behind a session token; `None` means "redirect to sign-in"
    pub async fn current_user(&self, token: &SessionToken) -> Option<Identity> {
        self.auth.current_user(token).await
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
    ) -> Result<Identity> {
        self.auth.sign_up(email, password, display_name).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(SessionToken, Identity)> {
        let (token, identity) = self.auth.sign_in(email, password).await?;

        self.events.emit_lossy(MoodTunesEvent::SessionChanged {
            user_id: identity.id,
            signed_in: true,
            timestamp: Utc::now(),
        });
        self.announce(SessionEvent::SignedIn(identity.clone()));

        Ok((token, identity))
    }

    /// Close the session; a stale token is not an error
    pub async fn sign_out(&self, token: &SessionToken) -> Option<Identity> {
        let identity = self.auth.sign_out(token).await?;

        self.events.emit_lossy(MoodTunesEvent::SessionChanged {
            user_id: identity.id,
            signed_in: false,
            timestamp: Utc::now(),
        });
        self.announce(SessionEvent::SignedOut {
            identity: identity.clone(),
            token: token.clone(),
        });

        Some(identity)
    }

    /// Subscription status for display
    ///
    /// Billing failures degrade to "not subscribed".
    pub async fn entitlement(&self, user: &Identity) -> Entitlement {
        match self.billing.check_subscription(user).await {
            Ok(entitlement) => entitlement,
            Err(e) => {
                warn!("Subscription check failed for {}: {}", user.id, e);
                Entitlement::default()
            }
        }
    }

    /// Re-check entitlement and announce the result
    pub async fn refresh_entitlement(&self, user: &Identity) -> Entitlement {
        let entitlement = self.entitlement(user).await;
        info!(
            "Entitlement for {}: subscribed={} tier={:?}",
            user.id, entitlement.subscribed, entitlement.tier
        );

        self.events.emit_lossy(MoodTunesEvent::EntitlementChanged {
            user_id: user.id,
            entitlement: entitlement.clone(),
            timestamp: Utc::now(),
        });
        self.announce(SessionEvent::EntitlementChanged {
            user_id: user.id,
            entitlement: entitlement.clone(),
        });

        entitlement
    }

    pub async fn create_checkout_session(&self, user: &Identity, plan: &Plan) -> Result<String> {
        self.billing.create_checkout_session(user, plan).await
    }

    pub async fn open_customer_portal(&self, user: &Identity) -> Result<String> {
        self.billing.open_customer_portal(user).await
    }
}
