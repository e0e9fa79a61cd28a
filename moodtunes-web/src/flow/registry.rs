//! Per-session flow registry
//!
//! Holds one [`FlowDriver`] per browser session, created on first use. Two
//! sessions of the same account never share a flow. A watcher task subscribed
//! to the [`SessionContext`] drops a session's flow when that session signs
//! out.

use moodtunes_common::EventBus;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::driver::FlowDriver;
use crate::services::{SessionToken, SongLookup};
use crate::session::{SessionContext, SessionEvent};

type FlowMap = Arc<RwLock<HashMap<SessionToken, Arc<FlowDriver>>>>;

pub struct FlowRegistry {
    flows: FlowMap,
    lookup: Arc<dyn SongLookup>,
    events: Arc<EventBus>,
    watcher: Mutex<Option<(oneshot::Sender<()>, JoinHandle<()>)>>,
}

impl FlowRegistry {
    /// Create the registry and start following session changes
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        session: &SessionContext,
        lookup: Arc<dyn SongLookup>,
        events: Arc<EventBus>,
    ) -> Self {
        let flows: FlowMap = Arc::new(RwLock::new(HashMap::new()));
        let mut subscription = session.subscribe();
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let watched = Arc::clone(&flows);
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    event = subscription.recv() => match event {
                        Some(SessionEvent::SignedOut { identity, token }) => {
                            if watched.write().await.remove(&token).is_some() {
                                info!("Dropped flow for signed-out session of user {}", identity.id);
                            }
                        }
                        Some(_) => {}
                        None => break,
                    },
                }
            }
            subscription.unsubscribe();
            debug!("Flow registry stopped following session changes");
        });

        Self {
            flows,
            lookup,
            events,
            watcher: Mutex::new(Some((stop_tx, handle))),
        }
    }

    /// The session's flow, created at the mood step if absent
    pub async fn flow_for(&self, token: &SessionToken, user_id: Uuid) -> Arc<FlowDriver> {
        if let Some(flow) = self.flows.read().await.get(token) {
            return Arc::clone(flow);
        }

        let mut flows = self.flows.write().await;
        let flow = flows.entry(token.clone()).or_insert_with(|| {
            debug!("Starting flow for user {}", user_id);
            Arc::new(FlowDriver::new(
                user_id,
                Arc::clone(&self.lookup),
                Arc::clone(&self.events),
            ))
        });
        Arc::clone(flow)
    }

    pub async fn contains(&self, token: &SessionToken) -> bool {
        self.flows.read().await.contains_key(token)
    }

    /// Discard the session's flow; the next request starts a fresh one
    pub async fn remove(&self, token: &SessionToken) -> bool {
        self.flows.write().await.remove(token).is_some()
    }

    pub async fn active_flows(&self) -> usize {
        self.flows.read().await.len()
    }

    pub fn backend_name(&self) -> &'static str {
        self.lookup.backend_name()
    }

    /// Stop the session watcher and drop every flow
    pub async fn shutdown(&self) {
        if let Some((stop_tx, handle)) = self.watcher.lock().await.take() {
            let _ = stop_tx.send(());
            let _ = handle.await;
        }
        self.flows.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{DemoBillingProvider, InMemoryAuthProvider, MockSongLookup};
    use std::time::Duration;

    fn setup() -> (Arc<SessionContext>, FlowRegistry) {
        let events = Arc::new(EventBus::default());
        let session = Arc::new(SessionContext::new(
            Arc::new(InMemoryAuthProvider::new()),
            Arc::new(DemoBillingProvider::default()),
            Arc::clone(&events),
        ));
        let registry = FlowRegistry::new(
            &session,
            Arc::new(MockSongLookup::new(Duration::ZERO)),
            events,
        );
        (session, registry)
    }

    async fn wait_until_dropped(registry: &FlowRegistry, token: &SessionToken) {
        for _ in 0..50 {
            if !registry.contains(token).await {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("Flow was not dropped");
    }

    #[tokio::test]
    async fn test_flow_created_once_per_session() {
        let (session, registry) = setup();
        session.sign_up("dev@example.com", "secret1", None).await.unwrap();
        let (first, identity) = session.sign_in("dev@example.com", "secret1").await.unwrap();
        let (second, _) = session.sign_in("dev@example.com", "secret1").await.unwrap();

        let a = registry.flow_for(&first, identity.id).await;
        let b = registry.flow_for(&first, identity.id).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.active_flows().await, 1);

        // Same account, different browser
        let c = registry.flow_for(&second, identity.id).await;
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.active_flows().await, 2);
    }

    #[tokio::test]
    async fn test_sessions_of_one_user_do_not_share_state() {
        let (session, registry) = setup();
        session.sign_up("dev@example.com", "secret1", None).await.unwrap();
        let (first, identity) = session.sign_in("dev@example.com", "secret1").await.unwrap();
        let (second, _) = session.sign_in("dev@example.com", "secret1").await.unwrap();

        registry
            .flow_for(&first, identity.id)
            .await
            .select_mood("Happy")
            .await
            .unwrap();

        let other = registry.flow_for(&second, identity.id).await.snapshot().await;
        assert!(other.mood.is_none());
    }

    #[tokio::test]
    async fn test_sign_out_drops_only_that_sessions_flow() {
        let (session, registry) = setup();
        session.sign_up("dev@example.com", "secret1", None).await.unwrap();
        let (first, identity) = session.sign_in("dev@example.com", "secret1").await.unwrap();
        let (second, _) = session.sign_in("dev@example.com", "secret1").await.unwrap();

        registry
            .flow_for(&first, identity.id)
            .await
            .select_mood("Happy")
            .await
            .unwrap();
        registry.flow_for(&second, identity.id).await;

        session.sign_out(&second).await.unwrap();
        wait_until_dropped(&registry, &second).await;

        assert!(registry.contains(&first).await);
        let kept = registry.flow_for(&first, identity.id).await.snapshot().await;
        assert_eq!(kept.mood.as_ref().map(|m| m.as_str()), Some("Happy"));

        session.sign_out(&first).await.unwrap();
        wait_until_dropped(&registry, &first).await;
        assert_eq!(registry.active_flows().await, 0);
    }

    #[tokio::test]
    async fn test_remove_starts_fresh_flow() {
        let (session, registry) = setup();
        session.sign_up("dev@example.com", "secret1", None).await.unwrap();
        let (token, identity) = session.sign_in("dev@example.com", "secret1").await.unwrap();

        registry
            .flow_for(&token, identity.id)
            .await
            .select_mood("Sad")
            .await
            .unwrap();
        assert!(registry.remove(&token).await);
        assert!(!registry.remove(&token).await);

        let flow = registry.flow_for(&token, identity.id).await;
        assert!(flow.snapshot().await.mood.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_unsubscribes() {
        let (session, registry) = setup();
        assert_eq!(session.subscriber_count(), 1);

        session.sign_up("dev@example.com", "secret1", None).await.unwrap();
        let (token, identity) = session.sign_in("dev@example.com", "secret1").await.unwrap();
        registry.flow_for(&token, identity.id).await;
        registry.shutdown().await;

        assert_eq!(session.subscriber_count(), 0);
        assert_eq!(registry.active_flows().await, 0);
    }
}
