//! Authentication state provider.
//!
//! The session itself is issued elsewhere; this module only tracks whether
//! a real account is signed in and drives collections through sign-in and
//! sign-out transitions.

use crate::{BusEvent, EventBus, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

/// The current authentication session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Signed-in account, `None` for guests
    pub user_id: Option<UserId>,
    /// Opaque bearer token issued by the auth backend
    pub token: Option<String>,
}

impl Session {
    /// Whether a real account session is active.
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Holds the current [`Session`] and lets others watch it change.
///
/// Cheap to clone; clones share the same session.
#[derive(Debug, Clone)]
pub struct AuthProvider {
    tx: Arc<watch::Sender<Session>>,
}

impl Default for AuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthProvider {
    /// Start as a guest.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self { tx: Arc::new(tx) }
    }

    /// Record a signed-in account.
    pub fn sign_in(&self, user_id: impl Into<UserId>, token: Option<String>) {
        let user_id = user_id.into();
        tracing::info!(%user_id, "session started");
        self.tx.send_replace(Session {
            user_id: Some(user_id),
            token,
        });
    }

    /// Return to guest mode.
    pub fn sign_out(&self) {
        tracing::info!("session ended");
        self.tx.send_replace(Session::default());
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Whether a real account session is active.
    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    /// The signed-in account, if any.
    pub fn current_user_id(&self) -> Option<UserId> {
        self.tx.borrow().user_id.clone()
    }

    /// The bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token.clone()
    }

    /// Watch session transitions.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }
}

/// Something that must react when an account signs in.
#[async_trait]
pub trait SessionListener: Send + Sync {
    /// An account signed in (or the signed-in account changed).
    async fn signed_in(&self, user_id: &str);
}

/// Turns session transitions into listener calls and bus events.
///
/// Sign-in calls every listener; sign-out publishes
/// [`BusEvent::SessionEnded`]. Switching accounts does both.
pub struct SessionFollower {
    bus: EventBus,
    listeners: Vec<Arc<dyn SessionListener>>,
    current: Session,
}

impl SessionFollower {
    /// Create a follower starting from a guest session.
    pub fn new(bus: EventBus, listeners: Vec<Arc<dyn SessionListener>>) -> Self {
        Self {
            bus,
            listeners,
            current: Session::default(),
        }
    }

    /// Move to `next`, notifying as needed.
    pub async fn apply(&mut self, next: Session) {
        if let Some(user_id) = self.transition(next) {
            sign_in_all(self.listeners.clone(), user_id).await;
        }
    }

    /// Record `next` and publish [`BusEvent::SessionEnded`] if an account
    /// went away. Returns the account whose listeners still need signing in.
    fn transition(&mut self, next: Session) -> Option<UserId> {
        let previous = std::mem::replace(&mut self.current, next);
        match (previous.user_id, self.current.user_id.clone()) {
            // Token refresh for the same account.
            (Some(before), Some(after)) if before == after => None,
            (Some(_), after) => {
                self.bus.publish(BusEvent::SessionEnded);
                after
            }
            (None, after) => after,
        }
    }
}

async fn sign_in_all(listeners: Vec<Arc<dyn SessionListener>>, user_id: UserId) {
    for listener in &listeners {
        listener.signed_in(&user_id).await;
    }
}

/// Follow `rx` until every [`AuthProvider`] handle is dropped.
///
/// Meant to be spawned once per process next to the collections it drives.
/// Session changes keep being watched while listeners sign in: a sign-out
/// or account switch abandons the pending sign-in and takes effect at once.
pub async fn follow_session(
    mut rx: watch::Receiver<Session>,
    bus: EventBus,
    listeners: Vec<Arc<dyn SessionListener>>,
) {
    let mut follower = SessionFollower::new(bus, listeners);
    let mut next = rx.borrow_and_update().clone();

    'follow: loop {
        if let Some(user_id) = follower.transition(next) {
            let sign_in = sign_in_all(follower.listeners.clone(), user_id.clone());
            tokio::pin!(sign_in);

            loop {
                tokio::select! {
                    () = &mut sign_in => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            sign_in.await;
                            break 'follow;
                        }
                        let session = rx.borrow_and_update().clone();
                        if session.user_id.as_ref() == Some(&user_id) {
                            follower.current = session;
                            continue;
                        }
                        tracing::debug!(%user_id, "session changed before sign-in finished");
                        next = session;
                        continue 'follow;
                    }
                }
            }
        }

        if rx.changed().await.is_err() {
            break;
        }
        next = rx.borrow_and_update().clone();
    }
    tracing::debug!("auth provider dropped, no longer following session");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        signed_in: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SessionListener for Recorder {
        async fn signed_in(&self, user_id: &str) {
            self.signed_in.lock().unwrap().push(user_id.to_string());
        }
    }

    fn session(user: &str) -> Session {
        Session {
            user_id: Some(user.into()),
            token: Some(format!("token-{user}")),
        }
    }

    fn ended_counter(bus: &EventBus) -> (Arc<AtomicUsize>, crate::Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        let sub = bus.subscribe(BusEvent::SessionEnded, move |_| {
            handle.fetch_add(1, Ordering::SeqCst);
        });
        (count, sub)
    }

    #[test]
    fn provider_tracks_session() {
        let auth = AuthProvider::new();
        assert!(!auth.is_authenticated());
        assert_eq!(auth.current_user_id(), None);

        auth.sign_in("u1", Some("secret".into()));
        assert!(auth.is_authenticated());
        assert_eq!(auth.current_user_id().as_deref(), Some("u1"));
        assert_eq!(auth.token().as_deref(), Some("secret"));

        auth.sign_out();
        assert_eq!(auth.current(), Session::default());
    }

    #[tokio::test]
    async fn follower_signs_in_and_out() {
        let bus = EventBus::new();
        let (ended, _sub) = ended_counter(&bus);
        let recorder = Arc::new(Recorder::default());
        let mut follower = SessionFollower::new(bus, vec![recorder.clone()]);

        follower.apply(session("u1")).await;
        assert_eq!(*recorder.signed_in.lock().unwrap(), vec!["u1".to_string()]);
        assert_eq!(ended.load(Ordering::SeqCst), 0);

        follower.apply(Session::default()).await;
        assert_eq!(ended.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn token_refresh_is_not_a_transition() {
        let bus = EventBus::new();
        let (ended, _sub) = ended_counter(&bus);
        let recorder = Arc::new(Recorder::default());
        let mut follower = SessionFollower::new(bus, vec![recorder.clone()]);

        follower.apply(session("u1")).await;
        follower
            .apply(Session {
                user_id: Some("u1".into()),
                token: Some("rotated".into()),
            })
            .await;

        assert_eq!(recorder.signed_in.lock().unwrap().len(), 1);
        assert_eq!(ended.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn switching_accounts_ends_then_signs_in() {
        let bus = EventBus::new();
        let (ended, _sub) = ended_counter(&bus);
        let recorder = Arc::new(Recorder::default());
        let mut follower = SessionFollower::new(bus, vec![recorder.clone()]);

        follower.apply(session("u1")).await;
        follower.apply(session("u2")).await;

        assert_eq!(ended.load(Ordering::SeqCst), 1);
        assert_eq!(
            *recorder.signed_in.lock().unwrap(),
            vec!["u1".to_string(), "u2".to_string()]
        );
    }

    #[tokio::test]
    async fn follow_session_stops_when_provider_dropped() {
        let bus = EventBus::new();
        let recorder = Arc::new(Recorder::default());
        let auth = AuthProvider::new();
        auth.sign_in("u1", None);

        let task = tokio::spawn(follow_session(auth.subscribe(), bus, vec![recorder.clone()]));
        drop(auth);
        task.await.unwrap();

        assert_eq!(*recorder.signed_in.lock().unwrap(), vec!["u1".to_string()]);
    }
}
