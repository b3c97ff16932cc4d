//! Identity Store: holds the single signed-in user and mirrors it to durable storage.
//!
//! Credentials are mock: sign-in matches a fixed demo table on (email, role) and
//! never looks at the password; sign-up always succeeds. Replace both before
//! exposing this to real users.

pub mod handlers;
pub mod storage;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{Location, User, UserRole};
use storage::SessionStorage;

/// Demo accounts accepted by `sign_in`.
pub fn demo_accounts() -> Vec<User> {
    vec![
        User {
            id: "1".into(),
            name: "Demo Helper".into(),
            email: "helper@milaan.org".into(),
            role: UserRole::Helper,
            avatar: Some("https://i.pravatar.cc/150?u=helper".into()),
            location: Some(Location::new(20.5937, 78.9629)),
        },
        User {
            id: "2".into(),
            name: "Demo Seeker".into(),
            email: "seeker@milaan.org".into(),
            role: UserRole::Seeker,
            avatar: Some("https://i.pravatar.cc/150?u=seeker".into()),
            location: Some(Location::new(28.6139, 77.2090)),
        },
    ]
}

#[derive(Clone)]
pub struct IdentityStore {
    inner: Arc<Inner>,
}

struct Inner {
    current: RwLock<Option<User>>,
    /// Auth calls in flight.
    in_flight: AtomicUsize,
    storage: Arc<dyn SessionStorage>,
    /// Serializes storage writes so they land in the order the state changed.
    persist: Mutex<()>,
    auth_delay: Duration,
}

/// Counts one in-flight auth call until dropped, on every path.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl IdentityStore {
    /// Builds the store and restores whatever user the storage already holds.
    pub fn restore(storage: Arc<dyn SessionStorage>, auth_delay: Duration) -> Self {
        let current = storage.load();
        match &current {
            Some(user) => info!("Restored session for {} ({:?})", user.email, user.role),
            None => debug!("No stored session"),
        }
        Self {
            inner: Arc::new(Inner {
                current: RwLock::new(current),
                in_flight: AtomicUsize::new(0),
                storage,
                persist: Mutex::new(()),
                auth_delay,
            }),
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.inner.current.read().await.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Signs in one of the demo accounts. The password is ignored.
    pub async fn sign_in(
        &self,
        email: &str,
        _password: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        let _loading = LoadingGuard::start(&self.inner.in_flight);
        tokio::time::sleep(self.inner.auth_delay).await;

        let Some(user) = demo_accounts()
            .into_iter()
            .find(|u| u.email == email && u.role == role)
        else {
            warn!("Sign in failed for {email} as {role:?}");
            return Err(AppError::Authentication);
        };

        info!("Signed in {} ({:?})", user.email, user.role);
        self.replace(Some(user.clone())).await;
        Ok(user)
    }

    /// Creates a fresh account and signs it in. Always succeeds; the password is not stored.
    pub async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        name: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        let _loading = LoadingGuard::start(&self.inner.in_flight);
        tokio::time::sleep(self.inner.auth_delay).await;

        let user = User {
            id: format!("user_{}", Uuid::new_v4().simple()),
            name: name.to_string(),
            email: email.to_string(),
            role,
            avatar: Some(format!("https://i.pravatar.cc/150?u={email}")),
            location: None,
        };

        info!("Signed up {} as {:?} (id={})", user.email, user.role, user.id);
        self.replace(Some(user.clone())).await;
        Ok(user)
    }

    pub async fn sign_out(&self) {
        if let Some(user) = self.replace(None).await {
            info!("Signed out {}", user.email);
        }
    }

    /// Replaces the current user's location. No-op when nobody is signed in.
    pub async fn update_user_location(&self, location: Location) -> Option<User> {
        let mut current = self.inner.current.write().await;
        let user = current.as_mut()?;
        user.location = Some(location);
        let user = user.clone();

        let persist = self.inner.persist.lock().await;
        drop(current);
        self.persist(Some(user.clone())).await;
        drop(persist);

        debug!("Updated location for {}", user.id);
        Some(user)
    }

    /// Swaps the current user, mirrors the change to storage and returns the previous one.
    async fn replace(&self, next: Option<User>) -> Option<User> {
        let mut current = self.inner.current.write().await;
        let previous = std::mem::replace(&mut *current, next.clone());

        let persist = self.inner.persist.lock().await;
        drop(current);
        self.persist(next).await;
        drop(persist);

        previous
    }

    /// Writes the snapshot on the blocking pool. The caller holds `persist` so
    /// writes stay ordered; the state lock is already released.
    async fn persist(&self, snapshot: Option<User>) {
        let storage = Arc::clone(&self.inner.storage);
        let write = tokio::task::spawn_blocking(move || match snapshot {
            Some(user) => storage.save(&user),
            None => storage.clear(),
        });
        if let Err(e) = write.await {
            warn!("Session write task failed: {e}");
        }
    }
}
