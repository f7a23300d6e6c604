use std::sync::{Arc, PoisonError, RwLock};

use crate::{
    error::ConsoleError,
    storage::{StorageState, TOKEN_KEY},
    tags_view::ViewCacheState,
};

/// RouterReset
///
/// Discards residual in-memory router and UI state after a logout. The route
/// table is static, so this stands in for a full page reload.
pub trait RouterReset: Send + Sync {
    fn reset_router(&self);
}

/// Session
///
/// `is_authenticated` is true iff the session holds a token, except after
/// `login()` re-affirms an existing session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub is_authenticated: bool,
}

/// SessionStore
///
/// Holds the one session this console tracks. Token and authentication flag
/// always change together under the same lock.
pub struct SessionStore {
    session: RwLock<Session>,
    storage: StorageState,
    views: ViewCacheState,
    router: Arc<dyn RouterReset>,
    cache_tags_view: bool,
}

impl SessionStore {
    /// Starts unauthenticated; call [`SessionStore::hydrate`] once at startup.
    pub fn new(
        storage: StorageState,
        views: ViewCacheState,
        router: Arc<dyn RouterReset>,
        cache_tags_view: bool,
    ) -> Self {
        Self {
            session: RwLock::new(Session::default()),
            storage,
            views,
            router,
            cache_tags_view,
        }
    }

    fn replace(&self, next: Session) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    pub fn snapshot(&self) -> Session {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> String {
        self.snapshot().token
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated
    }

    /// Loads the persisted token. Unreadable storage counts as no token.
    pub fn hydrate(&self) {
        let token = match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "token storage unavailable, starting unauthenticated");
                String::new()
            }
        };
        let is_authenticated = !token.is_empty();
        self.replace(Session {
            token,
            is_authenticated,
        });
        tracing::info!(is_authenticated, "session hydrated");
    }

    /// Persists `value` and authenticates. Fails without touching the session
    /// when `value` is empty or cannot be persisted.
    pub fn set_token(&self, value: &str) -> Result<(), ConsoleError> {
        if value.is_empty() {
            return Err(ConsoleError::invalid_argument("token must not be empty"));
        }
        self.storage.set(TOKEN_KEY, value)?;
        self.replace(Session {
            token: value.to_string(),
            is_authenticated: true,
        });
        tracing::info!("session token set");
        Ok(())
    }

    /// Re-affirms an existing session without touching the token.
    pub fn login(&self) {
        self.session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated = true;
    }

    /// Clears the session, resets the router and, unless tag views are
    /// cached across sessions, empties the visited and cached views.
    pub fn logout(&self) {
        self.clear_token();
        self.router.reset_router();
        if !self.cache_tags_view {
            self.views.del_all_visited();
            self.views.del_all_cached();
        }
        tracing::info!(cache_tags_view = self.cache_tags_view, "logged out");
    }

    /// Silent invalidation: clears the token without touching router or views.
    pub fn reset_token(&self) {
        self.clear_token();
        tracing::info!("session token reset");
    }

    fn clear_token(&self) {
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            tracing::warn!(error = %e, "failed to remove persisted token");
        }
        self.replace(Session::default());
    }
}

/// Shared handle to the session store.
pub type SessionState = Arc<SessionStore>;
