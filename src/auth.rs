//! In-memory authentication state with change notifications.
//!
//! The state is never persisted: it starts unauthenticated, is refreshed from
//! `GET /auth/status`, and drops back to unauthenticated on logout or when
//! the status check fails.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api_client::ApiService;
use crate::errors::ApiError;
use crate::models::{AuthState, AuthUser};

/// Callback invoked with the new state after every change.
pub type AuthListener = Arc<dyn Fn(&AuthState) + Send + Sync>;

/// Handle returned by [`AuthService::add_auth_listener`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct AuthService {
    api: Arc<ApiService>,
    state: Mutex<AuthState>,
    listeners: Mutex<Vec<(ListenerId, AuthListener)>>,
    next_listener_id: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AuthService {
    pub fn new(api: Arc<ApiService>) -> Self {
        Self {
            api,
            state: Mutex::new(AuthState::default()),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    /// Registers a subscriber; subscribers are notified in registration order.
    pub fn add_auth_listener<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners).push((id, Arc::new(callback)));
        id
    }

    /// Removes a subscriber. Returns `false` if it was not registered.
    pub fn remove_auth_listener(&self, id: ListenerId) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Delivers the current state to every subscriber, synchronously.
    ///
    /// Callbacks run without any lock held. A panicking callback is not
    /// caught and stops delivery to the remaining subscribers.
    pub fn notify_listeners(&self) {
        let snapshot = self.current_state();
        let listeners: Vec<AuthListener> = lock(&self.listeners)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in listeners {
            callback(&snapshot);
        }
    }

    fn set_state(&self, is_authenticated: bool, user: Option<AuthUser>) {
        let mut state = lock(&self.state);
        state.is_authenticated = is_authenticated;
        state.user = user;
    }

    /// Refreshes the state from the backend.
    ///
    /// Never fails: any error is logged and treated as "not authenticated".
    pub async fn initialize(&self) -> bool {
        let authenticated = match self.api.get_auth_status().await {
            Ok(status) => {
                let user = status.user.filter(|_| status.authenticated);
                self.set_state(status.authenticated, user);
                status.authenticated
            }
            Err(e) => {
                tracing::warn!("Auth initialization failed, continuing unauthenticated: {}", e);
                self.set_state(false, None);
                false
            }
        };

        tracing::info!("Auth initialized (authenticated: {})", authenticated);
        self.notify_listeners();
        authenticated
    }

    /// URL of the Google consent screen.
    pub async fn get_google_auth_url(&self) -> Result<String, ApiError> {
        match self.api.get_auth_url().await {
            Ok(response) => Ok(response.auth_url),
            Err(e) => {
                tracing::error!("Failed to get Google auth URL: {}", e);
                Err(e)
            }
        }
    }

    /// Exchanges an OAuth code for a session.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The backend accepted the code; state updated and broadcast.
    /// * `Ok(false)` - The backend refused the code; state untouched.
    /// * `Err(ApiError)` - The exchange failed; state untouched.
    pub async fn handle_google_callback(&self, code: &str) -> Result<bool, ApiError> {
        let response = self.api.handle_google_callback(code).await.map_err(|e| {
            tracing::error!("Google callback failed: {}", e);
            e
        })?;

        if !response.success {
            tracing::warn!("Google callback rejected by backend");
            return Ok(false);
        }

        self.set_state(true, response.user);
        tracing::info!("✓ Signed in with Google");
        self.notify_listeners();
        Ok(true)
    }

    /// Signs out. Local state is cleared and broadcast even when the backend
    /// call fails; the failure is then returned to the caller.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.api.logout().await;

        self.set_state(false, None);
        self.notify_listeners();

        match result {
            Ok(_) => {
                tracing::info!("✓ Signed out");
                Ok(())
            }
            Err(e) => {
                tracing::error!("Logout failed on backend, local session cleared: {}", e);
                Err(e)
            }
        }
    }

    pub fn current_state(&self) -> AuthState {
        lock(&self.state).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        lock(&self.state).is_authenticated
    }

    pub fn user(&self) -> Option<AuthUser> {
        lock(&self.state).user.clone()
    }
}
