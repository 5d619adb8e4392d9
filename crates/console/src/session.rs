//! Session state: who is signed in, and since when.
//!
//! One [`Session`] exists per running client. It is created by the composition
//! root and handed to consumers as `Arc<Session>`; only the auth flow
//! (`initialize`, `login`, `logout`, `check_session`) mutates it.
//!
//! Lifecycle:
//!
//! ```text
//! Uninitialized ──initialize()──▶ Initializing ──▶ Authenticated | Unauthenticated
//!                                 Authenticated ⇄ Unauthenticated  (login / logout / expiry)
//! ```
//!
//! The state lock is never held across an `.await`.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use stockroom_auth::{CredentialError, Identity, IdentityError, Role, StoredCredentials};
use stockroom_core::{Clock, SystemClock};

use crate::backend::{ApiError, AuthApi, CredentialStore, CredentialStoreError, LoginRequest};

/// Default inactivity threshold before `check_session` signs the user out.
pub const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Uninitialized,
    Initializing,
    Authenticated,
    Unauthenticated,
}

/// Point-in-time copy of the session, cheap enough to take on every render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub user: Option<Identity>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    pub fn uninitialized() -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            user: None,
            last_activity: None,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            ..Self::uninitialized()
        }
    }

    pub fn signed_in(user: Identity, at: DateTime<Utc>) -> Self {
        Self {
            phase: SessionPhase::Authenticated,
            user: Some(user),
            last_activity: Some(at),
        }
    }

    /// Whether the session has settled (initialization finished, or a login or
    /// logout already decided the outcome).
    pub fn is_initialized(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Authenticated | SessionPhase::Unauthenticated
        )
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated && self.user.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().and_then(|u| u.role)
    }
}

/// Outcome of [`Session::check_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    /// The session was stale and has just been signed out.
    Expired,
    Unauthenticated,
}

/// Why a login did not go through. Only for logs; users see one message.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account locked or inactive")]
    AccountLocked,

    #[error("backend unreachable")]
    Unreachable,

    #[error("invalid response from backend")]
    InvalidResponse,
}

impl From<&ApiError> for LoginFailure {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Unauthorized => LoginFailure::InvalidCredentials,
            ApiError::Locked => LoginFailure::AccountLocked,
            ApiError::Transport(_) => LoginFailure::Unreachable,
            ApiError::Status(code) if *code >= 500 => LoginFailure::Unreachable,
            ApiError::Status(_) | ApiError::Decode(_) => LoginFailure::InvalidResponse,
        }
    }
}

/// The single rejected outcome of [`Session::login`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("authentication failed")]
pub struct LoginError {
    reason: LoginFailure,
}

impl LoginError {
    fn new(reason: LoginFailure) -> Self {
        Self { reason }
    }

    pub fn reason(&self) -> LoginFailure {
        self.reason
    }
}

#[derive(Debug, Error)]
enum RestoreError {
    #[error("no stored credentials")]
    Missing,

    #[error(transparent)]
    Store(#[from] CredentialStoreError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl RestoreError {
    /// Stored data that can never become valid again should be dropped.
    fn is_stale(&self) -> bool {
        matches!(
            self,
            RestoreError::Credentials(_)
                | RestoreError::Identity(_)
                | RestoreError::Store(CredentialStoreError::Corrupt(_))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expiry {
    Idle,
    TokenExpired,
}

#[derive(Debug)]
struct SessionState {
    phase: SessionPhase,
    identity: Option<Identity>,
    credentials: Option<StoredCredentials>,
    last_activity: Option<DateTime<Utc>>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            identity: None,
            credentials: None,
            last_activity: None,
        }
    }

    fn sign_in(&mut self, identity: Identity, credentials: StoredCredentials, now: DateTime<Utc>) {
        self.phase = SessionPhase::Authenticated;
        self.identity = Some(identity);
        self.credentials = Some(credentials);
        self.last_activity = Some(now);
    }

    /// Why an authenticated session should end at `now`, if it should.
    fn expiry(&self, now: DateTime<Utc>, inactivity_timeout: Duration) -> Option<Expiry> {
        if self.phase != SessionPhase::Authenticated {
            return None;
        }

        let idle = match self.last_activity {
            Some(last) => (now - last)
                .to_std()
                .is_ok_and(|elapsed| elapsed > inactivity_timeout),
            None => true,
        };
        if idle {
            return Some(Expiry::Idle);
        }

        self.credentials
            .as_ref()
            .is_none_or(|c| now >= c.expires_at)
            .then_some(Expiry::TokenExpired)
    }

    /// Returns the credentials that were held, if any.
    fn sign_out(&mut self) -> Option<StoredCredentials> {
        self.phase = SessionPhase::Unauthenticated;
        self.identity = None;
        self.last_activity = None;
        self.credentials.take()
    }
}

pub struct Session {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    inactivity_timeout: Duration,
    state: RwLock<SessionState>,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.read().phase)
            .field("inactivity_timeout", &self.inactivity_timeout)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            api,
            store,
            clock: Arc::new(SystemClock),
            inactivity_timeout: DEFAULT_INACTIVITY_TIMEOUT,
            state: RwLock::new(SessionState::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_inactivity_timeout(mut self, timeout: Duration) -> Self {
        self.inactivity_timeout = timeout;
        self
    }

    pub fn inactivity_timeout(&self) -> Duration {
        self.inactivity_timeout
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.read();
        SessionSnapshot {
            phase: state.phase,
            user: state.identity.clone(),
            last_activity: state.last_activity,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.read().phase
    }

    pub fn user(&self) -> Option<Identity> {
        self.read().identity.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.read().identity.as_ref().and_then(|u| u.role)
    }

    pub fn is_initialized(&self) -> bool {
        matches!(
            self.read().phase,
            SessionPhase::Authenticated | SessionPhase::Unauthenticated
        )
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().phase == SessionPhase::Authenticated
    }

    /// Bearer token for collaborators that call the backend on the user's behalf.
    pub fn access_token(&self) -> Option<String> {
        self.read()
            .credentials
            .as_ref()
            .map(|c| c.access_token.clone())
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.read().last_activity
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Restore the session from persisted credentials.
    ///
    /// Only the first call does anything. Never fails: every problem ends in
    /// the unauthenticated state.
    pub async fn initialize(&self) {
        {
            let mut state = self.write();
            if state.phase != SessionPhase::Uninitialized {
                debug!(phase = ?state.phase, "session already initialized");
                return;
            }
            state.phase = SessionPhase::Initializing;
        }

        let outcome = self.restore().await;

        let stale = {
            let mut state = self.write();
            if state.phase != SessionPhase::Initializing {
                debug!(phase = ?state.phase, "session settled during initialization; discarding restore result");
                return;
            }

            match outcome {
                Ok((identity, credentials)) => {
                    info!(user_id = %identity.id, role = ?identity.role, "session restored");
                    state.sign_in(identity, credentials, self.clock.now());
                    false
                }
                Err(err) => {
                    match &err {
                        RestoreError::Missing => debug!("no stored session"),
                        other => warn!(error = %other, "stored session rejected"),
                    }
                    state.sign_out();
                    err.is_stale()
                }
            }
        };

        if stale {
            self.clear_store().await;
        }
    }

    async fn restore(&self) -> Result<(Identity, StoredCredentials), RestoreError> {
        let credentials = self.store.load().await?.ok_or(RestoreError::Missing)?;
        credentials.validate(self.clock.now())?;

        let identity = Identity::from_record(&credentials.user)?;
        identity.ensure_active()?;

        Ok((identity, credentials))
    }

    /// Sign in. On failure the session is left as it was.
    pub async fn login(&self, request: &LoginRequest) -> Result<Identity, LoginError> {
        let credentials = self.api.login(request).await.map_err(|err| {
            let reason = LoginFailure::from(&err);
            warn!(username = %request.username, error = %err, %reason, "login rejected");
            LoginError::new(reason)
        })?;

        let identity = Identity::from_record(&credentials.user).map_err(|err| {
            warn!(username = %request.username, error = %err, "login returned an unusable identity");
            LoginError::new(LoginFailure::InvalidResponse)
        })?;

        if identity.ensure_active().is_err() {
            warn!(user_id = %identity.id, "login for inactive account");
            return Err(LoginError::new(LoginFailure::AccountLocked));
        }

        let now = self.clock.now();
        if let Err(err) = credentials.validate(now) {
            warn!(user_id = %identity.id, error = %err, "login returned an unusable token");
            return Err(LoginError::new(LoginFailure::InvalidResponse));
        }

        self.write().sign_in(identity.clone(), credentials.clone(), now);
        info!(user_id = %identity.id, role = ?identity.role, "signed in");

        if let Err(err) = self.store.save(&credentials).await {
            warn!(error = %err, "could not persist credentials; session will not survive a restart");
        }

        Ok(identity)
    }

    /// Sign out. Local state is cleared before anything remote is attempted, so
    /// this always succeeds locally.
    pub async fn logout(&self) {
        let (credentials, user_id) = {
            let mut state = self.write();
            let user_id = state.identity.as_ref().map(|u| u.id);
            (state.sign_out(), user_id)
        };

        match user_id {
            Some(user_id) => info!(%user_id, "signed out"),
            None => debug!("logout without an active session"),
        }

        self.finish_sign_out(credentials).await;
    }

    /// Remote logout and store cleanup after the local state was cleared.
    async fn finish_sign_out(&self, credentials: Option<StoredCredentials>) {
        if let Some(credentials) = credentials {
            if let Err(err) = self.api.logout(&credentials.access_token).await {
                warn!(error = %err, "remote logout failed; local session already cleared");
            }
        }

        // a login that landed meanwhile owns the store now
        if self.read().phase == SessionPhase::Authenticated {
            debug!("new session established during sign-out; keeping stored credentials");
            return;
        }
        self.clear_store().await;
    }

    async fn clear_store(&self) {
        if let Err(err) = self.store.clear().await {
            warn!(error = %err, "could not clear stored credentials");
        }
    }

    /// Record user activity. Ignored when nobody is signed in.
    pub fn update_activity(&self) {
        let now = self.clock.now();
        let mut state = self.write();
        if state.phase == SessionPhase::Authenticated {
            state.last_activity = Some(now);
        }
    }

    /// Sign out a session that has been idle longer than the inactivity
    /// timeout, or whose access token has run out.
    ///
    /// Meant to be polled on a fixed interval by the caller (see
    /// [`crate::watchdog`]); the session never schedules itself.
    pub async fn check_session(&self) -> SessionStatus {
        let now = self.clock.now();
        let (expiry, credentials, user_id) = {
            let mut state = self.write();
            if state.phase != SessionPhase::Authenticated {
                return SessionStatus::Unauthenticated;
            }
            let Some(expiry) = state.expiry(now, self.inactivity_timeout) else {
                return SessionStatus::Active;
            };
            let user_id = state.identity.as_ref().map(|u| u.id);
            (expiry, state.sign_out(), user_id)
        };

        match expiry {
            Expiry::Idle => info!(?user_id, timeout = ?self.inactivity_timeout, "session idle past timeout; signed out"),
            Expiry::TokenExpired => info!(?user_id, "access token expired; signed out"),
        }

        self.finish_sign_out(credentials).await;
        SessionStatus::Expired
    }
}
