#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::Notify;

use stockroom_auth::{Identity, Profile, Role, StoredCredentials, UserRecord};
use stockroom_console::backend::{
    ApiError, AuthApi, CredentialStore, CredentialStoreError, LoginRequest, MemoryCredentialStore,
};
use stockroom_console::{Navigator, Session};
use stockroom_core::{Clock, ManualClock, UserId};

pub fn record(username: &str, role: Option<&str>, now: DateTime<Utc>) -> UserRecord {
    UserRecord {
        id: UserId::new(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        role: role.map(str::to_string),
        profile: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Role only available under `profile.role`.
pub fn profile_record(username: &str, role: &str, now: DateTime<Utc>) -> UserRecord {
    UserRecord {
        profile: Some(Profile {
            role: Some(role.to_string()),
        }),
        ..record(username, None, now)
    }
}

pub fn credentials_for(user: UserRecord, now: DateTime<Utc>) -> StoredCredentials {
    StoredCredentials {
        access_token: format!("token-{}", user.username),
        refresh_token: Some("refresh".to_string()),
        issued_at: now - ChronoDuration::minutes(1),
        expires_at: now + ChronoDuration::hours(8),
        user,
    }
}

pub fn credentials(username: &str, role: &str, now: DateTime<Utc>) -> StoredCredentials {
    credentials_for(record(username, Some(role), now), now)
}

pub fn identity(role: Option<Role>) -> Identity {
    let now = Utc::now();
    Identity {
        id: UserId::new(),
        username: "tester".to_string(),
        email: "tester@example.com".to_string(),
        role,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Scripted backend. Login answers whatever was last set; logout can be made
/// to fail.
#[derive(Debug)]
pub struct FakeApi {
    login_reply: Mutex<Result<StoredCredentials, ApiError>>,
    logout_fails: AtomicBool,
    logins: AtomicUsize,
    logged_out: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn accepting(credentials: StoredCredentials) -> Arc<Self> {
        Arc::new(Self::with_reply(Ok(credentials)))
    }

    pub fn rejecting(err: ApiError) -> Arc<Self> {
        Arc::new(Self::with_reply(Err(err)))
    }

    fn with_reply(reply: Result<StoredCredentials, ApiError>) -> Self {
        Self {
            login_reply: Mutex::new(reply),
            logout_fails: AtomicBool::new(false),
            logins: AtomicUsize::new(0),
            logged_out: Mutex::new(Vec::new()),
        }
    }

    pub fn reply_with(&self, reply: Result<StoredCredentials, ApiError>) {
        *self.login_reply.lock().unwrap() = reply;
    }

    pub fn fail_logout(&self) {
        self.logout_fails.store(true, Ordering::SeqCst);
    }

    pub fn login_calls(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    /// Tokens the backend was asked to invalidate, in order.
    pub fn logged_out(&self) -> Vec<String> {
        self.logged_out.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn login(&self, _request: &LoginRequest) -> Result<StoredCredentials, ApiError> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        self.login_reply.lock().unwrap().clone()
    }

    async fn logout(&self, access_token: &str) -> Result<(), ApiError> {
        self.logged_out.lock().unwrap().push(access_token.to_string());
        if self.logout_fails.load(Ordering::SeqCst) {
            Err(ApiError::Transport("connection reset".to_string()))
        } else {
            Ok(())
        }
    }
}

/// In-memory store that counts loads, can hold `load` until released, and can
/// refuse writes.
#[derive(Debug, Default)]
pub struct ScriptedStore {
    inner: MemoryCredentialStore,
    loads: AtomicUsize,
    gate: Option<Arc<Notify>>,
    refuse_saves: AtomicBool,
}

impl ScriptedStore {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn holding(credentials: StoredCredentials) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryCredentialStore::with_credentials(credentials),
            ..Self::default()
        })
    }

    /// `load` waits for `gate.notify_one()` before answering.
    pub fn gated(credentials: StoredCredentials, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryCredentialStore::with_credentials(credentials),
            gate: Some(gate),
            ..Self::default()
        })
    }

    pub fn refuse_saves(&self) {
        self.refuse_saves.store(true, Ordering::SeqCst);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> Option<StoredCredentials> {
        self.inner.current()
    }
}

#[async_trait]
impl CredentialStore for ScriptedStore {
    async fn load(&self) -> Result<Option<StoredCredentials>, CredentialStoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.inner.load().await
    }

    async fn save(&self, credentials: &StoredCredentials) -> Result<(), CredentialStoreError> {
        if self.refuse_saves.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into());
        }
        self.inner.save(credentials).await
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        self.inner.clear().await
    }
}

pub fn session(api: Arc<FakeApi>, store: Arc<ScriptedStore>, clock: &ManualClock) -> Session {
    Session::new(api, store).with_clock(Arc::new(clock.clone()))
}

/// A session restored from stored credentials for `role`.
pub async fn signed_in_as(role: &str) -> Arc<Session> {
    let clock = ManualClock::new(Utc::now());
    let creds = credentials("someone", role, clock.now());
    let session = session(
        FakeApi::rejecting(ApiError::Unauthorized),
        ScriptedStore::holding(creds),
        &clock,
    );
    session.initialize().await;
    Arc::new(session)
}

pub async fn signed_out() -> Arc<Session> {
    let clock = ManualClock::new(Utc::now());
    let session = session(
        FakeApi::rejecting(ApiError::Unauthorized),
        ScriptedStore::empty(),
        &clock,
    );
    session.initialize().await;
    Arc::new(session)
}

/// Navigator that records replace-navigations instead of performing them.
#[derive(Debug)]
pub struct RecordingNavigator {
    path: Mutex<String>,
    replaced: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn at(path: &str) -> Self {
        Self {
            path: Mutex::new(path.to_string()),
            replaced: Mutex::new(Vec::new()),
        }
    }

    pub fn replaced(&self) -> Vec<String> {
        self.replaced.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.path.lock().unwrap().clone()
    }

    fn replace(&self, path: &str) {
        self.replaced.lock().unwrap().push(path.to_string());
        *self.path.lock().unwrap() = path.to_string();
    }
}
