//! # Application State
//!
//! Domain records, the in-process stores that hold them, configuration,
//! and the [`AppState`] handle cloned into every handler.
//!
//! ## Storage model
//!
//! Runtime reads are served from in-process stores guarded by
//! `parking_lot` locks. When `DATABASE_URL` is configured, every mutation
//! is written through to Postgres (see [`crate::db`]) and all tables are
//! loaded back into the stores at boot. Without a database the API runs
//! memory-only, which is what the integration tests use.
//!
//! Store mutations that must be atomic (find-or-create, link uniqueness,
//! receiver-existence checks) take a single write lock for the whole
//! check-then-insert sequence, so concurrent requests cannot interleave
//! between the check and the write.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;

use reslet_core::{ApplicationId, EmailAddress, MessageId, PropertyId, Role, UserId};
use reslet_upstream::{EmailSender, IdentityProvider, PaymentGateway};

use crate::auth::session::{LoginStates, SessionStore};

// ---------------------------------------------------------------------------
// Domain records
// ---------------------------------------------------------------------------

/// A platform user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserRecord {
    #[schema(value_type = String, format = Uuid)]
    pub id: UserId,
    /// Google's stable subject identifier; absent for accounts that have
    /// never signed in through Google (e.g. operator-created landlords).
    pub google_id: Option<String>,
    pub name: String,
    #[schema(value_type = String)]
    pub email: EmailAddress,
    #[schema(value_type = String)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// A rental property listing. Read-only through the HTTP surface.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PropertyRecord {
    #[schema(value_type = String, format = Uuid)]
    pub id: PropertyId,
    pub address: String,
    /// Monthly rent in minor currency units.
    pub price: i64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An internal mailbox message. Immutable once created.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageRecord {
    #[schema(value_type = String, format = Uuid)]
    pub id: MessageId,
    #[schema(value_type = String, format = Uuid)]
    pub sender_id: UserId,
    #[schema(value_type = String, format = Uuid)]
    pub receiver_id: UserId,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// A landlord-tenant association.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LinkRecord {
    #[schema(value_type = String, format = Uuid)]
    pub landlord_id: UserId,
    #[schema(value_type = String, format = Uuid)]
    pub tenant_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Review state of a rental application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Declined,
}

impl ApplicationStatus {
    /// Canonical string form, as stored in `property_applications.status`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Declined => "Declined",
        }
    }

    /// Parse the canonical string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "Approved" => Some(Self::Approved),
            "Declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

/// A rental application submitted by a tenant for a property.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApplicationRecord {
    #[schema(value_type = String, format = Uuid)]
    pub id: ApplicationId,
    #[schema(value_type = String, format = Uuid)]
    pub property_id: PropertyId,
    #[schema(value_type = String, format = Uuid)]
    pub tenant_id: UserId,
    pub full_name: String,
    pub contact_number: String,
    #[schema(value_type = String)]
    pub email: EmailAddress,
    pub employer_name: String,
    pub job_title: String,
    /// Monthly income in minor currency units.
    pub monthly_income: i64,
    /// Intended tenancy length in months.
    pub length_of_stay: i32,
    pub number_of_occupants: i32,
    pub pets: bool,
    pub emergency_contact: String,
    pub emergency_contact_number: String,
    pub application_date: DateTime<Utc>,
    pub status: ApplicationStatus,
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Generic keyed store: a `parking_lot`-guarded map of records.
#[derive(Debug)]
pub struct Store<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for Store<K, V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Store<K, V>
where
    K: std::hash::Hash + Eq + Copy,
    V: Clone,
{
    pub fn insert(&self, key: K, value: V) {
        self.inner.write().insert(key, value);
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.read().get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains_key(key)
    }

    pub fn list(&self) -> Vec<V> {
        self.inner.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Apply a mutation to the record under the write lock. Returns the
    /// updated record, or `None` if the key is absent.
    pub fn update<F>(&self, key: &K, f: F) -> Option<V>
    where
        F: FnOnce(&mut V),
    {
        let mut guard = self.inner.write();
        let value = guard.get_mut(key)?;
        f(value);
        Some(value.clone())
    }
}

/// Outcome of identity resolution, used for logging and write-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryOutcome {
    /// The Google subject matched an existing user.
    Existing,
    /// No subject match, but the email matched; the subject was attached.
    AttachedByEmail,
    /// A fresh tenant account was created.
    Created,
}

/// User store with the lookups identity resolution needs.
///
/// `find_or_create` runs entirely under one write lock: concurrent first
/// logins with the same email resolve to a single record instead of racing
/// a uniqueness constraint.
#[derive(Debug, Default)]
pub struct UserStore {
    inner: RwLock<HashMap<UserId, UserRecord>>,
}

impl UserStore {
    pub fn insert(&self, record: UserRecord) {
        self.inner.write().insert(record.id, record);
    }

    pub fn get(&self, id: &UserId) -> Option<UserRecord> {
        self.inner.read().get(id).cloned()
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.inner.read().contains_key(id)
    }

    pub fn find_by_email(&self, email: &EmailAddress) -> Option<UserRecord> {
        self.inner
            .read()
            .values()
            .find(|u| &u.email == email)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn count_by_role(&self, role: Role) -> usize {
        self.inner.read().values().filter(|u| u.role == role).count()
    }

    /// Resolve an external identity to a local user, creating a tenant
    /// account if neither the Google subject nor the email matches.
    /// Subject match wins over email match; an email match backfills the
    /// subject onto the existing record. Profile fields are NOT synced on
    /// repeat logins.
    pub fn find_or_create(
        &self,
        subject: &str,
        email: &EmailAddress,
        name: &str,
        now: DateTime<Utc>,
    ) -> (UserRecord, DirectoryOutcome) {
        let mut guard = self.inner.write();

        if let Some(user) = guard
            .values()
            .find(|u| u.google_id.as_deref() == Some(subject))
        {
            return (user.clone(), DirectoryOutcome::Existing);
        }

        if let Some(id) = guard
            .values()
            .find(|u| &u.email == email)
            .map(|u| u.id)
        {
            let user = guard.get_mut(&id).expect("id just found under this lock");
            user.google_id = Some(subject.to_string());
            return (user.clone(), DirectoryOutcome::AttachedByEmail);
        }

        let record = UserRecord {
            id: UserId::new(),
            google_id: Some(subject.to_string()),
            name: name.to_string(),
            email: email.clone(),
            role: Role::Tenant,
            created_at: now,
        };
        guard.insert(record.id, record.clone());
        (record, DirectoryOutcome::Created)
    }
}

/// Landlord-tenant link store enforcing pair uniqueness.
#[derive(Debug, Default)]
pub struct LinkStore {
    inner: RwLock<Vec<LinkRecord>>,
}

impl LinkStore {
    /// Record a link. Returns `None` when the pair already exists.
    pub fn link(&self, landlord_id: UserId, tenant_id: UserId, now: DateTime<Utc>) -> Option<LinkRecord> {
        let mut guard = self.inner.write();
        if guard
            .iter()
            .any(|l| l.landlord_id == landlord_id && l.tenant_id == tenant_id)
        {
            return None;
        }
        let record = LinkRecord {
            landlord_id,
            tenant_id,
            created_at: now,
        };
        guard.push(record.clone());
        Some(record)
    }

    pub fn insert(&self, record: LinkRecord) {
        self.inner.write().push(record);
    }

    pub fn tenants_of(&self, landlord_id: UserId) -> Vec<UserId> {
        self.inner
            .read()
            .iter()
            .filter(|l| l.landlord_id == landlord_id)
            .map(|l| l.tenant_id)
            .collect()
    }

    pub fn landlords_of(&self, tenant_id: UserId) -> Vec<UserId> {
        self.inner
            .read()
            .iter()
            .filter(|l| l.tenant_id == tenant_id)
            .map(|l| l.landlord_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Environment-derived configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port (`RESLET_PORT`, default 3000).
    pub port: u16,
    /// Inbox address receiving contact-form mail (`CONTACT_INBOX`).
    pub contact_inbox: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            contact_inbox: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from the environment. Absent variables fall back
    /// to defaults; a malformed port is an error rather than a silent 3000.
    pub fn from_env() -> Result<Self, String> {
        let port = match std::env::var("RESLET_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| format!("RESLET_PORT is not a valid port: {raw}"))?,
            Err(_) => 3000,
        };
        Ok(Self {
            port,
            contact_inbox: std::env::var("CONTACT_INBOX").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Shared application state. Cheap to clone; all fields are handles.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,

    // Stores
    pub users: Arc<UserStore>,
    pub properties: Arc<Store<PropertyId, PropertyRecord>>,
    pub messages: Arc<Store<MessageId, MessageRecord>>,
    pub links: Arc<LinkStore>,
    pub applications: Arc<Store<ApplicationId, ApplicationRecord>>,

    // Authentication
    pub sessions: Arc<SessionStore>,
    pub login_states: Arc<LoginStates>,

    // External collaborators (None → the corresponding routes return 503)
    pub google: Option<Arc<dyn IdentityProvider>>,
    pub payments: Option<Arc<dyn PaymentGateway>>,
    pub email: Option<Arc<dyn EmailSender>>,

    /// Write-through persistence; `None` in memory-only mode.
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// Memory-only state with no collaborators configured.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// State with explicit configuration and an optional database pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        Self {
            config,
            users: Arc::new(UserStore::default()),
            properties: Arc::new(Store::default()),
            messages: Arc::new(Store::default()),
            links: Arc::new(LinkStore::default()),
            applications: Arc::new(Store::default()),
            sessions: Arc::new(SessionStore::new()),
            login_states: Arc::new(LoginStates::new()),
            google: None,
            payments: None,
            email: None,
            db_pool,
        }
    }

    /// Seed a handful of demo listings for memory-only development mode.
    /// No-op when properties already exist (e.g. loaded from the database).
    pub fn seed_demo_properties(&self) {
        if !self.properties.is_empty() {
            return;
        }
        let now = Utc::now();
        let demo = [
            ("14 Harcourt Terrace, Flat 2", 95_000, 2, 1),
            ("3 Mill Lane", 120_000, 3, 2),
            ("Apartment 7, Dockside House", 82_500, 1, 1),
        ];
        for (address, price, bedrooms, bathrooms) in demo {
            let record = PropertyRecord {
                id: PropertyId::new(),
                address: address.to_string(),
                price,
                bedrooms,
                bathrooms,
                image_url: None,
                created_at: now,
            };
            self.properties.insert(record.id, record);
        }
        tracing::info!(count = demo.len(), "seeded demo properties (memory-only mode)");
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
