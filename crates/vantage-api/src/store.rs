//! Store seams backing the HTTP resources.
//!
//! Handlers talk to trait objects so the HTTP layer stays free of storage
//! policy. The in-memory implementations here back the server in debug mode
//! and the tests; durable stores plug in behind the same traits.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use vantage_core::{Error, Result};
use vantage_dashboard::DashboardConfig;
use vantage_security::api_key::{display_prefix, generate_api_key, is_well_formed};
use vantage_security::{
    AppPermission, CreateHashedApiKeyRequest, CreateHashedApiKeyResponse, DocumentPermission,
    HashedApiKey, UserRef,
};

/// A stored dashboard document: identity envelope plus configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDoc {
    /// The document UUID.
    pub uuid: Uuid,
    /// Display name.
    pub name: String,
    /// The dashboard configuration.
    pub config: DashboardConfig,
}

/// User accounts and their application permission grants.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a user. Fails when the account name is taken.
    async fn create(&self, user: UserRef) -> Result<UserRef>;

    /// Fetches a user by UUID.
    async fn get(&self, uuid: Uuid) -> Result<Option<UserRef>>;

    /// Fetches a user by account name.
    async fn find_by_name(&self, name: &str) -> Result<Option<UserRef>>;

    /// Lists all users.
    async fn list(&self) -> Result<Vec<UserRef>>;

    /// Returns the application permissions held by a user.
    async fn held_permissions(&self, uuid: Uuid) -> Result<BTreeSet<AppPermission>>;

    /// Replaces the application permissions held by a user.
    async fn set_permissions(
        &self,
        uuid: Uuid,
        permissions: BTreeSet<AppPermission>,
    ) -> Result<()>;
}

/// API key records.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Creates a key, returning the plain key exactly once.
    async fn create(&self, request: CreateHashedApiKeyRequest)
        -> Result<CreateHashedApiKeyResponse>;

    /// Fetches a record by ID.
    async fn get(&self, id: u64) -> Result<Option<HashedApiKey>>;

    /// Lists all records.
    async fn list(&self) -> Result<Vec<HashedApiKey>>;

    /// Deletes a record; returns whether it existed.
    async fn delete(&self, id: u64) -> Result<bool>;

    /// Enables or disables a record.
    async fn set_enabled(&self, id: u64, enabled: bool) -> Result<HashedApiKey>;

    /// Verifies a presented plain key, returning its owner when valid.
    async fn verify(&self, presented: &str) -> Result<Option<UserRef>>;
}

/// Dashboard documents.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    /// Creates a dashboard with a fresh UUID.
    async fn create(&self, name: String, config: DashboardConfig) -> Result<DashboardDoc>;

    /// Fetches a dashboard by UUID.
    async fn get(&self, uuid: Uuid) -> Result<Option<DashboardDoc>>;

    /// Replaces a stored dashboard.
    async fn update(&self, doc: DashboardDoc) -> Result<DashboardDoc>;

    /// Deletes a dashboard; returns whether it existed.
    async fn delete(&self, uuid: Uuid) -> Result<bool>;

    /// Lists all dashboards.
    async fn list(&self) -> Result<Vec<DashboardDoc>>;
}

/// Per-document permission grants.
#[async_trait]
pub trait DocPermissionStore: Send + Sync {
    /// Returns all grants on a document.
    async fn fetch(&self, doc_uuid: Uuid) -> Result<BTreeMap<Uuid, DocumentPermission>>;

    /// Grants a permission, replacing any existing grant for the user.
    async fn set(
        &self,
        doc_uuid: Uuid,
        user_uuid: Uuid,
        permission: DocumentPermission,
    ) -> Result<()>;

    /// Removes a user's grant on a document.
    async fn remove(&self, doc_uuid: Uuid, user_uuid: Uuid) -> Result<()>;

    /// Returns true when the user's grant covers the required permission.
    async fn check(
        &self,
        doc_uuid: Uuid,
        user_uuid: Uuid,
        required: DocumentPermission,
    ) -> Result<bool>;

    /// Removes every grant on a document.
    async fn clear(&self, doc_uuid: Uuid) -> Result<()>;
}

fn lock_poisoned() -> Error {
    Error::internal("lock poisoned")
}

// ============================================================================
// In-memory implementations
// ============================================================================

/// In-memory [`UserStore`].
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, UserRef>>,
    permissions: RwLock<HashMap<Uuid, BTreeSet<AppPermission>>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: UserRef) -> Result<UserRef> {
        let mut users = self.users.write().map_err(|_| lock_poisoned())?;
        if users.values().any(|u| u.name == user.name) {
            return Err(Error::invalid_input(format!(
                "user name '{}' is already taken",
                user.name
            )));
        }
        users.insert(user.uuid, user.clone());
        Ok(user)
    }

    async fn get(&self, uuid: Uuid) -> Result<Option<UserRef>> {
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        Ok(users.get(&uuid).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<UserRef>> {
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        Ok(users.values().find(|u| u.name == name).cloned())
    }

    async fn list(&self) -> Result<Vec<UserRef>> {
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        let mut list: Vec<_> = users.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn held_permissions(&self, uuid: Uuid) -> Result<BTreeSet<AppPermission>> {
        let permissions = self.permissions.read().map_err(|_| lock_poisoned())?;
        Ok(permissions.get(&uuid).cloned().unwrap_or_default())
    }

    async fn set_permissions(
        &self,
        uuid: Uuid,
        held: BTreeSet<AppPermission>,
    ) -> Result<()> {
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        if !users.contains_key(&uuid) {
            return Err(Error::not_found("user", uuid.to_string()));
        }
        drop(users);

        let mut permissions = self.permissions.write().map_err(|_| lock_poisoned())?;
        permissions.insert(uuid, held);
        Ok(())
    }
}

/// In-memory [`ApiKeyStore`].
#[derive(Debug, Default)]
pub struct MemoryApiKeyStore {
    records: RwLock<HashMap<u64, HashedApiKey>>,
    next_id: AtomicU64,
}

impl MemoryApiKeyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyStore for MemoryApiKeyStore {
    async fn create(
        &self,
        request: CreateHashedApiKeyRequest,
    ) -> Result<CreateHashedApiKeyResponse> {
        let mut records = self.records.write().map_err(|_| lock_poisoned())?;
        if records
            .values()
            .any(|k| k.owner == request.owner && k.name == request.name)
        {
            return Err(Error::invalid_input(format!(
                "API key name '{}' is already used by this owner",
                request.name
            )));
        }

        let api_key = generate_api_key();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let record = HashedApiKey {
            id,
            owner: request.owner,
            name: request.name,
            comments: request.comments,
            api_key_prefix: display_prefix(&api_key),
            api_key_hash: request.hash_algorithm.hash(&api_key),
            hash_algorithm: request.hash_algorithm,
            expire_time: request.expire_time,
            enabled: request.enabled,
        };
        records.insert(id, record.clone());

        Ok(CreateHashedApiKeyResponse {
            api_key,
            hashed_api_key: record,
        })
    }

    async fn get(&self, id: u64) -> Result<Option<HashedApiKey>> {
        let records = self.records.read().map_err(|_| lock_poisoned())?;
        Ok(records.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<HashedApiKey>> {
        let records = self.records.read().map_err(|_| lock_poisoned())?;
        let mut list: Vec<_> = records.values().cloned().collect();
        list.sort_by_key(|k| k.id);
        Ok(list)
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        let mut records = self.records.write().map_err(|_| lock_poisoned())?;
        Ok(records.remove(&id).is_some())
    }

    async fn set_enabled(&self, id: u64, enabled: bool) -> Result<HashedApiKey> {
        let mut records = self.records.write().map_err(|_| lock_poisoned())?;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("api key", id.to_string()))?;
        record.enabled = enabled;
        Ok(record.clone())
    }

    async fn verify(&self, presented: &str) -> Result<Option<UserRef>> {
        if !is_well_formed(presented) {
            return Ok(None);
        }
        let records = self.records.read().map_err(|_| lock_poisoned())?;
        let now = Utc::now();
        Ok(records
            .values()
            .find(|record| record.verify(presented, now))
            .map(|record| record.owner.clone()))
    }
}

/// In-memory [`DashboardStore`].
#[derive(Debug, Default)]
pub struct MemoryDashboardStore {
    docs: RwLock<HashMap<Uuid, DashboardDoc>>,
}

impl MemoryDashboardStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DashboardStore for MemoryDashboardStore {
    async fn create(&self, name: String, config: DashboardConfig) -> Result<DashboardDoc> {
        let doc = DashboardDoc {
            uuid: Uuid::new_v4(),
            name,
            config,
        };
        let mut docs = self.docs.write().map_err(|_| lock_poisoned())?;
        docs.insert(doc.uuid, doc.clone());
        Ok(doc)
    }

    async fn get(&self, uuid: Uuid) -> Result<Option<DashboardDoc>> {
        let docs = self.docs.read().map_err(|_| lock_poisoned())?;
        Ok(docs.get(&uuid).cloned())
    }

    async fn update(&self, doc: DashboardDoc) -> Result<DashboardDoc> {
        let mut docs = self.docs.write().map_err(|_| lock_poisoned())?;
        if !docs.contains_key(&doc.uuid) {
            return Err(Error::not_found("dashboard", doc.uuid.to_string()));
        }
        docs.insert(doc.uuid, doc.clone());
        Ok(doc)
    }

    async fn delete(&self, uuid: Uuid) -> Result<bool> {
        let mut docs = self.docs.write().map_err(|_| lock_poisoned())?;
        Ok(docs.remove(&uuid).is_some())
    }

    async fn list(&self) -> Result<Vec<DashboardDoc>> {
        let docs = self.docs.read().map_err(|_| lock_poisoned())?;
        let mut list: Vec<_> = docs.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }
}

/// In-memory [`DocPermissionStore`].
///
/// Each user holds at most one grant per document; the grant is the highest
/// permission level they were given.
#[derive(Debug, Default)]
pub struct MemoryDocPermissionStore {
    grants: RwLock<HashMap<Uuid, BTreeMap<Uuid, DocumentPermission>>>,
}

impl MemoryDocPermissionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocPermissionStore for MemoryDocPermissionStore {
    async fn fetch(&self, doc_uuid: Uuid) -> Result<BTreeMap<Uuid, DocumentPermission>> {
        let grants = self.grants.read().map_err(|_| lock_poisoned())?;
        Ok(grants.get(&doc_uuid).cloned().unwrap_or_default())
    }

    async fn set(
        &self,
        doc_uuid: Uuid,
        user_uuid: Uuid,
        permission: DocumentPermission,
    ) -> Result<()> {
        let mut grants = self.grants.write().map_err(|_| lock_poisoned())?;
        grants
            .entry(doc_uuid)
            .or_default()
            .insert(user_uuid, permission);
        Ok(())
    }

    async fn remove(&self, doc_uuid: Uuid, user_uuid: Uuid) -> Result<()> {
        let mut grants = self.grants.write().map_err(|_| lock_poisoned())?;
        if let Some(doc_grants) = grants.get_mut(&doc_uuid) {
            doc_grants.remove(&user_uuid);
            if doc_grants.is_empty() {
                grants.remove(&doc_uuid);
            }
        }
        Ok(())
    }

    async fn check(
        &self,
        doc_uuid: Uuid,
        user_uuid: Uuid,
        required: DocumentPermission,
    ) -> Result<bool> {
        let grants = self.grants.read().map_err(|_| lock_poisoned())?;
        Ok(grants
            .get(&doc_uuid)
            .and_then(|doc_grants| doc_grants.get(&user_uuid))
            .is_some_and(|held| held.is_equal_or_higher(required)))
    }

    async fn clear(&self, doc_uuid: Uuid) -> Result<()> {
        let mut grants = self.grants.write().map_err(|_| lock_poisoned())?;
        grants.remove(&doc_uuid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserRef {
        UserRef::named(Uuid::new_v4(), name)
    }

    #[tokio::test]
    async fn user_names_are_unique() {
        let store = MemoryUserStore::new();
        store.create(user("jbloggs")).await.unwrap();
        let err = store.create(user("jbloggs")).await.unwrap_err();
        assert!(err.to_string().contains("already taken"));
    }

    #[tokio::test]
    async fn permissions_default_to_empty() {
        let store = MemoryUserStore::new();
        let u = store.create(user("jbloggs")).await.unwrap();
        assert!(store.held_permissions(u.uuid).await.unwrap().is_empty());

        store
            .set_permissions(u.uuid, BTreeSet::from([AppPermission::ViewData]))
            .await
            .unwrap();
        assert!(store
            .held_permissions(u.uuid)
            .await
            .unwrap()
            .contains(&AppPermission::ViewData));

        // Unknown users can't be granted permissions.
        assert!(store
            .set_permissions(Uuid::new_v4(), BTreeSet::new())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn created_keys_verify_and_revoke() {
        let store = MemoryApiKeyStore::new();
        let owner = user("jbloggs");
        let response = store
            .create(CreateHashedApiKeyRequest {
                owner: owner.clone(),
                name: "ci".into(),
                comments: None,
                expire_time: None,
                enabled: true,
                hash_algorithm: Default::default(),
            })
            .await
            .unwrap();

        let verified = store.verify(&response.api_key).await.unwrap();
        assert_eq!(verified, Some(owner));

        store
            .set_enabled(response.hashed_api_key.id, false)
            .await
            .unwrap();
        assert_eq!(store.verify(&response.api_key).await.unwrap(), None);

        assert!(store.verify("garbage").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn doc_grants_are_single_highest_per_user() {
        let store = MemoryDocPermissionStore::new();
        let doc = Uuid::new_v4();
        let user_uuid = Uuid::new_v4();

        store
            .set(doc, user_uuid, DocumentPermission::Edit)
            .await
            .unwrap();
        assert!(store
            .check(doc, user_uuid, DocumentPermission::View)
            .await
            .unwrap());
        assert!(!store
            .check(doc, user_uuid, DocumentPermission::Owner)
            .await
            .unwrap());

        store.clear(doc).await.unwrap();
        assert!(store.fetch(doc).await.unwrap().is_empty());
    }
}
