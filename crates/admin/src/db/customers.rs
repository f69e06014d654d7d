//! Customer repository.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::json;

use bizdesk_core::{ArchiveFields, ArchiveState, CustomerCode, CustomerId};

use super::{RepositoryError, collections, decode};
use crate::models::{Customer, CustomerChanges, NewCustomer};
use crate::store::{Document, DocumentStore, Fields, to_fields};

// =============================================================================
// Internal Document Types
// =============================================================================

/// Stored shape of a `customers` document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerDocument {
    #[serde(default)]
    customer_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    contact: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    vehicle_types: BTreeSet<String>,
    #[serde(flatten)]
    archive: ArchiveState,
}

impl TryFrom<&Document> for Customer {
    type Error = RepositoryError;

    fn try_from(doc: &Document) -> Result<Self, Self::Error> {
        let raw: CustomerDocument = decode(doc)?;

        Ok(Self {
            id: CustomerId::new(doc.id.clone()),
            customer_id: raw.customer_id,
            name: raw.name,
            contact: raw.contact,
            email: raw.email,
            address: raw.address,
            vehicle_types: raw.vehicle_types,
            archive: raw.archive,
        })
    }
}

/// Field map for the columns a change touches.
fn change_fields(changes: &CustomerChanges) -> Fields {
    let mut fields = Fields::new();
    if let Some(name) = &changes.name {
        fields.insert("name".to_string(), json!(name));
    }
    if let Some(contact) = &changes.contact {
        fields.insert("contact".to_string(), json!(contact));
    }
    if let Some(email) = &changes.email {
        fields.insert("email".to_string(), json!(email));
    }
    if let Some(address) = &changes.address {
        fields.insert("address".to_string(), json!(address));
    }
    if let Some(vehicle_types) = &changes.vehicle_types {
        fields.insert("vehicleTypes".to_string(), json!(vehicle_types));
    }
    fields
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for customer documents.
pub struct CustomerRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Load every customer, archived or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the scan fails.
    /// Returns `RepositoryError::DataCorruption` if any document is invalid.
    pub async fn list_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        let docs = self.store.list(collections::CUSTOMERS).await?;
        docs.iter().map(Customer::try_from).collect()
    }

    /// Get a customer by document ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the lookup fails.
    /// Returns `RepositoryError::DataCorruption` if the document is invalid.
    pub async fn get(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        self.store
            .get(collections::CUSTOMERS, id.as_str())
            .await?
            .as_ref()
            .map(Customer::try_from)
            .transpose()
    }

    /// Compute the next customer code from the stored records.
    ///
    /// Reads the whole collection; two concurrent callers may get the same
    /// code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the scan fails.
    pub async fn next_code(&self) -> Result<CustomerCode, RepositoryError> {
        let docs = self.store.list(collections::CUSTOMERS).await?;
        Ok(CustomerCode::next_after(
            docs.iter().filter_map(|doc| doc.str_field("customerId")),
        ))
    }

    /// Create an active customer under the given code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn create(
        &self,
        code: CustomerCode,
        input: &NewCustomer,
    ) -> Result<Customer, RepositoryError> {
        let raw = CustomerDocument {
            customer_id: code.to_string(),
            name: input.name.clone(),
            contact: input.contact.clone(),
            email: input.email.clone(),
            address: input.address.clone(),
            vehicle_types: input.vehicle_types.clone(),
            archive: ArchiveState::Active,
        };

        let doc = self
            .store
            .create(collections::CUSTOMERS, to_fields(&raw)?)
            .await?;
        Customer::try_from(&doc)
    }

    /// Write the fields named in `changes`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer no longer exists.
    pub async fn update(
        &self,
        id: &CustomerId,
        changes: &CustomerChanges,
    ) -> Result<(), RepositoryError> {
        self.store
            .update(collections::CUSTOMERS, id.as_str(), change_fields(changes))
            .await?;
        Ok(())
    }

    /// Write the archival fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer no longer exists.
    pub async fn set_archive(
        &self,
        id: &CustomerId,
        state: &ArchiveState,
    ) -> Result<(), RepositoryError> {
        let fields = to_fields(&ArchiveFields::from(state.clone()))?;
        self.store
            .update(collections::CUSTOMERS, id.as_str(), fields)
            .await?;
        Ok(())
    }

    /// Permanently remove a customer document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the delete fails.
    pub async fn delete(&self, id: &CustomerId) -> Result<(), RepositoryError> {
        self.store
            .delete(collections::CUSTOMERS, id.as_str())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use serde_json::Value;

    use super::*;
    use crate::store::MemoryStore;

    async fn seed(store: &MemoryStore, id: &str, value: Value) {
        store
            .insert(collections::CUSTOMERS, id, to_fields(&value).unwrap())
            .await;
    }

    fn input(name: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            vehicle_types: BTreeSet::from(["Truck".to_string()]),
            ..NewCustomer::default()
        }
    }

    #[tokio::test]
    async fn test_next_code_from_existing_records() {
        let store = MemoryStore::new();
        seed(&store, "a", json!({"customerId": "CUS-001"})).await;
        seed(&store, "b", json!({"customerId": "CUS-002"})).await;
        seed(&store, "c", json!({"customerId": "CUS-005"})).await;
        seed(&store, "d", json!({"name": "no code"})).await;

        let repo = CustomerRepository::new(&store);
        assert_eq!(repo.next_code().await.unwrap().to_string(), "CUS-006");
    }

    #[tokio::test]
    async fn test_next_code_empty_collection() {
        let store = MemoryStore::new();
        let repo = CustomerRepository::new(&store);
        assert_eq!(repo.next_code().await.unwrap(), CustomerCode::FIRST);
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryStore::new();
        let repo = CustomerRepository::new(&store);

        let created = repo
            .create(CustomerCode::new(3), &input("Juan"))
            .await
            .unwrap();
        assert_eq!(created.customer_id, "CUS-003");
        assert!(!created.is_archived());

        let fetched = repo.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_legacy_document_without_archive_fields() {
        let store = MemoryStore::new();
        seed(
            &store,
            "old",
            json!({"customerId": "CUS-010", "name": "Pedro", "vehicleTypes": ["Van", "Van"]}),
        )
        .await;

        let repo = CustomerRepository::new(&store);
        let customer = repo.get(&CustomerId::new("old")).await.unwrap().unwrap();
        assert_eq!(customer.archive, ArchiveState::Active);
        assert_eq!(customer.vehicle_types.len(), 1);
    }

    #[tokio::test]
    async fn test_set_archive_round_trip() {
        let store = MemoryStore::new();
        let repo = CustomerRepository::new(&store);
        let created = repo
            .create(CustomerCode::new(1), &input("Juan"))
            .await
            .unwrap();

        let mut state = created.archive.clone();
        state.archive("Maria", Utc::now());
        repo.set_archive(&created.id, &state).await.unwrap();

        let archived = repo.get(&created.id).await.unwrap().unwrap();
        assert!(archived.is_archived());
        assert_eq!(archived.archive.archived_by(), Some("Maria"));

        state.unarchive();
        repo.set_archive(&created.id, &state).await.unwrap();
        let restored = repo.get(&created.id).await.unwrap().unwrap();
        assert_eq!(restored.archive, ArchiveState::Active);

        let doc = store
            .get(collections::CUSTOMERS, created.id.as_str())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.fields["isArchived"], json!(false));
        assert!(doc.fields["archivedAt"].is_null());
    }

    #[tokio::test]
    async fn test_update_only_named_fields() {
        let store = MemoryStore::new();
        let repo = CustomerRepository::new(&store);
        let created = repo
            .create(CustomerCode::new(1), &input("Juan"))
            .await
            .unwrap();

        let changes = CustomerChanges {
            address: Some("Davao".to_string()),
            ..CustomerChanges::default()
        };
        repo.update(&created.id, &changes).await.unwrap();

        let updated = repo.get(&created.id).await.unwrap().unwrap();
        assert_eq!(updated.address, "Davao");
        assert_eq!(updated.name, "Juan");
        assert_eq!(updated.customer_id, "CUS-001");
    }

    #[tokio::test]
    async fn test_update_missing_customer() {
        let store = MemoryStore::new();
        let repo = CustomerRepository::new(&store);
        let err = repo
            .update(&CustomerId::new("ghost"), &CustomerChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_corruption() {
        let store = MemoryStore::new();
        seed(&store, "bad", json!({"name": 42})).await;

        let repo = CustomerRepository::new(&store);
        let err = repo.list_all().await.unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
