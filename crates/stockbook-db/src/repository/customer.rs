//! # Customer Repository
//!
//! `Customer_Information` access.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use stockbook_core::Customer;

use crate::error::StoreResult;
use crate::store::{DocumentStore, Key, Table};

/// Repository for customer records.
#[derive(Debug)]
pub struct CustomerRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> CustomerRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        CustomerRepository { store }
    }

    /// All customers, in scan order.
    pub async fn list(&self) -> StoreResult<Vec<Customer>> {
        let docs = self.store.scan(Table::CustomerInformation).await?;
        Ok(docs.iter().map(Customer::from_document).collect())
    }

    pub async fn get(&self, customer_id: &str) -> StoreResult<Option<Customer>> {
        let doc = self
            .store
            .get(Table::CustomerInformation, &Key::single(customer_id))
            .await?;
        Ok(doc.as_ref().map(Customer::from_document))
    }

    /// Writes the full record, replacing any customer with the same id.
    pub async fn save(&self, customer: &Customer) -> StoreResult<()> {
        self.store
            .put(Table::CustomerInformation, customer.to_document())
            .await
    }

    pub async fn delete(&self, customer_id: &str) -> StoreResult<()> {
        self.store
            .delete(Table::CustomerInformation, &Key::single(customer_id))
            .await
    }

    /// Looks up several customers with one scan.
    ///
    /// Ids with no matching record are absent from the map. An empty id
    /// list returns an empty map without touching the store.
    pub async fn lookup(&self, customer_ids: &[String]) -> StoreResult<HashMap<String, Customer>> {
        let wanted: HashSet<&str> = customer_ids.iter().map(String::as_str).collect();
        if wanted.is_empty() {
            return Ok(HashMap::new());
        }

        let found: HashMap<String, Customer> = self
            .list()
            .await?
            .into_iter()
            .filter(|c| wanted.contains(c.customer_id.as_str()))
            .map(|c| (c.customer_id.clone(), c))
            .collect();

        debug!(
            requested = wanted.len(),
            found = found.len(),
            "Resolved customer lookup"
        );
        Ok(found)
    }
}
