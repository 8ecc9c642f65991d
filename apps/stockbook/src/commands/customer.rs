//! # Customer Commands
//!
//! List, save and delete customer records, and resolve ids to records for
//! transaction and report views.

use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use stockbook_core::validation::validate_customer;
use stockbook_core::{Customer, NO_EMAIL};
use stockbook_db::{DocumentStore, Repositories};

use crate::error::ApiError;

/// All customers, in scan order.
pub async fn list_customers<S: DocumentStore>(store: &S) -> Result<Vec<Customer>, ApiError> {
    let customers = store.customers().list().await?;
    debug!(count = customers.len(), "list_customers");
    Ok(customers)
}

pub async fn get_customer<S: DocumentStore>(store: &S, customer_id: &str) -> Result<Customer, ApiError> {
    store
        .customers()
        .get(customer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", customer_id))
}

/// Creates or replaces a customer.
///
/// A blank `customer_id` creates a new customer under a fresh UUID; any
/// other id overwrites that record in full.
pub async fn save_customer<S: DocumentStore>(
    store: &S,
    mut customer: Customer,
) -> Result<Customer, ApiError> {
    customer.name = customer.name.trim().to_string();
    customer.phone_number = customer.phone_number.trim().to_string();
    customer.email = customer
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty() && e != NO_EMAIL);

    validate_customer(&customer)?;

    let created = customer.customer_id.trim().is_empty();
    if created {
        customer.customer_id = Uuid::new_v4().to_string();
    }

    store.customers().save(&customer).await?;
    info!(
        customer_id = %customer.customer_id,
        created,
        "Customer saved"
    );
    Ok(customer)
}

pub async fn delete_customer<S: DocumentStore>(store: &S, customer_id: &str) -> Result<(), ApiError> {
    store.customers().delete(customer_id).await?;
    info!(customer_id = %customer_id, "Customer deleted");
    Ok(())
}

/// Records for the requested ids, from a single scan.
///
/// Duplicate ids are looked up once; unknown ids are absent from the map.
pub async fn fetch_customer_details<S: DocumentStore>(
    store: &S,
    customer_ids: &[String],
) -> Result<HashMap<String, Customer>, ApiError> {
    Ok(store.customers().lookup(customer_ids).await?)
}
