//! # Report Commands
//!
//! Loads both transaction tables and folds them into the report views.
//!
//! ```text
//! scan Transaction_Retail ──┐
//!                           ├──► build_reports ──► customer lookup ──► envelope
//! scan Transaction_Wholesale┘
//! ```
//!
//! The two scans run concurrently; the customer lookup starts only after
//! both have completed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use stockbook_core::report::{build_reports, ReportOptions, ReportSet, ReportTotals};
use stockbook_db::DocumentStore;

use crate::commands::customer::fetch_customer_details;
use crate::commands::transaction::list_all_transactions;
use crate::error::ApiError;

/// Report views plus the figures attached by the command layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEnvelope {
    #[serde(flatten)]
    pub reports: ReportSet,
    pub totals: ReportTotals,
    /// Names for the ids listed in customer frequency. Unknown ids are absent.
    pub customer_names: BTreeMap<String, String>,
    pub generated_at: DateTime<Utc>,
}

pub async fn load_reports<S: DocumentStore>(
    store: &S,
    options: ReportOptions,
) -> Result<ReportEnvelope, ApiError> {
    let txs = list_all_transactions(store).await?;

    let reports = build_reports(&txs.retail, &txs.wholesale, options);
    let totals = ReportTotals::from_transactions(txs.iter());

    let ids: Vec<String> = reports
        .customer_frequency
        .iter()
        .map(|f| f.customer_id.clone())
        .collect();
    let customer_names = if ids.is_empty() {
        BTreeMap::new()
    } else {
        fetch_customer_details(store, &ids)
            .await?
            .into_iter()
            .map(|(id, customer)| (id, customer.name))
            .collect()
    };
    debug!(
        requested = ids.len(),
        resolved = customer_names.len(),
        "Resolved customer names"
    );

    info!(
        transactions = totals.transaction_count,
        revenue = %totals.total_revenue,
        profit = %totals.total_profit,
        cumulative = ?options.cumulative,
        "Reports built"
    );

    Ok(ReportEnvelope {
        reports,
        totals,
        customer_names,
        generated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_core::normalize::build_transaction;
    use stockbook_core::report::{CumulativeOrder, CumulativePoint, MonthlySummary};
    use stockbook_core::{Channel, Customer, CustomerType, Money, TransactionInput};
    use stockbook_db::{MemoryStore, Repositories};

    fn input(customer: &str, date: &str, qty: i64, price: i64, cogs: i64) -> TransactionInput {
        TransactionInput {
            customer_id: customer.into(),
            date: date.into(),
            time: "09:30".into(),
            product_name: "Non-judicial stamp".into(),
            product_variation: "100-90".into(),
            quantity: qty,
            selling_price: Money::from_units(price),
            cogs: Money::from_units(cogs),
        }
    }

    async fn put(store: &MemoryStore, channel: Channel, id: &str, input: TransactionInput) {
        store
            .transactions()
            .put(&build_transaction(channel, id.into(), input).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryStore::new();
        let envelope = load_reports(&store, ReportOptions::default()).await.unwrap();

        assert!(envelope.reports.daily_sales.is_empty());
        assert_eq!(envelope.reports.profit_by_channel.len(), 2);
        assert_eq!(envelope.totals, ReportTotals::default());
        assert!(envelope.customer_names.is_empty());
    }

    #[tokio::test]
    async fn test_monthly_and_cumulative_scenario() {
        let store = MemoryStore::new();
        put(&store, Channel::Retail, "retail-1", input("c-1", "2024-01-01", 2, 10, 4)).await;
        put(&store, Channel::Retail, "retail-2", input("c-1", "2024-01-02", 1, 20, 5)).await;

        let envelope = load_reports(&store, ReportOptions::default()).await.unwrap();

        assert_eq!(
            envelope.reports.monthly_summary,
            vec![MonthlySummary {
                month: "Jan 2024".into(),
                revenue: Money::from_units(40),
                quantity: 3,
                profit: Money::from_units(27),
            }]
        );
        assert_eq!(
            envelope.reports.cumulative_profit,
            vec![
                CumulativePoint {
                    date: "2024-01-01".into(),
                    cumulative: Money::from_units(12),
                },
                CumulativePoint {
                    date: "2024-01-02".into(),
                    cumulative: Money::from_units(27),
                },
            ]
        );
        assert_eq!(envelope.totals.transaction_count, 2);
        assert_eq!(envelope.totals.total_revenue, Money::from_units(40));
        assert_eq!(envelope.totals.total_profit, Money::from_units(27));
    }

    #[tokio::test]
    async fn test_customer_names_resolved() {
        let store = MemoryStore::new();
        store
            .customers()
            .save(&Customer {
                customer_id: "c-1".into(),
                name: "Asha Traders".into(),
                address: "12 Market Road".into(),
                customer_type: CustomerType::Wholesale,
                email: None,
                phone_number: "0300-1234567".into(),
            })
            .await
            .unwrap();
        put(&store, Channel::Wholesale, "wholesale-1", input("c-1", "2024-01-01", 1, 500, 16)).await;
        put(&store, Channel::Retail, "retail-1", input("c-9", "2024-01-01", 1, 90, 80)).await;

        let envelope = load_reports(
            &store,
            ReportOptions {
                cumulative: CumulativeOrder::ArrivalOrder,
            },
        )
        .await
        .unwrap();

        assert_eq!(envelope.reports.customer_frequency.len(), 2);
        assert_eq!(envelope.customer_names.len(), 1);
        assert_eq!(envelope.customer_names["c-1"], "Asha Traders");
    }

    #[tokio::test]
    async fn test_envelope_serializes_flat() {
        let store = MemoryStore::new();
        let envelope = load_reports(&store, ReportOptions::default()).await.unwrap();
        let value = serde_json::to_value(&envelope).unwrap();

        assert!(value.get("dailySales").is_some());
        assert!(value.get("totals").is_some());
        assert!(value.get("generatedAt").is_some());
    }
}
