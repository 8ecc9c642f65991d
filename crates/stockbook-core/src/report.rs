//! # Report Aggregator
//!
//! Folds normalized retail and wholesale transactions into the nine report
//! views shown on the reports page.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  retail: Vec<Transaction> ──┐                                           │
//! │                             ├──► ReportBuilder::add (one pass each)     │
//! │  wholesale: Vec<Transaction>┘            │                              │
//! │                                          ▼                              │
//! │   ┌──────────────┬──────────────┬──────────────┬──────────────┐        │
//! │   │ daily sales  │ monthly      │ top products │ by category  │        │
//! │   │ by channel   │ cumulative   │ customers    │ by weekday   │        │
//! │   │ product type │              │              │              │        │
//! │   └──────────────┴──────────────┴──────────────┴──────────────┘        │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                                     ReportSet                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! | View                 | Order                                          |
//! |----------------------|------------------------------------------------|
//! | daily sales          | ascending date, invalid dates last             |
//! | monthly summary      | chronological, invalid dates last              |
//! | top products         | descending quantity, ties in first-seen order  |
//! | profit by category   | first seen                                     |
//! | profit by channel    | Retail, Wholesale                              |
//! | cumulative profit    | ascending date, invalid dates last             |
//! | customer frequency   | descending count, ties in first-seen order     |
//! | transactions by day  | Monday to Sunday, then invalid                 |
//! | sales by product type| first seen                                     |
//!
//! ## Malformed Dates
//! A date that cannot be parsed never aborts the fold. The transaction is
//! counted under the [`INVALID_DATE`] label in the daily, monthly, weekday
//! and cumulative views.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use ts_rs::TS;

use crate::conventions;
use crate::money::Money;
use crate::types::{Channel, Transaction};
use crate::TOP_N;

/// Label used for dates that cannot be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

// =============================================================================
// Options
// =============================================================================

/// How the cumulative profit series is accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CumulativeOrder {
    /// Sort every transaction by date (retail before wholesale within a
    /// date), then accumulate once. Each point is the true running total.
    #[default]
    Chronological,

    /// Legacy series: a running total per channel in scan order, the
    /// wholesale total restarting at zero, the points then sorted by date.
    ArrivalOrder,
}

/// Options for [`build_reports`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportOptions {
    pub cumulative: CumulativeOrder,
}

// =============================================================================
// Views
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailySales {
    pub date: String,
    pub retail: Money,
    pub wholesale: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlySummary {
    /// `"Jan 2024"`
    pub month: String,
    pub revenue: Money,
    pub quantity: i64,
    pub profit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopProduct {
    /// `"ProductName (ProductVariation)"`
    pub product: String,
    pub quantity: i64,
    pub revenue: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryProfit {
    pub category: String,
    pub profit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChannelProfit {
    pub channel: Channel,
    pub profit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CumulativePoint {
    pub date: String,
    pub cumulative: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFrequency {
    pub customer_id: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WeekdayCount {
    /// English weekday name, or [`INVALID_DATE`].
    pub day: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductTypeSales {
    pub product_type: String,
    pub retail: Money,
    pub wholesale: Money,
}

/// The nine report views.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportSet {
    pub daily_sales: Vec<DailySales>,
    pub monthly_summary: Vec<MonthlySummary>,
    pub top_products: Vec<TopProduct>,
    pub profit_by_category: Vec<CategoryProfit>,
    pub profit_by_channel: Vec<ChannelProfit>,
    pub cumulative_profit: Vec<CumulativePoint>,
    pub customer_frequency: Vec<CustomerFrequency>,
    pub transactions_by_day: Vec<WeekdayCount>,
    pub sales_by_product_type: Vec<ProductTypeSales>,
}

/// Headline figures across both channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub transaction_count: u64,
    pub total_revenue: Money,
    pub total_profit: Money,
}

impl ReportTotals {
    pub fn from_transactions<'a>(txs: impl IntoIterator<Item = &'a Transaction>) -> Self {
        txs.into_iter().fold(ReportTotals::default(), |mut acc, tx| {
            acc.transaction_count += 1;
            acc.total_revenue += conventions::revenue(tx.quantity, tx.selling_price);
            acc.total_profit += tx.net_profit;
            acc
        })
    }
}

// =============================================================================
// Date Handling
// =============================================================================

/// Parses the date portion of a stored date string.
///
/// Accepts `2024-01-05`, `2024/01/05`, RFC 3339 timestamps and naive
/// timestamps with a `T` or space separator.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    // Timestamps with offsets chrono rejects ("+0530"): take the date part.
    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Sort key for date buckets. Valid dates order before invalid ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum DateKey {
    Valid(NaiveDate),
    Invalid,
}

impl DateKey {
    fn of(date: &str) -> Self {
        parse_date(date).map_or(DateKey::Invalid, DateKey::Valid)
    }

    fn label(&self) -> String {
        match self {
            DateKey::Valid(d) => d.format("%Y-%m-%d").to_string(),
            DateKey::Invalid => INVALID_DATE.to_string(),
        }
    }

    fn month(&self) -> MonthKey {
        match self {
            DateKey::Valid(d) => MonthKey::Valid(d.year(), d.month()),
            DateKey::Invalid => MonthKey::Invalid,
        }
    }

    fn weekday(&self) -> WeekdayKey {
        match self {
            DateKey::Valid(d) => WeekdayKey::Valid(d.weekday().num_days_from_monday()),
            DateKey::Invalid => WeekdayKey::Invalid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MonthKey {
    Valid(i32, u32),
    Invalid,
}

impl MonthKey {
    fn label(&self) -> String {
        match *self {
            MonthKey::Valid(year, month) => NaiveDate::from_ymd_opt(year, month, 1)
                .map(|d| d.format("%b %Y").to_string())
                .unwrap_or_else(|| INVALID_DATE.to_string()),
            MonthKey::Invalid => INVALID_DATE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum WeekdayKey {
    /// Days from Monday.
    Valid(u32),
    Invalid,
}

impl WeekdayKey {
    fn label(&self) -> String {
        const NAMES: [Weekday; 7] = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        match *self {
            WeekdayKey::Valid(i) => NAMES
                .get(i as usize)
                .map(|w| weekday_name(*w).to_string())
                .unwrap_or_else(|| INVALID_DATE.to_string()),
            WeekdayKey::Invalid => INVALID_DATE.to_string(),
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// =============================================================================
// First-Seen Buckets
// =============================================================================

/// String-keyed buckets that remember insertion order.
#[derive(Debug)]
struct Buckets<V> {
    index: HashMap<String, usize>,
    entries: Vec<(String, V)>,
}

impl<V: Default> Buckets<V> {
    fn new() -> Self {
        Buckets {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn entry(&mut self, key: &str) -> &mut V {
        let pos = match self.index.get(key) {
            Some(&pos) => pos,
            None => {
                self.entries.push((key.to_string(), V::default()));
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }

    fn into_entries(self) -> Vec<(String, V)> {
        self.entries
    }
}

/// A money sum per channel. Holds revenue for the daily and product type
/// views and net profit for the by-channel view.
#[derive(Debug, Default, Clone, Copy)]
struct ChannelAmounts {
    retail: Money,
    wholesale: Money,
}

impl ChannelAmounts {
    fn add(&mut self, channel: Channel, amount: Money) {
        match channel {
            Channel::Retail => self.retail += amount,
            Channel::Wholesale => self.wholesale += amount,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct MonthTotals {
    revenue: Money,
    quantity: i64,
    profit: Money,
}

#[derive(Debug, Default, Clone, Copy)]
struct ProductTotals {
    quantity: i64,
    revenue: Money,
}

// =============================================================================
// Aggregation
// =============================================================================

/// Accumulates transactions into report buckets.
///
/// Feed the retail list first, then the wholesale list, then call
/// [`ReportBuilder::finish`].
#[derive(Debug)]
pub struct ReportBuilder {
    options: ReportOptions,
    daily: BTreeMap<DateKey, ChannelAmounts>,
    monthly: BTreeMap<MonthKey, MonthTotals>,
    products: Buckets<ProductTotals>,
    categories: Buckets<Money>,
    by_channel: ChannelAmounts,
    customers: Buckets<u64>,
    weekdays: BTreeMap<WeekdayKey, u64>,
    product_types: Buckets<ChannelAmounts>,
    /// (date, channel, net profit) in arrival order.
    profits: Vec<(DateKey, Channel, Money)>,
}

impl ReportBuilder {
    pub fn new(options: ReportOptions) -> Self {
        ReportBuilder {
            options,
            daily: BTreeMap::new(),
            monthly: BTreeMap::new(),
            products: Buckets::new(),
            categories: Buckets::new(),
            by_channel: ChannelAmounts::default(),
            customers: Buckets::new(),
            weekdays: BTreeMap::new(),
            product_types: Buckets::new(),
            profits: Vec::new(),
        }
    }

    /// Folds one transaction into every view.
    pub fn add(&mut self, tx: &Transaction) {
        let date = DateKey::of(&tx.date);
        let revenue = conventions::revenue(tx.quantity, tx.selling_price);
        let profit = tx.net_profit;

        self.daily.entry(date).or_default().add(tx.channel, revenue);

        let month = self.monthly.entry(date.month()).or_default();
        month.revenue += revenue;
        month.quantity = month.quantity.saturating_add(tx.quantity);
        month.profit += profit;

        let product_key = format!("{} ({})", tx.product_name, tx.product_variation);
        let product = self.products.entry(&product_key);
        product.quantity = product.quantity.saturating_add(tx.quantity);
        product.revenue += revenue;

        *self.categories.entry(&tx.product_name) += profit;

        self.by_channel.add(tx.channel, profit);

        *self.customers.entry(&tx.customer_id) += 1;

        *self.weekdays.entry(date.weekday()).or_default() += 1;

        self.product_types
            .entry(&tx.product_name)
            .add(tx.channel, revenue);

        self.profits.push((date, tx.channel, profit));
    }

    /// Produces the ordered views.
    pub fn finish(self) -> ReportSet {
        let cumulative_profit = cumulative_series(self.profits, self.options.cumulative);

        let daily_sales = self
            .daily
            .into_iter()
            .map(|(date, r)| DailySales {
                date: date.label(),
                retail: r.retail,
                wholesale: r.wholesale,
            })
            .collect();

        let monthly_summary = self
            .monthly
            .into_iter()
            .map(|(month, m)| MonthlySummary {
                month: month.label(),
                revenue: m.revenue,
                quantity: m.quantity,
                profit: m.profit,
            })
            .collect();

        let mut top_products: Vec<TopProduct> = self
            .products
            .into_entries()
            .into_iter()
            .map(|(product, p)| TopProduct {
                product,
                quantity: p.quantity,
                revenue: p.revenue,
            })
            .collect();
        top_products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        top_products.truncate(TOP_N);

        let profit_by_category = self
            .categories
            .into_entries()
            .into_iter()
            .map(|(category, profit)| CategoryProfit { category, profit })
            .collect();

        let profit_by_channel = vec![
            ChannelProfit {
                channel: Channel::Retail,
                profit: self.by_channel.retail,
            },
            ChannelProfit {
                channel: Channel::Wholesale,
                profit: self.by_channel.wholesale,
            },
        ];

        let mut customer_frequency: Vec<CustomerFrequency> = self
            .customers
            .into_entries()
            .into_iter()
            .map(|(customer_id, count)| CustomerFrequency { customer_id, count })
            .collect();
        customer_frequency.sort_by(|a, b| b.count.cmp(&a.count));
        customer_frequency.truncate(TOP_N);

        let transactions_by_day = self
            .weekdays
            .into_iter()
            .map(|(day, count)| WeekdayCount {
                day: day.label(),
                count,
            })
            .collect();

        let sales_by_product_type = self
            .product_types
            .into_entries()
            .into_iter()
            .map(|(product_type, r)| ProductTypeSales {
                product_type,
                retail: r.retail,
                wholesale: r.wholesale,
            })
            .collect();

        ReportSet {
            daily_sales,
            monthly_summary,
            top_products,
            profit_by_category,
            profit_by_channel,
            cumulative_profit,
            customer_frequency,
            transactions_by_day,
            sales_by_product_type,
        }
    }
}

fn cumulative_series(
    mut profits: Vec<(DateKey, Channel, Money)>,
    order: CumulativeOrder,
) -> Vec<CumulativePoint> {
    match order {
        CumulativeOrder::Chronological => {
            // Stable: retail stays ahead of wholesale within a date.
            profits.sort_by_key(|(date, _, _)| *date);
            let mut running = Money::zero();
            profits
                .into_iter()
                .map(|(date, _, profit)| {
                    running += profit;
                    CumulativePoint {
                        date: date.label(),
                        cumulative: running,
                    }
                })
                .collect()
        }
        CumulativeOrder::ArrivalOrder => {
            let mut running = Money::zero();
            let mut current: Option<Channel> = None;
            let mut points: Vec<(DateKey, Money)> = profits
                .into_iter()
                .map(|(date, channel, profit)| {
                    if current != Some(channel) {
                        running = Money::zero();
                        current = Some(channel);
                    }
                    running += profit;
                    (date, running)
                })
                .collect();
            points.sort_by_key(|(date, _)| *date);
            points
                .into_iter()
                .map(|(date, cumulative)| CumulativePoint {
                    date: date.label(),
                    cumulative,
                })
                .collect()
        }
    }
}

/// Builds every report view from the two normalized channel lists.
///
/// Total over its input: no transaction, however malformed, makes this fail.
///
/// ## Example
/// ```rust
/// use stockbook_core::report::{build_reports, ReportOptions};
///
/// let reports = build_reports(&[], &[], ReportOptions::default());
/// assert!(reports.daily_sales.is_empty());
/// assert_eq!(reports.profit_by_channel.len(), 2);
/// ```
pub fn build_reports(
    retail: &[Transaction],
    wholesale: &[Transaction],
    options: ReportOptions,
) -> ReportSet {
    let mut builder = ReportBuilder::new(options);
    for tx in retail.iter().chain(wholesale) {
        builder.add(tx);
    }
    builder.finish()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(channel: Channel, date: &str, qty: i64, price: i64, profit: i64) -> Transaction {
        Transaction {
            transaction_id: format!("{}-{}", channel.slug(), date),
            channel,
            customer_id: "c-1".into(),
            date: date.into(),
            time: "10:00".into(),
            product_name: "Stamp".into(),
            product_variation: "100-90".into(),
            quantity: qty,
            selling_price: Money::from_units(price),
            cogs: Money::zero(),
            net_profit: Money::from_units(profit),
        }
    }

    fn product(name: &str, variation: &str, qty: i64) -> Transaction {
        Transaction {
            product_name: name.into(),
            product_variation: variation.into(),
            ..tx(Channel::Retail, "2024-01-01", qty, 1, 0)
        }
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5);
        assert_eq!(parse_date("2024-01-05"), expected);
        assert_eq!(parse_date("2024-01-05T10:00:00Z"), expected);
        assert_eq!(parse_date("2024-01-05T10:00:00.000"), expected);
        assert_eq!(parse_date("2024-01-05 10:00:00"), expected);
        assert_eq!(parse_date("2024/01/05"), expected);
        assert_eq!(parse_date("2024-01-05T10:00:00+0530"), expected);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_scenario_monthly_and_cumulative() {
        let retail = vec![
            Transaction {
                cogs: Money::from_units(4),
                ..tx(Channel::Retail, "2024-01-01", 2, 10, 12)
            },
            Transaction {
                cogs: Money::from_units(5),
                ..tx(Channel::Retail, "2024-01-02", 1, 20, 15)
            },
        ];

        let reports = build_reports(&retail, &[], ReportOptions::default());

        assert_eq!(
            reports.monthly_summary,
            vec![MonthlySummary {
                month: "Jan 2024".into(),
                revenue: Money::from_units(40),
                quantity: 3,
                profit: Money::from_units(27),
            }]
        );
        assert_eq!(
            reports.cumulative_profit,
            vec![
                CumulativePoint {
                    date: "2024-01-01".into(),
                    cumulative: Money::from_units(12)
                },
                CumulativePoint {
                    date: "2024-01-02".into(),
                    cumulative: Money::from_units(27)
                },
            ]
        );
    }

    #[test]
    fn test_daily_retail_revenue_is_additive() {
        let retail = vec![
            tx(Channel::Retail, "2024-03-04", 2, 10, 0),
            tx(Channel::Retail, "2024-03-04", 3, 7, 0),
            tx(Channel::Retail, "2024-03-05", 1, 100, 0),
        ];
        let wholesale = vec![tx(Channel::Wholesale, "2024-03-04", 1, 500, 0)];

        let reports = build_reports(&retail, &wholesale, ReportOptions::default());

        assert_eq!(reports.daily_sales.len(), 2);
        assert_eq!(reports.daily_sales[0].date, "2024-03-04");
        assert_eq!(reports.daily_sales[0].retail, Money::from_units(41));
        assert_eq!(reports.daily_sales[0].wholesale, Money::from_units(500));
        assert_eq!(reports.daily_sales[1].retail, Money::from_units(100));
    }

    #[test]
    fn test_daily_sales_sorted_ascending() {
        let retail = vec![
            tx(Channel::Retail, "2024-02-01", 1, 1, 0),
            tx(Channel::Retail, "2023-12-31", 1, 1, 0),
            tx(Channel::Retail, "2024/01/15", 1, 1, 0),
        ];
        let reports = build_reports(&retail, &[], ReportOptions::default());
        let dates: Vec<&str> = reports.daily_sales.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2023-12-31", "2024-01-15", "2024-02-01"]);
    }

    #[test]
    fn test_top_products_limit_and_stable_ties() {
        let mut retail: Vec<Transaction> = (0..12)
            .map(|i| product("P", &format!("v{i}"), 1))
            .collect();
        retail.push(product("P", "v5", 4));

        let reports = build_reports(&retail, &[], ReportOptions::default());
        let top = &reports.top_products;

        assert_eq!(top.len(), 10);
        assert_eq!(top[0].product, "P (v5)");
        assert_eq!(top[0].quantity, 5);
        // Remaining ties keep first-seen order.
        assert_eq!(top[1].product, "P (v0)");
        assert_eq!(top[2].product, "P (v1)");
        assert_eq!(top[9].product, "P (v9)");
        assert!(top.windows(2).all(|w| w[0].quantity >= w[1].quantity));
    }

    #[test]
    fn test_invalid_date_does_not_abort() {
        let retail = vec![
            tx(Channel::Retail, "2024-01-01", 1, 10, 3),
            tx(Channel::Retail, "someday", 1, 10, 4),
        ];

        let reports = build_reports(&retail, &[], ReportOptions::default());

        assert_eq!(reports.daily_sales.last().map(|d| d.date.as_str()), Some(INVALID_DATE));
        assert_eq!(reports.monthly_summary.last().map(|m| m.month.as_str()), Some(INVALID_DATE));
        assert_eq!(reports.transactions_by_day.last().map(|d| d.day.as_str()), Some(INVALID_DATE));
        assert_eq!(reports.cumulative_profit.len(), 2);
        assert_eq!(reports.cumulative_profit[1].date, INVALID_DATE);
        assert_eq!(reports.cumulative_profit[1].cumulative, Money::from_units(7));
    }

    #[test]
    fn test_profit_by_channel_and_category() {
        let retail = vec![tx(Channel::Retail, "2024-01-01", 1, 10, 3)];
        let wholesale = vec![
            Transaction {
                product_name: "Folio Paper".into(),
                ..tx(Channel::Wholesale, "2024-01-01", 1, 10, 40)
            },
            tx(Channel::Wholesale, "2024-01-02", 1, 10, 2),
        ];

        let reports = build_reports(&retail, &wholesale, ReportOptions::default());

        assert_eq!(reports.profit_by_channel[0].channel, Channel::Retail);
        assert_eq!(reports.profit_by_channel[0].profit, Money::from_units(3));
        assert_eq!(reports.profit_by_channel[1].profit, Money::from_units(42));

        assert_eq!(reports.profit_by_category.len(), 2);
        assert_eq!(reports.profit_by_category[0].category, "Stamp");
        assert_eq!(reports.profit_by_category[0].profit, Money::from_units(5));
        assert_eq!(reports.profit_by_category[1].category, "Folio Paper");
    }

    #[test]
    fn test_weekday_order() {
        // 2024-01-07 is a Sunday, 2024-01-01 a Monday.
        let retail = vec![
            tx(Channel::Retail, "2024-01-07", 1, 1, 0),
            tx(Channel::Retail, "2024-01-01", 1, 1, 0),
            tx(Channel::Retail, "2024-01-08", 1, 1, 0),
        ];
        let reports = build_reports(&retail, &[], ReportOptions::default());
        assert_eq!(
            reports.transactions_by_day,
            vec![
                WeekdayCount {
                    day: "Monday".into(),
                    count: 2
                },
                WeekdayCount {
                    day: "Sunday".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_customer_frequency_top_ten() {
        let mut retail = Vec::new();
        for i in 0..12 {
            for _ in 0..=i {
                retail.push(Transaction {
                    customer_id: format!("c-{i}"),
                    ..tx(Channel::Retail, "2024-01-01", 1, 1, 0)
                });
            }
        }
        let reports = build_reports(&retail, &[], ReportOptions::default());
        assert_eq!(reports.customer_frequency.len(), 10);
        assert_eq!(reports.customer_frequency[0].customer_id, "c-11");
        assert_eq!(reports.customer_frequency[0].count, 12);
    }

    #[test]
    fn test_sales_by_product_type_splits_channels() {
        let retail = vec![tx(Channel::Retail, "2024-01-01", 2, 10, 0)];
        let wholesale = vec![tx(Channel::Wholesale, "2024-01-01", 1, 300, 0)];
        let reports = build_reports(&retail, &wholesale, ReportOptions::default());
        assert_eq!(
            reports.sales_by_product_type,
            vec![ProductTypeSales {
                product_type: "Stamp".into(),
                retail: Money::from_units(20),
                wholesale: Money::from_units(300),
            }]
        );
    }

    #[test]
    fn test_cumulative_chronological_interleaves_channels() {
        let retail = vec![
            tx(Channel::Retail, "2024-01-01", 1, 1, 10),
            tx(Channel::Retail, "2024-01-03", 1, 1, 10),
        ];
        let wholesale = vec![tx(Channel::Wholesale, "2024-01-02", 1, 1, 100)];

        let reports = build_reports(&retail, &wholesale, ReportOptions::default());
        let series: Vec<i64> = reports
            .cumulative_profit
            .iter()
            .map(|p| p.cumulative.major())
            .collect();
        assert_eq!(series, vec![10, 110, 120]);
    }

    #[test]
    fn test_cumulative_arrival_order_restarts_per_channel() {
        let retail = vec![
            tx(Channel::Retail, "2024-01-01", 1, 1, 10),
            tx(Channel::Retail, "2024-01-03", 1, 1, 10),
        ];
        let wholesale = vec![tx(Channel::Wholesale, "2024-01-02", 1, 1, 100)];

        let options = ReportOptions {
            cumulative: CumulativeOrder::ArrivalOrder,
        };
        let reports = build_reports(&retail, &wholesale, options);
        let series: Vec<(String, i64)> = reports
            .cumulative_profit
            .iter()
            .map(|p| (p.date.clone(), p.cumulative.major()))
            .collect();
        assert_eq!(
            series,
            vec![
                ("2024-01-01".to_string(), 10),
                ("2024-01-02".to_string(), 100),
                ("2024-01-03".to_string(), 20),
            ]
        );
    }

    #[test]
    fn test_totals() {
        let retail = vec![
            tx(Channel::Retail, "2024-01-01", 2, 10, 12),
            tx(Channel::Retail, "2024-01-02", 1, 20, 15),
        ];
        let totals = ReportTotals::from_transactions(&retail);
        assert_eq!(totals.transaction_count, 2);
        assert_eq!(totals.total_revenue, Money::from_units(40));
        assert_eq!(totals.total_profit, Money::from_units(27));
    }

    #[test]
    fn test_extreme_stored_values_do_not_abort() {
        let docs = [
            serde_json::json!({"Date": "2024-01-01", "SellingPrice_Per_Pc": 100000000000000000i64}),
            serde_json::json!({"Date": "2024-01-02", "Quantity_Pcs": "1e18", "SellingPrice_Per_Pc": 50}),
        ];
        let retail: Vec<Transaction> = docs
            .iter()
            .filter_map(|doc| doc.as_object())
            .map(|doc| crate::normalize::normalize(Channel::Retail, doc))
            .collect();

        let reports = build_reports(&retail, &[], ReportOptions::default());
        assert_eq!(reports.monthly_summary.len(), 1);
        assert_eq!(ReportTotals::from_transactions(&retail).transaction_count, 2);
    }

    #[test]
    fn test_sums_saturate() {
        let retail = vec![
            tx(Channel::Retail, "2024-01-01", i64::MAX, 1_000, 0),
            tx(Channel::Retail, "2024-01-02", i64::MAX, 1_000, 0),
        ];

        let reports = build_reports(&retail, &[], ReportOptions::default());
        assert_eq!(reports.monthly_summary[0].quantity, i64::MAX);
        assert_eq!(reports.monthly_summary[0].revenue, Money::from_cents(i64::MAX));
        assert_eq!(
            ReportTotals::from_transactions(&retail).total_revenue,
            Money::from_cents(i64::MAX)
        );
    }
}
