//! # Seed Data Generator
//!
//! Populates a local database with sample customers, stock and
//! transactions for development.
//!
//! ## Usage
//! ```bash
//! # 60 days of transactions (default)
//! cargo run -p stockbook-db --bin seed
//!
//! # Custom range and database path
//! cargo run -p stockbook-db --bin seed -- --days 120 --db ./data/stockbook.db
//! ```
//!
//! ## Generated Data
//! - Customers of both types
//! - Every standard variation in both stock tables, with prices taken from
//!   the variation names
//! - A few transactions per day per channel, profit computed at write time

use chrono::{Duration, Utc};
use std::env;
use uuid::Uuid;

use stockbook_core::conventions::extract_price;
use stockbook_core::normalize::{build_transaction, new_transaction_id};
use stockbook_core::{
    Channel, Customer, CustomerType, Money, StockItem, TransactionInput,
    DEFAULT_LOW_STOCK_THRESHOLD,
};
use stockbook_db::{DbConfig, Repositories, SqliteStore};

/// Standard variations per item type.
const CATALOG: &[(&str, &[&str])] = &[
    (
        "Non-judicial stamp",
        &[
            "100-90", "50-46", "40-35", "30-26", "25-21", "20-16", "10-8", "5-3",
        ],
    ),
    ("Cartridge Paper", &["Cartridge_6"]),
    ("Folio Paper", &["Folio_6"]),
];

const CUSTOMERS: &[(&str, CustomerType)] = &[
    ("Walk-in", CustomerType::Retail),
    ("Kamran Law Associates", CustomerType::Wholesale),
    ("City Court Vendors", CustomerType::Wholesale),
    ("Sana Photostat", CustomerType::Retail),
    ("Haider Stationers", CustomerType::Wholesale),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut days: i64 = 60;
    let mut db_path = String::from("./stockbook_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(60);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --days <N>     Days of transactions to generate (default: 60)");
                println!("  -d, --db <PATH>    Database file path (default: ./stockbook_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Stockbook Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Days:     {}", days);
    println!();

    let store = SqliteStore::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = store.customers().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} customers", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Customers
    let mut customer_ids = Vec::new();
    for (idx, (name, customer_type)) in CUSTOMERS.iter().enumerate() {
        let customer = Customer {
            customer_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            address: format!("Shop {}, Court Road", idx + 1),
            customer_type: *customer_type,
            email: None,
            phone_number: format!("0300-55501{:02}", idx),
        };
        store.customers().save(&customer).await?;
        customer_ids.push((customer.customer_id, *customer_type));
    }
    println!("✓ {} customers", customer_ids.len());

    // Stock
    let mut rows = 0;
    for channel in Channel::ALL {
        for (seed, (item_type, variations)) in CATALOG.iter().enumerate() {
            for (v, variation) in variations.iter().enumerate() {
                let item = StockItem {
                    channel,
                    item_type: item_type.to_string(),
                    variation_name: variation.to_string(),
                    quantity: ((seed * 37 + v * 11) % 60) as i64,
                    unit_price: extract_price(variation).unwrap_or(Money::zero()),
                    low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
                };
                store.stock().put(&item).await?;
                rows += 1;
            }
        }
    }
    println!("✓ {} stock rows", rows);

    // Transactions
    let today = Utc::now();
    let mut generated = 0;
    for day in 0..days {
        let when = today - Duration::days(days - day);
        for n in 0..3usize {
            let seed = day as usize * 7 + n;
            let (item_type, variations) = CATALOG[seed % CATALOG.len()];
            let variation = variations[seed % variations.len()];
            let price = extract_price(variation).unwrap_or(Money::from_units(10));
            let cogs = Money::from_cents(price.cents() * 85 / 100);

            for channel in Channel::ALL {
                let (customer_id, _) = customer_ids
                    .iter()
                    .filter(|(_, t)| match channel {
                        Channel::Retail => *t == CustomerType::Retail,
                        Channel::Wholesale => *t == CustomerType::Wholesale,
                    })
                    .nth(seed % 2)
                    .or_else(|| customer_ids.first())
                    .cloned()
                    .ok_or("no customers")?;

                let (quantity, selling_price) = match channel {
                    Channel::Retail => (1 + (seed % 9) as i64, price),
                    Channel::Wholesale => (1 + (seed % 4) as i64, price.multiply_quantity(20)),
                };

                let input = TransactionInput {
                    customer_id,
                    date: when.format("%Y-%m-%d").to_string(),
                    time: format!("{:02}:{:02}", 9 + n * 3, (seed * 13) % 60),
                    product_name: item_type.to_string(),
                    product_variation: variation.to_string(),
                    quantity,
                    selling_price,
                    cogs,
                };
                let id = new_transaction_id(channel, when.timestamp_millis() + seed as i64);
                let tx = build_transaction(channel, id, input)?;
                store.transactions().put(&tx).await?;
                generated += 1;
            }
        }
    }
    println!("✓ {} transactions", generated);

    println!();
    println!("✓ Seed complete!");
    store.close().await;

    Ok(())
}
