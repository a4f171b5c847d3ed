//! # Seed Data Generator
//!
//! Populates a database with one demo business for local development.
//!
//! ## Usage
//! ```bash
//! # Seed ./storekeep_dev.db with 25 customers (default)
//! cargo run -p storekeep-db --bin seed
//!
//! # Custom customer count and database path
//! cargo run -p storekeep-db --bin seed -- --customers 200 --db ./data/storekeep.db
//! ```
//!
//! ## Generated Data
//! - Business "Acme Retail" with store "NYC" (New York)
//! - Two staff members
//! - Inventory: Widget (product, cost $10, price $25, 100 in stock) plus a
//!   handful of products and services
//! - N customers numbered 1..=N by the store counter
//! - A few sales, so the profit/loss report is not empty

use std::env;
use std::time::Instant;

use storekeep_core::{NewBusiness, NewCustomer, NewInventory, NewStaff, NewStore, SaleRequest};
use storekeep_db::{Database, DbConfig};

/// (name, type, cost cents, price cents, stock)
const ITEMS: &[(&str, &str, i64, i64, i64)] = &[
    ("Widget", "product", 1000, 2500, 100),
    ("Gadget", "product", 1800, 3900, 40),
    ("Sprocket", "product", 250, 600, 500),
    ("Gift Wrap", "service", 50, 300, 0),
    ("Repair", "service", 1500, 5000, 0),
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Linus", "Barbara", "Ken", "Margaret", "Dennis", "Frances", "Alan", "Radia",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Torvalds", "Liskov", "Thompson", "Hamilton", "Ritchie", "Allen",
    "Turing", "Perlman",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut customers: usize = 25;
    let mut db_path = String::from("./storekeep_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--customers" | "-c" => {
                if i + 1 < args.len() {
                    customers = args[i + 1].parse().unwrap_or(25);
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
                println!("Storekeep Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --customers <N>  Number of customers to create (default: 25)");
                println!("  -d, --db <PATH>      Database file path (default: ./storekeep_dev.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Storekeep Seed Data Generator");
    println!("================================");
    println!("Database:  {}", db_path);
    println!("Customers: {}", customers);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.businesses().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} businesses", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = Instant::now();

    let business = db
        .businesses()
        .create(NewBusiness {
            name: "Acme Retail".to_string(),
            address: Some("350 Fifth Avenue, New York".to_string()),
            phone: Some("+1 212-555-0100".to_string()),
            email: Some("owner@acme-retail.test".to_string()),
        })
        .await?;

    let store = db
        .stores()
        .create(
            &business.id,
            NewStore {
                name: "New York".to_string(),
                code: "NYC".to_string(),
                is_active: true,
            },
        )
        .await?;
    println!("✓ Created business {} with store {}", business.name, store.code);

    let mut staff_ids = Vec::new();
    for (idx, name) in ["Grace Hopper", "Linus Torvalds"].iter().enumerate() {
        let staff = db
            .staff()
            .create(
                &store.id,
                NewStaff {
                    name: name.to_string(),
                    staff_number: format!("S-{:03}", idx + 1),
                    mobile_number: format!("555-01{:02}", 50 + idx),
                    country_code: "+1".to_string(),
                    pay_per_month_cents: 320_000,
                    signed_contract: true,
                },
            )
            .await?;
        staff_ids.push(staff.id);
    }
    println!("✓ Created {} staff members", staff_ids.len());

    let mut item_ids = Vec::new();
    for (name, kind, cost, price, quantity) in ITEMS {
        let item = db
            .inventory()
            .create(
                &store.id,
                NewInventory {
                    name: name.to_string(),
                    kind: kind.to_string(),
                    cost_price_cents: *cost,
                    selling_price_cents: *price,
                    quantity: *quantity,
                },
            )
            .await?;
        item_ids.push(item.id);
    }
    println!("✓ Created {} inventory items", item_ids.len());

    let mut customer_ids = Vec::new();
    for n in 0..customers {
        let first = FIRST_NAMES[n % FIRST_NAMES.len()];
        let last = LAST_NAMES[(n / FIRST_NAMES.len()) % LAST_NAMES.len()];
        let customer = db
            .customers()
            .create(
                &store.id,
                NewCustomer {
                    name: format!("{first} {last}"),
                    mobile_number: format!("555-{:04}", 1000 + n),
                    country_code: "+1".to_string(),
                    address: None,
                    customer_number: None,
                },
            )
            .await?;
        customer_ids.push(customer.id);
    }
    println!("✓ Created {} customers", customer_ids.len());

    let mut sales = 0;
    for (n, customer_id) in customer_ids.iter().enumerate().take(10) {
        let request = SaleRequest {
            store_id: store.id.clone(),
            inventory_id: item_ids[n % item_ids.len()].clone(),
            quantity: (n % 3 + 1) as i64,
            staff_id: staff_ids[n % staff_ids.len()].clone(),
            customer_id: customer_id.clone(),
        };
        match db.sales().record_sale(request).await {
            Ok(_) => sales += 1,
            Err(e) => eprintln!("Failed to record sale: {}", e),
        }
    }
    println!("✓ Recorded {} sales", sales);

    let summary = db.profit_loss().summary(&store.id).await?;
    println!();
    println!(
        "Profit/loss: {} items sold {} units, revenue {}, net {}",
        summary.item_count,
        summary.total_quantity_sold,
        storekeep_core::Money::from_cents(summary.total_revenue_cents),
        storekeep_core::Money::from_cents(summary.total_net_profit_cents),
    );

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    Ok(())
}
