//! # Seed Data Generator
//!
//! Populates a development database with warehouses, suppliers,
//! customers, products and an administrator account.
//!
//! ## Usage
//! ```bash
//! # Default: ./warehouse_dev.db, 200 products
//! cargo run -p warehouse-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p warehouse-db --bin seed -- --count 1000 --db ./data/warehouse.db
//! ```
//!
//! The administrator logs in as `admin` / `admin123`.

use rust_decimal::Decimal;
use std::env;
use warehouse_core::auth::Registration;
use warehouse_core::edit::FieldChange;
use warehouse_core::ScalarValue;
use warehouse_db::{Database, DbConfig};

const WAREHOUSES: &[(&str, &str, i64)] = &[
    ("Central", "12 Harbour Road", 5000),
    ("North", "3 Ridge Avenue", 2000),
    ("South", "88 Mill Lane", 1500),
];

const SUPPLIERS: &[&str] = &["Acme Fasteners", "Northwind Tools", "Globex Supply"];

const CUSTOMERS: &[&str] = &["Initech", "Umbrella Builders", "Stark Hardware"];

/// Product families with a unit and a base price in cents.
const FAMILIES: &[(&str, &str, i64)] = &[
    ("Bolt", "pcs", 25),
    ("Nut", "pcs", 10),
    ("Washer", "pcs", 5),
    ("Screw", "pcs", 15),
    ("Hinge", "pcs", 320),
    ("Chain", "m", 780),
    ("Rope", "m", 140),
    ("Paint", "l", 1290),
];

const SIZES: &[&str] = &["M4", "M5", "M6", "M8", "M10", "M12", "M16", "M20"];

fn value(column: &str, value: ScalarValue) -> FieldChange {
    FieldChange {
        column: column.to_string(),
        value,
    }
}

fn text(s: &str) -> ScalarValue {
    ScalarValue::Text(s.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./warehouse_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
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
                println!("Warehouse Master Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./warehouse_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Warehouse Master Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let tables = db.tables();

    let existing = tables.get_all("warehouse", 1).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has warehouses");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut warehouse_ids = Vec::new();
    for (name, address, capacity) in WAREHOUSES {
        let id = tables
            .insert_row(
                "warehouse",
                &[
                    value("warehouse_name", text(name)),
                    value("address", text(address)),
                    value("capacity", ScalarValue::Integer(*capacity)),
                ],
            )
            .await?;
        warehouse_ids.push(id);
    }
    println!("✓ {} warehouses", warehouse_ids.len());

    for name in SUPPLIERS {
        tables
            .insert_row("supplier", &[value("supplier_name", text(name))])
            .await?;
    }
    for name in CUSTOMERS {
        tables
            .insert_row("customer", &[value("customer_name", text(name))])
            .await?;
    }
    println!("✓ {} suppliers, {} customers", SUPPLIERS.len(), CUSTOMERS.len());

    let start = std::time::Instant::now();
    let mut generated = 0;

    for index in 0..count {
        let family_idx = index % FAMILIES.len();
        let size_idx = (index / FAMILIES.len()) % SIZES.len();
        let batch = index / (FAMILIES.len() * SIZES.len());

        let (family, unit, base_cents) = FAMILIES[family_idx];
        let size = SIZES[size_idx];

        let sku = format!("{}-{}-{:03}", family[..3].to_uppercase(), size, batch);
        let price = Decimal::new(base_cents + (size_idx as i64) * 5, 2);
        let warehouse = warehouse_ids[index % warehouse_ids.len()];

        let result = tables
            .insert_row(
                "product",
                &[
                    value("product_name", text(&format!("{} {}", family, size))),
                    value("sku", text(&sku)),
                    value("unit", text(unit)),
                    value("price", ScalarValue::Decimal(price)),
                    value("warehouse_id", ScalarValue::Integer(warehouse)),
                    value("quantity", ScalarValue::Integer(((index * 37) % 500) as i64)),
                ],
            )
            .await;

        if let Err(e) = result {
            eprintln!("Failed to insert {}: {}", sku, e);
            continue;
        }
        generated += 1;

        if generated % 100 == 0 {
            println!("  Generated {} products...", generated);
        }
    }

    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    let admin = Registration {
        full_name: "Administrator".to_string(),
        username: "admin".to_string(),
        password: "admin123".to_string(),
        confirm_password: "admin123".to_string(),
        role_id: Some(1),
        ..Default::default()
    };
    db.users().register(admin).await?;
    println!("✓ Administrator account: admin / admin123");

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
