//! # Seed Data Generator
//!
//! Populates the database with a demo coffee menu and a few customers.
//!
//! ## Usage
//! ```bash
//! # Seed ./cafe_dev.db
//! cargo run -p cafe-db --bin seed
//!
//! # Specify database path
//! cargo run -p cafe-db --bin seed -- --db ./data/cafe.db
//!
//! # Also write some demo sales
//! cargo run -p cafe-db --bin seed -- --sales 25
//! ```
//!
//! Running it against a database that already has products does nothing.

use std::env;

use cafe_core::{CustomerInput, ProductInput, SaleBuilder};
use cafe_db::bootstrap::{ensure_defaults, DEFAULT_ADMIN_PASSWORD};
use cafe_db::{Database, DbConfig};

/// `(category, [(name, price_cents, stock)])`
const MENU: &[(&str, &[(&str, i64, i64)])] = &[
    (
        "Hot Drinks",
        &[
            ("Espresso", 500, 80),
            ("Double Espresso", 700, 60),
            ("Americano", 600, 80),
            ("Cappuccino", 850, 60),
            ("Latte", 900, 60),
            ("Flat White", 950, 40),
            ("Mocha", 1000, 40),
            ("Hot Chocolate", 800, 30),
            ("Chai Latte", 900, 25),
        ],
    ),
    (
        "Cold Drinks",
        &[
            ("Iced Latte", 1000, 40),
            ("Cold Brew", 1100, 30),
            ("Frappuccino", 1300, 25),
            ("Lemonade", 700, 20),
            ("Bottled Water", 300, 100),
        ],
    ),
    (
        "Pastry",
        &[
            ("Croissant", 650, 24),
            ("Chocolate Muffin", 700, 18),
            ("Blueberry Muffin", 700, 18),
            ("Cinnamon Roll", 750, 12),
            ("Cheesecake Slice", 1200, 8),
        ],
    ),
    (
        "Sandwiches",
        &[
            ("Ham & Cheese", 1400, 10),
            ("Chicken Avocado", 1700, 8),
            ("Caprese", 1500, 6),
        ],
    ),
    (
        "Beans",
        &[
            ("House Blend 250g", 3500, 15),
            ("Single Origin Cusco 250g", 4500, 6),
        ],
    ),
];

const CUSTOMERS: &[(&str, Option<&str>, Option<&str>)] = &[
    ("Ana Torres", Some("ana@example.com"), Some("987654321")),
    ("Luis Ramos", None, Some("912345678")),
    ("Carla Mendoza", Some("carla@example.com"), None),
    ("Jorge Quispe", None, None),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./cafe_dev.db");
    let mut sales: usize = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Cafe POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./cafe_dev.db)");
                println!("  -s, --sales <N>    Demo sales to commit (default: 0)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Cafe POS Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let boot = ensure_defaults(&db, DEFAULT_ADMIN_PASSWORD).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");
    if boot.admin_created {
        println!("✓ Admin account created (admin / {})", DEFAULT_ADMIN_PASSWORD);
    }

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Loading menu...");

    let mut products = Vec::new();
    for (category, items) in MENU {
        for (name, price_cents, stock) in items.iter() {
            let input = ProductInput {
                name: name.to_string(),
                category: category.to_string(),
                price_cents: *price_cents,
                stock: *stock,
                min_stock: 10.min(*stock / 2),
                description: String::new(),
            };

            match db.products().insert(&input).await {
                Ok(product) => products.push(product),
                Err(e) => eprintln!("Failed to insert {}: {}", name, e),
            }
        }
    }
    println!("✓ {} products", products.len());

    for (name, email, phone) in CUSTOMERS {
        let input = CustomerInput {
            name: name.to_string(),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
        };
        db.customers().insert(&input).await?;
    }
    println!("✓ {} customers", CUSTOMERS.len());

    if sales > 0 && !products.is_empty() {
        let mut committed = 0;
        for n in 0..sales {
            // Deterministic spread across the menu and customer list
            let mut cart = SaleBuilder::new();
            for k in 0..(1 + n % 3) {
                let product = &products[(n * 7 + k * 5) % products.len()];
                let current = db.products().require(product.id).await?;
                if cart.add(&current, 1 + ((n + k) % 2) as i64).is_err() {
                    continue;
                }
            }

            let Ok(draft) = cart.draft() else {
                continue;
            };
            let customer = if n % 4 == 3 {
                ""
            } else {
                CUSTOMERS[n % CUSTOMERS.len()].0
            };

            match db.sales().commit_sale(&draft, customer, None).await {
                Ok(_) => committed += 1,
                Err(e) => eprintln!("Failed to commit demo sale: {}", e),
            }
        }
        println!("✓ {} demo sales", committed);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
