//! # Seed Data Generator
//!
//! Populates a development database with a realistic corner-store
//! catalog, demo accounts, and opening stock.
//!
//! ## Usage
//! ```bash
//! # Seed ./corner_dev.db
//! cargo run -p corner-db --bin seed
//!
//! # Specify database path
//! cargo run -p corner-db --bin seed -- --db ./data/corner.db
//!
//! # Wipe and re-seed an existing database
//! cargo run -p corner-db --bin seed -- --force
//! ```
//!
//! ## What Gets Created
//! - Accounts: `admin / admin123` and `cashier / cashier123`
//! - 16 categories covering a small grocery store
//! - ~25 products with realistic prices and reorder levels
//! - An `initial` ledger movement per product (opening stock)
//! - A few demo customers for phone lookup

use std::collections::HashMap;
use std::env;

use corner_core::{MovementKind, Role, UserIdentity};
use corner_db::{Database, DbConfig, NewProduct, NewUser};

/// (name, description)
const CATEGORIES: &[(&str, &str)] = &[
    ("Groceries", "Staples and dry goods"),
    ("Dairy", "Milk, eggs, and chilled goods"),
    ("Beverages", "Drinks, juices, and water"),
    ("Snacks", "Chips, chocolate, and confectionery"),
    ("Household", "Cleaning and home supplies"),
    ("Personal Care", "Hygiene and grooming"),
    ("Bakery", "Fresh bread and baked goods"),
    ("Fruits", "Fresh fruit"),
    ("Vegetables", "Fresh vegetables"),
    ("Meat", "Fresh and chilled meat"),
    ("Frozen Foods", "Freezer cabinet"),
    ("Canned Goods", "Tins and preserves"),
    ("Condiments", "Sauces and seasonings"),
    ("Cereals", "Breakfast cereals and oats"),
    ("Electronics", "Batteries and small electronics"),
    ("Stationery", "Pens, paper, and school supplies"),
];

/// (name, category, price_cents, cost_cents, opening_stock, reorder_level)
const PRODUCTS: &[(&str, &str, i64, i64, i64, i64)] = &[
    ("Rice (5kg)", "Groceries", 1299, 950, 50, 10),
    ("Cooking Oil (1L)", "Groceries", 549, 430, 40, 10),
    ("Sugar (1kg)", "Groceries", 189, 140, 60, 15),
    ("Milk (1L)", "Dairy", 299, 210, 100, 15),
    ("Butter (500g)", "Dairy", 450, 340, 30, 8),
    ("Eggs (Dozen)", "Dairy", 329, 250, 80, 20),
    ("Cola (2L)", "Beverages", 199, 140, 120, 20),
    ("Orange Juice (1L)", "Beverages", 349, 250, 45, 10),
    ("Mineral Water (1.5L)", "Beverages", 99, 60, 200, 30),
    ("Potato Chips (200g)", "Snacks", 299, 200, 90, 20),
    ("Chocolate Bar", "Snacks", 149, 100, 150, 25),
    ("Dish Soap (500ml)", "Household", 249, 180, 35, 8),
    ("Laundry Powder (1kg)", "Household", 599, 450, 25, 6),
    ("Shampoo (400ml)", "Personal Care", 499, 370, 30, 8),
    ("Toothpaste (100g)", "Personal Care", 229, 160, 40, 10),
    ("Bread (White)", "Bakery", 199, 140, 80, 10),
    ("Apples (1kg)", "Fruits", 399, 280, 60, 12),
    ("Bananas (1kg)", "Fruits", 249, 170, 70, 15),
    ("Onions (1kg)", "Vegetables", 179, 120, 90, 20),
    ("Tomatoes (1kg)", "Vegetables", 229, 160, 75, 18),
    ("Chicken (1kg)", "Meat", 899, 720, 25, 8),
    ("Frozen Peas (500g)", "Frozen Foods", 279, 200, 40, 10),
    ("Baked Beans (400g)", "Canned Goods", 159, 110, 55, 12),
    ("Ketchup (500ml)", "Condiments", 269, 190, 35, 8),
    ("Corn Flakes (500g)", "Cereals", 429, 320, 45, 10),
    ("AA Batteries (4-pack)", "Electronics", 399, 280, 50, 10),
    ("Ballpoint Pen", "Stationery", 49, 25, 200, 30),
];

/// (name, phone)
const CUSTOMERS: &[(&str, &str)] = &[
    ("Ayesha Khan", "0300-1234567"),
    ("Bilal Ahmed", "0321-7654321"),
    ("Fatima Noor", "0333-5550199"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./corner_dev.db");
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--force" | "-f" => {
                force = true;
            }
            "--help" | "-h" => {
                println!("Corner POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./corner_dev.db)");
                println!("  -f, --force        Wipe existing data and re-seed");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Corner POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    let (total, applied) = corner_db::migrations::migration_status(db.pool()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied ({}/{})", applied, total);

    // Check for existing data
    let existing = db.users().count().await? + db.products().count().await?;
    if existing > 0 {
        if !force {
            println!();
            println!("⚠ Database already has data ({} users/products)", existing);
            println!("  Re-run with --force to wipe and re-seed.");
            return Ok(());
        }

        println!();
        println!("⚠ Wiping existing data (--force)");
        wipe(&db).await?;
    }

    // Accounts first: every later write is attributed to the admin
    println!();
    println!("Creating accounts...");

    let boot = UserIdentity {
        id: "seed".to_string(),
        username: "seed".to_string(),
        full_name: "Seed".to_string(),
        role: Role::Admin,
    };
    let admin = db
        .users()
        .create(
            &boot,
            NewUser {
                username: "admin".to_string(),
                password: "admin123".to_string(),
                full_name: "Administrator".to_string(),
                role: Role::Admin,
                email: None,
            },
        )
        .await?;
    db.users()
        .create(
            &admin,
            NewUser {
                username: "cashier".to_string(),
                password: "cashier123".to_string(),
                full_name: "Till Cashier".to_string(),
                role: Role::Cashier,
                email: None,
            },
        )
        .await?;
    println!("  admin / admin123 (admin), cashier / cashier123 (cashier)");

    // Categories
    println!();
    println!("Creating catalog...");

    let mut categories: HashMap<&str, String> = HashMap::new();
    for (name, description) in CATEGORIES {
        let category = db
            .categories()
            .create(&admin, name, Some(description))
            .await?;
        categories.insert(name, category.id);
    }
    println!("  {} categories", categories.len());

    // Products with opening stock
    let mut stocked = 0;
    for (name, category, price_cents, cost_cents, opening_stock, reorder_level) in PRODUCTS {
        let category_id = categories
            .get(category)
            .ok_or_else(|| format!("Unknown category in product table: {}", category))?;

        let product = db
            .products()
            .create(
                &admin,
                NewProduct {
                    name: name.to_string(),
                    description: None,
                    category_id: category_id.clone(),
                    price_cents: *price_cents,
                    cost_cents: *cost_cents,
                    reorder_level: *reorder_level,
                },
            )
            .await?;

        // The ledger never records a zero delta; a zero row stays unstocked.
        if *opening_stock > 0 {
            db.stock()
                .record_movement(
                    &admin,
                    &product.id,
                    *opening_stock,
                    MovementKind::Initial,
                    None,
                    Some("Opening stock"),
                )
                .await?;
        }
        stocked += 1;
    }
    println!("  {} products with opening stock", stocked);

    // Demo customers
    for (name, phone) in CUSTOMERS {
        db.customers().create(name, phone, None, None).await?;
    }
    println!("  {} customers", CUSTOMERS.len());

    println!();
    println!("✓ Seed complete!");
    println!("  Login: admin / admin123");

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,corner_db=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Deletes all rows, children before parents so no FK trips.
async fn wipe(db: &Database) -> Result<(), corner_db::DbError> {
    for table in [
        "stock_movements",
        "invoice_items",
        "invoices",
        "products",
        "categories",
        "customers",
        "users",
    ] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(db.pool())
            .await?;
    }

    Ok(())
}
