//! Schema bootstrap and seed data.
//!
//! Region, customer and product rows are reference data: seeded once and
//! never updated by any tool. Orders are seeded here too and thereafter
//! mutated only through `update_order_status`.

use chrono::{Days, Utc};
use orders_core::OrderStatus;
use rand::Rng;
use sqlx::SqlitePool;

const REGIONS: &[(&str, &str, &str)] = &[
    ("R001", "East", "Hangzhou"),
    ("R002", "South", "Shenzhen"),
    ("R003", "North", "Beijing"),
    ("R004", "Southwest", "Chengdu"),
    ("R005", "Central", "Wuhan"),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("C001", "Alibaba"),
    ("C002", "Tencent"),
    ("C003", "ByteDance"),
    ("C004", "Meituan"),
    ("C005", "Pinduoduo"),
    ("C006", "JD.com"),
    ("C007", "NetEase"),
    ("C008", "Baidu"),
    ("C009", "Didi"),
    ("C010", "Xiaomi"),
    ("C011", "Huawei"),
    ("C012", "DJI"),
    ("C013", "CATL"),
    ("C014", "BYD"),
    ("C015", "NIO"),
];

const PRODUCTS: &[(&str, &str, &str, f64)] = &[
    ("P001", "Enterprise Server", "hardware", 50000.0),
    ("P002", "Cloud Compute", "service", 12000.0),
    ("P003", "Enterprise Router", "hardware", 8500.0),
    ("P004", "Network Security Appliance", "hardware", 15000.0),
    ("P005", "Software License", "software", 25000.0),
    ("P006", "IT Consulting", "service", 18000.0),
    ("P007", "Data Storage", "service", 8000.0),
    ("P008", "Enterprise Switch", "hardware", 12000.0),
    ("P009", "Cloud Database", "service", 9500.0),
    ("P010", "Enterprise Broadband", "service", 3000.0),
];

const SEED_ORDER_COUNT: usize = 200;

/// Create the four tables if they do not exist.
pub async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS regions (
            region_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            city TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS customers (
            customer_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            region_id TEXT,
            contact TEXT,
            phone TEXT,
            FOREIGN KEY (region_id) REFERENCES regions(region_id)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS products (
            product_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT,
            unit_price REAL NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS orders (
            order_id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL,
            product_id TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            unit_price REAL NOT NULL,
            total_amount REAL NOT NULL,
            order_date TEXT NOT NULL,
            status TEXT NOT NULL,
            shipping_address TEXT,
            notes TEXT,
            FOREIGN KEY (customer_id) REFERENCES customers(customer_id),
            FOREIGN KEY (product_id) REFERENCES products(product_id)
        )",
    )
    .execute(pool)
    .await?;

    tracing::debug!("catalog tables ready");
    Ok(())
}

/// Counts reported after seeding.
#[derive(Debug, Clone, Copy)]
pub struct SeedSummary {
    pub regions: usize,
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
}

/// Populate the store with reference data and randomized orders.
///
/// Idempotent: every insert is `INSERT OR IGNORE`, so re-seeding an existing
/// database leaves it unchanged. Order totals carry a simulated price
/// fluctuation: `total_amount` is quantity x unit_price scaled by a factor in
/// [0.8, 1.2] and persisted as written, never recomputed on read.
pub async fn seed(pool: &SqlitePool) -> Result<SeedSummary, sqlx::Error> {
    let mut rng = rand::rng();

    for (region_id, name, city) in REGIONS {
        sqlx::query("INSERT OR IGNORE INTO regions (region_id, name, city) VALUES (?, ?, ?)")
            .bind(region_id)
            .bind(name)
            .bind(city)
            .execute(pool)
            .await?;
    }

    for (customer_id, name) in CUSTOMERS {
        let region_id = REGIONS[rng.random_range(0..REGIONS.len())].0;
        sqlx::query(
            "INSERT OR IGNORE INTO customers (customer_id, name, region_id, contact, phone) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(customer_id)
        .bind(name)
        .bind(region_id)
        .bind(format!("contact-{customer_id}"))
        .bind(format!("1380000{}", rng.random_range(1000..10000)))
        .execute(pool)
        .await?;
    }

    for (product_id, name, category, unit_price) in PRODUCTS {
        sqlx::query(
            "INSERT OR IGNORE INTO products (product_id, name, category, unit_price) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(product_id)
        .bind(name)
        .bind(category)
        .bind(unit_price)
        .execute(pool)
        .await?;
    }

    let today = Utc::now().date_naive();
    let mut orders = 0usize;
    for i in 0..SEED_ORDER_COUNT {
        let order_id = format!("OR2025{:04}", i + 1);
        let (customer_id, _) = CUSTOMERS[rng.random_range(0..CUSTOMERS.len())];
        let (product_id, _, _, unit_price) = PRODUCTS[rng.random_range(0..PRODUCTS.len())];
        let quantity: i64 = rng.random_range(1..=20);
        let total = (quantity as f64) * unit_price * rng.random_range(0.8..1.2);

        // Mostly settled orders, a few in every other state
        let status = if rng.random_bool(0.7) {
            if rng.random_bool(0.5) {
                OrderStatus::Completed
            } else {
                OrderStatus::Shipped
            }
        } else {
            OrderStatus::ALL[rng.random_range(0..OrderStatus::ALL.len())]
        };

        let order_date = today - Days::new(rng.random_range(1..=365));

        let result = sqlx::query(
            "INSERT OR IGNORE INTO orders \
             (order_id, customer_id, product_id, quantity, unit_price, total_amount, \
              order_date, status, shipping_address, notes) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&order_id)
        .bind(customer_id)
        .bind(product_id)
        .bind(quantity)
        .bind((unit_price * 100.0).round() / 100.0)
        .bind((total * 100.0).round() / 100.0)
        .bind(order_date.format("%Y-%m-%d").to_string())
        .bind(status.as_str())
        .bind(format!("{customer_id} warehouse district"))
        .bind(format!("seed order {i}"))
        .execute(pool)
        .await?;
        orders += result.rows_affected() as usize;
    }

    let summary = SeedSummary {
        regions: REGIONS.len(),
        customers: CUSTOMERS.len(),
        products: PRODUCTS.len(),
        orders,
    };
    tracing::info!(
        regions = summary.regions,
        customers = summary.customers,
        products = summary.products,
        orders = summary.orders,
        "seeded catalog store"
    );
    Ok(summary)
}
