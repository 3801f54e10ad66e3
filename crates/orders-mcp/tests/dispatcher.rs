//! End-to-end dispatcher tests against an in-memory catalog store.

use orders_core::ChartConfig;
use orders_mcp::{ChartDelegate, Dispatcher, ToolKind, ToolResponse};
use serde_json::{json, Value};
use sqlx::{Row, SqlitePool};

async fn setup() -> (SqlitePool, Dispatcher) {
    let pool = orders_store::connect_in_memory().await.unwrap();
    let chart = ChartDelegate::new(ChartConfig::default(), "http://localhost:8000");
    let dispatcher = Dispatcher::new(pool.clone(), chart);
    (pool, dispatcher)
}

async fn insert_reference_rows(pool: &SqlitePool) {
    sqlx::query("INSERT INTO regions (region_id, name, city) VALUES ('R1', 'East', 'Hangzhou')")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO customers (customer_id, name, region_id, contact, phone) \
         VALUES ('C1', 'Alibaba', 'R1', 'contact-C1', '13800001234')",
    )
    .execute(pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO customers (customer_id, name, region_id, contact, phone) \
         VALUES ('C2', 'Tencent', 'R1', 'contact-C2', '13800005678')",
    )
    .execute(pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO products (product_id, name, category, unit_price) \
         VALUES ('P1', 'Enterprise Server', 'hardware', 100.0)",
    )
    .execute(pool)
    .await
    .unwrap();
}

async fn insert_order(
    pool: &SqlitePool,
    order_id: &str,
    customer_id: &str,
    quantity: i64,
    total_amount: f64,
    order_date: &str,
    status: &str,
) {
    sqlx::query(
        "INSERT INTO orders (order_id, customer_id, product_id, quantity, unit_price, \
         total_amount, order_date, status) VALUES (?, ?, 'P1', ?, 100.0, ?, ?, ?)",
    )
    .bind(order_id)
    .bind(customer_id)
    .bind(quantity)
    .bind(total_amount)
    .bind(order_date)
    .bind(status)
    .execute(pool)
    .await
    .unwrap();
}

/// Parse the single JSON text block of a successful response.
fn payload(response: &ToolResponse) -> Value {
    assert!(!response.is_error, "unexpected error: {:?}", response.content);
    serde_json::from_str(response.content[0].as_text()).unwrap()
}

#[tokio::test]
async fn every_tool_returns_at_least_one_content_block() {
    let (pool, dispatcher) = setup().await;
    insert_reference_rows(&pool).await;
    insert_order(&pool, "OR1", "C1", 5, 500.0, "2025-01-10", "pending-payment").await;

    let well_formed: Vec<(&str, Value)> = vec![
        ("order_summary", json!({"aggregate": "sum", "field": "total_amount"})),
        ("orders_by_group", json!({"group_by": "customer"})),
        (
            "orders_by_date_range",
            json!({"start_date": "2025-01-01", "end_date": "2025-12-31"}),
        ),
        ("list_orders", json!({})),
        ("order_detail", json!({"order_id": "OR1"})),
        (
            "update_order_status",
            json!({"order_id": "OR1", "new_status": "paid"}),
        ),
        ("list_customers", json!({})),
        ("list_products", json!({})),
        ("customer_chart", json!({})),
    ];
    assert_eq!(well_formed.len(), ToolKind::ALL.len());

    for (name, args) in well_formed {
        let response = dispatcher.invoke(name, &args).await;
        assert!(!response.content.is_empty(), "{name} returned no content");
    }
}

#[tokio::test]
async fn summary_count_ignores_field_while_sum_does_not() {
    let (pool, dispatcher) = setup().await;
    insert_reference_rows(&pool).await;
    insert_order(&pool, "OR1", "C1", 3, 300.0, "2025-01-10", "paid").await;
    insert_order(&pool, "OR2", "C1", 7, 700.0, "2025-02-10", "paid").await;
    insert_order(&pool, "OR3", "C2", 2, 200.0, "2025-03-10", "shipped").await;

    let count = dispatcher
        .invoke("order_summary", &json!({"aggregate": "count", "field": "quantity"}))
        .await;
    assert_eq!(count.content[0].as_text(), "COUNT(quantity) = 3");

    let sum = dispatcher
        .invoke("order_summary", &json!({"aggregate": "sum", "field": "quantity"}))
        .await;
    assert_eq!(sum.content[0].as_text(), "SUM(quantity) = 12");
}

#[tokio::test]
async fn summary_over_empty_set_reads_zero() {
    let (_pool, dispatcher) = setup().await;
    let response = dispatcher
        .invoke("order_summary", &json!({"aggregate": "sum", "field": "total_amount"}))
        .await;
    assert_eq!(response.content[0].as_text(), "SUM(total_amount) = 0");
}

#[tokio::test]
async fn summary_condition_filters_with_a_bound_value() {
    let (pool, dispatcher) = setup().await;
    insert_reference_rows(&pool).await;
    insert_order(&pool, "OR1", "C1", 3, 300.0, "2025-01-10", "paid").await;
    insert_order(&pool, "OR2", "C1", 7, 700.0, "2025-02-10", "cancelled").await;

    let response = dispatcher
        .invoke(
            "order_summary",
            &json!({
                "aggregate": "sum",
                "field": "total_amount",
                "condition": "status = 'paid'"
            }),
        )
        .await;
    assert_eq!(response.content[0].as_text(), "SUM(total_amount) = 300");
}

#[tokio::test]
async fn summary_rejects_injection_shaped_conditions() {
    let (pool, dispatcher) = setup().await;
    insert_reference_rows(&pool).await;
    insert_order(&pool, "OR1", "C1", 3, 300.0, "2025-01-10", "paid").await;

    let response = dispatcher
        .invoke(
            "order_summary",
            &json!({
                "aggregate": "sum",
                "field": "total_amount",
                "condition": "1=1; DROP TABLE orders"
            }),
        )
        .await;
    assert!(response.is_error);

    // table is intact
    let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM orders")
        .fetch_one(&pool)
        .await
        .unwrap()
        .get("n");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn summary_rejects_field_outside_the_enum() {
    let (_pool, dispatcher) = setup().await;
    let response = dispatcher
        .invoke("order_summary", &json!({"aggregate": "sum", "field": "status"}))
        .await;
    assert!(response.is_error);
    assert!(response.content[0].as_text().contains("invalid field"));
}

#[tokio::test]
async fn update_status_outside_enum_is_rejected_without_mutation() {
    let (pool, dispatcher) = setup().await;
    insert_reference_rows(&pool).await;
    insert_order(&pool, "OR1", "C1", 5, 500.0, "2025-01-10", "paid").await;

    let response = dispatcher
        .invoke(
            "update_order_status",
            &json!({"order_id": "OR1", "new_status": "returned"}),
        )
        .await;
    assert!(response.is_error);
    assert!(response.content[0].as_text().contains("invalid order status"));

    let status: String = sqlx::query("SELECT status FROM orders WHERE order_id = 'OR1'")
        .fetch_one(&pool)
        .await
        .unwrap()
        .get("status");
    assert_eq!(status, "paid");
}

#[tokio::test]
async fn update_status_on_missing_order_reports_not_found() {
    let (pool, dispatcher) = setup().await;
    insert_reference_rows(&pool).await;

    let response = dispatcher
        .invoke(
            "update_order_status",
            &json!({"order_id": "OR999", "new_status": "shipped"}),
        )
        .await;
    assert!(response.is_error);
    assert!(response.content[0].as_text().contains("not found"));

    let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM orders")
        .fetch_one(&pool)
        .await
        .unwrap()
        .get("n");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn list_orders_pages_are_disjoint() {
    let (pool, dispatcher) = setup().await;
    insert_reference_rows(&pool).await;
    for i in 0..45 {
        insert_order(
            &pool,
            &format!("OR{i:03}"),
            "C1",
            1,
            100.0,
            &format!("2025-01-{:02}", (i % 28) + 1),
            "paid",
        )
        .await;
    }

    let ids = |value: &Value| -> Vec<String> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["order_id"].as_str().unwrap().to_string())
            .collect()
    };

    let first = payload(
        &dispatcher
            .invoke("list_orders", &json!({"limit": 20, "offset": 0}))
            .await,
    );
    let second = payload(
        &dispatcher
            .invoke("list_orders", &json!({"limit": 20, "offset": 20}))
            .await,
    );

    let first_ids = ids(&first);
    let second_ids = ids(&second);
    assert_eq!(first_ids.len(), 20);
    assert_eq!(second_ids.len(), 20);
    for id in &first_ids {
        assert!(!second_ids.contains(id), "{id} appears on both pages");
    }
}

#[tokio::test]
async fn list_orders_rejects_raw_sql_in_order_by() {
    let (_pool, dispatcher) = setup().await;
    let response = dispatcher
        .invoke("list_orders", &json!({"order_by": "order_date DESC; --"}))
        .await;
    assert!(response.is_error);
    assert!(response.content[0].as_text().contains("invalid order_by"));
}

#[tokio::test]
async fn order_detail_preserves_stored_total_amount() {
    let (pool, dispatcher) = setup().await;
    insert_reference_rows(&pool).await;
    // total deliberately diverges from quantity * unit_price
    insert_order(&pool, "OR1", "C1", 5, 1234.56, "2025-01-10", "paid").await;

    let detail = payload(&dispatcher.invoke("order_detail", &json!({"order_id": "OR1"})).await);
    assert_eq!(detail["total_amount"], json!(1234.56));
    assert_eq!(detail["customer_name"], json!("Alibaba"));
    assert_eq!(detail["product_name"], json!("Enterprise Server"));
}

#[tokio::test]
async fn order_detail_missing_id_reports_not_found() {
    let (_pool, dispatcher) = setup().await;
    let response = dispatcher.invoke("order_detail", &json!({"order_id": "OR404"})).await;
    assert!(response.is_error);
    assert!(response.content[0].as_text().contains("not found"));
}

#[tokio::test]
async fn group_totals_respect_limit_and_direction() {
    let (pool, dispatcher) = setup().await;
    insert_reference_rows(&pool).await;
    sqlx::query(
        "INSERT INTO customers (customer_id, name, region_id) VALUES ('C3', 'Baidu', 'R1')",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO customers (customer_id, name, region_id) VALUES ('C4', 'Didi', 'R1')",
    )
    .execute(&pool)
    .await
    .unwrap();
    insert_order(&pool, "OR1", "C1", 1, 400.0, "2025-01-10", "paid").await;
    insert_order(&pool, "OR2", "C2", 1, 300.0, "2025-01-11", "paid").await;
    insert_order(&pool, "OR3", "C3", 1, 200.0, "2025-01-12", "paid").await;
    insert_order(&pool, "OR4", "C4", 1, 100.0, "2025-01-13", "paid").await;

    let top = payload(
        &dispatcher
            .invoke("orders_by_group", &json!({"group_by": "customer", "limit": 3}))
            .await,
    );
    let groups = top.as_array().unwrap();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0]["group"], json!("Alibaba"));
    assert_eq!(groups[0]["total"], json!(400.0));
    assert_eq!(groups[2]["group"], json!("Baidu"));

    let bottom = payload(
        &dispatcher
            .invoke(
                "orders_by_group",
                &json!({"group_by": "customer", "limit": 3, "order": "asc"}),
            )
            .await,
    );
    assert_eq!(bottom.as_array().unwrap()[0]["group"], json!("Didi"));
}

#[tokio::test]
async fn date_range_filters_inclusively_and_sorts_descending() {
    let (pool, dispatcher) = setup().await;
    insert_reference_rows(&pool).await;
    insert_order(&pool, "OR1", "C1", 1, 100.0, "2025-01-10", "paid").await;
    insert_order(&pool, "OR2", "C1", 1, 100.0, "2025-02-10", "paid").await;
    insert_order(&pool, "OR3", "C1", 1, 100.0, "2025-03-10", "shipped").await;

    let rows = payload(
        &dispatcher
            .invoke(
                "orders_by_date_range",
                &json!({"start_date": "2025-01-10", "end_date": "2025-02-28"}),
            )
            .await,
    );
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["order_id"], json!("OR2"));
    assert_eq!(rows[1]["order_id"], json!("OR1"));

    let response = dispatcher
        .invoke(
            "orders_by_date_range",
            &json!({"start_date": "10/01/2025", "end_date": "2025-02-28"}),
        )
        .await;
    assert!(response.is_error);
    assert!(response.content[0].as_text().contains("invalid start_date"));
}

#[tokio::test]
async fn reference_listings_filter_by_region_and_category() {
    let (pool, dispatcher) = setup().await;
    insert_reference_rows(&pool).await;
    sqlx::query("INSERT INTO regions (region_id, name, city) VALUES ('R2', 'South', 'Shenzhen')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO customers (customer_id, name, region_id) VALUES ('C9', 'DJI', 'R2')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO products (product_id, name, category, unit_price) \
         VALUES ('P2', 'Cloud Compute', 'service', 12000.0)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let south = payload(&dispatcher.invoke("list_customers", &json!({"region_id": "R2"})).await);
    assert_eq!(south.as_array().unwrap().len(), 1);
    assert_eq!(south[0]["name"], json!("DJI"));

    let services = payload(&dispatcher.invoke("list_products", &json!({"category": "service"})).await);
    assert_eq!(services.as_array().unwrap().len(), 1);
    assert_eq!(services[0]["product_id"], json!("P2"));

    let all = payload(&dispatcher.invoke("list_customers", &json!({})).await);
    assert_eq!(all.as_array().unwrap().len(), 3);
}

// One customer, one product, one order moving from pending-payment to
// shipped, observed through summary, update and detail.
#[tokio::test]
async fn end_to_end_status_lifecycle() {
    let (pool, dispatcher) = setup().await;
    insert_reference_rows(&pool).await;
    insert_order(&pool, "OR1", "C1", 5, 500.0, "2025-01-10", "pending-payment").await;

    let sum = dispatcher
        .invoke("order_summary", &json!({"aggregate": "sum", "field": "total_amount"}))
        .await;
    assert_eq!(sum.content[0].as_text(), "SUM(total_amount) = 500");

    let update = payload(
        &dispatcher
            .invoke(
                "update_order_status",
                &json!({"order_id": "OR1", "new_status": "shipped"}),
            )
            .await,
    );
    assert_eq!(update["affected"], json!(1));

    let detail = payload(&dispatcher.invoke("order_detail", &json!({"order_id": "OR1"})).await);
    assert_eq!(detail["status"], json!("shipped"));
}
