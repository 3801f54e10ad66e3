//! Tool dispatcher.
//!
//! Single entry point mapping a validated tool invocation onto one
//! parameterized SQL statement and shaping the row set into the tool's
//! public result vocabulary. Every failure inside a call is converted to a
//! content block at this boundary; nothing propagates to the transport.

use crate::chart::{ChartDelegate, ChartKind};
use crate::protocol::ToolResponse;
use crate::query::{
    opt_i64, opt_str, opt_str_filter, req_str, Aggregate, Condition, ConditionValue,
    GroupKey, ListOrderBy, SortDir, SummaryField,
};
use crate::registry::ToolKind;
use chrono::NaiveDate;
use orders_core::OrderStatus;
use orders_store::{round2, round_currency_fields, row_to_json, rows_to_json};
use serde_json::{json, Value};
use sqlx::{Row, SqlitePool};

/// Internal failure of a single handler, mapped to a content block.
enum InvokeError {
    Validation(String),
    Store(sqlx::Error),
}

impl From<String> for InvokeError {
    fn from(message: String) -> Self {
        InvokeError::Validation(message)
    }
}

impl From<sqlx::Error> for InvokeError {
    fn from(error: sqlx::Error) -> Self {
        InvokeError::Store(error)
    }
}

/// Dispatches tool calls against the catalog store.
///
/// Holds only shared read-only state (a connection pool and the chart
/// delegate configuration); concurrent invocations are independent.
#[derive(Clone)]
pub struct Dispatcher {
    pool: SqlitePool,
    chart: ChartDelegate,
}

impl Dispatcher {
    pub fn new(pool: SqlitePool, chart: ChartDelegate) -> Self {
        Self { pool, chart }
    }

    /// Invoke a tool by name. Never fails structurally: unknown tools,
    /// invalid arguments and store errors all come back as content blocks.
    pub async fn invoke(&self, name: &str, arguments: &Value) -> ToolResponse {
        let Some(kind) = ToolKind::from_name(name) else {
            return ToolResponse::error(format!("unknown tool: {name}"));
        };

        let result = match kind {
            ToolKind::OrderSummary => self.order_summary(arguments).await,
            ToolKind::OrdersByGroup => self.orders_by_group(arguments).await,
            ToolKind::OrdersByDateRange => self.orders_by_date_range(arguments).await,
            ToolKind::ListOrders => self.list_orders(arguments).await,
            ToolKind::OrderDetail => self.order_detail(arguments).await,
            ToolKind::UpdateOrderStatus => self.update_order_status(arguments).await,
            ToolKind::ListCustomers => self.list_customers(arguments).await,
            ToolKind::ListProducts => self.list_products(arguments).await,
            ToolKind::CustomerChart => self.customer_chart(arguments).await,
        };

        match result {
            Ok(response) => response,
            Err(InvokeError::Validation(message)) => ToolResponse::error(message),
            Err(InvokeError::Store(error)) => {
                tracing::warn!(tool = name, error = %error, "tool execution failed");
                ToolResponse::error(format!("database error: {error}"))
            }
        }
    }

    async fn order_summary(&self, args: &Value) -> Result<ToolResponse, InvokeError> {
        let aggregate = Aggregate::parse(req_str(args, "aggregate")?)?;
        let field = SummaryField::parse(req_str(args, "field")?)?;
        let condition = Condition::parse(opt_str(args, "condition", ""))?;

        let mut sql = format!(
            "SELECT {}({}) AS result FROM orders",
            aggregate.sql(),
            field.column()
        );
        if let Some(condition) = &condition {
            sql.push_str(" WHERE ");
            sql.push_str(&condition.sql());
        }

        let mut query = sqlx::query(&sql);
        if let Some(condition) = &condition {
            query = match &condition.value {
                ConditionValue::Number(n) => query.bind(*n),
                ConditionValue::Text(t) => query.bind(t),
            };
        }

        let row = query.fetch_one(&self.pool).await?;
        // NULL aggregate over an empty set reads as 0
        let value: f64 = if let Ok(v) = row.try_get::<i64, _>("result") {
            v as f64
        } else if let Ok(v) = row.try_get::<f64, _>("result") {
            v
        } else {
            0.0
        };

        Ok(ToolResponse::text(format!(
            "{}({}) = {}",
            aggregate.sql(),
            field.column(),
            format_scalar(round2(value))
        )))
    }

    async fn orders_by_group(&self, args: &Value) -> Result<ToolResponse, InvokeError> {
        let group = GroupKey::parse(req_str(args, "group_by")?)?;
        let dir = SortDir::parse(opt_str(args, "order", "desc"))?;
        let limit = opt_i64(args, "limit", 10).max(0);

        let sql = format!(
            "SELECT {label} AS grp, SUM(o.total_amount) AS total, \
             AVG(o.total_amount) AS average, COUNT(*) AS order_count \
             FROM orders o JOIN customers c ON o.customer_id = c.customer_id \
             GROUP BY {label} ORDER BY total {dir} LIMIT ?",
            label = group.label_expr(),
            dir = dir.sql()
        );

        let rows = sqlx::query(&sql).bind(limit).fetch_all(&self.pool).await?;
        let data: Vec<Value> = rows
            .iter()
            .map(|row| {
                // region_id is nullable, so the group label may be null
                let label = row.try_get::<Option<String>, _>("grp").ok().flatten();
                json!({
                    "group": label,
                    "total": round2(row.try_get::<f64, _>("total").unwrap_or(0.0)),
                    "average": round2(row.try_get::<f64, _>("average").unwrap_or(0.0)),
                    "count": row.try_get::<i64, _>("order_count").unwrap_or(0),
                })
            })
            .collect();

        Ok(ToolResponse::json(&Value::Array(data)))
    }

    async fn orders_by_date_range(&self, args: &Value) -> Result<ToolResponse, InvokeError> {
        let start = parse_date(req_str(args, "start_date")?, "start_date")?;
        let end = parse_date(req_str(args, "end_date")?, "end_date")?;
        let status = opt_str_filter(args, "status");

        let mut sql = String::from(
            "SELECT o.order_id, c.name AS customer_name, o.total_amount AS amount, \
             o.order_date AS date, o.status \
             FROM orders o JOIN customers c ON o.customer_id = c.customer_id \
             WHERE o.order_date BETWEEN ? AND ?",
        );
        if status.is_some() {
            sql.push_str(" AND o.status = ?");
        }
        sql.push_str(" ORDER BY o.order_date DESC");

        let mut query = sqlx::query(&sql)
            .bind(start.format("%Y-%m-%d").to_string())
            .bind(end.format("%Y-%m-%d").to_string());
        if let Some(status) = status {
            query = query.bind(status);
        }

        let rows = query.fetch_all(&self.pool).await?;
        let mut data = rows_to_json(&rows, &[]);
        round_currency_fields(&mut data, &["amount"]);
        Ok(ToolResponse::json(&data))
    }

    async fn list_orders(&self, args: &Value) -> Result<ToolResponse, InvokeError> {
        let order_by = ListOrderBy::parse(opt_str(args, "order_by", "date_desc"))?;
        let limit = opt_i64(args, "limit", 20).clamp(0, 1000);
        let offset = opt_i64(args, "offset", 0).max(0);
        let status = opt_str_filter(args, "status");
        let customer_id = opt_str_filter(args, "customer_id");

        let mut sql = String::from(
            "SELECT o.order_id, c.name AS customer_name, p.name AS product_name, \
             o.quantity, o.total_amount AS amount, o.order_date AS date, o.status \
             FROM orders o \
             JOIN customers c ON o.customer_id = c.customer_id \
             JOIN products p ON o.product_id = p.product_id \
             WHERE 1=1",
        );
        if status.is_some() {
            sql.push_str(" AND o.status = ?");
        }
        if customer_id.is_some() {
            sql.push_str(" AND o.customer_id = ?");
        }
        sql.push_str(&format!(" ORDER BY {} LIMIT ? OFFSET ?", order_by.sql()));

        let mut query = sqlx::query(&sql);
        if let Some(status) = status {
            query = query.bind(status);
        }
        if let Some(customer_id) = customer_id {
            query = query.bind(customer_id);
        }
        query = query.bind(limit).bind(offset);

        let rows = query.fetch_all(&self.pool).await?;
        let mut data = rows_to_json(&rows, &[]);
        round_currency_fields(&mut data, &["amount"]);
        Ok(ToolResponse::json(&data))
    }

    async fn order_detail(&self, args: &Value) -> Result<ToolResponse, InvokeError> {
        let order_id = req_str(args, "order_id")?;

        let row = sqlx::query(
            "SELECT o.*, c.name AS customer_name, c.phone, p.name AS product_name \
             FROM orders o \
             JOIN customers c ON o.customer_id = c.customer_id \
             JOIN products p ON o.product_id = p.product_id \
             WHERE o.order_id = ?",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let mut data = row_to_json(&row, &[]);
                round_currency_fields(&mut data, &["unit_price", "total_amount"]);
                Ok(ToolResponse::json(&data))
            }
            None => Ok(ToolResponse::error(format!("order not found: {order_id}"))),
        }
    }

    async fn update_order_status(&self, args: &Value) -> Result<ToolResponse, InvokeError> {
        let order_id = req_str(args, "order_id")?;
        let status: OrderStatus = req_str(args, "new_status")?
            .parse()
            .map_err(|e: orders_core::InvalidStatus| e.to_string())?;

        let result = sqlx::query("UPDATE orders SET status = ? WHERE order_id = ?")
            .bind(status.as_str())
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        let affected = result.rows_affected();
        if affected == 0 {
            return Ok(ToolResponse::error(format!("order not found: {order_id}")));
        }
        tracing::info!(order_id, status = %status, "order status updated");
        Ok(ToolResponse::json(&json!({
            "order_id": order_id,
            "status": status.as_str(),
            "affected": affected,
        })))
    }

    async fn list_customers(&self, args: &Value) -> Result<ToolResponse, InvokeError> {
        let region_id = opt_str_filter(args, "region_id");

        let mut sql = String::from("SELECT * FROM customers");
        if region_id.is_some() {
            sql.push_str(" WHERE region_id = ?");
        }
        sql.push_str(" ORDER BY customer_id");

        let mut query = sqlx::query(&sql);
        if let Some(region_id) = region_id {
            query = query.bind(region_id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(ToolResponse::json(&rows_to_json(&rows, &[])))
    }

    async fn list_products(&self, args: &Value) -> Result<ToolResponse, InvokeError> {
        let category = opt_str_filter(args, "category");

        let mut sql = String::from("SELECT * FROM products");
        if category.is_some() {
            sql.push_str(" WHERE category = ?");
        }
        sql.push_str(" ORDER BY product_id");

        let mut query = sqlx::query(&sql);
        if let Some(category) = category {
            query = query.bind(category);
        }

        let rows = query.fetch_all(&self.pool).await?;
        let mut data = rows_to_json(&rows, &[]);
        round_currency_fields(&mut data, &["unit_price"]);
        Ok(ToolResponse::json(&data))
    }

    async fn customer_chart(&self, args: &Value) -> Result<ToolResponse, InvokeError> {
        let kind = ChartKind::parse(opt_str(args, "chart_type", "bar"))?;
        let limit = opt_i64(args, "limit", 5).clamp(1, 50);
        let title = opt_str(args, "title", "Top customers by order total");

        let rows = sqlx::query(
            "SELECT c.name AS grp, SUM(o.total_amount) AS total \
             FROM orders o JOIN customers c ON o.customer_id = c.customer_id \
             GROUP BY c.name ORDER BY total DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut categories = Vec::with_capacity(rows.len());
        let mut values = Vec::with_capacity(rows.len());
        for row in &rows {
            categories.push(row.try_get::<String, _>("grp").unwrap_or_default());
            values.push(round2(row.try_get::<f64, _>("total").unwrap_or(0.0)));
        }
        if categories.is_empty() {
            return Ok(ToolResponse::error("no order data to chart"));
        }

        Ok(self.chart.render_and_store(kind, title, &categories, &values).await)
    }
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid {field}: {raw:?} (expected YYYY-MM-DD)"))
}

/// Render an aggregate scalar: whole numbers without a fraction, everything
/// else with two decimals.
fn format_scalar(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}
