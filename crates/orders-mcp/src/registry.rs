//! Tool registry.
//!
//! Every tool the server exposes is a variant of [`ToolKind`]; the registry's
//! schema-described definitions and the dispatcher's exhaustive match both
//! derive from it, so the published surface and the handlers cannot drift.
//!
//! The registry is read-only process-wide state, constructed once at startup.

use crate::protocol::ToolDefinition;
use orders_core::OrderStatus;
use serde_json::{json, Value};
use std::collections::HashMap;

/// The closed set of tools exposed by this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    OrderSummary,
    OrdersByGroup,
    OrdersByDateRange,
    ListOrders,
    OrderDetail,
    UpdateOrderStatus,
    ListCustomers,
    ListProducts,
    CustomerChart,
}

impl ToolKind {
    pub const ALL: [ToolKind; 9] = [
        ToolKind::OrderSummary,
        ToolKind::OrdersByGroup,
        ToolKind::OrdersByDateRange,
        ToolKind::ListOrders,
        ToolKind::OrderDetail,
        ToolKind::UpdateOrderStatus,
        ToolKind::ListCustomers,
        ToolKind::ListProducts,
        ToolKind::CustomerChart,
    ];

    /// Wire name of the tool.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::OrderSummary => "order_summary",
            ToolKind::OrdersByGroup => "orders_by_group",
            ToolKind::OrdersByDateRange => "orders_by_date_range",
            ToolKind::ListOrders => "list_orders",
            ToolKind::OrderDetail => "order_detail",
            ToolKind::UpdateOrderStatus => "update_order_status",
            ToolKind::ListCustomers => "list_customers",
            ToolKind::ListProducts => "list_products",
            ToolKind::CustomerChart => "customer_chart",
        }
    }

    /// Look up a tool by wire name.
    pub fn from_name(name: &str) -> Option<ToolKind> {
        Self::ALL.iter().find(|k| k.name() == name).copied()
    }

    /// One-line machine title.
    pub fn title(&self) -> &'static str {
        match self {
            ToolKind::OrderSummary => "Aggregate order totals",
            ToolKind::OrdersByGroup => "Group order totals by customer or region",
            ToolKind::OrdersByDateRange => "Query orders within a date range",
            ToolKind::ListOrders => "List orders with paging and filters",
            ToolKind::OrderDetail => "Fetch a single order",
            ToolKind::UpdateOrderStatus => "Update an order's status",
            ToolKind::ListCustomers => "List customers",
            ToolKind::ListProducts => "List products",
            ToolKind::CustomerChart => "Render a customer totals chart",
        }
    }

    /// Natural-language description, used by an upstream agent to decide
    /// when to invoke the tool.
    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::OrderSummary => {
                "Compute a single aggregate (sum, avg, count, min or max) over the \
                 total_amount or quantity column of the orders table, optionally \
                 restricted by a simple filter condition."
            }
            ToolKind::OrdersByGroup => {
                "Group orders by customer or region and return each group's total, \
                 average and order count, sorted by total."
            }
            ToolKind::OrdersByDateRange => {
                "List orders whose order date falls between start_date and end_date \
                 (inclusive), newest first, optionally filtered by status."
            }
            ToolKind::ListOrders => {
                "List orders with customer and product names, supporting status and \
                 customer filters, paging and sort order."
            }
            ToolKind::OrderDetail => {
                "Fetch the full record of one order joined with its customer and \
                 product names."
            }
            ToolKind::UpdateOrderStatus => {
                "Set an order's status to one of the five valid statuses. Reports \
                 the number of rows affected; zero means the order was not found."
            }
            ToolKind::ListCustomers => "List customers, optionally filtered by region.",
            ToolKind::ListProducts => "List products, optionally filtered by category.",
            ToolKind::CustomerChart => {
                "Aggregate the top customers by order total and render them as a \
                 chart image via the external renderer; returns a link to the image \
                 plus a textual summary of the data."
            }
        }
    }

    /// JSON-Schema for the tool's argument mapping.
    pub fn input_schema(&self) -> Value {
        match self {
            ToolKind::OrderSummary => json!({
                "type": "object",
                "properties": {
                    "aggregate": {
                        "type": "string",
                        "enum": ["sum", "avg", "count", "min", "max"],
                        "description": "Aggregate function"
                    },
                    "field": {
                        "type": "string",
                        "enum": ["total_amount", "quantity"],
                        "description": "Column to aggregate"
                    },
                    "condition": {
                        "type": "string",
                        "default": "",
                        "description": "Optional filter: '<column> <op> <value>' where \
                                        column is one of status, order_date, customer_id, \
                                        quantity, total_amount"
                    }
                },
                "required": ["aggregate", "field"]
            }),
            ToolKind::OrdersByGroup => json!({
                "type": "object",
                "properties": {
                    "group_by": {
                        "type": "string",
                        "enum": ["customer", "region"],
                        "description": "Grouping key"
                    },
                    "order": {
                        "type": "string",
                        "enum": ["asc", "desc"],
                        "default": "desc",
                        "description": "Sort direction on the group total"
                    },
                    "limit": {"type": "integer", "default": 10}
                },
                "required": ["group_by"]
            }),
            ToolKind::OrdersByDateRange => json!({
                "type": "object",
                "properties": {
                    "start_date": {"type": "string", "description": "Start date YYYY-MM-DD"},
                    "end_date": {"type": "string", "description": "End date YYYY-MM-DD"},
                    "status": {"type": "string", "description": "Optional status filter"}
                },
                "required": ["start_date", "end_date"]
            }),
            ToolKind::ListOrders => json!({
                "type": "object",
                "properties": {
                    "status": {"type": "string", "description": "Status filter"},
                    "customer_id": {"type": "string", "description": "Customer filter"},
                    "limit": {"type": "integer", "default": 20},
                    "offset": {"type": "integer", "default": 0},
                    "order_by": {
                        "type": "string",
                        "enum": ["date_desc", "date_asc", "amount_desc", "amount_asc"],
                        "default": "date_desc"
                    }
                }
            }),
            ToolKind::OrderDetail => json!({
                "type": "object",
                "properties": {
                    "order_id": {"type": "string", "description": "Order id"}
                },
                "required": ["order_id"]
            }),
            ToolKind::UpdateOrderStatus => json!({
                "type": "object",
                "properties": {
                    "order_id": {"type": "string", "description": "Order id"},
                    "new_status": {
                        "type": "string",
                        "enum": OrderStatus::names(),
                        "description": "New status"
                    }
                },
                "required": ["order_id", "new_status"]
            }),
            ToolKind::ListCustomers => json!({
                "type": "object",
                "properties": {
                    "region_id": {"type": "string", "description": "Region filter"}
                }
            }),
            ToolKind::ListProducts => json!({
                "type": "object",
                "properties": {
                    "category": {"type": "string", "description": "Category filter"}
                }
            }),
            ToolKind::CustomerChart => json!({
                "type": "object",
                "properties": {
                    "chart_type": {
                        "type": "string",
                        "enum": ["bar", "pie", "line"],
                        "default": "bar"
                    },
                    "limit": {"type": "integer", "default": 5},
                    "title": {"type": "string", "description": "Chart title"}
                }
            }),
        }
    }

    /// Full schema-described definition for tools/list.
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            title: self.title().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Registry of the tools this server exposes.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, ToolDefinition>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Build the registry from the closed tool set.
    pub fn new() -> Self {
        let mut tools = HashMap::new();
        for kind in ToolKind::ALL {
            let prior = tools.insert(kind.name(), kind.definition());
            debug_assert!(prior.is_none(), "duplicate tool name {}", kind.name());
        }
        Self { tools }
    }

    /// Get a tool definition by name.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// List all tool definitions, sorted by name for stable output.
    pub fn list(&self) -> Vec<&ToolDefinition> {
        let mut tools: Vec<_> = self.tools.values().collect();
        tools.sort_by_key(|t| t.name.as_str());
        tools
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.list().iter().map(|t| t.name.as_str()).collect()
    }
}
