//! Query construction: selector whitelists and the summary filter.
//!
//! Selector-type parameters (aggregate function, column, grouping key, sort
//! direction) pick SQL syntax, not literal values, so they cannot be bound.
//! Each is mapped through a closed enum to a pre-built fragment; caller text
//! never reaches the query string. Literal values are always bound.

use serde_json::Value;

/// Aggregate function selector for order_summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

impl Aggregate {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "sum" => Ok(Aggregate::Sum),
            "avg" => Ok(Aggregate::Avg),
            "count" => Ok(Aggregate::Count),
            "min" => Ok(Aggregate::Min),
            "max" => Ok(Aggregate::Max),
            other => Err(format!(
                "invalid aggregate: {other:?} (expected one of sum, avg, count, min, max)"
            )),
        }
    }

    /// SQL function name.
    pub fn sql(&self) -> &'static str {
        match self {
            Aggregate::Sum => "SUM",
            Aggregate::Avg => "AVG",
            Aggregate::Count => "COUNT",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
        }
    }
}

/// Column selector for order_summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryField {
    TotalAmount,
    Quantity,
}

impl SummaryField {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "total_amount" => Ok(SummaryField::TotalAmount),
            "quantity" => Ok(SummaryField::Quantity),
            other => Err(format!(
                "invalid field: {other:?} (expected total_amount or quantity)"
            )),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SummaryField::TotalAmount => "total_amount",
            SummaryField::Quantity => "quantity",
        }
    }
}

/// Grouping key selector for orders_by_group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Customer,
    Region,
}

impl GroupKey {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "customer" => Ok(GroupKey::Customer),
            "region" => Ok(GroupKey::Region),
            other => Err(format!(
                "invalid group_by: {other:?} (expected customer or region)"
            )),
        }
    }

    /// Select-list expression yielding the group label.
    pub fn label_expr(&self) -> &'static str {
        match self {
            GroupKey::Customer => "c.name",
            GroupKey::Region => "c.region_id",
        }
    }
}

/// Sort direction selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            other => Err(format!("invalid order: {other:?} (expected asc or desc)")),
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Sort selector for list_orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrderBy {
    #[default]
    DateDesc,
    DateAsc,
    AmountDesc,
    AmountAsc,
}

impl ListOrderBy {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "date_desc" => Ok(ListOrderBy::DateDesc),
            "date_asc" => Ok(ListOrderBy::DateAsc),
            "amount_desc" => Ok(ListOrderBy::AmountDesc),
            "amount_asc" => Ok(ListOrderBy::AmountAsc),
            other => Err(format!(
                "invalid order_by: {other:?} (expected one of date_desc, date_asc, \
                 amount_desc, amount_asc)"
            )),
        }
    }

    /// ORDER BY clause body.
    pub fn sql(&self) -> &'static str {
        match self {
            ListOrderBy::DateDesc => "o.order_date DESC",
            ListOrderBy::DateAsc => "o.order_date ASC",
            ListOrderBy::AmountDesc => "o.total_amount DESC",
            ListOrderBy::AmountAsc => "o.total_amount ASC",
        }
    }
}

/// Columns a summary condition may filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionColumn {
    Status,
    OrderDate,
    CustomerId,
    Quantity,
    TotalAmount,
}

impl ConditionColumn {
    fn parse(s: &str) -> Result<Self, String> {
        match s {
            "status" => Ok(ConditionColumn::Status),
            "order_date" => Ok(ConditionColumn::OrderDate),
            "customer_id" => Ok(ConditionColumn::CustomerId),
            "quantity" => Ok(ConditionColumn::Quantity),
            "total_amount" => Ok(ConditionColumn::TotalAmount),
            other => Err(format!(
                "condition may not filter on {other:?} (allowed: status, order_date, \
                 customer_id, quantity, total_amount)"
            )),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            ConditionColumn::Status => "status",
            ConditionColumn::OrderDate => "order_date",
            ConditionColumn::CustomerId => "customer_id",
            ConditionColumn::Quantity => "quantity",
            ConditionColumn::TotalAmount => "total_amount",
        }
    }
}

/// Comparison operator of a summary condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn sql(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

// Two-character operators first so "<=" is not read as "<".
const OPERATORS: &[(&str, CmpOp)] = &[
    (">=", CmpOp::Ge),
    ("<=", CmpOp::Le),
    ("!=", CmpOp::Ne),
    ("<>", CmpOp::Ne),
    ("=", CmpOp::Eq),
    (">", CmpOp::Gt),
    ("<", CmpOp::Lt),
];

/// The literal compared against, bound as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    Number(f64),
    Text(String),
}

/// A validated single-comparison filter for order_summary.
///
/// The original system interpolated the raw `condition` string into the
/// query, which allowed arbitrary SQL injection. Here the filter is parsed
/// into column / operator / value, the column is whitelisted and the value
/// is bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: ConditionColumn,
    pub op: CmpOp,
    pub value: ConditionValue,
}

impl Condition {
    /// Parse `"<column> <op> <value>"`. Empty input means no filter.
    pub fn parse(input: &str) -> Result<Option<Condition>, String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        let (idx, op_text, op) = OPERATORS
            .iter()
            .filter_map(|(text, op)| input.find(text).map(|idx| (idx, *text, *op)))
            .min_by_key(|(idx, text, _)| (*idx, std::cmp::Reverse(text.len())))
            .ok_or_else(|| {
                format!("invalid condition {input:?}: expected '<column> <op> <value>'")
            })?;

        let column = ConditionColumn::parse(input[..idx].trim())?;
        let raw_value = input[idx + op_text.len()..].trim();
        if raw_value.is_empty() {
            return Err(format!("invalid condition {input:?}: missing value"));
        }

        let unquoted = raw_value
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .or_else(|| {
                raw_value
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
            });

        let value = match unquoted {
            Some(text) => ConditionValue::Text(text.to_string()),
            None => match raw_value.parse::<f64>() {
                Ok(n) => ConditionValue::Number(n),
                Err(_) => ConditionValue::Text(raw_value.to_string()),
            },
        };

        Ok(Some(Condition { column, op, value }))
    }

    /// WHERE-clause fragment with a bind placeholder for the value.
    pub fn sql(&self) -> String {
        format!("{} {} ?", self.column.column(), self.op.sql())
    }
}

/// Read an optional string argument, falling back to a default.
pub fn opt_str<'a>(args: &'a Value, key: &str, default: &'a str) -> &'a str {
    args.get(key).and_then(|v| v.as_str()).unwrap_or(default)
}

/// Read an optional non-empty string argument.
pub fn opt_str_filter<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

/// Read a required string argument.
pub fn req_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing required field: {key}"))
}

/// Read an optional integer argument, falling back to a default.
pub fn opt_i64(args: &Value, key: &str, default: i64) -> i64 {
    args.get(key).and_then(|v| v.as_i64()).unwrap_or(default)
}
