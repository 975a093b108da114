//! Fetch parameters for the record store.
//!
//! The wire shape follows the hosted platform's query body: camelCase keys,
//! `where` conditions ANDed together, `whereGroups` for OR logic, and an
//! explicit field projection.

use dealflow_core::schema::lookup_id;
use dealflow_core::{Record, ID_FIELD};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

// ============================================================================
// OPERATORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    EqualTo,
    NotEqualTo,
    /// Case-insensitive substring match.
    Contains,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupOperator {
    #[default]
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

// ============================================================================
// QUERY PARTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

/// One projected field: `{"field": {"Name": "title_c"}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRef {
    pub field: FieldName,
}

impl FieldRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            field: FieldName { name: name.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhereCondition {
    pub field_name: String,
    pub operator: Operator,
    /// Condition holds when any value matches.
    pub values: Vec<Value>,
}

impl WhereCondition {
    pub fn new(field_name: impl Into<String>, operator: Operator, values: Vec<Value>) -> Self {
        Self {
            field_name: field_name.into(),
            operator,
            values,
        }
    }

    pub fn equal_to(field_name: impl Into<String>, value: Value) -> Self {
        Self::new(field_name, Operator::EqualTo, vec![value])
    }

    pub fn contains(field_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field_name, Operator::Contains, vec![Value::String(value.into())])
    }

    pub fn matches(&self, record: &Record) -> bool {
        let actual = record.get(&self.field_name).unwrap_or(&Value::Null);
        match self.operator {
            Operator::EqualTo => self.values.iter().any(|v| loose_eq(actual, v)),
            Operator::NotEqualTo => !self.values.iter().any(|v| loose_eq(actual, v)),
            Operator::Contains => {
                let haystack = display_text(actual).to_lowercase();
                self.values
                    .iter()
                    .any(|v| haystack.contains(&display_text(v).to_lowercase()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubGroup {
    pub conditions: Vec<WhereCondition>,
    #[serde(default)]
    pub operator: GroupOperator,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhereGroup {
    #[serde(default)]
    pub operator: GroupOperator,
    pub sub_groups: Vec<SubGroup>,
}

impl WhereGroup {
    pub fn matches(&self, record: &Record) -> bool {
        let mut results = self.sub_groups.iter().map(|sub| {
            let mut hits = sub.conditions.iter().map(|c| c.matches(record));
            match sub.operator {
                GroupOperator::And => hits.all(|hit| hit),
                GroupOperator::Or => hits.any(|hit| hit),
            }
        });
        match self.operator {
            GroupOperator::And => results.all(|hit| hit),
            GroupOperator::Or => results.any(|hit| hit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub field_name: String,
    pub sorttype: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

// ============================================================================
// FETCH PARAMS
// ============================================================================

/// Body of a fetch request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchParams {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldRef>,
    #[serde(rename = "where", default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<WhereCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub where_groups: Vec<WhereGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_info: Option<Paging>,
}

impl FetchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project exactly these fields.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(FieldRef::new).collect();
        self
    }

    pub fn where_equal(mut self, field: impl Into<String>, value: Value) -> Self {
        self.conditions.push(WhereCondition::equal_to(field, value));
        self
    }

    /// Match when any of `fields` contains `text`.
    pub fn any_contains<I, S>(mut self, fields: I, text: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let conditions = fields
            .into_iter()
            .map(|f| WhereCondition::contains(f, text))
            .collect();
        self.where_groups.push(WhereGroup {
            operator: GroupOperator::Or,
            sub_groups: vec![SubGroup {
                conditions,
                operator: GroupOperator::Or,
            }],
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy {
            field_name: field.into(),
            sorttype: direction,
        });
        self
    }

    pub fn paging(mut self, limit: usize, offset: usize) -> Self {
        self.paging_info = Some(Paging { limit, offset });
        self
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field.name.as_str()).collect()
    }

    /// Whether a stored record satisfies every condition and group.
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
            && self.where_groups.iter().all(|g| g.matches(record))
    }

    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        for order in &self.order_by {
            let left = a.get(&order.field_name).unwrap_or(&Value::Null);
            let right = b.get(&order.field_name).unwrap_or(&Value::Null);
            let ord = compare_values(left, right);
            let ord = match order.sorttype {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Keep `Id` plus the projected fields. An empty projection keeps all.
    pub fn project(&self, record: &Record) -> Record {
        project(record, &self.field_names())
    }
}

pub fn project<S: AsRef<str>>(record: &Record, fields: &[S]) -> Record {
    if fields.is_empty() {
        return record.clone();
    }
    record
        .iter()
        .filter(|(key, _)| {
            key.as_str() == ID_FIELD || fields.iter().any(|f| f.as_ref() == key.as_str())
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

// ============================================================================
// VALUE COMPARISON
// ============================================================================

fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Object(map) => map
            .get("Name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        other => other.to_string(),
    }
}

/// Equality that treats lookup objects, numbers and numeric strings as ids.
fn loose_eq(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (lookup_id(actual), lookup_id(expected)) {
        (Some(a), Some(b)) => a == b,
        _ => match (actual, expected) {
            (Value::String(a), Value::String(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        },
    }
}

/// Nulls sort first; numbers numerically; everything else by text.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => display_text(a).cmp(&display_text(b)),
    }
}
