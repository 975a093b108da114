//! Per-entity field schemas.
//!
//! Every entity carries a static [`EntitySchema`] listing its backend field
//! names, the legacy UI names accepted on input, the field kind used for
//! coercion and the default applied on create. Normalization and sparse
//! patch construction are pure functions over that table.

use crate::{format_timestamp, EntityType, Record, RecordId, Timestamp, ID_FIELD};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Number, Value};

// ============================================================================
// FIELD SPECS
// ============================================================================

/// How a field's input value is coerced before it reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text. Numbers and booleans are stringified.
    Text,
    /// Comma-separated tag list. Arrays are joined with `,`.
    Tags,
    /// Whole number; numeric strings are parsed.
    Integer,
    /// Decimal amount; numeric strings are parsed.
    Decimal,
    /// Integer clamped to `[0, 100]`.
    Percent,
    /// Calendar date string; empty becomes null.
    Date,
    /// Timestamp string; empty becomes null.
    DateTime,
    /// Reference to another record; `{Id, Name}` collapses to the id.
    Lookup,
}

/// Value applied on create when the input carries nothing truthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Empty,
    Null,
    Text(&'static str),
    Zero,
    Now,
}

/// One backend field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub legacy: &'static [&'static str],
    pub kind: FieldKind,
    pub default: FieldDefault,
    /// Always set to "now" by the service; never taken from input.
    pub server_stamped: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        let default = match kind {
            FieldKind::Text | FieldKind::Tags => FieldDefault::Empty,
            FieldKind::Integer | FieldKind::Decimal | FieldKind::Percent => FieldDefault::Zero,
            FieldKind::Date | FieldKind::DateTime | FieldKind::Lookup => FieldDefault::Null,
        };
        Self {
            name,
            legacy: &[],
            kind,
            default,
            server_stamped: false,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub const fn legacy(mut self, names: &'static [&'static str]) -> Self {
        self.legacy = names;
        self
    }

    pub const fn default_to(mut self, default: FieldDefault) -> Self {
        self.default = default;
        self
    }

    pub const fn server_stamped(mut self) -> Self {
        self.server_stamped = true;
        self
    }

    fn default_value(&self, stamp: &str) -> Value {
        match self.default {
            FieldDefault::Empty => Value::String(String::new()),
            FieldDefault::Null => Value::Null,
            FieldDefault::Text(text) => Value::String(text.to_string()),
            FieldDefault::Zero => Value::Number(Number::from(0)),
            FieldDefault::Now => Value::String(stamp.to_string()),
        }
    }

    /// Input keys for this field in lookup order: legacy names, then the
    /// backend name.
    fn input_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.legacy.iter().copied().chain(std::iter::once(self.name))
    }
}

/// Refresh `stamped` with the current time whenever `trigger` is present in
/// an update payload, changed or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StampRule {
    pub trigger: &'static str,
    pub stamped: &'static str,
}

// ============================================================================
// ENTITY SCHEMA
// ============================================================================

/// Field table for one entity.
#[derive(Debug)]
pub struct EntitySchema {
    pub entity: EntityType,
    pub fields: &'static [FieldSpec],
    pub stamp_rules: &'static [StampRule],
}

impl EntitySchema {
    pub fn table_name(&self) -> &'static str {
        self.entity.table_name()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Explicit projection requested on every read: `Id` plus every field.
    pub fn projection(&self) -> Vec<String> {
        std::iter::once(ID_FIELD)
            .chain(self.fields.iter().map(|f| f.name))
            .map(str::to_string)
            .collect()
    }

    /// First truthy input value for a field, legacy names first.
    pub fn input_value<'a>(&self, spec: &FieldSpec, input: &'a Record) -> Option<&'a Value> {
        spec.input_keys()
            .filter_map(|key| input.get(key))
            .find(|value| is_truthy(value))
    }

    /// Whether the input carries a truthy value for the named field under
    /// any of its accepted names, i.e. whether a patch would write it.
    pub fn is_present(&self, field: &str, input: &Record) -> bool {
        self.field(field)
            .is_some_and(|spec| self.input_value(spec, input).is_some())
    }

    /// Build the full create payload. Every schema field is emitted exactly
    /// once; server-stamped fields are set to `now`.
    pub fn normalize(&self, input: &Record, now: Timestamp) -> Record {
        let stamp = format_timestamp(now);
        let mut out = Record::new();
        for spec in self.fields {
            let value = if spec.server_stamped {
                Value::String(stamp.clone())
            } else {
                self.input_value(spec, input)
                    .and_then(|v| coerce(spec.kind, v))
                    .unwrap_or_else(|| spec.default_value(&stamp))
            };
            out.insert(spec.name.to_string(), value);
        }
        out
    }

    /// Build an update payload containing `Id` and only the fields present
    /// and truthy in the input, plus any stamp rule outputs.
    pub fn sparse_patch(&self, id: RecordId, input: &Record, now: Timestamp) -> Record {
        let mut patch = Record::new();
        patch.insert(ID_FIELD.to_string(), Value::Number(Number::from(id)));

        for spec in self.fields.iter().filter(|f| !f.server_stamped) {
            if let Some(value) = self
                .input_value(spec, input)
                .and_then(|v| coerce(spec.kind, v))
            {
                patch.insert(spec.name.to_string(), value);
            }
        }

        for rule in self.stamp_rules {
            if self.is_present(rule.trigger, input) {
                patch.insert(rule.stamped.to_string(), Value::String(format_timestamp(now)));
            }
        }
        patch
    }
}

/// Typed entity backed by an [`EntitySchema`].
pub trait RecordSchema: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const SCHEMA: &'static EntitySchema;

    fn id(&self) -> RecordId;

    fn from_record(record: Record) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(record))
    }
}

// ============================================================================
// COERCION
// ============================================================================

/// Loose truthiness used to decide whether an input value counts:
/// null, `false`, `0`, `""` are falsy; arrays and objects are truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Coerce an input value to a field kind. `None` means the value cannot be
/// represented and the field's default (or omission) applies.
pub fn coerce(kind: FieldKind, value: &Value) -> Option<Value> {
    match kind {
        FieldKind::Text => coerce_text(value),
        FieldKind::Tags => match value {
            Value::Array(items) => Some(Value::String(join_tags(items))),
            other => coerce_text(other),
        },
        FieldKind::Integer => parse_number(value).map(|f| Value::Number(Number::from(f.round() as i64))),
        FieldKind::Decimal => parse_number(value).and_then(decimal_value),
        FieldKind::Percent => parse_number(value)
            .map(|f| Value::Number(Number::from(f.round().clamp(0.0, 100.0) as i64))),
        FieldKind::Date | FieldKind::DateTime => match value {
            Value::String(s) if s.trim().is_empty() => Some(Value::Null),
            Value::String(s) => Some(Value::String(s.trim().to_string())),
            Value::Null => Some(Value::Null),
            _ => None,
        },
        FieldKind::Lookup => lookup_id(value).map(|id| Value::Number(Number::from(id))),
    }
}

fn coerce_text(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => Some(Value::String(s.clone())),
        Value::Number(n) => Some(Value::String(n.to_string())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        Value::Array(items) => Some(Value::String(join_tags(items))),
        Value::Null | Value::Object(_) => None,
    }
}

fn join_tags(items: &[Value]) -> String {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn decimal_value(f: f64) -> Option<Value> {
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        return Some(Value::Number(Number::from(f as i64)));
    }
    Number::from_f64(f).map(Value::Number)
}

/// Extract a record id from a lookup value: an integer, a numeric string, or
/// an `{Id, Name}` object.
pub fn lookup_id(value: &Value) -> Option<RecordId> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => map.get(ID_FIELD).and_then(lookup_id),
        _ => None,
    }
}
