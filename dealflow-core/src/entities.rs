//! Entity types and their backend schemas.
//!
//! Field names on the wire carry the backend `_c` suffix. Reads are lenient:
//! the hosted store may return nulls for text, numbers as strings and lookup
//! fields as `{Id, Name}` objects.

use crate::schema::{EntitySchema, FieldDefault, FieldKind, FieldSpec, RecordSchema, StampRule};
use crate::{
    ActivityType, CompanyStatus, DealStage, EntityType, QuoteStatus, RecordId, SalesOrderStatus,
    Timestamp,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// LOOKUPS
// ============================================================================

/// Reference to another record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lookup {
    Id(RecordId),
    Reference {
        #[serde(rename = "Id")]
        id: RecordId,
        #[serde(rename = "Name", default)]
        name: Option<String>,
    },
}

impl Lookup {
    pub fn id(&self) -> RecordId {
        match self {
            Lookup::Id(id) => *id,
            Lookup::Reference { id, .. } => *id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Lookup::Id(_) => None,
            Lookup::Reference { name, .. } => name.as_deref(),
        }
    }
}

/// Lenient field deserializers for hosted-store payloads.
pub mod lenient {
    use super::Lookup;
    use crate::schema::lookup_id;
    use crate::Timestamp;
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        })
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let s = text(d)?;
        Ok((!s.trim().is_empty()).then_some(s))
    }

    pub fn decimal<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        })
    }

    pub fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        opt_integer(d).map(|v| v.unwrap_or(0))
    }

    pub fn opt_integer<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
            Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
            _ => None,
        })
    }

    /// Accepts RFC 3339 timestamps and bare dates (midnight UTC).
    pub fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Timestamp>, D::Error> {
        let raw = match Value::deserialize(d)? {
            Value::String(s) => s,
            _ => return Ok(None),
        };
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw.trim()) {
            return Ok(Some(ts.with_timezone(&Utc)));
        }
        Ok(NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc()))
    }

    pub fn choice<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr + Default,
    {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => s.parse().unwrap_or_default(),
            _ => T::default(),
        })
    }

    pub fn lookup<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Lookup>, D::Error> {
        let value = Value::deserialize(d)?;
        let Some(id) = lookup_id(&value) else {
            return Ok(None);
        };
        let name = value
            .get("Name")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(Some(match name {
            Some(name) => Lookup::Reference {
                id,
                name: Some(name),
            },
            None => Lookup::Id(id),
        }))
    }
}

// ============================================================================
// CONTACT
// ============================================================================

pub static CONTACT_SCHEMA: EntitySchema = EntitySchema {
    entity: EntityType::Contact,
    fields: &[
        FieldSpec::text("first_name_c").legacy(&["firstName"]),
        FieldSpec::text("last_name_c").legacy(&["lastName"]),
        FieldSpec::text("email_c").legacy(&["email"]),
        FieldSpec::text("phone_c").legacy(&["phone"]),
        FieldSpec::text("company_c").legacy(&["company"]),
        FieldSpec::text("title_c").legacy(&["title"]),
        FieldSpec::new("tags_c", FieldKind::Tags).legacy(&["tags"]),
        FieldSpec::text("notes_c").legacy(&["notes"]),
        FieldSpec::new("created_at_c", FieldKind::DateTime).server_stamped(),
        FieldSpec::new("last_contacted_at_c", FieldKind::DateTime).legacy(&["lastContactedAt"]),
    ],
    stamp_rules: &[],
};

/// A person in the CRM.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "first_name_c", default, deserialize_with = "lenient::text")]
    pub first_name: String,
    #[serde(rename = "last_name_c", default, deserialize_with = "lenient::text")]
    pub last_name: String,
    #[serde(rename = "email_c", default, deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(rename = "phone_c", default, deserialize_with = "lenient::text")]
    pub phone: String,
    #[serde(rename = "company_c", default, deserialize_with = "lenient::text")]
    pub company: String,
    #[serde(rename = "title_c", default, deserialize_with = "lenient::text")]
    pub title: String,
    /// Comma-separated tag list.
    #[serde(rename = "tags_c", default, deserialize_with = "lenient::text")]
    pub tags: String,
    #[serde(rename = "notes_c", default, deserialize_with = "lenient::text")]
    pub notes: String,
    #[serde(rename = "created_at_c", default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<Timestamp>,
    #[serde(
        rename = "last_contacted_at_c",
        default,
        deserialize_with = "lenient::timestamp"
    )]
    pub last_contacted_at: Option<Timestamp>,
}

impl Contact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

impl RecordSchema for Contact {
    const SCHEMA: &'static EntitySchema = &CONTACT_SCHEMA;

    fn id(&self) -> RecordId {
        self.id
    }
}

// ============================================================================
// COMPANY
// ============================================================================

pub static COMPANY_SCHEMA: EntitySchema = EntitySchema {
    entity: EntityType::Company,
    fields: &[
        FieldSpec::text("name_c").legacy(&["name"]),
        FieldSpec::text("industry_c").legacy(&["industry"]),
        FieldSpec::text("website_c").legacy(&["website"]),
        FieldSpec::text("size_c").legacy(&["size"]),
        FieldSpec::text("revenue_c").legacy(&["revenue"]),
        FieldSpec::text("status_c")
            .legacy(&["status"])
            .default_to(FieldDefault::Text("Active")),
        FieldSpec::new("last_contact_c", FieldKind::DateTime)
            .legacy(&["lastContact"])
            .default_to(FieldDefault::Now),
        FieldSpec::text("notes_c").legacy(&["notes"]),
    ],
    stamp_rules: &[],
};

/// An organisation in the CRM.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Company {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "name_c", default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(rename = "industry_c", default, deserialize_with = "lenient::text")]
    pub industry: String,
    #[serde(rename = "website_c", default, deserialize_with = "lenient::text")]
    pub website: String,
    #[serde(rename = "size_c", default, deserialize_with = "lenient::text")]
    pub size: String,
    #[serde(rename = "revenue_c", default, deserialize_with = "lenient::text")]
    pub revenue: String,
    #[serde(rename = "status_c", default, deserialize_with = "lenient::choice")]
    pub status: CompanyStatus,
    #[serde(rename = "last_contact_c", default, deserialize_with = "lenient::timestamp")]
    pub last_contact: Option<Timestamp>,
    #[serde(rename = "notes_c", default, deserialize_with = "lenient::text")]
    pub notes: String,
}

impl RecordSchema for Company {
    const SCHEMA: &'static EntitySchema = &COMPANY_SCHEMA;

    fn id(&self) -> RecordId {
        self.id
    }
}

// ============================================================================
// DEAL
// ============================================================================

pub static DEAL_SCHEMA: EntitySchema = EntitySchema {
    entity: EntityType::Deal,
    fields: &[
        FieldSpec::new("contact_id_c", FieldKind::Lookup).legacy(&["contactId"]),
        FieldSpec::text("title_c").legacy(&["title"]),
        FieldSpec::new("value_c", FieldKind::Decimal).legacy(&["value"]),
        FieldSpec::new("probability_c", FieldKind::Percent).legacy(&["probability"]),
        FieldSpec::text("stage_c")
            .legacy(&["stage"])
            .default_to(FieldDefault::Text("Lead")),
        FieldSpec::new("expected_close_date_c", FieldKind::Date).legacy(&["expectedCloseDate"]),
        FieldSpec::new("created_at_c", FieldKind::DateTime).server_stamped(),
        FieldSpec::new("stage_changed_at_c", FieldKind::DateTime).server_stamped(),
        FieldSpec::text("notes_c").legacy(&["notes"]),
    ],
    stamp_rules: &[StampRule {
        trigger: "stage_c",
        stamped: "stage_changed_at_c",
    }],
};

/// An opportunity moving through the sales pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Deal {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "contact_id_c", default, deserialize_with = "lenient::lookup")]
    pub contact_id: Option<Lookup>,
    #[serde(rename = "title_c", default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(rename = "value_c", default, deserialize_with = "lenient::decimal")]
    pub value: f64,
    #[serde(rename = "probability_c", default, deserialize_with = "lenient::integer")]
    pub probability: i64,
    /// Stage name as stored. Usually a [`DealStage`], but stored verbatim.
    #[serde(rename = "stage_c", default, deserialize_with = "lenient::text")]
    pub stage: String,
    #[serde(
        rename = "expected_close_date_c",
        default,
        deserialize_with = "lenient::opt_text"
    )]
    pub expected_close_date: Option<String>,
    #[serde(rename = "created_at_c", default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<Timestamp>,
    #[serde(
        rename = "stage_changed_at_c",
        default,
        deserialize_with = "lenient::timestamp"
    )]
    pub stage_changed_at: Option<Timestamp>,
    #[serde(rename = "notes_c", default, deserialize_with = "lenient::text")]
    pub notes: String,
}

impl Deal {
    pub fn stage_kind(&self) -> Option<DealStage> {
        self.stage.parse().ok()
    }

    /// Not in a closed stage. Unknown stages count as active.
    pub fn is_active(&self) -> bool {
        !self.stage_kind().is_some_and(|s| s.is_closed())
    }
}

impl RecordSchema for Deal {
    const SCHEMA: &'static EntitySchema = &DEAL_SCHEMA;

    fn id(&self) -> RecordId {
        self.id
    }
}

// ============================================================================
// ACTIVITY
// ============================================================================

pub static ACTIVITY_SCHEMA: EntitySchema = EntitySchema {
    entity: EntityType::Activity,
    fields: &[
        FieldSpec::new("contact_id_c", FieldKind::Lookup).legacy(&["contactId"]),
        FieldSpec::text("type_c")
            .legacy(&["type"])
            .default_to(FieldDefault::Text("note")),
        FieldSpec::text("subject_c").legacy(&["subject"]),
        FieldSpec::text("description_c").legacy(&["description"]),
        FieldSpec::new("timestamp_c", FieldKind::DateTime)
            .legacy(&["timestamp"])
            .default_to(FieldDefault::Now),
        FieldSpec::new("duration_c", FieldKind::Integer)
            .legacy(&["duration"])
            .default_to(FieldDefault::Null),
    ],
    stamp_rules: &[],
};

/// A logged interaction with a contact.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "contact_id_c", default, deserialize_with = "lenient::lookup")]
    pub contact_id: Option<Lookup>,
    #[serde(rename = "type_c", default, deserialize_with = "lenient::choice")]
    pub activity_type: ActivityType,
    #[serde(rename = "subject_c", default, deserialize_with = "lenient::text")]
    pub subject: String,
    #[serde(rename = "description_c", default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(rename = "timestamp_c", default, deserialize_with = "lenient::timestamp")]
    pub timestamp: Option<Timestamp>,
    /// Minutes.
    #[serde(rename = "duration_c", default, deserialize_with = "lenient::opt_integer")]
    pub duration: Option<i64>,
}

impl RecordSchema for Activity {
    const SCHEMA: &'static EntitySchema = &ACTIVITY_SCHEMA;

    fn id(&self) -> RecordId {
        self.id
    }
}

// ============================================================================
// QUOTE
// ============================================================================

pub static QUOTE_SCHEMA: EntitySchema = EntitySchema {
    entity: EntityType::Quote,
    fields: &[
        FieldSpec::new("company_id_c", FieldKind::Lookup).legacy(&["companyId"]),
        FieldSpec::new("contact_id_c", FieldKind::Lookup).legacy(&["contactId"]),
        FieldSpec::new("deal_id_c", FieldKind::Lookup).legacy(&["dealId"]),
        FieldSpec::new("quote_date_c", FieldKind::Date)
            .legacy(&["quoteDate"])
            .default_to(FieldDefault::Now),
        FieldSpec::new("expires_on_c", FieldKind::Date).legacy(&["expiresOn"]),
        FieldSpec::text("status_c")
            .legacy(&["status"])
            .default_to(FieldDefault::Text("Draft")),
        FieldSpec::text("delivery_method_c").legacy(&["deliveryMethod"]),
        FieldSpec::text("bill_to_name_c").legacy(&["billToName"]),
        FieldSpec::text("bill_to_street_c").legacy(&["billToStreet"]),
        FieldSpec::text("bill_to_city_c").legacy(&["billToCity"]),
        FieldSpec::text("bill_to_state_c").legacy(&["billToState"]),
        FieldSpec::text("bill_to_country_c").legacy(&["billToCountry"]),
        FieldSpec::text("bill_to_pincode_c").legacy(&["billToPincode"]),
        FieldSpec::text("ship_to_name_c").legacy(&["shipToName"]),
        FieldSpec::text("ship_to_street_c").legacy(&["shipToStreet"]),
        FieldSpec::text("ship_to_city_c").legacy(&["shipToCity"]),
        FieldSpec::text("ship_to_state_c").legacy(&["shipToState"]),
        FieldSpec::text("ship_to_country_c").legacy(&["shipToCountry"]),
        FieldSpec::text("ship_to_pincode_c").legacy(&["shipToPincode"]),
    ],
    stamp_rules: &[],
};

/// Postal address as printed on a quote.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Address {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        [
            &self.name,
            &self.street,
            &self.city,
            &self.state,
            &self.country,
            &self.pincode,
        ]
        .iter()
        .all(|part| part.trim().is_empty())
    }
}

/// A priced offer sent to a company.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "company_id_c", default, deserialize_with = "lenient::lookup")]
    pub company_id: Option<Lookup>,
    #[serde(rename = "contact_id_c", default, deserialize_with = "lenient::lookup")]
    pub contact_id: Option<Lookup>,
    #[serde(rename = "deal_id_c", default, deserialize_with = "lenient::lookup")]
    pub deal_id: Option<Lookup>,
    #[serde(rename = "quote_date_c", default, deserialize_with = "lenient::opt_text")]
    pub quote_date: Option<String>,
    #[serde(rename = "expires_on_c", default, deserialize_with = "lenient::opt_text")]
    pub expires_on: Option<String>,
    #[serde(rename = "status_c", default, deserialize_with = "lenient::choice")]
    pub status: QuoteStatus,
    #[serde(rename = "delivery_method_c", default, deserialize_with = "lenient::text")]
    pub delivery_method: String,
    #[serde(rename = "bill_to_name_c", default, deserialize_with = "lenient::text")]
    pub bill_to_name: String,
    #[serde(rename = "bill_to_street_c", default, deserialize_with = "lenient::text")]
    pub bill_to_street: String,
    #[serde(rename = "bill_to_city_c", default, deserialize_with = "lenient::text")]
    pub bill_to_city: String,
    #[serde(rename = "bill_to_state_c", default, deserialize_with = "lenient::text")]
    pub bill_to_state: String,
    #[serde(rename = "bill_to_country_c", default, deserialize_with = "lenient::text")]
    pub bill_to_country: String,
    #[serde(rename = "bill_to_pincode_c", default, deserialize_with = "lenient::text")]
    pub bill_to_pincode: String,
    #[serde(rename = "ship_to_name_c", default, deserialize_with = "lenient::text")]
    pub ship_to_name: String,
    #[serde(rename = "ship_to_street_c", default, deserialize_with = "lenient::text")]
    pub ship_to_street: String,
    #[serde(rename = "ship_to_city_c", default, deserialize_with = "lenient::text")]
    pub ship_to_city: String,
    #[serde(rename = "ship_to_state_c", default, deserialize_with = "lenient::text")]
    pub ship_to_state: String,
    #[serde(rename = "ship_to_country_c", default, deserialize_with = "lenient::text")]
    pub ship_to_country: String,
    #[serde(rename = "ship_to_pincode_c", default, deserialize_with = "lenient::text")]
    pub ship_to_pincode: String,
}

impl Quote {
    pub fn billing_address(&self) -> Address {
        Address {
            name: self.bill_to_name.clone(),
            street: self.bill_to_street.clone(),
            city: self.bill_to_city.clone(),
            state: self.bill_to_state.clone(),
            country: self.bill_to_country.clone(),
            pincode: self.bill_to_pincode.clone(),
        }
    }

    pub fn shipping_address(&self) -> Address {
        Address {
            name: self.ship_to_name.clone(),
            street: self.ship_to_street.clone(),
            city: self.ship_to_city.clone(),
            state: self.ship_to_state.clone(),
            country: self.ship_to_country.clone(),
            pincode: self.ship_to_pincode.clone(),
        }
    }
}

impl RecordSchema for Quote {
    const SCHEMA: &'static EntitySchema = &QUOTE_SCHEMA;

    fn id(&self) -> RecordId {
        self.id
    }
}

// ============================================================================
// SALES ORDER
// ============================================================================

pub static SALES_ORDER_SCHEMA: EntitySchema = EntitySchema {
    entity: EntityType::SalesOrder,
    fields: &[
        FieldSpec::text("order_number_c").legacy(&["orderNumber"]),
        FieldSpec::text("customer_name_c").legacy(&["customerName"]),
        FieldSpec::new("order_date_c", FieldKind::Date)
            .legacy(&["orderDate"])
            .default_to(FieldDefault::Now),
        FieldSpec::new("total_amount_c", FieldKind::Decimal).legacy(&["totalAmount"]),
        FieldSpec::text("status_c")
            .legacy(&["status"])
            .default_to(FieldDefault::Text("Pending")),
        FieldSpec::new("delivery_date_c", FieldKind::Date).legacy(&["deliveryDate"]),
        FieldSpec::text("notes_c").legacy(&["notes"]),
    ],
    stamp_rules: &[],
};

/// A confirmed order awaiting or past fulfilment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SalesOrder {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "order_number_c", default, deserialize_with = "lenient::text")]
    pub order_number: String,
    #[serde(rename = "customer_name_c", default, deserialize_with = "lenient::text")]
    pub customer_name: String,
    #[serde(rename = "order_date_c", default, deserialize_with = "lenient::opt_text")]
    pub order_date: Option<String>,
    #[serde(rename = "total_amount_c", default, deserialize_with = "lenient::decimal")]
    pub total_amount: f64,
    #[serde(rename = "status_c", default, deserialize_with = "lenient::choice")]
    pub status: SalesOrderStatus,
    #[serde(rename = "delivery_date_c", default, deserialize_with = "lenient::opt_text")]
    pub delivery_date: Option<String>,
    #[serde(rename = "notes_c", default, deserialize_with = "lenient::text")]
    pub notes: String,
}

impl RecordSchema for SalesOrder {
    const SCHEMA: &'static EntitySchema = &SALES_ORDER_SCHEMA;

    fn id(&self) -> RecordId {
        self.id
    }
}
