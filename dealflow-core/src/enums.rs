//! Enum types for dealflow entities

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// PARSING SUPPORT
// ============================================================================

/// Error returned when a backend string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for EnumParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for EnumParseError {}

fn normalize_token(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Generates the backend-string plumbing shared by every record enum:
/// `as_db_str`, case-insensitive `from_db_str`, `Display`, `FromStr` and
/// serde using the backend string.
macro_rules! db_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $db:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $ty {
            /// Every variant in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// String stored in the backend column.
            pub fn as_db_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $db),+
                }
            }

            /// Parse a backend string, ignoring case, spaces, `_` and `-`.
            pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
                let token = normalize_token(s);
                $(
                    if token == normalize_token($db) $(|| token == $alias)* {
                        return Ok($ty::$variant);
                    }
                )+
                Err(EnumParseError { kind: $kind, value: s.to_string() })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_db_str())
            }
        }

        impl FromStr for $ty {
            type Err = EnumParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_db_str(s)
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_db_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::from_db_str(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ============================================================================
// ENTITY TYPE
// ============================================================================

/// Entity type discriminator; each maps to one backend table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Contact,
    Company,
    Deal,
    Activity,
    Quote,
    SalesOrder,
}

db_enum!(EntityType, "entity type", {
    Contact => "Contact",
    Company => "Company",
    Deal => "Deal",
    Activity => "Activity",
    Quote => "Quote",
    SalesOrder => "SalesOrder",
});

impl EntityType {
    /// Backend table holding records of this type.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityType::Contact => "contact_c",
            EntityType::Company => "company_c",
            EntityType::Deal => "deal_c",
            EntityType::Activity => "activity_c",
            EntityType::Quote => "quote_c",
            EntityType::SalesOrder => "sales_order_c",
        }
    }

    /// Human label used in notifications ("Sales order created successfully").
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Contact => "Contact",
            EntityType::Company => "Company",
            EntityType::Deal => "Deal",
            EntityType::Activity => "Activity",
            EntityType::Quote => "Quote",
            EntityType::SalesOrder => "Sales order",
        }
    }

    /// Lowercase plural used in "Failed to load ..." messages.
    pub fn plural(&self) -> &'static str {
        match self {
            EntityType::Contact => "contacts",
            EntityType::Company => "companies",
            EntityType::Deal => "deals",
            EntityType::Activity => "activities",
            EntityType::Quote => "quotes",
            EntityType::SalesOrder => "sales orders",
        }
    }
}

// ============================================================================
// DEAL STAGE
// ============================================================================

/// Pipeline phase of a deal.
///
/// Ordered `Lead < Qualified < Proposal < Negotiation < ClosedWon | ClosedLost`.
/// The two closed stages are terminal; moving out of them is still allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum DealStage {
    #[default]
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

db_enum!(DealStage, "deal stage", {
    Lead => "Lead",
    Qualified => "Qualified",
    Proposal => "Proposal",
    Negotiation => "Negotiation",
    ClosedWon => "Closed Won" | "won",
    ClosedLost => "Closed Lost" | "lost",
});

impl DealStage {
    pub fn is_closed(&self) -> bool {
        matches!(self, DealStage::ClosedWon | DealStage::ClosedLost)
    }
}

// ============================================================================
// STATUS ENUMS
// ============================================================================

/// Status of a company record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompanyStatus {
    #[default]
    Active,
    Inactive,
}

db_enum!(CompanyStatus, "company status", {
    Active => "Active",
    Inactive => "Inactive",
});

/// Kind of a logged activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActivityType {
    Call,
    Email,
    Meeting,
    #[default]
    Note,
    Task,
}

db_enum!(ActivityType, "activity type", {
    Call => "call",
    Email => "email",
    Meeting => "meeting",
    Note => "note",
    Task => "task",
});

/// Lifecycle of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
}

db_enum!(QuoteStatus, "quote status", {
    Draft => "Draft",
    Sent => "Sent",
    Accepted => "Accepted",
    Rejected => "Rejected",
});

/// Fulfilment state of a sales order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SalesOrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

db_enum!(SalesOrderStatus, "sales order status", {
    Pending => "Pending",
    Processing => "Processing",
    Shipped => "Shipped",
    Delivered => "Delivered",
    Cancelled => "Cancelled" | "canceled",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deal_stage_parse_is_case_insensitive() {
        assert_eq!("closed won".parse::<DealStage>().unwrap(), DealStage::ClosedWon);
        assert_eq!("CLOSED_LOST".parse::<DealStage>().unwrap(), DealStage::ClosedLost);
        assert_eq!("proposal".parse::<DealStage>().unwrap(), DealStage::Proposal);
        assert!("Onboarding".parse::<DealStage>().is_err());
    }

    #[test]
    fn test_deal_stage_display_uses_backend_string() {
        assert_eq!(DealStage::ClosedWon.to_string(), "Closed Won");
        assert_eq!(
            serde_json::to_string(&DealStage::ClosedLost).unwrap(),
            "\"Closed Lost\""
        );
    }

    #[test]
    fn test_deal_stage_ordering_and_terminal_stages() {
        assert!(DealStage::Lead < DealStage::Qualified);
        assert!(DealStage::Negotiation < DealStage::ClosedWon);
        let closed: Vec<_> = DealStage::ALL.iter().filter(|s| s.is_closed()).collect();
        assert_eq!(closed, vec![&DealStage::ClosedWon, &DealStage::ClosedLost]);
    }

    #[test]
    fn test_status_defaults_match_backend_defaults() {
        assert_eq!(CompanyStatus::default().as_db_str(), "Active");
        assert_eq!(QuoteStatus::default().as_db_str(), "Draft");
        assert_eq!(SalesOrderStatus::default().as_db_str(), "Pending");
        assert_eq!(DealStage::default().as_db_str(), "Lead");
    }

    #[test]
    fn test_entity_type_table_names() {
        assert_eq!(EntityType::SalesOrder.table_name(), "sales_order_c");
        assert_eq!(EntityType::Contact.table_name(), "contact_c");
        assert_eq!(EntityType::SalesOrder.label(), "Sales order");
    }

    #[test]
    fn test_parse_error_names_kind() {
        let err = "shipped?".parse::<QuoteStatus>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid quote status: shipped?");
    }
}
