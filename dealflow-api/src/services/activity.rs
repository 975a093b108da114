//! Activities and deals by contact.

use super::RecordService;
use dealflow_core::{Activity, Deal, RecordId};
use dealflow_storage::SortDirection;
use serde_json::Value;

const CONTACT_FIELD: &str = "contact_id_c";

impl RecordService<Activity> {
    /// A contact's activities, newest first.
    pub async fn get_by_contact_id(&self, contact_id: RecordId) -> Vec<Activity> {
        self.query(
            self.all_fields()
                .where_equal(CONTACT_FIELD, Value::from(contact_id))
                .order_by("timestamp_c", SortDirection::Desc),
        )
        .await
    }
}

impl RecordService<Deal> {
    /// Deals linked to a contact.
    pub async fn get_by_contact_id(&self, contact_id: RecordId) -> Vec<Deal> {
        self.query(
            self.all_fields()
                .where_equal(CONTACT_FIELD, Value::from(contact_id)),
        )
        .await
    }
}
