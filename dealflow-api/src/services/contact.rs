//! Contact lookups beyond plain CRUD.

use super::RecordService;
use dealflow_core::Contact;

/// Fields matched by contact search.
pub const CONTACT_SEARCH_FIELDS: [&str; 5] =
    ["first_name_c", "last_name_c", "email_c", "company_c", "tags_c"];

impl RecordService<Contact> {
    /// Case-insensitive substring search. A blank query lists everything.
    pub async fn search(&self, query: &str) -> Vec<Contact> {
        let query = query.trim();
        if query.is_empty() {
            return self.get_all().await;
        }
        self.query(self.all_fields().any_contains(CONTACT_SEARCH_FIELDS, query))
            .await
    }
}
