//! Company list search.

use super::RecordService;
use dealflow_core::Company;

pub const COMPANY_SEARCH_FIELDS: [&str; 3] = ["name_c", "industry_c", "website_c"];

impl RecordService<Company> {
    /// Case-insensitive search over name, industry and website.
    pub async fn search(&self, query: &str) -> Vec<Company> {
        let query = query.trim();
        if query.is_empty() {
            return self.get_all().await;
        }
        self.query(self.all_fields().any_contains(COMPANY_SEARCH_FIELDS, query))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealflow_core::{CompanyStatus, Record, RecordingNotifier};
    use dealflow_storage::InMemoryRecordStore;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_company_search_and_defaults() {
        let service = RecordService::<Company>::new(
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(RecordingNotifier::new()),
        );
        let input: Record =
            serde_json::from_value(json!({"name": "Acme", "industry": "Manufacturing"})).unwrap();
        let acme = service.create(&input).await.unwrap();
        assert_eq!(acme.status, CompanyStatus::Active);
        assert!(acme.last_contact.is_some());

        let input: Record =
            serde_json::from_value(json!({"name": "Globex", "website": "globex.io"})).unwrap();
        service.create(&input).await.unwrap();

        assert_eq!(service.search("manufact").await.len(), 1);
        assert_eq!(service.search(".IO").await[0].name, "Globex");
        assert_eq!(service.search("").await.len(), 2);
    }
}
