//! Contractors

use serde::{Deserialize, Serialize};

use crate::resource::{Entity, FieldKind, FieldSpec, Schema};

/// A counterparty of the business
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contractor {
    pub id: i64,
    pub name: String,
}

const CONTRACTOR_LIST: Schema = Schema::new(
    "contractor.list",
    &[FieldSpec::optional("query", FieldKind::Str)],
);

const CONTRACTOR_CREATE: Schema = Schema::new(
    "contractor.create",
    &[FieldSpec::required("name", FieldKind::Str)],
);

const CONTRACTOR_UPDATE: Schema = Schema::new(
    "contractor.update",
    &[FieldSpec::optional("name", FieldKind::Str)],
);

impl Entity for Contractor {
    const KIND: &'static str = "contractor";
    const ROOT: &'static str = "/contractor";

    fn id(&self) -> i64 {
        self.id
    }

    fn list_schema() -> &'static Schema {
        &CONTRACTOR_LIST
    }

    fn create_schema() -> Option<&'static Schema> {
        Some(&CONTRACTOR_CREATE)
    }

    fn update_schema() -> Option<&'static Schema> {
        Some(&CONTRACTOR_UPDATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::HttpSend;
    use crate::api::transport::stub::StubHttp;
    use crate::api::transport::Transport;
    use crate::resource::{Args, ResourceManager};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_and_search() {
        let http = StubHttp::new()
            .respond(200, json!({"id": 8, "name": "ACME"}))
            .respond(200, json!([{"id": 8, "name": "ACME"}]));
        let transport: Arc<dyn HttpSend> = http.clone();
        let contractors: Arc<ResourceManager<Contractor>> =
            ResourceManager::new(Arc::new(Transport::new(2, transport)));

        let created = contractors
            .create(&Args::new().set("name", "ACME"))
            .await
            .unwrap();
        assert_eq!(created.id, 8);
        assert_eq!(http.last_body(), json!({"name": "ACME"}));

        let found = contractors
            .list(&Args::new().set("query", "AC ME"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(
            http.requests()[1].query,
            vec![("query".to_string(), "AC ME".to_string())]
        );
    }

    #[test]
    fn test_create_requires_name() {
        assert!(Contractor::create_schema()
            .unwrap()
            .validate(&Args::new())
            .is_err());
    }
}
