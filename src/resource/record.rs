//! Record
//!
//! An immutable snapshot of one entity's last-known state, bound to the
//! manager that produced it. Mutations go through the manager and hand back a
//! new record; the snapshot they were called on is never touched.

use std::ops::Deref;
use std::sync::{Arc, Weak};

use super::args::Args;
use super::manager::{write_schema, Deleted, Entity, ResourceManager};
use crate::api::error::{Error, Result};

/// Entity snapshot with a non-owning link to its manager
pub struct Record<T: Entity> {
    data: T,
    manager: Weak<ResourceManager<T>>,
}

impl<T: Entity> Record<T> {
    pub(crate) fn new(data: T, manager: Weak<ResourceManager<T>>) -> Self {
        Self { data, manager }
    }

    pub fn id(&self) -> i64 {
        self.data.id()
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_inner(self) -> T {
        self.data
    }

    /// The owning manager, if its session is still alive
    pub fn manager(&self) -> Result<Arc<ResourceManager<T>>> {
        self.manager.upgrade().ok_or(Error::SessionClosed)
    }

    /// Current field values restricted to the update schema
    pub fn update_args(&self) -> Result<Args> {
        let current = serde_json::to_value(&self.data)?;
        write_schema::<T>(T::update_schema(), "update")?.project(&current)
    }

    /// Send the current state overlaid with `changes` and return the
    /// service's post-update state
    ///
    /// The union of this record's updatable fields and `changes` is sent
    /// wholesale, so fields the caller did not touch are re-sent with their
    /// last-known values.
    pub async fn update(&self, changes: Args) -> Result<Record<T>> {
        let manager = self.manager()?;
        let args = self.update_args()?.merge(changes);
        tracing::debug!("update {} {} with {} field(s)", T::KIND, self.id(), args.len());
        manager.update(self.id(), &args).await
    }

    /// Delete this entity on the service
    ///
    /// The record itself stays readable afterwards but no longer describes
    /// anything that exists.
    pub async fn delete(&self) -> Result<Deleted> {
        self.manager()?.delete(self.id()).await
    }

    /// Re-fetch this entity
    pub async fn refresh(&self) -> Result<Record<T>> {
        self.manager()?.get(self.id()).await
    }
}

impl<T: Entity> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T: Entity> Clone for Record<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            manager: Weak::clone(&self.manager),
        }
    }
}

impl<T: Entity + std::fmt::Debug> std::fmt::Debug for Record<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("kind", &T::KIND)
            .field("data", &self.data)
            .finish()
    }
}

impl<T: Entity + PartialEq> PartialEq for Record<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<T: Entity> serde::Serialize for Record<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::HttpSend;
    use crate::api::transport::stub::StubHttp;
    use crate::api::transport::Transport;
    use crate::resource::schema::{FieldKind, FieldSpec, Schema};
    use serde::{Deserialize, Serialize};
    use serde_json::{json, Value};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Note {
        id: i64,
        description: String,
        #[serde(default)]
        pinned: Option<bool>,
        created_at: String,
    }

    const NOTE_UPDATE: Schema = Schema::new(
        "note.update",
        &[
            FieldSpec::optional("description", FieldKind::Str),
            FieldSpec::optional("pinned", FieldKind::Bool),
        ],
    );

    impl Entity for Note {
        const KIND: &'static str = "note";
        const ROOT: &'static str = "/note";

        fn id(&self) -> i64 {
            self.id
        }

        fn update_schema() -> Option<&'static Schema> {
            Some(&NOTE_UPDATE)
        }
    }

    fn setup(http: &Arc<StubHttp>) -> Arc<ResourceManager<Note>> {
        let transport: Arc<dyn HttpSend> = http.clone();
        ResourceManager::new(Arc::new(Transport::new(1, transport)))
    }

    fn note(description: &str) -> Value {
        json!({"id": 4, "description": description, "created_at": "2024-01-01 10:00:00"})
    }

    #[test]
    fn test_update_is_server_authoritative() {
        let http = StubHttp::new()
            .respond(200, note("old"))
            .respond(200, note("server-value"));
        let notes = setup(&http);

        tokio_test::block_on(async {
            let record = notes.get(4).await.unwrap();
            let updated = record
                .update(Args::new().set("description", "new"))
                .await
                .unwrap();

            assert_eq!(updated.description, "server-value");
            // the original snapshot is untouched
            assert_eq!(record.description, "old");
        });

        assert_eq!(http.last_body(), json!({"description": "new"}));
    }

    #[tokio::test]
    async fn test_update_sends_union_of_current_and_changes() {
        let mut current = note("keep me");
        current["pinned"] = json!(true);
        let http = StubHttp::new()
            .respond(200, current.clone())
            .respond(200, current);
        let notes = setup(&http);

        let record = notes.get(4).await.unwrap();
        record
            .update(Args::new().set("pinned", false))
            .await
            .unwrap();

        // created_at is not updatable and id travels in the path
        assert_eq!(
            http.last_body(),
            json!({"description": "keep me", "pinned": false})
        );
        assert_eq!(http.requests()[1].path, "/v1/biz/1/note/4");
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_change_without_request() {
        let http = StubHttp::new().respond(200, note("x"));
        let notes = setup(&http);
        let record = notes.get(4).await.unwrap();

        let err = record
            .update(Args::new().set("created_at", "2024-02-02 00:00:00"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(http.calls(), 1);
    }

    #[tokio::test]
    async fn test_update_of_vanished_entity_is_not_found() {
        let http = StubHttp::new()
            .respond(200, note("x"))
            .respond(404, json!({"message": "Not found"}));
        let notes = setup(&http);
        let record = notes.get(4).await.unwrap();

        let err = record
            .update(Args::new().set("description", "y"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound { ref path } if path == "/v1/biz/1/note/4"));
        assert_eq!(err.status(), Some(404));
        let put = &http.requests()[1];
        assert_eq!(put.method, crate::api::http::Method::Put);
        assert_eq!(put.path, "/v1/biz/1/note/4");
        assert_eq!(record.description, "x");
    }

    #[tokio::test]
    async fn test_delete_delegates_to_manager() {
        let http = StubHttp::new()
            .respond(200, note("x"))
            .respond(200, json!({"success": true}));
        let notes = setup(&http);

        let record = notes.get(4).await.unwrap();
        let deleted = record.delete().await.unwrap();

        assert!(deleted.acknowledged);
        assert_eq!(http.requests()[1].path, "/v1/biz/1/note/4");
        // still readable after deletion
        assert_eq!(record.description, "x");
    }

    #[tokio::test]
    async fn test_record_does_not_keep_manager_alive() {
        let http = StubHttp::new().respond(200, note("x"));
        let notes = setup(&http);
        let record = notes.get(4).await.unwrap();

        drop(notes);

        assert!(matches!(record.delete().await, Err(Error::SessionClosed)));
        assert!(matches!(
            record.update(Args::new()).await,
            Err(Error::SessionClosed)
        ));
    }
}
