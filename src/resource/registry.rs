//! Session Registry
//!
//! A [`Session`] bundles the transport and one manager per entity kind for a
//! single business account. A [`Registry`] maps business ids to sessions so
//! that callers working with several accounts can look them up by id.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::manager::ResourceManager;
use crate::api::http::HttpSend;
use crate::api::transport::Transport;
use crate::models::{Account, Company, Contractor, Item, Order, Transaction};

/// All managers for one business account
#[derive(Debug)]
pub struct Session {
    transport: Arc<Transport>,
    pub accounts: Arc<ResourceManager<Account>>,
    pub companies: Arc<ResourceManager<Company>>,
    pub contractors: Arc<ResourceManager<Contractor>>,
    pub orders: Arc<ResourceManager<Order>>,
    pub items: Arc<ResourceManager<Item>>,
    pub transactions: Arc<ResourceManager<Transaction>>,
}

impl Session {
    pub fn new(biz_id: i64, http: Arc<dyn HttpSend>) -> Self {
        let transport = Arc::new(Transport::new(biz_id, http));
        Self {
            accounts: ResourceManager::new(Arc::clone(&transport)),
            companies: ResourceManager::new(Arc::clone(&transport)),
            contractors: ResourceManager::new(Arc::clone(&transport)),
            orders: ResourceManager::new(Arc::clone(&transport)),
            items: ResourceManager::new(Arc::clone(&transport)),
            transactions: ResourceManager::new(Arc::clone(&transport)),
            transport,
        }
    }

    pub fn biz_id(&self) -> i64 {
        self.transport.biz_id()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}

/// Business id to session lookup
///
/// Registering an id that is already present replaces the old session.
/// Callers that already hold an `Arc<Session>` keep using it.
#[derive(Debug, Default)]
pub struct Registry {
    sessions: RwLock<HashMap<i64, Arc<Session>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session, returning the one it replaced
    pub async fn register(&self, session: Session) -> Option<Arc<Session>> {
        let biz_id = session.biz_id();
        let replaced = self
            .sessions
            .write()
            .await
            .insert(biz_id, Arc::new(session));

        if replaced.is_some() {
            tracing::info!("Replaced session for business {}", biz_id);
        } else {
            tracing::info!("Registered session for business {}", biz_id);
        }
        replaced
    }

    pub async fn get(&self, biz_id: i64) -> Option<Arc<Session>> {
        self.sessions.read().await.get(&biz_id).cloned()
    }

    pub async fn remove(&self, biz_id: i64) -> Option<Arc<Session>> {
        self.sessions.write().await.remove(&biz_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Registered business ids, sorted
    pub async fn biz_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.sessions.read().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
