use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::Config;
use crate::interview::session::InterviewSession;
use crate::llm_client::TextGenerator;

/// One live session. The mutex serializes events so each runs to completion.
pub type SessionHandle = Arc<Mutex<InterviewSession>>;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Model boundary. `LlmClient` in production; swapped for a double in tests.
    pub llm: Arc<dyn TextGenerator>,
    pub config: Config,
    pub sessions: SessionRegistry,
}

/// In-memory sessions keyed by id. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionRegistry {
    pub async fn insert(&self, session: InterviewSession) -> SessionHandle {
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.inner.write().await.insert(id, handle.clone());
        handle
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.inner.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> Option<SessionHandle> {
        self.inner.write().await.remove(&id)
    }
}
