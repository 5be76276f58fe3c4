use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::session::Session;
use crate::services::{Clock, SessionStore};

struct StoredSession {
    session: Session,
    expires_at: SystemTime,
}

pub struct MemorySessionStore {
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, StoredSession>>,
}

impl MemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session_id: &str, session: Session, ttl: Duration) {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, stored| stored.expires_at > now);
        entries.insert(
            session_id.to_string(),
            StoredSession {
                session,
                expires_at: now + ttl,
            },
        );
    }

    async fn get(&self, session_id: &str) -> Option<Session> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().await;
            match entries.get(session_id) {
                Some(stored) if stored.expires_at > now => return Some(stored.session.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        debug!("session expired, purging");
        self.entries.write().await.remove(session_id);
        None
    }

    async fn remove(&self, session_id: &str) {
        self.entries.write().await.remove(session_id);
    }
}
