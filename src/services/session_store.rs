use std::time::{Duration, SystemTime};

use async_trait::async_trait;

use crate::domain::session::Session;

/// Time source for session expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Server-side sessions keyed by the id carried in the dashboard cookie.
/// Entries expire a fixed `ttl` after creation; reads do not extend them.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session_id: &str, session: Session, ttl: Duration);
    async fn get(&self, session_id: &str) -> Option<Session>;
    async fn remove(&self, session_id: &str);
}
