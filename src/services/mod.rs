pub mod issue_tracker;
pub mod session_store;

pub use issue_tracker::IssueTrackerService;
pub use session_store::{Clock, SessionStore, SystemClock};
