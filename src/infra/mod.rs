pub mod jira;
pub mod sessions;
