use base64::prelude::{BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Resolved Jira credentials bound to one dashboard session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub base_url: String,
    pub auth_header: String,
    pub project_key: String,
}

impl Session {
    pub fn new(raw_site: &str, identity: &str, secret: &str, project_key: &str) -> Self {
        Self {
            base_url: normalize_site(raw_site),
            auth_header: basic_credential(identity, secret),
            project_key: project_key.trim().to_string(),
        }
    }

    /// Short, non-reversible tag for log lines.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.base_url.as_bytes());
        hasher.update(self.auth_header.as_bytes());
        let hex = hasher.finalize().to_hex();
        hex.as_str()[..12].to_string()
    }

    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Bare hosts get an `https://` scheme; an explicit `http://` is upgraded.
pub fn normalize_site(raw_site: &str) -> String {
    let trimmed = raw_site.trim().trim_end_matches('/');
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("https://") {
        format!("https://{}", &trimmed["https://".len()..])
    } else if lower.starts_with("http://") {
        format!("https://{}", &trimmed["http://".len()..])
    } else {
        format!("https://{trimmed}")
    }
}

pub fn basic_credential(identity: &str, secret: &str) -> String {
    let credentials = format!("{identity}:{secret}");
    let encoded = BASE64_STANDARD.encode(credentials);
    format!("Basic {encoded}")
}
