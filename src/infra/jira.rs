use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::field::RemoteField;
use crate::domain::session::Session;
use crate::domain::ticket::Ticket;
use crate::domain::update::TransitionCandidate;
use crate::error::{AppError, AppResult, AuthFailure};
use crate::services::IssueTrackerService;

/// Status reported when Jira could not be reached at all.
const NO_RESPONSE_STATUS: u16 = 502;

pub struct JiraClient {
    http: Client,
}

impl JiraClient {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let http = Client::builder().timeout(timeout).build().map_err(|err| {
            AppError::Configuration(format!("failed to build Jira HTTP client: {err}"))
        })?;
        Ok(Self { http })
    }

    fn authorized(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request
            .header(AUTHORIZATION, &session.auth_header)
            .header(ACCEPT, "application/json")
    }

    fn issue_endpoint(session: &Session, key: &str) -> String {
        session.api_url(&format!("rest/api/3/issue/{}", key.trim()))
    }

    fn transitions_endpoint(session: &Session, key: &str) -> String {
        format!("{}/transitions", Self::issue_endpoint(session, key))
    }

    async fn send(request: RequestBuilder) -> AppResult<(StatusCode, String)> {
        let response = request.send().await.map_err(|err| {
            warn!(error = %err, "Jira request failed");
            AppError::Upstream {
                status: NO_RESPONSE_STATUS,
                body: format!("failed to call Jira: {err}"),
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());
        Ok((status, body))
    }

    async fn request_json<T: DeserializeOwned>(request: RequestBuilder) -> AppResult<T> {
        let (status, body) = Self::send(request).await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), %body, "Jira returned an error");
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|err| AppError::Upstream {
            status: status.as_u16(),
            body: format!("failed to parse Jira response: {err}"),
        })
    }

    async fn request_status_only(request: RequestBuilder) -> AppResult<()> {
        let (status, body) = Self::send(request).await?;
        if status.is_success() {
            Ok(())
        } else {
            warn!(status = status.as_u16(), %body, "Jira rejected the request");
            Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    async fn verify_identity(&self, session: &Session) -> AppResult<()> {
        let request = self.authorized(
            self.http.get(session.api_url("rest/api/3/myself")),
            session,
        );
        let response = request.send().await.map_err(|err| {
            warn!(error = %err, site = %session.base_url, "Jira site unreachable");
            AppError::Auth {
                reason: AuthFailure::Unreachable,
            }
        })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::Auth {
                reason: AuthFailure::InvalidCredentials,
            }),
            other => Err(AppError::Auth {
                reason: AuthFailure::UnexpectedStatus(other.as_u16()),
            }),
        }
    }

    async fn field_directory(&self, session: &Session) -> AppResult<Vec<RemoteField>> {
        let request = self.authorized(self.http.get(session.api_url("rest/api/2/field")), session);
        Self::request_json(request).await
    }

    async fn search(
        &self,
        session: &Session,
        jql: &str,
        fields: &[String],
    ) -> AppResult<Vec<Ticket>> {
        let request = self
            .authorized(self.http.get(session.api_url("rest/api/3/search")), session)
            .query(&[("jql", jql), ("fields", fields.join(",").as_str())]);
        let payload: JiraSearchResponse = Self::request_json(request).await?;
        debug!(count = payload.issues.len(), "Jira search returned issues");
        Ok(payload.issues)
    }

    async fn transitions(
        &self,
        session: &Session,
        key: &str,
    ) -> AppResult<Vec<TransitionCandidate>> {
        let request = self.authorized(
            self.http.get(Self::transitions_endpoint(session, key)),
            session,
        );
        let payload: JiraTransitionsResponse = Self::request_json(request).await?;
        Ok(payload.transitions)
    }

    async fn update_fields(
        &self,
        session: &Session,
        key: &str,
        fields: &Map<String, Value>,
    ) -> AppResult<()> {
        let request = self
            .authorized(self.http.put(Self::issue_endpoint(session, key)), session)
            .header(CONTENT_TYPE, "application/json")
            .json(&JiraEditIssueRequest { fields });
        Self::request_status_only(request).await
    }

    async fn apply_transition(
        &self,
        session: &Session,
        key: &str,
        transition_id: &str,
    ) -> AppResult<()> {
        let request = self
            .authorized(
                self.http.post(Self::transitions_endpoint(session, key)),
                session,
            )
            .header(CONTENT_TYPE, "application/json")
            .json(&JiraTransitionRequest {
                transition: JiraTransitionRef { id: transition_id },
            });
        Self::request_status_only(request).await
    }
}

#[derive(Deserialize)]
struct JiraSearchResponse {
    #[serde(default)]
    issues: Vec<Ticket>,
}

#[derive(Deserialize)]
struct JiraTransitionsResponse {
    #[serde(default)]
    transitions: Vec<TransitionCandidate>,
}

#[derive(Serialize)]
struct JiraEditIssueRequest<'a> {
    fields: &'a Map<String, Value>,
}

#[derive(Serialize)]
struct JiraTransitionRequest<'a> {
    transition: JiraTransitionRef<'a>,
}

#[derive(Serialize)]
struct JiraTransitionRef<'a> {
    id: &'a str,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;
    use crate::domain::session::basic_credential;

    #[derive(Clone, Default)]
    struct MockJira {
        searches: Arc<Mutex<Vec<HashMap<String, String>>>>,
        edits: Arc<Mutex<Vec<(String, Value)>>>,
        transitions: Arc<Mutex<Vec<(String, Value)>>>,
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            == Some(basic_credential("dev@acme.io", "token").as_str())
    }

    async fn myself(headers: HeaderMap) -> StatusCode {
        if authorized(&headers) {
            StatusCode::OK
        } else {
            StatusCode::UNAUTHORIZED
        }
    }

    async fn fields() -> Json<Value> {
        Json(json!([
            {"id": "summary", "name": "Summary", "custom": false},
            {"id": "customfield_10041", "name": "UAT Planned Start Date", "custom": true}
        ]))
    }

    async fn search(
        State(state): State<MockJira>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        state.searches.lock().expect("searches lock").push(params);
        Json(json!({
            "startAt": 0,
            "total": 1,
            "issues": [
                {"key": "ABC-1", "fields": {"summary": "Checkout", "status": {"name": "To Do"}}}
            ]
        }))
    }

    async fn list_transitions(Path(key): Path<String>) -> (StatusCode, Json<Value>) {
        if key == "ABC-404" {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"errorMessages": ["Issue does not exist"]})),
            );
        }
        (
            StatusCode::OK,
            Json(json!({"transitions": [{"id": "31", "name": "Done", "to": {"name": "Done"}}]})),
        )
    }

    async fn post_transition(
        State(state): State<MockJira>,
        Path(key): Path<String>,
        Json(body): Json<Value>,
    ) -> StatusCode {
        state
            .transitions
            .lock()
            .expect("transitions lock")
            .push((key, body));
        StatusCode::NO_CONTENT
    }

    async fn edit_issue(
        State(state): State<MockJira>,
        Path(key): Path<String>,
        Json(body): Json<Value>,
    ) -> Result<StatusCode, (StatusCode, Json<Value>)> {
        if body["fields"].get("bogus").is_some() {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({"errors": {"bogus": "Field 'bogus' cannot be set."}})),
            ));
        }
        state.edits.lock().expect("edits lock").push((key, body));
        Ok(StatusCode::NO_CONTENT)
    }

    async fn spawn_mock_jira() -> (Session, MockJira) {
        let state = MockJira::default();
        let app = Router::new()
            .route("/rest/api/3/myself", get(myself))
            .route("/rest/api/2/field", get(fields))
            .route("/rest/api/3/search", get(search))
            .route("/rest/api/3/issue/{key}", axum::routing::put(edit_issue))
            .route(
                "/rest/api/3/issue/{key}/transitions",
                get(list_transitions).post(post_transition),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock Jira listener");
        let address: SocketAddr = listener.local_addr().expect("mock listener local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("run mock Jira");
        });

        let session = Session {
            base_url: format!("http://{address}"),
            auth_header: basic_credential("dev@acme.io", "token"),
            project_key: "ABC".to_string(),
        };
        (session, state)
    }

    fn client() -> JiraClient {
        JiraClient::new(Duration::from_secs(5)).expect("client")
    }

    #[tokio::test]
    async fn verifies_identity_with_basic_auth() {
        let (session, _) = spawn_mock_jira().await;
        client().verify_identity(&session).await.expect("valid login");

        let wrong = Session {
            auth_header: basic_credential("dev@acme.io", "wrong"),
            ..session
        };
        let error = client().verify_identity(&wrong).await.expect_err("rejected");
        assert!(matches!(
            error,
            AppError::Auth {
                reason: AuthFailure::InvalidCredentials
            }
        ));
    }

    #[tokio::test]
    async fn unreachable_site_is_reported_as_auth_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let address = listener.local_addr().expect("addr");
        drop(listener);
        let session = Session {
            base_url: format!("http://{address}"),
            auth_header: basic_credential("dev@acme.io", "token"),
            project_key: "ABC".to_string(),
        };
        let error = client().verify_identity(&session).await.expect_err("down");
        assert!(matches!(
            error,
            AppError::Auth {
                reason: AuthFailure::Unreachable
            }
        ));
    }

    #[tokio::test]
    async fn searches_with_jql_and_explicit_fields() {
        let (session, state) = spawn_mock_jira().await;
        let fields = vec!["summary".to_string(), "status".to_string()];
        let tickets = client()
            .search(&session, "project = \"ABC\"", &fields)
            .await
            .expect("search");
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].text("status").as_deref(), Some("To Do"));

        let searches = state.searches.lock().expect("searches lock").clone();
        assert_eq!(searches[0].get("jql").map(String::as_str), Some("project = \"ABC\""));
        assert_eq!(
            searches[0].get("fields").map(String::as_str),
            Some("summary,status")
        );
    }

    #[tokio::test]
    async fn reads_field_directory_and_transitions() {
        let (session, _) = spawn_mock_jira().await;
        let directory = client().field_directory(&session).await.expect("fields");
        assert_eq!(directory[1].id, "customfield_10041");

        let transitions = client()
            .transitions(&session, "ABC-1")
            .await
            .expect("transitions");
        assert_eq!(
            transitions,
            vec![TransitionCandidate {
                id: "31".into(),
                name: "Done".into()
            }]
        );

        let missing = client()
            .transitions(&session, "ABC-404")
            .await
            .expect_err("missing issue");
        assert!(matches!(missing, AppError::Upstream { status: 404, .. }));
    }

    #[tokio::test]
    async fn sends_field_edits_and_transitions() {
        let (session, state) = spawn_mock_jira().await;
        let mut fields = Map::new();
        fields.insert("summary".into(), json!("Renamed"));
        client()
            .update_fields(&session, "ABC-1", &fields)
            .await
            .expect("edit");
        client()
            .apply_transition(&session, "ABC-1", "31")
            .await
            .expect("transition");

        let edits = state.edits.lock().expect("edits lock").clone();
        assert_eq!(
            edits,
            vec![("ABC-1".to_string(), json!({"fields": {"summary": "Renamed"}}))]
        );
        let transitions = state.transitions.lock().expect("transitions lock").clone();
        assert_eq!(
            transitions,
            vec![("ABC-1".to_string(), json!({"transition": {"id": "31"}}))]
        );
    }

    #[tokio::test]
    async fn surfaces_remote_field_errors() {
        let (session, _) = spawn_mock_jira().await;
        let mut fields = Map::new();
        fields.insert("bogus".into(), json!("x"));
        let error = client()
            .update_fields(&session, "ABC-1", &fields)
            .await
            .expect_err("unknown field");
        match error {
            AppError::Upstream { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("cannot be set"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
