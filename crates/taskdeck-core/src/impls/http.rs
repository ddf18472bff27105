//! HttpBackend - reqwest による API クライアント
//!
//! # 責務
//! - すべてのリクエストにベアラートークンを付ける（トークンがあれば）
//! - パスをベース URL に連結する（ID はパーセントエンコード）
//! - 2xx 以外はレスポンス本文の `message` を拾って `ApiError::Status` にする
//!
//! リトライ・バックオフはしません。1 アクション = 1 リクエスト。

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::domain::{
    ApiError, MilestoneDraft, MilestoneId, MilestoneStatus, Project, ProjectDraft, ProjectId,
    ProjectPatch, Task, User, UserId,
};
use crate::ports::{CredentialStore, ProjectApi, TaskApi, UserApi};

/// Shared HTTP client. Cheap to clone.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpBackend {
    pub fn new(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", config.api_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.api_url.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.url(segments)?;
        let mut request = self.client.request(method, url);
        if let Some(token) = self.credentials.token() {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        Ok(request)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let request = request
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self.client.execute(request).await.map_err(|e| {
            debug!(%method, %path, error = %e, "request failed before a response");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        debug!(%method, %path, status = status.as_u16(), "response");

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(body.to_vec())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.execute(request).await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_discarding(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.execute(request).await.map(|_| ())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Best-effort `message` from an error body. Non-JSON bodies yield `None`.
fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

#[async_trait]
impl ProjectApi for HttpBackend {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.send(self.request(Method::GET, &["projects"])?).await
    }

    async fn list_user_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.send(self.request(Method::GET, &["projects", "user"])?)
            .await
    }

    async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, ApiError> {
        self.send(self.request(Method::POST, &["projects"])?.json(draft))
            .await
    }

    async fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<Project, ApiError> {
        self.send(
            self.request(Method::PUT, &["projects", id.as_str()])?
                .json(patch),
        )
        .await
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<(), ApiError> {
        self.send_discarding(self.request(Method::DELETE, &["projects", id.as_str()])?)
            .await
    }

    async fn add_team_member(
        &self,
        id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Project, ApiError> {
        let body = serde_json::json!({ "userId": user_id });
        self.send(
            self.request(Method::POST, &["projects", id.as_str(), "team"])?
                .json(&body),
        )
        .await
    }

    async fn remove_team_member(
        &self,
        id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Project, ApiError> {
        self.send(self.request(
            Method::DELETE,
            &["projects", id.as_str(), "team", user_id.as_str()],
        )?)
        .await
    }

    async fn add_milestone(
        &self,
        id: &ProjectId,
        milestone: &MilestoneDraft,
    ) -> Result<Project, ApiError> {
        self.send(
            self.request(Method::POST, &["projects", id.as_str(), "milestones"])?
                .json(milestone),
        )
        .await
    }

    async fn update_milestone_status(
        &self,
        id: &ProjectId,
        milestone_id: &MilestoneId,
        status: &MilestoneStatus,
    ) -> Result<Project, ApiError> {
        let body = serde_json::json!({ "status": status });
        self.send(
            self.request(
                Method::PUT,
                &["projects", id.as_str(), "milestones", milestone_id.as_str()],
            )?
            .json(&body),
        )
        .await
    }
}

#[async_trait]
impl TaskApi for HttpBackend {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.send(self.request(Method::GET, &["tasks"])?).await
    }
}

#[async_trait]
impl UserApi for HttpBackend {
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.send(self.request(Method::GET, &["users"])?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::MemoryCredentials;
    use axum::Router;
    use axum::extract::{Json, Path};
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{get, post, put};
    use serde_json::{Value, json};

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    fn backend(url: &str, token: Option<&str>) -> HttpBackend {
        let config = ClientConfig {
            api_url: url.to_string(),
            ..ClientConfig::default()
        };
        let creds = match token {
            Some(t) => MemoryCredentials::with_token(t),
            None => MemoryCredentials::new(),
        };
        HttpBackend::new(&config, Arc::new(creds)).unwrap()
    }

    fn project_json(id: &str, name: &str) -> Value {
        json!({ "_id": id, "name": name, "status": "active" })
    }

    async fn list_projects(headers: AxumHeaders) -> impl IntoResponse {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        match auth.as_deref() {
            Some("Bearer secret") => (
                StatusCode::OK,
                Json(json!([project_json("p1", "Website"), project_json("p2", "App")])),
            ),
            _ => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Not authorized, no token" })),
            ),
        }
    }

    fn router() -> Router {
        Router::new()
            .route("/api/projects", get(list_projects).post(
                |Json(body): Json<Value>| async move {
                    (StatusCode::CREATED, Json(json!({ "_id": "new", "name": body["name"] })))
                },
            ))
            .route(
                "/api/projects/user",
                get(|| async { Json(json!([project_json("p9", "Mine")])) }),
            )
            .route(
                "/api/projects/:id",
                put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    Json(json!({ "_id": id, "name": body["name"], "status": body["status"] }))
                })
                .delete(|Path(id): Path<String>| async move {
                    if id == "locked" {
                        (StatusCode::FORBIDDEN, Json(json!({ "message": "Not allowed" })))
                    } else {
                        (StatusCode::OK, Json(json!({ "message": "Project removed" })))
                    }
                }),
            )
            .route(
                "/api/projects/:id/team",
                post(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    Json(json!({ "_id": id, "name": "Website", "team": [body["userId"]] }))
                }),
            )
            .route(
                "/api/projects/:id/team/:user_id",
                axum::routing::delete(|Path((id, _user)): Path<(String, String)>| async move {
                    Json(json!({ "_id": id, "name": "Website", "team": [] }))
                }),
            )
            .route(
                "/api/projects/:id/milestones",
                post(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    Json(json!({
                        "_id": id,
                        "name": "Website",
                        "milestones": [{ "_id": "m1", "title": body["title"], "status": "pending" }]
                    }))
                }),
            )
            .route(
                "/api/projects/:id/milestones/:milestone_id",
                put(
                    |Path((id, mid)): Path<(String, String)>, Json(body): Json<Value>| async move {
                        Json(json!({
                            "_id": id,
                            "name": "Website",
                            "milestones": [{ "_id": mid, "title": "Beta", "status": body["status"] }]
                        }))
                    },
                ),
            )
            .route(
                "/api/tasks",
                get(|| async {
                    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "boom" })))
                }),
            )
            .route(
                "/api/users",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
    }

    #[tokio::test]
    async fn attaches_bearer_token_when_present() {
        let url = spawn_server(router()).await;

        let projects = backend(&url, Some("secret")).list_projects().await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].id.as_str(), "p1");

        let err = backend(&url, None).list_projects().await.unwrap_err();
        assert_eq!(
            err,
            ApiError::status(401, "Not authorized, no token")
        );
    }

    #[tokio::test]
    async fn error_body_message_is_extracted() {
        let url = spawn_server(router()).await;
        let api = backend(&url, Some("secret"));

        let err = api.list_tasks().await.unwrap_err();
        assert_eq!(err, ApiError::status(500, "boom"));

        let err = api.list_users().await.unwrap_err();
        assert_eq!(err, ApiError::bare_status(500));
        assert_eq!(err.message_or("Failed to fetch users"), "Failed to fetch users");
    }

    #[tokio::test]
    async fn mutations_hit_their_endpoints() {
        let url = spawn_server(router()).await;
        let api = backend(&url, Some("secret"));
        let id = ProjectId::new("p1");

        let created = api.create_project(&ProjectDraft::new("Launch")).await.unwrap();
        assert_eq!(created.name, "Launch");

        let patch = ProjectPatch {
            name: Some("Renamed".into()),
            status: Some(crate::domain::ProjectStatus::Completed),
            ..ProjectPatch::default()
        };
        let updated = api.update_project(&id, &patch).await.unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.status, Some(crate::domain::ProjectStatus::Completed));

        let mine = api.list_user_projects().await.unwrap();
        assert_eq!(mine[0].id.as_str(), "p9");

        let with_member = api.add_team_member(&id, &UserId::new("u5")).await.unwrap();
        assert_eq!(with_member.team[0].user_id().as_str(), "u5");

        let without = api.remove_team_member(&id, &UserId::new("u5")).await.unwrap();
        assert!(without.team.is_empty());

        let draft = MilestoneDraft {
            title: "Beta".into(),
            ..MilestoneDraft::default()
        };
        let with_milestone = api.add_milestone(&id, &draft).await.unwrap();
        assert_eq!(with_milestone.milestones[0].title, "Beta");

        let moved = api
            .update_milestone_status(&id, &MilestoneId::new("m7"), &MilestoneStatus::Completed)
            .await
            .unwrap();
        assert_eq!(moved.milestones[0].id.as_str(), "m7");
        assert_eq!(moved.milestones[0].status, Some(MilestoneStatus::Completed));

        api.delete_project(&id).await.unwrap();
        let err = api.delete_project(&ProjectId::new("locked")).await.unwrap_err();
        assert_eq!(err, ApiError::status(403, "Not allowed"));
    }

    #[tokio::test]
    async fn non_array_list_body_is_a_decode_error() {
        let router = Router::new().route(
            "/api/projects",
            get(|| async { Json(json!({ "projects": [] })) }),
        );
        let url = spawn_server(router).await;

        let err = backend(&url, None).list_projects().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        // bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = backend(&format!("http://{addr}/api"), None)
            .list_projects()
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn ids_are_percent_encoded_into_the_path() {
        let api = backend("http://localhost:5000/api/", None);
        let url = api.url(&["projects", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/projects/a%20b%2Fc");
    }
}
