// Supabase REST client: PostgREST tables + GoTrue password auth

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tadilat_core::BackendConfig;
use tadilat_core::config::BACKEND_KEY_ENV;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{BackendError, Result};
use crate::query::Query;
use crate::{Auth, Backend, Session};

const PREFER: &str = "Prefer";

/// PostgREST error body
#[derive(Debug, Deserialize)]
struct RestError {
    code: Option<String>,
    message: Option<String>,
}

/// GoTrue error body (older and newer field names)
#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
}

impl SupabaseClient {
    /// Create a client for the project at `url` using the public anon key
    pub fn new(url: &str, anon_key: &str) -> Result<Self> {
        let base_url = url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(BackendError::Config(format!(
                "backend url must be http(s), got '{}'",
                url
            )));
        }
        if anon_key.trim().is_empty() {
            return Err(BackendError::Config("anon key is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("apikey"),
            HeaderValue::from_str(anon_key.trim())
                .map_err(|e| BackendError::Config(e.to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            anon_key: anon_key.trim().to_string(),
            session: RwLock::new(None),
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let key = config.anon_key.as_deref().ok_or_else(|| {
            BackendError::Config(format!(
                "no anon key; set [backend].anon_key or {}",
                BACKEND_KEY_ENV
            ))
        })?;
        Self::new(&config.url, key)
    }

    /// Resume a previously stored session
    pub fn with_session(self, session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
            ..self
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn bearer(&self) -> String {
        match &*self.session.read().await {
            Some(session) => session.access_token.clone(),
            None => self.anon_key.clone(),
        }
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "backend request");
        self.client
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", self.bearer().await))
    }

    fn table_path(table: &str) -> String {
        format!("/rest/v1/{}", table)
    }
}

/// Pass successful responses through; turn error bodies into `Rejected`
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<RestError>(&text) {
        Ok(body) => (body.code, body.message.unwrap_or_else(|| text.clone())),
        Err(_) => (None, text.clone()),
    };
    Err(BackendError::Rejected {
        status: status.as_u16(),
        code,
        message,
    })
}

async fn json_or_null(response: Response) -> Result<Value> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

/// Total from a `Content-Range` header: "0-24/3573" or "*/0"
pub fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit('/').next()?.trim().parse().ok()
}

#[async_trait]
impl Backend for SupabaseClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>> {
        let response = self
            .request(Method::GET, &Self::table_path(table))
            .await
            .query(&query.to_params())
            .send()
            .await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<()> {
        let response = self
            .request(Method::POST, &Self::table_path(table))
            .await
            .header(PREFER, "return=minimal")
            .json(&row)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn insert_returning(&self, table: &str, row: Value) -> Result<Value> {
        let response = self
            .request(Method::POST, &Self::table_path(table))
            .await
            .header(PREFER, "return=representation")
            .json(&row)
            .send()
            .await?;
        let rows: Vec<Value> = check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::Decode(format!("insert into {} returned no row", table)))
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>> {
        let response = self
            .request(Method::PATCH, &Self::table_path(table))
            .await
            .header(PREFER, "return=representation")
            .query(&query.filter_params())
            .json(&patch)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<()> {
        let response = self
            .request(Method::POST, &Self::table_path(table))
            .await
            .header(PREFER, "resolution=merge-duplicates,return=minimal")
            .query(&[("on_conflict", on_conflict)])
            .json(&row)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<()> {
        let response = self
            .request(Method::DELETE, &Self::table_path(table))
            .await
            .query(&query.filter_params())
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn count(&self, table: &str, query: &Query) -> Result<u64> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(query.filter_params());

        let response = self
            .request(Method::HEAD, &Self::table_path(table))
            .await
            .header(PREFER, "count=exact")
            .query(&params)
            .send()
            .await?;
        let response = check(response).await?;

        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| BackendError::Decode(format!("no row count for {}", table)))
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value> {
        let response = self
            .request(Method::POST, &format!("/rest/v1/rpc/{}", function))
            .await
            .json(&args)
            .send()
            .await?;
        json_or_null(check(response).await?).await
    }
}

#[async_trait]
impl Auth for SupabaseClient {
    async fn get_session(&self) -> Result<Option<Session>> {
        let now = chrono::Utc::now().timestamp();
        Ok(self
            .session
            .read()
            .await
            .clone()
            .filter(|s| !s.is_expired(now)))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .client
            .post(format!("{}/auth/v1/token", self.base_url))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AuthErrorBody>(&text)
                .ok()
                .and_then(|b| b.error_description.or(b.msg).or(b.message))
                .unwrap_or(text);
            return Err(BackendError::Auth(message));
        }

        let session: Session = check(response).await?.json().await?;
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        let Some(session) = self.session.write().await.take() else {
            return Ok(());
        };

        let response = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", session.access_token))
            .send()
            .await?;

        // An already revoked token still counts as signed out
        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 404 {
            warn!(%status, "logout rejected, session already invalid");
            return Ok(());
        }
        check(response).await?;
        Ok(())
    }

    async fn has_role(&self, user_id: &str, role: &str) -> Result<bool> {
        let value = self
            .rpc("has_role", json!({ "_user_id": user_id, "_role": role }))
            .await?;
        value
            .as_bool()
            .ok_or_else(|| BackendError::Decode(format!("has_role returned {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::User;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&server.uri(), "anon-key").unwrap()
    }

    fn session() -> Session {
        Session {
            access_token: "user-token".to_string(),
            refresh_token: None,
            expires_at: None,
            user: User {
                id: "u1".to_string(),
                email: Some("admin@example.com".to_string()),
            },
        }
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(matches!(
            SupabaseClient::new("example.supabase.co", "key"),
            Err(BackendError::Config(_))
        ));
        assert!(matches!(
            SupabaseClient::new("https://example.supabase.co", " "),
            Err(BackendError::Config(_))
        ));
        let config = BackendConfig {
            url: "https://example.supabase.co".to_string(),
            anon_key: None,
        };
        assert!(matches!(
            SupabaseClient::from_config(&config),
            Err(BackendError::Config(_))
        ));
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-1/*"), None);
    }

    #[tokio::test]
    async fn test_insert_sends_anon_headers_and_minimal_prefer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/contact_submissions"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .and(header("prefer", "return=minimal"))
            .and(body_json(json!({ "name": "Ali" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .insert("contact_submissions", json!({ "name": "Ali" }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_select_renders_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/blog_posts"))
            .and(query_param("select", "*"))
            .and(query_param("published", "eq.true"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "1" }])))
            .expect(1)
            .mount(&server)
            .await;

        let rows = client(&server)
            .select(
                "blog_posts",
                &Query::by("published", true).order("created_at", false),
            )
            .await
            .unwrap();
        assert_eq!(rows, vec![json!({ "id": "1" })]);
    }

    #[tokio::test]
    async fn test_error_body_becomes_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/blog_posts"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint \"blog_posts_slug_key\"",
                "details": null,
                "hint": null
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .insert_returning("blog_posts", json!({ "slug": "a" }))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert!(matches!(err, BackendError::Rejected { status: 409, .. }));
    }

    #[tokio::test]
    async fn test_count_reads_content_range() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/rest/v1/contact_submissions"))
            .and(query_param("is_read", "eq.false"))
            .and(header("prefer", "count=exact"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-range", "0-6/7"))
            .expect(1)
            .mount(&server)
            .await;

        let count = client(&server)
            .count("contact_submissions", &Query::by("is_read", false))
            .await
            .unwrap();
        assert_eq!(count, 7);
    }

    #[tokio::test]
    async fn test_upsert_uses_on_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/page_content"))
            .and(query_param("on_conflict", "slug"))
            .and(body_json(json!({ "slug": "urla-tadilat" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .upsert("page_content", json!({ "slug": "urla-tadilat" }), "slug")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sign_in_stores_session_for_later_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(body_json(json!({ "email": "admin@example.com", "password": "secret" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "user-token",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "r",
                "user": { "id": "u1", "email": "admin@example.com" }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/has_role"))
            .and(header("authorization", "Bearer user-token"))
            .and(body_json(json!({ "_user_id": "u1", "_role": "admin" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let session = client
            .sign_in_with_password("admin@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(session.user.id, "u1");
        assert_eq!(client.get_session().await.unwrap(), Some(session));
        assert!(client.has_role("u1", "admin").await.unwrap());
    }

    #[tokio::test]
    async fn test_sign_in_failure_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let err = client
            .sign_in_with_password("admin@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err, BackendError::Auth("Invalid login credentials".to_string()));
        assert_eq!(client.get_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_even_when_token_revoked() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).with_session(session());
        client.sign_out().await.unwrap();
        assert_eq!(client.get_session().await.unwrap(), None);
        // Second sign-out has nothing to revoke
        client.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_session_is_not_returned() {
        let server = MockServer::start().await;
        let expired = Session {
            expires_at: Some(1),
            ..session()
        };
        let client = client(&server).with_session(expired);
        assert_eq!(client.get_session().await.unwrap(), None);
    }
}
