//! Hosted backend access (Supabase PostgREST + GoTrue) and the services
//! built on it: contact lead storage, admin auth, dashboard, blog and page
//! content management.

pub mod admin;
pub mod auth;
pub mod blog;
pub mod error;
pub mod memory;
pub mod query;
pub mod supabase;
pub mod transport;

pub use error::{BackendError, Result};
pub use memory::MemoryBackend;
pub use query::Query;
pub use supabase::SupabaseClient;
pub use transport::ContactSubmissions;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CONTACT_TABLE: &str = "contact_submissions";
pub const BLOG_TABLE: &str = "blog_posts";
pub const PAGE_TABLE: &str = "page_content";

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Access token pair returned by the password grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds)
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

impl Session {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Table access. Injected wherever rows are read or written.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>>;

    /// Insert without reading the row back
    async fn insert(&self, table: &str, row: Value) -> Result<()>;

    async fn insert_returning(&self, table: &str, row: Value) -> Result<Value>;

    /// Patch matching rows and return them
    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>>;

    /// Insert, or merge into the row that conflicts on `on_conflict`
    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<()>;

    async fn delete(&self, table: &str, query: &Query) -> Result<()>;

    async fn count(&self, table: &str, query: &Query) -> Result<u64>;

    async fn rpc(&self, function: &str, args: Value) -> Result<Value>;
}

#[async_trait]
pub trait Auth: Send + Sync {
    async fn get_session(&self) -> Result<Option<Session>>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    async fn sign_out(&self) -> Result<()>;

    async fn has_role(&self, user_id: &str, role: &str) -> Result<bool>;
}

/// Decode table rows into typed records
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(BackendError::from))
        .collect()
}

pub fn decode_row<T: DeserializeOwned>(row: Value) -> Result<T> {
    Ok(serde_json::from_value(row)?)
}
