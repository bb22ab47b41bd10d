// In-process backend: tables as JSON rows, users with roles, scripted failures.
// Backs `serve --offline` and the service tests.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{BackendError, Result, UNIQUE_VIOLATION};
use crate::query::Query;
use crate::{Auth, BLOG_TABLE, Backend, CONTACT_TABLE, PAGE_TABLE, Session, User};

#[derive(Debug, Clone)]
struct MemoryUser {
    id: String,
    email: String,
    password: String,
    roles: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Vec<Value>>,
    users: Vec<MemoryUser>,
    session: Option<Session>,
    failures: VecDeque<BackendError>,
    calls: Vec<String>,
    next_id: u64,
}

impl State {
    /// Record the call and pop a scripted failure, if any
    fn begin(&mut self, op: &str, target: &str) -> Result<()> {
        self.calls.push(format!("{} {}", op, target));
        match self.failures.pop_front() {
            Some(err) => {
                debug!(op, target, %err, "scripted failure");
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("00000000-0000-4000-8000-{:012}", self.next_id)
    }

    fn table(&mut self, table: &str) -> &mut Vec<Value> {
        self.tables.entry(table.to_string()).or_default()
    }

    fn check_unique(&self, table: &str, row: &Map<String, Value>, skip: Option<usize>) -> Result<()> {
        let Some(column) = unique_column(table) else {
            return Ok(());
        };
        let Some(value) = row.get(column).filter(|v| !v.is_null()) else {
            return Ok(());
        };
        let taken = self
            .tables
            .get(table)
            .into_iter()
            .flatten()
            .enumerate()
            .any(|(i, existing)| Some(i) != skip && existing.get(column) == Some(value));
        if taken {
            return Err(BackendError::Rejected {
                status: 409,
                code: Some(UNIQUE_VIOLATION.to_string()),
                message: format!(
                    "duplicate key value violates unique constraint \"{}_{}_key\"",
                    table, column
                ),
            });
        }
        Ok(())
    }

    fn insert_row(&mut self, table: &str, row: Value) -> Result<Value> {
        let Value::Object(mut fields) = row else {
            return Err(BackendError::Decode(format!("row for {} is not an object", table)));
        };
        self.check_unique(table, &fields, None)?;

        if !fields.contains_key("id") {
            fields.insert("id".to_string(), Value::String(self.next_id()));
        }
        for (column, default) in column_defaults(table) {
            fields.entry(column).or_insert(default);
        }

        let row = Value::Object(fields);
        self.table(table).push(row.clone());
        Ok(row)
    }
}

fn unique_column(table: &str) -> Option<&'static str> {
    match table {
        BLOG_TABLE | PAGE_TABLE => Some("slug"),
        _ => None,
    }
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn column_defaults(table: &str) -> Vec<(String, Value)> {
    let mut defaults = vec![("created_at".to_string(), now())];
    match table {
        CONTACT_TABLE => defaults.push(("is_read".to_string(), Value::Bool(false))),
        BLOG_TABLE => {
            defaults.push(("published".to_string(), Value::Bool(false)));
            defaults.push(("updated_at".to_string(), now()));
        }
        _ => {}
    }
    defaults
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user that can sign in with `email` / `password`
    pub fn with_user(mut self, email: &str, password: &str, roles: &[&str]) -> Self {
        let state = self.state.get_mut();
        let id = state.next_id();
        state.users.push(MemoryUser {
            id,
            email: email.to_string(),
            password: password.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        });
        self
    }

    /// Seed a table; rows get ids and defaults like inserted rows
    pub fn with_rows(mut self, table: &str, rows: Vec<Value>) -> Self {
        let state = self.state.get_mut();
        for row in rows {
            if let Err(err) = state.insert_row(table, row) {
                debug!(table, %err, "seed row skipped");
            }
        }
        self
    }

    /// Make the next call (of any kind) fail with `err`
    pub async fn fail_next(&self, err: BackendError) {
        self.state.lock().await.failures.push_back(err);
    }

    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.state
            .lock()
            .await
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Calls made so far, as "op target"
    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        state.begin("select", table)?;
        let mut rows: Vec<Value> = state
            .table(table)
            .iter()
            .filter(|row| query.matches(row))
            .cloned()
            .collect();
        query.apply_order_and_limit(&mut rows);
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<()> {
        let mut state = self.state.lock().await;
        state.begin("insert", table)?;
        state.insert_row(table, row)?;
        Ok(())
    }

    async fn insert_returning(&self, table: &str, row: Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.begin("insert", table)?;
        state.insert_row(table, row)
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        state.begin("update", table)?;

        let targets: Vec<usize> = state
            .table(table)
            .iter()
            .enumerate()
            .filter(|(_, row)| query.matches(row))
            .map(|(i, _)| i)
            .collect();

        if let Some(fields) = patch.as_object() {
            for &i in &targets {
                state.check_unique(table, fields, Some(i))?;
            }
        }

        let rows = state.table(table);
        let mut updated = Vec::with_capacity(targets.len());
        for i in targets {
            merge(&mut rows[i], &patch);
            updated.push(rows[i].clone());
        }
        Ok(updated)
    }

    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.begin("upsert", table)?;

        let key = row.get(on_conflict).cloned();
        let existing = state
            .table(table)
            .iter()
            .position(|r| key.is_some() && r.get(on_conflict) == key.as_ref());
        match existing {
            Some(i) => merge(&mut state.table(table)[i], &row),
            None => {
                state.insert_row(table, row)?;
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<()> {
        let mut state = self.state.lock().await;
        state.begin("delete", table)?;
        state.table(table).retain(|row| !query.matches(row));
        Ok(())
    }

    async fn count(&self, table: &str, query: &Query) -> Result<u64> {
        let mut state = self.state.lock().await;
        state.begin("count", table)?;
        let n = state.table(table).iter().filter(|row| query.matches(row)).count();
        Ok(n as u64)
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.begin("rpc", function)?;
        match function {
            "has_role" => {
                let user_id = args.get("_user_id").and_then(Value::as_str).unwrap_or_default();
                let role = args.get("_role").and_then(Value::as_str).unwrap_or_default();
                let granted = state
                    .users
                    .iter()
                    .any(|u| u.id == user_id && u.roles.iter().any(|r| r == role));
                Ok(json!(granted))
            }
            _ => Err(BackendError::Rejected {
                status: 404,
                code: Some("PGRST202".to_string()),
                message: format!("Could not find the function public.{}", function),
            }),
        }
    }
}

#[async_trait]
impl Auth for MemoryBackend {
    async fn get_session(&self) -> Result<Option<Session>> {
        let mut state = self.state.lock().await;
        state.begin("get_session", "session")?;
        Ok(state.session.clone())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let mut state = self.state.lock().await;
        state.begin("sign_in", email)?;

        let Some(user) = state
            .users
            .iter()
            .find(|u| u.email == email && u.password == password)
        else {
            return Err(BackendError::Auth("Invalid login credentials".to_string()));
        };

        let session = Session {
            access_token: format!("memory-{}", user.id),
            refresh_token: None,
            expires_at: None,
            user: User {
                id: user.id.clone(),
                email: Some(user.email.clone()),
            },
        };
        state.session = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.begin("sign_out", "session")?;
        state.session = None;
        Ok(())
    }

    async fn has_role(&self, user_id: &str, role: &str) -> Result<bool> {
        let value = self
            .rpc("has_role", json!({ "_user_id": user_id, "_role": role }))
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }
}
