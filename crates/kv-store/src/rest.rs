//! Upstash-compatible REST backend.
//!
//! Every command is sent as `POST <endpoint>` with the command and its
//! arguments as a JSON array body, authenticated with a bearer token. The
//! reply is `{"result": ...}` on success and `{"error": "..."}` otherwise.

use crate::error::{Result, StoreError};
use crate::traits::KvStore;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Per-request timeout of the REST client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

pub struct RestStore {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl RestStore {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let token = token.into();
        if endpoint.is_empty() {
            return Err(StoreError::Config("REST endpoint is empty".to_string()));
        }
        if token.trim().is_empty() {
            return Err(StoreError::Config(
                "REST endpoint requires a token".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::backend("connect", e))?;

        Ok(Self {
            client,
            endpoint,
            token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn command(&self, op: &'static str, args: &[&str]) -> Result<Value> {
        let mut body = Vec::with_capacity(args.len() + 1);
        body.push(op);
        body.extend_from_slice(args);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::backend(op, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::backend(op, e))?;
        let reply: Option<Reply> = serde_json::from_str(&text).ok();

        match reply {
            Some(Reply {
                error: Some(message),
                ..
            }) => Err(StoreError::backend(op, message)),
            Some(Reply { result, .. }) if status.is_success() => {
                Ok(result.unwrap_or(Value::Null))
            }
            _ => Err(StoreError::backend(
                op,
                format!("unexpected HTTP {status} response"),
            )),
        }
    }
}

fn as_count(op: &'static str, value: Value) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| StoreError::backend(op, format!("expected integer reply, got {value}")))
}

#[async_trait]
impl KvStore for RestStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.command("GET", &[key]).await? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Ok(Some(other.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.command("SET", &[key, value]).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let removed = self.command("DEL", &[key]).await?;
        Ok(as_count("DEL", removed)? > 0)
    }

    async fn sadd(&self, set: &str, member: &str) -> Result<bool> {
        let added = self.command("SADD", &[set, member]).await?;
        Ok(as_count("SADD", added)? > 0)
    }

    async fn smembers(&self, set: &str) -> Result<Vec<String>> {
        match self.command("SMEMBERS", &[set]).await? {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => Ok(items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect()),
            other => Err(StoreError::backend(
                "SMEMBERS",
                format!("expected array reply, got {other}"),
            )),
        }
    }
}
