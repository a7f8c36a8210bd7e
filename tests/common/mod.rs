#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use uuid::Uuid;

use brigade_api::auth::{issue_token, GlobalRole};
use brigade_api::config::{AppConfig, Environment};
use brigade_api::database::MemoryStore;
use brigade_api::state::AppState;

/// In-process server backed by a fresh `MemoryStore`, one per test.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(AppConfig::preset(Environment::Development)).await
    }

    pub async fn start_with(mut config: AppConfig) -> Result<Self> {
        config.api.enable_request_logging = false;
        config.ordering.retry_backoff_ms = 1;

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(MemoryStore::new());
        let state = AppState::memory(config.clone(), store.clone());
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind {}", base_url))?;

        tokio::spawn(async move {
            let _ = axum::serve(listener, brigade_api::app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            store,
            config,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn token(&self, principal: Uuid, role: GlobalRole) -> String {
        issue_token(principal, role, &self.config.security).expect("token")
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub fn put(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    pub fn anonymous(&self) -> &reqwest::Client {
        &self.client
    }

    /// A staff member assigned to the given restaurants, with a signed token.
    pub async fn staff(&self, tenants: &[i64], role: GlobalRole) -> (Uuid, String) {
        let principal = Uuid::new_v4();
        for tenant_id in tenants {
            self.store.assign(principal, *tenant_id, "manager").await;
        }
        (principal, self.token(principal, role))
    }
}

/// Send a request and decode the JSON body along with the status.
pub async fn send(request: RequestBuilder) -> Result<(StatusCode, Value)> {
    let resp = request.send().await?;
    let status = resp.status();
    let body = if status == StatusCode::NO_CONTENT {
        Value::Null
    } else {
        resp.json::<Value>().await.unwrap_or(Value::Null)
    };
    Ok((status, body))
}

/// Item ids from a `{success, data: [items]}` envelope, in response order.
pub fn ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// `order` values from a `{success, data: [items]}` envelope.
pub fn orders(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .map(|items| items.iter().filter_map(|i| i["order"].as_i64()).collect())
        .unwrap_or_default()
}
