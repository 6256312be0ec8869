#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{multipart, Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use civic_pulse_api::config::AppConfig;
use civic_pulse_api::database::models::Role;
use civic_pulse_api::database::Repositories;
use civic_pulse_api::storage::LocalImageStore;
use civic_pulse_api::{app, AppState};

pub const PASSWORD: &str = "password123";

/// In-process server on its own port, backed by a fresh in-memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
    pub client: Client,
    uploads: TempDir,
}

/// A registered account and its bearer token
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub token: String,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let uploads = TempDir::new().context("failed to create uploads dir")?;
        let config = Arc::new(AppConfig::for_tests(uploads.path()));
        let images = LocalImageStore::open(uploads.path()).await?;
        let state = AppState::new(config, Repositories::memory(), Arc::new(images));

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let router = app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            client: Client::new(),
            uploads,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
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
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn upload_path(&self, file_name: &str) -> std::path::PathBuf {
        self.uploads.path().join(file_name)
    }

    pub async fn register(&self, name: &str, email: &str) -> Result<Account> {
        let res = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "name": name, "email": email, "password": PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        let body: Value = res.json().await?;
        account_from(&body)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(StatusCode, Value)> {
        let res = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok((res.status(), res.json().await?))
    }

    /// Registers an account and grants it the admin role directly in the store
    pub async fn admin(&self, name: &str, email: &str) -> Result<Account> {
        let account = self.register(name, email).await?;
        self.state.repos.users.set_role(account.id, Role::Admin).await?;
        Ok(account)
    }

    pub async fn create_problem(&self, account: &Account, title: &str, location: &str) -> Result<Value> {
        let form = multipart::Form::new()
            .text("title", title.to_string())
            .text("description", format!("{} needs attention from the city", title))
            .text("location", location.to_string());
        let (status, body) = self.post_form(account, form).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create problem failed: {} {}", status, body);
        Ok(body["data"]["problem"].clone())
    }

    pub async fn post_form(&self, account: &Account, form: multipart::Form) -> Result<(StatusCode, Value)> {
        let res = self
            .client
            .post(self.url("/api/problems"))
            .bearer_auth(&account.token)
            .multipart(form)
            .send()
            .await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn get(&self, path: &str, account: Option<&Account>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.get(self.url(path));
        if let Some(account) = account {
            req = req.bearer_auth(&account.token);
        }
        let res = req.send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn post_json(&self, path: &str, account: &Account, body: Value) -> Result<(StatusCode, Value)> {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(&account.token)
            .json(&body)
            .send()
            .await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn post_empty(&self, path: &str, account: &Account) -> Result<(StatusCode, Value)> {
        let res = self.client.post(self.url(path)).bearer_auth(&account.token).send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn put_json(&self, path: &str, account: &Account, body: Value) -> Result<(StatusCode, Value)> {
        let res = self
            .client
            .put(self.url(path))
            .bearer_auth(&account.token)
            .json(&body)
            .send()
            .await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn delete(&self, path: &str, account: &Account) -> Result<(StatusCode, Value)> {
        let res = self.client.delete(self.url(path)).bearer_auth(&account.token).send().await?;
        Ok((res.status(), res.json().await?))
    }
}

pub fn account_from(body: &Value) -> Result<Account> {
    let data = &body["data"];
    Ok(Account {
        id: data["user"]["id"].as_i64().context("missing user id")?,
        email: data["user"]["email"].as_str().context("missing email")?.to_string(),
        token: data["token"].as_str().context("missing token")?.to_string(),
    })
}

/// Smallest valid PNG header plus padding; content is never decoded
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 64]);
    bytes
}
