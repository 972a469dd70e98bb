#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const ADMIN_USERNAME: &str = "Admin";
pub const ADMIN_PASSWORD: &str = "Admin123";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // DATABASE_URL and friends are inherited from the test environment
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_gbvmis"));
        cmd.env("GBVMIS_PORT", port.to_string())
            .env("DATABASE_RUN_MIGRATIONS", "true")
            .env("DATABASE_SEED", "true")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

/// Shared server for this test binary, or `None` when no database is configured
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    if std::env::var("DATABASE_URL").map(|v| v.trim().is_empty()).unwrap_or(true) {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return Ok(None);
    }
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(30)).await?;
    Ok(Some(server))
}

/// Log in as the seeded admin and return the token pair data
pub async fn login_admin(server: &TestServer) -> Result<Value> {
    let res = reqwest::Client::new()
        .post(server.url("/api/login"))
        .json(&json!({ "identifier": ADMIN_USERNAME, "password": ADMIN_PASSWORD }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "admin login failed: {}", res.status());
    let body: Value = res.json().await?;
    Ok(body["data"].clone())
}

/// Client with the admin bearer token attached to every request
pub async fn admin_client(server: &TestServer) -> Result<reqwest::Client> {
    let tokens = login_admin(server).await?;
    let token = tokens["access_token"].as_str().context("missing access_token")?;

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::AUTHORIZATION,
        format!("Bearer {}", token).parse().context("bad header")?,
    );
    Ok(reqwest::Client::builder().default_headers(headers).build()?)
}

/// Suffix that keeps rows from separate runs apart
pub fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{}{}", prefix, nanos)
}

/// Direct pool for checking rows the API does not expose
pub async fn db() -> Result<sqlx::PgPool> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    Ok(sqlx::PgPool::connect(&url).await?)
}
