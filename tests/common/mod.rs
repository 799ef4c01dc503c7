#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use pgha_api::backup::{BackupToolRunner, RunnerError, ToolOutput};
use pgha_api::config::Settings;
use pgha_api::web::{create_app, state::AppState};

/// Canned answer for [`ScriptedRunner`]
#[derive(Debug, Clone)]
pub enum Scripted {
    Output(ToolOutput),
    NotInstalled,
    TimedOut,
    Io,
    /// Never answers within a request timeout
    Stalled,
}

impl Scripted {
    pub fn success(stdout: &str) -> Self {
        Scripted::Output(ToolOutput {
            exit_code: Some(0),
            success: true,
            stdout: stdout.to_string(),
            stderr: String::new(),
        })
    }

    pub fn failure(code: i32, stderr: &str) -> Self {
        Scripted::Output(ToolOutput {
            exit_code: Some(code),
            success: false,
            stdout: String::new(),
            stderr: stderr.to_string(),
        })
    }
}

/// Backup runner that never spawns a process
#[derive(Debug)]
pub struct ScriptedRunner(pub Scripted);

#[async_trait]
impl BackupToolRunner for ScriptedRunner {
    async fn info(&self, _stanza: &str) -> Result<ToolOutput, RunnerError> {
        match &self.0 {
            Scripted::Output(output) => Ok(output.clone()),
            Scripted::NotInstalled => Err(RunnerError::NotInstalled {
                command: "pgbackrest".to_string(),
            }),
            Scripted::TimedOut => Err(RunnerError::TimedOut {
                command: "pgbackrest".to_string(),
                timeout: Duration::from_secs(30),
            }),
            Scripted::Io => Err(RunnerError::Io {
                command: "pgbackrest".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
            }),
            Scripted::Stalled => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(RunnerError::NotInstalled {
                    command: "pgbackrest".to_string(),
                })
            }
        }
    }
}

/// Lazy pool pointed at a closed port; every acquire fails fast
pub fn unreachable_pool() -> PgPool {
    let options = PgConnectOptions::new()
        .host("127.0.0.1")
        .port(1)
        .username("postgres")
        .database("postgres");

    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(options)
}

pub fn test_app_with_pool(pool: PgPool, script: Scripted) -> Router {
    test_app_with_settings(Settings::default(), pool, script)
}

pub fn test_app_with_settings(settings: Settings, pool: PgPool, script: Scripted) -> Router {
    let state = AppState::with_backup_runner(settings, pool, Arc::new(ScriptedRunner(script)));
    create_app(state)
}

/// Router with no reachable database
pub fn test_app(script: Scripted) -> Router {
    test_app_with_pool(unreachable_pool(), script)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// Response with the body left undecoded, for HTML and empty answers
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

pub async fn send_request(app: Router, request: Request<Body>) -> RawResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    RawResponse {
        status,
        headers,
        body,
    }
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let raw = send_request(app, builder.body(body).unwrap()).await;
    let body = if raw.body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&raw.body).unwrap()
    };

    TestResponse {
        status: raw.status,
        headers: raw.headers,
        body,
    }
}

pub async fn get(app: Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, None).await
}

pub async fn get_raw(app: Router, uri: &str) -> RawResponse {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send_request(app, request).await
}
