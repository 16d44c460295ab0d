#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderName, Method, Request, Response};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use tower::ServiceExt;

use renewal_api::config::ServerConfig;
use renewal_api::router::build_app_router;
use renewal_api::state::AppState;
use renewal_core::batch::BatchOrchestrator;
use renewal_core::query::{SqlParam, Statement};
use renewal_core::store::{ConnectionFactory, LicenseConnection, LicenseRow, StoreError};
use renewal_core::types::Environment;

pub const ACTOR_HEADER: &str = "x-authenticated-user";
pub const DEFAULT_ACTOR: &str = "current-user@example.com";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        default_actor: DEFAULT_ACTOR.to_string(),
        actor_header: HeaderName::from_static(ACTOR_HEADER),
    }
}

// ---------------------------------------------------------------------------
// In-memory license store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StoredLicense {
    pub expiry_date: Option<NaiveDate>,
    pub comment: Option<String>,
    pub updated_by: Option<String>,
}

/// License rows per environment plus scripted failures and a statement log.
#[derive(Default)]
pub struct FakeStore {
    rows: Mutex<HashMap<(Environment, String), StoredLicense>>,
    failing: Mutex<HashSet<String>>,
    unreachable: Mutex<HashSet<Environment>>,
    executed: Mutex<Vec<Statement>>,
    open_connections: Mutex<usize>,
}

impl FakeStore {
    pub fn insert(&self, environment: Environment, order_number: &str, expiry: Option<&str>) {
        self.rows.lock().unwrap().insert(
            (environment, order_number.to_string()),
            StoredLicense {
                expiry_date: expiry.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
                comment: None,
                updated_by: None,
            },
        );
    }

    pub fn fail_key(&self, order_number: &str) {
        self.failing.lock().unwrap().insert(order_number.to_string());
    }

    pub fn make_unreachable(&self, environment: Environment) {
        self.unreachable.lock().unwrap().insert(environment);
    }

    pub fn get(&self, environment: Environment, order_number: &str) -> Option<StoredLicense> {
        self.rows
            .lock()
            .unwrap()
            .get(&(environment, order_number.to_string()))
            .cloned()
    }

    pub fn executed(&self) -> Vec<Statement> {
        self.executed.lock().unwrap().clone()
    }

    pub fn open_connections(&self) -> usize {
        *self.open_connections.lock().unwrap()
    }
}

struct FakeConnection {
    store: Arc<FakeStore>,
    environment: Environment,
}

impl FakeConnection {
    fn record(&self, statement: &Statement) -> Result<String, StoreError> {
        self.store.executed.lock().unwrap().push(statement.clone());
        let key = statement
            .params()
            .last()
            .and_then(SqlParam::as_text)
            .unwrap_or_default()
            .to_string();
        if self.store.failing.lock().unwrap().contains(&key) {
            return Err(StoreError::Execution("deadlock detected".into()));
        }
        Ok(key)
    }
}

#[async_trait]
impl LicenseConnection for FakeConnection {
    async fn fetch_one(&mut self, statement: &Statement) -> Result<Option<LicenseRow>, StoreError> {
        let key = self.record(statement)?;
        Ok(self
            .store
            .get(self.environment, &key)
            .map(|row| LicenseRow {
                order_number: key,
                expiry_date: row.expiry_date,
            }))
    }

    async fn execute(&mut self, statement: &Statement) -> Result<u64, StoreError> {
        let key = self.record(statement)?;
        let params = statement.params();
        let mut rows = self.store.rows.lock().unwrap();
        match rows.get_mut(&(self.environment, key)) {
            Some(row) => {
                row.expiry_date = params[0].as_date();
                row.comment = params[1].as_text().map(str::to_string);
                row.updated_by = params[2].as_text().map(str::to_string);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), StoreError> {
        *self.store.open_connections.lock().unwrap() -= 1;
        Ok(())
    }
}

pub struct FakeFactory(pub Arc<FakeStore>);

#[async_trait]
impl ConnectionFactory for FakeFactory {
    async fn connect(
        &self,
        environment: Environment,
    ) -> Result<Box<dyn LicenseConnection>, StoreError> {
        if self.0.unreachable.lock().unwrap().contains(&environment) {
            return Err(StoreError::Unreachable(format!(
                "cannot connect to '{environment}' store"
            )));
        }
        *self.0.open_connections.lock().unwrap() += 1;
        Ok(Box::new(FakeConnection {
            store: Arc::clone(&self.0),
            environment,
        }))
    }

    fn is_configured(&self, environment: Environment) -> bool {
        environment != Environment::Prod
    }
}

// ---------------------------------------------------------------------------
// App + request helpers
// ---------------------------------------------------------------------------

/// Build the full application router over `store`, with the same middleware
/// stack production uses.
pub fn build_test_app(store: Arc<FakeStore>) -> Router {
    let config = test_config();
    let state = AppState {
        config: Arc::new(config.clone()),
        orchestrator: BatchOrchestrator::new(Arc::new(FakeFactory(store))),
    };
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_json_as(app, uri, body, None).await
}

pub async fn post_json_as(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    actor: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(actor) = actor {
        builder = builder.header(ACTOR_HEADER, actor);
    }
    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// POST an arbitrary body with the given content type.
pub async fn post_raw(app: Router, uri: &str, content_type: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
