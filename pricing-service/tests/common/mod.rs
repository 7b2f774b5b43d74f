//! Test helpers for pricing-service integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use pricing_service::{
    build_router,
    config::{
        DatabaseConfig, Environment, RedisConfig, SecurityConfig, ServiceConfig, SessionConfig,
        SwaggerConfig, SwaggerMode,
    },
    db,
    services::{Database, MockSessionStore},
    AppState,
};
use tempfile::NamedTempFile;
use tokio::net::TcpListener;

/// Test application with a running HTTP server over a throwaway database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub state: AppState,
    _db_file: NamedTempFile,
}

impl TestApp {
    /// Spawn the application against a fresh SQLite file and an in-memory
    /// session store.
    pub async fn spawn() -> Self {
        let db_file = NamedTempFile::new().expect("Failed to create temp database file");
        let config = test_config(db_file.path().to_str().expect("temp path is utf-8"));

        let pool = db::create_pool(&config.database)
            .await
            .expect("Failed to create test pool");
        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let sessions = Arc::new(MockSessionStore::new());
        let state = AppState::new(config, Database::new(pool), sessions);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().expect("listener has a local addr");

        let app = build_router(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        TestApp {
            addr,
            state,
            _db_file: db_file,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// A client with its own cookie jar, i.e. its own browser session.
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to build http client")
    }

    pub async fn signup(
        &self,
        client: &reqwest::Client,
        email: &str,
        password: &str,
    ) -> reqwest::Response {
        client
            .post(self.url("/auth/signup"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("signup request failed")
    }

    pub async fn signin(
        &self,
        client: &reqwest::Client,
        email: &str,
        password: &str,
    ) -> reqwest::Response {
        client
            .post(self.url("/auth/signin"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("signin request failed")
    }

    pub async fn create_report(
        &self,
        client: &reqwest::Client,
        body: serde_json::Value,
    ) -> reqwest::Response {
        client
            .post(self.url("/reports"))
            .json(&body)
            .send()
            .await
            .expect("create report request failed")
    }
}

fn test_config(db_path: &str) -> ServiceConfig {
    ServiceConfig {
        common: service_core::config::Config {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        environment: Environment::Dev,
        service_name: "pricing-service-test".to_string(),
        service_version: "0.1.0".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: format!("sqlite:{}", db_path),
            max_connections: 5,
        },
        redis: RedisConfig {
            url: "redis://localhost:6379".to_string(),
        },
        session: SessionConfig {
            cookie_name: "session".to_string(),
            ttl_seconds: 3600,
            secure_cookies: false,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        swagger: SwaggerConfig {
            enabled: SwaggerMode::Disabled,
        },
    }
}

/// Build a valid report payload around the given price and mileage.
pub fn report_body(price: f64, mileage: i64) -> serde_json::Value {
    serde_json::json!({
        "make": "toyota",
        "model": "corolla",
        "year": 2018,
        "mileage": mileage,
        "lng": 0.0,
        "lat": 0.0,
        "price": price,
    })
}
