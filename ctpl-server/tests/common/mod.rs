//! Shared test utilities for ctpl-server integration tests

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum_test::TestServer;
use ctpl_core::{
    DataStore, InsertQuery, MemoryStore, Row, SelectQuery, StoreError, UpdateQuery,
};
use ctpl_server::{AppState, CtplServer, ServerConfig, create_router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Memory store that counts calls and can be told to fail
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
    failure: Option<String>,
}

#[allow(dead_code)]
impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(StoreError::InvalidData(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DataStore for RecordingStore {
    async fn insert(&self, query: InsertQuery) -> Result<Vec<Row>, StoreError> {
        self.record()?;
        self.inner.insert(query).await
    }

    async fn select(&self, query: SelectQuery) -> Result<Vec<Row>, StoreError> {
        self.record()?;
        self.inner.select(query).await
    }

    async fn update(&self, query: UpdateQuery) -> Result<Vec<Row>, StoreError> {
        self.record()?;
        self.inner.update(query).await
    }
}

/// Router over the given store with default config
#[allow(dead_code)]
pub fn test_server_with_store(store: Arc<dyn DataStore>) -> TestServer {
    test_server_with_config(store, &ServerConfig::default())
}

/// Router over the given store and config
#[allow(dead_code)]
pub fn test_server_with_config(store: Arc<dyn DataStore>, config: &ServerConfig) -> TestServer {
    let state = Arc::new(AppState::new(store));
    TestServer::new(create_router(state, config)).unwrap()
}

/// Router over a fresh in-memory store
#[allow(dead_code)]
pub fn test_server() -> TestServer {
    test_server_with_store(Arc::new(MemoryStore::new()))
}

/// Binds a real listener on localhost and serves in the background
#[allow(dead_code)]
pub async fn spawn_server(config: ServerConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = CtplServer::new(config, Arc::new(AppState::in_memory()));
    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    addr
}

/// A body with every required field and the reference premium figures
#[allow(dead_code)]
pub fn sample_policy(assured: &str) -> Value {
    json!({
        "assured": assured,
        "address": "123 Rizal St, Quezon City",
        "coc_number": "COC-2024-0001",
        "or_number": "OR-88812",
        "policy_number": "CTPL-0001",
        "policy_type": "Private Car",
        "policy_year": "2024",
        "date_issued": "2024-01-10",
        "date_received": "2024-01-11",
        "insurance_from_date": "2024-01-10",
        "insurance_to_date": "2025-01-10",
        "model": "Vios",
        "make": "Toyota",
        "body_type": "Sedan",
        "color": "Silver",
        "mv_file_no": "1301-00000012345",
        "plate_no": "ABC 1234",
        "chassis_no": "NCP150-123456",
        "motor_no": "2NZ-987654",
        "premium": "1000",
        "other_charges": "50"
    })
}
