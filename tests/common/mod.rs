#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mess_menu::{
    create_app,
    models::{MenuDocument, RepositoryError, RepositoryResult},
    repositories::MenuRepository,
    services::MenuService,
    Metrics,
};
use reqwest::Client;
use serde_json::Value;
use tokio::net::TcpListener;

/// Document store kept in memory, keyed by collection name
#[derive(Default)]
pub struct InMemoryMenuRepository {
    collections: Mutex<HashMap<String, Vec<MenuDocument>>>,
    failure: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl InMemoryMenuRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, collection: &str, id: &str, data: Value) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(MenuDocument::new(id, data));
    }

    /// Make every following read fail with `message`
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MenuRepository for InMemoryMenuRepository {
    async fn fetch_collection(&self, collection: &str) -> RepositoryResult<Vec<MenuDocument>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(RepositoryError::AwsSdk { message });
        }

        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }
}

pub struct TestEnvironment {
    pub client: Client,
    pub base_url: String,
    pub store: Arc<InMemoryMenuRepository>,
}

impl TestEnvironment {
    pub async fn new() -> Self {
        Self::with_store(Arc::new(InMemoryMenuRepository::new())).await
    }

    pub async fn with_store(store: Arc<InMemoryMenuRepository>) -> Self {
        let metrics = Arc::new(Metrics::new().expect("Failed to create metrics"));
        let menu_service = Arc::new(MenuService::new(store.clone(), metrics.clone()));
        let app = create_app(menu_service, metrics);

        // Start server
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local address");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to serve app");
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            client: Client::new(),
            base_url,
            store,
        }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Failed to send request")
    }
}
