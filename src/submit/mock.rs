//! In-process stand-in for the verification endpoints.

use axum::http::{header, StatusCode};
use axum::routing::post;
use axum::Router;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Canned reply for one path
#[derive(Debug, Clone)]
pub(crate) struct MockReply {
    pub path: &'static str,
    pub status: u16,
    pub body: String,
}

impl MockReply {
    pub fn new(path: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self {
            path,
            status,
            body: body.into(),
        }
    }
}

pub(crate) struct MockServer {
    base_url: String,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(replies: Vec<MockReply>) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();

        for reply in replies {
            let log = Arc::clone(&requests);
            router = router.route(
                reply.path,
                post(move |body: String| async move {
                    let parsed = serde_json::from_str(&body).unwrap_or(Value::Null);
                    log.lock().push((reply.path.to_string(), parsed));
                    (
                        StatusCode::from_u16(reply.status).unwrap(),
                        [(header::CONTENT_TYPE, "application/json")],
                        reply.body,
                    )
                }),
            );
        }

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
