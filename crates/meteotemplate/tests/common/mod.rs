//! Mock Meteotemplate endpoint for integration tests

#![allow(dead_code)]

use axum::extract::{Form, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const API_PATH: &str = "/plugins/api/update.php";

/// Parameters of every request the mock endpoint received, in arrival order.
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<HashMap<String, String>>>>);

impl Captured {
    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    fn push(&self, params: HashMap<String, String>) {
        self.0.lock().unwrap().push(params);
    }
}

/// Handle to a running mock endpoint.
pub struct MockEndpoint {
    pub url: String,
    pub captured: Captured,
    handle: JoinHandle<()>,
}

impl Drop for MockEndpoint {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve `status` and `body` for GET and POST, after an optional delay.
pub async fn spawn_endpoint(
    status: StatusCode,
    body: &'static str,
    delay: Option<Duration>,
) -> MockEndpoint {
    let captured = Captured::default();
    let get_captured = captured.clone();
    let post_captured = captured.clone();

    let router = Router::new().route(
        API_PATH,
        get(move |Query(params): Query<HashMap<String, String>>| {
            let captured = get_captured.clone();
            async move {
                captured.push(params);
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                (status, body)
            }
        })
        .post(move |Form(params): Form<HashMap<String, String>>| {
            let captured = post_captured.clone();
            async move {
                captured.push(params);
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                (status, body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // ensure server is ready
    tokio::time::sleep(Duration::from_millis(50)).await;

    MockEndpoint {
        url: format!("http://{addr}{API_PATH}"),
        captured,
        handle,
    }
}
