//! Shared test helpers for scan flow integration tests.
//!
//! Provides a scripted mock transport, a sleeper that records instead of
//! sleeping, payload builders and manifest fixtures.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pkgscan_sca_client::codec;
use pkgscan_sca_client::{
    ApiKeyAuth, ExecutionMode, HttpRequest, HttpResponse, ScaClientError, ScaScanner, ScanContext,
    Sleeper, Transport,
};
use serde_json::{Value, json};

pub const BASE_URL: &str = "http://scan.test";
pub const SCAN_URL: &str = "http://scan.test/api/v1/vulnerabilities/scan";

/// Status query URL for a scan job.
pub fn results_url(job_id: &str) -> String {
    format!("{BASE_URL}/api/v1/vulnerabilities/scan-results/{job_id}")
}

#[derive(Clone)]
enum Reply {
    Respond(HttpResponse),
    Fail(String),
    Panic,
}

#[derive(Default)]
struct Route {
    replies: VecDeque<Reply>,
    delay: Option<Duration>,
}

/// Scripted transport.
///
/// Routes are keyed by URL. Submissions may also be routed per file with
/// [`MockTransport::on_submit`]. The last scripted reply of a route repeats.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts replies for a URL.
    pub fn on(self, url: &str, responses: Vec<HttpResponse>) -> Self {
        self.extend(url, responses.into_iter().map(Reply::Respond));
        self
    }

    /// Scripts the submission reply for a specific file name.
    pub fn on_submit(self, file_name: &str, response: HttpResponse) -> Self {
        self.extend(&submit_key(file_name), std::iter::once(Reply::Respond(response)));
        self
    }

    /// Makes the submission of a specific file fail at the transport level.
    pub fn fail_submit(self, file_name: &str) -> Self {
        self.extend(
            &submit_key(file_name),
            std::iter::once(Reply::Fail("connection reset by peer".to_owned())),
        );
        self
    }

    /// Makes the submission of a specific file panic inside the worker.
    pub fn panic_submit(self, file_name: &str) -> Self {
        self.extend(&submit_key(file_name), std::iter::once(Reply::Panic));
        self
    }

    /// Delays every reply of a route (real time).
    pub fn delay(self, key: &str, delay: Duration) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(key.to_owned())
            .or_default()
            .delay = Some(delay);
        self
    }

    fn extend(&self, key: &str, replies: impl Iterator<Item = Reply>) {
        self.routes
            .lock()
            .unwrap()
            .entry(key.to_owned())
            .or_default()
            .replies
            .extend(replies);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }

    pub fn status_queries(&self) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.contains("/scan-results/"))
            .count()
    }

    fn next_reply(&self, request: &HttpRequest) -> (Option<Reply>, Option<Duration>) {
        let mut routes = self.routes.lock().unwrap();

        let file_key = request
            .form
            .iter()
            .find(|(k, _)| k == "fileName")
            .map(|(_, name)| submit_key(name));
        let key = match file_key {
            Some(key) if routes.contains_key(&key) => key,
            _ => request.url.clone(),
        };

        match routes.get_mut(&key) {
            Some(route) => {
                let reply = if route.replies.len() > 1 {
                    route.replies.pop_front()
                } else {
                    route.replies.front().cloned()
                };
                (reply, route.delay)
            }
            None => (None, None),
        }
    }
}

fn submit_key(file_name: &str) -> String {
    format!("{SCAN_URL}#{file_name}")
}

impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ScaClientError> {
        let (reply, delay) = self.next_reply(&request);
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(reason)) => Err(ScaClientError::Transport { url, reason }),
            Some(Reply::Panic) => panic!("mock transport panic for {url}"),
            None => Ok(HttpResponse {
                status: 404,
                body: Value::Null,
            }),
        }
    }
}

/// Sleeper that records requested durations without waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }

    pub fn total(&self) -> Duration {
        self.sleeps.lock().unwrap().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

pub type TestScanner = ScaScanner<MockTransport, Arc<RecordingSleeper>>;

/// Builds a scanner over the mock with default timing (2s interval, 60s ceiling).
pub fn scanner(mock: MockTransport, mode: ExecutionMode) -> TestScanner {
    let context = ScanContext::new(BASE_URL, mock, Arc::new(ApiKeyAuth::new("test-key")))
        .with_sleeper(Arc::new(RecordingSleeper::default()));
    ScaScanner::new(context, mode, 4)
}

/// Compressed-base64 payload for a JSON document.
pub fn payload(doc: &Value) -> String {
    codec::compress_gzip_base64(doc.to_string().as_bytes()).unwrap()
}

pub fn cache_hit(doc: &Value) -> HttpResponse {
    HttpResponse::ok(json!({"status": "already_exist", "outputData": payload(doc)}))
}

pub fn pending(job_id: &str) -> HttpResponse {
    HttpResponse::ok(json!({"status": "created", "id": job_id}))
}

pub fn status_empty() -> HttpResponse {
    HttpResponse::ok(json!({"outputType": "Empty", "outputData": ""}))
}

pub fn status_result(doc: &Value) -> HttpResponse {
    HttpResponse::ok(json!({"outputType": "Result", "outputData": payload(doc)}))
}

pub fn status_error(details: &str) -> HttpResponse {
    HttpResponse::ok(json!({"outputType": "Error", "outputData": details}))
}

/// Writes manifest fixtures into `dir` and returns their paths in order.
pub fn manifests(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            std::fs::write(&path, format!("{{\"fixture\": \"{name}\"}}")).unwrap();
            path
        })
        .collect()
}
