//! Test support utilities shared across unit and integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde_json::{Value, json};

use crate::client::{ApiResponse, ClientError, ClientFuture, RestClient};
use crate::poll::{Clock, SleepFuture};

/// HTTP method recorded by [`ScriptedClient`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

/// Records a single call made through [`ScriptedClient`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedRequest {
    /// Method used.
    pub method: Method,
    /// Path relative to the API base URL.
    pub path: String,
    /// JSON body for `POST` calls.
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// Returns `METHOD path` for compact assertions.
    #[must_use]
    pub fn line(&self) -> String {
        let verb = match self.method {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        };
        format!("{verb} {}", self.path)
    }

    /// Returns true for calls that change provider state.
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        self.method != Method::Get
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    responses: VecDeque<ApiResponse>,
    requests: Vec<RecordedRequest>,
}

/// Scripted REST client that returns pre-seeded responses in FIFO order and
/// records every call.
///
/// A call made after the script is exhausted fails with a transport error so
/// tests notice unexpected requests.
#[derive(Clone, Debug, Default)]
pub struct ScriptedClient {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedClient {
    /// Creates a client with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Queues a response with a JSON body.
    pub fn push_json(&self, status: u16, body: Value) {
        self.lock()
            .responses
            .push_back(ApiResponse::new(status, Some(body)));
    }

    /// Queues a response without a decodable body.
    pub fn push_empty(&self, status: u16) {
        self.lock().responses.push_back(ApiResponse::new(status, None));
    }

    /// Queues a `200` response wrapping `droplet` as `{"droplet": ...}`.
    pub fn push_droplet(&self, droplet: Value) {
        self.push_json(200, json!({ "droplet": droplet }));
    }

    /// Queues a `404` response shaped like the provider's error payload.
    pub fn push_not_found(&self) {
        self.push_json(
            404,
            json!({
                "id": "not_found",
                "message": "The resource you were accessing could not be found."
            }),
        );
    }

    /// Queues one page of a droplet listing.
    pub fn push_droplet_page(&self, droplets: Vec<Value>, next: Option<&str>) {
        let links = next.map_or_else(
            || json!({}),
            |url| json!({ "pages": { "next": url } }),
        );
        let total = droplets.len();
        self.push_json(
            200,
            json!({ "droplets": droplets, "links": links, "meta": { "total": total } }),
        );
    }

    /// Returns a snapshot of all requests recorded so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Returns recorded requests rendered as `METHOD path`.
    #[must_use]
    pub fn request_lines(&self) -> Vec<String> {
        self.lock().requests.iter().map(RecordedRequest::line).collect()
    }

    /// Returns how many state-changing calls were made.
    #[must_use]
    pub fn mutating_calls(&self) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|request| request.is_mutating())
            .count()
    }

    /// Returns how many queued responses were never consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.lock().responses.len()
    }

    fn respond(&self, method: Method, path: &str, body: Option<&Value>) -> ClientFuture<'_> {
        let mut state = self.lock();
        state.requests.push(RecordedRequest {
            method,
            path: path.to_owned(),
            body: body.cloned(),
        });
        let next = state.responses.pop_front();
        drop(state);

        let owned_path = path.to_owned();
        Box::pin(async move {
            next.ok_or_else(|| ClientError::Transport {
                path: owned_path,
                message: String::from("no scripted response"),
            })
        })
    }
}

impl RestClient for ScriptedClient {
    fn get<'a>(&'a self, path: &'a str) -> ClientFuture<'a> {
        self.respond(Method::Get, path, None)
    }

    fn post<'a>(&'a self, path: &'a str, body: &'a Value) -> ClientFuture<'a> {
        self.respond(Method::Post, path, Some(body))
    }

    fn delete<'a>(&'a self, path: &'a str) -> ClientFuture<'a> {
        self.respond(Method::Delete, path, None)
    }
}

#[derive(Debug)]
struct ClockState {
    now: Instant,
    sleeps: Vec<Duration>,
}

/// Clock that advances only when slept on, recording every sleep.
#[derive(Clone, Debug)]
pub struct ManualClock {
    state: Arc<Mutex<ClockState>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Creates a clock anchored at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ClockState {
                now: Instant::now(),
                sleeps: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Returns every sleep requested so far.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().sleeps.clone()
    }

    /// Returns the total simulated time slept.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.lock().sleeps.iter().sum()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.lock().now
    }

    fn sleep(&self, duration: Duration) -> SleepFuture<'_> {
        let mut state = self.lock();
        state.now += duration;
        state.sleeps.push(duration);
        Box::pin(async {})
    }
}

/// Builds a provider-shaped droplet document.
#[must_use]
pub fn droplet_json(id: u64, name: &str, status: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": status,
        "memory": 1024,
        "vcpus": 1,
        "size_slug": "s-1vcpu-1gb",
        "region": { "slug": "nyc1", "name": "New York 1" },
        "image": { "id": 6_918_990, "slug": "ubuntu-16-04-x64" },
        "networks": { "v4": [], "v6": [] }
    })
}

/// Builds an `active` droplet document with public, private and IPv6
/// addresses assigned.
#[must_use]
pub fn active_droplet_json(id: u64, name: &str) -> Value {
    let mut droplet = droplet_json(id, name, "active");
    droplet["networks"] = json!({
        "v4": [
            { "ip_address": "10.128.0.5", "netmask": "255.255.0.0", "gateway": "10.128.0.1", "type": "private" },
            { "ip_address": "203.0.113.10", "netmask": "255.255.240.0", "gateway": "203.0.113.1", "type": "public" }
        ],
        "v6": [
            { "ip_address": "2604:a880::10", "netmask": 64, "gateway": "2604:a880::1", "type": "public" }
        ]
    });
    droplet
}
