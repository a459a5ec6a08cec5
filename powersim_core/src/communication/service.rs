//! Request/reply services built on topics.
//!
//! A service is a pair of topics (`<name>/request`, `<name>/response`)
//! plus an entry in the process-wide presence registry so clients can wait
//! for a server to come up before sending anything.
//!
//! The exchange is correlated by `RequestId`; a client polling for its
//! response discards responses addressed to other requests. The design
//! assumes one client per service name at a time — matching how the nodes
//! in this repository use services — since the response topic has
//! competing-consumer semantics.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::communication::topic::Topic;
use crate::error::{PowerError, PowerResult};

/// Correlation id for one service exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        RequestId(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Envelope carrying a request payload to a server.
pub struct ServiceRequest<Q> {
    pub id: RequestId,
    pub payload: Q,
}

/// Envelope carrying a response payload back to the client.
pub struct ServiceResponse<P> {
    pub id: RequestId,
    pub payload: P,
}

/// Presence record for a live service server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePresence {
    pub name: String,
    pub pid: u32,
    pub start_time_ns: u64,
}

static SERVICES: OnceLock<RwLock<HashMap<String, ServicePresence>>> = OnceLock::new();

fn services() -> &'static RwLock<HashMap<String, ServicePresence>> {
    SERVICES.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Whether a server is currently registered for `name`.
pub fn service_available(name: &str) -> bool {
    services().read().contains_key(name)
}

fn request_topic(name: &str) -> String {
    format!("{}/request", name)
}

fn response_topic(name: &str) -> String {
    format!("{}/response", name)
}

/// Server side of a service: receives requests, sends responses.
///
/// Registers presence on creation and deregisters on drop. A second
/// server on the same name is rejected.
pub struct ServiceServer<Q: Send + 'static, P: Send + 'static> {
    name: String,
    requests: Topic<ServiceRequest<Q>>,
    responses: Topic<ServiceResponse<P>>,
}

impl<Q: Send + 'static, P: Send + 'static> ServiceServer<Q, P> {
    pub fn new(name: &str) -> PowerResult<Self> {
        // Topics first: a failure here must not leave a presence entry behind
        let requests = Topic::new(&request_topic(name))?;
        let responses = Topic::new(&response_topic(name))?;

        let mut reg = services().write();
        if reg.contains_key(name) {
            return Err(PowerError::AlreadyExists(format!(
                "service '{}' already has a server",
                name
            )));
        }
        reg.insert(
            name.to_string(),
            ServicePresence {
                name: name.to_string(),
                pid: std::process::id(),
                start_time_ns: std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_nanos() as u64,
            },
        );

        Ok(Self {
            name: name.to_string(),
            requests,
            responses,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Next pending request, if any (non-blocking).
    pub fn try_recv(&self) -> Option<(RequestId, Q)> {
        self.requests.recv().map(|req| (req.id, req.payload))
    }

    /// Send the response for a previously received request.
    pub fn respond(&self, id: RequestId, payload: P) -> PowerResult<()> {
        self.responses.send(ServiceResponse { id, payload })
    }
}

impl<Q: Send + 'static, P: Send + 'static> Drop for ServiceServer<Q, P> {
    fn drop(&mut self) {
        services().write().remove(&self.name);
    }
}

/// Client side of a service: sends requests, awaits responses.
pub struct ServiceClient<Q: Send + 'static, P: Send + 'static> {
    name: String,
    requests: Topic<ServiceRequest<Q>>,
    responses: Topic<ServiceResponse<P>>,
}

impl<Q: Send + 'static, P: Send + 'static> ServiceClient<Q, P> {
    pub fn new(name: &str) -> PowerResult<Self> {
        Ok(Self {
            name: name.to_string(),
            requests: Topic::new(&request_topic(name))?,
            responses: Topic::new(&response_topic(name))?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a server is currently up for this service.
    pub fn is_available(&self) -> bool {
        service_available(&self.name)
    }

    /// Block until a server registers for this service.
    ///
    /// Polls with exponential backoff (10 ms doubling, capped at 500 ms).
    /// `timeout: None` waits indefinitely; `Some(d)` gives up after `d`
    /// with a timeout error.
    pub fn wait_for_service(&self, timeout: Option<Duration>) -> PowerResult<()> {
        let deadline = timeout.map(|d| Instant::now() + d);
        let mut backoff = Duration::from_millis(10);

        loop {
            if self.is_available() {
                return Ok(());
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(PowerError::timeout(format!(
                        "service '{}' did not become available",
                        self.name
                    )));
                }
            }
            std::thread::sleep(backoff);
            backoff = (backoff * 2).min(Duration::from_millis(500));
        }
    }

    /// Fire a request without waiting for the response.
    pub fn send_request(&self, payload: Q) -> PowerResult<RequestId> {
        let id = RequestId::new();
        self.requests.send(ServiceRequest { id, payload })?;
        Ok(id)
    }

    /// Check for the response to `id` (non-blocking).
    ///
    /// Responses correlated to other requests are discarded: they belong
    /// to exchanges this client has already given up on.
    pub fn poll_response(&self, id: RequestId) -> Option<P> {
        while let Some(res) = self.responses.recv() {
            if res.id == id {
                return Some(res.payload);
            }
        }
        None
    }

    /// Send a request and wait for its response, bounded by `timeout`.
    pub fn call(&self, payload: Q, timeout: Duration) -> PowerResult<P> {
        let id = self.send_request(payload)?;
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(response) = self.poll_response(id) {
                return Ok(response);
            }
            if Instant::now() >= deadline {
                return Err(PowerError::timeout(format!(
                    "service '{}' call {} received no response",
                    self.name, id
                )));
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}
