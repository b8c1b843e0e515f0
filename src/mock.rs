//! Scripted transport for testing pipeline behavior without sockets.
//!
//! [`ScriptedTransport`] replays a fixed queue of canned outcomes, one
//! per request, and records every requested URL so tests can assert on
//! batch counts and query shapes.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::fetch::{RawResponse, Transport};

/// One canned outcome for a scripted GET.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond 200 OK with the given body.
    Json(String),
    /// Respond with an arbitrary status and body.
    Status(u16, String),
    /// Respond 429 with an optional `Retry-After` value.
    RateLimited(Option<String>),
    /// Fail at the transport level (connection reset and friends).
    NetworkError(String),
}

/// Transport that replays a fixed script of outcomes.
///
/// Outcomes are consumed in request order. Running past the end of the
/// script produces a transport error so an over-fetching test fails
/// loudly instead of hanging.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    /// Create a transport that will serve `replies` in order.
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Append another canned outcome to the script.
    pub fn push(&self, reply: Reply) {
        self.script.lock().unwrap().push_back(reply);
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Whether every scripted outcome has been consumed.
    pub fn is_complete(&self) -> bool {
        self.script.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::NetworkError("scripted transport exhausted".to_string()));
        match reply {
            Reply::Json(body) => Ok(RawResponse {
                status: 200,
                status_text: "OK".to_string(),
                retry_after: None,
                body,
            }),
            Reply::Status(status, body) => Ok(RawResponse {
                status,
                status_text: reason(status).to_string(),
                retry_after: None,
                body,
            }),
            Reply::RateLimited(retry_after) => Ok(RawResponse {
                status: 429,
                status_text: "Too Many Requests".to_string(),
                retry_after,
                body: String::new(),
            }),
            Reply::NetworkError(msg) => Err(Error::Network(msg)),
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}
