//! ureq-backed transport.
//!
//! Status validation is done here rather than by ureq so that error bodies
//! can be carried into `TransportError::Status`.

use std::io::{BufRead, BufReader};
use std::time::Duration;

use ureq::http::Response;
use ureq::{Agent, Body};

use super::{truncate_body, Transport, TransportError};
use crate::constants::STREAM_TIMEOUT_SECS;

#[derive(Clone)]
pub struct HttpTransport {
    agent: Agent,
    timeout: Duration,
    stream_timeout: Duration,
}

impl HttpTransport {
    /// Build a transport whose requests each give up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: Agent::new_with_config(config),
            timeout,
            stream_timeout: Duration::from_secs(STREAM_TIMEOUT_SECS),
        }
    }

    /// Budget for reading a whole streamed body in `post_stream`.
    pub fn with_stream_timeout(mut self, stream_timeout: Duration) -> Self {
        self.stream_timeout = stream_timeout;
        self
    }

    /// POST a JSON payload and hand back the response body as a line reader.
    /// Used for streaming (newline-delimited JSON) replies.
    ///
    /// Connecting and receiving the headers use the request timeout; the body
    /// may keep arriving for up to the stream timeout.
    pub fn post_stream(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<Box<dyn BufRead + Send>, TransportError> {
        tracing::debug!(url = %url, "HTTP POST (stream)");
        let response = self
            .agent
            .post(url)
            .config()
            .timeout_global(None)
            .timeout_connect(Some(self.timeout))
            .timeout_send_body(Some(self.timeout))
            .timeout_recv_response(Some(self.timeout))
            .timeout_recv_body(Some(self.stream_timeout))
            .build()
            .send_json(payload)
            .map_err(|e| network(url, e))?;
        let response = check_status(url, response)?;
        Ok(Box::new(BufReader::new(response.into_body().into_reader())))
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, params: &[(&str, String)]) -> Result<String, TransportError> {
        self.get_within(url, params, self.timeout)
    }

    fn get_within(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<String, TransportError> {
        tracing::debug!(url = %url, params = params.len(), "HTTP GET");
        let mut request = self
            .agent
            .get(url)
            .config()
            .timeout_global(Some(timeout.min(self.timeout)))
            .build();
        for (key, value) in params {
            request = request.query(key, value);
        }
        let response = request.call().map_err(|e| network(url, e))?;
        read_body(url, check_status(url, response)?)
    }

    fn post(&self, url: &str, payload: &serde_json::Value) -> Result<String, TransportError> {
        tracing::debug!(url = %url, "HTTP POST");
        let response = self
            .agent
            .post(url)
            .send_json(payload)
            .map_err(|e| network(url, e))?;
        read_body(url, check_status(url, response)?)
    }
}

fn network(url: &str, err: ureq::Error) -> TransportError {
    TransportError::Network {
        url: url.to_string(),
        cause: err.to_string(),
    }
}

fn check_status(url: &str, mut response: Response<Body>) -> Result<Response<Body>, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.body_mut().read_to_string().unwrap_or_default();
    Err(TransportError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body: truncate_body(body.trim()),
    })
}

fn read_body(url: &str, mut response: Response<Body>) -> Result<String, TransportError> {
    response
        .body_mut()
        .read_to_string()
        .map_err(|e| network(url, e))
}
