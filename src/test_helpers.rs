//! Shared test utilities: scripted transport and LLM backend.
//!
//! Available only under `#[cfg(test)]`.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{mpsc, Mutex};
use std::time::{Duration, Instant};

use crate::llm::{ChatBackend, ChatMessage, ChatStream};
use crate::transport::{Transport, TransportError};
use crate::{BarqError, BarqResult};

// ============================================================================
// ScriptedTransport
// ============================================================================

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub params: Vec<(String, String)>,
    pub payload: Option<serde_json::Value>,
    /// Budget passed through `get_within`, if any.
    pub timeout: Option<Duration>,
    pub at: Instant,
}

impl RecordedCall {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Answers calls from a FIFO script; once the script is exhausted, the
/// fallback answer (if any) repeats forever.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<String, TransportError>>>,
    fallback: Mutex<Option<Result<String, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, body: &str) {
        self.script.lock().unwrap().push_back(Ok(body.to_string()));
    }

    pub fn push_err(&self, err: TransportError) {
        self.script.lock().unwrap().push_back(Err(err));
    }

    pub fn always(&self, answer: Result<String, TransportError>) {
        *self.fallback.lock().unwrap() = Some(answer);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: RecordedCall) -> Result<String, TransportError> {
        let url = call.url.clone();
        self.calls.lock().unwrap().push(call);
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        self.fallback
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| {
                Err(TransportError::Network {
                    url,
                    cause: "script exhausted".into(),
                })
            })
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &str, params: &[(&str, String)]) -> Result<String, TransportError> {
        self.answer(RecordedCall {
            method: "GET",
            url: url.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            payload: None,
            timeout: None,
            at: Instant::now(),
        })
    }

    fn get_within(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<String, TransportError> {
        self.answer(RecordedCall {
            method: "GET",
            url: url.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            payload: None,
            timeout: Some(timeout),
            at: Instant::now(),
        })
    }

    fn post(&self, url: &str, payload: &serde_json::Value) -> Result<String, TransportError> {
        self.answer(RecordedCall {
            method: "POST",
            url: url.to_string(),
            params: Vec::new(),
            payload: Some(payload.clone()),
            timeout: None,
            at: Instant::now(),
        })
    }
}

pub fn network_error(url: &str) -> TransportError {
    TransportError::Network {
        url: url.to_string(),
        cause: "connection refused".into(),
    }
}

// ============================================================================
// Loopback HTTP servers
// ============================================================================

/// A request as seen by a loopback server: head and body.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

impl CapturedRequest {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }
}

fn read_request(stream: &mut TcpStream) -> CapturedRequest {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    let head_end = loop {
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break data.len();
        }
        data.extend_from_slice(&buf[..n]);
    };
    let head = String::from_utf8_lossy(&data[..head_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    while data.len() < head_end + content_length {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    let body = String::from_utf8_lossy(&data[head_end..]).to_string();
    CapturedRequest { head, body }
}

/// Serve one response whose body is written in `parts`, pausing `pause`
/// between parts. Returns the base URL and the captured request.
pub fn serve_in_parts(
    status_line: &str,
    parts: &[&str],
    pause: Duration,
) -> (String, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let parts: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status_line,
        parts.iter().map(|p| p.len()).sum::<usize>()
    );
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        tx.send(read_request(&mut stream)).ok();
        stream.write_all(head.as_bytes()).unwrap();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                std::thread::sleep(pause);
            }
            stream.write_all(part.as_bytes()).unwrap();
            stream.flush().ok();
        }
    });
    (format!("http://{}", addr), rx)
}

/// Serve exactly one canned response.
pub fn serve_once(status_line: &str, body: &str) -> (String, mpsc::Receiver<CapturedRequest>) {
    serve_in_parts(status_line, &[body], Duration::ZERO)
}

/// Accept connections and never answer them (until `hold` elapses).
pub fn serve_silence(hold: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut open = Vec::new();
        let started = Instant::now();
        listener.set_nonblocking(true).ok();
        while started.elapsed() < hold {
            if let Ok((stream, _)) = listener.accept() {
                open.push(stream);
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    });
    format!("http://{}", addr)
}

// ============================================================================
// ScriptedChat
// ============================================================================

/// LLM backend returning a fixed reply (or failure) and recording requests.
pub struct ScriptedChat {
    reply: Result<String, String>,
    chunks: Vec<String>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChat {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            chunks: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(cause: &str) -> Self {
        Self {
            reply: Err(cause.to_string()),
            chunks: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Stream these chunks from `chat_stream`.
    pub fn with_chunks(mut self, chunks: &[&str]) -> Self {
        self.chunks = chunks.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

impl ChatBackend for ScriptedChat {
    fn chat(&self, _model: &str, messages: &[ChatMessage]) -> BarqResult<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.reply.clone().map_err(BarqError::Llm)
    }

    fn chat_stream(&self, _model: &str, messages: &[ChatMessage]) -> BarqResult<ChatStream> {
        self.requests.lock().unwrap().push(messages.to_vec());
        if let Err(cause) = &self.reply {
            return Err(BarqError::Llm(cause.clone()));
        }
        let chunks: Vec<BarqResult<String>> = self.chunks.iter().cloned().map(Ok).collect();
        Ok(Box::new(chunks.into_iter()))
    }

    fn list_models(&self) -> BarqResult<Vec<String>> {
        Ok(vec!["llama3".to_string()])
    }
}
