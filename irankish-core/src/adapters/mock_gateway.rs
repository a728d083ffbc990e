//! Mock IranKish API server for testing
//!
//! Answers the same JSON shapes as the real gateway:
//! - POST .../tokenization/make(Special) returns `{ responseCode, description, result: { token } }`
//! - POST .../confirmation/purchase and .../reversePurchase echo RRN and STAN in `result`
//! - POST .../inquiry/single returns the transaction in `result`
//!
//! Every request body is recorded so tests can assert on the wire payload.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;

use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;
use serde_json::{json, Value as JsonValue};

use crate::config::GatewayConfig;
use crate::domain::Credentials;

/// Mock gateway server for testing
pub struct MockGatewayServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Canned behaviour of the mock
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// HTTP status for every answer
    pub status: u16,
    /// `responseCode` for every answer
    pub response_code: String,
    pub description: String,
    /// Token handed out by tokenization, `None` to omit it
    pub token: Option<String>,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            status: 200,
            response_code: "00".to_string(),
            description: "Success".to_string(),
            token: Some("FAKETOKEN123".to_string()),
            delay_ms: 0,
        }
    }
}

/// One request as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: JsonValue,
}

impl MockGatewayServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(Mutex::new(Vec::new()));

        // Non-blocking so stop() is honoured
        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let requests_clone = requests.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let recorded = requests_clone.clone();
                        thread::spawn(move || handle_connection(stream, &cfg, &recorded));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    /// API base URL, shaped like the production one
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/api/v3", self.port)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockGatewayServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, recorded: &Mutex<Vec<RecordedRequest>>) {
    let _ = stream.set_nonblocking(false);
    let Some((method, path, body)) = read_request(&mut stream) else {
        send_response(&mut stream, 400, "Bad Request", r#"{"error": "Invalid request"}"#);
        return;
    };

    let body: JsonValue = serde_json::from_str(&body).unwrap_or(JsonValue::Null);
    recorded.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        body: body.clone(),
    });

    if config.delay_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(config.delay_ms));
    }

    if method != "POST" {
        send_response(&mut stream, 405, "Method Not Allowed", r#"{"error": "Method not allowed"}"#);
        return;
    }

    if config.status != 200 {
        send_response(
            &mut stream,
            config.status,
            "Error",
            r#"{"error": "Internal Server Error"}"#,
        );
        return;
    }

    let result = if path.ends_with("/tokenization/make") || path.ends_with("/tokenization/makeSpecial") {
        match &config.token {
            Some(token) => json!({ "token": token }),
            None => JsonValue::Null,
        }
    } else if path.ends_with("/confirmation/purchase") || path.ends_with("/confirmation/reversePurchase") {
        json!({
            "responseCode": config.response_code,
            "systemTraceAuditNumber": body["systemTraceAuditNumber"],
            "retrievalReferenceNumber": body["retrievalReferenceNumber"],
            "amount": 10000,
            "terminalId": body["terminalId"],
        })
    } else if path.ends_with("/inquiry/single") {
        json!({
            "responseCode": config.response_code,
            "retrievalReferenceNumber": body.get("retrievalReferenceNumber").cloned().unwrap_or(json!("123456789012")),
            "systemTraceAuditNumber": "123456",
            "token": body.get("tokenIdentity").cloned().unwrap_or(json!("FAKETOKEN123")),
            "requestId": body.get("requestId").cloned().unwrap_or(JsonValue::Null),
            "amount": 10000,
        })
    } else {
        send_response(&mut stream, 404, "Not Found", r#"{"error": "Endpoint not found"}"#);
        return;
    };

    let answer = json!({
        "responseCode": config.response_code,
        "description": config.description,
        "status": config.response_code == "00",
        "result": result,
    });
    send_response(&mut stream, 200, "OK", &answer.to_string());
}

/// Read request line, headers and a `Content-Length` body
fn read_request(stream: &mut TcpStream) -> Option<(String, String, String)> {
    let mut data = Vec::new();
    let mut buffer = [0; 4096];

    loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);

        let Some(header_end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&data[..header_end]).to_string();
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        let body_start = header_end + 4;
        if data.len() < body_start + content_length {
            continue;
        }

        let mut request_line = head.lines().next()?.split_whitespace();
        let method = request_line.next()?.to_string();
        let path = request_line.next()?.to_string();
        let body = String::from_utf8_lossy(&data[body_start..body_start + content_length]).to_string();
        return Some((method, path, body));
    }
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Test RSA key pair, generated once per test binary
pub fn test_private_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 1024).unwrap())
}

pub fn test_public_key_pem() -> String {
    test_private_key()
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .unwrap()
}

/// Valid configuration pointing at `base_url`
pub fn test_config(base_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig {
        credentials: Credentials::new("12345678", "1234567890123456", "992180001234", test_public_key_pem()),
        revert_url: "https://shop.example/callback".to_string(),
        ..Default::default()
    };
    config.endpoints.base_url = base_url.to_string();
    config
}
