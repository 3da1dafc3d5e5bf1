//! Shared utilities for integration testing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including any query string.
    pub path: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }

    /// Path without the query string.
    pub fn route(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }
}

/// Handle to a running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose route (path without query) equals `route`.
    pub fn requests_to(&self, route: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.route() == route)
            .collect()
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `respond` receives the request and how many earlier requests hit the
/// same route, and returns the status and JSON body to send back.
pub async fn start_programmable_backend<F>(respond: F) -> MockBackend
where
    F: Fn(&RecordedRequest, usize) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let hits: Arc<Mutex<HashMap<String, usize>>> = Arc::new(Mutex::new(HashMap::new()));
    let respond = Arc::new(respond);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let respond = respond.clone();
                    let recorded = recorded.clone();
                    let hits = hits.clone();
                    tokio::spawn(async move {
                        let _ = serve(socket, respond, recorded, hits).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockBackend { addr, requests }
}

/// Backend that replays `(route, status, body)` entries in order per route.
///
/// Once a route's script runs out its last entry repeats. Unknown routes get 404.
pub async fn start_scripted_backend(script: Vec<(&'static str, u16, &'static str)>) -> MockBackend {
    start_programmable_backend(move |request, seen| {
        let entries: Vec<_> = script
            .iter()
            .filter(|(route, _, _)| *route == request.route())
            .collect();
        match entries.get(seen).or(entries.last()) {
            Some((_, status, body)) => (*status, body.to_string()),
            None => (404, r#"{"detail": "Not Found"}"#.to_string()),
        }
    })
    .await
}

async fn serve<F>(
    mut socket: TcpStream,
    respond: Arc<F>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
) -> std::io::Result<()>
where
    F: Fn(&RecordedRequest, usize) -> (u16, String) + Send + Sync + 'static,
{
    let request = read_request(&mut socket).await?;
    let seen = {
        let mut hits = hits.lock().unwrap();
        let count = hits.entry(request.route().to_string()).or_insert(0);
        let seen = *count;
        *count += 1;
        seen
    };
    recorded.lock().unwrap().push(request.clone());

    let (status, body) = respond(&request, seen);
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

async fn read_request(socket: &mut TcpStream) -> std::io::Result<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut start = lines.next().unwrap_or("").split_whitespace();
    let method = start.next().unwrap_or("").to_string();
    let path = start.next().unwrap_or("").to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    Ok(RecordedRequest { method, path, body })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
