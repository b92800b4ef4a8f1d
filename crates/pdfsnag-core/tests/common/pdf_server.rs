//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed set of routes, each with a status code and body. Records how
//! many GETs each path received and the `User-Agent` of the latest one.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Route {
    pub fn ok(body: &[u8]) -> Self {
        Self {
            status: 200,
            body: body.to_vec(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: format!("error {}", status).into_bytes(),
        }
    }
}

/// Handle to a running server. The server runs until the process exits.
#[derive(Clone)]
pub struct PdfServer {
    pub base_url: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    user_agents: Arc<Mutex<HashMap<String, String>>>,
}

impl PdfServer {
    /// Absolute URL for `path` (e.g. "/a.pdf").
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Number of GET requests received for `path` (including its query string).
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    /// `User-Agent` header of the latest GET for `path`, if any was sent.
    pub fn user_agent(&self, path: &str) -> Option<String> {
        self.user_agents.lock().unwrap().get(path).cloned()
    }
}

/// Starts a server in a background thread. Keys of `routes` are request
/// targets as sent on the wire ("/a.pdf", "/get_file.php?name=x.pdf").
/// Unknown paths return 404.
pub fn start(routes: Vec<(&str, Route)>) -> PdfServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(p, r)| (p.to_string(), r))
            .collect(),
    );
    let hits = Arc::new(Mutex::new(HashMap::new()));
    let user_agents = Arc::new(Mutex::new(HashMap::new()));
    let server_hits = Arc::clone(&hits);
    let server_agents = Arc::clone(&user_agents);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&server_hits);
            let agents = Arc::clone(&server_agents);
            thread::spawn(move || handle(stream, &routes, &hits, &agents));
        }
    });
    PdfServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        hits,
        user_agents,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<String, Route>,
    hits: &Mutex<HashMap<String, usize>>,
    agents: &Mutex<HashMap<String, String>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut lines = request.lines();
    let mut parts = lines.next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("/").to_string();

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }
    *hits.lock().unwrap().entry(target.clone()).or_insert(0) += 1;
    let user_agent = lines
        .take_while(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("user-agent"))
        .map(|(_, value)| value.trim().to_string());
    if let Some(ua) = user_agent {
        agents.lock().unwrap().insert(target.clone(), ua);
    }

    let route = routes.get(&target).cloned().unwrap_or_else(|| Route::status(404));
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/pdf\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        route.status,
        reason(route.status),
        route.body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(&route.body);
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
