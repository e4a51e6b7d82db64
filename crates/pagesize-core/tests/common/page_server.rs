//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves fixed pages by path. A page can be delayed, answered with a non-200
//! status, or truncated (advertises more bytes than it sends, then closes).

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    pub body: Vec<u8>,
    pub delay: Duration,
    /// If true, `Content-Length` claims twice the body size and the connection
    /// is closed after the real body.
    pub truncated: bool,
}

impl Page {
    pub fn ok(len: usize) -> Self {
        Self {
            status: 200,
            body: vec![b'x'; len],
            delay: Duration::ZERO,
            truncated: false,
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn truncated(mut self) -> Self {
        self.truncated = true;
        self
    }
}

/// Starts a server in a background thread serving `pages` keyed by path
/// (e.g. "/a"). Unknown paths get 404 with an empty body. Returns the base URL
/// without trailing slash (e.g. "http://127.0.0.1:12345").
pub fn start(pages: Vec<(&str, Page)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let pages: Arc<HashMap<String, Page>> = Arc::new(
        pages
            .into_iter()
            .map(|(path, page)| (path.to_string(), page))
            .collect(),
    );
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let pages = Arc::clone(&pages);
            thread::spawn(move || handle(stream, &pages));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

/// A URL on localhost that refuses connections.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/gone", port)
}

fn handle(mut stream: std::net::TcpStream, pages: &HashMap<String, Page>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");

    let page = pages.get(path).cloned().unwrap_or(Page {
        status: 404,
        body: Vec::new(),
        delay: Duration::ZERO,
        truncated: false,
    });
    if !page.delay.is_zero() {
        thread::sleep(page.delay);
    }
    let advertised = if page.truncated {
        page.body.len() * 2
    } else {
        page.body.len()
    };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        page.status,
        reason(page.status),
        advertised
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&page.body);
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
