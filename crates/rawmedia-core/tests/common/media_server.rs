//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a single static body to GET, optionally with a fixed error status,
//! chunked transfer encoding or a trickled body, and records every request
//! head it receives.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct MediaServerOptions {
    /// Status line sent with the body (e.g. "200 OK", "404 Not Found").
    pub status: &'static str,
    /// Send the body with `Transfer-Encoding: chunked` in pieces of this size.
    pub chunk_size: Option<usize>,
    /// Send a fixed-length body one byte at a time with this pause between bytes.
    pub byte_delay: Option<Duration>,
}

impl Default for MediaServerOptions {
    fn default() -> Self {
        Self {
            status: "200 OK",
            chunk_size: None,
            byte_delay: None,
        }
    }
}

pub struct MediaServer {
    /// URL of the served object (e.g. "http://127.0.0.1:12345/d/f/media.enc").
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MediaServer {
    /// Request heads received so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Value of `name` in the first recorded request, if present.
    pub fn first_request_header(&self, name: &str) -> Option<String> {
        let requests = self.requests();
        let head = requests.first()?;
        head.lines().skip(1).find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim()
                .eq_ignore_ascii_case(name)
                .then(|| v.trim().to_string())
        })
    }
}

/// Starts a server in a background thread serving `body`. Runs until the process exits.
pub fn start(body: Vec<u8>) -> MediaServer {
    start_with_options(body, MediaServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: MediaServerOptions) -> MediaServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let recorded = Arc::clone(&recorded);
            thread::spawn(move || handle(stream, &body, opts, &recorded));
        }
    });
    MediaServer {
        url: format!("http://127.0.0.1:{}/d/f/media.enc", port),
        requests,
    }
}

/// A URL on a port nobody listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/gone", port)
}

fn handle(
    mut stream: std::net::TcpStream,
    body: &[u8],
    opts: MediaServerOptions,
    recorded: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
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
    recorded.lock().unwrap().push(request.to_string());

    let method = request.split_whitespace().next().unwrap_or("");
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }

    if let Some(delay) = opts.byte_delay {
        let head = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            opts.status,
            body.len()
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.flush();
        for byte in body {
            thread::sleep(delay);
            if stream.write_all(std::slice::from_ref(byte)).is_err() {
                return;
            }
            let _ = stream.flush();
        }
        return;
    }

    match opts.chunk_size {
        None => {
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                opts.status,
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body);
        }
        Some(size) => {
            let head = format!(
                "HTTP/1.1 {}\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
                opts.status
            );
            let _ = stream.write_all(head.as_bytes());
            for chunk in body.chunks(size.max(1)) {
                let _ = stream.write_all(format!("{:x}\r\n", chunk.len()).as_bytes());
                let _ = stream.write_all(chunk);
                let _ = stream.write_all(b"\r\n");
                let _ = stream.flush();
            }
            let _ = stream.write_all(b"0\r\n\r\n");
        }
    }
}
