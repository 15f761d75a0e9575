// src/serve.rs

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub(crate) enum ServeError {
    #[error("No free port in {0}..{1}")]
    NoFreePort(u16, u16),

    #[error("I/O error serving request: {0}")]
    Io(#[from] std::io::Error),
}

/// How many ports above the preferred one we probe before giving up.
const PORT_ATTEMPTS: u16 = 10;

/// Binds the dev server, preferring the configured port but walking up a
/// few neighbors when it is taken.
pub(crate) fn bind(preferred: u16) -> Result<(TcpListener, u16), ServeError> {
    for port in preferred..preferred.saturating_add(PORT_ATTEMPTS) {
        match TcpListener::bind(("127.0.0.1", port)) {
            Ok(listener) => {
                if port != preferred {
                    warn!("serve::port {} taken, using {}", preferred, port);
                }
                return Ok((listener, port));
            }
            Err(_) => continue,
        }
    }
    Err(ServeError::NoFreePort(
        preferred,
        preferred.saturating_add(PORT_ATTEMPTS),
    ))
}

/// Serves the output directory on a background thread, one handler thread
/// per connection. Returns immediately; the caller keeps the process alive
/// (in practice the watch loop does).
pub(crate) fn spawn(listener: TcpListener, output_dir: PathBuf, port: u16) {
    let root = Arc::new(output_dir);
    info!("serve::listen http://127.0.0.1:{}/", port);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            let root = Arc::clone(&root);
            thread::spawn(move || {
                if let Err(e) = handle_connection(stream, &root) {
                    debug!("serve::error {:?}", e);
                }
            });
        }
    });
}

fn handle_connection(mut stream: TcpStream, root: &Path) -> Result<(), ServeError> {
    let mut buf = [0u8; 8192];
    let mut filled = 0;

    // Read until the header terminator; request bodies are irrelevant for a
    // static file server.
    let (method, path) = loop {
        let n = stream.read(&mut buf[filled..])?;
        if n == 0 {
            return Ok(());
        }
        filled += n;

        let mut headers = [httparse::EMPTY_HEADER; 32];
        let mut req = httparse::Request::new(&mut headers);
        match req.parse(&buf[..filled]) {
            Ok(httparse::Status::Complete(_)) => {
                break (
                    req.method.unwrap_or("").to_string(),
                    req.path.unwrap_or("/").to_string(),
                );
            }
            Ok(httparse::Status::Partial) if filled < buf.len() => continue,
            _ => return respond(&mut stream, 400, "text/plain", b"Bad Request"),
        }
    };

    if method != "GET" && method != "HEAD" {
        return respond(&mut stream, 405, "text/plain", b"Method Not Allowed");
    }

    let path = path.split(['?', '#']).next().unwrap_or("/");
    match resolve_file(root, path) {
        Some(file) => {
            let body = std::fs::read(&file)?;
            respond(&mut stream, 200, content_type(&file), &body)
        }
        None => {
            let not_found = root.join("404.html");
            let body = std::fs::read(&not_found).unwrap_or_else(|_| b"Not Found".to_vec());
            respond(&mut stream, 404, "text/html; charset=utf-8", &body)
        }
    }
}

/// Maps a request path onto the output tree: directories get their
/// `index.html`, traversal attempts get nothing.
fn resolve_file(root: &Path, request_path: &str) -> Option<PathBuf> {
    if request_path.contains("..") {
        return None;
    }
    let trimmed = request_path.trim_start_matches('/');

    let candidate = if trimmed.is_empty() {
        root.join("index.html")
    } else {
        root.join(trimmed)
    };

    if candidate.is_file() {
        return Some(candidate);
    }
    let with_index = candidate.join("index.html");
    if with_index.is_file() {
        return Some(with_index);
    }
    None
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "txt" => "text/plain; charset=utf-8",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

fn respond(
    stream: &mut TcpStream,
    status: u16,
    content_type: &str,
    body: &[u8],
) -> Result<(), ServeError> {
    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "Error",
    };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        content_type,
        body.len()
    );
    stream.write_all(head.as_bytes())?;
    stream.write_all(body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn get(port: u16, path: &str) -> (u16, String) {
        let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
        write!(stream, "GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", path).unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        let status: u16 = response
            .split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap();
        let body = response
            .split_once("\r\n\r\n")
            .map(|(_, b)| b.to_string())
            .unwrap_or_default();
        (status, body)
    }

    fn serve_fixture() -> (tempfile::TempDir, u16) {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join("index.html"), "<h1>home</h1>");
        write_file(&temp.path().join("notes/index.html"), "<h1>notes</h1>");
        write_file(&temp.path().join("css/style.css"), "body {}");
        write_file(&temp.path().join("404.html"), "<h1>missing</h1>");

        // ephemeral port so parallel tests never collide
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        spawn(listener, temp.path().to_path_buf(), port);
        (temp, port)
    }

    #[test]
    fn test_serves_root_index() {
        let (_temp, port) = serve_fixture();
        let (status, body) = get(port, "/");
        assert_eq!(status, 200);
        assert!(body.contains("home"));
    }

    #[test]
    fn test_serves_pretty_urls() {
        let (_temp, port) = serve_fixture();
        let (status, body) = get(port, "/notes/");
        assert_eq!(status, 200);
        assert!(body.contains("notes"));

        // without trailing slash too
        let (status, _) = get(port, "/notes");
        assert_eq!(status, 200);
    }

    #[test]
    fn test_serves_assets_with_content_type() {
        let (_temp, port) = serve_fixture();
        let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
        write!(stream, "GET /css/style.css HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        assert!(response.contains("text/css"));
    }

    #[test]
    fn test_missing_page_gets_404_page() {
        let (_temp, port) = serve_fixture();
        let (status, body) = get(port, "/nope/");
        assert_eq!(status, 404);
        assert!(body.contains("missing"));
    }

    #[test]
    fn test_traversal_is_rejected() {
        let (_temp, port) = serve_fixture();
        let (status, _) = get(port, "/../../etc/passwd");
        assert_eq!(status, 404);
    }

    #[test]
    fn test_post_is_rejected() {
        let (_temp, port) = serve_fixture();
        let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
        write!(stream, "POST / HTTP/1.1\r\nHost: x\r\nContent-Length: 0\r\n\r\n").unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        assert!(response.starts_with("HTTP/1.1 405"));
    }
}
