use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

/// Raw HTTP request captured by the stub.
#[derive(Debug)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<String>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let prefix = format!("{}:", name.to_lowercase());
        self.headers
            .iter()
            .find(|h| h.to_lowercase().starts_with(&prefix))
            .map(|h| h[prefix.len()..].trim())
    }
}

/// Serve exactly one request, answering with `status` after `delay`.
/// Returns the URL to hit and a channel yielding the captured request.
pub fn serve_once(status: u16, delay: Duration) -> (String, Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let Ok((stream, _)) = listener.accept() else {
            return;
        };
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap_or(0);

        let mut headers = Vec::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                break;
            }
            let line = line.trim_end().to_string();
            if line.is_empty() {
                break;
            }
            if let Some(v) = line.to_lowercase().strip_prefix("content-length:") {
                content_length = v.trim().parse().unwrap_or(0);
            }
            headers.push(line);
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).unwrap_or(());

        let _ = tx.send(CapturedRequest {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        });

        thread::sleep(delay);
        let mut stream = stream;
        let response = format!(
            "HTTP/1.1 {} STUB\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
            status
        );
        let _ = stream.write_all(response.as_bytes());
    });

    (format!("http://{}/hook", addr), rx)
}

/// A URL on a port nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/hook", addr)
}
