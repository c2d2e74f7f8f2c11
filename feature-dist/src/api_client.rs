use std::io::{Read, Write};
use std::net::TcpStream;
use std::os::unix::net::UnixStream;
use std::time::Duration;

use tracing::debug;

use crate::config::ApiAddr;
use crate::error::FetchError;
use crate::fetcher::HistogramSource;
use crate::histogram::HistogramResponse;

const HISTOGRAM_PATH: &str = "/api/dataset/numerical_features/histogram";

/// Dataset API client reached over HTTP/1.1 on TCP or a Unix socket.
#[derive(Clone, Debug)]
pub struct DatasetApi {
    addr: ApiAddr,
    timeout: Duration,
}

impl DatasetApi {
    pub fn new(addr: ApiAddr, timeout: Duration) -> Self {
        Self { addr, timeout }
    }

    fn http_post(&self, path: &str, body: &str) -> Result<Vec<u8>, FetchError> {
        let request = format!(
            "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nAccept: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        let raw = match &self.addr {
            ApiAddr::Unix(sock) => {
                let mut stream = UnixStream::connect(sock).map_err(|e| FetchError::Connect {
                    addr: self.addr.to_string(),
                    reason: e.to_string(),
                })?;
                stream.set_read_timeout(Some(self.timeout)).ok();
                stream.set_write_timeout(Some(Duration::from_secs(5))).ok();
                exchange(&mut stream, &request)?
            }
            ApiAddr::Tcp(host) => {
                let mut stream = TcpStream::connect(host).map_err(|e| FetchError::Connect {
                    addr: self.addr.to_string(),
                    reason: e.to_string(),
                })?;
                stream.set_read_timeout(Some(self.timeout)).ok();
                stream.set_write_timeout(Some(Duration::from_secs(5))).ok();
                exchange(&mut stream, &request)?
            }
        };
        extract_body(&raw)
    }
}

impl HistogramSource for DatasetApi {
    fn features_histogram(&self, features: &[String]) -> Result<HistogramResponse, FetchError> {
        let body = serde_json::json!({ "features": features });
        debug!(addr = %self.addr, count = features.len(), "requesting feature histograms");
        let resp = self.http_post(HISTOGRAM_PATH, &body.to_string())?;
        parse_histograms(&resp)
    }
}

fn exchange<S: Read + Write>(stream: &mut S, request: &str) -> Result<Vec<u8>, FetchError> {
    stream.write_all(request.as_bytes())?;
    let mut resp = Vec::new();
    stream.read_to_end(&mut resp).map_err(|e| match e.kind() {
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
            FetchError::Io(format!("read timed out: {e}"))
        }
        _ => FetchError::from(e),
    })?;
    Ok(resp)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Split a raw HTTP response into its body, rejecting non-2xx statuses.
/// The body stays as bytes; chunk sizes count bytes, not characters.
fn extract_body(resp: &[u8]) -> Result<Vec<u8>, FetchError> {
    let idx = find(resp, b"\r\n\r\n")
        .ok_or_else(|| FetchError::Parse("truncated HTTP response".into()))?;
    let head = String::from_utf8_lossy(&resp[..idx]);
    let body = &resp[idx + 4..];

    let mut lines = head.lines();
    let code = lines
        .next()
        .and_then(|status| status.split_whitespace().nth(1))
        .and_then(|c| c.parse::<u16>().ok())
        .ok_or_else(|| FetchError::Parse("missing HTTP status line".into()))?;

    let chunked = lines.any(|l| {
        let l = l.to_ascii_lowercase();
        l.starts_with("transfer-encoding:") && l.contains("chunked")
    });
    let body = if chunked {
        decode_chunked(body)?
    } else {
        body.to_vec()
    };

    if !(200..300).contains(&code) {
        return Err(FetchError::Status {
            code,
            body: String::from_utf8_lossy(&body).trim().chars().take(200).collect(),
        });
    }
    Ok(body)
}

fn decode_chunked(mut body: &[u8]) -> Result<Vec<u8>, FetchError> {
    let mut out = Vec::new();
    loop {
        let line_end =
            find(body, b"\r\n").ok_or_else(|| FetchError::Parse("bad chunk header".into()))?;
        let header = String::from_utf8_lossy(&body[..line_end]);
        let size_str = header.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_str, 16)
            .map_err(|_| FetchError::Parse(format!("bad chunk size '{size_str}'")))?;
        body = &body[line_end + 2..];
        if size == 0 {
            return Ok(out);
        }
        let chunk = body
            .get(..size)
            .ok_or_else(|| FetchError::Parse("chunk shorter than declared".into()))?;
        out.extend_from_slice(chunk);
        body = &body[size..];
        body = body.strip_prefix(b"\r\n").unwrap_or(body);
    }
}

/// Parse the histogram body. A `{"result": {...}}` envelope is unwrapped.
fn parse_histograms(body: &[u8]) -> Result<HistogramResponse, FetchError> {
    let v = match serde_json::from_slice::<serde_json::Value>(body)? {
        serde_json::Value::Object(mut m) if m.get("result").is_some_and(|r| r.is_object()) => {
            m.remove("result").unwrap_or_default()
        }
        other => other,
    };
    Ok(serde_json::from_value(v)?)
}

#[cfg(test)]
mod tests {
    use std::io::BufRead;
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn extracts_body_of_ok_response() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"age\": []}";
        assert_eq!(extract_body(raw).unwrap(), b"{\"age\": []}");
    }

    #[test]
    fn non_success_status_is_an_error() {
        let raw = b"HTTP/1.1 500 Internal Server Error\r\n\r\nboom";
        assert_eq!(
            extract_body(raw),
            Err(FetchError::Status {
                code: 500,
                body: "boom".into()
            })
        );
    }

    #[test]
    fn truncated_response_is_a_parse_error() {
        assert!(matches!(
            extract_body(b"HTTP/1.1 200 OK\r\nContent-"),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn decodes_chunked_bodies() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\n{\"a\"\r\n6\r\n: []}\n\r\n0\r\n\r\n";
        assert_eq!(extract_body(raw).unwrap(), b"{\"a\": []}\n");
    }

    #[test]
    fn chunk_boundary_may_split_a_character() {
        // "é" is two bytes; the first chunk ends between them
        let payload = "{\"é\": []}".as_bytes();
        let (first, rest) = payload.split_at(3);
        let mut raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
        for chunk in [first, rest] {
            raw.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
            raw.extend_from_slice(chunk);
            raw.extend_from_slice(b"\r\n");
        }
        raw.extend_from_slice(b"0\r\n\r\n");

        let body = extract_body(&raw).unwrap();
        assert_eq!(body, payload);
        let resp = parse_histograms(&body).unwrap();
        assert!(resp.contains("é"));
    }

    #[test]
    fn invalid_utf8_does_not_shift_chunk_offsets() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n2\r\n\xff\xfe\r\n2\r\n{}\r\n0\r\n\r\n";
        assert_eq!(extract_body(raw).unwrap(), b"\xff\xfe{}");
    }

    #[test]
    fn unwraps_result_envelope() {
        let wrapped = r#"{"result": {"age": [{"bins": [1], "values": [2]}]}}"#;
        let resp = parse_histograms(wrapped.as_bytes()).unwrap();
        assert!(resp.contains("age"));
        assert!(!resp.contains("result"));

        let plain = r#"{"age": [{"bins": [1], "values": [2]}]}"#;
        assert_eq!(parse_histograms(plain.as_bytes()).unwrap(), resp);
    }

    #[test]
    fn rejects_non_object_bodies() {
        assert!(matches!(parse_histograms(b"[1, 2]"), Err(FetchError::Parse(_))));
        assert!(matches!(parse_histograms(b"not json"), Err(FetchError::Parse(_))));
    }

    #[test]
    fn fetches_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = std::io::BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" {
                    break;
                }
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap();
                }
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).unwrap();

            let payload = r#"{"age": [{"bins": [0, 1], "values": [3, 4]}]}"#;
            let resp = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                payload.len(),
                payload
            );
            reader.get_mut().write_all(resp.as_bytes()).unwrap();
            (request_line, String::from_utf8(body).unwrap())
        });

        let api = DatasetApi::new(ApiAddr::Tcp(addr.to_string()), Duration::from_secs(5));
        let resp = api.features_histogram(&["age".to_string()]).unwrap();
        let (request_line, body) = server.join().unwrap();

        assert!(request_line.starts_with(&format!("POST {HISTOGRAM_PATH} ")));
        let sent: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(sent, serde_json::json!({"features": ["age"]}));
        assert_eq!(resp.get("age").unwrap()[0].values, vec![3.0, 4.0]);
    }

    #[test]
    fn unreachable_socket_is_a_connect_error() {
        let api = DatasetApi::new(
            ApiAddr::Unix("/nonexistent/dataset-api.sock".into()),
            Duration::from_secs(1),
        );
        assert!(matches!(
            api.features_histogram(&["age".to_string()]),
            Err(FetchError::Connect { .. })
        ));
    }
}
