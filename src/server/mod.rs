use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};

use routes::{error_response, HttpResponse};

pub mod api;
pub mod routes;

/// Largest request body accepted; two team sheets fit comfortably.
pub const MAX_BODY_BYTES: usize = 1 << 20;
/// Header lines read before the request is refused.
pub const MAX_HEADERS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Result of reading one request off a connection.
pub enum ReadOutcome {
    /// The peer closed the connection before sending a request line.
    Closed,
    Request(Request),
    /// The request broke a limit; send this response without routing.
    Reject(HttpResponse),
}

pub fn run_server(bind_addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr)?;
    println!("ballgame server listening on http://{bind_addr}");

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream) {
                    tracing::warn!("request error: {err}");
                }
            }
            Err(err) => tracing::warn!("connection failed: {err}"),
        }
    }

    Ok(())
}

fn handle_connection(stream: &mut TcpStream) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);

    let response = match read_request(&mut reader)? {
        ReadOutcome::Closed => return Ok(()),
        ReadOutcome::Reject(response) => {
            tracing::debug!(status = response.status_code, "request rejected");
            response
        }
        ReadOutcome::Request(request) => {
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                bytes = request.body.len(),
                "request"
            );
            routes::route_request(&request.method, &request.path, &request.body)
        }
    };
    stream.write_all(response.to_http_string().as_bytes())?;
    stream.flush()?;
    Ok(())
}

/// Read the request line, at most [MAX_HEADERS] header lines and a body of at most
/// [MAX_BODY_BYTES]. Oversized bodies are refused before any of it is read.
pub fn read_request(reader: &mut impl BufRead) -> std::io::Result<ReadOutcome> {
    let mut request_line = String::new();
    if reader.read_line(&mut request_line)? == 0 {
        return Ok(ReadOutcome::Closed);
    }
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or("GET").to_string();
    let path = request_parts.next().unwrap_or("/").to_string();

    let mut content_length = 0usize;
    let mut headers = 0usize;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 {
            break;
        }
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        headers += 1;
        if headers > MAX_HEADERS {
            return Ok(ReadOutcome::Reject(error_response(
                431,
                "Request Header Fields Too Large",
                &format!("at most {MAX_HEADERS} header lines are accepted"),
            )));
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = match value.trim().parse() {
                    Ok(length) => length,
                    Err(_) => {
                        return Ok(ReadOutcome::Reject(error_response(
                            400,
                            "Bad Request",
                            "Content-Length is not a number",
                        )))
                    }
                };
            }
        }
    }

    if content_length > MAX_BODY_BYTES {
        return Ok(ReadOutcome::Reject(error_response(
            413,
            "Payload Too Large",
            &format!("request body is {content_length} bytes, limit is {MAX_BODY_BYTES}"),
        )));
    }

    let mut body = vec![0_u8; content_length];
    reader.read_exact(&mut body)?;
    Ok(ReadOutcome::Request(Request {
        method,
        path,
        body: String::from_utf8_lossy(&body).into_owned(),
    }))
}
