//! End-to-end tests against a real TCP peer.
//!
//! The server side writes scripted raw bytes, flushing between pieces so the
//! client sees realistic read boundaries. Responses are framed by
//! Content-Length only, which is exactly what the reader supports.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use sippet::Response;

/// Spawn a server that accepts one connection and runs `serve` on it.
fn spawn_server(
    serve: impl FnOnce(TcpStream) + Send + 'static,
) -> (std::net::SocketAddr, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        serve(stream);
    });
    (addr, handle)
}

/// Read one request off the stream up to the blank line and discard it.
fn discard_request(stream: &mut TcpStream) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).expect("read request line");
        if n == 0 || line == "\r\n" || line == "\n" {
            break;
        }
    }
}

fn send_request(socket: &mut TcpStream, path: &str) {
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: keep-alive\r\n\r\n");
    socket.write_all(request.as_bytes()).expect("send request");
}

#[test]
fn test_large_body_dribbled_over_tcp() {
    let body: Vec<u8> = (0..40_000u32).map(|i| (i % 251) as u8).collect();
    let body_for_server = body.clone();

    let (addr, server) = spawn_server(move |mut stream| {
        discard_request(&mut stream);
        let header = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\n\r\n",
            body_for_server.len()
        );
        // Split the header itself across two writes to land a line on a
        // read boundary, then dribble the body in uneven pieces.
        stream.write_all(&header.as_bytes()[..20]).expect("write");
        stream.flush().expect("flush");
        thread::sleep(Duration::from_millis(5));
        stream.write_all(&header.as_bytes()[20..]).expect("write");
        for piece in body_for_server.chunks(7 * 1024 + 13) {
            stream.write_all(piece).expect("write body piece");
            stream.flush().expect("flush");
            thread::sleep(Duration::from_millis(2));
        }
    });

    let mut socket = TcpStream::connect(addr).expect("connect");
    send_request(&mut socket, "/blob");

    let mut response = Response::receive(&mut socket, "/blob").expect("receive");
    assert_eq!(response.status(), 200);
    assert_eq!(response.path(), "/blob");
    assert_eq!(
        response.header("content-type"),
        Some("application/octet-stream")
    );
    assert_eq!(response.content_length(), body.len() as u64);

    let mut streamed = Vec::new();
    let mut calls = 0u32;
    while response
        .stream_to(&mut streamed)
        .expect("stream body")
        .is_some()
    {
        calls += 1;
    }
    assert_eq!(streamed, body);
    // 40 KB cannot fit in one buffer, so the body took several calls.
    assert!(calls > 1, "expected multiple streaming calls, got {calls}");

    server.join().expect("server thread");
}

#[test]
fn test_sequential_responses_socket_stays_usable() {
    let (addr, server) = spawn_server(|mut stream| {
        discard_request(&mut stream);
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nfirst")
            .expect("write first");
        discard_request(&mut stream);
        stream
            .write_all(b"HTTP/1.1 201 Created\r\nContent-Length: 6\r\n\r\nsecond")
            .expect("write second");
    });

    let mut socket = TcpStream::connect(addr).expect("connect");

    send_request(&mut socket, "/one");
    let mut response = Response::receive(&mut socket, "/one").expect("receive first");
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().expect("first body"), "first");
    drop(response);

    // The reader only borrowed the socket and never closed it.
    send_request(&mut socket, "/two");
    let mut response = Response::receive(&mut socket, "/two").expect("receive second");
    assert_eq!(response.status(), 201);
    assert_eq!(response.bytes().expect("second body"), b"second");

    server.join().expect("server thread");
}

#[test]
fn test_peer_disconnect_mid_headers() {
    let (addr, server) = spawn_server(|mut stream| {
        discard_request(&mut stream);
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-")
            .expect("write partial");
        // Dropping the stream closes the connection mid header block.
    });

    let mut socket = TcpStream::connect(addr).expect("connect");
    send_request(&mut socket, "/broken");

    let result = Response::receive(&mut socket, "/broken");
    assert!(matches!(result, Err(sippet::Error::IncompleteResponse)));

    server.join().expect("server thread");
}

#[test]
fn test_lf_only_header_lines() {
    // Status and header lines terminated by bare LF, blank line as CRLF.
    let (addr, server) = spawn_server(|mut stream| {
        discard_request(&mut stream);
        stream
            .write_all(b"HTTP/1.1 200 OK\nContent-Type: text/plain\nContent-Length: 5\n\r\nHELLO")
            .expect("write");
    });

    let mut socket = TcpStream::connect(addr).expect("connect");
    send_request(&mut socket, "/hello");

    let mut response = Response::receive(&mut socket, "/hello").expect("receive");
    assert_eq!(response.status(), 200);
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
    assert_eq!(response.content_length(), 5);
    assert_eq!(response.text().expect("body"), "HELLO");

    server.join().expect("server thread");
}

#[test]
fn test_read_never_reads_past_declared_body() {
    // A keep-alive peer may already have pipelined more data; the reader
    // must stop delivering at Content-Length.
    let (addr, server) = spawn_server(|mut stream| {
        discard_request(&mut stream);
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nyes")
            .expect("write");
    });

    let mut socket = TcpStream::connect(addr).expect("connect");
    send_request(&mut socket, "/exact");

    let mut response = Response::receive(&mut socket, "/exact").expect("receive");
    let mut body = Vec::new();
    let mut total = 0u64;
    while let Some(n) = response.stream_to(&mut body).expect("stream") {
        total += n as u64;
    }
    assert_eq!(total, response.content_length());
    assert_eq!(body, b"yes");
    // Exhaustion is sticky.
    assert_eq!(response.stream_to(&mut body).expect("stream"), None);
    assert_eq!(body, b"yes");

    server.join().expect("server thread");
}
