use libhttp_storm::{HttpChecker, Liveness, LivenessCheck, Method, ScanConfig};
use std::{net::SocketAddr, time::Duration};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::oneshot,
};

const TIMEOUT: Duration = Duration::from_millis(500);

/// Serves exactly one request with `status_line`, reporting the raw request
/// head back to the test.
async fn serve_once(status_line: &'static str) -> (SocketAddr, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            head.extend_from_slice(&buf[..n]);
        }
        let response = format!("{status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
        let _ = socket.write_all(response.as_bytes()).await;
        socket.shutdown().await.ok();
        let _ = tx.send(String::from_utf8_lossy(&head).into_owned());
    });

    (addr, rx)
}

#[tokio::test]
async fn any_status_counts_as_listening() {
    let checker = HttpChecker::new(TIMEOUT).unwrap();

    for status in ["HTTP/1.1 200 OK", "HTTP/1.1 500 Internal Server Error"] {
        let (addr, _) = serve_once(status).await;
        let url = format!("http://{addr}");
        assert_eq!(checker.check(&url, &Method::GET).await, Liveness::Listening);
    }
}

#[tokio::test]
async fn request_carries_method_and_close_header() {
    let checker = HttpChecker::new(TIMEOUT).unwrap();
    let (addr, head) = serve_once("HTTP/1.1 204 No Content").await;

    let liveness = checker
        .check(&format!("http://{addr}"), &Method::HEAD)
        .await;

    assert!(liveness.is_listening());
    let head = head.await.unwrap().to_ascii_lowercase();
    assert!(head.starts_with("head / http/1.1"));
    assert!(head.contains("connection: close"));
}

#[tokio::test]
async fn refused_connection_is_not_listening() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let checker = HttpChecker::new(TIMEOUT).unwrap();

    let liveness = checker.check(&format!("http://{addr}"), &Method::GET).await;
    assert_eq!(liveness, Liveness::NotListening);
}

#[tokio::test]
async fn silent_peer_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });
    let checker = HttpChecker::new(Duration::from_millis(200)).unwrap();

    let started = std::time::Instant::now();
    let liveness = checker.check(&format!("http://{addr}"), &Method::GET).await;

    assert_eq!(liveness, Liveness::NotListening);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn tls_against_plain_http_is_not_listening() {
    let (addr, _) = serve_once("HTTP/1.1 200 OK").await;
    let checker = HttpChecker::new(TIMEOUT).unwrap();

    let liveness = checker.check(&format!("https://{addr}"), &Method::GET).await;
    assert_eq!(liveness, Liveness::NotListening);
}

#[tokio::test]
async fn unusable_urls_are_not_listening() {
    let checker = HttpChecker::new(TIMEOUT).unwrap();

    for url in ["https://", "ftp://127.0.0.1:21", "not a url"] {
        assert_eq!(checker.check(url, &Method::GET).await, Liveness::NotListening);
    }
}

#[tokio::test]
async fn scanner_reports_local_http_probe() {
    let (addr, _) = serve_once("HTTP/1.1 404 Not Found").await;
    let config = ScanConfig {
        concurrency: 2,
        probes: vec![format!("http:{}", addr.port())],
        skip_default: true,
        timeout: TIMEOUT,
        ..ScanConfig::default()
    };
    let report = libhttp_storm::scan(["127.0.0.1\n"], config).await.unwrap();

    let expected = format!("http://127.0.0.1:{}", addr.port());
    assert_eq!(report.urls().collect::<Vec<_>>(), vec![expected.as_str()]);
}
