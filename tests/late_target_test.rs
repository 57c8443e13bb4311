use profile_fetch::{HttpTransport, LocalStorage, ProfileFetcher, RetryPolicy, Settings};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Minimal HTTP/1.1 responder: answers `/profile` and `/strings` with fixed bodies.
async fn serve(listener: TcpListener, profile: &'static [u8], strings: &'static [u8]) {
    loop {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };

        tokio::spawn(async move {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }

            let head = String::from_utf8_lossy(&request);
            let body = if head.starts_with("GET /profile ") {
                profile
            } else if head.starts_with("GET /strings ") {
                strings
            } else {
                &b""[..]
            };

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.write_all(body).await;
            let _ = socket.shutdown().await;
        });
    }
}

#[tokio::test]
async fn test_profile_arrives_once_target_starts_listening() {
    let temp_dir = TempDir::new().unwrap();

    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    // The target comes up only after several refused attempts.
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
        serve(listener, b"late-profile-body", b"late-strings").await;
    });

    let mut settings = Settings::new("127.0.0.1");
    settings.endpoint.port = port;
    settings.output_dir = temp_dir.path().to_str().unwrap().to_string();
    settings.retry = RetryPolicy {
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(40),
        jitter: false,
        ..RetryPolicy::default()
    }
    .with_deadline(Duration::from_secs(10));

    let storage = LocalStorage::new(settings.output_dir.clone());
    let transport = HttpTransport::new(Some(Duration::from_secs(5))).unwrap();
    let report = ProfileFetcher::new(storage, transport, &settings)
        .run()
        .await
        .unwrap();

    assert!(report.profile.attempts > 1);
    assert_eq!(report.profile.bytes, b"late-profile-body".len());
    assert_eq!(
        std::fs::read(temp_dir.path().join("profile")).unwrap(),
        b"late-profile-body".to_vec()
    );
    assert_eq!(
        std::fs::read(temp_dir.path().join("strings")).unwrap(),
        b"late-strings".to_vec()
    );
}
