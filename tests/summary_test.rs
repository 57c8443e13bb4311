use httpmock::prelude::*;
use profile_fetch::core::summary::load_summary;
use profile_fetch::{FetchError, HttpTransport, LocalStorage, ProfileFetcher, RetryPolicy, Settings};
use tempfile::TempDir;

fn le32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn strings_blob() -> Vec<u8> {
    let mut out = Vec::new();
    le32(&mut out, 0);
    le32(&mut out, 3);
    for (id, name) in [(1u32, "Engine"), (2, "Update"), (3, "Script")] {
        le32(&mut out, id);
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(name.as_bytes());
    }
    out
}

fn profile_blob() -> Vec<u8> {
    let mut out = Vec::new();
    le32(&mut out, 7);
    le32(&mut out, 1);
    // name, scope, start, elapsed, thread + padding
    for value in [2u32, 1, 0, 2_500] {
        le32(&mut out, value);
    }
    out.extend_from_slice(&[0, 0, 0, 0]);
    le32(&mut out, 2);
    for value in [1u32, 2_500, 1, 3, 9_000, 4] {
        le32(&mut out, value);
    }
    le32(&mut out, 0);
    out
}

#[tokio::test]
async fn test_fetched_capture_can_be_summarized() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/profile");
        then.status(200).body(profile_blob());
    });
    server.mock(|when, then| {
        when.method(GET).path("/strings");
        then.status(200).body(strings_blob());
    });

    let mut settings = Settings::new(server.host());
    settings.endpoint.port = server.port();
    settings.output_dir = output_path.clone();
    settings.retry = RetryPolicy::immediate().with_max_attempts(2);

    let storage = LocalStorage::new(output_path);
    let fetcher = ProfileFetcher::new(storage.clone(), HttpTransport::new(None).unwrap(), &settings);
    fetcher.run().await.unwrap();

    let summary = load_summary(&storage, 5).await.unwrap();
    assert_eq!(summary.frame, 7);
    assert_eq!(summary.sample_count, 1);
    assert_eq!(summary.string_count, 3);
    assert!((summary.frame_time_ms - 2.5).abs() < 1e-9);
    assert_eq!(summary.top_scopes[0].name, "Script");
    assert_eq!(summary.top_scopes[0].count, 4);
}

#[tokio::test]
async fn test_summary_of_missing_capture_fails() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

    let err = load_summary(&storage, 5).await.unwrap_err();
    assert!(matches!(err, FetchError::IoError(_)));
}

#[tokio::test]
async fn test_summary_of_garbage_is_a_decode_error() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("strings"), strings_blob()).unwrap();
    std::fs::write(temp_dir.path().join("profile"), b"not a profile").unwrap();
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

    let err = load_summary(&storage, 5).await.unwrap_err();
    assert!(matches!(err, FetchError::DecodeError { .. }));
}
