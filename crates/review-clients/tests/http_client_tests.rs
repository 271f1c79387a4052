use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use review_core::clients::AuthoringClient;
use review_core::types::PrMetadata;

fn sample_pr() -> PrMetadata {
    PrMetadata {
        repo_owner: "acme".into(),
        repo_name: "widget".into(),
        head_repo_owner: "fork-u".into(),
        head_repo_name: "widget".into(),
        pr_number: 42,
        head_sha: "abc".into(),
        title: "t".into(),
        body: "b".into(),
        source_branch: "feat-x".into(),
        target_branch: "main".into(),
        url: "https://example.com/pr/42".into(),
        local_path: "/tmp/acme-widget-pr42".into(),
    }
}

/// Spawns a one-shot HTTP server on an OS-assigned port that replies with a
/// fixed status and body to the first request it receives, then returns.
fn spawn_one_shot_server(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let addr = listener.local_addr().expect("local addr");

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept connection");
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf);
        let response = format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes());
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn describe_parses_successful_response() {
    let url = spawn_one_shot_server(
        "HTTP/1.1 200 OK",
        r#"{"description_markdown":"adds a widget"}"#,
    );
    let client = review_clients::PrAgentClient::new(reqwest::Client::new(), url);

    let result = client.describe(&sample_pr()).await.unwrap();
    assert_eq!(result, "adds a widget");
}

#[tokio::test]
async fn describe_maps_non_2xx_to_protocol_error() {
    let url = spawn_one_shot_server("HTTP/1.1 500 Internal Server Error", "oops");
    let client = review_clients::PrAgentClient::new(reqwest::Client::new(), url);

    let err = client.describe(&sample_pr()).await.unwrap_err();
    assert_eq!(err.http_status(), 500);
}

#[tokio::test]
async fn describe_against_unreachable_host_is_transport_error() {
    // Port 1 on localhost should refuse immediately rather than hang.
    let client = review_clients::PrAgentClient::new(
        reqwest::Client::new(),
        "http://127.0.0.1:1".to_string(),
    );
    let err = client.describe(&sample_pr()).await.unwrap_err();
    assert_eq!(err.http_status(), 500);
}
