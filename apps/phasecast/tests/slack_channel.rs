//! Slack channel against a local stand-in for the Web API.
//!
//! The stub answers `chat.postMessage` with `{"ok":true}` unless the target
//! channel is in its reject list.

#![allow(clippy::unwrap_used, clippy::panic)]

mod common;

use common::started;
use phasecast::config::SlackSettings;
use phasecast::{ChannelError, NotificationChannel, SlackChannel};
use phasecast_core::{NotificationEvent, Phase};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

// =============================================================================
// STUB SERVER
// =============================================================================

#[derive(Debug, Clone)]
struct Seen {
    headers: String,
    body: Value,
}

async fn spawn_stub(reject: &'static [&'static str]) -> (String, Arc<Mutex<Vec<Seen>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let (headers, body) = read_request(&mut stream).await;
                let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
                let target = body["channel"].as_str().unwrap_or_default().to_string();
                log.lock().unwrap().push(Seen { headers, body });

                let reply = if reject.contains(&target.as_str()) {
                    r#"{"ok":false,"error":"channel_not_found"}"#
                } else {
                    r#"{"ok":true}"#
                };
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    reply.len(),
                    reply
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    (format!("http://{}/api", addr), seen)
}

async fn read_request(stream: &mut TcpStream) -> (String, Vec<u8>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return (String::new(), Vec::new());
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + length {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let end = buf.len().min(body_start + length);
    (headers, buf[body_start..end].to_vec())
}

fn channel(api_base: String) -> SlackChannel {
    let settings = SlackSettings {
        token: "xoxb-test".to_string(),
        target_channels: vec!["C1".to_string(), "C2".to_string()],
        api_base,
    };
    SlackChannel::from_settings(&settings, Duration::from_secs(5)).unwrap()
}

fn event() -> NotificationEvent {
    NotificationEvent::phase_transition(&started(), Phase::Ideas, Phase::Started)
}

// =============================================================================
// TESTS
// =============================================================================

#[tokio::test]
async fn posts_to_every_target() {
    let (base, seen) = spawn_stub(&[]).await;
    let slack = channel(base);

    slack.send(&CancellationToken::new(), &event()).await.unwrap();

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    let targets: Vec<&str> = seen
        .iter()
        .map(|s| s.body["channel"].as_str().unwrap())
        .collect();
    assert_eq!(targets, vec!["C1", "C2"]);
    for request in &seen {
        assert!(request.headers.starts_with("post /api/chat.postmessage"));
        assert!(request.headers.contains("authorization: bearer xoxb-test"));
        let text = request.body["text"].as_str().unwrap();
        assert!(text.contains("test-video"));
        assert!(text.contains("Ideas → Started"));
    }
}

#[tokio::test]
async fn one_accepting_target_is_enough() {
    let (base, seen) = spawn_stub(&["C1"]).await;
    let slack = channel(base);

    assert!(slack.send(&CancellationToken::new(), &event()).await.is_ok());
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn all_targets_rejected_is_an_error() {
    let (base, _seen) = spawn_stub(&["C1", "C2"]).await;
    let slack = channel(base);

    match slack.send(&CancellationToken::new(), &event()).await {
        Err(ChannelError::AllTargetsFailed { attempted, last }) => {
            assert_eq!(attempted, 2);
            assert!(matches!(
                *last,
                ChannelError::Rejected { service: "slack", ref reason } if reason == "channel_not_found"
            ));
        }
        other => panic!("expected AllTargetsFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_api_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let slack = channel(format!("http://{}/api", addr));
    match slack.send(&CancellationToken::new(), &event()).await {
        Err(ChannelError::AllTargetsFailed { last, .. }) => {
            assert!(matches!(*last, ChannelError::Transport(_)));
        }
        other => panic!("expected AllTargetsFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_token_stops_before_posting() {
    let (base, seen) = spawn_stub(&[]).await;
    let slack = channel(base);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = slack.send(&cancel, &event()).await;

    assert!(matches!(result, Err(ChannelError::Cancelled)));
    assert!(seen.lock().unwrap().is_empty());
}
