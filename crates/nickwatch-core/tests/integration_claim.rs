//! Integration test: the real curl client against a local scripted API.
//!
//! Runs the monitor end to end (preflight GET, claim PUTs, classification,
//! retry waits) with a virtual clock so cool-downs do not slow the suite.

mod common;

use common::virtual_clock::VirtualClock;
use nickwatch_core::client::{AccountApi, ApiClient};
use nickwatch_core::config::MonitorConfig;
use nickwatch_core::control::CancelToken;
use nickwatch_core::monitor::{ConnectivityError, Monitor, MonitorSettings, RunOutcome};
use nickwatch_core::retry::{AttemptResult, Outcome};
use std::time::Duration;

fn config(base: &str, interval: u64) -> MonitorConfig {
    let mut cfg = MonitorConfig::continuous("test-token", 42, "wanted", interval);
    cfg.api_base = Some(base.to_string());
    cfg
}

fn run(cfg: &MonitorConfig, clock: &VirtualClock) -> RunOutcome {
    let client = ApiClient::new(cfg.api_base(), &cfg.api_token, cfg.user_id).unwrap();
    let mut monitor = Monitor::new(client, clock, CancelToken::new(), MonitorSettings::from(cfg));
    monitor.run()
}

#[test]
fn taken_then_claimed_over_http() {
    let server = common::api_server::start(vec![
        (200, r#"{"user":{"user_id":42}}"#),
        (400, r#"{"errors":{"username":"This username is already taken"}}"#),
        (200, r#"{"user":{"username":"wanted"}}"#),
    ]);
    let clock = VirtualClock::new();
    let out = run(&config(&server.base_url, 5), &clock);

    assert!(matches!(out, RunOutcome::Claimed { attempts: 2 }), "{out:?}");
    assert_eq!(clock.total_slept(), Duration::from_secs(5));

    let reqs = server.requests();
    assert_eq!(reqs.len(), 3);
    assert_eq!(reqs[0].method, "GET");
    assert_eq!(reqs[0].path, "/users/42");
    for put in &reqs[1..] {
        assert_eq!(put.method, "PUT");
        assert_eq!(put.path, "/users/42");
        assert_eq!(put.authorization.as_deref(), Some("Bearer test-token"));
        assert_eq!(put.content_type.as_deref(), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(&put.body).unwrap();
        assert_eq!(body, serde_json::json!({"username": "wanted"}));
    }
}

#[test]
fn unauthorized_preflight_never_puts() {
    let server = common::api_server::start(vec![(401, r#"{"errors":["Invalid token"]}"#)]);
    let clock = VirtualClock::new();
    let out = run(&config(&server.base_url, 5), &clock);

    assert!(matches!(
        out,
        RunOutcome::PreflightFailed(ConnectivityError::InvalidToken)
    ));
    assert_eq!(server.count("PUT"), 0);
    assert_eq!(clock.total_slept(), Duration::ZERO);
}

#[test]
fn rate_limited_waits_a_minute_with_one_second_interval() {
    let server = common::api_server::start(vec![
        (200, "{}"),
        (429, ""),
        (403, r#"{"errors":["Имя пользователя пока занято"]}"#),
        (200, "{}"),
    ]);
    let clock = VirtualClock::new();
    let out = run(&config(&server.base_url, 1), &clock);

    assert!(matches!(out, RunOutcome::Claimed { attempts: 3 }), "{out:?}");
    assert_eq!(clock.total_slept(), Duration::from_secs(60 + 1));
}

#[test]
fn unreachable_host_is_a_network_error() {
    // Bind then drop to get a port nobody listens on.
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let mut client = ApiClient::new(&format!("http://127.0.0.1:{port}"), "t", 1).unwrap();
    let err = client.claim("wanted").unwrap_err();
    assert!(err.is_network(), "{err}");
    let attempt = AttemptResult::network_error(&err);
    assert_eq!(attempt.status_code, 0);
    assert_eq!(attempt.outcome, Outcome::NetworkError);
}
