#[path = "common/mod.rs"]
mod common;

use std::{
    io::{Read, Write},
    net::TcpListener,
    thread,
    time::Duration,
};

use common::refused_port;
use watchdogd::{
    config::ProbeEndpoint,
    error::ProbeError,
    probe::{HealthProbe, HttpProbe, TcpProbe},
};

/// Serves exactly one canned HTTP response on a fresh loopback port.
fn one_shot_http_server(response: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let port = listener.local_addr().expect("no local address").port();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request);
            let _ = stream.write_all(response.as_bytes());
        }
    });

    port
}

#[test]
fn tcp_probe_round_trips_against_a_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let port = listener.local_addr().expect("no local address").port();

    let probe = TcpProbe::new(
        ProbeEndpoint::new("127.0.0.1", port),
        Duration::from_secs(1),
    );

    let report = probe.probe().expect("probe failed");
    assert!(report.to_string().contains("accepted a connection"));
}

#[test]
fn tcp_probe_reports_refused_connection() {
    let probe = TcpProbe::new(
        ProbeEndpoint::new("127.0.0.1", refused_port()),
        Duration::from_secs(1),
    );

    assert!(matches!(probe.probe(), Err(ProbeError::Connect(_))));
}

#[test]
fn http_probe_accepts_a_2xx_response() {
    let port = one_shot_http_server(
        "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
    );

    let probe = HttpProbe::new(
        &ProbeEndpoint::new("127.0.0.1", port),
        "/",
        Duration::from_secs(2),
    )
    .expect("failed to build probe");

    let report = probe.probe().expect("probe failed");
    assert!(report.to_string().contains("200"));
}

#[test]
fn http_probe_treats_a_5xx_response_as_unhealthy() {
    let port = one_shot_http_server(
        "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
    );

    let probe = HttpProbe::new(
        &ProbeEndpoint::new("127.0.0.1", port),
        "/",
        Duration::from_secs(2),
    )
    .expect("failed to build probe");

    match probe.probe() {
        Err(ProbeError::Unhealthy(status)) => assert_eq!(status.as_u16(), 503),
        other => panic!("expected unhealthy verdict, got {other:?}"),
    }
}
