use std::io::Cursor;

use ballgame::config::Config;
use ballgame::game::Lineup;
use ballgame::server::api::simulate_payload_with;
use ballgame::server::routes::route_request;
use ballgame::server::{read_request, ReadOutcome, MAX_BODY_BYTES, MAX_HEADERS};

fn sheet_json(text: &str, name: &str) -> serde_json::Value {
    let lineup = Lineup::parse(text, name).expect("fixture parses");
    serde_json::to_value(lineup.to_sheet()).expect("sheet serializes")
}

fn request_body(sims: Option<u32>, seed: u64) -> String {
    let mut body = serde_json::json!({
        "away": sheet_json(include_str!("fixtures/harbor_cats.txt"), "away"),
        "home": sheet_json(include_str!("fixtures/river_hawks.txt"), "home"),
        "seed": seed,
    });
    if let Some(sims) = sims {
        body["sims"] = serde_json::json!(sims);
    }
    body.to_string()
}

#[test]
fn health_endpoint_returns_ok_json() {
    let response = route_request("GET", "/api/health", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/json");
    assert!(response.body.contains("\"status\": \"ok\""));
}

#[test]
fn simulate_endpoint_returns_summary() {
    let response = route_request("POST", "/api/simulate", &request_body(Some(1500), 7));
    assert_eq!(response.status_code, 200, "{}", response.body);

    let payload: serde_json::Value =
        serde_json::from_str(&response.body).expect("response should be valid json");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["sims"], 1500);
    assert_eq!(payload["seed"], 7);
    assert_eq!(payload["summary"]["games"], 1500);
    let hwp = payload["summary"]["home_win_probability"].as_f64().expect("number");
    let awp = payload["summary"]["away_win_probability"].as_f64().expect("number");
    assert!((hwp + awp - 1.0).abs() < 1e-9);
}

#[test]
fn simulate_endpoint_is_deterministic_per_seed() {
    let a = route_request("POST", "/api/simulate", &request_body(Some(800), 3));
    let b = route_request("POST", "/api/simulate", &request_body(Some(800), 3));
    let c = route_request("POST", "/api/simulate", &request_body(Some(800), 4));
    assert_eq!(a.body, b.body);
    assert_ne!(a.body, c.body);
}

#[test]
fn sharded_request_counts_every_game() {
    let mut body: serde_json::Value =
        serde_json::from_str(&request_body(Some(1000), 9)).expect("json");
    body["shards"] = serde_json::json!(4);
    let response = route_request("POST", "/api/simulate", &body.to_string());
    assert_eq!(response.status_code, 200, "{}", response.body);
    let payload: serde_json::Value = serde_json::from_str(&response.body).expect("json");
    assert_eq!(payload["shards"], 4);
    assert_eq!(payload["summary"]["games"], 1000);
}

#[test]
fn omitted_sims_fall_back_to_configured_default() {
    let config = Config {
        sims: 37,
        ..Config::default()
    };
    let payload = simulate_payload_with(&request_body(None, 5), &config).expect("simulates");
    let payload: serde_json::Value = serde_json::from_str(&payload).expect("json");
    assert_eq!(payload["sims"], 37);
    assert_eq!(payload["summary"]["games"], 37);

    let payload = simulate_payload_with(&request_body(Some(12), 5), &config).expect("simulates");
    let payload: serde_json::Value = serde_json::from_str(&payload).expect("json");
    assert_eq!(payload["sims"], 12);
}

#[test]
fn simulate_endpoint_rejects_out_of_range_sims() {
    let response = route_request("POST", "/api/simulate", &request_body(Some(0), 1));
    assert_eq!(response.status_code, 400);
    let payload: serde_json::Value = serde_json::from_str(&response.body).expect("json");
    assert_eq!(payload["errors"][0]["field"], "sims");

    let response = route_request("POST", "/api/simulate", &request_body(Some(2_000_000), 1));
    assert_eq!(response.status_code, 400);
}

#[test]
fn simulate_endpoint_rejects_short_lineup() {
    let mut body: serde_json::Value =
        serde_json::from_str(&request_body(Some(10), 1)).expect("json");
    body["home"]["batters"]
        .as_array_mut()
        .expect("batters array")
        .truncate(8);
    let response = route_request("POST", "/api/simulate", &body.to_string());
    assert_eq!(response.status_code, 400);
    let payload: serde_json::Value = serde_json::from_str(&response.body).expect("json");
    assert_eq!(payload["errors"][0]["field"], "home");
}

#[test]
fn simulate_endpoint_rejects_inconsistent_pitcher() {
    let mut body: serde_json::Value =
        serde_json::from_str(&request_body(Some(10), 1)).expect("json");
    body["home"]["pitcher"]["BB"] = serde_json::json!(780.0);
    let response = route_request("POST", "/api/simulate", &body.to_string());
    assert_eq!(response.status_code, 400, "{}", response.body);
    let payload: serde_json::Value = serde_json::from_str(&response.body).expect("json");
    assert_eq!(payload["errors"][0]["field"], "matchup");
}

#[test]
fn malformed_body_is_bad_request() {
    let response = route_request("POST", "/api/simulate", "{not json");
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("Invalid request body"));
}

#[test]
fn unknown_route_is_not_found() {
    assert_eq!(route_request("GET", "/api/nope", "").status_code, 404);
    assert_eq!(route_request("GET", "/api/simulate", "").status_code, 405);
}

#[test]
fn request_reader_returns_method_path_and_body() {
    let raw = "POST /api/simulate HTTP/1.1\r\nHost: x\r\nContent-Length: 5\r\n\r\nhello";
    match read_request(&mut Cursor::new(raw)).expect("reads") {
        ReadOutcome::Request(request) => {
            assert_eq!(request.method, "POST");
            assert_eq!(request.path, "/api/simulate");
            assert_eq!(request.body, "hello");
        }
        _ => panic!("expected a request"),
    }
    assert!(matches!(
        read_request(&mut Cursor::new("")).expect("reads"),
        ReadOutcome::Closed
    ));
}

#[test]
fn oversized_body_is_refused_with_413() {
    let raw = format!(
        "POST /api/simulate HTTP/1.1\r\nContent-Length: {}\r\n\r\n{{}}",
        MAX_BODY_BYTES + 1
    );
    match read_request(&mut Cursor::new(raw)).expect("reads") {
        ReadOutcome::Reject(response) => {
            assert_eq!(response.status_code, 413);
            assert!(response.body.contains("limit"));
        }
        _ => panic!("expected a rejection"),
    }
}

#[test]
fn header_flood_is_refused_with_431() {
    let mut raw = String::from("GET /api/health HTTP/1.1\r\n");
    for i in 0..=MAX_HEADERS {
        raw.push_str(&format!("X-Filler-{i}: y\r\n"));
    }
    raw.push_str("\r\n");
    match read_request(&mut Cursor::new(raw)).expect("reads") {
        ReadOutcome::Reject(response) => assert_eq!(response.status_code, 431),
        _ => panic!("expected a rejection"),
    }
}

#[test]
fn non_numeric_content_length_is_bad_request() {
    let raw = "POST /api/simulate HTTP/1.1\r\nContent-Length: lots\r\n\r\n";
    match read_request(&mut Cursor::new(raw)).expect("reads") {
        ReadOutcome::Reject(response) => assert_eq!(response.status_code, 400),
        _ => panic!("expected a rejection"),
    }
}
