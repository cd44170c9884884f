//! Provider wire-format and policy tests against a local mock HTTP server.

use httpmock::prelude::*;
use pantryline_core::{
    resolve_user_address, AssistantError, GeocodeProvider, GoogleGeocoder, NominatimGeocoder,
    ProviderKind,
};
use pantryline_core::address::normalize;
use serde_json::json;
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_secs(5);

fn google_body(lat: f64, lng: f64) -> serde_json::Value {
    json!({
        "status": "OK",
        "results": [{ "geometry": { "location": { "lat": lat, "lng": lng } } }]
    })
}

#[tokio::test]
async fn google_parses_first_result() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .query_param("address", "112 Alden Street, Syracuse, NY")
            .query_param("key", "test-key");
        then.status(200).json_body(google_body(43.0406, -76.1353));
    });

    let geocoder =
        GoogleGeocoder::with_base_url("test-key", server.url(""), TIMEOUT).unwrap();
    let coord = geocoder
        .geocode("112 Alden Street, Syracuse, NY")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(coord.provider, ProviderKind::Google);
    assert!((coord.lat - 43.0406).abs() < 1e-9);
    assert!((coord.lng + 76.1353).abs() < 1e-9);
    mock.assert();
}

#[tokio::test]
async fn google_zero_results_is_not_found_not_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(200)
            .json_body(json!({ "status": "ZERO_RESULTS", "results": [] }));
    });

    let geocoder = GoogleGeocoder::with_base_url("k", server.url(""), TIMEOUT).unwrap();
    assert!(geocoder.geocode("nowhere").await.unwrap().is_none());
}

#[tokio::test]
async fn google_server_failure_is_a_transport_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(500).body("upstream exploded");
    });

    let geocoder = GoogleGeocoder::with_base_url("k", server.url(""), TIMEOUT).unwrap();
    let err = geocoder.geocode("anywhere").await.unwrap_err();
    assert!(matches!(err, AssistantError::Transport(_)));
}

#[tokio::test]
async fn user_address_gets_exactly_one_locality_retry() {
    let server = MockServer::start();
    let miss = server.mock(|when, then| {
        when.method(GET).query_param("address", "712 Nowhere Lane");
        then.status(200)
            .json_body(json!({ "status": "ZERO_RESULTS", "results": [] }));
    });
    let hit = server.mock(|when, then| {
        when.method(GET)
            .query_param("address", "712 Nowhere Lane, Syracuse, NY");
        then.status(200).json_body(google_body(43.05, -76.15));
    });

    let geocoder = GoogleGeocoder::with_base_url("k", server.url(""), TIMEOUT).unwrap();
    // This address mentions no locality tokens, so the normalizer leaves it
    // alone only when no default locality is set; build the Address by hand
    // with the locality attached for the retry path.
    let mut address = normalize("712 Nowhere Lane", None).unwrap();
    address.default_locality = Some("Syracuse, NY".to_string());

    let coord = resolve_user_address(&geocoder, &address).await.unwrap();
    assert!((coord.lat - 43.05).abs() < 1e-9);
    miss.assert_hits(1);
    hit.assert_hits(1);
}

#[tokio::test]
async fn nominatim_parses_string_coordinates_and_sends_user_agent() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .header("user-agent", "PantryAssistant/1.0")
            .query_param("format", "json")
            .query_param("q", "742 Butternut St")
            .query_param("limit", "1");
        then.status(200)
            .json_body(json!([{ "lat": "43.0607", "lon": "-76.1521" }]));
    });

    let geocoder = NominatimGeocoder::with_base_url(server.url(""), TIMEOUT).unwrap();
    let coord = geocoder.geocode("742 Butternut St").await.unwrap().unwrap();
    assert_eq!(coord.provider, ProviderKind::Nominatim);
    assert!((coord.lat - 43.0607).abs() < 1e-9);
    mock.assert();
}

#[tokio::test]
async fn nominatim_empty_array_is_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(200).json_body(json!([]));
    });

    let geocoder = NominatimGeocoder::with_base_url(server.url(""), TIMEOUT).unwrap();
    assert!(geocoder.geocode("nowhere").await.unwrap().is_none());
}

#[tokio::test]
async fn nominatim_batch_is_serialized_with_request_gap() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET);
        then.status(200)
            .json_body(json!([{ "lat": "43.0", "lon": "-76.0" }]));
    });

    let geocoder = NominatimGeocoder::with_base_url(server.url(""), TIMEOUT).unwrap();
    let addresses = vec!["A St".to_string(), "B St".to_string()];

    let started = Instant::now();
    let coords = geocoder.geocode_batch(&addresses).await;
    let elapsed = started.elapsed();

    assert_eq!(coords.len(), 2);
    assert!(coords.iter().all(Option::is_some));
    mock.assert_hits(2);
    // Second request must wait out the fixed 1100 ms gap.
    assert!(
        elapsed >= Duration::from_millis(1100),
        "batch finished in {:?}, rate limit not honored",
        elapsed
    );
}

#[tokio::test]
async fn google_batch_absorbs_per_candidate_failures() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).query_param("address", "good");
        then.status(200).json_body(google_body(43.0, -76.0));
    });
    server.mock(|when, then| {
        when.method(GET).query_param("address", "bad");
        then.status(500).body("boom");
    });

    let geocoder = GoogleGeocoder::with_base_url("k", server.url(""), TIMEOUT).unwrap();
    let coords = geocoder
        .geocode_batch(&["good".to_string(), "bad".to_string()])
        .await;
    assert!(coords[0].is_some());
    assert!(coords[1].is_none());
}
