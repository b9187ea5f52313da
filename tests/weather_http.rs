#![cfg(feature = "live-weather")]
//! SMHI client against a mock HTTP server.

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use peer_energy_engine::domain::WeatherCondition;
use peer_energy_engine::forecast::{
    FallbackWeather, GeoLocation, ResilientWeather, SmhiWeatherSource, WeatherSource,
};

fn stockholm() -> GeoLocation {
    GeoLocation {
        latitude: 59.3293,
        longitude: 18.0686,
        name: Some("Stockholm".to_string()),
    }
}

fn forecast_body(cloud_oktas: f64, precipitation_mm: f64) -> serde_json::Value {
    json!({
        "approvedTime": "2024-06-12T11:00:00Z",
        "timeSeries": [
            {
                "validTime": "2024-06-12T12:00:00Z",
                "parameters": [
                    { "name": "t", "levelType": "hl", "level": 2, "unit": "Cel", "values": [21.5] },
                    { "name": "tcc_mean", "levelType": "hl", "level": 0, "unit": "octas", "values": [cloud_oktas] },
                    { "name": "ws", "levelType": "hl", "level": 10, "unit": "m/s", "values": [3.2] },
                    { "name": "pmean", "levelType": "hl", "level": 0, "unit": "kg/m2/h", "values": [precipitation_mm] }
                ]
            },
            {
                "validTime": "2024-06-12T13:00:00Z",
                "parameters": [
                    { "name": "t", "levelType": "hl", "level": 2, "unit": "Cel", "values": [30.0] }
                ]
            }
        ]
    })
}

#[tokio::test]
async fn parses_first_time_step() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/category/pmp3g/version/2/geotype/point/lon/18\.068600/lat/59\.329300/data\.json$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(2.0, 0.0)))
        .expect(1)
        .mount(&server)
        .await;

    let source = SmhiWeatherSource::new(server.uri(), Duration::from_secs(2));
    let obs = source.current(&stockholm()).await.unwrap();

    assert_eq!(obs.temperature_c, 21.5);
    assert_eq!(obs.cloud_cover_pct, 25.0);
    assert_eq!(obs.wind_speed_ms, 3.2);
    assert_eq!(
        obs.condition,
        WeatherCondition::from_cloud_cover(25.0, 0.0, 3.2)
    );
}

#[tokio::test]
async fn server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = SmhiWeatherSource::new(server.uri(), Duration::from_secs(2));
    let err = source.current(&stockholm()).await.unwrap_err();
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn empty_series_and_outage_fall_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "timeSeries": [] })))
        .mount(&server)
        .await;

    let at = NaiveDate::from_ymd_opt(2024, 6, 12)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let weather = ResilientWeather::new(
        Some(Box::new(SmhiWeatherSource::new(
            server.uri(),
            Duration::from_secs(2),
        ))),
        FallbackWeather::new(3),
    );
    assert_eq!(
        weather.observe(&stockholm(), at).await,
        FallbackWeather::new(3).observation_at(at)
    );
}

#[tokio::test]
async fn slow_feed_times_out_into_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body(8.0, 2.0))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let at = NaiveDate::from_ymd_opt(2024, 1, 3)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let weather = ResilientWeather::new(
        Some(Box::new(SmhiWeatherSource::new(
            server.uri(),
            Duration::from_millis(200),
        ))),
        FallbackWeather::new(11),
    );
    assert_eq!(
        weather.observe(&stockholm(), at).await,
        FallbackWeather::new(11).observation_at(at)
    );
}
