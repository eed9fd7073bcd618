//! HTTP handler functions for the climate risk API.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, web};
use climate_risk_engine::{
    DEFAULT_ASSET_VALUE, ValidationError, parse_building_type, parse_hazard,
};
use climate_risk_server_models::{
    ApiError, ApiExample, ApiHealth, ApiServiceInfo, AssessRequest, CountryAssessRequest,
    HealthStatus,
};

use crate::AppState;

/// `GET /`
///
/// Describes the service, its data sources and endpoints.
pub async fn index() -> HttpResponse {
    let data_sources = BTreeMap::from([
        (
            "hurricanes".to_string(),
            "NOAA IBTrACS (1974-2024, 50 years)".to_string(),
        ),
        (
            "floods".to_string(),
            "WRI Aqueduct Floods (100-year return period)".to_string(),
        ),
        (
            "climate_extremes".to_string(),
            "HadEX3 (1901-2018, 118 years)".to_string(),
        ),
    ]);

    let endpoints = BTreeMap::from([
        (
            "/assess".to_string(),
            "POST - Comprehensive climate risk assessment".to_string(),
        ),
        (
            "/assess/country".to_string(),
            "POST - Country-level climate risk assessment".to_string(),
        ),
        (
            "/assess/{hazard}".to_string(),
            "POST - Single hazard (hurricane, flood, heat, drought, precipitation)".to_string(),
        ),
        ("/health".to_string(), "GET - API health check".to_string()),
    ]);

    HttpResponse::Ok().json(ApiServiceInfo {
        name: "Climate Risk Assessment API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Expected annual loss and 30-year present value from five climate hazards"
            .to_string(),
        data_sources,
        endpoints,
        example: ApiExample {
            endpoint: "/assess".to_string(),
            method: "POST".to_string(),
            body: AssessRequest {
                latitude: 25.76,
                longitude: -80.19,
                asset_value: Some(DEFAULT_ASSET_VALUE),
                building_type: Some("wood_frame".to_string()),
            },
        },
    })
}

/// `GET /health`
///
/// Reports which datasets loaded. Responds 503 when none did.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let datasets = state.engine.status();
    let status = if datasets.any_loaded() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };

    let body = ApiHealth {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        datasets,
    };

    match status {
        HealthStatus::Healthy => HttpResponse::Ok().json(body),
        HealthStatus::Unhealthy => HttpResponse::ServiceUnavailable().json(body),
    }
}

/// `POST /assess`
///
/// Full five-hazard assessment at a coordinate.
pub async fn assess(state: web::Data<AppState>, body: web::Json<AssessRequest>) -> HttpResponse {
    let building_type = parse_building_type(body.building_type.as_deref());
    let asset_value = body.asset_value.unwrap_or(DEFAULT_ASSET_VALUE);

    match state
        .engine
        .assess(body.latitude, body.longitude, asset_value, building_type)
    {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => validation_error(&e),
    }
}

/// `POST /assess/country`
///
/// Full assessment at a country's population-weighted center.
pub async fn assess_country(
    state: web::Data<AppState>,
    body: web::Json<CountryAssessRequest>,
) -> HttpResponse {
    let Some(countries) = state.countries.as_ref() else {
        log::error!("Country assessment requested but no country lookup is loaded");
        return HttpResponse::InternalServerError()
            .json(ApiError::new("Country lookup data not available"));
    };

    let location = match countries.resolve(&body.country) {
        Ok(location) => location,
        Err(e) => return validation_error_with_countries(&e, countries.names()),
    };

    let building_type = parse_building_type(body.building_type.as_deref());
    let asset_value = body.asset_value.unwrap_or(DEFAULT_ASSET_VALUE);

    match state
        .engine
        .assess_location(&location, asset_value, building_type)
    {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => validation_error(&e),
    }
}

/// `POST /assess/{hazard}`
///
/// Single-hazard assessment at a coordinate.
pub async fn assess_hazard(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AssessRequest>,
) -> HttpResponse {
    let kind = match parse_hazard(&path) {
        Ok(kind) => kind,
        Err(e) => return validation_error(&e),
    };

    let building_type = parse_building_type(body.building_type.as_deref());
    let asset_value = body.asset_value.unwrap_or(DEFAULT_ASSET_VALUE);

    match state.engine.assess_hazard(
        kind,
        body.latitude,
        body.longitude,
        asset_value,
        building_type,
    ) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => validation_error(&e),
    }
}

/// Maps a validation error to its HTTP response.
fn validation_error(e: &ValidationError) -> HttpResponse {
    log::debug!("Rejected request: {e}");
    match e {
        ValidationError::UnknownCountry(_) => {
            HttpResponse::NotFound().json(ApiError::new(e.to_string()))
        }
        ValidationError::UnknownHazard(_) => {
            HttpResponse::BadRequest().json(ApiError::unknown_hazard(e.to_string()))
        }
        ValidationError::Latitude(_)
        | ValidationError::Longitude(_)
        | ValidationError::AssetValue(_) => {
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
    }
}

fn validation_error_with_countries(e: &ValidationError, countries: Vec<String>) -> HttpResponse {
    match e {
        ValidationError::UnknownCountry(_) => {
            log::debug!("Rejected request: {e}");
            HttpResponse::NotFound().json(ApiError::unknown_country(e.to_string(), countries))
        }
        _ => validation_error(e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use climate_risk_datasets::{ClimateGridIndex, DatasetIndexes, HurricaneTrackIndex};
    use climate_risk_resolver::RegionTable;
    use serde_json::{Value, json};

    use super::*;
    use crate::configure;
    use crate::country::CountryLookup;

    const COUNTRIES: &str = r#"{
        "France": {"population_weighted": {"name": "Paris region", "latitude": 48.5, "longitude": 2.5}},
        "Kenya": {"population_weighted": {"name": "Nairobi region", "latitude": -0.9, "longitude": 36.9}}
    }"#;

    fn state(datasets: DatasetIndexes, countries: Option<CountryLookup>) -> web::Data<AppState> {
        web::Data::new(AppState {
            engine: climate_risk_engine::RiskEngine::new(
                Arc::new(datasets),
                RegionTable::embedded().unwrap(),
            ),
            countries,
        })
    }

    fn default_state() -> web::Data<AppState> {
        state(
            DatasetIndexes::default(),
            Some(CountryLookup::from_json_str(COUNTRIES).unwrap()),
        )
    }

    #[actix_web::test]
    async fn index_describes_the_service() {
        let app =
            test::init_service(App::new().app_data(default_state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["name"], "Climate Risk Assessment API");
        assert!(body["endpoints"]["/assess"].is_string());
        assert!(body["data_sources"]["hurricanes"].is_string());
        assert_eq!(body["example"]["body"]["latitude"], 25.76);
    }

    #[actix_web::test]
    async fn health_is_unavailable_without_datasets() {
        let app =
            test::init_service(App::new().app_data(default_state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["hadex3_loaded"], 0);
    }

    #[actix_web::test]
    async fn health_is_ok_with_any_dataset() {
        let datasets = DatasetIndexes::new(
            ClimateGridIndex::default(),
            Some(HurricaneTrackIndex::new(vec![])),
            None,
        );
        let app =
            test::init_service(App::new().app_data(state(datasets, None)).configure(configure))
                .await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["hurricane_data"], true);
        assert_eq!(body["flood_data"], false);
    }

    #[actix_web::test]
    async fn assess_returns_full_breakdown_with_defaults() {
        let app =
            test::init_service(App::new().app_data(default_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/assess")
            .set_json(json!({ "latitude": 48.85, "longitude": 2.35 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["asset_value"], 1_000_000.0);
        assert_eq!(body["parameters"]["building_type"], "wood_frame");
        assert_eq!(body["parameters"]["time_horizon"], 30);
        for key in ["hurricane", "flood", "heat_stress", "drought", "extreme_precipitation"] {
            assert!(body["risk_breakdown"][key]["confidence"].is_string(), "{key}");
        }
        assert!(body.get("country").is_none());
    }

    #[actix_web::test]
    async fn invalid_coordinates_are_rejected() {
        let app =
            test::init_service(App::new().app_data(default_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/assess")
            .set_json(json!({ "latitude": 95.0, "longitude": 0.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().is_some_and(|e| e.contains("Latitude")));
    }

    #[actix_web::test]
    async fn malformed_body_is_a_json_error() {
        let app =
            test::init_service(App::new().app_data(default_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/assess")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"latitude\": \"north\"}")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn single_hazard_route_returns_one_assessment() {
        let app =
            test::init_service(App::new().app_data(default_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/assess/heat")
            .set_json(json!({
                "latitude": 48.85,
                "longitude": 2.35,
                "building_type": "concrete"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["confidence"], "Regional Baseline");
        assert!(body["annual_loss"].as_f64().is_some_and(|loss| loss >= 0.0));
    }

    #[actix_web::test]
    async fn unknown_hazard_lists_accepted_names() {
        let app =
            test::init_service(App::new().app_data(default_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/assess/tornado")
            .set_json(json!({ "latitude": 0.0, "longitude": 0.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["available"].as_array().map(Vec::len), Some(5));
    }

    #[actix_web::test]
    async fn country_assessment_echoes_the_center() {
        let app =
            test::init_service(App::new().app_data(default_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/assess/country")
            .set_json(json!({ "country": "France", "asset_value": 250_000.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["country"], "France");
        assert_eq!(body["assessment_type"], "population_weighted");
        assert_eq!(body["location"]["name"], "Paris region");
        assert_eq!(body["asset_value"], 250_000.0);
    }

    #[actix_web::test]
    async fn unknown_country_is_not_found() {
        let app =
            test::init_service(App::new().app_data(default_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/assess/country")
            .set_json(json!({ "country": "Atlantis" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["total_countries"], 2);
        assert_eq!(body["available_countries"], json!(["France", "Kenya"]));
    }

    #[actix_web::test]
    async fn country_route_without_lookup_is_a_server_error() {
        let app = test::init_service(
            App::new()
                .app_data(state(DatasetIndexes::default(), None))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/assess/country")
            .set_json(json!({ "country": "France" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Country lookup data not available");
    }
}
