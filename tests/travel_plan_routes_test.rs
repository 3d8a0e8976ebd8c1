use actix_web::{test, web, App};
use serde_json::json;

use smart_travel_api::config::LlmConfig;
use smart_travel_api::middleware::wx_auth::WxAuthMiddleware;
use smart_travel_api::routes;
use smart_travel_api::services::llm_service::LlmService;
use smart_travel_api::services::travel_service::TravelService;

/// Service wired to an endpoint nothing listens on, so any test that reaches
/// the completion call fails fast with an upstream error.
fn unreachable_service() -> TravelService {
    TravelService::new(LlmService::new(LlmConfig {
        api_key: "test-key".to_string(),
        api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
        model: "moonshot-v1-auto".to_string(),
        temperature: 0.7,
        max_tokens: 256,
    }))
}

fn create_app(
    service: TravelService,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(service))
        .route("/health", web::get().to(|| async { "OK" }))
        .service(
            web::scope("/api").service(web::scope("/travel").route(
                "/generate-plan",
                web::post().to(routes::travel_plan::generate_plan),
            )),
        )
}

fn create_signed_app(
    service: TravelService,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(web::Data::new(service)).service(
        web::scope("/api").service(
            web::scope("/travel").wrap(WxAuthMiddleware).route(
                "/generate-plan",
                web::post().to(routes::travel_plan::generate_plan),
            ),
        ),
    )
}

fn day_count_request(travel_days: u32) -> serde_json::Value {
    json!({
        "center_location": {
            "latitude": 39.9087,
            "longitude": 116.3975,
            "name": "天安门"
        },
        "travel_days": travel_days,
        "travel_mode": "walking"
    })
}

#[actix_rt::test]
async fn test_health_check() {
    let app = test::init_service(create_app(unreachable_service())).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_rt::test]
async fn test_malformed_body_is_rejected() {
    let app = test::init_service(create_app(unreachable_service())).await;

    let req = test::TestRequest::post()
        .uri("/api/travel/generate-plan")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("not json at all")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_missing_duration_is_rejected() {
    let app = test::init_service(create_app(unreachable_service())).await;

    let req = test::TestRequest::post()
        .uri("/api/travel/generate-plan")
        .set_json(json!({
            "center_location": { "latitude": 39.9, "longitude": 116.4 }
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_zero_day_trip_is_rejected() {
    let app = test::init_service(create_app(unreachable_service())).await;

    let req = test::TestRequest::post()
        .uri("/api/travel/generate-plan")
        .set_json(day_count_request(0))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_upstream_failure_maps_to_generic_error() {
    let app = test::init_service(create_app(unreachable_service())).await;

    let req = test::TestRequest::post()
        .uri("/api/travel/generate-plan")
        .set_json(day_count_request(2))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let body = test::read_body(resp).await;
    assert_eq!(body, "Failed to generate travel plan");
}

#[actix_rt::test]
async fn test_unsigned_request_is_rejected() {
    std::env::set_var("DEBUG", "false");
    let app = test::init_service(create_signed_app(unreachable_service())).await;

    let req = test::TestRequest::post()
        .uri("/api/travel/generate-plan")
        .set_json(day_count_request(2))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_signed_request_passes_middleware() {
    std::env::set_var("DEBUG", "false");
    let app = test::init_service(create_signed_app(unreachable_service())).await;

    // Zero days fails validation inside the handler, which proves the
    // request made it through the signature check.
    let req = test::TestRequest::post()
        .uri("/api/travel/generate-plan")
        .insert_header(("signature", "sig"))
        .insert_header(("timestamp", "1700000000"))
        .insert_header(("nonce", "abc123"))
        .set_json(day_count_request(0))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
