use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use smart_travel_api::config::LlmConfig;
use smart_travel_api::middleware::wx_auth::WxAuthMiddleware;
use smart_travel_api::routes;
use smart_travel_api::services::llm_service::LlmService;
use smart_travel_api::services::travel_service::TravelService;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8000;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    println!("Logger initialized");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let llm_config = LlmConfig::from_env().expect("LLM_API_KEY must be set");
    let travel_service = TravelService::new(LlmService::new(llm_config));

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .route("/health", web::get().to(|| async { "OK" }))
            .app_data(web::Data::new(travel_service.clone()))
            .service(
                web::scope("/api").service(
                    web::scope("/travel").wrap(WxAuthMiddleware).route(
                        "/generate-plan",
                        web::post().to(routes::travel_plan::generate_plan),
                    ),
                ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
