use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;

use crate::models::travel_plan::{TravelPlanRequest, TravelPlanResponse};
use crate::services::travel_service::{TravelPlanError, TravelService};

/*
    /api/travel/generate-plan
*/
pub async fn generate_plan(
    payload: web::Json<TravelPlanRequest>,
    service: web::Data<TravelService>,
) -> impl Responder {
    let request = payload.into_inner();

    match service.generate_plan(&request).await {
        Ok(plan) => {
            let response = TravelPlanResponse {
                plan_id: Uuid::new_v4().to_string(),
                city: request.city.clone(),
                center_location: request.center_location.clone(),
                duration: request.duration.clone(),
                travel_mode: request.travel_mode,
                overview: plan.overview,
                daily_plans: plan.daily_plans,
            };
            HttpResponse::Ok().json(response)
        }
        Err(TravelPlanError::InvalidRequest(msg)) => HttpResponse::BadRequest().body(msg),
        Err(err) => {
            eprintln!("Failed to generate travel plan: {}", err);
            HttpResponse::InternalServerError().body("Failed to generate travel plan")
        }
    }
}
