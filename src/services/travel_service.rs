use std::error::Error;
use std::fmt;

use chrono::Duration;
use log::warn;

use crate::models::travel_plan::{DailyPlan, DayLabel, TravelPlanRequest, TripDuration};
use crate::services::llm_service::{LlmService, LlmServiceError};
use crate::services::prompt_builder;
use crate::services::response_recovery::{self, RecoveredPlan, UnparsableResponse};

/// Upper bound on trip length. Longer requests produce pathological prompts
/// and responses, so the day count is clamped here.
const MAX_TRAVEL_DAYS: i64 = 30;

#[derive(Debug)]
pub enum TravelPlanError {
    InvalidRequest(String),
    Upstream(LlmServiceError),
    Unparsable(UnparsableResponse),
}

impl fmt::Display for TravelPlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelPlanError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            TravelPlanError::Upstream(err) => write!(f, "Upstream error: {}", err),
            TravelPlanError::Unparsable(err) => write!(f, "{}", err),
        }
    }
}

impl Error for TravelPlanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TravelPlanError::InvalidRequest(_) => None,
            TravelPlanError::Upstream(err) => Some(err),
            TravelPlanError::Unparsable(err) => Some(err),
        }
    }
}

impl From<LlmServiceError> for TravelPlanError {
    fn from(err: LlmServiceError) -> Self {
        TravelPlanError::Upstream(err)
    }
}

impl From<UnparsableResponse> for TravelPlanError {
    fn from(err: UnparsableResponse) -> Self {
        TravelPlanError::Unparsable(err)
    }
}

/// Generation result before the transport layer wraps it with a plan id and
/// echoed request fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelPlan {
    pub overview: String,
    pub daily_plans: Vec<DailyPlan>,
}

#[derive(Clone)]
pub struct TravelService {
    llm: LlmService,
}

impl TravelService {
    pub fn new(llm: LlmService) -> Self {
        Self { llm }
    }

    pub fn from_env() -> Result<Self, TravelPlanError> {
        Ok(Self::new(LlmService::from_env()?))
    }

    /// Generate a plan for one trip request: validate the day count, build
    /// the prompt, run one completion, recover the plan from whatever text
    /// came back.
    pub async fn generate_plan(
        &self,
        request: &TravelPlanRequest,
    ) -> Result<TravelPlan, TravelPlanError> {
        let travel_days = validated_day_count(request)?;
        let prompt = prompt_builder::build_prompt(request, travel_days);

        let content = self.llm.complete(&prompt).await?;
        let recovered = response_recovery::recover_plan(&content)?;

        if recovered.daily_plans.len() != travel_days as usize {
            warn!(
                "model returned {} daily plans for a {}-day trip",
                recovered.daily_plans.len(),
                travel_days
            );
        }

        Ok(into_travel_plan(request, recovered))
    }
}

fn validated_day_count(request: &TravelPlanRequest) -> Result<u32, TravelPlanError> {
    let days = request.duration.day_count();
    if days < 1 {
        return Err(TravelPlanError::InvalidRequest(format!(
            "trip must cover at least one day, got {}",
            days
        )));
    }
    Ok(days.min(MAX_TRAVEL_DAYS) as u32)
}

/// Turn the wire-format plan into the response model, labelling each day with
/// an absolute date when the request gave a date range, or with the model's
/// 1-based index when it gave a day count. POI order is kept as generated.
fn into_travel_plan(request: &TravelPlanRequest, recovered: RecoveredPlan) -> TravelPlan {
    let daily_plans = recovered
        .daily_plans
        .into_iter()
        .map(|day| DailyPlan {
            day: match &request.duration {
                TripDuration::DateRange { start_date, .. } => DayLabel::Date {
                    date: *start_date + Duration::days(day.day as i64 - 1),
                },
                TripDuration::Days { .. } => DayLabel::Index { day: day.day },
            },
            description: day.description,
            poi_list: day.poi_list,
        })
        .collect();

    TravelPlan {
        overview: recovered.overview,
        daily_plans,
    }
}
