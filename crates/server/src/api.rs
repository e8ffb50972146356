//! HTTP API for profiles, workouts, statistics and coaching
//!
//! Also serves the health, readiness and Prometheus endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use coach_lib::{
    health::{components, ComponentStatus, HealthRegistry},
    observability::render_metrics,
    stats::{round_to, UserStats},
    store::UserRepository,
    Coach, CoachError, CoachMetrics, CoachingRequest, MessageSource, NewProfile, NewWorkout,
    RecentPerformance, RiskTier, StoreError, StructuredLogger, UserProfile, ValidationError,
    WorkoutLog,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Request-level limits
#[derive(Debug, Clone, Copy)]
pub struct ApiSettings {
    pub min_history: usize,
    pub history_limit: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            min_history: 3,
            history_limit: 30,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub coach: Coach,
    pub store: Arc<dyn UserRepository>,
    pub health_registry: HealthRegistry,
    pub metrics: CoachMetrics,
    pub logger: StructuredLogger,
    pub settings: ApiSettings,
}

impl AppState {
    pub fn new(
        coach: Coach,
        store: Arc<dyn UserRepository>,
        health_registry: HealthRegistry,
        metrics: CoachMetrics,
        logger: StructuredLogger,
        settings: ApiSettings,
    ) -> Self {
        Self {
            coach,
            store,
            health_registry,
            metrics,
            logger,
            settings,
        }
    }

    /// Mirror a store write outcome into the store health component
    async fn track_store_write<T>(&self, result: Result<T, StoreError>) -> Result<T, StoreError> {
        match &result {
            Ok(_) => self.health_registry.set_healthy(components::STORE).await,
            Err(e @ (StoreError::Io(_) | StoreError::Serialization(_))) => {
                self.health_registry
                    .set_unhealthy(
                        components::STORE,
                        format!("{} store write failed: {}", self.store.backend(), e),
                    )
                    .await
            }
            // Rejected requests say nothing about the backend
            Err(_) => {}
        }
        result
    }
}

/// Errors returned to API callers as `{error, code}`
#[derive(Debug)]
pub enum ApiError {
    Coach(CoachError),
    NotEnoughHistory { required: usize, available: usize },
    BadBody(StatusCode, String),
    Internal(String),
}

impl From<CoachError> for ApiError {
    fn from(e: CoachError) -> Self {
        ApiError::Coach(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Coach(e.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Coach(e.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.status(), rejection.body_text())
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Coach(CoachError::Store(StoreError::UserNotFound(_))) => {
                (StatusCode::NOT_FOUND, "user_not_found", self.to_string())
            }
            ApiError::Coach(CoachError::Store(StoreError::DuplicateDate { .. })) => {
                (StatusCode::CONFLICT, "duplicate_date", self.to_string())
            }
            ApiError::Coach(CoachError::Store(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error", self.to_string())
            }
            ApiError::Coach(CoachError::InsufficientHistory) => {
                (StatusCode::BAD_REQUEST, "insufficient_history", self.to_string())
            }
            ApiError::Coach(CoachError::Validation(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", self.to_string())
            }
            ApiError::Coach(CoachError::ModelUnavailable(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "model_unavailable", self.to_string())
            }
            ApiError::NotEnoughHistory { .. } => {
                (StatusCode::BAD_REQUEST, "insufficient_history", self.to_string())
            }
            ApiError::BadBody(status, _) => (*status, "invalid_body", self.to_string()),
            ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", self.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Coach(e) => write!(f, "{}", e),
            ApiError::NotEnoughHistory {
                required,
                available,
            } => write!(
                f,
                "at least {} days of workout history are required, found {}",
                required, available
            ),
            ApiError::BadBody(_, text) => write!(f, "{}", text),
            ApiError::Internal(text) => write!(f, "{}", text),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            error!(code = code, error = %message, "Request failed");
        }
        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ProfileCreated {
    pub message: String,
    pub profile: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct WorkoutRecorded {
    pub message: String,
    pub date: NaiveDate,
    pub workout_completed: bool,
    pub difficulty: u8,
    pub duration_minutes: u32,
    pub total_records: usize,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutHistory {
    pub total_records: usize,
    pub recent_records: Vec<WorkoutLog>,
}

/// Coaching result as returned to callers
#[derive(Debug, Serialize)]
pub struct CoachingResponse {
    pub user_name: String,
    /// Rounded to 4 decimals
    pub dropout_probability: f64,
    pub dropout_risk: RiskTier,
    pub current_difficulty: u8,
    pub recommended_difficulty: u8,
    pub ai_message: String,
    pub message_source: MessageSource,
    pub recent_performance: RecentPerformance,
    pub timestamp: String,
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Workout adherence coach API",
        "status": "running",
    }))
}

async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let users = state.store.list().await?;
    Ok(Json(json!({ "total": users.len(), "users": users })))
}

async fn create_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: Result<Json<NewProfile>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = payload?;
    let profile = body.into_profile(&user_id)?;
    let profile = state
        .track_store_write(state.store.upsert_profile(profile).await)
        .await?;

    state.metrics.inc_profiles_created();
    state
        .logger
        .log_profile_created(&profile.user_id, &profile.personality_type);

    Ok((
        StatusCode::CREATED,
        Json(ProfileCreated {
            message: format!("Profile saved for {}", profile.name),
            profile,
        }),
    ))
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.store.get(&user_id).await?.profile))
}

async fn record_workout(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: Result<Json<NewWorkout>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = payload?;
    let log = body.into_log(&user_id, Local::now().date_naive())?;
    let recorded = log.clone();

    let total_records = state
        .track_store_write(state.store.append_log(log).await)
        .await?;

    state.metrics.inc_workouts_recorded();
    state.logger.log_workout_recorded(
        &user_id,
        &recorded.date.to_string(),
        recorded.workout_completed,
        total_records,
    );

    let outcome = if recorded.workout_completed {
        "success"
    } else {
        "that's okay, tomorrow is another day"
    };

    Ok((
        StatusCode::CREATED,
        Json(WorkoutRecorded {
            message: format!("Workout recorded: {}", outcome),
            date: recorded.date,
            workout_completed: recorded.workout_completed,
            difficulty: recorded.difficulty,
            duration_minutes: recorded.duration_minutes,
            total_records,
        }),
    ))
}

async fn workout_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<WorkoutHistory>> {
    let record = state.store.get(&user_id).await?;
    let limit = query.limit.unwrap_or(state.settings.history_limit);
    let total_records = record.logs.len();
    let recent_records = record.logs[total_records.saturating_sub(limit)..].to_vec();

    Ok(Json(WorkoutHistory {
        total_records,
        recent_records,
    }))
}

async fn user_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserStats>> {
    let record = state.store.get(&user_id).await?;
    Ok(Json(UserStats::from_record(&record)))
}

async fn coaching(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: Result<Json<CoachingRequest>, JsonRejection>,
) -> ApiResult<Json<CoachingResponse>> {
    let Json(request) = payload?;
    request.validate()?;

    let record = state.store.get(&user_id).await?;
    if record.logs.len() < state.settings.min_history {
        return Err(ApiError::NotEnoughHistory {
            required: state.settings.min_history,
            available: record.logs.len(),
        });
    }

    let started = Instant::now();
    let advice = state
        .coach
        .get_advice(&record.profile, &record.logs, request.current_condition)
        .await?;
    state
        .metrics
        .observe_advice_latency(started.elapsed().as_secs_f64());
    state
        .metrics
        .record_advice(advice.dropout_risk, advice.message_source);
    state
        .health_registry
        .record_message_source(advice.message_source)
        .await;

    state.logger.log_advice(
        &user_id,
        advice.dropout_probability,
        advice.dropout_risk,
        advice.current_difficulty,
        advice.recommended_difficulty,
        advice.message_source,
        state.coach.model_version(),
    );
    if advice.message_source.is_degraded() {
        state.logger.log_message_fallback(&user_id);
    }

    Ok(Json(CoachingResponse {
        user_name: record.profile.name,
        dropout_probability: round_to(advice.dropout_probability, 4),
        dropout_risk: advice.dropout_risk,
        current_difficulty: advice.current_difficulty,
        recommended_difficulty: advice.recommended_difficulty,
        ai_message: advice.message,
        message_source: advice.message_source,
        recent_performance: advice.recent_performance,
        timestamp: Local::now().to_rfc3339(),
    }))
}

/// 200 while operational, 503 once any component is unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

async fn metrics() -> ApiResult<impl IntoResponse> {
    let buffer = render_metrics().map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        buffer,
    ))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/users", get(list_users))
        .route("/users/:user_id/profile", post(create_profile).get(get_profile))
        .route(
            "/users/:user_id/workouts",
            post(record_workout).get(workout_history),
        )
        .route("/users/:user_id/stats", get(user_stats))
        .route("/users/:user_id/coaching", post(coaching))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve(
    addr: &str,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
