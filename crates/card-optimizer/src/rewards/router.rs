use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{BonusEntry, CardDraft, CardId};
use super::resolver::PlaceTypeLookup;
use super::service::{RewardsService, RewardsServiceError, SuggestionRequest};
use super::storage::KeyValueStore;

type SharedService<S, L> = Arc<RewardsService<S, L>>;

/// Body accepted when creating a card: a full draft, or a preset name plus credit line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category_bonuses: Vec<BonusEntry>,
    pub credit_line: f64,
    #[serde(default)]
    pub reward_multiplier: Option<f64>,
}

impl CreateCardRequest {
    /// Draft for the non-preset form; missing fields surface as validation errors.
    pub fn into_draft(self) -> CardDraft {
        CardDraft {
            name: self.name.unwrap_or_default(),
            category_bonuses: self.category_bonuses,
            credit_line: self.credit_line,
            reward_multiplier: self.reward_multiplier.unwrap_or(0.0),
        }
    }
}

/// Router builder exposing card management and suggestion endpoints.
pub fn rewards_router<S, L>(service: SharedService<S, L>) -> Router
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    Router::new()
        .route(
            "/api/v1/cards",
            get(list_handler::<S, L>)
                .post(create_handler::<S, L>)
                .delete(clear_handler::<S, L>),
        )
        .route("/api/v1/cards/:card_id", delete(remove_handler::<S, L>))
        .route("/api/v1/suggestions", post(suggest_handler::<S, L>))
        .route("/api/v1/categories", get(categories_handler::<S, L>))
        .route("/api/v1/presets", get(presets_handler::<S, L>))
        .with_state(service)
}

pub(crate) async fn list_handler<S, L>(State(service): State<SharedService<S, L>>) -> Response
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    match run_blocking(move || service.cards()).await {
        Ok(cards) => (StatusCode::OK, axum::Json(cards)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn create_handler<S, L>(
    State(service): State<SharedService<S, L>>,
    axum::Json(request): axum::Json<CreateCardRequest>,
) -> Response
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    let outcome = run_blocking(move || match request.preset.clone() {
        Some(preset) => service.add_from_preset(&preset, request.credit_line),
        None => service.add_card(request.into_draft()),
    })
    .await;

    match outcome {
        Ok(card) => (StatusCode::CREATED, axum::Json(card)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn remove_handler<S, L>(
    State(service): State<SharedService<S, L>>,
    Path(card_id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    let id = CardId(card_id);
    match run_blocking(move || service.remove_card(&id)).await {
        Ok(card) => (StatusCode::OK, axum::Json(card)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn clear_handler<S, L>(State(service): State<SharedService<S, L>>) -> Response
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    match run_blocking(move || service.clear_cards()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn suggest_handler<S, L>(
    State(service): State<SharedService<S, L>>,
    axum::Json(request): axum::Json<SuggestionRequest>,
) -> Response
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    match run_blocking(move || service.suggest(request)).await {
        Ok(suggestion) => (StatusCode::OK, axum::Json(suggestion)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn categories_handler<S, L>(
    State(service): State<SharedService<S, L>>,
) -> Response
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    let catalog = service.catalog();
    let payload = json!({
        "categories": catalog.categories(),
        "default": catalog.default_category(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn presets_handler<S, L>(State(service): State<SharedService<S, L>>) -> Response
where
    S: KeyValueStore + 'static,
    L: PlaceTypeLookup + ?Sized + 'static,
{
    (StatusCode::OK, axum::Json(service.catalog().presets().to_vec())).into_response()
}

/// Storage and geocoder calls block, so they run on the blocking pool.
async fn run_blocking<T, F>(task: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, RewardsServiceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(error_response(err)),
        Err(join_error) => {
            error!(error = %join_error, "rewards task aborted");
            let payload = json!({ "error": "request could not be completed" });
            Err((StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response())
        }
    }
}

pub(crate) fn error_response(err: RewardsServiceError) -> Response {
    let (status, message) = match &err {
        RewardsServiceError::Validation(_)
        | RewardsServiceError::InvalidAmount
        | RewardsServiceError::UnknownPreset(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        RewardsServiceError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        // Details are already logged by the service.
        RewardsServiceError::Storage(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to access stored cards".to_string(),
        ),
    };

    (status, axum::Json(json!({ "error": message }))).into_response()
}
