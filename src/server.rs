//! HTTP surface: translation, morphology, user registry and broadcast endpoints.

use crate::broadcast::{broadcast_word_of_the_day, BroadcastConfig};
use crate::config::Config;
use crate::error::{PracticeError, Result};
use crate::morphology::{Morphology, RemoteAnalyzer};
use crate::registry::{MemoryStore, UserRegistry};
use crate::report::{get_translation, Translation};
use crate::telegram::TelegramBot;
use crate::translate::http::build_client;
use crate::translate::Translator;
use crate::wotd::WordOfTheDaySource;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const STATUS_PAGE: &str = "<title>PracticeTurkish</title>\n<H1>The service is online.</H1>";
const NOT_FOUND_PAGE: &str = "<H1>Page not found</H1>";

/// State shared by all handlers. Everything inside is either immutable or
/// synchronises internally, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub translator: Translator,
    pub morphology: Option<Morphology>,
    pub registry: UserRegistry,
    pub bot: Option<Arc<TelegramBot>>,
    pub wotd: Arc<WordOfTheDaySource>,
    pub broadcast_pause: Duration,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let key = config
            .auth_key
            .clone()
            .ok_or_else(|| PracticeError::Config("auth key is required".to_string()))?;

        let client = build_client(config.api_timeout())?;
        let morphology = match config.morphology_url {
            Some(ref url) => Some(Morphology::new(Arc::new(RemoteAnalyzer::new(
                client.clone(),
                url.clone(),
            )))),
            None => {
                warn!("MORPHOLOGY_URL not set, morphology endpoints are disabled");
                None
            }
        };

        Ok(Self {
            translator: Translator::from_config(config)?,
            morphology,
            registry: UserRegistry::new(key, Arc::new(MemoryStore::new())),
            bot: config
                .telegram_bot_token
                .as_deref()
                .map(|token| Arc::new(TelegramBot::new(client.clone(), token))),
            wotd: Arc::new(WordOfTheDaySource::new(client)),
            broadcast_pause: config.broadcast_pause(),
        })
    }

    fn morphology(&self) -> Result<&Morphology> {
        self.morphology
            .as_ref()
            .ok_or(PracticeError::MorphologyUnavailable)
    }
}

/// Error wrapper turning [`PracticeError`] into an HTTP response.
pub struct ApiError(PracticeError);

impl From<PracticeError> for ApiError {
    fn from(e: PracticeError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            PracticeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            PracticeError::Unauthorized => StatusCode::UNAUTHORIZED,
            PracticeError::UnknownUser(_) => StatusCode::NOT_FOUND,
            PracticeError::MorphologyUnavailable | PracticeError::Config(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            PracticeError::Api(_) | PracticeError::Scrape(_) | PracticeError::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!("Request failed ({}): {}", status, self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Deserialize)]
pub struct WordRequest {
    pub word: String,
}

#[derive(Deserialize)]
pub struct KeyRequest {
    pub key: String,
}

#[derive(Deserialize)]
pub struct UserRequest {
    pub key: String,
    pub user_id: i64,
}

#[derive(Deserialize)]
pub struct TokenRequest {
    pub key: String,
    pub user_id: i64,
    pub token: String,
}

#[derive(Serialize)]
pub struct BroadcastReply {
    pub delivered: usize,
    pub failed: usize,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/translation", post(translate))
        .route("/morphology/check", post(check_if_interesting))
        .route("/morphology/analyze", post(analyze))
        .route("/users/get_token", post(get_token))
        .route("/users/check_token", post(check_token))
        .route("/users/subscribers", post(subscribers))
        .route("/users/subscribe", post(subscribe))
        .route("/users/unsubscribe", post(unsubscribe))
        .route("/wotd/broadcast", post(broadcast))
        .fallback(not_found)
        .with_state(state)
}

async fn status() -> Html<&'static str> {
    Html(STATUS_PAGE)
}

async fn not_found() -> (StatusCode, Html<&'static str>) {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE))
}

async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> ApiResult<Translation> {
    if request.text.trim().is_empty() {
        return Err(PracticeError::InvalidRequest("text must not be empty".to_string()).into());
    }
    Ok(Json(get_translation(&state.translator, &request.text).await))
}

async fn check_if_interesting(
    State(state): State<AppState>,
    Json(request): Json<WordRequest>,
) -> ApiResult<bool> {
    Ok(Json(state.morphology()?.check_if_interesting(&request.word).await?))
}

async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<WordRequest>,
) -> ApiResult<String> {
    Ok(Json(state.morphology()?.analyze(&request.word).await?))
}

async fn get_token(
    State(state): State<AppState>,
    Json(request): Json<UserRequest>,
) -> ApiResult<String> {
    Ok(Json(state.registry.new_user(&request.key, request.user_id).await?))
}

async fn check_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> ApiResult<bool> {
    Ok(Json(
        state
            .registry
            .check_token(&request.key, request.user_id, &request.token)
            .await?,
    ))
}

async fn subscribers(
    State(state): State<AppState>,
    Json(request): Json<KeyRequest>,
) -> ApiResult<Vec<i64>> {
    Ok(Json(state.registry.subscribers(&request.key).await?))
}

async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<UserRequest>,
) -> ApiResult<bool> {
    Ok(Json(state.registry.subscribe(&request.key, request.user_id).await?))
}

async fn unsubscribe(
    State(state): State<AppState>,
    Json(request): Json<UserRequest>,
) -> ApiResult<bool> {
    Ok(Json(state.registry.unsubscribe(&request.key, request.user_id).await?))
}

async fn broadcast(
    State(state): State<AppState>,
    Json(request): Json<KeyRequest>,
) -> ApiResult<BroadcastReply> {
    // Authorises the caller before anything is scraped or sent.
    state.registry.subscribers(&request.key).await?;
    let bot = state
        .bot
        .as_ref()
        .ok_or_else(|| PracticeError::Config("TELEGRAM_BOT_TOKEN not set".to_string()))?;

    let config = BroadcastConfig {
        pause: state.broadcast_pause,
        show_progress: false,
    };
    let result = broadcast_word_of_the_day(&state.wotd, &state.registry, bot, config).await?;
    Ok(Json(BroadcastReply {
        delivered: result.stats.delivered,
        failed: result.stats.failed,
    }))
}

/// Runs the service until Ctrl+C.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutting down");
            }
        })
        .await?;
    Ok(())
}
