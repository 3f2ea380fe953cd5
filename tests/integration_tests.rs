//! Integration tests for the translation pipeline and the HTTP service
//!
//! Translation services are replaced by in-process fakes so the behaviour of
//! the aggregator and the routes can be checked deterministically.

use async_trait::async_trait;
use practice_turkish::error::FetchError;
use practice_turkish::language::Language;
use practice_turkish::translate::{ServiceTranslation, TranslationService, Translator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Answers `<name>:<text>` after an optional delay and counts its calls.
struct FakeService {
    name: &'static str,
    delay: Duration,
    pairs: Option<Vec<(Language, Language)>>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeService {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            delay: Duration::ZERO,
            pairs: None,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn delayed(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }

    fn only(mut self, pairs: Vec<(Language, Language)>) -> Self {
        self.pairs = Some(pairs);
        self
    }

    fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationService for FakeService {
    fn service_name(&self) -> &'static str {
        self.name
    }

    fn supported_languages(&self) -> Vec<(Language, Language)> {
        self.pairs.clone().unwrap_or_else(Language::all_pairs)
    }

    async fn translate(
        &self,
        text: &str,
        _src_code: &str,
        dst_code: &str,
    ) -> Result<Option<ServiceTranslation>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(FetchError::Timeout);
        }
        Ok(Some(ServiceTranslation::new(
            format!("{}:{}:{}", self.name, dst_code, text),
            format!("https://{}.test/{}", self.name, text),
        )))
    }
}

// ============================================================================
// Aggregator
// ============================================================================

mod aggregator_tests {
    use super::*;

    #[tokio::test]
    async fn test_no_service_called_when_language_undetected() {
        let service = Arc::new(FakeService::new("a"));
        let translator = Translator::new(vec![service.clone() as Arc<dyn TranslationService>]);

        assert!(translator.translate("¿qué tal?").await.is_none());
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_pair_is_never_requested() {
        let service = Arc::new(
            FakeService::new("ru-tr").only(vec![(Language::Turkish, Language::Russian)]),
        );
        let translator = Translator::new(vec![service.clone() as Arc<dyn TranslationService>]);

        let result = translator.translate("ev").await.unwrap();
        assert_eq!(result.to_first_target.units.len(), 1);
        assert!(result.to_second_target.units.is_empty());
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_results_keep_registration_order() {
        // The first service answers last.
        let translator = Translator::new(vec![
            Arc::new(FakeService::new("slow").delayed(80)),
            Arc::new(FakeService::new("medium").delayed(30)),
            Arc::new(FakeService::new("fast")),
        ]);

        let result = translator.translate("дом").await.unwrap();
        for target in result.targets() {
            let names: Vec<_> = target.units.iter().map(|u| u.service_name.as_str()).collect();
            assert_eq!(names, vec!["slow", "medium", "fast"]);
        }
    }

    #[tokio::test]
    async fn test_failures_are_dropped() {
        let translator = Translator::new(vec![
            Arc::new(FakeService::new("broken").failing()),
            Arc::new(FakeService::new("ok")),
        ]);

        let result = translator.translate("window").await.unwrap();
        assert_eq!(result.source_language, Language::English);
        assert_eq!(result.to_first_target.units.len(), 1);
        assert_eq!(result.to_first_target.units[0].service_name, "ok");
    }

    #[tokio::test]
    async fn test_targets_follow_language_order() {
        let translator = Translator::new(vec![Arc::new(FakeService::new("a"))]);

        let cases = [
            ("ev", Language::Turkish, Language::Russian, Language::English),
            ("дом", Language::Russian, Language::Turkish, Language::English),
            ("window", Language::English, Language::Russian, Language::Turkish),
        ];
        for (text, source, first, second) in cases {
            let result = translator.translate(text).await.unwrap();
            assert_eq!(result.source_language, source, "source of {}", text);
            assert_eq!(result.to_first_target.target_language, first);
            assert_eq!(result.to_second_target.target_language, second);
        }
    }

    #[tokio::test]
    async fn test_services_run_concurrently() {
        let translator = Translator::new(vec![
            Arc::new(FakeService::new("a").delayed(100)),
            Arc::new(FakeService::new("b").delayed(100)),
            Arc::new(FakeService::new("c").delayed(100)),
        ]);

        let start = std::time::Instant::now();
        translator.translate("ev").await.unwrap();
        // Six sequential calls would take at least 600ms.
        assert!(start.elapsed() < Duration::from_millis(400));
    }
}

// ============================================================================
// HTTP service
// ============================================================================

mod server_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use practice_turkish::morphology::{MorphAnalyzer, Morpheme, Morphology, WordAnalysis};
    use practice_turkish::registry::{MemoryStore, UserRegistry};
    use practice_turkish::report::UNDETECTED_LANGUAGE;
    use practice_turkish::server::{create_router, AppState};
    use practice_turkish::wotd::WordOfTheDaySource;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const KEY: &str = "test-key";

    struct OneParse;

    #[async_trait]
    impl MorphAnalyzer for OneParse {
        async fn parse(&self, word: &str) -> practice_turkish::Result<Vec<WordAnalysis>> {
            if word != "evler" {
                return Ok(Vec::new());
            }
            Ok(vec![WordAnalysis {
                word: word.to_string(),
                pos: "Noun".to_string(),
                lemma: "ev".to_string(),
                morphemes: vec![
                    Morpheme {
                        value: "ev".to_string(),
                        name: "Noun".to_string(),
                    },
                    Morpheme {
                        value: "ler".to_string(),
                        name: "A3pl".to_string(),
                    },
                ],
            }])
        }
    }

    fn state(with_morphology: bool) -> AppState {
        AppState {
            translator: Translator::new(vec![
                Arc::new(FakeService::new("first")),
                Arc::new(FakeService::new("second")),
            ]),
            morphology: with_morphology.then(|| Morphology::new(Arc::new(OneParse))),
            registry: UserRegistry::new(KEY, Arc::new(MemoryStore::new())),
            bot: None,
            wotd: Arc::new(WordOfTheDaySource::with_url(
                reqwest::Client::new(),
                "http://127.0.0.1:9",
            )),
            broadcast_pause: Duration::ZERO,
        }
    }

    async fn post(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_status_page() {
        let app = create_router(state(false));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("The service is online."));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = create_router(state(false));
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_translation_route() {
        let app = create_router(state(false));
        let (status, body) = post(app, "/translation", json!({ "text": "ev" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "ev");
        assert_eq!(body["language"], "turkish");
        let translation = body["translation"].as_str().unwrap();
        assert!(translation.starts_with("Перевод для \"<b>ev</b>\""));
        let first = translation.find("first:ru:ev").unwrap();
        let second = translation.find("second:ru:ev").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_translation_route_undetected_language() {
        let app = create_router(state(false));
        let (status, body) = post(app, "/translation", json!({ "text": "¿qué?" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["translation"], UNDETECTED_LANGUAGE);
        assert!(body["language"].is_null());
    }

    #[tokio::test]
    async fn test_translation_route_rejects_empty_text() {
        let app = create_router(state(false));
        let (status, body) = post(app, "/translation", json!({ "text": "  " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_morphology_routes() {
        let app = create_router(state(true));

        let (status, body) =
            post(app.clone(), "/morphology/check", json!({ "word": "evler" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(true));

        let (_, body) = post(app.clone(), "/morphology/check", json!({ "word": "xyz" })).await;
        assert_eq!(body, json!(false));

        let (status, body) = post(app, "/morphology/analyze", json!({ "word": "evler" })).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_str().unwrap().starts_with("<b>ev</b>\n"));
    }

    #[tokio::test]
    async fn test_morphology_unavailable() {
        let app = create_router(state(false));
        let (status, _) = post(app, "/morphology/check", json!({ "word": "evler" })).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_user_routes() {
        let app = create_router(state(false));

        let (status, token) = post(
            app.clone(),
            "/users/get_token",
            json!({ "key": KEY, "user_id": 5 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = token.as_str().unwrap().to_string();
        assert_eq!(token.len(), 8);

        let (_, valid) = post(
            app.clone(),
            "/users/check_token",
            json!({ "key": KEY, "user_id": 5, "token": token }),
        )
        .await;
        assert_eq!(valid, json!(true));

        let (_, subscribed) = post(
            app.clone(),
            "/users/subscribe",
            json!({ "key": KEY, "user_id": 5 }),
        )
        .await;
        assert_eq!(subscribed, json!(true));

        let (_, subscribers) =
            post(app.clone(), "/users/subscribers", json!({ "key": KEY })).await;
        assert_eq!(subscribers, json!([5]));

        let (_, subscribed) = post(
            app.clone(),
            "/users/unsubscribe",
            json!({ "key": KEY, "user_id": 5 }),
        )
        .await;
        assert_eq!(subscribed, json!(false));

        let (_, subscribers) = post(app, "/users/subscribers", json!({ "key": KEY })).await;
        assert_eq!(subscribers, json!([]));
    }

    #[tokio::test]
    async fn test_user_routes_require_key() {
        let app = create_router(state(false));

        let (status, _) = post(
            app.clone(),
            "/users/get_token",
            json!({ "key": "wrong", "user_id": 5 }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = post(app, "/wotd/broadcast", json!({ "key": "wrong" })).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let app = create_router(state(false));
        let (status, _) = post(
            app,
            "/users/subscribe",
            json!({ "key": KEY, "user_id": 404 }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_broadcast_without_bot() {
        let app = create_router(state(false));
        let (status, _) = post(app, "/wotd/broadcast", json!({ "key": KEY })).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}

// ============================================================================
// Broadcast end to end
// ============================================================================

mod broadcast_tests {
    use practice_turkish::broadcast::{send_word_of_the_day, BroadcastConfig};
    use practice_turkish::telegram::TelegramBot;
    use practice_turkish::wotd::WordOfTheDaySource;
    use reqwest::Client;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<div class="wotd-widget">
        <div class="r101-wotd-widget__word">su</div>
        <div class="r101-wotd-widget__class">noun</div>
        <div class="r101-wotd-widget__english">water</div>
    </div>"#;

    fn config() -> BroadcastConfig {
        BroadcastConfig {
            pause: Duration::ZERO,
            show_progress: false,
        }
    }

    #[tokio::test]
    async fn test_send_word_of_the_day() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/wotd"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/bot1:x/sendMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(2)
            .mount(&mock_server)
            .await;

        let url = format!("{}/wotd", mock_server.uri());
        let source = WordOfTheDaySource::with_url(Client::new(), url);
        let bot = TelegramBot::with_api_url(Client::new(), "1:x", &mock_server.uri());
        let result = send_word_of_the_day(&source, &[10, 20], &bot, config())
            .await
            .unwrap();

        assert_eq!(result.stats.delivered, 2);
        assert_eq!(result.stats.failed, 0);
        assert!(result.message.contains("<b>su</b>"));
    }

    #[tokio::test]
    async fn test_all_deliveries_failing_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "ok": false,
                "description": "Unauthorized"
            })))
            .mount(&mock_server)
            .await;

        let source = WordOfTheDaySource::with_url(Client::new(), mock_server.uri());
        let bot = TelegramBot::with_api_url(Client::new(), "1:x", &mock_server.uri());
        let result = send_word_of_the_day(&source, &[10], &bot, config()).await;
        assert!(result.is_err());
    }
}
