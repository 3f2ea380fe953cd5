use crate::config::Config;
use crate::error::Result;
use crate::language::{detect_language, Language};
use crate::translate::http::build_client;
use crate::translate::{
    default_services, AggregateTranslation, TranslationService, TranslationsToSameLanguage,
};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Fans a text out to every registered service for both target languages.
///
/// The service list is fixed at construction and shared read-only between
/// concurrent requests.
#[derive(Clone)]
pub struct Translator {
    services: Arc<[Arc<dyn TranslationService>]>,
}

impl Translator {
    pub fn new(services: Vec<Arc<dyn TranslationService>>) -> Self {
        Self {
            services: services.into(),
        }
    }

    /// Registers the built-in services with one client honouring the configured timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_client(config.request_timeout())?;
        Ok(Self::new(default_services(client, config)))
    }

    pub fn services(&self) -> &[Arc<dyn TranslationService>] {
        &self.services
    }

    /// Detects the language of `text` and translates it into the two other
    /// languages. Returns `None` only when detection fails, in which case no
    /// service is contacted.
    pub async fn translate(&self, text: &str) -> Option<AggregateTranslation> {
        let Some(source_language) = detect_language(text) else {
            info!("Could not detect language of {:?}", text);
            return None;
        };
        let (first, second) = source_language.targets();

        info!(
            "Translating {:?} from {} with {} services",
            text,
            source_language,
            self.services.len()
        );
        let start = Instant::now();

        let (to_first_target, to_second_target) = futures::join!(
            self.translate_to(text, source_language, first),
            self.translate_to(text, source_language, second),
        );

        debug!(
            "Translation of {:?} finished in {}ms ({} + {} results)",
            text,
            start.elapsed().as_millis(),
            to_first_target.units.len(),
            to_second_target.units.len()
        );

        Some(AggregateTranslation {
            source_language,
            to_first_target,
            to_second_target,
        })
    }

    /// Queries every service concurrently. `join_all` keeps registration
    /// order regardless of which service answers first.
    async fn translate_to(
        &self,
        text: &str,
        src: Language,
        dst: Language,
    ) -> TranslationsToSameLanguage {
        let results = join_all(
            self.services
                .iter()
                .map(|service| service.wrap_translate(text, src, dst)),
        )
        .await;

        TranslationsToSameLanguage {
            target_language: dst,
            units: results.into_iter().flatten().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::translate::ServiceTranslation;
    use async_trait::async_trait;

    struct Fixed(&'static str);

    #[async_trait]
    impl TranslationService for Fixed {
        fn service_name(&self) -> &'static str {
            self.0
        }

        async fn translate(
            &self,
            text: &str,
            _src_code: &str,
            dst_code: &str,
        ) -> std::result::Result<Option<ServiceTranslation>, FetchError> {
            Ok(Some(ServiceTranslation::new(
                format!("{}-{}", text, dst_code),
                "https://fixed.test",
            )))
        }
    }

    #[tokio::test]
    async fn test_translate_targets() {
        let translator = Translator::new(vec![Arc::new(Fixed("a"))]);
        let result = translator.translate("ev").await.unwrap();

        assert_eq!(result.source_language, Language::Turkish);
        assert_eq!(result.to_first_target.target_language, Language::Russian);
        assert_eq!(result.to_second_target.target_language, Language::English);
        assert_eq!(result.to_first_target.units[0].text, "ev-ru");
        assert_eq!(result.to_second_target.units[0].text, "ev-en");
    }

    #[tokio::test]
    async fn test_no_services() {
        let translator = Translator::new(Vec::new());
        let result = translator.translate("дом").await.unwrap();
        assert_eq!(result.source_language, Language::Russian);
        assert!(result.to_first_target.units.is_empty());
        assert!(result.to_second_target.units.is_empty());
    }

    #[tokio::test]
    async fn test_undetected_language() {
        let translator = Translator::new(vec![Arc::new(Fixed("a"))]);
        assert!(translator.translate("¿qué?").await.is_none());
    }

    #[test]
    fn test_from_config() {
        let translator = Translator::from_config(&Config::default()).unwrap();
        assert_eq!(translator.services().len(), 4);
    }
}
