pub mod aggregator;
pub mod demek;
pub mod glosbe;
pub mod google;
pub mod http;
pub mod turkcesozluk;
pub mod tureng;

pub use aggregator::Translator;
pub use demek::DemekRu;
pub use glosbe::GlosbeCom;
pub use google::GoogleTranslate;
pub use turkcesozluk::TurkcesozlukNet;
pub use tureng::TurengCom;

use crate::config::Config;
use crate::error::FetchError;
use crate::language::Language;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A successful answer of one service before it is attributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTranslation {
    pub text: String,
    /// Page a user can open to see the translation at the source.
    pub url: String,
}

impl ServiceTranslation {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// One service's translation for one (source, target) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub text: String,
    pub service_name: String,
    pub url: String,
}

/// Every successful translation into one target language, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationsToSameLanguage {
    pub target_language: Language,
    pub units: Vec<TranslationUnit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateTranslation {
    pub source_language: Language,
    pub to_first_target: TranslationsToSameLanguage,
    pub to_second_target: TranslationsToSameLanguage,
}

impl AggregateTranslation {
    pub fn targets(&self) -> [&TranslationsToSameLanguage; 2] {
        [&self.to_first_target, &self.to_second_target]
    }
}

/// A single external translation source.
///
/// Implementors provide `translate`, which receives language codes already
/// encoded for the service. Callers go through `wrap_translate`, which checks
/// the supported pairs before any request is made and turns every failure
/// into `None`.
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Display name; also identifies the service in logs.
    fn service_name(&self) -> &'static str;

    /// Ordered pairs (source, target) this service can translate.
    fn supported_languages(&self) -> Vec<(Language, Language)> {
        Language::all_pairs()
    }

    /// Code the service uses for `language` when it is not ISO-639-1.
    fn language_encoding(&self, _language: Language) -> Option<&'static str> {
        None
    }

    /// Performs one outbound request. `Ok(None)` means the response did not
    /// contain a translation.
    async fn translate(
        &self,
        text: &str,
        src_code: &str,
        dst_code: &str,
    ) -> Result<Option<ServiceTranslation>, FetchError>;

    fn supports(&self, src: Language, dst: Language) -> bool {
        self.supported_languages().contains(&(src, dst))
    }

    fn encode_language(&self, language: Language) -> &'static str {
        self.language_encoding(language)
            .unwrap_or_else(|| language.iso_code())
    }

    async fn wrap_translate(
        &self,
        text: &str,
        src: Language,
        dst: Language,
    ) -> Option<TranslationUnit> {
        if !self.supports(src, dst) {
            return None;
        }

        let src_code = self.encode_language(src);
        let dst_code = self.encode_language(dst);

        match self.translate(text, src_code, dst_code).await {
            Ok(Some(found)) => {
                debug!("{} translated {:?} ({} -> {})", self.service_name(), text, src, dst);
                Some(TranslationUnit {
                    text: found.text,
                    service_name: self.service_name().to_string(),
                    url: found.url,
                })
            }
            Ok(None) => {
                debug!("{} has no translation for {:?}", self.service_name(), text);
                None
            }
            Err(e) => {
                debug!("{} failed for {:?}: {}", self.service_name(), text, e);
                None
            }
        }
    }
}

/// Services in their registration order. Google is included only when an
/// API key is configured.
pub fn default_services(
    client: reqwest::Client,
    config: &Config,
) -> Vec<Arc<dyn TranslationService>> {
    let mut services: Vec<Arc<dyn TranslationService>> = vec![
        Arc::new(DemekRu::new(client.clone())),
        Arc::new(GlosbeCom::new(client.clone())),
    ];
    if let Some(ref key) = config.google_api_key {
        services.push(Arc::new(GoogleTranslate::new(client.clone(), key.clone())));
    }
    services.push(Arc::new(TurkcesozlukNet::new(client.clone())));
    services.push(Arc::new(TurengCom::new(client)));
    services
}
