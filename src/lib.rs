pub mod broadcast;
pub mod config;
pub mod error;
pub mod language;
pub mod morphology;
pub mod registry;
pub mod report;
pub mod server;
pub mod telegram;
pub mod translate;
pub mod wotd;

pub use config::{Config, Task};
pub use error::{FetchError, PracticeError, Result};
pub use language::{detect_language, lowercase, Language};
pub use report::{get_translation, Translation};
pub use translate::{AggregateTranslation, TranslationService, Translator};
