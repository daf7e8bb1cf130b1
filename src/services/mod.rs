pub mod extractor;
pub mod ledger;
pub mod llm_service;
pub mod settings_store;
pub mod status_reporter;
pub mod work_queue;

pub use extractor::{admit, Admission, CandidateExtractor, MarkerClassifier, SponsorshipClassifier};
pub use ledger::DeduplicationLedger;
pub use llm_service::{ChatBackend, LlmService, OpenAiBackend, ReplyGenerator};
pub use settings_store::{ReplyCounter, Settings, SettingsStore};
pub use status_reporter::{CountUpdate, StatusReporter};
pub use work_queue::WorkQueue;
