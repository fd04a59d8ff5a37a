//! Document ingestion forms: PDF upload, slide-deck upload, web page URL and
//! video URL.
//!
//! Every form follows the same submit-and-report cycle; [`IngestKind`]
//! carries the per-form labels, messages and payload shape.

pub mod form;
pub mod kind;

pub use form::{FormState, IngestError, IngestionForm, SubmitOutcome};
pub use kind::IngestKind;
