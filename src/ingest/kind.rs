//! The four ingestion forms and everything that differs between them.

use std::time::Duration;

use crate::config::StatusConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestKind {
    Pdf,
    SlideDeck,
    Url,
    Video,
}

impl IngestKind {
    /// Display order on the upload tab.
    pub const ALL: [IngestKind; 4] = [
        IngestKind::Pdf,
        IngestKind::SlideDeck,
        IngestKind::Url,
        IngestKind::Video,
    ];

    /// `true` for forms whose input is a local file path.
    pub fn is_file(&self) -> bool {
        matches!(self, IngestKind::Pdf | IngestKind::SlideDeck)
    }

    /// Accepted file extensions, lower-case, without the dot.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            IngestKind::Pdf => &["pdf"],
            IngestKind::SlideDeck => &["ppt", "pptx"],
            IngestKind::Url | IngestKind::Video => &[],
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            IngestKind::Pdf => "Path to a .pdf file",
            IngestKind::SlideDeck => "Path to a .ppt or .pptx file",
            IngestKind::Url => "Enter website URL",
            IngestKind::Video => "Enter YouTube video URL",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            IngestKind::Pdf => "Upload PDF",
            IngestKind::SlideDeck => "Upload PowerPoint",
            IngestKind::Url => "Process URL",
            IngestKind::Video => "Process Video",
        }
    }

    pub fn busy_label(&self) -> &'static str {
        if self.is_file() {
            "Loading ..."
        } else {
            "Processing..."
        }
    }

    /// Error shown when submitting with nothing entered.
    pub fn empty_message(&self) -> &'static str {
        match self {
            IngestKind::Pdf | IngestKind::SlideDeck => "Please select a file.",
            IngestKind::Url => "Please enter a valid URL.",
            IngestKind::Video => "Please enter a YouTube URL.",
        }
    }

    /// Success text when the backend sends no `message`.
    pub fn success_fallback(&self) -> &'static str {
        match self {
            IngestKind::Pdf => "PDF uploaded successfully.",
            IngestKind::SlideDeck => "PowerPoint uploaded successfully.",
            IngestKind::Url => "URL processed successfully.",
            IngestKind::Video => "Video processed successfully.",
        }
    }

    /// Error text when the backend sends no `error`.
    pub fn error_fallback(&self) -> &'static str {
        match self {
            IngestKind::Video => "An error occurred while processing the video.",
            _ => "An error occurred.",
        }
    }

    /// How long this form's status stays up.
    pub fn status_ttl(&self, config: &StatusConfig) -> Duration {
        match self {
            IngestKind::Pdf => Duration::from_secs(config.upload_pdf_clear_secs),
            _ => Duration::from_secs(config.success_clear_secs),
        }
    }
}
