//! The document analyzer: one PDF in, one markdown analysis out.
//!
//! Like the chat panel, a run is split into `begin` and `finish` so a host can
//! upload on another task. While a run is in flight the analyzer is busy:
//! choosing another file, clearing, and starting a second run are all refused.

use tracing::{debug, info, warn};

use verdant_contracts::{
    assistant::DocumentAnalysis,
    error::{DashboardError, DashboardResult},
};

use crate::traits::DocumentAnalyzer;

const PDF_EXTENSION: &str = ".pdf";
const CONNECTION_ERROR: &str = "failed to analyze document. check server logs.";

/// The file waiting to be analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// An upload handed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAnalysis {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// What the results panel shows after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisResult {
    /// The analysis, as markdown.
    Answer(String),
    /// The backend's `{error}` message.
    Error(String),
    /// The request never produced a usable reply.
    ConnectionError,
}

impl AnalysisResult {
    /// Heading for failure panels; answers have none.
    pub fn heading(&self) -> Option<&'static str> {
        match self {
            AnalysisResult::Answer(_) => None,
            AnalysisResult::Error(_) => Some("error"),
            AnalysisResult::ConnectionError => Some("connection error"),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            AnalysisResult::Answer(md) | AnalysisResult::Error(md) => md,
            AnalysisResult::ConnectionError => CONNECTION_ERROR,
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, AnalysisResult::Answer(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    document: Option<SelectedDocument>,
    busy: bool,
    result: Option<AnalysisResult>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&SelectedDocument> {
        self.document.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The last run's outcome. Hidden (`None`) while a run is in flight and
    /// after a new file is chosen.
    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn can_submit(&self) -> bool {
        self.document.is_some() && !self.busy
    }

    pub fn can_clear(&self) -> bool {
        self.document.is_some() && !self.busy
    }

    /// Choose the file to analyze. Only `.pdf` names are accepted, matched
    /// case-insensitively.
    pub fn select_file(&mut self, name: &str, bytes: Vec<u8>) -> DashboardResult<()> {
        if self.busy {
            return Err(DashboardError::InvalidSelection {
                reason: "an analysis is already running".to_string(),
            });
        }
        if !name.to_lowercase().ends_with(PDF_EXTENSION) {
            warn!(file = %name, "rejected non-pdf document");
            return Err(DashboardError::InvalidSelection {
                reason: format!("{} is not a .pdf document", name),
            });
        }
        debug!(file = %name, size = bytes.len(), "document selected");
        self.document = Some(SelectedDocument {
            name: name.to_string(),
            bytes,
        });
        self.result = None;
        Ok(())
    }

    /// Drop the file and any result. Refused while a run is in flight.
    pub fn clear(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.document = None;
        self.result = None;
        true
    }

    /// Start a run on the selected file. `None` without a file or while busy.
    pub fn begin(&mut self) -> Option<PendingAnalysis> {
        if self.busy {
            return None;
        }
        let Some(doc) = &self.document else {
            debug!("analysis requested without a document");
            return None;
        };
        let pending = PendingAnalysis {
            file_name: doc.name.clone(),
            bytes: doc.bytes.clone(),
        };
        self.busy = true;
        self.result = None;
        info!(file = %pending.file_name, "analyzing document");
        Some(pending)
    }

    /// Unlock and record how the run for `pending` ended.
    pub fn finish(&mut self, pending: PendingAnalysis, result: DashboardResult<DocumentAnalysis>) {
        self.busy = false;
        self.result = Some(match result {
            Ok(analysis) => AnalysisResult::Answer(analysis.answer),
            Err(DashboardError::Api { reason, .. }) => AnalysisResult::Error(reason),
            Err(e) => {
                warn!(file = %pending.file_name, error = %e, "document analysis failed");
                AnalysisResult::ConnectionError
            }
        });
    }

    /// Upload the selected file to `service` and record the outcome.
    pub async fn analyze(&mut self, service: &dyn DocumentAnalyzer) {
        if let Some(pending) = self.begin() {
            let result = service.analyze_document(&pending.file_name, pending.bytes.clone()).await;
            self.finish(pending, result);
        }
    }
}
