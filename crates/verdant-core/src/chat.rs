//! The assistant chat transcript.
//!
//! Each request is split into `begin_*` (append bubbles, return what to send)
//! and `finish_*` (drop the placeholder, append the outcome) so a host can
//! run the request elsewhere and hand the result back. `send_query` and
//! `generate_report` do both around an awaited call.

use chrono::Utc;
use tracing::{debug, error, warn};

use verdant_contracts::{
    assistant::{AskResponse, PolicyBrief},
    chat::{ChatBody, ChatMessage, Sender},
    error::{DashboardError, DashboardResult},
};

use crate::{countries::CountryInputs, traits::PolicyAssistant};

const THINKING: &str = "thinking...";
const DRAFTING: &str = "drafting brief...";
const CONNECTION_ERROR: &str = "connection error. is the server running?";
const REPORT_FAILED: &str = "failed to generate the report. check server logs.";
const NEED_COUNTRY: &str =
    "please select a country in the dashboard first so i know which region to report on!";

/// A question waiting for its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub placeholder: u64,
    pub query: String,
}

/// A brief waiting to be drafted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReport {
    pub placeholder: u64,
    pub country: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChatPanel {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl ChatPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True while any request placeholder is still showing.
    pub fn is_waiting(&self) -> bool {
        self.messages.iter().any(|m| m.body.is_pending())
    }

    fn push(&mut self, sender: Sender, body: ChatBody) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            sender,
            body,
            timestamp: Utc::now(),
        });
        id
    }

    fn remove(&mut self, id: u64) {
        self.messages.retain(|m| m.id != id);
    }

    /// Start a question. Blank input is ignored.
    pub fn begin_query(&mut self, text: &str) -> Option<PendingQuery> {
        let query = text.trim();
        if query.is_empty() {
            return None;
        }
        self.push(Sender::User, ChatBody::Text(query.to_string()));
        let placeholder = self.push(Sender::Assistant, ChatBody::Pending(THINKING.to_string()));
        Some(PendingQuery {
            placeholder,
            query: query.to_string(),
        })
    }

    pub fn finish_query(&mut self, pending: PendingQuery, result: DashboardResult<AskResponse>) {
        self.remove(pending.placeholder);
        let body = match result {
            Ok(resp) => ChatBody::Markdown(resp.answer),
            Err(DashboardError::Api { reason, .. }) => ChatBody::Text(format!("error: {}", reason)),
            Err(e) => {
                warn!(error = %e, "assistant query failed");
                ChatBody::Text(CONNECTION_ERROR.to_string())
            }
        };
        self.push(Sender::Assistant, body);
    }

    /// Start a policy brief for the dashboard's primary country.
    ///
    /// Without a primary country this appends a hint and returns `None`.
    pub fn begin_report(&mut self, inputs: &CountryInputs) -> Option<PendingReport> {
        let Some(selection) = inputs.selection() else {
            debug!("report requested without a primary country");
            self.push(Sender::Assistant, ChatBody::Text(NEED_COUNTRY.to_string()));
            return None;
        };
        let country = selection.primary().to_string();
        self.push(
            Sender::Assistant,
            ChatBody::Text(format!("generating formal policy brief for {}...", country)),
        );
        let placeholder = self.push(Sender::Assistant, ChatBody::Pending(DRAFTING.to_string()));
        Some(PendingReport { placeholder, country })
    }

    pub fn finish_report(&mut self, pending: PendingReport, result: DashboardResult<PolicyBrief>) {
        self.remove(pending.placeholder);
        let body = match result {
            Ok(brief) => ChatBody::Report(brief.report_md),
            Err(DashboardError::Api { reason, .. }) => {
                ChatBody::Text(format!("error generating report: {}", reason))
            }
            Err(e) => {
                error!(country = %pending.country, error = %e, "report generation error");
                ChatBody::Text(REPORT_FAILED.to_string())
            }
        };
        self.push(Sender::Assistant, body);
    }

    /// Ask `assistant` a question and record the exchange.
    pub async fn send_query(&mut self, assistant: &dyn PolicyAssistant, text: &str) {
        if let Some(pending) = self.begin_query(text) {
            let result = assistant.ask(&pending.query).await;
            self.finish_query(pending, result);
        }
    }

    /// Draft a brief for the selected primary country and record it.
    pub async fn generate_report(&mut self, assistant: &dyn PolicyAssistant, inputs: &CountryInputs) {
        if let Some(pending) = self.begin_report(inputs) {
            let result = assistant.generate_report(&pending.country).await;
            self.finish_report(pending, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    // ── Fake assistant ────────────────────────────────────────────────────────

    enum Reply {
        Answer(&'static str),
        ApiError(&'static str),
        Offline,
    }

    struct FakeAssistant {
        reply: Reply,
        calls: Mutex<Vec<String>>,
    }

    impl FakeAssistant {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn outcome<T>(&self, endpoint: &str, ok: impl FnOnce(&str) -> T) -> DashboardResult<T> {
            match self.reply {
                Reply::Answer(text) => Ok(ok(text)),
                Reply::ApiError(reason) => Err(DashboardError::Api {
                    endpoint: endpoint.to_string(),
                    reason: reason.to_string(),
                }),
                Reply::Offline => Err(DashboardError::Transport {
                    endpoint: endpoint.to_string(),
                    reason: "connection refused".to_string(),
                }),
            }
        }
    }

    #[async_trait]
    impl PolicyAssistant for FakeAssistant {
        async fn ask(&self, query: &str) -> DashboardResult<AskResponse> {
            self.calls.lock().unwrap().push(query.to_string());
            self.outcome("/api/ask", |text| AskResponse {
                answer: text.to_string(),
                sources: vec![],
            })
        }

        async fn generate_report(&self, country: &str) -> DashboardResult<PolicyBrief> {
            self.calls.lock().unwrap().push(country.to_string());
            self.outcome("/api/generate_report", |text| PolicyBrief {
                country: country.to_string(),
                report_md: text.to_string(),
                sources: vec![],
            })
        }
    }

    fn bodies(panel: &ChatPanel) -> Vec<ChatBody> {
        panel.messages().iter().map(|m| m.body.clone()).collect()
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn blank_query_is_ignored() {
        let assistant = FakeAssistant::new(Reply::Answer("unused"));
        let mut panel = ChatPanel::new();

        panel.send_query(&assistant, "   ").await;

        assert!(panel.messages().is_empty());
        assert!(assistant.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn answer_replaces_placeholder() {
        let assistant = FakeAssistant::new(Reply::Answer("**Carbon pricing** works."));
        let mut panel = ChatPanel::new();

        panel.send_query(&assistant, "  does carbon pricing work?  ").await;

        assert_eq!(
            bodies(&panel),
            vec![
                ChatBody::Text("does carbon pricing work?".to_string()),
                ChatBody::Markdown("**Carbon pricing** works.".to_string()),
            ]
        );
        assert_eq!(panel.messages()[0].sender, Sender::User);
        assert!(!panel.is_waiting());
        assert_eq!(*assistant.calls.lock().unwrap(), vec!["does carbon pricing work?"]);
    }

    #[test]
    fn begin_query_shows_thinking_placeholder() {
        let mut panel = ChatPanel::new();
        let pending = panel.begin_query("hello").unwrap();

        assert!(panel.is_waiting());
        let last = panel.messages().last().unwrap();
        assert_eq!(last.id, pending.placeholder);
        assert_eq!(last.body, ChatBody::Pending("thinking...".to_string()));
    }

    #[tokio::test]
    async fn backend_error_is_shown_verbatim() {
        let assistant = FakeAssistant::new(Reply::ApiError("index not loaded"));
        let mut panel = ChatPanel::new();

        panel.send_query(&assistant, "hi").await;

        assert_eq!(
            panel.messages().last().unwrap().body,
            ChatBody::Text("error: index not loaded".to_string())
        );
    }

    #[tokio::test]
    async fn transport_failure_shows_connection_error() {
        let assistant = FakeAssistant::new(Reply::Offline);
        let mut panel = ChatPanel::new();

        panel.send_query(&assistant, "hi").await;

        assert_eq!(
            panel.messages().last().unwrap().body,
            ChatBody::Text(CONNECTION_ERROR.to_string())
        );
        assert_eq!(panel.messages().len(), 2);
    }

    // ── Reports ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn report_without_country_asks_for_one() {
        let assistant = FakeAssistant::new(Reply::Answer("unused"));
        let mut panel = ChatPanel::new();

        panel.generate_report(&assistant, &CountryInputs::new()).await;

        assert_eq!(bodies(&panel), vec![ChatBody::Text(NEED_COUNTRY.to_string())]);
        assert!(assistant.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn report_is_drafted_for_primary_country() {
        let assistant = FakeAssistant::new(Reply::Answer("# executive summary"));
        let mut inputs = CountryInputs::new();
        inputs.select_primary("Sweden").unwrap();
        let mut panel = ChatPanel::new();

        panel.generate_report(&assistant, &inputs).await;

        assert_eq!(
            bodies(&panel),
            vec![
                ChatBody::Text("generating formal policy brief for Sweden...".to_string()),
                ChatBody::Report("# executive summary".to_string()),
            ]
        );
        assert_eq!(*assistant.calls.lock().unwrap(), vec!["Sweden"]);
    }

    #[tokio::test]
    async fn report_failures_are_reported() {
        let mut inputs = CountryInputs::new();
        inputs.select_primary("Sweden").unwrap();

        let mut panel = ChatPanel::new();
        panel
            .generate_report(&FakeAssistant::new(Reply::ApiError("no country selected")), &inputs)
            .await;
        assert_eq!(
            panel.messages().last().unwrap().body,
            ChatBody::Text("error generating report: no country selected".to_string())
        );

        let mut panel = ChatPanel::new();
        panel
            .generate_report(&FakeAssistant::new(Reply::Offline), &inputs)
            .await;
        assert_eq!(
            panel.messages().last().unwrap().body,
            ChatBody::Text(REPORT_FAILED.to_string())
        );
    }
}
