//! View switching, the help overlay, and the graph → dashboard bridge.

use tracing::{debug, info};

use verdant_contracts::error::DashboardResult;

use crate::{countries::CountryInputs, traits::DashboardTrigger};

/// The top-level views. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum View {
    #[default]
    Graph,
    Dashboard,
    Chat,
    Analyzer,
}

impl View {
    pub const ALL: [View; 4] = [View::Graph, View::Dashboard, View::Chat, View::Analyzer];

    pub fn name(self) -> &'static str {
        match self {
            View::Graph => "Policy Graph",
            View::Dashboard => "Telemetry",
            View::Chat => "Assistant",
            View::Analyzer => "Analyzer",
        }
    }
}

/// Where a click on the open help overlay landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayTarget {
    /// The darkened area around the help box.
    Backdrop,
    /// The help box itself.
    Content,
}

/// Application chrome: active view, help overlay, and the country inputs
/// shared between the dashboard and the views that link into it.
#[derive(Debug, Clone, Default)]
pub struct Shell {
    active: View,
    help_open: bool,
    pub countries: CountryInputs,
}

impl Shell {
    /// A shell on the graph view with populated country inputs.
    pub fn new() -> Self {
        Self {
            active: View::default(),
            help_open: false,
            countries: CountryInputs::new(),
        }
    }

    pub fn active(&self) -> View {
        self.active
    }

    pub fn is_active(&self, view: View) -> bool {
        self.active == view
    }

    pub fn switch_tab(&mut self, view: View) {
        if self.active != view {
            debug!(from = self.active.name(), to = view.name(), "switching view");
        }
        self.active = view;
    }

    /// Cycle to the next view, wrapping around.
    pub fn next_tab(&mut self) {
        let idx = View::ALL.iter().position(|v| *v == self.active).unwrap_or(0);
        self.switch_tab(View::ALL[(idx + 1) % View::ALL.len()]);
    }

    pub fn help_open(&self) -> bool {
        self.help_open
    }

    pub fn open_help(&mut self) {
        self.help_open = true;
    }

    pub fn close_help(&mut self) {
        self.help_open = false;
    }

    /// Clicks on the backdrop close the overlay; clicks inside it do not.
    pub fn click_overlay(&mut self, target: OverlayTarget) {
        if self.help_open && target == OverlayTarget::Backdrop {
            self.help_open = false;
        }
    }

    /// Handle Escape. Returns true if it closed the overlay.
    pub fn escape(&mut self) -> bool {
        std::mem::take(&mut self.help_open)
    }

    /// Jump to the dashboard showing `country` and load it.
    ///
    /// The view switches even when `country` is rejected, matching what a
    /// user clicking the link would see; the load only runs if the selection
    /// was accepted.
    pub fn open_telemetry(&mut self, country: &str, trigger: &mut dyn DashboardTrigger) -> DashboardResult<()> {
        self.switch_tab(View::Dashboard);
        self.countries.select_primary(country)?;

        info!(country = %country, "opening telemetry from linked view");
        trigger.load_dashboard(&self.countries);
        Ok(())
    }
}
