//! The dashboard loader: concurrent per-country fetches merged into one frame.
//!
//! A load runs as:
//!
//!   Selection → Generation ticket → [fetch primary ‖ fetch comparison] → Merge
//!
//! The join is all-or-nothing: if either fetch fails, both results are
//! dropped and no frame is produced. Every load that reaches the network takes
//! a new generation number, and hosts only render the frame whose generation
//! is still current, so a slow stale response cannot overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::try_join_all;
use tracing::{debug, error, info};

use verdant_contracts::{
    chart::DashboardFrame,
    error::DashboardResult,
    telemetry::{CountrySelection, DatasetBundle, Metric, TaggedEvent, TelemetryResponse},
};

use crate::{config::Palette, countries::CountryInputs, traits::TelemetrySource};

/// Fetches telemetry for the selected countries and merges it for rendering.
///
/// Share one loader per dashboard (behind an `Arc` if loads run on tasks);
/// the generation counter only works if every load goes through it.
pub struct DashboardLoader<S> {
    source: S,
    palette: Palette,
    generation: AtomicU64,
}

impl<S: TelemetrySource> DashboardLoader<S> {
    pub fn new(source: S, palette: Palette) -> Self {
        Self {
            source,
            palette,
            generation: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The generation of the most recently started load (0 before any).
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// True if no load has started since the one that produced `generation`.
    pub fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }

    /// Load whatever `inputs` currently select.
    ///
    /// Returns `Ok(None)` without touching the network when no primary
    /// country is chosen.
    pub async fn load_dashboard(&self, inputs: &CountryInputs) -> DashboardResult<Option<DashboardFrame>> {
        match inputs.selection() {
            Some(selection) => self.load(&selection).await.map(Some),
            None => {
                debug!("no primary country selected; dashboard load skipped");
                Ok(None)
            }
        }
    }

    /// Fetch every country in `selection` concurrently and merge the results.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error. The failure is logged here; callers
    /// need not log it again.
    pub async fn load(&self, selection: &CountrySelection) -> DashboardResult<DashboardFrame> {
        let generation = self.issue_generation();
        self.load_as(generation, selection).await
    }

    /// Take the next generation number, superseding every earlier load.
    ///
    /// Hosts that run loads on other tasks take the number before spawning,
    /// so the order of generations is the order the user asked for them.
    pub fn issue_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Run a load under a generation from `issue_generation`.
    pub async fn load_as(&self, generation: u64, selection: &CountrySelection) -> DashboardResult<DashboardFrame> {
        debug!(
            generation,
            primary = %selection.primary(),
            comparison = selection.comparison().unwrap_or(""),
            "dashboard load starting"
        );

        let fetches = selection
            .countries()
            .map(|country| self.source.fetch_telemetry(country));

        let results = match try_join_all(fetches).await {
            Ok(results) => results,
            Err(e) => {
                error!(
                    generation,
                    primary = %selection.primary(),
                    comparison = selection.comparison().unwrap_or(""),
                    error = %e,
                    "telemetry load failed"
                );
                return Err(e);
            }
        };

        let frame = merge_results(generation, selection, &results, &self.palette);

        info!(
            generation,
            countries = results.len(),
            events = frame.events.len(),
            "dashboard load complete"
        );

        Ok(frame)
    }
}

/// Merge per-country responses into a `DashboardFrame`.
///
/// `results` must be in `selection.countries()` order. The year axis comes
/// from the primary country only; a comparison country with a different axis
/// is plotted positionally against it.
pub fn merge_results(
    generation: u64,
    selection: &CountrySelection,
    results: &[TelemetryResponse],
    palette: &Palette,
) -> DashboardFrame {
    let countries: Vec<&str> = selection.countries().collect();

    let datasets = Metric::ALL
        .iter()
        .map(|&metric| {
            let colors = palette.metric(metric);
            let bundles = countries
                .iter()
                .zip(results)
                .enumerate()
                .map(|(i, (country, resp))| DatasetBundle {
                    label: country.to_string(),
                    data: resp.metrics.series(metric).to_vec(),
                    color: colors.for_index(i).to_string(),
                })
                .collect();
            (metric, bundles)
        })
        .collect();

    let events = countries
        .iter()
        .zip(results)
        .enumerate()
        .flat_map(|(i, (country, resp))| {
            let color = palette.events.for_index(i);
            resp.events
                .iter()
                .map(move |event| TaggedEvent::tag(event, country, color))
        })
        .collect();

    DashboardFrame {
        generation,
        years: results
            .first()
            .map(|r| r.metrics.years.clone())
            .unwrap_or_default(),
        datasets,
        events,
    }
}
