//! The telemetry dashboard: a shared loader plus the renderer that owns the
//! canvases.
//!
//! Loads may run anywhere (the loader sits behind an `Arc`), but frames are
//! only drawn through `apply_frame`, which drops any frame a newer load has
//! superseded.

use std::sync::Arc;

use tracing::warn;

use verdant_contracts::{chart::DashboardFrame, error::DashboardResult};
use verdant_core::{
    countries::CountryInputs,
    traits::{ChartBackend, TelemetrySource},
    DashboardLoader,
};

use crate::renderer::ChartRenderer;

/// What happened to a frame handed to `apply_frame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,
    /// A newer load had started; the frame was dropped.
    Stale,
}

pub struct Dashboard<S, B: ChartBackend> {
    loader: Arc<DashboardLoader<S>>,
    renderer: ChartRenderer<B>,
}

impl<S: TelemetrySource, B: ChartBackend> Dashboard<S, B> {
    pub fn new(loader: Arc<DashboardLoader<S>>, renderer: ChartRenderer<B>) -> Self {
        Self { loader, renderer }
    }

    /// A clone of the loader handle, for running loads on other tasks.
    pub fn loader(&self) -> Arc<DashboardLoader<S>> {
        Arc::clone(&self.loader)
    }

    pub fn renderer(&self) -> &ChartRenderer<B> {
        &self.renderer
    }

    /// True if no load has started since the one issued `generation`.
    pub fn is_current(&self, generation: u64) -> bool {
        self.loader.is_current(generation)
    }

    /// Draw `frame` unless a newer load has started since it was issued.
    pub fn apply_frame(&mut self, frame: &DashboardFrame) -> DashboardResult<FrameOutcome> {
        if !self.loader.is_current(frame.generation) {
            warn!(
                generation = frame.generation,
                current = self.loader.current_generation(),
                "dropping stale dashboard frame"
            );
            return Ok(FrameOutcome::Stale);
        }
        self.renderer.render_frame(frame)?;
        Ok(FrameOutcome::Rendered)
    }

    /// Load the selection in `inputs` and draw it.
    ///
    /// Returns `Ok(None)` when nothing is selected; no fetch is made and no
    /// chart is touched.
    pub async fn load_dashboard(&mut self, inputs: &CountryInputs) -> DashboardResult<Option<FrameOutcome>> {
        let Some(frame) = self.loader.load_dashboard(inputs).await? else {
            return Ok(None);
        };
        self.apply_frame(&frame).map(Some)
    }
}
