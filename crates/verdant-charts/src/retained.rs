//! A `ChartBackend` that keeps every live chart's spec in memory.
//!
//! Hosts that draw charts themselves (the terminal UI) or print them (the
//! CLI) read specs back out of it; tests use its counters to check that no
//! chart outlives its canvas.

use std::collections::BTreeMap;

use tracing::warn;

use verdant_contracts::{
    chart::{CanvasId, ChartSpec},
    error::DashboardResult,
};
use verdant_core::traits::ChartBackend;

/// Handle to a chart held by a `RetainedBackend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChartHandle(u64);

#[derive(Debug, Default)]
pub struct RetainedBackend {
    live: BTreeMap<ChartHandle, (CanvasId, ChartSpec)>,
    next: u64,
    created: u64,
    destroyed: u64,
}

impl RetainedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of charts created and not yet destroyed.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Live charts currently drawn on `canvas`.
    pub fn live_on(&self, canvas: &CanvasId) -> usize {
        self.live.values().filter(|(c, _)| c == canvas).count()
    }

    /// The spec of the live chart on `canvas`, if any.
    pub fn spec_for(&self, canvas: &CanvasId) -> Option<&ChartSpec> {
        self.live
            .values()
            .find(|(c, _)| c == canvas)
            .map(|(_, spec)| spec)
    }

    /// Total `create` calls so far.
    pub fn created(&self) -> u64 {
        self.created
    }

    /// Total `destroy` calls that released a live chart.
    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }
}

impl ChartBackend for RetainedBackend {
    type Handle = ChartHandle;

    fn create(&mut self, canvas: &CanvasId, spec: &ChartSpec) -> DashboardResult<ChartHandle> {
        let handle = ChartHandle(self.next);
        self.next += 1;
        self.created += 1;
        self.live.insert(handle, (canvas.clone(), spec.clone()));
        Ok(handle)
    }

    fn destroy(&mut self, handle: ChartHandle) {
        if self.live.remove(&handle).is_some() {
            self.destroyed += 1;
        } else {
            warn!(handle = handle.0, "destroy called for unknown chart");
        }
    }
}
