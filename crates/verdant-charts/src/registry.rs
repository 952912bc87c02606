//! Canvas → live chart bookkeeping.

use std::collections::BTreeMap;

use verdant_contracts::chart::CanvasId;

/// At most one live chart per canvas.
///
/// The registry only tracks handles; releasing the chart behind a handle is
/// the caller's job once `release` hands it back.
#[derive(Debug)]
pub struct ChartRegistry<H> {
    charts: BTreeMap<CanvasId, H>,
}

impl<H> Default for ChartRegistry<H> {
    fn default() -> Self {
        Self {
            charts: BTreeMap::new(),
        }
    }
}

impl<H> ChartRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the handle bound to `canvas`, leaving the canvas unbound.
    pub fn release(&mut self, canvas: &CanvasId) -> Option<H> {
        self.charts.remove(canvas)
    }

    /// Bind `handle` to `canvas`.
    ///
    /// Returns the previous handle if the canvas was still bound, which means
    /// the caller skipped `release`; that chart must be destroyed too.
    pub fn bind(&mut self, canvas: CanvasId, handle: H) -> Option<H> {
        self.charts.insert(canvas, handle)
    }

    pub fn get(&self, canvas: &CanvasId) -> Option<&H> {
        self.charts.get(canvas)
    }

    pub fn contains(&self, canvas: &CanvasId) -> bool {
        self.charts.contains_key(canvas)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    /// Bound canvases in identifier order.
    pub fn canvases(&self) -> impl Iterator<Item = &CanvasId> {
        self.charts.keys()
    }
}
