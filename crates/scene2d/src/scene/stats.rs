//! Per-frame counters

use serde::{Deserialize, Serialize};

/// Counters collected while preparing and culling one frame.
///
/// [`reset`](Self::reset) runs at the start of `prepare()`; the culling
/// counters are reset again at the start of every `collect()` so repeated
/// queries in one frame do not accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameStats {
    /// Nodes visited by world preparation, cached or not
    pub nodes_updated: usize,
    /// Parent/child matrix compositions performed
    pub matrix_multiplications: usize,
    /// Nodes tested against the view rectangle
    pub culling_tested: usize,
    /// Nodes that passed the test
    pub culling_drawn: usize,
    /// Nodes that failed the test
    pub culling_rejected: usize,
    /// Nodes visited by the culler
    pub total_objects: usize,
    /// Nodes returned by the culler
    pub visible_objects: usize,
    /// `total_objects - visible_objects`
    pub culled_objects: usize,
    /// Deepest level the culler reached (root children are depth 1)
    pub max_depth: usize,
}

impl FrameStats {
    /// Zero every counter
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Zero only the counters written by the culler
    pub fn reset_culling(&mut self) {
        self.culling_tested = 0;
        self.culling_drawn = 0;
        self.culling_rejected = 0;
        self.total_objects = 0;
        self.visible_objects = 0;
        self.culled_objects = 0;
        self.max_depth = 0;
    }

    /// Whether nothing has been counted
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Emit a one-line summary at debug level
    pub fn log_summary(&self) {
        log::debug!(
            "Frame: {} nodes updated, {} multiplications, {}/{} visible ({} culled), max depth {}",
            self.nodes_updated,
            self.matrix_multiplications,
            self.visible_objects,
            self.total_objects,
            self.culled_objects,
            self.max_depth
        );
    }
}
