use costmap_shared::{FeatureId, Granularity};

use crate::feature_state::{FeatureFlag, FeatureStateSink};

/// Tracks the single hovered feature of one granularity.
#[derive(Debug, Clone)]
pub struct HoverTracker {
    granularity: Granularity,
    current: Option<FeatureId>,
}

impl HoverTracker {
    pub const fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            current: None,
        }
    }

    pub const fn current(&self) -> Option<FeatureId> {
        self.current
    }

    /// Moves the hover flag to `id`. Re-hovering the current feature writes
    /// nothing.
    pub fn on_pointer_move(&mut self, id: FeatureId, sink: &mut impl FeatureStateSink) {
        if self.current == Some(id) {
            return;
        }
        self.clear(sink);
        self.current = Some(id);
        sink.set_feature_flag(self.granularity, id, FeatureFlag::Hover, true);
    }

    pub fn on_pointer_leave(&mut self, sink: &mut impl FeatureStateSink) {
        self.clear(sink);
    }

    fn clear(&mut self, sink: &mut impl FeatureStateSink) {
        if let Some(previous) = self.current.take() {
            sink.set_feature_flag(self.granularity, previous, FeatureFlag::Hover, false);
        }
    }
}
