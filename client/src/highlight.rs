use costmap_shared::{FeatureId, Granularity};

use crate::feature_state::{FeatureFlag, FeatureStateSink};

/// Keeps the renderer's "selected" flag on the host's selected district.
/// One instance per map session.
#[derive(Debug, Clone, Default)]
pub struct SelectionHighlighter {
    previous: Option<FeatureId>,
}

impl SelectionHighlighter {
    pub const fn previous(&self) -> Option<FeatureId> {
        self.previous
    }

    /// Clears the old flag, then sets the new one.
    pub fn on_selection_change(
        &mut self,
        selected: Option<FeatureId>,
        sink: &mut impl FeatureStateSink,
    ) {
        if let Some(previous) = self.previous.take() {
            sink.set_feature_flag(Granularity::District, previous, FeatureFlag::Selected, false);
        }
        if let Some(id) = selected {
            sink.set_feature_flag(Granularity::District, id, FeatureFlag::Selected, true);
        }
        self.previous = selected;
    }
}
