use std::collections::HashMap;

use costmap_shared::{FeatureId, Granularity, LngLat};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::zoom::LayerPaint;

/// Named boolean the renderer's paint expressions read per feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureFlag {
    Hover,
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagSet {
    pub hover: bool,
    pub selected: bool,
}

impl FlagSet {
    pub const fn get(&self, flag: FeatureFlag) -> bool {
        match flag {
            FeatureFlag::Hover => self.hover,
            FeatureFlag::Selected => self.selected,
        }
    }

    fn set(&mut self, flag: FeatureFlag, value: bool) {
        match flag {
            FeatureFlag::Hover => self.hover = value,
            FeatureFlag::Selected => self.selected = value,
        }
    }

    pub const fn is_clear(&self) -> bool {
        !self.hover && !self.selected
    }
}

/// Animated camera move. Unset fields keep their current value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraEase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<LngLat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
    pub duration_ms: u32,
}

/// Instructions for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RenderCommand {
    SetFeatureFlag {
        granularity: Granularity,
        id: FeatureId,
        flag: FeatureFlag,
        value: bool,
    },
    CameraEase(CameraEase),
    SetLayerPaint {
        granularity: Granularity,
        paint: LayerPaint,
    },
}

/// Where hover and selection flag writes go.
pub trait FeatureStateSink {
    fn set_feature_flag(
        &mut self,
        granularity: Granularity,
        id: FeatureId,
        flag: FeatureFlag,
        value: bool,
    );
}

impl FeatureStateSink for Vec<RenderCommand> {
    fn set_feature_flag(
        &mut self,
        granularity: Granularity,
        id: FeatureId,
        flag: FeatureFlag,
        value: bool,
    ) {
        self.push(RenderCommand::SetFeatureFlag {
            granularity,
            id,
            flag,
            value,
        });
    }
}

/// Engine-owned copy of every flag it has pushed to the renderer, keyed by
/// granularity and id. Features with no flags set are not stored.
#[derive(Debug, Default)]
pub struct FeatureStates {
    flags: HashMap<(Granularity, FeatureId), FlagSet>,
}

impl FeatureStates {
    pub fn get(&self, granularity: Granularity, id: FeatureId) -> FlagSet {
        self.flags
            .get(&(granularity, id))
            .copied()
            .unwrap_or_default()
    }

    /// Ids carrying `flag` within one granularity, sorted.
    pub fn flagged(&self, granularity: Granularity, flag: FeatureFlag) -> Vec<FeatureId> {
        let mut ids: Vec<_> = self
            .flags
            .iter()
            .filter(|((g, _), set)| *g == granularity && set.get(flag))
            .map(|((_, id), _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Returns whether the stored value changed.
    pub fn apply(
        &mut self,
        granularity: Granularity,
        id: FeatureId,
        flag: FeatureFlag,
        value: bool,
    ) -> bool {
        let key = (granularity, id);
        let mut set = self.flags.get(&key).copied().unwrap_or_default();
        if set.get(flag) == value {
            return false;
        }
        set.set(flag, value);
        if set.is_clear() {
            self.flags.remove(&key);
        } else {
            self.flags.insert(key, set);
        }
        true
    }
}

/// Records flag writes in [`FeatureStates`] and forwards only the ones that
/// change a stored value to the wrapped sink.
pub struct RecordingSink<'a, S> {
    pub states: &'a mut FeatureStates,
    pub inner: &'a mut S,
}

impl<S: FeatureStateSink> FeatureStateSink for RecordingSink<'_, S> {
    fn set_feature_flag(
        &mut self,
        granularity: Granularity,
        id: FeatureId,
        flag: FeatureFlag,
        value: bool,
    ) {
        if !self.states.apply(granularity, id, flag, value) {
            trace!(?granularity, id, ?flag, value, "flag already set, write skipped");
            return;
        }
        self.inner.set_feature_flag(granularity, id, flag, value);
    }
}
