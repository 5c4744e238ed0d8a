use std::collections::{HashMap, HashSet};

use costmap_shared::{FeatureId, RegionCosts};

/// Session-lifetime cost breakdowns keyed by district id, plus the set of
/// ids with a fetch in flight. Entries never expire.
#[derive(Debug, Default)]
pub struct CostCache {
    entries: HashMap<FeatureId, RegionCosts>,
    in_flight: HashSet<FeatureId>,
}

impl CostCache {
    pub fn get(&self, district_id: FeatureId) -> Option<&RegionCosts> {
        self.entries.get(&district_id)
    }

    /// Stores a non-empty breakdown. Empty ones are dropped so a later click
    /// can try again. Last writer wins.
    pub fn insert(&mut self, district_id: FeatureId, costs: RegionCosts) -> bool {
        if costs.is_empty() {
            return false;
        }
        self.entries.insert(district_id, costs);
        true
    }

    /// Claims a fetch slot for `district_id`. `false` when the costs are
    /// already cached or another fetch for the same id has not finished.
    pub fn begin_fetch(&mut self, district_id: FeatureId) -> bool {
        if self.entries.contains_key(&district_id) {
            return false;
        }
        self.in_flight.insert(district_id)
    }

    pub fn finish_fetch(&mut self, district_id: FeatureId) {
        self.in_flight.remove(&district_id);
    }

    pub fn is_in_flight(&self, district_id: FeatureId) -> bool {
        self.in_flight.contains(&district_id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
