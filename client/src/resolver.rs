use costmap_shared::{
    DistrictSelection, Feature, FeatureId, Granularity, ProvinceSelection, RegionSelection,
};
use tracing::{debug, info, warn};

use crate::cost_cache::CostCache;
use crate::fetch::CostFetchOutcome;
use crate::zoom::ZoomSwitch;

/// What a click produced: the selection to show right away and, for an
/// uncached district, the id whose costs should be fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickResolution {
    pub selection: RegionSelection,
    pub fetch: Option<FeatureId>,
}

/// Turns clicks into [`RegionSelection`]s and folds fetched costs back in.
#[derive(Debug, Default)]
pub struct SelectionResolver {
    switch: ZoomSwitch,
    cache: CostCache,
}

impl SelectionResolver {
    pub fn new(switch: ZoomSwitch) -> Self {
        Self {
            switch,
            cache: CostCache::default(),
        }
    }

    pub fn cache(&self) -> &CostCache {
        &self.cache
    }

    /// `None` when the click landed on the inactive granularity or the
    /// feature carries no id.
    pub fn on_click(
        &mut self,
        granularity: Granularity,
        feature: &Feature,
        zoom: f64,
    ) -> Option<ClickResolution> {
        if !self.switch.is_active(granularity, zoom) {
            debug!(?granularity, zoom, "ignoring click on inactive layer");
            return None;
        }
        let Some(id) = feature.id else {
            warn!(?granularity, name = %feature.properties.name, "click on feature without id dropped");
            return None;
        };

        let centroid = feature.geometry.centroid();
        let props = &feature.properties;

        if granularity == Granularity::Province {
            return Some(ClickResolution {
                selection: RegionSelection::Province(ProvinceSelection {
                    name: props.name.clone(),
                    centroid,
                    avg_umr: props.avg_umr,
                    region_count: props.region_count,
                }),
                fetch: None,
            });
        }

        if let Some(embedded) = props.costs.clone() {
            self.cache.insert(id, embedded);
        }
        let costs = self.cache.get(id).cloned();
        let fetch = if costs.is_none() && self.cache.begin_fetch(id) {
            Some(id)
        } else {
            None
        };
        if costs.is_none() && fetch.is_none() {
            debug!(district_id = id, "cost fetch already in flight");
        }

        Some(ClickResolution {
            selection: RegionSelection::District(DistrictSelection {
                id,
                name: props.name.clone(),
                province: props.province.clone().unwrap_or_default(),
                kind: props.kind.clone(),
                umr: props.umr,
                centroid,
                costs,
            }),
            fetch,
        })
    }

    /// Caches a successful fetch. Returns the enriched selection only when
    /// `open` still shows the district the fetch was issued for.
    pub fn on_costs_fetched(
        &mut self,
        outcome: CostFetchOutcome,
        open: Option<&RegionSelection>,
    ) -> Option<RegionSelection> {
        let CostFetchOutcome {
            district_id,
            result,
        } = outcome;
        self.cache.finish_fetch(district_id);

        let costs = match result {
            Ok(costs) if !costs.is_empty() => costs,
            Ok(_) => {
                debug!(district_id, "no cost data for district");
                return None;
            }
            Err(e) => {
                warn!(district_id, error = %e, "cost fetch failed");
                return None;
            }
        };

        info!(district_id, categories = costs.iter().count(), "cached district costs");
        self.cache.insert(district_id, costs.clone());

        let open = open?;
        if open.district_id() != Some(district_id) {
            debug!(district_id, "selection moved on, skipping enrichment");
            return None;
        }
        open.with_costs(costs)
    }
}

#[cfg(test)]
mod tests {
    use costmap_shared::{
        CostCategory, CostRange, Feature, FeatureProperties, Geometry, Granularity, LngLat,
        RegionCosts, RegionSelection,
    };

    use super::SelectionResolver;
    use crate::fetch::{CostFetchOutcome, FetchError};

    fn unit_square() -> Geometry {
        Geometry::Polygon {
            coordinates: vec![vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]]],
        }
    }

    fn district(id: u64) -> Feature {
        Feature {
            id: Some(id),
            geometry: unit_square(),
            properties: FeatureProperties {
                name: format!("District {id}"),
                province: Some("Jawa Barat".to_string()),
                kind: Some("kabupaten".to_string()),
                umr: Some(3_000_000.0),
                ..FeatureProperties::default()
            },
        }
    }

    fn province(id: u64) -> Feature {
        Feature {
            id: Some(id),
            geometry: unit_square(),
            properties: FeatureProperties {
                name: "Bali".to_string(),
                avg_umr: Some(2_900_000.0),
                region_count: Some(9),
                ..FeatureProperties::default()
            },
        }
    }

    fn costs() -> RegionCosts {
        let mut costs = RegionCosts::default();
        costs.set(
            CostCategory::Rent,
            CostRange {
                min: 1.0,
                avg: 2.0,
                max: 3.0,
            },
        );
        costs
    }

    fn fetched(district_id: u64, result: Result<RegionCosts, FetchError>) -> CostFetchOutcome {
        CostFetchOutcome {
            district_id,
            result,
        }
    }

    #[test]
    fn clicks_on_inactive_layer_are_ignored() {
        let mut resolver = SelectionResolver::default();
        assert!(resolver.on_click(Granularity::District, &district(1), 5.0).is_none());
        assert!(resolver.on_click(Granularity::Province, &province(1), 8.0).is_none());
        assert_eq!(resolver.cache().in_flight_count(), 0);
    }

    #[test]
    fn click_without_feature_id_is_dropped() {
        let mut resolver = SelectionResolver::default();
        let mut feature = district(1);
        feature.id = None;
        assert!(resolver.on_click(Granularity::District, &feature, 8.0).is_none());
    }

    #[test]
    fn province_click_resolves_without_fetch() {
        let mut resolver = SelectionResolver::default();
        let resolution = resolver
            .on_click(Granularity::Province, &province(3), 5.0)
            .expect("province click resolves");

        assert_eq!(resolution.fetch, None);
        let RegionSelection::Province(selection) = resolution.selection else {
            panic!("expected province selection");
        };
        assert_eq!(selection.name, "Bali");
        assert_eq!(selection.centroid, LngLat::new(1.0, 1.0));
        assert_eq!(selection.region_count, Some(9));
    }

    #[test]
    fn district_miss_emits_costless_selection_and_requests_fetch() {
        let mut resolver = SelectionResolver::default();
        let resolution = resolver
            .on_click(Granularity::District, &district(42), 8.0)
            .expect("district click resolves");

        assert_eq!(resolution.fetch, Some(42));
        assert_eq!(resolution.selection.district_id(), Some(42));
        assert_eq!(resolution.selection.costs(), None);
        assert_eq!(resolution.selection.centroid(), LngLat::new(1.0, 1.0));
    }

    #[test]
    fn reclick_while_fetch_pending_does_not_refetch() {
        let mut resolver = SelectionResolver::default();
        resolver.on_click(Granularity::District, &district(7), 8.0);
        let second = resolver
            .on_click(Granularity::District, &district(7), 8.0)
            .expect("district click resolves");

        assert_eq!(second.fetch, None);
        assert_eq!(second.selection.costs(), None);
    }

    #[test]
    fn successful_fetch_enriches_open_selection_and_fills_cache() {
        let mut resolver = SelectionResolver::default();
        let first = resolver
            .on_click(Granularity::District, &district(42), 8.0)
            .expect("district click resolves");

        let enriched = resolver
            .on_costs_fetched(fetched(42, Ok(costs())), Some(&first.selection))
            .expect("open selection is enriched");
        assert_eq!(enriched.costs(), Some(&costs()));
        assert_eq!(enriched.name(), first.selection.name());

        let again = resolver
            .on_click(Granularity::District, &district(42), 8.0)
            .expect("district click resolves");
        assert_eq!(again.fetch, None);
        assert_eq!(again.selection.costs(), Some(&costs()));
    }

    #[test]
    fn stale_fetch_populates_cache_without_enrichment() {
        let mut resolver = SelectionResolver::default();
        resolver.on_click(Granularity::District, &district(1), 8.0);
        let current = resolver
            .on_click(Granularity::District, &district(2), 8.0)
            .expect("district click resolves");

        let emitted = resolver.on_costs_fetched(fetched(1, Ok(costs())), Some(&current.selection));
        assert_eq!(emitted, None);
        assert!(resolver.cache().get(1).is_some());
        assert!(!resolver.cache().is_in_flight(1));
        assert!(resolver.cache().is_in_flight(2));
    }

    #[test]
    fn failed_or_empty_fetch_emits_nothing_and_allows_retry() {
        let mut resolver = SelectionResolver::default();
        let first = resolver
            .on_click(Granularity::District, &district(5), 8.0)
            .expect("district click resolves");

        let failed = resolver.on_costs_fetched(
            fetched(5, Err(FetchError::Status(500))),
            Some(&first.selection),
        );
        assert_eq!(failed, None);

        let retry = resolver
            .on_click(Granularity::District, &district(5), 8.0)
            .expect("district click resolves");
        assert_eq!(retry.fetch, Some(5));

        let empty =
            resolver.on_costs_fetched(fetched(5, Ok(RegionCosts::default())), Some(&retry.selection));
        assert_eq!(empty, None);
        assert!(resolver.cache().get(5).is_none());
    }

    #[test]
    fn embedded_costs_skip_the_fetch() {
        let mut resolver = SelectionResolver::default();
        let mut feature = district(11);
        feature.properties.costs = Some(costs());

        let resolution = resolver
            .on_click(Granularity::District, &feature, 9.0)
            .expect("district click resolves");
        assert_eq!(resolution.fetch, None);
        assert_eq!(resolution.selection.costs(), Some(&costs()));
        assert!(resolver.cache().get(11).is_some());
    }
}
