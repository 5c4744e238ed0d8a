use serde::{Deserialize, Serialize};

use crate::costs::RegionCosts;
use crate::feature::FeatureId;
use crate::geometry::LngLat;

/// A clicked district as shown in the detail panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictSelection {
    pub id: FeatureId,
    pub name: String,
    pub province: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub umr: Option<f64>,
    #[serde(flatten)]
    pub centroid: LngLat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<RegionCosts>,
}

/// A clicked province. Provinces open a summary view but are never
/// highlighted as selected on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceSelection {
    pub name: String,
    #[serde(flatten)]
    pub centroid: LngLat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_umr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_count: Option<u32>,
}

/// What the host application receives when the user clicks a region.
///
/// Serialized untagged: the presence of a `province` field is what tells a
/// district selection apart from a province one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegionSelection {
    District(DistrictSelection),
    Province(ProvinceSelection),
}

impl RegionSelection {
    pub fn name(&self) -> &str {
        match self {
            Self::District(district) => &district.name,
            Self::Province(province) => &province.name,
        }
    }

    pub fn centroid(&self) -> LngLat {
        match self {
            Self::District(district) => district.centroid,
            Self::Province(province) => province.centroid,
        }
    }

    pub fn district_id(&self) -> Option<FeatureId> {
        match self {
            Self::District(district) => Some(district.id),
            Self::Province(_) => None,
        }
    }

    pub fn costs(&self) -> Option<&RegionCosts> {
        match self {
            Self::District(district) => district.costs.as_ref(),
            Self::Province(_) => None,
        }
    }

    /// A new district selection carrying `costs`. Province selections have
    /// nowhere to put costs and come back as `None`.
    pub fn with_costs(&self, costs: RegionCosts) -> Option<Self> {
        match self {
            Self::District(district) => Some(Self::District(DistrictSelection {
                costs: Some(costs),
                ..district.clone()
            })),
            Self::Province(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DistrictSelection, ProvinceSelection, RegionSelection};
    use crate::costs::{CostCategory, CostRange, RegionCosts};
    use crate::geometry::LngLat;

    fn district() -> RegionSelection {
        RegionSelection::District(DistrictSelection {
            id: 42,
            name: "Kota Bandung".to_string(),
            province: "Jawa Barat".to_string(),
            kind: Some("kota".to_string()),
            umr: Some(4_209_309.0),
            centroid: LngLat::new(107.6, -6.9),
            costs: None,
        })
    }

    #[test]
    fn district_serializes_with_province_and_flat_centroid() {
        let json = serde_json::to_value(district()).expect("selection should serialize");
        assert_eq!(json["id"], 42);
        assert_eq!(json["province"], "Jawa Barat");
        assert_eq!(json["type"], "kota");
        assert_eq!(json["lng"], 107.6);
        assert_eq!(json["lat"], -6.9);
        assert!(json.get("costs").is_none());
    }

    #[test]
    fn untagged_round_trip_discriminates_on_province_field() {
        let province = RegionSelection::Province(ProvinceSelection {
            name: "Bali".to_string(),
            centroid: LngLat::new(115.1, -8.4),
            avg_umr: Some(2_900_000.0),
            region_count: Some(9),
        });
        let json = serde_json::to_string(&province).expect("province should serialize");
        assert!(json.contains("\"avgUmr\""));
        assert!(!json.contains("\"province\""));

        let parsed: RegionSelection = serde_json::from_str(&json).expect("province should parse");
        assert_eq!(parsed, province);

        let json = serde_json::to_string(&district()).expect("district should serialize");
        let parsed: RegionSelection = serde_json::from_str(&json).expect("district should parse");
        assert_eq!(parsed.district_id(), Some(42));
    }

    #[test]
    fn with_costs_replaces_district_and_rejects_province() {
        let mut costs = RegionCosts::default();
        costs.set(
            CostCategory::Food,
            CostRange {
                min: 1.0,
                avg: 2.0,
                max: 3.0,
            },
        );

        let enriched = district().with_costs(costs.clone()).expect("district accepts costs");
        assert_eq!(enriched.costs(), Some(&costs));
        assert_eq!(enriched.district_id(), Some(42));
        assert_eq!(enriched.name(), "Kota Bandung");

        let province = RegionSelection::Province(ProvinceSelection {
            name: "Bali".to_string(),
            centroid: LngLat::ORIGIN,
            avg_umr: None,
            region_count: None,
        });
        assert_eq!(province.with_costs(costs), None);
    }
}
