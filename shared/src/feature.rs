use serde::{Deserialize, Serialize};

use crate::costs::{RegionCosts, deserialize_embedded_costs};
use crate::geometry::Geometry;

/// Renderer-assigned feature identifier. Unique within one granularity only;
/// province and district ids live in separate id spaces.
pub type FeatureId = u64;

/// Administrative level a feature belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Province,
    District,
}

impl Granularity {
    pub const ALL: [Self; 2] = [Self::Province, Self::District];

    /// Name of the renderer source holding this granularity's features.
    pub const fn source(self) -> &'static str {
        match self {
            Self::Province => "provinces",
            Self::District => "regions",
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::Province => Self::District,
            Self::District => Self::Province,
        }
    }
}

/// Property bag carried by a feature. Province features fill `avg_umr` and
/// `region_count`; district features fill `province`, `kind` and `umr`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureProperties {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Regional minimum wage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub umr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_umr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_count: Option<u32>,
    #[serde(
        default,
        deserialize_with = "deserialize_embedded_costs",
        skip_serializing_if = "Option::is_none"
    )]
    pub costs: Option<RegionCosts>,
}

/// A single interactive shape as delivered by the renderer on pointer events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub id: Option<FeatureId>,
    #[serde(default)]
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: FeatureProperties,
}

#[cfg(test)]
mod tests {
    use super::{Feature, Granularity};
    use crate::geometry::Geometry;

    #[test]
    fn parses_district_feature_with_string_encoded_costs() {
        let payload = r#"{
            "id": 42,
            "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,2]]]},
            "properties": {
                "name": "Kota Bandung",
                "province": "Jawa Barat",
                "type": "kota",
                "umr": 4209309,
                "costs": "{\"rent\":{\"min\":1,\"avg\":2,\"max\":3}}"
            }
        }"#;
        let feature: Feature = serde_json::from_str(payload).expect("feature should parse");

        assert_eq!(feature.id, Some(42));
        assert_eq!(feature.properties.kind.as_deref(), Some("kota"));
        assert_eq!(feature.properties.province.as_deref(), Some("Jawa Barat"));
        let costs = feature.properties.costs.expect("embedded costs should parse");
        assert_eq!(costs.rent.map(|r| r.avg), Some(2.0));
    }

    #[test]
    fn empty_or_malformed_embedded_costs_are_absent() {
        for costs in [r#""{}""#, r#"{}"#, r#""not json""#, "null"] {
            let payload = format!(
                r#"{{"geometry": {{"type": "Polygon", "coordinates": []}},
                    "properties": {{"name": "X", "costs": {costs}}}}}"#
            );
            let feature: Feature = serde_json::from_str(&payload).expect("feature should parse");
            assert_eq!(feature.properties.costs, None, "costs = {costs}");
        }
    }

    #[test]
    fn parses_province_feature_without_id() {
        let payload = r#"{
            "geometry": {"type": "Point", "coordinates": [1, 2]},
            "properties": {"name": "Bali", "avgUmr": 2900000.5, "regionCount": 9}
        }"#;
        let feature: Feature = serde_json::from_str(payload).expect("feature should parse");

        assert_eq!(feature.id, None);
        assert_eq!(feature.geometry, Geometry::Unsupported);
        assert_eq!(feature.properties.avg_umr, Some(2_900_000.5));
        assert_eq!(feature.properties.region_count, Some(9));
    }

    #[test]
    fn broken_or_missing_geometry_keeps_the_feature() {
        for geometry in [
            r#""geometry": {"type": "Polygon", "coordinates": null},"#,
            r#""geometry": null,"#,
            "",
        ] {
            let payload = format!(r#"{{"id": 5, {geometry} "properties": {{"name": "Kota Batu"}}}}"#);
            let feature: Feature = serde_json::from_str(&payload).expect("feature should parse");
            assert_eq!(feature.id, Some(5));
            assert_eq!(feature.geometry, Geometry::Unsupported, "{geometry}");
        }
    }

    #[test]
    fn granularity_sources_match_renderer_layers() {
        assert_eq!(Granularity::Province.source(), "provinces");
        assert_eq!(Granularity::District.source(), "regions");
        assert_eq!(Granularity::Province.other(), Granularity::District);
    }
}
