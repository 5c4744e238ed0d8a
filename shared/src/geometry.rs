use serde::{Deserialize, Serialize};

/// A `[lng, lat]` coordinate pair as it appears in GeoJSON.
pub type Position = [f64; 2];
pub type Ring = Vec<Position>;

/// Polygonal feature geometry in GeoJSON shape. Anything that is not a
/// well-formed polygon or multipolygon lands in `Unsupported` instead of
/// failing the whole feature.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", from = "serde_json::Value")]
pub enum Geometry {
    Polygon {
        coordinates: Vec<Ring>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Ring>>,
    },
    #[default]
    Unsupported,
}

/// Wire shape before positions are narrowed to `[lng, lat]`. Positions may
/// carry extra members such as altitude.
#[derive(Deserialize)]
#[serde(tag = "type")]
enum GeometryBody {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Other,
}

fn narrow_ring(raw: Vec<Vec<f64>>) -> Option<Ring> {
    raw.into_iter()
        .map(|position| match position.as_slice() {
            [lng, lat, ..] => Some([*lng, *lat]),
            _ => None,
        })
        .collect()
}

fn narrow_polygon(raw: Vec<Vec<Vec<f64>>>) -> Option<Vec<Ring>> {
    raw.into_iter().map(narrow_ring).collect()
}

impl From<serde_json::Value> for Geometry {
    fn from(value: serde_json::Value) -> Self {
        let parsed = match serde_json::from_value::<GeometryBody>(value) {
            Ok(GeometryBody::Polygon { coordinates }) => {
                narrow_polygon(coordinates).map(|coordinates| Self::Polygon { coordinates })
            }
            Ok(GeometryBody::MultiPolygon { coordinates }) => coordinates
                .into_iter()
                .map(narrow_polygon)
                .collect::<Option<Vec<_>>>()
                .map(|coordinates| Self::MultiPolygon { coordinates }),
            Ok(GeometryBody::Other) | Err(_) => None,
        };
        parsed.unwrap_or(Self::Unsupported)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const ORIGIN: Self = Self { lng: 0.0, lat: 0.0 };

    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl Geometry {
    /// The ring used to place markers and popups.
    ///
    /// Polygons use their outer ring. Multipolygons use the outer ring with
    /// the most points, first one winning on ties, which approximates the
    /// largest landmass without computing areas.
    pub fn representative_ring(&self) -> Option<&[Position]> {
        match self {
            Self::Polygon { coordinates } => coordinates.first().map(Vec::as_slice),
            Self::MultiPolygon { coordinates } => {
                let mut best: Option<&[Position]> = None;
                for outer in coordinates.iter().filter_map(|polygon| polygon.first()) {
                    if outer.len() > best.map_or(0, <[Position]>::len) {
                        best = Some(outer);
                    }
                }
                best
            }
            Self::Unsupported => None,
        }
    }

    /// Mean of the representative ring's coordinates, or the origin when
    /// there is nothing to average.
    pub fn centroid(&self) -> LngLat {
        let Some(ring) = self.representative_ring() else {
            return LngLat::ORIGIN;
        };
        if ring.is_empty() {
            return LngLat::ORIGIN;
        }

        let (sum_x, sum_y) = ring
            .iter()
            .fold((0.0, 0.0), |(sx, sy), [x, y]| (sx + x, sy + y));
        let n = ring.len() as f64;
        LngLat::new(sum_x / n, sum_y / n)
    }
}
