pub mod costs;
pub mod feature;
pub mod geometry;
pub mod selection;

pub use costs::{CostCategory, CostRange, RegionCosts};
pub use feature::{Feature, FeatureId, FeatureProperties, Granularity};
pub use geometry::{Geometry, LngLat};
pub use selection::{DistrictSelection, ProvinceSelection, RegionSelection};
