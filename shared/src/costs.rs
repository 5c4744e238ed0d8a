use serde::{Deserialize, Deserializer, Serialize};

/// Monthly cost spread for one category, in rupiah.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRange {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostCategory {
    Rent,
    Food,
    Transport,
    Utilities,
    Other,
}

impl CostCategory {
    pub const ALL: [Self; 5] = [
        Self::Rent,
        Self::Food,
        Self::Transport,
        Self::Utilities,
        Self::Other,
    ];
}

/// Living-cost breakdown for a district. Categories the data API does not
/// know about are dropped during deserialization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionCosts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<CostRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food: Option<CostRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<CostRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilities: Option<CostRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<CostRange>,
}

impl RegionCosts {
    pub fn get(&self, category: CostCategory) -> Option<&CostRange> {
        match category {
            CostCategory::Rent => self.rent.as_ref(),
            CostCategory::Food => self.food.as_ref(),
            CostCategory::Transport => self.transport.as_ref(),
            CostCategory::Utilities => self.utilities.as_ref(),
            CostCategory::Other => self.other.as_ref(),
        }
    }

    pub fn set(&mut self, category: CostCategory, range: CostRange) {
        let slot = match category {
            CostCategory::Rent => &mut self.rent,
            CostCategory::Food => &mut self.food,
            CostCategory::Transport => &mut self.transport,
            CostCategory::Utilities => &mut self.utilities,
            CostCategory::Other => &mut self.other,
        };
        *slot = Some(range);
    }

    /// Present categories in display order.
    pub fn iter(&self) -> impl Iterator<Item = (CostCategory, &CostRange)> + '_ {
        CostCategory::ALL
            .into_iter()
            .filter_map(|category| self.get(category).map(|range| (category, range)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// `None` for an empty breakdown, so callers can treat "no categories"
    /// the same as "no data".
    pub fn non_empty(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

/// Accepts embedded costs either as an object or as a JSON-encoded string.
/// Vector tile property bags flatten nested objects into strings.
pub fn deserialize_embedded_costs<'de, D>(deserializer: D) -> Result<Option<RegionCosts>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Embedded {
        Encoded(String),
        Inline(RegionCosts),
    }

    let costs = match Option::<Embedded>::deserialize(deserializer)? {
        None => None,
        Some(Embedded::Inline(costs)) => Some(costs),
        Some(Embedded::Encoded(raw)) => serde_json::from_str::<RegionCosts>(&raw).ok(),
    };
    Ok(costs.and_then(RegionCosts::non_empty))
}
