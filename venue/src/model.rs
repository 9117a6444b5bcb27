use std::fmt;
use std::str::FromStr;

pub type VenueId = uuid::Uuid;
pub type TableId = uuid::Uuid;
pub type CombinationId = uuid::Uuid;

/// Floor zone a table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Upstairs,
    Downstairs,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Location::Upstairs => "Upstairs",
            Location::Downstairs => "Downstairs",
        };
        f.write_str(s)
    }
}

impl FromStr for Location {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Upstairs" => Ok(Location::Upstairs),
            "Downstairs" => Ok(Location::Downstairs),
            other => Err(anyhow::anyhow!("Invalid Location value: {}", other)),
        }
    }
}

/// A single bookable physical seating unit.
///
/// Capacities are party-size bounds: a table seats `party_size` iff
/// `min_capacity <= party_size <= max_capacity`. `preferred_capacity` is the
/// venue's intended party size for the table and only influences ranking.
/// Amounts are minor currency units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub id: TableId,
    pub venue_id: VenueId,

    pub label: String,
    pub location: Location,

    pub min_capacity: u32,
    pub preferred_capacity: u32,
    pub max_capacity: u32,

    pub is_premium: bool,
    pub is_booth: bool,

    pub min_spend: u64,
    pub deposit: u64,

    /// Soft-deactivated tables stay in the store but are never offered.
    pub is_active: bool,
}

impl Table {
    pub fn seats(&self, party_size: u32) -> bool {
        self.min_capacity <= party_size && party_size <= self.max_capacity
    }

    /// min <= preferred <= max
    pub fn capacity_bounds_valid(&self) -> bool {
        self.min_capacity <= self.preferred_capacity && self.preferred_capacity <= self.max_capacity
    }
}

/// A venue-curated rule: these tables may be offered jointly as one unit.
///
/// `combined_capacity` is venue-declared, not the arithmetic sum of member
/// capacities (joining tables can lose seats to shared space).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCombination {
    pub id: CombinationId,
    pub venue_id: VenueId,

    /// Member tables, two or more.
    pub table_ids: Vec<TableId>,

    pub combined_capacity: u32,

    /// "This is the intended combination for this capacity."
    pub is_preferred: bool,
}
