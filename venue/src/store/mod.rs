pub mod memory_store;
pub mod sqlite_store;

use crate::model::{Table, TableCombination, VenueId};

/// Read side of the venue reference data (tables and combination rules).
///
/// Reference data is administrative and slow-changing; the engine only ever
/// reads it. The save methods exist for seeding and admin tooling.
#[async_trait::async_trait]
pub trait VenueStore: Send + Sync {
    async fn load_tables(&self, venue_id: VenueId) -> anyhow::Result<Vec<Table>>;
    async fn load_combinations(&self, venue_id: VenueId) -> anyhow::Result<Vec<TableCombination>>;
    async fn save_table(&self, table: &Table) -> anyhow::Result<()>;
    async fn save_combination(&self, combination: &TableCombination) -> anyhow::Result<()>;
}
