use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::VenueStore;
use crate::model::{CombinationId, Table, TableCombination, TableId, VenueId};

/// In-memory venue store.
///
/// Deterministic backend for unit tests and embedded/demo deployments where
/// reference data is seeded at startup.
#[derive(Default, Clone)]
pub struct InMemoryVenueStore {
    tables: Arc<Mutex<HashMap<TableId, Table>>>,
    combinations: Arc<Mutex<HashMap<CombinationId, TableCombination>>>,
}

impl InMemoryVenueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VenueStore for InMemoryVenueStore {
    async fn load_tables(&self, venue_id: VenueId) -> anyhow::Result<Vec<Table>> {
        let mut tables: Vec<Table> = self
            .tables
            .lock()
            .await
            .values()
            .filter(|t| t.venue_id == venue_id)
            .cloned()
            .collect();

        // Stable order so callers see reproducible snapshots.
        tables.sort_by_key(|t| t.id);
        Ok(tables)
    }

    async fn load_combinations(&self, venue_id: VenueId) -> anyhow::Result<Vec<TableCombination>> {
        let mut combos: Vec<TableCombination> = self
            .combinations
            .lock()
            .await
            .values()
            .filter(|c| c.venue_id == venue_id)
            .cloned()
            .collect();

        combos.sort_by_key(|c| c.id);
        Ok(combos)
    }

    async fn save_table(&self, table: &Table) -> anyhow::Result<()> {
        self.tables.lock().await.insert(table.id, table.clone());
        Ok(())
    }

    async fn save_combination(&self, combination: &TableCombination) -> anyhow::Result<()> {
        self.combinations
            .lock()
            .await
            .insert(combination.id, combination.clone());
        Ok(())
    }
}
