use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use crate::model::{Location, Table, TableCombination, TableId, VenueId};
use crate::store::VenueStore;

/// In-memory cache of venue reference data, loaded per venue on first use.
///
/// Tables and combination rules are slow-changing admin data; the catalog
/// keeps one consistent snapshot per venue and re-reads it only on
/// [`VenueCatalog::refresh`]. Combination rules are validated at load time so
/// the candidate generator never sees a malformed rule.
pub struct VenueCatalog<S: VenueStore> {
    state: Arc<Mutex<CatalogState>>,
    store: Arc<S>,
}

#[derive(Default)]
struct CatalogState {
    tables: HashMap<TableId, Table>,
    venue_tables: HashMap<VenueId, Vec<TableId>>,
    venue_combinations: HashMap<VenueId, Vec<TableCombination>>,
}

impl<S: VenueStore> VenueCatalog<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CatalogState::default())),
            store,
        }
    }

    /// Re-read a venue's reference data from the store, replacing any cached
    /// snapshot. Admin edits become visible to the engine after this.
    pub async fn refresh(&self, venue_id: VenueId) -> anyhow::Result<()> {
        let tables = self.store.load_tables(venue_id).await?;
        let combinations = self.store.load_combinations(venue_id).await?;

        let mut kept_tables = Vec::with_capacity(tables.len());
        for table in tables {
            if !table.capacity_bounds_valid() {
                warn!(
                    table = %table.id,
                    label = %table.label,
                    "skipping table with inconsistent capacity bounds"
                );
                continue;
            }
            kept_tables.push(table);
        }

        let by_id: HashMap<TableId, &Table> = kept_tables.iter().map(|t| (t.id, t)).collect();
        let mut kept_combinations = Vec::with_capacity(combinations.len());
        for combo in combinations {
            if let Err(reason) = validate_combination(&combo, &by_id) {
                warn!(combination = %combo.id, %reason, "skipping invalid combination rule");
                continue;
            }
            kept_combinations.push(combo);
        }

        let mut state = self.state.lock().await;

        // Drop the venue's previous snapshot before inserting the new one.
        if let Some(old_ids) = state.venue_tables.remove(&venue_id) {
            for id in old_ids {
                state.tables.remove(&id);
            }
        }
        state.venue_combinations.remove(&venue_id);

        // Unknown and empty venues are never cached: the next query re-reads
        // the store, so a venue seeded after a miss becomes visible.
        if kept_tables.is_empty() && kept_combinations.is_empty() {
            return Ok(());
        }

        let ids: Vec<TableId> = kept_tables.iter().map(|t| t.id).collect();
        for table in kept_tables {
            state.tables.insert(table.id, table);
        }
        state.venue_tables.insert(venue_id, ids);
        state.venue_combinations.insert(venue_id, kept_combinations);

        Ok(())
    }

    async fn ensure_loaded(&self, venue_id: VenueId) -> anyhow::Result<()> {
        let loaded = {
            let state = self.state.lock().await;
            state.venue_tables.contains_key(&venue_id)
        };

        if !loaded {
            self.refresh(venue_id).await?;
        }
        Ok(())
    }

    /// Active tables for a venue, optionally filtered by floor zone.
    ///
    /// A venue that does not exist (or has no active tables) yields an empty
    /// list, never an error.
    pub async fn tables_for(
        &self,
        venue_id: VenueId,
        location: Option<Location>,
    ) -> anyhow::Result<Vec<Table>> {
        self.ensure_loaded(venue_id).await?;

        let state = self.state.lock().await;
        let Some(ids) = state.venue_tables.get(&venue_id) else {
            return Ok(Vec::new());
        };

        Ok(ids
            .iter()
            .filter_map(|id| state.tables.get(id))
            .filter(|t| t.is_active)
            .filter(|t| location.is_none_or(|loc| t.location == loc))
            .cloned()
            .collect())
    }

    /// Look up one table in a venue's snapshot (active or not).
    pub async fn table(&self, venue_id: VenueId, table_id: TableId) -> anyhow::Result<Option<Table>> {
        self.ensure_loaded(venue_id).await?;

        let state = self.state.lock().await;
        Ok(state
            .tables
            .get(&table_id)
            .filter(|t| t.venue_id == venue_id)
            .cloned())
    }

    /// Validated combination rules for a venue.
    pub async fn combinations_for(&self, venue_id: VenueId) -> anyhow::Result<Vec<TableCombination>> {
        self.ensure_loaded(venue_id).await?;

        let state = self.state.lock().await;
        Ok(state
            .venue_combinations
            .get(&venue_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// A combination rule is offered only when every member table is known and
/// active, the members all share the rule's venue and one floor zone, and
/// there are at least two of them.
fn validate_combination(
    combo: &TableCombination,
    tables: &HashMap<TableId, &Table>,
) -> Result<(), String> {
    if combo.table_ids.len() < 2 {
        return Err(format!("{} member(s), need at least 2", combo.table_ids.len()));
    }

    if combo.combined_capacity == 0 {
        return Err("combined capacity is zero".into());
    }

    let mut location: Option<Location> = None;
    for id in &combo.table_ids {
        let Some(table) = tables.get(id) else {
            return Err(format!("member table {} not found in venue", id));
        };

        if table.venue_id != combo.venue_id {
            return Err(format!("member table {} belongs to another venue", id));
        }

        if !table.is_active {
            return Err(format!("member table {} is inactive", id));
        }

        match location {
            None => location = Some(table.location),
            Some(loc) if loc != table.location => {
                return Err("member tables span floor zones".into());
            }
            Some(_) => {}
        }
    }

    Ok(())
}
