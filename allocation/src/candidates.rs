//! Enumerates what could seat the party: free tables whose capacity range
//! contains the party size, and curated combinations whose members are all
//! individually free.
//!
//! Infeasible options are excluded here, not deprioritized: the ranker is
//! never asked to order something that cannot seat the party. A party
//! smaller than every table's minimum yields an empty list, which the caller
//! surfaces as "no candidates", not an error.
//
//  This module is deliberately pure: no async, no IO.

use std::collections::{BTreeSet, HashMap};

use crate::types::{Candidate, CandidateKind};
use venue::model::{Table, TableCombination, TableId};

pub fn generate_candidates(
    tables: &[Table],
    combinations: &[TableCombination],
    available: &BTreeSet<TableId>,
    party_size: u32,
) -> Vec<Candidate> {
    let by_id: HashMap<TableId, &Table> = tables.iter().map(|t| (t.id, t)).collect();

    let mut out = Vec::new();

    for table in tables {
        if !available.contains(&table.id) || !table.seats(party_size) {
            continue;
        }

        out.push(Candidate {
            table_ids: vec![table.id],
            kind: CandidateKind::Single,
            capacity: table.max_capacity,
            min_spend: table.min_spend,
            deposit: table.deposit,
            // The only per-table curation signal: this table is meant for
            // exactly this party size.
            preferred: table.preferred_capacity == party_size,
            score: 0,
        });
    }

    for combo in combinations {
        if combo.combined_capacity < party_size {
            continue;
        }

        // Every member must be individually free; partial availability never
        // yields a degraded candidate.
        if !combo.table_ids.iter().all(|id| available.contains(id)) {
            continue;
        }

        let mut min_spend = 0u64;
        let mut deposit = 0u64;
        let mut members_known = true;
        for id in &combo.table_ids {
            match by_id.get(id) {
                Some(table) => {
                    min_spend += table.min_spend;
                    deposit += table.deposit;
                }
                None => {
                    members_known = false;
                    break;
                }
            }
        }
        if !members_known {
            continue;
        }

        out.push(Candidate {
            table_ids: combo.table_ids.clone(),
            kind: CandidateKind::Combination,
            capacity: combo.combined_capacity,
            min_spend,
            deposit,
            preferred: combo.is_preferred,
            score: 0,
        });
    }

    out
}
