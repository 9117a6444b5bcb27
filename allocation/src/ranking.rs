//! Recommendation ranking: given feasible candidates, order them so the best
//! fit is presented first.
//!
//! Scoring is a deterministic integer sum of four components; ties break on
//! ascending deposit, then ascending smallest table id, so identical inputs
//! always produce identical orderings. Undersized candidates never reach
//! this stage (the generator excludes them).
//
//  This module is deliberately pure: no async, no IO.

use crate::types::{Candidate, CandidateKind, RankingConfig};

// Capacity-fit tiers by seats of slack over the party size.
const FIT_TIGHT: u32 = 40; // 0-2 spare seats
const FIT_CLOSE: u32 = 30; // 3-4
const FIT_LOOSE: u32 = 20; // 5-6
const FIT_OVERSIZED: u32 = 10; // more

// Cost-efficiency tiers by aggregate deposit.
const COST_LOW: u32 = 15;
const COST_MID: u32 = 10;
const COST_HIGH: u32 = 5;

/// Score, sort descending, truncate to `max_results`.
pub fn rank(
    mut candidates: Vec<Candidate>,
    party_size: u32,
    cfg: &RankingConfig,
    max_results: usize,
) -> Vec<Candidate> {
    // A single that seats the party is the structurally simpler offer; only
    // when no single fits does a combination become the preferred shape.
    let any_single = candidates
        .iter()
        .any(|c| c.kind == CandidateKind::Single);

    for candidate in &mut candidates {
        candidate.score = score(candidate, party_size, any_single, cfg);
    }

    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.deposit.cmp(&b.deposit))
            .then(a.min_table_id().cmp(&b.min_table_id()))
    });

    candidates.truncate(max_results);
    candidates
}

fn score(candidate: &Candidate, party_size: u32, any_single: bool, cfg: &RankingConfig) -> u32 {
    let slack = candidate.capacity.saturating_sub(party_size);
    let fit = match slack {
        0..=2 => FIT_TIGHT,
        3..=4 => FIT_CLOSE,
        5..=6 => FIT_LOOSE,
        _ => FIT_OVERSIZED,
    };

    let cost = if candidate.deposit < cfg.low_deposit {
        COST_LOW
    } else if candidate.deposit < cfg.mid_deposit {
        COST_MID
    } else {
        COST_HIGH
    };

    let structural = match candidate.kind {
        CandidateKind::Single => cfg.structural_bonus,
        CandidateKind::Combination if !any_single => cfg.structural_bonus,
        CandidateKind::Combination => 0,
    };

    let curated = if candidate.preferred { cfg.curated_bonus } else { 0 };

    fit + cost + structural + curated
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use venue::model::TableId;

    fn candidate(kind: CandidateKind, capacity: u32, deposit: u64) -> Candidate {
        let n = match kind {
            CandidateKind::Single => 1,
            CandidateKind::Combination => 2,
        };
        Candidate {
            table_ids: (0..n).map(|_| Uuid::new_v4()).collect(),
            kind,
            capacity,
            min_spend: deposit * 5,
            deposit,
            preferred: false,
            score: 0,
        }
    }

    fn cfg() -> RankingConfig {
        RankingConfig::default()
    }

    #[test]
    fn tighter_fit_ranks_first() {
        let snug = candidate(CandidateKind::Single, 6, 10_000);
        let roomy = candidate(CandidateKind::Single, 12, 10_000);
        let snug_id = snug.min_table_id();

        let out = rank(vec![roomy, snug], 5, &cfg(), 5);
        assert_eq!(out[0].min_table_id(), snug_id);
        assert!(out[0].score > out[1].score);
    }

    #[test]
    fn cheaper_deposit_wins_within_a_fit_tier() {
        let cheap = candidate(CandidateKind::Single, 6, 10_000);
        let dear = candidate(CandidateKind::Single, 6, 60_000);
        let cheap_id = cheap.min_table_id();

        let out = rank(vec![dear, cheap], 5, &cfg(), 5);
        assert_eq!(out[0].min_table_id(), cheap_id);
    }

    #[test]
    fn single_preferred_when_party_fits_one_table() {
        let single = candidate(CandidateKind::Single, 6, 10_000);
        let combo = candidate(CandidateKind::Combination, 6, 10_000);
        let single_id = single.min_table_id();

        let out = rank(vec![combo, single], 5, &cfg(), 5);
        assert_eq!(out[0].min_table_id(), single_id);
    }

    #[test]
    fn combination_gets_structural_bonus_when_no_single_fits() {
        let a = candidate(CandidateKind::Combination, 8, 10_000);
        let out = rank(vec![a.clone()], 7, &cfg(), 5);

        // slack 1 => tight fit, low deposit, structural bonus applies.
        assert_eq!(
            out[0].score,
            40 + 15 + cfg().structural_bonus
        );
    }

    #[test]
    fn curated_flag_adds_fixed_bonus() {
        let mut flagged = candidate(CandidateKind::Combination, 8, 10_000);
        flagged.preferred = true;
        let plain = candidate(CandidateKind::Combination, 8, 10_000);
        let flagged_id = flagged.min_table_id();

        let out = rank(vec![plain, flagged], 7, &cfg(), 5);
        assert_eq!(out[0].min_table_id(), flagged_id);
        assert_eq!(out[0].score - out[1].score, cfg().curated_bonus);
    }

    #[test]
    fn equal_scores_break_ties_on_deposit_then_table_id() {
        let mut a = candidate(CandidateKind::Single, 6, 10_000);
        let mut b = candidate(CandidateKind::Single, 6, 10_000);
        a.table_ids = vec![TableId::from_u128(2)];
        b.table_ids = vec![TableId::from_u128(1)];

        let out = rank(vec![a, b], 5, &cfg(), 5);
        assert_eq!(out[0].table_ids, vec![TableId::from_u128(1)]);

        let mut cheap = candidate(CandidateKind::Single, 6, 5_000);
        let mut dear = candidate(CandidateKind::Single, 6, 15_000);
        cheap.table_ids = vec![TableId::from_u128(9)];
        dear.table_ids = vec![TableId::from_u128(1)];

        let out = rank(vec![dear, cheap], 5, &cfg(), 5);
        assert_eq!(out[0].table_ids, vec![TableId::from_u128(9)]);
    }

    #[test]
    fn ranking_is_deterministic() {
        let pool: Vec<Candidate> = (0..8u32)
            .map(|i| {
                candidate(
                    if i % 2 == 0 {
                        CandidateKind::Single
                    } else {
                        CandidateKind::Combination
                    },
                    6 + i,
                    1_000 * u64::from(i),
                )
            })
            .collect();

        let first = rank(pool.clone(), 5, &cfg(), 8);
        let second = rank(pool, 5, &cfg(), 8);

        let ids = |v: &[Candidate]| v.iter().map(Candidate::min_table_id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn output_truncated_to_max_results() {
        let pool: Vec<Candidate> = (0..10)
            .map(|_| candidate(CandidateKind::Single, 6, 10_000))
            .collect();

        assert_eq!(rank(pool, 5, &cfg(), 5).len(), 5);
    }
}
