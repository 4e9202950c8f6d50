// Copyright 2024, The Tari Development Community
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! §4.7 Vote Tally Engine.

use crate::{
    ballot_store::{BallotStore, Vote},
    config::MERIT_DECAY_WINDOW_BLOCKS,
    param::{ParamId, ParamRegistry},
    period::PeriodService,
    proposal::ProposalKind,
    raw::TxId,
};
use std::collections::BTreeMap;

const LOG_TARGET: &str = "dao::tally";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    RejectedQuorum,
    RejectedThreshold,
}

#[derive(Debug, Clone, Copy)]
pub struct ProposalOutcome {
    pub proposal_id: TxId,
    pub kind: ProposalKind,
    pub decision: Decision,
    pub accept_weight: u64,
    pub reject_weight: u64,
    pub total_stake: u64,
}

/// An accepted CompensationProposal's payout, issued at the next cycle's first block as an
/// ISSUANCE output (§4.7 step 5).
#[derive(Debug, Clone)]
pub struct CompensationAward {
    pub proposal_id: TxId,
    pub amount: u64,
    pub payout_address: String,
}

#[derive(Debug, Clone)]
pub struct CycleResult {
    pub cycle_index: u32,
    pub outcomes: Vec<ProposalOutcome>,
    pub param_changes: Vec<(ParamId, i64)>,
    pub compensation_awards: Vec<CompensationAward>,
}

/// An already-decrypted merit entry contributing decaying weight to a single ballot.
#[derive(Debug, Clone, Copy)]
pub struct MeritEntry {
    pub issuance_tx_id: TxId,
    pub amount: u64,
    pub age_blocks: u64,
}

/// A decrypted, verified vote ready for tallying: the stake behind the blind vote plus its
/// per-proposal ballots and deduplicated merit.
pub struct DecryptedVote {
    pub stake: u64,
    pub ballots: Vec<(TxId, Vote)>,
    pub merit: Vec<MeritEntry>,
}

/// §4.7 step 3: `max(0, 1 − age_blocks / HALF_LIFE_BLOCKS × 2)`, evaluated left to right
/// (the ratio is doubled, not the window) so merit reaches zero weight at half the window.
fn decay(age_blocks: u64) -> f64 {
    let ratio = (age_blocks as f64 / MERIT_DECAY_WINDOW_BLOCKS as f64) * 2.0;
    (1.0 - ratio).max(0.0)
}

/// Deduplicates merit entries by issuance-tx-id, keeping the highest-age (oldest, thus most
/// decayed) entry per id (§4.7 step 3).
fn dedupe_merit(merit: &[MeritEntry]) -> Vec<MeritEntry> {
    let mut best: BTreeMap<TxId, MeritEntry> = BTreeMap::new();
    for entry in merit {
        best.entry(entry.issuance_tx_id)
            .and_modify(|existing| {
                if entry.age_blocks > existing.age_blocks {
                    *existing = *entry;
                }
            })
            .or_insert(*entry);
    }
    best.into_values().collect()
}

fn effective_weight(stake: u64, merit: &[MeritEntry]) -> u64 {
    let merit_weight: f64 = dedupe_merit(merit).iter().map(|m| m.amount as f64 * decay(m.age_blocks)).sum();
    stake + merit_weight.round() as u64
}

pub struct VoteTallyEngine;

impl VoteTallyEngine {
    /// Runs the full §4.7 pipeline for `cycle_index`, given already decrypted+verified votes
    /// (collection, decryption, and commitment verification happen in the Block Parser /
    /// Ballot Store boundary before this call — see `collect_and_decrypt`).
    pub fn tally(
        store: &BallotStore,
        registry: &ParamRegistry,
        cycle_index: u32,
        cycle_first_block: u32,
        votes: &[DecryptedVote],
    ) -> CycleResult {
        // Tie-break (§4.7): process proposals in ascending tx-id order.
        let mut proposal_ids: Vec<TxId> = store.proposals_in_cycle(cycle_index).map(|p| p.tx_id()).collect();
        proposal_ids.sort();

        let mut outcomes = Vec::with_capacity(proposal_ids.len());
        let mut param_changes = Vec::new();
        let mut compensation_awards = Vec::new();

        for proposal_id in proposal_ids {
            let proposal = store.proposal(proposal_id).expect("id came from proposals_in_cycle");
            let kind = proposal.kind();
            let mut accept_weight = 0u64;
            let mut reject_weight = 0u64;
            let mut total_stake = 0u64;

            for vote in votes {
                total_stake += vote.stake;
                let Some((_, choice)) = vote.ballots.iter().find(|(id, _)| *id == proposal_id) else { continue };
                let weight = effective_weight(vote.stake, &vote.merit);
                match choice {
                    Vote::Accept => accept_weight += weight,
                    Vote::Reject => reject_weight += weight,
                    Vote::Ignore => {},
                }
            }

            let quorum = registry.param_value(ParamId::quorum_for(kind), cycle_first_block) as u64;
            let threshold = registry.param_value(ParamId::threshold_for(kind), cycle_first_block) as u64;

            let decision = if total_stake < quorum {
                Decision::RejectedQuorum
            } else {
                let denom = accept_weight + reject_weight;
                let ratio_bp = if denom == 0 { 0 } else { accept_weight * 10_000 / denom };
                if ratio_bp >= threshold {
                    Decision::Accepted
                } else {
                    Decision::RejectedThreshold
                }
            };

            log::info!(
                target: LOG_TARGET,
                "proposal {} decided {:?} (accept={} reject={} stake={})",
                proposal_id,
                decision,
                accept_weight,
                reject_weight,
                total_stake
            );

            if decision == Decision::Accepted {
                match &proposal.details {
                    crate::proposal::ProposalDetails::ChangeParam { param, new_value } => {
                        param_changes.push((*param, *new_value));
                    },
                    crate::proposal::ProposalDetails::Compensation { requested_amount, payout_address } => {
                        compensation_awards.push(CompensationAward {
                            proposal_id,
                            amount: *requested_amount,
                            payout_address: payout_address.clone(),
                        });
                    },
                    _ => {},
                }
            }

            outcomes.push(ProposalOutcome { proposal_id, kind, decision, accept_weight, reject_weight, total_stake });
        }

        param_changes.sort_by_key(|(id, _)| id.as_str());
        CycleResult { cycle_index, outcomes, param_changes, compensation_awards }
    }
}

/// Collects blind-vote/reveal pairs for a cycle, decrypts them, and verifies the commitment
/// (§4.7 steps 1-2). Disqualifies any pair that fails verification or decryption.
pub fn collect_and_decrypt(
    store: &BallotStore,
    period: &PeriodService,
    cycle_index: u32,
    merit_lookup: impl Fn(TxId) -> Vec<MeritEntry>,
    ballot_parser: impl Fn(&[u8]) -> Vec<(TxId, Vote)>,
) -> Vec<DecryptedVote> {
    let mut out = Vec::new();
    for blind_vote in store.blind_votes_in_cycle(period, cycle_index) {
        let Some(reveal) = store.reveal_for(blind_vote.tx_id) else { continue };
        let in_reveal_phase = period
            .cycle_of(reveal.block_height)
            .map(|c| c.index == cycle_index)
            .unwrap_or(false)
            && period.phase_for(reveal.block_height) == crate::period::Phase::VoteReveal;
        if !in_reveal_phase {
            continue;
        }
        if crate::crypto::commitment(&blind_vote.encrypted_ballots) != blind_vote.commitment {
            log::warn!(target: LOG_TARGET, "commitment mismatch for blind vote {}", blind_vote.tx_id);
            continue;
        }
        let Ok(plaintext) = crate::crypto::decrypt(&blind_vote.encrypted_ballots, &reveal.key) else {
            log::warn!(target: LOG_TARGET, "decryption failed for blind vote {}", blind_vote.tx_id);
            continue;
        };
        let ballots = ballot_parser(&plaintext);
        let merit = merit_lookup(blind_vote.tx_id);
        out.push(DecryptedVote { stake: blind_vote.stake, ballots, merit });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merit_decays_linearly_to_zero() {
        assert_eq!(decay(0), 1.0);
        assert_eq!(decay(MERIT_DECAY_WINDOW_BLOCKS / 4), 0.5);
        assert_eq!(decay(MERIT_DECAY_WINDOW_BLOCKS / 2), 0.0);
        assert_eq!(decay(MERIT_DECAY_WINDOW_BLOCKS), 0.0);
    }

    #[test]
    fn dedupe_keeps_highest_age_entry() {
        let id = TxId([1u8; 32]);
        let merit = vec![
            MeritEntry { issuance_tx_id: id, amount: 100, age_blocks: 10 },
            MeritEntry { issuance_tx_id: id, amount: 100, age_blocks: 20 },
        ];
        let deduped = dedupe_merit(&merit);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].age_blocks, 20);
    }
}
