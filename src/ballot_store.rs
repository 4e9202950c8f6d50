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

//! §4.6 Ballot/Blind-Vote Store.

use crate::{
    error::BallotError,
    period::{Phase, PeriodService},
    proposal::Proposal,
    raw::TxId,
};
use std::collections::BTreeMap;

const LOG_TARGET: &str = "dao::ballot_store";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Accept,
    Reject,
    Ignore,
}

/// A voter-local pair of proposal reference and optional vote. The only mutable state in
/// the data model (§9 design note): mutation is gated by `BallotStore::set_vote`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    pub proposal_id: TxId,
    pub vote: Option<Vote>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlindVote {
    pub tx_id: TxId,
    pub block_height: u32,
    pub stake: u64,
    pub encrypted_ballots: Vec<u8>,
    pub encrypted_merit: Vec<u8>,
    pub commitment: [u8; 20],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteReveal {
    pub tx_id: TxId,
    pub block_height: u32,
    pub blind_vote_tx_id: TxId,
    pub key: [u8; 16],
    pub merit_digest: [u8; 20],
}

#[derive(Default)]
pub struct BallotStore {
    proposals: BTreeMap<TxId, Proposal>,
    blind_votes: BTreeMap<TxId, BlindVote>,
    /// Keyed by the blind-vote tx it reveals. §9 open question (a): first-by-height wins.
    reveals: BTreeMap<TxId, VoteReveal>,
    ballots: BTreeMap<TxId, Ballot>,
}

impl BallotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_proposal(&mut self, proposal: Proposal) -> Result<(), BallotError> {
        proposal.validate()?;
        let id = proposal.tx_id();
        self.ballots.insert(id, Ballot { proposal_id: id, vote: None });
        self.proposals.insert(id, proposal);
        Ok(())
    }

    pub fn add_blind_vote(&mut self, blind_vote: BlindVote) {
        self.blind_votes.insert(blind_vote.tx_id, blind_vote);
    }

    /// Inserts a vote reveal, keeping the first-by-height reveal for a given blind vote and
    /// ignoring any later one (§9 open question (a)).
    pub fn add_vote_reveal(&mut self, reveal: VoteReveal) {
        match self.reveals.get(&reveal.blind_vote_tx_id) {
            Some(existing) if existing.block_height <= reveal.block_height => {
                log::debug!(
                    target: LOG_TARGET,
                    "ignoring later reveal {} for blind vote {}",
                    reveal.tx_id,
                    reveal.blind_vote_tx_id
                );
            },
            _ => {
                self.reveals.insert(reveal.blind_vote_tx_id, reveal);
            },
        }
    }

    pub fn proposal(&self, id: TxId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn proposals_in_cycle(&self, cycle_index: u32) -> impl Iterator<Item = &Proposal> {
        self.proposals.values().filter(move |p| p.common.cycle_index == cycle_index)
    }

    pub fn blind_votes_in_cycle<'a>(&'a self, period: &'a PeriodService, cycle_index: u32) -> impl Iterator<Item = &'a BlindVote> + 'a {
        self.blind_votes
            .values()
            .filter(move |bv| period.cycle_of(bv.block_height).map(|c| c.index) == Some(cycle_index))
    }

    pub fn reveal_for(&self, blind_vote_tx_id: TxId) -> Option<&VoteReveal> {
        self.reveals.get(&blind_vote_tx_id)
    }

    /// A ballot is valid when its proposal exists, lies in a currently active (not yet
    /// closed) cycle, and passed syntactic admission at submission time (§4.6).
    pub fn ballots_valid_and_confirmed(&self, period: &PeriodService, current_height: u32) -> Vec<&Ballot> {
        let current_cycle = period.cycle_of(current_height).map(|c| c.index);
        self.ballots
            .values()
            .filter(|b| {
                self.proposals.get(&b.proposal_id).map(|p| Some(p.common.cycle_index) == current_cycle).unwrap_or(false)
            })
            .collect()
    }

    pub fn ballots_closed(&self, period: &PeriodService, current_height: u32) -> Vec<&Ballot> {
        let current_cycle = period.cycle_of(current_height).map(|c| c.index);
        self.ballots
            .values()
            .filter(|b| {
                self.proposals
                    .get(&b.proposal_id)
                    .map(|p| current_cycle.map(|cc| p.common.cycle_index < cc).unwrap_or(false))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// The single mutator entry point for `Ballot.vote`, gated on the PROPOSAL phase and
    /// excluding that phase's last block so a vote can't be cast (or changed) in the same
    /// block that a downstream reader might treat the proposal list as final (§9 design note).
    pub fn set_vote(&mut self, proposal_id: TxId, vote: Vote, period: &PeriodService, current_height: u32) -> Result<(), BallotError> {
        if !period.is_in_phase_but_not_last(Phase::Proposal, current_height) {
            return Err(BallotError::PhaseLocked);
        }
        let ballot = self.ballots.entry(proposal_id).or_insert(Ballot { proposal_id, vote: None });
        ballot.vote = Some(vote);
        Ok(())
    }
}
