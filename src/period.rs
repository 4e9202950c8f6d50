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

//! §4.5 Period Service: the cycle/phase finite state machine.
//!
//! Modeled on the teacher's base-node synchronization FSM (`base_node/state_machine_service`):
//! a pure function of height against the current cycle's phase ranges, snapshotted at the
//! cycle's first block so later param overrides never retroactively change a running cycle.

use crate::param::ParamId;

const LOG_TARGET: &str = "dao::period";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Undefined,
    Proposal,
    Break1,
    BlindVote,
    Break2,
    VoteReveal,
    Break3,
    Result,
    Break4,
}

impl Phase {
    const ORDER: [Phase; 8] = [
        Phase::Proposal,
        Phase::Break1,
        Phase::BlindVote,
        Phase::Break2,
        Phase::VoteReveal,
        Phase::Break3,
        Phase::Result,
        Phase::Break4,
    ];

    fn param_id(&self) -> Option<ParamId> {
        match self {
            Phase::Proposal => Some(ParamId::PhaseProposal),
            Phase::Break1 => Some(ParamId::PhaseBreak1),
            Phase::BlindVote => Some(ParamId::PhaseBlindVote),
            Phase::Break2 => Some(ParamId::PhaseBreak2),
            Phase::VoteReveal => Some(ParamId::PhaseVoteReveal),
            Phase::Break3 => Some(ParamId::PhaseBreak3),
            Phase::Result => Some(ParamId::PhaseResult),
            Phase::Break4 => Some(ParamId::PhaseBreak4),
            Phase::Undefined => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaoPhase {
    pub phase: Phase,
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    pub index: u32,
    pub first_block_height: u32,
    pub phases: Vec<DaoPhase>,
}

impl Cycle {
    pub fn length(&self) -> u32 {
        self.phases.iter().map(|p| p.duration).sum()
    }

    pub fn last_block_height(&self) -> u32 {
        self.first_block_height + self.length().saturating_sub(1)
    }

    /// Returns the phase containing `height` plus the first height of that phase, assuming
    /// `height` falls within this cycle.
    fn phase_range(&self, height: u32) -> Option<(Phase, u32, u32)> {
        let mut cursor = self.first_block_height;
        for p in &self.phases {
            let first = cursor;
            let last = cursor + p.duration.saturating_sub(1);
            if height >= first && height <= last {
                return Some((p.phase, first, last));
            }
            cursor = last + 1;
        }
        None
    }
}

/// Drives the cycle/phase FSM over an append-only sequence of committed block heights.
#[derive(Debug, Clone, Default)]
pub struct PeriodService {
    cycles: Vec<Cycle>,
}

impl PeriodService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiates the next cycle starting at `first_block_height`, snapshotting phase
    /// durations from `registry` as of that height. Called once at the genesis height and
    /// again at the first block after each cycle's `BREAK4` ends.
    pub fn start_cycle(&mut self, first_block_height: u32, registry: &crate::param::ParamRegistry) -> &Cycle {
        let index = self.cycles.len() as u32;
        let phases = Phase::ORDER
            .iter()
            .map(|phase| DaoPhase {
                phase: *phase,
                duration: registry.param_value(phase.param_id().unwrap(), first_block_height) as u32,
            })
            .collect();
        log::info!(target: LOG_TARGET, "starting cycle {} at height {}", index, first_block_height);
        self.cycles.push(Cycle { index, first_block_height, phases });
        self.cycles.last().unwrap()
    }

    /// True iff `height` is the first block of a cycle that has not started yet — the
    /// genesis height with no cycles recorded, or the block right after the current tip
    /// cycle ends. Pure; does not mutate the FSM.
    pub fn would_start_cycle(&self, height: u32, genesis_height: u32) -> bool {
        match self.cycles.last() {
            None => height == genesis_height,
            Some(c) => height == c.last_block_height() + 1,
        }
    }

    /// Advances the FSM for a newly committed height: starts a new cycle if `height` is the
    /// block after the previous cycle ended. Returns `true` if a new cycle was started.
    pub fn on_new_height(&mut self, height: u32, genesis_height: u32, registry: &crate::param::ParamRegistry) -> bool {
        let should_start = self.would_start_cycle(height, genesis_height);
        if should_start {
            self.start_cycle(height, registry);
        }
        should_start
    }

    pub fn cycle_of(&self, height: u32) -> Option<&Cycle> {
        self.cycles.iter().find(|c| height >= c.first_block_height && height <= c.last_block_height())
    }

    pub fn phase_for(&self, height: u32) -> Phase {
        self.cycle_of(height).and_then(|c| c.phase_range(height)).map(|(p, _, _)| p).unwrap_or(Phase::Undefined)
    }

    pub fn first_block_of(&self, phase: Phase, height: u32) -> Option<u32> {
        self.cycle_of(height).and_then(|c| c.phase_range(height)).filter(|(p, _, _)| *p == phase).map(|(_, f, _)| f)
    }

    pub fn last_block_of(&self, phase: Phase, height: u32) -> Option<u32> {
        self.cycle_of(height).and_then(|c| c.phase_range(height)).filter(|(p, _, _)| *p == phase).map(|(_, _, l)| l)
    }

    /// True iff `height` is in `phase` and is not the last block of that phase — used to
    /// forbid late ballot mutations (§4.6).
    pub fn is_in_phase_but_not_last(&self, phase: Phase, height: u32) -> bool {
        self.phase_for(height) == phase && self.last_block_of(phase, height) != Some(height)
    }

    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }
}
