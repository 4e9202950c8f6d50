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

//! End-to-end scenarios from the spec (genesis through cycle completion), exercised through
//! the crate's public API rather than internals, the way the teacher's `chain_storage_tests`
//! drive the database through `BlockchainDatabase` instead of touching its fields.

use dao_core::{
    ballot_store::Vote,
    block_parser,
    config::DaoConfig,
    crypto,
    ledger::LedgerState,
    param::ParamId,
    period::Phase,
    proposal::{Proposal, ProposalCommon, ProposalDetails},
    raw::TxId,
    tally::VoteTallyEngine,
    test_helpers::*,
    tx::{OutputType, TxType},
};

fn genesis_id() -> TxId {
    let mut bytes = [0u8; 32];
    bytes[31] = 1;
    TxId(bytes)
}

fn config(total_supply: u64) -> DaoConfig {
    DaoConfig::new(genesis_id(), 100, total_supply, scenario_param_defaults())
}

/// Scenario 1: genesis tx outputs [600, 500] against total supply 1000 — the second output
/// is capped at 400 GENESIS and the remaining 100 is latched to BTC_OUT.
#[test]
fn genesis_only() {
    let cfg = config(1_000);
    let ledger = LedgerState::new();
    let genesis_tx = raw_tx(genesis_id(), vec![], vec![colored_out(600, 1), colored_out(500, 2)]);
    let block = raw_block(100, [0u8; 32], [1u8; 32], vec![genesis_tx]);

    let parsed = block_parser::parse_block(&ledger, &cfg, &block).unwrap();
    assert_eq!(parsed.txs.len(), 1);
    let tx = &parsed.txs[0];
    assert_eq!(tx.tx_type, TxType::Genesis);
    assert_eq!(tx.outputs[0].output_type, OutputType::Genesis);
    assert_eq!(tx.outputs[0].value, 600);
    // The second output (500) exceeds the 400 remaining of the 1000 total supply, so the
    // general latch rule (§4.3) applies exactly as it would for any other tx: it is BTC_OUT,
    // not a partially-colored GENESIS output.
    assert_eq!(tx.outputs[1].output_type, OutputType::BtcOut);
    assert_eq!(tx.outputs[1].value, 500);
}

/// Scenario 2: a transfer that spends genesis output 0 (value 600) and splits it across
/// three outputs that exactly exhaust the available colored input.
#[test]
fn simple_transfer() {
    let cfg = config(1_000);
    let mut ledger = LedgerState::new();
    let genesis_tx = raw_tx(genesis_id(), vec![], vec![colored_out(600, 1), colored_out(400, 2)]);
    let genesis_block = raw_block(100, [0u8; 32], [1u8; 32], vec![genesis_tx]);
    let parsed = block_parser::parse_block(&ledger, &cfg, &genesis_block).unwrap();
    let genesis_block_hash = parsed.header.hash;
    ledger.commit_block(parsed);

    let spend = raw_tx(tx_id(10), vec![raw_input(genesis_id(), 0)], vec![colored_out(200, 3), colored_out(300, 4), colored_out(100, 5)]);
    let block = raw_block(101, genesis_block_hash, [2u8; 32], vec![spend]);
    let parsed = block_parser::parse_block(&ledger, &cfg, &block).unwrap();

    let tx = &parsed.txs[0];
    assert_eq!(tx.tx_type, TxType::TransferColored);
    assert_eq!(tx.burnt_fee, 0);
    assert!(tx.outputs.iter().all(|o| o.output_type == OutputType::Colored));
    assert_eq!(tx.outputs.iter().map(|o| o.value).collect::<Vec<_>>(), vec![200, 300, 100]);
}

/// Scenario 3: spending 600 colored into a single 500 output burns 100 as a trade fee.
#[test]
fn fee_burn() {
    let cfg = config(1_000);
    let mut ledger = LedgerState::new();
    let genesis_tx = raw_tx(genesis_id(), vec![], vec![colored_out(600, 1), colored_out(400, 2)]);
    let genesis_block = raw_block(100, [0u8; 32], [1u8; 32], vec![genesis_tx]);
    let parsed = block_parser::parse_block(&ledger, &cfg, &genesis_block).unwrap();
    let genesis_block_hash = parsed.header.hash;
    ledger.commit_block(parsed);

    let spend = raw_tx(tx_id(11), vec![raw_input(genesis_id(), 0)], vec![colored_out(500, 3)]);
    let block = raw_block(101, genesis_block_hash, [3u8; 32], vec![spend]);
    let parsed = block_parser::parse_block(&ledger, &cfg, &block).unwrap();

    let tx = &parsed.txs[0];
    assert_eq!(tx.tx_type, TxType::PayTradeFee);
    assert_eq!(tx.burnt_fee, 100);
}

/// Scenario 4: an under-funded output latches every later output to BTC_OUT, even one that
/// would otherwise fit in the remaining balance (positional semantics, §4.3 edge policy).
#[test]
fn underfunded_output_latches_remainder() {
    let cfg = config(1_000);
    let mut ledger = LedgerState::new();
    let genesis_tx = raw_tx(genesis_id(), vec![], vec![colored_out(100, 1)]);
    let genesis_block = raw_block(100, [0u8; 32], [1u8; 32], vec![genesis_tx]);
    let parsed = block_parser::parse_block(&ledger, &cfg, &genesis_block).unwrap();
    let genesis_block_hash = parsed.header.hash;
    ledger.commit_block(parsed);

    let spend = raw_tx(tx_id(12), vec![raw_input(genesis_id(), 0)], vec![colored_out(50, 2), colored_out(200, 3), colored_out(30, 4)]);
    let block = raw_block(101, genesis_block_hash, [4u8; 32], vec![spend]);
    let parsed = block_parser::parse_block(&ledger, &cfg, &block).unwrap();

    let tx = &parsed.txs[0];
    assert_eq!(tx.tx_type, TxType::TransferColored);
    assert_eq!(tx.outputs[0].output_type, OutputType::Colored);
    assert_eq!(tx.outputs[0].value, 50);
    assert_eq!(tx.outputs[1].output_type, OutputType::BtcOut);
    assert_eq!(tx.outputs[2].output_type, OutputType::BtcOut);
}

/// A block whose previous hash doesn't match the stored tip is rejected outright (§4.4,
/// §8 invariant on chain linkage) — no state change.
#[test]
fn non_connecting_block_is_rejected() {
    let cfg = config(1_000);
    let mut ledger = LedgerState::new();
    let genesis_tx = raw_tx(genesis_id(), vec![], vec![colored_out(100, 1)]);
    let genesis_block = raw_block(100, [0u8; 32], [1u8; 32], vec![genesis_tx]);
    let parsed = block_parser::parse_block(&ledger, &cfg, &genesis_block).unwrap();
    ledger.commit_block(parsed);

    let bogus = raw_block(101, [9u8; 32], [2u8; 32], vec![]);
    let err = block_parser::parse_block(&ledger, &cfg, &bogus).unwrap_err();
    assert!(matches!(err, dao_core::error::BlockParseError::BlockNotConnecting { height: 101 }));
    assert_eq!(ledger.chain_height(), Some(100));
}

/// Scenario 5 + 6: a proposal is submitted, blind-voted, revealed and accepted, and a
/// bundled CHANGE_PARAM proposal's new value only takes effect at the following cycle's
/// first block (§4.7, §4.8, §8 scenario 6).
#[test]
fn proposal_cycle_accepted_and_param_change_takes_effect_next_cycle() {
    let cfg = DaoConfig::new(genesis_id(), 200, 10_000, scenario_param_defaults());
    let mut ledger = LedgerState::new();
    let mut period = dao_core::period::PeriodService::new();
    let mut registry = dao_core::param::ParamRegistry::new(scenario_param_defaults());
    let mut ballots = dao_core::ballot_store::BallotStore::new();

    // Genesis at height 200, total supply 10_000, so the voter's stake can be backed by a
    // single colored output.
    let genesis_tx = raw_tx(genesis_id(), vec![], vec![colored_out(10_000, 1)]);
    let genesis_block = raw_block(200, [0u8; 32], [1u8; 32], vec![genesis_tx]);
    let mut prev_hash = [1u8; 32];
    let parsed = block_parser::parse_block(&ledger, &cfg, &genesis_block).unwrap();
    ledger.commit_block(parsed);
    period.on_new_height(200, 200, &registry);

    let proposal_tx_id = tx_id(20);

    // h=201 (PROPOSAL phase): a CHANGE_PARAM proposal tx.
    let proposal_hash = crypto::hash160(b"change-proposal-fee");
    let proposal_tx = raw_tx(proposal_tx_id, vec![], vec![proposal_op_return(proposal_hash)]);
    let block = raw_block(201, prev_hash, [201u8; 32], vec![proposal_tx]);
    let parsed = block_parser::parse_block(&ledger, &cfg, &block).unwrap();
    prev_hash = parsed.header.hash;
    ledger.commit_block(parsed);
    period.on_new_height(201, 200, &registry);
    ballots
        .add_proposal(Proposal {
            common: ProposalCommon {
                name: "raise-proposal-fee".into(),
                title: "Raise the proposal fee".into(),
                description: "".into(),
                link: "".into(),
                proposer_tx_id: proposal_tx_id,
                cycle_index: 0,
            },
            details: ProposalDetails::ChangeParam { param: ParamId::ProposalFee, new_value: 150 },
        })
        .unwrap();

    // Fast-forward empty blocks up to h=203 (BLIND_VOTE opens at 204 given PROPOSAL=3,
    // BREAK1=1 starting at 200).
    for h in 202..=203 {
        let block = raw_block(h, prev_hash, [h as u8; 32], vec![]);
        let parsed = block_parser::parse_block(&ledger, &cfg, &block).unwrap();
        prev_hash = parsed.header.hash;
        ledger.commit_block(parsed);
        period.on_new_height(h, 200, &registry);
    }
    assert_eq!(period.phase_for(204), Phase::BlindVote);

    // h=204: a BLIND_VOTE tx carrying an ACCEPT ballot sealed under a fresh key.
    let key = [9u8; 16];
    let plaintext = serialize_ballots(&[(proposal_tx_id, Vote::Accept)]);
    let ciphertext = crypto::encrypt(&plaintext, &key);
    let commitment = crypto::commitment(&ciphertext);
    let blind_vote_tx_id = tx_id(21);
    let blind_vote_tx = raw_tx(blind_vote_tx_id, vec![], vec![blind_vote_op_return(commitment)]);
    let block = raw_block(204, prev_hash, [204u8; 32], vec![blind_vote_tx]);
    let parsed = block_parser::parse_block(&ledger, &cfg, &block).unwrap();
    prev_hash = parsed.header.hash;
    ledger.commit_block(parsed);
    period.on_new_height(204, 200, &registry);
    ballots.add_blind_vote(dao_core::ballot_store::BlindVote {
        tx_id: blind_vote_tx_id,
        block_height: 204,
        stake: 10_000,
        encrypted_ballots: ciphertext,
        encrypted_merit: vec![],
        commitment,
    });

    // Fast-forward to h=207, just before VOTE_REVEAL opens at 208 (BLIND_VOTE=3 from 204, BREAK2=1).
    for h in 205..=207 {
        let block = raw_block(h, prev_hash, [h as u8; 32], vec![]);
        let parsed = block_parser::parse_block(&ledger, &cfg, &block).unwrap();
        prev_hash = parsed.header.hash;
        ledger.commit_block(parsed);
        period.on_new_height(h, 200, &registry);
    }
    assert_eq!(period.phase_for(208), Phase::VoteReveal);

    let reveal_tx_id = tx_id(22);
    let reveal_tx = raw_tx(reveal_tx_id, vec![], vec![vote_reveal_op_return([0u8; 20], key)]);
    let block = raw_block(208, prev_hash, [208u8; 32], vec![reveal_tx]);
    let parsed = block_parser::parse_block(&ledger, &cfg, &block).unwrap();
    prev_hash = parsed.header.hash;
    ledger.commit_block(parsed);
    period.on_new_height(208, 200, &registry);
    ballots.add_vote_reveal(dao_core::ballot_store::VoteReveal {
        tx_id: reveal_tx_id,
        block_height: 208,
        blind_vote_tx_id,
        key,
        merit_digest: [0u8; 20],
    });

    // Fast-forward to h=212, the first block of RESULT (VOTE_REVEAL=3 from 208, BREAK3=1).
    for h in 209..=212 {
        let block = raw_block(h, prev_hash, [h as u8; 32], vec![]);
        let parsed = block_parser::parse_block(&ledger, &cfg, &block).unwrap();
        prev_hash = parsed.header.hash;
        ledger.commit_block(parsed);
        period.on_new_height(h, 200, &registry);
    }
    assert_eq!(period.phase_for(212), Phase::Result);
    assert_eq!(registry.param_value(ParamId::ProposalFee, 212), 100);

    let votes = dao_core::tally::collect_and_decrypt(&ballots, &period, 0, |_| vec![], deserialize_ballots);
    assert_eq!(votes.len(), 1);
    let result = VoteTallyEngine::tally(&ballots, &registry, 0, 200, &votes);
    assert_eq!(result.outcomes.len(), 1);
    assert_eq!(result.outcomes[0].decision, dao_core::tally::Decision::Accepted);
    assert_eq!(result.param_changes, vec![(ParamId::ProposalFee, 150)]);

    // Apply at the next cycle's first block (h=214: cycle 0 runs 200..=213).
    dao_core::param_applier::ParamChangeApplier::apply(&result, &mut registry, 214);
    assert_eq!(registry.param_value(ParamId::ProposalFee, 212), 100);
    assert_eq!(registry.param_value(ParamId::ProposalFee, 214), 150);
}

/// Drives the same propose-vote-reveal-tally cycle as above entirely through `DaoEngine`
/// (rather than the component-level calls the other scenarios use), with a CompensationProposal
/// instead of a CHANGE_PARAM one: acceptance must mint an ISSUANCE output to the requested
/// payout address in the first block of the following cycle (§4.7 step 5).
#[test]
fn accepted_compensation_proposal_issues_payout_at_next_cycle() {
    use dao_core::engine::DaoEngine;

    let cfg = DaoConfig::new(genesis_id(), 200, 10_000, scenario_param_defaults());
    let mut engine = DaoEngine::new(cfg);

    let genesis_tx = raw_tx(genesis_id(), vec![], vec![colored_out(10_000, 1)]);
    let genesis_block = raw_block(200, [0u8; 32], [1u8; 32], vec![genesis_tx]);
    let mut prev_hash = genesis_block.hash;
    engine.ingest_block(&genesis_block, &[]).unwrap();

    let proposal_tx_id = tx_id(30);
    let proposal_hash = crypto::hash160(b"compensation-proposal");
    let proposal_tx = raw_tx(proposal_tx_id, vec![], vec![proposal_op_return(proposal_hash)]);
    let block = raw_block(201, prev_hash, [201u8; 32], vec![proposal_tx]);
    prev_hash = block.hash;
    engine.ingest_block(&block, &[]).unwrap();
    engine
        .ballots_mut()
        .add_proposal(Proposal {
            common: ProposalCommon {
                name: "pay-alice".into(),
                title: "Compensate Alice".into(),
                description: "".into(),
                link: "".into(),
                proposer_tx_id: proposal_tx_id,
                cycle_index: 0,
            },
            details: ProposalDetails::Compensation { requested_amount: 250, payout_address: "alice-payout".into() },
        })
        .unwrap();

    for h in 202..=203 {
        let block = raw_block(h, prev_hash, [h as u8; 32], vec![]);
        prev_hash = block.hash;
        engine.ingest_block(&block, &[]).unwrap();
    }
    assert_eq!(engine.period().phase_for(204), Phase::BlindVote);

    let key = [5u8; 16];
    let plaintext = serialize_ballots(&[(proposal_tx_id, Vote::Accept)]);
    let ciphertext = crypto::encrypt(&plaintext, &key);
    let commitment = crypto::commitment(&ciphertext);
    let blind_vote_tx_id = tx_id(31);
    let blind_vote_tx = raw_tx(blind_vote_tx_id, vec![], vec![blind_vote_op_return(commitment)]);
    let block = raw_block(204, prev_hash, [204u8; 32], vec![blind_vote_tx]);
    prev_hash = block.hash;
    engine.ingest_block(&block, &[]).unwrap();
    engine.ballots_mut().add_blind_vote(dao_core::ballot_store::BlindVote {
        tx_id: blind_vote_tx_id,
        block_height: 204,
        stake: 10_000,
        encrypted_ballots: ciphertext,
        encrypted_merit: vec![],
        commitment,
    });

    for h in 205..=207 {
        let block = raw_block(h, prev_hash, [h as u8; 32], vec![]);
        prev_hash = block.hash;
        engine.ingest_block(&block, &[]).unwrap();
    }
    assert_eq!(engine.period().phase_for(208), Phase::VoteReveal);

    let reveal_tx_id = tx_id(32);
    let reveal_tx = raw_tx(reveal_tx_id, vec![], vec![vote_reveal_op_return([0u8; 20], key)]);
    let block = raw_block(208, prev_hash, [208u8; 32], vec![reveal_tx]);
    prev_hash = block.hash;
    engine.ingest_block(&block, &[]).unwrap();
    engine.ballots_mut().add_vote_reveal(dao_core::ballot_store::VoteReveal {
        tx_id: reveal_tx_id,
        block_height: 208,
        blind_vote_tx_id,
        key,
        merit_digest: [0u8; 20],
    });

    for h in 209..=213 {
        let block = raw_block(h, prev_hash, [h as u8; 32], vec![]);
        prev_hash = block.hash;
        engine.ingest_block(&block, &[]).unwrap();
    }

    // h=214 opens cycle 1; the caller collects cycle 0's votes before handing this block in.
    let votes = dao_core::tally::collect_and_decrypt(engine.ballots(), engine.period(), 0, |_| vec![], deserialize_ballots);
    assert_eq!(votes.len(), 1);
    let block = raw_block(214, prev_hash, [214u8; 32], vec![]);
    engine.ingest_block(&block, &votes).unwrap();

    let issued = engine
        .ledger()
        .block_at(214)
        .unwrap()
        .txs
        .iter()
        .flat_map(|tx| &tx.outputs)
        .find(|o| o.output_type == OutputType::Issuance)
        .expect("accepted compensation proposal must mint an ISSUANCE output at height 214");
    assert_eq!(issued.value, 250);
    assert_eq!(issued.address, "alice-payout");
}

fn serialize_ballots(ballots: &[(TxId, Vote)]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut sorted = ballots.to_vec();
    sorted.sort_by_key(|b| b.0);
    out.push(sorted.len() as u8);
    for (id, vote) in sorted {
        out.extend_from_slice(&id.0);
        out.push(match vote {
            Vote::Accept => 1,
            Vote::Reject => 2,
            Vote::Ignore => 0,
        });
    }
    out
}

fn deserialize_ballots(data: &[u8]) -> Vec<(TxId, Vote)> {
    let mut out = Vec::new();
    if data.is_empty() {
        return out;
    }
    let count = data[0] as usize;
    let mut cursor = 1;
    for _ in 0..count {
        let mut id = [0u8; 32];
        id.copy_from_slice(&data[cursor..cursor + 32]);
        let vote = match data[cursor + 32] {
            1 => Vote::Accept,
            2 => Vote::Reject,
            _ => Vote::Ignore,
        };
        out.push((TxId(id), vote));
        cursor += 33;
    }
    out
}
