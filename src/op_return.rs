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

//! §4.2 Op-Return Decoder and §6 wire format.
//!
//! `OP_RETURN <push>` where the pushed data is `[type:u8][version:u8][payload]`. A single-byte
//! push-length follows the marker; this crate does not need the full Bitcoin script interpreter,
//! only this narrow, application-defined encoding.

use crate::error::OpReturnError;

const LOG_TARGET: &str = "dao::op_return";

pub const OP_RETURN: u8 = 0x6a;

pub const TYPE_PROPOSAL: u8 = 0x10;
pub const TYPE_COMPENSATION_REQUEST: u8 = 0x11;
pub const TYPE_BLIND_VOTE: u8 = 0x12;
pub const TYPE_VOTE_REVEAL: u8 = 0x13;
pub const TYPE_LOCKUP: u8 = 0x14;
pub const TYPE_UNLOCK: u8 = 0x15;
pub const TYPE_ASSET_REMOVAL: u8 = 0x16;

const SUPPORTED_VERSION: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpReturnIntent {
    Proposal { hash: [u8; 20] },
    CompensationRequest { hash: [u8; 20] },
    BlindVote { commitment: [u8; 20] },
    VoteReveal { merit_digest: [u8; 20], key: [u8; 16] },
    Lockup { lock_time: u32 },
    Unlock { lockup_tx_id: [u8; 32] },
    AssetRemoval { hash: [u8; 20] },
}

/// Returns `true` if `script` begins with the op-return marker. Does not validate the payload.
pub fn is_op_return(script: &[u8]) -> bool {
    script.first() == Some(&OP_RETURN)
}

/// Decodes the op-return output script of a tx. A failing decode should downgrade the owning
/// tx to `IRREGULAR` (§4.2) rather than propagate — callers are expected to log and recover.
pub fn decode(script: &[u8]) -> Result<OpReturnIntent, OpReturnError> {
    if script.len() < 2 {
        return Err(OpReturnError::ShortOpReturn);
    }
    let push_len = script[1] as usize;
    let data = &script[2..];
    if data.len() < push_len || push_len < 2 {
        return Err(OpReturnError::ShortOpReturn);
    }
    let data = &data[..push_len];
    let type_tag = data[0];
    let version = data[1];
    let payload = &data[2..];
    if version != SUPPORTED_VERSION {
        return Err(OpReturnError::UnsupportedVersion(version));
    }

    let intent = match type_tag {
        TYPE_PROPOSAL => OpReturnIntent::Proposal { hash: hash20(payload)? },
        TYPE_COMPENSATION_REQUEST => OpReturnIntent::CompensationRequest { hash: hash20(payload)? },
        TYPE_BLIND_VOTE => OpReturnIntent::BlindVote { commitment: hash20(payload)? },
        TYPE_VOTE_REVEAL => {
            if payload.len() != 36 {
                return Err(OpReturnError::ShortOpReturn);
            }
            let mut merit_digest = [0u8; 20];
            merit_digest.copy_from_slice(&payload[..20]);
            let mut key = [0u8; 16];
            key.copy_from_slice(&payload[20..]);
            OpReturnIntent::VoteReveal { merit_digest, key }
        },
        TYPE_LOCKUP => {
            if payload.len() != 4 {
                return Err(OpReturnError::ShortOpReturn);
            }
            let mut buf = [0u8; 4];
            buf.copy_from_slice(payload);
            OpReturnIntent::Lockup { lock_time: u32::from_le_bytes(buf) }
        },
        TYPE_UNLOCK => {
            if payload.len() != 32 {
                return Err(OpReturnError::ShortOpReturn);
            }
            let mut buf = [0u8; 32];
            buf.copy_from_slice(payload);
            OpReturnIntent::Unlock { lockup_tx_id: buf }
        },
        TYPE_ASSET_REMOVAL => OpReturnIntent::AssetRemoval { hash: hash20(payload)? },
        other => {
            log::warn!(target: LOG_TARGET, "unknown op-return type tag {:#04x}", other);
            return Err(OpReturnError::UnknownOpReturnType(other));
        },
    };
    Ok(intent)
}

fn hash20(payload: &[u8]) -> Result<[u8; 20], OpReturnError> {
    if payload.len() < 20 {
        return Err(OpReturnError::ShortOpReturn);
    }
    let mut out = [0u8; 20];
    out.copy_from_slice(&payload[..20]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(type_tag: u8, version: u8, payload: &[u8]) -> Vec<u8> {
        let mut data = vec![type_tag, version];
        data.extend_from_slice(payload);
        let mut script = vec![OP_RETURN, data.len() as u8];
        script.extend_from_slice(&data);
        script
    }

    #[test]
    fn decodes_proposal() {
        let script = push(TYPE_PROPOSAL, 0, &[9u8; 20]);
        let intent = decode(&script).unwrap();
        assert_eq!(intent, OpReturnIntent::Proposal { hash: [9u8; 20] });
    }

    #[test]
    fn decodes_lockup() {
        let script = push(TYPE_LOCKUP, 0, &42u32.to_le_bytes());
        assert_eq!(decode(&script).unwrap(), OpReturnIntent::Lockup { lock_time: 42 });
    }

    #[test]
    fn unknown_type_is_rejected() {
        let script = push(0xff, 0, &[1u8; 20]);
        assert_eq!(decode(&script).unwrap_err(), OpReturnError::UnknownOpReturnType(0xff));
    }

    #[test]
    fn short_payload_is_rejected() {
        let script = push(TYPE_PROPOSAL, 0, &[1u8; 5]);
        assert_eq!(decode(&script).unwrap_err(), OpReturnError::ShortOpReturn);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let script = push(TYPE_PROPOSAL, 1, &[1u8; 20]);
        assert_eq!(decode(&script).unwrap_err(), OpReturnError::UnsupportedVersion(1));
    }
}
