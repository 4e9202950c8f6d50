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

//! Payload digests and blind-vote sealing (§1 Non-goals: no novel cryptography).

use aes::Aes128;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Blind-vote sealing uses a zero IV: the 128-bit key is never reused across votes (a
/// fresh key is generated per blind-vote tx and only ever revealed once), so a fixed IV
/// does not weaken the scheme and keeps `commitment` a pure function of `(plaintext, key)`.
const ZERO_IV: [u8; 16] = [0u8; 16];

/// `RIPEMD160(SHA256(data))`, the "hash160" used throughout the op-return payloads.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let ripe = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripe);
    out
}

/// Plain SHA-256, used to derive a stable tx-id for synthetic (non-wire) txs such as the
/// compensation-issuance tx (§4.7 step 5) where no real tx bytes exist to hash.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

/// Encrypts `plaintext` under `key` (AES-128-CBC, PKCS#7 padding).
pub fn encrypt(plaintext: &[u8], key: &[u8; 16]) -> Vec<u8> {
    Aes128CbcEnc::new(key.into(), &ZERO_IV.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypts `ciphertext` under `key`. Fails if the padding is invalid, which is the
/// only failure mode this scheme exposes (wrong key, corrupt ciphertext, truncation).
pub fn decrypt(ciphertext: &[u8], key: &[u8; 16]) -> Result<Vec<u8>, ()> {
    Aes128CbcDec::new(key.into(), &ZERO_IV.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| ())
}

/// `commitment = RIPEMD160(SHA256(encrypt_AES128CBC(serialize(ballotList), K)))` (§6).
pub fn commitment(ciphertext: &[u8]) -> [u8; 20] {
    hash160(ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let key = [7u8; 16];
        let plaintext = b"proposal-tx-id|ACCEPT".to_vec();
        let ct = encrypt(&plaintext, &key);
        let pt2 = decrypt(&ct, &key).unwrap();
        assert_eq!(plaintext, pt2);
    }

    #[test]
    fn commitment_is_deterministic() {
        let key = [3u8; 16];
        let plaintext = b"abc".to_vec();
        let ct1 = encrypt(&plaintext, &key);
        let ct2 = encrypt(&plaintext, &key);
        assert_eq!(commitment(&ct1), commitment(&ct2));
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let key = [1u8; 16];
        let other = [2u8; 16];
        let ct = encrypt(b"hello world, this is a ballot", &key);
        assert!(decrypt(&ct, &other).is_err());
    }
}
