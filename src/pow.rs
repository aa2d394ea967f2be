//! PoW Solver (component C): finds and checks proof-of-work strings over
//! SHA-256(challenge ∥ proof), per spec §4.C.

use sha2::{Digest, Sha256};

/// Solves the proof-of-work puzzle for `challenge` at `difficulty` bits.
/// Deterministic: the same inputs always return the same proof, since
/// nonces are tried in increasing order starting at zero.
pub fn solve(challenge: &str, difficulty: u32) -> String {
    let mut nonce: u64 = 0;
    loop {
        let proof = nonce.to_string();
        if verify(challenge, &proof, difficulty) {
            return proof;
        }
        nonce += 1;
    }
}

/// Checks whether `proof` solves `challenge` at `difficulty` bits: the top
/// `difficulty` bits of SHA-256(challenge ∥ proof) must all be zero, counting
/// bit 0 as the MSB of byte 0.
pub fn verify(challenge: &str, proof: &str, difficulty: u32) -> bool {
    let mut hasher = Sha256::new();
    hasher.update(challenge.as_bytes());
    hasher.update(proof.as_bytes());
    let digest = hasher.finalize();
    leading_zero_bits(&digest) >= difficulty
}

fn leading_zero_bits(bytes: &[u8]) -> u32 {
    let mut count = 0;
    for &byte in bytes {
        if byte == 0 {
            count += 8;
            continue;
        }
        count += byte.leading_zeros();
        break;
    }
    count
}

#[cfg(test)]
mod tests;
