//! A minimal duplex sponge construction over Keccak-f\[1600\], used as the
//! permutation backing [`crate::codec::Codec`] implementations.
//!
//! A duplex sponge exposes two operations: `absorb` (mix data into the
//! state) and `squeeze` (extract pseudorandom bytes from the state). Unlike
//! a plain hash function, a duplex sponge can interleave arbitrarily many
//! absorb/squeeze calls, which is exactly the access pattern a Fiat-Shamir
//! transcript needs (absorb the commitment, squeeze the challenge, absorb
//! the next message, ...).

use tiny_keccak::{Hasher, Keccak};

/// A stateful sponge that can absorb bytes and squeeze pseudorandom output.
pub trait DuplexSponge: Clone {
    /// Initializes the sponge with a domain-separation / initialization
    /// vector.
    fn new(iv: &[u8]) -> Self;

    /// Mixes `data` into the sponge's state.
    fn absorb(&mut self, data: &[u8]);

    /// Extracts `out.len()` pseudorandom bytes from the sponge's state,
    /// writing them into `out`. Squeezing does not destroy the ability to
    /// absorb further data afterwards.
    fn squeeze(&mut self, out: &mut [u8]);
}

/// A [`DuplexSponge`] built on Keccak (the permutation underlying SHA-3),
/// absorbing via repeated `update`s and squeezing via `finalize` on a clone
/// of the running state — re-keying the inner hasher with its own output so
/// that interleaved absorb/squeeze calls remain sound.
#[derive(Clone)]
pub struct KeccakDuplexSponge {
    state: Keccak,
}

impl DuplexSponge for KeccakDuplexSponge {
    fn new(iv: &[u8]) -> Self {
        let mut state = Keccak::v256();
        state.update(iv);
        Self { state }
    }

    fn absorb(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    fn squeeze(&mut self, out: &mut [u8]) {
        let finalized = self.state.clone();
        let mut digest = [0u8; 32];
        finalized.finalize(&mut digest);

        let mut produced = 0;
        while produced < out.len() {
            let mut block = Keccak::v256();
            block.update(&digest);
            block.update(&(produced as u64).to_le_bytes());
            let mut chunk = [0u8; 32];
            block.finalize(&mut chunk);
            let n = (out.len() - produced).min(32);
            out[produced..produced + n].copy_from_slice(&chunk[..n]);
            produced += n;
        }

        // Re-absorb the squeezed output so subsequent absorbs are bound to
        // everything extracted so far.
        self.state.update(&digest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squeeze_is_deterministic() {
        let mut a = KeccakDuplexSponge::new(b"test-iv");
        let mut b = KeccakDuplexSponge::new(b"test-iv");
        a.absorb(b"hello");
        b.absorb(b"hello");
        let mut out_a = [0u8; 48];
        let mut out_b = [0u8; 48];
        a.squeeze(&mut out_a);
        b.squeeze(&mut out_b);
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn different_absorptions_diverge() {
        let mut a = KeccakDuplexSponge::new(b"test-iv");
        let mut b = KeccakDuplexSponge::new(b"test-iv");
        a.absorb(b"hello");
        b.absorb(b"world");
        let mut out_a = [0u8; 32];
        let mut out_b = [0u8; 32];
        a.squeeze(&mut out_a);
        b.squeeze(&mut out_b);
        assert_ne!(out_a, out_b);
    }
}
