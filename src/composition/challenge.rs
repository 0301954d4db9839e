//! Challenge arithmetic modulo `2^k`, shared by the Or node's subchallenge
//! splitting and the engine's Fiat-Shamir driver.
//!
//! Arithmetic is carried out over [`num_bigint`] rather than a fixed
//! machine integer so the modulus stays a named, adjustable parameter
//! (`CHALLENGE_BITS`) independent of any leaf's scalar field order. See
//! DESIGN.md for the rationale.

use ff::Field;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;
use rand::RngCore;

/// The challenge bit-length `k` (the reference library parameter).
pub const CHALLENGE_BITS: usize = 128;
/// `CHALLENGE_BITS` in bytes.
pub const CHALLENGE_BYTES: usize = CHALLENGE_BITS / 8;

/// A challenge value in `[0, 2^k)`, stored as `CHALLENGE_BYTES` big-endian
/// bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Challenge([u8; CHALLENGE_BYTES]);

fn modulus() -> BigUint {
    BigUint::from(1u8) << CHALLENGE_BITS
}

impl Challenge {
    /// The additive identity.
    pub fn zero() -> Self {
        Self([0u8; CHALLENGE_BYTES])
    }

    /// Wraps a big-endian byte array directly (already reduced mod `2^k`
    /// by construction, since it has exactly `CHALLENGE_BYTES` bytes).
    pub fn from_bytes(bytes: [u8; CHALLENGE_BYTES]) -> Self {
        Self(bytes)
    }

    /// The big-endian byte encoding used by this engine's wire format.
    pub fn to_bytes(self) -> [u8; CHALLENGE_BYTES] {
        self.0
    }

    fn to_biguint(self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    fn from_biguint(value: &BigUint) -> Self {
        let reduced = value % modulus();
        let mut bytes = reduced.to_bytes_be();
        if bytes.len() < CHALLENGE_BYTES {
            let mut padded = vec![0u8; CHALLENGE_BYTES - bytes.len()];
            padded.extend_from_slice(&bytes);
            bytes = padded;
        }
        let mut out = [0u8; CHALLENGE_BYTES];
        out.copy_from_slice(&bytes[bytes.len() - CHALLENGE_BYTES..]);
        Self(out)
    }

    /// Draws a uniform challenge from `rng`.
    pub fn sample(rng: &mut impl RngCore) -> Self {
        let mut bytes = [0u8; CHALLENGE_BYTES];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Derives a challenge from a Fiat-Shamir hash digest by reducing it
    /// modulo `2^k`. `digest` may be any length at least `CHALLENGE_BYTES`;
    /// only its low-order bytes (big-endian) matter once reduced.
    pub fn from_digest(digest: &[u8]) -> Self {
        Self::from_biguint(&BigUint::from_bytes_be(digest))
    }

    /// `self + other (mod 2^k)`.
    pub fn add_mod(&self, other: &Challenge) -> Challenge {
        Self::from_biguint(&(self.to_biguint() + other.to_biguint()))
    }

    /// `self - other (mod 2^k)`.
    pub fn sub_mod(&self, other: &Challenge) -> Challenge {
        let m = BigInt::from_biguint(Sign::Plus, modulus());
        let a = BigInt::from_biguint(Sign::Plus, self.to_biguint());
        let b = BigInt::from_biguint(Sign::Plus, other.to_biguint());
        let mut diff = (a - b) % &m;
        if diff.sign() == Sign::Minus {
            diff += &m;
        }
        let (_, magnitude) = diff.into_parts();
        Self::from_biguint(&magnitude)
    }

    /// `-self (mod 2^k)`.
    pub fn neg_mod(&self) -> Challenge {
        Challenge::zero().sub_mod(self)
    }

    /// Sums a list of challenges modulo `2^k` (the Or challenge-split law:
    /// the global challenge must equal the sum of every branch's
    /// subchallenge).
    pub fn sum_mod<'a>(challenges: impl IntoIterator<Item = &'a Challenge>) -> Challenge {
        let m = modulus();
        let mut acc = BigUint::zero();
        for c in challenges {
            acc = (acc + c.to_biguint()) % &m;
        }
        Self::from_biguint(&acc)
    }

    /// Embeds this `k`-bit challenge into a leaf's scalar field `F` by
    /// treating its big-endian bytes as a base-2 expansion. Valid because
    /// `k = 128` is safely smaller than the order of every group this
    /// crate ships (Ristretto ~2^252, BLS12-381 scalar field ~2^255): no
    /// reduction collision can occur within the range a challenge can take.
    pub fn to_scalar<F: Field>(&self) -> F {
        let mut acc = F::ZERO;
        for byte in self.0.iter() {
            for i in (0..8).rev() {
                acc = acc.double();
                if (byte >> i) & 1 == 1 {
                    acc += F::ONE;
                }
            }
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residual_keeps_sum_equal_to_global() {
        let mut rng = rand::rngs::OsRng;
        let c = Challenge::sample(&mut rng);
        let others = vec![Challenge::sample(&mut rng), Challenge::sample(&mut rng)];
        let sum_others = Challenge::sum_mod(others.iter());
        let residual = c.sub_mod(&sum_others);
        let mut all = others.clone();
        all.push(residual);
        assert_eq!(Challenge::sum_mod(all.iter()), c);
    }

    #[test]
    fn neg_mod_is_additive_inverse() {
        let mut rng = rand::rngs::OsRng;
        let c = Challenge::sample(&mut rng);
        assert_eq!(c.add_mod(&c.neg_mod()), Challenge::zero());
    }

    #[test]
    fn from_digest_reduces_into_range() {
        let digest = [0xffu8; 32];
        let c = Challenge::from_digest(&digest);
        assert_eq!(c.to_bytes().len(), CHALLENGE_BYTES);
    }
}
