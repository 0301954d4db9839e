//! Generators: group elements of known prime order.
//!
//! A leaf pairs each secret it proves knowledge of with a generator. The
//! order of that generator is declared explicitly rather than derived from
//! the Rust type `G` alone, since a point's order is a property of which
//! subgroup it happens to generate (relevant on cofactor-bearing curves),
//! not of the curve's ambient group type. See DESIGN.md for the rationale.

use group::Group;
use num_bigint::BigUint;

/// A group element together with its declared prime order.
#[derive(Clone)]
pub struct Generator<G: Group> {
    pub point: G,
    pub order: BigUint,
}

impl<G: Group> Generator<G> {
    /// Builds a generator with an explicitly declared order.
    pub fn new(point: G, order: BigUint) -> Self {
        Self { point, order }
    }
}

impl<G: Group> PartialEq for Generator<G> {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point && self.order == other.order
    }
}

impl<G: Group> std::fmt::Debug for Generator<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator").field("order", &self.order).finish()
    }
}

/// Well-known curve orders, for [`Generator::standard`] convenience
/// constructors below.
pub mod orders {
    use num_bigint::BigUint;

    /// The prime order of the Ristretto255 group.
    pub fn ristretto() -> BigUint {
        BigUint::parse_bytes(
            b"7237005577332262213973186563042994240857116359379907606001950938285454250989",
            10,
        )
        .expect("valid constant")
    }

    /// The prime order of the BLS12-381 scalar field (and hence of
    /// `G1`/`G2`, which are defined over it).
    pub fn bls12_381_scalar() -> BigUint {
        BigUint::parse_bytes(
            b"52435875175126190479447740508185965837690552500527637822603658699938581184513",
            10,
        )
        .expect("valid constant")
    }
}

impl Generator<curve25519_dalek::ristretto::RistrettoPoint> {
    /// A Ristretto255 generator, with its order filled in from the
    /// well-known table in [`orders`].
    pub fn standard(point: curve25519_dalek::ristretto::RistrettoPoint) -> Self {
        Self::new(point, orders::ristretto())
    }
}

impl Generator<bls12_381::G1Projective> {
    /// A BLS12-381 `G1` generator, with its order filled in from the
    /// well-known table in [`orders`].
    pub fn standard(point: bls12_381::G1Projective) -> Self {
        Self::new(point, orders::bls12_381_scalar())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bls12_381::G1Projective as G;
    use group::Group as _;

    #[test]
    fn standard_fills_in_known_order() {
        let g = Generator::<G>::standard(G::generator());
        assert_eq!(g.order, orders::bls12_381_scalar());
    }
}
