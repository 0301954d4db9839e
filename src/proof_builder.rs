//! # Proof Builder for single-relation Sigma protocols
//!
//! This module defines the [`ProofBuilder`] struct, a high-level utility that simplifies
//! the construction and interaction with zero-knowledge proofs based on Sigma protocols.
//!
//! It abstracts over the underlying Schnorr protocol, Fiat-Shamir transformation,
//! and serialization concerns, making it easier to create proofs from linear
//! relations over cryptographic groups.
//!
//! ## Features
//! - Allocates scalar and point variables for constructing group equations.
//! - Appends equations representing statements to be proven.
//! - Supports element assignment to statement variables.
//! - Offers one-shot `prove` and `verify` methods.
//!
//! For statements built from AND/OR combinations of several relations, see
//! [`crate::composition`] instead.

use group::{Group, GroupEncoding};
use rand::{CryptoRng, RngCore};

use crate::codec::ShakeCodec;
use crate::errors::ProofError;
use crate::fiat_shamir::NISigmaProtocol;
use crate::linear_relation::{GroupVar, LinearRelation, ScalarVar};
use crate::schnorr_protocol::SchnorrProof;

/// A builder that helps construct Sigma proofs for a single linear group relation.
///
/// This struct wraps a [`SchnorrProof`] over a [`LinearRelation`] and applies
/// the Fiat-Shamir transform via [`NISigmaProtocol`]. It provides a user-friendly API
/// for allocating variables, defining statements, and generating proofs.
///
/// # Type Parameters
/// - `G`: A group that implements both [`Group`] and [`GroupEncoding`].
pub struct ProofBuilder<G>
where
    G: Group + GroupEncoding,
{
    /// The underlying Sigma protocol instance with Fiat-Shamir transformation applied.
    pub protocol: NISigmaProtocol<SchnorrProof<G>, ShakeCodec<G>, G>,
}

impl<G> ProofBuilder<G>
where
    G: Group + GroupEncoding,
{
    /// Creates a new proof builder with an empty Schnorr statement, identified
    /// by the given domain separator.
    pub fn new(domain_sep: &[u8]) -> Self {
        let schnorr_protocol = SchnorrProof::<G>::from(LinearRelation::new());
        let protocol =
            NISigmaProtocol::<SchnorrProof<G>, ShakeCodec<G>, G>::new(domain_sep, schnorr_protocol);
        Self { protocol }
    }

    /// Adds a new equation to the proof statement of the form:
    /// `lhs = Σ (scalar_i * point_i)`
    ///
    /// # Parameters
    /// - `lhs`: The [`GroupVar`] representing the left-hand group element.
    /// - `rhs`: A list of `(scalar variable, point variable)` tuples for the linear combination.
    pub fn append_equation(&mut self, lhs: GroupVar, rhs: &[(ScalarVar, GroupVar)]) {
        self.protocol.sigmap.0.append_equation(lhs, rhs.to_vec());
    }

    /// Allocates `n` scalar variables for use in the proof.
    pub fn allocate_scalars(&mut self, n: usize) -> Vec<ScalarVar> {
        (0..n)
            .map(|_| self.protocol.sigmap.0.allocate_scalar())
            .collect()
    }

    /// Allocates `n` point variables (group elements) for use in the proof.
    pub fn allocate_elements(&mut self, n: usize) -> Vec<GroupVar> {
        (0..n)
            .map(|_| self.protocol.sigmap.0.allocate_element())
            .collect()
    }

    /// Assigns specific group elements to point variables (indices).
    ///
    /// # Parameters
    /// - `elements`: A list of `(GroupVar, GroupElement)` pairs.
    pub fn set_elements(&mut self, elements: &[(GroupVar, G)]) {
        self.protocol.sigmap.0.set_elements(elements.to_vec());
    }

    /// Returns the expected group element results (`lhs`) of the current equations.
    ///
    /// This corresponds to the image values of the equations under the morphism.
    pub fn image(&self) -> Result<Vec<G>, ProofError> {
        self.protocol.sigmap.0.image()
    }

    /// Generates a non-interactive zero-knowledge proof for the current statement using the given witness.
    ///
    /// # Returns
    /// A serialized proof as a vector of bytes in batchable ('commitment', 'response') format.
    pub fn prove(
        &mut self,
        witness: &[<G as Group>::Scalar],
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<Vec<u8>, ProofError> {
        let witness_tmp = witness.to_vec();
        self.protocol.prove_batchable(&witness_tmp, rng)
    }

    /// Verifies a serialized batchable proof against the current statement.
    pub fn verify(&mut self, proof: &[u8]) -> Result<(), ProofError> {
        self.protocol.verify_batchable(proof)
    }

    /// Generates a compact proof for the current statement using the given witness.
    ///
    /// # Returns
    /// A serialized proof as a vector of bytes in compact ('challenge', 'response') format.
    pub fn prove_compact(
        &mut self,
        witness: &[<G as Group>::Scalar],
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<Vec<u8>, ProofError> {
        let witness_tmp = witness.to_vec();
        self.protocol.prove_compact(&witness_tmp, rng)
    }

    /// Verifies a serialized compact proof against the current statement.
    pub fn verify_compact(&mut self, proof: &[u8]) -> Result<(), ProofError> {
        self.protocol.verify_compact(proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bls12_381::G1Projective as G;
    use ff::Field;
    use rand::rngs::OsRng;

    #[test]
    fn prove_and_verify_batchable() {
        let mut rng = OsRng;
        let mut builder = ProofBuilder::<G>::new(b"proof-builder-test");

        let x = builder.allocate_scalars(1)[0];
        let vars = builder.allocate_elements(2);
        let (g_var, y_var) = (vars[0], vars[1]);

        let g = G::generator();
        let witness = <G as Group>::Scalar::random(&mut rng);
        let y = g * witness;
        builder.set_elements(&[(g_var, g), (y_var, y)]);
        builder.append_equation(y_var, &[(x, g_var)]);

        let proof = builder.prove(&[witness], &mut rng).unwrap();
        assert!(builder.verify(&proof).is_ok());
    }

    #[test]
    fn prove_and_verify_compact() {
        let mut rng = OsRng;
        let mut builder = ProofBuilder::<G>::new(b"proof-builder-test-compact");

        let x = builder.allocate_scalars(1)[0];
        let vars = builder.allocate_elements(2);
        let (g_var, y_var) = (vars[0], vars[1]);

        let g = G::generator();
        let witness = <G as Group>::Scalar::random(&mut rng);
        let y = g * witness;
        builder.set_elements(&[(g_var, g), (y_var, y)]);
        builder.append_equation(y_var, &[(x, g_var)]);

        let proof = builder.prove_compact(&[witness], &mut rng).unwrap();
        assert!(builder.verify_compact(&proof).is_ok());
    }
}
