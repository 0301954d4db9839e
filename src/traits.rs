//! Traits defining a single interactive Sigma protocol and its simulator.
//!
//! These are the traits a *single* relation implements (e.g.
//! [`crate::schnorr_protocol::SchnorrProof`]); the composition engine in
//! [`crate::composition`] builds AND/OR trees whose leaves implement
//! [`crate::composition::leaf::LeafProtocol`], a richer interface layered on
//! top of these.

use crate::errors::Error;
use rand::{CryptoRng, RngCore};

/// A three-move public-coin proof system for a fixed relation.
pub trait SigmaProtocol {
    /// The prover's first message.
    type Commitment;
    /// Ephemeral state threaded from `prover_commit` to `prover_response`.
    type ProverState;
    /// The prover's second message.
    type Response;
    /// The witness satisfying the relation.
    type Witness;
    /// The verifier's challenge.
    type Challenge;

    /// Produces a commitment and the state required to respond later.
    fn prover_commit(
        &self,
        witness: &Self::Witness,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<(Self::Commitment, Self::ProverState), Error>;

    /// Produces the response to a challenge, given the prover's state.
    fn prover_response(
        &self,
        prover_state: Self::ProverState,
        challenge: &Self::Challenge,
    ) -> Result<Self::Response, Error>;

    /// Checks a transcript against the relation.
    fn verifier(
        &self,
        commitment: &Self::Commitment,
        challenge: &Self::Challenge,
        response: &Self::Response,
    ) -> Result<(), Error>;

    /// Canonical byte encoding of a commitment.
    fn serialize_commitment(&self, commitment: &Self::Commitment) -> Vec<u8>;
    /// Canonical byte encoding of a challenge.
    fn serialize_challenge(&self, challenge: &Self::Challenge) -> Vec<u8>;
    /// Canonical byte encoding of a response.
    fn serialize_response(&self, response: &Self::Response) -> Vec<u8>;

    /// Decodes a commitment from its canonical byte encoding.
    fn deserialize_commitment(&self, data: &[u8]) -> Result<Self::Commitment, Error>;
    /// Decodes a challenge from its canonical byte encoding.
    fn deserialize_challenge(&self, data: &[u8]) -> Result<Self::Challenge, Error>;
    /// Decodes a response from its canonical byte encoding.
    fn deserialize_response(&self, data: &[u8]) -> Result<Self::Response, Error>;

    /// A label identifying the specific instance (bases, LHS) being proven;
    /// folded into Fiat-Shamir hashing alongside `protocol_identifier`.
    fn instance_label(&self) -> impl AsRef<[u8]>;

    /// A label identifying the protocol family (e.g. `b"SchnorrProof"`).
    fn protocol_identifier(&self) -> impl AsRef<[u8]>;

    /// Encodes `(commitment, response)` as a self-delimiting "batchable"
    /// proof: a u32-LE length prefix for the commitment, followed by the
    /// commitment bytes, followed by the response bytes. The challenge is
    /// not encoded — verifiers recompute it via Fiat-Shamir.
    fn serialize_batchable(
        &self,
        commitment: &Self::Commitment,
        _challenge: &Self::Challenge,
        response: &Self::Response,
    ) -> Result<Vec<u8>, Error> {
        let commitment_bytes = self.serialize_commitment(commitment);
        let response_bytes = self.serialize_response(response);
        let mut out = Vec::with_capacity(4 + commitment_bytes.len() + response_bytes.len());
        out.extend_from_slice(&(commitment_bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(&commitment_bytes);
        out.extend_from_slice(&response_bytes);
        Ok(out)
    }

    /// Inverse of [`Self::serialize_batchable`].
    fn deserialize_batchable(
        &self,
        data: &[u8],
    ) -> Result<(Self::Commitment, Self::Response), Error> {
        if data.len() < 4 {
            return Err(Error::SerializationFailure);
        }
        let commit_len = u32::from_le_bytes(
            data[..4]
                .try_into()
                .map_err(|_| Error::SerializationFailure)?,
        ) as usize;
        let rest = &data[4..];
        if rest.len() < commit_len {
            return Err(Error::SerializationFailure);
        }
        let (commit_bytes, response_bytes) = rest.split_at(commit_len);
        let commitment = self.deserialize_commitment(commit_bytes)?;
        let response = self.deserialize_response(response_bytes)?;
        Ok((commitment, response))
    }
}

/// HVZK simulator for a [`SigmaProtocol`]: produces transcripts
/// indistinguishable from real ones without knowledge of a witness.
pub trait SigmaProtocolSimulator: SigmaProtocol {
    /// Draws a uniformly random response, independent of any witness.
    fn simulate_response<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Self::Response;

    /// Draws a full simulated transcript `(commitment, challenge, response)`.
    fn simulate_transcript<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<(Self::Commitment, Self::Challenge, Self::Response), Error>;

    /// Recomputes the commitment that would make `(challenge, response)`
    /// verify, without needing a witness.
    fn simulate_commitment(
        &self,
        challenge: &Self::Challenge,
        response: &Self::Response,
    ) -> Result<Self::Commitment, Error>;
}

/// Marker for protocols that additionally support the compact
/// (challenge, response)-only wire format, recomputing the commitment on
/// verification.
pub trait CompactProtocol: SigmaProtocolSimulator {
    /// Recomputes the commitment for the compact wire format.
    fn get_commitment(
        &self,
        challenge: &Self::Challenge,
        response: &Self::Response,
    ) -> Result<Self::Commitment, Error> {
        self.simulate_commitment(challenge, response)
    }

    /// Encodes `(challenge, response)` as a self-delimiting "compact" proof:
    /// a u32-LE length prefix for the challenge, followed by the challenge
    /// bytes, followed by the response bytes. The commitment is not
    /// encoded — verifiers recompute it via [`Self::get_commitment`].
    fn serialize_compact(
        &self,
        _commitment: &Self::Commitment,
        challenge: &Self::Challenge,
        response: &Self::Response,
    ) -> Result<Vec<u8>, Error> {
        let challenge_bytes = self.serialize_challenge(challenge);
        let response_bytes = self.serialize_response(response);
        let mut out = Vec::with_capacity(4 + challenge_bytes.len() + response_bytes.len());
        out.extend_from_slice(&(challenge_bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(&challenge_bytes);
        out.extend_from_slice(&response_bytes);
        Ok(out)
    }

    /// Inverse of [`Self::serialize_compact`].
    fn deserialize_compact(&self, data: &[u8]) -> Result<(Self::Challenge, Self::Response), Error> {
        if data.len() < 4 {
            return Err(Error::SerializationFailure);
        }
        let challenge_len = u32::from_le_bytes(
            data[..4]
                .try_into()
                .map_err(|_| Error::SerializationFailure)?,
        ) as usize;
        let rest = &data[4..];
        if rest.len() < challenge_len {
            return Err(Error::SerializationFailure);
        }
        let (challenge_bytes, response_bytes) = rest.split_at(challenge_len);
        let challenge = self.deserialize_challenge(challenge_bytes)?;
        let response = self.deserialize_response(response_bytes)?;
        Ok((challenge, response))
    }
}
