//! AND/OR composition of Sigma protocol leaves into one interactive or
//! non-interactive proof.
//!
//! A statement is built as a [`Node`] expression tree over a single
//! concrete leaf type implementing [`LeafProtocol`] (this crate ships one:
//! [`DlRep`], discrete-log representation). [`Node::and`]/[`Node::or`]
//! validate the tree as it is built (arity, cross-secret group coherence,
//! the Or-flaw check); [`Node::prove`]/[`Node::verify`] drive a
//! Fiat-Shamir non-interactive proof end to end; [`Node::simulate`] and
//! [`Node::verify_simulation_consistency`] produce and check
//! honest-verifier simulations without any witness.

pub mod challenge;
pub mod expression;
pub mod generator;
pub mod leaf;
pub mod prover;
pub mod secret;
pub mod transcript;
pub mod verifier;

use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

pub use challenge::Challenge;
pub use expression::Node;
pub use generator::Generator;
pub use leaf::{DlRep, LeafProtocol, LeafSimulation};
pub use prover::Prover;
pub use secret::{Secret, SecretMap};
pub use transcript::{Commitment, NITranscript, Precommitment, Response, SimulationTranscript};
pub use verifier::Verifier;

use crate::errors::Error;
use group::Group;

type Scalar<L> = <<L as LeafProtocol>::Group as Group>::Scalar;

impl<L: LeafProtocol> Node<L> {
    /// Runs the full non-interactive prover: builds a witness-backed
    /// [`Prover`], derives the Fiat-Shamir challenge from the statement
    /// hash, the commitment, the precommitment (if any) and `message`, and
    /// returns the resulting transcript.
    pub fn prove(
        &self,
        witness: &SecretMap<Scalar<L>>,
        message: &[u8],
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<NITranscript<L::Group>, Error> {
        let mut prover =
            Prover::build(self, witness, rng).ok_or(Error::InvalidInstanceWitnessPair)?;
        let precommitment = prover.precommit(rng);
        let commitment = prover.commit(rng);
        let statement_hash = self.statement_hash();

        let mut hasher = Sha256::new();
        hasher.update(statement_hash);
        hasher.update(commitment.canonical_bytes());
        if let Some(p) = &precommitment {
            hasher.update(p.canonical_bytes());
        }
        hasher.update(message);
        let challenge = Challenge::from_digest(&hasher.finalize());

        let response = prover.respond(&challenge);
        Ok(NITranscript {
            statement_hash,
            challenge,
            precommitment,
            response,
        })
    }

    /// Verifies a non-interactive transcript against `message`: checks the
    /// statement hash, recomputes the commitment from `(challenge,
    /// response)`, re-derives the challenge from that recomputed
    /// commitment and checks it matches, then runs the same
    /// response-consistency and Or challenge-split checks an interactive
    /// verifier would.
    pub fn verify(&self, transcript: &NITranscript<L::Group>, message: &[u8]) -> bool {
        let verifier = Verifier::build(self);
        if transcript.statement_hash != verifier.statement_hash() {
            return false;
        }
        let commitment = match verifier.recompute_commitment(&transcript.challenge, &transcript.response)
        {
            Ok(commitment) => commitment,
            Err(_) => return false,
        };

        let mut hasher = Sha256::new();
        hasher.update(transcript.statement_hash);
        hasher.update(commitment.canonical_bytes());
        if let Some(p) = &transcript.precommitment {
            hasher.update(p.canonical_bytes());
        }
        hasher.update(message);
        let expected_challenge = Challenge::from_digest(&hasher.finalize());
        if expected_challenge != transcript.challenge {
            return false;
        }

        verifier
            .verify(&commitment, &transcript.challenge, &transcript.response)
            .is_ok()
    }

    /// Produces an honest-verifier simulation for a fixed global
    /// `challenge`, with no witness at all. Useful for pre-simulating Or
    /// branches and as a standalone debugging aid.
    pub fn simulate(
        &self,
        challenge: Challenge,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<SimulationTranscript<L::Group>, Error> {
        simulate_subtree(self, Some(challenge), rng)
    }

    /// Checks that a simulated transcript is internally consistent with
    /// this expression: every leaf's commitment matches its
    /// `(challenge, response)` pair, reoccurring secrets under an And
    /// agree, and every Or's subchallenges sum to its branch challenge.
    ///
    /// This is a debugging aid, not a substitute for [`Self::verify`]: a
    /// simulated transcript proves nothing about a real witness, it only
    /// demonstrates that one *could* have been produced without one.
    pub fn verify_simulation_consistency(&self, transcript: &SimulationTranscript<L::Group>) -> bool {
        let verifier = Verifier::build(self);
        verifier
            .verify(&transcript.commitment, &transcript.challenge, &transcript.response)
            .is_ok()
    }
}

/// Simulates `node` under `challenge` (sampling a fresh one if `None`),
/// without any witness. An And shares one response map across its whole
/// (flattened, And-free) subtree, so a secret reoccurring across its
/// children simulates identically each time; an Or gives each branch its
/// own independent responses, since the Or-flaw check guarantees no secret
/// escapes an Or subtree into the rest of the tree.
pub(crate) fn simulate_subtree<L: LeafProtocol>(
    node: &Node<L>,
    challenge: Option<Challenge>,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<SimulationTranscript<L::Group>, Error> {
    match node {
        Node::Forced(inner) => simulate_subtree(inner, challenge, rng),
        Node::Leaf(leaf) => {
            let sim = leaf.simulate(challenge.as_ref(), None, rng);
            Ok(SimulationTranscript {
                commitment: Commitment::Leaf(sim.commitment),
                challenge: sim.challenge,
                response: Response::Leaf(sim.response),
                precommitment: sim.precommitment.map(Precommitment::Leaf),
            })
        }
        Node::And(children) => {
            let global_challenge = challenge.unwrap_or_else(|| Challenge::sample(rng));
            let mut shared = SecretMap::new();
            let mut commitments = Vec::with_capacity(children.len());
            let mut responses = Vec::with_capacity(children.len());
            let mut precommits = Vec::with_capacity(children.len());
            for child in children {
                let sim = simulate_and_child(child, global_challenge, &mut shared, rng)?;
                commitments.push(sim.commitment);
                responses.push(sim.response);
                precommits.push(sim.precommitment);
            }
            let precommitment =
                (!precommits.iter().all(Option::is_none)).then(|| Precommitment::Composite(precommits));
            Ok(SimulationTranscript {
                commitment: Commitment::Composite(commitments),
                challenge: global_challenge,
                response: Response::And(responses),
                precommitment,
            })
        }
        Node::Or(children) => {
            let global_challenge = challenge.unwrap_or_else(|| Challenge::sample(rng));
            let mut subchallenges: Vec<Challenge> =
                (0..children.len() - 1).map(|_| Challenge::sample(rng)).collect();
            let residual = global_challenge.sub_mod(&Challenge::sum_mod(subchallenges.iter()));
            subchallenges.push(residual);

            let mut commitments = Vec::with_capacity(children.len());
            let mut responses = Vec::with_capacity(children.len());
            let mut precommits = Vec::with_capacity(children.len());
            for (child, sub_challenge) in children.iter().zip(subchallenges.iter()) {
                let sim = simulate_subtree(child, Some(*sub_challenge), rng)?;
                commitments.push(sim.commitment);
                responses.push(sim.response);
                precommits.push(sim.precommitment);
            }
            let precommitment =
                (!precommits.iter().all(Option::is_none)).then(|| Precommitment::Composite(precommits));
            Ok(SimulationTranscript {
                commitment: Commitment::Composite(commitments),
                challenge: global_challenge,
                response: Response::Or {
                    subchallenges,
                    children: responses,
                },
                precommitment,
            })
        }
    }
}

/// Simulates a direct child of an And using the shared response map, per
/// the same flattening invariant [`prover`] relies on: an And's direct
/// children are never another And.
fn simulate_and_child<L: LeafProtocol>(
    node: &Node<L>,
    challenge: Challenge,
    shared: &mut SecretMap<Scalar<L>>,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<SimulationTranscript<L::Group>, Error> {
    match node {
        Node::Forced(inner) => simulate_and_child(inner, challenge, shared, rng),
        Node::Leaf(leaf) => {
            let sim = leaf.simulate(Some(&challenge), Some(shared), rng);
            Ok(SimulationTranscript {
                commitment: Commitment::Leaf(sim.commitment),
                challenge: sim.challenge,
                response: Response::Leaf(sim.response),
                precommitment: sim.precommitment.map(Precommitment::Leaf),
            })
        }
        Node::Or(_) => simulate_subtree(node, Some(challenge), rng),
        Node::And(_) => unreachable!("flattening forbids And as a direct child of And"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::leaf::DlRep;
    use bls12_381::{G1Projective as G, Scalar};
    use ff::Field;
    use group::Group as _;
    use rand::rngs::OsRng;

    fn leaf_with_witness(secret: Secret) -> (DlRep<G>, Scalar) {
        let mut rng = OsRng;
        let generator = Generator::<G>::standard(G::random(&mut rng));
        let witness = Scalar::random(&mut rng);
        let lhs = generator.point * witness;
        (DlRep::new(lhs, vec![(secret, generator)]), witness)
    }

    #[test]
    fn and_proof_round_trips() {
        let mut rng = OsRng;
        let s0 = Secret::new();
        let s1 = Secret::new();
        let (leaf0, w0) = leaf_with_witness(s0);
        let (leaf1, w1) = leaf_with_witness(s1);
        let statement = Node::and(vec![Node::leaf(leaf0), Node::leaf(leaf1)]).unwrap();

        let witness: SecretMap<Scalar> = vec![(s0, w0), (s1, w1)].into_iter().collect();
        let transcript = statement.prove(&witness, b"message", &mut rng).unwrap();
        assert!(statement.verify(&transcript, b"message"));
        assert!(!statement.verify(&transcript, b"different message"));
    }

    #[test]
    fn or_proof_round_trips_with_only_one_witness() {
        let mut rng = OsRng;
        let s0 = Secret::new();
        let s1 = Secret::new();
        let (leaf0, w0) = leaf_with_witness(s0);
        let (leaf1, _w1) = leaf_with_witness(s1);
        let statement = Node::or(vec![Node::leaf(leaf0), Node::leaf(leaf1)]).unwrap();

        let witness: SecretMap<Scalar> = vec![(s0, w0)].into_iter().collect();
        let transcript = statement.prove(&witness, b"message", &mut rng).unwrap();
        assert!(statement.verify(&transcript, b"message"));
    }

    #[test]
    fn or_proof_fails_without_any_witness() {
        let mut rng = OsRng;
        let s0 = Secret::new();
        let s1 = Secret::new();
        let (leaf0, _w0) = leaf_with_witness(s0);
        let (leaf1, _w1) = leaf_with_witness(s1);
        let statement = Node::or(vec![Node::leaf(leaf0), Node::leaf(leaf1)]).unwrap();

        let empty = SecretMap::new();
        assert!(statement.prove(&empty, b"message", &mut rng).is_err());
    }

    #[test]
    fn simulation_is_self_consistent_without_a_witness() {
        let mut rng = OsRng;
        let s0 = Secret::new();
        let s1 = Secret::new();
        let (leaf0, _w0) = leaf_with_witness(s0);
        let (leaf1, _w1) = leaf_with_witness(s1);
        let statement = Node::or(vec![Node::leaf(leaf0), Node::leaf(leaf1)]).unwrap();

        let challenge = Challenge::sample(&mut rng);
        let sim = statement.simulate(challenge, &mut rng).unwrap();
        assert_eq!(sim.challenge, challenge);
        assert!(statement.verify_simulation_consistency(&sim));
    }

    #[test]
    fn tampered_response_is_rejected() {
        let mut rng = OsRng;
        let s0 = Secret::new();
        let s1 = Secret::new();
        let (leaf0, w0) = leaf_with_witness(s0);
        let (leaf1, w1) = leaf_with_witness(s1);
        let statement = Node::and(vec![Node::leaf(leaf0), Node::leaf(leaf1)]).unwrap();

        let witness: SecretMap<Scalar> = vec![(s0, w0), (s1, w1)].into_iter().collect();
        let mut transcript = statement.prove(&witness, b"message", &mut rng).unwrap();
        transcript.challenge = transcript.challenge.add_mod(&Challenge::sample(&mut rng));
        assert!(!statement.verify(&transcript, b"message"));
    }
}
