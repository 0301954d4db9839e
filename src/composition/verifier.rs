//! The interactive verifier tree: a structural mirror of `Node<L>` that
//! draws a challenge and checks a transcript against it.

use std::rc::Rc;

use group::Group;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::composition::challenge::Challenge;
use crate::composition::expression::Node;
use crate::composition::leaf::LeafProtocol;
use crate::composition::secret::SecretMap;
use crate::composition::transcript::{Commitment, Response};
use crate::errors::Error;

type Scalar<L> = <<L as LeafProtocol>::Group as Group>::Scalar;

/// A verifier, structurally mirroring the `Node<L>` it was built from
/// (`Node::Forced` is transparent here: forcing only constrains which Or
/// branch a prover may pick, it does not change what is being verified).
pub enum Verifier<L: LeafProtocol> {
    Leaf(Rc<L>),
    And(Vec<Verifier<L>>),
    Or(Vec<Verifier<L>>),
}

impl<L: LeafProtocol> Verifier<L> {
    pub fn build(node: &Node<L>) -> Verifier<L> {
        match node {
            Node::Forced(inner) => Verifier::build(inner),
            Node::Leaf(leaf) => Verifier::Leaf(Rc::clone(leaf)),
            Node::And(children) => Verifier::And(children.iter().map(Verifier::build).collect()),
            Node::Or(children) => Verifier::Or(children.iter().map(Verifier::build).collect()),
        }
    }

    fn proof_id(&self) -> Vec<u8> {
        match self {
            Verifier::Leaf(leaf) => leaf.proof_id(),
            Verifier::And(children) => encode_tagged("And", children),
            Verifier::Or(children) => encode_tagged("Or", children),
        }
    }

    /// SHA-256 over [`Self::proof_id`], identical to `Node::statement_hash`
    /// for the tree this verifier was built from.
    pub fn statement_hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.proof_id());
        hasher.finalize().into()
    }

    pub fn check_adequate_lhs(&self) -> bool {
        match self {
            Verifier::Leaf(leaf) => leaf.check_adequate_lhs(),
            Verifier::And(children) | Verifier::Or(children) => {
                children.iter().all(Verifier::check_adequate_lhs)
            }
        }
    }

    /// Checks `received_statement_hash` against this tree's own (unless
    /// `mute`, which embedded child verifiers pass since their parent
    /// already validated it), then draws a fresh challenge.
    pub fn challenge(
        &self,
        received_statement_hash: &[u8; 32],
        mute: bool,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<Challenge, Error> {
        if !mute && *received_statement_hash != self.statement_hash() {
            return Err(Error::StatementMismatch);
        }
        Ok(Challenge::sample(rng))
    }

    /// Checks a full interactive transcript `(commitment, challenge,
    /// response)` against this tree: response consistency for reoccurring
    /// secrets (shared within an `And`, independent per `Or` branch), the
    /// Or challenge-split law, and each leaf's recomputed commitment.
    pub fn verify(
        &self,
        commitment: &Commitment<L::Group>,
        challenge: &Challenge,
        response: &Response<Scalar<L>>,
    ) -> Result<(), Error> {
        if !self.check_adequate_lhs() {
            return Err(Error::VerificationFailed);
        }
        let mut dict = SecretMap::new();
        self.verify_with(commitment, challenge, response, &mut dict)
    }

    fn verify_with(
        &self,
        commitment: &Commitment<L::Group>,
        challenge: &Challenge,
        response: &Response<Scalar<L>>,
        dict: &mut SecretMap<Scalar<L>>,
    ) -> Result<(), Error> {
        match (self, commitment, response) {
            (Verifier::Leaf(leaf), Commitment::Leaf(commit_values), Response::Leaf(resp_values)) => {
                leaf.check_responses_consistency(resp_values, dict)
                    .map_err(|secret| Error::InconsistentResponses { secret })?;
                if !leaf.verify(commit_values, challenge, resp_values) {
                    return Err(Error::VerificationFailed);
                }
                Ok(())
            }
            (Verifier::And(children), Commitment::Composite(commits), Response::And(resps)) => {
                if children.len() != commits.len() || children.len() != resps.len() {
                    return Err(Error::InvalidExpression(
                        "And transcript arity mismatch".into(),
                    ));
                }
                for ((child, c), r) in children.iter().zip(commits.iter()).zip(resps.iter()) {
                    child.verify_with(c, challenge, r, dict)?;
                }
                Ok(())
            }
            (
                Verifier::Or(children),
                Commitment::Composite(commits),
                Response::Or {
                    subchallenges,
                    children: resps,
                },
            ) => {
                if children.len() != commits.len()
                    || children.len() != subchallenges.len()
                    || children.len() != resps.len()
                {
                    return Err(Error::InvalidExpression(
                        "Or transcript arity mismatch".into(),
                    ));
                }
                if Challenge::sum_mod(subchallenges.iter()) != *challenge {
                    return Err(Error::InconsistentChallenge);
                }
                for (((child, c), sub_c), r) in children
                    .iter()
                    .zip(commits.iter())
                    .zip(subchallenges.iter())
                    .zip(resps.iter())
                {
                    let mut local_dict = SecretMap::new();
                    child.verify_with(c, sub_c, r, &mut local_dict)?;
                }
                Ok(())
            }
            _ => Err(Error::InvalidExpression(
                "transcript shape does not match expression shape".into(),
            )),
        }
    }

    /// Recomputes the commitment a `(challenge, response)` pair would have
    /// produced, without needing a witness — used for non-interactive
    /// verification.
    pub fn recompute_commitment(
        &self,
        challenge: &Challenge,
        response: &Response<Scalar<L>>,
    ) -> Result<Commitment<L::Group>, Error> {
        match (self, response) {
            (Verifier::Leaf(leaf), Response::Leaf(values)) => {
                Ok(Commitment::Leaf(leaf.recompute_commitment(challenge, values)?))
            }
            (Verifier::And(children), Response::And(resps)) => {
                if children.len() != resps.len() {
                    return Err(Error::InvalidExpression(
                        "And response arity mismatch".into(),
                    ));
                }
                let commitments = children
                    .iter()
                    .zip(resps.iter())
                    .map(|(child, r)| child.recompute_commitment(challenge, r))
                    .collect::<Result<Vec<_>, Error>>()?;
                Ok(Commitment::Composite(commitments))
            }
            (
                Verifier::Or(children),
                Response::Or {
                    subchallenges,
                    children: resps,
                },
            ) => {
                if children.len() != subchallenges.len() || children.len() != resps.len() {
                    return Err(Error::InvalidExpression(
                        "Or response arity mismatch".into(),
                    ));
                }
                if Challenge::sum_mod(subchallenges.iter()) != *challenge {
                    return Err(Error::InconsistentChallenge);
                }
                let commitments = children
                    .iter()
                    .zip(subchallenges.iter())
                    .zip(resps.iter())
                    .map(|((child, sub_c), r)| child.recompute_commitment(sub_c, r))
                    .collect::<Result<Vec<_>, Error>>()?;
                Ok(Commitment::Composite(commitments))
            }
            _ => Err(Error::InvalidExpression(
                "response shape does not match expression shape".into(),
            )),
        }
    }
}

fn encode_tagged<L: LeafProtocol>(tag: &str, children: &[Verifier<L>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(tag.len() as u32).to_le_bytes());
    out.extend_from_slice(tag.as_bytes());
    out.extend_from_slice(&(children.len() as u32).to_le_bytes());
    for child in children {
        let id = child.proof_id();
        out.extend_from_slice(&(id.len() as u32).to_le_bytes());
        out.extend_from_slice(&id);
    }
    out
}
