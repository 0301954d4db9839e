//! Error types shared by the single-relation toolkit and the composition
//! engine.

use thiserror::Error;

use crate::composition::Secret;
use crate::linear_relation::GroupVar;

/// Errors produced while building or running a Sigma protocol, whether a
/// single relation or a composed AND/OR statement.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A group element variable was used before a value was assigned to it.
    #[error("group element variable {var:?} has not been assigned")]
    UnassignedGroupVar { var: GroupVar },

    /// The witness or response vector does not have the expected length for
    /// the relation being proven.
    #[error("witness or response does not match the relation's arity")]
    InvalidInstanceWitnessPair,

    /// A proof failed to (de)serialize into its canonical wire format.
    #[error("serialization failed")]
    SerializationFailure,

    /// A recomputed commitment or Fiat-Shamir challenge did not match the
    /// one carried by the transcript.
    #[error("verification failed")]
    VerificationFailure,

    /// An AND or OR composite was constructed with fewer than two children.
    #[error("composites require at least two children, found {found}")]
    ArityTooSmall { found: usize },

    /// A secret reoccurs across the tree bound to generators that declare
    /// different prime order.
    #[error("secret {secret:?} is bound to generators of differing order")]
    GroupMismatch { secret: Secret },

    /// A secret occurs both inside and outside an Or subtree.
    #[error("secret {secret:?} occurs both inside and outside an Or subtree")]
    OrFlaw { secret: Secret },

    /// A leaf-level statement was malformed (e.g. mismatched equation/image
    /// counts, or bases living in incompatible groups).
    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    /// The statement hash carried by a transcript does not match the local
    /// expression.
    #[error("statement hash does not match the local expression")]
    StatementMismatch,

    /// The Or subchallenges did not sum to the global challenge modulo 2^k.
    #[error("Or subchallenges are inconsistent with the global challenge")]
    InconsistentChallenge,

    /// A secret that occurs in multiple leaves under an And yielded
    /// differing responses.
    #[error("secret {secret:?} yielded inconsistent responses")]
    InconsistentResponses { secret: Secret },

    /// The recomputed commitment(s) did not match the received
    /// commitment(s), or the non-interactive challenge did not match the
    /// statement hash.
    #[error("verification failed")]
    VerificationFailed,
}

/// Alias kept for call sites that historically expected a `ProofError` name
/// from the single-relation Fiat-Shamir layer.
pub type ProofError = Error;
