//! The interactive prover tree: one node per `Node<L>`, holding exactly the
//! ephemeral state a single protocol run needs (drawn randomizers, the
//! chosen Or branch, pre-simulated sibling transcripts).
//!
//! `Node<L>`'s own flattening rule guarantees an `And` never has another
//! `And` as a direct child, so an `And`'s children are always `Leaf` or
//! `Or` provers — the `unreachable!` arms below rely on this.

use std::rc::Rc;

use group::Group;
use rand::{CryptoRng, Rng, RngCore};

use crate::composition::challenge::Challenge;
use crate::composition::expression::Node;
use crate::composition::leaf::LeafProtocol;
use crate::composition::secret::SecretMap;
use crate::composition::transcript::{Commitment, Precommitment, Response, SimulationTranscript};
use crate::composition::simulate_subtree;
use crate::errors::Error;

type Scalar<L> = <<L as LeafProtocol>::Group as Group>::Scalar;

/// Per-run prover state, mirroring the shape of the `Node<L>` it was built
/// from.
pub enum Prover<L: LeafProtocol> {
    Leaf {
        leaf: Rc<L>,
        state: L::ProverState,
        randomizers: SecretMap<Scalar<L>>,
    },
    And(Vec<Prover<L>>, SecretMap<Scalar<L>>),
    Or {
        true_index: usize,
        real: Box<Prover<L>>,
        simulated: Vec<Option<SimulationTranscript<L::Group>>>,
        real_randomizers: SecretMap<Scalar<L>>,
    },
}

impl<L: LeafProtocol> Prover<L> {
    /// Attempts to build a prover for `node` from `witness`, restricted at
    /// each leaf to the secrets it declares. Returns `None` when a required
    /// secret is unbound (an `And` fails if any child does; an `Or` tries
    /// every non-forced candidate before giving up).
    pub fn build(
        node: &Node<L>,
        witness: &SecretMap<Scalar<L>>,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Option<Prover<L>> {
        match node {
            Node::Forced(_) => None,
            Node::Leaf(leaf) => {
                let filtered = witness.filter_to(leaf.secrets());
                let state = leaf.build_prover(&filtered)?;
                Some(Prover::Leaf {
                    leaf: Rc::clone(leaf),
                    state,
                    randomizers: SecretMap::new(),
                })
            }
            Node::And(children) => {
                let mut provers = Vec::with_capacity(children.len());
                for child in children {
                    provers.push(Prover::build(child, witness, rng)?);
                }
                Some(Prover::And(provers, SecretMap::new()))
            }
            Node::Or(children) => {
                let mut candidates: Vec<usize> = children
                    .iter()
                    .enumerate()
                    .filter(|(_, child)| !child.is_force_simulated())
                    .map(|(i, _)| i)
                    .collect();
                while !candidates.is_empty() {
                    let pick = rng.gen_range(0..candidates.len());
                    let idx = candidates[pick];
                    if let Some(real) = Prover::build(&children[idx], witness, rng) {
                        let mut simulated = Vec::with_capacity(children.len());
                        for (i, child) in children.iter().enumerate() {
                            if i == idx {
                                simulated.push(None);
                            } else {
                                simulated.push(Some(simulate_subtree(child, None, rng).ok()?));
                            }
                        }
                        return Some(Prover::Or {
                            true_index: idx,
                            real: Box::new(real),
                            simulated,
                            real_randomizers: SecretMap::new(),
                        });
                    }
                    candidates.remove(pick);
                }
                None
            }
        }
    }

    /// The index of the real (non-simulated) branch, for an `Or` prover.
    pub fn true_index(&self) -> Option<usize> {
        match self {
            Prover::Or { true_index, .. } => Some(*true_index),
            _ => None,
        }
    }

    /// The optional round-zero message, collected recursively. `None` iff
    /// every leaf in the subtree declined to precommit.
    pub fn precommit(&self, rng: &mut (impl RngCore + CryptoRng)) -> Option<Precommitment> {
        match self {
            Prover::Leaf { leaf, .. } => leaf.precommit(rng).map(Precommitment::Leaf),
            Prover::And(children, _) => {
                let parts: Vec<Option<Precommitment>> =
                    children.iter().map(|c| c.precommit(rng)).collect();
                (!parts.iter().all(Option::is_none)).then(|| Precommitment::Composite(parts))
            }
            Prover::Or {
                true_index,
                real,
                simulated,
                ..
            } => {
                let parts: Vec<Option<Precommitment>> = simulated
                    .iter()
                    .enumerate()
                    .map(|(i, sim)| {
                        if i == *true_index {
                            real.precommit(rng)
                        } else {
                            sim.as_ref().and_then(|s| s.precommitment.clone())
                        }
                    })
                    .collect();
                (!parts.iter().all(Option::is_none)).then(|| Precommitment::Composite(parts))
            }
        }
    }

    /// Produces this node's commitment, drawing whatever randomizers are
    /// needed along the way. An `And` draws one shared map for its whole
    /// subtree; an `Or` draws a private map for its real branch only.
    pub fn commit(&mut self, rng: &mut (impl RngCore + CryptoRng)) -> Commitment<L::Group> {
        match self {
            Prover::Leaf {
                leaf,
                state,
                randomizers,
            } => {
                *randomizers = leaf.get_randomizers(rng);
                Commitment::Leaf(leaf.commit(state, randomizers))
            }
            Prover::And(children, randomizers) => {
                *randomizers = SecretMap::new();
                let commitments = children
                    .iter_mut()
                    .map(|child| child.commit_using(randomizers, rng))
                    .collect();
                Commitment::Composite(commitments)
            }
            Prover::Or {
                true_index,
                real,
                simulated,
                real_randomizers,
            } => {
                *real_randomizers = SecretMap::new();
                let commitments = simulated
                    .iter()
                    .enumerate()
                    .map(|(i, sim)| {
                        if i == *true_index {
                            real.commit_using(real_randomizers, rng)
                        } else {
                            sim.as_ref()
                                .expect("non-real Or branches are pre-simulated")
                                .commitment
                                .clone()
                        }
                    })
                    .collect();
                Commitment::Composite(commitments)
            }
        }
    }

    /// Commits using a randomizer map supplied by an enclosing `And`, rather
    /// than drawing (or owning) its own. Only `Leaf` and `Or` children can
    /// appear directly under an `And`.
    fn commit_using(
        &mut self,
        shared: &mut SecretMap<Scalar<L>>,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Commitment<L::Group> {
        match self {
            Prover::Leaf { leaf, state, .. } => {
                shared.extend_missing(leaf.get_randomizers(rng));
                Commitment::Leaf(leaf.commit(state, shared))
            }
            Prover::Or { .. } => self.commit(rng),
            Prover::And(..) => unreachable!("flattening forbids And as a direct child of And"),
        }
    }

    /// Produces this node's response to `challenge`, using the randomizers
    /// drawn during the preceding [`Self::commit`] call.
    pub fn respond(&self, challenge: &Challenge) -> Response<Scalar<L>> {
        match self {
            Prover::Leaf {
                leaf,
                state,
                randomizers,
            } => Response::Leaf(leaf.respond(state, randomizers, challenge)),
            Prover::And(children, randomizers) => Response::And(
                children
                    .iter()
                    .map(|child| child.respond_using(randomizers, challenge))
                    .collect(),
            ),
            Prover::Or {
                true_index,
                real,
                simulated,
                real_randomizers,
            } => {
                let sum_others = Challenge::sum_mod(simulated.iter().enumerate().filter_map(
                    |(i, sim)| {
                        (i != *true_index).then(|| {
                            &sim.as_ref()
                                .expect("non-real Or branches are pre-simulated")
                                .challenge
                        })
                    },
                ));
                let residual = challenge.sub_mod(&sum_others);
                let subchallenges: Vec<Challenge> = simulated
                    .iter()
                    .enumerate()
                    .map(|(i, sim)| {
                        if i == *true_index {
                            residual
                        } else {
                            sim.as_ref()
                                .expect("non-real Or branches are pre-simulated")
                                .challenge
                        }
                    })
                    .collect();
                let responses: Vec<Response<Scalar<L>>> = simulated
                    .iter()
                    .enumerate()
                    .map(|(i, sim)| {
                        if i == *true_index {
                            real.respond_using(real_randomizers, &residual)
                        } else {
                            sim.as_ref()
                                .expect("non-real Or branches are pre-simulated")
                                .response
                                .clone()
                        }
                    })
                    .collect();
                Response::Or {
                    subchallenges,
                    children: responses,
                }
            }
        }
    }

    fn respond_using(
        &self,
        shared: &SecretMap<Scalar<L>>,
        challenge: &Challenge,
    ) -> Response<Scalar<L>> {
        match self {
            Prover::Leaf { leaf, state, .. } => {
                Response::Leaf(leaf.respond(state, shared, challenge))
            }
            Prover::Or { .. } => self.respond(challenge),
            Prover::And(..) => unreachable!("flattening forbids And as a direct child of And"),
        }
    }
}
