//! The expression tree describing a composite statement, and the
//! construction-time validation (secret/generator binding, group
//! coherence, OR-flaw detection) that runs whenever an `And`/`Or` is built.

use std::collections::HashMap;
use std::rc::Rc;

use sha2::{Digest, Sha256};

use crate::composition::generator::Generator;
use crate::composition::leaf::LeafProtocol;
use crate::composition::secret::Secret;
use crate::errors::Error;

/// An immutable, cheaply-cloneable expression tree over one concrete leaf
/// type `L`. Leaves are held behind `Rc` so a tree can be shared across many
/// prover/verifier runs without re-allocating its relations.
pub enum Node<L: LeafProtocol> {
    Leaf(Rc<L>),
    And(Vec<Node<L>>),
    Or(Vec<Node<L>>),
    /// Wraps a subtree that must never be chosen as the real witness branch
    /// of an enclosing Or, even if a witness for it happens to be available.
    Forced(Box<Node<L>>),
}

impl<L: LeafProtocol> Clone for Node<L> {
    fn clone(&self) -> Self {
        match self {
            Node::Leaf(leaf) => Node::Leaf(Rc::clone(leaf)),
            Node::And(children) => Node::And(children.clone()),
            Node::Or(children) => Node::Or(children.clone()),
            Node::Forced(inner) => Node::Forced(inner.clone()),
        }
    }
}

impl<L: LeafProtocol> Node<L> {
    /// Wraps a single leaf relation as a tree of one node.
    pub fn leaf(leaf: L) -> Self {
        Node::Leaf(Rc::new(leaf))
    }

    /// Marks this subtree as one an enclosing Or must always simulate, even
    /// when a witness for it is present in the merged witness map.
    pub fn force_simulated(self) -> Self {
        Node::Forced(Box::new(self))
    }

    pub fn is_force_simulated(&self) -> bool {
        matches!(self, Node::Forced(_))
    }

    /// Builds a conjunction of `children`, flattening any direct `And`
    /// children into this one and validating the whole resulting subtree.
    pub fn and(children: Vec<Node<L>>) -> Result<Self, Error> {
        let flattened = flatten(children, |n| matches!(n, Node::And(_)), unwrap_and);
        let node = Node::And(flattened);
        validate(&node)?;
        Ok(node)
    }

    /// Builds a disjunction of `children`, flattening any direct `Or`
    /// children into this one and validating the whole resulting subtree.
    pub fn or(children: Vec<Node<L>>) -> Result<Self, Error> {
        let flattened = flatten(children, |n| matches!(n, Node::Or(_)), unwrap_or);
        let node = Node::Or(flattened);
        validate(&node)?;
        Ok(node)
    }

    /// The ordered bag (with multiplicity) of secrets this subtree depends
    /// on.
    pub fn secrets(&self) -> Vec<Secret> {
        match self {
            Node::Leaf(leaf) => leaf.secrets().to_vec(),
            Node::Forced(inner) => inner.secrets(),
            Node::And(children) | Node::Or(children) => {
                children.iter().flat_map(Node::secrets).collect()
            }
        }
    }

    /// The ordered bag of generators, index-aligned with [`Self::secrets`].
    pub fn generators(&self) -> Vec<Generator<L::Group>> {
        match self {
            Node::Leaf(leaf) => leaf.generators().to_vec(),
            Node::Forced(inner) => inner.generators(),
            Node::And(children) | Node::Or(children) => {
                children.iter().flat_map(Node::generators).collect()
            }
        }
    }

    /// A canonical descriptor binding this subtree's relation structure,
    /// recursively incorporating each leaf's own [`LeafProtocol::proof_id`].
    pub fn proof_id(&self) -> Vec<u8> {
        match self {
            Node::Leaf(leaf) => leaf.proof_id(),
            Node::Forced(inner) => inner.proof_id(),
            Node::And(children) => encode_tagged("And", children),
            Node::Or(children) => encode_tagged("Or", children),
        }
    }

    /// SHA-256 over [`Self::proof_id`] — the value bound into every
    /// Fiat-Shamir challenge derivation.
    pub fn statement_hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.proof_id());
        hasher.finalize().into()
    }

    /// Whether every leaf in this subtree reports an adequate left-hand
    /// side, the hook leaves whose LHS encodes a negative predicate use to
    /// veto verification outright.
    pub fn check_adequate_lhs(&self) -> bool {
        match self {
            Node::Leaf(leaf) => leaf.check_adequate_lhs(),
            Node::Forced(inner) => inner.check_adequate_lhs(),
            Node::And(children) | Node::Or(children) => {
                children.iter().all(Node::check_adequate_lhs)
            }
        }
    }
}

fn unwrap_and<L: LeafProtocol>(node: Node<L>) -> Vec<Node<L>> {
    match node {
        Node::And(children) => children,
        other => vec![other],
    }
}

fn unwrap_or<L: LeafProtocol>(node: Node<L>) -> Vec<Node<L>> {
    match node {
        Node::Or(children) => children,
        other => vec![other],
    }
}

fn flatten<L: LeafProtocol>(
    children: Vec<Node<L>>,
    is_same_kind: impl Fn(&Node<L>) -> bool,
    unwrap: impl Fn(Node<L>) -> Vec<Node<L>>,
) -> Vec<Node<L>> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        if is_same_kind(&child) {
            out.extend(unwrap(child));
        } else {
            out.push(child);
        }
    }
    out
}

fn encode_tagged<L: LeafProtocol>(tag: &str, children: &[Node<L>]) -> Vec<u8> {
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

fn count_secrets<L: LeafProtocol>(node: &Node<L>) -> HashMap<Secret, usize> {
    let mut counts = HashMap::new();
    for secret in node.secrets() {
        *counts.entry(secret).or_insert(0) += 1;
    }
    counts
}

/// Runs the construction-time checks on a freshly-built `And`/`Or` node:
/// arity, group coherence across reoccurring secrets, and (for `And`)
/// OR-flaw detection over the whole subtree.
fn validate<L: LeafProtocol>(node: &Node<L>) -> Result<(), Error> {
    let children = match node {
        Node::And(children) | Node::Or(children) => children,
        _ => unreachable!("validate is only called on freshly-built And/Or nodes"),
    };
    if children.len() < 2 {
        return Err(Error::ArityTooSmall {
            found: children.len(),
        });
    }

    let secrets = node.secrets();
    let generators = node.generators();
    let mut seen_orders: HashMap<Secret, &num_bigint::BigUint> = HashMap::new();
    for (secret, generator) in secrets.iter().zip(generators.iter()) {
        match seen_orders.get(secret) {
            Some(expected) if **expected != generator.order => {
                return Err(Error::GroupMismatch { secret: *secret });
            }
            _ => {
                seen_orders.insert(*secret, &generator.order);
            }
        }
    }

    if matches!(node, Node::And(_)) {
        detect_or_flaw(node)?;
    }
    Ok(())
}

fn detect_or_flaw<L: LeafProtocol>(root: &Node<L>) -> Result<(), Error> {
    let total = count_secrets(root);
    check_or_subtrees(root, &total)
}

fn check_or_subtrees<L: LeafProtocol>(
    node: &Node<L>,
    total: &HashMap<Secret, usize>,
) -> Result<(), Error> {
    match node {
        Node::Leaf(_) => Ok(()),
        Node::Forced(inner) => check_or_subtrees(inner, total),
        Node::And(children) => {
            for child in children {
                check_or_subtrees(child, total)?;
            }
            Ok(())
        }
        Node::Or(children) => {
            let or_counts = count_secrets(node);
            for (secret, count) in or_counts.iter() {
                if total.get(secret).copied().unwrap_or(0) > *count {
                    return Err(Error::OrFlaw { secret: *secret });
                }
            }
            for child in children {
                check_or_subtrees(child, total)?;
            }
            Ok(())
        }
    }
}

impl<L: LeafProtocol> std::ops::BitAnd for Node<L> {
    type Output = Result<Node<L>, Error>;

    fn bitand(self, rhs: Self) -> Self::Output {
        Node::and(vec![self, rhs])
    }
}

impl<L: LeafProtocol> std::ops::BitOr for Node<L> {
    type Output = Result<Node<L>, Error>;

    fn bitor(self, rhs: Self) -> Self::Output {
        Node::or(vec![self, rhs])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::challenge::Challenge;
    use crate::composition::leaf::DlRep;
    use bls12_381::{G1Projective as G, Scalar};
    use ff::Field;
    use group::Group as _;
    use rand::rngs::OsRng;

    fn fresh_leaf(secrets: Vec<Secret>) -> DlRep<G> {
        let mut rng = OsRng;
        let terms: Vec<_> = secrets
            .into_iter()
            .map(|s| (s, Generator::<G>::standard(G::random(&mut rng))))
            .collect();
        let witnesses: Vec<Scalar> = terms.iter().map(|_| Scalar::random(&mut rng)).collect();
        let lhs = terms
            .iter()
            .zip(witnesses.iter())
            .fold(G::identity(), |acc, ((_, g), w)| acc + g.point * w);
        DlRep::new(lhs, terms)
    }

    #[test]
    fn and_requires_at_least_two_children() {
        let leaf = Node::leaf(fresh_leaf(vec![Secret::new()]));
        let err = Node::and(vec![leaf]).unwrap_err();
        assert!(matches!(err, Error::ArityTooSmall { found: 1 }));
    }

    #[test]
    fn and_flattens_nested_and() {
        let a = Node::leaf(fresh_leaf(vec![Secret::new()]));
        let b = Node::leaf(fresh_leaf(vec![Secret::new()]));
        let c = Node::leaf(fresh_leaf(vec![Secret::new()]));
        let ab = Node::and(vec![a, b]).unwrap();
        let abc = Node::and(vec![ab.clone(), c.clone()]).unwrap();
        let direct = Node::and(vec![
            match &ab {
                Node::And(children) => children[0].clone(),
                _ => unreachable!(),
            },
            match &ab {
                Node::And(children) => children[1].clone(),
                _ => unreachable!(),
            },
            c,
        ])
        .unwrap();
        assert_eq!(abc.proof_id(), direct.proof_id());
    }

    #[test]
    fn cross_group_mismatch_detected() {
        let s = Secret::new();
        let mut rng = OsRng;
        let g_a = Generator::<G>::standard(G::random(&mut rng));
        let g_b = Generator::new(
            G::random(&mut rng),
            crate::composition::generator::orders::ristretto(),
        );
        let w = Scalar::random(&mut rng);
        let leaf_a = DlRep::new(g_a.point * w, vec![(s, g_a)]);
        let leaf_b = DlRep::new(g_b.point * w, vec![(s, g_b)]);
        let err = Node::and(vec![Node::leaf(leaf_a), Node::leaf(leaf_b)]).unwrap_err();
        assert!(matches!(err, Error::GroupMismatch { .. }));
    }

    #[test]
    fn or_flaw_detected_when_secret_escapes_or_subtree() {
        let shared = Secret::new();
        let l1 = Node::leaf(fresh_leaf(vec![shared]));
        let l2 = Node::leaf(fresh_leaf(vec![shared]));
        let l3 = Node::leaf(fresh_leaf(vec![Secret::new()]));
        let or_node = Node::or(vec![l2, l3]).unwrap();
        let err = Node::and(vec![l1, or_node]).unwrap_err();
        assert!(matches!(err, Error::OrFlaw { secret } if secret == shared));
    }

    #[test]
    fn check_adequate_lhs_defaults_true() {
        let leaf = Node::leaf(fresh_leaf(vec![Secret::new()]));
        assert!(leaf.check_adequate_lhs());
    }

    #[test]
    fn force_simulated_does_not_change_proof_id() {
        let leaf = fresh_leaf(vec![Secret::new()]);
        let plain = Node::leaf(leaf.clone());
        let forced = Node::leaf(leaf).force_simulated();
        assert_eq!(plain.proof_id(), forced.proof_id());
        assert!(forced.is_force_simulated());
    }

    #[test]
    fn statement_hash_is_stable_across_clones() {
        let leaf = Node::leaf(fresh_leaf(vec![Secret::new()]));
        assert_eq!(leaf.statement_hash(), leaf.clone().statement_hash());
        let _ = Challenge::zero();
    }
}
