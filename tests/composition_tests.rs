//! End-to-end scenarios for the AND/OR composition engine: proving and
//! verifying composite statements over discrete-log-representation leaves,
//! message binding, and the construction-time checks that reject malformed
//! trees before any proof is attempted.

use bls12_381::{G1Projective as G, Scalar};
use group::Group as _;
use rand::rngs::OsRng;
use sigma_compose::composition::{DlRep, Generator, NITranscript, Node, Secret, SecretMap};

fn make_leaf(rng: &mut OsRng, terms: &[(Secret, Scalar)]) -> DlRep<G> {
    let mut lhs = G::identity();
    let mut built_terms = Vec::with_capacity(terms.len());
    for (secret, witness) in terms {
        let generator = Generator::<G>::standard(G::random(&mut *rng));
        lhs += generator.point * witness;
        built_terms.push((*secret, generator));
    }
    DlRep::new(lhs, built_terms)
}

#[test]
fn and_of_two_leaves_with_a_shared_secret_verifies() {
    let mut rng = OsRng;
    let x0 = Secret::new();
    let x1 = Secret::new();
    let x2 = Secret::new();
    let x3 = Secret::new();
    let x4 = Secret::new();
    let x5 = Secret::new();

    let w0 = Scalar::from(1u64);
    let w1 = Scalar::from(2u64);
    let w2 = Scalar::from(5u64);
    let w3 = Scalar::from(100u64);
    let w4 = Scalar::from(43u64);
    let w5 = Scalar::from(10u64);

    let leaf1 = make_leaf(&mut rng, &[(x0, w0), (x1, w1), (x2, w2)]);
    let leaf2 = make_leaf(&mut rng, &[(x0, w0), (x3, w3), (x4, w4), (x5, w5)]);
    let statement = (Node::leaf(leaf1) & Node::leaf(leaf2)).unwrap();

    let witness: SecretMap<Scalar> = vec![
        (x0, w0),
        (x1, w1),
        (x2, w2),
        (x3, w3),
        (x4, w4),
        (x5, w5),
    ]
    .into_iter()
    .collect();

    let transcript = statement.prove(&witness, b"hello", &mut rng).unwrap();
    assert!(statement.verify(&transcript, b"hello"));

    for &bad_secret in &[x0, x1, x2, x3, x4, x5] {
        let mut perturbed = witness.clone();
        perturbed.insert(bad_secret, Scalar::random(&mut rng));
        let bad_transcript = statement.prove(&perturbed, b"hello", &mut rng).unwrap();
        assert!(
            !statement.verify(&bad_transcript, b"hello"),
            "perturbing secret should invalidate the proof"
        );
    }
}

#[test]
fn or_with_six_children_and_one_witness_family_always_verifies() {
    let mut rng = OsRng;
    let mut children = Vec::with_capacity(6);
    let mut witness = SecretMap::new();

    for i in 0..6 {
        let s = Secret::new();
        let w = Scalar::from((i + 1) as u64);
        let leaf = make_leaf(&mut rng, &[(s, w)]);
        children.push(Node::leaf(leaf));
        // Only every other child (the "L1-like" family) gets a witness;
        // the rest must be simulated.
        if i % 2 == 0 {
            witness.insert(s, w);
        }
    }
    let statement = Node::or(children).unwrap();

    for _ in 0..30 {
        let transcript = statement.prove(&witness, b"round", &mut rng).unwrap();
        assert!(statement.verify(&transcript, b"round"));
    }
}

#[test]
fn non_interactive_proof_is_bound_to_its_message() {
    let mut rng = OsRng;
    let x0 = Secret::new();
    let x1 = Secret::new();
    let leaf1 = make_leaf(&mut rng, &[(x0, Scalar::from(7u64))]);
    let leaf2 = make_leaf(&mut rng, &[(x1, Scalar::from(11u64))]);
    let statement = Node::and(vec![Node::leaf(leaf1), Node::leaf(leaf2)]).unwrap();

    let witness: SecretMap<Scalar> = vec![(x0, Scalar::from(7u64)), (x1, Scalar::from(11u64))]
        .into_iter()
        .collect();
    let transcript = statement.prove(&witness, b"hello", &mut rng).unwrap();
    assert!(statement.verify(&transcript, b"hello"));
    assert!(!statement.verify(&transcript, b"world"));
}

#[test]
fn or_flaw_is_rejected_at_construction() {
    let mut rng = OsRng;
    let shared = Secret::new();
    let leaf1 = make_leaf(&mut rng, &[(shared, Scalar::from(3u64))]);
    let leaf2 = make_leaf(&mut rng, &[(shared, Scalar::from(3u64))]);
    let leaf3 = make_leaf(&mut rng, &[(Secret::new(), Scalar::from(9u64))]);

    let or_node = Node::or(vec![Node::leaf(leaf2), Node::leaf(leaf3)]).unwrap();
    let err = Node::and(vec![Node::leaf(leaf1), or_node]).unwrap_err();
    assert!(matches!(err, sigma_compose::errors::Error::OrFlaw { secret } if secret == shared));
}

#[test]
fn cross_group_order_mismatch_is_rejected_at_construction() {
    let mut rng = OsRng;
    let shared = Secret::new();
    let witness = Scalar::from(4u64);

    let g_a = Generator::<G>::standard(G::random(&mut rng));
    let g_b = Generator::new(
        G::random(&mut rng),
        sigma_compose::composition::generator::orders::ristretto(),
    );
    let leaf_a = DlRep::new(g_a.point * witness, vec![(shared, g_a)]);
    let leaf_b = DlRep::new(g_b.point * witness, vec![(shared, g_b)]);

    let err = Node::and(vec![Node::leaf(leaf_a), Node::leaf(leaf_b)]).unwrap_err();
    assert!(matches!(
        err,
        sigma_compose::errors::Error::GroupMismatch { secret } if secret == shared
    ));
}

#[test]
fn simulated_and_fails_real_verification_but_passes_consistency_check() {
    let mut rng = OsRng;
    let leaf_a = make_leaf(&mut rng, &[(Secret::new(), Scalar::from(2u64))]);
    let leaf_b = make_leaf(&mut rng, &[(Secret::new(), Scalar::from(3u64))]);
    let statement = Node::and(vec![Node::leaf(leaf_a), Node::leaf(leaf_b)]).unwrap();

    let challenge = sigma_compose::composition::Challenge::sample(&mut rng);
    let sim = statement.simulate(challenge, &mut rng).unwrap();
    assert!(statement.verify_simulation_consistency(&sim));

    let forged = NITranscript {
        statement_hash: statement.statement_hash(),
        challenge: sim.challenge,
        precommitment: sim.precommitment.clone(),
        response: sim.response.clone(),
    };
    assert!(!statement.verify(&forged, b"anything"));
}

#[test]
fn simulated_or_transcript_does_not_pass_as_a_real_non_interactive_proof() {
    let mut rng = OsRng;
    let leaf_a = make_leaf(&mut rng, &[(Secret::new(), Scalar::from(6u64))]);
    let leaf_b = make_leaf(&mut rng, &[(Secret::new(), Scalar::from(8u64))]);
    let statement = Node::or(vec![Node::leaf(leaf_a), Node::leaf(leaf_b)]).unwrap();

    let challenge = sigma_compose::composition::Challenge::sample(&mut rng);
    let sim = statement.simulate(challenge, &mut rng).unwrap();
    assert!(statement.verify_simulation_consistency(&sim));

    let forged = NITranscript {
        statement_hash: statement.statement_hash(),
        challenge: sim.challenge,
        precommitment: sim.precommitment.clone(),
        response: sim.response.clone(),
    };
    assert!(!statement.verify(&forged, b"message"));
}

#[test]
fn flattening_produces_identical_proof_ids() {
    let mut rng = OsRng;
    let a = Node::leaf(make_leaf(&mut rng, &[(Secret::new(), Scalar::from(1u64))]));
    let b = Node::leaf(make_leaf(&mut rng, &[(Secret::new(), Scalar::from(2u64))]));
    let c = Node::leaf(make_leaf(&mut rng, &[(Secret::new(), Scalar::from(3u64))]));

    let nested = (a.clone() | b.clone()).unwrap();
    let flat = Node::or(vec![nested.clone(), c.clone()]).unwrap();
    let direct = match nested {
        Node::Or(children) => Node::or(vec![children[0].clone(), children[1].clone(), c]).unwrap(),
        _ => unreachable!(),
    };
    assert_eq!(flat.proof_id(), direct.proof_id());
}
