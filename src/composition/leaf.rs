//! The leaf interface the composition engine consumes, and its sole
//! concrete implementation shipped in this crate: [`DlRep`], a
//! discrete-log-representation leaf built on [`LinearRelation`].
//!
//! Concrete Sigma protocols other than discrete-log representations (BBS+
//! signature knowledge, inequality proofs) are out of scope here — they are
//! future implementors of [`LeafProtocol`], not code that lives here.

use group::{Group, GroupEncoding};
use rand::{CryptoRng, RngCore};

use crate::composition::challenge::Challenge;
use crate::composition::generator::Generator;
use crate::composition::secret::{Secret, SecretMap};
use crate::errors::Error;
use crate::linear_relation::LinearRelation;

/// A simulated transcript for a single leaf: `(commitment, challenge,
/// responses, precommitment)`. `precommitment` is `None` for leaves (like
/// [`DlRep`]) that do not use a pre-commitment round.
#[derive(Clone, Debug)]
pub struct LeafSimulation<G: Group> {
    pub commitment: Vec<G>,
    pub challenge: Challenge,
    pub response: Vec<G::Scalar>,
    pub precommitment: Option<Vec<u8>>,
}

/// The interface a leaf relation must expose to the AND/OR composition
/// engine. Implemented concretely by [`DlRep`] in this crate.
pub trait LeafProtocol {
    /// The prime-order group this leaf's commitments and generators live in.
    type Group: Group + GroupEncoding;
    /// Ephemeral state threaded from [`Self::build_prover`] through
    /// [`Self::commit`] to [`Self::respond`] — for [`DlRep`], the witness
    /// scalars in the same order as [`Self::secrets`].
    type ProverState: Clone;

    /// The ordered bag of secret identities this leaf proves knowledge of.
    fn secrets(&self) -> &[Secret];

    /// The generators paired 1:1 with [`Self::secrets`].
    fn generators(&self) -> &[Generator<Self::Group>];

    /// A canonical, hashable descriptor binding this leaf's relation,
    /// bases, and left-hand-side element.
    fn proof_id(&self) -> Vec<u8>;

    /// Attempts to build prover state from a witness map, restricted to the
    /// secrets this leaf declares. Returns `None` if any required secret is
    /// unbound.
    fn build_prover(
        &self,
        witness: &SecretMap<<Self::Group as Group>::Scalar>,
    ) -> Option<Self::ProverState>;

    /// Produces this leaf's commitment, given the randomizers assigned to
    /// its secrets (possibly a shared map covering a larger AND subtree).
    fn commit(
        &self,
        state: &Self::ProverState,
        randomizers: &SecretMap<<Self::Group as Group>::Scalar>,
    ) -> Vec<Self::Group>;

    /// Produces this leaf's response to `challenge`, using the same
    /// randomizer map passed to the preceding [`Self::commit`] call.
    fn respond(
        &self,
        state: &Self::ProverState,
        randomizers: &SecretMap<<Self::Group as Group>::Scalar>,
        challenge: &Challenge,
    ) -> Vec<<Self::Group as Group>::Scalar>;

    /// Checks a transcript against this leaf's relation directly (used by
    /// the interactive verifier).
    fn verify(
        &self,
        commitment: &[Self::Group],
        challenge: &Challenge,
        response: &[<Self::Group as Group>::Scalar],
    ) -> bool;

    /// Recomputes the commitment that would make `(challenge, response)`
    /// verify, without needing a witness — used by non-interactive
    /// verification and by Or's "recompute and compare" check.
    fn recompute_commitment(
        &self,
        challenge: &Challenge,
        response: &[<Self::Group as Group>::Scalar],
    ) -> Result<Vec<Self::Group>, Error>;

    /// Draws a fresh uniform randomizer per secret this leaf declares.
    fn get_randomizers(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> SecretMap<<Self::Group as Group>::Scalar>;

    /// Checks that `response` agrees with any previously recorded response
    /// for a reoccurring secret, recording fresh entries in `dict` as it
    /// goes. Returns the offending secret on a contradiction.
    fn check_responses_consistency(
        &self,
        response: &[<Self::Group as Group>::Scalar],
        dict: &mut SecretMap<<Self::Group as Group>::Scalar>,
    ) -> Result<(), Secret>;

    /// Produces a simulated transcript without a witness. When `responses`
    /// is given, secrets already present in the map reuse their recorded
    /// value (so an AND's reoccurring secret simulates identically across
    /// children); fresh draws are written back into the map. `None` (the
    /// case used by Or) means no cross-child sharing is required.
    fn simulate(
        &self,
        challenge: Option<&Challenge>,
        responses: Option<&mut SecretMap<<Self::Group as Group>::Scalar>>,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> LeafSimulation<Self::Group>;

    /// An optional "round zero" message some leaves publish before the
    /// normal commitment. `DlRep` needs none.
    fn precommit(&self, _rng: &mut (impl RngCore + CryptoRng)) -> Option<Vec<u8>> {
        None
    }

    /// Consulted before accepting a verify; leaves whose left-hand side
    /// encodes a negative predicate override this.
    fn check_adequate_lhs(&self) -> bool {
        true
    }
}

/// A discrete-log-representation leaf: proves knowledge of scalars
/// `x_0, ..., x_{n-1}` such that `lhs = x_0 * G_0 + ... + x_{n-1} * G_{n-1}`,
/// built on a single-equation [`LinearRelation`].
#[derive(Clone)]
pub struct DlRep<G: Group + GroupEncoding> {
    relation: LinearRelation<G>,
    secrets: Vec<Secret>,
    generators: Vec<Generator<G>>,
}

impl<G: Group + GroupEncoding> DlRep<G> {
    /// Builds a leaf proving `lhs = Σ secret_i * generator_i`, for the
    /// given ordered `(secret, generator)` pairs.
    pub fn new(lhs: G, terms: Vec<(Secret, Generator<G>)>) -> Self {
        let mut relation = LinearRelation::new();
        let lhs_var = relation.allocate_element();

        let mut secrets = Vec::with_capacity(terms.len());
        let mut generators = Vec::with_capacity(terms.len());
        let mut lc_terms = Vec::with_capacity(terms.len());
        for (secret, generator) in terms {
            let scalar_var = relation.allocate_scalar();
            let group_var = relation.allocate_element();
            relation.set_element(group_var, generator.point);
            lc_terms.push((scalar_var, group_var));
            secrets.push(secret);
            generators.push(generator);
        }
        relation.append_equation(lhs_var, lc_terms);
        relation.set_element(lhs_var, lhs);

        Self {
            relation,
            secrets,
            generators,
        }
    }

    fn witness_vector(
        &self,
        witness: &SecretMap<<G as Group>::Scalar>,
    ) -> Option<Vec<<G as Group>::Scalar>> {
        self.secrets
            .iter()
            .map(|secret| witness.get(secret).copied())
            .collect()
    }

    fn randomizer_vector(
        &self,
        randomizers: &SecretMap<<G as Group>::Scalar>,
    ) -> Vec<<G as Group>::Scalar> {
        self.secrets
            .iter()
            .map(|secret| {
                *randomizers
                    .get(secret)
                    .expect("randomizer map must cover every secret in scope")
            })
            .collect()
    }
}

impl<G: Group + GroupEncoding> LeafProtocol for DlRep<G> {
    type Group = G;
    type ProverState = Vec<G::Scalar>;

    fn secrets(&self) -> &[Secret] {
        &self.secrets
    }

    fn generators(&self) -> &[Generator<Self::Group>] {
        &self.generators
    }

    fn proof_id(&self) -> Vec<u8> {
        let mut out = self.relation.label();
        for generator in &self.generators {
            out.extend_from_slice(generator.point.to_bytes().as_ref());
        }
        if let Ok(image) = self.relation.image() {
            for point in image {
                out.extend_from_slice(point.to_bytes().as_ref());
            }
        }
        out
    }

    fn build_prover(&self, witness: &SecretMap<<G as Group>::Scalar>) -> Option<Self::ProverState> {
        self.witness_vector(witness)
    }

    fn commit(
        &self,
        _state: &Self::ProverState,
        randomizers: &SecretMap<<G as Group>::Scalar>,
    ) -> Vec<G> {
        let nonces = self.randomizer_vector(randomizers);
        self.relation
            .linear_map
            .evaluate(&nonces)
            .expect("every generator in scope is assigned")
    }

    fn respond(
        &self,
        state: &Self::ProverState,
        randomizers: &SecretMap<<G as Group>::Scalar>,
        challenge: &Challenge,
    ) -> Vec<G::Scalar> {
        let c = challenge.to_scalar::<G::Scalar>();
        let nonces = self.randomizer_vector(randomizers);
        nonces
            .into_iter()
            .zip(state.iter())
            .map(|(r, w)| r + *w * c)
            .collect()
    }

    fn verify(&self, commitment: &[G], challenge: &Challenge, response: &[G::Scalar]) -> bool {
        match self.recompute_commitment(challenge, response) {
            Ok(recomputed) => recomputed == commitment,
            Err(_) => false,
        }
    }

    fn recompute_commitment(
        &self,
        challenge: &Challenge,
        response: &[G::Scalar],
    ) -> Result<Vec<G>, Error> {
        if response.len() != self.secrets.len() {
            return Err(Error::InvalidInstanceWitnessPair);
        }
        let c = challenge.to_scalar::<G::Scalar>();
        let response_image = self.relation.linear_map.evaluate(response)?;
        let image = self.relation.image()?;
        Ok(response_image
            .iter()
            .zip(image.iter())
            .map(|(res, img)| *res - *img * c)
            .collect())
    }

    fn get_randomizers(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> SecretMap<<G as Group>::Scalar> {
        use ff::Field;
        self.secrets
            .iter()
            .map(|secret| (*secret, G::Scalar::random(&mut *rng)))
            .collect()
    }

    fn check_responses_consistency(
        &self,
        response: &[G::Scalar],
        dict: &mut SecretMap<<G as Group>::Scalar>,
    ) -> Result<(), Secret> {
        for (secret, value) in self.secrets.iter().zip(response.iter()) {
            match dict.get(secret) {
                Some(existing) if existing != value => return Err(*secret),
                _ => {
                    dict.insert(*secret, *value);
                }
            }
        }
        Ok(())
    }

    fn simulate(
        &self,
        challenge: Option<&Challenge>,
        responses: Option<&mut SecretMap<<G as Group>::Scalar>>,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> LeafSimulation<G> {
        use ff::Field;

        let challenge = challenge.copied().unwrap_or_else(|| Challenge::sample(rng));
        let mut response = Vec::with_capacity(self.secrets.len());
        match responses {
            Some(map) => {
                for secret in &self.secrets {
                    let value = match map.get(secret) {
                        Some(v) => *v,
                        None => {
                            let fresh = G::Scalar::random(&mut *rng);
                            map.insert(*secret, fresh);
                            fresh
                        }
                    };
                    response.push(value);
                }
            }
            None => {
                for _ in &self.secrets {
                    response.push(G::Scalar::random(&mut *rng));
                }
            }
        }
        let commitment = self
            .recompute_commitment(&challenge, &response)
            .expect("well-formed leaf relation");
        LeafSimulation {
            commitment,
            challenge,
            response,
            precommitment: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bls12_381::{G1Projective as G, Scalar};
    use ff::Field;
    use group::Group as _;
    use rand::rngs::OsRng;

    fn sample_leaf() -> (DlRep<G>, Vec<Secret>, Vec<Scalar>) {
        let mut rng = OsRng;
        let g0 = Generator::<G>::standard(G::generator());
        let g1 = Generator::<G>::standard(G::random(&mut rng));
        let s0 = Secret::new();
        let s1 = Secret::new();
        let w0 = Scalar::random(&mut rng);
        let w1 = Scalar::random(&mut rng);
        let lhs = g0.point * w0 + g1.point * w1;
        let leaf = DlRep::new(lhs, vec![(s0, g0), (s1, g1)]);
        (leaf, vec![s0, s1], vec![w0, w1])
    }

    #[test]
    fn commit_respond_verify_round_trip() {
        let mut rng = OsRng;
        let (leaf, secrets, witnesses) = sample_leaf();
        let witness_map: SecretMap<Scalar> =
            secrets.iter().copied().zip(witnesses.iter().copied()).collect();
        let state = leaf.build_prover(&witness_map).unwrap();
        let randomizers = leaf.get_randomizers(&mut rng);
        let commitment = leaf.commit(&state, &randomizers);
        let challenge = Challenge::sample(&mut rng);
        let response = leaf.respond(&state, &randomizers, &challenge);
        assert!(leaf.verify(&commitment, &challenge, &response));
    }

    #[test]
    fn wrong_witness_rejected() {
        let mut rng = OsRng;
        let (leaf, secrets, _witnesses) = sample_leaf();
        let bad_witness_map: SecretMap<Scalar> = secrets
            .iter()
            .copied()
            .map(|s| (s, Scalar::random(&mut rng)))
            .collect();
        let state = leaf.build_prover(&bad_witness_map).unwrap();
        let randomizers = leaf.get_randomizers(&mut rng);
        let commitment = leaf.commit(&state, &randomizers);
        let challenge = Challenge::sample(&mut rng);
        let response = leaf.respond(&state, &randomizers, &challenge);
        assert!(!leaf.verify(&commitment, &challenge, &response));
    }

    #[test]
    fn missing_witness_returns_none() {
        let (leaf, _secrets, _witnesses) = sample_leaf();
        let empty = SecretMap::new();
        assert!(leaf.build_prover(&empty).is_none());
    }

    #[test]
    fn simulation_self_verifies() {
        let mut rng = OsRng;
        let (leaf, _secrets, _witnesses) = sample_leaf();
        let sim = leaf.simulate(None, None, &mut rng);
        assert!(leaf.verify(&sim.commitment, &sim.challenge, &sim.response));
    }
}
