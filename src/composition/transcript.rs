//! Transcript shapes shared by the prover, verifier and Fiat-Shamir driver,
//! and their canonical binary encodings.
//!
//! Every tree type here (`Commitment`, `Response`, `Precommitment`) mirrors
//! the shape of the `Node<L>` it was produced from: a leaf holds its own
//! flat payload, a composite holds one sub-payload per child. `Or` carries
//! its subchallenge list alongside the per-child responses.

use ff::PrimeField;
use group::{Group, GroupEncoding};

use crate::composition::challenge::{Challenge, CHALLENGE_BYTES};
use crate::errors::Error;

/// The commitment produced by one node of a prover tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Commitment<G: Group> {
    Leaf(Vec<G>),
    Composite(Vec<Commitment<G>>),
}

/// The response produced by one node of a prover tree. `Or` additionally
/// carries the subchallenge assigned to each child.
#[derive(Clone, Debug)]
pub enum Response<F> {
    Leaf(Vec<F>),
    And(Vec<Response<F>>),
    Or {
        subchallenges: Vec<Challenge>,
        children: Vec<Response<F>>,
    },
}

/// An optional "round zero" value published by a leaf (or collected from a
/// subtree) before the ordinary commitment. `None` at a composite node
/// means every child in that subtree declined to precommit.
#[derive(Clone, Debug)]
pub enum Precommitment {
    Leaf(Vec<u8>),
    Composite(Vec<Option<Precommitment>>),
}

/// The non-interactive transcript produced by [`crate::composition::prove`]
/// and consumed by [`crate::composition::verify`]. The commitment is
/// deliberately absent: the verifier recomputes it from `(challenge,
/// response)` and folds it back into the hash.
#[derive(Clone, Debug)]
pub struct NITranscript<G: Group> {
    pub statement_hash: [u8; 32],
    pub challenge: Challenge,
    pub precommitment: Option<Precommitment>,
    pub response: Response<G::Scalar>,
}

/// A simulated transcript, as produced by [`crate::composition::simulate`]:
/// unlike [`NITranscript`], it carries the commitment directly, since a
/// simulated transcript has no witness to recompute one from.
#[derive(Clone, Debug)]
pub struct SimulationTranscript<G: Group> {
    pub commitment: Commitment<G>,
    pub challenge: Challenge,
    pub response: Response<G::Scalar>,
    pub precommitment: Option<Precommitment>,
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_u8(&mut self) -> Result<u8, Error> {
        let byte = *self.data.get(self.pos).ok_or(Error::SerializationFailure)?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_u32(&mut self) -> Result<u32, Error> {
        let bytes = self.read_bytes(4)?;
        let mut arr = [0u8; 4];
        arr.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(arr))
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let end = self.pos.checked_add(n).ok_or(Error::SerializationFailure)?;
        let slice = self.data.get(self.pos..end).ok_or(Error::SerializationFailure)?;
        self.pos = end;
        Ok(slice)
    }
}

fn serialize_scalar_slice<F: PrimeField>(scalars: &[F]) -> Vec<u8> {
    let mut out = Vec::new();
    for scalar in scalars {
        out.extend_from_slice(scalar.to_repr().as_ref());
    }
    out
}

fn deserialize_scalar_slice<F: PrimeField>(data: &[u8], count: usize) -> Option<Vec<F>> {
    let len = <F::Repr as Default>::default().as_ref().len();
    if data.len() != len * count {
        return None;
    }
    let mut out = Vec::with_capacity(count);
    for chunk in data.chunks_exact(len) {
        let mut repr = F::Repr::default();
        repr.as_mut().copy_from_slice(chunk);
        out.push(Option::from(F::from_repr(repr))?);
    }
    Some(out)
}

impl<G: Group + GroupEncoding> Commitment<G> {
    /// Appends this commitment's canonical encoding to `out` — used both
    /// for the NI challenge hash and for this type's own wire format.
    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Commitment::Leaf(elements) => {
                out.push(0);
                out.extend_from_slice(&(elements.len() as u32).to_le_bytes());
                out.extend_from_slice(&crate::serialization::serialize_elements(elements));
            }
            Commitment::Composite(children) => {
                out.push(1);
                out.extend_from_slice(&(children.len() as u32).to_le_bytes());
                for child in children {
                    child.encode(out);
                }
            }
        }
    }

    /// The canonical encoding, as folded into the Fiat-Shamir challenge hash.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }

    fn decode(reader: &mut Reader) -> Result<Self, Error> {
        match reader.read_u8()? {
            0 => {
                let count = reader.read_u32()? as usize;
                let elem_len = <G::Repr as Default>::default().as_ref().len();
                let bytes = reader.read_bytes(elem_len * count)?;
                let elements = crate::serialization::deserialize_elements::<G>(bytes, count)
                    .ok_or(Error::SerializationFailure)?;
                Ok(Commitment::Leaf(elements))
            }
            1 => {
                let count = reader.read_u32()? as usize;
                let mut children = Vec::with_capacity(count);
                for _ in 0..count {
                    children.push(Commitment::decode(reader)?);
                }
                Ok(Commitment::Composite(children))
            }
            _ => Err(Error::SerializationFailure),
        }
    }
}

impl Precommitment {
    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Precommitment::Leaf(bytes) => {
                out.push(0);
                out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
                out.extend_from_slice(bytes);
            }
            Precommitment::Composite(children) => {
                out.push(1);
                out.extend_from_slice(&(children.len() as u32).to_le_bytes());
                for child in children {
                    match child {
                        Some(value) => {
                            out.push(1);
                            value.encode(out);
                        }
                        None => out.push(0),
                    }
                }
            }
        }
    }

    /// The canonical encoding, as folded into the Fiat-Shamir challenge hash.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }

    fn decode(reader: &mut Reader) -> Result<Self, Error> {
        match reader.read_u8()? {
            0 => {
                let count = reader.read_u32()? as usize;
                let bytes = reader.read_bytes(count)?.to_vec();
                Ok(Precommitment::Leaf(bytes))
            }
            1 => {
                let count = reader.read_u32()? as usize;
                let mut children = Vec::with_capacity(count);
                for _ in 0..count {
                    children.push(match reader.read_u8()? {
                        0 => None,
                        1 => Some(Precommitment::decode(reader)?),
                        _ => return Err(Error::SerializationFailure),
                    });
                }
                Ok(Precommitment::Composite(children))
            }
            _ => Err(Error::SerializationFailure),
        }
    }
}

impl<F: PrimeField> Response<F> {
    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Response::Leaf(values) => {
                out.push(0);
                out.extend_from_slice(&(values.len() as u32).to_le_bytes());
                out.extend_from_slice(&serialize_scalar_slice(values));
            }
            Response::And(children) => {
                out.push(1);
                out.extend_from_slice(&(children.len() as u32).to_le_bytes());
                for child in children {
                    child.encode(out);
                }
            }
            Response::Or {
                subchallenges,
                children,
            } => {
                out.push(2);
                out.extend_from_slice(&(subchallenges.len() as u32).to_le_bytes());
                for c in subchallenges {
                    out.extend_from_slice(&c.to_bytes());
                }
                out.extend_from_slice(&(children.len() as u32).to_le_bytes());
                for child in children {
                    child.encode(out);
                }
            }
        }
    }

    fn decode(reader: &mut Reader) -> Result<Self, Error> {
        match reader.read_u8()? {
            0 => {
                let count = reader.read_u32()? as usize;
                let len = <F::Repr as Default>::default().as_ref().len();
                let bytes = reader.read_bytes(len * count)?;
                let values = deserialize_scalar_slice::<F>(bytes, count)
                    .ok_or(Error::SerializationFailure)?;
                Ok(Response::Leaf(values))
            }
            1 => {
                let count = reader.read_u32()? as usize;
                let mut children = Vec::with_capacity(count);
                for _ in 0..count {
                    children.push(Response::decode(reader)?);
                }
                Ok(Response::And(children))
            }
            2 => {
                let n_sub = reader.read_u32()? as usize;
                let mut subchallenges = Vec::with_capacity(n_sub);
                for _ in 0..n_sub {
                    let bytes = reader.read_bytes(CHALLENGE_BYTES)?;
                    let mut arr = [0u8; CHALLENGE_BYTES];
                    arr.copy_from_slice(bytes);
                    subchallenges.push(Challenge::from_bytes(arr));
                }
                let n_children = reader.read_u32()? as usize;
                let mut children = Vec::with_capacity(n_children);
                for _ in 0..n_children {
                    children.push(Response::decode(reader)?);
                }
                Ok(Response::Or {
                    subchallenges,
                    children,
                })
            }
            _ => Err(Error::SerializationFailure),
        }
    }
}

impl<G: Group + GroupEncoding> NITranscript<G> {
    /// The canonical binary wire format: statement hash, challenge,
    /// precommitment, response, in that order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.statement_hash);
        out.extend_from_slice(&self.challenge.to_bytes());
        match &self.precommitment {
            Some(p) => {
                out.push(1);
                p.encode(&mut out);
            }
            None => out.push(0),
        }
        self.response.encode(&mut out);
        out
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        let mut reader = Reader::new(data);
        let mut statement_hash = [0u8; 32];
        statement_hash.copy_from_slice(reader.read_bytes(32)?);
        let mut challenge_bytes = [0u8; CHALLENGE_BYTES];
        challenge_bytes.copy_from_slice(reader.read_bytes(CHALLENGE_BYTES)?);
        let challenge = Challenge::from_bytes(challenge_bytes);
        let precommitment = match reader.read_u8()? {
            0 => None,
            1 => Some(Precommitment::decode(&mut reader)?),
            _ => return Err(Error::SerializationFailure),
        };
        let response = Response::decode(&mut reader)?;
        Ok(Self {
            statement_hash,
            challenge,
            precommitment,
            response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bls12_381::{G1Projective as G, Scalar};
    use rand::rngs::OsRng;

    #[test]
    fn ni_transcript_round_trips_through_bytes() {
        let mut rng = OsRng;
        let transcript = NITranscript::<G> {
            statement_hash: [7u8; 32],
            challenge: Challenge::sample(&mut rng),
            precommitment: Some(Precommitment::Composite(vec![
                Some(Precommitment::Leaf(vec![1, 2, 3])),
                None,
            ])),
            response: Response::Or {
                subchallenges: vec![Challenge::sample(&mut rng), Challenge::sample(&mut rng)],
                children: vec![
                    Response::Leaf(vec![Scalar::from(5u64)]),
                    Response::Leaf(vec![Scalar::from(9u64)]),
                ],
            },
        };
        let bytes = transcript.to_bytes();
        let decoded = NITranscript::<G>::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.statement_hash, transcript.statement_hash);
        assert_eq!(decoded.challenge, transcript.challenge);
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn truncated_bytes_fail_closed() {
        let bytes = vec![0u8; 10];
        assert!(NITranscript::<G>::from_bytes(&bytes).is_err());
    }
}
