//! Canonical, fixed-length binary encodings for group elements and scalars.
//!
//! Every element/scalar is encoded at its type's native `Repr` width, so a
//! buffer of `n` elements can be split into `n` equal chunks without a
//! length prefix. This is the encoding used both by the single-relation
//! compact/batchable proof formats ([`crate::fiat_shamir`]) and, via
//! [`crate::composition::transcript`], by the composition engine.

use ff::PrimeField;
use group::{Group, GroupEncoding};

/// Encodes a slice of group elements into their concatenated canonical
/// byte representation.
pub fn serialize_elements<G: Group + GroupEncoding>(elements: &[G]) -> Vec<u8> {
    let mut out = Vec::new();
    for element in elements {
        out.extend_from_slice(element.to_bytes().as_ref());
    }
    out
}

/// Decodes `count` group elements from their concatenated canonical byte
/// representation, or `None` if `data` is the wrong length or any chunk is
/// not a valid encoding.
pub fn deserialize_elements<G: Group + GroupEncoding>(data: &[u8], count: usize) -> Option<Vec<G>> {
    let elem_len = <G::Repr as Default>::default().as_ref().len();
    if data.len() != elem_len * count {
        return None;
    }
    let mut out = Vec::with_capacity(count);
    for chunk in data.chunks_exact(elem_len) {
        let mut repr = G::Repr::default();
        repr.as_mut().copy_from_slice(chunk);
        let element = Option::from(G::from_bytes(&repr))?;
        out.push(element);
    }
    Some(out)
}

/// Encodes a slice of scalars into their concatenated canonical byte
/// representation.
pub fn serialize_scalars<G: Group>(scalars: &[G::Scalar]) -> Vec<u8> {
    let mut out = Vec::new();
    for scalar in scalars {
        out.extend_from_slice(scalar.to_repr().as_ref());
    }
    out
}

/// Decodes `count` scalars from their concatenated canonical byte
/// representation, or `None` if `data` is the wrong length or any chunk is
/// not a valid encoding.
pub fn deserialize_scalars<G: Group>(data: &[u8], count: usize) -> Option<Vec<G::Scalar>> {
    let scalar_len = <<G::Scalar as PrimeField>::Repr as Default>::default()
        .as_ref()
        .len();
    if data.len() != scalar_len * count {
        return None;
    }
    let mut out = Vec::with_capacity(count);
    for chunk in data.chunks_exact(scalar_len) {
        let mut repr = <G::Scalar as PrimeField>::Repr::default();
        repr.as_mut().copy_from_slice(chunk);
        let scalar = Option::from(G::Scalar::from_repr(repr))?;
        out.push(scalar);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bls12_381::{G1Projective as G, Scalar};
    use group::Group as _;
    use rand::rngs::OsRng;

    #[test]
    fn elements_round_trip() {
        let elements: Vec<G> = (0..3).map(|_| G::random(&mut OsRng)).collect();
        let bytes = serialize_elements(&elements);
        let decoded: Vec<G> = deserialize_elements::<G>(&bytes, 3).unwrap();
        assert_eq!(elements, decoded);
    }

    #[test]
    fn scalars_round_trip() {
        let scalars: Vec<Scalar> = (0..4).map(|_| Scalar::random(&mut OsRng)).collect();
        let bytes = serialize_scalars::<G>(&scalars);
        let decoded = deserialize_scalars::<G>(&bytes, 4).unwrap();
        assert_eq!(scalars, decoded);
    }

    #[test]
    fn wrong_length_rejected() {
        let elements: Vec<G> = (0..2).map(|_| G::random(&mut OsRng)).collect();
        let bytes = serialize_elements(&elements);
        assert!(deserialize_elements::<G>(&bytes, 3).is_none());
    }
}
