//
// Authors:
// - Nugzari Uzoevi <nougzarm@icloud.com>
// - Michele Orrù <m@orru.net>
// - Lénaïck Gouriou <lg@leanear.io>

#![allow(non_snake_case)]
#![doc(html_logo_url = "https://mmaker.github.io/sigma-compose/")]
//! ## Note
//!
//! This crate provides both a single-relation Sigma protocol toolkit
//! (`linear_relation`, `schnorr_protocol`, `fiat_shamir`, `proof_builder`)
//! and a composition engine (`composition`) that combines any number of
//! such relations with AND/OR, producing one interactive or
//! non-interactive proof for the whole statement.

#![deny(unused_variables)]
#![deny(unused_mut)]

pub mod composition;
pub mod errors;
pub mod fiat_shamir;
pub mod serialization;
pub mod linear_relation;
pub mod proof_builder;
pub mod schnorr_protocol;
pub mod traits;

pub mod codec;
pub mod duplex_sponge;

pub use composition::{Node, Secret};
pub use linear_relation::LinearRelation;
