//! Annotated JavaScript AST model.
//!
//! Trees live in an [`arena::Arena`] and are built bottom-up through the
//! typed constructors in [`builder`]. Each node carries an identity from an
//! [`ids::IdGenerator`] and change annotations written by an external
//! differencing pass. Subtrees can be deep-copied ([`clone`]), walked in
//! pre-order ([`visit`]) and exported to Esprima-shaped JSON
//! ([`serialize`]).
#![warn(clippy::pedantic)]
pub mod analysis;
pub mod arena;
pub mod builder;
pub mod change;
pub mod clone;
pub mod config;
pub mod errors;
pub mod ids;
pub mod nodes;
pub(crate) mod nodes_impl;
pub mod operators;
pub mod serialize;
pub mod token;
pub mod visit;
