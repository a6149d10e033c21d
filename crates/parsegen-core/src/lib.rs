//! Core data structures shared between the parsegen compiler and code generators.
//!
//! Three layers:
//! - `token` - reserved token types and channel constants
//! - `interval` - sorted interval sets over token types and code points
//! - `atn` - the augmented transition network and its serialized form
//!
//! The compiler builds an [`Atn`] from a validated grammar; code generators
//! consume it either in memory or through [`serialize`]/[`deserialize`].

mod interval;
mod token;

pub mod atn;
pub mod serializer;

#[cfg(test)]
mod atn_tests;
#[cfg(test)]
mod interval_tests;

pub use atn::{Atn, AtnState, GrammarKind, StateId, StateKind, Transition};
pub use interval::{Interval, IntervalSet};
pub use serializer::{deserialize, serialize, DeserializeError, SerializeError};
pub use token::*;
