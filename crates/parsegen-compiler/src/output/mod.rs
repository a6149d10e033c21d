//! Emission of the hand-off artifacts: the `.tokens` vocab file and the
//! interpreter dump.

mod interp;
mod vocab;


pub use interp::write_interp_file;
pub use vocab::write_vocab_file;
