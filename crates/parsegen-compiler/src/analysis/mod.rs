//! Decision analysis over the finished ATN.
//!
//! - `look` - k=1 lookahead sets via epsilon closure
//! - `ll1` - per-decision disjointness classification
//! - `left_recursion_detect` - call-graph cycles the transform could not
//!   remove

mod left_recursion_detect;
mod ll1;
mod look;


pub use left_recursion_detect::check_left_recursion_cycles;
pub use ll1::analyze_decisions;
pub use look::look;
