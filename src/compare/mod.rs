//! Scoring of modeled curves.
//!
//! - control-vs-clone ratio and score per condition (`group`)
//! - harmonic-mean growth classes (`classify`)
//! - clone-vs-clone Dice and Pearson matrices (`similarity`)

pub mod classify;
pub mod group;
pub mod similarity;

pub use classify::*;
pub use group::*;
pub use similarity::*;
