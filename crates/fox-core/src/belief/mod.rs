//! Hidden-information reasoning for one player's point of view.
//!
//! - `knowledge`: deductions drawn from the play log (cut suits, forced
//!   follows, draws).
//! - `sampler`: concrete worlds consistent with those deductions.

mod knowledge;
mod sampler;

pub use knowledge::{Knowledge, SuitMask};
pub use sampler::Determinizer;
