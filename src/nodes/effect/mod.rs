//! Audio effect nodes (processors with audio inputs and outputs)

mod gain;
mod junction;

pub use gain::{Gain, GainMessage};
pub use junction::Junction;
