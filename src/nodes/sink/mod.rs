#[cfg(feature = "cpal_sink")]
mod cpal_sink;
#[cfg(feature = "cpal_sink")]
pub use cpal_sink::CpalSink;

mod rtrb_sink;
mod scope;

pub use rtrb_sink::RtrbSink;
pub use scope::{Scope, ScopeMessage, ScopeReader};
