//! Data plane components
//!
//! Host implementations of the two collaborators the classifier reads and
//! writes (the replacement table and the event channel) and a driver that
//! runs frames through it.

mod event_channel;
mod rewriter;
mod smac_table;

pub use event_channel::{channel, ChannelSink};
pub use rewriter::{Rewriter, TableHandle};
pub use smac_table::SharedSmacTable;
