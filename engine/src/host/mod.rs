//! Hosts that schedule render loop ticks.

mod manual;
mod window;

pub use manual::{ManualHost, ManualRun};
pub use window::WindowHost;
