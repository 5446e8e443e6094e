//! Date windows, lazy rule expansion and facility timezone handling.

mod expander;
pub mod timezone;
pub mod window;

pub use expander::{Expansion, expand};
pub use window::DateWindow;
