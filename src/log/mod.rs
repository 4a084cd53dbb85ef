//! Log parsing for the scheduler's `[PROFILE]` timing lines.

pub mod parse;
pub mod sample;

pub use parse::open_log;
pub use sample::Sample;
