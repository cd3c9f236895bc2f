pub mod album;
pub mod config;
pub mod cue;
pub mod job;
pub mod pair;

pub use album::*;
pub use config::*;
pub use cue::*;
pub use job::*;
pub use pair::*;
