pub mod artist;
pub mod config;
pub mod cue;
pub mod driver;
pub mod fetch;
pub mod library;
pub mod promote;
pub mod prompt;
pub mod scanner;
pub mod splitter;
pub mod tools;
pub mod tree;

pub use artist::*;
pub use config::*;
pub use cue::*;
pub use driver::*;
pub use fetch::{DownloadRequest, DownloadedFile, Downloader};
pub use library::*;
pub use promote::*;
pub use prompt::*;
pub use scanner::*;
pub use splitter::*;
pub use tree::*;
