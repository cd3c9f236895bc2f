pub mod dir_tree;
pub mod download;
pub mod fix_unsplit_cue;
pub mod move_completed;

pub use dir_tree::*;
pub use download::*;
pub use fix_unsplit_cue::*;
pub use move_completed::*;
