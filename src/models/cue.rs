/// A single TRACK entry of a cue sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueTrack {
    pub number: u32,
    pub title: Option<String>,
    pub performer: Option<String>,
}

/// The parts of a cue sheet this crate cares about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueSheet {
    /// Disc-level PERFORMER
    pub performer: Option<String>,
    /// Disc-level TITLE
    pub title: Option<String>,
    /// First FILE reference
    pub file: Option<String>,
    pub tracks: Vec<CueTrack>,
}

impl CueSheet {
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}
