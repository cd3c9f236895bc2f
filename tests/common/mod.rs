//! Common test utilities
#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use nastools::core::{read_cue_sheet, SplitBackend, TagOutcome};
use nastools::models::{AudioFormat, CueAudioPair, CueTrack};
use nastools::NasError;

/// File stem shnsplit produces for a track with the `%n. %t` template
pub fn track_file_stem(track: &CueTrack) -> String {
    format!(
        "{:02}. {}",
        track.number,
        track.title.as_deref().unwrap_or("Untitled")
    )
}

/// Cue sheet text for a single-file album
pub fn cue_text(performer: &str, audio_file: &str, titles: &[&str]) -> String {
    let mut text = format!(
        "PERFORMER \"{}\"\nTITLE \"Test Album\"\nFILE \"{}\" WAVE\n",
        performer, audio_file
    );
    for (idx, title) in titles.iter().enumerate() {
        text.push_str(&format!(
            "  TRACK {:02} AUDIO\n    TITLE \"{}\"\n    INDEX 01 {:02}:00:00\n",
            idx + 1,
            title,
            idx * 3
        ));
    }
    text
}

/// Create `<root>/<dir>/<stem>.cue` + `<stem>.<ext>` and return the album directory
pub fn write_album(root: &Path, dir: &str, stem: &str, ext: &str, titles: &[&str]) -> PathBuf {
    let album_dir = root.join(dir);
    fs::create_dir_all(&album_dir).expect("Failed to create album dir");

    let audio_file = format!("{}.{}", stem, ext);
    fs::write(
        album_dir.join(format!("{}.cue", stem)),
        cue_text("Test Artist", &audio_file, titles),
    )
    .expect("Failed to write cue sheet");
    fs::write(album_dir.join(&audio_file), b"audio image").expect("Failed to write audio image");

    album_dir
}

/// Sorted file and directory names directly inside `dir`
pub fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Writes one file per cue track, named the way shnsplit's `%n. %t` template would
#[derive(Default)]
pub struct CueBackend {
    /// Audio file name whose split should fail
    pub fail_on: Option<String>,
}

impl CueBackend {
    pub fn failing_on(audio_file: &str) -> Self {
        Self {
            fail_on: Some(audio_file.to_string()),
        }
    }
}

impl SplitBackend for CueBackend {
    fn required_tools(&self, _formats: &[AudioFormat]) -> Vec<String> {
        Vec::new()
    }

    fn split(&self, pair: &CueAudioPair, output_dir: &Path) -> Result<(), NasError> {
        if self.fail_on.as_deref() == Some(pair.audio_file()) {
            return Err(NasError::Split {
                file: pair.audio_path(),
                message: "shnsplit: exited with status 1".to_string(),
            });
        }

        let sheet = read_cue_sheet(&pair.cue_path())?;
        for track in &sheet.tracks {
            let name = format!("{}.{}", track_file_stem(track), pair.format().extension());
            fs::write(output_dir.join(name), b"track")?;
        }
        Ok(())
    }

    fn tag(&self, _pair: &CueAudioPair, _tracks: &[PathBuf]) -> Result<TagOutcome, NasError> {
        Ok(TagOutcome::Tagged)
    }
}

/// Replays canned answers and records every question asked
#[derive(Default)]
pub struct ScriptedPrompter {
    pub confirms: VecDeque<bool>,
    pub inputs: VecDeque<Option<String>>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(confirms: &[bool]) -> Self {
        Self {
            confirms: confirms.iter().copied().collect(),
            ..Default::default()
        }
    }

    pub fn with_inputs(mut self, inputs: &[Option<&str>]) -> Self {
        self.inputs = inputs.iter().map(|i| i.map(str::to_string)).collect();
        self
    }
}

impl nastools::core::Prompter for ScriptedPrompter {
    fn confirm(&mut self, question: &str, _default: bool) -> Result<bool, NasError> {
        self.asked.push(question.to_string());
        Ok(self
            .confirms
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected confirmation: {}", question)))
    }

    fn input(&mut self, question: &str) -> Result<Option<String>, NasError> {
        self.asked.push(question.to_string());
        Ok(self
            .inputs
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected input prompt: {}", question)))
    }
}
