//! Lenient cue sheet reader.
//!
//! Only the commands needed for listing, output checks and artist inference
//! are understood (FILE, PERFORMER, TITLE, TRACK). Everything else, including
//! REM comments and INDEX offsets, is ignored. Offsets are left to the
//! external breakpoint tool.

use std::fs;
use std::path::Path;

use crate::models::{CueSheet, CueTrack};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read and parse a cue sheet from disk.
///
/// Cue sheets in the wild are frequently not UTF-8; invalid sequences are
/// replaced rather than rejected.
pub fn read_cue_sheet(path: &Path) -> std::io::Result<CueSheet> {
    let bytes = fs::read(path)?;
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    Ok(parse_cue_sheet(&String::from_utf8_lossy(bytes)))
}

/// Parse cue sheet text
pub fn parse_cue_sheet(text: &str) -> CueSheet {
    let mut sheet = CueSheet::default();

    for line in text.lines() {
        let line = line.trim();
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim()),
            None => (line, ""),
        };

        match keyword.to_ascii_uppercase().as_str() {
            "FILE" => {
                if sheet.file.is_none() {
                    sheet.file = Some(unquote_file_name(rest));
                }
            }
            "TRACK" => {
                let number = rest
                    .split_whitespace()
                    .next()
                    .and_then(|n| n.parse::<u32>().ok());
                if let Some(number) = number {
                    sheet.tracks.push(CueTrack {
                        number,
                        title: None,
                        performer: None,
                    });
                }
            }
            "TITLE" => {
                let value = non_empty(unquote(rest));
                match sheet.tracks.last_mut() {
                    Some(track) => track.title = value,
                    None => sheet.title = value,
                }
            }
            "PERFORMER" => {
                let value = non_empty(unquote(rest));
                match sheet.tracks.last_mut() {
                    Some(track) => track.performer = value,
                    None => sheet.performer = value,
                }
            }
            _ => {}
        }
    }

    sheet
}

/// Strip one level of surrounding double quotes
fn unquote(value: &str) -> String {
    let value = value.trim();
    if let Some(inner) = value.strip_prefix('"') {
        match inner.find('"') {
            Some(end) => inner[..end].to_string(),
            None => inner.to_string(),
        }
    } else {
        value.to_string()
    }
}

/// FILE lines carry a trailing type (`FILE "x.flac" WAVE`)
fn unquote_file_name(value: &str) -> String {
    if value.starts_with('"') {
        return unquote(value);
    }
    match value.rsplit_once(char::is_whitespace) {
        Some((name, _file_type)) => name.trim().to_string(),
        None => value.to_string(),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
