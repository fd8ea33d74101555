//! Deck document model.
//!
//! Decks arrive as JSON dumps produced by the external slide-extraction step:
//! ordered slides, each with a layout name, an optional title, and its shapes
//! (text, top-left position, outline color, picture flag).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeckError>;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("failed to read deck: {0}")]
    Io(#[from] std::io::Error),

    #[error("deck dump is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not a deck dump: {0}")]
    NotADeck(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default)]
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slide {
    /// Layout name from the deck template, e.g. "Title Slide", "Custom Layout".
    #[serde(default)]
    pub layout: String,
    /// Text of the title placeholder, absent when the slide has none.
    pub title: Option<String>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Shape {
    pub text: Option<String>,
    /// Left offset of the bounding box, in the deck's linear units.
    #[serde(default)]
    pub left: i64,
    /// Top offset of the bounding box.
    #[serde(default)]
    pub top: i64,
    /// Outline color as [r, g, b], absent when the shape has no outline.
    pub outline_rgb: Option<[u8; 3]>,
    #[serde(default)]
    pub picture: bool,
}

impl Deck {
    /// Load a deck dump from disk, rejecting markup payloads (an HTML error
    /// page saved in place of a deck).
    pub fn open(path: &Path) -> Result<Deck> {
        let bytes = std::fs::read(path)?;
        if looks_like_markup(&bytes) {
            return Err(DeckError::NotADeck(format!(
                "{} contains an HTML page",
                path.display()
            )));
        }
        let deck = serde_json::from_slice(&bytes)?;
        Ok(deck)
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slide(&self, idx: usize) -> Option<&Slide> {
        self.slides.get(idx)
    }
}

impl Slide {
    /// Trimmed title text; `Some("")` when the title placeholder is empty,
    /// `None` when the slide has no title at all.
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim)
    }

    pub fn has_picture(&self) -> bool {
        self.shapes.iter().any(|s| s.picture)
    }
}

/// Check the leading bytes of a payload for an HTML signature.
pub fn looks_like_markup(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(100)];
    contains_subslice(head, b"<!DOCTYPE") || contains_subslice(head, b"<html")
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

// ── Tests ──
