//! Deck segmentation: partition the slide sequence into contiguous process
//! segments using layout names and title text.

use tracing::debug;

use crate::deck::{Deck, Slide};

/// Layout-name fragments that mark a divider (process-opening) slide.
const DIVIDER_LAYOUTS: &[&str] = &["title", "divider", "section"];

/// Title fragments that mark a closing slide; these never open a segment
/// even on a divider layout.
const CLOSING_TITLES: &[&str] = &["thank", "questions", "q&a", "end", "conclusion"];

/// One contiguous run of slides belonging to a single business process.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Raw divider title, later cleaned into the process name.
    pub name: String,
    /// Index of the divider slide that opened this segment.
    pub start_slide: usize,
    /// Indices of the content slides, in deck order. Never contains the
    /// start slide of any segment.
    pub slides: Vec<usize>,
}

/// Split a deck into process segments. A deck without divider slides yields
/// no segments; leading slides before the first divider belong to none.
pub fn segment_deck(deck: &Deck) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current: Option<Segment> = None;

    for (idx, slide) in deck.slides.iter().enumerate() {
        let Some(title) = slide.title_text() else {
            if let Some(seg) = current.as_mut() {
                seg.slides.push(idx);
            }
            continue;
        };

        if is_divider(slide) {
            if let Some(seg) = current.take() {
                segments.push(seg);
            }
            debug!("process boundary at slide {}: {:?}", idx, title);
            current = Some(Segment {
                name: title.to_string(),
                start_slide: idx,
                slides: Vec::new(),
            });
        } else if let Some(seg) = current.as_mut() {
            // Content slides keep their own titles without opening a segment
            seg.slides.push(idx);
        }
    }

    if let Some(seg) = current.take() {
        segments.push(seg);
    }

    segments
}

fn is_divider(slide: &Slide) -> bool {
    let layout = slide.layout.to_lowercase();
    if !DIVIDER_LAYOUTS.iter().any(|k| layout.contains(k)) {
        return false;
    }
    if let Some(title) = slide.title_text() {
        let title = title.to_lowercase();
        if CLOSING_TITLES.iter().any(|k| title.contains(k)) {
            return false;
        }
    }
    true
}

// ── Tests ──
