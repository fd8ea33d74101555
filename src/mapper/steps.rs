//! Step-sequence extraction for Log10 segments.
//!
//! Two detectors run over every slide of a segment:
//! instruction text ("Go to RTO(1). Click on RTO Manifest(2)...") parsed into
//! an ordered tab sequence, and red-outlined callout boxes paired with their
//! nearest text label. The instruction sequence is authoritative whenever it
//! is non-empty; the red-outline list is only a fallback, never merged.

use std::sync::LazyLock;

use regex::Regex;

use crate::deck::{Deck, Shape, Slide};

use super::segment::Segment;
use super::text::clean_tab_name;

/// Matches "RTO Manifest(2)"-style tab references inside instruction text.
static TAB_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z][A-Za-z\s]+)\(\d+\)").unwrap());

const INSTRUCTION_MARKERS: &[&str] = &["go to", "click on", "click", "then", "select"];

/// Shapes shorter than this are labels, not instruction paragraphs.
const MIN_INSTRUCTION_CHARS: usize = 50;

/// Neighbor text longer than this is narration, not a tab label.
const MAX_NEIGHBOR_CHARS: usize = 100;

/// Manhattan-distance ceiling between a callout and its label, in deck units.
const MAX_NEIGHBOR_DISTANCE: i64 = 2_000_000;

/// Red-outline threshold: red channel at or above this.
const RED_MIN: u8 = 150;

/// Red-outline threshold: green and blue channels strictly below this.
const OTHER_CHANNEL_CEIL: u8 = 100;

/// The start tab and ordered, deduplicated step labels for one segment.
#[derive(Debug, Clone, Default)]
pub struct StepTrace {
    pub start_tab: Option<String>,
    pub steps: Vec<String>,
}

/// Extract the tab sequence for a segment. Returns an empty trace when
/// neither detector finds anything; the caller applies the default.
pub fn extract_steps(segment: &Segment, deck: &Deck) -> StepTrace {
    let mut instructed: Vec<String> = Vec::new();
    let mut outlined: Vec<String> = Vec::new();

    for &idx in &segment.slides {
        let Some(slide) = deck.slide(idx) else {
            continue;
        };

        if let Some(text) = instruction_text(slide) {
            for label in parse_instruction_sequence(text) {
                push_unique(&mut instructed, label);
            }
        }

        for (shape_idx, shape) in slide.shapes.iter().enumerate() {
            if !is_red_outlined(shape) {
                continue;
            }
            if let Some(text) = nearest_text(slide, shape_idx) {
                if let Some(label) = clean_tab_name(text) {
                    push_unique(&mut outlined, label);
                }
            }
        }
    }

    if !instructed.is_empty() {
        StepTrace {
            start_tab: Some(instructed[0].clone()),
            steps: instructed,
        }
    } else if !outlined.is_empty() {
        StepTrace {
            start_tab: Some(outlined[0].clone()),
            steps: outlined,
        }
    } else {
        StepTrace::default()
    }
}

/// First shape on the slide that reads like an instruction paragraph:
/// long enough and carrying at least one instruction marker. Remaining
/// shapes are not scanned.
fn instruction_text(slide: &Slide) -> Option<&str> {
    for shape in &slide.shapes {
        let Some(text) = shape_text(shape) else {
            continue;
        };
        if text.chars().count() <= MIN_INSTRUCTION_CHARS {
            continue;
        }
        let lower = text.to_lowercase();
        if INSTRUCTION_MARKERS.iter().any(|m| lower.contains(m)) {
            return Some(text);
        }
    }
    None
}

/// Parse "Go to RTO(1). Click on RTO Manifest(2)..." into cleaned labels,
/// in order of appearance.
fn parse_instruction_sequence(text: &str) -> Vec<String> {
    TAB_REF_RE
        .captures_iter(text)
        .filter_map(|caps| clean_tab_name(caps.get(1).map_or("", |m| m.as_str())))
        .collect()
}

fn is_red_outlined(shape: &Shape) -> bool {
    matches!(
        shape.outline_rgb,
        Some([r, g, b]) if r >= RED_MIN && g < OTHER_CHANNEL_CEIL && b < OTHER_CHANNEL_CEIL
    )
}

/// Nearest other shape's text by Manhattan distance between top-left corners.
/// Long texts are excluded, as are shapes beyond the distance ceiling.
fn nearest_text(slide: &Slide, ref_idx: usize) -> Option<&str> {
    let reference = &slide.shapes[ref_idx];
    let mut best: Option<&str> = None;
    let mut best_dist = i64::MAX;

    for (idx, shape) in slide.shapes.iter().enumerate() {
        if idx == ref_idx {
            continue;
        }
        let Some(text) = shape_text(shape) else {
            continue;
        };
        if text.chars().count() > MAX_NEIGHBOR_CHARS {
            continue;
        }
        let dist = (shape.left - reference.left).abs() + (shape.top - reference.top).abs();
        if dist < best_dist && dist < MAX_NEIGHBOR_DISTANCE {
            best_dist = dist;
            best = Some(text);
        }
    }

    best
}

fn shape_text(shape: &Shape) -> Option<&str> {
    let text = shape.text.as_deref()?.trim();
    (!text.is_empty()).then_some(text)
}

fn push_unique(list: &mut Vec<String>, label: String) {
    if !list.contains(&label) {
        list.push(label);
    }
}

// ── Tests ──
