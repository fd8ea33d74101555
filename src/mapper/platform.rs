//! Platform classification: score a segment's text corpus against per-platform
//! keyword tables.

use crate::deck::Deck;

use super::segment::Segment;

/// Platform a training process runs on. `Log10` is the operations product
/// whose processes get full step extraction; everything else is registered
/// for reference only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Log10,
    Euphoria,
    Ticketing,
    Email,
    Excel,
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Log10 => "log10",
            Platform::Euphoria => "euphoria",
            Platform::Ticketing => "ticketing",
            Platform::Email => "email",
            Platform::Excel => "excel",
            Platform::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log10 indicators: product spellings plus the logistics vocabulary its
/// training decks use.
const LOG10_KEYWORDS: &[&str] = &[
    "log10",
    "log 10",
    "log-10",
    "trips",
    "manifest",
    "bagging",
    "rto",
    "shipment",
    "awb",
    "hub",
    "inbound",
    "outbound",
    "inventory",
    "forward",
    "reverse",
    "pickup",
    "delivery",
    "scan",
    "barcode",
    "courier",
    "loadshare",
];

/// Competing platforms, scanned in declared order; exact ties keep the
/// first-declared platform.
const EXTERNAL_KEYWORDS: &[(Platform, &[&str])] = &[
    (
        Platform::Euphoria,
        &["euphoria", "order consumables", "buy now", "add to cart", "valmo"],
    ),
    (
        Platform::Ticketing,
        &["ticket", "kapture", "support portal", "raise ticket"],
    ),
    (
        Platform::Email,
        &["outlook", "gmail", "email", "pre-alert", "mail"],
    ),
    (
        Platform::Excel,
        &["excel", "spreadsheet", "csv", "worksheet"],
    ),
];

/// Classify a segment by keyword counts over its text corpus.
///
/// Two or more Log10 keywords decide immediately; otherwise an external
/// platform with two or more matches wins; a single Log10 keyword still beats
/// a weak external signal.
pub fn classify(segment: &Segment, deck: &Deck) -> Platform {
    let corpus = segment_text(segment, deck).to_lowercase();

    let log10_score = LOG10_KEYWORDS
        .iter()
        .filter(|&&kw| corpus.contains(kw))
        .count();

    let mut external_score = 0;
    let mut external = Platform::Unknown;
    for (platform, keywords) in EXTERNAL_KEYWORDS {
        let score = keywords.iter().filter(|&&kw| corpus.contains(kw)).count();
        if score > external_score {
            external_score = score;
            external = *platform;
        }
    }

    if log10_score >= 2 {
        Platform::Log10
    } else if external_score >= 2 {
        external
    } else if log10_score >= 1 {
        Platform::Log10
    } else {
        Platform::Unknown
    }
}

/// Segment name plus every shape text on the segment's slides. Out-of-range
/// slide indices are skipped.
fn segment_text(segment: &Segment, deck: &Deck) -> String {
    let mut parts = vec![segment.name.clone()];
    for &idx in &segment.slides {
        let Some(slide) = deck.slide(idx) else {
            continue;
        };
        for shape in &slide.shapes {
            if let Some(text) = shape.text.as_deref() {
                if !text.is_empty() {
                    parts.push(text.to_string());
                }
            }
        }
    }
    parts.join(" ")
}

// ── Tests ──
