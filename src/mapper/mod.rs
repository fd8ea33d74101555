//! Per-deck pipeline: segment → classify → extract → resolve → records.

pub mod platform;
pub mod segment;
pub mod steps;
pub mod tabmap;
pub mod text;

use serde::Serialize;
use tracing::{info, warn};

use crate::deck::Deck;

use platform::Platform;
use tabmap::TabMap;

/// Start tab applied when extraction comes up empty or a document fails.
pub const DEFAULT_START_TAB: &str = "Dashboard";

/// A Log10 process with its extracted navigation trace.
#[derive(Debug, Clone, Serialize)]
pub struct Log10Process {
    pub process_name: String,
    pub platform: String,
    pub start_tab: String,
    pub url_module: Option<String>,
    pub steps: Vec<String>,
    pub video_link: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub needs_review: bool,
}

/// A process demonstrated on another platform; registered for reference,
/// no step extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExternalProcess {
    pub process_name: String,
    pub platform: String,
    pub video_link: String,
    pub use_case: String,
}

#[derive(Debug, Default)]
pub struct ProcessMap {
    pub log10: Vec<Log10Process>,
    pub external: Vec<ExternalProcess>,
}

impl ProcessMap {
    pub fn is_empty(&self) -> bool {
        self.log10.is_empty() && self.external.is_empty()
    }

    pub fn extend(&mut self, other: ProcessMap) {
        self.log10.extend(other.log10);
        self.external.extend(other.external);
    }
}

/// Build the process map for one deck. Zero segments is a valid outcome
/// (no processes found), never an error.
pub fn map_deck(deck: &Deck, video_link: &str, tab_map: &TabMap) -> ProcessMap {
    let segments = segment::segment_deck(deck);
    if segments.is_empty() {
        warn!("no processes detected in deck");
        return ProcessMap::default();
    }

    let mut map = ProcessMap::default();
    for seg in &segments {
        let detected = platform::classify(seg, deck);
        let name = text::clean_process_name(&seg.name);
        info!("{} | platform: {}", name, detected);

        match detected {
            Platform::Log10 => {
                let trace = steps::extract_steps(seg, deck);
                let record = match trace.start_tab {
                    Some(start_tab) => {
                        let url_module = tab_map.resolve(&start_tab).map(str::to_string);
                        let needs_review = url_module.is_none();
                        Log10Process {
                            process_name: name,
                            platform: Platform::Log10.as_str().to_string(),
                            start_tab,
                            url_module,
                            steps: trace.steps,
                            video_link: video_link.to_string(),
                            needs_review,
                        }
                    }
                    None => {
                        warn!("could not extract a start tab, flagging for review");
                        fallback_process(name, video_link, tab_map)
                    }
                };
                map.log10.push(record);
            }
            other => map.external.push(ExternalProcess {
                process_name: name,
                platform: external_label(other),
                video_link: video_link.to_string(),
                use_case: "training_only".to_string(),
            }),
        }
    }

    map
}

/// Default Log10 record used when extraction is inconclusive or a whole
/// document fails: lands on the dashboard and is flagged for review.
pub fn fallback_process(process_name: String, video_link: &str, tab_map: &TabMap) -> Log10Process {
    Log10Process {
        process_name,
        platform: Platform::Log10.as_str().to_string(),
        start_tab: DEFAULT_START_TAB.to_string(),
        url_module: tab_map.resolve(DEFAULT_START_TAB).map(str::to_string),
        steps: Vec::new(),
        video_link: video_link.to_string(),
        needs_review: true,
    }
}

/// Unclassified segments are reported as generic "external" processes.
fn external_label(detected: Platform) -> String {
    match detected {
        Platform::Unknown => "external".to_string(),
        other => other.as_str().to_string(),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn fixture(name: &str) -> Deck {
        Deck::open(Path::new(&format!("tests/fixtures/{name}.json"))).unwrap()
    }

    fn fixture_tab_map() -> TabMap {
        TabMap::load(Path::new("data/log10_tab_url_map.csv")).unwrap()
    }

    #[test]
    fn rto_bagging_deck_maps_to_log10_process() {
        let deck = fixture("rto_bagging_deck");
        let map = map_deck(&deck, "https://videos.example/rto-bagging", &fixture_tab_map());

        assert_eq!(map.log10.len(), 1);
        assert!(map.external.is_empty());

        let proc = &map.log10[0];
        assert_eq!(proc.process_name, "RTO Bagging");
        assert_eq!(proc.start_tab, "RTO");
        assert_eq!(proc.url_module.as_deref(), Some("rto"));
        assert_eq!(proc.steps, vec!["RTO", "RTO Manifest", "Create Manifest"]);
        assert!(!proc.needs_review);
    }

    #[test]
    fn euphoria_deck_registers_external_process() {
        let deck = fixture("order_consumables_deck");
        let map = map_deck(&deck, "https://videos.example/consumables", &fixture_tab_map());

        assert!(map.log10.is_empty());
        assert_eq!(map.external.len(), 1);

        let proc = &map.external[0];
        assert_eq!(proc.process_name, "Order Consumables");
        assert_eq!(proc.platform, "euphoria");
        assert_eq!(proc.use_case, "training_only");
    }

    #[test]
    fn deck_without_dividers_maps_to_nothing() {
        let deck: Deck = serde_json::from_str(
            r#"{"slides":[{"layout":"Custom Layout","title":"Step 1","shapes":[]}]}"#,
        )
        .unwrap();
        let map = map_deck(&deck, "", &TabMap::default());
        assert!(map.is_empty());
    }

    #[test]
    fn inconclusive_extraction_defaults_to_dashboard() {
        // Log10 by keywords, but no instructions and no red outlines
        let deck: Deck = serde_json::from_str(
            r#"{"slides":[
                {"layout":"Title Slide","title":"Hub Handover","shapes":[]},
                {"layout":"Custom Layout","shapes":[{"text":"Scan the AWB at the hub"}]}
            ]}"#,
        )
        .unwrap();
        let map = map_deck(&deck, "", &fixture_tab_map());

        assert_eq!(map.log10.len(), 1);
        let proc = &map.log10[0];
        assert_eq!(proc.start_tab, DEFAULT_START_TAB);
        assert_eq!(proc.url_module.as_deref(), Some("dashboard"));
        assert!(proc.steps.is_empty());
        assert!(proc.needs_review);
    }

    #[test]
    fn unresolved_module_flags_review() {
        let deck = fixture("rto_bagging_deck");
        // Empty map: the start tab extracts fine but cannot resolve
        let map = map_deck(&deck, "", &TabMap::default());
        let proc = &map.log10[0];
        assert_eq!(proc.start_tab, "RTO");
        assert!(proc.url_module.is_none());
        assert!(proc.needs_review);
    }

    #[test]
    fn needs_review_serialized_only_when_set() {
        let clean = Log10Process {
            process_name: "X".into(),
            platform: "log10".into(),
            start_tab: "RTO".into(),
            url_module: Some("rto".into()),
            steps: vec![],
            video_link: String::new(),
            needs_review: false,
        };
        let json = serde_json::to_string(&clean).unwrap();
        assert!(!json.contains("needs_review"));

        let flagged = Log10Process {
            needs_review: true,
            ..clean
        };
        let json = serde_json::to_string(&flagged).unwrap();
        assert!(json.contains("\"needs_review\":true"));
    }
}
