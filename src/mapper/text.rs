//! Label and process-name normalization.

use std::sync::LazyLock;

use regex::Regex;

static STEP_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s*").unwrap());
static TRAILING_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d+\)\s*$").unwrap());

/// Leading action phrases stripped from tab labels. Checked in order; only
/// the first match is removed, so "Click on" must come before "Click".
const ACTION_VERBS: &[&str] = &[
    "Navigate to",
    "navigate to",
    "Go to",
    "go to",
    "Click on",
    "click on",
    "Then click",
    "then click",
    "Click",
    "click",
    "Select",
    "select",
    "Open",
    "open",
    "Choose",
    "choose",
];

/// Generic suffixes stripped from process names. Most specific first: only
/// one strip happens, and "Training Material" also ends with "Training".
const NAME_SUFFIXES: &[&str] = &[
    "Training Material",
    "Training",
    "Process",
    "SOP",
    "Procedure",
];

/// Normalize a raw tab label: collapse line breaks and whitespace runs, drop
/// a leading "N." step number, one leading action phrase, and a trailing
/// "(N)" reference. Returns `None` when nothing is left.
///
/// `clean_tab_name("3. Click on\nLogin")` → `"Login"`,
/// `clean_tab_name("Go to RTO(1)")` → `"RTO"`.
pub fn clean_tab_name(raw: &str) -> Option<String> {
    let mut tab = collapse_whitespace(raw);
    tab = STEP_PREFIX_RE.replace(&tab, "").into_owned();
    for verb in ACTION_VERBS {
        if let Some(rest) = tab.strip_prefix(verb) {
            tab = rest.trim_start().to_string();
            break;
        }
    }
    tab = TRAILING_REF_RE.replace(&tab, "").into_owned();
    let tab = tab.trim().to_string();
    (!tab.is_empty()).then_some(tab)
}

/// Normalize a segment title into a process name: collapse whitespace and
/// strip exactly one generic trailing suffix.
pub fn clean_process_name(title: &str) -> String {
    let name = collapse_whitespace(title);
    for suffix in NAME_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            return stripped.trim().to_string();
        }
    }
    name
}

fn collapse_whitespace(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_name_strips_step_number_and_verb() {
        assert_eq!(clean_tab_name("3. Click on\nLogin").as_deref(), Some("Login"));
    }

    #[test]
    fn tab_name_strips_trailing_reference() {
        assert_eq!(clean_tab_name("Go to RTO(1)").as_deref(), Some("RTO"));
        assert_eq!(
            clean_tab_name("RTO Manifest(2)").as_deref(),
            Some("RTO Manifest")
        );
    }

    #[test]
    fn tab_name_strips_only_first_verb() {
        // "Click on" wins over the shorter "Click"
        assert_eq!(
            clean_tab_name("Click on Create Manifest").as_deref(),
            Some("Create Manifest")
        );
        assert_eq!(clean_tab_name("Select Hub").as_deref(), Some("Hub"));
    }

    #[test]
    fn tab_name_collapses_whitespace() {
        assert_eq!(
            clean_tab_name("  RTO \r\n  Manifest  ").as_deref(),
            Some("RTO Manifest")
        );
    }

    #[test]
    fn tab_name_empty_results_are_none() {
        assert_eq!(clean_tab_name(""), None);
        assert_eq!(clean_tab_name("   \n "), None);
        assert_eq!(clean_tab_name("Click"), None);
        assert_eq!(clean_tab_name("2. (3)"), None);
    }

    #[test]
    fn tab_name_is_idempotent() {
        for raw in [
            "3. Click on\nLogin",
            "Go to RTO(1)",
            "Navigate to SC-Ops Dashboard",
            "RTO Manifest",
            "Then click Create Manifest(4)",
        ] {
            let once = clean_tab_name(raw).unwrap();
            let twice = clean_tab_name(&once).unwrap();
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn process_name_strips_one_suffix() {
        assert_eq!(
            clean_process_name("Order Consumables\nTraining Material"),
            "Order Consumables"
        );
        assert_eq!(clean_process_name("RTO Bagging Process"), "RTO Bagging");
        assert_eq!(clean_process_name("Forward Pickup SOP"), "Forward Pickup");
    }

    #[test]
    fn process_name_most_specific_suffix_wins() {
        // Must not strip "Training" first and leave "Material" behind
        assert_eq!(clean_process_name("Bagging Training Material"), "Bagging");
        // Only one strip: the remaining "Process" stays
        assert_eq!(
            clean_process_name("Inbound Process Training"),
            "Inbound Process"
        );
    }

    #[test]
    fn process_name_without_suffix_unchanged() {
        assert_eq!(clean_process_name("Create Trips"), "Create Trips");
    }
}
