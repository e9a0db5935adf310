//! Description Keyword Flags
//!
//! Eight independent whole-word keyword rules over the free-text
//! description. Several may fire on the same text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::Feature;

/// A keyword rule: the column it sets and the alternation it matches
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub feature: Feature,
    pub pattern: &'static str,
}

/// Whole-word alternations, matched case-insensitively.
///
/// `queueing` and `blocked` extend the fitted vocabulary; other inflections
/// stay unmatched to keep the flags close to the training distribution.
pub const KEYWORD_RULES: [KeywordRule; 8] = [
    KeywordRule {
        feature: Feature::DescQueue,
        pattern: r"queue|queueing|backups?|slow|stationary|stop|waiting|delays?",
    },
    KeywordRule {
        feature: Feature::DescHeavy,
        pattern: r"heavy|congestion|gridlock|bumper",
    },
    KeywordRule {
        feature: Feature::DescBlocked,
        pattern: r"block|blocked|close|lane|closed|shut|down",
    },
    KeywordRule {
        feature: Feature::DescRamp,
        pattern: r"ramp|exit|entry|interchange",
    },
    KeywordRule {
        feature: Feature::DescAccident,
        pattern: r"accident|crash|collision|incident",
    },
    KeywordRule {
        feature: Feature::DescHazard,
        pattern: r"hazard|debris|object|spill|obstacle|animal",
    },
    KeywordRule {
        feature: Feature::DescCaution,
        pattern: r"caution|care|alert|warning",
    },
    KeywordRule {
        feature: Feature::DescFire,
        pattern: r"fire|smoke|flame|burn",
    },
];

static COMPILED_RULES: Lazy<Vec<(Feature, Regex)>> = Lazy::new(|| {
    KEYWORD_RULES
        .iter()
        .map(|rule| {
            let regex = Regex::new(&format!(r"(?i)\b(?:{})\b", rule.pattern))
                .unwrap_or_else(|e| panic!("invalid keyword rule for {}: {}", rule.feature, e));
            (rule.feature, regex)
        })
        .collect()
});

/// Evaluate every keyword rule against a description.
///
/// Returns the rule's column and whether it matched, in table order.
pub fn keyword_flags(description: &str) -> [(Feature, bool); 8] {
    let mut flags = [(Feature::DescQueue, false); 8];
    for (slot, (feature, regex)) in flags.iter_mut().zip(COMPILED_RULES.iter()) {
        *slot = (*feature, regex.is_match(description));
    }
    flags
}
