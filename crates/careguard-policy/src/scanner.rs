//! Lexical safety screen shared by all domains

use aho_corasick::AhoCorasick;
use careguard_core::{Error, Result, ScanSeverity, Violation};
use serde::Serialize;

use crate::definition::LengthBounds;

/// Case-insensitive substring matcher over a fixed term list.
///
/// Both terms and haystack are lower-cased with full Unicode rules before
/// matching, so accented terms ("estúpido", "inchaço") match regardless of
/// case. When several terms occur, the one listed first wins.
pub struct TermMatcher {
    automaton: Option<AhoCorasick>,
    terms: Vec<String>,
}

impl TermMatcher {
    /// Build a matcher; empty terms are dropped
    pub fn new(terms: &[String]) -> Result<Self> {
        let terms: Vec<String> = terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        let automaton = if terms.is_empty() {
            None
        } else {
            Some(AhoCorasick::new(&terms).map_err(|e| {
                Error::config(format!("Failed to build term matcher: {}", e))
            })?)
        };

        Ok(Self { automaton, terms })
    }

    /// First configured term (in list order) found in `text`
    pub fn first_match(&self, text: &str) -> Option<&str> {
        let automaton = self.automaton.as_ref()?;
        let haystack = text.to_lowercase();

        automaton
            .find_overlapping_iter(&haystack)
            .map(|m| m.pattern().as_usize())
            .min()
            .map(|idx| self.terms[idx].as_str())
    }

    /// Whether any term occurs in `text`
    pub fn is_match(&self, text: &str) -> bool {
        match &self.automaton {
            Some(automaton) => automaton.is_match(&text.to_lowercase()),
            None => false,
        }
    }

    /// Number of distinct terms found in `text`
    pub fn count_distinct(&self, text: &str) -> usize {
        let Some(automaton) = &self.automaton else {
            return 0;
        };
        let haystack = text.to_lowercase();

        let mut seen = vec![false; self.terms.len()];
        for m in automaton.find_overlapping_iter(&haystack) {
            seen[m.pattern().as_usize()] = true;
        }
        seen.into_iter().filter(|hit| *hit).count()
    }

    /// Normalised terms, in list order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Outcome of a safety scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanVerdict {
    pub is_safe: bool,
    pub reason: String,
    pub severity: ScanSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_term: Option<String>,
}

impl ScanVerdict {
    fn safe() -> Self {
        Self {
            is_safe: true,
            reason: "Content is safe".to_string(),
            severity: ScanSeverity::None,
            matched_term: None,
        }
    }

    fn unsafe_with(reason: impl Into<String>, severity: ScanSeverity) -> Self {
        Self {
            is_safe: false,
            reason: reason.into(),
            severity,
            matched_term: None,
        }
    }

    /// The verdict as a rule violation, `None` when safe
    pub fn violation(&self) -> Option<Violation> {
        (!self.is_safe).then(|| Violation::Safety {
            reason: self.reason.clone(),
            severity: self.severity,
        })
    }
}

/// Blocked-term and length screen.
///
/// Pure function of its input and the configured terms; the length bounds
/// come from the calling guard.
pub struct SafetyScanner {
    blocked: TermMatcher,
}

impl SafetyScanner {
    pub fn new(blocked_terms: &[String]) -> Result<Self> {
        Ok(Self {
            blocked: TermMatcher::new(blocked_terms)?,
        })
    }

    /// Scan `text`; rules run in order and the first failure wins
    pub fn scan(&self, text: &str, bounds: LengthBounds) -> ScanVerdict {
        if let Some(term) = self.blocked.first_match(text) {
            let mut verdict = ScanVerdict::unsafe_with(
                format!("Contains inappropriate language: {}", term),
                ScanSeverity::High,
            );
            verdict.matched_term = Some(term.to_string());
            return verdict;
        }

        if text.trim().chars().count() < bounds.min {
            return ScanVerdict::unsafe_with("Content too short", ScanSeverity::Medium);
        }

        if text.chars().count() > bounds.max {
            return ScanVerdict::unsafe_with("Content too long", ScanSeverity::Medium);
        }

        ScanVerdict::safe()
    }

    pub fn blocked_terms(&self) -> &[String] {
        self.blocked.terms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn scanner() -> SafetyScanner {
        SafetyScanner::new(&terms(&["idiota", "burro", "estúpido"])).unwrap()
    }

    const BOUNDS: LengthBounds = LengthBounds { min: 5, max: 40 };

    #[test]
    fn test_blocked_term_is_high_severity() {
        let verdict = scanner().scan("Você é um IDIOTA", BOUNDS);
        assert!(!verdict.is_safe);
        assert_eq!(verdict.severity, ScanSeverity::High);
        assert_eq!(verdict.matched_term.as_deref(), Some("idiota"));
        assert!(verdict.reason.contains("idiota"));
    }

    #[test]
    fn test_accented_term_matches_any_case() {
        let verdict = scanner().scan("Que pergunta ESTÚPIDO", BOUNDS);
        assert_eq!(verdict.matched_term.as_deref(), Some("estúpido"));
    }

    #[test]
    fn test_list_order_decides_reported_term() {
        let verdict = scanner().scan("burro e idiota", BOUNDS);
        assert_eq!(verdict.matched_term.as_deref(), Some("idiota"));
    }

    #[test]
    fn test_blocked_term_beats_length_rules() {
        let verdict = scanner().scan("burro", LengthBounds::new(10, 40));
        assert_eq!(verdict.severity, ScanSeverity::High);
    }

    #[test]
    fn test_too_short_uses_trimmed_length() {
        let verdict = scanner().scan("   oi    ", BOUNDS);
        assert!(!verdict.is_safe);
        assert_eq!(verdict.severity, ScanSeverity::Medium);
        assert!(verdict.reason.contains("too short"));
    }

    #[test]
    fn test_too_long_counts_characters() {
        let ok = "ã".repeat(40);
        assert!(scanner().scan(&ok, BOUNDS).is_safe);

        let verdict = scanner().scan(&"ã".repeat(41), BOUNDS);
        assert!(verdict.reason.contains("too long"));
    }

    #[test]
    fn test_safe_content() {
        let verdict = scanner().scan("Bom dia, tudo bem?", BOUNDS);
        assert!(verdict.is_safe);
        assert!(verdict.violation().is_none());
    }

    #[test]
    fn test_term_matcher_counts_distinct_terms() {
        let matcher = TermMatcher::new(&terms(&["dental", "tooth", "gum"])).unwrap();
        assert_eq!(matcher.count_distinct("Tooth and gum care, tooth brushing"), 2);
        assert_eq!(matcher.count_distinct("nothing relevant"), 0);
    }

    #[test]
    fn test_empty_matcher_never_matches() {
        let matcher = TermMatcher::new(&terms(&["", "  "])).unwrap();
        assert!(!matcher.is_match("anything"));
        assert_eq!(matcher.first_match("anything"), None);
        assert_eq!(matcher.count_distinct("anything"), 0);
    }
}
