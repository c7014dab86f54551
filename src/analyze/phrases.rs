//! Phrase containment primitives shared by the lexicon-driven components.
//!
//! Matching is a plain substring test on normalized text (lowercase +
//! condensed whitespace). There is no word-boundary requirement here: a
//! keyword such as `"now"` also fires inside `"know"`. Product aliases use
//! whole-word regexes instead (see `products.rs`).

/// An ordered list of normalized phrases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhraseSet {
    phrases: Vec<String>,
}

impl PhraseSet {
    /// Normalizes every phrase and drops blanks. Declaration order is kept.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| normalize(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }

    /// True if ANY phrase appears in `normalized_text`.
    pub fn any_in(&self, normalized_text: &str) -> bool {
        self.phrases
            .iter()
            .any(|p| normalized_text.contains(p.as_str()))
    }

    /// First phrase (declaration order) that appears in `normalized_text`.
    pub fn first_in(&self, normalized_text: &str) -> Option<&str> {
        self.phrases
            .iter()
            .map(String::as_str)
            .find(|p| normalized_text.contains(p))
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.phrases.iter().map(String::as_str)
    }
}

/// Lowercase and condense runs of whitespace into a single space.
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.extend(ch.to_lowercase());
            last_space = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_and_whitespace_insensitive() {
        let set = PhraseSet::new(["How Much", "price"]);
        let text = normalize("  HOW   much\tfor this?");
        assert!(set.any_in(&text));
        assert_eq!(set.first_in(&text), Some("how much"));
    }

    #[test]
    fn blank_phrases_are_dropped() {
        let set = PhraseSet::new(["", "   ", "ok"]);
        assert_eq!(set.len(), 1);
        assert!(!set.any_in("nothing here"));
    }

    #[test]
    fn substring_semantics_have_no_word_boundary() {
        let set = PhraseSet::new(["now"]);
        assert!(set.any_in(&normalize("I know")));
    }

    #[test]
    fn sinhala_passes_through_untouched() {
        let set = PhraseSet::new(["තියෙනවද"]);
        assert!(set.any_in(&normalize("iPhone 16 තියෙනවද? Price?")));
    }
}
