//! Accent-aware text ordering for free-text sort keys.
//!
//! Plain `str` ordering puts "Éclair" after "Zebra" because it compares code
//! points. Human-facing lists want accented letters to sort with their base
//! letter and case to matter only as a last resort, so comparison is done in
//! levels:
//!
//! 1. base letters: canonical decomposition, combining marks dropped, case folded
//! 2. accents: case folded, marks kept
//! 3. case: lowercase before uppercase at the first differing position
//! 4. code points, so that distinct strings never compare equal

use std::cmp::Ordering;

use icu_normalizer::DecomposingNormalizerBorrowed;
use icu_properties::CodePointMapData;
use icu_properties::props::{GeneralCategory, GeneralCategoryGroup};
use unicase::UniCase;

/// Precomputed sort key for one string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    base: String,
    accents: String,
    case: Vec<bool>,
    raw: String,
}

impl CollationKey {
    pub fn new(text: &str) -> Self {
        let decomposed = DecomposingNormalizerBorrowed::new_nfd().normalize(text);
        let stripped: String = decomposed
            .chars()
            .filter(|c| !is_combining_mark(*c))
            .collect();

        Self {
            base: UniCase::new(stripped.as_str()).to_folded_case(),
            accents: UniCase::new(&*decomposed).to_folded_case(),
            case: stripped.chars().map(char::is_uppercase).collect(),
            raw: text.to_string(),
        }
    }
}

/// Compare two strings the way a reader expects a sorted list to look.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    CollationKey::new(a).cmp(&CollationKey::new(b))
}

/// Any general category M* (nonspacing, spacing and enclosing marks).
fn is_combining_mark(c: char) -> bool {
    let category = CodePointMapData::<GeneralCategory>::new().get(c);
    GeneralCategoryGroup::Mark.contains(category)
}
