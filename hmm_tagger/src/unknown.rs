//! Signatures of unknown words.
//!
//! Words that are rare in the training corpus, or absent from it, are represented by a shared
//! bucket keyed by the shape of the word and its longest known English suffix.

use std::fmt;

/// Prefix of every unknown-word bucket in the vocabulary of a model.
pub const UNKNOWN_WORD_PREFIX: &str = "Unknown_Word[";

/// English derivational and inflectional suffixes, all lowercase.
pub const SUFFIXES: &[&str] = &[
    // inflectional
    "s", "es", "ies", "ed", "ied", "ing", "en", "er", "est", "'s",
    // nominal
    "age", "al", "ance", "ence", "ancy", "ency", "ant", "ent", "ation", "ition", "tion", "sion",
    "ion", "ism", "ist", "ity", "ty", "ment", "ness", "ship", "hood", "dom", "ure", "ee", "eer",
    "or", "ar", "ery", "ry", "cy",
    // adjectival
    "able", "ible", "ful", "ic", "ical", "ial", "ian", "ive", "ative", "itive", "less", "ous",
    "eous", "ious", "ish", "like", "ary", "ory", "y",
    // verbal and adverbial
    "ate", "ify", "fy", "ize", "ise", "ly", "ward", "wards", "wise",
];

/// Length of the longest entry of [`SUFFIXES`] in characters.
const MAX_SUFFIX_LEN: usize = 5;

/// Orthographic features of a word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WordShape {
    /// Contains an uppercase letter.
    pub has_upper: bool,

    /// Contains a lowercase letter anywhere but in the first position.
    pub has_lower_after_first: bool,

    /// Contains a decimal digit.
    pub has_digit: bool,

    /// Contains a hyphen.
    pub has_hyphen: bool,
}

impl WordShape {
    /// Scans the characters of `word` once.
    ///
    /// # Examples
    ///
    /// ```
    /// use hmm_tagger::WordShape;
    ///
    /// let shape = WordShape::of("Covid-19");
    /// assert!(shape.has_upper);
    /// assert!(shape.has_lower_after_first);
    /// assert!(shape.has_digit);
    /// assert!(shape.has_hyphen);
    /// ```
    pub fn of(word: &str) -> Self {
        let mut shape = Self::default();
        for (i, c) in word.chars().enumerate() {
            if c.is_uppercase() {
                shape.has_upper = true;
            }
            if i > 0 && c.is_lowercase() {
                shape.has_lower_after_first = true;
            }
            if c.is_ascii_digit() {
                shape.has_digit = true;
            }
            if c == '-' {
                shape.has_hyphen = true;
            }
        }
        shape
    }

    /// Packs the features into the number used in bucket names.
    ///
    /// upper = 1, lower = 2, hyphen = 4, digit = 8
    pub const fn bits(&self) -> u8 {
        (self.has_upper as u8)
            | (self.has_lower_after_first as u8) << 1
            | (self.has_hyphen as u8) << 2
            | (self.has_digit as u8) << 3
    }
}

/// Bucket key of an unknown word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WordSignature {
    shape: WordShape,
    suffix: &'static str,
}

impl WordSignature {
    /// Gets the shape features.
    pub const fn shape(&self) -> WordShape {
        self.shape
    }

    /// Gets the matched suffix, or an empty string.
    pub const fn suffix(&self) -> &'static str {
        self.suffix
    }
}

impl fmt::Display for WordSignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{},{}]",
            UNKNOWN_WORD_PREFIX,
            self.shape.bits(),
            self.suffix
        )
    }
}

/// Finds the longest suffix of `word` listed in [`SUFFIXES`].
///
/// The comparison ignores case. At least one character of `word` must remain before the suffix.
pub fn longest_suffix(word: &str) -> Option<&'static str> {
    let lower: Vec<char> = word.chars().flat_map(char::to_lowercase).collect();
    let max_len = MAX_SUFFIX_LEN.min(lower.len().saturating_sub(1));
    let mut tail = String::with_capacity(MAX_SUFFIX_LEN * 4);
    for len in (1..=max_len).rev() {
        tail.clear();
        tail.extend(&lower[lower.len() - len..]);
        if let Some(&suffix) = SUFFIXES.iter().find(|s| **s == tail) {
            return Some(suffix);
        }
    }
    None
}

/// Computes the unknown-word signature of `word`.
///
/// # Examples
///
/// ```
/// use hmm_tagger::classify;
///
/// assert_eq!("Unknown_Word[1,s]", classify("BARKS").to_string());
/// assert_eq!("Unknown_Word[3,ing]", classify("Running").to_string());
/// assert_eq!("Unknown_Word[8,]", classify("1984").to_string());
/// ```
pub fn classify(word: &str) -> WordSignature {
    WordSignature {
        shape: WordShape::of(word),
        suffix: longest_suffix(word).unwrap_or(""),
    }
}

/// Returns `true` if `word` is the name of an unknown-word bucket.
pub fn is_bucket(word: &str) -> bool {
    word.starts_with(UNKNOWN_WORD_PREFIX) && word.ends_with(']')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_suffix_len() {
        let longest = SUFFIXES.iter().map(|s| s.chars().count()).max().unwrap();
        assert_eq!(MAX_SUFFIX_LEN, longest);
    }

    #[test]
    fn test_suffixes_are_lowercase() {
        for s in SUFFIXES {
            assert_eq!(s.to_lowercase(), *s);
        }
    }

    #[test]
    fn test_shape_empty() {
        assert_eq!(WordShape::default(), WordShape::of(""));
        assert_eq!(0, WordShape::of("").bits());
    }

    #[test]
    fn test_shape_first_lowercase_ignored() {
        let shape = WordShape::of("a");
        assert!(!shape.has_lower_after_first);
        assert_eq!(0, shape.bits());

        let shape = WordShape::of("ab");
        assert!(shape.has_lower_after_first);
        assert_eq!(2, shape.bits());
    }

    #[test]
    fn test_shape_bits() {
        assert_eq!(1, WordShape::of("DOG").bits());
        assert_eq!(3, WordShape::of("Dog").bits());
        assert_eq!(4, WordShape::of("-").bits());
        assert_eq!(8, WordShape::of("42").bits());
        assert_eq!(15, WordShape::of("Covid-19").bits());
        assert_eq!(13, WordShape::of("F-16").bits());
    }

    #[test]
    fn test_shape_non_ascii() {
        let shape = WordShape::of("ÉTÉ");
        assert!(shape.has_upper);
        assert!(!shape.has_lower_after_first);

        let shape = WordShape::of("été");
        assert!(!shape.has_upper);
        assert!(shape.has_lower_after_first);
    }

    #[test]
    fn test_longest_suffix_prefers_longest() {
        assert_eq!(Some("ation"), longest_suffix("nation"));
        assert_eq!(Some("ies"), longest_suffix("studies"));
        assert_eq!(Some("ness"), longest_suffix("happiness"));
        assert_eq!(Some("ing"), longest_suffix("running"));
    }

    #[test]
    fn test_longest_suffix_ignores_case() {
        assert_eq!(Some("ing"), longest_suffix("RUNNING"));
        assert_eq!(Some("ly"), longest_suffix("QuicKLY"));
    }

    #[test]
    fn test_longest_suffix_needs_stem() {
        assert_eq!(None, longest_suffix("s"));
        assert_eq!(None, longest_suffix(""));
        assert_eq!(Some("s"), longest_suffix("is"));
        assert_eq!(Some("ing"), longest_suffix("sing"));
    }

    #[test]
    fn test_longest_suffix_none() {
        assert_eq!(None, longest_suffix("DOG"));
        assert_eq!(None, longest_suffix("1984"));
    }

    #[test]
    fn test_classify() {
        assert_eq!("Unknown_Word[1,]", classify("DOG").to_string());
        assert_eq!("Unknown_Word[1,s]", classify("BARKS").to_string());
        assert_eq!("Unknown_Word[1,s]", classify("CATS").to_string());
        assert_eq!("Unknown_Word[5,ed]", classify("WELL-DRESSED").to_string());
        assert_eq!("Unknown_Word[0,]", classify("a").to_string());
    }

    #[test]
    fn test_signature_parts() {
        let signature = classify("Well-dressed");
        assert_eq!("ed", signature.suffix());
        assert_eq!(WordShape::of("Well-dressed"), signature.shape());
        assert_eq!(7, signature.shape().bits());

        assert_eq!("", classify("1984").suffix());
        assert!(classify("1984").shape().has_digit);
    }

    #[test]
    fn test_classify_deterministic() {
        for word in ["Running", "UNITED", "co-operate", "3rd", ""] {
            assert_eq!(classify(word), classify(word));
        }
    }

    #[test]
    fn test_is_bucket() {
        assert!(is_bucket(&classify("DOG").to_string()));
        assert!(!is_bucket("DOG"));
        assert!(!is_bucket("Unknown_Word"));
    }
}
