use std::fmt;

use hashbrown::HashMap;

/// Name of the sentinel tag placed before the first word of every sentence.
pub const SENTENCE_START: &str = "SENTENCE_START";

/// Name of the sentinel tag placed after the last word of every sentence.
pub const SENTENCE_END: &str = "SENTENCE_END";

/// Grammatical category of a word, or one of the two sentence sentinels.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    /// Boundary before the first word.
    SentenceStart,

    /// Boundary after the last word.
    SentenceEnd,

    /// A tag read from the labeled corpus. (e.g. `NN`, `VBZ`, ...)
    Label(String),
}

impl Tag {
    /// Creates a label tag.
    pub fn label<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Self::Label(name.into())
    }

    /// Returns `true` for [`Tag::SentenceStart`] and [`Tag::SentenceEnd`].
    pub const fn is_sentinel(&self) -> bool {
        matches!(self, Self::SentenceStart | Self::SentenceEnd)
    }

    /// Gets the name of the tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use hmm_tagger::Tag;
    ///
    /// assert_eq!("SENTENCE_START", Tag::SentenceStart.as_str());
    /// assert_eq!("NN", Tag::label("NN").as_str());
    /// ```
    pub fn as_str(&self) -> &str {
        match self {
            Self::SentenceStart => SENTENCE_START,
            Self::SentenceEnd => SENTENCE_END,
            Self::Label(name) => name,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw occurrence counts collected during a training pass.
///
/// Unseen keys always count as zero.
#[derive(Debug, Default)]
pub struct CountRegistry {
    tag_counts: HashMap<Tag, u64>,
    word_counts: HashMap<String, u64>,
    // word -> tag -> count
    pair_counts: HashMap<String, HashMap<Tag, u64>>,
    // source -> target -> count
    transition_counts: HashMap<Tag, HashMap<Tag, u64>>,
}

impl CountRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `word` labeled with `tag`.
    pub fn observe(&mut self, word: &str, tag: &Tag) {
        self.observe_tag(tag);
        *self.word_counts.entry_ref(word).or_insert(0) += 1;
        *self
            .pair_counts
            .entry_ref(word)
            .or_default()
            .entry(tag.clone())
            .or_insert(0) += 1;
    }

    /// Records one occurrence of `tag` without a word. Used for the sentence sentinels.
    pub fn observe_tag(&mut self, tag: &Tag) {
        *self.tag_counts.entry(tag.clone()).or_insert(0) += 1;
    }

    /// Records one transition from `source` to `target`.
    pub fn observe_transition(&mut self, source: &Tag, target: &Tag) {
        *self
            .transition_counts
            .entry(source.clone())
            .or_default()
            .entry(target.clone())
            .or_insert(0) += 1;
    }

    pub fn tag_count(&self, tag: &Tag) -> u64 {
        self.tag_counts.get(tag).copied().unwrap_or(0)
    }

    pub fn word_count(&self, word: &str) -> u64 {
        self.word_counts.get(word).copied().unwrap_or(0)
    }

    pub fn pair_count(&self, word: &str, tag: &Tag) -> u64 {
        self.pair_counts
            .get(word)
            .and_then(|tags| tags.get(tag))
            .copied()
            .unwrap_or(0)
    }

    pub fn transition_count(&self, source: &Tag, target: &Tag) -> u64 {
        self.transition_counts
            .get(source)
            .and_then(|targets| targets.get(target))
            .copied()
            .unwrap_or(0)
    }

    /// Gets the (word, tag) counts of a word.
    pub(crate) fn word_tags(&self, word: &str) -> impl Iterator<Item = (&Tag, u64)> {
        self.pair_counts
            .get(word)
            .into_iter()
            .flat_map(|tags| tags.iter().map(|(tag, &count)| (tag, count)))
    }

    /// Gets all observed label tags in sorted order. Sentinels are excluded.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<_> = self
            .tag_counts
            .keys()
            .filter_map(|tag| match tag {
                Tag::Label(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();
        labels.sort_unstable();
        labels
    }

    /// Gets the number of registered tags including the sentinels.
    pub fn n_tags(&self) -> usize {
        self.tag_counts.len()
    }

    /// Gets all observed words in sorted order.
    pub fn words(&self) -> Vec<&str> {
        let mut words: Vec<_> = self.word_counts.keys().map(String::as_str).collect();
        words.sort_unstable();
        words
    }

    pub fn n_words(&self) -> usize {
        self.word_counts.len()
    }

    /// Gets the total number of observed (word, tag) pairs.
    pub fn n_tokens(&self) -> u64 {
        self.word_counts.values().sum()
    }
}
