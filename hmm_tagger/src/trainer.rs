use std::collections::BTreeMap;

use hashbrown::HashMap;

use crate::corpus::TaggedSentence;
use crate::errors::{HmmTaggerError, Result};
use crate::model::Model;
use crate::registry::{CountRegistry, Tag, SENTENCE_END, SENTENCE_START};
use crate::unknown::classify;

/// Default additive smoothing constant.
pub const DEFAULT_SMOOTHING: f64 = 1.0;

/// Default rarity threshold. Words seen at most this many times become unknown-word buckets.
pub const DEFAULT_RARE_THRESHOLD: u64 = 1;

/// Trainer.
///
/// Counts are accumulated sentence by sentence, then [`Trainer::train()`] turns them into a
/// [`Model`]. The trainer is consumed by training, so a finished model can never be updated.
///
/// # Examples
///
/// ```
/// use hmm_tagger::{Tagger, Trainer};
///
/// let mut trainer = Trainer::new(1.0, 0, true).unwrap();
/// for (word, tag) in [("the", "DT"), ("dog", "NN"), ("barks", "VBZ")] {
///     trainer.add_token(word, tag).unwrap();
/// }
/// trainer.end_sentence();
///
/// let model = trainer.train().unwrap();
/// let tagger = Tagger::new(model);
/// assert_eq!(vec!["DT", "NN", "VBZ"], tagger.tag(&["The", "dog", "barks"]));
/// ```
pub struct Trainer {
    registry: CountRegistry,
    // normalized word -> first surface form
    surfaces: HashMap<String, String>,
    // `None` between sentences.
    prev: Option<Tag>,
    smoothing: f64,
    rare_threshold: u64,
    case_folding: bool,
}

impl Trainer {
    /// Creates a new trainer.
    ///
    /// # Arguments
    ///
    /// * `smoothing` - The additive smoothing constant (α).
    /// * `rare_threshold` - Words seen at most this many times are merged into unknown-word
    ///   buckets. `0` disables merging.
    /// * `case_folding` - Upper-cases words before counting them.
    ///
    /// # Errors
    ///
    /// [`HmmTaggerError::InvalidArgument`] will be returned if `smoothing` is not a positive
    /// finite number.
    pub fn new(smoothing: f64, rare_threshold: u64, case_folding: bool) -> Result<Self> {
        if !(smoothing.is_finite() && smoothing > 0.0) {
            return Err(HmmTaggerError::invalid_argument(
                "smoothing",
                format!("must be a positive finite number, got {smoothing}"),
            ));
        }
        Ok(Self {
            registry: CountRegistry::new(),
            surfaces: HashMap::new(),
            prev: None,
            smoothing,
            rare_threshold,
            case_folding,
        })
    }

    /// Adds the next token of the current sentence.
    ///
    /// The first token after [`Trainer::end_sentence()`] starts a new sentence.
    ///
    /// # Errors
    ///
    /// [`HmmTaggerError::InvalidArgument`] will be returned if `word` or `tag` is empty, or if
    /// `tag` is the name of a sentinel.
    pub fn add_token(&mut self, word: &str, tag: &str) -> Result<()> {
        Self::check_token(word, tag)?;
        self.count_token(word, tag);
        Ok(())
    }

    fn check_token(word: &str, tag: &str) -> Result<()> {
        if word.is_empty() {
            return Err(HmmTaggerError::invalid_argument("word", "must not be empty"));
        }
        if tag.is_empty() {
            return Err(HmmTaggerError::invalid_argument("tag", "must not be empty"));
        }
        if tag == SENTENCE_START || tag == SENTENCE_END {
            return Err(HmmTaggerError::invalid_argument(
                "tag",
                format!("`{tag}` is reserved"),
            ));
        }
        Ok(())
    }

    fn count_token(&mut self, word: &str, tag: &str) {
        let tag = Tag::label(tag);
        let key = if self.case_folding {
            word.to_uppercase()
        } else {
            word.to_string()
        };

        let prev = match self.prev.take() {
            Some(prev) => prev,
            None => {
                self.registry.observe_tag(&Tag::SentenceStart);
                Tag::SentenceStart
            }
        };
        self.registry.observe_transition(&prev, &tag);
        self.registry.observe(&key, &tag);
        self.surfaces
            .entry(key)
            .or_insert_with(|| word.to_string());
        self.prev = Some(tag);
    }

    /// Closes the current sentence. Does nothing between sentences.
    pub fn end_sentence(&mut self) {
        if let Some(prev) = self.prev.take() {
            self.registry.observe_transition(&prev, &Tag::SentenceEnd);
            self.registry.observe_tag(&Tag::SentenceEnd);
        }
    }

    /// Adds a whole sentence.
    ///
    /// A sentence that is still open is closed first. Empty sentences are ignored.
    ///
    /// # Errors
    ///
    /// See [`Trainer::add_token()`]. Every token is checked before any is counted, so a
    /// rejected sentence leaves the trainer unchanged.
    pub fn push_sentence(&mut self, sentence: &TaggedSentence) -> Result<()> {
        for token in sentence.iter_tokens() {
            Self::check_token(token.word(), token.tag())?;
        }
        self.end_sentence();
        for token in sentence.iter_tokens() {
            self.count_token(token.word(), token.tag());
        }
        self.end_sentence();
        Ok(())
    }

    /// Gets the raw counts collected so far.
    pub fn registry(&self) -> &CountRegistry {
        &self.registry
    }

    /// Gets the number of started sentences.
    pub fn n_sentences(&self) -> u64 {
        self.registry.tag_count(&Tag::SentenceStart)
    }

    /// Gets the number of added tokens.
    pub fn n_tokens(&self) -> u64 {
        self.registry.n_tokens()
    }

    /// Replaces every word seen at most `rare_threshold` times with its unknown-word bucket.
    ///
    /// Returns the (word, tag) counts of the resulting vocabulary, one count per label.
    fn collapse_rare_words(
        &self,
        label_ids: &HashMap<&str, usize>,
    ) -> BTreeMap<String, Vec<u64>> {
        let mut vocabulary: BTreeMap<String, Vec<u64>> = BTreeMap::new();
        let mut n_rare = 0;
        for word in self.registry.words() {
            let key = if self.registry.word_count(word) <= self.rare_threshold {
                n_rare += 1;
                let surface = self.surfaces.get(word).map_or(word, String::as_str);
                classify(surface).to_string()
            } else {
                word.to_string()
            };
            let counts = vocabulary
                .entry(key)
                .or_insert_with(|| vec![0; label_ids.len()]);
            for (tag, count) in self.registry.word_tags(word) {
                if let Some(&id) = label_ids.get(tag.as_str()) {
                    counts[id] += count;
                }
            }
        }
        if n_rare != 0 && n_rare == self.registry.n_words() {
            log::warn!("every word is rare; only unknown-word buckets remain in the vocabulary");
        }
        log::debug!(
            "{} of {} words merged into unknown-word buckets",
            n_rare,
            self.registry.n_words()
        );
        vocabulary
    }

    /// Estimates the model.
    ///
    /// A sentence that is still open is closed first.
    ///
    /// # Returns
    ///
    /// A trained model.
    ///
    /// # Errors
    ///
    /// [`HmmTaggerError::InvalidArgument`] will be returned if no token has been added.
    pub fn train(mut self) -> Result<Model> {
        self.end_sentence();
        if self.registry.n_tokens() == 0 {
            return Err(HmmTaggerError::invalid_argument(
                "dataset",
                "no tagged token has been added",
            ));
        }

        let tags: Vec<String> = self
            .registry
            .labels()
            .into_iter()
            .map(str::to_string)
            .collect();
        let label_ids: HashMap<&str, usize> = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| (tag.as_str(), i))
            .collect();
        let tag_counts: Vec<u64> = tags
            .iter()
            .map(|tag| self.registry.tag_count(&Tag::label(tag.as_str())))
            .collect();

        let vocabulary = self.collapse_rare_words(&label_ids);
        drop(label_ids);

        let alpha = self.smoothing;
        let n_registry_tags = self.registry.n_tags() as f64;

        let sources = std::iter::once(Tag::SentenceStart).chain(tags.iter().map(Tag::label));
        let targets: Vec<Tag> = tags
            .iter()
            .map(Tag::label)
            .chain(std::iter::once(Tag::SentenceEnd))
            .collect();
        let mut transitions = Vec::with_capacity(targets.len() * targets.len());
        for source in sources {
            let denominator = self.registry.tag_count(&source) as f64 + alpha * n_registry_tags;
            for target in &targets {
                let count = self.registry.transition_count(&source, target) as f64;
                transitions.push((count + alpha) / denominator);
            }
        }

        let vocabulary_size = vocabulary.len() as f64;
        let denominators: Vec<f64> = tag_counts
            .iter()
            .map(|&count| count as f64 + alpha * vocabulary_size)
            .collect();
        let mut words = Vec::with_capacity(vocabulary.len());
        let mut emissions = Vec::with_capacity(vocabulary.len());
        for (word, counts) in vocabulary {
            emissions.push(
                counts
                    .iter()
                    .zip(&denominators)
                    .map(|(&count, denominator)| (count as f64 + alpha) / denominator)
                    .collect(),
            );
            words.push(word);
        }

        log::info!(
            "trained on {} sentences, {} tokens: {} tags, {} vocabulary entries",
            self.n_sentences(),
            self.n_tokens(),
            tags.len(),
            words.len()
        );

        Ok(Model {
            n_sentences: self.n_sentences(),
            tags,
            tag_counts,
            transitions,
            words,
            emissions,
            smoothing: self.smoothing,
            rare_threshold: self.rare_threshold,
            case_folding: self.case_folding,
        })
    }
}
