use std::borrow::Cow;
use std::io::{Read, Write};

use bincode::{Decode, Encode};

use crate::errors::{HmmTaggerError, Result};
use crate::registry::Tag;

/// Trained hidden Markov model.
///
/// A model is produced by [`Trainer::train()`](crate::Trainer::train) and never changes
/// afterwards. All probabilities are stored as plain values in `(0, 1]`.
#[derive(Clone, Debug, PartialEq, Decode, Encode)]
pub struct Model {
    // Label tags in sorted order. Positions in this list are the state indices of the decoder.
    pub(crate) tags: Vec<String>,
    pub(crate) tag_counts: Vec<u64>,
    pub(crate) n_sentences: u64,

    // Transition probabilities are ordered as follows:
    //
    //              tag1 tag2 ... END
    //
    // START         0    1        n
    // tag1        n+1  n+2     2n+1
    // tag2          .    .        .
    // ...
    pub(crate) transitions: Vec<f64>,

    // Sorted vocabulary including unknown-word buckets, and P(word | tag) for every tag.
    pub(crate) words: Vec<String>,
    pub(crate) emissions: Vec<Vec<f64>>,

    pub(crate) smoothing: f64,
    pub(crate) rare_threshold: u64,
    pub(crate) case_folding: bool,
}

impl Model {
    /// Exports the model data.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        let config = bincode::config::standard();
        bincode::encode_into_std_write(self, wtr, config)?;
        Ok(())
    }

    /// Creates a model from a reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Returns
    ///
    /// A model data read from `rdr`.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error, it will be returned as is.
    /// [`HmmTaggerError::InvalidModel`] will be returned if the tables are inconsistent.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let config = bincode::config::standard();
        let model: Self = bincode::decode_from_std_read(rdr, config)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        let n_tags = self.tags.len();
        if n_tags == 0 {
            return Err(HmmTaggerError::invalid_model("the model has no tags"));
        }
        if !self.tags.windows(2).all(|w| w[0] < w[1]) {
            return Err(HmmTaggerError::invalid_model("tags are not sorted"));
        }
        if self.tag_counts.len() != n_tags {
            return Err(HmmTaggerError::invalid_model(
                "the number of tag counts does not match the number of tags",
            ));
        }
        if self.transitions.len() != (n_tags + 1) * (n_tags + 1) {
            return Err(HmmTaggerError::invalid_model(
                "invalid size of the transition table",
            ));
        }
        if self.words.len() != self.emissions.len() {
            return Err(HmmTaggerError::invalid_model(
                "the number of emission rows does not match the vocabulary",
            ));
        }
        if !self.words.windows(2).all(|w| w[0] < w[1]) {
            return Err(HmmTaggerError::invalid_model("words are not sorted"));
        }
        if self.emissions.iter().any(|row| row.len() != n_tags) {
            return Err(HmmTaggerError::invalid_model(
                "invalid size of an emission row",
            ));
        }
        let in_range = |p: &f64| *p > 0.0 && *p <= 1.0;
        let emissions = self.emissions.iter().flatten();
        if !self.transitions.iter().chain(emissions).all(in_range) {
            return Err(HmmTaggerError::invalid_model("probability out of range"));
        }
        Ok(())
    }

    /// Gets the label tags in the order used by the decoder.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Gets the vocabulary, including unknown-word buckets, in sorted order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Gets the number of vocabulary entries including unknown-word buckets.
    pub fn vocabulary_size(&self) -> usize {
        self.words.len()
    }

    pub fn n_sentences(&self) -> u64 {
        self.n_sentences
    }

    /// Gets the smoothing constant used for estimation.
    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    /// Gets the rarity threshold used for estimation.
    pub fn rare_threshold(&self) -> u64 {
        self.rare_threshold
    }

    /// Returns `true` if words are upper-cased before lookup.
    pub fn case_folding(&self) -> bool {
        self.case_folding
    }

    pub(crate) fn tag_id(&self, tag: &str) -> Option<usize> {
        self.tags
            .binary_search_by(|probe| probe.as_str().cmp(tag))
            .ok()
    }

    pub(crate) fn word_id(&self, word: &str) -> Option<usize> {
        self.words
            .binary_search_by(|probe| probe.as_str().cmp(word))
            .ok()
    }

    /// Applies the case normalization of the model to a surface word.
    pub fn normalize<'a>(&self, word: &'a str) -> Cow<'a, str> {
        if self.case_folding {
            Cow::Owned(word.to_uppercase())
        } else {
            Cow::Borrowed(word)
        }
    }

    /// Gets the number of occurrences of `tag` in the training data.
    ///
    /// Sentinels occur once per sentence.
    pub fn tag_count(&self, tag: &Tag) -> u64 {
        match tag {
            Tag::SentenceStart | Tag::SentenceEnd => self.n_sentences,
            Tag::Label(name) => self.tag_id(name).map_or(0, |id| self.tag_counts[id]),
        }
    }

    /// Gets P(target | source).
    ///
    /// # Returns
    ///
    /// `None` if either tag is unknown, `source` is [`Tag::SentenceEnd`], or `target` is
    /// [`Tag::SentenceStart`].
    pub fn transition(&self, source: &Tag, target: &Tag) -> Option<f64> {
        let n_tags = self.tags.len();
        let row = match source {
            Tag::SentenceStart => 0,
            Tag::SentenceEnd => return None,
            Tag::Label(name) => self.tag_id(name)? + 1,
        };
        let col = match target {
            Tag::SentenceStart => return None,
            Tag::SentenceEnd => n_tags,
            Tag::Label(name) => self.tag_id(name)?,
        };
        Some(self.transitions[row * (n_tags + 1) + col])
    }

    /// Gets P(word | tag) for a vocabulary entry.
    ///
    /// `word` is looked up as is; no normalization or unknown-word classification is applied.
    pub fn emission(&self, word: &str, tag: &str) -> Option<f64> {
        let tag_id = self.tag_id(tag)?;
        self.emission_row(word).map(|row| row[tag_id])
    }

    /// Gets P(word | tag) for every tag in the order of [`Model::tags()`].
    pub fn emission_row(&self, word: &str) -> Option<&[f64]> {
        self.word_id(word).map(|id| self.emissions[id].as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use crate::trainer::Trainer;

    fn small_model() -> Model {
        let mut trainer = Trainer::new(1.0, 0, true).unwrap();
        for (word, tag) in [("the", "DT"), ("dog", "NN"), ("barks", "VBZ")] {
            trainer.add_token(word, tag).unwrap();
        }
        trainer.end_sentence();
        for (word, tag) in [("a", "DT"), ("dog", "NN")] {
            trainer.add_token(word, tag).unwrap();
        }
        trainer.train().unwrap()
    }

    #[test]
    fn test_model_accessors() {
        let model = small_model();

        assert_eq!(&["DT", "NN", "VBZ"], model.tags());
        assert_eq!(&["A", "BARKS", "DOG", "THE"], model.words());
        assert_eq!(4, model.vocabulary_size());
        assert_eq!(2, model.n_sentences());
        assert_eq!(2, model.tag_count(&Tag::label("NN")));
        assert_eq!(2, model.tag_count(&Tag::SentenceStart));
        assert_eq!(0, model.tag_count(&Tag::label("JJ")));
        assert!(model.case_folding());
    }

    #[test]
    fn test_model_transition_sentinels() {
        let model = small_model();
        let nn = Tag::label("NN");

        assert!(model.transition(&Tag::SentenceStart, &nn).is_some());
        assert!(model.transition(&nn, &Tag::SentenceEnd).is_some());
        assert!(model
            .transition(&Tag::SentenceStart, &Tag::SentenceEnd)
            .is_some());
        assert_eq!(None, model.transition(&Tag::SentenceEnd, &nn));
        assert_eq!(None, model.transition(&nn, &Tag::SentenceStart));
        assert_eq!(None, model.transition(&Tag::label("JJ"), &nn));
    }

    #[test]
    fn test_model_emission_lookup_is_exact() {
        let model = small_model();

        assert!(model.emission("DOG", "NN").is_some());
        assert_eq!(None, model.emission("dog", "NN"));
        assert_eq!(None, model.emission("DOG", "JJ"));
        assert_eq!(3, model.emission_row("DOG").unwrap().len());
    }

    #[test]
    fn test_model_normalize() {
        let model = small_model();
        assert_eq!("DOG", model.normalize("Dog"));

        let mut trainer = Trainer::new(1.0, 0, false).unwrap();
        trainer.add_token("Dog", "NN").unwrap();
        let model = trainer.train().unwrap();
        assert_eq!("Dog", model.normalize("Dog"));
        assert_eq!(&["Dog"], model.words());
    }

    #[test]
    fn test_model_write_read() {
        let model = small_model();

        let mut buf = vec![];
        model.write(&mut buf).unwrap();
        let restored = Model::read(&mut Cursor::new(buf)).unwrap();

        assert_eq!(model, restored);
    }

    #[test]
    fn test_model_read_rejects_broken_tables() {
        let mut model = small_model();
        model.transitions.pop();

        let mut buf = vec![];
        model.write(&mut buf).unwrap();
        let result = Model::read(&mut Cursor::new(buf));

        assert!(matches!(result, Err(HmmTaggerError::InvalidModel(_))));
    }

    #[test]
    fn test_model_read_rejects_zero_probability() {
        let mut model = small_model();
        model.emissions[0][0] = 0.0;

        let mut buf = vec![];
        model.write(&mut buf).unwrap();
        let result = Model::read(&mut Cursor::new(buf));

        assert!(matches!(result, Err(HmmTaggerError::InvalidModel(_))));
    }

    #[test]
    fn test_model_read_truncated() {
        let model = small_model();

        let mut buf = vec![];
        model.write(&mut buf).unwrap();
        buf.truncate(buf.len() / 2);
        let result = Model::read(&mut Cursor::new(buf));

        assert!(result.is_err());
    }
}
