use hashbrown::HashMap;

#[cfg(feature = "multithreading")]
use rayon::prelude::*;

use crate::corpus::TaggedSentence;
use crate::model::Model;
use crate::unknown::classify;

/// Emission probability used for every tag when a word matches neither the vocabulary nor an
/// unknown-word bucket.
pub const UNKNOWN_EMISSION: f64 = 0.001;

/// Viterbi decoder.
///
/// All probabilities of the model are converted to natural logarithms on construction, so the
/// score of a path is a sum rather than a product and long sentences do not underflow.
pub struct Tagger {
    model: Model,

    // ln P(tag | START)
    start_scores: Vec<f64>,
    // ln P(target | source), indexed by `source * n_tags + target`
    transition_scores: Vec<f64>,
    // ln P(END | tag)
    end_scores: Vec<f64>,
    // ln P(word | tag) for every vocabulary entry
    emission_scores: Vec<Vec<f64>>,
    fallback_scores: Vec<f64>,

    word_ids: HashMap<String, usize>,
}

impl Tagger {
    /// Creates a new tagger.
    ///
    /// # Arguments
    ///
    /// * `model` - A trained model.
    ///
    /// # Returns
    ///
    /// A new tagger.
    pub fn new(model: Model) -> Self {
        let n_tags = model.tags.len();
        let row_len = n_tags + 1;

        let start_scores = model.transitions[..n_tags].iter().map(|p| p.ln()).collect();
        let mut transition_scores = Vec::with_capacity(n_tags * n_tags);
        let mut end_scores = Vec::with_capacity(n_tags);
        for row in model.transitions[row_len..].chunks(row_len) {
            transition_scores.extend(row[..n_tags].iter().map(|p| p.ln()));
            end_scores.push(row[n_tags].ln());
        }
        let emission_scores = model
            .emissions
            .iter()
            .map(|row| row.iter().map(|p| p.ln()).collect())
            .collect();
        let word_ids = model
            .words
            .iter()
            .enumerate()
            .map(|(i, word)| (word.clone(), i))
            .collect();

        Self {
            start_scores,
            transition_scores,
            end_scores,
            emission_scores,
            fallback_scores: vec![UNKNOWN_EMISSION.ln(); n_tags],
            word_ids,
            model,
        }
    }

    /// Gets the model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Returns `true` if `word` is in the vocabulary after normalization.
    ///
    /// Words that are only covered by an unknown-word bucket are not known.
    pub fn is_known(&self, word: &str) -> bool {
        self.word_ids
            .contains_key(self.model.normalize(word).as_ref())
    }

    fn emission_scores(&self, word: &str) -> &[f64] {
        if let Some(&id) = self.word_ids.get(self.model.normalize(word).as_ref()) {
            return &self.emission_scores[id];
        }
        let signature = classify(word).to_string();
        match self.word_ids.get(signature.as_str()) {
            Some(&id) => &self.emission_scores[id],
            None => &self.fallback_scores,
        }
    }

    /// Finds the best tag sequence as state indices, with its log probability.
    fn viterbi<S>(&self, words: &[S]) -> (Vec<usize>, f64)
    where
        S: AsRef<str>,
    {
        if words.is_empty() {
            return (vec![], 0.0);
        }
        let n_tags = self.start_scores.len();

        // scores[t * n_tags + tag]: best log probability of a path ending in `tag` at `t`
        let mut scores = vec![0.0; words.len() * n_tags];
        let mut backptrs = vec![0; words.len() * n_tags];

        let emissions = self.emission_scores(words[0].as_ref());
        for (tag, score) in scores[..n_tags].iter_mut().enumerate() {
            *score = self.start_scores[tag] + emissions[tag];
        }

        for (t, word) in words.iter().enumerate().skip(1) {
            let emissions = self.emission_scores(word.as_ref());
            let (prev_scores, cur_scores) = scores[(t - 1) * n_tags..].split_at_mut(n_tags);
            let cur_backptrs = &mut backptrs[t * n_tags..(t + 1) * n_tags];
            for tag in 0..n_tags {
                let mut best_score = f64::NEG_INFINITY;
                let mut best_prev = 0;
                for (prev, &prev_score) in prev_scores.iter().enumerate() {
                    let score = prev_score + self.transition_scores[prev * n_tags + tag];
                    // strict comparison keeps the first maximizer
                    if score > best_score {
                        best_score = score;
                        best_prev = prev;
                    }
                }
                cur_scores[tag] = best_score + emissions[tag];
                cur_backptrs[tag] = best_prev;
            }
        }

        let last = (words.len() - 1) * n_tags;
        let mut best_score = f64::NEG_INFINITY;
        let mut best_tag = 0;
        for (tag, &score) in scores[last..].iter().enumerate() {
            let score = score + self.end_scores[tag];
            if score > best_score {
                best_score = score;
                best_tag = tag;
            }
        }

        let mut path = vec![0; words.len()];
        path[words.len() - 1] = best_tag;
        for t in (1..words.len()).rev() {
            path[t - 1] = backptrs[t * n_tags + path[t]];
        }
        (path, best_score)
    }

    /// Tags a sentence.
    ///
    /// # Arguments
    ///
    /// * `words` - Surface words of one sentence.
    ///
    /// # Returns
    ///
    /// One tag per word. An empty sentence gives an empty sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use hmm_tagger::{Tagger, Trainer};
    ///
    /// let mut trainer = Trainer::new(1.0, 1, true).unwrap();
    /// trainer.add_token("DOG", "NOUN").unwrap();
    /// trainer.add_token("BARKS", "VERB").unwrap();
    /// let tagger = Tagger::new(trainer.train().unwrap());
    ///
    /// assert_eq!(vec!["NOUN", "VERB"], tagger.tag(&["DOG", "BARKS"]));
    /// assert_eq!(vec!["VERB"], tagger.tag(&["CATS"]));
    /// ```
    pub fn tag<S>(&self, words: &[S]) -> Vec<&str>
    where
        S: AsRef<str>,
    {
        self.tag_with_score(words).0
    }

    /// Tags a sentence and returns the natural logarithm of the joint probability of the best
    /// path, including the transitions from the start and to the end of the sentence.
    ///
    /// The score of an empty sentence is `0`.
    pub fn tag_with_score<S>(&self, words: &[S]) -> (Vec<&str>, f64)
    where
        S: AsRef<str>,
    {
        let (path, score) = self.viterbi(words);
        let tags = path
            .into_iter()
            .map(|id| self.model.tags[id].as_str())
            .collect();
        (tags, score)
    }

    /// Tags a sentence and pairs every word with its tag.
    pub fn tag_sentence<S>(&self, words: &[S]) -> TaggedSentence
    where
        S: AsRef<str>,
    {
        let mut sentence = TaggedSentence::default();
        for (word, tag) in words.iter().zip(self.tag(words)) {
            sentence.push(word.as_ref(), tag);
        }
        sentence
    }

    /// Tags sentences in parallel.
    ///
    /// The output is in the order of the input.
    #[cfg(feature = "multithreading")]
    #[cfg_attr(docsrs, doc(cfg(feature = "multithreading")))]
    pub fn tag_batch<S, W>(&self, sentences: &[S]) -> Vec<Vec<&str>>
    where
        S: AsRef<[W]> + Sync,
        W: AsRef<str>,
    {
        sentences
            .par_iter()
            .map(|sentence| self.tag(sentence.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use crate::trainer::Trainer;

    const CORPUS: &[&[(&str, &str)]] = &[
        &[("The", "DT"), ("dog", "NN"), ("barks", "VBZ")],
        &[("The", "DT"), ("cat", "NN"), ("sleeps", "VBZ")],
        &[("A", "DT"), ("dog", "NN"), ("sleeps", "VBZ")],
        &[("The", "DT"), ("cat", "NN"), ("barks", "VBZ")],
    ];

    fn train(sentences: &[Vec<(&str, &str)>], rare_threshold: u64) -> Tagger {
        let mut trainer = Trainer::new(1.0, rare_threshold, true).unwrap();
        for sentence in sentences {
            for (word, tag) in sentence {
                trainer.add_token(word, tag).unwrap();
            }
            trainer.end_sentence();
        }
        Tagger::new(trainer.train().unwrap())
    }

    fn corpus() -> Vec<Vec<(&'static str, &'static str)>> {
        CORPUS.iter().map(|s| s.to_vec()).collect()
    }

    fn dog_barks() -> Tagger {
        train(&[vec![("DOG", "NOUN"), ("BARKS", "VERB")]], 1)
    }

    #[test]
    fn test_tag_empty() {
        let tagger = dog_barks();
        let empty: [&str; 0] = [];

        assert!(tagger.tag(&empty).is_empty());
        assert_eq!((vec![], 0.0), tagger.tag_with_score(&empty));
        assert!(tagger.tag_sentence(&empty).is_empty());
    }

    #[test]
    fn test_tag_collapsed_words() {
        let tagger = dog_barks();

        assert_eq!(vec!["NOUN", "VERB"], tagger.tag(&["DOG", "BARKS"]));
    }

    #[test]
    fn test_tag_unseen_word_uses_bucket() {
        let tagger = dog_barks();

        // Unknown_Word[1,s] was built from BARKS
        assert!(!tagger.is_known("CATS"));
        assert_eq!(vec!["VERB"], tagger.tag(&["CATS"]));
    }

    #[test]
    fn test_tag_fallback_without_bucket() {
        let tagger = dog_barks();

        // Unknown_Word[2,] and Unknown_Word[2,s] are absent, transitions decide
        assert_eq!(vec!["NOUN", "VERB"], tagger.tag(&["dog", "barks"]));
        let (tags, score) = tagger.tag_with_score(&["dog", "barks"]);
        assert_eq!(vec!["NOUN", "VERB"], tags);
        let expected = (0.4 * UNKNOWN_EMISSION * 0.4 * UNKNOWN_EMISSION * 0.4f64).ln();
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_tag_with_score() {
        let tagger = dog_barks();

        let (tags, score) = tagger.tag_with_score(&["DOG", "BARKS"]);
        assert_eq!(vec!["NOUN", "VERB"], tags);
        let expected = (0.4 * (2.0 / 3.0) * 0.4 * (2.0 / 3.0) * 0.4f64).ln();
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_tag_case_folding() {
        let tagger = train(&corpus(), 0);

        assert!(tagger.is_known("dog"));
        assert!(tagger.is_known("DOG"));
        assert!(!tagger.is_known("bird"));
        assert_eq!(
            vec!["DT", "NN", "VBZ"],
            tagger.tag(&["THE", "CAT", "SLEEPS"])
        );
        assert_eq!(
            vec!["DT", "NN", "VBZ"],
            tagger.tag(&["the", "Cat", "sleeps"])
        );
    }

    #[test]
    fn test_tag_reproduces_training_data() {
        let tagger = train(&corpus(), 1);

        for sentence in CORPUS {
            let words: Vec<&str> = sentence.iter().map(|(w, _)| *w).collect();
            let tags: Vec<&str> = sentence.iter().map(|(_, t)| *t).collect();
            assert_eq!(tags, tagger.tag(&words));
        }
    }

    #[test]
    fn test_tag_retrain_fixed_point() {
        let tagger = train(&corpus(), 1);
        let first: Vec<Vec<&str>> = CORPUS
            .iter()
            .map(|s| tagger.tag(&s.iter().map(|(w, _)| *w).collect::<Vec<_>>()))
            .collect();

        let relabeled: Vec<Vec<(&str, &str)>> = CORPUS
            .iter()
            .zip(&first)
            .map(|(s, tags)| s.iter().map(|(w, _)| *w).zip(tags.iter().copied()).collect())
            .collect();
        let retrained = train(&relabeled, 1);

        for (sentence, tags) in CORPUS.iter().zip(&first) {
            let words: Vec<&str> = sentence.iter().map(|(w, _)| *w).collect();
            assert_eq!(*tags, retrained.tag(&words));
        }
    }

    #[test]
    fn test_tag_deterministic() {
        let tagger = train(&corpus(), 1);
        let words = ["A", "strange", "cat", "sleeps", "1984", "well-dressed"];

        let expected = tagger.tag_with_score(&words);
        for _ in 0..10 {
            assert_eq!(expected, tagger.tag_with_score(&words));
        }
    }

    #[test]
    fn test_tag_tie_keeps_first_tag() {
        // NN and VB are symmetric, so every score ties
        let tagger = train(&[vec![("X", "VB")], vec![("X", "NN")]], 0);

        assert_eq!(vec!["NN"], tagger.tag(&["X"]));
        assert_eq!(vec!["NN", "NN"], tagger.tag(&["X", "X"]));
    }

    #[test]
    fn test_tag_long_sentence() {
        let tagger = dog_barks();
        let words: Vec<&str> = ["DOG", "BARKS"].iter().copied().cycle().take(2000).collect();

        let (tags, score) = tagger.tag_with_score(&words);
        assert_eq!(2000, tags.len());
        assert!(score.is_finite());
        assert_eq!("NOUN", tags[0]);
        assert_eq!("VERB", tags[1999]);
    }

    #[test]
    fn test_tag_sentence() {
        let tagger = dog_barks();

        let sentence = tagger.tag_sentence(&["Dog", "BARKS"]);
        assert_eq!(vec!["Dog", "BARKS"], sentence.words());
        assert_eq!(vec!["NOUN", "VERB"], sentence.tags());
    }

    #[test]
    fn test_tag_after_write_read() {
        let tagger = train(&corpus(), 1);
        let mut buf = vec![];
        tagger.model().write(&mut buf).unwrap();
        let restored = Tagger::new(Model::read(&mut Cursor::new(buf)).unwrap());

        let words = ["The", "bird", "sleeps", "Quickly"];
        assert_eq!(tagger.tag_with_score(&words), restored.tag_with_score(&words));
    }

    #[test]
    fn test_tagger_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Tagger>();
    }

    #[cfg(feature = "multithreading")]
    #[test]
    fn test_tag_batch() {
        let tagger = train(&corpus(), 1);
        let sentences: Vec<Vec<&str>> = CORPUS
            .iter()
            .map(|s| s.iter().map(|(w, _)| *w).collect())
            .chain([vec![], vec!["CATS"]])
            .collect();

        let expected: Vec<Vec<&str>> = sentences.iter().map(|s| tagger.tag(s)).collect();
        assert_eq!(expected, tagger.tag_batch(&sentences));
    }
}
