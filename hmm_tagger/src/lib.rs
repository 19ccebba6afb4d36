#![cfg_attr(docsrs, feature(doc_cfg))]

//! # hmm_tagger
//!
//! hmm_tagger is a part-of-speech tagger based on a first-order hidden Markov model decoded
//! with the Viterbi algorithm.
//!
//! ## Examples
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::{stdin, stdout, BufReader};
//!
//! use hmm_tagger::{Model, RawCorpusReader, Tagger};
//!
//! let mut f = BufReader::new(File::open("model.bin").unwrap());
//! let model = Model::read(&mut f).unwrap();
//! let tagger = Tagger::new(model);
//!
//! let mut out = stdout().lock();
//! for words in RawCorpusReader::new(stdin().lock()) {
//!     let words = words.unwrap();
//!     tagger.tag_sentence(&words).write(&mut out).unwrap();
//! }
//! ```
//!
//! Models are created by [`Trainer`]. Words that are rare in the training data, and words never
//! seen at all, share emission probabilities through unknown-word buckets computed by
//! [`classify()`].

mod corpus;
mod model;
mod registry;
mod tagger;
mod trainer;
mod unknown;

pub mod errors;

pub use corpus::{RawCorpusReader, TaggedCorpusReader, TaggedSentence, TaggedToken};
pub use errors::{HmmTaggerError, Result};
pub use model::Model;
pub use registry::{CountRegistry, Tag, SENTENCE_END, SENTENCE_START};
pub use tagger::{Tagger, UNKNOWN_EMISSION};
pub use trainer::{Trainer, DEFAULT_RARE_THRESHOLD, DEFAULT_SMOOTHING};
pub use unknown::{classify, is_bucket, WordShape, WordSignature, SUFFIXES, UNKNOWN_WORD_PREFIX};
