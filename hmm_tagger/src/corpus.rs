//! Line-oriented corpus readers and writers.
//!
//! A labeled corpus has one `word tag` pair per line, fields separated by tabs or spaces. An
//! unlabeled corpus has one word per line. In both formats blank lines separate sentences.

use std::io::{self, BufRead, Write};

use crate::errors::{HmmTaggerError, Result};

/// A word paired with its tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaggedToken {
    word: String,
    tag: String,
}

impl TaggedToken {
    pub fn new<W, T>(word: W, tag: T) -> Self
    where
        W: Into<String>,
        T: Into<String>,
    {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

/// Sentence with a tag for every word.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaggedSentence {
    tokens: Vec<TaggedToken>,
}

impl TaggedSentence {
    /// Pairs `words` with `tags`.
    ///
    /// # Errors
    ///
    /// [`HmmTaggerError::InvalidArgument`] will be returned if the lengths differ.
    pub fn from_words_and_tags<W, T>(words: &[W], tags: &[T]) -> Result<Self>
    where
        W: AsRef<str>,
        T: AsRef<str>,
    {
        if words.len() != tags.len() {
            return Err(HmmTaggerError::invalid_argument(
                "tags",
                format!("expected {} tags, got {}", words.len(), tags.len()),
            ));
        }
        Ok(Self {
            tokens: words
                .iter()
                .zip(tags)
                .map(|(word, tag)| TaggedToken::new(word.as_ref(), tag.as_ref()))
                .collect(),
        })
    }

    /// Appends a token.
    pub fn push<W, T>(&mut self, word: W, tag: T)
    where
        W: Into<String>,
        T: Into<String>,
    {
        self.tokens.push(TaggedToken::new(word, tag));
    }

    pub fn iter_tokens(&self) -> impl Iterator<Item = &TaggedToken> {
        self.tokens.iter()
    }

    pub fn words(&self) -> Vec<&str> {
        self.tokens.iter().map(TaggedToken::word).collect()
    }

    pub fn tags(&self) -> Vec<&str> {
        self.tokens.iter().map(TaggedToken::tag).collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Writes `word\ttag` lines followed by a blank line.
    ///
    /// The output can be read again by [`TaggedCorpusReader`].
    pub fn write<W>(&self, wtr: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        for token in &self.tokens {
            writeln!(wtr, "{}\t{}", token.word, token.tag)?;
        }
        writeln!(wtr)
    }

    /// Formats the sentence as [`TaggedSentence::write()`] does.
    ///
    /// # Examples
    ///
    /// ```
    /// use hmm_tagger::TaggedSentence;
    ///
    /// let s = TaggedSentence::from_words_and_tags(&["Dogs", "bark"], &["NNS", "VBP"]).unwrap();
    /// assert_eq!("Dogs\tNNS\nbark\tVBP\n\n", s.to_tagged_string());
    /// ```
    pub fn to_tagged_string(&self) -> String {
        let mut result = String::new();
        for token in &self.tokens {
            result.push_str(&token.word);
            result.push('\t');
            result.push_str(&token.tag);
            result.push('\n');
        }
        result.push('\n');
        result
    }
}

/// Splits a labeled line into a word and a tag. Fields after the tag are ignored.
fn parse_tagged_line(line_no: usize, line: &str) -> Result<(&str, &str)> {
    let mut fields = line.split_whitespace();
    match (fields.next(), fields.next()) {
        (Some(word), Some(tag)) => Ok((word, tag)),
        _ => Err(HmmTaggerError::malformed_record(line_no, line)),
    }
}

/// Groups non-blank lines into sentences and remembers their line numbers.
struct SentenceLines<R> {
    lines: io::Lines<R>,
    line_no: usize,
}

impl<R> SentenceLines<R>
where
    R: BufRead,
{
    fn new(rdr: R) -> Self {
        Self {
            lines: rdr.lines(),
            line_no: 0,
        }
    }

    fn next_sentence(&mut self) -> Option<Result<Vec<(usize, String)>>> {
        let mut sentence = vec![];
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            if line.trim().is_empty() {
                if sentence.is_empty() {
                    continue;
                }
                return Some(Ok(sentence));
            }
            sentence.push((self.line_no, line));
        }
        if sentence.is_empty() {
            None
        } else {
            Some(Ok(sentence))
        }
    }
}

/// Reads [`TaggedSentence`]s from a labeled corpus.
///
/// Consecutive blank lines never produce empty sentences. The iterator yields
/// [`HmmTaggerError::MalformedRecord`] for a line without a tag; callers are expected to stop
/// there.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
///
/// use hmm_tagger::TaggedCorpusReader;
///
/// let text = "The DT\ndog NN\n\nIt PRP\n";
/// let sentences = TaggedCorpusReader::new(Cursor::new(text))
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert_eq!(2, sentences.len());
/// assert_eq!(vec!["DT", "NN"], sentences[0].tags());
/// ```
pub struct TaggedCorpusReader<R> {
    inner: SentenceLines<R>,
}

impl<R> TaggedCorpusReader<R>
where
    R: BufRead,
{
    pub fn new(rdr: R) -> Self {
        Self {
            inner: SentenceLines::new(rdr),
        }
    }
}

impl<R> Iterator for TaggedCorpusReader<R>
where
    R: BufRead,
{
    type Item = Result<TaggedSentence>;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = match self.inner.next_sentence()? {
            Ok(lines) => lines,
            Err(e) => return Some(Err(e)),
        };
        let mut sentence = TaggedSentence::default();
        for (line_no, line) in &lines {
            match parse_tagged_line(*line_no, line) {
                Ok((word, tag)) => sentence.push(word, tag),
                Err(e) => return Some(Err(e)),
            }
        }
        Some(Ok(sentence))
    }
}

/// Reads sentences of words from an unlabeled corpus.
///
/// Only the first field of each line is used, so a labeled corpus can be read as well.
pub struct RawCorpusReader<R> {
    inner: SentenceLines<R>,
}

impl<R> RawCorpusReader<R>
where
    R: BufRead,
{
    pub fn new(rdr: R) -> Self {
        Self {
            inner: SentenceLines::new(rdr),
        }
    }
}

impl<R> Iterator for RawCorpusReader<R>
where
    R: BufRead,
{
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = match self.inner.next_sentence()? {
            Ok(lines) => lines,
            Err(e) => return Some(Err(e)),
        };
        Some(Ok(lines
            .into_iter()
            .filter_map(|(_, line)| line.split_whitespace().next().map(str::to_string))
            .collect()))
    }
}
