use std::fs::File;
use std::io::{prelude::*, stdin, stdout, BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use hmm_tagger::{Model, RawCorpusReader, Tagger, TaggedSentence};

#[derive(Parser, Debug)]
#[command(about = "A program to perform part-of-speech tagging.")]
struct Args {
    /// The model file to use when tagging text
    #[arg(long)]
    model: PathBuf,

    /// One word per line, blank lines between sentences. Reads stdin if not specified.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Number of threads (0 tags sentences one by one on the main thread)
    #[arg(long, default_value = "0")]
    n_threads: usize,

    /// Number of sentences tagged together when multithreading
    #[arg(long, default_value = "1000")]
    mt_chunk_size: usize,
}

fn write_batch<W>(
    tagger: &Tagger,
    batch: &[Vec<String>],
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>>
where
    W: Write,
{
    for (words, tags) in batch.iter().zip(tagger.tag_batch(batch)) {
        TaggedSentence::from_words_and_tags(words, &tags)?.write(out)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    if let Some(path) = &args.input {
        if !path.is_file() {
            return Err(format!("{path:?} is not a file").into());
        }
    }
    if args.n_threads != 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.n_threads)
            .build_global()?;
    }

    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(File::open(args.model)?)?;
    let model = Model::read(&mut f)?;
    log::info!(
        "{} tags, {} vocabulary entries",
        model.tags().len(),
        model.vocabulary_size()
    );
    let tagger = Tagger::new(model);

    let rdr: Box<dyn BufRead> = match args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => {
            if atty::is(atty::Stream::Stdin) {
                eprintln!("Reading words from stdin...");
            }
            Box::new(stdin().lock())
        }
    };
    let mut out = BufWriter::new(stdout().lock());

    eprintln!("Start tagging");
    let mut n_words = 0;
    let start = Instant::now();
    if args.n_threads == 0 {
        for words in RawCorpusReader::new(rdr) {
            let words = words?;
            n_words += words.len();
            tagger.tag_sentence(&words).write(&mut out)?;
        }
    } else {
        let mut batch = Vec::with_capacity(args.mt_chunk_size);
        for words in RawCorpusReader::new(rdr) {
            let words = words?;
            n_words += words.len();
            batch.push(words);
            if batch.len() >= args.mt_chunk_size {
                write_batch(&tagger, &batch, &mut out)?;
                batch.clear();
            }
        }
        write_batch(&tagger, &batch, &mut out)?;
    }
    out.flush()?;
    let duration = start.elapsed();
    eprintln!("Elapsed: {} [sec]", duration.as_secs_f64());
    eprintln!(
        "Speed: {} [words/sec]",
        n_words as f64 / duration.as_secs_f64()
    );

    Ok(())
}
