use std::fs::File;
use std::io::{prelude::*, stderr, BufReader};
use std::path::PathBuf;

use clap::Parser;
use hmm_tagger::{TaggedCorpusReader, Trainer, DEFAULT_RARE_THRESHOLD, DEFAULT_SMOOTHING};

#[derive(Parser, Debug)]
#[command(about = "A program to train models of hmm_tagger.")]
struct Args {
    /// A tagged training corpus (one `word tag` pair per line, blank lines between sentences)
    #[arg(long, required = true)]
    tok: Vec<PathBuf>,

    /// The file to write the trained model to
    #[arg(long)]
    model: PathBuf,

    /// The additive smoothing constant
    #[arg(long, default_value_t = DEFAULT_SMOOTHING)]
    smoothing: f64,

    /// Words seen at most this many times are merged into unknown-word buckets (0 disables
    /// merging)
    #[arg(long, default_value_t = DEFAULT_RARE_THRESHOLD)]
    rare_threshold: u64,

    /// Do not upper-case words.
    #[arg(long)]
    no_norm: bool,

    /// The compression level of zstd
    #[arg(long, default_value = "19")]
    zstd_level: i32,

    /// The number of workers for zstd (0 means multithreaded will be disabled)
    #[arg(long, default_value = "0")]
    zstd_workers: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    for path in &args.tok {
        if !path.is_file() {
            return Err(format!("{path:?} is not a file").into());
        }
    }

    let mut trainer = Trainer::new(args.smoothing, args.rare_threshold, !args.no_norm)?;

    eprintln!("Loading dataset...");
    for path in &args.tok {
        eprintln!("Loading {path:?} ...");
        let f = BufReader::new(File::open(path)?);
        for (i, s) in TaggedCorpusReader::new(f).enumerate() {
            if i % 10000 == 0 {
                eprint!("# of sentences: {i}\r");
                stderr().flush()?;
            }
            trainer.push_sentence(&s?)?;
        }
        eprintln!("# of sentences: {}", trainer.n_sentences());
    }
    log::info!(
        "{} tokens, {} distinct words",
        trainer.n_tokens(),
        trainer.registry().n_words()
    );

    eprintln!("Start training...");
    let model = trainer.train()?;
    eprintln!("Finish training.");

    let mut f = zstd::Encoder::new(File::create(args.model)?, args.zstd_level)?;
    f.multithread(args.zstd_workers)?;
    model.write(&mut f)?;
    f.finish()?;

    Ok(())
}
