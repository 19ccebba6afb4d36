use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser};
use hmm_tagger::{
    Model, TaggedCorpusReader, TaggedSentence, Tagger, Trainer, DEFAULT_RARE_THRESHOLD,
    DEFAULT_SMOOTHING,
};

#[derive(Parser, Debug)]
#[command(
    about = "A program to evaluate the accuracy of hmm_tagger.",
    group = ArgGroup::new("source").required(true),
)]
struct Args {
    /// The model file to evaluate
    #[arg(long, group = "source")]
    model: Option<PathBuf>,

    /// Tagged corpora to train a model on instead of loading one
    #[arg(long, group = "source")]
    train: Vec<PathBuf>,

    /// Tagged gold corpora
    #[arg(long, required = true)]
    test: Vec<PathBuf>,

    /// The additive smoothing constant used with --train
    #[arg(long, default_value_t = DEFAULT_SMOOTHING)]
    smoothing: f64,

    /// The rarity threshold used with --train
    #[arg(long, default_value_t = DEFAULT_RARE_THRESHOLD)]
    rare_threshold: u64,

    /// Do not upper-case words when training with --train.
    #[arg(long)]
    no_norm: bool,
}

#[derive(Debug, Default)]
struct Counts {
    tokens: usize,
    correct_tokens: usize,
    sentences: usize,
    correct_sentences: usize,
    unknown_tokens: usize,
    correct_unknown_tokens: usize,
}

impl Counts {
    fn add(&mut self, tagger: &Tagger, gold: &TaggedSentence) {
        let words = gold.words();
        let predicted = tagger.tag(&words);
        let mut all_correct = true;
        for ((word, expected), tag) in words.iter().zip(gold.tags()).zip(predicted) {
            let correct = expected == tag;
            let known = tagger.is_known(word);
            self.tokens += 1;
            self.correct_tokens += usize::from(correct);
            if !known {
                self.unknown_tokens += 1;
                self.correct_unknown_tokens += usize::from(correct);
            }
            all_correct &= correct;
        }
        self.sentences += 1;
        self.correct_sentences += usize::from(all_correct);
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn check_files(paths: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    for path in paths {
        if !path.is_file() {
            return Err(format!("{path:?} is not a file").into());
        }
    }
    Ok(())
}

fn train_model(args: &Args) -> Result<Model, Box<dyn std::error::Error>> {
    let mut trainer = Trainer::new(args.smoothing, args.rare_threshold, !args.no_norm)?;
    for path in &args.train {
        eprintln!("Loading {path:?} ...");
        let f = BufReader::new(File::open(path)?);
        for s in TaggedCorpusReader::new(f) {
            trainer.push_sentence(&s?)?;
        }
    }
    eprintln!("Start training...");
    Ok(trainer.train()?)
}

fn load_model(path: &Path) -> Result<Model, Box<dyn std::error::Error>> {
    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(File::open(path)?)?;
    Ok(Model::read(&mut f)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    check_files(&args.train)?;
    check_files(&args.test)?;

    let model = match &args.model {
        Some(path) => load_model(path)?,
        None => train_model(&args)?,
    };
    let tagger = Tagger::new(model);

    eprintln!("Start tagging");
    let mut counts = Counts::default();
    for path in &args.test {
        log::info!("evaluating {path:?}");
        let f = BufReader::new(File::open(path)?);
        for s in TaggedCorpusReader::new(f) {
            counts.add(&tagger, &s?);
        }
    }
    log::debug!("{counts:?}");

    println!(
        "Token accuracy: {:.4} ({}/{})",
        ratio(counts.correct_tokens, counts.tokens),
        counts.correct_tokens,
        counts.tokens
    );
    println!(
        "Sentence accuracy: {:.4} ({}/{})",
        ratio(counts.correct_sentences, counts.sentences),
        counts.correct_sentences,
        counts.sentences
    );
    println!(
        "Unknown word accuracy: {:.4} ({}/{})",
        ratio(counts.correct_unknown_tokens, counts.unknown_tokens),
        counts.correct_unknown_tokens,
        counts.unknown_tokens
    );

    Ok(())
}
