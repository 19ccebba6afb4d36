use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use hmm_tagger::{is_bucket, Model, Tag};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(about = "A program to inspect trained models.")]
struct Args {
    /// Input path of the model file
    #[arg(long)]
    model: PathBuf,

    /// Output the transition table as CSV.
    #[arg(long)]
    dump_transitions: Option<PathBuf>,

    /// Output the emission table as CSV.
    #[arg(long)]
    dump_emissions: Option<PathBuf>,
}

#[derive(Serialize)]
struct TransitionRecord<'a> {
    source: &'a str,
    target: &'a str,
    probability: f64,
}

#[derive(Serialize)]
struct EmissionRecord<'a> {
    word: &'a str,
    tag: &'a str,
    probability: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(File::open(args.model)?)?;
    let model = Model::read(&mut f)?;

    let n_buckets = model.words().iter().filter(|w| is_bucket(w)).count();
    println!("# of sentences: {}", model.n_sentences());
    println!("# of tags: {}", model.tags().len());
    println!(
        "# of vocabulary entries: {} ({} unknown-word buckets)",
        model.vocabulary_size(),
        n_buckets
    );
    println!("smoothing: {}", model.smoothing());
    println!("rare threshold: {}", model.rare_threshold());
    println!("case folding: {}", model.case_folding());
    for tag in model.tags() {
        println!("{}\t{}", tag, model.tag_count(&Tag::label(tag.as_str())));
    }

    if let Some(path) = args.dump_transitions {
        eprintln!("Saving transition table...");
        let mut wtr = csv::Writer::from_writer(File::create(path)?);
        let sources = std::iter::once(Tag::SentenceStart)
            .chain(model.tags().iter().map(Tag::label));
        let targets: Vec<Tag> = model
            .tags()
            .iter()
            .map(Tag::label)
            .chain(std::iter::once(Tag::SentenceEnd))
            .collect();
        for source in sources {
            for target in &targets {
                if let Some(probability) = model.transition(&source, target) {
                    wtr.serialize(TransitionRecord {
                        source: source.as_str(),
                        target: target.as_str(),
                        probability,
                    })?;
                }
            }
        }
        wtr.flush()?;
    }

    if let Some(path) = args.dump_emissions {
        eprintln!("Saving emission table...");
        let mut wtr = csv::Writer::from_writer(File::create(path)?);
        for word in model.words() {
            let Some(row) = model.emission_row(word) else {
                continue;
            };
            for (tag, &probability) in model.tags().iter().zip(row) {
                wtr.serialize(EmissionRecord {
                    word,
                    tag,
                    probability,
                })?;
            }
        }
        wtr.flush()?;
    }

    Ok(())
}
