// Rhymewalk CLI entry point.
//
// Loads the configuration and data files once, then runs one command:
//
//   rhymewalk [--config FILE] [-v...] generate --verse TEXT [--forward] [--seed N] [--json]
//   rhymewalk [--config FILE] [-v...] measure TEXT
//   rhymewalk [--config FILE] [-v...] rhyme --anchor TEXT [--top N] CANDIDATES...
//
// `measure` takes a two-line TEXT and prints the distance between its lines
// with every input of the formula. `rhyme` ranks candidates by rhyme count
// against the anchor. Logs go to stderr; repeat `-v` for more detail.
// Without `--seed` the generator is seeded from the clock and the seed is
// logged so the run can be replayed.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use rhymewalk::{
    AnchorPhrases, CandidateExpander, ChainFile, EmbeddingScorer, GenerateRequest,
    GeneratorConfig, Mode, RhymeDistanceMeter, VectorTable, VerseGenerator, split_pair,
};
use rhymewalk_lang::{LexiconTagger, PhoneticTable, Tagger};
use rhymewalk_prng::WalkRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser)]
#[command(name = "rhymewalk", version, about = "Answer a verse with a rhyming line")]
struct Cli {
    /// Generator configuration (JSON). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a line answering a verse.
    Generate {
        #[arg(long)]
        verse: String,
        /// Walk one line forward instead of selecting among reverse walks.
        #[arg(long)]
        forward: bool,
        #[arg(long)]
        seed: Option<u64>,
        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Measure the rhyme distance between the two lines of TEXT.
    Measure { text: String },
    /// Rank candidates by rhyme count against an anchor phrase.
    Rhyme {
        #[arg(long)]
        anchor: String,
        #[arg(long, default_value_t = 3)]
        top: usize,
        #[arg(required = true)]
        candidates: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    let tagger: Arc<dyn Tagger> = Arc::new(load_lexicon(&config.data.lexicon)?);
    let vectors: Arc<VectorTable> = Arc::new(
        VectorTable::load(&config.data.vectors)
            .with_context(|| format!("loading word vectors {}", config.data.vectors.display()))?,
    );
    tracing::info!(
        words = vectors.len(),
        dimension = vectors.dimension(),
        "loaded word vectors"
    );
    let scorer = Arc::new(EmbeddingScorer::new(
        vectors.clone(),
        tagger.clone(),
        config.baseline,
    ));
    let meter = RhymeDistanceMeter::new(
        PhoneticTable::kana(),
        tagger.clone(),
        scorer,
        config.theme_word.clone(),
    );

    match cli.command {
        Command::Generate {
            verse,
            forward,
            seed,
            json,
        } => {
            let anchors = AnchorPhrases::load(&config.data.anchor_phrases).with_context(|| {
                format!("loading anchor phrases {}", config.data.anchor_phrases.display())
            })?;
            let expander = CandidateExpander::new(tagger, vectors, &config);
            let chain = ChainFile::new(&config.data.chain_table);
            tracing::debug!(path = %chain.path().display(), "chain table opens per request");
            let generator = VerseGenerator::new(
                chain,
                expander,
                meter,
                anchors,
                &config,
            );

            let seed = seed.unwrap_or_else(clock_seed);
            tracing::info!(seed, "seeding generator");
            let mode = if forward { Mode::Forward } else { Mode::Reverse };
            let request = GenerateRequest::new(verse, mode);
            let result = generator
                .generate(&request, &mut WalkRng::new(seed))
                .context("generation failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.text);
                if let Some(distance) = result.distance {
                    println!("distance: {distance}");
                }
            }
        }
        Command::Measure { text } => {
            let (s1, s2) = split_pair(&text)?;
            let m = meter.measure(s1, s2)?;
            println!("rhyme count:        {}", m.rhyme_count);
            println!("self similarity:    {:.4}", m.self_similarity);
            println!("anchor similarity:  {:.4}", m.anchor_similarity);
            println!("length ratio:       {:.4}", m.length_ratio);
            println!("distance:           {}", m.distance);
        }
        Command::Rhyme {
            anchor,
            top,
            candidates,
        } => {
            for candidate in meter.most_rhyming(&anchor, &candidates, top) {
                println!("{} ({})", candidate, meter.count_rhyme(&anchor, candidate));
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_lexicon(path: &Path) -> Result<LexiconTagger> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading lexicon {}", path.display()))?;
    let tagger = LexiconTagger::from_json(&json)
        .with_context(|| format!("parsing lexicon {}", path.display()))?;
    tracing::info!(entries = tagger.len(), "loaded lexicon");
    Ok(tagger)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
