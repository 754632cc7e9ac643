use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use course_recommender::{
    build_model, Candidates, Catalog, CatalogEntry, DefaultTfIdfEngine, JiebaSegmenter, ModelBundle,
    Recommendation, RecommendResult, RecommenderConfig, RecommenderContext, ScoringConfig, StopwordSet,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "course-recommender")]
#[command(about = "Rank courses against a free-text statement of preferences")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the vocabulary on catalog reviews and write a model bundle
    Build {
        /// Catalog CSV
        #[arg(long)]
        catalog: PathBuf,

        /// Stopword list, one word per line (UTF-8)
        #[arg(long)]
        stopwords: PathBuf,

        /// Output model bundle
        #[arg(short, long)]
        out: PathBuf,

        /// TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Rank courses for a query, or read queries interactively when none is given
    Recommend {
        /// Model bundle written by `build`
        #[arg(short, long)]
        model: PathBuf,

        /// The catalog CSV the bundle was built from
        #[arg(long)]
        catalog: PathBuf,

        /// CSV of courses without reviews (course_name, teacher_name)
        #[arg(long)]
        new_courses: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Mode::Main)]
        mode: Mode,

        /// Number of results (overrides the config file)
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// TOML config file
        #[arg(long)]
        config: Option<PathBuf>,

        query: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// catalog only
    Main,
    /// new courses only
    ColdStart,
    /// catalog and new courses in one list
    Merged,
}

/// Interactive session state
enum Step {
    AwaitingQuery,
    Scored(Vec<Recommendation>),
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Build {
            catalog,
            stopwords,
            out,
            config,
        } => cmd_build(&catalog, &stopwords, &out, config.as_deref()),
        Commands::Recommend {
            model,
            catalog,
            new_courses,
            mode,
            top_n,
            config,
            query,
        } => cmd_recommend(
            &model,
            &catalog,
            new_courses.as_deref(),
            mode,
            top_n,
            config.as_deref(),
            query,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> RecommendResult<RecommenderConfig> {
    match path {
        Some(path) => RecommenderConfig::load(path),
        None => Ok(RecommenderConfig::default()),
    }
}

fn cmd_build(catalog: &Path, stopwords: &Path, out: &Path, config: Option<&Path>) -> RecommendResult<()> {
    let start = Instant::now();
    let config = load_config(config)?;
    let catalog = Catalog::load_csv(catalog)?;
    let stopwords = StopwordSet::load(stopwords)?;
    let bundle: ModelBundle<DefaultTfIdfEngine> = build_model(
        &catalog,
        stopwords,
        Arc::new(JiebaSegmenter::new()),
        config.vectorizer,
    )?;
    bundle.save(out)?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "build finished");
    Ok(())
}

fn cmd_recommend(
    model: &Path,
    catalog: &Path,
    new_courses: Option<&Path>,
    mode: Mode,
    top_n: Option<usize>,
    config: Option<&Path>,
    query: Option<String>,
) -> RecommendResult<()> {
    let start = Instant::now();
    let mut config = load_config(config)?.scoring;
    if let Some(n) = top_n {
        config.top_n = n;
    }
    config.validate()?;

    let bundle: ModelBundle<DefaultTfIdfEngine> = ModelBundle::load(model)?;
    let catalog = Catalog::load_csv(catalog)?;
    let context = RecommenderContext::from_bundle(bundle, catalog, Arc::new(JiebaSegmenter::new()))?;
    let new_entries = match new_courses {
        Some(path) => Catalog::load_csv(path)?.entries().to_vec(),
        None => {
            if mode == Mode::ColdStart {
                warn!("cold-start mode without --new-courses, results will be empty");
            }
            Vec::new()
        }
    };
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "resources loaded");

    match query {
        Some(query) => {
            let recs = run_query(&context, &query, mode, &new_entries, &config)?;
            print_recommendations(&recs);
            Ok(())
        }
        None => run_interactive(&context, mode, &new_entries, &config),
    }
}

fn run_query(
    context: &RecommenderContext,
    query: &str,
    mode: Mode,
    new_entries: &[CatalogEntry],
    config: &ScoringConfig,
) -> RecommendResult<Vec<Recommendation>> {
    let candidates = match mode {
        Mode::Main => Candidates::Catalog,
        Mode::ColdStart => Candidates::ColdStart(new_entries),
        Mode::Merged => Candidates::Merged(new_entries),
    };
    let t0 = Instant::now();
    let recs = context.recommend_candidates(query, candidates, config)?;
    info!(elapsed_us = t0.elapsed().as_micros() as u64, "query scored");
    Ok(recs)
}

fn print_recommendations(recs: &[Recommendation]) {
    if recs.is_empty() {
        eprintln!("no recommendations");
    }
    for rec in recs {
        println!("{rec}");
    }
}

fn run_interactive(
    context: &RecommenderContext,
    mode: Mode,
    new_entries: &[CatalogEntry],
    config: &ScoringConfig,
) -> RecommendResult<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut step = Step::AwaitingQuery;
    loop {
        step = match step {
            Step::AwaitingQuery => {
                print!("Query> ");
                stdout.flush()?;
                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 {
                    break;
                }
                let trimmed = line.trim();
                if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
                    break;
                }
                if trimmed.is_empty() {
                    eprintln!("please describe what you are looking for");
                    Step::AwaitingQuery
                } else {
                    Step::Scored(run_query(context, trimmed, mode, new_entries, config)?)
                }
            }
            Step::Scored(recs) => {
                print_recommendations(&recs);
                Step::AwaitingQuery
            }
        };
    }
    info!("bye");
    Ok(())
}
