//! Answer Benchmark CLI
//!
//! Measures latency and keyword quality of a command-line question
//! answering program, and reports on the results.
//!
//! ## Quick Start
//!
//! ```bash
//! # Default question list against ./main router
//! ./answer-benchmark run
//!
//! # Custom questions with rule traces enabled
//! ./answer-benchmark run --questions ./questions.json --debug
//!
//! # One question per category
//! ./answer-benchmark genre --compact
//!
//! # Reports
//! ./answer-benchmark export-csv --input benchmark_results.json --output results/benchmark_results.csv
//! ./answer-benchmark compare --inputs results/v1 results/v2 --labels before after
//! ```
//!
//! ## Configuration
//!
//! The answer source and pacing are configured in `bench.toml`. Without
//! the file the defaults drive `./main router <question>`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use answer_benchmark::answer::build_source;
use answer_benchmark::benchmark::{category_run_mode, BenchmarkRunner, RunOptions, RunRecord};
use answer_benchmark::config::{BenchConfig, DEFAULT_CONFIG_FILE};
use answer_benchmark::questions::{self, CategorySet, QuestionSet};
use answer_benchmark::report::compare::{
    input_label, latest_result_dirs, load_runs, load_summary, resolve_labels, write_comparison,
    Comparison, DEFAULT_COMPARISON_DIR, DEFAULT_RESULTS_ROOT,
};
use answer_benchmark::report::summary::{default_summary_dir, write_summary};
use answer_benchmark::report::table::{rows_from_record, write_rows};
use answer_benchmark::wiki::{self, WikiClient};

#[derive(Parser)]
#[command(name = "answer-benchmark")]
#[command(about = "Latency and keyword-quality benchmark for question answering programs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark over a question list
    ///
    /// The Run Record is rewritten after every question.
    Run {
        /// Ask the answer program for rule traces
        #[arg(short, long)]
        debug: bool,

        /// Output file for the Run Record (JSON)
        #[arg(short, long, default_value = "benchmark_results.json")]
        output: PathBuf,

        /// Question file (JSON); falls back to the built-in list
        #[arg(short, long)]
        questions: Option<PathBuf>,

        /// Path to config file (TOML)
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Run the category question map
    ///
    /// Questions are shuffled once; `--compact` asks only the first question
    /// of each category, in category order.
    Genre {
        /// One question per category, unshuffled
        #[arg(long)]
        compact: bool,

        /// Category file (JSON); falls back to the built-in map
        #[arg(short, long)]
        questions: Option<PathBuf>,

        /// Output file (default: timestamped file in the results directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for a reproducible question order
        #[arg(long)]
        seed: Option<u64>,

        /// Pause between questions in milliseconds (default from config)
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Ask the answer program for rule traces
        #[arg(short, long)]
        debug: bool,

        /// Path to config file (TOML)
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Convert a Run Record into the per-question CSV table
    ExportCsv {
        /// Run Record (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// CSV file to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write summary statistics for one run
    Summary {
        /// CSV table or Run Record (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for summary.md (default: next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare several runs
    ///
    /// Without inputs, the two most recent benchmark/results/20* directories
    /// are compared.
    Compare {
        /// Result directories, CSV tables or Run Records
        #[arg(long, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// One label per input
        #[arg(long, num_args = 1..)]
        labels: Vec<String>,

        /// Output directory for comparison_summary.md
        #[arg(short, long, default_value = DEFAULT_COMPARISON_DIR)]
        output: PathBuf,
    },

    /// Validate a question file
    ValidateQuestions {
        /// Question file (JSON); the built-in set when omitted
        #[arg(short, long)]
        questions: Option<PathBuf>,

        /// Treat the file as a category map
        #[arg(long)]
        categories: bool,
    },

    /// Extract lead paragraphs of random Wikipedia articles
    Wiki {
        /// Number of articles
        #[arg(long, default_value = "100")]
        count: usize,

        /// Wikipedia language
        #[arg(long, default_value = "ja")]
        lang: String,

        /// Annotated output (title, intro, URL)
        #[arg(long, default_value = "wikipedia_intros.txt")]
        output: PathBuf,

        /// Plain output (intros only)
        #[arg(long, default_value = "wikipedia_plain.txt")]
        plain: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            debug,
            output,
            questions,
            config,
        } => {
            run_benchmark(&config, questions.as_deref(), &output, debug).await?;
        }

        Commands::Genre {
            compact,
            questions,
            output,
            seed,
            delay_ms,
            debug,
            config,
        } => {
            run_genre_benchmark(&config, questions.as_deref(), output, compact, seed, delay_ms, debug)
                .await?;
        }

        Commands::ExportCsv { input, output } => {
            export_csv(&input, &output)?;
        }

        Commands::Summary { input, output } => {
            summarize(&input, output)?;
        }

        Commands::Compare {
            inputs,
            labels,
            output,
        } => {
            compare(inputs, &labels, &output)?;
        }

        Commands::ValidateQuestions {
            questions,
            categories,
        } => {
            validate_questions(questions.as_deref(), categories)?;
        }

        Commands::Wiki {
            count,
            lang,
            output,
            plain,
        } => {
            extract_wikipedia(count, &lang, &output, &plain).await?;
        }
    }

    Ok(())
}

/// Run the flat question list
async fn run_benchmark(
    config_path: &Path,
    questions_path: Option<&Path>,
    output: &Path,
    debug: bool,
) -> Result<()> {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                   ANSWER BENCHMARK                           ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let config = BenchConfig::load_or_default(config_path)?;
    let question_set = QuestionSet::load_or_default(questions_path)?;
    println!("Loaded {} questions", question_set.len());

    let source = build_source(&config.source)?;
    let options = RunOptions::new(output)
        .with_debug(debug)
        .with_preview_chars(config.run.preview_chars);

    BenchmarkRunner::new(source.as_ref(), options)
        .run(&question_set.questions)
        .await?;

    Ok(())
}

/// Run the category map, full and shuffled or compact
async fn run_genre_benchmark(
    config_path: &Path,
    questions_path: Option<&Path>,
    output: Option<PathBuf>,
    compact: bool,
    seed: Option<u64>,
    delay_ms: Option<u64>,
    debug: bool,
) -> Result<()> {
    let mode = category_run_mode(compact);

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 CATEGORY BENCHMARK ({:7})                 ║", mode);
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let config = BenchConfig::load_or_default(config_path)?;
    let category_set = CategorySet::load_or_default(questions_path)?;

    let questions = if compact {
        category_set.compact()
    } else {
        let mut all = category_set.flatten();
        questions::shuffle(&mut all, seed);
        all
    };
    println!(
        "{} categories, {} questions selected",
        category_set.categories.len(),
        questions.len()
    );

    let source = build_source(&config.source)?;
    let options = RunOptions::category_run(
        &config.run,
        compact,
        output,
        delay_ms,
        chrono::Local::now().naive_local(),
    )
    .with_debug(debug);

    BenchmarkRunner::new(source.as_ref(), options)
        .run(&questions)
        .await?;

    Ok(())
}

/// Run Record → CSV table
fn export_csv(input: &Path, output: &Path) -> Result<()> {
    let record = RunRecord::load(input)?;
    let rows = rows_from_record(&record);
    write_rows(output, &rows)?;

    println!("✓ Exported {} rows to {:?}", rows.len(), output);
    println!("  Scores rescaled from keyword ratio (0-1) to 0-10");
    Ok(())
}

/// summary.md for one CSV table or Run Record
fn summarize(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let summary = load_summary(input, &input_label(input))?;
    let dir = output.unwrap_or_else(|| default_summary_dir(input));
    let path = write_summary(&dir, &summary)?;

    println!("Questions:          {}", summary.count);
    println!(
        "Response time (s):  mean {:.2}  min {:.2}  max {:.2}",
        summary.mean_time, summary.min_time, summary.max_time
    );
    println!(
        "Score:              mean {}  min {}  max {}",
        summary.score_scale.format(summary.mean_score),
        summary.score_scale.format(summary.min_score),
        summary.score_scale.format(summary.max_score)
    );
    println!("Mean length:        {:.0} chars", summary.mean_length);
    println!("\nSummary saved to {:?}", path);
    Ok(())
}

/// comparison_summary.md across runs
fn compare(inputs: Vec<PathBuf>, labels: &[String], output: &Path) -> Result<()> {
    let inputs = if inputs.is_empty() {
        let latest = latest_result_dirs(Path::new(DEFAULT_RESULTS_ROOT), 2)?;
        println!("Comparing the latest results: {:?}", latest);
        latest
    } else {
        inputs
    };

    let labels = resolve_labels(&inputs, labels);
    let runs = load_runs(&inputs, &labels)?;
    let comparison = Comparison::from_runs(runs)?;

    println!("\n┌─ COMPARISON ──────────────────────────────────────────────────────────┐");
    println!(
        "{:30} {:>12} {:>14} {:>12}",
        "Run", "Mean time", "Mean score", "Mean length"
    );
    println!("{}", "─".repeat(72));
    for run in &comparison.runs {
        let s = &run.summary;
        println!(
            "{:30} {:>11.2}s {:>14} {:>12.0}",
            s.label,
            s.mean_time,
            s.score_scale.format(s.mean_score),
            s.mean_length
        );
    }

    let latency = &comparison.latency;
    println!(
        "\n  Fastest: {}  Slowest: {}  (Δ {:.2}s)",
        comparison.runs[latency.low].summary.label,
        comparison.runs[latency.high].summary.label,
        latency.diff
    );

    let path = write_comparison(output, &comparison)?;
    println!("\nComparison saved to {:?}", path);
    Ok(())
}

/// Validate a question file
fn validate_questions(path: Option<&Path>, categories: bool) -> Result<()> {
    let keywords = QuestionSet::builtin()?.keyword_table();

    let set = match (path, categories) {
        (Some(path), true) => {
            println!("Validating {:?}...", path);
            flattened(CategorySet::load(path, &keywords)?)
        }
        (Some(path), false) => {
            println!("Validating {:?}...", path);
            QuestionSet::load(path, &keywords)?
        }
        (None, true) => flattened(CategorySet::builtin()?),
        (None, false) => QuestionSet::builtin()?,
    };

    if set.is_empty() {
        anyhow::bail!("Question file has no questions");
    }

    println!("✓ Valid question file");
    println!("  Name: {}", set.metadata.name);
    println!("  Description: {}", set.metadata.description);
    println!("  Questions: {}", set.len());

    let without_keywords = set.without_keywords();
    if without_keywords > 0 {
        println!("  ⚠ {} questions have no expected keywords (always score 0)", without_keywords);
    }

    if categories {
        println!("  Categories:");
        for (category, count) in questions::category_counts(&set.questions) {
            println!("    {}: {}", category, count);
        }
    }

    Ok(())
}

fn flattened(set: CategorySet) -> QuestionSet {
    QuestionSet {
        questions: set.flatten(),
        metadata: set.metadata,
    }
}

/// Save lead paragraphs of random articles
async fn extract_wikipedia(count: usize, lang: &str, output: &Path, plain: &Path) -> Result<()> {
    eprintln!("Fetching {} random articles from {}.wikipedia.org...", count, lang);

    let client = WikiClient::new(lang)?;
    let articles = client.collect_articles(count).await;

    wiki::save_annotated(output, &articles)?;
    println!("Saved {} articles to {:?}", articles.len(), output);
    wiki::save_plain(plain, &articles)?;
    println!("Saved {} intros to {:?}", articles.len(), plain);

    Ok(())
}
