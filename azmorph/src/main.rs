use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::Context;
use azmorph_lib::dataset::{prepare_examples, read_gold, write_jsonl};
use azmorph_lib::normalize::normalize;
use azmorph_lib::output::{sentence_to_tagged, to_tagged, AnalysisRecord};
use azmorph_lib::{Analyzer, AnalyzerConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "azmorph", about = "Azerbaijani morphological analyser")]
struct Cli {
    /// Text to analyse. If omitted, reads from stdin.
    input: Option<String>,

    /// Directory with roots.json, affixes.json, rules.json and the optional
    /// dictionary.json, model.json and tag_vocab.json.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// JSON config file naming each table. Takes precedence over --data-dir.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output root+TAG form instead of JSON records.
    #[arg(long)]
    tagged: bool,

    /// Show every segmentation candidate per token, not just the chosen one.
    #[arg(long)]
    all: bool,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,

    /// Gold corpus (JSON array of {word, analysis}); writes disambiguation
    /// training examples as JSONL to stdout and exits.
    #[arg(long)]
    gold: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => AnalyzerConfig::from_path(path)?,
        None => AnalyzerConfig::from_data_dir(&cli.data_dir),
    };
    let analyzer = Analyzer::from_config(&cfg).context("failed to load analyser data")?;
    log::debug!("{analyzer:?}");

    if let Some(path) = &cli.gold {
        let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        let gold = read_gold(BufReader::new(file))?;
        let examples = prepare_examples(&analyzer, gold);
        write_jsonl(BufWriter::new(io::stdout().lock()), &examples)?;
        return Ok(());
    }

    match &cli.input {
        Some(text) => process_line(text, &analyzer, &cli)?,
        None => {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = line.context("failed to read stdin")?;
                if !line.trim().is_empty() {
                    process_line(&line, &analyzer, &cli)?;
                }
            }
        }
    }
    Ok(())
}

fn process_line(line: &str, analyzer: &Analyzer, cli: &Cli) -> anyhow::Result<()> {
    if cli.all {
        for token in normalize(line) {
            let candidates = analyzer.segment(&token);
            if cli.tagged {
                let forms: Vec<String> = candidates.iter().map(to_tagged).collect();
                println!("{token}: {}", forms.join(" | "));
            } else {
                let value = serde_json::json!({ "token": token, "candidates": candidates });
                print_json(&value, cli.pretty)?;
            }
        }
        return Ok(());
    }

    let analyses = analyzer.analyze_text(line);
    if cli.tagged {
        println!("{}", sentence_to_tagged(&analyses));
    } else {
        let records: Vec<AnalysisRecord> = analyses.iter().map(AnalysisRecord::from).collect();
        print_json(&records, cli.pretty)?;
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    println!("{}", json.context("JSON serialization failed")?);
    Ok(())
}
