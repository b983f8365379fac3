//! Command execution for the clone-recall binary.

use std::time::Instant;

use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};
use tracing::info;

use clone_recall::core::config::EvaluationConfig;
use clone_recall::core::errors::EvalError;
use clone_recall::engine::{EvaluationSettings, RecallEvaluator};
use clone_recall::io::report::ReportWriter;
use clone_recall::io::store::{CloneStore, InMemoryStore};
use clone_recall::matchers::{MatcherRegistry, MatcherSpec};

use crate::cli::args::EvaluateArgs;
use crate::cli::config_layer::layered_config;

/// Evaluate one tool and write its report
pub fn evaluate_command(args: &EvaluateArgs) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = layered_config(args)?;
    let store = InMemoryStore::open(&args.store)?;

    if store.tool(args.tool)?.is_none() {
        return Err(EvalError::UnknownTool { id: args.tool }.into());
    }

    let registry = MatcherRegistry::builtin();
    let matcher = MatcherSpec::parse(&config.matcher)?.load(&registry, args.tool)?;

    let settings = EvaluationSettings::from_config(args.tool, &config);
    let evaluator = RecallEvaluator::new(&store, settings, matcher)?;

    let functionalities = match &config.functionalities {
        Some(ids) => ids.clone(),
        None => store.functionality_ids()?,
    };

    ReportWriter::new(&store, config.min_similarity)?
        .with_functionalities(functionalities)
        .write_to_path(&args.output, &evaluator)?;

    info!(
        "Evaluation of tool {} finished in {:.2}s",
        args.tool,
        start.elapsed().as_secs_f64()
    );
    println!(
        "{} {}",
        "Report written to".green(),
        args.output.display().to_string().bold()
    );
    Ok(())
}

/// Print default configuration in YAML format
pub fn print_default_config() -> anyhow::Result<()> {
    println!("{}", "# Default clone-recall configuration".dimmed());
    println!(
        "{}",
        "# Save this to a file and customize as needed".dimmed()
    );
    println!(
        "{}",
        "# Usage: clone-recall evaluate <TOOL> --store <FILE> -o <REPORT> --config your-config.yml"
            .dimmed()
    );
    println!();

    let yaml_output = serde_yaml::to_string(&EvaluationConfig::default())?;
    println!("{yaml_output}");
    Ok(())
}

#[derive(Tabled)]
struct MatcherRow {
    #[tabled(rename = "Strategy")]
    strategy: String,
    #[tabled(rename = "Configuration")]
    configuration: &'static str,
}

fn configuration_help(strategy: &str) -> &'static str {
    match strategy {
        "CoverageMatcher" => "[threshold in (0,1], default 0.7] [union|pairwise]",
        _ => "",
    }
}

/// List available clone matchers
pub fn list_matchers() -> anyhow::Result<()> {
    let rows: Vec<MatcherRow> = MatcherRegistry::builtin()
        .names()
        .into_iter()
        .map(|strategy| MatcherRow {
            configuration: configuration_help(&strategy),
            strategy,
        })
        .collect();

    println!("{}", "Available clone matchers".bold());
    println!("{}", Table::new(rows).with(TableStyle::rounded()));
    Ok(())
}
