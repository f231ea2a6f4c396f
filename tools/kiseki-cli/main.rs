use clap::{Parser, ValueEnum};
use kiseki::prelude::*;
use rand::Rng;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Output formats for the recorded trace.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Runs a node graph and prints its visualization trace
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the graph JSON file exported by the editor
    graph_path: String,

    /// Initial array as comma-separated numbers, e.g. `5,3,8,1`
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    array: Option<Vec<f64>>,

    /// Generate a random initial array of this length instead of `--array`
    #[arg(short, long, conflicts_with = "array")]
    random: Option<usize>,

    /// Abort the run after this many steps
    #[arg(short, long)]
    max_steps: Option<usize>,

    /// How to print the trace
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Only validate the graph, do not run it
    #[arg(long)]
    validate_only: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        exit_with_error(&e.to_string());
    }
}

fn run(cli: Cli) -> Result<()> {
    let load_start = Instant::now();
    let json = fs::read_to_string(&cli.graph_path)
        .map_err(|e| format!("Failed to read graph file '{}': {}", cli.graph_path, e))?;
    let graph = RawGraph::from_json(&json)?.into_graph()?;
    let load_duration = load_start.elapsed();

    let report = validate(&graph);
    for warning in &report.warnings {
        eprintln!("warning: {}", describe_issue(warning));
    }
    for error in &report.errors {
        eprintln!("error: {}", describe_issue(error));
    }
    if !report.is_valid {
        return Err(format!("Graph has {} validation error(s)", report.errors.len()).into());
    }
    if cli.validate_only {
        println!(
            "Graph is valid ({} nodes, {} connections, {} warnings)",
            graph.nodes.len(),
            graph.connections.len(),
            report.warnings.len()
        );
        return Ok(());
    }

    let initial_array = match (cli.array, cli.random) {
        (Some(array), _) => array,
        (None, Some(len)) => random_array(len),
        (None, None) => vec![5.0, 3.0, 8.0, 1.0, 9.0, 2.0],
    };

    let mut builder = Engine::builder(graph, initial_array);
    if let Some(limit) = cli.max_steps {
        builder = builder.with_step_limit(limit);
    }
    let engine = builder.build();

    let run_start = Instant::now();
    let outcome = engine.execute();
    let run_duration = run_start.elapsed();

    match cli.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome)
                .map_err(|e| format!("Failed to serialize trace: {}", e))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("{}", TraceFormatter::format_trace(&outcome.steps));
            println!("\n--- Run Summary ---");
            println!("Steps recorded:   {}", outcome.steps.len());
            println!("Completed:        {}", outcome.completed);
            if let Some(error) = &outcome.error {
                println!("Error:            {}", error);
            }
            println!("Final array:      {:?}", outcome.final_array);
            println!("Graph loading:    {:?}", load_duration);
            println!("Execution:        {:?}", run_duration);
        }
    }
    Ok(())
}

fn random_array(len: usize) -> Vec<f64> {
    let mut rng = rand::rng();
    (0..len).map(|_| rng.random_range(1..=99) as f64).collect()
}

fn describe_issue(issue: &kiseki::graph::ValidationIssue) -> String {
    match &issue.node_id {
        Some(id) => format!("[{}] {}", id, issue.message),
        None => issue.message.clone(),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
