use clap::Parser;
use log::{error, info};

use subdue::discovery;
use subdue::graph::io;
use subdue::parameters::Parameters;

/// Subdue: discovers recurring patterns in an attributed graph by
/// approximate beam search, optionally compressing the graph with the
/// best pattern found and repeating.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input graph, in the vertex/edge JSON array format.
    input_file: String,

    #[command(flatten)]
    parameters: Parameters,
}

fn output_prefix(input_file: &str) -> String {
    input_file.strip_suffix(".json").unwrap_or(input_file).to_string()
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    info!("Command line arguments: {:?}", args);

    let mut graph = match io::load(&args.input_file) {
        Ok(graph) => graph,
        Err(err) => {
            error!("failed to load {}: {err}", args.input_file);
            std::process::exit(1);
        }
    };

    let mut parameters = args.parameters;
    parameters.resolve_defaults(&graph);
    info!("{:#?}", parameters);

    let prefix = output_prefix(&args.input_file);
    match discovery::run(&mut graph, &parameters, &prefix) {
        Ok(iterations) => {
            for (i, patterns) in iterations.iter().enumerate() {
                println!("Iteration {}: {} pattern(s)", i + 1, patterns.len());
                for pattern in patterns {
                    println!(
                        "  value={:.4} instances={} edges={}",
                        pattern.value,
                        pattern.instances.len(),
                        pattern.definition.num_edges()
                    );
                }
            }
        }
        Err(err) => {
            error!("discovery failed: {err}");
            std::process::exit(1);
        }
    }
}
