use clap::Parser;
use screen_explorer::cli::commands::{cmd_explore, cmd_inspect};
use screen_explorer::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref());

    // Resolve Ollama settings: CLI > config file
    if let Some(endpoint) = cli.ollama_endpoint {
        config.ollama.endpoint = Some(endpoint);
    }
    if let Some(model) = cli.ollama_model {
        config.ollama.model = Some(model);
    }

    match cli.command {
        Commands::Explore {
            scenario,
            goal,
            max_steps,
            decider,
            snapshot,
            trace,
        } => cmd_explore(
            &scenario,
            &goal,
            max_steps,
            &decider,
            snapshot.as_deref(),
            trace.as_deref(),
            &config.explore,
            &config.ollama,
            cli.verbose,
        ),
        Commands::Inspect { snapshot } => cmd_inspect(&snapshot),
    }
}
