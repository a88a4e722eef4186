use crate::cli::config::{ExploreConfig, OllamaConfig, build_loop_config};
use crate::decision::decider::{Decider, HeuristicDecider};
use crate::decision::ollama::OllamaDecider;
use crate::explore::observer::ConsoleObserver;
use crate::explore::session::ExplorationLoop;
use crate::explore::simulated::{ScenarioApp, SimulatedTarget};
use crate::graph::export::{GraphSnapshot, to_diagram};
use crate::trace::logger::TraceObserver;

// ============================================================================
// explore subcommand
// ============================================================================

pub fn cmd_explore(
    scenario_path: &str,
    goal: &str,
    max_steps: u32,
    decider_name: &str,
    snapshot_path: Option<&str>,
    trace_path: Option<&str>,
    config: &ExploreConfig,
    ollama: &OllamaConfig,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = ScenarioApp::from_file(scenario_path)?;
    let mut target = SimulatedTarget::new(app);

    let decider = build_decider(decider_name, ollama)?;
    let loop_config = build_loop_config(config, max_steps);

    if verbose > 0 {
        eprintln!(
            "Exploring {} (max_steps={}, decider={})...",
            scenario_path, max_steps, decider_name
        );
    }

    let mut session = ExplorationLoop::new(loop_config, decider);
    session.add_observer(Box::new(ConsoleObserver {
        verbose: verbose > 0,
    }));
    if let Some(path) = trace_path {
        session.add_observer(Box::new(TraceObserver::new(path)));
    }

    let result = session.run(&mut target, goal);

    print!("{}", result.summary());
    println!();
    print!("{}", to_diagram(&result.graph));

    if let Some(path) = snapshot_path {
        let snapshot = GraphSnapshot::from_graph(&result.graph);
        std::fs::write(path, snapshot.to_json()?)?;
        println!("\nSnapshot written to {}", path);
    }

    Ok(())
}

// ============================================================================
// inspect subcommand
// ============================================================================

pub fn cmd_inspect(snapshot_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(snapshot_path)?;
    let graph = GraphSnapshot::from_json(&json)?.into_graph();

    let stats = graph.coverage_stats();
    println!(
        "{} screens, {} transitions, {:.0}% coverage, avg depth {:.1}",
        stats.total_screens, stats.total_edges, stats.coverage_percentage, stats.average_depth
    );

    let cycles = graph.find_cycles();
    if !cycles.is_empty() {
        println!("{} cycles detected", cycles.len());
    }

    println!();
    print!("{}", to_diagram(&graph));
    Ok(())
}

// ============================================================================
// Decider selection
// ============================================================================

fn build_decider(
    name: &str,
    ollama: &OllamaConfig,
) -> Result<Box<dyn Decider>, Box<dyn std::error::Error>> {
    match name {
        "heuristic" => Ok(Box::new(HeuristicDecider::new())),
        "ollama" => {
            let mut decider = OllamaDecider::default();
            if let Some(endpoint) = &ollama.endpoint {
                decider.endpoint = endpoint.clone();
            }
            if let Some(model) = &ollama.model {
                decider.model = model.clone();
            }
            Ok(Box::new(decider))
        }
        other => Err(format!("unknown decider '{}' (expected heuristic|ollama)", other).into()),
    }
}
