use clap::Parser;
use phasegraph::graph::validate;
use phasegraph::prelude::*;
use std::fs;

/// Validate an exported course graph snapshot and preview the save plan
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the edited graph snapshot JSON file
    snapshot_path: String,
    /// Optional path to the last persisted snapshot JSON file (defaults to an
    /// empty graph, i.e. a course that was never saved)
    baseline_path: Option<String>,

    /// Course identifier to print in the plan
    #[arg(short, long, default_value = "course")]
    course: String,
}

fn main() {
    let cli = Cli::parse();

    let current = load_snapshot(&cli.snapshot_path);
    let persisted = cli
        .baseline_path
        .as_deref()
        .map(load_snapshot)
        .unwrap_or_default();

    println!(
        "Loaded snapshot: {} phases, {} student-flow edges, {} data-flow edges",
        current.phases.len(),
        current.student_flow.len(),
        current.data_flow.len()
    );

    if let Err(rejection) = validate::check_snapshot(&current) {
        exit_with_error(&format!("snapshot is structurally invalid: {}", rejection));
    }
    println!("Snapshot is structurally valid.");

    let graph = CourseGraph::from_snapshots(cli.course.clone(), current, persisted);
    let plan = SavePlan::compute(&graph);

    if plan.is_empty() {
        println!("\nNothing to save: snapshot matches the baseline.");
        return;
    }

    println!("\n--- Save Plan for '{}' ---", cli.course);
    for id in &plan.deletions {
        println!("delete  {}", id);
    }
    for spec in &plan.creations {
        println!(
            "create  '{}' (type {}{})",
            spec.name,
            spec.phase_type_id,
            if spec.is_initial { ", initial" } else { "" }
        );
    }
    for (id, name) in &plan.renames {
        println!("rename  {} -> '{}'", id, name);
    }
    println!("replace student-flow, phase-data and participation-data graphs");
    println!(
        "{} deletions, {} creations, {} renames",
        plan.deletions.len(),
        plan.creations.len(),
        plan.renames.len()
    );
}

fn load_snapshot(path: &str) -> GraphSnapshot {
    let json = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read '{}': {}", path, e)));
    serde_json::from_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse '{}': {}", path, e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
