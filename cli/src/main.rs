use anyhow::{Context, Result};
use cardgrid::card::Card;
use cardgrid::config::Config;
use cardgrid::dispatch::{DraggableKind, DropEvent, DroppableKind};
use cardgrid::registry::{CardRegistry, SharedRegistry};
use cardgrid::session::{QueryResult, Session};
use cardgrid::store::MemoryCardStore;
use cardgrid::zones::ZoneKind;
use colored::Colorize;
use std::io::{self, Write};

#[derive(Debug)]
enum InputError {
    IoError(io::Error),
    TooManyAttempts,
}

impl From<io::Error> for InputError {
    fn from(error: io::Error) -> Self {
        InputError::IoError(error)
    }
}

fn secure_input_loop(prompt: &str, max: usize) -> Result<usize, InputError> {
    const MAX_ATTEMPTS: usize = 3;
    const MAX_INPUT_LENGTH: usize = 10;

    for attempt in 1..=MAX_ATTEMPTS {
        print!("{prompt} (0-{max}): ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if input.trim().len() > MAX_INPUT_LENGTH {
            println!("Input too long. Attempt {attempt}/{MAX_ATTEMPTS}");
            continue;
        }

        match input.trim().parse::<usize>() {
            Ok(i) if i <= max => return Ok(i),
            Ok(_) => println!("Must be 0-{max}. Attempt {attempt}/{MAX_ATTEMPTS}"),
            Err(_) => println!("Invalid number. Attempt {attempt}/{MAX_ATTEMPTS}"),
        }
    }

    Err(InputError::TooManyAttempts)
}

fn input_loop(prompt: &str, max: usize) -> usize {
    match secure_input_loop(prompt, max) {
        Ok(value) => value,
        Err(InputError::TooManyAttempts) => {
            println!("Too many invalid attempts. Exiting.");
            std::process::exit(1);
        }
        Err(InputError::IoError(e)) => {
            println!("IO error: {e}. Exiting.");
            std::process::exit(1);
        }
    }
}

fn demo_cards() -> Vec<Card> {
    vec![
        Card::new("bug-101", ["bug", "backend", "urgent"]),
        Card::new("bug-102", ["bug", "frontend"]),
        Card::new("bug-103", ["bug", "backend"]),
        Card::new("feat-201", ["feature", "backend"]),
        Card::new("feat-202", ["feature", "frontend", "urgent"]),
        Card::new("chore-301", ["chore", "frontend"]),
    ]
}

fn load_cards() -> Result<Vec<Card>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let data = std::fs::read_to_string(&path)
                .with_context(|| format!("reading card file {path}"))?;
            serde_json::from_str(&data).with_context(|| format!("parsing card file {path}"))
        }
        None => Ok(demo_cards()),
    }
}

fn print_result(result: &QueryResult) {
    let source = if result.cache_hit { "cache" } else { "pipeline" };
    println!(
        "\n{} {} cards in {:.2}ms ({source})",
        "matrix:".bold(),
        result.total,
        result.operation_time_ms
    );

    let col_header = if result.axes.col.is_empty() {
        "(all)".to_string()
    } else {
        result.axes.col.join(" | ")
    };
    println!("        columns: {}", col_header.cyan());

    for (r, row) in result.matrix.iter().enumerate() {
        let label = result
            .axes
            .row
            .get(r)
            .cloned()
            .unwrap_or_else(|| "(all)".to_string());
        print!("  {:>12} ", label.green());
        for cell in row {
            let ids: Vec<&str> = cell.iter().map(|id| id.as_str()).collect();
            print!("[{}] ", ids.join(", "));
        }
        println!();
    }
}

fn print_zones(session: &Session<MemoryCardStore>, tag_names: &[String]) {
    println!("\n{}", "zones:".bold());
    for kind in [
        ZoneKind::Intersection,
        ZoneKind::Exclusion,
        ZoneKind::Difference,
        ZoneKind::Union,
        ZoneKind::Row,
        ZoneKind::Column,
    ] {
        let names: Vec<&str> = session
            .tags_in_play()
            .tags_in(&kind)
            .iter()
            .map(|t| tag_names[*t as usize].as_str())
            .collect();
        println!("  {:>12}: {}", kind.to_string().yellow(), names.join(", "));
    }
}

fn pick_tag(tag_names: &[String]) -> Option<String> {
    println!("\nSelect tag:");
    println!("[0] Cancel");
    for (i, name) in tag_names.iter().enumerate() {
        println!("[{}] {name}", i + 1);
    }
    let index = input_loop("Enter tag", tag_names.len());
    if index == 0 {
        None
    } else {
        Some(tag_names[index - 1].clone())
    }
}

const ZONE_NAMES: [&str; 6] = [
    "intersection",
    "exclusion",
    "difference",
    "union",
    "row",
    "column",
];

fn pick_zone() -> Option<&'static str> {
    println!("\nSelect zone:");
    println!("[0] Cancel");
    for (i, name) in ZONE_NAMES.iter().enumerate() {
        println!("[{}] {name}", i + 1);
    }
    let index = input_loop("Enter zone", ZONE_NAMES.len());
    if index == 0 {
        None
    } else {
        Some(ZONE_NAMES[index - 1])
    }
}

fn session_loop(session: &mut Session<MemoryCardStore>, tag_names: Vec<String>) {
    loop {
        println!("\n{}", "Select action:".bold());
        println!("[0] Quit");
        println!("[1] Show zones and matrix");
        println!("[2] Move tag to zone");
        println!("[3] Move tag back to cloud");

        match input_loop("Enter choice", 3) {
            0 => return,
            1 => {
                print_zones(session, &tag_names);
                match session.evaluate() {
                    Ok(result) => print_result(&result),
                    Err(e) => println!("{} {e}", "error:".red()),
                }
            }
            2 => {
                let Some(tag) = pick_tag(&tag_names) else {
                    continue;
                };
                let Some(zone) = pick_zone() else { continue };
                let event = DropEvent::new(DraggableKind::Tag, tag, DroppableKind::Zone, zone);
                match session.dispatch(&event) {
                    Ok(outcome) => {
                        if let Some(result) = outcome.result {
                            print_result(&result);
                        } else {
                            println!("No change.");
                        }
                    }
                    Err(e) => println!("{} {e}", "rejected:".red()),
                }
            }
            3 => {
                let Some(tag) = pick_tag(&tag_names) else {
                    continue;
                };
                let event = DropEvent::new(DraggableKind::Tag, tag, DroppableKind::TagCloud, "");
                match session.dispatch(&event) {
                    Ok(outcome) => {
                        if let Some(result) = outcome.result {
                            print_result(&result);
                        } else {
                            println!("No change.");
                        }
                    }
                    Err(e) => println!("{} {e}", "rejected:".red()),
                }
            }
            _ => unreachable!("input_loop bounds choices"),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cards = load_cards()?;
    let shared = SharedRegistry::new();
    let registry = shared.publish(CardRegistry::build(cards.clone(), &Config::default())?);
    let tag_names: Vec<String> = registry.dictionary().names().map(str::to_string).collect();

    println!(
        "Loaded {} cards, {} tags.",
        registry.count(),
        tag_names.len()
    );

    let mut session = Session::new(
        "cli",
        Config::default(),
        shared,
        MemoryCardStore::from_cards(cards),
    );
    session_loop(&mut session, tag_names);
    Ok(())
}
