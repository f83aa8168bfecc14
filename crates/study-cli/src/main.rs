//! Interactive chess study session
//!
//! Reads commands from stdin, keeps the board printed in the terminal and
//! saves the study as JSON under `STUDY_DATA_DIR`.

mod commands;
mod surface;

use std::io::{self, BufRead};

use study_core::config::StudyConfig;
use study_core::model::{Study, ROOT_ID};
use study_core::persistence::{JsonFileStore, StudyStore};
use study_core::{Command, ShakmatyOracle, StudySession};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::{parse_line, Input, HELP};
use crate::surface::BoardPrinter;

fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing; stdout is reserved for the board
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let config = StudyConfig::from_env()?;
    let store = JsonFileStore::new(&config.data_dir);

    let saved = match store.load(&config.study_id) {
        Ok(saved) => saved,
        Err(e) => {
            warn!(study_id = %config.study_id, error = %e, "Failed to load saved study");
            println!("Could not open saved study ({e}), starting a new one");
            None
        }
    };
    if saved.is_none() {
        info!(study_id = %config.study_id, "Starting new study");
    }

    let mut session = StudySession::from_config(&config, saved, ShakmatyOracle)?;
    session.attach_surface(Box::new(BoardPrinter::new(config.orientation)));

    for line in io::stdin().lock().lines() {
        let line = line?;
        let input = match parse_line(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };

        match input {
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::Export => println!("{}", session.export_movetext()),
            Input::Fen => println!("{}", session.current_fen()),
            Input::Tree => println!("{}", describe_tree(&session.snapshot())),
            Input::Json => println!("{}", serde_json::to_string_pretty(&session.snapshot())?),
            Input::Save => save(&session, &store, &config.study_id),
            Input::Import(movetext) => {
                if let Err(e) = session.load_movetext(&movetext) {
                    println!("Import failed: {e}");
                }
            }
            Input::AddShape(shape) => {
                let mut shapes = session
                    .state()
                    .current_node()
                    .map(|n| n.shapes().to_vec())
                    .unwrap_or_default();
                shapes.push(shape);
                run(&mut session, &config, Command::SetShapes(shapes));
            }
            Input::Command(command) => run(&mut session, &config, command),
        }
    }

    save(&session, &store, &config.study_id);
    Ok(())
}

fn run(session: &mut StudySession<ShakmatyOracle>, config: &StudyConfig, command: Command) {
    match session.dispatch(command) {
        Ok(true) => {
            if config.show_move_list {
                println!("{}", session.export_movetext());
            }
            if config.show_comments {
                if let Some(text) = session
                    .state()
                    .current_node()
                    .and_then(|n| n.comment())
                    .map(|c| c.plain_text())
                {
                    println!("comment: {text}");
                }
            }
        }
        Ok(false) => println!("(no change)"),
        Err(e) => println!("{e}"),
    }
}

/// Save failures are reported and otherwise ignored.
fn save(session: &StudySession<ShakmatyOracle>, store: &JsonFileStore, study_id: &str) {
    match session.save(store, study_id) {
        Ok(()) => println!("Saved '{study_id}'"),
        Err(e) => {
            error!(study_id = %study_id, error = %e, "Failed to save study");
            println!("Save failed: {e}");
        }
    }
}

/// One line per node: main line, variants indented under their parent.
fn describe_tree(study: &Study) -> String {
    let current = study.current_move.as_deref();
    let marker = |id: &str| if Some(id) == current { "*" } else { " " };

    let mut lines = Vec::new();
    for node in &study.moves {
        let label = if node.move_id == ROOT_ID { "(start)" } else { node.san.as_str() };
        lines.push(format!("{} {:<10} {}", marker(&node.move_id), label, node.move_id));
        for variant in &node.variants {
            for m in &variant.moves {
                lines.push(format!("{}   {:<8} {}", marker(&m.move_id), m.san, m.move_id));
            }
        }
    }
    lines.join("\n")
}
