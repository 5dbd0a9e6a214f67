use std::io::{self, BufRead};
use std::sync::Arc;

use clap::ArgMatches;
use tracing::{error, info, warn};

use inlay_core::commands::handler;
use inlay_core::config;
use inlay_core::display::correlate;
use inlay_core::display::event_loop;
use inlay_core::display::overlay::Overlay;
use inlay_core::display::server::DisplayServer;
use inlay_core::display::types::PixelOrigin;
use inlay_core::events;
use inlay_core::term;
use inlay_core::term::types::CellMetrics;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    match matches.subcommand() {
        Some(("layer", _sub_matches)) => handle_layer_command(),
        Some(("windows", sub_matches)) => handle_windows_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}

/// Run the overlay until stdin closes.
///
/// Startup order matters: connect (fatal on failure), correlate once, then
/// start the event-loop thread, then consume commands. Shutdown reverses it:
/// tear the overlay down, send the shutdown message, join the thread.
fn handle_layer_command() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config()?;
    let server = Arc::new(DisplayServer::connect()?);

    let correlation = correlate::discover(server.as_ref(), server.root());
    let origin = correlation
        .outcome
        .and_then(|outcome| server.window_origin(outcome.window))
        .unwrap_or(PixelOrigin::new(
            config.overlay.origin_x,
            config.overlay.origin_y,
        ));

    let fallback = CellMetrics::new(config.cell.fallback_width, config.cell.fallback_height);
    let metrics = term::cell_metrics(fallback).unwrap_or_else(|e| {
        warn!(event = "cli.layer.cell_metrics_failed", error = %e);
        fallback
    });

    info!(
        event = "cli.layer.started",
        origin_x = origin.x,
        origin_y = origin.y,
        cell_width = metrics.width,
        cell_height = metrics.height
    );

    let mut overlay = Overlay::new();
    let event_thread = event_loop::spawn(Arc::clone(&server), overlay.slot());

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!(event = "cli.layer.stdin_read_failed", error = %e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        handler::handle_line(&line, server.as_ref(), &mut overlay, metrics, origin);
    }

    events::log_app_shutdown();
    if let Err(e) = overlay.teardown(server.as_ref()) {
        error!(event = "cli.layer.teardown_failed", error = %e);
    }
    server.send_shutdown()?;
    if event_thread.join().is_err() {
        error!(event = "cli.layer.event_thread_panicked");
    }

    Ok(())
}

/// Print the pid-to-window correlation map, plus the correlated terminal
/// window when one was found.
fn handle_windows_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let server = DisplayServer::connect()?;
    let correlation = correlate::discover(&server, server.root());

    let mut entries: Vec<(u32, u32)> = correlation
        .pid_windows
        .iter()
        .map(|(pid, window)| (pid.as_u32(), *window))
        .collect();
    entries.sort_unstable();

    if json_output {
        let windows: Vec<serde_json::Value> = entries
            .iter()
            .map(|(pid, window)| serde_json::json!({ "pid": pid, "window": window }))
            .collect();
        let payload = serde_json::json!({
            "windows": windows,
            "terminal": correlation.outcome,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{:<10} {}", "PID", "WINDOW");
        for (pid, window) in &entries {
            println!("{:<10} 0x{:08x}", pid, window);
        }
        match correlation.outcome {
            Some(outcome) => println!(
                "\nTerminal window: 0x{:08x} (owned by pid {})",
                outcome.window,
                outcome.owner.as_u32()
            ),
            None => println!("\nTerminal window: not found"),
        }
    }

    Ok(())
}
