//! pressforge CLI - build tool for WordPress plugins
//!
//! Usage: pressforge [OPTIONS] [TASK]...
//!
//! Tasks:
//!   translate-<short>  Extract gettext strings into lang/<domain>.pot
//!   minjs-<short>      Minify scripts with source maps
//!   mincss-<short>     Minify stylesheets with source maps
//!   zip-<short>        Package the plugin into dist/ and a dated archive
//!   watch-<short>      Rebuild and reload on change
//!   <prefix>-all       Run one family for every project
//!   default            watch-all plus the live-reload dev server

mod cli;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;
use pressforge::config::{Config, ConfigWarning};
use pressforge::devserver::{open_browser, DevServer};
use pressforge::error::ForgeError;
use pressforge::events::{ConsoleEventSink, EventSink, JsonEventSink};
use pressforge::pipeline::TaskContext;
use pressforge::registry::TaskRegistry;
use pressforge::reload::ReloadHub;
use pressforge::runner::Runner;
use pressforge::watcher;

/// Usage-style failure, e.g. an unknown task name
const EXIT_USAGE: u8 = 2;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let (mut config, warnings) = Config::load_or_default(cli.config.as_deref(), &cwd)?;
    print_config_warnings(&warnings);

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.no_open {
        config.server.open = false;
    }

    let registry = TaskRegistry::build(&config.projects)?;

    if cli.list {
        print_list(&registry, &config, cli.json)?;
        return Ok(ExitCode::SUCCESS);
    }

    let plan = match registry.plan(&cli.requested()) {
        Ok(plan) => plan,
        Err(err @ ForgeError::UnknownTask { .. }) => {
            eprintln!("error: {}", err);
            eprintln!("Run 'pressforge --list' to see available tasks.");
            return Ok(ExitCode::from(EXIT_USAGE));
        }
        Err(err) => return Err(err.into()),
    };

    let events: Arc<dyn EventSink> = if cli.json {
        Arc::new(JsonEventSink::stdout())
    } else {
        Arc::new(ConsoleEventSink::new(cli.verbose))
    };

    // Signals only reach the console when a browser can receive them
    let mut hub = ReloadHub::new(config.server.inject_changes);
    if plan.serve {
        hub = hub.with_events(events.clone());
    }

    let runner = Runner::new(&registry, TaskContext::new(&config, &hub), events.as_ref());
    let report = runner.run_batches(&plan.batches);

    if !plan.watches.is_empty() {
        let server = if plan.serve {
            let server = DevServer::spawn(&config.server, hub.clone(), events.clone())?;
            if config.server.open {
                open_browser(server.url(), events.as_ref());
            }
            Some(server)
        } else {
            None
        };

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        ctrlc::set_handler(move || {
            running_clone.store(false, Ordering::SeqCst);
        })
        .context("failed to set Ctrl+C handler")?;

        watcher::watch(&runner, &plan.watches, running)?;

        if let Some(server) = server {
            server.shutdown();
        }
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_config_warnings(warnings: &[ConfigWarning]) {
    for warning in warnings {
        let location = match warning.line {
            Some(line) => format!("{}:{}", warning.file.display(), line),
            None => warning.file.display().to_string(),
        };
        match &warning.suggestion {
            Some(suggestion) => eprintln!(
                "Warning: Unknown config key '{}' in {}. Did you mean '{}'?",
                warning.key, location, suggestion
            ),
            None => eprintln!(
                "Warning: Unknown config key '{}' in {}",
                warning.key, location
            ),
        }
    }
}

fn print_list(registry: &TaskRegistry, config: &Config, json: bool) -> Result<()> {
    if json {
        let operations: Vec<_> = registry
            .operations()
            .map(|op| {
                serde_json::json!({
                    "name": op.name,
                    "capability": op.capability,
                    "project": config.projects[op.project].shortname,
                    "depends_on": registry.dependencies(&op.name),
                })
            })
            .collect();
        let aggregates: Vec<_> = registry
            .aggregates()
            .map(|(name, members)| serde_json::json!({ "name": name, "members": members }))
            .collect();
        let output = serde_json::json!({
            "event": "list",
            "operations": operations,
            "aggregates": aggregates,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("Tasks:");
    for op in registry.operations() {
        let deps = registry.dependencies(&op.name);
        if deps.is_empty() {
            println!("  {}", op.name);
        } else {
            println!("  {} (after {})", op.name, deps.join(", "));
        }
    }
    println!("\nAggregates:");
    for (name, members) in registry.aggregates() {
        println!("  {} = {}", name, members.join(" "));
    }
    Ok(())
}
