use std::path::PathBuf;

use clap::Parser;

/// pressforge - build tool for WordPress plugins
#[derive(Parser, Debug)]
#[command(name = "pressforge")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Run 'pressforge' without tasks to watch every project and start the live-reload server.")]
pub struct Cli {
    /// Tasks or aggregates to run (e.g. zip-iwm, minjs-all); defaults to 'default'
    #[arg(value_name = "TASK")]
    pub tasks: Vec<String>,

    /// Config file (defaults to ./pressforge.toml, then the built-in table)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// List registered tasks and aggregates, then exit
    #[arg(long)]
    pub list: bool,

    /// Output format for CI
    #[arg(long)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Do not open a browser when the dev server starts
    #[arg(long)]
    pub no_open: bool,

    /// Dev server port
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,
}

impl Cli {
    /// Requested task names, `default` when none were given
    pub fn requested(&self) -> Vec<String> {
        if self.tasks.is_empty() {
            vec![pressforge::registry::DEFAULT_TASK.to_string()]
        } else {
            self.tasks.clone()
        }
    }
}
