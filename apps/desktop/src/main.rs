mod commands;
mod controllers;
mod models;
mod terminal;
mod views;
mod widgets;

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
    rc::Rc,
};

use anyhow::{Context, Result};
use clap::Parser;
use mvc_core::{load_settings, load_settings_from, ActionArgs, App, MvcResult, MvcSettings, Toolkit};
use tracing_subscriber::EnvFilter;

use crate::{
    controllers::{DlgController, EmpController, HomeController},
    terminal::Terminal,
    views::{DlgView, EmpEditView, EmpView, HomeView},
};

#[derive(Parser, Debug)]
struct Args {
    /// Replay commands from a file instead of reading stdin.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Settings file; defaults to mvc.toml in the working directory.
    #[arg(long)]
    config: Option<PathBuf>,
}

pub(crate) fn build_app(settings: MvcSettings, terminal: Rc<Terminal>) -> MvcResult<App> {
    App::builder(settings, terminal as Rc<dyn Toolkit>)
        .controller::<HomeController>()
        .controller::<EmpController>()
        .controller::<DlgController>()
        .view::<HomeView>()
        .view::<EmpView>()
        .partial::<EmpEditView>()
        .view::<DlgView>()
        .build()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings()?,
    };
    let (input, echo): (Box<dyn BufRead>, bool) = match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script '{}'", path.display()))?;
            (Box::new(BufReader::new(file)), true)
        }
        None => (Box::new(BufReader::new(io::stdin())), false),
    };

    let terminal = Terminal::new(input, echo);
    let app = build_app(settings, Rc::clone(&terminal)).context("failed to register views")?;
    app.run_default(ActionArgs::none())
        .context("failed to start the default controller")?;
    tracing::info!(windows = terminal.windows().len(), "session ended");
    Ok(())
}
