use std::io::stdout;

use clap::Parser as _;
use crossterm::{
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
};

mod app;
mod cli;
mod logging;
mod manifest;

use app::App;
use cli::CliArgs;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = args.load_config()?;
    let logging = logging::setup(&config)?;
    let log_path = config.log_path.clone();
    tracing::info!("Starting cardfield");

    let terminal = ratatui::init();
    let size = terminal.size()?;
    execute!(stdout(), EnableMouseCapture, EnableFocusChange)?;

    let result = App::new(config, size.width, size.height).run(terminal);

    let cleanup = execute!(stdout(), DisableFocusChange, DisableMouseCapture);
    ratatui::restore();
    if logging {
        println!("Logs written to {}", log_path.display());
    }
    result?;
    cleanup?;
    Ok(())
}
