//! Binary entry point: resolve settings, bring up the async runtime and either
//! run a one-shot subcommand or the Ratatui event loop.
use std::io;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use teacher_desk::cli::{run_command, Cli};
use teacher_desk::config::load_settings;
use teacher_desk::logging::{init_logging, LogTarget};
use teacher_desk::{run_app, App, Route, TeacherClient};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    cli.apply_overrides(&mut settings);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let client = Arc::new(TeacherClient::new(
        &settings.base_url,
        settings.request_timeout(),
    )?);

    match cli.command {
        Some(command) => {
            init_logging(LogTarget::Stderr)?;
            let mut stdout = io::stdout().lock();
            runtime.block_on(run_command(&client, command, &settings.export_dir, &mut stdout))
        }
        None => {
            init_logging(LogTarget::File(&settings.log_file))?;
            info!(base_url = %client.base_url(), "starting teacher-desk");
            let mut app = App::new(
                Arc::clone(&client),
                runtime.handle().clone(),
                &settings,
                Route::parse(&cli.route),
            );
            run_app(&mut app)
        }
    }
}
