use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tokio::{select, sync::mpsc, time::MissedTickBehavior};

use bitsearch::{
    api::ApiClient,
    app::App,
    config::{self, Cli},
    events::start_event_thread,
    logging, tui,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };
    let mut config = config::load_config(&config_path)?;
    cli.apply(&mut config);
    config.validate()?;
    if cli.write_config {
        config::save_config(&config, &config_path)?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let log_file = logging::resolve_log_file(cli.log_file.clone())?;
    logging::init(&log_file, config.log_filter()?)?;
    info!("starting against {}", config.server_url);

    let client = ApiClient::new(&config.server_url, config.request_timeout())
        .context("failed to create api client")?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(client, &config, tx);
    app.start();

    tui::install_panic_hook();
    let mut terminal = tui::Tui::new()?;

    let mut events = start_event_thread(Duration::from_millis(200));
    let mut count_tick = tokio::time::interval(config.count_interval());
    count_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick fires immediately and start() already asked for the count
    count_tick.tick().await;

    let mut should_quit = false;

    while !should_quit {
        terminal
            .terminal_mut()
            .draw(|frame| bitsearch::ui::draw(frame, &app))?;

        let outcome = select! {
            _ = count_tick.tick() => app.dispatch(bitsearch::app::Action::PollCount),
            Some(ev) = events.recv() => app.handle_event(ev),
            Some(action) = rx.recv() => app.dispatch(action),
        };
        match outcome {
            Ok(quit) => should_quit = quit,
            Err(err) => app.set_error(format!("{err:#}")),
        }
    }

    info!("shutting down");
    terminal.restore()?;
    Ok(())
}
