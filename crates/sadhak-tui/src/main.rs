use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use sadhak_core::{reply_text, Config, GenerateClient, Origin, ReplyOrder};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "sadhak")]
#[command(about = "Chat with the Sadhak calculator from the terminal")]
struct Cli {
    /// Server base URL (overrides SADHAK_ENDPOINT and the config file)
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// Render replies in the order prompts were sent, not as they arrive
    #[arg(long, global = true)]
    ordered: bool,

    /// Give up on a request after this many seconds
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single prompt and print the reply
    Ask {
        /// Text to send
        prompt: String,
    },
    /// Save --endpoint, --ordered and --timeout as defaults, then show the config
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until exit so buffered log lines are flushed
    let _log_guard = match cli.command {
        Some(Commands::Ask { .. } | Commands::Config) => {
            logging::init_stderr();
            None
        }
        None => Some(logging::init_file()?),
    };

    if let Some(Commands::Config) = cli.command {
        return save_config(&cli);
    }

    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring unreadable config file");
        Config::new()
    });

    let endpoint = config.endpoint(cli.endpoint.as_deref());
    let order = config.reply_order(cli.ordered);
    let client = match config.request_timeout(cli.timeout) {
        Some(timeout) => GenerateClient::with_timeout(&endpoint, timeout)?,
        None => GenerateClient::new(&endpoint),
    };

    match cli.command {
        Some(Commands::Ask { prompt }) => ask(&client, &prompt).await,
        Some(Commands::Config) => Ok(()),
        None => {
            tracing::info!(endpoint = %endpoint, order = order.as_str(), "starting chat");
            let result = run_tui(client, endpoint, order).await;
            tracing::info!("chat closed");
            result
        }
    }
}

fn save_config(cli: &Cli) -> Result<()> {
    // A malformed file is reported rather than overwritten
    let mut config = Config::load()?;
    config.apply_overrides(cli.endpoint.as_deref(), cli.ordered, cli.timeout);
    config.save()?;

    let timeout = match config.request_timeout(None) {
        Some(timeout) => format!("{}s", timeout.as_secs()),
        None => "none".to_string(),
    };

    println!("{}", Config::get_config_path()?.display().to_string().dimmed());
    println!("{}  {}", "endpoint".bold(), config.endpoint(None).as_str().green());
    println!("{}     {}", "order".bold(), config.reply_order(false).as_str().green());
    println!("{}   {}", "timeout".bold(), timeout.as_str().green());
    Ok(())
}

async fn run_tui(client: GenerateClient, endpoint: String, order: ReplyOrder) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let (mut app, completions) = App::new(Arc::new(client), endpoint, order);
    let mut events = EventHandler::new(completions);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

async fn ask(client: &GenerateClient, prompt: &str) -> Result<()> {
    if prompt.is_empty() {
        return Ok(());
    }

    println!("{} {}", Origin::User.label().bold().cyan(), prompt);

    let outcome = client.generate(prompt).await;
    let failed = outcome.is_err();
    let text = reply_text(outcome);

    if failed {
        println!("{} {}", Origin::Ai.label().bold().yellow(), text.as_str().red());
        std::process::exit(1);
    }

    println!("{} {}", Origin::Ai.label().bold().yellow(), text);
    Ok(())
}
