use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use finscale::api::{HttpClient, LedgerApi};
use finscale::config::{Args, Settings};
use finscale::format;
use finscale::notify::Notifier;
use finscale::query::QueryCache;
use finscale::reference::ReferenceIdGenerator;
use finscale::ui::{run_app, App};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn cleanup_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}

fn setup_logging(settings: &Settings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .context("invalid log level")?;

    if settings.check {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(io::stderr))
            .init();
    } else {
        // The TUI owns the terminal, so logs go to a file.
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&settings.log_file)
            .with_context(|| format!("cannot open log file {}", settings.log_file.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init();
    }
    Ok(())
}

async fn check(api: &LedgerApi) -> Result<()> {
    println!("Checking {}...", api.http().base_url());

    let health = api.get_health().await.context("health check failed")?;
    println!("✅ Server is healthy: {}", health);

    let accounts = api.list_accounts().await.context("listing accounts failed")?;
    println!("Found {} accounts:", accounts.len());
    for acc in accounts {
        let balance = format::format_balance(&acc.balance);
        println!(
            "  - {:<8} {:<24} {:<10} {:>18} {}",
            acc.account_code,
            acc.name,
            format::account_type_label(acc.account_type),
            balance.text,
            acc.currency
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_args(Args::parse())?;
    setup_logging(&settings)?;
    info!(base_url = %settings.base_url, "starting finscale");

    let (notifier, toasts) = Notifier::channel();
    let http = HttpClient::new(settings.base_url.clone(), settings.timeout)
        .with_notifier(notifier.clone());
    let api = LedgerApi::new(http);

    // Check mode - test the API and exit
    if settings.check {
        if let Err(e) = check(&api).await {
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        cleanup_terminal();
        original_hook(panic_info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run
    let app = App::new(
        api,
        notifier,
        toasts,
        ReferenceIdGenerator::new(settings.reference_scheme),
        QueryCache::new(settings.query_retries, settings.retry_delay),
    );
    let res = run_app(&mut terminal, app);

    // Restore terminal
    cleanup_terminal();
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
