//! Vantage CLI - command-line client for the Vantage seller analytics
//! platform.
//!
//! Commands:
//!
//! ```text
//! vantage login <email>        sign in (password read from stdin)
//! vantage logout               clear the stored session
//! vantage status               system + session status
//! vantage force-check          trigger a listing re-check and poll it
//! vantage insights [sku]       sales insights, optionally filtered by SKU
//! ```
//!
//! Logs go to `~/.vantage/logs/vantage.log`; command output goes to stdout.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vantage_client::ApiClient;
use vantage_config::ClientConfig;
use vantage_session::{FileSessionStore, SessionManager};
use vantage_sync::JobWatch;
use vantage_types::{JobState, SalesFilter};

fn init_tracing(config: &ClientConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    match open_log_file(config) {
        Some((path, file)) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            tracing::info!(path = %path.display(), "Logging initialized");
        }
        None => {
            // Prefer "no logs" over mixing log lines into command output.
            tracing_subscriber::registry().with(env_filter).init();
        }
    }
}

fn open_log_file(config: &ClientConfig) -> Option<(PathBuf, std::fs::File)> {
    let path = config.data_dir.join("logs").join("vantage.log");
    let parent = path.parent()?;
    fs::create_dir_all(parent).ok()?;
    let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;
    Some((path, file))
}

fn read_password() -> Result<String> {
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut password = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut password)
        .context("failed to read password")?;
    let password = password.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}

fn build_client(config: &ClientConfig) -> Arc<ApiClient> {
    let store = Arc::new(FileSessionStore::new(&config.data_dir));
    let session = Arc::new(SessionManager::load(store));
    Arc::new(ApiClient::new(config, session))
}

async fn cmd_login(client: &ApiClient, email: &str) -> Result<()> {
    let password = read_password()?;
    let user = client
        .login(email, &password)
        .await
        .context("login failed")?;
    println!("Signed in as {} ({})", user.name, user.role);
    println!("Dashboard: {}", user.role.dashboard_path());
    Ok(())
}

fn cmd_logout(client: &ApiClient) -> Result<()> {
    client.logout().context("logout failed")?;
    println!("Signed out.");
    Ok(())
}

async fn cmd_status(client: &ApiClient) -> Result<()> {
    let system = client
        .system_status()
        .await
        .context("failed to reach the backend")?;
    if system.maintenance_mode {
        println!("Backend: MAINTENANCE MODE");
    } else {
        println!("Backend: up");
    }

    match client.session().user() {
        Some(user) => println!("Session: {} <{}> ({})", user.name, user.email, user.role),
        None => println!("Session: not signed in"),
    }
    Ok(())
}

async fn cmd_force_check(client: &Arc<ApiClient>, config: &ClientConfig) -> Result<()> {
    let status = client
        .force_check_status()
        .await
        .context("failed to query force-check availability")?;
    if !status.can_check {
        match status.last_check_date {
            Some(when) => bail!("force check not available yet (last run {when})"),
            None => bail!("force check not available yet"),
        }
    }

    let started = client
        .start_force_check()
        .await
        .context("failed to start force check")?;
    println!("{} (job {})", started.message, started.job_id);

    let watch = JobWatch::spawn(Arc::clone(client), started.job_id, config.job_poll);
    let mut rx = watch.subscribe();
    let mut last_progress = None;
    loop {
        let current = rx.borrow().clone();
        if let Some(status) = current {
            if last_progress != Some(status.progress) {
                println!("  {}% of {} ASINs", status.progress, status.total_asins);
                last_progress = Some(status.progress);
            }
            if status.status.is_terminal() {
                match status.status {
                    JobState::Completed => println!("Force check completed."),
                    JobState::Failed => bail!("force check failed"),
                    JobState::Pending | JobState::Running => unreachable!(),
                }
                return Ok(());
            }
        }
        if rx.changed().await.is_err() {
            bail!("force check polling stopped unexpectedly");
        }
    }
}

async fn cmd_insights(client: &ApiClient, sku: Option<String>) -> Result<()> {
    let mut filter = SalesFilter::default().with_top_n(5);
    if let Some(sku) = sku {
        filter = filter.with_sku(sku);
    }

    let freshness = client.sales_freshness().await.context("freshness query")?;
    let insights = client
        .sales_insights(&filter)
        .await
        .context("insights query")?;

    println!("Data as of {}", freshness.last_ingested_at);
    if freshness.stale {
        println!("  (ingestion is lagging)");
    }
    println!("GMV: {:.2}", insights.total_gmv);
    println!("Orders: {}  Units: {}", insights.total_orders, insights.total_units);
    if !insights.top_skus.is_empty() {
        println!("Top SKUs:");
        for row in &insights.top_skus {
            println!("  {:<20} gmv {:>10.2}  orders {:>6}", row.key, row.gmv, row.orders);
        }
    }
    Ok(())
}

fn usage() -> ! {
    eprintln!("usage: vantage <login <email> | logout | status | force-check | insights [sku]>");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ClientConfig::load().context("failed to load configuration")?;
    init_tracing(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let client = build_client(&config);

    match args.first().map(String::as_str) {
        Some("login") => {
            let Some(email) = args.get(1) else { usage() };
            cmd_login(&client, email).await
        }
        Some("logout") => cmd_logout(&client),
        Some("status") => cmd_status(&client).await,
        Some("force-check") => cmd_force_check(&client, &config).await,
        Some("insights") => cmd_insights(&client, args.get(1).cloned()).await,
        _ => usage(),
    }
}
