use bpm_fetch::{BpmClient, Credentials, FetchConfig, Inventory, RunReport, WebDriverSurface};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thirtyfour::{DesiredCapabilities, WebDriver};

/// BPM Supreme download automation
#[derive(Parser)]
#[command(
    name = "bpm-fetch",
    about = "Duplicate-aware download automation for the BPM Supreme record pool",
    long_about = None
)]
struct Cli {
    /// WebDriver endpoint to attach to (a running geckodriver)
    #[arg(long, default_value = "http://localhost:4444")]
    webdriver_url: String,

    /// Directory downloads land in; scanned for already-owned tracks
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Additional directory scanned for already-owned tracks
    #[arg(long)]
    duplicate_dir: Option<PathBuf>,

    /// Stop after this many pages or scroll steps
    #[arg(long)]
    pages: Option<u32>,

    /// Run the browser headless
    #[arg(long)]
    headless: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk the account's download-history list
    History,
    /// Walk the new-releases grid
    NewReleases {
        /// Genre segment, e.g. "hip-hop-r&b"
        #[arg(long)]
        genre: Option<String>,
    },
    /// Walk the exclusives grid
    Exclusives,
    /// Walk an arbitrary genre page URL
    Genre { url: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let download_dir = match cli.download_dir.clone().or_else(dirs::download_dir) {
        Some(dir) => dir,
        None => {
            eprintln!("No download directory found; pass --download-dir");
            std::process::exit(1);
        }
    };
    let mut inventory_dirs = vec![download_dir];
    if let Some(dir) = cli.duplicate_dir.clone() {
        inventory_dirs.push(dir);
    }

    let credentials = match credentials_from_env_or_prompt() {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("Bad credentials: {e}");
            std::process::exit(1);
        }
    };

    let config = FetchConfig::default();
    let inventory = match Inventory::build(&inventory_dirs, &config.separator) {
        Ok(inventory) => inventory,
        Err(e) => {
            eprintln!("Could not index local files: {e}");
            std::process::exit(1);
        }
    };
    println!("Indexed {} local titles", inventory.len());

    let mut caps = DesiredCapabilities::firefox();
    if cli.headless {
        caps.set_headless()?;
    }
    let driver = WebDriver::new(&cli.webdriver_url, caps).await?;
    let surface = WebDriverSurface::new(driver);

    let mut client = BpmClient::new(surface, config, inventory)?;
    if let Err(e) = client.login(&credentials).await {
        eprintln!("Login failed: {e}");
        client.into_surface().quit().await?;
        std::process::exit(1);
    }
    println!("Logged in as {}", credentials.username());

    let result = run_command(&client, &cli.command, cli.pages).await;
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Crawl failed: {e}");
            client.into_surface().quit().await?;
            std::process::exit(1);
        }
    };

    println!("{}", report.summary());
    for failure in report.failures() {
        println!(
            "Failed to download: {} - {}",
            failure.artists, failure.display_title
        );
    }

    client.into_surface().quit().await?;
    Ok(())
}

async fn run_command(
    client: &BpmClient<WebDriverSurface>,
    command: &Command,
    pages: Option<u32>,
) -> bpm_fetch::Result<RunReport> {
    match command {
        Command::History => client.download_history(pages).await,
        Command::NewReleases { genre } => {
            client.download_new_releases(genre.as_deref(), pages).await
        }
        Command::Exclusives => client.download_exclusives(pages).await,
        Command::Genre { url } => client.download_genre(url, pages).await,
    }
}

fn credentials_from_env_or_prompt() -> Result<Credentials, Box<dyn std::error::Error>> {
    let username = match std::env::var("BPM_FETCH_USERNAME") {
        Ok(username) => username,
        Err(_) => dialoguer::Input::<String>::new()
            .with_prompt("Username")
            .interact_text()?,
    };
    let password = match std::env::var("BPM_FETCH_PASSWORD") {
        Ok(password) => password,
        Err(_) => dialoguer::Password::new().with_prompt("Password").interact()?,
    };
    Ok(Credentials::new(username, password)?)
}
