use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::app::{get_config_dir, init_config, Config, Controller};
use crate::network::Request;

use super::Commands;

/// Handle a CLI subcommand
pub async fn handle_command(
    command: &Commands,
    config: &Config,
    config_path: Option<&Path>,
) -> Result<()> {
    match command {
        Commands::Init => {
            let (path, created) = init_config(config_path.map(Path::to_path_buf))?;
            if created {
                println!("Created default configuration at: {}", path.display());
            } else {
                println!("Configuration already exists at: {}", path.display());
            }
            Ok(())
        }
        Commands::Stations { lat, lon, json } => {
            let mut config = config.clone();
            if let (Some(lat), Some(lon)) = (lat, lon) {
                config.location.latitude = Some(*lat);
                config.location.longitude = Some(*lon);
            }
            show_stations(&config, *json).await
        }
        Commands::Install => install(config).await,
        Commands::Fetch { path, body } => fetch(config, path, *body).await,
        Commands::Subscribe => subscribe(config).await,
        Commands::Push { message, click } => {
            let handler = Controller::notification_handler(config);
            let notification = handler.on_push(message)?;
            println!("{} {}: {}", "🔔".yellow(), notification.title.bold(), notification.body);
            if *click {
                handler.on_notification_click(&notification)?;
                println!("Opened {}", config.push.click_url);
            }
            Ok(())
        }
        Commands::Status => show_status(config, config_path),
        Commands::Version => {
            show_version();
            Ok(())
        }
    }
}

/// Show version information
pub fn show_version() {
    println!("MyBike v{}", env!("CARGO_PKG_VERSION"));
    println!("   Offline-first bike station list");
}

async fn show_stations(config: &Config, json: bool) -> Result<()> {
    let mut controller = Controller::from_config(config)?;
    let report = controller.start().await;

    for error in &report.errors {
        eprintln!("{} {}", "[WARNING]".yellow(), error);
    }

    let state = controller.state();
    if json {
        println!("{}", serde_json::to_string_pretty(state.stations())?);
        return Ok(());
    }

    match state.last_updated() {
        Some(time) => println!("Last updated: {}", time.cyan()),
        None => println!("Last updated: {}", "never".dimmed()),
    }
    if state.stations().is_empty() {
        println!("{}", "No stations available".dimmed());
    }
    for station in state.stations() {
        println!("  {}", station.summary());
    }
    Ok(())
}

async fn install(config: &Config) -> Result<()> {
    let controller = Controller::from_config(config)?;
    let proxy = controller.proxy();

    proxy
        .install(&config.cache.assets)
        .await
        .with_context(|| format!("Failed to install cache {}", proxy.version()))?;
    let deleted = proxy.activate().await?;

    println!(
        "{} Installed {} ({} assets)",
        "[OK]".green(),
        proxy.version(),
        config.cache.assets.len()
    );
    for name in deleted {
        println!("  • removed stale cache {}", name);
    }
    Ok(())
}

async fn fetch(config: &Config, path: &str, show_body: bool) -> Result<()> {
    let mut controller = Controller::from_config(config)?;
    if let Err(e) = controller.register_proxy().await {
        eprintln!("{} cache proxy not active: {}", "[WARNING]".yellow(), e);
    }

    let proxy = controller.proxy();
    let hits_before = proxy.stats()?.cache_hits;
    let response = proxy.fetch(&Request::get(path)).await?;
    let source = if proxy.stats()?.cache_hits > hits_before {
        "cache".green()
    } else {
        "network".yellow()
    };

    println!(
        "{} {} ({} bytes, {}, from {})",
        response.status,
        path,
        response.body.len(),
        response.header("content-type").unwrap_or("no content type"),
        source
    );
    if show_body {
        println!("{}", response.text());
    }
    Ok(())
}

async fn subscribe(config: &Config) -> Result<()> {
    let mut controller = Controller::from_config(config)?;
    let subscription = controller
        .subscribe()
        .await
        .context("Push subscription failed")?;

    println!("{} User is subscribed", "[OK]".green());
    println!("{}", serde_json::to_string_pretty(&subscription)?);
    Ok(())
}

fn show_status(config: &Config, config_path: Option<&Path>) -> Result<()> {
    println!("MyBike Status:");
    println!();

    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => get_config_dir()?.join("config.toml"),
    };
    if config_file.exists() {
        println!("  [OK] Configuration: {}", config_file.display());
    } else {
        println!("  [WARNING] Configuration: Not found (using defaults)");
    }
    println!("  Server: {}", config.server.url);

    let controller = Controller::from_config(config)?;
    let stats = controller.proxy().stats()?;
    println!();
    for line in stats.format().lines() {
        println!("  {}", line);
    }

    println!();
    match config.location.position() {
        Some(position) if controller.geolocation_available() => println!(
            "  Geolocation: {:.4}, {:.4}",
            position.latitude, position.longitude
        ),
        _ => println!("  Geolocation: unavailable"),
    }
    println!(
        "  Push: {}",
        if controller.push_available() { "available" } else { "unavailable" }
    );

    println!();
    Ok(())
}
