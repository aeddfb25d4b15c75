mod cli;

use reelvault::{config, server};
use reelvault_av::{probe_metadata, ThumbnailGenerator, ThumbnailOptions, Transcoder};
use reelvault_store::scan_directory;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::time::Duration;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_layered(config_path)?;

    // CLI flags win over file and environment
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting Reelvault server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );
    tracing::info!(
        "Videos: {:?}, thumbnails: {:?}, storage: {}",
        config.library.videos_dir,
        config.library.thumbnails_dir,
        config.storage.storage_type
    );

    server::start_server(config).await
}

fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelvault=trace,reelvault_store=trace,reelvault_av=trace,tower_http=debug".to_string()
        } else {
            "reelvault=debug,reelvault_store=debug,reelvault_av=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Scan { dir, json } => scan(dir.as_deref(), cli.config.as_deref(), json),
        Commands::Probe { file, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_file(&file, cli.config.as_deref(), json))
        }
        Commands::Thumbnail { file, output, at } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(thumbnail(&file, &output, at, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("reelvault {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn transcoder_for(config: &config::Config) -> Transcoder {
    Transcoder::detect(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    )
    .with_timeout(Duration::from_secs(config.tools.timeout_secs))
}

fn scan(dir: Option<&Path>, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_layered(config_path)?;
    let dir = dir.unwrap_or(config.library.videos_dir.as_path());

    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {:?}", dir);
    }

    let found: Vec<_> = scan_directory(dir).collect();

    if json {
        let videos: Vec<_> = found.iter().map(|s| &s.video).collect();
        println!("{}", serde_json::to_string_pretty(&videos)?);
        return Ok(());
    }

    for scanned in &found {
        println!(
            "[{}] {} ({} bytes) - {}",
            scanned.provisional_id, scanned.video.filename, scanned.video.size, scanned.video.title
        );
    }
    println!("\n{} video files in {}", found.len(), dir.display());

    Ok(())
}

async fn probe_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_layered(config_path)?;
    let metadata = probe_metadata(&transcoder_for(&config), file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    } else {
        let secs = metadata.duration as u64;
        println!("File: {}", file.display());
        println!(
            "Duration: {:02}:{:02}:{:02} ({:.3}s)",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60,
            metadata.duration
        );
        println!("Resolution: {}x{}", metadata.width, metadata.height);
        println!("Frame rate: {:.3} fps", metadata.fps);
        println!("Bitrate: {} bit/s", metadata.bitrate);
    }

    Ok(())
}

async fn thumbnail(file: &Path, output: &Path, at: f64, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_layered(config_path)?;
    let generator = ThumbnailGenerator::new(transcoder_for(&config));
    let options = ThumbnailOptions {
        time_offset_secs: at,
        ..ThumbnailOptions::default()
    };

    let outcome = generator.generate(file, output, &options).await?;
    if outcome.is_placeholder() {
        println!("Wrote placeholder: {}", outcome.path().display());
    } else {
        println!("Wrote thumbnail: {}", outcome.path().display());
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_layered(config_path)?;
    let tools = transcoder_for(&config).check_tools();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All tools are available!");
    } else {
        println!("Some tools are missing. Thumbnails will fall back to placeholders.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("✓ Configuration is valid");
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  CORS origin: {}", config.server.cors_origin);
    println!("  Videos dir: {:?}", config.library.videos_dir);
    println!("  Thumbnails dir: {:?}", config.library.thumbnails_dir);
    println!("  Max upload: {} bytes", config.library.max_file_size);
    println!("  Storage: {}", config.storage.storage_type);
    println!(
        "  Rate limit: {} requests / {} ms",
        config.rate_limit.max_requests, config.rate_limit.window_ms
    );

    Ok(())
}
