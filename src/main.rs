//! Optiscan CLI
//!
//! Command-line interface for testing and demonstrating the scan
//! orchestration layer. Runs against the mock engine; link a real
//! engine binding through the library API for production decoding.

use clap::{Parser, Subcommand};
use optiscan::{
    camera::MockVideoDevice,
    config::ScannerConfig,
    engine::MockEngine,
    probe,
    result::Symbology,
    scan::FrameScanner,
    source::load_image_file,
    CameraSession, CameraSessionConfig,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "optiscan", version, about = "Optical symbol scan orchestration demo")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// One-shot scan of an image file.
    Scan {
        /// Image to scan (PNG or JPEG).
        image: PathBuf,
    },
    /// Continuous scan over a mock camera until Ctrl-C.
    Demo,
    /// List supported symbology identifiers.
    Types,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match ScannerConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => ScannerConfig::default(),
    };

    info!("Optiscan v{}", optiscan::VERSION);
    info!(
        engine_supported = probe::engine_supported(),
        touch_tablet = probe::is_touch_tablet(),
        "environment probes"
    );

    match cli.command {
        Command::Scan { image } => run_scan(&image),
        Command::Demo => run_demo(config),
        Command::Types => {
            for symbology in Symbology::ALL {
                println!("{:?}: {}", symbology, symbology);
            }
        }
    }
}

fn run_scan(image: &PathBuf) {
    let scanner = FrameScanner::new(MockEngine::new());

    let mut frame = match load_image_file(image) {
        Ok(frame) => frame,
        Err(e) => {
            eprintln!("Failed to load image: {}", e);
            std::process::exit(1);
        }
    };

    match scanner.scan(&mut frame) {
        Ok(results) if results.is_empty() => println!("No symbols found."),
        Ok(results) => {
            for r in results {
                println!("{}: {}", r.symbology_name, r.payload);
            }
        }
        Err(e) => {
            eprintln!("Scan failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_demo(config: ScannerConfig) {
    info!("This is a demonstration using mock camera input");

    // Non-zero fill: every mock frame carries a symbol.
    let mut device = MockVideoDevice::new(255);
    let scanner = FrameScanner::new(MockEngine::new());

    let session = CameraSession::start(
        &mut device,
        scanner,
        |results| {
            for r in results {
                println!("{}: {}", r.symbology_name, r.payload);
            }
        },
        CameraSessionConfig {
            camera: config.camera,
            scan: config.scan,
        },
    );

    let mut session = match session {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to start camera session: {}", e);
            std::process::exit(1);
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    if let Err(e) = ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    }) {
        eprintln!("Failed to install signal handler: {}", e);
        std::process::exit(1);
    }

    info!("Scanning... press Ctrl-C to stop");
    while running.load(Ordering::SeqCst) && session.is_active() {
        std::thread::sleep(std::time::Duration::from_millis(50));
    }

    session.stop();
    info!("Done.");
}
