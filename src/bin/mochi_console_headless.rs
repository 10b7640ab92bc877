//! Mochi Console Headless Runner
//!
//! Renders a byte stream into an in-memory display and prints the console
//! state. Reads input from stdin or a file.

use std::fs::File;
use std::io::{self, BufWriter, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use mochi_console::app::Config;
use mochi_console::{ConsoleRegistry, DisplayProvider, MemoryDisplay, ScreenId};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Parse command line arguments
    let mut input_file: Option<String> = None;
    let mut config_file: Option<PathBuf> = None;
    let mut ppm_file: Option<PathBuf> = None;
    let mut screen: Option<ScreenId> = None;
    let mut output_format = OutputFormat::Text;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-f" | "--file" => {
                i += 1;
                if i < args.len() {
                    input_file = Some(args[i].clone());
                }
            },
            "-s" | "--screen" => {
                i += 1;
                match args.get(i).map(String::as_str) {
                    Some("top") => screen = Some(ScreenId::Top),
                    Some("bottom") => screen = Some(ScreenId::Bottom),
                    other => {
                        eprintln!("Unknown screen {:?}, expected 'top' or 'bottom'", other);
                        return ExitCode::FAILURE;
                    }
                }
            },
            "--config" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(PathBuf::from(&args[i]));
                }
            },
            "--ppm" => {
                i += 1;
                if i < args.len() {
                    ppm_file = Some(PathBuf::from(&args[i]));
                }
            },
            "-j" | "--json" => {
                output_format = OutputFormat::Json;
            },
            "-t" | "--text" => {
                output_format = OutputFormat::Text;
            },
            "-h" | "--help" => {
                show_help = true;
            },
            _ => {
                // Treat as input file if no flag
                if input_file.is_none() && !args[i].starts_with('-') {
                    input_file = Some(args[i].clone());
                }
            },
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let config = match &config_file {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::load_or_default(),
    };
    let screen = screen.unwrap_or(config.screen);

    // Read input
    let input_data = match &input_file {
        Some(path) => match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            // Read from stdin
            let mut data = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut data) {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            data
        }
    };

    // Render
    let mut display = MemoryDisplay::default();
    let mut registry = ConsoleRegistry::with_config(config);
    let id = registry.init(&mut display, screen, None);
    registry.write(&mut display, Some(id), &input_data);
    display.present(screen);

    if let Some(path) = &ppm_file {
        let written = File::create(path)
            .and_then(|file| display.write_ppm(screen, BufWriter::new(file)));
        if let Err(e) = written {
            eprintln!("Error writing image '{}': {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    }

    // Output result
    let snapshot = registry.console_mut(Some(id)).snapshot();
    match output_format {
        OutputFormat::Text => {
            println!("{}", snapshot.to_text());
        }
        OutputFormat::Json => match snapshot.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing snapshot: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn print_help() {
    println!("Mochi Console Headless Runner");
    println!();
    println!("Usage: mochi-console-headless [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -f, --file <PATH>       Read input from file");
    println!("  -s, --screen <SCREEN>   Render to 'top' (50x30) or 'bottom' (40x30)");
    println!("      --config <PATH>     Load configuration from PATH");
    println!("      --ppm <PATH>        Write the rendered screen as a PPM image");
    println!("  -j, --json              Output snapshot as JSON");
    println!("  -t, --text              Output snapshot as text (default)");
    println!("  -h, --help              Show this help message");
    println!();
    println!("If no input file is specified, reads from stdin.");
    println!();
    println!("Examples:");
    println!("  printf 'Hello\\033[31;1mWorld\\033[0m' | mochi-console-headless");
    println!("  mochi-console-headless -s top --ppm out.ppm input.txt");
}
