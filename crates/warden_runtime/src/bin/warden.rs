//! Warden console entry point.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use warden_foundation::RoomReference;
use warden_runtime::{CommandDispatcher, Console, ConsoleTransport, InterfaceConfig, demo_table};

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    config_path: Option<PathBuf>,
    show_help: bool,
    show_version: bool,
    print_config: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "--print-config" => config.print_config = true,
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("--config requires a path".into());
                }
                config.config_path = Some(PathBuf::from(&args[i]));
            }
            arg => return Err(format!("unknown option: {arg}").into()),
        }
        i += 1;
    }

    Ok(config)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let cli = parse_args(args)?;

    if cli.show_help {
        print_help();
        return Ok(());
    }

    if cli.show_version {
        println!("warden {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging();

    let config = match &cli.config_path {
        Some(path) => InterfaceConfig::from_path(path)?,
        None => InterfaceConfig::default(),
    };

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let suggestions = ["#community:localhost", "#offtopic:localhost"]
        .into_iter()
        .filter_map(RoomReference::parse)
        .collect();
    let table = demo_table(suggestions)?;
    let transport = Arc::new(ConsoleTransport::new());
    let prefix = config
        .command_prefixes
        .first()
        .cloned()
        .unwrap_or_default();
    let dispatcher =
        CommandDispatcher::new(table, config, transport.clone(), transport.clone())?;

    println!("\x1b[1mWarden\x1b[0m console. Try `{prefix} help`; answer prompts with `+1`.");
    let mut console = Console::new(dispatcher, transport)?;
    console.run()?;
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mWarden\x1b[0m - Command console for a room-based moderation bot

\x1b[1mUSAGE:\x1b[0m
    warden [OPTIONS]

\x1b[1mOPTIONS:\x1b[0m
    -c, --config PATH    Read configuration from a JSON file
    --print-config       Print the effective configuration and exit
    -h, --help           Print help information
    -V, --version        Print version information

\x1b[1mCONSOLE:\x1b[0m
    !warden help         List the commands
    !warden rooms add    Protect a room, prompting for which one
    +1                   React to the latest message with 1\u{fe0f}\u{20e3}
    Ctrl+D               Exit

Set RUST_LOG (for example RUST_LOG=debug) to see what the bot is doing."
    );
}
