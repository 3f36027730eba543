use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotmix::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Verbose engine logging
    #[clap(long, global = true)]
    debug: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[clap(about = "Serve the JSON API and run all playlists on a schedule")]
    Serve(ServeOptions),

    #[clap(about = "Run a single playlist and wait for the result")]
    Run(RunOptions),

    #[clap(about = "Run every playlist of a user")]
    RunAll(UserOptions),

    #[clap(about = "List the playlist definitions of a user")]
    Playlists(UserOptions),

    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Do not start the periodic run-all
    #[clap(long)]
    no_schedule: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RunOptions {
    #[clap(long)]
    user: String,
    /// Name of the playlist definition
    name: String,
}

#[derive(Parser, Debug, Clone)]
pub struct UserOptions {
    #[clap(long)]
    user: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing(debug: bool) {
    let log_level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("spotmix={log_level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Command::Serve(opt) => cli::serve(opt.no_schedule).await,
        Command::Run(opt) => cli::run(&opt.user, &opt.name).await,
        Command::RunAll(opt) => cli::run_all(&opt.user).await,
        Command::Playlists(opt) => cli::playlists(&opt.user).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
