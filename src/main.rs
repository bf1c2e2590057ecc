use std::path::PathBuf;

use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use songshop::{cli, config, error};

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
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the Spotify login service
    Serve(ServeOptions),

    /// Request an app token with the client-credentials grant
    Token(TokenOptions),

    /// Import genre search results into the track database
    Fetch(FetchOptions),

    /// Show whether Spotify credentials are configured
    Status,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Open the login page in the default browser
    #[clap(long)]
    pub open: bool,

    /// Give up on Spotify requests after this many seconds
    #[clap(long)]
    pub timeout: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct TokenOptions {
    /// Give up after this many seconds
    #[clap(long)]
    pub timeout: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct FetchOptions {
    /// Genre to search; can be repeated. Defaults to every known genre
    #[clap(long = "genre", action = ArgAction::Append, num_args = 1)]
    pub genres: Vec<String>,

    /// SQLite database file (defaults to SONGSHOP_DATABASE or the data directory)
    #[clap(long)]
    pub database: Option<PathBuf>,

    /// Give up on each Spotify request after this many seconds
    #[clap(long)]
    pub timeout: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(opt) => cli::serve(opt.open, opt.timeout).await,
        Command::Token(opt) => cli::token(opt.timeout).await,
        Command::Fetch(opt) => cli::fetch(opt.genres, opt.database, opt.timeout).await,
        Command::Status => cli::status(),
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
