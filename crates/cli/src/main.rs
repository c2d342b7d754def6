use anyhow::Context;
use bookshelf_app::auth::credentials::{self, CredentialTable};
use bookshelf_authz::TokenService;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about = "Operate the Bookshelf service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Sign a token for a built-in account and print it
    IssueToken {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Print the effective configuration with the signing secret redacted
    ShowConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().with_context(|| "failed to load Bookshelf settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings),
        Command::IssueToken { username, password } => {
            issue_token(&settings, &username, &password)
        }
        Command::ShowConfig => show_config(settings),
    }
}

fn serve(settings: Settings) -> anyhow::Result<()> {
    bookshelf_telemetry::init(&settings.telemetry)?;
    tracing::info!(
        env = ?settings.environment,
        address = %settings.server.bind_address(),
        "bookshelf starting"
    );

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?
        .block_on(bookshelf_app::run(settings))
}

fn issue_token(settings: &Settings, username: &str, password: &str) -> anyhow::Result<()> {
    let tokens = TokenService::from_settings(&settings.auth)?;
    let issued = credentials::issue_token(&CredentialTable::builtin(), &tokens, username, password)
        .with_context(|| format!("cannot issue token for '{username}'"))?;

    println!("{}", issued.access_token);
    Ok(())
}

fn show_config(mut settings: Settings) -> anyhow::Result<()> {
    settings.auth.secret = "<redacted>".to_string();
    let rendered =
        serde_json::to_string_pretty(&settings).context("failed to render settings")?;
    println!("{rendered}");
    Ok(())
}
