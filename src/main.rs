use anyhow::Result;
use clap::Parser;
use listmonk_cli::{
    commands::{
        self, CampaignsCommand, ListsArgs, SubscribersCommand, TemplatesCommand, TxCommand,
    },
    config::{ClientConfig, ConfigOverrides},
    listmonk::ListmonkClient,
    runtime::{RealRuntime, Runtime},
};
use std::io;
use std::process::ExitCode;

/// listmonk - Command-line interface for Listmonk campaigns and lists
///
/// Connection settings may also come from the environment (LISTMONK_BASE_URL,
/// LISTMONK_USERNAME, LISTMONK_API_KEY, LISTMONK_TIMEOUT, LISTMONK_RETRY_COUNT)
/// or a .env file in the working directory.
///
/// Set DEBUG=1 to print the response body of failed API calls.
#[derive(Parser, Debug)]
#[command(name = "listmonk", author, version = env!("LISTMONK_CLI_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Listmonk base URL
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    /// API username (default: api)
    #[arg(long, global = true)]
    username: Option<String>,

    /// API key/token for Listmonk
    #[arg(long, value_name = "KEY", global = true)]
    api_key: Option<String>,

    /// Request timeout in milliseconds (default: 30000)
    #[arg(long, value_name = "MS", global = true, allow_negative_numbers = true)]
    timeout: Option<i64>,

    /// Number of retries for transient errors (default: 3)
    #[arg(long, value_name = "COUNT", global = true, allow_negative_numbers = true)]
    retry_count: Option<i64>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            username: self.username.clone(),
            api_key: self.api_key.clone(),
            timeout_ms: self.timeout,
            retry_count: self.retry_count,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List existing mailing lists
    Lists(ListsArgs),

    /// Manage Listmonk campaigns (newsletters)
    #[command(subcommand)]
    Campaigns(CampaignsCommand),

    /// Manage Listmonk subscribers
    #[command(subcommand)]
    Subscribers(SubscribersCommand),

    /// Manage Listmonk templates
    #[command(subcommand)]
    Templates(TemplatesCommand),

    /// Send transactional emails
    #[command(subcommand)]
    Tx(TxCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    match run(cli, &runtime).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let debug = runtime.env_var("DEBUG").is_ok_and(|v| v == "1");
            eprintln!("{}", commands::render_error(&e, debug));
            ExitCode::FAILURE
        }
    }
}

async fn run<R: Runtime>(cli: Cli, runtime: &R) -> Result<()> {
    let config = ClientConfig::resolve(runtime, cli.overrides())?;
    let api = ListmonkClient::new(&config)?;
    let mut out = io::stdout();

    match cli.command {
        Commands::Lists(args) => commands::lists(&api, args, &mut out).await,
        Commands::Campaigns(command) => {
            commands::campaigns::run(&api, runtime, command, &mut out).await
        }
        Commands::Subscribers(command) => {
            commands::subscribers::run(&api, runtime, command, &mut out).await
        }
        Commands::Templates(command) => commands::templates::run(&api, command, &mut out).await,
        Commands::Tx(command) => commands::transactional::run(&api, runtime, command, &mut out).await,
    }
}
