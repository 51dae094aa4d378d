//! The `chain-agent` chatbot.

#[macro_use]
extern crate tracing;

use std::io::{self as std_io, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use chain_agent::tools::SerperSearch;
use chain_agent::{
    Config, DEFAULT_WALLET_FILE, SessionBuilder, WalletSource, run_chat_mode,
    save_wallet_data, wallet_source,
};
use chain_agent_openai_model::OpenAIProvider;
use chain_agent_wallet::CdpProvider;
use clap::Parser;
use owo_colors::OwoColorize;
use tokio::io::{self, BufReader};
use tokio::signal;

#[derive(Debug, Parser)]
#[command(version, about = "A chatbot that can act onchain", long_about = None)]
struct Args {
    /// File holding the exported wallet.
    #[arg(long, default_value = DEFAULT_WALLET_FILE)]
    wallet_file: PathBuf,

    /// Create a new wallet and save it to the wallet file instead of
    /// importing one.
    #[arg(long)]
    new_wallet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std_io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".bright_red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    if let Err(err) = dotenvy::dotenv() {
        debug!("no .env file loaded: {err}");
    }

    // The wallet file is checked before anything else is set up.
    let wallet_data =
        match wallet_source(&args.wallet_file, args.new_wallet).await {
            Ok(WalletSource::Import(data)) => Some(data),
            Ok(WalletSource::Create) => None,
            Err(err) => match err.exit_status() {
                Some(status) => {
                    println!("{err}");
                    return Ok(ExitCode::from(status));
                }
                None => return Err(err.into()),
            },
        };

    let config = Config::from_env()?;
    let wallet_provider = CdpProvider::new(config.cdp_config())
        .context("failed to set up the wallet provider")?;
    let session = SessionBuilder::with_model_provider(OpenAIProvider::new(
        config.openai_config(),
    ))
    .with_wallet_provider(wallet_provider)
    .with_wallet_data(wallet_data)
    .with_search_backend(SerperSearch::new(config.serper_api_key()))
    .build()
    .await
    .context("failed to initialize the agent")?;

    if args.new_wallet {
        let data = session.export_wallet_data()?;
        save_wallet_data(&args.wallet_file, &data).await?;
        println!(
            "{}",
            format!("Saved new wallet to {}", args.wallet_file.display())
                .bright_green()
        );
    }

    let interrupt = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to listen for interrupts: {err}");
            std::future::pending::<()>().await;
        }
    };
    let mut stdout = std_io::stdout();
    let exit = run_chat_mode(
        &session,
        BufReader::new(io::stdin()),
        &mut stdout,
        interrupt,
    )
    .await?;
    stdout.flush()?;
    debug!("chat ended: {exit:?}");
    if exit.is_immediate() {
        // A blocking stdin read may still be pending, and runtime shutdown
        // would wait for it.
        std::process::exit(exit.exit_status().into());
    }
    Ok(ExitCode::from(exit.exit_status()))
}
