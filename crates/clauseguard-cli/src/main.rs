//! ClauseGuard CLI: command-line client for the ClauseGuard API.
//!
//! Set CLAUSEGUARD_TOKEN (a session token) and CLAUSEGUARD_API_URL (or API_URL).

use anyhow::Context;
use clap::{Parser, Subcommand};
use clauseguard_api_client::{ApiClient, ContractFile, UploadFlow, UploadStep};
use clauseguard_cli::{init_tracing, render_analysis, summary_line};
use serde::Serialize;
use std::io::{BufRead, Write};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "clauseguard", about = "ClauseGuard contract analysis CLI")]
struct Cli {
    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a contract PDF: detect its type, confirm, then analyze
    Upload {
        /// Path to the PDF
        file: std::path::PathBuf,
        /// Accept the detected type without asking
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// List your analyzed contracts
    List,
    /// Show one analysis
    Show {
        /// Analysis UUID
        id: Uuid,
    },
    /// Delete one analysis
    Delete {
        /// Analysis UUID
        id: Uuid,
    },
    /// Show membership status
    Status,
    /// Start a checkout for the premium plan
    Upgrade,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn confirm_prompt(question: &str) -> anyhow::Result<bool> {
    print!("{} [Y/n] ", question);
    std::io::stdout().flush().context("Flush stdout")?;
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Read answer")?;
    let answer = answer.trim().to_lowercase();
    Ok(answer.is_empty() || answer == "y" || answer == "yes")
}

async fn is_premium(client: &ApiClient) -> anyhow::Result<bool> {
    Ok(client.current_user().await?.is_premium)
}

async fn upload(client: ApiClient, file: &std::path::Path, yes: bool, json: bool) -> anyhow::Result<()> {
    let contract = ContractFile::from_path(file)?;
    let premium = is_premium(&client).await?;
    let mut flow = UploadFlow::new(client);
    flow.select_file(Some(contract));

    eprintln!("Detecting contract type...");
    if flow.detect().await? != UploadStep::Confirm {
        anyhow::bail!(flow.error().unwrap_or("Detection failed").to_string());
    }
    let detected = flow.detected_type().unwrap_or_default().to_string();

    if !yes && !confirm_prompt(&format!("Detected '{}'. Analyze as this type?", detected))? {
        flow.decline()?;
        eprintln!("Cancelled.");
        return Ok(());
    }

    let mut progress = flow.subscribe_progress();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let value = *progress.borrow_and_update();
            eprint!("\rAnalyzing... {:>3}%", value);
            if value == 100 {
                break;
            }
        }
        eprintln!();
    });

    let step = flow.confirm().await?;
    if step != UploadStep::Done {
        reporter.abort();
        eprintln!();
        anyhow::bail!(flow.error().unwrap_or("Analysis failed").to_string());
    }
    let _ = reporter.await;

    let analysis = flow.analysis().context("Analysis missing after completion")?;
    if json {
        print_json(&analysis.clone().preview(premium))
    } else {
        print!("{}", render_analysis(analysis, premium));
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client = ApiClient::from_env().context(
        "Failed to create API client. Set CLAUSEGUARD_TOKEN and CLAUSEGUARD_API_URL (or API_URL)",
    )?;

    match cli.command {
        Commands::Upload { file, yes } => upload(client, &file, yes, cli.json).await?,
        Commands::List => {
            let contracts = client.list_contracts().await?;
            if cli.json {
                print_json(&contracts)?;
            } else if contracts.is_empty() {
                println!("No contracts analyzed yet.");
            } else {
                for contract in &contracts {
                    println!("{}", summary_line(contract));
                }
            }
        }
        Commands::Show { id } => {
            let analysis = client.get_contract(id).await?;
            let premium = is_premium(&client).await?;
            if cli.json {
                print_json(&analysis.preview(premium))?;
            } else {
                print!("{}", render_analysis(&analysis, premium));
            }
        }
        Commands::Delete { id } => {
            client.delete_contract(id).await?;
            print_json(&serde_json::json!({ "success": true, "message": format!("Contract {} deleted", id) }))?;
        }
        Commands::Status => {
            let status = client.membership_status().await?;
            print_json(&status)?;
        }
        Commands::Upgrade => {
            let session = client.create_checkout_session().await?;
            match &session.url {
                Some(url) if !cli.json => println!("Complete your purchase at: {}", url),
                _ => print_json(&session)?,
            }
        }
    }

    Ok(())
}
