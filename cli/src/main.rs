use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use intake_core::form::WebhookPayload;
use intake_core::profile::PersonName;
use intake_core::signature::{self, SIGNATURE_HEADER, SUPPORTED_ALGORITHM};
use serde_json::json;

#[derive(Parser)]
#[command(name = "intake", version, about = "Intake CLI: sign, replay and preview onboarding-form deliveries")]
struct Cli {
    /// API base URL
    #[arg(long, env = "INTAKE_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Print the signature header value for a payload file
    Sign {
        /// Shared webhook secret
        #[arg(long, env = "TYPEFORM_SECRET", hide_env_values = true)]
        secret: String,
        /// Raw payload file, signed byte for byte
        #[arg(long)]
        file: PathBuf,
    },
    /// Sign a payload file and deliver it to the webhook endpoint
    Send {
        #[arg(long, env = "TYPEFORM_SECRET", hide_env_values = true)]
        secret: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Compose the prompt for a payload file locally, without calling the API
    Preview {
        #[arg(long)]
        file: PathBuf,
        /// Given name as the identity store would return it
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// Reference date for the age (YYYY-MM-DD). Defaults to today (UTC).
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn exit_error(message: &str) -> ! {
    let err = json!({
        "error": "cli_error",
        "message": message
    });
    eprintln!("{err:#}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Health => health(&cli.api_url).await,
        Commands::Sign { secret, file } => sign(&secret, &file),
        Commands::Send { secret, file } => send(&cli.api_url, &secret, &file).await,
        Commands::Preview {
            file,
            first_name,
            last_name,
            today,
        } => preview(
            &file,
            PersonName {
                given_name: first_name,
                family_name: last_name,
            },
            today.unwrap_or_else(|| Utc::now().date_naive()),
        ),
    };

    if let Err(e) = result {
        exit_error(&e.to_string());
    }
}

fn read_payload(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    std::fs::read(path).map_err(|e| format!("Cannot read {}: {e}", path.display()).into())
}

/// `sha256=<base64>` for `body`.
fn signature_header(secret: &str, body: &[u8]) -> Result<String, Box<dyn std::error::Error>> {
    let digest = signature::sign(secret, body).ok_or("Secret cannot be used as an HMAC key")?;
    Ok(format!("{SUPPORTED_ALGORITHM}={digest}"))
}

fn preview_prompt(
    body: &[u8],
    name: &PersonName,
    today: NaiveDate,
) -> Result<String, Box<dyn std::error::Error>> {
    let payload = WebhookPayload::from_slice(body)?;
    let prompt = intake_core::build_prompt(&payload.form_response, name, today)?;
    Ok(prompt.into_inner())
}

async fn health(api_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let resp = reqwest::Client::new()
        .get(format!("{api_url}/health"))
        .send()
        .await?;
    let body: serde_json::Value = resp.json().await?;
    println!("{body:#}");
    Ok(())
}

fn sign(secret: &str, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let body = read_payload(file)?;
    println!("{}", signature_header(secret, &body)?);
    Ok(())
}

async fn send(api_url: &str, secret: &str, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let body = read_payload(file)?;
    let header = signature_header(secret, &body)?;

    let resp = reqwest::Client::new()
        .post(format!("{api_url}/v1/webhooks/typeform"))
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, header)
        .body(body)
        .send()
        .await
        .map_err(|e| format!("{e}. Is the API server running? Check INTAKE_API_URL."))?;

    let status = resp.status();
    let text = resp.text().await?;
    let body = serde_json::from_str::<serde_json::Value>(&text).unwrap_or(json!(text));
    println!("{:#}", json!({ "status": status.as_u16(), "body": body }));

    if !status.is_success() {
        return Err(format!("Webhook answered with {status}").into());
    }
    Ok(())
}

fn preview(file: &Path, name: PersonName, today: NaiveDate) -> Result<(), Box<dyn std::error::Error>> {
    let body = read_payload(file)?;
    println!("{}", preview_prompt(&body, &name, today)?);
    Ok(())
}
