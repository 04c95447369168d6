use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the move gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:15050")]
    url: String,

    /// Authorization header value forwarded to the catalog.
    #[arg(short, long)]
    authorization: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show breaker and scheduler status
    Status,
    /// Fetch the move list
    Moves,
    /// Fetch a single move
    Move { id: u32 },
    /// Concatenate five parameters
    Concat {
        p1: String,
        p2: String,
        p3: String,
        p4: String,
        p5: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(value) = &cli.authorization {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value)?);
    }

    let res = match cli.command {
        Commands::Status => {
            client
                .get(format!("{}/admin/status", cli.url))
                .send()
                .await?
        }
        Commands::Moves => {
            client
                .get(format!("{}/move", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Move { id } => {
            client
                .get(format!("{}/move/{}", cli.url, id))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Concat { p1, p2, p3, p4, p5 } => {
            let mut url = reqwest::Url::parse(&cli.url)?;
            url.path_segments_mut()
                .map_err(|_| "gateway URL cannot be a base")?
                .pop_if_empty()
                .extend(["concat", p1.as_str(), p2.as_str(), p3.as_str(), p4.as_str(), p5.as_str()]);
            client.post(url).headers(headers).send().await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
