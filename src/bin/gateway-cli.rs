use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the edge gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness
    Health,
    /// Log in with email and password, printing the token response
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        instance_id: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        instance_id: String,
    },
    /// Change the password of the account owning the access token
    ChangePassword {
        #[arg(long)]
        token: String,
        #[arg(long)]
        old_password: String,
        #[arg(long)]
        new_password: String,
    },
    /// Redeem a newsletter unsubscribe token
    Unsubscribe {
        #[arg(long, default_value = "")]
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        "x-request-id",
        HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())?,
    );

    let res = match cli.command {
        Commands::Health => {
            client
                .get(format!("{}/healthz", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Login {
            email,
            password,
            instance_id,
        } => {
            client
                .post(format!("{}/v1/auth/login-with-email", cli.url))
                .headers(headers)
                .json(&json!({
                    "email": email,
                    "password": password,
                    "instance_id": instance_id,
                }))
                .send()
                .await?
        }
        Commands::Signup {
            email,
            password,
            instance_id,
        } => {
            client
                .post(format!("{}/v1/auth/signup-with-email", cli.url))
                .headers(headers)
                .json(&json!({
                    "email": email,
                    "password": password,
                    "instance_id": instance_id,
                }))
                .send()
                .await?
        }
        Commands::ChangePassword {
            token,
            old_password,
            new_password,
        } => {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
            client
                .post(format!("{}/v1/user/change-password", cli.url))
                .headers(headers)
                .json(&json!({
                    "old_password": old_password,
                    "new_password": new_password,
                }))
                .send()
                .await?
        }
        Commands::Unsubscribe { token } => {
            client
                .get(format!("{}/user/unsubscribe", cli.url))
                .query(&[("token", token)])
                .headers(headers)
                .send()
                .await?
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
