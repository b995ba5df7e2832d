//! Topic Weight Control - CLI client for the Topic Weight daemon

mod client;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::DaemonClient;
use topicweight_common::{AnalysisRequest, DEFAULT_SERVER_URL};

#[derive(Parser)]
#[command(name = "topicweightctl")]
#[command(about = "Topic Weight - plan research time for political topics", long_about = None)]
#[command(version)]
struct Cli {
    /// Daemon base URL
    #[arg(long, global = true, env = "TOPICWEIGHT_SERVER", default_value = DEFAULT_SERVER_URL)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a topic and recommend research hours
    Analyze {
        /// Political topic, e.g. "carbon tax"
        topic: String,

        /// Days per year you can spend on political research
        #[arg(long, short)]
        days: f64,

        /// How the topic affects you personally
        #[arg(long)]
        impact: Option<String>,

        /// Perspective: left, right or neutral
        #[arg(long)]
        bias: Option<String>,

        /// Year to focus the analysis on
        #[arg(long)]
        year: Option<i32>,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Show daemon health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = DaemonClient::new(&cli.server)?;

    let result = match cli.command {
        Commands::Analyze {
            topic,
            days,
            impact,
            bias,
            year,
            json,
        } => {
            let request = AnalysisRequest {
                topic,
                personal_impact: impact,
                bias_preference: bias,
                year,
                days_per_year: days,
            };
            analyze(&client, &request, json).await
        }
        Commands::Health => client.health().await.map(|h| output::display_health(&h)),
    };

    if let Err(e) = &result {
        output::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

async fn analyze(client: &DaemonClient, request: &AnalysisRequest, json: bool) -> Result<()> {
    let response = client.analyze(request).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        output::display_analysis(&response);
    }
    Ok(())
}
