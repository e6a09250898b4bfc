//! CLI for Ghiblify - serve the Ghibli style image generator.

use clap::{Args, Parser, Subcommand, ValueEnum};
use ghiblify::config::{Config, DEFAULT_MAX_UPLOAD_BYTES};
use ghiblify::ProviderKind;
use std::net::{IpAddr, SocketAddr};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ghiblify")]
#[command(about = "Stylize uploaded images in Studio Ghibli style via Grok or OpenAI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    providers: ProviderArgs,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (UI at `/`, API under `/api`)
    Serve(ServeArgs),

    /// List providers and whether their API keys are configured
    Providers {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "GHIBLIFY_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to bind
    #[arg(short, long, env = "GHIBLIFY_PORT", default_value_t = 3000)]
    port: u16,

    /// Maximum upload size in bytes
    #[arg(long, env = "GHIBLIFY_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,
}

#[derive(Args)]
struct ProviderArgs {
    /// xAI API key (checked per request, not at startup)
    #[arg(long, global = true, env = "XAI_API_KEY", hide_env_values = true)]
    xai_api_key: Option<String>,

    /// OpenAI API key (checked per request, not at startup)
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// xAI API base URL
    #[arg(long, global = true, env = "XAI_BASE_URL")]
    xai_base_url: Option<String>,

    /// OpenAI API base URL
    #[arg(long, global = true, env = "OPENAI_BASE_URL")]
    openai_base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

impl ProviderArgs {
    fn into_config(self, max_upload_bytes: Option<usize>) -> Config {
        Config {
            xai_api_key: self.xai_api_key,
            openai_api_key: self.openai_api_key,
            xai_base_url: self.xai_base_url,
            openai_base_url: self.openai_base_url,
            max_upload_bytes,
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ghiblify=info,tower_http=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Commands::Serve(args) => {
            let config = cli.providers.into_config(Some(args.max_upload_bytes));
            for kind in ProviderKind::ALL {
                if config.api_key(kind).is_none() {
                    tracing::warn!(
                        provider = %kind,
                        env_var = kind.api_key_env_var(),
                        "API key not set; requests for this provider will fail"
                    );
                }
            }
            ghiblify::server::serve(SocketAddr::new(args.host, args.port), config).await?;
        }
        Commands::Providers { json } => {
            list_providers(&cli.providers.into_config(None), json)?;
        }
    }

    Ok(())
}

fn list_providers(config: &Config, json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ProviderInfo {
        name: &'static str,
        kind: &'static str,
        env_var: &'static str,
        base_url: String,
        configured: bool,
    }

    let providers: Vec<ProviderInfo> = ProviderKind::ALL
        .into_iter()
        .map(|kind| ProviderInfo {
            name: kind.display_name(),
            kind: kind.as_str(),
            env_var: kind.api_key_env_var(),
            base_url: config.base_url(kind).to_string(),
            configured: config.api_key(kind).is_some(),
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&providers)?);
    } else {
        println!("Available providers:\n");
        for p in &providers {
            let status = if p.configured { "✓" } else { "✗" };
            println!("  {} {} ({})", status, p.name, p.kind);
            println!("    API key: {}", p.env_var);
            println!("    Endpoint: {}", p.base_url);
        }
    }

    Ok(())
}
