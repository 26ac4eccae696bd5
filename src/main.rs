use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rpcmapgen::config::{Config, DEFAULT_CONFIG_PATH};
use rpcmapgen::generator::MappingGenerator;
use rpcmapgen::server::{Server, ServerContext};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rpcmapgen", version, about = "Generate Go model → RPC struct mapping functions")]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a mapping function from two struct definition files
    Gen {
        /// File containing the RPC struct
        #[arg(long)]
        rpc: PathBuf,
        /// File containing the model struct
        #[arg(long)]
        model: PathBuf,
        /// Package qualifying the RPC struct (e.g. `pb`)
        #[arg(long)]
        package: Option<String>,
        /// Template file overriding the configured one
        #[arg(long)]
        template: Option<String>,
        /// Write output here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Serve the web form and the `POST /gen` endpoint
    Serve {
        /// Listen address overriding the configured one
        #[arg(long)]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // 1. Load config
    let mut config = Config::load(&cli.config)?;

    match cli.command {
        Command::Gen {
            rpc,
            model,
            package,
            template,
            out,
        } => {
            if template.is_some() {
                config.template_path = template;
            }
            config.validate()?;

            let rpc_src = std::fs::read_to_string(&rpc)
                .with_context(|| format!("failed to read {}", rpc.display()))?;
            let model_src = std::fs::read_to_string(&model)
                .with_context(|| format!("failed to read {}", model.display()))?;
            let package = package.unwrap_or_else(|| config.rpc_package_name.clone());

            let generator = MappingGenerator::from_config(&config)?;
            let generated = generator.generate(&rpc_src, &model_src, &package)?;

            match out {
                Some(path) => std::fs::write(&path, &generated.text)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{}", generated.text),
            }
        }
        Command::Serve { addr } => {
            if let Some(addr) = addr {
                config.server.listen_addr = addr;
            }
            config.validate()?;
            let addr = config.listen_addr()?;

            // 2. Init generator (template is read once here)
            let generator = MappingGenerator::from_config(&config)?;

            // 3. Start server
            let server = Server::new(ServerContext {
                generator: Arc::new(generator),
                config: Arc::new(config),
            });
            server.start(addr).await?;
        }
    }

    Ok(())
}
