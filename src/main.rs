use clap::Parser;
use miette::{IntoDiagnostic, Result};
use mojaswitch::application::switch::Switch;
use mojaswitch::error::SwitchError;
use mojaswitch::infrastructure::channel::ChannelEndpointFactory;
use mojaswitch::infrastructure::in_memory::InMemoryCorrelationStore;
use mojaswitch::interfaces::config::SwitchConfig;
use mojaswitch::interfaces::csv::delivery_writer::DeliveryWriter;
use mojaswitch::interfaces::jsonl::script_reader::ScriptReader;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Script of admin operations and inbound messages, one JSON object per line
    script: PathBuf,

    /// Switch configuration file (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured own address
    #[arg(long)]
    address: Option<String>,

    /// Overrides the configured own FSP id
    #[arg(long)]
    id: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = match &cli.config {
        Some(path) => SwitchConfig::load(path).into_diagnostic()?,
        None => SwitchConfig::default(),
    };
    if let Some(address) = cli.address {
        config.address = address;
    }
    if let Some(id) = cli.id {
        config.id = id;
    }

    let (endpoints, mut deliveries) = ChannelEndpointFactory::new();
    let switch = Switch::new(
        config.identity(),
        Arc::new(InMemoryCorrelationStore::new()),
        config.rate_table().into_diagnostic()?,
        Arc::new(endpoints),
    );
    for peer in config.peers {
        switch.add_peer(peer, None).await.into_diagnostic()?;
    }

    let stdout = io::stdout();
    let mut writer = DeliveryWriter::new(stdout.lock());
    writer.write_header().into_diagnostic()?;

    // Run the script
    let file = File::open(cli.script).into_diagnostic()?;
    let reader = ScriptReader::new(BufReader::new(file));
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Err(e) = command.apply(&switch).await {
                    eprintln!("Error processing command: {}", e);
                }
            }
            // The script itself cannot be read any further
            Err(e @ SwitchError::IoError(_)) => {
                writer.flush().into_diagnostic()?;
                return Err(e).into_diagnostic();
            }
            Err(e) => {
                eprintln!("Error reading command: {}", e);
            }
        }

        // Deliveries are written in the order the switch produced them
        while let Ok(delivery) = deliveries.try_recv() {
            writer.write_delivery(&delivery).into_diagnostic()?;
        }
    }

    writer.flush().into_diagnostic()?;
    Ok(())
}
