use clap::{Parser, Subcommand};
use packts::classifier::Outcome;
use packts::eth::ETH_HEADER_SIZE;
use pppoe_smac::config::{self, TableSource};
use pppoe_smac::dataplane::{channel, Rewriter};
use pppoe_smac::protocol::ethernet::{Frame, FrameBuilder};
use pppoe_smac::protocol::{MacAddr, ParseMacAddrError};
use pppoe_smac::telemetry::{init_logging, MetricsRegistry};
use pppoe_smac::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "pppoe-smac")]
#[command(about = "Rewrite the source MAC of PPPoE frames")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Run the classifier over a raw Ethernet frame stored in a file
    Rewrite {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Raw frame, starting at the destination MAC
        #[arg(short, long)]
        frame: PathBuf,

        /// Where to write the (possibly rewritten) frame
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace every table entry with this address
        #[arg(long)]
        mac: Option<String>,
    },
    /// Write a PADI frame to use with `rewrite`
    Sample {
        #[arg(short, long)]
        output: PathBuf,

        /// EtherType, decimal or 0x-prefixed hex
        #[arg(long, default_value = "0x8863", value_parser = parse_ether_type)]
        ether_type: u16,

        /// Source MAC of the sample frame
        #[arg(long, default_value = "aa:bb:cc:dd:ee:ff")]
        src: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate config.toml
    Validate {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
    /// Print the resolved replacement table
    Show {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Validate { config } => cmd_config_validate(&config),
            ConfigAction::Show { config } => cmd_config_show(&config),
        },
        Commands::Rewrite {
            config,
            frame,
            output,
            mac,
        } => cmd_rewrite(&config, &frame, output.as_deref(), mac.as_deref()),
        Commands::Sample {
            output,
            ether_type,
            src,
        } => cmd_sample(&output, ether_type, &src),
    };

    if let Err(e) = result {
        eprintln!("[ERROR] {}", e);
        std::process::exit(1);
    }
}

fn cmd_config_validate(config_path: &Path) -> Result<()> {
    println!("[INFO] Validating {}...", config_path.display());

    let cfg = config::load(config_path)?;

    let validation = config::validate(&cfg);
    validation.print_diagnostics();

    if validation.has_errors() {
        Err(Error::Config("validation failed".into()))
    } else {
        println!("[INFO] Configuration is valid");
        Ok(())
    }
}

fn cmd_config_show(config_path: &Path) -> Result<()> {
    let cfg = config::load(config_path)?;
    let classifier = &cfg.classifier;

    let (mode, entries) = match classifier.resolve()? {
        TableSource::Fixed(mac) => ("fixed", mac.0.map(Some)),
        TableSource::Table(entries) => ("table", entries),
    };
    let table: Vec<String> = entries
        .iter()
        .map(|e| match e {
            Some(b) => format!("{:02x}", b),
            None => "--".to_string(),
        })
        .collect();

    println!("mode     = \"{}\"", mode);
    println!("table    = {}", table.join(":"));
    println!("strategy = \"{}\"", classifier.strategy.as_str());
    println!("events   = \"{}\"", classifier.events.as_str());
    Ok(())
}

fn cmd_rewrite(
    config_path: &Path,
    frame_path: &Path,
    output: Option<&Path>,
    mac: Option<&str>,
) -> Result<()> {
    let mut cfg = config::load(config_path)?;
    init_logging(Some(&cfg.logging));

    if let Some(mac) = mac {
        cfg.classifier.mac = Some(parse_mac(mac)?);
        cfg.classifier.table = None;
    }

    let validation = config::validate(&cfg);
    validation.print_diagnostics();
    if validation.has_errors() {
        return Err(Error::Config("validation failed".into()));
    }

    let mut frame = std::fs::read(frame_path)?;
    info!("Loaded {} bytes from {}", frame.len(), frame_path.display());
    if let Ok(parsed) = Frame::parse(&frame) {
        let stage = match parsed.pppoe_kind() {
            Some(kind) => format!("{:?}", kind),
            None => "not pppoe".to_string(),
        };
        info!(
            dst = %parsed.dst_mac(),
            src = %parsed.src_mac(),
            payload_len = parsed.payload().len(),
            "ethertype {:#06x} ({})",
            parsed.ethertype(),
            stage
        );
    }

    let metrics = Arc::new(MetricsRegistry::new());
    let rt = tokio::runtime::Builder::new_current_thread().build()?;

    let outcome = rt.block_on(async {
        let (sink, mut events) = channel(cfg.classifier.channel_capacity);
        let rewriter = Rewriter::from_config(&cfg.classifier, sink, metrics.clone())?;
        debug!(options = ?rewriter.options(), "classifier ready");
        let outcome = rewriter.process(&mut frame);

        // closes the channel so the drain below terminates
        drop(rewriter);
        while let Some(event) = events.recv().await {
            info!(
                src = %MacAddr(event.source_address),
                "rewrite event: ethertype {:#06x}",
                event.ether_type()
            );
        }
        Ok::<_, Error>(outcome)
    })?;

    match outcome {
        Outcome::TooShort => info!("forward: frame shorter than an Ethernet header, unmodified"),
        Outcome::Unmatched(ether_type) => {
            info!("forward: ethertype {:#06x} is not PPPoE, unmodified", ether_type)
        }
        Outcome::Rewritten { kind, written, .. } => {
            let parsed = Frame::parse(&frame)?;
            info!(
                "forward: {:?} frame, {} byte(s) rewritten, source now {}",
                kind,
                written.count(),
                parsed.src_mac()
            );
        }
    }

    for (name, value) in metrics.export() {
        debug!("{} = {}", name, value);
    }

    if let Some(path) = output {
        std::fs::write(path, &frame)?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}

fn cmd_sample(output: &Path, ether_type: u16, src: &str) -> Result<()> {
    init_logging(None);

    let mut frame = FrameBuilder::padi(parse_mac(src)?).build();
    // keep the PADI body, only relabel it
    frame[12..ETH_HEADER_SIZE].copy_from_slice(&ether_type.to_be_bytes());

    std::fs::write(output, &frame)?;
    info!("Wrote {} byte sample frame to {}", frame.len(), output.display());
    Ok(())
}

fn parse_mac(s: &str) -> Result<MacAddr> {
    s.parse().map_err(|e: ParseMacAddrError| Error::InvalidMac {
        input: s.to_string(),
        reason: e.to_string(),
    })
}

fn parse_ether_type(s: &str) -> std::result::Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid ethertype '{}': {}", s, e))
}
