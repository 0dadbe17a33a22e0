//! Offline operator tool for ring tokens and backup keys.

use anyhow::{bail, Context};
use chrono::DateTime;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use ringkeeper_core::{
    BackupFileDescriptor, BackupFileType, ClusterIdentity, Config, PathCodec, Token, TokenManager,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ringctl", about = "Ring token and backup key tool", version)]
struct Cli {
    /// Data directory (can also be set via DATA_DIR env var)
    #[arg(long, global = true, env = "DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Ring token arithmetic
    #[command(subcommand)]
    Token(TokenCommand),
    /// Backup key encoding and decoding
    #[command(subcommand)]
    Backup(BackupCommand),
}

#[derive(Subcommand)]
enum TokenCommand {
    /// Initial token for one slot of an evenly split ring
    Initial {
        ring_size: i64,
        position: i64,
        #[arg(long, default_value = "0")]
        offset: i64,
    },
    /// Region-aware token for one slot
    Create {
        position: i64,
        ring_size: i64,
        /// Defaults to the configured region
        #[arg(long)]
        region: Option<String>,
    },
    /// Token for a slot using the configured rack count
    Rack {
        slot: i64,
        #[arg(long)]
        rack_size: i64,
        #[arg(long)]
        region: Option<String>,
    },
    /// Candidate token closest to a target
    Closest {
        target: String,
        #[arg(required = true)]
        candidates: Vec<String>,
    },
    /// Stable offset of a region name
    RegionOffset { region: String },
    /// Every token of an evenly split ring
    Split {
        ring_size: i64,
        #[arg(long)]
        region: Option<String>,
    },
}

#[derive(Subcommand)]
enum BackupCommand {
    /// Remote key for a local backup file
    RemoteKey {
        path: PathBuf,
        #[arg(long = "type")]
        file_type: String,
        /// Override the modification time (epoch milliseconds)
        #[arg(long)]
        modified_epoch_ms: Option<i64>,
    },
    /// Decode a remote key
    Parse { key: String },
    /// Key prefix for every artifact of a type
    Prefix {
        file_type: String,
        #[arg(long, default_value = "")]
        base_dir: PathBuf,
    },
}

fn parse_token(value: &str) -> anyhow::Result<Token> {
    value
        .trim()
        .parse::<Token>()
        .map_err(|err| anyhow::anyhow!("Invalid token '{}': {}", value, err))
}

fn parse_file_type(value: &str) -> anyhow::Result<BackupFileType> {
    value
        .trim()
        .to_ascii_uppercase()
        .parse::<BackupFileType>()
        .map_err(anyhow::Error::msg)
}

fn format_tokens(tokens: &[String], json: bool) -> anyhow::Result<String> {
    if json {
        return serde_json::to_string_pretty(tokens).context("response encoding error");
    }
    Ok(tokens.join("\n"))
}

fn format_descriptor(descriptor: &BackupFileDescriptor, json: bool) -> anyhow::Result<String> {
    if json {
        return serde_json::to_string_pretty(descriptor).context("response encoding error");
    }

    let mut rows = vec![
        format!("{:<16} {}", "type", descriptor.file_type()),
        format!("{:<16} {}", "root", descriptor.base_directory()),
        format!("{:<16} {}", "cluster", descriptor.cluster_name()),
        format!("{:<16} {}", "token", descriptor.token()),
    ];
    if let (Some(keyspace), Some(table)) = (descriptor.keyspace(), descriptor.column_family()) {
        rows.push(format!("{:<16} {}", "keyspace", keyspace));
        rows.push(format!("{:<16} {}", "table", table));
    }
    if let Some(index) = descriptor.secondary_index_name() {
        rows.push(format!("{:<16} {}", "index", index));
    }
    rows.push(format!(
        "{:<16} {}",
        "last_modified",
        descriptor.last_modified().to_rfc3339()
    ));
    if descriptor.file_type().is_v2() {
        rows.push(format!("{:<16} {}", "compression", descriptor.compression()));
        rows.push(format!("{:<16} {}", "encryption", descriptor.encryption()));
    }
    rows.push(format!("{:<16} {}", "file", descriptor.file_name()));
    Ok(rows.join("\n"))
}

fn run_token(command: TokenCommand, config: &Config, json: bool) -> anyhow::Result<String> {
    let manager = TokenManager::default();
    let tokens = match command {
        TokenCommand::Initial {
            ring_size,
            position,
            offset,
        } => vec![manager.initial_token(ring_size, position, offset)?.to_string()],
        TokenCommand::Create {
            position,
            ring_size,
            region,
        } => {
            let region = region.as_deref().unwrap_or(config.region());
            vec![manager.create_token(position, ring_size, region)?]
        }
        TokenCommand::Rack {
            slot,
            rack_size,
            region,
        } => {
            if config.racks.is_empty() {
                bail!("RACKS is not configured");
            }
            let region = region.as_deref().unwrap_or(config.region());
            let rack_count = i64::try_from(config.racks.len()).context("too many racks")?;
            vec![manager.create_rack_token(slot, rack_count, rack_size, region)?]
        }
        TokenCommand::Closest { target, candidates } => {
            let target = parse_token(&target)?;
            let candidates = candidates
                .iter()
                .map(|candidate| parse_token(candidate))
                .collect::<anyhow::Result<Vec<_>>>()?;
            vec![manager.find_closest_token(target, &candidates)?.to_string()]
        }
        TokenCommand::RegionOffset { region } => {
            vec![manager.region_offset(&region).to_string()]
        }
        TokenCommand::Split { ring_size, region } => {
            let offset = region
                .as_deref()
                .map(|region| i64::from(manager.region_offset(region)))
                .unwrap_or(0);
            manager
                .ring_tokens(ring_size, offset)?
                .iter()
                .map(Token::to_string)
                .collect()
        }
    };
    format_tokens(&tokens, json)
}

fn run_backup(command: BackupCommand, config: Config, json: bool) -> anyhow::Result<String> {
    let codec = PathCodec::from_config(config)?;
    match command {
        BackupCommand::RemoteKey {
            path,
            file_type,
            modified_epoch_ms,
        } => {
            let mut descriptor = codec.classify_local(&path, parse_file_type(&file_type)?)?;
            if let Some(millis) = modified_epoch_ms {
                let modified = DateTime::from_timestamp_millis(millis)
                    .with_context(|| format!("Invalid timestamp {}", millis))?;
                descriptor.set_last_modified(modified);
            }
            let key = codec.to_remote_key(&descriptor);
            if json {
                return serde_json::to_string_pretty(&serde_json::json!({ "key": key }))
                    .context("response encoding error");
            }
            Ok(key)
        }
        BackupCommand::Parse { key } => format_descriptor(&codec.parse_remote_key(&key)?, json),
        BackupCommand::Prefix {
            file_type,
            base_dir,
        } => Ok(codec.remote_prefix(Path::new(&base_dir), parse_file_type(&file_type)?)?),
    }
}

fn run(cli: Cli, mut config: Config) -> anyhow::Result<Option<String>> {
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "ringctl", &mut io::stdout());
            Ok(None)
        }
        Commands::Token(command) => run_token(command, &config, cli.json).map(Some),
        Commands::Backup(command) => run_backup(command, config, cli.json).map(Some),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ringkeeper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    tracing::debug!(
        "Using backup root {} for cluster {}",
        config.backup_root(),
        config.cluster_name()
    );

    if let Some(output) = run(cli, config)? {
        println!("{}", output);
    }
    Ok(())
}
