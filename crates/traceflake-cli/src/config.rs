use anyhow::bail;
use clap::{ArgAction, Parser, Subcommand, builder::FalseyValueParser};
use std::path::PathBuf;
use traceflake::{GeneratorConfig, NodeId, NodeSource};

/// Command-line arguments for the `traceflake` binary.
///
/// Node options are global and may also come from the environment (or a
/// `.env` file), so the same settings apply to every subcommand.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "traceflake",
    version,
    about = "Generate and inspect Snowflake-style trace identifiers"
)]
pub struct CliArgs {
    /// Explicit node id in `0..=1023`. Skips the node store entirely.
    ///
    /// Environment variable: `SNOWFLAKE_MACHINE_ID`
    #[arg(long, env = "SNOWFLAKE_MACHINE_ID", global = true, allow_negative_numbers = true)]
    pub node_id: Option<i64>,

    /// Directory holding the persisted node id.
    ///
    /// Defaults to `traceflake` under the per-user local data directory
    /// (`~/.local/share/traceflake` on Linux).
    ///
    /// Environment variable: `TRACEFLAKE_NODE_DIR`
    #[arg(long, env = "TRACEFLAKE_NODE_DIR", global = true)]
    pub node_dir: Option<PathBuf>,

    /// Use a random node id for this run and never touch the node store.
    ///
    /// Environment variable: `TRACEFLAKE_NO_PERSIST`. Any value other than
    /// `0`, `false`, `no`, `off` (or empty) enables it.
    #[arg(
        long,
        env = "TRACEFLAKE_NO_PERSIST",
        global = true,
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub no_persist: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print fresh identifiers, one per line.
    Generate {
        /// How many identifiers to print.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Break identifiers into timestamp, node id and sequence.
    Decode {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Check identifiers; exits non-zero if any is invalid.
    Validate {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub generator: GeneratorConfig,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if let Command::Generate { count: 0 } = args.command {
            bail!("--count must be greater than 0");
        }

        let node = match (args.node_id, args.node_dir, args.no_persist) {
            (Some(_), Some(_), _) => {
                bail!("SNOWFLAKE_MACHINE_ID and TRACEFLAKE_NODE_DIR are mutually exclusive")
            }
            (None, Some(_), true) => {
                bail!("TRACEFLAKE_NODE_DIR and TRACEFLAKE_NO_PERSIST are mutually exclusive")
            }
            (Some(value), None, _) => NodeSource::Explicit(NodeId::new(value)?),
            (None, None, true) => NodeSource::Random,
            (None, Some(dir), false) => NodeSource::Persisted(dir),
            (None, None, false) => GeneratorConfig::default().node,
        };

        Ok(Self {
            generator: GeneratorConfig::with_node(node),
            command: args.command,
        })
    }
}
