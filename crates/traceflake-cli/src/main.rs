mod config;
mod telemetry;

use chrono::{DateTime, SecondsFormat, Utc};
use clap::Parser;
use config::{CliArgs, CliConfig, Command};
use core::time::Duration;
use std::io::{self, Write};
use std::process::ExitCode;
use telemetry::init_telemetry;
use traceflake::{GeneratorConfig, TraceId, generate_identifier, install, validate_identifier};

fn main() -> anyhow::Result<ExitCode> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry()?;
    tracing::debug!(?config, "starting");

    let mut out = io::stdout().lock();
    match config.command {
        Command::Generate { count } => {
            generate(&config.generator, count, &mut out)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Decode { ids } => Ok(exit_code(decode(&ids, config.generator.epoch, &mut out)?)),
        Command::Validate { ids } => Ok(exit_code(validate(&ids, &mut out)?)),
    }
}

fn exit_code(all_ok: bool) -> ExitCode {
    if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn generate(config: &GeneratorConfig, count: usize, out: &mut impl Write) -> anyhow::Result<()> {
    install(config.build_shared()?)?;
    for _ in 0..count {
        writeln!(out, "{}", generate_identifier()?)?;
    }
    Ok(())
}

/// Returns false if any id failed to parse.
fn decode(ids: &[String], epoch: Duration, out: &mut impl Write) -> anyhow::Result<bool> {
    let mut all_ok = true;
    for raw in ids {
        match raw.parse::<TraceId>() {
            Ok(id) => writeln!(out, "{}", describe(id, epoch))?,
            Err(e) => {
                tracing::error!(id = %raw, "{e}");
                all_ok = false;
            }
        }
    }
    Ok(all_ok)
}

fn validate(ids: &[String], out: &mut impl Write) -> anyhow::Result<bool> {
    let mut all_ok = true;
    for raw in ids {
        let verdict = if validate_identifier(raw) {
            "valid"
        } else {
            all_ok = false;
            "invalid"
        };
        writeln!(out, "{raw}\t{verdict}")?;
    }
    Ok(all_ok)
}

fn describe(id: TraceId, epoch: Duration) -> String {
    let (timestamp, node_id, sequence) = id.to_components();
    let unix_ms = id.unix_millis_with_epoch(epoch);
    let time = i64::try_from(unix_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map_or_else(
            || String::from("out of range"),
            |t| t.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
    format!(
        "{id}\ttimestamp={timestamp}\tnode_id={node_id}\tsequence={sequence}\tunix_ms={unix_ms}\ttime={time}"
    )
}
