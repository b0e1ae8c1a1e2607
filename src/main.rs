use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use puffer_kv::store::codec;
use puffer_kv::{IntoValue, Kind, Puffer, StoreError, Value};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Cannot parse '{value}' as {kind}")]
    ParseValue { value: String, kind: Kind },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid log filter: {0}")]
    LogFilter(String),
}

/// Kind to store a value as; inferred from the text when omitted.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    String,
}

impl From<KindArg> for Kind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Int32 => Kind::Int32,
            KindArg::Int64 => Kind::Int64,
            KindArg::Float32 => Kind::Float32,
            KindArg::Float64 => Kind::Float64,
            KindArg::Bool => Kind::Bool,
            KindArg::String => Kind::String,
        }
    }
}

#[derive(Parser)]
#[command(name = "puffer")]
#[command(about = "Inspect and edit a puffer key-value file")]
struct Cli {
    /// Backing file of the store
    #[arg(short, long, env = "PUFFER_FILE", default_value = "puffer.json")]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value stored under a key
    Get {
        key: String,

        /// Prefix the output with the value's type tag
        #[arg(long)]
        show_kind: bool,
    },

    /// Store a value under a key
    Put {
        key: String,

        value: String,

        /// Kind to store the value as (inferred when omitted)
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Remove a key
    Remove { key: String },

    /// Remove every key
    Clear,

    /// List all keys
    Keys,

    /// Print the whole store in its file format
    Dump,
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let store = Puffer::open(&cli.file)
        .with_context(|| format!("opening {}", cli.file.display()))?;
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Get { key, show_kind } => {
            let value = store
                .get_value(&key)
                .ok_or_else(|| AppError::Store(StoreError::KeyNotFound(key.clone())))?;
            if show_kind {
                writeln!(out, "{}\t{value}", value.kind())?;
            } else {
                writeln!(out, "{value}")?;
            }
        }
        Commands::Put { key, value, kind } => {
            let value = match kind {
                Some(kind) => parse_as(&value, kind.into())?,
                None => infer(&value)?,
            };
            store.put(&key, value)?;
            store.flush()?;
        }
        Commands::Remove { key } => {
            store.remove(&key)?;
            store.flush()?;
        }
        Commands::Clear => {
            store.remove_all()?;
            store.flush()?;
        }
        Commands::Keys => {
            for key in store.keys() {
                writeln!(out, "{key}")?;
            }
        }
        Commands::Dump => {
            let bytes = codec::encode_snapshot(&store.snapshot(), true)?;
            out.write_all(&bytes)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

fn init_logging() -> Result<(), AppError> {
    let filter = match std::env::var("PUFFER_LOG") {
        Ok(directives) => {
            EnvFilter::try_new(directives).map_err(|e| AppError::LogFilter(e.to_string()))?
        }
        Err(_) => EnvFilter::new("warn"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
    Ok(())
}

fn parse_as(text: &str, kind: Kind) -> Result<Value, AppError> {
    let invalid = || AppError::ParseValue {
        value: text.to_string(),
        kind,
    };

    let value = match kind {
        Kind::Int32 => Value::Int32(text.parse().map_err(|_| invalid())?),
        Kind::Int64 => Value::Int64(text.parse().map_err(|_| invalid())?),
        Kind::Float32 => Value::Float32(text.parse().map_err(|_| invalid())?),
        Kind::Float64 => Value::Float64(text.parse().map_err(|_| invalid())?),
        Kind::Bool => Value::Bool(text.parse().map_err(|_| invalid())?),
        Kind::String => Value::String(text.to_string()),
    };
    Ok(value)
}

/// JSON scalars keep their JSON kind; anything that is not JSON is a string.
fn infer(text: &str) -> Result<Value, AppError> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(json) => Ok(json.into_value()?),
        Err(_) => Ok(Value::String(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_as_kind() {
        assert_eq!(parse_as("12", Kind::Int64).unwrap(), Value::Int64(12));
        assert_eq!(parse_as("12", Kind::String).unwrap(), Value::from("12"));
        assert_eq!(
            parse_as("-inf", Kind::Float64).unwrap(),
            Value::Float64(f64::NEG_INFINITY)
        );
        assert!(matches!(
            parse_as("yes", Kind::Bool),
            Err(AppError::ParseValue { kind: Kind::Bool, .. })
        ));
    }

    #[test]
    fn test_infer_value() {
        assert_eq!(infer("42").unwrap(), Value::Int32(42));
        assert_eq!(infer("true").unwrap(), Value::Bool(true));
        assert_eq!(infer("2.5").unwrap(), Value::Float64(2.5));
        assert_eq!(infer("hello").unwrap(), Value::from("hello"));
        assert_eq!(infer("\"42\"").unwrap(), Value::from("42"));
        assert!(matches!(infer("[1]"), Err(AppError::Store(_))));
    }
}
