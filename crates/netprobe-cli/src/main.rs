use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use netprobe_core::{
    Catalog, DataFormat, MAX_TIMEOUT, MessageKey, ProbePolicy, ProbeRequest, Rendering,
    Translate, connect_probe_with_policy, decode,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("NETPROBE_BUILD_COMMIT"),
    " ",
    env!("NETPROBE_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "netprobe")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "One-shot TCP/UDP connectivity probe with hex/raw payloads.",
    long_about = None,
    after_help = "Examples:\n  netprobe probe 127.0.0.1 80 --data 'GET / HTTP/1.0\\r\\n\\r\\n' --format raw_string\n  netprobe probe 10.0.0.5 161 --protocol udp --data '\\x30\\x26'  --format hex_slash\n  netprobe decode '0x68,0x65,0x6c,0x6c,0x6f'"
)]
struct Cli {
    /// Log probe steps to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to a target, send an optional payload and read one reply.
    Probe {
        /// Target host name or IP address
        host: String,

        /// Target port
        port: String,

        /// Payload text, interpreted according to --format
        #[arg(short, long, default_value = "")]
        data: String,

        /// Transport protocol (tcp or udp)
        #[arg(short, long, default_value = "tcp")]
        protocol: String,

        /// Payload format: hex_comma, hex_slash or raw_string
        #[arg(short, long, default_value = "hex_comma")]
        format: String,

        /// Connect timeout and read/write deadline, in seconds
        #[arg(long, default_value_t = 6.0)]
        timeout: f64,

        /// Language of error messages (e.g. en-US, zh-CN)
        #[arg(long, env = "NETPROBE_LANG")]
        lang: Option<String>,

        /// Write the JSON result to a file instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if the probe fails
        #[arg(long)]
        strict: bool,
    },
    /// Decode a payload without touching the network and show its renderings.
    Decode {
        /// Payload text
        data: String,

        /// Payload format: hex_comma, hex_slash or raw_string
        #[arg(short, long, default_value = "hex_comma")]
        format: String,

        /// Language of error messages (e.g. en-US, zh-CN)
        #[arg(long, env = "NETPROBE_LANG")]
        lang: Option<String>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    // Must run before any thread is spawned.
    netprobe_core::probe::render::capture_local_offset();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Probe {
            host,
            port,
            data,
            protocol,
            format,
            timeout,
            lang,
            output,
            pretty,
            compact,
            quiet,
            strict,
        } => cmd_probe(
            ProbeRequest {
                host,
                port,
                payload: data,
                protocol,
                data_format: format,
            },
            timeout,
            lang,
            output,
            pretty,
            compact,
            quiet,
            strict,
        ),
        Commands::Decode {
            data,
            format,
            lang,
            pretty,
        } => cmd_decode(&data, &format, lang, pretty),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .without_time()
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn catalog_for(lang: Option<String>) -> Catalog {
    match lang {
        Some(lang) => Catalog::with_language(&lang),
        None => Catalog::new(),
    }
}

fn cmd_probe(
    request: ProbeRequest,
    timeout: f64,
    lang: Option<String>,
    output: Option<PathBuf>,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
) -> Result<ExitCode, CliError> {
    let timeout = parse_timeout(timeout)?;
    let catalog = catalog_for(lang);
    let policy = ProbePolicy::with_timeout(timeout);

    tracing::info!(addr = %request.target(), protocol = %request.protocol, "probing");
    let result = connect_probe_with_policy(&request, &catalog, &policy);
    let json = serialize_json(&result, pretty, compact)?;

    match output {
        None => println!("{}", json),
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&path, json)
                .with_context(|| format!("Failed to write result: {}", path.display()))?;
            if !quiet {
                eprintln!("OK: result written -> {}", path.display());
            }
        }
    }

    if !result.success && !quiet {
        eprintln!("probe failed: {}", result.error);
    }
    if strict && !result.success {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn parse_timeout(secs: f64) -> Result<Duration, CliError> {
    let timeout = Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|t| !t.is_zero())
        .ok_or_else(|| {
            CliError::new(
                format!("invalid timeout: {secs}"),
                Some("use a positive number of seconds, e.g. --timeout 2.5".to_string()),
            )
        })?;
    if timeout > MAX_TIMEOUT {
        return Err(CliError::new(
            format!("invalid timeout: {secs}"),
            Some(format!("use at most {} seconds", MAX_TIMEOUT.as_secs())),
        ));
    }
    Ok(timeout)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DecodeOutput {
    format: DataFormat,
    length: usize,
    #[serde(flatten)]
    rendering: Rendering,
}

fn cmd_decode(
    data: &str,
    format: &str,
    lang: Option<String>,
    pretty: bool,
) -> Result<ExitCode, CliError> {
    let format = DataFormat::from_tag(format);
    let catalog = catalog_for(lang);
    let bytes = decode(data, format).map_err(|err| {
        CliError::new(
            format!(
                "{}: {}",
                catalog.message(MessageKey::ParseDataFailed),
                err.localize(&catalog)
            ),
            Some(format!("input was read as {format}")),
        )
    })?;
    let out = DecodeOutput {
        format,
        length: bytes.len(),
        rendering: Rendering::of(&bytes),
    };
    println!("{}", serialize_json(&out, pretty, false)?);
    Ok(ExitCode::SUCCESS)
}

fn serialize_json<T: Serialize>(value: &T, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use netprobe_core::ProbeResult;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn timeout_bounds() {
        assert_eq!(parse_timeout(2.5).unwrap(), Duration::from_millis(2500));
        assert_eq!(parse_timeout(86400.0).unwrap(), MAX_TIMEOUT);
        assert!(parse_timeout(0.0).is_err());
        assert!(parse_timeout(-1.0).is_err());
        assert!(parse_timeout(f64::NAN).is_err());
        let err = parse_timeout(1e19).unwrap_err();
        assert!(err.hint.unwrap().contains("86400"));
    }

    #[test]
    fn pretty_and_compact_are_exclusive() {
        let result = ProbeResult::failure("x");
        assert!(serialize_json(&result, true, true).is_err());
        assert!(serialize_json(&result, true, false).unwrap().contains('\n'));
    }
}
