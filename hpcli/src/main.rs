use clap::{ArgAction, Parser};
use libhttp_storm::{build_probe_set, Method, ProbeSet, ScanConfig, ScanReport, Scanner};
use serde::{Deserialize, Serialize};
use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
struct Config {
    #[serde(default)]
    scan: ScanDefaults,
    #[serde(default)]
    probes: ProbeConfig,
}

#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
struct ScanDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    concurrency: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    #[serde(default)]
    prefer_https: bool,
    #[serde(default)]
    skip_default: bool,
}

#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
struct ProbeConfig {
    #[serde(default)]
    extra: Vec<String>,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hprobe").join("config.toml"))
}

fn load_config() -> Config {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Config::default(),
    }
}

/// A missing file means defaults; an unreadable or invalid one is logged
/// and also falls back to defaults.
fn load_config_from(path: &Path) -> Config {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "could not read config, using defaults");
            }
            return Config::default();
        }
    };
    parse_config(&content).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "invalid config, using defaults");
        Config::default()
    })
}

fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

fn get_default_config_toml() -> String {
    r#"# HTTP probe (hprobe) Configuration
# Command-line flags take precedence over everything in this file.

[scan]
# concurrency = 20
# timeout_ms = 10000
# method = "GET"
prefer_https = false
skip_default = false

[probes]
# Probes added for every domain, before any -p flags
# extra = ["http:80", "https:8443", "http:8080"]
extra = []
"#
    .to_string()
}

#[derive(Parser, Debug)]
#[command(name = "hprobe")]
#[command(about = "HTTP probe - read domains on stdin, print the URLs that answer", long_about = None)]
struct Args {
    /// Concurrency level, shared by the HTTPS and HTTP batches [default: 20]
    #[arg(short = 'c', value_name = "N")]
    concurrency: Option<usize>,

    /// Add an additional probe (proto:port), may be repeated
    #[arg(short = 'p', value_name = "PROTO:PORT")]
    probes: Vec<String>,

    /// Skip the default https probe
    #[arg(short = 's')]
    skip_default: bool,

    /// Timeout in milliseconds [default: 10000]
    #[arg(short = 't', value_name = "MS")]
    timeout: Option<u64>,

    /// Only try plain HTTP for a domain if none of its HTTPS probes answered
    #[arg(long)]
    prefer_https: bool,

    /// HTTP method to use [default: GET]
    #[arg(long)]
    method: Option<String>,

    /// Output results as NDJSON stream (one JSON object per line)
    #[arg(long, short = 'j')]
    ndjson: bool,

    /// Increase log verbosity on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print the default config to stdout and exit
    #[arg(long)]
    print_default_config: bool,

    /// Write the default config to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn parse_method(name: &str) -> Result<Method, String> {
    Method::from_bytes(name.to_ascii_uppercase().as_bytes())
        .map_err(|_| format!("invalid HTTP method: {:?}", name))
}

/// Flags win over the config file, which wins over the built-in defaults.
fn resolve_scan_config(args: &Args, config: &Config) -> Result<ScanConfig, String> {
    let defaults = ScanConfig::default();

    let method = match args.method.as_deref().or(config.scan.method.as_deref()) {
        Some(name) => parse_method(name)?,
        None => defaults.method,
    };

    let timeout = args
        .timeout
        .or(config.scan.timeout_ms)
        .map(Duration::from_millis)
        .unwrap_or(defaults.timeout);

    let probes = config
        .probes
        .extra
        .iter()
        .chain(args.probes.iter())
        .cloned()
        .collect();

    Ok(ScanConfig {
        concurrency: args
            .concurrency
            .or(config.scan.concurrency)
            .unwrap_or(defaults.concurrency)
            .max(1),
        probes,
        skip_default: args.skip_default || config.scan.skip_default,
        timeout,
        prefer_https: args.prefer_https || config.scan.prefer_https,
        method,
    })
}

fn read_probe_set<R: BufRead>(reader: R, config: &ScanConfig) -> io::Result<ProbeSet> {
    let lines = reader.lines().collect::<io::Result<Vec<String>>>()?;
    Ok(build_probe_set(lines, &config.probes, config.skip_default))
}

fn write_report<W: Write>(out: &mut W, report: &ScanReport, ndjson: bool) -> io::Result<()> {
    for hit in report.hits() {
        if ndjson {
            serde_json::to_writer(&mut *out, hit)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", hit.url)?;
        }
    }
    out.flush()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.print_default_config {
        println!("{}", get_default_config_toml());
        return Ok(());
    }

    if args.write_default_config {
        if let Some(path) = config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, get_default_config_toml())?;
            println!("Default config written to: {}", path.display());
        } else {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
        return Ok(());
    }

    let config = load_config();
    let scan_config = resolve_scan_config(&args, &config)?;
    debug!(?scan_config, "resolved configuration");

    let probe_set = read_probe_set(io::stdin().lock(), &scan_config)?;
    let scanner = Scanner::http(scan_config)?;

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(scanner.scan(probe_set));

    write_report(&mut io::stdout().lock(), &report, args.ndjson)?;
    Ok(())
}
