use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use super::parsers::{parse_bool_env, parse_duration_arg, parse_header, parse_positive_usize};
use super::types::{HttpMethod, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "resttest",
    version,
    about = "Stress test a REST endpoint with batches of concurrent requests that grow linearly or exponentially."
)]
pub struct TesterArgs {
    /// Endpoint to stress
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// HTTP method to use
    #[arg(long = "request", short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// HTTP headers in 'Key: Value' or 'Key=Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body
    #[arg(long, short = 'P', default_value = "")]
    pub payload: String,

    /// Follow 3xx responses
    #[arg(long, short = 'L')]
    pub location: bool,

    /// Maximum redirects to follow with --location (0 keeps the client default of 10)
    #[arg(long = "max-redirs", default_value_t = 0)]
    pub max_redirs: usize,

    /// Accept invalid TLS certificates and host names
    #[arg(long, short = 'k')]
    pub insecure: bool,

    /// PEM file with an additional root certificate to trust
    #[arg(long = "ca-certificates", short = 'c')]
    pub ca_certificates: Option<PathBuf>,

    /// Send a single batch and stop
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Total running time of the test (supports ms/s/m/h)
    #[arg(long, short = 't', value_parser = parse_duration_arg)]
    pub timeout: Option<Duration>,

    /// Batch growth: 'lin[a,b]' sends a*x+b requests in batch x, 'exp[a,b]' sends a*b^x
    #[arg(long, short = 's')]
    pub strategy: Option<String>,

    /// Write a PNG chart of response time per batch to this path
    #[arg(long, short = 'p')]
    pub plot: Option<PathBuf>,

    /// Write the batch summaries as JSON to this path
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "request-timeout", value_parser = parse_duration_arg)]
    pub request_timeout: Option<Duration>,

    /// Upper bound on requests per batch
    #[arg(long = "max-batch-size", default_value = "10000", value_parser = parse_positive_usize)]
    pub max_batch_size: PositiveUsize,

    /// Path to config file (TOML/JSON). Defaults to ./resttest.toml or ./resttest.json if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (sets log level to debug unless overridden by RESTTEST_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
