use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue};
use tracing::debug;
use url::Url;

use crate::args::TesterArgs;
use crate::error::{AppError, AppResult, HttpError, ValidationError};
use crate::http::validate_trust_root;
use crate::stress::{ClientPolicy, GrowthSpec, RedirectPolicy, RequestSpec, StressConfig};

impl StressConfig {
    /// Maps parsed arguments (with config file values applied) to a run
    /// configuration. Reads and checks the trust root file.
    ///
    /// # Errors
    ///
    /// Returns an error when a required option is missing or a value is
    /// invalid.
    pub fn from_args(args: &TesterArgs) -> AppResult<Self> {
        let url = args
            .url
            .as_deref()
            .ok_or(ValidationError::MissingUrl)?;
        validate_url(url)?;

        let strategy = args
            .strategy
            .clone()
            .ok_or(ValidationError::MissingStrategy)?;
        strategy.parse::<GrowthSpec>()?;

        let run_duration = args.timeout.ok_or(ValidationError::MissingDuration)?;

        for (name, value) in &args.headers {
            validate_header(name, value)?;
        }

        let trust_root = match args.ca_certificates.as_ref() {
            Some(path) => {
                let bytes = std::fs::read(path).map_err(|source| {
                    AppError::http(HttpError::ReadCacert {
                        path: path.clone(),
                        source,
                    })
                })?;
                validate_trust_root(&bytes)?;
                debug!("Trusting root certificate from {}", path.display());
                Some(Arc::<[u8]>::from(bytes))
            }
            None => None,
        };

        Ok(StressConfig {
            request: RequestSpec {
                method: args.method.to_method(),
                url: url.to_owned(),
                headers: args.headers.clone(),
                body: args.payload.clone(),
            },
            policy: ClientPolicy {
                insecure: args.insecure,
                trust_root,
                redirect: RedirectPolicy::from_flags(args.location, args.max_redirs),
                request_timeout: args.request_timeout,
            },
            strategy,
            dry_run: args.dry_run,
            run_duration,
            max_batch_size: args.max_batch_size.get(),
            plot_path: args.plot.clone(),
            export_json: args.export_json.clone(),
        })
    }
}

fn validate_url(raw: &str) -> Result<(), ValidationError> {
    let parsed = Url::parse(raw).map_err(|source| ValidationError::InvalidUrl {
        url: raw.to_owned(),
        source,
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ValidationError::UnsupportedScheme {
            scheme: scheme.to_owned(),
        }),
    }
}

fn validate_header(name: &str, value: &str) -> Result<(), ValidationError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|source| {
        ValidationError::InvalidHeaderName {
            header: name.to_owned(),
            source,
        }
    })?;
    HeaderValue::from_str(value).map_err(|source| ValidationError::InvalidHeaderValue {
        header: name.to_owned(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::Method;
    use tempfile::tempdir;

    use crate::args::test_support::parse_test_args;
    use crate::error::{AppError, AppResult, HttpError, ValidationError};
    use crate::stress::{RedirectPolicy, StressConfig};

    fn map(argv: &[&str]) -> AppResult<StressConfig> {
        let args = parse_test_args(argv.iter().copied())?;
        StressConfig::from_args(&args)
    }

    #[test]
    fn maps_full_arguments() -> AppResult<()> {
        let config = map(&[
            "resttest",
            "-X",
            "patch",
            "-H",
            "X-Run: 1",
            "-P",
            "body",
            "-L",
            "--max-redirs",
            "2",
            "-k",
            "-t",
            "5s",
            "-s",
            "exp[1,3]",
            "--request-timeout",
            "1s",
            "--max-batch-size",
            "50",
            "https://example.com/items",
        ])?;

        if config.request.method != Method::PATCH || config.request.body != "body" {
            return Err(AppError::validation("Unexpected request"));
        }
        if config.request.headers != [("X-Run".to_owned(), "1".to_owned())] {
            return Err(AppError::validation("Unexpected headers"));
        }
        if config.policy.redirect != RedirectPolicy::Limited(2) || !config.policy.insecure {
            return Err(AppError::validation("Unexpected client policy"));
        }
        if config.policy.request_timeout != Some(Duration::from_secs(1)) {
            return Err(AppError::validation("Unexpected request timeout"));
        }
        if config.run_duration != Duration::from_secs(5) || config.max_batch_size != 50 {
            return Err(AppError::validation("Unexpected run settings"));
        }
        if config.strategy != "exp[1,3]" || config.dry_run {
            return Err(AppError::validation("Unexpected strategy or dry run"));
        }
        Ok(())
    }

    #[test]
    fn redirects_off_without_location() -> AppResult<()> {
        let config = map(&[
            "resttest",
            "--max-redirs",
            "4",
            "-t",
            "1s",
            "-s",
            "lin[1,1]",
            "http://localhost",
        ])?;
        if config.policy.redirect != RedirectPolicy::Never {
            return Err(AppError::validation("Expected redirects to be disabled"));
        }
        Ok(())
    }

    #[test]
    fn missing_required_values() -> AppResult<()> {
        match map(&["resttest", "-t", "1s", "-s", "lin[1,1]"]) {
            Err(AppError::Validation(ValidationError::MissingUrl)) => {}
            other => {
                return Err(AppError::validation(format!(
                    "Expected MissingUrl, got {:?}",
                    other.err()
                )));
            }
        }
        match map(&["resttest", "-t", "1s", "http://localhost"]) {
            Err(AppError::Validation(ValidationError::MissingStrategy)) => {}
            other => {
                return Err(AppError::validation(format!(
                    "Expected MissingStrategy, got {:?}",
                    other.err()
                )));
            }
        }
        match map(&["resttest", "-s", "lin[1,1]", "http://localhost"]) {
            Err(AppError::Validation(ValidationError::MissingDuration)) => Ok(()),
            other => Err(AppError::validation(format!(
                "Expected MissingDuration, got {:?}",
                other.err()
            ))),
        }
    }

    #[test]
    fn invalid_values_fail_setup() -> AppResult<()> {
        let cases: [(&[&str], &str); 4] = [
            (&["resttest", "-t", "1s", "-s", "lin(1,1)", "http://localhost"], "strategy"),
            (&["resttest", "-t", "1s", "-s", "lin[1,1]", "not a url"], "url"),
            (&["resttest", "-t", "1s", "-s", "lin[1,1]", "ftp://localhost"], "scheme"),
            (
                &["resttest", "-t", "1s", "-s", "lin[1,1]", "-H", "Bad Name: x", "http://localhost"],
                "header",
            ),
        ];
        for (argv, label) in cases {
            let matched = matches!(
                (label, map(argv)),
                ("strategy", Err(AppError::Validation(ValidationError::InvalidStrategy { .. })))
                    | ("url", Err(AppError::Validation(ValidationError::InvalidUrl { .. })))
                    | (
                        "scheme",
                        Err(AppError::Validation(ValidationError::UnsupportedScheme { .. }))
                    )
                    | (
                        "header",
                        Err(AppError::Validation(ValidationError::InvalidHeaderName { .. }))
                    )
            );
            if !matched {
                return Err(AppError::validation(format!("Expected {} error", label)));
            }
        }
        Ok(())
    }

    #[test]
    fn trust_root_file_is_read_and_checked() -> AppResult<()> {
        let dir = tempdir()?;
        let missing = dir.path().join("missing.pem");
        let missing_arg = missing.to_string_lossy().into_owned();
        match map(&["resttest", "-t", "1s", "-s", "lin[1,1]", "-c", &missing_arg, "https://localhost"]) {
            Err(AppError::Http(HttpError::ReadCacert { .. })) => {}
            other => {
                return Err(AppError::validation(format!(
                    "Expected ReadCacert, got {:?}",
                    other.err()
                )));
            }
        }

        let invalid = dir.path().join("invalid.pem");
        std::fs::write(&invalid, "not a certificate")?;
        let invalid_arg = invalid.to_string_lossy().into_owned();
        match map(&["resttest", "-t", "1s", "-s", "lin[1,1]", "-c", &invalid_arg, "https://localhost"]) {
            Err(AppError::Http(HttpError::InvalidCacert { .. })) => Ok(()),
            other => Err(AppError::validation(format!(
                "Expected InvalidCacert, got {:?}",
                other.err()
            ))),
        }
    }
}
