use std::time::Duration;

use crate::app_config::{
    AnnotatorConfig, AnnotatorKind, ReportConfig, DEFAULT_ANNOTATOR_BASE_URL,
    DEFAULT_ANNOTATOR_MODEL,
};
use crate::ConfigError;

/// Load report configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_config() -> Result<ReportConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_config_from_env()
}

/// Load report configuration from environment variables already in the process.
///
/// Unlike [`load_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_config_from_env() -> Result<ReportConfig, ConfigError> {
    build_config(|key| std::env::var(key))
}

/// Parsing and validation, decoupled from the process environment so it can
/// be tested with a plain `HashMap` lookup.
fn build_config<F>(lookup: F) -> Result<ReportConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let defaults = ReportConfig::default();

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<usize>().map_err(|e| invalid(var, e.to_string())),
            Err(_) => Ok(default),
        }
    };

    let parse_u32 = |var: &str, default: u32| -> Result<u32, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<u32>().map_err(|e| invalid(var, e.to_string())),
            Err(_) => Ok(default),
        }
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<u64>().map_err(|e| invalid(var, e.to_string())),
            Err(_) => Ok(default),
        }
    };

    let review_count = parse_usize("REVIEWSCOPE_REVIEW_COUNT", defaults.review_count)?;
    let output_directory = lookup("REVIEWSCOPE_OUTPUT_DIR")
        .map_or(defaults.output_directory, PathBuf::from);
    let top_topics_n = parse_usize("REVIEWSCOPE_TOP_TOPICS_N", defaults.top_topics_n)?;

    let annotation_timeout = match lookup("REVIEWSCOPE_ANNOTATION_TIMEOUT_SECS") {
        Ok(raw) => parse_timeout(&raw)
            .map_err(|reason| invalid("REVIEWSCOPE_ANNOTATION_TIMEOUT_SECS", reason))?,
        Err(_) => defaults.annotation_timeout,
    };

    let annotation_max_concurrency = parse_usize(
        "REVIEWSCOPE_ANNOTATION_MAX_CONCURRENCY",
        defaults.annotation_max_concurrency,
    )?;
    if annotation_max_concurrency == 0 {
        return Err(invalid(
            "REVIEWSCOPE_ANNOTATION_MAX_CONCURRENCY",
            "must be at least 1".to_string(),
        ));
    }

    let annotation_max_retries = parse_u32(
        "REVIEWSCOPE_ANNOTATION_MAX_RETRIES",
        defaults.annotation_max_retries,
    )?;
    let annotation_backoff_base_ms = parse_u64(
        "REVIEWSCOPE_ANNOTATION_BACKOFF_BASE_MS",
        defaults.annotation_backoff_base_ms,
    )?;

    let language = or_default("REVIEWSCOPE_LANGUAGE", &defaults.language);
    let country = or_default("REVIEWSCOPE_COUNTRY", &defaults.country);
    let log_level = or_default("REVIEWSCOPE_LOG_LEVEL", &defaults.log_level);

    let kind = parse_annotator_kind(&or_default("REVIEWSCOPE_ANNOTATOR", "placeholder"))
        .ok_or_else(|| {
            invalid(
                "REVIEWSCOPE_ANNOTATOR",
                "expected \"placeholder\" or \"claude\"".to_string(),
            )
        })?;
    let api_key = lookup("ANTHROPIC_API_KEY").ok().filter(|k| !k.is_empty());
    if kind == AnnotatorKind::Claude && api_key.is_none() {
        return Err(ConfigError::MissingEnvVar("ANTHROPIC_API_KEY".to_string()));
    }

    let annotator = AnnotatorConfig {
        kind,
        api_key,
        model: or_default("REVIEWSCOPE_ANNOTATOR_MODEL", DEFAULT_ANNOTATOR_MODEL),
        base_url: or_default("REVIEWSCOPE_ANNOTATOR_BASE_URL", DEFAULT_ANNOTATOR_BASE_URL),
    };

    Ok(ReportConfig {
        review_count,
        output_directory,
        top_topics_n,
        annotation_timeout,
        annotation_max_concurrency,
        annotation_max_retries,
        annotation_backoff_base_ms,
        language,
        country,
        log_level,
        annotator,
    })
}

/// Parse a timeout given in (possibly fractional) seconds.
///
/// Rejects zero, negative, non-finite, and values too large for a
/// [`Duration`].
fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let secs = raw.trim().parse::<f64>().map_err(|e| e.to_string())?;
    match Duration::try_from_secs_f64(secs) {
        Ok(timeout) if !timeout.is_zero() => Ok(timeout),
        Ok(_) => Err(format!("must be a positive number of seconds, got {raw}")),
        Err(e) => Err(format!("{raw} is not a usable number of seconds: {e}")),
    }
}

/// Parse an annotator name. Returns `None` for unrecognized values.
fn parse_annotator_kind(s: &str) -> Option<AnnotatorKind> {
    match s.trim().to_ascii_lowercase().as_str() {
        "placeholder" | "none" => Some(AnnotatorKind::Placeholder),
        "claude" => Some(AnnotatorKind::Claude),
        _ => None,
    }
}
