use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_flag = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_bool(&or_default(var, default)).ok_or_else(|| {
            invalid(
                var,
                "expected one of true/false/1/0/yes/no/on/off".to_string(),
            )
        })
    };

    let log_level = or_default("SHELFSCAN_LOG_LEVEL", "info");

    let search_base_url = or_default("SHELFSCAN_SEARCH_BASE_URL", "https://www.amazon.in");
    if !(search_base_url.starts_with("http://") || search_base_url.starts_with("https://")) {
        return Err(invalid(
            "SHELFSCAN_SEARCH_BASE_URL",
            format!("\"{search_base_url}\" must start with http:// or https://"),
        ));
    }

    let search_keyword = or_default("SHELFSCAN_SEARCH_KEYWORD", "laptops");
    if search_keyword.trim().is_empty() {
        return Err(invalid(
            "SHELFSCAN_SEARCH_KEYWORD",
            "must not be empty".to_string(),
        ));
    }

    let output_path = PathBuf::from(or_default(
        "SHELFSCAN_OUTPUT_PATH",
        "scraped_data.ndjson.gz",
    ));
    let locations = split_locations(&or_default("SHELFSCAN_LOCATIONS", ""));

    let browser_headless = parse_flag("SHELFSCAN_BROWSER_HEADLESS", "true")?;
    let browser_no_sandbox = parse_flag("SHELFSCAN_BROWSER_NO_SANDBOX", "false")?;
    let chrome_executable = lookup("SHELFSCAN_CHROME_EXECUTABLE")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let navigation_timeout_secs = parse_u64("SHELFSCAN_NAVIGATION_TIMEOUT_SECS", "60")?;
    let max_concurrent_locations = parse_usize("SHELFSCAN_MAX_CONCURRENT_LOCATIONS", "1")?.max(1);

    let gzip_level = parse_u64("SHELFSCAN_GZIP_LEVEL", "6")?;
    if gzip_level > 9 {
        return Err(invalid(
            "SHELFSCAN_GZIP_LEVEL",
            format!("{gzip_level} is outside 0-9"),
        ));
    }

    Ok(AppConfig {
        log_level,
        search_base_url,
        search_keyword,
        output_path,
        locations,
        browser_headless,
        browser_no_sandbox,
        chrome_executable,
        navigation_timeout_secs,
        max_concurrent_locations,
        // Checked against 0-9 above.
        gzip_level: u32::try_from(gzip_level).unwrap_or(6),
    })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Splits a comma-separated location list, dropping blank entries.
fn split_locations(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
