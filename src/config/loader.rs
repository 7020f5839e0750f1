//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{flexible_date, NmdoseConfig};
use crate::config::secret_connection_string;
use crate::domain::errors::NmdoseError;
use crate::domain::ids::AeTitle;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("environment placeholder pattern is valid")
});

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into NmdoseConfig
/// 4. Applies environment variable overrides (NMDOSE_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - An override has an unparsable value
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use nmdose::config::loader::load_config;
///
/// let config = load_config("nmdose.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<NmdoseConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(NmdoseError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        NmdoseError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Loads configuration from TOML text
///
/// Same pipeline as [`load_config`] without the file read.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_from_str(contents: &str) -> Result<NmdoseConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: NmdoseConfig = toml::from_str(&contents)
        .map_err(|e| NmdoseError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        NmdoseError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied unchanged.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = ENV_VAR_RE.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(NmdoseError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            NmdoseError::Configuration(format!("Invalid value '{raw}' for {name}: {e}"))
        }),
        Err(_) => Ok(None),
    }
}

fn env_aet(name: &str) -> Result<Option<AeTitle>> {
    env_parse::<AeTitle>(name)
}

/// Applies environment variable overrides using NMDOSE_* prefix
///
/// Environment variables follow the pattern: NMDOSE_<SECTION>_<KEY>
/// For example: NMDOSE_RUNNING_MODE, NMDOSE_SCHEDULE_BATCH_DAYS
///
/// # Errors
///
/// Returns an error if an override is set to a value that does not parse.
fn apply_env_overrides(config: &mut NmdoseConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("NMDOSE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_parse("NMDOSE_APPLICATION_DRY_RUN")? {
        config.application.dry_run = val;
    }
    if let Some(val) = env_parse::<super::schema::RunningMode>("NMDOSE_RUNNING_MODE")? {
        config.running_mode = val;
    }

    // Network overrides
    for (name, endpoint) in [
        ("RESEARCH", &mut config.network.research),
        ("CLINICAL", &mut config.network.clinical),
        ("SIMULATION", &mut config.network.simulation),
    ] {
        if let Some(aet) = env_aet(&format!("NMDOSE_NETWORK_{name}_AET"))? {
            endpoint.aet = aet;
        }
        if let Ok(host) = std::env::var(format!("NMDOSE_NETWORK_{name}_HOST")) {
            endpoint.host = host;
        }
        if let Some(port) = env_parse(&format!("NMDOSE_NETWORK_{name}_PORT"))? {
            endpoint.port = port;
        }
    }

    // Schedule overrides
    if let Ok(val) = std::env::var("NMDOSE_SCHEDULE_BATCH_START_DATE") {
        config.schedule.batch.start_date =
            flexible_date::parse(&val).map_err(NmdoseError::Configuration)?;
    }
    if let Some(val) = env_parse("NMDOSE_SCHEDULE_BATCH_DAYS")? {
        config.schedule.batch.batch_days = val;
    }
    if let Ok(val) = std::env::var("NMDOSE_SCHEDULE_DAILY_START_DATE") {
        config.schedule.daily.start_date =
            flexible_date::parse(&val).map_err(NmdoseError::Configuration)?;
    }

    // Retrieve overrides
    if let Ok(val) = std::env::var("NMDOSE_RETRIEVE_CATEGORIES") {
        config.retrieve.categories = split_list(&val);
    }

    // Protocol overrides
    if let Ok(val) = std::env::var("NMDOSE_PROTOCOL_FIND_COMMAND") {
        config.protocol.find_command = val;
    }
    if let Ok(val) = std::env::var("NMDOSE_PROTOCOL_MOVE_COMMAND") {
        config.protocol.move_command = val;
    }
    if let Some(val) = env_parse("NMDOSE_PROTOCOL_TIMEOUT_SECONDS")? {
        config.protocol.timeout_seconds = val;
    }
    if let Some(val) = env_aet("NMDOSE_PROTOCOL_MOVE_DESTINATION")? {
        config.protocol.move_destination = Some(val);
    }
    if let Some(val) = env_parse("NMDOSE_PROTOCOL_MAX_CONCURRENT_TRANSFERS")? {
        config.protocol.max_concurrent_transfers = val;
    }
    if let Some(val) = env_parse("NMDOSE_PROTOCOL_MAX_ERROR_DETAIL_CHARS")? {
        config.protocol.max_error_detail_chars = val;
    }

    // Transfer and output overrides
    if let Some(val) = env_parse("NMDOSE_TRANSFER_ENABLED")? {
        config.transfer.enabled = val;
    }
    if let Some(val) = env_parse("NMDOSE_OUTPUT_ENABLED")? {
        config.output.enabled = val;
    }
    if let Ok(val) = std::env::var("NMDOSE_OUTPUT_RAW_LOG_DIR") {
        config.output.raw_log_dir = val;
    }

    // PostgreSQL overrides
    if let Ok(val) = std::env::var("NMDOSE_POSTGRESQL_CONNECTION_STRING") {
        config.postgresql.connection_string = secret_connection_string(val);
    }
    if let Some(val) = env_parse("NMDOSE_POSTGRESQL_MAX_CONNECTIONS")? {
        config.postgresql.max_connections = val;
    }

    // Logging overrides
    if let Some(val) = env_parse("NMDOSE_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("NMDOSE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

/// Split a comma-separated list, dropping blank entries
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
