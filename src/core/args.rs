//! Handling of the `-c`/`--config` flag in the linter's argument vector.

use crate::error::{ConfigError, Result};

const CONFIG_EQUALS_PREFIX: &str = "--config=";

/// Local configuration filenames probed in order when no flag is given.
///
/// Local override variants come first, then the generic ones.
pub const DEFAULT_CANDIDATES: [&str; 4] = [
    ".golangci.local.yml",
    ".golangci.local.yaml",
    ".golangci.yml",
    ".golangci.yaml",
];

/// Result of scanning arguments for a config flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFlag {
    /// Value given to the flag (may be empty).
    pub path: String,
    /// Whether a config flag was present at all.
    pub provided: bool,
}

/// Find the value of the first `-c VALUE`, `--config VALUE`, or
/// `--config=VALUE` in `args`.
///
/// # Errors
///
/// Returns [`ConfigError::MissingConfigValue`] when `-c`/`--config` is the
/// last argument.
pub fn parse_config_flag<S: AsRef<str>>(args: &[S]) -> Result<ConfigFlag> {
    for (index, arg) in args.iter().enumerate() {
        let arg = arg.as_ref();
        if arg == "-c" || arg == "--config" {
            let value = args
                .get(index + 1)
                .ok_or(ConfigError::MissingConfigValue)?;
            return Ok(ConfigFlag {
                path: value.as_ref().to_string(),
                provided: true,
            });
        }
        if let Some(value) = arg.strip_prefix(CONFIG_EQUALS_PREFIX) {
            return Ok(ConfigFlag {
                path: value.to_string(),
                provided: true,
            });
        }
    }

    Ok(ConfigFlag {
        path: String::new(),
        provided: false,
    })
}

/// Rewrite the user's arguments for the linter.
///
/// Every config flag (and its value) is removed, then `--config <generated>`
/// is appended, or `--config <local>` if nothing was generated. An empty
/// result becomes `["run"]`.
pub fn build_final_args<S: AsRef<str>>(
    original: &[S],
    generated_config: &str,
    local_config: &str,
) -> Vec<String> {
    let mut final_args = Vec::with_capacity(original.len() + 2);
    let mut skip_next = false;

    for arg in original {
        let arg = arg.as_ref();
        if skip_next {
            skip_next = false;
            continue;
        }
        match arg {
            "-c" | "--config" => skip_next = true,
            _ if arg.starts_with(CONFIG_EQUALS_PREFIX) => {}
            _ => final_args.push(arg.to_string()),
        }
    }

    if !generated_config.is_empty() {
        final_args.extend(["--config".to_string(), generated_config.to_string()]);
    } else if !local_config.is_empty() {
        final_args.extend(["--config".to_string(), local_config.to_string()]);
    }

    if final_args.is_empty() {
        final_args.push("run".to_string());
    }

    final_args
}
