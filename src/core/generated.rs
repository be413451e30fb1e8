//! Naming and provenance header of the generated configuration file.

use reqwest::Url;
use std::path::{Path, PathBuf};

/// Fixed filename of the merged configuration written beside the local one.
pub const GENERATED_FILE_NAME: &str = ".golangci.generated.yml";

/// Path of the generated file for a given local configuration path.
///
/// ```rust
/// use golangcix::core::generated_path;
/// use std::path::Path;
///
/// assert_eq!(generated_path(Path::new(".golangci.yml")), Path::new(".golangci.generated.yml"));
/// assert_eq!(
///     generated_path(Path::new("configs/lint.yml")),
///     Path::new("configs/.golangci.generated.yml")
/// );
/// ```
pub fn generated_path(local_config: &Path) -> PathBuf {
    match local_config.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && dir != Path::new(".") => {
            dir.join(GENERATED_FILE_NAME)
        }
        _ => PathBuf::from(GENERATED_FILE_NAME),
    }
}

/// Comment block written at the top of every generated file.
pub fn header(remote_url: Option<&Url>, local_config: &Path) -> String {
    let remote = remote_url.map_or_else(|| "not configured".to_string(), Url::to_string);

    format!(
        "# WARNING: GENERATED FILE - DO NOT EDIT\n\
         #\n\
         # Generated by golangcix.\n\
         # Local overrides: {}\n\
         # Remote base: {remote}\n\
         #\n\n",
        local_config.display()
    )
}
