//! Configuration resolution: parsing, directive lookup, merging, and the
//! pipeline that writes the generated file.

mod args;
mod directive;
mod document;
mod generated;
mod merge;
mod service;

pub use args::{ConfigFlag, DEFAULT_CANDIDATES, build_final_args, parse_config_flag};
pub use directive::{REMOTE_DIRECTIVE, extract_remote_url, normalize_url};
pub use document::{Document, Scalar, normalize};
pub use generated::{GENERATED_FILE_NAME, generated_path, header};
pub use merge::merge;
pub use service::{ConfigService, RemoteResolution, Service};
