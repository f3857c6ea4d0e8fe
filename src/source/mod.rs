//! Archive input sources.
//!
//! This module decides how an archive file is encoded and loads it:
//! - [`ArchiveFormat`] is the concrete encoding used to decode a file
//! - [`FormatChoice`] is the user-facing setting (`auto` follows the extension)
//! - [`FileSource`] opens and decodes the file

use crate::model::error::InputError;
use crate::model::MsgStream;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub mod file;

pub use file::FileSource;

// Extensions that mark a plain JSON archive
const JSON_EXTENSIONS: [&str; 2] = ["json", "js"];

/// Concrete encoding of an archive file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Serialized JSON.
    Json,
    /// The same JSON, base64-encoded.
    Base64,
}

impl ArchiveFormat {
    /// Infer the encoding from a file name.
    ///
    /// `.json` and `.js` files are plain JSON; everything else is base64.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if JSON_EXTENSIONS.contains(&ext) => ArchiveFormat::Json,
            _ => ArchiveFormat::Base64,
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveFormat::Json => f.write_str("json"),
            ArchiveFormat::Base64 => f.write_str("base64"),
        }
    }
}

/// How the user asked for the archive to be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FormatChoice {
    /// Decide from the file extension.
    #[default]
    Auto,
    /// Always plain JSON.
    Json,
    /// Always base64-wrapped JSON.
    Base64,
}

impl FormatChoice {
    /// The concrete format to use for `path`.
    pub fn resolve(self, path: &Path) -> ArchiveFormat {
        match self {
            FormatChoice::Auto => ArchiveFormat::from_path(path),
            FormatChoice::Json => ArchiveFormat::Json,
            FormatChoice::Base64 => ArchiveFormat::Base64,
        }
    }

    /// Lowercase name, as accepted by `--format` and the config file.
    pub fn as_str(self) -> &'static str {
        match self {
            FormatChoice::Auto => "auto",
            FormatChoice::Json => "json",
            FormatChoice::Base64 => "base64",
        }
    }
}

impl FromStr for FormatChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(FormatChoice::Auto),
            "json" => Ok(FormatChoice::Json),
            "base64" => Ok(FormatChoice::Base64),
            other => Err(format!(
                "unknown archive format '{other}' (expected auto, json or base64)"
            )),
        }
    }
}

/// Open and fully decode the archive at `path`.
///
/// # Errors
///
/// Returns `InputError::FileNotFound` if the file does not exist,
/// `InputError::Malformed` if it does not decode under the resolved format,
/// and `InputError::Io` for other I/O errors.
pub fn load_archive(
    path: impl Into<PathBuf>,
    choice: FormatChoice,
) -> Result<MsgStream, InputError> {
    FileSource::new(path, choice)?.load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_extensions_are_plain_json() {
        assert_eq!(ArchiveFormat::from_path(Path::new("chat.json")), ArchiveFormat::Json);
        assert_eq!(ArchiveFormat::from_path(Path::new("dir/chat.js")), ArchiveFormat::Json);
    }

    #[test]
    fn other_extensions_are_base64() {
        for name in ["chat.txt", "chat", "chat.b64", "chat.json.bak", "chat.JSON"] {
            assert_eq!(
                ArchiveFormat::from_path(Path::new(name)),
                ArchiveFormat::Base64,
                "{name}"
            );
        }
    }

    #[test]
    fn explicit_choice_overrides_extension() {
        let path = Path::new("chat.json");
        assert_eq!(FormatChoice::Base64.resolve(path), ArchiveFormat::Base64);
        assert_eq!(FormatChoice::Json.resolve(Path::new("chat.txt")), ArchiveFormat::Json);
        assert_eq!(FormatChoice::Auto.resolve(path), ArchiveFormat::Json);
    }

    #[test]
    fn format_choice_parses_case_insensitively() {
        assert_eq!("JSON".parse::<FormatChoice>(), Ok(FormatChoice::Json));
        assert_eq!(" base64 ".parse::<FormatChoice>(), Ok(FormatChoice::Base64));
        assert_eq!("auto".parse::<FormatChoice>(), Ok(FormatChoice::Auto));
        assert!("yaml".parse::<FormatChoice>().is_err());
    }

    #[test]
    fn format_choice_round_trips_through_as_str() {
        for choice in [FormatChoice::Auto, FormatChoice::Json, FormatChoice::Base64] {
            assert_eq!(choice.as_str().parse::<FormatChoice>(), Ok(choice));
        }
    }

    #[test]
    fn archive_format_display() {
        assert_eq!(ArchiveFormat::Json.to_string(), "json");
        assert_eq!(ArchiveFormat::Base64.to_string(), "base64");
    }
}
