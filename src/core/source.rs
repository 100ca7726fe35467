//! HDL source files handed to the synthesizers.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// HDL language of a source file.
///
/// The lowercase name doubles as the XST project keyword and the yosys
/// `read_<language>` command suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Verilog,
    Vhdl,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Verilog => "verilog",
            Language::Vhdl => "vhdl",
        }
    }

    /// Guess the language from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "v" | "vh" | "sv" => Some(Language::Verilog),
            "vhd" | "vhdl" => Some(Language::Vhdl),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A source file and its language. Order of a source list is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: Language,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, language: Language) -> Self {
        SourceFile {
            path: path.into(),
            language,
        }
    }

    pub fn verilog(path: impl Into<PathBuf>) -> Self {
        SourceFile::new(path, Language::Verilog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("v"), Some(Language::Verilog));
        assert_eq!(Language::from_extension("VHD"), Some(Language::Vhdl));
        assert_eq!(Language::from_extension("c"), None);
    }
}
