//! Build configurations and target architectures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named build variant understood by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Configuration {
    Release,
    Debug,
    MinSizeRel,
    RelWithDebInfo,
}

impl Configuration {
    /// All known configurations.
    pub const ALL: [Configuration; 4] = [
        Configuration::Release,
        Configuration::Debug,
        Configuration::MinSizeRel,
        Configuration::RelWithDebInfo,
    ];

    /// The name passed to the generator and used for working directories.
    pub fn as_str(&self) -> &'static str {
        match self {
            Configuration::Release => "Release",
            Configuration::Debug => "Debug",
            Configuration::MinSizeRel => "MinSizeRel",
            Configuration::RelWithDebInfo => "RelWithDebInfo",
        }
    }

    /// Whether the configuration builds without optimization.
    pub fn is_unoptimized(&self) -> bool {
        matches!(self, Configuration::Debug)
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Configuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Configuration::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown configuration '{}'; expected one of Release, Debug, MinSizeRel, RelWithDebInfo",
                    s
                )
            })
    }
}

/// Target architecture for the native toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    X86,
    X64,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
        }
    }

    /// Argument understood by the compiler suite's environment-setup script.
    pub fn setup_script_arg(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "amd64",
        }
    }

    /// The narrower of the two supported architectures.
    pub fn is_32_bit(&self) -> bool {
        matches!(self, Architecture::X86)
    }

    /// Architecture matching the running host.
    pub fn host() -> Self {
        if cfg!(target_pointer_width = "64") {
            Architecture::X64
        } else {
            Architecture::X86
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x86" | "i686" | "win32" => Ok(Architecture::X86),
            "x64" | "x86_64" | "amd64" => Ok(Architecture::X64),
            _ => Err(format!(
                "unknown target architecture '{}'; expected 'x86' or 'x64'",
                s
            )),
        }
    }
}
