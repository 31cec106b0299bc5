//! CMake generator selection.

use crate::util::process::find_executable;

/// Build-file generator handed to CMake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generator {
    UnixMakefiles,
    Ninja,
    NMake,
    NMakeJom,
    /// Any other generator name; no parallel flag is passed.
    Other(String),
}

impl Generator {
    /// Parse a CMake generator name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Unix Makefiles" => Generator::UnixMakefiles,
            "Ninja" => Generator::Ninja,
            "NMake Makefiles" => Generator::NMake,
            "NMake Makefiles JOM" => Generator::NMakeJom,
            other => Generator::Other(other.to_string()),
        }
    }

    /// Pick a generator for the host.
    ///
    /// Ninja wins when it is on PATH. Otherwise the IDE platform uses JOM if
    /// available and falls back to plain NMake; everything else uses make.
    pub fn detect(native_ide: bool) -> Self {
        if find_executable("ninja").is_some() {
            return Generator::Ninja;
        }
        if native_ide {
            if find_executable("jom").is_some() {
                Generator::NMakeJom
            } else {
                Generator::NMake
            }
        } else {
            Generator::UnixMakefiles
        }
    }

    /// The `-G` argument.
    pub fn cmake_name(&self) -> &str {
        match self {
            Generator::UnixMakefiles => "Unix Makefiles",
            Generator::Ninja => "Ninja",
            Generator::NMake => "NMake Makefiles",
            Generator::NMakeJom => "NMake Makefiles JOM",
            Generator::Other(name) => name,
        }
    }

    /// Native build tool arguments requesting `jobs` parallel jobs.
    pub fn parallel_args(&self, jobs: usize) -> Vec<String> {
        match self {
            Generator::UnixMakefiles | Generator::Ninja => vec!["-j".to_string(), jobs.to_string()],
            Generator::NMakeJom => vec!["/J".to_string(), jobs.to_string()],
            Generator::NMake | Generator::Other(_) => Vec::new(),
        }
    }
}
