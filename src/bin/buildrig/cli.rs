//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use buildrig::{Architecture, Configuration};

/// buildrig - configure, build, test and package CMake projects
#[derive(Parser)]
#[command(name = "buildrig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure, build, test and install every requested configuration
    Build(BuildArgs),

    /// Build a distribution package from a clean source snapshot
    Package(PackageArgs),

    /// Convert an existing CTest report into a JUnit document
    Translate(TranslateArgs),

    /// Locate the compiler suite and show its environment
    Toolchain(ToolchainArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that builds.
#[derive(Args)]
pub struct RequestArgs {
    /// Configurations to build, in order (Release, Debug, MinSizeRel, RelWithDebInfo)
    #[arg(short, long = "config", value_delimiter = ',', default_value = "Release")]
    pub configs: Vec<Configuration>,

    /// Target architecture (x86 or x64); defaults to the host
    #[arg(long)]
    pub arch: Option<Architecture>,

    /// Source directory containing the top-level CMakeLists.txt
    #[arg(long, default_value = ".")]
    pub source: PathBuf,

    /// Root of the per-configuration working directories
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Number of parallel jobs (defaults to an estimate from CPUs and memory)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// CMake generator to use
    #[arg(short = 'G', long)]
    pub generator: Option<String>,

    /// Don't run the test suites
    #[arg(long)]
    pub skip_tests: bool,

    /// Plain-text build log (defaults to buildlog.txt in the work directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Write the final test totals to this file as JSON
    #[arg(long)]
    pub summary_json: Option<PathBuf>,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Toolchain to use (vs2015, vs2017, vs2019, vs2022)
    #[arg(long)]
    pub studio: Option<String>,

    /// Install into this prefix instead of the default location
    #[arg(long, conflicts_with = "stage")]
    pub install: Option<PathBuf>,

    /// Stage install components into the work directory
    #[arg(long)]
    pub stage: bool,

    /// Build the installer after all configurations (implies --stage)
    #[arg(long)]
    pub package: bool,

    /// Run the clean target before building each configuration
    #[arg(long)]
    pub clean: bool,

    /// The Java bindings are part of the build
    #[arg(long)]
    pub java: bool,
}

#[derive(Args)]
pub struct PackageArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Reuse the previous packaging tree instead of starting from a fresh snapshot
    #[arg(long)]
    pub resume: bool,

    /// Source package name (defaults to the source directory name)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct TranslateArgs {
    /// Build directory containing Testing/TAG
    pub build_dir: PathBuf,

    /// Suite name; also names the output file
    #[arg(long, default_value = "tests")]
    pub suite: String,

    /// Output directory (defaults to the build directory)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Captured test runner output, to recognize runs without tests
    #[arg(long)]
    pub runner_output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ToolchainArgs {
    /// Target architecture (x86 or x64); defaults to the host
    #[arg(long)]
    pub arch: Option<Architecture>,

    /// Toolchain to use (vs2015, vs2017, vs2019, vs2022)
    #[arg(long)]
    pub studio: Option<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
