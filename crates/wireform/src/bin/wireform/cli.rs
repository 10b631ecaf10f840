//! wireform cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;
use wireform::registry::Family;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; wireform ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode resource definitions into their wire form
    ///
    /// Reads HCL from stdin unless any other source is provided (via --input-*)
    #[command(alias = "enc")]
    Encode(EncodeCommand),

    /// Decode a wire form response back into human form
    ///
    /// Reads wire JSON from stdin unless --file is provided
    #[command(alias = "dec")]
    Decode(DecodeCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct EncodeCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct DecodeCommand {
    /// Resource family the wire value belongs to
    #[arg(value_enum)]
    pub family: FamilyArg,

    /// Wire JSON file (stdin when absent)
    #[clap(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Previously stored human form state (YAML or JSON)
    ///
    /// Decides which spelling legacy fields are re-emitted in.
    #[clap(short = 'p', long = "prior")]
    pub prior: Option<PathBuf>,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FamilyArg {
    Dataset,
    Datastore,
    Classifier,
}

impl From<FamilyArg> for Family {
    fn from(value: FamilyArg) -> Self {
        match value {
            FamilyArg::Dataset => Family::Dataset,
            FamilyArg::Datastore => Family::Datastore,
            FamilyArg::Classifier => Family::Classifier,
        }
    }
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load files from work directory
    #[clap(short = 'w', long = "input-workdir")]
    pub workdir: bool,

    /// Load a file
    #[clap(short = 'f', long = "input-file")]
    pub files: Vec<PathBuf>,

    /// Load files from given directory
    #[clap(short = 'd', long = "input-dir")]
    pub directories: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    Documents,
    Resources,
}
