use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "twig",
    about = "twig: a small content-addressed version control store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Run as if started in this directory
    #[arg(short = 'C', global = true)]
    pub dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty repository or re-initialise an existing one
    Init(InitArgs),
    /// Compute an object id, optionally writing the object
    HashObject(HashObjectArgs),
    /// Print the content of a stored object
    CatFile(CatFileArgs),
    /// Show commit history
    Log(LogArgs),
    /// Find the common ancestor of commits
    MergeBase(MergeBaseArgs),
    /// Point a reference at an object
    UpdateRef(UpdateRefArgs),
    /// Show a single commit
    Show(ShowArgs),
}

#[derive(Args)]
pub struct InitArgs {
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct HashObjectArgs {
    /// Write the object into the repository
    #[arg(short = 'w')]
    pub write: bool,
    #[arg(short = 't', default_value = "blob")]
    pub kind: String,
    pub file: PathBuf,
}

#[derive(Args)]
pub struct CatFileArgs {
    pub kind: String,
    pub object: String,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(default_value = "HEAD")]
    pub rev: String,
    #[arg(long)]
    pub no_color: bool,
    #[arg(short = 'n', long = "max-count")]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct MergeBaseArgs {
    #[arg(required = true)]
    pub revs: Vec<String>,
}

#[derive(Args)]
pub struct UpdateRefArgs {
    pub name: String,
    pub rev: String,
}

#[derive(Args)]
pub struct ShowArgs {
    #[arg(default_value = "HEAD")]
    pub rev: String,
    #[arg(long)]
    pub no_color: bool,
}
