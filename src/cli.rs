use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::Engine;

#[derive(Parser)]
#[command(name = "makedoc")]
#[command(about = "Per-directory README generation from packed docs and source comments")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialise the makedoc folder for a project
    Init {
        /// Project root (defaults to the current directory)
        dir: Option<PathBuf>,
    },

    /// Generate the doc file for a directory
    Generate {
        /// Target directory (defaults to the current directory)
        dir: Option<PathBuf>,
    },

    /// Repack the directory doc into the packed store
    Pack {
        /// Target directory (defaults to the current directory)
        dir: Option<PathBuf>,

        /// Recursively apply the command to all non-ignored subdirs
        #[arg(short, long)]
        recurse: bool,

        /// Update existing doc files afterwards
        #[arg(short, long)]
        update: bool,

        /// Combines --recurse and --update in one single flag
        #[arg(long)]
        recurse_update: bool,
    },

    /// Unpack the directory doc into an editable file
    Unpack {
        /// Target directory (defaults to the current directory)
        dir: Option<PathBuf>,

        /// Recursively apply the command to all non-ignored subdirs
        #[arg(short, long)]
        recurse: bool,
    },

    /// Rewrite doc files that already exist
    Update {
        /// Target directory (defaults to the current directory)
        dir: Option<PathBuf>,

        /// Recursively apply the command to all non-ignored subdirs
        #[arg(short, long)]
        recurse: bool,

        /// Pack the directory doc afterwards
        #[arg(short, long)]
        pack: bool,

        /// Combines --recurse and --pack in one single flag
        #[arg(long)]
        recurse_pack: bool,
    },

    /// Check the parsing without touching files
    Check {
        /// Target directory (defaults to the current directory)
        dir: Option<PathBuf>,

        /// Recursively apply the command to all non-ignored subdirs
        #[arg(short, long)]
        recurse: bool,
    },
}

impl Cli {
    pub fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Init { dir } => engine.init(dir)?,
            Commands::Generate { dir } => engine.generate(dir)?,
            Commands::Pack {
                dir,
                recurse,
                update,
                recurse_update,
            } => engine.pack(dir, recurse || recurse_update, update || recurse_update)?,
            Commands::Unpack { dir, recurse } => engine.unpack(dir, recurse)?,
            Commands::Update {
                dir,
                recurse,
                pack,
                recurse_pack,
            } => engine.update(dir, recurse || recurse_pack, pack || recurse_pack)?,
            Commands::Check { dir, recurse } => engine.check(dir, recurse)?,
        }
        Ok(())
    }
}
