use std::path::PathBuf;

use clap::{Parser, Subcommand};
use link_fs::Geometry;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Filesystem image
    pub image: PathBuf,

    /// Number of inode slots in the image
    #[arg(long, global = true, default_value_t = Geometry::DEFAULT.inodes)]
    pub inodes: u32,

    /// Number of data blocks in the image
    #[arg(long, global = true, default_value_t = Geometry::DEFAULT.blocks)]
    pub blocks: u32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Format a fresh image, truncating any existing file
    Create,

    /// List a directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
    },

    /// Add another name for an existing file or directory
    Link {
        /// Path of the inode to link
        target: String,
        /// Directory receiving the new entry
        dir: String,
        name: String,
    },

    /// Create a file holding TEXT
    Write { dir: String, name: String, text: String },

    /// Print a file
    Cat { path: String },

    /// Create a directory
    Mkdir { parent: String, name: String },

    /// Remove a directory entry
    Unlink { dir: String, name: String },
}

impl Cli {
    #[inline]
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.inodes, self.blocks)
    }
}
