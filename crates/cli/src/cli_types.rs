use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Match library entities in text and merge plugin results into movies.
#[derive(Parser)]
#[command(name = "marquee", version, about)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Print the ids of every known entity mentioned in TEXT
    Extract {
        /// Free-form text, typically a filename
        text: String,
    },

    /// Merge a plugin result into a movie and print the merged movie
    Merge {
        /// Movie JSON file
        movie: PathBuf,

        /// Plugin result JSON file
        result: PathBuf,
    },
}
