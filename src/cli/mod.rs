//! CLI Module
//!
//! Command-line front-end editing project documents through the parameter
//! registry.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MCAT project tool - inspect and edit cluster analysis projects
#[derive(Parser, Debug)]
#[command(name = "mcat-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new, empty project file
    #[command(name = "new")]
    New {
        /// Project file to create
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Add a sample to a project
    #[command(name = "add-sample")]
    AddSample {
        /// Project file
        path: PathBuf,

        /// Sample name, unique within the project
        name: String,

        /// Treatment group of the sample
        #[arg(short, long)]
        treatment: Option<String>,

        /// Raw input hyperstack
        #[arg(long)]
        raw_image: Option<PathBuf>,

        /// Tissue region of interest
        #[arg(long)]
        roi: Option<PathBuf>,
    },

    /// Show the parameters of the project or of one sample
    #[command(name = "show")]
    Show {
        /// Project file
        path: PathBuf,

        /// Show this sample instead of the project settings
        #[arg(short, long)]
        sample: Option<String>,

        /// Include parameters hidden from users
        #[arg(short, long)]
        all: bool,
    },

    /// Set a parameter by its qualified key (e.g. clustering/kmeans-k)
    #[command(name = "set")]
    Set {
        /// Project file
        path: PathBuf,

        /// Qualified parameter key
        key: String,

        /// New value, parsed as the parameter's type
        value: String,

        /// Set the parameter on this sample
        #[arg(short, long)]
        sample: Option<String>,
    },

    /// Add a custom parameter to a sample
    #[command(name = "add-parameter")]
    AddParameter {
        /// Project file
        path: PathBuf,

        /// Sample name
        sample: String,

        /// Parameter key
        key: String,

        /// Field type (bool, int, double, string, enum, path, custom)
        #[arg(value_name = "TYPE")]
        field_type: String,

        /// Initial value
        #[arg(long)]
        value: Option<String>,
    },

    /// Check that every sample has valid input data
    #[command(name = "validate")]
    Validate {
        /// Project file
        path: PathBuf,
    },

    /// Print a generated sequence of values for a field type
    #[command(name = "generate")]
    Generate {
        /// Field type of the generated values (int, double)
        #[arg(value_name = "TYPE")]
        field_type: String,

        /// First value
        #[arg(long)]
        from: String,

        /// Last value (inclusive)
        #[arg(long)]
        to: String,

        /// Step between values
        #[arg(long, default_value = "1")]
        step: String,

        /// Generator name, as listed by the registry
        #[arg(short, long, default_value = "Number sequence")]
        generator: String,
    },

    /// Print the compact parameter label of the project or a sample
    #[command(name = "label")]
    Label {
        /// Project file
        path: PathBuf,

        /// Label this sample instead of the clustering settings
        #[arg(short, long)]
        sample: Option<String>,
    },
}
