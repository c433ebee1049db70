use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pullsecret")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file (defaults to <config dir>/pullsecret/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Namespace to manage the secret in
    #[arg(short, long, global = true, env = "PULLSECRET_NAMESPACE")]
    pub namespace: Option<String>,

    /// kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Path to a kubeconfig file
    #[arg(long, global = true, value_name = "FILE")]
    pub kubeconfig: Option<PathBuf>,

    /// Path to the kubectl binary
    #[arg(long, global = true, value_name = "PATH")]
    pub kubectl: Option<PathBuf>,

    /// Registry used for images without a registry host
    /// (e.g., https://index.docker.io/v1/). Asks the docker daemon if unset
    #[arg(long, global = true, value_name = "ADDRESS")]
    pub default_registry: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or replace a pull secret for an image's registry
    Ensure {
        /// Name of the pull secret
        name: String,

        /// Image reference whose registry the secret authenticates against
        image: String,
    },

    /// Delete a pull secret if it exists
    Delete {
        /// Name of the pull secret
        name: String,
    },

    /// Print the registry host for an image reference
    Host {
        /// Image reference (e.g., ghcr.io/org/app:latest)
        image: String,
    },

    /// Show version information
    Version,
}
