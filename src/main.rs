use anyhow::Result;
use clap::Parser;
use pullsecret::{
    cli::{Cli, Commands},
    config::Config,
    secret::SecretAction,
    service::PullSecretService,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Ensure { name, image } => {
            let service = PullSecretService::from_config(&load_config(&cli)?);
            let result = service.ensure(name, image)?;
            match result.action {
                SecretAction::Skipped => println!(
                    "no credentials for {}, skipping secret/{}",
                    result.host, name
                ),
                SecretAction::Unchanged => println!("secret/{} unchanged", name),
                SecretAction::Created => println!("secret/{} created", name),
                SecretAction::Replaced => println!("secret/{} replaced", name),
            }
        }
        Commands::Delete { name } => {
            let service = PullSecretService::from_config(&load_config(&cli)?);
            service.delete(name)?;
            println!("secret/{} deleted", name);
        }
        Commands::Host { image } => {
            let service = PullSecretService::from_config(&load_config(&cli)?);
            let host = service.host(image)?;
            println!("{}", host.address);
        }
        Commands::Version => {
            println!("pullsecret {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Config file values with command-line flags layered on top
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if cli.namespace.is_some() {
        config.namespace = cli.namespace.clone();
    }
    if cli.context.is_some() {
        config.context = cli.context.clone();
    }
    if cli.kubeconfig.is_some() {
        config.kubeconfig = cli.kubeconfig.clone();
    }
    if cli.kubectl.is_some() {
        config.kubectl = cli.kubectl.clone();
    }
    if cli.default_registry.is_some() {
        config.default_registry = cli.default_registry.clone();
    }

    debug!(
        "Using namespace {}",
        config.namespace.as_deref().unwrap_or("from kubeconfig")
    );
    Ok(config)
}
