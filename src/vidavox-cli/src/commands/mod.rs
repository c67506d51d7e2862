//! CLI command definitions and dispatch.

pub mod file;
pub mod folder;
pub mod search;

use anyhow::Context;
use clap::{Parser, Subcommand};
use vidavox_rs::{Client, ClientConfig};

use crate::output::{self, OutputFormat};

/// Vidavox — client for the Vidavox RAG document service
#[derive(Debug, Parser)]
#[command(name = "vidavox", version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Service base URL (overrides config and VIDAVOX_API_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key (overrides config and VIDAVOX_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check that the service is reachable
    Health,
    /// Folder management
    Folder(folder::FolderArgs),
    /// File upload and deletion
    File(file::FileArgs),
    /// Search the documents of a folder
    Search(search::SearchArgs),
}

impl Cli {
    /// Assemble the client configuration: file, then environment, then flags
    pub fn load_config<I>(&self, env: I) -> anyhow::Result<ClientConfig>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };
        let mut config = config.apply_env(env)?;

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = api_key.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }

        config.validate().context("invalid client configuration")?;
        Ok(config)
    }

    /// Execute the CLI command
    pub async fn execute(&self, client: &Client) -> anyhow::Result<()> {
        match &self.command {
            Commands::Health => {
                client.health().await?;
                output::print_success(&format!("{} is healthy", client.base_url()));
                Ok(())
            }
            Commands::Folder(args) => folder::execute(args, client, self.format).await,
            Commands::File(args) => file::execute(args, client, self.format).await,
            Commands::Search(args) => search::execute(args, client, self.format).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_flags_override_environment() {
        let cli = Cli::parse_from([
            "vidavox",
            "--base-url",
            "http://flag:1",
            "--timeout",
            "5",
            "health",
        ]);
        let config = cli
            .load_config(env(&[
                ("VIDAVOX_API_BASE_URL", "http://env:2"),
                ("VIDAVOX_API_KEY", "env-key"),
            ]))
            .unwrap();

        assert_eq!(config.base_url, "http://flag:1");
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let cli = Cli::parse_from(["vidavox", "health"]);
        assert!(cli.load_config(Vec::new()).is_err());
    }

    #[test]
    fn test_parses_nested_commands() {
        let cli = Cli::parse_from([
            "vidavox", "--format", "json", "folder", "files", "Docs", "--recursive",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Folder(folder::FolderArgs {
                command: folder::FolderCommand::Files { name, recursive },
            }) => {
                assert_eq!(name, "Docs");
                assert!(recursive);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
