//! File upload and deletion CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;
use vidavox_rs::{Client, DeleteOutcome, UploadResponse};

use crate::output::{self, OutputFormat};

/// Arguments for file commands
#[derive(Debug, Args)]
pub struct FileArgs {
    /// File subcommand
    #[command(subcommand)]
    pub command: FileCommand,
}

/// File subcommands
#[derive(Debug, Subcommand)]
pub enum FileCommand {
    /// Upload local files into a folder
    Upload {
        /// Target folder name (or ID with --id)
        folder: String,
        /// Files to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Treat the folder as an ID
        #[arg(long)]
        id: bool,
    },
    /// Ask the service to ingest a directory
    Ingest {
        /// Target folder ID
        folder_id: String,
        /// Directory to ingest
        directory: PathBuf,
    },
    /// Delete files by ID
    Delete {
        /// File IDs
        #[arg(required = true)]
        ids: Vec<String>,
        /// Stop at the first failed deletion
        #[arg(long)]
        stop_on_error: bool,
    },
}

/// Upload display row
#[derive(Debug, Serialize, Tabled)]
struct UploadRow {
    /// File ID
    id: String,
    /// Name
    name: String,
    /// Size
    size: String,
    /// Status
    status: String,
}

/// Delete display row
#[derive(Debug, Serialize, Tabled)]
struct DeleteRow {
    /// File ID
    id: String,
    /// Result
    result: String,
}

fn upload_rows(response: &UploadResponse) -> Vec<UploadRow> {
    response
        .results
        .iter()
        .map(|result| match &result.file {
            Some(file) => UploadRow {
                id: file.id.clone(),
                name: file.name.clone(),
                size: file.size_human(),
                status: if result.success {
                    file.status.clone()
                } else {
                    result.error.clone().unwrap_or_else(|| "failed".to_string())
                },
            },
            None => UploadRow {
                id: "-".to_string(),
                name: "-".to_string(),
                size: "-".to_string(),
                status: result.error.clone().unwrap_or_else(|| "failed".to_string()),
            },
        })
        .collect()
}

fn delete_rows(outcomes: &[DeleteOutcome]) -> Vec<DeleteRow> {
    outcomes
        .iter()
        .map(|o| DeleteRow {
            id: o.file_id.clone(),
            result: match &o.error {
                None => "deleted".to_string(),
                Some(e) => e.clone(),
            },
        })
        .collect()
}

fn print_upload(response: &UploadResponse, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(response),
        OutputFormat::Table => {
            output::print_list(&upload_rows(response), format);
            println!("{}", response);
        }
    }
}

/// Execute file commands
pub async fn execute(args: &FileArgs, client: &Client, format: OutputFormat) -> anyhow::Result<()> {
    match &args.command {
        FileCommand::Upload { folder, paths, id } => {
            let response = if *id {
                client.upload_files(folder, paths).await?
            } else {
                client.upload_files_to_folder(folder, paths).await?
            };
            print_upload(&response, format);
        }
        FileCommand::Ingest {
            folder_id,
            directory,
        } => {
            let response = client.process_directory(folder_id, directory).await?;
            print_upload(&response, format);
        }
        FileCommand::Delete { ids, stop_on_error } => {
            let outcomes = client.delete_files(ids, *stop_on_error).await?;
            let failed = outcomes.iter().filter(|o| !o.deleted).count();
            output::print_list(&delete_rows(&outcomes), format);
            if failed > 0 {
                anyhow::bail!("{} of {} deletions failed", failed, outcomes.len());
            }
        }
    }

    Ok(())
}
