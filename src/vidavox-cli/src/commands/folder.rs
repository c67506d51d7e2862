//! Folder management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use vidavox_rs::{Client, TreeNode};

use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// List folders
    List,
    /// Show the folder/file tree
    Tree,
    /// Create a new folder
    Create {
        /// Folder name
        name: String,
        /// Parent folder ID (omit for root)
        #[arg(short, long)]
        parent_id: Option<String>,
    },
    /// Delete a folder by name, or by ID with --id
    Delete {
        /// Folder name (or ID with --id)
        target: String,
        /// Treat the target as a folder ID
        #[arg(long)]
        id: bool,
    },
    /// List the file IDs in a folder
    Files {
        /// Folder name
        name: String,
        /// Include files in nested folders
        #[arg(short, long)]
        recursive: bool,
    },
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    /// Folder ID
    id: String,
    /// Name
    name: String,
    /// Parent
    parent: String,
    /// File count
    files: u64,
    /// Created at
    created_at: String,
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    client: &Client,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match &args.command {
        FolderCommand::List => {
            let list = client.list_folders().await?;
            let rows: Vec<FolderRow> = list
                .folders
                .iter()
                .map(|f| FolderRow {
                    id: f.id.clone(),
                    name: f.name.clone(),
                    parent: f.parent_id.clone().unwrap_or_else(|| "-".to_string()),
                    files: f.file_count,
                    created_at: f
                        .created_at
                        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        FolderCommand::Tree => {
            let nodes = client.get_folder_tree().await?;
            match format {
                OutputFormat::Json => output::print_json(&nodes),
                OutputFormat::Table => {
                    if nodes.is_empty() {
                        println!("No folders.");
                    }
                    print!("{}", render_tree(&nodes));
                }
            }
        }
        FolderCommand::Create { name, parent_id } => {
            let folder = client.create_folder(name, parent_id.as_deref()).await?;
            output::print_item(&folder, format);
        }
        FolderCommand::Delete { target, id } => {
            if *id {
                client.delete_folder(target).await?;
            } else {
                client.delete_folder_by_name(target).await?;
            }
            output::print_success(&format!("Folder '{}' deleted", target));
        }
        FolderCommand::Files { name, recursive } => {
            let ids = client.file_ids_in_folder_by_name(name, *recursive).await?;
            match format {
                OutputFormat::Json => output::print_json(&ids),
                OutputFormat::Table if ids.is_empty() => {
                    output::print_warning(&format!("No files in '{}'", name))
                }
                OutputFormat::Table => ids.iter().for_each(|id| println!("{}", id)),
            }
        }
    }

    Ok(())
}

/// Indented outline of the tree, one node per line
fn render_tree(nodes: &[TreeNode]) -> String {
    fn walk(nodes: &[TreeNode], depth: usize, out: &mut String) {
        for node in nodes {
            let marker = if node.is_folder() { "📁" } else { "📄" };
            out.push_str(&format!(
                "{}{} {} ({})\n",
                "  ".repeat(depth),
                marker,
                node.name,
                node.id
            ));
            walk(&node.children, depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(nodes, 0, &mut out);
    out
}
