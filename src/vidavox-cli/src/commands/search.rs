//! Search CLI command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use vidavox_rs::{Client, PromptType, SearchRequest};

use crate::output::{self, OutputFormat};

/// Arguments for the search command
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Folder name (or ID with --id)
    pub folder: String,
    /// Question to ask
    pub query: String,
    /// Treat the folder as an ID
    #[arg(long)]
    pub id: bool,
    /// Prompt style: agentic or consistency
    #[arg(long, default_value = "agentic")]
    pub prompt_type: PromptType,
    /// Restrict to documents under these prefixes
    #[arg(long = "prefix")]
    pub prefixes: Vec<String>,
    /// Only consider these document IDs
    #[arg(long = "include")]
    pub include_doc_ids: Vec<String>,
    /// Ignore these document IDs
    #[arg(long = "exclude")]
    pub exclude_doc_ids: Vec<String>,
    /// Maximum number of documents returned
    #[arg(long, default_value_t = 10)]
    pub max_results: usize,
    /// Number of chunks retrieved before answering
    #[arg(long)]
    pub top_k: Option<usize>,
    /// Minimum similarity for retrieved chunks
    #[arg(long)]
    pub threshold: Option<f32>,
}

impl SearchArgs {
    fn to_request(&self) -> SearchRequest {
        let mut request = SearchRequest::new(self.query.clone())
            .with_prompt_type(self.prompt_type)
            .with_prefixes(self.prefixes.clone())
            .include_docs(self.include_doc_ids.clone())
            .exclude_docs(self.exclude_doc_ids.clone())
            .with_max_results(self.max_results);
        request.top_k = self.top_k;
        request.threshold = self.threshold;
        request
    }
}

/// Ranked document row
#[derive(Debug, Serialize, Tabled)]
struct DocumentRow {
    /// Score
    score: String,
    /// Name
    name: String,
    /// Document ID
    id: String,
}

/// Execute the search command
pub async fn execute(args: &SearchArgs, client: &Client, format: OutputFormat) -> anyhow::Result<()> {
    let request = args.to_request();
    let response = if args.id {
        client.search(&args.folder, &request).await?
    } else {
        client.search_in_folder(&args.folder, &request).await?
    };

    match format {
        OutputFormat::Json => output::print_json(&response),
        OutputFormat::Table => {
            println!("{}\n", response.response);
            let rows: Vec<DocumentRow> = response
                .best_documents(args.max_results)
                .into_iter()
                .map(|doc| DocumentRow {
                    score: format!("{:.3}", doc.relevance_score),
                    name: doc.name.clone(),
                    id: doc.id.clone(),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: SearchArgs,
    }

    #[test]
    fn test_args_to_request() {
        let harness = Harness::parse_from([
            "search",
            "Docs",
            "what changed?",
            "--prompt-type",
            "consistency",
            "--prefix",
            "a/",
            "--prefix",
            "b/",
            "--top-k",
            "5",
            "--threshold",
            "0.4",
        ]);

        let request = harness.args.to_request();
        assert_eq!(request.query, "what changed?");
        assert_eq!(request.prompt_type, PromptType::Consistency);
        assert_eq!(request.prefixes, vec!["a/", "b/"]);
        assert_eq!(request.top_k, Some(5));
        assert_eq!(request.threshold, Some(0.4));
        assert_eq!(request.max_results, 10);
        assert!(!harness.args.id);
    }
}
