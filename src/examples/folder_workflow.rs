//! Folder Workflow Example
//!
//! Creates a folder, uploads files into it by name, lists its file IDs,
//! searches it, then cleans everything up again.
//!
//! Run with: VIDAVOX_API_KEY=... cargo run --example folder_workflow -- a.pdf b.pdf

use vidavox_rs::{Client, ClientConfig, ClientError, SearchRequest};

const FOLDER: &str = "Example Docs";

#[tokio::main]
async fn main() -> vidavox_rs::Result<()> {
    let config = ClientConfig::default().apply_env(std::env::vars())?;
    let client = Client::from_config(&config)?;
    let files: Vec<String> = std::env::args().skip(1).collect();

    // Reuse the folder if it already exists
    match client.create_folder(FOLDER, None).await {
        Ok(folder) => println!("📁 Created folder {}", folder),
        Err(e) => match client.find_folder_id(FOLDER).await? {
            Some(id) => println!("📁 Using existing folder {} ({})", FOLDER, id),
            None => return Err(e),
        },
    }

    if !files.is_empty() {
        let uploaded = client.upload_files_to_folder(FOLDER, &files).await?;
        println!("⬆️  {}", uploaded);
    }

    let immediate = client.file_ids_in_folder_by_name(FOLDER, false).await?;
    let all = client.file_ids_in_folder_by_name(FOLDER, true).await?;
    println!("   Immediate file IDs: {:?}", immediate);
    println!("   All file IDs:       {:?}\n", all);

    let request = SearchRequest::new("What is the introduction of this paper?")
        .with_top_k(5)
        .with_threshold(0.4);
    let results = client.search_in_folder(FOLDER, &request).await?;
    println!("🔍 {}", results.response);
    for doc in results.best_documents(3) {
        println!("   {}", doc);
    }

    for outcome in client.delete_files(&all, false).await? {
        println!("🗑️  {} deleted={}", outcome.file_id, outcome.deleted);
    }

    client.delete_folder_by_name(FOLDER).await?;
    match client.delete_folder_by_name(FOLDER).await {
        Err(ClientError::NotFound(_)) => println!("✅ Folder removed"),
        other => println!("Unexpected second delete result: {:?}", other),
    }

    Ok(())
}
