use async_trait::async_trait;

use crate::tree::{self, TreeNode};

/// Source of a fresh folder tree snapshot.
///
/// Resolution helpers below call `fetch_tree` exactly once per call and keep
/// nothing between calls.
#[async_trait]
pub trait TreeFetcher: Send + Sync {
    type Error: Send;

    async fn fetch_tree(&self) -> Result<Vec<TreeNode>, Self::Error>;
}

/// Which files of a folder to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileScope {
    /// Direct children only
    #[default]
    Immediate,
    /// Every file in every tagged sub-folder
    Recursive,
}

impl FileScope {
    pub fn from_recursive(recursive: bool) -> Self {
        if recursive {
            FileScope::Recursive
        } else {
            FileScope::Immediate
        }
    }
}

/// Resolve a folder name to its id. `Ok(None)` when no folder has that name.
pub async fn resolve_folder_id<F>(fetcher: &F, name: &str) -> Result<Option<String>, F::Error>
where
    F: TreeFetcher + ?Sized,
{
    let nodes = fetcher.fetch_tree().await?;
    let id = tree::find_folder_id(&nodes, name).map(str::to_string);
    tracing::debug!(folder = %name, found = id.is_some(), "Resolved folder name");
    Ok(id)
}

/// Resolve a folder name and list the file ids under it.
pub async fn resolve_file_ids<F>(
    fetcher: &F,
    name: &str,
    scope: FileScope,
) -> Result<Option<Vec<String>>, F::Error>
where
    F: TreeFetcher + ?Sized,
{
    let nodes = fetcher.fetch_tree().await?;

    let Some(folder) = tree::find_folder_id(&nodes, name)
        .and_then(|id| tree::find_folder_node_by_id(&nodes, id))
    else {
        tracing::debug!(folder = %name, "Folder not present in tree");
        return Ok(None);
    };

    let ids = match scope {
        FileScope::Immediate => tree::collect_immediate_file_ids(folder),
        FileScope::Recursive => tree::collect_all_file_ids_recursive(folder),
    };
    tracing::debug!(folder = %name, ?scope, count = ids.len(), "Collected file ids");
    Ok(Some(ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedTree {
        nodes: Vec<TreeNode>,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl TreeFetcher for FixedTree {
        type Error = String;

        async fn fetch_tree(&self) -> Result<Vec<TreeNode>, String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.nodes.clone())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl TreeFetcher for Unreachable {
        type Error = String;

        async fn fetch_tree(&self) -> Result<Vec<TreeNode>, String> {
            Err("connection refused".to_string())
        }
    }

    fn fixture() -> FixedTree {
        FixedTree {
            nodes: vec![TreeNode::folder(
                "1",
                "Reports",
                vec![
                    TreeNode::file("2", "q1.pdf"),
                    TreeNode::folder("3", "Archive", vec![TreeNode::file("4", "2019.pdf")]),
                ],
            )],
            fetches: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn test_resolve_folder_id() {
        let fetcher = fixture();
        assert_eq!(
            resolve_folder_id(&fetcher, "Archive").await.unwrap(),
            Some("3".to_string())
        );
        assert_eq!(resolve_folder_id(&fetcher, "Missing").await.unwrap(), None);
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_resolve_file_ids_by_scope() {
        let fetcher = fixture();

        let immediate = resolve_file_ids(&fetcher, "Reports", FileScope::Immediate)
            .await
            .unwrap();
        assert_eq!(immediate, Some(vec!["2".to_string()]));

        let all = resolve_file_ids(&fetcher, "Reports", FileScope::Recursive)
            .await
            .unwrap();
        assert_eq!(all, Some(vec!["2".to_string(), "4".to_string()]));

        let missing = resolve_file_ids(&fetcher, "Nope", FileScope::Recursive)
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let err = resolve_folder_id(&Unreachable, "Reports").await.unwrap_err();
        assert_eq!(err, "connection refused");
    }

    #[test]
    fn test_file_scope_from_flag() {
        assert_eq!(FileScope::from_recursive(true), FileScope::Recursive);
        assert_eq!(FileScope::from_recursive(false), FileScope::Immediate);
    }
}
