//! Folder/file tree as served by the document service, plus the resolver
//! functions used to turn folder names into ids and folders into file ids.
//!
//! Classification follows two rules that are intentionally kept apart:
//! - [`is_folder`] trusts an explicit `type` tag and otherwise falls back to
//!   "has children".
//! - the finders and collectors only trust explicit `type` tags; untyped
//!   nodes are never matched and untyped subtrees are never flattened.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Type tag carried by a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Folder,
    File,
    /// Any tag the service sends that is neither `folder` nor `file`
    Other(String),
}

impl From<String> for NodeType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "folder" => NodeType::Folder,
            "file" => NodeType::File,
            _ => NodeType::Other(tag),
        }
    }
}

impl From<NodeType> for String {
    fn from(tag: NodeType) -> Self {
        match tag {
            NodeType::Folder => "folder".to_string(),
            NodeType::File => "file".to_string(),
            NodeType::Other(other) => other,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Folder => f.write_str("folder"),
            NodeType::File => f.write_str("file"),
            NodeType::Other(other) => f.write_str(other),
        }
    }
}

/// A node of the folder tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
    /// Fields the resolver does not read (sizes, timestamps, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TreeNode {
    pub fn folder(id: impl Into<String>, name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: Some(NodeType::Folder),
            children,
            extra: Map::new(),
        }
    }

    pub fn file(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: Some(NodeType::File),
            children: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Node without a `type` tag.
    pub fn untyped(id: impl Into<String>, name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: None,
            children,
            extra: Map::new(),
        }
    }

    pub fn is_folder(&self) -> bool {
        is_folder(self)
    }

    fn tagged_folder(&self) -> bool {
        self.node_type == Some(NodeType::Folder)
    }

    fn tagged_file(&self) -> bool {
        self.node_type == Some(NodeType::File)
    }
}

/// Errors raised while turning a raw JSON payload into tree nodes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("tree payload must be a list of nodes, got {found}")]
    NotAForest { found: &'static str },

    #[error("tree node at {path} is not an object")]
    NotAnObject { path: String },

    #[error("tree node at {path} is missing required field `{field}`")]
    MissingField { path: String, field: &'static str },

    #[error("tree node at {path} has invalid `{field}`: expected {expected}")]
    InvalidField {
        path: String,
        field: &'static str,
        expected: &'static str,
    },
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse the tree payload returned by the service.
///
/// Accepts either a bare array of root nodes or an object wrapping that
/// array under `"tree"`. Every node is validated before it is returned, and
/// the first offending node is reported by its path (`$[0].children[2]`).
pub fn parse_forest(payload: Value) -> Result<Vec<TreeNode>, TreeError> {
    let roots = match payload {
        Value::Array(items) => items,
        Value::Object(mut wrapper) => match wrapper.remove("tree") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(TreeError::NotAForest {
                    found: json_kind(&other),
                })
            }
            None => return Err(TreeError::NotAForest { found: "an object" }),
        },
        other => {
            return Err(TreeError::NotAForest {
                found: json_kind(&other),
            })
        }
    };

    roots
        .into_iter()
        .enumerate()
        .map(|(idx, node)| parse_node(node, format!("$[{}]", idx)))
        .collect()
}

fn parse_node(value: Value, path: String) -> Result<TreeNode, TreeError> {
    let Value::Object(mut fields) = value else {
        return Err(TreeError::NotAnObject { path });
    };

    let id = take_string(&mut fields, "id", &path)?;
    let name = take_string(&mut fields, "name", &path)?;

    let node_type = match fields.remove("type") {
        None | Some(Value::Null) => None,
        Some(Value::String(tag)) => Some(NodeType::from(tag)),
        Some(_) => {
            return Err(TreeError::InvalidField {
                path,
                field: "type",
                expected: "a string",
            })
        }
    };

    let children = match fields.remove("children") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(idx, child)| parse_node(child, format!("{}.children[{}]", path, idx)))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(TreeError::InvalidField {
                path,
                field: "children",
                expected: "an array",
            })
        }
    };

    Ok(TreeNode {
        id,
        name,
        node_type,
        children,
        extra: fields,
    })
}

fn take_string(
    fields: &mut Map<String, Value>,
    field: &'static str,
    path: &str,
) -> Result<String, TreeError> {
    match fields.remove(field) {
        Some(Value::String(value)) => Ok(value),
        None | Some(Value::Null) => Err(TreeError::MissingField {
            path: path.to_string(),
            field,
        }),
        Some(_) => Err(TreeError::InvalidField {
            path: path.to_string(),
            field,
            expected: "a string",
        }),
    }
}

/// Pre-order walk over a forest: a node, then its children left to right,
/// then its next sibling.
pub struct PreOrder<'a> {
    stack: Vec<std::slice::Iter<'a, TreeNode>>,
}

impl<'a> PreOrder<'a> {
    pub fn new(nodes: &'a [TreeNode]) -> Self {
        Self {
            stack: vec![nodes.iter()],
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(node) => {
                    if !node.children.is_empty() {
                        self.stack.push(node.children.iter());
                    }
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Folder if tagged `folder`; an untagged node is a folder only when it has
/// at least one child.
pub fn is_folder(node: &TreeNode) -> bool {
    match &node.node_type {
        Some(NodeType::Folder) => true,
        Some(_) => false,
        None => !node.children.is_empty(),
    }
}

/// First folder-tagged node with `id == target_id` in pre-order. Children of
/// every node are searched, whatever that node's own tag.
pub fn find_folder_node_by_id<'a>(nodes: &'a [TreeNode], target_id: &str) -> Option<&'a TreeNode> {
    PreOrder::new(nodes).find(|node| node.tagged_folder() && node.id == target_id)
}

/// Id of the first folder-tagged node named `target_name` in pre-order.
/// Later folders with the same name are ignored.
pub fn find_folder_id<'a>(nodes: &'a [TreeNode], target_name: &str) -> Option<&'a str> {
    PreOrder::new(nodes)
        .find(|node| node.tagged_folder() && node.name == target_name)
        .map(|node| node.id.as_str())
}

/// Ids of the direct file-tagged children, in child order.
pub fn collect_immediate_file_ids(folder_node: &TreeNode) -> Vec<String> {
    folder_node
        .children
        .iter()
        .filter(|child| child.tagged_file())
        .map(|child| child.id.clone())
        .collect()
}

/// Ids of every file-tagged node under `folder_node`, in pre-order.
///
/// Only folder-tagged nodes are descended into, so untagged subtrees are
/// skipped entirely.
pub fn collect_all_file_ids_recursive(folder_node: &TreeNode) -> Vec<String> {
    let mut collected = Vec::new();
    let mut pending = vec![folder_node];

    while let Some(node) = pending.pop() {
        match node.node_type {
            Some(NodeType::File) => collected.push(node.id.clone()),
            Some(NodeType::Folder) => pending.extend(node.children.iter().rev()),
            _ => {}
        }
    }

    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// A(1){ f1(2), B(3){ f2(4) } }
    fn sample_tree() -> Vec<TreeNode> {
        vec![TreeNode::folder(
            "1",
            "A",
            vec![
                TreeNode::file("2", "f1"),
                TreeNode::folder("3", "B", vec![TreeNode::file("4", "f2")]),
            ],
        )]
    }

    #[test]
    fn test_sample_tree_resolution() {
        let tree = sample_tree();
        let a = find_folder_node_by_id(&tree, "1").unwrap();

        assert_eq!(collect_immediate_file_ids(a), vec!["2"]);
        assert_eq!(collect_all_file_ids_recursive(a), vec!["2", "4"]);
        assert_eq!(find_folder_id(&tree, "B"), Some("3"));
        assert!(find_folder_node_by_id(&tree, "5").is_none());
    }

    #[test]
    fn test_find_folder_node_by_id_at_depth() {
        let tree = vec![
            TreeNode::folder("r1", "root", vec![]),
            TreeNode::folder(
                "r2",
                "other",
                vec![TreeNode::folder(
                    "d1",
                    "deep",
                    vec![TreeNode::folder("d2", "deeper", vec![])],
                )],
            ),
        ];

        let found = find_folder_node_by_id(&tree, "d2").unwrap();
        assert_eq!(found.name, "deeper");
        assert!(find_folder_node_by_id(&tree, "missing").is_none());
    }

    #[test]
    fn test_find_folder_node_by_id_ignores_files() {
        let tree = vec![TreeNode::folder(
            "root",
            "root",
            vec![
                TreeNode::file("shared", "a file"),
                TreeNode::folder("shared", "the folder", vec![]),
            ],
        )];

        let found = find_folder_node_by_id(&tree, "shared").unwrap();
        assert_eq!(found.node_type, Some(NodeType::Folder));
        assert_eq!(found.name, "the folder");

        let only_file = vec![TreeNode::file("x", "x")];
        assert!(find_folder_node_by_id(&only_file, "x").is_none());
    }

    #[test]
    fn test_find_folder_searches_below_untyped_nodes() {
        let tree = vec![TreeNode::untyped(
            "u",
            "untyped",
            vec![TreeNode::folder("inner", "Inner", vec![])],
        )];

        assert_eq!(find_folder_id(&tree, "Inner"), Some("inner"));
        assert!(find_folder_node_by_id(&tree, "inner").is_some());
        // untyped nodes themselves never match
        assert!(find_folder_id(&tree, "untyped").is_none());
        assert!(find_folder_node_by_id(&tree, "u").is_none());
    }

    #[test]
    fn test_find_folder_id_duplicate_names_first_preorder_wins() {
        let tree = vec![
            TreeNode::folder(
                "p",
                "Projects",
                vec![TreeNode::folder("docs-nested", "Docs", vec![])],
            ),
            TreeNode::folder("docs-root", "Docs", vec![]),
        ];

        for _ in 0..3 {
            assert_eq!(find_folder_id(&tree, "Docs"), Some("docs-nested"));
        }
    }

    #[test]
    fn test_find_folder_id_skips_file_with_same_name() {
        let tree = vec![
            TreeNode::file("f", "Docs"),
            TreeNode::folder("d", "Docs", vec![]),
        ];
        assert_eq!(find_folder_id(&tree, "Docs"), Some("d"));
    }

    #[test]
    fn test_immediate_file_ids_exclude_folders_untyped_and_nested() {
        let folder = TreeNode::folder(
            "root",
            "root",
            vec![
                TreeNode::file("a", "a.pdf"),
                TreeNode::untyped("u", "mystery", vec![]),
                TreeNode::folder("sub", "sub", vec![TreeNode::file("nested", "n.pdf")]),
                TreeNode::file("b", "b.pdf"),
            ],
        );

        assert_eq!(collect_immediate_file_ids(&folder), vec!["a", "b"]);
    }

    #[test]
    fn test_recursive_file_ids_preorder_and_skip_untyped() {
        let folder = TreeNode::folder(
            "root",
            "root",
            vec![
                TreeNode::folder(
                    "s1",
                    "s1",
                    vec![
                        TreeNode::file("a", "a"),
                        TreeNode::folder("s2", "s2", vec![TreeNode::file("b", "b")]),
                    ],
                ),
                TreeNode::untyped("u", "untyped", vec![TreeNode::file("hidden", "hidden")]),
                TreeNode::file("c", "c"),
            ],
        );

        let ids = collect_all_file_ids_recursive(&folder);
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(!ids.contains(&"root".to_string()));
        assert!(!ids.contains(&"s1".to_string()));
    }

    #[test]
    fn test_recursive_file_ids_on_file_and_untyped_start() {
        assert_eq!(
            collect_all_file_ids_recursive(&TreeNode::file("f", "f")),
            vec!["f"]
        );
        let untyped = TreeNode::untyped("u", "u", vec![TreeNode::file("f", "f")]);
        assert!(collect_all_file_ids_recursive(&untyped).is_empty());
    }

    #[test]
    fn test_is_folder_classification() {
        assert!(is_folder(&TreeNode::folder("1", "empty folder", vec![])));
        assert!(is_folder(&TreeNode::untyped(
            "2",
            "implied",
            vec![TreeNode::file("3", "f")]
        )));
        assert!(!is_folder(&TreeNode::untyped("4", "bare", vec![])));
        assert!(!is_folder(&TreeNode::file("5", "file")));

        let mut other = TreeNode::untyped("6", "other", vec![TreeNode::file("7", "f")]);
        other.node_type = Some(NodeType::Other("collection".to_string()));
        assert!(!other.is_folder());
    }

    #[test]
    fn test_preorder_visit_order() {
        let tree = sample_tree();
        let ids: Vec<&str> = PreOrder::new(&tree).map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert_eq!(PreOrder::new(&[]).count(), 0);
    }

    #[test]
    fn test_parse_forest_reads_payload() {
        let payload = json!([
            {
                "id": "1",
                "name": "A",
                "type": "folder",
                "created_at": "2024-01-01T00:00:00Z",
                "children": [
                    {"id": "2", "name": "f1", "type": "file", "size": 10},
                    {"id": "3", "name": "B", "type": "folder", "children": null},
                    {"id": "4", "name": "loose", "type": null}
                ]
            }
        ]);

        let tree = parse_forest(payload).unwrap();
        assert_eq!(tree.len(), 1);
        let root = &tree[0];
        assert_eq!(root.node_type, Some(NodeType::Folder));
        assert_eq!(root.extra.get("created_at"), Some(&json!("2024-01-01T00:00:00Z")));
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[0].extra.get("size"), Some(&json!(10)));
        assert!(root.children[1].children.is_empty());
        assert_eq!(root.children[2].node_type, None);
    }

    #[test]
    fn test_parse_forest_accepts_wrapped_tree() {
        let payload = json!({"tree": [{"id": "1", "name": "A", "type": "folder"}]});
        let tree = parse_forest(payload).unwrap();
        assert_eq!(find_folder_id(&tree, "A"), Some("1"));
    }

    #[test]
    fn test_parse_forest_reports_node_path() {
        let payload = json!([
            {"id": "1", "name": "A", "type": "folder", "children": [
                {"id": "2", "name": "ok", "type": "file"},
                {"name": "no id", "type": "file"}
            ]}
        ]);

        let err = parse_forest(payload).unwrap_err();
        assert_eq!(
            err,
            TreeError::MissingField {
                path: "$[0].children[1]".to_string(),
                field: "id",
            }
        );
        assert!(err.to_string().contains("$[0].children[1]"));
    }

    #[test]
    fn test_parse_forest_rejects_bad_shapes() {
        assert!(matches!(
            parse_forest(json!("nope")),
            Err(TreeError::NotAForest { found: "a string" })
        ));
        assert!(matches!(
            parse_forest(json!({"folders": []})),
            Err(TreeError::NotAForest { .. })
        ));
        assert!(matches!(
            parse_forest(json!([42])),
            Err(TreeError::NotAnObject { .. })
        ));
        assert!(matches!(
            parse_forest(json!([{"id": 1, "name": "A"}])),
            Err(TreeError::InvalidField { field: "id", .. })
        ));
        assert!(matches!(
            parse_forest(json!([{"id": "1", "name": "A", "children": {}}])),
            Err(TreeError::InvalidField { field: "children", .. })
        ));
        assert!(matches!(
            parse_forest(json!([{"id": "1", "name": "A", "type": 3}])),
            Err(TreeError::InvalidField { field: "type", .. })
        ));
    }

    #[test]
    fn test_node_serializes_back_to_wire_shape() {
        let node = TreeNode::folder("1", "A", vec![TreeNode::file("2", "f")]);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "1",
                "name": "A",
                "type": "folder",
                "children": [{"id": "2", "name": "f", "type": "file"}]
            })
        );
    }
}
