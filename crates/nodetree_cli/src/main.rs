//! Prints the stored node tree as an indented outline.
//!
//! Usage: `nodetree_cli [DB_PATH]` (default `./tree.db`).

use nodetree_core::db::open_db;
use nodetree_core::{SqliteNodeRepository, TreeItem, TreeService};
use std::fmt::Write;
use std::path::Path;
use std::process::ExitCode;

const DEFAULT_DB_PATH: &str = "./tree.db";

fn main() -> ExitCode {
    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

    match load_outline(&db_path) {
        Ok(outline) => {
            print!("{outline}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("nodetree_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_outline(db_path: &str) -> Result<String, Box<dyn std::error::Error>> {
    // Printing must never create (and seed) a fresh database.
    if !Path::new(db_path).is_file() {
        return Err(format!("tree database not found: {db_path}").into());
    }
    let conn = open_db(db_path)?;
    let service = TreeService::new(SqliteNodeRepository::try_new(&conn)?);
    let tree = service.load_tree()?;
    Ok(render_outline(&tree))
}

fn render_outline(tree: &TreeItem) -> String {
    let mut out = String::new();
    let mut stack = vec![(tree, 0usize)];
    while let Some((item, depth)) = stack.pop() {
        let _ = writeln!(
            out,
            "{}{} (#{})",
            "  ".repeat(depth),
            item.node.title,
            item.node.id
        );
        stack.extend(item.children.iter().rev().map(|child| (child, depth + 1)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{load_outline, render_outline};
    use nodetree_core::db::open_db;
    use nodetree_core::{build_tree, Node, ROOT_NODE_ID, TOP_LEVEL_PARENT_ID};

    fn node(id: i64, parent_id: i64, title: &str, ordering: i64) -> Node {
        Node {
            id,
            parent_id,
            title: title.to_string(),
            ordering,
        }
    }

    #[test]
    fn outline_indents_children_in_order() {
        let tree = build_tree(
            vec![
                node(ROOT_NODE_ID, TOP_LEVEL_PARENT_ID, "Root", 1),
                node(2, 1, "A", 1),
                node(3, 2, "A1", 1),
                node(4, 1, "B", 2),
            ],
            ROOT_NODE_ID,
        )
        .unwrap();

        assert_eq!(
            render_outline(&tree),
            "Root (#1)\n  A (#2)\n    A1 (#3)\n  B (#4)\n"
        );
    }

    #[test]
    fn missing_database_is_reported_and_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let path_str = path.to_str().unwrap();

        let err = load_outline(path_str).unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert!(!path.exists());
    }

    #[test]
    fn existing_database_prints_root_outline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.db");
        drop(open_db(&path).unwrap());

        let outline = load_outline(path.to_str().unwrap()).unwrap();
        assert_eq!(outline, "Root (#1)\n");
    }
}
