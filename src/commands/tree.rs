//! # Tree Command Implementation
//!
//! Displays the dependency tree of one locked platform. The tree starts at the
//! packages nothing else in the section depends on; every node shows its
//! version, manager and categories.
//!
//! - **Category Filter**: `--category` keeps only top-level packages labelled
//!   with that category.
//! - **Depth Control**: `--depth` limits how far dependencies are expanded.
//!
//! A package already on the current path is shown once more with a `(cycle)`
//! marker and not expanded again. A package whose dependencies were already
//! listed elsewhere in the tree is marked `(*)` instead of being expanded twice.
//!
//! This command is read-only.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use ptree::{print_tree, Style, TreeItem};

use lockweave::config::LockConfig;
use lockweave::defaults::DEFAULT_LOCKFILE;
use lockweave::graph::PlatformGraph;
use lockweave::names::{is_virtual, NameIndex};
use lockweave::output::OutputConfig;
use lockweave::package::{LockedPackage, Manager};

use super::{read_lockfile, ConfigArgs};

/// Show the dependency tree of a locked platform
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Lockfile to read.
    #[arg(short, long, value_name = "FILE", env = "LOCKWEAVE_LOCKFILE", default_value = DEFAULT_LOCKFILE)]
    pub lockfile: PathBuf,

    /// Platform to display.
    #[arg(short, long, value_name = "PLATFORM")]
    pub platform: String,

    /// Only show top-level packages in this category.
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Maximum depth to display. 0 shows only the top-level packages.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,

    #[command(flatten)]
    pub settings: ConfigArgs,
}

/// Execute the `tree` command.
pub fn execute(args: TreeArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let config = args.settings.load()?;
    let lockfile = read_lockfile(&args.lockfile)?;
    let section = lockfile.platform(&args.platform).ok_or_else(|| {
        anyhow!(
            "Platform '{}' is not locked in {} (locked: {})",
            args.platform,
            args.lockfile.display(),
            lockfile.metadata.platforms.join(", ")
        )
    })?;

    let mut index = NameIndex::new();
    let mut graph = PlatformGraph::new(args.platform.as_str());
    for package in &section.packages {
        graph.insert(&mut index, package.clone());
    }

    let renderer = Renderer {
        graph: &graph,
        config: &config,
        out,
        max_depth: args.depth.unwrap_or(usize::MAX),
    };
    let root = TreeNode {
        label: format!("{} ({} packages)", args.platform, section.packages.len()),
        children: renderer.top_level(args.category.as_deref()),
    };
    print_tree(&root).map_err(|e| anyhow!("Failed to display tree: {}", e))?;
    Ok(())
}

struct Renderer<'a> {
    graph: &'a PlatformGraph,
    config: &'a LockConfig,
    out: OutputConfig,
    max_depth: usize,
}

impl Renderer<'_> {
    /// Packages no other package depends on; all packages when every one of
    /// them sits on a cycle.
    fn top_level(&self, category: Option<&str>) -> Vec<TreeNode> {
        let mut index = NameIndex::new();
        let mut depended_on = BTreeSet::new();
        for package in self.graph.packages() {
            for dependency in package.node.dependencies.keys() {
                if let Some(key) = self.graph.resolve_key(&mut index, dependency) {
                    depended_on.insert(key);
                }
            }
        }

        let mut keys: Vec<&String> = self
            .graph
            .keys()
            .filter(|key| !depended_on.contains(*key))
            .collect();
        if keys.is_empty() {
            keys = self.graph.keys().collect();
        }

        let mut expanded = BTreeSet::new();
        keys.into_iter()
            .flat_map(|key| self.graph.get(key).unwrap_or(&[]))
            .filter(|package| category.is_none_or(|c| package.categories.contains(c)))
            .map(|package| self.node(package, &mut Vec::new(), &mut expanded, &mut index))
            .collect()
    }

    fn node(
        &self,
        package: &LockedPackage,
        path: &mut Vec<String>,
        expanded: &mut BTreeSet<(Manager, String)>,
        index: &mut NameIndex,
    ) -> TreeNode {
        let label = self.out.package(package, &self.config.unconditional_category);
        let key = index.canonical(package.name()).to_string();
        if path.contains(&key) {
            return TreeNode {
                label: format!("{} (cycle)", label),
                children: Vec::new(),
            };
        }
        if path.len() >= self.max_depth {
            return TreeNode {
                label,
                children: Vec::new(),
            };
        }

        let has_children = package
            .node
            .dependencies
            .keys()
            .any(|dependency| !is_virtual(dependency, &self.config.virtual_prefix));
        if has_children && !expanded.insert((package.manager(), key.clone())) {
            return TreeNode {
                label: format!("{} (*)", label),
                children: Vec::new(),
            };
        }

        path.push(key);
        let mut children = Vec::new();
        for dependency in package.node.dependencies.keys() {
            if is_virtual(dependency, &self.config.virtual_prefix) {
                continue;
            }
            let candidates = self.graph.lookup(index, dependency);
            if candidates.is_empty() {
                children.push(TreeNode {
                    label: format!("{} (missing)", dependency),
                    children: Vec::new(),
                });
            }
            for candidate in candidates {
                children.push(self.node(candidate, path, expanded, index));
            }
        }
        path.pop();
        TreeNode { label, children }
    }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &Style) -> io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Borrowed(&self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockweave::package::{Manager, PackageNode};

    fn package(name: &str, deps: &[&str], categories: &[&str]) -> LockedPackage {
        let node = deps.iter().fold(
            PackageNode::new(name, "1.0.0", Manager::System, "linux-64"),
            |node, dep| node.with_dependency(*dep, "*"),
        );
        let mut package = LockedPackage::unlabelled(node);
        package.categories = categories.iter().map(|c| c.to_string()).collect();
        package
    }

    fn graph(packages: Vec<LockedPackage>) -> PlatformGraph {
        let mut index = NameIndex::new();
        let mut graph = PlatformGraph::new("linux-64");
        for package in packages {
            graph.insert(&mut index, package);
        }
        graph
    }

    fn renderer<'a>(
        graph: &'a PlatformGraph,
        config: &'a LockConfig,
        max_depth: usize,
    ) -> Renderer<'a> {
        Renderer {
            graph,
            config,
            out: OutputConfig::plain(),
            max_depth,
        }
    }

    #[test]
    fn test_top_level_and_category_filter() {
        let config = LockConfig::default();
        let g = graph(vec![
            package("jupyter", &["ipython"], &["main"]),
            package("ipython", &["__glibc"], &["main"]),
            package("pytest", &["pluggy"], &["test"]),
            package("pluggy", &[], &["test"]),
        ]);
        let all = renderer(&g, &config, usize::MAX).top_level(None);
        let labels: Vec<&str> = all.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["jupyter 1.0.0 (system) [main]", "pytest 1.0.0 (system) [test]"]
        );
        assert_eq!(all[0].children.len(), 1);
        assert!(all[0].children[0].children.is_empty());

        let test_only = renderer(&g, &config, usize::MAX).top_level(Some("test"));
        assert_eq!(test_only.len(), 1);
    }

    #[test]
    fn test_depth_limit() {
        let config = LockConfig::default();
        let g = graph(vec![
            package("a", &["b"], &["main"]),
            package("b", &["c"], &["main"]),
            package("c", &[], &["main"]),
        ]);
        let nodes = renderer(&g, &config, 1).top_level(None);
        assert_eq!(nodes[0].children.len(), 1);
        assert!(nodes[0].children[0].children.is_empty());
    }

    #[test]
    fn test_cycles_are_marked_not_expanded() {
        let config = LockConfig::default();
        let g = graph(vec![
            package("a", &["b"], &["main"]),
            package("b", &["a"], &["main"]),
        ]);
        let nodes = renderer(&g, &config, usize::MAX).top_level(None);
        assert_eq!(nodes.len(), 2);
        let back_edge = &nodes[0].children[0].children[0];
        assert!(back_edge.label.ends_with("(cycle)"));
    }

    #[test]
    fn test_shared_subtree_is_expanded_once() {
        let config = LockConfig::default();
        // Two diamonds stacked: without deduplication the bottom package
        // appears four times.
        let g = graph(vec![
            package("app", &["left", "right"], &["main"]),
            package("left", &["python"], &["main"]),
            package("right", &["python"], &["main"]),
            package("python", &["libgcc", "zlib"], &["main"]),
            package("libgcc", &[], &["main"]),
            package("zlib", &["libgcc"], &["main"]),
        ]);
        let nodes = renderer(&g, &config, usize::MAX).top_level(None);
        assert_eq!(nodes.len(), 1);

        let left = &nodes[0].children[0];
        let right = &nodes[0].children[1];
        assert_eq!(left.children[0].label, "python 1.0.0 (system) [main]");
        assert_eq!(left.children[0].children.len(), 2);
        assert_eq!(right.children[0].label, "python 1.0.0 (system) [main] (*)");
        assert!(right.children[0].children.is_empty());

        // Leaves are never marked.
        let python = &left.children[0];
        assert_eq!(python.children[0].label, "libgcc 1.0.0 (system) [main]");
        assert_eq!(python.children[1].children[0].label, "libgcc 1.0.0 (system) [main]");
    }
}
