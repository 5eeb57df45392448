//! Property-based tests for name folding, category propagation and update
//! reconciliation.
//!
//! Random graphs (cycles included) are generated together with random root
//! requests, and the propagated labels are compared against a plain
//! reachability computation.

#[cfg(test)]
mod proptest_tests {
    use std::collections::{BTreeMap, BTreeSet, VecDeque};

    use proptest::prelude::*;
    use proptest::sample::Index;

    use crate::config::LockConfig;
    use crate::graph::PlatformGraph;
    use crate::input::ResolverOutput;
    use crate::lockfile::{LockMetadata, Lockfile, PlatformLock};
    use crate::names::{normalize, separator_variants, NameIndex};
    use crate::package::{Categories, LockedPackage, Manager, PackageNode, RootRequest};
    use crate::phases::{propagate, reconcile};

    const CATEGORIES: [&str; 3] = ["main", "dev", "test"];

    /// Spell package `i` one of several equivalent ways.
    fn spelling(i: usize, variant: u8) -> String {
        match variant % 4 {
            0 => format!("pkg_{}", i),
            1 => format!("pkg-{}", i),
            2 => format!("Pkg.{}", i),
            _ => format!("PKG__{}", i),
        }
    }

    #[derive(Debug, Clone)]
    struct Case {
        edges: Vec<Vec<(usize, u8)>>,
        roots: Vec<(usize, u8, Vec<usize>)>,
    }

    fn case_strategy() -> impl Strategy<Value = Case> {
        (2usize..14).prop_flat_map(|n| {
            let edges = prop::collection::vec(
                prop::collection::vec((0..n, any::<u8>()), 0..4),
                n,
            );
            let roots = prop::collection::vec(
                (0..n, any::<u8>(), prop::collection::vec(0usize..3, 1..3)),
                1..4,
            );
            (edges, roots).prop_map(|(edges, roots)| Case { edges, roots })
        })
    }

    fn nodes(case: &Case) -> Vec<PackageNode> {
        case.edges
            .iter()
            .enumerate()
            .map(|(i, deps)| {
                deps.iter().fold(
                    PackageNode::new(spelling(i, 0), "1.0.0", Manager::System, "linux-64"),
                    |node, (target, variant)| node.with_dependency(spelling(*target, *variant), "*"),
                )
            })
            .collect()
    }

    fn graph(case: &Case) -> PlatformGraph {
        let mut index = NameIndex::new();
        let mut graph = PlatformGraph::new("linux-64");
        for node in nodes(case) {
            graph.insert(&mut index, LockedPackage::unlabelled(node));
        }
        graph
    }

    fn roots(case: &Case) -> Vec<RootRequest> {
        case.roots
            .iter()
            .map(|(target, variant, cats)| {
                RootRequest::new(spelling(*target, *variant), cats.iter().map(|c| CATEGORIES[*c]))
                    .unwrap()
            })
            .collect()
    }

    /// Categories each package should carry, computed by plain BFS per root.
    fn expected(case: &Case) -> BTreeMap<String, Categories> {
        let mut labels: BTreeMap<String, Categories> = BTreeMap::new();
        for (start, _, cats) in &case.roots {
            let mut seen = BTreeSet::new();
            let mut queue = VecDeque::from([*start]);
            while let Some(i) = queue.pop_front() {
                if !seen.insert(i) {
                    continue;
                }
                queue.extend(case.edges[i].iter().map(|(t, _)| *t));
            }
            for i in seen {
                labels
                    .entry(normalize(&spelling(i, 0)))
                    .or_default()
                    .extend(cats.iter().map(|c| CATEGORIES[*c].to_string()));
            }
        }
        labels
    }

    fn labels(graph: &PlatformGraph) -> BTreeMap<String, Categories> {
        graph
            .packages()
            .filter(|p| !p.categories.is_empty())
            .map(|p| (normalize(p.name()), p.categories.clone()))
            .collect()
    }

    proptest! {
        /// Property: normalization is idempotent and every separator spelling
        /// folds to the same canonical name
        #[test]
        fn normalize_is_idempotent_and_spelling_blind(name in "[A-Za-z0-9._-]{1,24}") {
            let canonical = normalize(&name);
            prop_assert_eq!(normalize(&canonical), canonical.clone());
            for variant in separator_variants(&name) {
                prop_assert_eq!(normalize(&variant), canonical.clone());
            }
        }

        /// Property: before truncation a package carries exactly the
        /// categories of the roots that reach it
        #[test]
        fn closure_matches_reachability(case in case_strategy()) {
            let mut g = graph(&case);
            propagate::propagate_closure(&mut g, &roots(&case), "__").unwrap();
            prop_assert_eq!(labels(&g), expected(&case));
        }

        /// Property: after truncation no set holds the unconditional category
        /// together with anything else
        #[test]
        fn truncation_leaves_unconditional_alone(case in case_strategy()) {
            let mut g = graph(&case);
            propagate::execute(&mut g, &roots(&case), &LockConfig::default()).unwrap();
            for package in g.packages() {
                if package.categories.contains("main") {
                    prop_assert_eq!(package.categories.len(), 1);
                }
            }
        }

        /// Property: propagating again over a labelled, truncated graph
        /// changes nothing
        #[test]
        fn propagation_is_idempotent(case in case_strategy()) {
            let config = LockConfig::default();
            let mut g = graph(&case);
            propagate::execute(&mut g, &roots(&case), &config).unwrap();
            let first = g.clone();

            propagate::execute(&mut g, &roots(&case), &config).unwrap();
            prop_assert_eq!(g, first);
        }

        /// Property: an update that re-resolves nothing yields the same labels
        /// as a fresh lock, whatever the previous labels were
        #[test]
        fn empty_update_matches_fresh_lock(case in case_strategy(), noise in 0usize..3) {
            let config = LockConfig::default();
            let mut fresh = graph(&case);
            propagate::execute(&mut fresh, &roots(&case), &config).unwrap();
            fresh.retain(|p| !p.categories.is_empty());
            let want = labels(&fresh);

            let mut previous = Lockfile::new(LockMetadata::default());
            let packages: Vec<LockedPackage> = nodes(&case)
                .into_iter()
                .map(|node| {
                    let mut package = LockedPackage::unlabelled(node);
                    package.categories.insert(CATEGORIES[noise].to_string());
                    package
                })
                .collect();
            previous.insert_platform(
                "linux-64",
                PlatformLock { content_hash: "0".repeat(64), packages },
            );

            let reconciled = reconcile::execute(
                &previous,
                "linux-64",
                &roots(&case),
                &Vec::<ResolverOutput>::new(),
                &[],
                &config,
            )
            .unwrap();
            prop_assert_eq!(labels(&reconciled), want);
        }

        /// Property: after re-resolving some packages (edges possibly
        /// changed), every package kept from the previous lock carries at
        /// least the categories a fresh lock of the combined graph gives it
        #[test]
        fn partial_update_matches_fresh_lock_of_combined_graph(
            case in case_strategy(),
            updates in prop::collection::vec(
                (any::<Index>(), prop::collection::vec(any::<Index>(), 0..3)),
                1..4,
            ),
        ) {
            let config = LockConfig::default();
            let mut locked = graph(&case);
            propagate::execute(&mut locked, &roots(&case), &config).unwrap();
            locked.retain(|p| !p.categories.is_empty());

            let mut previous = Lockfile::new(LockMetadata::default());
            previous.insert_platform(
                "linux-64",
                PlatformLock { content_hash: "0".repeat(64), packages: locked.clone().into_packages() },
            );

            // Re-resolved packages only point at packages that are still locked.
            let present: Vec<usize> = (0..case.edges.len())
                .filter(|i| locked.contains_key(&normalize(&spelling(*i, 0))))
                .collect();
            let mut replaced: BTreeMap<String, PackageNode> = BTreeMap::new();
            for (pick, edges) in &updates {
                let target = *pick.get(&present);
                let node = edges.iter().fold(
                    PackageNode::new(spelling(target, 0), "2.0.0", Manager::System, "linux-64"),
                    |node, edge| node.with_dependency(spelling(*edge.get(&present), 1), "*"),
                );
                replaced.insert(normalize(&node.name), node);
            }
            let targets: Vec<String> = replaced.values().map(|node| node.name.clone()).collect();
            let re_resolved = vec![ResolverOutput::new(
                Manager::System,
                replaced.values().cloned().collect(),
            )];

            let reconciled = reconcile::execute(
                &previous,
                "linux-64",
                &roots(&case),
                &re_resolved,
                &targets,
                &config,
            )
            .unwrap();

            let mut index = NameIndex::new();
            let mut combined = PlatformGraph::new("linux-64");
            for package in locked.packages() {
                let key = normalize(package.name());
                let node = replaced.get(&key).cloned().unwrap_or_else(|| package.node.clone());
                combined.insert(&mut index, LockedPackage::unlabelled(node));
            }
            propagate::execute(&mut combined, &roots(&case), &config).unwrap();
            combined.retain(|p| !p.categories.is_empty());
            let want = labels(&combined);

            let got = labels(&reconciled);
            for key in locked.keys() {
                if let (Some(have), Some(need)) = (got.get(key), want.get(key)) {
                    prop_assert!(have.is_superset(need), "{}: {:?} lacks {:?}", key, have, need);
                }
            }
            prop_assert_eq!(got, want);
        }

        /// Property: a locked section survives serialization unchanged
        #[test]
        fn lockfile_text_round_trip(case in case_strategy()) {
            let mut g = graph(&case);
            propagate::execute(&mut g, &roots(&case), &LockConfig::default()).unwrap();
            g.retain(|p| !p.categories.is_empty());

            let mut lockfile = Lockfile::new(LockMetadata::default());
            lockfile.insert_platform(
                "linux-64",
                PlatformLock { content_hash: "f".repeat(64), packages: g.into_packages() },
            );
            let text = lockfile.to_yaml_string().unwrap();
            prop_assert_eq!(Lockfile::from_yaml_str(&text).unwrap(), lockfile);
        }
    }
}
