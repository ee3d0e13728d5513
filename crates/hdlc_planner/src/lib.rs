//! The build planner (C4): given a target path, computes a deterministic
//! compilation sequence covering its transitive dependencies.
//!
//! The planner walks the dependency graph breadth-first from the target,
//! resolving each [`hdlc_model::Dependency`] through [`hdlc_db::Database`],
//! then hands the resulting graph to [`petgraph`] for cycle detection and a
//! tie-broken topological sort. A dependency resolving to zero paths is
//! dropped (the project engine turns that into a reference-site
//! diagnostic — §4.3 rule 1); one resolving to more than one path picks the
//! lexicographically-first candidate and this crate emits an informational
//! warning naming the others.

#![warn(missing_docs)]

use hdlc_common::{Identifier, Interner, SourcePath};
use hdlc_db::Database;
use hdlc_diagnostics::Diagnostic;
use hdlc_model::{DependencyLibrary, Location};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// A `(library, name)` dependency that resolved to zero declaring paths.
///
/// The planner has no diagnostic vocabulary of its own for "unresolved" —
/// per §7 that diagnostic belongs to the project engine, anchored at the
/// referencing location it already has in hand.
#[derive(Clone, Debug)]
pub struct UnresolvedDependency {
    /// The file that referenced the missing dependency.
    pub owner: SourcePath,
    /// The library the reference named (or inherited via `work`).
    pub library: Identifier,
    /// The referenced design-unit name.
    pub name: Identifier,
    /// Where in `owner` the reference appears.
    pub location: Location,
}

/// The result of planning a build for one target.
pub struct PlanResult {
    /// The ordered compilation sequence, ending in the requested target.
    pub order: Vec<SourcePath>,
    /// Dependencies that resolved to no declaring path.
    pub unresolved: Vec<UnresolvedDependency>,
    /// Informational diagnostics generated while planning (multi-candidate
    /// resolutions, broken cycles).
    pub diagnostics: Vec<Diagnostic>,
}

/// Plans a compilation sequence for `target`, covering every transitive
/// dependency reachable from it through the database's design-unit index.
///
/// `target` is always included in the result, even if it has no
/// dependencies at all (§4.3 rule 4).
pub fn plan(target: &SourcePath, db: &Database, interner: &Interner) -> PlanResult {
    let mut graph = DiGraph::<SourcePath, ()>::new();
    let mut nodes: HashMap<SourcePath, NodeIndex> = HashMap::new();
    let mut unresolved = Vec::new();
    let mut diagnostics = Vec::new();

    node_of(&mut graph, &mut nodes, target.clone());
    let mut seen = HashSet::new();
    seen.insert(target.clone());
    let mut queue = VecDeque::new();
    queue.push_back(target.clone());

    while let Some(path) = queue.pop_front() {
        let Some(file) = db.get(&path) else { continue };
        for dep in &file.dependencies {
            let lib = match dep.library {
                DependencyLibrary::Named(l) => l,
                DependencyLibrary::Work => db.library_of(&path),
            };
            let mut candidates = db.paths_by_design_unit(lib, dep.name);
            candidates.sort();

            if candidates.is_empty() {
                unresolved.push(UnresolvedDependency {
                    owner: path.clone(),
                    library: lib,
                    name: dep.name,
                    location: dep.locations.first().copied().unwrap_or(Location::new(0, 0)),
                });
                continue;
            }

            if candidates.len() > 1 {
                let others: Vec<String> = candidates.iter().map(|p| p.to_string()).collect();
                diagnostics.push(
                    Diagnostic::warning(
                        path.as_path(),
                        dep.locations.first().map(|l| l.line).unwrap_or(0),
                        format!(
                            "dependency '{}.{}' resolves to multiple candidates, picking '{}': {}",
                            lib.render(interner),
                            dep.name.render(interner),
                            candidates[0],
                            others.join(", ")
                        ),
                    )
                    .with_code("multiple-candidates"),
                );
            }

            let chosen = candidates.into_iter().next().unwrap();
            let dep_node = node_of(&mut graph, &mut nodes, chosen.clone());
            let owner_node = node_of(&mut graph, &mut nodes, path.clone());
            graph.update_edge(dep_node, owner_node, ());
            if seen.insert(chosen.clone()) {
                queue.push_back(chosen);
            }
        }
    }

    break_cycles(&mut graph, &mut diagnostics);
    let order = deterministic_toposort(&graph, db, interner);

    PlanResult {
        order,
        unresolved,
        diagnostics,
    }
}

fn node_of(
    graph: &mut DiGraph<SourcePath, ()>,
    nodes: &mut HashMap<SourcePath, NodeIndex>,
    path: SourcePath,
) -> NodeIndex {
    *nodes
        .entry(path.clone())
        .or_insert_with(|| graph.add_node(path))
}

/// Repeatedly removes the lexicographically greatest `(src, dst)` edge
/// inside any remaining cyclic strongly-connected component until the
/// graph is acyclic (§4.3 rule 3). Never fails — a graph with no cycles
/// returns immediately.
fn break_cycles(graph: &mut DiGraph<SourcePath, ()>, diagnostics: &mut Vec<Diagnostic>) {
    loop {
        let sccs = petgraph::algo::tarjan_scc(&*graph);
        let Some(comp) = sccs.into_iter().find(|c| c.len() > 1) else {
            break;
        };
        let comp_set: HashSet<NodeIndex> = comp.into_iter().collect();

        let mut greatest: Option<(String, String, petgraph::graph::EdgeIndex)> = None;
        for edge in graph.edge_references() {
            if !comp_set.contains(&edge.source()) || !comp_set.contains(&edge.target()) {
                continue;
            }
            let src = graph[edge.source()].to_string();
            let dst = graph[edge.target()].to_string();
            let better = greatest
                .as_ref()
                .map(|(gs, gd, _)| (src.as_str(), dst.as_str()) > (gs.as_str(), gd.as_str()))
                .unwrap_or(true);
            if better {
                greatest = Some((src, dst, edge.id()));
            }
        }

        let Some((src, dst, edge_id)) = greatest else {
            break;
        };
        graph.remove_edge(edge_id);
        diagnostics.push(
            Diagnostic::note(
                std::path::PathBuf::from(&dst),
                0,
                format!("breaking dependency cycle: ignoring edge from '{src}' to '{dst}'"),
            )
            .with_code("cycle-broken"),
        );
    }
}

/// Kahn's algorithm with deterministic tie-breaking by `(library, path)`
/// among nodes simultaneously ready to schedule (§4.3 rule 2).
fn deterministic_toposort(graph: &DiGraph<SourcePath, ()>, db: &Database, interner: &Interner) -> Vec<SourcePath> {
    let mut indegree: HashMap<NodeIndex, usize> = graph.node_indices().map(|n| (n, 0)).collect();
    for edge in graph.edge_references() {
        *indegree.entry(edge.target()).or_insert(0) += 1;
    }

    let sort_key = |node: NodeIndex| -> (String, String) {
        let path = &graph[node];
        let lib = db.library_of(path);
        (lib.render(interner).to_ascii_lowercase(), path.to_string())
    };

    let mut ready: BTreeSet<(String, String, NodeIndex)> = BTreeSet::new();
    for node in graph.node_indices() {
        if indegree[&node] == 0 {
            let (a, b) = sort_key(node);
            ready.insert((a, b, node));
        }
    }

    let mut order = Vec::new();
    while let Some(next) = ready.iter().next().cloned() {
        ready.remove(&next);
        let (_, _, node) = next;
        order.push(graph[node].clone());
        for edge in graph.edges(node) {
            let target = edge.target();
            let deg = indegree.get_mut(&target).unwrap();
            *deg -= 1;
            if *deg == 0 {
                let (a, b) = sort_key(target);
                ready.insert((a, b, target));
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdlc_common::{Identifier, Interner, SourcePath};
    use hdlc_db::Database;
    use hdlc_model::SourceKind;
    use std::sync::Arc;

    fn db_with_sources(entries: &[(&str, &str, &str)]) -> (Database, Arc<Interner>, tempfile::TempDir) {
        let tmp = tempfile::TempDir::new().unwrap();
        let interner = Arc::new(Interner::new());
        let database = Database::new(interner.clone());
        for (file_name, library, contents) in entries {
            let full = tmp.path().join(file_name);
            std::fs::write(&full, contents).unwrap();
            let sp = SourcePath::capture(&full).unwrap();
            let lib = if library.is_empty() {
                None
            } else {
                Some(Identifier::case_insensitive(&interner, library))
            };
            database.put_file(sp, SourceKind::Vhdl, lib, vec![], vec![]);
        }
        database.refresh();
        (database, interner, tmp)
    }

    #[test]
    fn plan_single_file_no_deps() {
        let (database, interner, tmp) = db_with_sources(&[("foo.vhd", "lib_a", "entity foo is\nend entity foo;")]);
        let target = SourcePath::capture(tmp.path().join("foo.vhd")).unwrap();
        let result = plan(&target, &database, &interner);
        assert_eq!(result.order, vec![target]);
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn plan_orders_dependency_before_dependent() {
        let (database, interner, tmp) = db_with_sources(&[
            ("pkg.vhd", "lib_a", "package p is\nend package p;"),
            (
                "user.vhd",
                "lib_a",
                "library lib_a;\nuse lib_a.p.all;\nentity user is\nend entity user;",
            ),
        ]);
        let target = SourcePath::capture(tmp.path().join("user.vhd")).unwrap();
        let result = plan(&target, &database, &interner);
        let names: Vec<String> = result
            .order
            .iter()
            .map(|p| p.as_path().file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["pkg.vhd", "user.vhd"]);
    }

    #[test]
    fn unresolved_dependency_is_reported_not_fatal() {
        let (database, interner, tmp) = db_with_sources(&[(
            "user.vhd",
            "lib_a",
            "library lib_a;\nuse lib_a.missing.all;\nentity user is\nend entity user;",
        )]);
        let target = SourcePath::capture(tmp.path().join("user.vhd")).unwrap();
        let result = plan(&target, &database, &interner);
        assert_eq!(result.order, vec![target]);
        assert_eq!(result.unresolved.len(), 1);
    }

    #[test]
    fn cycle_between_package_and_body_is_tolerated() {
        let (database, interner, tmp) = db_with_sources(&[
            (
                "pkg.vhd",
                "lib_a",
                "library lib_a;\nuse lib_a.helper.all;\npackage p is\nend package p;",
            ),
            (
                "pkg_body.vhd",
                "lib_a",
                "library lib_a;\nuse lib_a.p.all;\npackage body helper is\nend package body helper;",
            ),
        ]);
        // Manufacture a cycle: pkg.vhd depends on `helper` (declared in
        // pkg_body.vhd), pkg_body.vhd depends on `p` (declared in pkg.vhd).
        let target = SourcePath::capture(tmp.path().join("pkg.vhd")).unwrap();
        let result = plan(&target, &database, &interner);
        assert_eq!(result.order.len(), 2, "both files must still appear exactly once");
    }

    #[test]
    fn multi_candidate_dependency_picks_deterministically_and_warns() {
        let (database, interner, tmp) = db_with_sources(&[
            ("a1.vhd", "lib_a", "package p is\nend package p;"),
            ("a2.vhd", "lib_a", "package p is\nend package p;"),
            (
                "user.vhd",
                "lib_a",
                "library lib_a;\nuse lib_a.p.all;\nentity user is\nend entity user;",
            ),
        ]);
        let target = SourcePath::capture(tmp.path().join("user.vhd")).unwrap();
        let result = plan(&target, &database, &interner);
        assert_eq!(result.order.len(), 2, "exactly one candidate chosen, not both");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code.as_deref(), Some("multiple-candidates"));
    }
}
