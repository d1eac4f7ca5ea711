//! Unit tests for the stratum-graph crate.

mod support {
    use crate::{
        BuildOutcome, ComponentDescriptor, ComponentRegistry, DependencyGraph, ForcedOrder,
        GraphBuilder,
    };

    /// Builds a graph from `(from, to)` static edges over the listed ids.
    pub(super) fn graph_of(ids: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        build(ids, edges, &[]).graph
    }

    /// Builds a graph with static edges plus `after>before` overrides.
    pub(super) fn build(ids: &[&str], edges: &[(&str, &str)], forced: &[&str]) -> BuildOutcome {
        let descriptors = ids.iter().map(|id| {
            let deps = edges
                .iter()
                .filter(|(from, _)| from == id)
                .map(|(_, to)| *to);
            ComponentDescriptor::new(*id).with_static_dependencies(deps)
        });
        let (registry, duplicates) = ComponentRegistry::from_descriptors(descriptors);
        assert!(duplicates.is_empty(), "duplicate ids in fixture");

        let orders = forced
            .iter()
            .map(|text| text.parse::<ForcedOrder>().expect("forced order"));
        GraphBuilder::new(&registry).with_forced_orders(orders).build()
    }

    pub(super) fn names<'a>(ids: impl IntoIterator<Item = &'a crate::ComponentId>) -> Vec<&'a str> {
        ids.into_iter().map(crate::ComponentId::as_str).collect()
    }
}

mod registry_tests {
    use crate::{ComponentDescriptor, ComponentRegistry, GraphError};

    #[test]
    fn duplicate_registration_keeps_first_descriptor() {
        let (registry, errors) = ComponentRegistry::from_descriptors([
            ComponentDescriptor::new("ui_panel").with_declared_layer("ui"),
            ComponentDescriptor::new("ui_panel").with_declared_layer("infra"),
        ]);

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("ui_panel").and_then(ComponentDescriptor::declared_layer),
            Some("ui")
        );
        assert_eq!(errors, vec![GraphError::duplicate_component("ui_panel")]);
    }

    #[test]
    fn registry_iterates_in_id_order() {
        let (registry, _) = ComponentRegistry::from_descriptors([
            ComponentDescriptor::new("zeta"),
            ComponentDescriptor::new("alpha"),
            ComponentDescriptor::new("mid"),
        ]);

        let ids: Vec<&str> = registry.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, ["alpha", "mid", "zeta"]);
        assert!(registry.contains("mid"));
        assert!(!registry.is_empty());
    }
}

mod forced_order_tests {
    use rstest::rstest;

    use crate::{EdgeOrigin, ForcedOrder};

    #[rstest]
    #[case("ui_panel>infra", "ui_panel", "infra")]
    #[case(" ui_panel > infra ", "ui_panel", "infra")]
    fn parses_after_before_pairs(#[case] input: &str, #[case] after: &str, #[case] before: &str) {
        let order: ForcedOrder = input.parse().expect("valid forced order");

        assert_eq!(order.after().as_str(), after);
        assert_eq!(order.before().as_str(), before);
        assert_eq!(order.edge().origin(), EdgeOrigin::Forced);
        assert_eq!(order.to_string(), format!("{after}>{before}"));
    }

    #[rstest]
    #[case("ui_panel")]
    #[case(">infra")]
    #[case("ui_panel>")]
    #[case("a>b>c")]
    fn rejects_malformed_pairs(#[case] input: &str) {
        assert!(input.parse::<ForcedOrder>().is_err());
    }
}

mod builder_tests {
    use super::support::build;
    use crate::{DependencyEdge, EdgeOrigin, EdgeRejection};

    #[test]
    fn dangling_edges_are_rejected_and_excluded() {
        let outcome = build(&["a"], &[("a", "ghost")], &[]);

        assert_eq!(outcome.graph.edge_count(), 0);
        assert_eq!(
            outcome.rejected,
            vec![EdgeRejection::Dangling {
                edge: DependencyEdge::new("a", "ghost", EdgeOrigin::Static),
                missing: "ghost".into(),
            }]
        );
    }

    #[test]
    fn forced_orders_naming_unknown_components_are_dangling() {
        let outcome = build(&["a"], &[], &["ghost>a"]);

        assert_eq!(outcome.rejected.len(), 1);
        assert!(matches!(
            outcome.rejected.first(),
            Some(EdgeRejection::Dangling { missing, .. }) if missing.as_str() == "ghost"
        ));
    }

    #[test]
    fn self_edges_are_rejected() {
        let outcome = build(&["a"], &[("a", "a")], &[]);

        assert_eq!(outcome.graph.edge_count(), 0);
        assert!(matches!(
            outcome.rejected.as_slice(),
            [EdgeRejection::SelfReferential { .. }]
        ));
    }

    #[test]
    fn one_pair_may_carry_several_origins() {
        let outcome = build(&["a", "b"], &[("a", "b")], &["a>b", "a>b"]);

        let origins: Vec<EdgeOrigin> = outcome.graph.edges().map(DependencyEdge::origin).collect();
        assert_eq!(origins, [EdgeOrigin::Static, EdgeOrigin::Forced]);
        assert_eq!(outcome.graph.dependencies_of("a").len(), 1);
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn manual_dependencies_become_manual_edges() {
        use crate::{ComponentDescriptor, ComponentRegistry, GraphBuilder};

        let (registry, _) = ComponentRegistry::from_descriptors([
            ComponentDescriptor::new("panel").with_manual_dependencies(["schema"]),
            ComponentDescriptor::new("schema"),
        ]);
        let outcome = GraphBuilder::new(&registry).build();

        let edges: Vec<String> = outcome.graph.edges().map(ToString::to_string).collect();
        assert_eq!(edges, ["panel -> schema (manual)"]);
    }
}

mod graph_tests {
    use std::collections::BTreeSet;

    use super::support::{graph_of, names};
    use crate::{DependencyEdge, EdgeOrigin};

    #[test]
    fn indices_answer_both_directions() {
        let graph = graph_of(&["a", "b", "c"], &[("a", "b"), ("a", "c"), ("b", "c")]);

        assert_eq!(names(graph.dependencies_of("a")), ["b", "c"]);
        assert_eq!(names(graph.dependents_of("c")), ["a", "b"]);
        assert_eq!(graph.outgoing_edges("b").count(), 1);
        assert_eq!(graph.incoming_edges("a").count(), 0);
        assert!(graph.get_node("missing").is_err());
    }

    #[test]
    fn without_edges_keeps_every_node() {
        let graph = graph_of(&["a", "b"], &[("a", "b")]);
        let removed: BTreeSet<_> = [DependencyEdge::new("a", "b", EdgeOrigin::Static)]
            .into_iter()
            .collect();

        let pruned = graph.without_edges(&removed);

        assert_eq!(pruned.node_count(), 2);
        assert_eq!(pruned.edge_count(), 0);
        assert!(pruned.dependents_of("b").is_empty());
    }
}

mod cycle_tests {
    use rstest::rstest;

    use super::support::{build, graph_of, names};
    use crate::{CyclePath, EdgeOrigin, cyclic_components, find_cycle, find_cycles, resolve_cycles};

    fn path(cycle: &CyclePath) -> Vec<&str> {
        names(cycle.path())
    }

    #[test]
    fn two_node_cycle_is_reported_in_traversal_order() {
        let graph = graph_of(&["X", "Y"], &[("X", "Y"), ("Y", "X")]);

        let cycle = find_cycle(&graph).expect("cycle");
        assert_eq!(path(&cycle), ["X", "Y", "X"]);
        assert_eq!(names(cycle.members()), ["X", "Y"]);
    }

    #[test]
    fn three_node_cycle_contains_exactly_its_members() {
        let graph = graph_of(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("d", "a")],
        );

        let cycle = find_cycle(&graph).expect("cycle");
        assert_eq!(path(&cycle), ["a", "b", "c", "a"]);
        assert_eq!(cycle.to_string(), "a -> b -> c -> a");
    }

    #[test]
    fn long_chains_are_searched_without_exhausting_the_stack() {
        use crate::{ComponentDescriptor, ComponentRegistry, GraphBuilder};

        let ids: Vec<String> = (0..50_000).map(|index| format!("n{index:05}")).collect();
        let descriptors = ids.iter().enumerate().map(|(index, id)| {
            let next = ids.get(index + 1).or(ids.first()).expect("non-empty chain");
            ComponentDescriptor::new(id.as_str()).with_static_dependencies([next.as_str()])
        });
        let (registry, _) = ComponentRegistry::from_descriptors(descriptors);
        let graph = GraphBuilder::new(&registry).build().graph;

        let cycle = find_cycle(&graph).expect("the chain closes on itself");
        assert_eq!(cycle.path().len(), 50_001);
        assert_eq!(cycle.path().first().map(crate::ComponentId::as_str), Some("n00000"));
        assert_eq!(cycle.path().last().map(crate::ComponentId::as_str), Some("n00000"));
    }

    #[test]
    fn acyclic_graph_has_no_cycle() {
        let graph = graph_of(&["a", "b", "c"], &[("a", "b"), ("a", "c"), ("b", "c")]);

        assert!(find_cycle(&graph).is_none());
        assert!(cyclic_components(&graph).is_empty());
    }

    #[test]
    fn each_strongly_connected_component_yields_one_path() {
        let graph = graph_of(
            &["a", "b", "p", "q", "r", "z"],
            &[("a", "b"), ("b", "a"), ("p", "q"), ("q", "r"), ("r", "p"), ("z", "a")],
        );

        let sccs = cyclic_components(&graph);
        let components: Vec<Vec<&str>> = sccs.iter().map(|c| names(c)).collect();
        assert_eq!(components, vec![vec!["a", "b"], vec!["p", "q", "r"]]);

        let cycles = find_cycles(&graph);
        let paths: Vec<Vec<&str>> = cycles.iter().map(path).collect();
        assert_eq!(paths, vec![vec!["a", "b", "a"], vec!["p", "q", "r", "p"]]);
    }

    #[test]
    fn forced_edge_suppresses_its_reverse() {
        let outcome = build(&["a", "b"], &[("a", "b")], &["b>a"]);

        let resolved = resolve_cycles(&outcome.graph).expect("forced order resolves the cycle");
        let suppressed = resolved.suppressions().first().expect("one suppression");
        assert_eq!(suppressed.edge().to_string(), "a -> b (static)");
        assert_eq!(suppressed.forced_by().to_string(), "b -> a (forced)");
        assert_eq!(resolved.graph().edge_count(), 1);
    }

    #[test]
    fn forced_edge_breaks_a_three_node_cycle() {
        let outcome = build(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c"), ("c", "a")],
            &["a>c"],
        );

        let resolved = resolve_cycles(&outcome.graph).expect("acyclic after override");
        assert_eq!(resolved.suppressions().len(), 1);
        assert!(find_cycle(resolved.graph()).is_none());
    }

    #[rstest]
    #[case::parallel_override(&[("a", "b"), ("b", "c"), ("c", "a")], &["a>b"], &["a", "b", "c", "a"])]
    #[case::forced_only(&[], &["a>b", "b>a"], &["a", "b", "a"])]
    fn unresolvable_cycles_are_fatal(
        #[case] edges: &[(&str, &str)],
        #[case] forced: &[&str],
        #[case] expected: &[&str],
    ) {
        let outcome = build(&["a", "b", "c"], edges, forced);

        let err = resolve_cycles(&outcome.graph).expect_err("cycle must remain");
        let paths: Vec<Vec<&str>> = err.cycles().iter().map(path).collect();
        assert_eq!(paths, vec![expected.to_vec()]);
    }

    #[test]
    fn forced_edges_are_never_suppressed() {
        let outcome = build(&["a", "b"], &[], &["a>b", "b>a"]);
        let forced = outcome
            .graph
            .edges()
            .filter(|edge| edge.origin() == EdgeOrigin::Forced)
            .count();

        assert_eq!(forced, 2);
        assert!(crate::apply_forced_overrides(&outcome.graph).suppressions().is_empty());
    }
}

mod sequence_tests {
    use rstest::rstest;

    use super::support::{build, graph_of, names};
    use crate::sequence;

    #[test]
    fn chain_loads_leaves_first() {
        let graph = graph_of(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);

        let plan = sequence(&graph).expect("acyclic");
        assert_eq!(names(&plan), ["C", "B", "A"]);
        assert!(plan.satisfies(&graph));
    }

    #[test]
    fn ready_components_are_taken_in_id_order() {
        let graph = graph_of(
            &["app", "zlib", "alpha", "core"],
            &[("app", "core"), ("app", "alpha")],
        );

        let plan = sequence(&graph).expect("acyclic");
        assert_eq!(names(&plan), ["alpha", "core", "app", "zlib"]);
    }

    #[rstest]
    #[case(&["d", "c", "b", "a"])]
    #[case(&["a", "b", "c", "d"])]
    #[case(&["b", "d", "a", "c"])]
    fn plan_does_not_depend_on_insertion_order(#[case] ids: &[&str]) {
        let edges = [("d", "b"), ("d", "c"), ("b", "a"), ("c", "a")];
        let plan = sequence(&graph_of(ids, &edges)).expect("acyclic");

        assert_eq!(names(&plan), ["a", "b", "c", "d"]);
    }

    #[test]
    fn every_component_is_planned_once_and_after_its_dependencies() {
        let ids: Vec<String> = (0..40).map(|n| format!("c{n:02}")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let edges: Vec<(&str, &str)> = id_refs
            .iter()
            .enumerate()
            .flat_map(|(index, from)| {
                id_refs
                    .iter()
                    .take(index)
                    .enumerate()
                    .filter(move |(target, _)| (index * 7 + target * 3).is_multiple_of(5))
                    .map(move |(_, to)| (*from, *to))
            })
            .collect();
        let graph = graph_of(&id_refs, &edges);

        let plan = sequence(&graph).expect("acyclic");
        assert_eq!(plan.len(), 40);
        assert!(plan.satisfies(&graph));
        assert_eq!(sequence(&graph).expect("acyclic"), plan);
    }

    #[test]
    fn forced_edges_constrain_the_plan() {
        let outcome = build(&["a", "b"], &[], &["a>b"]);

        let plan = sequence(&outcome.graph).expect("acyclic");
        assert_eq!(names(&plan), ["b", "a"]);
        assert_eq!(plan.position("a"), Some(1));
    }

    #[test]
    fn cyclic_graph_cannot_be_sequenced() {
        let graph = graph_of(&["X", "Y"], &[("X", "Y"), ("Y", "X")]);

        let err = sequence(&graph).expect_err("cycle");
        assert_eq!(err.cycles().len(), 1);
    }
}
