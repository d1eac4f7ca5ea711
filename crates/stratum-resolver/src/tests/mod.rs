//! Unit tests for the stratum-resolver crate.

mod support {
    use stratum_layers::{LayerTable, PrefixTable};

    use crate::{ComponentSource, DiagnosticEvent, ResolverPolicy};

    /// Policy with layers `core < infra < ui` and matching `_` prefixes.
    pub(super) fn tiered_policy() -> ResolverPolicy {
        let layers = LayerTable::from_ordered(["core", "infra", "ui"]).expect("valid layers");
        let prefixes = PrefixTable::new(
            [("core_", "core"), ("infra_", "infra"), ("ui_", "ui")],
            &layers,
        )
        .expect("valid prefixes");
        ResolverPolicy::default().with_layers(layers, prefixes)
    }

    /// A Python component importing each of `targets`.
    pub(super) fn importing(id: &str, targets: &[&str]) -> ComponentSource {
        let text: String = targets
            .iter()
            .map(|target| format!("import {target}\n"))
            .collect();
        ComponentSource::new(id, text)
    }

    /// Drops timing events, the only part of a stream that may vary.
    pub(super) fn without_timing(events: Vec<DiagnosticEvent>) -> Vec<DiagnosticEvent> {
        events
            .into_iter()
            .filter(|event| !matches!(event, DiagnosticEvent::Timing { .. }))
            .collect()
    }

    pub(super) fn names<'a>(ids: impl IntoIterator<Item = &'a crate::ComponentId>) -> Vec<&'a str> {
        ids.into_iter().map(crate::ComponentId::as_str).collect()
    }
}

mod reference_tests {
    use std::collections::BTreeSet;

    use rstest::rstest;
    use stratum_syntax::{ModuleReference, ReferenceKind};

    use crate::{ComponentId, resolve_reference};

    fn known() -> BTreeSet<ComponentId> {
        ["infra", "infra.cache", "ui_panel", "addon", "path", "types"]
            .into_iter()
            .map(ComponentId::from)
            .collect()
    }

    #[rstest]
    #[case(&["infra"], Some("infra"))]
    #[case(&["infra", "cache"], Some("infra.cache"))]
    #[case(&["infra", "cache", "Store"], Some("infra.cache"))]
    #[case(&["infra", "widgets"], Some("infra"))]
    #[case(&["addon", "ui_panel"], Some("addon"))]
    #[case(&["host", "ui_panel"], None)]
    #[case(&["os", "path"], None)]
    #[case(&["bpy", "types", "Panel"], None)]
    fn references_map_onto_known_ids(#[case] segments: &[&str], #[case] expected: Option<&str>) {
        let reference = ModuleReference::new(segments.iter().copied(), ReferenceKind::Import, 1);

        let resolved = resolve_reference(&reference, &known(), &[]);

        assert_eq!(resolved.as_ref().map(ComponentId::as_str), expected);
    }

    #[rstest]
    #[case(&["my_addon", "ui_panel"], Some("ui_panel"))]
    #[case(&["bl_ext", "user", "my_addon", "infra", "cache"], Some("infra.cache"))]
    #[case(&["my_addon", "missing"], None)]
    #[case(&["bl_ext", "user", "types"], None)]
    #[case(&["addon", "ui_panel"], Some("addon"))]
    fn package_roots_are_stripped_before_matching(
        #[case] segments: &[&str],
        #[case] expected: Option<&str>,
    ) {
        let roots = ["my_addon".to_owned(), "bl_ext.user.my_addon".to_owned()];
        let reference = ModuleReference::new(segments.iter().copied(), ReferenceKind::Import, 1);

        let resolved = resolve_reference(&reference, &known(), &roots);

        assert_eq!(resolved.as_ref().map(ComponentId::as_str), expected);
    }
}

mod resolver_tests {
    use stratum_graph::{EdgeOrigin, EdgeRejection, ForcedOrder};
    use stratum_layers::{LayerSource, Severity};
    use stratum_syntax::SupportedLanguage;

    use super::support::{importing, names, tiered_policy, without_timing};
    use crate::{ComponentSource, Resolver, ResolverPolicy, RunStatus, Stage};

    #[test]
    fn chain_loads_dependencies_first() {
        let policy = ResolverPolicy::default();
        let resolution = Resolver::new(&policy).resolve([
            importing("A", &["B"]),
            importing("B", &["C"]),
            importing("C", &[]),
        ]);

        let plan = resolution.plan().expect("acyclic");
        assert_eq!(names(plan), ["C", "B", "A"]);
        assert_eq!(resolution.status(), RunStatus::Ok);
    }

    #[test]
    fn mutual_imports_are_a_cycle() {
        let policy = ResolverPolicy::default();
        let resolution =
            Resolver::new(&policy).resolve([importing("X", &["Y"]), importing("Y", &["X"])]);

        let error = resolution.plan().expect_err("cycle");
        let paths: Vec<Vec<&str>> = error
            .cycles()
            .iter()
            .map(|cycle| names(cycle.path()))
            .collect();
        assert_eq!(paths, [["X", "Y", "X"]]);
        assert_eq!(resolution.status(), RunStatus::Cycle);
    }

    #[test]
    fn three_node_cycle_reports_members_in_traversal_order() {
        let policy = ResolverPolicy::default();
        let resolution = Resolver::new(&policy).resolve([
            importing("a", &["b"]),
            importing("b", &["c"]),
            importing("c", &["a"]),
        ]);

        let error = resolution.plan().expect_err("cycle");
        let cycle = error.cycles().first().expect("one cycle");
        assert_eq!(names(cycle.path()), ["a", "b", "c", "a"]);
    }

    #[test]
    fn cycle_run_still_classifies_without_sorting() {
        let policy = tiered_policy();
        let resolution = Resolver::new(&policy).resolve([
            importing("infra_a", &["ui_b"]),
            importing("ui_b", &["infra_a"]),
        ]);

        assert!(!resolution.is_success());
        let timings = resolution.report().timings();
        assert!(timings.get(Stage::Sort).is_none());
        assert!(timings.get(Stage::Classify).is_some());
        assert_eq!(resolution.report().violations().len(), 1);
    }

    #[test]
    fn infra_depending_on_ui_is_a_low_violation_with_a_plan() {
        let policy = tiered_policy();
        let resolution = Resolver::new(&policy)
            .resolve([importing("infra_widget", &["ui_panel"]), importing("ui_panel", &[])]);

        let plan = resolution.plan().expect("violations never block a plan");
        assert_eq!(names(plan), ["ui_panel", "infra_widget"]);
        let violations = resolution.report().violations();
        assert_eq!(violations.len(), 1);
        let record = violations.iter().next().expect("one violation");
        assert_eq!(record.severity(), Severity::Low);
        assert_eq!(record.edge().from().as_str(), "infra_widget");
    }

    #[test]
    fn forced_order_breaks_a_cycle() {
        let policy = ResolverPolicy::default()
            .with_forced_orders([ForcedOrder::new("Y", "X")]);
        let resolution =
            Resolver::new(&policy).resolve([importing("X", &["Y"]), importing("Y", &["X"])]);

        let plan = resolution.plan().expect("override resolves the cycle");
        assert_eq!(names(plan), ["X", "Y"]);
        let suppressions = resolution.report().suppressions();
        assert_eq!(suppressions.len(), 1);
        let removed = suppressions.first().expect("one suppression").edge();
        assert_eq!(
            (removed.from().as_str(), removed.to().as_str(), removed.origin()),
            ("X", "Y", EdgeOrigin::Static)
        );
    }

    #[test]
    fn broken_source_keeps_the_component_as_a_node() {
        let policy = ResolverPolicy::default();
        let resolution = Resolver::new(&policy).resolve([
            importing("app", &["store"]),
            ComponentSource::new("store", "def broken(:\n"),
        ]);

        let plan = resolution.plan().expect("scan errors are not fatal");
        assert_eq!(names(plan), ["store", "app"]);
        let errors = resolution.report().scan_errors();
        assert_eq!(errors.len(), 1);
        let error = errors.first().expect("one error");
        assert_eq!(error.id().as_str(), "store");
        assert!(error.line().is_some());
    }

    #[test]
    fn unknown_extension_is_a_scan_error() {
        let policy = ResolverPolicy::default();
        let resolution = Resolver::new(&policy)
            .resolve([ComponentSource::new("notes", "import app\n").with_path("notes.txt")]);

        assert!(resolution.is_success());
        let errors = resolution.report().scan_errors();
        assert_eq!(names(errors.iter().map(crate::ScanError::id)), ["notes"]);
    }

    #[test]
    fn rust_sources_resolve_use_paths() {
        let policy = ResolverPolicy::default();
        let resolution = Resolver::new(&policy).resolve([
            ComponentSource::new("app", "use crate::store::Thing;\nfn main() {}\n")
                .with_language(SupportedLanguage::Rust),
            ComponentSource::new("store", "pub struct Thing;\n")
                .with_language(SupportedLanguage::Rust),
        ]);

        let plan = resolution.plan().expect("acyclic");
        assert_eq!(names(plan), ["store", "app"]);
    }

    #[test]
    fn markers_create_side_effect_edges() {
        let policy = ResolverPolicy::default();
        let resolution = Resolver::new(&policy).resolve([
            ComponentSource::new("menu", "requires('panel')\n"),
            importing("panel", &[]),
        ]);

        let edges: Vec<(&str, &str)> = resolution
            .graph()
            .edges()
            .map(|edge| (edge.from().as_str(), edge.to().as_str()))
            .collect();
        assert_eq!(edges, [("menu", "panel")]);
    }

    #[test]
    fn first_duplicate_wins() {
        let policy = ResolverPolicy::default();
        let resolution = Resolver::new(&policy).resolve([
            importing("a", &["b"]),
            importing("a", &[]),
            importing("b", &[]),
        ]);

        assert_eq!(names(resolution.report().duplicates()), ["a"]);
        let plan = resolution.plan().expect("acyclic");
        assert_eq!(names(plan), ["b", "a"]);
    }

    #[test]
    fn dangling_and_self_edges_are_dropped() {
        let policy = ResolverPolicy::default();
        let resolution = Resolver::new(&policy).resolve([
            importing("a", &[]).with_manual_dependencies(["ghost", "a"]),
        ]);

        assert!(resolution.is_success());
        let rejected = resolution.report().rejected();
        assert_eq!(rejected.len(), 2);
        assert!(rejected.iter().any(|rejection| matches!(
            rejection,
            EdgeRejection::Dangling { missing, .. } if missing.as_str() == "ghost"
        )));
        assert!(rejected
            .iter()
            .any(|rejection| matches!(rejection, EdgeRejection::SelfReferential { .. })));
        assert_eq!(resolution.graph().edge_count(), 0);
    }

    #[test]
    fn self_imports_are_ignored_silently() {
        let policy = ResolverPolicy::default();
        let resolution = Resolver::new(&policy).resolve([importing("a", &["a"])]);

        assert!(resolution.report().rejected().is_empty());
        assert_eq!(resolution.graph().edge_count(), 0);
    }

    #[test]
    fn unknown_declared_layer_falls_back_to_prefix() {
        let policy = tiered_policy();
        let resolution = Resolver::new(&policy)
            .resolve([importing("infra_widget", &[]).with_declared_layer("data")]);

        let unknown: Vec<(&str, &str)> = resolution
            .report()
            .unknown_layers()
            .map(|(id, layer)| (id.as_str(), layer))
            .collect();
        assert_eq!(unknown, [("infra_widget", "data")]);
        let classification = resolution
            .report()
            .assignments()
            .get("infra_widget")
            .expect("classified");
        assert_eq!(classification.source(), LayerSource::Prefix);
    }

    #[test]
    fn input_order_does_not_change_the_stream() {
        let policy = tiered_policy();
        let sources = vec![
            importing("infra_widget", &["ui_panel", "core_base"]),
            ComponentSource::new("alpha", "def (\n"),
            importing("ui_panel", &["core_base"]),
            importing("core_base", &[]),
            ComponentSource::new("beta", "def (\n"),
            importing("loose", &["infra_widget"]),
            importing("loose", &["infra_widget"]),
            importing("core_base", &[]),
        ];
        let mut reversed = sources.clone();
        reversed.reverse();

        let first = Resolver::new(&policy).resolve(sources);
        let second = Resolver::new(&policy).resolve(reversed);

        assert_eq!(without_timing(first.events()), without_timing(second.events()));
        assert_eq!(first.plan(), second.plan());
        let failed = names(first.report().scan_errors().iter().map(crate::ScanError::id));
        assert_eq!(failed, ["alpha", "beta"]);
        assert_eq!(names(first.report().duplicates()), ["core_base", "loose"]);
    }

    #[test]
    fn host_module_imports_do_not_close_a_cycle() {
        let policy = ResolverPolicy::default();
        let resolution = Resolver::new(&policy).resolve([
            importing("app", &["os.path"]),
            ComponentSource::new("path", "import app\nfrom bpy.types import Panel\n"),
            importing("types", &[]),
        ]);

        let plan = resolution.plan().expect("host imports add no edges");
        assert_eq!(names(plan), ["app", "path", "types"]);
        assert_eq!(resolution.graph().edge_count(), 1);
    }

    #[test]
    fn manifest_package_roots_resolve_qualified_imports() {
        let manifest = stratum_config::Manifest::from_yaml_str("package_roots: [my_addon]\n")
            .expect("valid manifest");
        let policy = ResolverPolicy::from_manifest(&manifest).expect("valid policy");
        let resolution = Resolver::new(&policy).resolve([
            ComponentSource::new("menu", "from my_addon.panel import draw\n"),
            importing("panel", &[]),
        ]);

        let plan = resolution.plan().expect("acyclic");
        assert_eq!(names(plan), ["panel", "menu"]);
    }

    #[test]
    fn plan_is_complete_and_respects_every_edge() {
        let policy = ResolverPolicy::default().with_forced_orders([ForcedOrder::new("e", "a")]);
        let resolution = Resolver::new(&policy).resolve([
            importing("a", &["b", "c"]),
            importing("b", &["d"]),
            importing("c", &["d"]),
            importing("d", &[]),
            importing("e", &["d"]).with_manual_dependencies(["c"]),
        ]);

        let plan = resolution.plan().expect("acyclic");
        assert_eq!(plan.len(), 5);
        assert!(plan.satisfies(resolution.graph()));
    }

    #[test]
    fn every_stage_is_timed_on_success() {
        let policy = ResolverPolicy::default();
        let resolution = Resolver::new(&policy).resolve([importing("a", &[])]);

        let stages: Vec<Stage> = resolution
            .report()
            .timings()
            .iter()
            .map(|timing| timing.stage())
            .collect();
        assert_eq!(
            stages,
            [Stage::Scan, Stage::Build, Stage::Cycle, Stage::Sort, Stage::Classify]
        );
    }
}

mod policy_tests {
    use stratum_config::Manifest;
    use stratum_layers::LayerSource;

    use super::support::{importing, names};
    use crate::{PolicyError, Resolver, ResolverPolicy};

    #[test]
    fn manifest_supplies_layers_orders_and_overrides() {
        let manifest = Manifest::from_yaml_str(
            "layers: [core, infra, ui]\n\
             prefixes:\n  infra_: infra\n  ui_: ui\n\
             forced_order: [\"ui_panel>infra_widget\"]\n\
             declared_layers:\n  widget: ui\n\
             manual_dependencies:\n  widget: [infra_widget]\n",
        )
        .expect("valid manifest");
        let policy = ResolverPolicy::from_manifest(&manifest).expect("valid policy");

        let resolution = Resolver::new(&policy).resolve([
            importing("infra_widget", &[]),
            importing("ui_panel", &[]),
            importing("widget", &[]),
        ]);

        let plan = resolution.plan().expect("acyclic");
        assert_eq!(names(plan), ["infra_widget", "ui_panel", "widget"]);
        let classification = resolution
            .report()
            .assignments()
            .get("widget")
            .expect("classified");
        assert_eq!(classification.source(), LayerSource::Declared);
    }

    #[test]
    fn custom_markers_replace_the_default() {
        let manifest =
            Manifest::from_yaml_str("markers: [depends_on]\n").expect("valid manifest");
        let policy = ResolverPolicy::from_manifest(&manifest).expect("valid policy");

        let configured: Vec<&str> = policy.markers().names().collect();
        assert_eq!(configured, ["depends_on"]);
    }

    #[test]
    fn prefix_to_unknown_layer_is_rejected() {
        let manifest = Manifest::from_yaml_str("layers: [core]\nprefixes:\n  ui_: ui\n")
            .expect("valid manifest");

        let error = ResolverPolicy::from_manifest(&manifest).expect_err("unknown layer");

        assert!(matches!(error, PolicyError::Layers(_)));
        assert!(error.to_string().contains("ui_"));
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let manifest = Manifest::from_yaml_str("severity:\n  medium_from: 4\n  high_from: 2\n")
            .expect("valid manifest");

        let error = ResolverPolicy::from_manifest(&manifest).expect_err("inverted thresholds");

        assert!(error.to_string().contains("medium_from (4)"));
    }
}

mod cache_tests {
    use camino::Utf8PathBuf;
    use stratum_syntax::{MarkerSet, SupportedLanguage};

    use super::support::{importing, names, without_timing};
    use crate::{Resolver, ResolverPolicy, ScanCache, content_digest};

    fn sources() -> Vec<crate::ComponentSource> {
        vec![
            importing("app", &["store"]),
            importing("store", &["base"]),
            importing("base", &[]),
        ]
    }

    #[test]
    fn warm_cache_matches_cold_run() {
        let policy = ResolverPolicy::default();
        let mut cache = ScanCache::new();

        let cold = Resolver::new(&policy).with_cache(&mut cache).resolve(sources());
        let warm = Resolver::new(&policy).with_cache(&mut cache).resolve(sources());

        assert_eq!(cold.report().cache_stats().misses, 3);
        assert_eq!(warm.report().cache_stats().hits, 3);
        assert_eq!(warm.report().cache_stats().misses, 0);
        assert_eq!(without_timing(cold.events()), without_timing(warm.events()));
    }

    #[test]
    fn edited_source_is_rescanned() {
        let policy = ResolverPolicy::default();
        let mut cache = ScanCache::new();
        drop(Resolver::new(&policy).with_cache(&mut cache).resolve(sources()));

        let edited = vec![
            importing("app", &["base"]),
            importing("store", &["base"]),
            importing("base", &[]),
        ];
        let resolution = Resolver::new(&policy).with_cache(&mut cache).resolve(edited);

        assert_eq!(resolution.report().cache_stats().hits, 2);
        assert_eq!(resolution.report().cache_stats().misses, 1);
        let targets: Vec<&str> = resolution
            .graph()
            .outgoing_edges("app")
            .map(|edge| edge.to().as_str())
            .collect();
        assert_eq!(targets, ["base"]);
    }

    #[test]
    fn cached_references_resolve_against_new_components() {
        let policy = ResolverPolicy::default();
        let mut cache = ScanCache::new();
        drop(
            Resolver::new(&policy)
                .with_cache(&mut cache)
                .resolve([importing("app", &["late"])]),
        );

        let resolution = Resolver::new(&policy)
            .with_cache(&mut cache)
            .resolve([importing("app", &["late"]), importing("late", &[])]);

        assert_eq!(resolution.report().cache_stats().hits, 1);
        let plan = resolution.plan().expect("acyclic");
        assert_eq!(names(plan), ["late", "app"]);
    }

    #[test]
    fn absent_components_are_pruned() {
        let policy = ResolverPolicy::default();
        let mut cache = ScanCache::new();
        drop(Resolver::new(&policy).with_cache(&mut cache).resolve(sources()));

        drop(
            Resolver::new(&policy)
                .with_cache(&mut cache)
                .resolve([importing("base", &[])]),
        );

        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn digest_depends_on_markers_and_language() {
        let text = "requires('x')\n";
        let default = content_digest(SupportedLanguage::Python, &MarkerSet::default(), text);

        assert_eq!(
            default,
            content_digest(SupportedLanguage::Python, &MarkerSet::default(), text)
        );
        assert_ne!(
            default,
            content_digest(SupportedLanguage::Python, &MarkerSet::empty(), text)
        );
        assert_ne!(
            default,
            content_digest(SupportedLanguage::Rust, &MarkerSet::default(), text)
        );
        assert_eq!(default.len(), 64);
    }

    #[test]
    fn saved_cache_loads_back() {
        let policy = ResolverPolicy::default();
        let mut cache = ScanCache::new();
        drop(Resolver::new(&policy).with_cache(&mut cache).resolve(sources()));
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("scan-cache.json")).expect("utf8");

        cache.save(&path).expect("save cache");

        assert_eq!(ScanCache::load(&path), cache);
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .expect("list dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(entries, ["scan-cache.json"]);
    }

    #[test]
    fn cache_named_with_a_tmp_extension_saves_and_loads() {
        let policy = ResolverPolicy::default();
        let mut cache = ScanCache::new();
        drop(Resolver::new(&policy).with_cache(&mut cache).resolve(sources()));
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("scan.tmp")).expect("utf8");

        cache.save(&path).expect("save cache");
        cache.save(&path).expect("overwrite cache");

        assert_eq!(ScanCache::load(&path), cache);
    }

    #[test]
    fn failed_save_leaves_no_staging_file() {
        let cache = ScanCache::new();
        let dir = tempfile::tempdir().expect("temp dir");
        let blocked = dir.path().join("occupied");
        std::fs::create_dir(&blocked).expect("create dir");
        std::fs::write(blocked.join("keep"), "x").expect("fill dir");
        let path = Utf8PathBuf::from_path_buf(blocked).expect("utf8");

        let error = cache.save(&path).expect_err("a non-empty directory cannot be replaced");

        assert!(error.to_string().contains("occupied"));
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .expect("list dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(entries, ["occupied"]);
    }

    #[test]
    fn missing_cache_file_starts_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("absent.json")).expect("utf8");

        assert!(ScanCache::load(&path).is_empty());
    }

    #[test]
    fn corrupt_cache_file_starts_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("scan-cache.json")).expect("utf8");
        std::fs::write(&path, "not json").expect("write cache");

        assert!(ScanCache::load(&path).is_empty());
    }

    #[test]
    fn outdated_cache_format_starts_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("scan-cache.json")).expect("utf8");
        std::fs::write(
            &path,
            r#"{"version":0,"entries":{"app":{"digest":"00","references":[]}}}"#,
        )
        .expect("write cache");

        assert!(ScanCache::load(&path).is_empty());
    }
}

mod event_tests {
    use std::io::{self, Write};

    use insta::assert_snapshot;

    use super::support::{importing, tiered_policy, without_timing};
    use crate::{
        DiagnosticEvent, EmitError, JsonLinesSink, ResolveError, Resolver, ResolverPolicy,
        RunStatus, resolve_and_emit,
    };

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn violation_stream_is_stable() {
        let policy = tiered_policy();
        let resolution = Resolver::new(&policy)
            .resolve([importing("infra_widget", &["ui_panel"]), importing("ui_panel", &[])]);

        let lines: Vec<String> = without_timing(resolution.events())
            .iter()
            .map(|event| serde_json::to_string(event).expect("serialise event"))
            .collect();

        assert_snapshot!(lines.join("\n"), @r#"
        {"event":"node","id":"infra_widget","layer":"infra","layer_source":"prefix"}
        {"event":"node","id":"ui_panel","layer":"ui","layer_source":"prefix"}
        {"event":"edge","from":"infra_widget","to":"ui_panel","origin":"static"}
        {"event":"load_order","sequence":["ui_panel","infra_widget"]}
        {"event":"violation","from":"infra_widget","to":"ui_panel","from_layer":"infra","to_layer":"ui","severity":"low"}
        {"event":"violation_pattern","from_layer":"infra","to_layer":"ui","count":1,"severity":"low"}
        {"event":"outcome","status":"ok","components":2,"edges":1,"violations":1}
        "#);
    }

    #[test]
    fn cycle_stream_is_stable() {
        let policy = ResolverPolicy::default();
        let resolution =
            Resolver::new(&policy).resolve([importing("X", &["Y"]), importing("Y", &["X"])]);

        let lines: Vec<String> = without_timing(resolution.events())
            .iter()
            .map(|event| serde_json::to_string(event).expect("serialise event"))
            .collect();

        assert_snapshot!(lines.join("\n"), @r#"
        {"event":"node","id":"X","layer":null,"layer_source":"unclassified"}
        {"event":"node","id":"Y","layer":null,"layer_source":"unclassified"}
        {"event":"edge","from":"X","to":"Y","origin":"static"}
        {"event":"edge","from":"Y","to":"X","origin":"static"}
        {"event":"cycle","path":["X","Y","X"]}
        {"event":"outcome","status":"cycle","components":2,"edges":2,"violations":0}
        "#);
    }

    #[test]
    fn json_lines_sink_writes_one_object_per_line() {
        let policy = ResolverPolicy::default();
        let resolution =
            Resolver::new(&policy).resolve([importing("a", &["b"]), importing("b", &[])]);
        let mut sink = JsonLinesSink::new(Vec::new());

        resolution.emit(&mut sink).expect("emit events");

        let output = String::from_utf8(sink.into_inner()).expect("utf8 output");
        let parsed: Vec<DiagnosticEvent> = output
            .lines()
            .map(|line| serde_json::from_str(line).expect("one JSON object per line"))
            .collect();
        assert_eq!(parsed, resolution.events());
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn cycle_is_emitted_before_the_error_is_returned() {
        let policy = ResolverPolicy::default();
        let mut sink: Vec<DiagnosticEvent> = Vec::new();

        let result = resolve_and_emit(
            &policy,
            None,
            [importing("X", &["Y"]), importing("Y", &["X"])],
            &mut sink,
        );

        assert!(matches!(result, Err(ResolveError::Cycle(_))));
        assert!(sink
            .iter()
            .any(|event| matches!(event, DiagnosticEvent::Cycle { .. })));
        assert!(matches!(
            sink.last(),
            Some(DiagnosticEvent::Outcome {
                status: RunStatus::Cycle,
                ..
            })
        ));
    }

    #[test]
    fn sink_failure_is_reported() {
        let policy = ResolverPolicy::default();
        let mut sink = JsonLinesSink::new(ClosedPipe);

        let result = resolve_and_emit(&policy, None, [importing("a", &[])], &mut sink);

        assert!(matches!(result, Err(ResolveError::Emit(EmitError::Io(_)))));
    }

    #[test]
    fn successful_run_returns_the_plan() {
        let policy = ResolverPolicy::default();
        let mut sink: Vec<DiagnosticEvent> = Vec::new();

        let plan = resolve_and_emit(
            &policy,
            None,
            [importing("a", &["b"]), importing("b", &[])],
            &mut sink,
        )
        .expect("plan");

        assert_eq!(plan.len(), 2);
        assert!(sink.iter().any(
            |event| matches!(event, DiagnosticEvent::LoadOrder { sequence } if sequence == &plan)
        ));
    }
}
