// tests/reactor_order_property.rs

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;

use buildcycle::lifecycle::LifecycleRegistry;
use buildcycle::project::Project;
use buildcycle::reactor::Reactor;
use buildcycle_test_utils::builders::ProjectBuilder;

// Acyclic by construction: project N only depends on projects 0..N-1.
fn reactor_strategy(max_projects: usize) -> impl Strategy<Value = Vec<Project>> {
    (1..=max_projects).prop_flat_map(|count| {
        proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..count), count)
            .prop_map(|raw_deps| {
                raw_deps
                    .into_iter()
                    .enumerate()
                    .map(|(i, potential)| {
                        let deps: BTreeSet<usize> = if i == 0 {
                            BTreeSet::new()
                        } else {
                            potential.into_iter().map(|d| d % i).collect()
                        };
                        deps.into_iter()
                            .fold(ProjectBuilder::new(&format!("p{i}")), |b, d| {
                                b.depends_on(&format!("p{d}"))
                            })
                            .build()
                    })
                    .collect()
            })
    })
}

proptest! {
    #[test]
    fn build_order_puts_dependencies_first(projects in reactor_strategy(12)) {
        let declared: Vec<(String, Vec<String>)> = projects
            .iter()
            .map(|p| (p.id().to_string(), p.dependencies().to_vec()))
            .collect();
        let reactor = Reactor::new(projects, None).expect("acyclic reactor");
        let order = reactor.sorted_ids();

        prop_assert_eq!(order.len(), declared.len());
        for (id, deps) in &declared {
            prop_assert_eq!(reactor.graph().dependencies_of(id), deps.as_slice());
            let pos = order.iter().position(|o| o == id).expect("project in order");
            for dep in deps {
                let dep_pos = order.iter().position(|o| o == dep).expect("dependency in order");
                prop_assert!(dep_pos < pos, "{} must build before {}", dep, id);
            }
        }
    }

    #[test]
    fn transitive_dependents_are_closed_under_direct_dependents(projects in reactor_strategy(10)) {
        let reactor = Reactor::new(projects, None).expect("acyclic reactor");
        let graph = reactor.graph();

        for id in reactor.sorted_ids() {
            let closure: HashSet<String> = graph.transitive_dependents(id).into_iter().collect();
            prop_assert!(!closure.contains(id));
            for direct in graph.dependents_of(id) {
                prop_assert!(closure.contains(direct));
                for further in graph.transitive_dependents(direct) {
                    prop_assert!(closure.contains(&further));
                }
            }
        }
    }

    #[test]
    fn every_phase_maps_back_to_its_lifecycle(index in 0usize..30) {
        let registry = LifecycleRegistry::standard().expect("standard lifecycles");
        let phases: Vec<(String, String)> = registry
            .lifecycles()
            .iter()
            .flat_map(|l| l.phases().iter().map(|p| (l.id().to_string(), p.clone())))
            .collect();
        let (lifecycle, phase) = &phases[index % phases.len()];

        let found = registry.lifecycle_for_phase(phase).expect("known phase");
        prop_assert_eq!(found.id(), lifecycle.as_str());
        prop_assert!(registry.is_phase(phase));
    }
}
