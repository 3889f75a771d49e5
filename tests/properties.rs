//! Property suite for the structural invariants

use proptest::prelude::*;
use std::collections::BTreeSet;

use reticula::{
    AttrValue, EdgeRec, Graph, MeasureOutput, MeasureRegistry, Network, NAME_COLUMN,
};

fn degree_measure(graph: &Graph) -> MeasureOutput {
    Ok(graph.degrees().into_iter().map(AttrValue::from).collect())
}

fn registry() -> MeasureRegistry {
    let mut measures = MeasureRegistry::new();
    measures.register_node("degree", degree_measure);
    measures
}

/// Arbitrary small graph: 1..8 nodes, up to 12 edges between them
fn arb_graph() -> impl Strategy<Value = Graph> {
    (1usize..8).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n), 0..12).prop_map(move |pairs| {
            let nodes: Vec<String> = (0..n).map(|i| format!("n{}", i)).collect();
            let edges: Vec<EdgeRec> = pairs
                .into_iter()
                .map(|(a, b)| EdgeRec::new(a, b))
                .collect();
            Graph::new(false, nodes, edges).unwrap()
        })
    })
}

proptest! {
    #[test]
    fn khop_neighborhoods_grow_monotonically(graph in arb_graph(), origin in 0usize..8, d1 in 0usize..4) {
        let origin = origin % graph.node_count();
        let d2 = d1 + 1;
        let near: BTreeSet<usize> = graph.neighbors(origin, d1, true);
        let far: BTreeSet<usize> = graph.neighbors(origin, d2, true);
        prop_assert!(near.is_subset(&far));
    }

    #[test]
    fn row_counts_always_match_entity_counts(graph in arb_graph(), doomed in prop::collection::vec(0usize..8, 0..3)) {
        let network = Network::new(graph, registry()).unwrap();

        let victims: Vec<AttrValue> = doomed
            .iter()
            .map(|&i| i % network.graph().node_count())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|i| format!("n{}", i).into())
            .collect();

        // never delete every node; from_names of zero rows is legal but the
        // interesting invariant is on survivors
        prop_assume!(victims.len() < network.graph().node_count());

        let next = network
            .delete_nodes_by_attribute(&victims, NAME_COLUMN)
            .unwrap();
        prop_assert_eq!(
            next.node_attributes().row_count(),
            next.graph().node_count()
        );
        prop_assert_eq!(
            next.edge_attributes().row_count(),
            next.graph().edge_count()
        );
    }

    #[test]
    fn surviving_names_are_stable(graph in arb_graph(), victim in 0usize..8) {
        let network = Network::new(graph, registry()).unwrap();
        let victim = victim % network.graph().node_count();
        let victim_name = network.graph().node_name(victim).unwrap().to_string();

        let before: Vec<String> = network
            .nodes(NAME_COLUMN)
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();

        let next = network
            .delete_nodes_by_attribute(&[victim_name.clone().into()], NAME_COLUMN)
            .unwrap();
        let after: Vec<String> = next
            .nodes(NAME_COLUMN)
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();

        // survivors appear unchanged and in the original relative order
        let expected: Vec<String> = before.into_iter().filter(|n| *n != victim_name).collect();
        prop_assert_eq!(after, expected);
    }

    #[test]
    fn mutation_never_touches_the_source(graph in arb_graph()) {
        let network = Network::new(graph, registry()).unwrap();
        let graph_before = network.graph().clone();
        let nodes_before = network.node_attributes().clone();
        let edges_before = network.edge_attributes().clone();

        let _ = network.simplify(true, true).unwrap();
        let _ = network.delete_isolates().unwrap();

        prop_assert_eq!(network.graph(), &graph_before);
        prop_assert_eq!(network.node_attributes(), &nodes_before);
        prop_assert_eq!(network.edge_attributes(), &edges_before);
    }

    #[test]
    fn derived_degrees_match_fresh_computation(graph in arb_graph(), victim in 0usize..8) {
        let network = Network::new(graph, registry()).unwrap();
        let victim = victim % network.graph().node_count();
        prop_assume!(network.graph().node_count() > 1);

        let victim_name = network.graph().node_name(victim).unwrap().to_string();
        let next = network
            .delete_nodes_by_attribute(&[victim_name.into()], NAME_COLUMN)
            .unwrap();

        let recomputed: Vec<f64> = next
            .nodes("degree")
            .unwrap()
            .iter()
            .map(|v| v.as_num().unwrap())
            .collect();
        let from_scratch: Vec<f64> = next.graph().degrees().iter().map(|&d| d as f64).collect();
        prop_assert_eq!(recomputed, from_scratch);
    }
}
