mod common;

use approx::assert_abs_diff_eq;
use common::{NEW_YORK, PHILADELPHIA};
use geopath_lib::{
    base_graph, build_query_graph, plan_route, plan_route_on, shortest_path, Coordinate, Error,
    Graph, Node, NodeId, RouteAlgorithm, RouteRequest, SearchFailure,
};

#[test]
fn new_york_to_philadelphia_agrees_for_both_algorithms() {
    for algorithm in RouteAlgorithm::ALL {
        let plan = plan_route(&RouteRequest::new(NEW_YORK, PHILADELPHIA, algorithm))
            .expect("route exists");
        let ids: Vec<NodeId> = plan.path.iter().map(|w| w.id).collect();
        assert_eq!(
            ids,
            vec![
                NodeId::Start,
                NodeId::Base(1),
                NodeId::Base(6),
                NodeId::Destination
            ]
        );
        assert_eq!(plan.distance, 97.0);
        assert_eq!(plan.algorithm, algorithm);
        assert_eq!(plan.units, "kilometers");
        assert_eq!(plan.interior_nodes().count(), 2);
    }
}

#[test]
fn far_away_points_sharing_a_nearest_node() {
    let start = Coordinate::new(38.0, -65.0);
    let destination = Coordinate::new(44.0, -60.0);
    let base = base_graph().unwrap();
    let query = build_query_graph(base, start, destination).unwrap();

    let start_weight = query.node_by_id(NodeId::Start).unwrap().edges[0].weight;
    let (_, into_destination) = query.incoming(NodeId::Destination)[0];

    for algorithm in RouteAlgorithm::ALL {
        let result = shortest_path(&query, NodeId::Start, NodeId::Destination, algorithm);
        assert!(result.is_success());
        assert_eq!(
            result.node_ids(),
            vec![NodeId::Start, NodeId::Base(1), NodeId::Destination]
        );
        assert_abs_diff_eq!(
            result.distance,
            start_weight + into_destination.weight,
            epsilon = 1e-9
        );
    }
}

#[test]
fn start_equal_to_goal_is_zero_length() {
    let base = base_graph().unwrap();
    for algorithm in RouteAlgorithm::ALL {
        let result = shortest_path(base, NodeId::Base(5), NodeId::Base(5), algorithm);
        assert_eq!(result.node_ids(), vec![NodeId::Base(5)]);
        assert_eq!(result.distance, 0.0);
    }
}

#[test]
fn unknown_goal_is_node_not_found() {
    let base = base_graph().unwrap();
    for algorithm in RouteAlgorithm::ALL {
        let result = shortest_path(base, NodeId::Base(1), NodeId::Base(42), algorithm);
        assert_eq!(
            result.error,
            Some(SearchFailure::NodeNotFound {
                id: NodeId::Base(42)
            })
        );
    }
}

#[test]
fn city_to_city_distances_on_reference_graph() {
    let base = base_graph().unwrap();
    let result = shortest_path(base, NodeId::Base(8), NodeId::Base(7), RouteAlgorithm::Dijkstra);
    // Seattle -> Chicago -> Atlanta -> Miami
    assert_eq!(
        result.node_ids(),
        vec![
            NodeId::Base(8),
            NodeId::Base(3),
            NodeId::Base(5),
            NodeId::Base(7)
        ]
    );
    assert_eq!(result.distance, 1730.0 + 715.0 + 660.0);
}

#[test]
fn disconnected_base_fails_with_no_path() {
    let base = Graph::new(vec![
        Node::new(1, 0.0, 0.0).with_edge(2, 200.0),
        Node::new(2, 0.0, 1.0),
        Node::new(3, 10.0, 10.0),
    ])
    .unwrap();
    let request = RouteRequest::a_star(Coordinate::new(0.0, 0.1), Coordinate::new(10.0, 10.1));
    let err = plan_route_on(&base, &request).unwrap_err();
    assert!(matches!(
        err,
        Error::NoPathFound {
            start: NodeId::Start,
            goal: NodeId::Destination
        }
    ));
}

#[test]
fn invalid_coordinates_are_rejected() {
    let request = RouteRequest::dijkstra(Coordinate::new(95.0, 0.0), PHILADELPHIA);
    assert!(matches!(
        plan_route(&request),
        Err(Error::InvalidCoordinate { .. })
    ));
}

#[test]
fn plan_serializes_with_sentinel_ids() {
    let plan = plan_route(&RouteRequest::a_star(NEW_YORK, PHILADELPHIA)).unwrap();
    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["algorithm"], "astar");
    assert_eq!(json["path"][0]["id"], "start");
    assert_eq!(json["path"][1]["id"], 1);
    assert_eq!(json["units"], "kilometers");
}
