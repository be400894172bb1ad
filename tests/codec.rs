//! Tests for converting between stored metadata and the graph model.
mod common;
use common::*;
use rulegraph::prelude::*;

const STORED_CHAIN_JSON: &str = r#"{
    "ruleChainId": "rule-chain-7",
    "version": 3,
    "firstNodeIndex": 0,
    "nodes": [
        {
            "id": "node-a",
            "type": "org.example.filter.CheckField",
            "name": "is hot",
            "configuration": { "field": "temperature", "threshold": 30 },
            "configurationVersion": 2,
            "additionalInfo": { "layoutX": 300.4, "layoutY": 149.6, "description": "threshold check", "color": "red" },
            "debugSettings": { "failuresEnabled": true },
            "singletonMode": false,
            "queueName": "HighPriority"
        },
        {
            "id": "node-b",
            "type": "org.example.action.Log",
            "name": "alarm",
            "configuration": {},
            "additionalInfo": { "layoutX": 600, "layoutY": 100 }
        },
        {
            "id": "node-c",
            "type": "org.example.action.Log",
            "name": "audit",
            "configuration": {},
            "additionalInfo": { "layoutX": 600, "layoutY": 250 }
        }
    ],
    "connections": [
        { "fromIndex": 0, "toIndex": 1, "type": "True" },
        { "fromIndex": 0, "toIndex": 2, "type": "True" },
        { "fromIndex": 0, "toIndex": 2, "type": "False" }
    ]
}"#;

/// A chain saved by an older editor: links into another rule chain are stored next to the
/// node list rather than as nodes.
const LEGACY_CHAIN_JSON: &str = r#"{
    "ruleChainId": "rule-chain-9",
    "firstNodeIndex": 0,
    "nodes": [
        { "id": "node-log", "type": "org.example.action.Log", "name": "log",
          "additionalInfo": { "layoutX": 300, "layoutY": 150 } },
        { "id": "node-check", "type": "org.example.filter.CheckField", "name": "check",
          "additionalInfo": { "layoutX": 300, "layoutY": 300 } }
    ],
    "connections": [
        { "fromIndex": 1, "toIndex": 0, "type": "True" }
    ],
    "ruleChainConnections": [
        { "fromIndex": 0, "targetRuleChainId": { "entityType": "RULE_CHAIN", "id": "rule-chain-other" },
          "additionalInfo": { "layoutX": 600, "layoutY": 150, "ruleChainNodeId": "rcn-1" }, "type": "Success" },
        { "fromIndex": 0, "targetRuleChainId": { "entityType": "RULE_CHAIN", "id": "rule-chain-other" },
          "additionalInfo": { "layoutX": 600, "layoutY": 150, "ruleChainNodeId": "rcn-1" }, "type": "Failure" },
        { "fromIndex": 1, "targetRuleChainId": { "entityType": "RULE_CHAIN", "id": "rule-chain-other" },
          "additionalInfo": { "layoutX": 600, "layoutY": 150, "ruleChainNodeId": "rcn-1" }, "type": "False" }
    ],
    "tenantId": { "entityType": "TENANT", "id": "tenant-1" }
}"#;

fn decode_default(metadata: &RuleChainMetaData) -> GraphModel {
    decode(metadata, &catalog(), &EditorConfig::default())
}

#[cfg(test)]
mod codec_tests {
    use super::*;

    #[test]
    fn test_decode_builds_nodes_edges_and_input_link() {
        let graph = decode_default(&branching_metadata());

        let names: Vec<&str> = graph.rule_nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["check", "store", "log"]);

        // input -> check, check -> store, check -> log (merged), store -> log
        assert_eq!(graph.edges().len(), 4);
        let check = node_named(&graph, "check").unwrap();
        let log = node_named(&graph, "log").unwrap();
        let from_input: Vec<&Edge> = graph.edges_from(graph.input_connector()).collect();
        assert_eq!(from_input.len(), 1);
        assert_eq!(Some(from_input[0].destination), check.input_connector());

        let key = EdgeKey::new(
            check.output_connector().unwrap(),
            log.input_connector().unwrap(),
        );
        assert_eq!(graph.edge(key).unwrap().labels, labels(&["True", "False"]));
    }

    #[test]
    fn test_decoded_graph_is_clean_and_validated() {
        let mut graph = decode_default(&branching_metadata());
        assert!(!graph.is_dirty());
        assert!(!graph.validation_pending());
        assert!(!graph.is_invalid());
        assert!(graph.take_events().is_empty());
    }

    #[test]
    fn test_decode_then_encode_reproduces_the_metadata() {
        let metadata = branching_metadata();
        let encoded = encode(&decode_default(&metadata));
        assert_eq!(encoded, metadata);
    }

    #[test]
    fn test_round_trip_preserves_topology() {
        let first = decode_default(&branching_metadata());
        let second = decode_default(&encode(&first));

        assert_eq!(topology(&first), topology(&second));
        let names = |g: &GraphModel| g.rule_nodes().map(|n| n.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&first), names(&second));
    }

    #[test]
    fn test_encode_expands_multi_label_edges() {
        let (mut graph, a, b, _) = linear_graph();
        graph.add_edge(out_of(&graph, a), in_of(&graph, b), &labels(&["Failure"]));

        let metadata = encode(&graph);

        assert_eq!(metadata.first_node_index, Some(0));
        assert_eq!(
            metadata.connections,
            vec![
                NodeConnectionInfo::new(0, 1, "Success"),
                NodeConnectionInfo::new(0, 1, "Failure"),
                NodeConnectionInfo::new(1, 2, "Success"),
            ]
        );
        assert!(metadata.nodes.iter().all(|n| n.node_type == ACTION));
    }

    #[test]
    fn test_encode_without_input_link_has_no_first_node() {
        let (mut graph, a, ..) = linear_graph();
        let key = EdgeKey::new(graph.input_connector(), in_of(&graph, a));
        graph.remove_edge(key);

        let metadata = encode(&graph);
        assert_eq!(metadata.first_node_index, None);

        let json = metadata.to_json_pretty().unwrap();
        assert!(!json.contains("firstNodeIndex"));
    }

    #[test]
    fn test_legacy_negative_first_node_index_means_none() {
        let json = r#"{
            "firstNodeIndex": -1,
            "nodes": [ { "type": "org.example.action.Log", "name": "only" } ],
            "connections": []
        }"#;
        let metadata = RuleChainMetaData::from_json(json).unwrap();
        assert_eq!(metadata.first_node_index, None);

        let graph = decode_default(&metadata);
        assert_eq!(graph.rule_nodes().count(), 1);
        assert!(graph.edges().is_empty());

        let absent = RuleChainMetaData::from_json(r#"{ "nodes": [], "connections": [] }"#).unwrap();
        assert_eq!(absent.first_node_index, None);
    }

    #[test]
    fn test_decode_drops_malformed_connections() {
        let mut metadata = branching_metadata();
        metadata.nodes.push(record(GENERATOR, "ticker", 100.0, 400.0));
        metadata.connections.extend([
            // Index out of range
            NodeConnectionInfo::new(0, 9, "True"),
            // Generator has no input port
            NodeConnectionInfo::new(0, 3, "False"),
        ]);
        metadata.first_node_index = Some(42);

        let graph = decode_default(&metadata);

        assert_eq!(graph.rule_nodes().count(), 4);
        assert_eq!(graph.edges().len(), 3);
        assert!(graph.edges_from(graph.input_connector()).next().is_none());
    }

    #[test]
    fn test_unknown_component_is_kept_and_flagged() {
        let mut metadata = branching_metadata();
        metadata.nodes[1].node_type = "com.acme.RetiredNode".to_string();

        let graph = decode_default(&metadata);

        let retired = node_named(&graph, "store").unwrap();
        assert_eq!(retired.component.kind, ComponentKind::Unknown);
        assert_eq!(
            retired.error.as_deref(),
            Some("Unresolved component 'com.acme.RetiredNode'")
        );
        assert!(graph.is_invalid());
        // Connections through the unresolved node survive
        assert_eq!(graph.edges().len(), 4);

        let encoded = encode(&graph);
        assert_eq!(encoded.nodes[1].node_type, "com.acme.RetiredNode");
        assert_eq!(encoded.connections, metadata.connections);
    }

    #[test]
    fn test_stored_document_fields_survive_a_round_trip() {
        let metadata = RuleChainMetaData::from_json(STORED_CHAIN_JSON).unwrap();
        let graph = decode_default(&metadata);

        assert_eq!(graph.chain().rule_chain_id.as_deref(), Some("rule-chain-7"));
        assert_eq!(graph.chain().version, Some(3));

        let hot = node_named(&graph, "is hot").unwrap();
        assert_eq!(hot.rule_node_id.as_deref(), Some("node-a"));
        assert_eq!(hot.position, Position::new(300.0, 150.0));
        assert_eq!(hot.description.as_deref(), Some("threshold check"));
        assert_eq!(hot.additional_info["color"], "red");
        assert_eq!(hot.configuration_version, 2);
        assert_eq!(hot.queue_name.as_deref(), Some("HighPriority"));

        let encoded = encode(&graph);
        assert_eq!(encoded.rule_chain_id.as_deref(), Some("rule-chain-7"));
        assert_eq!(encoded.version, Some(3));
        assert_eq!(encoded.connections, metadata.connections);

        let value: serde_json::Value =
            serde_json::from_str(&encoded.to_json_pretty().unwrap()).unwrap();
        let first = &value["nodes"][0];
        assert_eq!(first["additionalInfo"]["layoutX"], 300);
        assert_eq!(first["additionalInfo"]["layoutY"], 150);
        assert_eq!(first["additionalInfo"]["color"], "red");
        assert_eq!(first["debugSettings"]["failuresEnabled"], true);
        assert_eq!(first["singletonMode"], false);
        assert_eq!(value["firstNodeIndex"], 0);
    }

    #[test]
    fn test_input_node_position_comes_from_config() {
        let config = EditorConfig::builder().input_node_position(10.0, 20.0).build();
        let graph = decode(&branching_metadata(), &catalog(), &config);
        assert_eq!(graph.input_node().position, Position::new(10.0, 20.0));
    }

    #[test]
    fn test_decode_through_service_resolver() {
        let store = InMemoryRuleChainStore::new(catalog());
        let resolver = rulegraph::service::ServiceResolver(&store);
        let graph = decode(&branching_metadata(), &resolver, &EditorConfig::default());
        assert!(!graph.is_invalid());
        assert_eq!(graph.rule_nodes().count(), 3);
    }

    #[test]
    fn test_custom_labels_survive_a_round_trip() {
        let mut graph = GraphModel::default();
        let switch = add_named(&mut graph, SWITCH, "switch", 300.0, 150.0);
        let log = add_named(&mut graph, ACTION, "log", 600.0, 150.0);
        graph.add_edge(graph.input_connector(), in_of(&graph, switch), &[]);
        graph.add_edge(out_of(&graph, switch), in_of(&graph, log), &labels(&["hot", "cold"]));
        let before = topology(&graph);

        let encoded = encode(&graph);
        assert_eq!(
            encoded.connections,
            vec![
                NodeConnectionInfo::new(0, 1, "hot"),
                NodeConnectionInfo::new(0, 1, "cold"),
            ]
        );
        assert_eq!(topology(&decode_default(&encoded)), before);
    }

    #[test]
    fn test_legacy_chain_links_become_link_targets() {
        let metadata = RuleChainMetaData::from_json(LEGACY_CHAIN_JSON).unwrap();
        assert_eq!(metadata.rule_chain_connections.len(), 3);
        let graph = decode_default(&metadata);

        // One target node for all three links, with only an input port
        let link = node_named(&graph, "rule-chain-other").unwrap();
        assert!(link.component.is_rule_chain_link());
        assert_eq!(link.output_connector(), None);
        assert_eq!(link.position, Position::new(600.0, 150.0));
        assert_eq!(link.configuration["ruleChainId"], "rule-chain-other");
        assert_eq!(graph.rule_nodes().count(), 3);

        let log = node_named(&graph, "log").unwrap().id;
        let check = node_named(&graph, "check").unwrap().id;
        let from_log = graph
            .edge(EdgeKey::new(out_of(&graph, log), in_of(&graph, link.id)))
            .unwrap();
        assert_eq!(from_log.labels, labels(&["Success", "Failure"]));
        let from_check = graph
            .edge(EdgeKey::new(out_of(&graph, check), in_of(&graph, link.id)))
            .unwrap();
        assert_eq!(from_check.labels, labels(&["False"]));
        assert!(!graph.is_invalid());
    }

    #[test]
    fn test_legacy_chain_links_survive_a_round_trip() {
        let metadata = RuleChainMetaData::from_json(LEGACY_CHAIN_JSON).unwrap();
        let encoded = encode(&decode_default(&metadata));

        assert_eq!(encoded.nodes.len(), 2);
        assert_eq!(encoded.connections, vec![NodeConnectionInfo::new(1, 0, "True")]);
        assert_eq!(encoded.rule_chain_connections, metadata.rule_chain_connections);
        assert_eq!(encoded, metadata);

        let value: serde_json::Value =
            serde_json::from_str(&encoded.to_json_pretty().unwrap()).unwrap();
        let links = value["ruleChainConnections"].as_array().unwrap();
        assert_eq!(links.len(), 3);
        assert_eq!(links[0]["targetRuleChainId"]["id"], "rule-chain-other");
        assert_eq!(links[0]["additionalInfo"]["ruleChainNodeId"], "rcn-1");
        assert_eq!(links[2]["type"], "False");
        assert_eq!(value["tenantId"]["id"], "tenant-1");
    }

    #[test]
    fn test_new_links_to_a_chain_target_are_persisted() {
        let metadata = RuleChainMetaData::from_json(LEGACY_CHAIN_JSON).unwrap();
        let mut graph = decode_default(&metadata);
        let link = node_named(&graph, "rule-chain-other").unwrap().id;
        let check = node_named(&graph, "check").unwrap().id;

        graph
            .apply(Mutation::AddEdge {
                source: out_of(&graph, check),
                destination: in_of(&graph, link),
                labels: labels(&["True"]),
            })
            .unwrap();
        let into_link = graph.apply(Mutation::AddEdge {
            source: graph.input_connector(),
            destination: in_of(&graph, link),
            labels: vec![],
        });
        assert_eq!(into_link, Err(GraphError::InputToChainLink));

        let encoded = encode(&graph);
        let from_check: Vec<&str> = encoded
            .rule_chain_connections
            .iter()
            .filter(|c| c.from_index == 1)
            .map(|c| c.label.as_str())
            .collect();
        assert_eq!(from_check, vec!["False", "True"]);
        assert_eq!(encoded.first_node_index, Some(0));
    }

    #[test]
    fn test_null_chain_links_read_as_none() {
        let metadata = RuleChainMetaData::from_json(
            r#"{ "nodes": [], "connections": [], "ruleChainConnections": null }"#,
        )
        .unwrap();
        assert!(metadata.rule_chain_connections.is_empty());
        assert!(metadata.extra.is_empty());

        let json = metadata.to_json_pretty().unwrap();
        assert!(!json.contains("ruleChainConnections"));
    }
}
