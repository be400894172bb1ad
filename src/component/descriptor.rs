use serde::{Deserialize, Serialize};

pub const INPUT_NODE_CLAZZ: &str = "tb.internal.InputNode";
pub const RULE_CHAIN_INPUT_CLAZZ: &str = "org.thingsboard.rule.engine.flow.TbRuleChainInputNode";
pub const RULE_CHAIN_OUTPUT_CLAZZ: &str = "org.thingsboard.rule.engine.flow.TbRuleChainOutputNode";
pub const UNKNOWN_NODE_CLAZZ: &str = "tb.internal.UnknownNode";
pub const RULE_CHAIN_LINK_CLAZZ: &str = "tb.internal.RuleChainNode";

/// The category a processing node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentKind {
    Filter,
    Enrichment,
    Transformation,
    Action,
    External,
    Flow,
    Unknown,
    Input,
    RuleChain,
}

/// Static description of a node's ports and defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeDefinition {
    pub in_enabled: bool,
    pub out_enabled: bool,
    pub icon: Option<String>,
    pub icon_url: Option<String>,
    pub description: String,
    pub details: String,
    pub default_configuration: serde_json::Value,
    pub relation_types: Vec<String>,
    pub custom_relations: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigurationDescriptor {
    pub node_definition: NodeDefinition,
}

/// A processing-node type, resolved once when a chain is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub clazz: String,
    pub name: String,
    #[serde(default)]
    pub configuration_descriptor: ConfigurationDescriptor,
    #[serde(default)]
    pub clustering_mode: Option<String>,
}

impl ComponentDescriptor {
    pub fn new(kind: ComponentKind, clazz: &str, name: &str, definition: NodeDefinition) -> Self {
        Self {
            kind,
            clazz: clazz.to_string(),
            name: name.to_string(),
            configuration_descriptor: ConfigurationDescriptor {
                node_definition: definition,
            },
            clustering_mode: None,
        }
    }

    pub fn definition(&self) -> &NodeDefinition {
        &self.configuration_descriptor.node_definition
    }

    pub fn in_enabled(&self) -> bool {
        self.definition().in_enabled
    }

    pub fn out_enabled(&self) -> bool {
        self.definition().out_enabled
    }

    pub fn default_configuration(&self) -> serde_json::Value {
        match &self.definition().default_configuration {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other.clone(),
        }
    }

    /// Labels this component's outgoing links may carry.
    pub fn supported_link_labels(&self) -> &[String] {
        &self.definition().relation_types
    }

    /// Whether links leaving this component may use labels outside
    /// [`supported_link_labels`](Self::supported_link_labels). Every link other than the
    /// input link still needs at least one label.
    pub fn allows_custom_links(&self) -> bool {
        self.kind == ComponentKind::Input || self.definition().custom_relations
    }

    /// Whether nodes of this component stand for a legacy link into another rule chain.
    pub fn is_rule_chain_link(&self) -> bool {
        self.kind == ComponentKind::RuleChain
    }

    /// The synthetic "pipeline start" component. Never persisted.
    pub fn input() -> Self {
        Self::new(
            ComponentKind::Input,
            INPUT_NODE_CLAZZ,
            "Input",
            NodeDefinition {
                out_enabled: true,
                description: "Logical rule chain input, forwards incoming messages to the next node"
                    .to_string(),
                ..Default::default()
            },
        )
    }

    /// The node that stands in for an extracted nested rule chain.
    pub fn rule_chain_input() -> Self {
        Self::new(
            ComponentKind::Flow,
            RULE_CHAIN_INPUT_CLAZZ,
            "rule chain",
            NodeDefinition {
                in_enabled: true,
                out_enabled: true,
                description: "Transfers the message to another rule chain".to_string(),
                default_configuration: serde_json::json!({ "ruleChainId": null }),
                custom_relations: true,
                ..Default::default()
            },
        )
    }

    /// The terminal node of a nested chain; its name becomes the label of the link that
    /// leaves the referencing node in the parent chain.
    pub fn rule_chain_output() -> Self {
        Self::new(
            ComponentKind::Flow,
            RULE_CHAIN_OUTPUT_CLAZZ,
            "output",
            NodeDefinition {
                in_enabled: true,
                description: "Transfers the message to the caller rule chain".to_string(),
                default_configuration: serde_json::json!({ "version": 0 }),
                ..Default::default()
            },
        )
    }

    /// Target of a legacy link into another rule chain. It only has an input port and is
    /// persisted as rule chain connections rather than as a rule node.
    pub fn rule_chain_link() -> Self {
        Self::new(
            ComponentKind::RuleChain,
            RULE_CHAIN_LINK_CLAZZ,
            "Rule chain",
            NodeDefinition {
                in_enabled: true,
                description: "Forwards incoming messages to another rule chain".to_string(),
                default_configuration: serde_json::json!({ "ruleChainId": null }),
                ..Default::default()
            },
        )
    }

    /// Stand-in for a clazz the catalog does not know. Both ports are kept so that
    /// persisted connections referring to the node survive a round trip.
    pub fn unknown(clazz: &str) -> Self {
        let mut descriptor = Self::new(
            ComponentKind::Unknown,
            UNKNOWN_NODE_CLAZZ,
            "Unknown",
            NodeDefinition {
                in_enabled: true,
                out_enabled: true,
                custom_relations: true,
                ..Default::default()
            },
        );
        descriptor.clazz = clazz.to_string();
        descriptor
    }
}
