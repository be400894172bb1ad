//! Persisted, index-based rule chain representation.
//!
//! Rule nodes carry no graph ids here; connections refer to nodes by their position in
//! [`RuleChainMetaData::nodes`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Header of a rule chain, as stored by the remote service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleChain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub root: bool,
    #[serde(default)]
    pub debug_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<serde_json::Value>,
}

impl RuleChain {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// The persisted topology of one rule chain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleChainMetaData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_chain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(
        default,
        deserialize_with = "deserialize_first_node_index",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_node_index: Option<usize>,
    #[serde(default)]
    pub nodes: Vec<RuleNodeRecord>,
    #[serde(default)]
    pub connections: Vec<NodeConnectionInfo>,
    /// Legacy links from a rule node straight into another rule chain.
    #[serde(
        default,
        deserialize_with = "deserialize_null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub rule_chain_connections: Vec<RuleChainConnectionInfo>,
    /// Top-level keys this engine does not interpret; carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RuleChainMetaData {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// One rule node as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleNodeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub configuration: serde_json::Value,
    #[serde(default)]
    pub configuration_version: u32,
    #[serde(default)]
    pub additional_info: AdditionalInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_settings: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singleton_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_name: Option<String>,
}

/// Editor-only data stored next to a rule node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfo {
    #[serde(default, serialize_with = "serialize_rounded")]
    pub layout_x: f64,
    #[serde(default, serialize_with = "serialize_rounded")]
    pub layout_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Keys this engine does not interpret; carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One labeled, index-based connection. A logical multi-label edge is stored as one
/// record per label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConnectionInfo {
    pub from_index: usize,
    pub to_index: usize,
    #[serde(rename = "type")]
    pub label: String,
}

impl NodeConnectionInfo {
    pub fn new(from_index: usize, to_index: usize, label: &str) -> Self {
        Self {
            from_index,
            to_index,
            label: label.to_string(),
        }
    }
}

/// Reference to a stored entity, as the remote service spells it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    pub id: String,
}

impl EntityRef {
    pub fn rule_chain(id: &str) -> Self {
        Self {
            entity_type: Some("RULE_CHAIN".to_string()),
            id: id.to_string(),
        }
    }
}

/// One labeled link from a rule node into another rule chain.
///
/// Links sharing `additionalInfo.ruleChainNodeId` belong to the same on-canvas target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleChainConnectionInfo {
    pub from_index: usize,
    pub target_rule_chain_id: EntityRef,
    #[serde(default)]
    pub additional_info: AdditionalInfo,
    #[serde(rename = "type")]
    pub label: String,
}

impl RuleChainConnectionInfo {
    pub const TARGET_NODE_KEY: &'static str = "ruleChainNodeId";

    /// The on-canvas target this link belongs to, if the document names one.
    pub fn target_node_key(&self) -> Option<String> {
        match self.additional_info.extra.get(Self::TARGET_NODE_KEY)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(key) => Some(key.clone()),
            other => Some(other.to_string()),
        }
    }
}

fn serialize_rounded<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(value.round() as i64)
}

// Legacy documents use -1 for "no first node".
fn deserialize_first_node_index<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<usize>, D::Error> {
    let raw: Option<i64> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|index| usize::try_from(index).ok()))
}

// Exported documents write `null` for an absent list.
fn deserialize_null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
