//! Data Commons REST v2 wire types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Body shared by the `/resolve` and `/node` endpoints.
#[derive(Debug, Serialize)]
pub(crate) struct NodeRequest<'a> {
    pub nodes: &'a [String],
    pub property: String,
    #[serde(rename = "nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResolveResponse {
    #[serde(default)]
    pub entities: Vec<ResolvedEntity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResolvedEntity {
    pub node: String,
    #[serde(default)]
    pub candidates: Vec<ResolveCandidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResolveCandidate {
    pub dcid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeResponse {
    #[serde(default)]
    pub data: HashMap<String, NodeData>,
    #[serde(rename = "nextToken")]
    pub next_token: Option<String>,
}

impl NodeResponse {
    /// Fold a later page into this one. Arc values for the same node and
    /// property are appended in page order.
    pub fn merge(&mut self, page: NodeResponse) {
        for (id, node) in page.data {
            let entry = self.data.entry(id).or_default();
            for (property, arcs) in node.arcs {
                entry.arcs.entry(property).or_default().nodes.extend(arcs.nodes);
            }
        }
        self.next_token = page.next_token;
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NodeData {
    #[serde(default)]
    pub arcs: HashMap<String, NodeArcs>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NodeArcs {
    #[serde(default)]
    pub nodes: Vec<ArcNode>,
}

/// Literal values carry `value`; references carry `dcid` and usually `name`.
#[derive(Debug, Deserialize)]
pub(crate) struct ArcNode {
    pub value: Option<String>,
    pub name: Option<String>,
    pub dcid: Option<String>,
}

impl ArcNode {
    pub fn into_value(self) -> Option<String> {
        self.value.or(self.name).or(self.dcid)
    }
}
