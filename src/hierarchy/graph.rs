//! Node/edge rendering of one panchayath for the chart view.
//!
//! Placement is static: every sibling row is laid out left to right with a
//! fixed spacing and every level sits a fixed distance below its parent
//! level. Node counts per panchayath are in the tens, so there is no overlap
//! resolution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::db::PanchayathNested;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Panchayath,
    Coordinator,
    Supervisor,
    GroupLeader,
    Pro,
}

impl NodeKind {
    fn prefix(&self) -> &'static str {
        match self {
            NodeKind::Panchayath => "panchayath",
            NodeKind::Coordinator => "coordinator",
            NodeKind::Supervisor => "supervisor",
            NodeKind::GroupLeader => "group-leader",
            NodeKind::Pro => "pro",
        }
    }

    /// Row index below the root.
    fn level(&self) -> u32 {
        match self {
            NodeKind::Panchayath => 0,
            NodeKind::Coordinator => 1,
            NodeKind::Supervisor => 2,
            NodeKind::GroupLeader => 3,
            NodeKind::Pro => 4,
        }
    }
}

/// Where supervisor nodes hang in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupervisorAttachment {
    /// Directly under the panchayath root, next to the coordinators.
    #[default]
    Panchayath,
    /// Under the supervisor's own coordinator, matching the card tree.
    Coordinator,
}

/// Static layout parameters, in canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphLayout {
    pub root_x: f64,
    pub root_y: f64,
    pub base_x: f64,
    pub spacing: f64,
    pub pro_spacing: f64,
    pub level_gap: f64,
}

impl Default for GraphLayout {
    fn default() -> Self {
        Self {
            root_x: 400.0,
            root_y: 50.0,
            base_x: 0.0,
            spacing: 220.0,
            pro_spacing: 160.0,
            level_gap: 150.0,
        }
    }
}

impl GraphLayout {
    fn y_for(&self, kind: NodeKind) -> f64 {
        self.root_y + f64::from(kind.level()) * self.level_gap
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub entity_id: String,
    pub label: String,
    pub subtitle: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl HierarchyGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Number of edges pointing at `node_id`.
    pub fn incoming(&self, node_id: &str) -> usize {
        self.edges.iter().filter(|e| e.target == node_id).count()
    }

    /// Source of the (single) edge pointing at `node_id`.
    pub fn parent_of(&self, node_id: &str) -> Option<&str> {
        self.edges
            .iter()
            .find(|e| e.target == node_id)
            .map(|e| e.source.as_str())
    }

    fn push_node(&mut self, kind: NodeKind, entity_id: &str, label: &str, subtitle: String, x: f64, y: f64) -> String {
        let id = node_id(kind, entity_id);
        self.nodes.push(GraphNode {
            id: id.clone(),
            kind,
            entity_id: entity_id.to_string(),
            label: label.to_string(),
            subtitle,
            position: Position { x, y },
        });
        id
    }

    fn push_edge(&mut self, source: &str, target: &str) {
        self.edges.push(GraphEdge {
            id: format!("e-{source}-{target}"),
            source: source.to_string(),
            target: target.to_string(),
        });
    }
}

pub fn node_id(kind: NodeKind, entity_id: &str) -> String {
    format!("{}-{}", kind.prefix(), entity_id)
}

fn ward_list(wards: &[u32]) -> String {
    wards
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the chart graph for one panchayath.
///
/// Group leaders attach to the first supervisor (in `source.supervisors`
/// order) whose ward set contains the leader's ward; PROs attach to the group
/// leader named by `group_leader_id`. Unmatched nodes are still emitted, just
/// without an incoming edge.
pub fn build_graph(
    source: &PanchayathNested,
    layout: &GraphLayout,
    attachment: SupervisorAttachment,
) -> HierarchyGraph {
    let mut graph = HierarchyGraph::default();
    let p = &source.panchayath;

    let root = graph.push_node(
        NodeKind::Panchayath,
        &p.id,
        &p.name,
        format!("{} wards", p.number_of_wards),
        layout.root_x,
        layout.root_y,
    );

    let mut coordinator_nodes: HashMap<&str, String> = HashMap::new();
    for (i, c) in source.coordinators.iter().enumerate() {
        let id = graph.push_node(
            NodeKind::Coordinator,
            &c.id,
            &c.name,
            format!("Ward {}", c.ward),
            layout.base_x + i as f64 * layout.spacing,
            layout.y_for(NodeKind::Coordinator),
        );
        graph.push_edge(&root, &id);
        coordinator_nodes.insert(c.id.as_str(), id);
    }

    for (i, s) in source.supervisors.iter().enumerate() {
        let id = graph.push_node(
            NodeKind::Supervisor,
            &s.id,
            &s.name,
            format!("Wards {}", ward_list(&s.wards)),
            layout.base_x + i as f64 * layout.spacing,
            layout.y_for(NodeKind::Supervisor),
        );
        let parent = match attachment {
            SupervisorAttachment::Panchayath => Some(root.clone()),
            SupervisorAttachment::Coordinator => {
                coordinator_nodes.get(s.coordinator_id.as_str()).cloned()
            }
        };
        if let Some(parent) = parent {
            graph.push_edge(&parent, &id);
        }
    }

    let mut leader_positions: HashMap<&str, (String, f64)> = HashMap::new();
    for (i, g) in source.group_leaders.iter().enumerate() {
        let x = layout.base_x + i as f64 * layout.spacing;
        let id = graph.push_node(
            NodeKind::GroupLeader,
            &g.id,
            &g.name,
            format!("Ward {}", g.ward),
            x,
            layout.y_for(NodeKind::GroupLeader),
        );
        if let Some(sup) = source.supervisors.iter().find(|s| s.covers_ward(g.ward)) {
            graph.push_edge(&node_id(NodeKind::Supervisor, &sup.id), &id);
        }
        leader_positions.insert(g.id.as_str(), (id, x));
    }

    let mut siblings: HashMap<&str, usize> = HashMap::new();
    let mut unattached = 0usize;
    for pro in &source.pros {
        let (parent, x) = match leader_positions.get(pro.group_leader_id.as_str()) {
            Some((leader_id, leader_x)) => {
                let slot = siblings.entry(pro.group_leader_id.as_str()).or_insert(0);
                let x = leader_x + *slot as f64 * layout.pro_spacing;
                *slot += 1;
                (Some(leader_id.clone()), x)
            }
            None => {
                let x = layout.base_x + unattached as f64 * layout.pro_spacing;
                unattached += 1;
                (None, x)
            }
        };
        let id = graph.push_node(
            NodeKind::Pro,
            &pro.id,
            &pro.name,
            format!("Ward {}", pro.ward),
            x,
            layout.y_for(NodeKind::Pro),
        );
        if let Some(parent) = parent {
            graph.push_edge(&parent, &id);
        }
    }

    graph
}
