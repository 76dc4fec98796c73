//! Hierarchy aggregation: Panchayath → Coordinator → Supervisor →
//! Group Leader → PRO.
//!
//! Two renderings share the same stored data: the nested card tree built from
//! `hierarchy_view` rows, and the node/edge chart built from a per-table fetch.

pub mod cards;
pub mod graph;

pub use cards::{
    build_card_tree, build_forest, CardKey, CardTree, CoordinatorCard, GroupLeaderCard, ProCard,
    SupervisorCard,
};
pub use graph::{
    build_graph, GraphEdge, GraphLayout, GraphNode, HierarchyGraph, NodeKind, Position,
    SupervisorAttachment,
};

const INDENT: &str = "  ";

fn ward_suffix(ward: Option<u32>) -> String {
    ward.map(|w| format!(" (ward {w})")).unwrap_or_default()
}

fn push_line(out: &mut String, depth: usize, text: &str) {
    out.push_str(&INDENT.repeat(depth));
    out.push_str(text);
    out.push('\n');
}

/// Render a card tree as an indented plain-text outline, one entity per line.
/// Empty branches produce no nested lines.
pub fn render_outline(tree: &CardTree) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        0,
        &format!("{} [{} wards]", tree.panchayath_name, tree.ward_count),
    );
    if tree.is_empty() {
        push_line(&mut out, 1, "(no coordinators)");
        return out;
    }
    for c in &tree.coordinators {
        let rating = c.rating.map(|r| format!(" rating {r}/10")).unwrap_or_default();
        push_line(
            &mut out,
            1,
            &format!("Coordinator: {}{}{}", c.name, ward_suffix(c.ward), rating),
        );
        for s in &c.supervisors {
            let wards = s
                .wards
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            push_line(&mut out, 2, &format!("Supervisor: {} (wards {})", s.name, wards));
            for g in &s.group_leaders {
                push_line(
                    &mut out,
                    3,
                    &format!("Group Leader: {}{}", g.name, ward_suffix(g.ward)),
                );
                for p in &g.pros {
                    push_line(&mut out, 4, &format!("PRO: {}{}", p.name, ward_suffix(p.ward)));
                }
            }
        }
    }
    out
}
