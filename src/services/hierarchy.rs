// Hierarchy service: fetch stored rows and hand them to the aggregator.

use crate::db::AgentDb;
use crate::error::AppError;
use crate::hierarchy::{
    build_card_tree, build_forest, build_graph, CardKey, CardTree, GraphLayout, HierarchyGraph,
    SupervisorAttachment,
};

use super::require_panchayath;

/// Card tree for one panchayath.
pub fn card_tree(db: &AgentDb, panchayath_id: &str, mode: CardKey) -> Result<CardTree, AppError> {
    let panchayath = require_panchayath(db, panchayath_id)?;
    let rows = db.get_hierarchy_rows(Some(panchayath_id))?;
    let tree = build_card_tree(&panchayath, &rows, mode);
    log::debug!(
        "Built {:?} card tree for {} from {} rows ({} coordinators)",
        mode,
        panchayath.name,
        rows.len(),
        tree.coordinators.len()
    );
    Ok(tree)
}

/// Card trees for every panchayath, in name order.
pub fn card_forest(db: &AgentDb, mode: CardKey) -> Result<Vec<CardTree>, AppError> {
    let panchayaths = db.get_all_panchayaths()?;
    let rows = db.get_hierarchy_rows(None)?;
    Ok(build_forest(&panchayaths, &rows, mode))
}

/// Node/edge graph for one panchayath.
pub fn graph(
    db: &AgentDb,
    panchayath_id: &str,
    layout: &GraphLayout,
    attachment: SupervisorAttachment,
) -> Result<HierarchyGraph, AppError> {
    let nested = db
        .get_panchayath_nested(panchayath_id)?
        .ok_or_else(|| AppError::not_found("Panchayath", panchayath_id))?;
    let graph = build_graph(&nested, layout, attachment);
    let unlinked = graph
        .nodes
        .iter()
        .skip(1)
        .filter(|n| graph.incoming(&n.id) == 0)
        .count();
    if unlinked > 0 {
        log::info!(
            "Graph for {} has {} nodes without a parent link",
            nested.panchayath.name,
            unlinked
        );
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{coordinator, group_leader, panchayath, pro, supervisor, test_db};

    #[test]
    fn test_card_tree_reaches_pro_level() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        let c = coordinator(&db, "c1", "p1", "Asha", "9876543210", 2);
        let s = supervisor(&db, "s1", &c, "Biju", "9876543211", &[2, 3]);
        let g = group_leader(&db, "g1", &s, "Chandran", "9876543212", 2);
        pro(&db, "r1", &g, "Divya", "9876543213");

        let tree = card_tree(&db, "p1", CardKey::Id).unwrap();
        assert_eq!(tree.depth(), 4);
        assert_eq!(tree.coordinators[0].supervisors[0].group_leaders[0].pros[0].name, "Divya");
    }

    #[test]
    fn test_unknown_panchayath_is_not_found() {
        let db = test_db();
        assert!(matches!(card_tree(&db, "nope", CardKey::Id), Err(AppError::NotFound { .. })));
        assert!(matches!(
            graph(&db, "nope", &GraphLayout::default(), SupervisorAttachment::default()),
            Err(AppError::NotFound { .. })
        ));
    }

    #[test]
    fn test_forest_includes_empty_panchayath() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        panchayath(&db, "p2", "Anjarakandy", 3);
        coordinator(&db, "c1", "p1", "Asha", "9876543210", 1);

        let forest = card_forest(&db, CardKey::Id).unwrap();
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].panchayath_name, "Anjarakandy");
        assert!(forest[0].is_empty());
        assert_eq!(forest[1].coordinators.len(), 1);
    }

    #[test]
    fn test_graph_from_store() {
        let db = test_db();
        panchayath(&db, "p1", "Kadirur", 5);
        let c = coordinator(&db, "c1", "p1", "Asha", "9876543210", 2);
        let s = supervisor(&db, "s1", &c, "Biju", "9876543211", &[2, 3]);
        group_leader(&db, "g1", &s, "Chandran", "9876543212", 2);

        let g = graph(&db, "p1", &GraphLayout::default(), SupervisorAttachment::Panchayath).unwrap();
        assert_eq!(g.nodes.len(), 4);
        assert_eq!(g.edges.len(), 3);
        assert_eq!(g.parent_of("group-leader-g1"), Some("supervisor-s1"));
    }
}
