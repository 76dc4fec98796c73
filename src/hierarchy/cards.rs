//! Card-view tree building from `hierarchy_view` rows.
//!
//! Both builders walk the rows level by level: collect the distinct keys at
//! a level in first-seen order, use the first row carrying a key as that
//! node's display record, and recurse into the rows that share the key.
//! They differ in the key: display names (`CardKey::Name`) or entity ids
//! (`CardKey::Id`). By id, each level recurses into its parent's rows. By
//! name, a supervisor's group leaders are drawn from every row carrying that
//! supervisor name, and a group leader's PROs from every row carrying that
//! group leader name, so same-named agents under different parents show the
//! union of their children.

use std::collections::HashMap;

use serde::Serialize;

use crate::db::{DbPanchayath, HierarchyRow};

/// How card branches are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKey {
    /// Distinct-by-name. Two agents sharing a literal name at the same level
    /// collapse into one branch.
    Name,
    /// Distinct-by-id. Every entity keeps its own branch.
    #[default]
    Id,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTree {
    pub panchayath_id: String,
    pub panchayath_name: String,
    pub ward_count: u32,
    pub coordinators: Vec<CoordinatorCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorCard {
    pub id: Option<String>,
    pub name: String,
    pub mobile: Option<String>,
    pub ward: Option<u32>,
    pub rating: Option<u8>,
    pub supervisors: Vec<SupervisorCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorCard {
    pub id: Option<String>,
    pub name: String,
    pub mobile: Option<String>,
    pub wards: Vec<u32>,
    pub group_leaders: Vec<GroupLeaderCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupLeaderCard {
    pub id: Option<String>,
    pub name: String,
    pub mobile: Option<String>,
    pub ward: Option<u32>,
    pub pros: Vec<ProCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProCard {
    pub id: Option<String>,
    pub name: String,
    pub mobile: Option<String>,
    pub ward: Option<u32>,
}

impl CardTree {
    /// Number of populated levels below the panchayath (0..=4).
    pub fn depth(&self) -> usize {
        self.coordinators
            .iter()
            .map(|c| {
                1 + c
                    .supervisors
                    .iter()
                    .map(|s| {
                        1 + s
                            .group_leaders
                            .iter()
                            .map(|g| if g.pros.is_empty() { 1 } else { 2 })
                            .max()
                            .unwrap_or(0)
                    })
                    .max()
                    .unwrap_or(0)
            })
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.coordinators.is_empty()
    }
}

/// Group `rows` by `key` in first-seen order, skipping rows whose key is absent.
/// The first row of every group is that group's display record.
fn group_first_seen<'a, F>(rows: &[&'a HierarchyRow], key: F) -> Vec<Vec<&'a HierarchyRow>>
where
    F: Fn(&'a HierarchyRow) -> Option<&'a str>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<Vec<&'a HierarchyRow>> = Vec::new();
    for &row in rows {
        let Some(k) = key(row) else { continue };
        match index.get(k) {
            Some(&i) => groups[i].push(row),
            None => {
                index.insert(k, groups.len());
                groups.push(vec![row]);
            }
        }
    }
    groups
}

fn coordinator_key(r: &HierarchyRow, mode: CardKey) -> Option<&str> {
    match mode {
        CardKey::Name => r.coordinator_name.as_deref(),
        CardKey::Id => r.coordinator_id.as_deref(),
    }
}

fn supervisor_key(r: &HierarchyRow, mode: CardKey) -> Option<&str> {
    match mode {
        CardKey::Name => r.supervisor_name.as_deref(),
        CardKey::Id => r.supervisor_id.as_deref(),
    }
}

fn group_leader_key(r: &HierarchyRow, mode: CardKey) -> Option<&str> {
    match mode {
        CardKey::Name => r.group_leader_name.as_deref(),
        CardKey::Id => r.group_leader_id.as_deref(),
    }
}

/// Build the card tree for one panchayath.
///
/// Rows are read, never modified. Rows belonging to other panchayaths are
/// not filtered here; callers pass the rows of `root` (see [`build_forest`]).
pub fn build_card_tree(root: &DbPanchayath, rows: &[HierarchyRow], mode: CardKey) -> CardTree {
    let all: Vec<&HierarchyRow> = rows.iter().collect();

    let coordinators = group_first_seen(&all, |r| coordinator_key(r, mode))
        .into_iter()
        .map(|coord_rows| {
            let display = coord_rows[0];
            CoordinatorCard {
                id: display.coordinator_id.clone(),
                name: display.coordinator_name.clone().unwrap_or_default(),
                mobile: display.coordinator_mobile.clone(),
                ward: display.coordinator_ward,
                rating: display.coordinator_rating,
                supervisors: build_supervisors(&all, &coord_rows, mode),
            }
        })
        .collect();

    CardTree {
        panchayath_id: root.id.clone(),
        panchayath_name: root.name.clone(),
        ward_count: root.number_of_wards,
        coordinators,
    }
}

/// Rows a child level is built from. By id the parent's own rows; by name
/// every row whose `name` at the parent level matches the display record.
fn child_scope<'a>(
    all: &[&'a HierarchyRow],
    own: Vec<&'a HierarchyRow>,
    mode: CardKey,
    name: fn(&HierarchyRow) -> Option<&str>,
) -> Vec<&'a HierarchyRow> {
    match mode {
        CardKey::Id => own,
        CardKey::Name => {
            let wanted = name(own[0]);
            all.iter().copied().filter(|&r| name(r) == wanted).collect()
        }
    }
}

fn build_supervisors(
    all: &[&HierarchyRow],
    rows: &[&HierarchyRow],
    mode: CardKey,
) -> Vec<SupervisorCard> {
    group_first_seen(rows, |r| supervisor_key(r, mode))
        .into_iter()
        .map(|sup_rows| {
            let display = sup_rows[0];
            let scope = child_scope(all, sup_rows, mode, |r| r.supervisor_name.as_deref());
            SupervisorCard {
                id: display.supervisor_id.clone(),
                name: display.supervisor_name.clone().unwrap_or_default(),
                mobile: display.supervisor_mobile.clone(),
                wards: display.supervisor_wards.clone(),
                group_leaders: build_group_leaders(all, &scope, mode),
            }
        })
        .collect()
}

fn build_group_leaders(
    all: &[&HierarchyRow],
    rows: &[&HierarchyRow],
    mode: CardKey,
) -> Vec<GroupLeaderCard> {
    group_first_seen(rows, |r| group_leader_key(r, mode))
        .into_iter()
        .map(|gl_rows| {
            let display = gl_rows[0];
            let scope = child_scope(all, gl_rows, mode, |r| r.group_leader_name.as_deref());
            GroupLeaderCard {
                id: display.group_leader_id.clone(),
                name: display.group_leader_name.clone().unwrap_or_default(),
                mobile: display.group_leader_mobile.clone(),
                ward: display.group_leader_ward,
                pros: build_pros(&scope, mode),
            }
        })
        .collect()
}

/// PRO cards are the leaf rows themselves. By name every row with a PRO
/// name is a card; by id, repeated ids are shown once.
fn build_pros(rows: &[&HierarchyRow], mode: CardKey) -> Vec<ProCard> {
    let to_card = |r: &HierarchyRow| ProCard {
        id: r.pro_id.clone(),
        name: r.pro_name.clone().unwrap_or_default(),
        mobile: r.pro_mobile.clone(),
        ward: r.pro_ward,
    };
    match mode {
        CardKey::Name => rows
            .iter()
            .filter(|r| r.pro_name.is_some())
            .map(|&r| to_card(r))
            .collect(),
        CardKey::Id => group_first_seen(rows, |r| r.pro_id.as_deref())
            .into_iter()
            .map(|group| to_card(group[0]))
            .collect(),
    }
}

/// Build one card tree per panchayath, in the order `panchayaths` is given.
/// Panchayaths without rows still appear with an empty tree.
pub fn build_forest(
    panchayaths: &[DbPanchayath],
    rows: &[HierarchyRow],
    mode: CardKey,
) -> Vec<CardTree> {
    let mut by_panchayath: HashMap<&str, Vec<HierarchyRow>> = HashMap::new();
    for row in rows {
        by_panchayath
            .entry(row.panchayath_id.as_str())
            .or_default()
            .push(row.clone());
    }
    panchayaths
        .iter()
        .map(|p| {
            let scoped = by_panchayath.get(p.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            build_card_tree(p, scoped, mode)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> DbPanchayath {
        DbPanchayath {
            id: "p1".to_string(),
            name: "Kadirur".to_string(),
            number_of_wards: 5,
            created_by: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn row(coord: (&str, &str), sup: Option<(&str, &str)>, gl: Option<(&str, &str)>, pro: Option<(&str, &str)>) -> HierarchyRow {
        HierarchyRow {
            panchayath_id: "p1".to_string(),
            coordinator_id: Some(coord.0.to_string()),
            coordinator_name: Some(coord.1.to_string()),
            coordinator_ward: Some(2),
            supervisor_id: sup.map(|s| s.0.to_string()),
            supervisor_name: sup.map(|s| s.1.to_string()),
            supervisor_wards: if sup.is_some() { vec![2, 3] } else { vec![] },
            group_leader_id: gl.map(|g| g.0.to_string()),
            group_leader_name: gl.map(|g| g.1.to_string()),
            group_leader_ward: gl.map(|_| 2),
            pro_id: pro.map(|p| p.0.to_string()),
            pro_name: pro.map(|p| p.1.to_string()),
            pro_ward: pro.map(|_| 2),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_coordinator_across_many_rows() {
        let rows = vec![
            row(("c1", "Asha"), Some(("s1", "Biju")), Some(("g1", "Chandran")), Some(("r1", "Divya"))),
            row(("c1", "Asha"), Some(("s1", "Biju")), Some(("g1", "Chandran")), Some(("r2", "Eby"))),
            row(("c1", "Asha"), Some(("s2", "Fathima")), None, None),
        ];
        for mode in [CardKey::Name, CardKey::Id] {
            let tree = build_card_tree(&root(), &rows, mode);
            assert_eq!(tree.coordinators.len(), 1);
            let asha = &tree.coordinators[0];
            assert_eq!(asha.supervisors.len(), 2);
            assert_eq!(asha.supervisors[0].group_leaders[0].pros.len(), 2);
            assert!(asha.supervisors[1].group_leaders.is_empty());
        }
    }

    #[test]
    fn test_name_mode_merges_coordinators_sharing_a_name() {
        let rows = vec![
            row(("c1", "Asha"), Some(("s1", "Biju")), None, None),
            row(("c2", "Asha"), Some(("s2", "Chitra")), None, None),
        ];

        let by_name = build_card_tree(&root(), &rows, CardKey::Name);
        assert_eq!(by_name.coordinators.len(), 1);
        assert_eq!(by_name.coordinators[0].id.as_deref(), Some("c1"));
        assert_eq!(by_name.coordinators[0].supervisors.len(), 2);

        let by_id = build_card_tree(&root(), &rows, CardKey::Id);
        assert_eq!(by_id.coordinators.len(), 2);
    }

    #[test]
    fn test_name_mode_unions_children_of_same_named_supervisors() {
        let rows = vec![
            row(("c1", "Asha"), Some(("s1", "Biju")), Some(("g1", "Chandran")), Some(("r1", "Divya"))),
            row(("c2", "Ravi"), Some(("s2", "Biju")), Some(("g2", "Elan")), None),
            row(("c2", "Ravi"), Some(("s3", "Gopi")), Some(("g3", "Chandran")), Some(("r2", "Hari"))),
        ];

        let by_name = build_card_tree(&root(), &rows, CardKey::Name);
        let leaders = |c: usize, s: usize| -> Vec<&str> {
            by_name.coordinators[c].supervisors[s]
                .group_leaders
                .iter()
                .map(|g| g.name.as_str())
                .collect()
        };
        assert_eq!(leaders(0, 0), vec!["Chandran", "Elan"]);
        assert_eq!(leaders(1, 0), vec!["Chandran", "Elan"]);
        assert_eq!(leaders(1, 1), vec!["Chandran"]);

        // Chandran under Biju also lists the PRO of the other Chandran.
        let pros: Vec<&str> = by_name.coordinators[0].supervisors[0].group_leaders[0]
            .pros
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(pros, vec!["Divya", "Hari"]);

        let by_id = build_card_tree(&root(), &rows, CardKey::Id);
        assert_eq!(by_id.coordinators[0].supervisors[0].group_leaders.len(), 1);
        assert_eq!(by_id.coordinators[1].supervisors[0].group_leaders[0].name, "Elan");
        assert_eq!(by_id.coordinators[0].supervisors[0].group_leaders[0].pros.len(), 1);
    }

    #[test]
    fn test_first_seen_order_is_kept() {
        let rows = vec![
            row(("c2", "Zara"), None, None, None),
            row(("c1", "Asha"), None, None, None),
            row(("c2", "Zara"), None, None, None),
        ];
        let tree = build_card_tree(&root(), &rows, CardKey::Name);
        let names: Vec<&str> = tree.coordinators.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Zara", "Asha"]);
    }

    #[test]
    fn test_rows_without_coordinator_name_are_skipped() {
        let mut orphan = row(("c9", "ignored"), None, None, None);
        orphan.coordinator_name = None;
        let tree = build_card_tree(&root(), &[orphan], CardKey::Name);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_empty_rows_yield_root_only() {
        let tree = build_card_tree(&root(), &[], CardKey::Id);
        assert_eq!(tree.panchayath_name, "Kadirur");
        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_depth_counts_levels() {
        let rows = vec![row(
            ("c1", "Asha"),
            Some(("s1", "Biju")),
            Some(("g1", "Chandran")),
            Some(("r1", "Divya")),
        )];
        assert_eq!(build_card_tree(&root(), &rows, CardKey::Id).depth(), 4);
        let shallow = vec![row(("c1", "Asha"), Some(("s1", "Biju")), None, None)];
        assert_eq!(build_card_tree(&root(), &shallow, CardKey::Id).depth(), 2);
    }

    #[test]
    fn test_builder_does_not_touch_input() {
        let rows = vec![row(("c1", "Asha"), Some(("s1", "Biju")), None, None)];
        let before = rows.clone();
        let _ = build_card_tree(&root(), &rows, CardKey::Name);
        assert_eq!(rows, before);
    }

    #[test]
    fn test_forest_keeps_empty_panchayaths() {
        let mut other = root();
        other.id = "p2".to_string();
        other.name = "Pinarayi".to_string();
        let rows = vec![row(("c1", "Asha"), None, None, None)];

        let forest = build_forest(&[root(), other], &rows, CardKey::Id);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].coordinators.len(), 1);
        assert!(forest[1].is_empty());
    }
}
