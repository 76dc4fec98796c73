//! End-to-end flows through the service layer against an on-disk database.

use panchayath_lib::db::{AgentDb, DbGroupLeader};
use panchayath_lib::error::{AppError, CommandError};
use panchayath_lib::forms::{
    CoordinatorForm, GroupLeaderForm, PanchayathForm, ProForm, SupervisorForm,
};
use panchayath_lib::hierarchy::{render_outline, CardKey, GraphLayout, SupervisorAttachment};
use panchayath_lib::services::{hierarchy, panchayaths, roles};
use panchayath_lib::util::now_rfc3339;

struct Kadirur {
    _dir: tempfile::TempDir,
    db: AgentDb,
    panchayath_id: String,
    coordinator_id: String,
    supervisor_id: String,
    group_leader_id: String,
}

fn kadirur() -> Kadirur {
    let dir = tempfile::tempdir().unwrap();
    let db = AgentDb::open_at(dir.path().join("agents.db")).unwrap();

    let p = panchayaths::create_panchayath(
        &db,
        &PanchayathForm {
            name: "Kadirur".into(),
            number_of_wards: 5,
        },
        None,
    )
    .unwrap();
    let c = roles::create_coordinator(
        &db,
        &CoordinatorForm {
            panchayath_id: p.id.clone(),
            name: "Asha".into(),
            mobile_number: "9876543210".into(),
            ward: 2,
            rating: Some(8),
        },
    )
    .unwrap();
    let s = roles::create_supervisor(
        &db,
        &SupervisorForm {
            panchayath_id: p.id.clone(),
            coordinator_id: c.id.clone(),
            name: "Biju".into(),
            mobile_number: "9876543211".into(),
            wards: vec![3, 2],
        },
    )
    .unwrap();
    let g = roles::create_group_leader(
        &db,
        &GroupLeaderForm {
            panchayath_id: p.id.clone(),
            supervisor_id: s.id.clone(),
            name: "Chandran".into(),
            mobile_number: "9876543212".into(),
            ward: 2,
        },
    )
    .unwrap();
    roles::create_pro(
        &db,
        &ProForm {
            panchayath_id: p.id.clone(),
            group_leader_id: g.id.clone(),
            name: "Divya".into(),
            mobile_number: "9876543213".into(),
            ward: 2,
        },
    )
    .unwrap();

    Kadirur {
        _dir: dir,
        db,
        panchayath_id: p.id,
        coordinator_id: c.id,
        supervisor_id: s.id,
        group_leader_id: g.id,
    }
}

#[test]
fn full_chain_renders_four_levels() {
    let k = kadirur();
    let tree = hierarchy::card_tree(&k.db, &k.panchayath_id, CardKey::Id).unwrap();
    assert_eq!(tree.depth(), 4);

    let outline = render_outline(&tree);
    let lines: Vec<&str> = outline.lines().collect();
    assert_eq!(lines[0], "Kadirur [5 wards]");
    assert!(lines[1].starts_with("  Coordinator: Asha (ward 2)"));
    assert_eq!(lines[2], "    Supervisor: Biju (wards 2, 3)");
    assert_eq!(lines[3], "      Group Leader: Chandran (ward 2)");
    assert_eq!(lines[4], "        PRO: Divya (ward 2)");
}

#[test]
fn group_leader_outside_supervised_wards_stays_unlinked_in_graph() {
    let k = kadirur();
    // Imported rows can carry a ward no supervisor covers.
    let now = now_rfc3339();
    k.db.insert_group_leader(&DbGroupLeader {
        id: "elan".into(),
        panchayath_id: k.panchayath_id.clone(),
        supervisor_id: k.supervisor_id.clone(),
        name: "Elan".into(),
        mobile_number: "9876543214".into(),
        ward: 4,
        created_at: now.clone(),
        updated_at: now,
    })
    .unwrap();

    let graph = hierarchy::graph(
        &k.db,
        &k.panchayath_id,
        &GraphLayout::default(),
        SupervisorAttachment::Panchayath,
    )
    .unwrap();

    assert!(graph.node("group-leader-elan").is_some());
    assert_eq!(graph.parent_of("group-leader-elan"), None);
    let chandran = format!("group-leader-{}", k.group_leader_id);
    let biju = format!("supervisor-{}", k.supervisor_id);
    assert_eq!(graph.parent_of(&chandran), Some(biju.as_str()));
    for node in &graph.nodes {
        assert!(graph.incoming(&node.id) <= 1, "{} has several parents", node.id);
    }
}

#[test]
fn duplicate_mobile_names_owning_table() {
    let k = kadirur();
    let err = roles::create_pro(
        &k.db,
        &ProForm {
            panchayath_id: k.panchayath_id.clone(),
            group_leader_id: k.group_leader_id.clone(),
            name: "Fathima".into(),
            mobile_number: "9876543210".into(),
            ward: 2,
        },
    )
    .unwrap_err();

    assert!(matches!(err, AppError::DuplicateMobile { .. }));
    let shown = CommandError::from(err);
    assert!(shown.message.contains("coordinators"), "{}", shown.message);
}

#[test]
fn coordinator_ward_survives_update() {
    let k = kadirur();
    let updated = roles::update_coordinator(
        &k.db,
        &k.coordinator_id,
        &CoordinatorForm {
            panchayath_id: k.panchayath_id.clone(),
            name: "Asha K".into(),
            mobile_number: "9876543210".into(),
            ward: 5,
            rating: Some(9),
        },
    )
    .unwrap();
    assert_eq!(updated.ward, 5);

    let fetched = roles::get_coordinator(&k.db, &k.coordinator_id).unwrap();
    assert_eq!(fetched.ward, 5);
    assert_eq!(fetched.name, "Asha K");
}

#[test]
fn panchayath_with_agents_cannot_be_deleted() {
    let k = kadirur();
    let err = panchayaths::delete_panchayath(&k.db, &k.panchayath_id, true).unwrap_err();
    assert!(matches!(err, AppError::HasDependents { .. }));
    assert!(panchayaths::get_panchayath(&k.db, &k.panchayath_id).is_ok());
}
