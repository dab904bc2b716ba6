use sprint_planner::{normalize_items, Discipline, TaskState, WorkItem, WorkItemKind};

fn story(id: &str, title: &str) -> WorkItem {
    WorkItem {
        id: id.to_string(),
        kind: WorkItemKind::UserStory,
        title: title.to_string(),
        state: "Active".to_string(),
        original_estimate: None,
        assigned_to: None,
        parent_id: None,
        area_path: "Proj\\Team".to_string(),
    }
}

fn task(id: &str, title: &str, parent: Option<&str>) -> WorkItem {
    WorkItem {
        id: id.to_string(),
        kind: WorkItemKind::Task,
        title: title.to_string(),
        state: "New".to_string(),
        original_estimate: Some(3.0),
        assigned_to: Some("Dev@Corp.com".to_string()),
        parent_id: parent.map(str::to_string),
        area_path: "Proj\\Team".to_string(),
    }
}

#[test]
fn tasks_attach_to_their_stories_in_order() {
    let items = vec![
        story("US1", "Checkout"),
        story("US2", "Login"),
        task("T1", "[BE] api", Some("US1")),
        task("T2", "[FE] form", Some("US2")),
        task("T3", "[QA] regression", Some("US1")),
    ];
    let backlog = normalize_items(&items).unwrap();

    assert_eq!(backlog.stories.len(), 2);
    assert_eq!(backlog.tasks.len(), 3);
    assert_eq!(backlog.story("US1").unwrap().task_ids, vec!["T1", "T3"]);
    assert_eq!(backlog.story("US2").unwrap().task_ids, vec!["T2"]);
}

#[test]
fn orphan_tasks_are_dropped() {
    let items = vec![
        story("US1", "Checkout"),
        task("T1", "[BE] api", Some("US9")),
        task("T2", "[BE] db", None),
    ];
    let backlog = normalize_items(&items).unwrap();
    assert!(backlog.tasks.is_empty());
}

#[test]
fn states_and_disciplines_are_normalized() {
    let mut closed = task("T1", "[BE] api", Some("US1"));
    closed.state = "Closed".to_string();
    let mut odd_state = task("T2", "[QA] Plano de Testes", Some("US1"));
    odd_state.state = "Resolved".to_string();

    let backlog = normalize_items(&[story("US1", "Checkout"), closed, odd_state]).unwrap();

    let t1 = backlog.task("T1").unwrap();
    assert_eq!(t1.state, TaskState::Closed);
    assert_eq!(t1.discipline, Discipline::Backend);
    assert_eq!(t1.assignee.as_deref(), Some("dev@corp.com"));

    let t2 = backlog.task("T2").unwrap();
    assert_eq!(t2.state, TaskState::Active);
    assert!(t2.is_test_plan);
}

#[test]
fn negative_estimate_becomes_missing() {
    let mut item = task("T1", "[BE] api", Some("US1"));
    item.original_estimate = Some(-2.0);
    let backlog = normalize_items(&[story("US1", "Checkout"), item]).unwrap();
    assert_eq!(backlog.task("T1").unwrap().estimate_hours, None);
}

#[test]
fn duplicate_ids_are_an_error() {
    let items = vec![
        story("US1", "Checkout"),
        task("T1", "[BE] api", Some("US1")),
        task("T1", "[BE] api again", Some("US1")),
    ];
    assert!(normalize_items(&items).is_err());

    let items = vec![story("US1", "Checkout"), story("US1", "Checkout again")];
    assert!(normalize_items(&items).is_err());
}

#[test]
fn work_item_snapshot_round_trips() {
    let items = vec![story("US1", "Checkout"), task("T1", "[BE] api", Some("US1"))];
    let json = serde_json::to_string(&items).unwrap();
    let back: Vec<WorkItem> = serde_json::from_str(&json).unwrap();
    assert_eq!(items, back);
}
