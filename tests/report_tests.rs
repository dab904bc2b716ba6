use chrono::NaiveDate;
use sprint_planner::{
    DayOff, DayOffPeriod, DependencyEdge, Placement, Rejection, RejectionReason,
    ScheduleOutcome, Slot, SprintMeta, SprintReport, StorySummary,
};
use std::collections::BTreeMap;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_report() -> SprintReport {
    let sprint = SprintMeta {
        name: "2024_S07".to_string(),
        year: "2024".to_string(),
        quarter: "Q1".to_string(),
        start_date: date(2024, 3, 18),
        end_date: date(2024, 3, 29),
        timezone: "America/Sao_Paulo".to_string(),
    };
    let outcome = ScheduleOutcome {
        placements: vec![Placement {
            task_id: "T1".to_string(),
            executor: "a@x".to_string(),
            start: Slot::morning(date(2024, 3, 18)),
            end: Slot::afternoon(date(2024, 3, 18)),
            hours: 6.0,
        }],
        rejections: vec![
            Rejection {
                task_id: "T3".to_string(),
                reason: RejectionReason::NoExecutor,
            },
            Rejection {
                task_id: "T2".to_string(),
                reason: RejectionReason::NoExecutor,
            },
            Rejection {
                task_id: "T4".to_string(),
                reason: RejectionReason::DependencyCycle,
            },
        ],
    };
    let stories = vec![StorySummary {
        story_id: "US1".to_string(),
        title: "Checkout".to_string(),
        owner: "a@x".to_string(),
        start: Slot::morning(date(2024, 3, 18)),
        end: Slot::afternoon(date(2024, 3, 18)),
        story_points: 2,
        total_hours: 6.0,
    }];
    let mut dayoffs = BTreeMap::new();
    dayoffs.insert(
        "a@x".to_string(),
        vec![DayOff::new(date(2024, 3, 25), DayOffPeriod::Morning)],
    );
    let dependencies = vec![DependencyEdge {
        successor: "T2".to_string(),
        prerequisite: "T1".to_string(),
    }];
    SprintReport::assemble(sprint, "Proj\\Team", stories, &outcome, dayoffs, dependencies)
}

#[test]
fn rejections_are_grouped_and_sorted() {
    let report = sample_report();
    assert_eq!(report.rejection_count(), 3);

    let no_executor = &report.rejections[&RejectionReason::NoExecutor];
    let ids: Vec<&str> = no_executor.iter().map(|r| r.task_id.as_str()).collect();
    assert_eq!(ids, vec!["T2", "T3"]);
    assert_eq!(report.rejections[&RejectionReason::DependencyCycle].len(), 1);
}

#[test]
fn json_round_trip_preserves_every_field() {
    let report = sample_report();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.save_json(&path).unwrap();
    let loaded = SprintReport::load_json(&path).unwrap();
    assert_eq!(report, loaded);
}

#[test]
fn write_files_produces_json_csv_and_markdown() {
    let report = sample_report();
    let dir = tempfile::tempdir().unwrap();
    let files = report.write_files(dir.path()).unwrap();

    assert_eq!(files.len(), 3);
    for file in &files {
        assert!(file.exists(), "{} missing", file.display());
    }

    let csv = std::fs::read_to_string(&files[1]).unwrap();
    assert!(csv.contains("US1"));
    assert!(csv.contains("a@x"));
}

#[test]
fn markdown_carries_all_sections() {
    let markdown = sample_report().to_markdown();
    assert!(markdown.contains("# Sprint Report: 2024_S07"));
    assert!(markdown.contains("## 2. Planned User Stories"));
    assert!(markdown.contains("| US1 | Checkout | a@x |"));
    assert!(markdown.contains("## 3. Day-offs"));
    assert!(markdown.contains("2024-03-25 (morning)"));
    assert!(markdown.contains("Task T2 depends on task T1"));
    assert!(markdown.contains("### no-executor"));
    assert!(markdown.contains("- Task T3"));
}
