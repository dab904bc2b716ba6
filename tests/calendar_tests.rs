use chrono::NaiveDate;
use sprint_planner::{Period, Slot, SprintCalendar};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn window_enumerates_two_slots_per_working_day() {
    // 2024-03-18 is a Monday; one working week.
    let cal = SprintCalendar::new(date(2024, 3, 18), date(2024, 3, 22));
    let slots = cal.slots();
    assert_eq!(slots.len(), 10);
    assert_eq!(slots[0], Slot::morning(date(2024, 3, 18)));
    assert_eq!(slots[1], Slot::afternoon(date(2024, 3, 18)));
    assert_eq!(slots[9], Slot::afternoon(date(2024, 3, 22)));
}

#[test]
fn weekend_only_window_has_no_slots() {
    let cal = SprintCalendar::new(date(2024, 3, 23), date(2024, 3, 24));
    assert!(cal.slots().is_empty());
    assert_eq!(cal.first_slot(), None);
}

#[test]
fn first_slot_skips_a_weekend_start() {
    let cal = SprintCalendar::new(date(2024, 3, 23), date(2024, 3, 29));
    assert_eq!(cal.first_slot(), Some(Slot::morning(date(2024, 3, 25))));
}

#[test]
fn contains_matches_window_and_weekday() {
    let cal = SprintCalendar::new(date(2024, 3, 18), date(2024, 3, 29));
    assert!(cal.contains(Slot::morning(date(2024, 3, 22))));
    assert!(!cal.contains(Slot::morning(date(2024, 3, 23))));
    assert!(!cal.contains(Slot::afternoon(date(2024, 4, 1))));
}

#[test]
fn slot_serializes_with_date_and_period() {
    let slot = Slot::new(date(2024, 3, 18), Period::Afternoon);
    let json = serde_json::to_string(&slot).unwrap();
    assert_eq!(json, r#"{"date":"2024-03-18","period":"afternoon"}"#);
    let back: Slot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, slot);
}

#[test]
fn slot_display_is_human_readable() {
    let slot = Slot::morning(date(2024, 3, 18));
    assert_eq!(slot.to_string(), "2024-03-18 morning");
}
