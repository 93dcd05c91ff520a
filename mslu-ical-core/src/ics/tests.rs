use std::io::BufReader;

use chrono::NaiveDate;
use ical::parser::ical::{IcalParser, component::IcalEvent};

use super::*;
use crate::{LessonRecord, MergedLesson, NormalizedLesson};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn lesson(discipline: &str, time_in: &str, time_out: &str) -> NormalizedLesson {
    NormalizedLesson {
        record: LessonRecord {
            day_number: 1,
            discipline: Some(discipline.to_string()),
            discipline_type: Some("Lecture".to_string()),
            time_in: Some(time_in.to_string()),
            time_out: Some(time_out.to_string()),
            classroom: Some("B-204".to_string()),
            teacher: Some("Ivanova I. I.".to_string()),
            group: String::new(),
        },
        lesson_date: date(2024, 5, 13),
    }
}

fn merged(groups: &[&str]) -> MergedLesson {
    let base = lesson("Phonetics", "09:00:00.0000000", "10:20:00.0000000");
    MergedLesson {
        record: base.record,
        lesson_date: base.lesson_date,
        group_list: groups.iter().map(|g| (*g).to_string()).collect(),
    }
}

fn parse_events(ics: &str) -> Vec<IcalEvent> {
    let mut parser = IcalParser::new(BufReader::new(ics.as_bytes()));
    let calendar = parser
        .next()
        .expect("one calendar")
        .expect("calendar parses");
    assert!(parser.next().is_none(), "exactly one calendar expected");
    calendar.events
}

fn prop<'a>(event: &'a IcalEvent, name: &str) -> &'a str {
    event
        .properties
        .iter()
        .find(|p| p.name == name)
        .and_then(|p| p.value.as_deref())
        .unwrap_or_default()
}

#[test]
fn time_suffix_strips_to_wall_clock() {
    let event = student_event(
        &lesson("Phonetics", "09:00:00.0000000", "10:20:00.0000000"),
        "",
    )
    .expect("valid event");

    // 09:00 Minsk (UTC+3) on the lesson date.
    assert_eq!(event.start.format("%H:%M").to_string(), "09:00");
    assert_eq!(event.start.offset().local_minus_utc(), 3 * 3600);
    assert_eq!(
        event.start.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string(),
        "20240513T060000Z"
    );
}

#[test]
fn unparseable_time_is_a_fatal_record_error() {
    let result = student_event(&lesson("Phonetics", "nine sharp", "10:20:00.0000000"), "");
    assert!(matches!(result, Err(Error::RecordField(_))));
}

#[test]
fn missing_field_is_a_fatal_record_error() {
    // An incomplete record must fail the build, not vanish from the
    // calendar; a valid sibling record still builds on its own.
    let mut incomplete = lesson("Phonetics", "09:00:00.0000000", "10:20:00.0000000");
    incomplete.record.discipline = None;

    let result = student_event(&incomplete, "");
    assert!(matches!(result, Err(Error::RecordField(_))));

    let mut no_teacher = lesson("Phonetics", "09:00:00.0000000", "10:20:00.0000000");
    no_teacher.record.teacher = None;
    assert!(matches!(
        student_event(&no_teacher, ""),
        Err(Error::RecordField(_))
    ));

    let valid = lesson("Grammar", "11:50:00.0000000", "13:10:00.0000000");
    assert!(student_event(&valid, "").is_ok());
}

#[test]
fn only_the_trailing_time_suffix_is_stripped() {
    // A bare wall-clock value without the upstream suffix parses as-is.
    let event = student_event(&lesson("Phonetics", "09:00", "10:20"), "").expect("valid event");
    assert_eq!(event.start.format("%H:%M").to_string(), "09:00");
    assert_eq!(event.end.format("%H:%M").to_string(), "10:20");
}

#[test]
fn title_prefix_is_appended_verbatim() {
    let event = student_event(
        &lesson("Phonetics", "09:00:00.0000000", "10:20:00.0000000"),
        "🎒 ",
    )
    .expect("valid event");
    assert_eq!(event.title, "🎒 Phonetics (Lecture)");
}

#[test]
fn teacher_event_description_single_and_many_groups() {
    let single = teacher_event(&merged(&["201"]), "").expect("valid event");
    assert_eq!(single.description, "Group: 201");

    let many = teacher_event(&merged(&["201", "202", "203"]), "").expect("valid event");
    assert_eq!(many.description, "Groups: 201, 202, 203");
}

#[test]
fn empty_input_yields_valid_empty_calendar() {
    let ics = CalendarBuilder::default()
        .generate(&[])
        .expect("empty calendar");

    assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(ics.ends_with("END:VCALENDAR\r\n"));
    assert!(!ics.contains("BEGIN:VEVENT"));
    assert!(parse_events(&ics).is_empty());
}

#[test]
fn calendar_round_trips_through_parser() {
    let lessons = vec![
        lesson("Phonetics", "09:00:00.0000000", "10:20:00.0000000"),
        lesson("Grammar", "11:50:00.0000000", "13:10:00.0000000"),
    ];
    let events: Vec<CalendarEvent> = lessons
        .iter()
        .map(|l| student_event(l, "").expect("valid event"))
        .collect();

    let ics = CalendarBuilder::default().generate(&events).expect("calendar");
    let parsed = parse_events(&ics);
    assert_eq!(parsed.len(), 2);

    assert_eq!(prop(&parsed[0], "SUMMARY"), "Phonetics (Lecture)");
    assert_eq!(prop(&parsed[0], "DTSTART"), "20240513T060000Z");
    assert_eq!(prop(&parsed[0], "DTEND"), "20240513T072000Z");
    assert_eq!(prop(&parsed[0], "LOCATION"), "B-204");
    assert_eq!(prop(&parsed[0], "DESCRIPTION"), "Teacher: Ivanova I. I.");

    assert_eq!(prop(&parsed[1], "SUMMARY"), "Grammar (Lecture)");
    assert_eq!(prop(&parsed[1], "DTSTART"), "20240513T085000Z");
    assert_eq!(prop(&parsed[1], "DTEND"), "20240513T101000Z");
}

#[test]
fn text_content_is_escaped() {
    let mut l = lesson("Reading, writing; listening", "09:00:00.0000000", "10:20:00.0000000");
    l.record.classroom = Some("Main building, room 5".to_string());

    let event = student_event(&l, "").expect("valid event");
    let ics = CalendarBuilder::default()
        .generate(&[event])
        .expect("calendar");

    assert!(ics.contains("SUMMARY:Reading\\, writing\\; listening (Lecture)\r\n"));
    assert!(ics.contains("LOCATION:Main building\\, room 5\r\n"));
}

#[test]
fn calendar_name_is_emitted_when_set() {
    let builder = CalendarBuilder::new(CalendarOptions {
        calendar_name: Some("MSLU Schedule".to_string()),
        ..CalendarOptions::default()
    });
    let ics = builder.generate(&[]).expect("calendar");

    assert!(ics.contains("X-WR-CALNAME:MSLU Schedule\r\n"));
    assert!(ics.contains("X-WR-TIMEZONE:Europe/Minsk\r\n"));
}
