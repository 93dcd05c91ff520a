use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{Error, LessonRecord, MergedLesson, NormalizedLesson, Result};

#[cfg(test)]
mod tests;

/// Redundant suffix the upstream appends to every wall-clock time.
const TIME_SUFFIX: &str = ":00.0000000";

/// Fixed timezone of all MSLU schedules (Europe/Minsk, UTC+3, no DST).
pub fn minsk_tz() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600).expect("valid fixed offset")
}

fn parse_lesson_time(raw: &str) -> Result<NaiveTime> {
    let trimmed = raw.strip_suffix(TIME_SUFFIX).unwrap_or(raw);
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map_err(|_| Error::RecordField(format!("unparseable lesson time {raw:?}")))
}

fn localize(date: NaiveDate, time: NaiveTime) -> Result<DateTime<FixedOffset>> {
    minsk_tz()
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(|| Error::RecordField(format!("unrepresentable local time {date} {time}")))
}

/// One calendar entry, ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    /// Event title: caller prefix + discipline + session kind.
    pub title: String,
    /// Session start in the schedule timezone.
    pub start: DateTime<FixedOffset>,
    /// Session end in the schedule timezone.
    pub end: DateTime<FixedOffset>,
    /// Classroom.
    pub location: String,
    /// Teacher name (student view) or attending groups (teacher view).
    pub description: String,
}

fn event_title(prefix: &str, record: &LessonRecord) -> Result<String> {
    Ok(format!(
        "{}{} ({})",
        prefix,
        record.discipline()?,
        record.discipline_type()?
    ))
}

/// Event start/end instants for a record; a record missing a time field or
/// carrying an unparseable time string is a fatal error, never skipped.
fn event_times(
    record: &LessonRecord,
    lesson_date: NaiveDate,
) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let start = localize(lesson_date, parse_lesson_time(record.time_in()?)?)?;
    let end = localize(lesson_date, parse_lesson_time(record.time_out()?)?)?;
    Ok((start, end))
}

/// Build the event for one lesson of a student group's schedule.
pub fn student_event(lesson: &NormalizedLesson, title_prefix: &str) -> Result<CalendarEvent> {
    let (start, end) = event_times(&lesson.record, lesson.lesson_date)?;

    Ok(CalendarEvent {
        title: event_title(title_prefix, &lesson.record)?,
        start,
        end,
        location: lesson.record.classroom()?.to_string(),
        description: format!("Teacher: {}", lesson.record.teacher()?),
    })
}

/// Build the event for one merged lesson of a teacher's schedule.
pub fn teacher_event(lesson: &MergedLesson, title_prefix: &str) -> Result<CalendarEvent> {
    let (start, end) = event_times(&lesson.record, lesson.lesson_date)?;

    let description = if lesson.group_list.len() == 1 {
        format!("Group: {}", lesson.group_list[0])
    } else {
        format!("Groups: {}", lesson.group_list.join(", "))
    };

    Ok(CalendarEvent {
        title: event_title(title_prefix, &lesson.record)?,
        start,
        end,
        location: lesson.record.classroom()?.to_string(),
        description,
    })
}

/// Calendar-level options.
#[derive(Debug, Clone)]
pub struct CalendarOptions {
    /// `X-WR-CALNAME` value, omitted when `None`.
    pub calendar_name: Option<String>,
    /// `X-WR-TIMEZONE` value.
    pub timezone_name: String,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            calendar_name: None,
            timezone_name: "Europe/Minsk".to_string(),
        }
    }
}

/// iCalendar document writer.
///
/// Emits plain single-occurrence events; no recurrence rules, alarms or
/// attendee fields.
pub struct CalendarBuilder {
    options: CalendarOptions,
}

impl CalendarBuilder {
    pub fn new(options: CalendarOptions) -> Self {
        Self { options }
    }

    /// Serialize `events` into one iCalendar document.
    ///
    /// An empty slice yields a valid, empty calendar.
    pub fn generate(&self, events: &[CalendarEvent]) -> Result<String> {
        let mut ics = String::new();

        ics.push_str("BEGIN:VCALENDAR\r\n");
        ics.push_str("VERSION:2.0\r\n");
        ics.push_str("PRODID:-//MSLU ICal//MSLU Schedule Calendar//EN\r\n");
        ics.push_str("CALSCALE:GREGORIAN\r\n");
        ics.push_str("METHOD:PUBLISH\r\n");

        if let Some(ref name) = self.options.calendar_name {
            ics.push_str(&format!("X-WR-CALNAME:{}\r\n", escape_text(name)));
        }
        ics.push_str(&format!("X-WR-TIMEZONE:{}\r\n", self.options.timezone_name));

        for event in events {
            self.add_event(&mut ics, event);
        }

        ics.push_str("END:VCALENDAR\r\n");

        Ok(ics)
    }

    fn add_event(&self, ics: &mut String, event: &CalendarEvent) {
        let uid = Uuid::new_v4().to_string();
        let dtstamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let dtstart = event.start.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ");
        let dtend = event.end.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ");

        ics.push_str("BEGIN:VEVENT\r\n");
        ics.push_str(&format!("UID:{}\r\n", uid));
        ics.push_str(&format!("DTSTAMP:{}\r\n", dtstamp));
        ics.push_str(&format!("DTSTART:{}\r\n", dtstart));
        ics.push_str(&format!("DTEND:{}\r\n", dtend));
        ics.push_str(&format!("SUMMARY:{}\r\n", escape_text(&event.title)));
        ics.push_str(&format!("LOCATION:{}\r\n", escape_text(&event.location)));
        ics.push_str(&format!(
            "DESCRIPTION:{}\r\n",
            escape_text(&event.description)
        ));
        ics.push_str("END:VEVENT\r\n");
    }
}

impl Default for CalendarBuilder {
    fn default() -> Self {
        Self::new(CalendarOptions::default())
    }
}

/// Escape iCalendar text content.
fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace(',', "\\,")
        .replace(';', "\\;")
}
