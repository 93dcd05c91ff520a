use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One scheduled class session as returned by the timetable backend.
///
/// Field names follow the upstream JSON. Only `DayNumber` is required to
/// decode, since the week's dates cannot be assigned without it; the other
/// fields decode leniently and a missing one only becomes an error when the
/// calendar builder needs it. `Group` is only populated on teacher-schedule
/// records and defaults to empty elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonRecord {
    /// Day offset within the requested week, 1 = first day of the week.
    #[serde(rename = "DayNumber")]
    pub day_number: u32,
    /// Course name.
    #[serde(rename = "Discipline")]
    pub discipline: Option<String>,
    /// Session kind (lecture, seminar, ...).
    #[serde(rename = "Discipline_Type")]
    pub discipline_type: Option<String>,
    /// Wall-clock start time, e.g. `"09:00:00.0000000"`.
    #[serde(rename = "TimeIn")]
    pub time_in: Option<String>,
    /// Wall-clock end time, same format as `TimeIn`.
    #[serde(rename = "TimeOut")]
    pub time_out: Option<String>,
    /// Classroom identifier.
    #[serde(rename = "Classroom")]
    pub classroom: Option<String>,
    /// Teacher full name.
    #[serde(rename = "FIO_teacher")]
    pub teacher: Option<String>,
    /// Student group identifier, present on teacher-schedule records.
    #[serde(rename = "Group", default)]
    pub group: String,
}

fn required_field<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| Error::RecordField(format!("missing field {name}")))
}

impl LessonRecord {
    /// Course name, or `RecordField` when upstream omitted it.
    pub fn discipline(&self) -> Result<&str> {
        required_field(&self.discipline, "Discipline")
    }

    /// Session kind, or `RecordField` when upstream omitted it.
    pub fn discipline_type(&self) -> Result<&str> {
        required_field(&self.discipline_type, "Discipline_Type")
    }

    /// Start time, or `RecordField` when upstream omitted it.
    pub fn time_in(&self) -> Result<&str> {
        required_field(&self.time_in, "TimeIn")
    }

    /// End time, or `RecordField` when upstream omitted it.
    pub fn time_out(&self) -> Result<&str> {
        required_field(&self.time_out, "TimeOut")
    }

    /// Classroom, or `RecordField` when upstream omitted it.
    pub fn classroom(&self) -> Result<&str> {
        required_field(&self.classroom, "Classroom")
    }

    /// Teacher name, or `RecordField` when upstream omitted it.
    pub fn teacher(&self) -> Result<&str> {
        required_field(&self.teacher, "FIO_teacher")
    }
}

/// Envelope the upstream wraps week-view responses in.
#[derive(Debug, Deserialize)]
pub struct ScheduleResponse {
    /// Lesson records for the requested week.
    pub data: Vec<LessonRecord>,
}

/// A lesson record with its computed absolute calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedLesson {
    /// The raw record as received from upstream.
    pub record: LessonRecord,
    /// Absolute date derived from the week's first day and `day_number`.
    pub lesson_date: NaiveDate,
}

/// A normalized lesson merged across the student groups attending it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedLesson {
    /// The first-seen record for this session.
    pub record: LessonRecord,
    /// Absolute date of the session.
    pub lesson_date: NaiveDate,
    /// Distinct attending groups in first-seen order.
    pub group_list: Vec<String>,
}

/// Week offset from the current academic week supported by the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeekSelector {
    /// The week containing "today".
    Current,
    /// One week ahead.
    Next,
    /// Two weeks ahead.
    Third,
    /// Three weeks ahead.
    Fourth,
}

impl WeekSelector {
    /// All selectors in the fixed fan-out (and concatenation) order.
    pub const ALL: [Self; 4] = [Self::Current, Self::Next, Self::Third, Self::Fourth];

    /// Value of the upstream `weekType` query parameter.
    pub fn query_value(self) -> &'static str {
        match self {
            Self::Current => "currentWeek",
            Self::Next => "nextWeek",
            Self::Third => "thirdWeek",
            Self::Fourth => "fourthWeek",
        }
    }

    /// Day offset of this week's first day from the current week's first day.
    pub fn offset_days(self) -> i64 {
        match self {
            Self::Current => 0,
            Self::Next => 7,
            Self::Third => 14,
            Self::Fourth => 21,
        }
    }
}

/// Whose schedule to request; selects the upstream path and id parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleTarget {
    /// A student group's schedule.
    Group(u32),
    /// A teacher's combined schedule.
    Teacher(u32),
}

/// A passthrough listing response mirrored from upstream.
#[derive(Debug, Clone)]
pub struct RawListing {
    /// Upstream HTTP status code.
    pub status: u16,
    /// Upstream body, passed through unmodified.
    pub body: String,
}

impl RawListing {
    /// Whether the upstream answered with a success status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
