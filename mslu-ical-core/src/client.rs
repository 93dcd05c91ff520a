use std::{sync::Arc, time::Duration};

use chrono::{Datelike, Duration as Days, NaiveDate};
use reqwest::{Client, header};

use crate::{
    Error, LessonRecord, NormalizedLesson, RawListing, Result, ScheduleResponse, ScheduleTarget,
    WeekSelector, fanout::fetch_all_weeks, identity::ClientIdentity,
};

/// First day of the week containing `today`.
///
/// Mirrors the timetable backend's own anchoring: `today - (weekday % 7)`
/// days with Monday = 0. A Sunday therefore counts six days back to the
/// Monday that opened its week rather than starting a new one.
pub fn week_first_day(today: NaiveDate) -> NaiveDate {
    today - Days::days(i64::from(today.weekday().num_days_from_monday() % 7))
}

fn attach_dates(records: Vec<LessonRecord>, first_day: NaiveDate) -> Vec<NormalizedLesson> {
    records
        .into_iter()
        .map(|record| NormalizedLesson {
            lesson_date: first_day + Days::days(i64::from(record.day_number) - 1),
            record,
        })
        .collect()
}

/// HTTP client for the MSLU timetable backend.
pub struct ScheduleClient {
    http: Client,
    base_url: String,
    identity: Arc<dyn ClientIdentity>,
}

impl ScheduleClient {
    /// Create a client against `base_url`, e.g. `http://schedule.mslu.by/backend`.
    pub fn new(base_url: impl Into<String>, identity: Arc<dyn ClientIdentity>) -> Self {
        let base_url: String = base_url.into();
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(header::ACCEPT, "application/json".parse().unwrap());
                headers
            })
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            identity,
        }
    }

    fn week_url(&self, target: ScheduleTarget, week: WeekSelector) -> String {
        match target {
            ScheduleTarget::Group(id) => format!(
                "{}/?groupId={}&weekType={}",
                self.base_url,
                id,
                week.query_value()
            ),
            ScheduleTarget::Teacher(id) => format!(
                "{}/teachers?teacherId={}&weekType={}",
                self.base_url,
                id,
                week.query_value()
            ),
        }
    }

    /// Fetch one week of `target`'s schedule and attach absolute dates.
    ///
    /// `today` anchors the date computation; callers issuing several week
    /// fetches for one request must pass the same value to all of them.
    pub async fn week_schedule(
        &self,
        target: ScheduleTarget,
        week: WeekSelector,
        today: NaiveDate,
    ) -> Result<Vec<NormalizedLesson>> {
        let url = self.week_url(target, week);
        tracing::debug!(%url, "fetching week schedule");

        let response = self
            .http
            .get(&url)
            .header(header::USER_AGENT, self.identity.next_identity())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        let payload: ScheduleResponse = serde_json::from_str(&body)?;

        let first_day = week_first_day(today) + Days::days(week.offset_days());
        Ok(attach_dates(payload.data, first_day))
    }

    /// Fetch all four weeks of `target`'s schedule concurrently.
    ///
    /// Failed weeks contribute no records; see [`fetch_all_weeks`].
    pub async fn full_schedule(
        &self,
        target: ScheduleTarget,
        today: NaiveDate,
    ) -> Vec<NormalizedLesson> {
        fetch_all_weeks(|week| self.week_schedule(target, week, today)).await
    }

    async fn passthrough(&self, url: String) -> Result<RawListing> {
        tracing::debug!(%url, "fetching passthrough listing");

        let response = self
            .http
            .get(&url)
            .header(header::USER_AGENT, self.identity.next_identity())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawListing { status, body })
    }

    /// Fetch the group listing for a faculty and education form, unmodified.
    pub async fn groups_listing(&self, faculty_id: u32, education_form: u32) -> Result<RawListing> {
        self.passthrough(format!(
            "{}/buttonClicked?facultyId={}&educationForm={}",
            self.base_url, faculty_id, education_form
        ))
        .await
    }

    /// Fetch the teacher-name listing, unmodified.
    pub async fn teacher_names(&self) -> Result<RawListing> {
        self.passthrough(format!("{}/getTeacherNames", self.base_url))
            .await
    }
}
