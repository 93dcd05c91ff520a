use std::{fs, sync::Arc};

use anyhow::Result;
use chrono::Utc;
use mslu_ical_core::prelude::*;

/// Parameters of the `generate` command.
pub struct GenerateParams {
    pub target: ScheduleTarget,
    pub title_prefix: Option<String>,
    pub output: Option<String>,
    pub calendar_name: Option<String>,
    pub base_url: String,
}

fn schedule_client(base_url: String) -> ScheduleClient {
    ScheduleClient::new(base_url, Arc::new(RotatingIdentity::with_defaults()))
}

/// Fetch a schedule and write the rendered calendar.
pub async fn generate_command(params: GenerateParams) -> Result<()> {
    let client = schedule_client(params.base_url);
    let today = Utc::now().with_timezone(&minsk_tz()).date_naive();
    let prefix = params.title_prefix.unwrap_or_default();

    tracing::info!(target = ?params.target, "fetching schedule");
    let lessons = client.full_schedule(params.target, today).await;
    tracing::info!(lessons = lessons.len(), "fetched lesson records");

    let events = match params.target {
        ScheduleTarget::Group(_) => lessons
            .iter()
            .map(|lesson| student_event(lesson, &prefix))
            .collect::<Result<Vec<_>, _>>()?,
        ScheduleTarget::Teacher(_) => merge_groups(lessons)
            .iter()
            .map(|lesson| teacher_event(lesson, &prefix))
            .collect::<Result<Vec<_>, _>>()?,
    };

    let builder = CalendarBuilder::new(CalendarOptions {
        calendar_name: params.calendar_name,
        ..CalendarOptions::default()
    });
    let ics = builder.generate(&events)?;

    match params.output {
        Some(path) => {
            fs::write(&path, &ics)?;
            println!("Calendar with {} events written to {}", events.len(), path);
        }
        None => print!("{}", ics),
    }

    Ok(())
}

/// Print the group listing for a faculty and education form.
pub async fn groups_command(base_url: String, faculty_id: u32, education_form: u32) -> Result<()> {
    let client = schedule_client(base_url);
    let listing = client.groups_listing(faculty_id, education_form).await?;

    if !listing.is_success() {
        anyhow::bail!("upstream returned HTTP {}", listing.status);
    }

    println!("{}", listing.body);
    Ok(())
}

/// Print the teacher-name listing.
pub async fn teachers_command(base_url: String) -> Result<()> {
    let client = schedule_client(base_url);
    let listing = client.teacher_names().await?;

    if !listing.is_success() {
        anyhow::bail!("upstream returned HTTP {}", listing.status);
    }

    println!("{}", listing.body);
    Ok(())
}
