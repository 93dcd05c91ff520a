use std::future::Future;

use crate::{NormalizedLesson, Result, WeekSelector};

/// Fetch all four week views concurrently and flatten the results.
///
/// Results are concatenated in [`WeekSelector::ALL`] order regardless of
/// which fetch settles first. A failed week contributes zero records and is
/// logged at `warn`; partial upstream outages degrade the calendar instead
/// of failing the whole request.
pub async fn fetch_all_weeks<F, Fut>(fetch: F) -> Vec<NormalizedLesson>
where
    F: Fn(WeekSelector) -> Fut,
    Fut: Future<Output = Result<Vec<NormalizedLesson>>>,
{
    let [current, next, third, fourth] = WeekSelector::ALL;
    let results = tokio::join!(fetch(current), fetch(next), fetch(third), fetch(fourth));

    let mut lessons = Vec::new();
    for (week, result) in WeekSelector::ALL
        .into_iter()
        .zip([results.0, results.1, results.2, results.3])
    {
        match result {
            Ok(week_lessons) => lessons.extend(week_lessons),
            Err(e) => {
                tracing::warn!(week = week.query_value(), error = %e, "week fetch failed, skipping");
            }
        }
    }

    lessons
}
