use std::collections::HashMap;

use chrono::NaiveDate;

use crate::{MergedLesson, NormalizedLesson};

/// Identity of "the same session" across group-specific records.
///
/// Only these six fields participate; the teacher and group fields must not
/// affect grouping. Fields are compared as decoded, absent included, so the
/// merge itself never fails; an absent field surfaces later when the
/// calendar builder needs it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MergeKey {
    discipline: Option<String>,
    discipline_type: Option<String>,
    lesson_date: NaiveDate,
    time_in: Option<String>,
    time_out: Option<String>,
    classroom: Option<String>,
}

impl MergeKey {
    fn of(lesson: &NormalizedLesson) -> Self {
        Self {
            discipline: lesson.record.discipline.clone(),
            discipline_type: lesson.record.discipline_type.clone(),
            lesson_date: lesson.lesson_date,
            time_in: lesson.record.time_in.clone(),
            time_out: lesson.record.time_out.clone(),
            classroom: lesson.record.classroom.clone(),
        }
    }
}

/// Merge lesson records that are the same session taught to several groups.
///
/// Output order is the first occurrence of each distinct key; within one
/// merged record the group list keeps first-seen order with no duplicates.
pub fn merge_groups(lessons: Vec<NormalizedLesson>) -> Vec<MergedLesson> {
    let mut index: HashMap<MergeKey, usize> = HashMap::new();
    let mut merged: Vec<MergedLesson> = Vec::new();

    for lesson in lessons {
        let key = MergeKey::of(&lesson);
        match index.get(&key) {
            Some(&slot) => {
                let entry = &mut merged[slot];
                if !entry.group_list.contains(&lesson.record.group) {
                    entry.group_list.push(lesson.record.group);
                }
            }
            None => {
                index.insert(key, merged.len());
                merged.push(MergedLesson {
                    group_list: vec![lesson.record.group.clone()],
                    lesson_date: lesson.lesson_date,
                    record: lesson.record,
                });
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LessonRecord;

    fn lesson(discipline: &str, group: &str, time_in: &str) -> NormalizedLesson {
        NormalizedLesson {
            record: LessonRecord {
                day_number: 1,
                discipline: Some(discipline.to_string()),
                discipline_type: Some("Lecture".to_string()),
                time_in: Some(time_in.to_string()),
                time_out: Some("10:20:00.0000000".to_string()),
                classroom: Some("B-204".to_string()),
                teacher: Some("Ivanova I. I.".to_string()),
                group: group.to_string(),
            },
            lesson_date: NaiveDate::from_ymd_opt(2024, 5, 13).expect("valid date"),
        }
    }

    #[test]
    fn records_differing_only_in_group_merge() {
        let merged = merge_groups(vec![
            lesson("Phonetics", "Group-A", "09:00:00.0000000"),
            lesson("Phonetics", "Group-B", "09:00:00.0000000"),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].group_list, vec!["Group-A", "Group-B"]);
    }

    #[test]
    fn duplicate_group_is_not_reappended() {
        let merged = merge_groups(vec![
            lesson("Phonetics", "Group-A", "09:00:00.0000000"),
            lesson("Phonetics", "Group-B", "09:00:00.0000000"),
            lesson("Phonetics", "Group-A", "09:00:00.0000000"),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].group_list, vec!["Group-A", "Group-B"]);
    }

    #[test]
    fn differing_time_keeps_records_apart() {
        let merged = merge_groups(vec![
            lesson("Phonetics", "Group-A", "09:00:00.0000000"),
            lesson("Phonetics", "Group-B", "11:50:00.0000000"),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].group_list, vec!["Group-A"]);
        assert_eq!(merged[1].group_list, vec!["Group-B"]);
    }

    #[test]
    fn teacher_field_does_not_affect_grouping() {
        let mut a = lesson("Phonetics", "Group-A", "09:00:00.0000000");
        let mut b = lesson("Phonetics", "Group-B", "09:00:00.0000000");
        a.record.teacher = Some("Ivanova I. I.".to_string());
        b.record.teacher = Some("Somebody Else".to_string());

        let merged = merge_groups(vec![a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].group_list, vec!["Group-A", "Group-B"]);
    }

    #[test]
    fn output_order_follows_first_occurrence() {
        let merged = merge_groups(vec![
            lesson("Grammar", "Group-A", "09:00:00.0000000"),
            lesson("Phonetics", "Group-A", "11:50:00.0000000"),
            lesson("Grammar", "Group-B", "09:00:00.0000000"),
        ]);

        let names: Vec<&str> = merged
            .iter()
            .map(|m| m.record.discipline.as_deref().expect("discipline set"))
            .collect();
        assert_eq!(names, vec!["Grammar", "Phonetics"]);
    }
}
