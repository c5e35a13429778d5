//! Column names and clipping bounds for the student habits dataset.

/// Identifier column, upper-cased during cleaning.
pub const STUDENT_ID: &str = "student_id";

pub const AGE: &str = "age";
pub const GENDER: &str = "gender";
pub const STUDY_HOURS: &str = "study_hours_per_day";
pub const SOCIAL_MEDIA_HOURS: &str = "social_media_hours";
pub const SLEEP_HOURS: &str = "sleep_hours";
pub const PART_TIME_JOB: &str = "part_time_job";
pub const ATTENDANCE: &str = "attendance_percentage";
pub const DIET_QUALITY: &str = "diet_quality";
pub const EXERCISE_FREQUENCY: &str = "exercise_frequency";
pub const MENTAL_HEALTH_RATING: &str = "mental_health_rating";
pub const EXTRACURRICULAR: &str = "extracurricular_participation";
pub const EXAM_SCORE: &str = "exam_score";

/// The two categories gender imputation resolves to.
pub const GENDER_CATEGORIES: [&str; 2] = ["Male", "Female"];

/// Placeholder for missing categorical values.
pub const UNKNOWN: &str = "Unknown";

/// Inclusive clipping bounds for a numeric column, by name.
///
/// Hours columns are matched by substring: the dataset mixes `sleep_hours`
/// and `study_hours_per_day`, so a plain suffix rule would miss the latter.
pub fn clip_bounds(column: &str) -> Option<(f64, f64)> {
    if column == AGE {
        Some((0.0, f64::INFINITY))
    } else if column.contains("hours") {
        Some((0.0, f64::INFINITY))
    } else if column.ends_with("_percentage") || column == EXAM_SCORE {
        Some((0.0, 100.0))
    } else if column == MENTAL_HEALTH_RATING {
        Some((1.0, 10.0))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_rule_covers_per_day_columns() {
        assert_eq!(clip_bounds("study_hours_per_day"), Some((0.0, f64::INFINITY)));
        assert_eq!(clip_bounds("sleep_hours"), Some((0.0, f64::INFINITY)));
    }

    #[test]
    fn percentage_columns_are_bounded() {
        assert_eq!(clip_bounds("attendance_percentage"), Some((0.0, 100.0)));
        assert_eq!(clip_bounds("exam_score"), Some((0.0, 100.0)));
    }

    #[test]
    fn unbounded_columns_have_no_rule() {
        assert_eq!(clip_bounds("exercise_frequency"), None);
        assert_eq!(clip_bounds("gender"), None);
    }
}
