use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{macros::datetime, OffsetDateTime};

use super::users::non_empty;
use crate::store::{
    explicit, is_present, lenient_float, lenient_int, merge_text, null_as_nan, Record,
    StoreError,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: u64,
    pub name: String,
    pub email: String,
    /// `None` when the submitted age could not be read as an integer.
    pub age: Option<i64>,
    pub course: String,
    /// Expected 0..=100, not enforced. NaN goes out as `null`.
    #[serde(deserialize_with = "null_as_nan")]
    pub grade: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudentDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "explicit")]
    pub age: Option<Value>,
    pub course: Option<String>,
    #[serde(default, deserialize_with = "explicit")]
    pub grade: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "explicit")]
    pub age: Option<Value>,
    pub course: Option<String>,
    #[serde(default, deserialize_with = "explicit")]
    pub grade: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentFilter {
    pub course: Option<String>,
    pub min_grade: Option<String>,
    pub search: Option<String>,
}

impl Record for Student {
    const KIND: &'static str = "Student";
    type Draft = StudentDraft;
    type Patch = StudentPatch;
    type Filter = StudentFilter;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(
        id: u64,
        draft: StudentDraft,
        created_at: OffsetDateTime,
    ) -> Result<Self, StoreError> {
        // A grade of 0 is a real grade, so only its absence counts.
        let age = draft.age.filter(|a| is_present(Some(a)));
        let (Some(name), Some(email), Some(age), Some(course), Some(grade)) = (
            non_empty(draft.name),
            non_empty(draft.email),
            age,
            non_empty(draft.course),
            draft.grade,
        ) else {
            return Err(StoreError::Validation("All fields are required"));
        };
        Ok(Self {
            id,
            name,
            email,
            age: lenient_int(&age),
            course,
            grade: lenient_float(&grade),
            created_at,
        })
    }

    fn apply(&mut self, patch: StudentPatch) {
        merge_text(&mut self.name, patch.name);
        merge_text(&mut self.email, patch.email);
        merge_text(&mut self.course, patch.course);
        if let Some(age) = patch.age {
            self.age = lenient_int(&age);
        }
        if let Some(grade) = patch.grade {
            self.grade = lenient_float(&grade);
        }
    }

    fn matches(&self, filter: &StudentFilter) -> bool {
        if let Some(course) = filter.course.as_deref().filter(|c| !c.is_empty()) {
            if self.course.to_lowercase() != course.to_lowercase() {
                return false;
            }
        }
        if let Some(min) = filter.min_grade.as_deref().filter(|m| !m.is_empty()) {
            // NaN on either side compares false, so nothing matches.
            if !(self.grade >= lenient_float(&Value::String(min.to_string()))) {
                return false;
            }
        }
        if let Some(term) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let term = term.to_lowercase();
            return self.name.to_lowercase().contains(&term)
                || self.email.to_lowercase().contains(&term);
        }
        true
    }
}

pub fn seed() -> Vec<Student> {
    [
        (
            "Ana García",
            "ana.garcia@university.edu",
            20,
            "Computer Science",
            85.0,
            datetime!(2023-01-15 0:00 UTC),
        ),
        (
            "Carlos López",
            "carlos.lopez@university.edu",
            22,
            "Engineering",
            92.0,
            datetime!(2023-02-20 0:00 UTC),
        ),
        (
            "María Rodríguez",
            "maria.rodriguez@university.edu",
            19,
            "Mathematics",
            78.0,
            datetime!(2023-03-10 0:00 UTC),
        ),
        (
            "José Martínez",
            "jose.martinez@university.edu",
            21,
            "Physics",
            88.0,
            datetime!(2023-04-05 0:00 UTC),
        ),
        (
            "Laura Sánchez",
            "laura.sanchez@university.edu",
            23,
            "Chemistry",
            95.0,
            datetime!(2023-05-12 0:00 UTC),
        ),
    ]
    .into_iter()
    .zip(1..)
    .map(|((name, email, age, course, grade, created_at), id)| Student {
        id,
        name: name.into(),
        email: email.into(),
        age: Some(age),
        course: course.into(),
        grade,
        created_at,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(filter: &StudentFilter) -> Vec<u64> {
        seed().into_iter().filter(|s| s.matches(filter)).map(|s| s.id).collect()
    }

    #[test]
    fn min_grade_is_inclusive() {
        let filter = StudentFilter {
            min_grade: Some("88".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter), vec![2, 4, 5]);
    }

    #[test]
    fn unparseable_min_grade_matches_nothing() {
        let filter = StudentFilter {
            min_grade: Some("high".into()),
            ..Default::default()
        };
        assert!(ids(&filter).is_empty());
    }

    #[test]
    fn course_and_search_combine() {
        let filter = StudentFilter {
            course: Some("physics".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter), vec![4]);

        let filter = StudentFilter {
            search: Some("LOPEZ@".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter), vec![2]);

        let filter = StudentFilter {
            course: Some("chemistry".into()),
            search: Some("ana".into()),
            ..Default::default()
        };
        assert!(ids(&filter).is_empty());
    }

    #[test]
    fn zero_grade_is_accepted_but_zero_age_is_not() {
        let draft: StudentDraft = serde_json::from_value(json!({
            "name": "X", "email": "x@x.com", "age": 20, "course": "Math", "grade": 0
        }))
        .unwrap();
        let student = Student::from_draft(6, draft, OffsetDateTime::now_utc()).unwrap();
        assert_eq!(student.grade, 0.0);
        assert_eq!(student.age, Some(20));

        let draft: StudentDraft = serde_json::from_value(json!({
            "name": "X", "email": "x@x.com", "age": 0, "course": "Math", "grade": 90
        }))
        .unwrap();
        let err = Student::from_draft(6, draft, OffsetDateTime::now_utc()).unwrap_err();
        assert_eq!(err, StoreError::Validation("All fields are required"));
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let draft: StudentDraft = serde_json::from_value(json!({
            "name": "X", "email": "x@x.com", "age": "21", "course": "Math", "grade": "77.5"
        }))
        .unwrap();
        let student = Student::from_draft(6, draft, OffsetDateTime::now_utc()).unwrap();
        assert_eq!(student.age, Some(21));
        assert_eq!(student.grade, 77.5);
    }

    #[test]
    fn patch_keeps_fields_it_does_not_mention() {
        let mut student = seed().remove(0);
        student.apply(StudentPatch {
            grade: Some(json!(99)),
            name: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(student.grade, 99.0);
        assert_eq!(student.name, "Ana García");
        assert_eq!(student.course, "Computer Science");
        assert_eq!(student.age, Some(20));
    }

    #[test]
    fn null_grade_counts_as_given() {
        let draft: StudentDraft = serde_json::from_value(json!({
            "name": "X", "email": "x@x.com", "age": 20, "course": "Math", "grade": null
        }))
        .unwrap();
        let student = Student::from_draft(6, draft, OffsetDateTime::now_utc()).unwrap();
        assert!(student.grade.is_nan());

        let patch: StudentPatch = serde_json::from_value(json!({ "age": null })).unwrap();
        let mut student = seed().remove(0);
        student.apply(patch);
        assert_eq!(student.age, None);
        assert_eq!(student.grade, 85.0);
    }

    #[test]
    fn nan_grade_survives_the_wire() {
        let mut student = seed().remove(1);
        student.grade = f64::NAN;
        let wire = serde_json::to_string(&student).unwrap();
        let back: Student = serde_json::from_str(&wire).unwrap();
        assert!(back.grade.is_nan());
        assert_eq!(back.name, "Carlos López");
    }
}
