use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            "Other" => Some(Gender::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Class {
    pub class_id: i64,
    pub class_name: String,
    pub class_number: i64,
    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_count: Option<i64>,
    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_count: Option<i64>,
    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub student_id: i64,
    pub roll_number: String,
    pub name: String,
    pub fname: String,
    pub age: Option<i64>,
    pub class_number: i64,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    #[serde(default)]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Teacher {
    pub teacher_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub qualification: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub hire_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subject {
    pub subject_id: i64,
    pub subject_name: String,
    pub class_number: i64,
    pub max_marks: i64,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    #[serde(default)]
    pub class_name: Option<String>,
    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_count: Option<i64>,
}

/// A teacher teaching one subject to one class, with the names of all three joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Assignment {
    pub assignment_id: i64,
    pub teacher_id: i64,
    pub class_number: i64,
    pub subject_id: i64,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    #[serde(default)]
    pub teacher_name: Option<String>,
    #[sqlx(default)]
    #[serde(default)]
    pub subject_name: Option<String>,
    #[sqlx(default)]
    #[serde(default)]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GenderCount {
    pub gender: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClassStudentCount {
    pub class_name: String,
    pub class_number: i64,
    pub student_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AgeStats {
    pub average_age: Option<f64>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentStats {
    pub total: i64,
    pub gender: Vec<GenderCount>,
    pub classes: Vec<ClassStudentCount>,
    pub age: AgeStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClassSubjectCount {
    pub class_name: String,
    pub class_number: i64,
    pub subject_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MarksStats {
    pub average_marks: Option<f64>,
    pub min_marks: Option<i64>,
    pub max_marks: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectStats {
    pub total: i64,
    pub classes: Vec<ClassSubjectCount>,
    pub marks: MarksStats,
}

// Validated records, ready to be written.

#[derive(Debug, Clone, PartialEq)]
pub struct NewClass {
    pub class_name: String,
    pub class_number: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub roll_number: String,
    pub name: String,
    pub fname: String,
    pub age: Option<i64>,
    pub class_number: i64,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTeacher {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub qualification: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<Gender>,
    pub hire_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSubject {
    pub subject_name: String,
    pub class_number: i64,
    pub max_marks: i64,
}

/// Subjects keep their class once created.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectChanges {
    pub subject_name: String,
    pub max_marks: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewAssignment {
    pub teacher_id: i64,
    pub class_number: i64,
    pub subject_id: i64,
}
