//! Request payloads accepted by the API and built by the client controllers.
//!
//! Every form is checked with the shared rules in [`crate::validation`] and turned into
//! the matching record from [`crate::models`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{
    Gender, NewAssignment, NewClass, NewStudent, NewSubject, NewTeacher, SubjectChanges,
};
use crate::validation::{self, Checked, Numeric, Report};

pub const DEFAULT_MAX_MARKS: i64 = 100;

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn optional_integer(value: &Option<Numeric>) -> Option<i64> {
    value.as_ref().and_then(Numeric::as_integer)
}

fn required_integer(value: &Option<Numeric>, field: &str) -> Result<i64, AppError> {
    optional_integer(value)
        .ok_or_else(|| AppError::Internal(format!("{} passed validation without a value", field)))
}

fn gender(value: &Option<String>) -> Option<Gender> {
    value.as_deref().and_then(Gender::parse)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassForm {
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub class_number: Option<Numeric>,
}

impl Checked for ClassForm {
    fn report(&self) -> Report {
        Report::new()
            .check("className", validation::class_name(text(&self.class_name)))
            .check(
                "classNumber",
                validation::positive_integer(self.class_number.as_ref(), "Class number"),
            )
    }
}

impl ClassForm {
    pub fn validate(&self) -> Result<NewClass, AppError> {
        self.check()?;
        Ok(NewClass {
            class_name: text(&self.class_name).trim().to_string(),
            class_number: required_integer(&self.class_number, "classNumber")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentForm {
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fname: Option<String>,
    #[serde(default)]
    pub age: Option<Numeric>,
    #[serde(default)]
    pub class_number: Option<Numeric>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Checked for StudentForm {
    fn report(&self) -> Report {
        Report::new()
            .check("rollNumber", validation::roll_number(text(&self.roll_number)))
            .check("name", validation::person_name(text(&self.name), "Name"))
            .check("fname", validation::person_name(text(&self.fname), "Father name"))
            .check("age", validation::student_age(self.age.as_ref()))
            .check(
                "classNumber",
                validation::positive_integer(self.class_number.as_ref(), "Class"),
            )
            .check("gender", validation::gender(self.gender.as_deref()))
            .check("address", validation::address(self.address.as_deref()))
            .check("phone", validation::phone(self.phone.as_deref()))
    }
}

impl StudentForm {
    pub fn validate(&self) -> Result<NewStudent, AppError> {
        self.check()?;
        Ok(NewStudent {
            roll_number: text(&self.roll_number).trim().to_string(),
            name: text(&self.name).trim().to_string(),
            fname: text(&self.fname).trim().to_string(),
            age: optional_integer(&self.age),
            class_number: required_integer(&self.class_number, "classNumber")?,
            gender: gender(&self.gender),
            address: optional_text(&self.address),
            phone: optional_text(&self.phone),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeacherForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub age: Option<Numeric>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub hire_date: Option<String>,
}

impl Checked for TeacherForm {
    fn report(&self) -> Report {
        Report::new()
            .check("name", validation::required_text(text(&self.name), "Teacher name"))
            .check("phone", validation::phone(self.phone.as_deref()))
            .check("age", validation::teacher_age(self.age.as_ref()))
            .check("gender", validation::gender(self.gender.as_deref()))
            .check("hire_date", validation::hire_date(self.hire_date.as_deref()))
    }
}

impl TeacherForm {
    pub fn validate(&self) -> Result<NewTeacher, AppError> {
        self.check()?;
        Ok(NewTeacher {
            name: text(&self.name).trim().to_string(),
            email: optional_text(&self.email),
            phone: optional_text(&self.phone),
            qualification: optional_text(&self.qualification),
            age: optional_integer(&self.age),
            gender: gender(&self.gender),
            hire_date: optional_text(&self.hire_date)
                .and_then(|date| NaiveDate::parse_from_str(&date, "%Y-%m-%d").ok()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectForm {
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub class_number: Option<Numeric>,
    #[serde(default)]
    pub max_marks: Option<Numeric>,
}

impl Checked for SubjectForm {
    fn report(&self) -> Report {
        Report::new()
            .check("subjectName", validation::subject_name(text(&self.subject_name)))
            .check(
                "classNumber",
                validation::positive_integer(self.class_number.as_ref(), "Class number"),
            )
            .check("maxMarks", validation::max_marks(self.max_marks.as_ref()))
    }
}

impl SubjectForm {
    pub fn validate(&self) -> Result<NewSubject, AppError> {
        self.check()?;
        Ok(NewSubject {
            subject_name: text(&self.subject_name).trim().to_string(),
            class_number: required_integer(&self.class_number, "classNumber")?,
            max_marks: optional_integer(&self.max_marks).unwrap_or(DEFAULT_MAX_MARKS),
        })
    }
}

/// Name and maximum marks of an existing subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectUpdate {
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub max_marks: Option<Numeric>,
}

impl Checked for SubjectUpdate {
    fn report(&self) -> Report {
        Report::new()
            .check("subjectName", validation::subject_name(text(&self.subject_name)))
            .check("maxMarks", validation::max_marks(self.max_marks.as_ref()))
    }
}

impl SubjectUpdate {
    pub fn validate(&self) -> Result<SubjectChanges, AppError> {
        self.check()?;
        Ok(SubjectChanges {
            subject_name: text(&self.subject_name).trim().to_string(),
            max_marks: optional_integer(&self.max_marks).unwrap_or(DEFAULT_MAX_MARKS),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentForm {
    #[serde(default)]
    pub teacher_id: Option<Numeric>,
    #[serde(default)]
    pub class_number: Option<Numeric>,
    #[serde(default)]
    pub subject_id: Option<Numeric>,
}

impl Checked for AssignmentForm {
    fn report(&self) -> Report {
        Report::new()
            .check(
                "teacher_id",
                validation::positive_integer(self.teacher_id.as_ref(), "Teacher"),
            )
            .check(
                "class_number",
                validation::positive_integer(self.class_number.as_ref(), "Class number"),
            )
            .check(
                "subject_id",
                validation::positive_integer(self.subject_id.as_ref(), "Subject"),
            )
    }
}

impl AssignmentForm {
    pub fn validate(&self) -> Result<NewAssignment, AppError> {
        self.check()?;
        Ok(NewAssignment {
            teacher_id: required_integer(&self.teacher_id, "teacher_id")?,
            class_number: required_integer(&self.class_number, "class_number")?,
            subject_id: required_integer(&self.subject_id, "subject_id")?,
        })
    }
}
