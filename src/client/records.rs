use std::str::FromStr;

use crate::forms::{AssignmentForm, ClassForm, StudentForm, SubjectForm, SubjectUpdate, TeacherForm};
use crate::models::{Assignment, Class, Gender, Student, Subject, Teacher};

use super::view::{Record, SortSpec, SortValue};

fn contains_text(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

fn unknown_key(value: &str) -> String {
    format!("unknown sort key `{}`", value)
}

// Classes

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassFilter {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassSortKey {
    Number,
    Name,
    Students,
}

impl FromStr for ClassSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "number" | "class_number" => Ok(ClassSortKey::Number),
            "name" | "class_name" => Ok(ClassSortKey::Name),
            "students" | "student_count" => Ok(ClassSortKey::Students),
            other => Err(unknown_key(other)),
        }
    }
}

impl Record for Class {
    type Filter = ClassFilter;
    type SortKey = ClassSortKey;
    type Form = ClassForm;
    type UpdateForm = ClassForm;

    const PATH: &'static str = "/classes";
    const COLLECTION: &'static str = "classes";

    fn id(&self) -> i64 {
        self.class_id
    }

    fn matches(&self, filter: &ClassFilter) -> bool {
        filter.text.trim().is_empty()
            || contains_text(&self.class_name, &filter.text)
            || self.class_number.to_string().contains(filter.text.trim())
    }

    fn sort_value(&self, key: ClassSortKey) -> SortValue {
        match key {
            ClassSortKey::Number => SortValue::number(Some(self.class_number)),
            ClassSortKey::Name => SortValue::text(&self.class_name),
            ClassSortKey::Students => SortValue::number(self.student_count),
        }
    }

    fn default_sort() -> SortSpec<ClassSortKey> {
        SortSpec::ascending(ClassSortKey::Number)
    }

    fn search_filter(text: &str) -> ClassFilter {
        ClassFilter {
            text: text.to_string(),
        }
    }

    fn row(&self) -> String {
        format!(
            "#{:<4} class {:<4} {:<24} students: {:<4} teachers: {:<4} subjects: {}",
            self.class_id,
            self.class_number,
            self.class_name,
            self.student_count.unwrap_or_default(),
            self.teacher_count.unwrap_or_default(),
            self.subject_count.unwrap_or_default(),
        )
    }
}

// Students

/// Age bands offered by the student filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBand {
    FiveToNine,
    TenToTwelve,
    ThirteenToFifteen,
    SixteenToEighteen,
    NineteenPlus,
}

impl AgeBand {
    pub fn contains(&self, age: i64) -> bool {
        match self {
            AgeBand::FiveToNine => (5..=9).contains(&age),
            AgeBand::TenToTwelve => (10..=12).contains(&age),
            AgeBand::ThirteenToFifteen => (13..=15).contains(&age),
            AgeBand::SixteenToEighteen => (16..=18).contains(&age),
            AgeBand::NineteenPlus => age >= 19,
        }
    }
}

impl FromStr for AgeBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "5-9" => Ok(AgeBand::FiveToNine),
            "10-12" => Ok(AgeBand::TenToTwelve),
            "13-15" => Ok(AgeBand::ThirteenToFifteen),
            "16-18" => Ok(AgeBand::SixteenToEighteen),
            "19+" => Ok(AgeBand::NineteenPlus),
            other => Err(format!("unknown age band `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentFilter {
    pub class_number: Option<i64>,
    pub gender: Option<Gender>,
    /// Students without a recorded age are never excluded by the band.
    pub age_band: Option<AgeBand>,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentSortKey {
    Name,
    RollNumber,
    Class,
    Age,
}

impl FromStr for StudentSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(StudentSortKey::Name),
            "roll" | "roll_number" => Ok(StudentSortKey::RollNumber),
            "class" | "class_number" => Ok(StudentSortKey::Class),
            "age" => Ok(StudentSortKey::Age),
            other => Err(unknown_key(other)),
        }
    }
}

impl Record for Student {
    type Filter = StudentFilter;
    type SortKey = StudentSortKey;
    type Form = StudentForm;
    type UpdateForm = StudentForm;

    const PATH: &'static str = "/students";
    const COLLECTION: &'static str = "students";

    fn id(&self) -> i64 {
        self.student_id
    }

    fn matches(&self, filter: &StudentFilter) -> bool {
        if filter
            .class_number
            .is_some_and(|class_number| class_number != self.class_number)
        {
            return false;
        }

        if let Some(gender) = filter.gender {
            if self.gender.as_deref() != Some(gender.as_str()) {
                return false;
            }
        }

        if let (Some(band), Some(age)) = (filter.age_band, self.age) {
            if !band.contains(age) {
                return false;
            }
        }

        filter.text.trim().is_empty()
            || contains_text(&self.name, &filter.text)
            || contains_text(&self.roll_number, &filter.text)
            || contains_text(&self.fname, &filter.text)
    }

    fn sort_value(&self, key: StudentSortKey) -> SortValue {
        match key {
            StudentSortKey::Name => SortValue::text(&self.name),
            StudentSortKey::RollNumber => SortValue::text(&self.roll_number),
            StudentSortKey::Class => SortValue::number(Some(self.class_number)),
            StudentSortKey::Age => SortValue::number(self.age),
        }
    }

    fn default_sort() -> SortSpec<StudentSortKey> {
        SortSpec::ascending(StudentSortKey::Name)
    }

    fn search_filter(text: &str) -> StudentFilter {
        StudentFilter {
            text: text.to_string(),
            ..StudentFilter::default()
        }
    }

    fn row(&self) -> String {
        format!(
            "#{:<4} {:<10} {:<24} {:<24} age: {:<4} class: {:<12} {}",
            self.student_id,
            self.roll_number,
            self.name,
            self.fname,
            self.age.map(|age| age.to_string()).unwrap_or_else(|| "N/A".into()),
            self.class_name.as_deref().unwrap_or_default(),
            self.gender.as_deref().unwrap_or("-"),
        )
    }
}

/// Headline numbers shown above the student table.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentSummary {
    pub total: usize,
    pub male: usize,
    pub female: usize,
    /// Students without an age count as zero.
    pub average_age: f64,
}

impl StudentSummary {
    pub fn of<'a>(students: impl IntoIterator<Item = &'a Student>) -> Self {
        let mut summary = StudentSummary {
            total: 0,
            male: 0,
            female: 0,
            average_age: 0.0,
        };
        let mut age_sum = 0;

        for student in students {
            summary.total += 1;
            match student.gender.as_deref().and_then(Gender::parse) {
                Some(Gender::Male) => summary.male += 1,
                Some(Gender::Female) => summary.female += 1,
                _ => {}
            }
            age_sum += student.age.unwrap_or_default();
        }

        if summary.total > 0 {
            summary.average_age = age_sum as f64 / summary.total as f64;
        }
        summary
    }
}

// Teachers

/// Inclusive age range written as `30-40` or `51+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRange {
    pub min: i64,
    pub max: Option<i64>,
}

impl AgeRange {
    pub fn contains(&self, age: i64) -> bool {
        age >= self.min && self.max.is_none_or(|max| age <= max)
    }
}

impl FromStr for AgeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || format!("invalid age range `{}`", s);

        if let Some(min) = s.strip_suffix('+') {
            let min = min.trim().parse().map_err(|_| invalid())?;
            return Ok(AgeRange { min, max: None });
        }

        let (min, max) = s.split_once('-').ok_or_else(invalid)?;
        let min: i64 = min.trim().parse().map_err(|_| invalid())?;
        let max: i64 = max.trim().parse().map_err(|_| invalid())?;
        if max < min {
            return Err(invalid());
        }
        Ok(AgeRange {
            min,
            max: Some(max),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeacherFilter {
    /// Matched against the name only.
    pub text: String,
    pub qualification: Option<String>,
    pub gender: Option<Gender>,
    /// Teachers without a recorded age never match a range.
    pub age_range: Option<AgeRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeacherSortKey {
    Name,
    Email,
    Qualification,
    Age,
    HireDate,
}

impl FromStr for TeacherSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(TeacherSortKey::Name),
            "email" => Ok(TeacherSortKey::Email),
            "qualification" => Ok(TeacherSortKey::Qualification),
            "age" => Ok(TeacherSortKey::Age),
            "hire_date" | "hired" => Ok(TeacherSortKey::HireDate),
            other => Err(unknown_key(other)),
        }
    }
}

impl Record for Teacher {
    type Filter = TeacherFilter;
    type SortKey = TeacherSortKey;
    type Form = TeacherForm;
    type UpdateForm = TeacherForm;

    const PATH: &'static str = "/teachers";
    const COLLECTION: &'static str = "teachers";

    fn id(&self) -> i64 {
        self.teacher_id
    }

    fn matches(&self, filter: &TeacherFilter) -> bool {
        if !filter.text.trim().is_empty() && !contains_text(&self.name, &filter.text) {
            return false;
        }

        if let Some(qualification) = &filter.qualification {
            if self.qualification.as_deref() != Some(qualification.as_str()) {
                return false;
            }
        }

        if let Some(gender) = filter.gender {
            if self.gender.as_deref() != Some(gender.as_str()) {
                return false;
            }
        }

        match (filter.age_range, self.age) {
            (Some(range), Some(age)) => range.contains(age),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    fn sort_value(&self, key: TeacherSortKey) -> SortValue {
        match key {
            TeacherSortKey::Name => SortValue::text(&self.name),
            TeacherSortKey::Email => SortValue::optional_text(self.email.as_deref()),
            TeacherSortKey::Qualification => {
                SortValue::optional_text(self.qualification.as_deref())
            }
            TeacherSortKey::Age => SortValue::number(self.age),
            TeacherSortKey::HireDate => SortValue::date(self.hire_date),
        }
    }

    fn default_sort() -> SortSpec<TeacherSortKey> {
        SortSpec::ascending(TeacherSortKey::Name)
    }

    fn search_filter(text: &str) -> TeacherFilter {
        TeacherFilter {
            text: text.to_string(),
            ..TeacherFilter::default()
        }
    }

    fn row(&self) -> String {
        format!(
            "#{:<4} {:<24} {:<28} {:<16} age: {:<4} hired: {}",
            self.teacher_id,
            self.name,
            self.email.as_deref().unwrap_or("-"),
            self.qualification.as_deref().unwrap_or("-"),
            self.age.map(|age| age.to_string()).unwrap_or_else(|| "-".into()),
            self.hire_date
                .map(|date| date.to_string())
                .unwrap_or_else(|| "-".into()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherSummary {
    pub total: usize,
    pub male: usize,
    pub female: usize,
    /// Distinct teachers holding at least one assignment.
    pub assigned: usize,
}

impl TeacherSummary {
    pub fn of(teachers: &[Teacher], assignments: &[Assignment]) -> Self {
        let count_gender = |gender: Gender| {
            teachers
                .iter()
                .filter(|teacher| teacher.gender.as_deref() == Some(gender.as_str()))
                .count()
        };

        let mut assigned: Vec<i64> = assignments.iter().map(|a| a.teacher_id).collect();
        assigned.sort_unstable();
        assigned.dedup();

        TeacherSummary {
            total: teachers.len(),
            male: count_gender(Gender::Male),
            female: count_gender(Gender::Female),
            assigned: assigned.len(),
        }
    }
}

// Subjects

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectFilter {
    pub class_number: Option<i64>,
    /// Matched against the subject name and the class name.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectSortKey {
    Name,
    Class,
    MaxMarks,
}

impl FromStr for SubjectSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" | "subject_name" => Ok(SubjectSortKey::Name),
            "class" | "class_number" => Ok(SubjectSortKey::Class),
            "marks" | "max_marks" => Ok(SubjectSortKey::MaxMarks),
            other => Err(unknown_key(other)),
        }
    }
}

impl Record for Subject {
    type Filter = SubjectFilter;
    type SortKey = SubjectSortKey;
    type Form = SubjectForm;
    type UpdateForm = SubjectUpdate;

    const PATH: &'static str = "/subjects";
    const COLLECTION: &'static str = "subjects";

    fn id(&self) -> i64 {
        self.subject_id
    }

    fn matches(&self, filter: &SubjectFilter) -> bool {
        if filter
            .class_number
            .is_some_and(|class_number| class_number != self.class_number)
        {
            return false;
        }

        filter.text.trim().is_empty()
            || contains_text(&self.subject_name, &filter.text)
            || self
                .class_name
                .as_deref()
                .is_some_and(|name| contains_text(name, &filter.text))
    }

    fn sort_value(&self, key: SubjectSortKey) -> SortValue {
        match key {
            SubjectSortKey::Name => SortValue::text(&self.subject_name),
            SubjectSortKey::Class => SortValue::number(Some(self.class_number)),
            SubjectSortKey::MaxMarks => SortValue::number(Some(self.max_marks)),
        }
    }

    fn default_sort() -> SortSpec<SubjectSortKey> {
        SortSpec::ascending(SubjectSortKey::Class)
    }

    fn search_filter(text: &str) -> SubjectFilter {
        SubjectFilter {
            text: text.to_string(),
            ..SubjectFilter::default()
        }
    }

    fn row(&self) -> String {
        format!(
            "#{:<4} {:<24} class: {:<4} {:<16} max marks: {:<5} students: {}",
            self.subject_id,
            self.subject_name,
            self.class_number,
            self.class_name.as_deref().unwrap_or_default(),
            self.max_marks,
            self.student_count.unwrap_or_default(),
        )
    }
}

// Assignments

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentFilter {
    /// Matched against the teacher name.
    pub teacher_name: String,
    pub teacher_id: Option<i64>,
    pub class_number: Option<i64>,
    pub subject_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentSortKey {
    Created,
    Teacher,
    Class,
    Subject,
}

impl FromStr for AssignmentSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" | "created_at" => Ok(AssignmentSortKey::Created),
            "teacher" | "teacher_name" => Ok(AssignmentSortKey::Teacher),
            "class" | "class_number" => Ok(AssignmentSortKey::Class),
            "subject" | "subject_name" => Ok(AssignmentSortKey::Subject),
            other => Err(unknown_key(other)),
        }
    }
}

impl Record for Assignment {
    type Filter = AssignmentFilter;
    type SortKey = AssignmentSortKey;
    type Form = AssignmentForm;
    type UpdateForm = AssignmentForm;

    const PATH: &'static str = "/teacher-assignments";
    const COLLECTION: &'static str = "assignments";

    fn id(&self) -> i64 {
        self.assignment_id
    }

    fn matches(&self, filter: &AssignmentFilter) -> bool {
        if !filter.teacher_name.trim().is_empty()
            && !self
                .teacher_name
                .as_deref()
                .is_some_and(|name| contains_text(name, &filter.teacher_name))
        {
            return false;
        }

        filter.teacher_id.is_none_or(|id| id == self.teacher_id)
            && filter
                .class_number
                .is_none_or(|class_number| class_number == self.class_number)
            && filter.subject_id.is_none_or(|id| id == self.subject_id)
    }

    fn sort_value(&self, key: AssignmentSortKey) -> SortValue {
        match key {
            AssignmentSortKey::Created => SortValue::timestamp(self.created_at),
            AssignmentSortKey::Teacher => SortValue::optional_text(self.teacher_name.as_deref()),
            AssignmentSortKey::Class => SortValue::number(Some(self.class_number)),
            AssignmentSortKey::Subject => SortValue::optional_text(self.subject_name.as_deref()),
        }
    }

    /// Newest first, as the API returns them.
    fn default_sort() -> SortSpec<AssignmentSortKey> {
        SortSpec::descending(AssignmentSortKey::Created)
    }

    fn search_filter(text: &str) -> AssignmentFilter {
        AssignmentFilter {
            teacher_name: text.to_string(),
            ..AssignmentFilter::default()
        }
    }

    fn row(&self) -> String {
        format!(
            "#{:<4} {:<24} teaches {:<20} to {:<16} (class {})",
            self.assignment_id,
            self.teacher_name.as_deref().unwrap_or("-"),
            self.subject_name.as_deref().unwrap_or("-"),
            self.class_name.as_deref().unwrap_or("-"),
            self.class_number,
        )
    }
}
