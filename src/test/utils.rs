#[cfg(test)]
pub mod test_db {
    use crate::database::initialize_schema;
    use crate::db::{create_assignment, create_class, create_student, create_subject, create_teacher};
    use crate::error::AppError;
    use crate::models::{Gender, NewAssignment, NewClass, NewStudent, NewSubject, NewTeacher};
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::{Pool, Sqlite};
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::Once;

    static INIT: Once = Once::new();

    #[derive(Default)]
    pub struct TestDbBuilder {
        classes: Vec<NewClass>,
        students: Vec<NewStudent>,
        teachers: Vec<NewTeacher>,
        subjects: Vec<NewSubject>,
        assignments: Vec<TestAssignment>,
    }

    pub struct TestAssignment {
        pub teacher_name: String,
        pub class_number: i64,
        pub subject_name: String,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn class(mut self, class_name: &str, class_number: i64) -> Self {
            self.classes.push(NewClass {
                class_name: class_name.to_string(),
                class_number,
            });
            self
        }

        pub fn student(
            mut self,
            roll_number: &str,
            name: &str,
            class_number: i64,
            age: Option<i64>,
            gender: Option<Gender>,
        ) -> Self {
            self.students.push(NewStudent {
                roll_number: roll_number.to_string(),
                name: name.to_string(),
                fname: "Parent Name".to_string(),
                age,
                class_number,
                gender,
                address: None,
                phone: None,
            });
            self
        }

        pub fn teacher(mut self, name: &str, email: Option<&str>, gender: Option<Gender>) -> Self {
            self.teachers.push(NewTeacher {
                name: name.to_string(),
                email: email.map(String::from),
                phone: None,
                qualification: None,
                age: None,
                gender,
                hire_date: None,
            });
            self
        }

        pub fn teacher_with(mut self, teacher: NewTeacher) -> Self {
            self.teachers.push(teacher);
            self
        }

        pub fn subject(mut self, subject_name: &str, class_number: i64, max_marks: i64) -> Self {
            self.subjects.push(NewSubject {
                subject_name: subject_name.to_string(),
                class_number,
                max_marks,
            });
            self
        }

        /// Subjects are looked up by name within the given class.
        pub fn assignment(mut self, teacher_name: &str, class_number: i64, subject_name: &str) -> Self {
            self.assignments.push(TestAssignment {
                teacher_name: teacher_name.to_string(),
                class_number,
                subject_name: subject_name.to_string(),
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = env_logger::builder()
                    .parse_filters("debug")
                    .is_test(true)
                    .try_init();
            });

            let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?;

            initialize_schema(&pool).await?;

            let mut class_id_map: HashMap<i64, i64> = HashMap::new();
            let mut student_id_map: HashMap<String, i64> = HashMap::new();
            let mut teacher_id_map: HashMap<String, i64> = HashMap::new();
            let mut subject_id_map: HashMap<(String, i64), i64> = HashMap::new();

            for class in &self.classes {
                let created = create_class(&pool, class).await?;
                class_id_map.insert(class.class_number, created.class_id);
            }

            for student in &self.students {
                let created = create_student(&pool, student).await?;
                student_id_map.insert(student.roll_number.clone(), created.student_id);
            }

            for teacher in &self.teachers {
                let created = create_teacher(&pool, teacher).await?;
                teacher_id_map.insert(teacher.name.clone(), created.teacher_id);
            }

            for subject in &self.subjects {
                let created = create_subject(&pool, subject).await?;
                subject_id_map.insert(
                    (subject.subject_name.clone(), subject.class_number),
                    created.subject_id,
                );
            }

            for assignment in &self.assignments {
                let teacher_id = teacher_id_map.get(&assignment.teacher_name).copied();
                let subject_id = subject_id_map
                    .get(&(assignment.subject_name.clone(), assignment.class_number))
                    .copied();

                if let (Some(teacher_id), Some(subject_id)) = (teacher_id, subject_id) {
                    create_assignment(
                        &pool,
                        &NewAssignment {
                            teacher_id,
                            class_number: assignment.class_number,
                            subject_id,
                        },
                    )
                    .await?;
                }
            }

            Ok(TestDb {
                pool,
                class_id_map,
                student_id_map,
                teacher_id_map,
                subject_id_map,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub class_id_map: HashMap<i64, i64>,
        pub student_id_map: HashMap<String, i64>,
        pub teacher_id_map: HashMap<String, i64>,
        pub subject_id_map: HashMap<(String, i64), i64>,
    }

    impl TestDb {
        pub fn class_id(&self, class_number: i64) -> Option<i64> {
            self.class_id_map.get(&class_number).copied()
        }

        pub fn student_id(&self, roll_number: &str) -> Option<i64> {
            self.student_id_map.get(roll_number).copied()
        }

        pub fn teacher_id(&self, name: &str) -> Option<i64> {
            self.teacher_id_map.get(name).copied()
        }

        pub fn subject_id(&self, subject_name: &str, class_number: i64) -> Option<i64> {
            self.subject_id_map
                .get(&(subject_name.to_string(), class_number))
                .copied()
        }

        pub async fn count(&self, table: &str) -> Result<i64, sqlx::Error> {
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
                .fetch_one(&self.pool)
                .await
        }

        pub async fn add_exam_record(
            &self,
            student_id: i64,
            subject_id: i64,
            marks_obtained: i64,
        ) -> Result<i64, sqlx::Error> {
            let result = sqlx::query(
                "INSERT INTO exam_records (student_id, subject_id, marks_obtained, exam_date)
                 VALUES (?, ?, ?, '2024-03-01')",
            )
            .bind(student_id)
            .bind(subject_id)
            .bind(marks_obtained)
            .execute(&self.pool)
            .await?;

            Ok(result.last_insert_rowid())
        }
    }
}

#[cfg(test)]
pub mod test_utils {
    pub use super::test_db::{TestDb, TestDbBuilder};
    use crate::config::AppConfig;
    use crate::init_rocket;
    use crate::models::Gender;
    use rocket::local::asynchronous::Client;

    /// Two classes with a handful of students, teachers, subjects and assignments.
    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .class("Grade One", 1)
            .class("Grade Two", 2)
            .student("R001", "Alice Smith", 1, Some(7), Some(Gender::Female))
            .student("R002", "Bob Jones", 1, Some(8), Some(Gender::Male))
            .student("R003", "Carol White", 2, Some(9), Some(Gender::Female))
            .student("R004", "Dan Brown", 2, None, None)
            .teacher("Mary Major", Some("mary@school.test"), Some(Gender::Female))
            .teacher("Tom Minor", Some("tom@school.test"), Some(Gender::Male))
            .subject("Math", 1, 100)
            .subject("English", 1, 50)
            .subject("Math", 2, 100)
            .assignment("Mary Major", 1, "Math")
            .assignment("Tom Minor", 2, "Math")
            .build()
            .await
            .expect("Failed to build standard test database")
    }

    pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
        let config = AppConfig::default();
        let rocket = init_rocket(test_db.pool.clone(), &config).await;
        let client = Client::tracked(rocket)
            .await
            .expect("Failed to build rocket client");

        (client, test_db)
    }
}
