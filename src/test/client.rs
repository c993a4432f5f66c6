#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::client::{
        AgeBand, AgeRange, AssignmentFilter, ClientError, CollectionView, Controller, Reply,
        SortSpec, StudentFilter, StudentSortKey, StudentSummary, SubjectFilter, TeacherFilter,
        TeacherSortKey, TeacherSummary, Transport, decode, decode_field,
    };
    use crate::forms::{ClassForm, StudentForm, SubjectUpdate};
    use crate::models::{Assignment, Class, Gender, Student, Subject, Teacher};
    use crate::test::test_utils::{create_standard_test_db, setup_test_client};
    use crate::validation::Numeric;
    use chrono::NaiveDate;
    use reqwest::Method;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;
    use serde_json::Value;

    /// Sends controller requests straight into a local Rocket instance.
    struct LocalTransport {
        client: Client,
    }

    #[rocket::async_trait(?Send)]
    impl Transport for LocalTransport {
        async fn send(
            &self,
            method: Method,
            path: &str,
            body: Option<Value>,
        ) -> Result<Reply, ClientError> {
            let method = rocket::http::Method::from_str(method.as_str())
                .map_err(|_| ClientError::Validation(format!("unsupported method {}", method)))?;

            let mut request = self.client.req(method, format!("/api{}", path));
            if let Some(body) = body {
                request = request.header(ContentType::JSON).body(body.to_string());
            }

            let response = request.dispatch().await;
            let status = response.status().code;
            let body = response.into_string().await.unwrap_or_default();
            Ok(Reply { status, body })
        }
    }

    async fn local_transport() -> LocalTransport {
        let (client, _test_db) = setup_test_client(create_standard_test_db().await).await;
        LocalTransport { client }
    }

    fn student(id: i64, name: &str, class_number: i64, age: Option<i64>, gender: &str) -> Student {
        Student {
            student_id: id,
            roll_number: format!("R{:03}", id),
            name: name.to_string(),
            fname: "Some Parent".to_string(),
            age,
            class_number,
            gender: Some(gender.to_string()),
            address: None,
            phone: None,
            created_at: None,
            updated_at: None,
            class_name: None,
        }
    }

    fn teacher(id: i64, name: &str, age: Option<i64>, qualification: &str) -> Teacher {
        Teacher {
            teacher_id: id,
            name: name.to_string(),
            email: None,
            phone: None,
            qualification: Some(qualification.to_string()),
            age,
            gender: Some("Male".to_string()),
            hire_date: NaiveDate::from_ymd_opt(2020, 1, id as u32),
            created_at: None,
        }
    }

    fn assignment(id: i64, teacher_id: i64, class_number: i64, subject_id: i64) -> Assignment {
        Assignment {
            assignment_id: id,
            teacher_id,
            class_number,
            subject_id,
            created_at: None,
            teacher_name: None,
            subject_name: None,
            class_name: None,
        }
    }

    #[test]
    fn test_decode_turns_failures_into_errors() {
        let reply = Reply {
            status: 400,
            body: r#"{"success":false,"error":"Class already exists"}"#.to_string(),
        };
        match decode::<Value>(reply) {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Class already exists");
            }
            other => panic!("Expected API error, got {:?}", other),
        }

        let reply = Reply {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert_eq!(decode::<Value>(reply).unwrap_err().status(), Some(502));

        let reply = Reply {
            status: 200,
            body: r#"{"success":true,"classes":[]}"#.to_string(),
        };
        let classes: Vec<Class> = decode_field(reply, "classes").unwrap();
        assert!(classes.is_empty());
    }

    #[test]
    fn test_student_filters_combine() {
        let mut view = CollectionView::<Student>::new();
        view.replace(vec![
            student(1, "Ann", 1, Some(7), "Female"),
            student(2, "Ben", 1, Some(11), "Male"),
            student(3, "Cat", 2, Some(8), "Female"),
            student(4, "Dee", 1, None, "Female"),
        ]);

        view.set_filter(StudentFilter {
            class_number: Some(1),
            gender: Some(Gender::Female),
            age_band: Some(AgeBand::from_str("5-9").unwrap()),
            text: String::new(),
        });
        let names: Vec<&str> = view.filtered().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Dee"]);

        view.update_filter(|filter| filter.text = "DE".to_string());
        assert_eq!(view.filtered_len(), 1);

        view.clear_filter();
        assert_eq!(view.filtered_len(), 4);

        assert!(AgeBand::from_str("20-30").is_err());
        assert!(AgeBand::NineteenPlus.contains(40));
    }

    #[test]
    fn test_sorting_and_toggling() {
        let mut view = CollectionView::<Student>::new();
        view.replace(vec![
            student(1, "bob", 1, Some(9), "Male"),
            student(2, "Alice", 1, None, "Female"),
            student(3, "carl", 1, Some(6), "Male"),
        ]);

        let names: Vec<&str> = view.filtered().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "bob", "carl"]);

        view.sort_by(SortSpec::ascending(StudentSortKey::Age));
        let ids: Vec<i64> = view.filtered().map(|s| s.student_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        view.toggle_sort(StudentSortKey::Age);
        let ids: Vec<i64> = view.filtered().map(|s| s.student_id).collect();
        assert_eq!(ids, vec![1, 3, 2]);

        view.toggle_sort(StudentSortKey::Name);
        assert_eq!(view.sort(), SortSpec::ascending(StudentSortKey::Name));
    }

    #[test]
    fn test_pagination() {
        let mut view = CollectionView::<Student>::with_page_size(10);
        view.replace(
            (1..=23)
                .map(|id| student(id, &format!("Student {:02}", id), 1, Some(10), "Male"))
                .collect(),
        );

        assert_eq!(view.total_pages(), 3);
        let page = view.page();
        assert_eq!(page.items.len(), 10);
        assert!(!page.has_previous);
        assert!(page.has_next);

        view.go_to_page(3);
        let page = view.page();
        assert_eq!(page.items.len(), 3);
        assert!(!page.has_next);
        assert!(!view.next_page());

        view.go_to_page(99);
        assert_eq!(view.page_number(), 3);

        // Shrinking the collection pulls the page back in range.
        view.replace(vec![student(1, "Only One", 1, None, "Male")]);
        assert_eq!(view.page_number(), 1);

        view.set_filter(StudentFilter {
            text: "nobody".to_string(),
            ..StudentFilter::default()
        });
        let page = view.page();
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
        assert!(!page.has_previous);
        assert!(!page.has_next);
    }

    #[test]
    fn test_teacher_filters_and_summary() {
        let teachers = vec![
            teacher(1, "Anne Archer", Some(32), "MSc"),
            teacher(2, "Brian Boyd", None, "PhD"),
            teacher(3, "Cara Cole", Some(55), "PhD"),
        ];

        let mut view = CollectionView::<Teacher>::new();
        view.replace(teachers.clone());

        view.set_filter(TeacherFilter {
            age_range: Some(AgeRange::from_str("30-40").unwrap()),
            ..TeacherFilter::default()
        });
        let ids: Vec<i64> = view.filtered().map(|t| t.teacher_id).collect();
        assert_eq!(ids, vec![1]);

        view.set_filter(TeacherFilter {
            qualification: Some("PhD".to_string()),
            age_range: Some(AgeRange::from_str("51+").unwrap()),
            ..TeacherFilter::default()
        });
        let ids: Vec<i64> = view.filtered().map(|t| t.teacher_id).collect();
        assert_eq!(ids, vec![3]);

        // The text filter looks at names only.
        view.set_filter(TeacherFilter {
            text: "phd".to_string(),
            ..TeacherFilter::default()
        });
        assert_eq!(view.filtered_len(), 0);

        view.clear_filter();
        view.sort_by(SortSpec::descending(TeacherSortKey::HireDate));
        let ids: Vec<i64> = view.filtered().map(|t| t.teacher_id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        let summary = TeacherSummary::of(
            &teachers,
            &[assignment(1, 1, 1, 1), assignment(2, 1, 1, 2), assignment(3, 3, 2, 3)],
        );
        assert_eq!(summary.total, 3);
        assert_eq!(summary.male, 3);
        assert_eq!(summary.assigned, 2);

        assert!(AgeRange::from_str("40-30").is_err());
    }

    #[test]
    fn test_student_summary_counts_missing_age_as_zero() {
        let students = [
            student(1, "Ann", 1, Some(10), "Female"),
            student(2, "Ben", 1, None, "Male"),
        ];

        let summary = StudentSummary::of(students.iter());
        assert_eq!(summary.total, 2);
        assert_eq!(summary.male, 1);
        assert_eq!(summary.female, 1);
        assert_eq!(summary.average_age, 5.0);

        let empty = StudentSummary::of(std::iter::empty::<&Student>());
        assert_eq!(empty.average_age, 0.0);
    }

    #[rocket::async_test]
    async fn test_controller_loads_and_refetches_after_create() {
        let transport = local_transport().await;
        let mut controller = Controller::<Class, _>::new(&transport);

        assert_eq!(controller.load().await.unwrap(), 2);

        let message = controller
            .create(&ClassForm {
                class_name: Some("Grade Three".into()),
                class_number: Some(Numeric::Integer(3)),
            })
            .await
            .unwrap();
        assert_eq!(message.as_deref(), Some("Class added successfully"));
        assert_eq!(controller.view().items().len(), 3);

        let error = controller
            .create(&ClassForm {
                class_name: Some("Grade Three Again".into()),
                class_number: Some(Numeric::Integer(3)),
            })
            .await
            .unwrap_err();
        assert_eq!(error.status(), Some(400));
        assert_eq!(error.to_string(), "Class already exists");
    }

    #[rocket::async_test]
    async fn test_controller_rejects_invalid_form_before_sending() {
        let transport = local_transport().await;
        let mut controller = Controller::<Student, _>::new(&transport);
        controller.load().await.unwrap();

        let error = controller
            .create(&StudentForm {
                roll_number: Some("R900".into()),
                name: Some("Young One".into()),
                fname: Some("Parent One".into()),
                age: Some(Numeric::Integer(4)),
                class_number: Some(Numeric::Integer(1)),
                ..StudentForm::default()
            })
            .await
            .unwrap_err();

        match error {
            ClientError::Validation(message) => {
                assert_eq!(message, "Age must be between 5 and 25")
            }
            other => panic!("Expected local validation error, got {:?}", other),
        }
        assert_eq!(controller.view().items().len(), 4);

        let summary = controller.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.female, 2);
    }

    #[rocket::async_test]
    async fn test_controller_class_scoped_listing() {
        let transport = local_transport().await;
        let mut controller = Controller::<Subject, _>::new(&transport);

        assert_eq!(controller.load_from("/class/1").await.unwrap(), 2);

        let english_id = controller
            .view()
            .items()
            .iter()
            .find(|s| s.subject_name == "English")
            .map(|s| s.subject_id)
            .unwrap();

        controller
            .update(
                english_id,
                &SubjectUpdate {
                    subject_name: Some("Reading".into()),
                    max_marks: Some(Numeric::Text("60".into())),
                },
            )
            .await
            .unwrap();

        // The refetch keeps the narrower listing.
        assert_eq!(controller.view().items().len(), 2);
        controller.view_mut().set_filter(SubjectFilter {
            text: "read".into(),
            ..SubjectFilter::default()
        });
        let reading: Vec<i64> = controller.view().filtered().map(|s| s.max_marks).collect();
        assert_eq!(reading, vec![60]);

        controller.delete(english_id).await.unwrap();
        assert_eq!(controller.view().items().len(), 1);
    }

    #[rocket::async_test]
    async fn test_assign_subjects_skips_existing_pairs() {
        let transport = local_transport().await;

        let mut subjects = Controller::<Subject, _>::new(&transport);
        subjects.load_from("/class/1").await.unwrap();
        let subject_ids: Vec<i64> = subjects
            .view()
            .items()
            .iter()
            .map(|s| s.subject_id)
            .collect();

        let mut assignments = Controller::<Assignment, _>::new(&transport);
        assignments.load().await.unwrap();
        let mary_id = assignments
            .view()
            .items()
            .iter()
            .find(|a| a.teacher_name.as_deref() == Some("Mary Major"))
            .map(|a| a.teacher_id)
            .unwrap();

        let created = assignments
            .assign_subjects(mary_id, 1, &subject_ids)
            .await
            .unwrap();
        assert_eq!(created, 1);
        assert_eq!(assignments.view().items().len(), 3);

        let again = assignments.assign_subjects(mary_id, 1, &subject_ids).await;
        match again {
            Err(ClientError::Validation(message)) => assert_eq!(
                message,
                "Teacher is already assigned to all selected subjects for this class."
            ),
            other => panic!("Expected nothing left to assign, got {:?}", other),
        }

        let none = assignments.assign_subjects(mary_id, 1, &[]).await;
        assert!(matches!(none, Err(ClientError::Validation(_))));

        assignments.view_mut().set_filter(AssignmentFilter {
            teacher_name: "mary".into(),
            ..AssignmentFilter::default()
        });
        assert_eq!(assignments.view().filtered_len(), 2);
    }
}
