#[cfg(test)]
mod tests {
    use crate::api::{ApiResponse, SubjectBody, SubjectCreated, SubjectSearch, SubjectStatsBody};
    use crate::db::{
        create_subject, delete_subject, get_all_subjects, get_subject, get_subject_stats,
        get_subjects_by_class, search_subjects, update_subject,
    };
    use crate::error::{AppError, ErrorBody};
    use crate::models::{NewSubject, SubjectChanges};
    use crate::test::test_utils::{create_standard_test_db, setup_test_client};
    use rocket::http::{ContentType, Status};
    use serde_json::json;

    #[rocket::async_test]
    async fn test_subject_listing() {
        let test_db = create_standard_test_db().await;

        let subjects = get_all_subjects(&test_db.pool).await.unwrap();
        let listed: Vec<(i64, &str)> = subjects
            .iter()
            .map(|s| (s.class_number, s.subject_name.as_str()))
            .collect();
        assert_eq!(listed, vec![(1, "English"), (1, "Math"), (2, "Math")]);
        assert_eq!(subjects[0].class_name.as_deref(), Some("Grade One"));
        assert_eq!(subjects[0].student_count, Some(2));

        let class_one = get_subjects_by_class(&test_db.pool, 1).await.unwrap();
        assert_eq!(class_one.len(), 2);

        let by_class_name = search_subjects(&test_db.pool, "grade two").await.unwrap();
        assert_eq!(by_class_name.len(), 1);
        let by_name = search_subjects(&test_db.pool, "mat").await.unwrap();
        assert_eq!(by_name.len(), 2);
        assert!(search_subjects(&test_db.pool, "M_th").await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn test_subject_names_unique_per_class() {
        let test_db = create_standard_test_db().await;

        let duplicate = create_subject(
            &test_db.pool,
            &NewSubject {
                subject_name: "Math".into(),
                class_number: 1,
                max_marks: 100,
            },
        )
        .await;
        match duplicate {
            Err(AppError::Conflict(message)) => {
                assert_eq!(message, "Subject already exists in this class")
            }
            other => panic!("Expected duplicate subject, got {:?}", other),
        }

        let missing_class = create_subject(
            &test_db.pool,
            &NewSubject {
                subject_name: "Art".into(),
                class_number: 7,
                max_marks: 100,
            },
        )
        .await;
        assert!(matches!(missing_class, Err(AppError::Reference(_))));

        let english_id = test_db.subject_id("English", 1).unwrap();
        let rename = update_subject(
            &test_db.pool,
            english_id,
            &SubjectChanges {
                subject_name: "Math".into(),
                max_marks: 50,
            },
        )
        .await;
        match rename {
            Err(AppError::Conflict(message)) => {
                assert_eq!(message, "Subject name already exists in this class")
            }
            other => panic!("Expected duplicate name, got {:?}", other),
        }

        let updated = update_subject(
            &test_db.pool,
            english_id,
            &SubjectChanges {
                subject_name: "Literature".into(),
                max_marks: 75,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.subject_name, "Literature");
        assert_eq!(updated.max_marks, 75);
        assert_eq!(updated.class_number, 1);
    }

    #[rocket::async_test]
    async fn test_delete_subject_removes_dependents() {
        let test_db = create_standard_test_db().await;
        let math_id = test_db.subject_id("Math", 1).unwrap();
        let student_id = test_db.student_id("R001").unwrap();
        test_db.add_exam_record(student_id, math_id, 91).await.unwrap();

        delete_subject(&test_db.pool, math_id).await.unwrap();

        assert!(matches!(
            get_subject(&test_db.pool, math_id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(test_db.count("exam_records").await.unwrap(), 0);
        assert_eq!(test_db.count("teacher_assignments").await.unwrap(), 1);
        assert_eq!(test_db.count("subjects").await.unwrap(), 2);
    }

    #[rocket::async_test]
    async fn test_delete_subject_rolls_back_on_failure() {
        let test_db = create_standard_test_db().await;
        let math_id = test_db.subject_id("Math", 1).unwrap();
        let student_id = test_db.student_id("R001").unwrap();
        test_db.add_exam_record(student_id, math_id, 77).await.unwrap();

        sqlx::query(
            "CREATE TRIGGER block_exam_delete BEFORE DELETE ON exam_records
             BEGIN SELECT RAISE(ABORT, 'exam records are locked'); END",
        )
        .execute(&test_db.pool)
        .await
        .unwrap();

        let result = delete_subject(&test_db.pool, math_id).await;
        assert!(matches!(result, Err(AppError::Transaction(_))));

        // The assignment deleted before the failure is restored.
        assert_eq!(test_db.count("teacher_assignments").await.unwrap(), 2);
        assert_eq!(test_db.count("exam_records").await.unwrap(), 1);
        assert!(get_subject(&test_db.pool, math_id).await.is_ok());
    }

    #[rocket::async_test]
    async fn test_subject_stats() {
        let test_db = create_standard_test_db().await;

        let stats = get_subject_stats(&test_db.pool).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.marks.min_marks, Some(50));
        assert_eq!(stats.marks.max_marks, Some(100));
        let average = stats.marks.average_marks.unwrap();
        assert!((average - 250.0 / 3.0).abs() < 1e-9);

        let counts: Vec<i64> = stats.classes.iter().map(|c| c.subject_count).collect();
        assert_eq!(counts, vec![2, 1]);
    }

    #[rocket::async_test]
    async fn test_subject_api() {
        let test_db = create_standard_test_db().await;
        let (client, _test_db) = setup_test_client(test_db).await;

        let response = client
            .post("/api/subjects")
            .header(ContentType::JSON)
            .body(json!({ "subjectName": "Science", "classNumber": 2 }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let created: ApiResponse<SubjectCreated> = response.into_json().await.unwrap();
        assert_eq!(created.data.subject.max_marks, 100);
        let subject_id = created.data.subject_id;

        // Class number in an update body is ignored.
        let response = client
            .put(format!("/api/subjects/{}", subject_id))
            .header(ContentType::JSON)
            .body(
                json!({ "subjectName": "Physics", "maxMarks": "80", "classNumber": 1 })
                    .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let updated: ApiResponse<SubjectBody> = response.into_json().await.unwrap();
        assert_eq!(updated.data.subject.subject_name, "Physics");
        assert_eq!(updated.data.subject.max_marks, 80);
        assert_eq!(updated.data.subject.class_number, 2);

        let response = client.get("/api/subjects/search/phys").dispatch().await;
        let search: ApiResponse<SubjectSearch> = response.into_json().await.unwrap();
        assert_eq!(search.data.count, 1);

        let response = client.get("/api/subjects/stats/summary").dispatch().await;
        let stats: ApiResponse<SubjectStatsBody> = response.into_json().await.unwrap();
        assert_eq!(stats.data.stats.total, 4);

        let response = client
            .post("/api/subjects")
            .header(ContentType::JSON)
            .body(json!({ "subjectName": "Art", "classNumber": 1, "maxMarks": 0 }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(body.error, "Maximum marks must be at least 1");

        let response = client
            .delete(format!("/api/subjects/{}", subject_id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client.delete("/api/subjects/9999").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }
}
