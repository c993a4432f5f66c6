#[cfg(test)]
mod tests {
    use crate::api::{ApiResponse, ClassCreated, ClassList};
    use crate::db::{create_class, delete_class, get_all_classes, get_class, update_class};
    use crate::error::{AppError, ErrorBody};
    use crate::models::NewClass;
    use crate::test::test_utils::{TestDbBuilder, create_standard_test_db, setup_test_client};
    use rocket::http::{ContentType, Status};
    use serde_json::json;

    fn new_class(name: &str, number: i64) -> NewClass {
        NewClass {
            class_name: name.to_string(),
            class_number: number,
        }
    }

    #[rocket::async_test]
    async fn test_get_all_classes_with_counts() {
        let test_db = create_standard_test_db().await;

        let classes = get_all_classes(&test_db.pool).await.unwrap();
        assert_eq!(classes.len(), 2);

        let first = &classes[0];
        assert_eq!(first.class_number, 1);
        assert_eq!(first.student_count, Some(2));
        assert_eq!(first.subject_count, Some(2));
        assert_eq!(first.teacher_count, Some(1));

        let second = &classes[1];
        assert_eq!(second.class_number, 2);
        assert_eq!(second.student_count, Some(2));
        assert_eq!(second.subject_count, Some(1));
    }

    #[rocket::async_test]
    async fn test_create_class_rejects_duplicate_number() {
        let test_db = TestDbBuilder::new().class("Grade One", 1).build().await.unwrap();

        let created = create_class(&test_db.pool, &new_class("Grade Two", 2))
            .await
            .unwrap();
        assert_eq!(created.class_number, 2);

        let result = create_class(&test_db.pool, &new_class("Another One", 1)).await;
        match result {
            Err(AppError::Conflict(message)) => assert_eq!(message, "Class already exists"),
            other => panic!("Expected conflict, got {:?}", other),
        }
    }

    #[rocket::async_test]
    async fn test_update_class_keeps_own_number_and_cascades() {
        let test_db = create_standard_test_db().await;
        let class_id = test_db.class_id(1).unwrap();

        let renamed = update_class(&test_db.pool, class_id, &new_class("First Grade", 1))
            .await
            .unwrap();
        assert_eq!(renamed.class_name, "First Grade");

        let clash = update_class(&test_db.pool, class_id, &new_class("First Grade", 2)).await;
        assert!(matches!(clash, Err(AppError::Conflict(_))));

        update_class(&test_db.pool, class_id, &new_class("First Grade", 10))
            .await
            .unwrap();

        let moved: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE class_number = 10")
                .fetch_one(&test_db.pool)
                .await
                .unwrap();
        assert_eq!(moved, 2);
    }

    #[rocket::async_test]
    async fn test_delete_class() {
        let test_db = TestDbBuilder::new()
            .class("Empty", 3)
            .class("Busy", 4)
            .student("R1", "Some Student", 4, Some(10), None)
            .build()
            .await
            .unwrap();

        delete_class(&test_db.pool, test_db.class_id(3).unwrap())
            .await
            .unwrap();
        assert!(matches!(
            get_class(&test_db.pool, test_db.class_id(3).unwrap()).await,
            Err(AppError::NotFound(_))
        ));

        let in_use = delete_class(&test_db.pool, test_db.class_id(4).unwrap()).await;
        assert!(matches!(in_use, Err(AppError::Reference(_))));

        let missing = delete_class(&test_db.pool, 999).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[rocket::async_test]
    async fn test_class_api_round() {
        let test_db = TestDbBuilder::new().build().await.unwrap();
        let (client, _test_db) = setup_test_client(test_db).await;

        let response = client
            .post("/api/classes")
            .header(ContentType::JSON)
            .body(json!({ "className": "Grade Nine", "classNumber": "9" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let created: ApiResponse<ClassCreated> = response.into_json().await.unwrap();
        assert!(created.success);
        assert_eq!(created.message.as_deref(), Some("Class added successfully"));
        assert_eq!(created.data.class.class_number, 9);
        let class_id = created.data.class_id;

        let response = client.get("/api/classes").dispatch().await;
        let list: ApiResponse<ClassList> = response.into_json().await.unwrap();
        assert_eq!(list.data.classes.len(), 1);

        let response = client
            .put(format!("/api/classes/{}", class_id))
            .header(ContentType::JSON)
            .body(json!({ "className": "Grade Ten", "classNumber": 10 }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .delete(format!("/api/classes/{}", class_id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .get(format!("/api/classes/{}", class_id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
        let body: ErrorBody = response.into_json().await.unwrap();
        assert!(!body.success);
        assert_eq!(body.error, "Class not found");
    }

    #[rocket::async_test]
    async fn test_class_api_validation_errors() {
        let test_db = TestDbBuilder::new().build().await.unwrap();
        let (client, _test_db) = setup_test_client(test_db).await;

        let response = client
            .post("/api/classes")
            .header(ContentType::JSON)
            .body(json!({ "className": "1234", "classNumber": 2.5 }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(
            body.error,
            "Class name cannot be only numbers, Class number must be a positive number"
        );
        let fields = body.fields.unwrap();
        assert!(fields.contains_key("className"));
        assert!(fields.contains_key("classNumber"));
    }

    #[rocket::async_test]
    async fn test_unknown_route_and_preflight() {
        let test_db = TestDbBuilder::new().build().await.unwrap();
        let (client, _test_db) = setup_test_client(test_db).await;

        let response = client.get("/api/nothing-here").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        let body: ErrorBody = response.into_json().await.unwrap();
        assert!(!body.success);

        let response = client.options("/api/classes").dispatch().await;
        assert_eq!(response.status(), Status::NoContent);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("*")
        );

        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.into_string().await.as_deref(), Some("OK"));
    }
}
