mod common;

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use cbt_server::{
    app_state::AppState, auth::AuthMiddleware, graphql::create_schema, handlers,
    middleware::RequestIdMiddleware,
};
use common::{app_state, Repositories};

macro_rules! init_app {
    ($state:expr) => {{
        let state: AppState = $state;
        let schema = create_schema(state.clone());
        let jwt_service = state.jwt_service.clone();
        test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::new(state)))
                .app_data(web::Data::new(schema))
                .app_data(web::Data::new(jwt_service))
                .wrap(RequestIdMiddleware)
                .service(handlers::health_check)
                .service(handlers::health_check_live)
                .service(handlers::health_check_ready)
                .service(handlers::register)
                .service(handlers::login)
                .service(
                    web::resource("/graphql")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(handlers::graphql)),
                ),
        )
        .await
    }};
}

fn register_body(email: &str) -> Value {
    json!({
        "name": "Noor",
        "email": email,
        "password": "correct-horse",
        "class_label": "10A"
    })
}

#[actix_web::test]
async fn health_endpoints_report_status() {
    let repos = Repositories::new();
    let app = init_app!(app_state(&repos));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let live: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/health/live").to_request(),
    )
    .await;
    assert_eq!(live["status"], "alive");
    assert_eq!(live["active_attempts"], 0);

    // No database handle is attached to in-memory state.
    let ready = test::call_service(
        &app,
        test::TestRequest::get().uri("/health/ready").to_request(),
    )
    .await;
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn register_then_login() {
    let repos = Repositories::new();
    let app = init_app!(app_state(&repos));

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(register_body("noor@example.com"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["profile"]["role"], "student");
    assert!(body["profile"].get("password_hash").is_none());

    let duplicate = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(register_body("noor@example.com"))
            .to_request(),
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let login = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "noor@example.com", "password": "correct-horse" }))
            .to_request(),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);

    let wrong = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "noor@example.com", "password": "wrong-password" }))
            .to_request(),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let error: Value = test::read_body_json(wrong).await;
    assert_eq!(error["code"], 401);
}

#[actix_web::test]
async fn invalid_registration_is_rejected() {
    let repos = Repositories::new();
    let app = init_app!(app_state(&repos));

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "name": "Noor",
                "email": "not-an-email",
                "password": "short",
                "class_label": "10A"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn graphql_requires_a_bearer_token() {
    let repos = Repositories::new();
    let app = init_app!(app_state(&repos));

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/graphql")
            .set_json(json!({ "query": "{ me { email } }" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn graphql_flow_for_admin_and_student() {
    let repos = Repositories::new();
    let state = app_state(&repos);
    let admin = state
        .profile_service
        .seed_admin(&state.config)
        .await
        .unwrap()
        .unwrap();
    let admin_token = state.jwt_service.create_token(&admin).unwrap();
    let app = init_app!(state);

    let publish = json!({
        "query": r#"mutation {
            publishQuiz(input: {
                title: "Capitals",
                subject: "Geography",
                durationMinutes: 5,
                classLabel: "10A",
                questions: [
                    { text: "Capital of France?", questionType: SHORT_ANSWER, correctAnswer: "Paris", points: 2 },
                    { text: "Rome is in Italy", questionType: TRUE_FALSE, correctAnswer: "True" }
                ]
            }) { quiz { id } questions { id position } }
        }"#
    });
    let published: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/graphql")
            .insert_header(("Authorization", format!("Bearer {}", admin_token)))
            .set_json(publish)
            .to_request(),
    )
    .await;
    assert!(published.get("errors").is_none(), "{}", published);
    let quiz_id = published["data"]["publishQuiz"]["quiz"]["id"]
        .as_str()
        .unwrap()
        .to_string();
    let first_question = published["data"]["publishQuiz"]["questions"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let registered: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(register_body("pupil@example.com"))
            .to_request(),
    )
    .await;
    let student_token = registered["token"].as_str().unwrap().to_string();
    let bearer = ("Authorization", format!("Bearer {}", student_token));

    let started: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/graphql")
            .insert_header(bearer.clone())
            .set_json(json!({
                "query": format!(
                    r#"mutation {{ startQuiz(quizId: "{}") {{ attemptId remainingSeconds questions {{ id }} }} }}"#,
                    quiz_id
                )
            }))
            .to_request(),
    )
    .await;
    assert!(started.get("errors").is_none(), "{}", started);
    assert_eq!(started["data"]["startQuiz"]["remainingSeconds"], 300);
    let attempt_id = started["data"]["startQuiz"]["attemptId"]
        .as_str()
        .unwrap()
        .to_string();

    let _: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/graphql")
            .insert_header(bearer.clone())
            .set_json(json!({
                "query": format!(
                    r#"mutation {{ recordAnswer(input: {{ attemptId: "{}", questionId: "{}", answer: " paris" }}) {{ answeredCount }} }}"#,
                    attempt_id, first_question
                )
            }))
            .to_request(),
    )
    .await;

    let submitted: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/graphql")
            .insert_header(bearer.clone())
            .set_json(json!({
                "query": format!(
                    r#"mutation {{ submitAttempt(attemptId: "{}") {{ score totalPoints percentage notice }} }}"#,
                    attempt_id
                )
            }))
            .to_request(),
    )
    .await;
    assert!(submitted.get("errors").is_none(), "{}", submitted);
    assert_eq!(submitted["data"]["submitAttempt"]["score"], 2);
    assert_eq!(submitted["data"]["submitAttempt"]["totalPoints"], 3);
    assert_eq!(submitted["data"]["submitAttempt"]["percentage"], 66.7);

    let forbidden: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/graphql")
            .insert_header(bearer)
            .set_json(json!({ "query": "{ adminDashboard { quizCount } }" }))
            .to_request(),
    )
    .await;
    assert_eq!(forbidden["errors"][0]["extensions"]["code"], "FORBIDDEN");
}
