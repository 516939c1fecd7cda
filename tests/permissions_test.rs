mod common;

use axum::http::StatusCode;
use common::{TestApp, setup_app, staff_token, superuser_token, user_token};
use serde_json::{Value, json};

struct Seeded {
    author: String,
    category: i64,
    publisher: i64,
    book: String,
    copy: String,
}

async fn seed(app: &TestApp) -> Seeded {
    let author = app.create("authors", json!({ "name": "Ursula K. Le Guin" })).await;
    let category = app.create("categories", json!({ "name": "Fantasy" })).await;
    let publisher = app.create("publishers", json!({ "name": "Parnassus" })).await;
    let book = app
        .create(
            "books",
            json!({ "title": "A Wizard of Earthsea", "authors": [author["id"]], "category": "Fantasy" }),
        )
        .await;
    let copy = app
        .create(
            "book_copies",
            json!({ "book": book["id"], "date_published": "1968-11-01", "publisher": "Parnassus" }),
        )
        .await;

    Seeded {
        author: author["id"].as_str().unwrap().to_string(),
        category: category["id"].as_i64().unwrap(),
        publisher: publisher["id"].as_i64().unwrap(),
        book: book["id"].as_str().unwrap().to_string(),
        copy: copy["id"].as_str().unwrap().to_string(),
    }
}

/// Every mutating request the API offers, with a body valid for `seeded`
fn writes(seeded: &Seeded) -> Vec<(&'static str, String, Option<Value>)> {
    vec![
        ("POST", "/api/authors".into(), Some(json!({ "name": "Someone" }))),
        ("PUT", format!("/api/authors/{}", seeded.author), Some(json!({ "name": "X" }))),
        ("PATCH", format!("/api/authors/{}", seeded.author), Some(json!({ "name": "X" }))),
        ("DELETE", format!("/api/authors/{}", seeded.author), None),
        ("POST", "/api/categories".into(), Some(json!({ "name": "Other" }))),
        ("PUT", format!("/api/categories/{}", seeded.category), Some(json!({ "name": "X" }))),
        ("PATCH", format!("/api/categories/{}", seeded.category), Some(json!({ "name": "X" }))),
        ("DELETE", format!("/api/categories/{}", seeded.category), None),
        ("POST", "/api/publishers".into(), Some(json!({ "name": "Other" }))),
        ("PUT", format!("/api/publishers/{}", seeded.publisher), Some(json!({ "name": "Parnassus" }))),
        ("PATCH", format!("/api/publishers/{}", seeded.publisher), Some(json!({ "name": "Parnassus" }))),
        ("DELETE", format!("/api/publishers/{}", seeded.publisher), None),
        ("POST", "/api/books".into(), Some(json!({ "title": "Other" }))),
        ("PUT", format!("/api/books/{}", seeded.book), Some(json!({ "title": "X" }))),
        ("PATCH", format!("/api/books/{}", seeded.book), Some(json!({ "title": "X" }))),
        ("DELETE", format!("/api/books/{}", seeded.book), None),
        (
            "POST",
            "/api/book_copies".into(),
            Some(json!({ "book": seeded.book, "date_published": "2000-01-01", "publisher": "Parnassus" })),
        ),
        (
            "PUT",
            format!("/api/book_copies/{}", seeded.copy),
            Some(json!({ "book": seeded.book, "date_published": "2000-01-01", "publisher": "Parnassus" })),
        ),
        (
            "PATCH",
            format!("/api/book_copies/{}", seeded.copy),
            Some(json!({ "date_published": "2000-01-01" })),
        ),
        ("DELETE", format!("/api/book_copies/{}", seeded.copy), None),
    ]
}

#[tokio::test]
async fn test_anonymous_and_regular_users_cannot_write() {
    let app = setup_app().await;
    let seeded = seed(&app).await;
    let user = user_token();

    for token in [None, Some(user.as_str())] {
        for (method, uri, body) in writes(&seeded) {
            let (status, value) = app.send(method, &uri, token, body).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{} {} as {:?}", method, uri, token);
            assert_eq!(
                value["detail"],
                "You do not have permission to perform this action."
            );
        }
    }

    // Nothing changed
    let (_, author) = app.get(&format!("/api/authors/{}", seeded.author)).await;
    assert_eq!(author["name"], "Ursula K. Le Guin");
    let (_, authors) = app.get("/api/authors").await;
    assert_eq!(authors["count"], 1);
    let (_, copies) = app.get("/api/book_copies").await;
    assert_eq!(copies["count"], 1);
}

#[tokio::test]
async fn test_everyone_can_read() {
    let app = setup_app().await;
    let seeded = seed(&app).await;
    let user = user_token();
    let staff = staff_token();

    let reads = [
        "/api/authors".to_string(),
        format!("/api/authors/{}", seeded.author),
        "/api/categories".to_string(),
        format!("/api/categories/{}", seeded.category),
        "/api/publishers".to_string(),
        format!("/api/publishers/{}", seeded.publisher),
        "/api/books".to_string(),
        format!("/api/books/{}", seeded.book),
        format!("/api/books/{}/copies", seeded.book),
        "/api/book_copies".to_string(),
        format!("/api/book_copies/{}", seeded.copy),
    ];
    for token in [None, Some(user.as_str()), Some(staff.as_str())] {
        for uri in &reads {
            let (status, _) = app.send("GET", uri, token, None).await;
            assert_eq!(status, StatusCode::OK, "GET {} as {:?}", uri, token);
        }
    }
}

async fn assert_privileged_writes(token: &str) {
    let app = setup_app().await;
    let seeded = seed(&app).await;

    // Deletes last, dependents first
    let (deletes, others): (Vec<_>, Vec<_>) = writes(&seeded)
        .into_iter()
        .partition(|(method, _, _)| *method == "DELETE");

    for (method, uri, body) in others {
        let (status, value) = app.send(method, &uri, Some(token), body).await;
        let expected = if method == "POST" {
            StatusCode::CREATED
        } else {
            StatusCode::OK
        };
        assert_eq!(status, expected, "{} {}: {}", method, uri, value);
    }

    // The copy created by POST above still protects the book
    let (_, copies) = app
        .get(&format!("/api/book_copies?book={}", seeded.book))
        .await;
    for copy in copies["results"].as_array().unwrap() {
        if copy["id"] != seeded.copy.as_str() {
            let uri = format!("/api/book_copies/{}", copy["id"].as_str().unwrap());
            let (status, _) = app.send("DELETE", &uri, Some(token), None).await;
            assert_eq!(status, StatusCode::NO_CONTENT);
        }
    }

    for (method, uri, body) in deletes.into_iter().rev() {
        let (status, value) = app.send(method, &uri, Some(token), body).await;
        assert_eq!(status, StatusCode::NO_CONTENT, "{} {}: {}", method, uri, value);
    }
}

#[tokio::test]
async fn test_staff_can_write() {
    assert_privileged_writes(&staff_token()).await;
}

#[tokio::test]
async fn test_superuser_can_write() {
    assert_privileged_writes(&superuser_token()).await;
}

#[tokio::test]
async fn test_permission_is_checked_before_the_body() {
    let app = setup_app().await;
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/books")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{ not json"))
        .unwrap();
    let (status, _) = app.request(req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_bad_tokens_are_rejected() {
    let app = setup_app().await;

    let (status, value) = app.send("GET", "/api/books", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(value["detail"], "Invalid or expired token");

    let expired = bibliocatalog::auth::create_jwt("secret", "librarian", true, false, -2).unwrap();
    let (status, _) = app
        .send("POST", "/api/authors", Some(&expired), Some(json!({ "name": "A" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
