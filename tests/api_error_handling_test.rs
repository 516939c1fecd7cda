mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{setup_app, staff_token};
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let app = setup_app().await;
    let (status, value) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "ok");
    assert_eq!(value["database"], "up");
}

#[tokio::test]
async fn test_name_length_limits() {
    let app = setup_app().await;
    let staff = staff_token();

    let cases = [
        ("authors", 100),
        ("categories", 50),
        ("publishers", 50),
    ];
    for (collection, max) in cases {
        let uri = format!("/api/{}", collection);

        let (status, value) = app
            .send("POST", &uri, Some(&staff), Some(json!({ "name": "   " })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, json!({ "name": ["This field may not be blank."] }));

        let (status, value) = app
            .send("POST", &uri, Some(&staff), Some(json!({ "name": "x".repeat(max + 1) })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            value["name"],
            json!([format!("Ensure this field has no more than {} characters.", max)])
        );

        let (status, _) = app
            .send("POST", &uri, Some(&staff), Some(json!({ "name": "x".repeat(max) })))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{} accepts {} chars", collection, max);

        let (status, value) = app.send("POST", &uri, Some(&staff), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["name"], json!(["This field is required."]));
    }

    let (status, value) = app
        .send("POST", "/api/books", Some(&staff), Some(json!({ "title": "t".repeat(101) })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        value["title"],
        json!(["Ensure this field has no more than 100 characters."])
    );
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let app = setup_app().await;
    let staff = staff_token();

    for uri in [
        "/api/authors/00000000-0000-0000-0000-000000000000",
        "/api/authors/not-a-uuid",
        "/api/categories/999",
        "/api/categories/abc",
        "/api/publishers/999",
        "/api/books/00000000-0000-0000-0000-000000000000",
        "/api/book_copies/42",
    ] {
        let (status, value) = app.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {}", uri);
        assert_eq!(value["detail"], "Not found.");

        let (status, _) = app.send("DELETE", uri, Some(&staff), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {}", uri);
    }

    let (status, _) = app
        .send(
            "PUT",
            "/api/categories/999",
            Some(&staff),
            Some(json!({ "name": "Anything" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            "PATCH",
            "/api/books/00000000-0000-0000-0000-000000000000",
            Some(&staff),
            Some(json!({ "title": "Anything" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pagination_envelope_and_invalid_page() {
    let app = setup_app().await;
    for name in ["A", "B", "C"] {
        app.create("categories", json!({ "name": name })).await;
    }

    let (status, page) = app.get("/api/categories?page_size=2&search=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 3);
    assert_eq!(page["results"].as_array().unwrap().len(), 2);
    assert_eq!(page["results"][0]["name"], "A");
    assert_eq!(page["previous"], json!(null));
    assert_eq!(page["next"], "/api/categories?page_size=2&search=&page=2");

    let (_, page) = app.get("/api/categories?page_size=2&page=2").await;
    assert_eq!(page["results"].as_array().unwrap().len(), 1);
    assert_eq!(page["results"][0]["name"], "C");
    assert_eq!(page["next"], json!(null));
    assert_eq!(page["previous"], "/api/categories?page_size=2");

    for uri in ["/api/categories?page=3&page_size=2", "/api/categories?page=0", "/api/categories?page=x"] {
        let (status, value) = app.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(value["detail"], "Invalid page.");
    }

    // An empty collection still has a first page
    let (status, page) = app.get("/api/publishers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 0);
    assert_eq!(page["results"], json!([]));
}

#[tokio::test]
async fn test_malformed_bodies() {
    let app = setup_app().await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/authors")
        .header(header::AUTHORIZATION, format!("Bearer {}", staff_token()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let (status, value) = app.request(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["detail"].is_string());

    let req = Request::builder()
        .method("POST")
        .uri("/api/authors")
        .header(header::AUTHORIZATION, format!("Bearer {}", staff_token()))
        .body(Body::from("name=Plain"))
        .unwrap();
    let (status, _) = app.request(req).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_wrongly_typed_fields_are_field_errors() {
    let app = setup_app().await;
    let staff = staff_token();

    let cases = [
        (
            "/api/books",
            json!({ "title": 5 }),
            json!({ "title": ["Not a valid string."] }),
        ),
        (
            "/api/books",
            json!({ "title": "T", "authors": "John" }),
            json!({ "authors": ["Expected a list of items but got type \"str\"."] }),
        ),
        (
            "/api/authors",
            json!({ "name": ["Ann"] }),
            json!({ "name": ["Not a valid string."] }),
        ),
        (
            "/api/publishers",
            json!(["Penguin"]),
            json!({ "non_field_errors": ["Invalid data. Expected a dictionary, but got list."] }),
        ),
    ];
    for (uri, body, expected) in cases {
        let (status, value) = app.send("POST", uri, Some(&staff), Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "POST {} {}", uri, body);
        assert_eq!(value, expected, "POST {} {}", uri, body);
    }

    let (_, books) = app.get("/api/books").await;
    assert_eq!(books["count"], 0);
}

#[tokio::test]
async fn test_malformed_filter_is_bad_request() {
    let app = setup_app().await;
    let (status, value) = app.get("/api/books?author=someone").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["detail"].is_string());
}
