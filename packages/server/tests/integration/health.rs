use crate::common::*;

#[tokio::test]
async fn health_reports_service_metadata() {
    let app = TestApp::spawn().await;
    let res = app.get(routes::HEALTH).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["status"], "ok");
    assert_eq!(res.body["service"], "gallery-api");
    assert_eq!(res.body["version"], env!("CARGO_PKG_VERSION"));
    assert!(res.body["uptime"].as_f64().unwrap() >= 0.0);
    assert!(res.body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn uploads_check_passes_for_writable_directory() {
    let app = TestApp::spawn().await;
    let res = app.get(routes::UPLOADS_CHECK).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["status"], "ok");
    assert_eq!(
        res.body["uploadsPath"],
        app.content_dir().display().to_string()
    );
}

#[tokio::test]
async fn uploads_check_fails_when_directory_is_gone() {
    let app = TestApp::spawn().await;
    std::fs::remove_dir_all(app.content_dir()).unwrap();

    let res = app.get(routes::UPLOADS_CHECK).await;
    assert_eq!(res.status, 500);
    assert_eq!(res.body["status"], "error");
}

#[tokio::test]
async fn openapi_document_lists_gallery_routes() {
    let app = TestApp::spawn().await;
    let res = app.get(routes::OPENAPI).await;

    assert_eq!(res.status, 200);
    let paths = &res.body["paths"];
    for path in [
        "/gallery",
        "/gallery/stats",
        "/gallery/{id}",
        "/gallery/{id}/image",
        "/gallery/{id}/active",
        "/uploads/{name}",
        "/health",
        "/uploads-check",
    ] {
        assert!(paths.get(path).is_some(), "missing {path} in OpenAPI document");
    }
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let app = TestApp::spawn().await;
    let res = app
        .client
        .request(
            reqwest::Method::OPTIONS,
            format!("http://{}{}", app.addr, routes::GALLERY),
        )
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
    assert_eq!(
        res.headers()
            .get("access-control-allow-credentials")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}
