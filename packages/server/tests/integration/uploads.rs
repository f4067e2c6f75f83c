use crate::common::*;

#[tokio::test]
async fn serves_stored_image_with_cache_headers() {
    let app = TestApp::spawn().await;
    let body = app.create_entry("Sunset", "a.png", PNG_BYTES).await;

    let file = app.get_file(&routes::upload(&stored_name_of(&body))).await;
    assert_eq!(file.status, 200);
    assert_eq!(file.bytes, PNG_BYTES);
    assert_eq!(file.header("content-type"), Some("image/png"));
    assert_eq!(
        file.header("content-length"),
        Some(PNG_BYTES.len().to_string().as_str())
    );
    assert_eq!(file.header("cache-control"), Some("public, max-age=31536000"));
    assert_eq!(file.header("x-content-type-options"), Some("nosniff"));
}

#[tokio::test]
async fn content_type_follows_extension() {
    let app = TestApp::spawn().await;
    let body = app.create_entry("Photo", "photo.JPG", JPEG_BYTES).await;

    let file = app.get_file(&routes::upload(&stored_name_of(&body))).await;
    assert_eq!(file.header("content-type"), Some("image/jpeg"));
}

#[tokio::test]
async fn unknown_name_is_not_found() {
    let app = TestApp::spawn().await;
    let file = app
        .get_file(&routes::upload("0123456789abcdef0123456789abcdef.png"))
        .await;
    assert_eq!(file.status, 404);
}

#[tokio::test]
async fn names_the_server_did_not_generate_are_not_found() {
    let app = TestApp::spawn().await;
    std::fs::write(app.content_dir().join("notes.txt"), b"secret").unwrap();

    assert_eq!(app.get_file(&routes::upload("notes.txt")).await.status, 404);
    assert_eq!(app.get_file(&routes::upload("..%2Fgallery.db")).await.status, 404);
    assert_eq!(app.get_file(&routes::upload(".tmp")).await.status, 404);
}
