use crate::common::*;

async fn seed(app: &TestApp, count: usize) -> Vec<i32> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let body = app
            .create_entry(&format!("Photo {i}"), "p.png", PNG_BYTES)
            .await;
        ids.push(id_of(&body));
    }
    ids
}

fn ids_in(res: &TestResponse) -> Vec<i32> {
    res.body["galleries"]
        .as_array()
        .expect("galleries should be an array")
        .iter()
        .map(id_of)
        .collect()
}

#[tokio::test]
async fn empty_gallery_lists_nothing() {
    let app = TestApp::spawn().await;
    let res = app.get(routes::GALLERY).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert!(ids_in(&res).is_empty());
    assert_eq!(res.body["pagination"]["total"], 0);
    assert_eq!(res.body["pagination"]["totalPages"], 0);
    assert_eq!(res.body["pagination"]["hasNext"], false);
    assert_eq!(res.body["pagination"]["hasPrev"], false);
}

#[tokio::test]
async fn newest_entries_come_first() {
    let app = TestApp::spawn().await;
    let mut ids = seed(&app, 3).await;
    ids.reverse();

    let res = app.get(routes::GALLERY).await;
    assert_eq!(ids_in(&res), ids);
    assert_eq!(res.body["pagination"]["limit"], 12);
}

#[tokio::test]
async fn last_page_holds_the_remainder() {
    let app = TestApp::spawn().await;
    let ids = seed(&app, 5).await;

    let res = app.get(&routes::gallery_page(3, 2)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(ids_in(&res), vec![ids[0]]);

    let pagination = &res.body["pagination"];
    assert_eq!(pagination["page"], 3);
    assert_eq!(pagination["total"], 5);
    assert_eq!(pagination["totalPages"], 3);
    assert_eq!(pagination["hasNext"], false);
    assert_eq!(pagination["hasPrev"], true);
}

#[tokio::test]
async fn pages_do_not_overlap() {
    let app = TestApp::spawn().await;
    seed(&app, 5).await;

    let mut seen = Vec::new();
    for page in 1..=3 {
        seen.extend(ids_in(&app.get(&routes::gallery_page(page, 2)).await));
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 5);
}

#[tokio::test]
async fn page_past_the_end_is_empty_not_an_error() {
    let app = TestApp::spawn().await;
    seed(&app, 2).await;

    let res = app.get(&routes::gallery_page(9, 2)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert!(ids_in(&res).is_empty());
    assert_eq!(res.body["pagination"]["total"], 2);
    assert_eq!(res.body["pagination"]["hasNext"], false);
}

#[tokio::test]
async fn out_of_range_paging_values_are_clamped() {
    let app = TestApp::spawn().await;
    seed(&app, 2).await;

    let res = app.get("/gallery?page=0&limit=1000").await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["pagination"]["page"], 1);
    assert_eq!(res.body["pagination"]["limit"], 100);

    let res = app.get("/gallery?limit=0").await;
    assert_eq!(res.body["pagination"]["limit"], 1);
}

#[tokio::test]
async fn malformed_query_is_a_validation_error() {
    let app = TestApp::spawn().await;

    let res = app.get("/gallery?page=first").await;
    assert_eq!(res.status, 400);
    assert_eq!(res.error_code(), "VALIDATION_ERROR");

    let res = app.get("/gallery?status=archived").await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn status_filter_and_stats() {
    let app = TestApp::spawn().await;
    let ids = seed(&app, 3).await;
    app.patch(&routes::gallery_active(ids[1])).await;

    let res = app.get("/gallery?status=active").await;
    assert_eq!(ids_in(&res), vec![ids[2], ids[0]]);
    assert_eq!(res.body["pagination"]["total"], 2);

    let res = app.get("/gallery?status=inactive").await;
    assert_eq!(ids_in(&res), vec![ids[1]]);

    let res = app.get("/gallery?status=all").await;
    assert_eq!(ids_in(&res).len(), 3);

    let res = app.get(routes::GALLERY_STATS).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["total"], 3);
    assert_eq!(res.body["active"], 2);
    assert_eq!(res.body["inactive"], 1);
}

#[tokio::test]
async fn list_entries_carry_image_urls() {
    let app = TestApp::spawn().await;
    let body = app.create_entry("Sunset", "a.png", PNG_BYTES).await;

    let res = app.get(routes::GALLERY).await;
    let entry = &res.body["galleries"][0];
    assert_eq!(entry["storedFileName"], body["storedFileName"]);
    assert_eq!(
        entry["imageUrl"],
        format!("/uploads/{}", stored_name_of(&body))
    );
}
