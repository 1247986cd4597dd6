use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use docsearch_core::testing::PackageFixture;
use docsearch_core::{BuildOptions, Index};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::ServiceExt;

fn build_tiny_corpus(dir: &std::path::Path) {
    PackageFixture::new()
        .title("Kostenentscheidung")
        .subject("Steuer")
        .keywords("Kosten")
        .custom("Aktenzeichen", "1 K 1/20")
        .paragraph("Die Klage wird abgewiesen.")
        .write_to(dir.join("a.docx"));
    PackageFixture::new()
        .title("Berufung")
        .subject("Steuer; Berufung")
        .custom("Aktenzeichen", "2 K 2/20")
        .paragraph("Die Berufung hat Erfolg.")
        .write_to(dir.join("b.docx"));
    std::fs::write(dir.join("notes.txt"), "not a package").unwrap();
}

fn app(dir: &std::path::Path) -> Router {
    let (index, report) = Index::build(dir, &BuildOptions::default()).unwrap();
    assert_eq!(report.indexed, 2);
    docsearch_server::build_app(index, None)
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, body)
}

async fn search(app: Router, body: Value) -> Vec<Value> {
    let req = Request::post("/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = call(app, req).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice::<Value>(&bytes).unwrap().as_array().unwrap().clone()
}

#[tokio::test]
async fn tags_lists_derived_facets() {
    let dir = tempdir().unwrap();
    build_tiny_corpus(dir.path());
    let (status, body) = call(app(dir.path()), Request::get("/tags").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let tags: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert!(tags.contains(&json!({"key": "Sachgebiet", "value": "Steuer \u{25B8} Berufung"})));
    assert!(tags.contains(&json!({"key": "Aktenzeichen", "value": "1 K 1/20"})));
}

#[tokio::test]
async fn search_combines_text_and_tags() {
    let dir = tempdir().unwrap();
    build_tiny_corpus(dir.path());

    let all = search(app(dir.path()), json!({"query": "", "tags": [{"key": "Sachgebiet", "value": "Steuer"}]})).await;
    assert_eq!(all.len(), 2);

    let hits = search(
        app(dir.path()),
        json!({"query": "beruf", "tags": [{"key": "Sachgebiet", "value": "Steuer"}]}),
    )
    .await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["reference"], "2 K 2/20");
    assert_eq!(hits[0]["areaLabel"], "Steuer \u{25B8} Berufung");
    assert!(hits[0]["score"].as_f64().unwrap() > 0.0);
    assert_eq!(hits[0]["snippet"], "Die <b>Berufung</b> hat Erfolg");
    assert!(hits[0].get("content").is_none());
}

#[tokio::test]
async fn download_returns_package_bytes() {
    let dir = tempdir().unwrap();
    build_tiny_corpus(dir.path());
    let (status, body) = call(app(dir.path()), Request::get("/download/0").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, std::fs::read(dir.path().join("a.docx")).unwrap());

    let (status, _) = call(app(dir.path()), Request::get("/download/7").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
