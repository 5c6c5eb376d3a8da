use ::common::storage::MediaRef;
use sea_orm::ConnectionTrait;

use crate::common::{TestApp, routes};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot really a png";

#[tokio::test]
async fn uploaded_image_is_served_and_set_on_section() {
    let app = TestApp::spawn().await;
    let token = app.admin_token();
    app.write_text("home.hero.1.image", "Alt text", &token).await;

    let res = app
        .upload_with_token(
            &routes::section_image("home.hero.1.image"),
            "hero.PNG",
            PNG_BYTES.to_vec(),
            &token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let image = res.body["image"].as_str().unwrap().to_string();
    assert!(image.ends_with(".png"));

    let live = app.live("home.hero.1.image").await.unwrap();
    assert_eq!(live["image"], image.as_str());
    assert_eq!(live["content"], "Alt text");

    let media = app.get_raw(&routes::media(&image), &[]).await;
    assert_eq!(media.status().as_u16(), 200);
    assert_eq!(media.headers()["content-type"], "image/png");
    let etag = media.headers()["etag"].to_str().unwrap().to_string();
    assert_eq!(media.bytes().await.unwrap().as_ref(), PNG_BYTES);

    let cached = app
        .get_raw(&routes::media(&image), &[("If-None-Match", etag.as_str())])
        .await;
    assert_eq!(cached.status().as_u16(), 304);
}

#[tokio::test]
async fn upload_counts_as_image_revision() {
    let app = TestApp::spawn().await;
    let token = app.admin_token();

    let res = app
        .upload_with_token(
            &routes::section_image("tours.cover.image"),
            "cover.jpg",
            b"jpeg bytes".to_vec(),
            &token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let history = app
        .get_with_token(&routes::revisions("tours.cover.image"), &token)
        .await;
    assert_eq!(history.body["revisions"][0]["change_type"], "image_upload");
}

#[tokio::test]
async fn non_image_upload_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.admin_token();

    let res = app
        .upload_with_token(
            &routes::section_image("home.hero.1.image"),
            "script.sh",
            b"#!/bin/sh".to_vec(),
            &token,
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert!(app.live("home.hero.1.image").await.is_none());
}

#[tokio::test]
async fn unknown_media_is_not_found() {
    let app = TestApp::spawn().await;
    let missing = format!("{}.png", "ab".repeat(32));

    assert_eq!(app.get(&routes::media(&missing)).await.status, 404);
    assert_eq!(app.get(&routes::media("not-a-hash.png")).await.status, 404);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::spawn().await;
    let res = app.get("/api-docs/openapi.json").await;
    assert_eq!(res.status, 200);
    assert!(res.body["paths"]["/api/v1/sections/{key}/reset"].is_object());
}

#[tokio::test]
async fn failed_upload_write_discards_new_media() {
    let app = TestApp::spawn().await;
    let token = app.admin_token();
    let shared = b"shared banner".to_vec();

    let res = app
        .upload_with_token(&routes::section_image("home.hero.1.image"), "a.jpg", shared.clone(), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    app.db
        .execute_unprepared(
            "CREATE TRIGGER reject_revisions BEFORE INSERT ON section_revisions \
             BEGIN SELECT RAISE(ABORT, 'history locked'); END;",
        )
        .await
        .unwrap();

    let fresh = b"never referenced".to_vec();
    let res = app
        .upload_with_token(&routes::section_image("home.hero.2.image"), "b.jpg", fresh.clone(), &token)
        .await;
    assert_eq!(res.status, 500);
    let orphan = MediaRef::compute(&fresh, "jpg").unwrap().file_name();
    assert_eq!(app.get_raw(&routes::media(&orphan), &[]).await.status().as_u16(), 404);

    // Same bytes as an image already in use: the file stays.
    let res = app
        .upload_with_token(&routes::section_image("home.hero.3.image"), "c.jpg", shared.clone(), &token)
        .await;
    assert_eq!(res.status, 500);
    let kept = MediaRef::compute(&shared, "jpg").unwrap().file_name();
    assert_eq!(app.get_raw(&routes::media(&kept), &[]).await.status().as_u16(), 200);
    assert!(app.live("home.hero.2.image").await.is_none());
}
