use crate::common::{TestApp, routes};

#[tokio::test]
async fn reset_of_new_key_removes_it() {
    let app = TestApp::spawn().await;
    let token = app.admin_token();
    app.write_image("home.hero.1.image", "uploaded.jpg", &token).await;

    let res = app
        .post_with_token(&routes::reset_section("home.hero.1.image"), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.counts(), (0, 1));
    assert!(app.live("home.hero.1.image").await.is_none());
}

#[tokio::test]
async fn reset_restores_value_from_before_first_edit() {
    let app = TestApp::spawn().await;
    let token = app.admin_token();
    app.seed("home.hero.1.image", None, Some("original.jpg")).await;
    app.write_image("home.hero.1.image", "a.jpg", &token).await;
    app.write_image("home.hero.1.image", "b.jpg", &token).await;

    let res = app
        .post_with_token(&routes::reset_section("home.hero.1.image"), &token)
        .await;
    assert_eq!(res.counts(), (1, 0));
    assert_eq!(
        app.live("home.hero.1.image").await.unwrap()["image"],
        "original.jpg"
    );
}

#[tokio::test]
async fn reset_of_unknown_key_counts_nothing() {
    let app = TestApp::spawn().await;
    let token = app.admin_token();

    let res = app
        .post_with_token(&routes::reset_section("never.touched.key"), &token)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.counts(), (0, 0));
}

#[tokio::test]
async fn page_reset_only_touches_that_page() {
    let app = TestApp::spawn().await;
    let token = app.admin_token();
    app.seed("home.hero.1.image", None, Some("hero.jpg")).await;
    app.seed("home.about.title", Some("About us"), None).await;
    app.write_image("home.hero.1.image", "new-hero.jpg", &token).await;
    app.write_text("home.about.title", "Who we are", &token).await;
    app.write_text("tours.intro.title", "Trips", &token).await;

    let res = app.post_with_token(&routes::reset_page("home"), &token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.counts(), (2, 0));

    assert_eq!(app.live("home.about.title").await.unwrap()["content"], "About us");
    assert_eq!(app.live("tours.intro.title").await.unwrap()["content"], "Trips");
}

#[tokio::test]
async fn page_reset_rejects_dotted_page() {
    let app = TestApp::spawn().await;
    let token = app.admin_token();
    let res = app.post_with_token(&routes::reset_page("home.hero"), &token).await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn type_reset_only_touches_images() {
    let app = TestApp::spawn().await;
    let token = app.admin_token();
    app.write_image("tours.cover.image", "cover.jpg", &token).await;
    app.write_text("tours.intro.title", "Trips", &token).await;

    let res = app.post_with_token(&routes::reset_type("image"), &token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.counts(), (0, 1));
    assert!(app.live("tours.cover.image").await.is_none());
    assert!(app.live("tours.intro.title").await.is_some());
}

#[tokio::test]
async fn type_reset_rejects_unknown_type() {
    let app = TestApp::spawn().await;
    let token = app.admin_token();
    let res = app.post_with_token(&routes::reset_type("video"), &token).await;
    assert_eq!(res.status, 400);
    assert!(res.body["message"].as_str().unwrap().contains("text, image"));
}

#[tokio::test]
async fn hero_reset_matches_prefix_and_suffix() {
    let app = TestApp::spawn().await;
    let token = app.admin_token();
    app.write_image("home.hero.1.image", "one.jpg", &token).await;
    app.write_image("home.hero.2.image", "two.jpg", &token).await;
    app.write_text("home.hero.1.title", "Sunny beaches", &token).await;

    let res = app.post_with_token(routes::RESET_HERO, &token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.counts(), (0, 2));
    assert!(app.live("home.hero.1.title").await.is_some());
}

#[tokio::test]
async fn reset_all_is_idempotent() {
    let app = TestApp::spawn().await;
    let token = app.admin_token();
    app.seed("home.about.title", Some("About us"), None).await;
    app.write_text("home.about.title", "Changed", &token).await;
    app.write_text("contact.form.title", "Write us", &token).await;

    let first = app.post_with_token(routes::RESET_ALL, &token).await;
    assert_eq!(first.counts(), (1, 1));

    // Restoring rewrites the baseline again; the removed key has nothing left to remove.
    let second = app.post_with_token(routes::RESET_ALL, &token).await;
    assert_eq!(second.counts(), (1, 0));
    assert_eq!(app.live("home.about.title").await.unwrap()["content"], "About us");
    assert!(app.live("contact.form.title").await.is_none());
}

#[tokio::test]
async fn reset_requires_restore_permission() {
    let app = TestApp::spawn().await;
    let editor = app.token("maria", &["content:edit"]);

    assert_eq!(app.post_with_token(routes::RESET_ALL, &editor).await.status, 403);
    assert_eq!(app.post_without_token(routes::RESET_ALL).await.status, 401);
}
