use serde_json::json;

use crate::common::{TestApp, routes};

mod writing {
    use super::*;

    #[tokio::test]
    async fn editor_can_write_and_read_back() {
        let app = TestApp::spawn().await;
        let token = app.token("maria", &["content:edit"]);

        let res = app
            .put_with_token(
                &routes::section("home.about.title"),
                &json!({ "content": "About our trips" }),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], true);
        assert!(res.body["message"].as_str().is_some());

        let live = app.live("home.about.title").await.unwrap();
        assert_eq!(live["content"], "About our trips");
        assert_eq!(live["image"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn write_requires_token() {
        let app = TestApp::spawn().await;
        let res = app
            .client
            .put(format!("http://{}{}", app.addr, routes::section("home.x.title")))
            .json(&json!({ "content": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 401);
    }

    #[tokio::test]
    async fn write_requires_edit_permission() {
        let app = TestApp::spawn().await;
        let token = app.token("viewer", &["content:restore"]);

        let res = app
            .put_with_token(&routes::section("home.x.title"), &json!({ "content": "x" }), &token)
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn rejects_invalid_token() {
        let app = TestApp::spawn().await;
        let res = app
            .put_with_token(&routes::section("home.x.title"), &json!({ "content": "x" }), "garbage")
            .await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn empty_body_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token();

        let res = app
            .put_with_token(&routes::section("home.x.title"), &json!({}), &token)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.live("home.x.title").await.is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let token = app.admin_token();

        let res = app
            .client
            .put(format!("http://{}{}", app.addr, routes::section("home.x.title")))
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 400);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn overlong_key_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token();
        let key = format!("home.{}", "x".repeat(260));

        let res = app
            .put_with_token(&routes::section(&key), &json!({ "content": "x" }), &token)
            .await;
        assert_eq!(res.status, 400);
    }
}

mod reading {
    use super::*;

    #[tokio::test]
    async fn missing_section_is_not_found() {
        let app = TestApp::spawn().await;
        let res = app.get(&routes::section("home.nothing.here")).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn page_filter_limits_the_map() {
        let app = TestApp::spawn().await;
        let token = app.admin_token();
        app.write_text("home.about.title", "Home", &token).await;
        app.write_text("tours.intro.title", "Tours", &token).await;

        let all = app.get(routes::SECTIONS).await;
        assert_eq!(all.status, 200);
        assert_eq!(all.body["sections"].as_object().unwrap().len(), 2);

        let home = app.get(&format!("{}?page=home", routes::SECTIONS)).await;
        let sections = home.body["sections"].as_object().unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections["home.about.title"]["content"], "Home");
    }

    #[tokio::test]
    async fn page_filter_rejects_dotted_page() {
        let app = TestApp::spawn().await;
        let res = app.get(&format!("{}?page=home.about", routes::SECTIONS)).await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn change_list_splits_keys() {
        let app = TestApp::spawn().await;
        let token = app.admin_token();
        app.write_text("home.about.title", "About", &token).await;
        app.write_image("home.hero.1.image", "hero.jpg", &token).await;

        let res = app.get_with_token(routes::CHANGES, &token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["total"], 2);

        let changes = res.body["changes"].as_array().unwrap();
        let hero = changes
            .iter()
            .find(|c| c["key"] == "home.hero.1.image")
            .unwrap();
        assert_eq!(hero["page"], "home");
        assert_eq!(hero["section"], "hero");
        assert_eq!(hero["instance"], "1");
        assert_eq!(hero["field"], "image");
        assert_eq!(hero["type"], "image");

        let about = changes
            .iter()
            .find(|c| c["key"] == "home.about.title")
            .unwrap();
        assert_eq!(about["type"], "text");
    }

    #[tokio::test]
    async fn change_list_requires_edit_permission() {
        let app = TestApp::spawn().await;
        let token = app.token("guest", &[]);
        let res = app.get_with_token(routes::CHANGES, &token).await;
        assert_eq!(res.status, 403);
    }
}
