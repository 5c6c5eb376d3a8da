use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::Client;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;

use cms_server::config::{
    AppConfig, AuthConfig, ContentConfig, CorsConfig, DatabaseConfig, ServerConfig, StorageConfig,
};
use cms_server::state::AppState;
use ::common::storage::filesystem::FilesystemMediaStore;

const JWT_SECRET: &str = "test-secret-for-integration-tests";

pub mod routes {
    pub const SECTIONS: &str = "/api/v1/sections";
    pub const CHANGES: &str = "/api/v1/content/changes";
    pub const RESET_ALL: &str = "/api/v1/content/reset";
    pub const RESET_HERO: &str = "/api/v1/content/reset/hero";

    pub fn section(key: &str) -> String {
        format!("/api/v1/sections/{key}")
    }

    pub fn section_image(key: &str) -> String {
        format!("/api/v1/sections/{key}/image")
    }

    pub fn revisions(key: &str) -> String {
        format!("/api/v1/sections/{key}/revisions")
    }

    pub fn restore_revision(key: &str, id: i64) -> String {
        format!("/api/v1/sections/{key}/revisions/{id}/restore")
    }

    pub fn reset_section(key: &str) -> String {
        format!("/api/v1/sections/{key}/reset")
    }

    pub fn reset_page(page: &str) -> String {
        format!("/api/v1/content/reset/page/{page}")
    }

    pub fn reset_type(kind: &str) -> String {
        format!("/api/v1/content/reset/type/{kind}")
    }

    pub fn media(name: &str) -> String {
        format!("/api/v1/media/{name}")
    }
}

/// A running test server backed by in-memory SQLite and a temp media dir.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    _media_dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    /// `(restored, removed)` from a reset response.
    pub fn counts(&self) -> (u64, u64) {
        (
            self.body["restored"].as_u64().expect("missing restored"),
            self.body["removed"].as_u64().expect("missing removed"),
        )
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db_config = DatabaseConfig::in_memory();
        let db = cms_server::database::init_db(&db_config)
            .await
            .expect("Failed to initialize test database");

        let media_dir = tempfile::tempdir().expect("Failed to create media dir");
        let storage = StorageConfig {
            media_dir: media_dir.path().to_path_buf(),
            max_image_size: 1024 * 1024,
        };
        let media = FilesystemMediaStore::new(storage.media_dir.clone(), storage.max_image_size)
            .await
            .expect("Failed to create media store");

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: db_config,
            auth: AuthConfig {
                jwt_secret: JWT_SECRET.to_string(),
            },
            storage,
            content: ContentConfig::default(),
        };

        let state = AppState {
            db: db.clone(),
            config: app_config,
            media: Arc::new(media),
        };

        let app = cms_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            _media_dir: media_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Token for a user holding the given permissions.
    pub fn token(&self, username: &str, permissions: &[&str]) -> String {
        let permissions: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();
        cms_server::utils::jwt::sign(1, username, "editor", &permissions, JWT_SECRET)
            .expect("Failed to sign token")
    }

    /// Token allowed to both edit and restore.
    pub fn admin_token(&self) -> String {
        self.token("admin", &["content:edit", "content:restore"])
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_raw(&self, path: &str, headers: &[(&str, &str)]) -> reqwest::Response {
        let mut req = self.client.get(self.url(path));
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        req.send().await.expect("Failed to send GET request")
    }

    pub async fn put_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn post_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn upload_with_token(
        &self,
        path: &str,
        file_name: &str,
        file_bytes: Vec<u8>,
        token: &str,
    ) -> TestResponse {
        let part = reqwest::multipart::Part::bytes(file_bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    /// Write a text section through the API.
    pub async fn write_text(&self, key: &str, content: &str, token: &str) {
        let res = self
            .put_with_token(
                &routes::section(key),
                &serde_json::json!({ "content": content }),
                token,
            )
            .await;
        assert_eq!(res.status, 200, "write_text failed: {}", res.text);
    }

    /// Write an image reference through the API.
    pub async fn write_image(&self, key: &str, image: &str, token: &str) {
        let res = self
            .put_with_token(
                &routes::section(key),
                &serde_json::json!({ "image": image }),
                token,
            )
            .await;
        assert_eq!(res.status, 200, "write_image failed: {}", res.text);
    }

    /// Insert a live value without recording a baseline, as an import would.
    pub async fn seed(&self, key: &str, content: Option<&str>, image: Option<&str>) {
        use cms_server::content::{SectionPayload, SectionStore, WriteContext};

        SectionStore::new(&self.db)
            .update_with_backup(
                key,
                &SectionPayload::new(content.map(Into::into), image.map(Into::into)),
                WriteContext::new("import").suppressed(),
            )
            .await
            .expect("Failed to seed section");
    }

    /// Live section JSON, or `None` when the key has no live value.
    pub async fn live(&self, key: &str) -> Option<Value> {
        let res = self.get(&routes::section(key)).await;
        match res.status {
            200 => Some(res.body),
            404 => None,
            other => panic!("unexpected status {other}: {}", res.text),
        }
    }
}
