use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::MockServer;

use dermascan::config::{ApiConfig, Config};
use dermascan::session::{Role, Session};
use dermascan::storage::MemoryStore;
use dermascan::{ApiClient, AppContext};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn temp_image(name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let path = temp_dir.path().join(name);
    fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0]).expect("failed to write image");
    (temp_dir, path)
}

#[allow(dead_code)]
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.timeout_seconds = 5;
    config
}

#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&ApiConfig {
        base_url: server.uri(),
        timeout_seconds: 5,
    })
    .expect("failed to build client")
}

/// Context over a fresh in-memory store, talking to `server`.
#[allow(dead_code)]
pub fn context_for(server: &MockServer) -> (AppContext, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let ctx = AppContext::with_store(&config_for(server), store.clone())
        .expect("failed to build context");
    (ctx, store)
}

#[allow(dead_code)]
pub fn patient() -> Session {
    Session {
        auth_token: "T1".to_string(),
        role: Role::Patient,
        user_id: "U1".to_string(),
        display_name: "Jane".to_string(),
        approval_status: false,
        email: Some("a@b.com".to_string()),
        patient_id: Some("P1".to_string()),
    }
}

#[allow(dead_code)]
pub fn doctor() -> Session {
    Session {
        auth_token: "DOC-TOKEN".to_string(),
        role: Role::Doctor,
        user_id: "DOC1".to_string(),
        display_name: "Dr. House".to_string(),
        approval_status: true,
        email: None,
        patient_id: None,
    }
}

#[allow(dead_code)]
pub fn admin() -> Session {
    Session {
        auth_token: "ADMIN-TOKEN".to_string(),
        role: Role::Admin,
        user_id: "ADM1".to_string(),
        display_name: "Admin".to_string(),
        approval_status: false,
        email: None,
        patient_id: None,
    }
}

#[allow(dead_code)]
pub fn doctor_json(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "userId": format!("user-{}", id),
        "fullName": name,
        "specialization": "Dermatology",
        "experience": 10,
        "hospital": "General",
        "isApproved": true
    })
}
