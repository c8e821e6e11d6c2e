// src/tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use reqwest::Client;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Write a token file into `dir` and return its path.
pub fn write_token(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write token");
    path
}

/// Write a config file listing `tokens` as (name, path) pairs.
pub fn write_config(dir: &Path, interval_minutes: i64, tokens: &[(&str, &Path)]) -> PathBuf {
    let mut yaml = format!("checkIntervalMinutes: {}\ntokens:\n", interval_minutes);
    for (name, path) in tokens {
        yaml.push_str(&format!("  - name: {}\n    path: {}\n", name, path.display()));
    }
    let path = dir.join("token-machine.yaml");
    fs::write(&path, yaml).expect("write config");
    path
}
