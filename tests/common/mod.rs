use std::collections::HashMap;

use taller::{app::build_app, config::AppConfig, state::AppState};

/// Boots the full router on an ephemeral port and returns its base URL.
pub async fn spawn_app(vars: &[(&str, &str)]) -> String {
    let vars: HashMap<&str, &str> = vars.iter().copied().collect();
    let config = AppConfig::from_map(&vars).expect("test config");
    let state = AppState::init(config).expect("test state");
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}
