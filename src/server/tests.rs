use axum::extract::connect_info::MockConnectInfo;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::{router, AppState};
use crate::chains::{AttestationFeeState, FeeKind};
use crate::config::{Config, SecurityConfig};
use crate::controller::testing::FakeSource;
use crate::handlers::{DisconnectResponse, HealthResponse, MetricsResponse, NetworkSummary};
use crate::keystore::KeyMaterial;
use crate::networks::NetworkRegistry;
use crate::wallet::WalletSessions;

fn fee_state() -> AttestationFeeState {
    AttestationFeeState {
        create_fee: 10_000_000_000_000_000,
        update_fee: 5_000_000_000_000_000,
        balance: 2_500_000_000_000_000_000,
    }
}

fn test_state(config: Config) -> (AppState, Arc<FakeSource>) {
    let source = Arc::new(FakeSource::new(fee_state()));
    let state = AppState::with_source(
        Arc::new(config),
        Arc::new(NetworkRegistry::builtin()),
        WalletSessions::default(),
        source.clone(),
    )
    .unwrap();
    (state, source)
}

fn test_server(state: AppState) -> TestServer {
    let peer = SocketAddr::from(([127, 0, 0, 1], 41000));
    let app = router(state).layer(MockConnectInfo(peer));
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (state, _) = test_state(Config::default());
    let server = test_server(state);

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let health: HealthResponse = response.json();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(health.networks, 9);
}

#[tokio::test]
async fn test_network_listing() {
    let (state, _) = test_state(Config::default());
    let server = test_server(state);

    let networks: Vec<NetworkSummary> = server.get("/networks").await.json();
    assert_eq!(networks.len(), 9);

    let base = networks.iter().find(|n| n.id.as_str() == "base").unwrap();
    assert_eq!(base.symbol, "ETH");
    assert_eq!(base.decimals, 18);
    assert!(!base.connected);
    assert!(base.explorer_url.as_deref().unwrap().starts_with("https://basescan.org/address/"));
}

#[tokio::test]
async fn test_network_state() {
    let (state, _) = test_state(Config::default());
    let server = test_server(state);

    let response = server.get("/networks/base").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let snapshot: Value = response.json();
    assert_eq!(snapshot["network"], "base");
    assert_eq!(snapshot["create_fee"], "0.01");
    assert_eq!(snapshot["update_fee"], "0.005");
    assert_eq!(snapshot["balance"], "2.500");
    assert_eq!(snapshot["raw"]["balance"], "2500000000000000000");
    assert_eq!(snapshot["pending_operation"], "none");
    assert_eq!(snapshot["load_failed"], false);
}

#[tokio::test]
async fn test_failed_read_is_reported_in_snapshot() {
    let (state, source) = test_state(Config::default());
    let server = test_server(state);

    server.get("/networks/near").await;
    source.chain.fail_reads.store(true, Ordering::SeqCst);

    let response = server.get("/networks/near").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let snapshot: Value = response.json();
    assert_eq!(snapshot["load_failed"], true);
    assert!(!snapshot["create_fee"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_network_is_not_found() {
    let (state, _) = test_state(Config::default());
    let server = test_server(state);

    let response = server.get("/networks/polygon").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");

    let response = server
        .post("/networks/polygon/fees")
        .json(&json!({"kind": "create", "fee": "1"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_fee() {
    let (state, _) = test_state(Config::default());
    let server = test_server(state);

    let response = server
        .post("/networks/base/fees")
        .json(&json!({"kind": "create", "fee": "0.02"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["receipt"]["status"], "confirmed");
    assert_eq!(body["receipt"]["tx_hash"], "0xfee");
    assert_eq!(body["state"]["create_fee"], "0.02");
    assert_eq!(body["state"]["pending_operation"], "none");

    let metrics: MetricsResponse = server.get("/metrics").await.json();
    assert_eq!(metrics.admin_writes, 1);
    assert_eq!(metrics.admin_errors, 0);
}

#[tokio::test]
async fn test_invalid_amount_is_bad_request() {
    let (state, _) = test_state(Config::default());
    let server = test_server(state);

    let response = server
        .post("/networks/base/fees")
        .json(&json!({"kind": "update", "fee": "-1"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_AMOUNT");

    let metrics: MetricsResponse = server.get("/metrics").await.json();
    assert_eq!(metrics.admin_errors, 1);
}

#[tokio::test]
async fn test_withdraw_full_balance() {
    let (state, source) = test_state(Config::default());
    let server = test_server(state);

    let response = server
        .post("/networks/base/withdraw")
        .json(&json!({"destination": "0x00000000000000000000000000000000000000aa"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["state"]["balance"], "0.000");
    let withdrawals = source.chain.withdrawals.lock().unwrap().clone();
    assert_eq!(withdrawals[0].1, "2.5");
}

#[tokio::test]
async fn test_concurrent_write_conflicts() {
    let (state, source) = test_state(Config::default());
    let gate = Arc::new(Semaphore::new(0));
    *source.chain.gate.lock().unwrap() = Some(gate.clone());

    let controller = state.controller("base").unwrap();
    let running = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.update_fee(FeeKind::Update, "0.1").await })
    };
    while controller.pending_operation() == crate::controller::PendingOperation::None {
        tokio::task::yield_now().await;
    }

    let server = test_server(state);
    let response = server
        .post("/networks/base/withdraw")
        .json(&json!({"destination": "0xdest", "amount": "0.1"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "BUSY");

    gate.add_permits(1);
    running.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_disconnected_wallet_conflicts() {
    let (state, source) = test_state(Config::default());
    source.chain.connected.store(false, Ordering::SeqCst);
    let server = test_server(state);

    let response = server
        .post("/networks/solana/fees")
        .json(&json!({"kind": "create", "fee": "0.1"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "WALLET_NOT_CONNECTED");

    let response = server.post("/networks/solana/connect").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["network"], "solana");
}

#[tokio::test]
async fn test_disconnect_clears_family_session() {
    let state = AppState::new(Config::default()).unwrap();
    let wallet = KeyMaterial::from_bytes([7u8; 32]).evm_wallet().unwrap();
    state.sessions.set_evm(wallet).await;
    let server = test_server(state);

    let connected = |networks: &[NetworkSummary], id: &str| {
        networks.iter().find(|n| n.id.as_str() == id).unwrap().connected
    };
    let networks: Vec<NetworkSummary> = server.get("/networks").await.json();
    assert!(connected(&networks, "base"));
    assert!(connected(&networks, "linea"));

    let response = server.post("/networks/base/disconnect").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: DisconnectResponse = response.json();
    assert_eq!(body.network.as_str(), "base");
    assert!(!body.connected);

    // Sessions are per family, so every EVM network drops together
    let networks: Vec<NetworkSummary> = server.get("/networks").await.json();
    assert!(!connected(&networks, "base"));
    assert!(!connected(&networks, "linea"));

    let response = server.post("/networks/polygon/disconnect").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_chain_failure_is_bad_gateway() {
    let (state, source) = test_state(Config::default());
    source.chain.fail_writes.store(true, Ordering::SeqCst);
    let server = test_server(state);

    let response = server
        .post("/networks/ton/fees")
        .json(&json!({"kind": "create", "fee": "0.05"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_ip_allowlist() {
    let config = Config {
        security: SecurityConfig {
            allowed_ips: vec!["10.0.0.1".to_string()],
            ..SecurityConfig::default()
        },
        ..Config::default()
    };
    let (state, _) = test_state(config);
    let server = test_server(state);

    let response = server.get("/networks").await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["code"], "FORBIDDEN");

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

fn forwarded_for(ip: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-forwarded-for"),
        HeaderValue::from_static(ip),
    )
}

#[tokio::test]
async fn test_forwarded_header_from_untrusted_peer_is_ignored() {
    let config = Config {
        security: SecurityConfig {
            allowed_ips: vec!["10.0.0.1".to_string()],
            ..SecurityConfig::default()
        },
        ..Config::default()
    };
    let (state, source) = test_state(config);
    let server = test_server(state);

    let (name, value) = forwarded_for("10.0.0.1");
    let response = server
        .post("/networks/base/withdraw")
        .add_header(name, value)
        .json(&json!({"destination": "0x000000000000000000000000000000000000dEaD", "amount": "1"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert!(source.chain.withdrawals.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_trusted_proxy_forwards_client_ip() {
    let config = Config {
        security: SecurityConfig {
            allowed_ips: vec!["10.0.0.1".to_string()],
            trusted_proxies: vec!["127.0.0.1".to_string()],
            ..SecurityConfig::default()
        },
        ..Config::default()
    };
    let (state, _) = test_state(config);
    let server = test_server(state);

    let (name, value) = forwarded_for("10.0.0.1");
    let response = server.get("/networks").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // Without the header the proxy itself is not allowlisted
    let response = server.get("/networks").await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let (name, value) = forwarded_for("10.0.0.2");
    let response = server.get("/networks").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_bearer_token_required() {
    let config = Config {
        security: SecurityConfig {
            api_token: Some("admin-token".to_string()),
            ..SecurityConfig::default()
        },
        ..Config::default()
    };
    let (state, _) = test_state(config);
    let server = test_server(state);

    let response = server.get("/networks").await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .get("/networks")
        .authorization_bearer("wrong-token")
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .get("/networks")
        .authorization_bearer("admin-token")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers() {
    let (state, _) = test_state(Config::default());
    let server = test_server(state);

    let response = server.get("/health").await;
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(response.header("cache-control"), "no-store");
}
