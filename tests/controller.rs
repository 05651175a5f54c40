//! End-to-end tests against an in-process fake controller.

use sigur_oif::{
    AccessPolicyRequest, AdminState, Client, ClientError, ConnectionConfig, DecisionResult,
    Direction, ErrorCode, ObjectInfo, PhysicalState, SessionState, W34Key,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const EMPLOYEES: &str = "OBJECTINFO EMP ID 1 NAME \"Petrov, Petr\" POSITION \"Head, security\" \
                         TABNUMBER \"001\", EMP ID 2 NAME \"Sidorova A.\" POSITION \"Clerk\" \
                         TABNUMBER \"002\", GUESTBADGE ID 10 NAME \"Visitor\" TABNUMBER \"\"";

/// Commands the fake controller has received, in order.
type Log = Arc<Mutex<Vec<String>>>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Canned controller answers.
fn respond(command: &str) -> Option<String> {
    let reply = match command {
        "LOGIN 1.8 sys secret" => "OK".to_string(),
        c if c.starts_with("LOGIN ") => "ERROR 11 Authentication failed".to_string(),
        "QUIT" => return None,
        "GETOBJECTINFO ALL" => EMPLOYEES.to_string(),
        "GETOBJECTINFO OBJECTID 1" => {
            "OBJECTINFO EMP ID 1 NAME \"Petrov, Petr\" POSITION \"Head, security\" TABNUMBER \"001\""
                .to_string()
        }
        "GETOBJECTINFO OBJECTID 99" => "OBJECTINFO".to_string(),
        "GETZONEINFO" => "ZONEINFO ID 0 NAME \"Outside\", ID 1 NAME \"Lobby\"".to_string(),
        "GETAPLIST" => "APLIST 1 2".to_string(),
        "GETAPINFO 1" => {
            "APINFO ID 1 NAME \"Turnstile\" ZONEA 0 ZONEB 1 STATE ONLINE_NORMAL CLOSED".to_string()
        }
        "GETAPINFO 2" => {
            "APINFO ID 2 NAME \"Back door\" ZONEA 1 ZONEB 0 STATE OFFLINE OFFLINE".to_string()
        }
        c if c.starts_with("GETAPINFO ") => "ERROR 10 Unknown access point".to_string(),
        c if c.starts_with("ACCESSPOLICY_REQUEST ") && c.contains(" EMPID 1 ") => {
            "ACCESSPOLICY_REPLY RESULT 255 EMPID 1 MASKVERPOLICY_OFF".to_string()
        }
        c if c.starts_with("ACCESSPOLICY_REQUEST ") => {
            "ACCESSPOLICY_REPLY RESULT 3 MASKVERPOLICY_OFF".to_string()
        }
        _ => "ERROR 2 Unknown command".to_string(),
    };
    Some(reply)
}

/// Starts a single-connection fake controller on an ephemeral port.
async fn spawn_controller() -> (SocketAddr, Log, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: Log = Arc::default();

    let seen = log.clone();
    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = socket.into_split();
        let mut lines = BufReader::new(read_half).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let command = line.trim_end_matches('\r').to_string();
            seen.lock().unwrap().push(command.clone());
            match respond(&command) {
                Some(reply) => {
                    let wire = format!("{}\r\n", reply);
                    if write_half.write_all(wire.as_bytes()).await.is_err() {
                        break;
                    }
                }
                None => break,
            }
        }
    });

    (addr, log, handle)
}

fn config(addr: SocketAddr) -> ConnectionConfig {
    ConnectionConfig::new(addr.ip().to_string())
        .with_port(addr.port())
        .with_read_timeout(Duration::from_secs(2))
        .with_credentials("sys", "secret")
}

#[tokio::test]
async fn test_full_session() {
    init_tracing();
    let (addr, log, server) = spawn_controller().await;

    let mut client = Client::connect(config(addr)).await.unwrap();
    assert_eq!(client.state(), SessionState::Authenticated);

    let objects = client.object_info_all().await.unwrap();
    assert!(objects.is_complete());
    assert_eq!(objects.records.len(), 3);
    match &objects.records[0] {
        ObjectInfo::Employee(emp) => {
            assert_eq!(emp.name, "Petrov, Petr");
            assert_eq!(emp.position, "Head, security");
        }
        other => panic!("expected employee, got {:?}", other),
    }
    assert!(matches!(objects.records[2], ObjectInfo::Guest(_)));

    assert!(client.object_info(1).await.unwrap().is_some());
    assert!(client.object_info(99).await.unwrap().is_none());

    let zones = client.zones().await.unwrap();
    assert_eq!(zones.records.len(), 2);
    assert_eq!(zones.records[1].name, "Lobby");

    let aps = client.access_points().await.unwrap();
    assert!(aps.is_complete());
    assert_eq!(aps.records.len(), 2);
    assert_eq!(aps.records[0].state_adm, AdminState::Normal);
    assert_eq!(aps.records[0].state_phys, PhysicalState::Closed);
    assert_eq!(aps.records[1].state_adm, AdminState::Offline);

    let err = client.access_point(7).await.unwrap_err();
    assert_eq!(err.server_code(), Some(ErrorCode::UnknownAccessPoint));
    assert_eq!(client.state(), SessionState::Authenticated);

    let granted = client.access_policy_for_employee(1, 1).await.unwrap();
    assert!(granted.is_granted());
    assert_eq!(granted.emp_id(), Some(1));

    let denied = client
        .access_policy(
            AccessPolicyRequest::for_key(2, W34Key::new(0x00A1_B2C3)).with_direction(Direction::Out),
        )
        .await
        .unwrap();
    assert_eq!(denied.result(), DecisionResult::UnknownIdentifier);

    client.quit().await.unwrap();
    assert_eq!(client.state(), SessionState::Closed);
    server.await.unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.first().map(String::as_str), Some("LOGIN 1.8 sys secret"));
    assert!(log.contains(&"GETAPINFO 2".to_string()));
    assert!(log
        .iter()
        .any(|c| c.contains("KEY W34 00A1B2C3 DIRECTION OUT APID 2")));
    assert_eq!(log.last().map(String::as_str), Some("QUIT"));
}

#[tokio::test]
async fn test_bad_credentials() {
    init_tracing();
    let (addr, _log, _server) = spawn_controller().await;

    let config = config(addr).with_credentials("sys", "wrong");
    let err = Client::connect(config).await.err().unwrap();
    assert_eq!(err.server_code(), Some(ErrorCode::AuthenticationFailed));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = Client::connect(config(addr)).await.err().unwrap();
    assert!(matches!(err, ClientError::Io(_)));
}

#[tokio::test]
async fn test_silent_controller_times_out() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        // Hold the socket open without answering.
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });

    let config = config(addr).with_read_timeout(Duration::from_millis(100));
    let err = Client::connect(config).await.err().unwrap();
    assert!(matches!(err, ClientError::Timeout(_)));
    assert!(err.is_retryable());
    server.abort();
}
