//! Integration tests for the TransactionManager service
//!
//! These tests run a real tonic server on an ephemeral port and talk to it
//! with the generated client.

use std::net::SocketAddr;
use tether_proto::transaction_manager_client::TransactionManagerClient;
use tether_proto::{Query, INSTANCE_ID_KEY};
use tether_server::{DisconnectPolicy, ServerConfig, TransactionService};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tonic::transport::Channel;

struct RunningServer {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), tether_server::ServerError>>,
}

impl RunningServer {
    async fn client(&self) -> TransactionManagerClient<Channel> {
        TransactionManagerClient::connect(format!("http://{}", self.addr))
            .await
            .expect("connect to test server")
    }

    async fn shutdown(self) {
        let _ = self.stop.send(());
        self.handle.await.unwrap().unwrap();
    }
}

/// Helper function to start a server on an ephemeral port
async fn start_server(service: TransactionService) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let handle = tokio::spawn(tether_server::serve_service(listener, service, async {
        let _ = stopped.await;
    }));

    RunningServer { addr, stop, handle }
}

#[tokio::test]
async fn test_threshold_three_over_the_wire() {
    let service = TransactionService::new(DisconnectPolicy::with_threshold(3).unwrap(), 10);
    let stats = service.stats();
    let server = start_server(service).await;
    let mut client = server.client().await;

    let mut replies = Vec::new();
    for id in 0..5 {
        let reply = client.start_transaction(Query { id }).await.unwrap();
        replies.push(reply.into_inner().disconnect);
    }

    assert_eq!(replies, vec![0, 0, 0, -1, -1]);
    assert_eq!(stats.snapshot().requests, 5);
    assert_eq!(stats.snapshot().disconnects, 2);

    server.shutdown().await;
}

#[tokio::test]
async fn test_instance_metadata_is_accepted() {
    let service = TransactionService::new(DisconnectPolicy::new(1, 20).unwrap(), 10);
    let server = start_server(service).await;
    let mut client = server.client().await;

    let mut request = tonic::Request::new(Query { id: 1 });
    request
        .metadata_mut()
        .insert(INSTANCE_ID_KEY, "client-1".parse().unwrap());

    let reply = client.start_transaction(request).await.unwrap();
    assert_eq!(reply.into_inner().disconnect, 20);

    server.shutdown().await;
}

#[tokio::test]
async fn test_new_session_restarts_sequence() {
    let service = TransactionService::new(DisconnectPolicy::with_threshold(2).unwrap(), 10);
    let server = start_server(service).await;

    let mut first = server.client().await;
    for id in 0..3 {
        first.start_transaction(Query { id }).await.unwrap();
    }
    drop(first);

    // A later session on the same server starts at zero again
    let mut second = server.client().await;
    let reply = second.start_transaction(Query { id: 0 }).await.unwrap();
    assert_eq!(reply.into_inner().disconnect, 0);

    server.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_callers_all_answered() {
    let service = TransactionService::new(DisconnectPolicy::with_threshold(50).unwrap(), 2);
    let stats = service.stats();
    let server = start_server(service).await;

    let mut tasks = Vec::new();
    for caller in 0..8i64 {
        let mut client = server.client().await;
        tasks.push(tokio::spawn(async move {
            for id in 0..5 {
                let reply = client.start_transaction(Query { id: caller * 10 + id }).await?;
                assert_eq!(reply.into_inner().disconnect, if caller * 10 + id >= 50 { -1 } else { 0 });
            }
            Ok::<_, tonic::Status>(())
        }));
    }

    for task in tasks {
        task.await.unwrap().unwrap();
    }
    assert_eq!(stats.snapshot().requests, 40);

    server.shutdown().await;
}

#[tokio::test]
async fn test_invalid_config_refuses_to_start() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let config = ServerConfig {
        max_concurrent_calls: 0,
        ..Default::default()
    };

    let result = tether_server::serve_listener(listener, config, async {}).await;
    assert!(matches!(
        result,
        Err(tether_server::ServerError::InvalidConfig(_))
    ));
}
