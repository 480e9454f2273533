use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hydrochill_gateway::broker::{PublishError, Publisher};
use hydrochill_gateway::persistence::{DocumentStore, SledStore};
use hydrochill_gateway::transport::{AppState, build_router, serve};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

#[derive(Default)]
struct RecordingPublisher {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, _topic: &str, payload: &str) -> Result<(), PublishError> {
        self.sent.lock().unwrap().push(payload.to_string());
        Ok(())
    }
}

async fn raw_request(addr: std::net::SocketAddr, method: &str, path: &str, body: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn gateway_end_to_end_over_tcp() {
    let store = Arc::new(SledStore::temporary().unwrap());
    let publisher = Arc::new(RecordingPublisher::default());
    let router = build_router(AppState {
        store: store.clone(),
        publisher: publisher.clone(),
        record: "cooler_status".to_string(),
        command_topic: "hydrochill/command".to_string(),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(serve(listener, router, async {
        let _ = stop_rx.await;
    }));

    let response = raw_request(addr, "POST", "/api/update", r#"{"waterTemp":6,"roomTemp":21}"#).await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains(r#"{"status":"success"}"#));

    let response = raw_request(addr, "POST", "/api/command", r#"{"type":"SET_TEMP","value":12}"#).await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains(r#"{"success":true}"#));

    let response = raw_request(addr, "POST", "/api/command", r#"{"type":"BOIL"}"#).await;
    assert!(response.starts_with("HTTP/1.1 400"), "{response}");
    assert!(response.contains(r#"{"error":"Invalid Command"}"#));

    let response = raw_request(addr, "GET", "/", "").await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");

    let stored = store.get("cooler_status").await.unwrap().unwrap();
    assert_eq!(stored["waterTemp"], 6);
    assert_eq!(*publisher.sent.lock().unwrap(), vec!["SET:12".to_string()]);

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
