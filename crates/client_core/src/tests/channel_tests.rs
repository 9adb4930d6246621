use super::*;
use axum::{
    extract::{ws::Message as WsMessage, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

type Seen = Arc<Mutex<mpsc::UnboundedSender<ChannelFrame>>>;

async fn ws_handler(ws: WebSocketUpgrade, State(seen): State<Seen>) -> impl IntoResponse {
    ws.on_upgrade(move |mut socket| async move {
        while let Some(Ok(msg)) = socket.recv().await {
            let WsMessage::Text(text) = msg else {
                continue;
            };
            let Ok(frame) = serde_json::from_str::<ChannelFrame>(&text) else {
                continue;
            };
            let subscribed = matches!(frame, ChannelFrame::Subscribe { .. });
            let _ = seen.lock().await.send(frame);
            if subscribed {
                let other = ChannelFrame::Message {
                    channel: "otro-canal".into(),
                    data: json!([1]),
                };
                let ours = ChannelFrame::Message {
                    channel: "participantes-ordenados".into(),
                    data: json!([{ "nombres": "A" }]),
                };
                for frame in [other, ours] {
                    let text = serde_json::to_string(&frame).expect("encode");
                    if socket.send(WsMessage::Text(text)).await.is_err() {
                        return;
                    }
                }
                let _ = socket.send(WsMessage::Text("[]".into())).await;
            }
        }
    })
}

async fn spawn_channel_server() -> (String, mpsc::UnboundedReceiver<ChannelFrame>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let router = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(Arc::new(Mutex::new(tx)));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    (format!("http://{addr}/ws"), rx)
}

#[test]
fn http_urls_map_to_websocket_schemes() {
    assert_eq!(
        channel_ws_url("http://localhost:3000/ws").expect("url").as_str(),
        "ws://localhost:3000/ws"
    );
    assert_eq!(
        channel_ws_url("https://camp.example/ws").expect("url").scheme(),
        "wss"
    );
    assert_eq!(
        channel_ws_url("wss://camp.example/ws").expect("url").scheme(),
        "wss"
    );
    assert!(channel_ws_url("ftp://camp.example").is_err());
}

#[test]
fn frames_for_other_channels_are_skipped() {
    let ours = serde_json::to_string(&ChannelFrame::Message {
        channel: "a".into(),
        data: json!({ "k": 1 }),
    })
    .expect("encode");
    let theirs = serde_json::to_string(&ChannelFrame::Message {
        channel: "b".into(),
        data: json!({ "k": 2 }),
    })
    .expect("encode");

    assert_eq!(route_frame("a", ours), Some(json!({ "k": 1 })));
    assert_eq!(route_frame("a", theirs), None);
    assert_eq!(
        route_frame("a", "[1,2]".into()),
        Some(Value::String("[1,2]".into()))
    );
}

#[tokio::test]
async fn subscription_delivers_payloads_and_unsubscribes_on_close() {
    let (url, mut seen) = spawn_channel_server().await;
    let mut subscription = ChannelSubscription::open(&url, "participantes-ordenados")
        .await
        .expect("open");
    assert_eq!(subscription.channel(), "participantes-ordenados");

    assert!(matches!(
        seen.recv().await,
        Some(ChannelFrame::Subscribe { channel }) if channel == "participantes-ordenados"
    ));

    let first = subscription.next_payload().await.expect("payload");
    assert_eq!(first, json!([{ "nombres": "A" }]));
    let second = subscription.next_payload().await.expect("raw payload");
    assert_eq!(second, Value::String("[]".into()));

    subscription.close().await;
    assert!(matches!(
        seen.recv().await,
        Some(ChannelFrame::Unsubscribe { channel }) if channel == "participantes-ordenados"
    ));
}

#[tokio::test]
async fn dropping_subscription_releases_channel() {
    let (url, mut seen) = spawn_channel_server().await;
    let subscription = ChannelSubscription::open(&url, "participantes-ordenados")
        .await
        .expect("open");
    assert!(matches!(seen.recv().await, Some(ChannelFrame::Subscribe { .. })));

    drop(subscription);
    assert!(matches!(
        seen.recv().await,
        Some(ChannelFrame::Unsubscribe { .. })
    ));
}
