//! In-process relays for integration tests

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use shout_core::{Event, UnsignedEvent};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// How a test relay reacts to the first EVENT frame it receives
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// `["OK", id, true, ""]`, then close
    Accept,
    /// `["OK", id, false, reason]`, then close
    Reject(&'static str),
    /// Two matching acknowledgements with different details, then close
    AcceptTwice,
    /// Acknowledge a different id, then close
    WrongId,
    /// Send unrelated and malformed frames, then accept
    NoiseThenAccept,
    /// Close without replying
    CloseWithoutReply,
    /// Wait, then accept
    SlowAccept(Duration),
    /// Keep the connection open and never reply
    Silent,
    /// `["OK", id, true, ""]`, then wait for the client to close
    AcceptThenHold,
}

/// A relay listening on localhost
pub struct TestRelay {
    pub url: String,
    /// Number of EVENT frames received over the connection's lifetime
    pub frames: oneshot::Receiver<usize>,
    /// Whether the client sent a close frame before this relay closed
    pub client_closed: oneshot::Receiver<bool>,
}

pub async fn spawn_relay(behaviour: Behaviour) -> TestRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (frames_tx, frames_rx) = oneshot::channel();
    let (closed_tx, closed_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        let first = match ws.next().await {
            Some(Ok(Message::Text(text))) => text.to_string(),
            _ => return,
        };
        let frame: Value = serde_json::from_str(&first).unwrap();
        assert_eq!(frame[0], "EVENT");
        let id = frame[1]["id"].as_str().unwrap().to_string();

        let hold = matches!(behaviour, Behaviour::AcceptThenHold);
        let replies = match behaviour {
            Behaviour::Accept | Behaviour::AcceptThenHold => {
                vec![format!(r#"["OK","{}",true,""]"#, id)]
            }
            Behaviour::Reject(reason) => vec![format!(r#"["OK","{}",false,"{}"]"#, id, reason)],
            Behaviour::AcceptTwice => vec![
                format!(r#"["OK","{}",true,"first"]"#, id),
                format!(r#"["OK","{}",false,"second"]"#, id),
            ],
            Behaviour::WrongId => vec![r#"["OK","0000",true,""]"#.to_string()],
            Behaviour::NoiseThenAccept => vec![
                "}{".to_string(),
                r#"["NOTICE","rate limited"]"#.to_string(),
                format!(r#"["OK","{}"]"#, id),
                r#""OK""#.to_string(),
                format!(r#"["OK","{}",true,""]"#, id),
            ],
            Behaviour::CloseWithoutReply => Vec::new(),
            Behaviour::SlowAccept(delay) => {
                tokio::time::sleep(delay).await;
                vec![format!(r#"["OK","{}",true,""]"#, id)]
            }
            Behaviour::Silent => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Vec::new()
            }
        };

        for reply in replies {
            if ws.send(Message::text(reply)).await.is_err() {
                let _ = frames_tx.send(1);
                return;
            }
        }

        if !hold {
            let _ = ws.close(None).await;
        }

        let mut frames = 1;
        let mut client_closed = false;
        while let Some(Ok(message)) = ws.next().await {
            match message {
                Message::Text(_) => frames += 1,
                Message::Close(_) => client_closed = hold,
                _ => {}
            }
        }
        let _ = frames_tx.send(frames);
        let _ = closed_tx.send(client_closed);
    });

    TestRelay {
        url: format!("ws://{}", addr),
        frames: frames_rx,
        client_closed: closed_rx,
    }
}

/// An address nothing listens on
pub async fn refused_relay() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}", addr)
}

/// A correctly identified event with a placeholder signature
pub fn signed_event(content: &str) -> Event {
    let pubkey = "7e".repeat(32);
    let draft = UnsignedEvent {
        kind: 1314,
        created_at: 1_700_000_000,
        tags: Vec::new(),
        content: content.to_string(),
    };
    let id = draft.id_for(&pubkey).unwrap();
    draft.into_signed(pubkey, id, "5a".repeat(64))
}
