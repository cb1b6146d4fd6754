//! Gateway-level expectations for admin gating: a rejected command produces
//! exactly one reply and no broadcast traffic.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bcast_core::{ChatRef, Event, Gateway, Payload, Result};
use bcast_engine::Engine;
use bcast_store::JsonStore;
use mockall::mock;
use tempfile::TempDir;

mock! {
    pub Gw {}

    #[async_trait]
    impl Gateway for Gw {
        async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
        async fn send_image(&self, chat_id: i64, image: &[u8], caption: &str) -> Result<()>;
        async fn send_text_and_return_id(&self, chat_id: i64, text: &str) -> Result<String>;
        async fn edit_text(&self, chat_id: i64, message_id: &str, text: &str) -> Result<()>;
    }
}

fn engine_with_admin_one(gateway: MockGw) -> (Arc<Engine>, TempDir) {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("admins.json"), "[\"1\"]").unwrap();
    let store = JsonStore::new(dir.path()).unwrap();
    let engine = Engine::new(
        store,
        Arc::new(gateway),
        Duration::ZERO,
        Duration::from_secs(60),
    );
    (engine, dir)
}

#[tokio::test]
async fn test_non_admin_broadcast_replies_once_and_sends_nothing_else() {
    let mut gateway = MockGw::new();
    // The only expected gateway call is the rejection reply. Any broadcast
    // traffic (progress message, group sends) would fail the mock.
    gateway
        .expect_send_text()
        .withf(|chat_id, text| *chat_id == 2 && text.contains("do not have permission"))
        .times(1)
        .returning(|_, _| Ok(()));

    let (engine, _dir) = engine_with_admin_one(gateway);
    assert!(!engine.is_admin(2).await);

    engine
        .handle_event(Event {
            user_id: 2,
            chat: ChatRef {
                id: 2,
                title: None,
                is_group: false,
            },
            payload: Payload::Text("/broadcast".to_string()),
        })
        .await
        .unwrap();

    assert!(!engine.broadcast_in_progress());
}

#[tokio::test]
async fn test_non_admin_stop_auto_does_not_touch_the_flag() {
    let mut gateway = MockGw::new();
    gateway
        .expect_send_text()
        .withf(|chat_id, text| *chat_id == 2 && text.contains("do not have permission"))
        .times(1)
        .returning(|_, _| Ok(()));

    let (engine, _dir) = engine_with_admin_one(gateway);

    engine
        .handle_event(Event {
            user_id: 2,
            chat: ChatRef {
                id: 2,
                title: None,
                is_group: false,
            },
            payload: Payload::Text("/stop_auto".to_string()),
        })
        .await
        .unwrap();

    assert!(!engine.auto_active());
}
