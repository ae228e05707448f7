//! End-to-end tests for the session feed over the stub broker.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use facilityhub_core::types::{RoomId, UserId};
use facilityhub_realtime::{topic, ConnectionManager, PresenceMap, UserFeature};
use facilityhub_sync::{ChatSynchronizer, NotificationAggregator, SessionFeed};

use crate::helpers::{
    broker_config, chat_message_json, eventually, notification_json, session, test_room,
    BrokerEvent, FakeChatApi, FakeNotificationApi, StubBroker,
};

struct Harness {
    broker: StubBroker,
    feed: SessionFeed,
    notification_api: Arc<FakeNotificationApi>,
    chat_api: Arc<FakeChatApi>,
    notifications: Arc<NotificationAggregator>,
    chat: Arc<ChatSynchronizer>,
    presence: Arc<PresenceMap>,
}

/// Starts a stub broker and attaches a feed for user 7, waiting until all
/// seven standing subscriptions are in place.
async fn attach(user_id: i64) -> Harness {
    let broker = StubBroker::start().await;
    let manager = ConnectionManager::new(broker_config(&broker.endpoint));
    let connection = Arc::new(manager.open(&session(user_id)).await.unwrap());

    let notification_api = Arc::new(FakeNotificationApi::default());
    let chat_api = Arc::new(FakeChatApi::default());
    chat_api.private_rooms.lock().unwrap().push(test_room(1));

    let notifications = Arc::new(NotificationAggregator::new(
        notification_api.clone() as Arc<dyn facilityhub_api::NotificationApi>
    ));
    let chat = Arc::new(ChatSynchronizer::new(
        chat_api.clone() as Arc<dyn facilityhub_api::ChatApi>,
        20,
    ));
    let presence = Arc::new(PresenceMap::new());

    let feed = SessionFeed::attach(
        connection,
        notifications.clone(),
        chat.clone(),
        presence.clone(),
        session(user_id),
    )
    .await
    .unwrap();

    broker.wait_for_subscriptions(7).await;

    Harness {
        broker,
        feed,
        notification_api,
        chat_api,
        notifications,
        chat,
        presence,
    }
}

#[tokio::test]
async fn test_attach_subscribes_all_topics_and_announces_online() {
    let broker = StubBroker::start().await;
    let manager = ConnectionManager::new(broker_config(&broker.endpoint));
    let connection = Arc::new(manager.open(&session(7)).await.unwrap());

    let feed = SessionFeed::attach(
        connection,
        Arc::new(NotificationAggregator::new(
            Arc::new(FakeNotificationApi::default()) as _,
        )),
        Arc::new(ChatSynchronizer::new(
            Arc::new(FakeChatApi::default()) as _,
            20,
        )),
        Arc::new(PresenceMap::new()),
        session(7),
    )
    .await
    .unwrap();

    let subs = broker.wait_for_subscriptions(7).await;
    let destinations: Vec<_> = subs.iter().map(|(_, d)| d.as_str()).collect();
    assert!(destinations.contains(&"/topic/user-status"));
    for feature in UserFeature::ALL {
        let path = topic::for_user(feature, UserId::new(7));
        assert!(destinations.contains(&path.as_str()), "missing {path}");
    }

    let event = broker
        .wait_for(|e| matches!(e, BrokerEvent::Send { .. }))
        .await;
    let BrokerEvent::Send { body, .. } = event else {
        unreachable!();
    };
    assert_eq!(body, r#"{"userId":7,"status":"online"}"#);

    feed.shutdown().await;
}

#[tokio::test]
async fn test_notification_push_appends_and_triggers_refetch() {
    let h = attach(7).await;

    let fetches_before = h.notification_api.fetches.load(Ordering::SeqCst);
    let rooms_before = h.chat_api.room_fetches.load(Ordering::SeqCst);

    let dest = topic::for_user(UserFeature::PaymentNotifications, UserId::new(7));
    h.broker
        .push(&dest, &notification_json(42, 7, r#"{"paymentStatus":"UNPAID"}"#));

    // The push lands in the held list immediately; the broad refetch then
    // replaces it with the server snapshot (empty here) and re-pulls rooms.
    eventually(|| async {
        h.notification_api.fetches.load(Ordering::SeqCst) > fetches_before
            && h.chat_api.room_fetches.load(Ordering::SeqCst) > rooms_before
    })
    .await;

    h.feed.shutdown().await;
}

#[tokio::test]
async fn test_presence_event_merges_into_map() {
    let h = attach(7).await;

    h.broker
        .push(&topic::user_status(), r#"{"userId":33,"status":"online"}"#);

    eventually(|| async { h.presence.is_online(UserId::new(33)) }).await;
    assert!(!h.presence.is_online(UserId::new(34)));

    h.feed.shutdown().await;
}

#[tokio::test]
async fn test_direct_message_lands_in_inbox() {
    let h = attach(7).await;

    let dest = topic::for_user(UserFeature::Messages, UserId::new(7));
    h.broker.push(&dest, &chat_message_json(9, 1, 3, "hello"));

    eventually(|| async { h.feed.inbox().await.len() == 1 }).await;
    assert_eq!(h.feed.inbox().await[0].body, "hello");

    h.feed.shutdown().await;
}

#[tokio::test]
async fn test_room_switch_moves_the_room_subscription() {
    let h = attach(7).await;

    h.feed.open_room(RoomId::new(1)).await.unwrap();
    let first = h
        .broker
        .wait_for(|e| {
            matches!(e, BrokerEvent::Subscribe { destination, .. }
                if destination == "/topic/messages/room/1")
        })
        .await;
    let BrokerEvent::Subscribe { id: first_id, .. } = first else {
        unreachable!();
    };

    h.feed.open_room(RoomId::new(2)).await.unwrap();
    let unsubscribed = h
        .broker
        .wait_for(|e| matches!(e, BrokerEvent::Unsubscribe { .. }))
        .await;
    assert_eq!(unsubscribed, BrokerEvent::Unsubscribe { id: first_id });
    h.broker
        .wait_for(|e| {
            matches!(e, BrokerEvent::Subscribe { destination, .. }
                if destination == "/topic/messages/room/2")
        })
        .await;

    // A push on the new room reaches the synchronizer's push buffer.
    h.broker
        .push("/topic/messages/room/2", &chat_message_json(10, 2, 3, "hi"));
    eventually(|| async { h.chat.pushed().await.len() == 1 }).await;

    h.feed.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_announces_offline() {
    let h = attach(7).await;

    // Drain the online announcement from attach.
    h.broker
        .wait_for(|e| matches!(e, BrokerEvent::Send { .. }))
        .await;

    h.feed.shutdown().await;

    let event = h
        .broker
        .wait_for(|e| matches!(e, BrokerEvent::Send { .. }))
        .await;
    let BrokerEvent::Send { body, .. } = event else {
        unreachable!();
    };
    assert!(body.contains(r#""status":"offline""#));
    assert_eq!(h.notifications.snapshot().await.len(), 0);
}
