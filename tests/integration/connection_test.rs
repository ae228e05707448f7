//! Integration tests for the broker connection lifecycle.

use facilityhub_core::error::ErrorKind;
use facilityhub_entity::presence::PresenceStatus;
use facilityhub_realtime::{topic, ConnectionManager, ConnectionStatus, UserFeature};

use crate::helpers::{broker_config, session, BrokerEvent, StubBroker};

#[tokio::test]
async fn test_connect_subscribe_and_deliver_in_order() {
    let broker = StubBroker::start().await;
    let manager = ConnectionManager::new(broker_config(&broker.endpoint));

    let connection = manager.open(&session(7)).await.unwrap();
    assert_eq!(connection.status(), ConnectionStatus::Connected);

    let dest = topic::for_user(UserFeature::AdminNotifications, connection.user_id());
    let mut sub = connection.subscribe(dest.clone()).await.unwrap();
    broker.wait_for_subscriptions(1).await;

    broker.push(&dest, "first");
    broker.push(&dest, "second");

    assert_eq!(sub.receiver.recv().await.unwrap(), "first");
    assert_eq!(sub.receiver.recv().await.unwrap(), "second");

    connection.close().await;
}

#[tokio::test]
async fn test_one_connection_per_session() {
    let broker = StubBroker::start().await;
    let manager = ConnectionManager::new(broker_config(&broker.endpoint));

    let _connection = manager.open(&session(7)).await.unwrap();
    let err = manager.open(&session(7)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Internal);
}

#[tokio::test]
async fn test_connect_failure_is_an_error_not_a_panic() {
    // Nothing listens on this endpoint.
    let manager = ConnectionManager::new(broker_config("ws://127.0.0.1:9/ws"));

    let err = manager.open(&session(7)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Connection);
}

#[tokio::test]
async fn test_open_rejects_missing_user() {
    let broker = StubBroker::start().await;
    let manager = ConnectionManager::new(broker_config(&broker.endpoint));

    let err = manager.open(&session(0)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Connection);
}

#[tokio::test]
async fn test_publish_and_presence_announcement_reach_broker() {
    let broker = StubBroker::start().await;
    let manager = ConnectionManager::new(broker_config(&broker.endpoint));

    let connection = manager.open(&session(12)).await.unwrap();
    connection.announce(PresenceStatus::Online);

    let event = broker
        .wait_for(|e| matches!(e, BrokerEvent::Send { .. }))
        .await;
    let BrokerEvent::Send { destination, body } = event else {
        unreachable!();
    };
    assert_eq!(destination, topic::USER_STATUS_DESTINATION);
    assert_eq!(body, r#"{"userId":12,"status":"online"}"#);
}

#[tokio::test]
async fn test_close_announces_offline_then_disconnects() {
    let broker = StubBroker::start().await;
    let manager = ConnectionManager::new(broker_config(&broker.endpoint));

    let connection = manager.open(&session(5)).await.unwrap();
    connection.close().await;

    let event = broker
        .wait_for(|e| matches!(e, BrokerEvent::Send { .. }))
        .await;
    let BrokerEvent::Send { body, .. } = event else {
        unreachable!();
    };
    assert!(body.contains(r#""status":"offline""#));

    broker
        .wait_for(|e| matches!(e, BrokerEvent::Disconnect))
        .await;
}

#[tokio::test]
async fn test_unsubscribe_ends_the_stream() {
    let broker = StubBroker::start().await;
    let manager = ConnectionManager::new(broker_config(&broker.endpoint));

    let connection = manager.open(&session(7)).await.unwrap();
    let mut sub = connection.subscribe("/topic/messages/7").await.unwrap();
    broker.wait_for_subscriptions(1).await;

    let id = sub.id.clone();
    connection.unsubscribe_id(&id).await;

    assert!(sub.receiver.recv().await.is_none());
    assert_eq!(connection.subscription_count(), 0);
}
