use std::sync::Arc;
use tunewire_gateway::{
    ActivityPayload, AnnouncePayload, ChannelBroadcaster, ClientFrame, Dispatcher, PeerRef,
    ServerFrame, Target,
};

#[tokio::test]
async fn presence_flow_smoke() {
    let broadcaster = Arc::new(ChannelBroadcaster::new(64));
    let mut observer = broadcaster.subscribe();
    let dispatcher = Dispatcher::new(broadcaster.clone());

    // c1 announces u1
    dispatcher
        .handle_frame(
            "c1",
            ClientFrame::Announce(AnnouncePayload {
                user_id: "u1".to_string(),
            }),
        )
        .await;

    let announced = observer.recv().await.unwrap();
    assert_eq!(announced.target, Target::All);
    assert_eq!(
        announced.frame,
        ServerFrame::UserConnected(PeerRef::new("u1", "c1"))
    );

    let snapshot = observer.recv().await.unwrap();
    assert_eq!(
        snapshot.frame,
        ServerFrame::OnlineUsers(vec!["u1".to_string()])
    );

    let activity = observer.recv().await.unwrap();
    assert_eq!(
        activity.frame,
        ServerFrame::ActivityUpdate(ActivityPayload::idle("u1"))
    );

    // u1 starts playing
    dispatcher
        .handle_frame(
            "c1",
            ClientFrame::Activity(ActivityPayload::new(
                "u1",
                Some("Song A".to_string()),
                Some("s1".to_string()),
            )),
        )
        .await;

    let update = observer.recv().await.unwrap();
    assert_eq!(update.target, Target::All);
    assert_eq!(
        update.frame,
        ServerFrame::ActivityUpdate(ActivityPayload::new(
            "u1",
            Some("Song A".to_string()),
            Some("s1".to_string()),
        ))
    );

    // a late observer pulls the snapshot; answers are addressed to it only
    dispatcher.handle_frame("c2", ClientFrame::GetOnlineUsers).await;

    let pulled = observer.recv().await.unwrap();
    assert_eq!(pulled.target, Target::One("c2".to_string()));
    assert_eq!(
        pulled.frame,
        ServerFrame::OnlineUsers(vec!["u1".to_string()])
    );
    assert!(pulled.is_for("c2"));
    assert!(!pulled.is_for("c1"));

    let pulled_activity = observer.recv().await.unwrap();
    assert_eq!(pulled_activity.target, Target::One("c2".to_string()));

    // c1 drops; u1 goes offline and its activity resets to idle
    dispatcher.handle_disconnect("c1").await;

    let departed = observer.recv().await.unwrap();
    assert_eq!(
        departed.frame,
        ServerFrame::UserDisconnected(PeerRef::new("u1", "c1"))
    );
    let empty = observer.recv().await.unwrap();
    assert_eq!(empty.frame, ServerFrame::OnlineUsers(vec![]));
    let idle = observer.recv().await.unwrap();
    assert_eq!(
        idle.frame,
        ServerFrame::ActivityUpdate(ActivityPayload::idle("u1"))
    );

    assert!(dispatcher.online_users().await.is_empty());
}

#[tokio::test]
async fn wire_shapes_smoke() {
    let frame: ClientFrame = serde_json::from_str(
        r#"{"event":"user-activity","payload":{"userId":"u1","songTitle":"Song A","songId":"s1"}}"#,
    )
    .unwrap();
    assert!(matches!(frame, ClientFrame::Activity(_)));

    let out = ServerFrame::OnlineUsers(vec!["u1".to_string(), "u2".to_string()]);
    assert_eq!(
        serde_json::to_string(&out).unwrap(),
        r#"{"event":"online-users","payload":["u1","u2"]}"#
    );
}
