use super::*;

fn test_config(dir: &Path) -> Config {
    Config {
        relay_url: "wss://relay.example/ws".to_string(),
        agent_name: String::new(),
        data_dir: dir.to_path_buf(),
        api_listen: "127.0.0.1:8420".parse().unwrap(),
        api_token_override: None,
    }
}

#[test]
fn bootstrap_generates_identity_and_token_on_first_run() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = Daemon::bootstrap(test_config(dir.path())).unwrap();

    assert!(dir.path().join("agent.key").exists());
    assert!(dir.path().join("api.token").exists());
    assert_eq!(daemon.token.len(), 64);
}

#[test]
fn bootstrap_reuses_identity_and_token_on_second_run() {
    let dir = tempfile::tempdir().unwrap();
    let first = Daemon::bootstrap(test_config(dir.path())).unwrap();
    let second = Daemon::bootstrap(test_config(dir.path())).unwrap();

    assert_eq!(first.token, second.token);
    assert_eq!(first.agent_id(), second.agent_id());
}

#[test]
fn agent_name_defaults_to_derived_id_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = Daemon::bootstrap(test_config(dir.path())).unwrap();

    let expected = format!("agent-{}", &daemon.agent_id()[..8]);
    assert_eq!(daemon.agent_name(), expected);
}

#[test]
fn agent_name_override_takes_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.agent_name = "custom-name".to_string();
    let daemon = Daemon::bootstrap(config).unwrap();

    assert_eq!(daemon.agent_name(), "custom-name");
}

#[tokio::test]
async fn intent_set_tracks_add_and_remove() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = Daemon::bootstrap(test_config(dir.path())).unwrap();

    daemon.add_intent("general").await;
    assert!(daemon.joined_intent.lock().await.contains("general"));

    daemon.remove_intent("general").await;
    assert!(!daemon.joined_intent.lock().await.contains("general"));
}

#[tokio::test]
async fn drain_messages_delegates_to_the_ring_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = Daemon::bootstrap(test_config(dir.path())).unwrap();

    daemon
        .ingest(IncomingMessage {
            room: "general".to_string(),
            from: "agent1".to_string(),
            from_name: None,
            text: "hi".to_string(),
            timestamp: 0,
        })
        .await;

    let drained = daemon.drain_messages(Some("general")).await;
    assert_eq!(drained.len(), 1);
    assert_eq!(daemon.drain_messages(None).await.len(), 0);
}
