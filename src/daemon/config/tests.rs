use super::*;

#[test]
fn expand_path_resolves_tilde_against_home() {
    let home = dirs::home_dir().expect("test environment has a home dir");
    let expanded = expand_path("~/.agentnet");
    assert_eq!(expanded, home.join(".agentnet"));
}

#[test]
fn expand_path_leaves_absolute_paths_alone() {
    let expanded = expand_path("/var/lib/agentnet");
    assert_eq!(expanded, PathBuf::from("/var/lib/agentnet"));
}

#[test]
fn derived_paths_live_under_data_dir() {
    let config = Config {
        relay_url: DEFAULT_RELAY.to_string(),
        agent_name: String::new(),
        data_dir: PathBuf::from("/tmp/agentnet-test"),
        api_listen: DEFAULT_API_LISTEN.parse().unwrap(),
        api_token_override: None,
    };
    assert_eq!(config.key_path(), PathBuf::from("/tmp/agentnet-test/agent.key"));
    assert_eq!(config.token_path(), PathBuf::from("/tmp/agentnet-test/api.token"));
    assert_eq!(config.pid_path(), PathBuf::from("/tmp/agentnet-test/daemon.pid"));
}
