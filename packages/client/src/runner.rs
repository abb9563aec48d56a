//! Client execution logic: terminal view over the connection hook.

use std::{
    io::Write,
    path::PathBuf,
    sync::{Arc, RwLock},
};

use kaiwa_shared::protocol::validate_username;
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionState, InputCommand, parse_input},
    error::ClientError,
    formatter::MessageFormatter,
    hook::{ConnectionHook, HookConfig, HookEvent},
    username::UsernameStore,
};

/// Client settings resolved from the command line
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url: String,
    /// Overrides and replaces the stored username
    pub username: Option<String>,
    pub username_file: PathBuf,
    pub auto_reconnect: bool,
}

/// Username shared with the readline thread for the prompt
type SharedUsername = Arc<RwLock<String>>;

fn current_username(username: &SharedUsername) -> String {
    username
        .read()
        .map(|name| name.clone())
        .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
}

fn set_username(username: &SharedUsername, new_name: &str) {
    let mut guard = username
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = new_name.to_string();
}

/// Redisplay the prompt after printing above it
fn redisplay_prompt(username: &str) {
    print!("{}> ", username);
    std::io::stdout().flush().ok();
}

/// Resolve the display name: CLI override (persisted) or the stored one
fn resolve_username(
    store: &UsernameStore,
    override_name: Option<&str>,
) -> Result<String, Box<dyn std::error::Error>> {
    match override_name {
        Some(name) => {
            validate_username(name)?;
            store.save(name)?;
            Ok(name.to_string())
        }
        None => Ok(store.load_or_init()?),
    }
}

/// Spawn a blocking thread for rustyline (synchronous readline)
fn spawn_readline(username: SharedUsername) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            let prompt = format!("{}> ", current_username(&username));
            match rl.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str()).ok();
                    }
                    if input_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
        // input_tx dropped here; the runner treats that as quit
    });

    input_rx
}

/// Run the terminal chat client until `/quit`, Ctrl+C or Ctrl+D
pub async fn run_client(config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = UsernameStore::new(&config.username_file);
    let username: SharedUsername = Arc::new(RwLock::new(resolve_username(
        &store,
        config.username.as_deref(),
    )?));

    let hook_config = HookConfig::new(config.url.clone()).with_auto_reconnect(config.auto_reconnect);
    let (mut hook, mut events) = ConnectionHook::connect(hook_config);

    println!(
        "\nYou are '{}'. Type messages and press Enter to send. /name <new> to rename, /quit to exit.\n",
        current_username(&username)
    );
    print!("{}", MessageFormatter::format_state(ConnectionState::Connecting));

    let mut input_rx = spawn_readline(username.clone());
    let mut result = Ok(());

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                match event {
                    HookEvent::StateChanged(state) => {
                        print!("{}", MessageFormatter::format_state(state));
                        if state == ConnectionState::Open && hook.messages().await.is_empty() {
                            print!("{}", MessageFormatter::format_empty_log());
                        }
                        if state == ConnectionState::Closed && !config.auto_reconnect {
                            result = Err(ClientError::ConnectionError("Connection closed".to_string()));
                            break;
                        }
                    }
                    HookEvent::MessageReceived(message) => {
                        print!("{}", MessageFormatter::format_chat_message(&message));
                    }
                    HookEvent::Error(error) => {
                        print!("{}", MessageFormatter::format_error(&error));
                    }
                }
                redisplay_prompt(&current_username(&username));
            }
            line = input_rx.recv() => {
                let Some(line) = line else {
                    break;
                };
                match parse_input(&line) {
                    InputCommand::Send(message) => {
                        let name = current_username(&username);
                        if let Err(e) = hook.submit_message(&name, &message).await {
                            tracing::debug!("Message not sent: {}", e);
                        }
                    }
                    InputCommand::Rename(new_name) => match validate_username(&new_name) {
                        Ok(()) => {
                            store.save(&new_name)?;
                            set_username(&username, &new_name);
                            print!("{}", MessageFormatter::format_username_changed(&new_name));
                            redisplay_prompt(&new_name);
                        }
                        Err(e) => {
                            print!("{}", MessageFormatter::format_error(&e.to_string()));
                            redisplay_prompt(&current_username(&username));
                        }
                    },
                    InputCommand::Quit => break,
                    InputCommand::Empty => {}
                }
            }
        }
    }

    hook.close().await;
    tracing::info!("Client session ended");
    result.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> UsernameStore {
        UsernameStore::new(
            std::env::temp_dir().join(format!("kaiwa-runner-{}", uuid::Uuid::new_v4())),
        )
    }

    #[test]
    fn test_resolve_username_override_is_persisted() {
        // テスト項目: コマンドラインで指定したユーザー名が保存される
        // given (前提条件):
        let store = create_test_store();
        store.save("old").unwrap();

        // when (操作):
        let username = resolve_username(&store, Some("alice")).unwrap();

        // then (期待する結果):
        assert_eq!(username, "alice");
        assert_eq!(store.load().unwrap(), Some("alice".to_string()));
        std::fs::remove_file(store.path()).ok();
    }

    #[test]
    fn test_resolve_username_uses_stored_name() {
        // テスト項目: 指定がない場合は保存済みのユーザー名を使う
        // given (前提条件):
        let store = create_test_store();
        store.save("bob").unwrap();

        // when (操作):
        let username = resolve_username(&store, None).unwrap();

        // then (期待する結果):
        assert_eq!(username, "bob");
        std::fs::remove_file(store.path()).ok();
    }

    #[test]
    fn test_resolve_username_rejects_invalid_override() {
        // テスト項目: 長すぎるユーザー名の指定はエラーになり、保存されない
        // given (前提条件):
        let store = create_test_store();

        // when (操作):
        let result = resolve_username(&store, Some(&"a".repeat(51)));

        // then (期待する結果):
        assert!(result.is_err());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_resolve_username_ignores_invalid_stored_name() {
        // テスト項目: 手で編集された不正なユーザー名ファイルでも送信可能な名前が使われる
        // given (前提条件):
        let store = create_test_store();
        std::fs::write(store.path(), "x".repeat(60)).unwrap();

        // when (操作):
        let username = resolve_username(&store, None).unwrap();

        // then (期待する結果):
        assert!(validate_username(&username).is_ok());
        assert_ne!(username, "x".repeat(60));
        std::fs::remove_file(store.path()).ok();
    }

    #[test]
    fn test_shared_username_update() {
        // テスト項目: 変更したユーザー名がプロンプト用の共有状態に反映される
        // given (前提条件):
        let username: SharedUsername = Arc::new(RwLock::new("alice".to_string()));

        // when (操作):
        set_username(&username, "bob");

        // then (期待する結果):
        assert_eq!(current_username(&username), "bob");
    }
}
