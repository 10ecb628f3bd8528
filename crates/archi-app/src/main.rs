use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;

use archi_client::api::ChatApi;
use archi_client::suggestions::SuggestionBoard;
use archi_client::view::{ChatView, Session, ViewState};
use archi_store::{DocumentStore, MemoryStore, RemoteStore, StoreConfig};
use archi_types::models::Message;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "archi=info".into()),
        )
        .init();

    if std::env::args().any(|arg| arg == "--offline") {
        info!("running against the in-memory store");
        run(MemoryStore::new()).await
    } else {
        let config = StoreConfig::from_env().context("store connection is not configured")?;
        info!("connecting to project {}", config.project_id);
        run(RemoteStore::new(&config)).await
    }
}

async fn run<S: DocumentStore>(store: S) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut view = ChatView::new(store);
    println!("Enter your username:");
    while view.state() == ViewState::AwaitingUsername {
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        if !view.submit_username(&line).await {
            println!("Please enter a username");
        }
    }

    let (api, session) = view.into_parts();
    let Some(session) = session else {
        return Ok(());
    };
    println!("Logged in as: {}", session.username);
    print_help();
    print_suggestions(&session.board);

    event_loop(api, session, &mut lines).await
}

/// One screen, one loop: redraw on every snapshot the feed delivers, and
/// translate input lines into data-access calls in between. Writes are
/// awaited inline; nothing is retried or cancelled.
async fn event_loop<S: DocumentStore>(
    api: ChatApi<S>,
    session: Session,
    lines: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<()> {
    let Session {
        username,
        mut feed,
        mut board,
    } = session;

    loop {
        tokio::select! {
            changed = feed.changed() => {
                if !changed {
                    info!("message feed closed");
                    break;
                }
                render_messages(feed.messages(), &username);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line) {
                    Command::Send(text) => api.send_message(text, &username).await,
                    Command::Suggest(text) => {
                        if let Some(suggestion) = api.add_suggestion(text).await {
                            board.push_pending(suggestion);
                        }
                        print_suggestions(&board);
                    }
                    Command::Suggestions => print_suggestions(&board),
                    Command::Drop(index) => {
                        match board.get(index).map(|s| s.id.clone()) {
                            Some(id) => {
                                if api.delete_suggestion(&id).await {
                                    board.remove(&id);
                                }
                            }
                            None => println!("no suggestion #{}", index + 1),
                        }
                        print_suggestions(&board);
                    }
                    Command::Quit => break,
                    Command::Nothing => {}
                }
            }
        }
    }
    Ok(())
}

enum Command<'a> {
    Send(&'a str),
    Suggest(&'a str),
    Suggestions,
    Drop(usize),
    Quit,
    Nothing,
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Command::Nothing;
    }
    if let Some(text) = line.strip_prefix("/suggest ") {
        return Command::Suggest(text);
    }
    match line {
        "/suggestions" => Command::Suggestions,
        "/suggest" => Command::Suggestions,
        "/quit" => Command::Quit,
        _ => {
            if let Some(n) = line.strip_prefix("/drop ") {
                return match n.trim().parse::<usize>() {
                    Ok(n) if n > 0 => Command::Drop(n - 1),
                    _ => Command::Nothing,
                };
            }
            if line.starts_with('/') {
                println!("unknown command: {}", line);
                return Command::Nothing;
            }
            Command::Send(line)
        }
    }
}

fn render_messages(messages: &[Message], username: &str) {
    println!("--- Archi ---");
    for msg in messages {
        if msg.sender == username {
            println!("> {}: {}", msg.sender, msg.text);
        } else {
            println!("  {}: {}", msg.sender, msg.text);
        }
    }
}

fn print_suggestions(board: &SuggestionBoard) {
    if board.is_empty() {
        println!("Suggestions: (none)");
        return;
    }
    println!("Suggestions:");
    for (i, suggestion) in board.entries().enumerate() {
        println!("  {}. {}", i + 1, suggestion.text);
    }
}

fn print_help() {
    println!("Type a message and press enter to send.");
    println!("/suggest <text>  add a suggestion");
    println!("/suggestions     list suggestions");
    println!("/drop <n>        delete suggestion n");
    println!("/quit            leave the chat");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_send() {
        assert!(matches!(parse_command("hello there"), Command::Send("hello there")));
    }

    #[test]
    fn drop_is_one_indexed() {
        assert!(matches!(parse_command("/drop 1"), Command::Drop(0)));
        assert!(matches!(parse_command("/drop 0"), Command::Nothing));
        assert!(matches!(parse_command("/drop x"), Command::Nothing));
    }

    #[test]
    fn blank_input_does_nothing() {
        assert!(matches!(parse_command("   "), Command::Nothing));
    }
}
