use std::{io::Write, path::PathBuf};

use anyhow::Context;
use ledoc_api::{AnalysisId, AuthToken, Comment, CommentId, DocumentId, PermissionLevel, Sender};
use ledoc_client::ThreadView;
use ledoc_sync::{
    Analyzer, ApiClient, AuthContext, ClientConfig, CommentEvent, CommentForm, CommentView,
    ConversationPoller, Deletion, DocumentSession, FileTokenStore, SessionEvent,
};

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base URL of the API, eg. https://app.example.com
    #[structopt(short, long, env = "LEDOC_HOST")]
    host: String,

    /// Port the document sockets are served on
    #[structopt(long, env = "LEDOC_WS_PORT", default_value = "8000")]
    ws_port: u16,

    /// Where the token saved by `login` lives
    #[structopt(long, default_value = ".ledoc-token.json")]
    token_file: PathBuf,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Remember a bearer token for the next commands
    Login { token: String },

    /// Forget the remembered token
    Logout,

    /// List the comments of a document
    Comments {
        document: String,

        /// Comment to mark in the listing
        #[structopt(long)]
        highlight: Option<CommentId>,
    },

    /// Comment on a document
    Comment {
        document: String,
        content: String,

        #[structopt(long)]
        reply_to: Option<CommentId>,
    },

    /// List the versions of a document
    Versions { document: String },

    /// Delete a version of a document
    DeleteVersion {
        document: String,
        version: i64,

        /// Do not ask before deleting the last version, and the document with it
        #[structopt(long)]
        yes: bool,
    },

    /// Make a document reachable by link
    ShareLink {
        document: String,

        /// Let link holders edit, not only view
        #[structopt(long)]
        edit: bool,
    },

    /// Give a user access to a document
    Share {
        document: String,
        username: String,

        #[structopt(long)]
        edit: bool,
    },

    /// Remove a user's access to a document
    Revoke { document: String, username: String },

    /// List chat conversations
    Conversations {
        /// Keep refreshing the list until interrupted
        #[structopt(long)]
        watch: bool,
    },

    /// Follow a document's content changes and comments until interrupted
    Watch { document: String },

    /// Upload a document to get a summary and an analysis session
    Analyze { file: PathBuf },

    /// List past analysis sessions
    Analyses,

    /// Ask a question about an analyzed document
    Ask { session: String, question: String },
}

fn level(edit: bool) -> PermissionLevel {
    match edit {
        true => PermissionLevel::Edit,
        false => PermissionLevel::View,
    }
}

/// `LEDOC_TOKEN` wins over the token file
fn auth_context(token_file: PathBuf) -> anyhow::Result<AuthContext> {
    match std::env::var("LEDOC_TOKEN") {
        Ok(tok) => Ok(AuthContext::with_token(AuthToken(tok))),
        Err(_) => AuthContext::restore(Box::new(FileTokenStore::new(token_file))),
    }
}

fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    let _ = std::io::stdout().flush();
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

fn print_comments(comments: &[Comment], highlight: Option<&CommentId>, depth: usize) {
    for c in comments {
        let mark = match Some(&c.id) == highlight {
            true => '*',
            false => ' ',
        };
        println!(
            "{mark}{:indent$}[{}] {}: {}",
            "",
            c.id,
            c.user,
            c.content,
            indent = depth * 2
        );
        print_comments(&c.replies, highlight, depth + 1);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let mut config = ClientConfig::new(opt.host);
    config.ws_port = opt.ws_port;
    let endpoint = config.endpoint()?;
    let mut auth = auth_context(opt.token_file)?;
    let api = ApiClient::new(endpoint, &auth);

    match opt.cmd {
        Command::Login { token } => auth.login(AuthToken(token))?,
        Command::Logout => auth.logout()?,
        Command::Comments {
            document,
            highlight,
        } => {
            let comments = api
                .list_comments(&DocumentId(document))
                .await
                .context("fetching comments")?;
            match comments.is_empty() {
                true => println!("No comments."),
                false => print_comments(&comments, highlight.as_ref(), 0),
            }
        }
        Command::Comment {
            document,
            content,
            reply_to,
        } => {
            let document = DocumentId(document);
            let mut form = match reply_to {
                None => CommentForm::new(document),
                Some(parent) => CommentForm::reply(document, parent),
            };
            form.set_input(content);
            match form.submit(&api).await.context("posting comment")? {
                Some(c) => println!("posted comment {}", c.id),
                None => println!("nothing to post"),
            }
        }
        Command::Versions { document } => {
            let (session, _) =
                DocumentSession::open(config, api, DocumentId(document), None)
                    .await
                    .context("fetching document")?;
            println!("{}", session.title());
            for v in session.versions().versions() {
                let created = v
                    .created_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default();
                println!("  version {} {created}", v.version_number);
            }
        }
        Command::DeleteVersion {
            document,
            version,
            yes,
        } => {
            let (mut session, _) =
                DocumentSession::open(config, api, DocumentId(document), None)
                    .await
                    .context("fetching document")?;
            let res = session
                .delete_version(version, || {
                    yes || confirm(
                        "This is the only version of the document. Deleting it will delete the \
                         entire document. Are you sure you want to proceed?",
                    )
                })
                .await
                .context("deleting version")?;
            match res {
                Deletion::Deleted => println!("deleted version {version}"),
                Deletion::DocumentDeleted => println!("deleted version {version} and the document"),
                Deletion::Cancelled => println!("deletion cancelled"),
            }
        }
        Command::ShareLink { document, edit } => {
            let url = api
                .generate_share_link(&ledoc_api::ShareLinkRequest {
                    document_id: DocumentId(document),
                    permission_level: level(edit),
                })
                .await
                .context("generating share link")?;
            println!("{url}");
        }
        Command::Share {
            document,
            username,
            edit,
        } => {
            let (mut session, _) =
                DocumentSession::open(config, api, DocumentId(document), None)
                    .await
                    .context("fetching document")?;
            session
                .share_with_user(username, Some(level(edit)))
                .await
                .context("sharing document")?;
            for u in session.shared_with() {
                println!("{} ({:?})", u.username, u.permission_level);
            }
        }
        Command::Revoke { document, username } => {
            let (mut session, _) =
                DocumentSession::open(config, api, DocumentId(document), None)
                    .await
                    .context("fetching document")?;
            session
                .share_with_user(username, None)
                .await
                .context("revoking access")?;
        }
        Command::Conversations { watch } => {
            let mut poller = ConversationPoller::new(api, config.poll_interval);
            loop {
                tokio::select! {
                    res = poller.next() => match res {
                        Ok(list) => {
                            for c in list {
                                let with = [&c.client, &c.lawyer]
                                    .into_iter()
                                    .flatten()
                                    .map(|p| p.username.as_str())
                                    .collect::<Vec<_>>()
                                    .join(" / ");
                                let last = c
                                    .last_message
                                    .as_ref()
                                    .map(|m| m.content.as_str())
                                    .unwrap_or("");
                                println!("#{} {with} ({} unread) {last}", c.id, c.unread_count);
                            }
                        }
                        Err(err) if !watch => return Err(err).context("listing conversations"),
                        Err(err) => eprintln!("Failed to refresh conversations: {err}"),
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
                if !watch {
                    break;
                }
            }
        }
        Command::Watch { document } => {
            let document = DocumentId(document);
            let mut comments =
                CommentView::open(&config, api.clone(), document.clone(), None).await;
            if let ThreadView::Error(e) = comments.view() {
                eprintln!("{e}");
            }
            let (mut session, _) = DocumentSession::open(config, api, document, None)
                .await
                .context("fetching document")?;
            println!("{}", session.content());
            let mut comments_open = true;
            loop {
                tokio::select! {
                    e = session.next_event() => match e {
                        None => break,
                        Some(SessionEvent::RemoteEdit) => println!("{}", session.content()),
                        Some(e) => tracing::info!(?e, "document event"),
                    },
                    e = comments.next_event(), if comments_open => match e {
                        Some(CommentEvent::Added(id)) => {
                            if let Some(c) = comments.thread().find(&id) {
                                println!("new comment by {}: {}", c.user, c.content);
                            }
                        }
                        Some(e) => tracing::info!(?e, "comment event"),
                        None => comments_open = false,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            session.close();
            comments.close();
        }
        Command::Analyze { file } => {
            let data = std::fs::read(&file).with_context(|| format!("reading {file:?}"))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| String::from("document"));
            let mut analyzer = Analyzer::new(api);
            analyzer
                .upload(&file_name, data)
                .await
                .context("uploading document")?;
            if let Some(id) = analyzer.id() {
                println!("session {id}");
            }
            println!("{}", analyzer.summary());
        }
        Command::Analyses => {
            let mut analyzer = Analyzer::new(api);
            analyzer
                .refresh_sessions()
                .await
                .context("listing analysis sessions")?;
            for s in analyzer.sessions() {
                println!("{} {}", s.id, s.label());
            }
        }
        Command::Ask { session, question } => {
            let mut analyzer = Analyzer::new(api);
            analyzer
                .open_session(AnalysisId(session))
                .await
                .context("loading analysis session")?;
            for m in analyzer.history() {
                let who = match m.sender {
                    Sender::User => "you",
                    Sender::Bot => "assistant",
                };
                println!("{who}: {}", m.text);
            }
            match analyzer.send(&question).await.context("asking question")? {
                Some(answer) => println!("assistant: {answer}"),
                None => println!("nothing to ask"),
            }
        }
    }

    Ok(())
}
