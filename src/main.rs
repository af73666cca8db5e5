use anyhow::{Context, Result};
use clap::Parser; // for cli
use std::path::Path;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use pylearn_client::AppState;
use pylearn_client::config::{Args, ClientConfig, Command};
use pylearn_client::handlers::{self, ChatOutcome, LoginForm, ProfileCard, RegisterForm};
use pylearn_client::highlight::{Theme, render_ansi};
use pylearn_client::lint::{check_python, complete};
use pylearn_client::metrics;
use pylearn_client::surface::{Body, ChatMessage, ChatView, OutputSurface, Role};

// terminal pane: every write is printed as-is
struct TerminalSurface;

impl OutputSurface for TerminalSurface {
    fn write(&mut self, text: &str) {
        println!("{}", text);
    }

    fn clear(&mut self) {
        print!("\x1b[2J\x1b[H");
    }
}

struct TerminalChat;

impl ChatView for TerminalChat {
    fn append(&mut self, message: ChatMessage) {
        match (message.role, &message.body) {
            (Role::Assistant, Body::Html(html)) => println!("AI: {}", html),
            (Role::Error, _) => eprintln!("{}", message.content()),
            _ => println!("{}", message.content()),
        }
    }

    fn show_thinking(&mut self) {
        eprintln!("{}", handlers::THINKING);
    }

    fn hide_thinking(&mut self) {}

    fn set_input_enabled(&mut self, _enabled: bool) {}
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    // parse cli arguments
    let args = Args::parse();
    let config = ClientConfig::from(&args);

    // local-only commands, no session needed
    match &args.command {
        Command::Lint { file } => return lint(file),
        Command::Highlight { file } => {
            let source = read_source(file)?;
            print!("{}", render_ansi(&source, &Theme::dark_plus()));
            return Ok(ExitCode::SUCCESS);
        }
        Command::Complete { prefix } => {
            for item in complete(prefix.as_deref().unwrap_or("")) {
                println!("{:<16} {}", item.label, item.detail);
            }
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let state = AppState::new(&config).context("Failed to build HTTP client")?;
    info!(
        base_url = %config.base_url,
        identifier = state.identifier(),
        rate_limit = config.rate_limit,
        rate_window_ms = config.rate_window.as_millis() as u64,
        "session started"
    );

    let ok = match args.command {
        Command::Run { file } => {
            let code = read_source(&file)?;
            state.run_code(&code, &mut TerminalSurface).await.is_ok()
        }
        Command::Chat { message } => {
            let outcome = state.chat.send(&message.join(" "), &mut TerminalChat).await;
            outcome == ChatOutcome::Replied
        }
        Command::Login { email, password } => {
            let form = LoginForm { email, password };
            report(handlers::login(state.backend.as_ref(), &form).await)
        }
        Command::Register {
            email,
            username,
            password,
            confirm_password,
        } => {
            let form = RegisterForm {
                email,
                username,
                password,
                confirm_password,
            };
            report(handlers::register(state.backend.as_ref(), &form).await)
        }
        Command::Profile => show_profile(&state).await,
        Command::Repl => {
            repl(&state).await?;
            true
        }
        Command::Lint { .. } | Command::Highlight { .. } | Command::Complete { .. } => true,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn lint(path: &Path) -> Result<ExitCode> {
    let source = read_source(path)?;
    let diagnostics = check_python(&source);
    for d in &diagnostics {
        println!(
            "{}:{}:{}: {}",
            path.display(),
            d.start_line,
            d.start_column,
            d.message
        );
    }
    Ok(if diagnostics.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn report(result: Result<handlers::Redirect, handlers::AuthError>) -> bool {
    match result {
        Ok(handlers::Redirect(to)) => {
            println!("OK, continue at {}", to);
            true
        }
        Err(e) => {
            eprintln!("{}", e);
            false
        }
    }
}

async fn show_profile(state: &AppState) -> bool {
    match handlers::profile(state.backend.as_ref()).await {
        Ok(ProfileCard {
            username,
            email,
            tier,
            remaining_queries,
        }) => {
            println!("Username:   {}", username);
            println!("Email:      {}", email);
            println!("Tier:       {}", tier);
            println!("AI quota:   {}", remaining_queries);
            true
        }
        Err(e) => {
            eprintln!("{}", e);
            false
        }
    }
}

async fn repl(state: &AppState) -> Result<()> {
    let mut surface = TerminalSurface;
    let mut chat = TerminalChat;
    state.chat.open(&mut chat);
    println!("Commands: :run <file>  :chat <text>  :lint <file>  :clear  :profile  :metrics  :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match cmd {
            "" => {}
            ":quit" | ":q" => break,
            ":run" => match read_source(Path::new(rest)) {
                Ok(code) => {
                    let _ = state.run_code(&code, &mut surface).await;
                }
                Err(e) => eprintln!("{:#}", e),
            },
            ":lint" => {
                if let Err(e) = lint(Path::new(rest)) {
                    eprintln!("{:#}", e);
                }
            }
            ":chat" => {
                state.chat.send(rest, &mut chat).await;
            }
            ":clear" => surface.clear(),
            ":profile" => {
                show_profile(state).await;
            }
            ":metrics" => print!("{}", metrics::render()),
            // bare text goes to the assistant
            _ => {
                state.chat.send(line, &mut chat).await;
            }
        }
    }
    Ok(())
}
