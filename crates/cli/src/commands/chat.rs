//! `shuttlechat chat`: Interactive or single-message chat mode.

use shuttlechat_config::AppConfig;
use shuttlechat_core::context::SessionId;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

pub async fn run(message: Option<String>, session: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Greetings work without a key; anything grounded needs one
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  WARNING: No LLM API key configured.");
        eprintln!("  Set OPENAI_API_KEY or SHUTTLECHAT_API_KEY, or add api_key to:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
    }

    let state = shuttlechat_gateway::build_state(&config)?;
    let orchestrator = state.orchestrator.clone();
    let session_id = session.map(SessionId::from).unwrap_or_default();
    debug!(session = %session_id, model = orchestrator.model(), "Chat session ready");

    if let Some(msg) = message {
        let outcome = orchestrator.handle_turn(Some(session_id), &msg).await?;
        println!("{}", outcome.reply);
        eprintln!("  context: {}", serde_json::to_string(&outcome.context)?);
        return Ok(());
    }

    println!();
    println!("  shuttlechat — interactive mode");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", orchestrator.model());
    println!("  Session:   {session_id}");
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }
        if line.is_empty() {
            print!("  You > ");
            std::io::stdout().flush()?;
            continue;
        }

        match orchestrator.handle_turn(Some(session_id.clone()), line).await {
            Ok(outcome) => {
                println!();
                for reply_line in outcome.reply.lines() {
                    println!("  Assistant > {reply_line}");
                }
                let ctx = &outcome.context;
                println!(
                    "  [topic: {}, flight time: {}, destination: {}]",
                    ctx.last_topic.map_or("-", |t| t.as_str()),
                    ctx.flight_time.as_deref().unwrap_or("-"),
                    ctx.flight_destination.map_or("-", |d| d.as_str()),
                );
                println!();
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!("\n  Goodbye!");
    Ok(())
}
