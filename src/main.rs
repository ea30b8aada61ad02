//! Codeius - 对话式编码助手
//!
//! 入口：初始化日志、创建 Agent，并运行逐行读取 stdin 的命令循环。

use std::path::PathBuf;

use anyhow::Context;
use codeius::{core::create_agent, observability, CodingAgent, ReplyOutcome};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const HELP: &str = "Commands:
  /models          list available models
  /switch <key>    switch to a model (e.g. /switch google_1)
  /history         show conversation history
  /clear           clear conversation history
  /usage           show token usage
  /help            show this help
  /exit            quit";

fn print_models(agent: &CodingAgent) {
    let current = agent.current_model().map(|m| m.key);
    let mut models: Vec<_> = agent.get_available_models().into_values().collect();
    models.sort_by_key(|m| m.index);
    println!("Available models:");
    for m in models {
        let marker = if current.as_deref() == Some(m.key.as_str()) {
            " [current]"
        } else {
            ""
        };
        println!("  {}: {} ({}){}", m.key, m.name, m.provider_kind.label(), marker);
    }
}

fn print_history(agent: &CodingAgent) {
    if agent.history().is_empty() {
        println!("No conversation history yet.");
        return;
    }
    for (i, m) in agent.history().iter().enumerate() {
        let preview: String = m.content.chars().take(100).collect();
        let ellipsis = if m.content.chars().count() > 100 { "..." } else { "" };
        println!("{:?} ({}): {}{}", m.role, i + 1, preview.trim(), ellipsis);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let mut agent = create_agent(config_path).context("Failed to create agent")?;

    println!("Codeius coding agent. Type /help for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/exit" | "exit" => break,
            "/help" => println!("{}", HELP),
            "/models" => print_models(&agent),
            "/history" => print_history(&agent),
            "/clear" => {
                agent.reset_history();
                println!("Conversation history cleared.");
            }
            "/usage" => {
                let (prompt, completion, total) = agent.token_usage();
                println!(
                    "Token usage: prompt={} completion={} total={}",
                    prompt, completion, total
                );
            }
            "/switch" => println!("Please specify a model. Use /models to see available models."),
            cmd if cmd.starts_with("/switch ") => {
                let key = cmd["/switch ".len()..].trim();
                println!("{}", agent.switch_model(key));
            }
            cmd if cmd.starts_with('/') => {
                println!("Unknown command: {}", cmd);
                println!("{}", HELP);
            }
            prompt => match agent.ask_detailed(prompt).await {
                Ok(reply) => {
                    println!("{}", reply.text);
                    if let ReplyOutcome::PlanFailed(reason) = &reply.outcome {
                        println!("(plan not executed: {}; earlier actions may already have taken effect)", reason);
                    }
                }
                Err(e) if e.is_exhausted() => {
                    println!("Error: {}. Try again or switch model with /switch.", e);
                }
                Err(e) => println!("Error: {}", e),
            },
        }
    }

    print_history(&agent);
    println!("Goodbye!");
    Ok(())
}
