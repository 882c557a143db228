//! `ragweed chat` — interactive chat within one session.

use std::io::{BufRead, Write};
use std::path::PathBuf;

pub async fn run(session: Option<String>, docs: Vec<PathBuf>) -> anyhow::Result<()> {
    let (agent, config) = super::build_agent(&docs).await?;
    let session_id = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    println!();
    println!("  ragweed — interactive chat");
    println!("  Model:    {}", config.model);
    println!("  Session:  {session_id}");
    println!("  Type 'exit' or 'quit' to leave.");
    println!();

    let stdin = std::io::stdin();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        match agent.submit_turn(&session_id, input).await {
            Ok(result) => {
                if !result.tools_used.is_empty() {
                    eprintln!("[tools: {}]", result.tools_used.join(", "));
                }
                println!("{}", result.final_output.as_deref().unwrap_or("(no answer)"));
            }
            Err(e) => {
                eprintln!("error: {e}");
            }
        }
        println!();
    }

    Ok(())
}
