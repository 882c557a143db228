//! `ragweed ask` — submit one message and print the answer.

use std::path::PathBuf;

pub async fn run(
    message: String,
    session: Option<String>,
    docs: Vec<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    if message.trim().is_empty() {
        anyhow::bail!("Message must be a non-empty string");
    }

    let (agent, _config) = super::build_agent(&docs).await?;
    let session_id = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let result = agent.submit_turn(&session_id, &message).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        match result.final_output {
            Some(answer) => println!("{answer}"),
            None => println!("(no final answer)"),
        }
        if !result.tools_used.is_empty() {
            eprintln!("[tools: {}]", result.tools_used.join(", "));
        }
    }

    Ok(())
}
