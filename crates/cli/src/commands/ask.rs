//! `portcall ask` — one-shot message for manual testing.

use portcall_config::AppConfig;
use tracing::warn;

pub async fn run(
    message: String,
    user: Option<String>,
    chat: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let context = portcall_gateway::build_context(&config)?;

    let user_id = user.unwrap_or_else(|| config.agent.default_user_id.clone());

    let history = match &chat {
        Some(chat_id) => match context.history.chat_messages(chat_id).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(chat_id = %chat_id, error = %e, "Could not fetch chat history, continuing with empty history");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let reply = context.agent.generate(&user_id, &message, &history).await?;
    println!("{reply}");

    Ok(())
}
