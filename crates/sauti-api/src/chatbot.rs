use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rand::Rng;
use tracing::warn;

use sauti_providers::ChatCompleter;
use sauti_types::api::{SupportChatRequest, SupportChatResponse};

use crate::auth::AppState;

/// South African support lines included in the system prompt and in the
/// degraded fallback reply.
const SUPPORT_RESOURCES: [(&str, &str); 6] = [
    ("GBV Helpline", "0800 428 428"),
    ("Police Emergency", "10111"),
    ("Childline SA", "0800 055 555"),
    ("Stop Gender Violence", "0800 150 150"),
    ("Lifeline SA", "0861 322 322"),
    ("SMS (hearing impaired)", "Send 'help' to 31531"),
];

const ENCOURAGEMENTS: [&str; 4] = [
    "You're showing strength just by reaching out.",
    "That sounds really difficult — I'm here to listen and support you.",
    "You don't deserve what's happening. You deserve to feel safe.",
    "I can tell this isn't easy to talk about. You're doing the right thing.",
];

/// POST /support-chatbot/ — a warm reply from the hosted model; any
/// failure degrades to a canned encouragement plus the helpline number
/// instead of surfacing an error. No retries.
pub async fn support_chat(
    State(state): State<AppState>,
    Json(req): Json<SupportChatRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let reply = match state.llm.complete_chat(&system_prompt(), &req.message).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("support chatbot call failed: {}", e);
            fallback_reply()
        }
    };

    Ok(Json(SupportChatResponse { reply }))
}

fn system_prompt() -> String {
    let helplines: Vec<String> = SUPPORT_RESOURCES
        .iter()
        .map(|(name, number)| format!("{}: {}", name, number))
        .collect();

    format!(
        "You are a warm, emotionally intelligent support assistant trained to help people \
         who may be experiencing abuse, trauma, or distress. \
         You are based in South Africa and understand the local context.\n\
         \n\
         Guidelines:\n\
         - Respond like a kind human being, not a robot.\n\
         - Be natural, empathetic, and conversational.\n\
         - If the message clearly mentions danger, violence, or abuse, \
           include one or two local helplines below at the END of your message.\n\
         - If the message is casual or non-emergency, just respond like a \
           normal person and do not mention helplines.\n\
         \n\
         South African Helplines:\n\
         {}",
        helplines.join(", ")
    )
}

/// Deterministic in shape: always an encouragement plus the GBV helpline.
pub(crate) fn fallback_reply() -> String {
    let idx = rand::rng().random_range(0..ENCOURAGEMENTS.len());
    format!(
        "{}\nIf you ever need urgent help, you can call {}.",
        ENCOURAGEMENTS[idx], SUPPORT_RESOURCES[0].1
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_always_includes_the_helpline() {
        for _ in 0..20 {
            let reply = fallback_reply();
            assert!(reply.contains("0800 428 428"), "{}", reply);
        }
    }

    #[test]
    fn prompt_lists_every_helpline() {
        let prompt = system_prompt();
        for (name, number) in SUPPORT_RESOURCES {
            assert!(prompt.contains(name));
            assert!(prompt.contains(number));
        }
    }
}
