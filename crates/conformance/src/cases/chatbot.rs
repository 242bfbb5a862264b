//! Learning assistant queries; the query history is admin-only

use serde_json::json;

use super::Context;
use crate::client::Request;
use crate::session::Identity;

pub async fn run(ctx: &mut Context) {
    ask(ctx).await;
    ctx.expect_denied(
        "Chatbot Query (Unauthorized)",
        Request::post("chatbot").json(json!({ "query": "Test query" })),
    )
    .await;

    if let Some(token) = ctx.require_token(Identity::Admin, "Get Chatbot Queries (Admin)") {
        ctx.expect_key(
            "Get Chatbot Queries (Admin)",
            Request::get("chatbot/queries").bearer(token),
            "queries",
        )
        .await;
    }
    if let Some(token) = ctx.require_token(Identity::UserA, "Get Chatbot Queries (User)") {
        ctx.expect_denied(
            "Get Chatbot Queries (User)",
            Request::get("chatbot/queries").bearer(token),
        )
        .await;
    }
    ctx.expect_denied(
        "Get Chatbot Queries (Unauthorized)",
        Request::get("chatbot/queries"),
    )
    .await;
}

async fn ask(ctx: &mut Context) {
    let case = "Chatbot Query (Authorized)";
    let Some(token) = ctx.require_token(Identity::UserA, case) else {
        return;
    };

    let response = ctx
        .client
        .send(
            &Request::post("chatbot")
                .json(json!({
                    "query": "What are the prerequisites for Python courses?",
                    "course_title": "Python for Beginners",
                }))
                .bearer(token),
        )
        .await;

    let answer = response.str_at("/response");
    ctx.log.record(
        case,
        response.success && response.has_key("response"),
        match answer {
            Some(text) if response.success => {
                format!("Chatbot response received: {}...", preview(text, 50))
            }
            _ => format!("No chatbot response: {}", response.body_text()),
        },
    );
}

/// First `max` characters of `text`
fn preview(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
