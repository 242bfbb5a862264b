//! Admin user management

use serde_json::Value;

use super::Context;
use crate::client::Request;
use crate::session::{entity_id, Identity};

pub async fn run(ctx: &mut Context) {
    list_users(ctx).await;
    get_user(ctx).await;

    if let Some(token) = ctx.require_token(Identity::UserA, "Get All Users (User)") {
        ctx.expect_denied("Get All Users (User)", Request::get("users").bearer(token))
            .await;
    }
    ctx.expect_denied("Get All Users (Unauthorized)", Request::get("users"))
        .await;
    get_user_as_user(ctx).await;
    get_user_anonymously(ctx).await;
}

async fn list_users(ctx: &mut Context) {
    let case = "Get All Users (Admin)";
    let Some(token) = ctx.require_token(Identity::Admin, case) else {
        return;
    };

    let response = ctx.client.get("users", Some(&token)).await;
    let users = match response.field("users").and_then(Value::as_array) {
        Some(users) if response.success => users,
        _ => {
            ctx.log.record(
                case,
                false,
                format!("Failed to get users: {}", response.body_text()),
            );
            return;
        }
    };

    ctx.session.user_id = users.first().and_then(|u| u.get("id")).and_then(entity_id);
    let min = ctx.config.expectations.min_users;
    ctx.log.record(
        case,
        users.len() >= min,
        format!("Admin retrieved {} users (expected at least {})", users.len(), min),
    );
}

async fn get_user(ctx: &mut Context) {
    let case = "Get Specific User (Admin)";
    let Some(token) = ctx.require_token(Identity::Admin, case) else {
        return;
    };
    let Some(user_id) = ctx.require(ctx.session.user_id.clone(), case, "user id") else {
        return;
    };

    let response = ctx
        .client
        .get(&format!("users/{}", user_id), Some(&token))
        .await;
    ctx.log.record(
        case,
        response.success && response.has_key("user"),
        format!(
            "Retrieved user details for: {}",
            response.str_at("/user/email").unwrap_or("unknown")
        ),
    );
}

/// Single-user lookup is as restricted as the listing
async fn get_user_as_user(ctx: &mut Context) {
    let case = "Get Specific User (User)";
    let Some(token) = ctx.require_token(Identity::UserA, case) else {
        return;
    };
    let Some(user_id) = ctx.require(ctx.session.user_id.clone(), case, "user id") else {
        return;
    };
    ctx.expect_denied(
        case,
        Request::get(format!("users/{}", user_id)).bearer(token),
    )
    .await;
}

async fn get_user_anonymously(ctx: &mut Context) {
    let case = "Get Specific User (Unauthorized)";
    let Some(user_id) = ctx.require(ctx.session.user_id.clone(), case, "user id") else {
        return;
    };
    ctx.expect_denied(case, Request::get(format!("users/{}", user_id)))
        .await;
}
