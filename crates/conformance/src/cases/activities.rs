//! User-scoped activity log

use serde_json::json;

use super::Context;
use crate::client::Request;
use crate::session::Identity;

pub async fn run(ctx: &mut Context) {
    log_activity(ctx).await;
    ctx.expect_denied(
        "Log Activity (Unauthorized)",
        Request::post("activities").json(json!({ "action_type": "unauthorized" })),
    )
    .await;

    let user_count = list_activities(ctx, Identity::UserA, "Get Activities (User)").await;
    let admin_count = list_activities(ctx, Identity::Admin, "Get Activities (Admin)").await;
    activity_scope(ctx, user_count, admin_count);

    ctx.expect_denied("Get Activities (Unauthorized)", Request::get("activities"))
        .await;
}

async fn log_activity(ctx: &mut Context) {
    let case = "Log Activity (Authorized)";
    let Some(token) = ctx.require_token(Identity::UserA, case) else {
        return;
    };

    let response = ctx
        .client
        .send(
            &Request::post("activities")
                .json(json!({
                    "action_type": "test_action",
                    "details": { "description": "Test activity from conformance run" },
                    "metadata": { "source": "api_test", "device": "test" },
                }))
                .bearer(token),
        )
        .await;
    ctx.log.record(
        case,
        response.success,
        format!("Activity logged: {}", response.body_text()),
    );
}

/// Entry count visible to `identity`, when the listing succeeded
async fn list_activities(ctx: &mut Context, identity: Identity, case: &str) -> Option<usize> {
    let token = ctx.require_token(identity, case)?;
    let response = ctx
        .expect_key(case, Request::get("activities").bearer(token), "activities")
        .await;
    if response.success {
        response.array_len("activities")
    } else {
        None
    }
}

/// Admins see everyone's activities, so never fewer than a single user
fn activity_scope(ctx: &mut Context, user_count: Option<usize>, admin_count: Option<usize>) {
    let case = "Activities Scope";
    let (Some(user), Some(admin)) = (user_count, admin_count) else {
        ctx.log.skip(case, "activity counts unavailable");
        return;
    };
    ctx.log.record(
        case,
        admin >= user,
        format!("Admin sees {} activities, user sees {}", admin, user),
    );
}
