//! Admin-only aggregate statistics

use serde_json::Value;

use super::Context;
use crate::client::Request;
use crate::session::Identity;

/// Keys every analytics payload must carry
pub const AGGREGATE_KEYS: [&str; 2] = ["totalUsers", "totalCourses"];

pub async fn run(ctx: &mut Context) {
    admin_analytics(ctx).await;
    if let Some(token) = ctx.require_token(Identity::UserA, "Get Analytics (User)") {
        ctx.expect_denied("Get Analytics (User)", Request::get("analytics").bearer(token))
            .await;
    }
    ctx.expect_denied("Get Analytics (Unauthorized)", Request::get("analytics"))
        .await;
}

async fn admin_analytics(ctx: &mut Context) {
    let case = "Get Analytics (Admin)";
    let Some(token) = ctx.require_token(Identity::Admin, case) else {
        return;
    };

    let response = ctx.client.get("analytics", Some(&token)).await;
    let missing: Vec<&str> = AGGREGATE_KEYS
        .into_iter()
        .filter(|key| !response.has_key(key))
        .collect();
    let total_users = response.field("totalUsers").and_then(Value::as_u64);
    let min_users = ctx.config.expectations.min_users;

    let (ok, message) = if !response.success {
        (
            false,
            format!("Analytics failed ({}): {}", response.status, response.body_text()),
        )
    } else if !missing.is_empty() {
        (false, format!("Missing aggregate keys: {}", missing.join(", ")))
    } else {
        let users = total_users.unwrap_or(0);
        (
            users >= min_users as u64,
            format!(
                "Analytics data retrieved: {} users, {} courses",
                users,
                response
                    .field("totalCourses")
                    .map(Value::to_string)
                    .unwrap_or_default()
            ),
        )
    };
    ctx.log.record_with_data(case, ok, message, response.body.clone());
}
