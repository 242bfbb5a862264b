//! Personalized dashboard for any signed-in identity

use serde_json::Value;

use super::Context;
use crate::client::Request;
use crate::session::Identity;

pub async fn run(ctx: &mut Context) {
    let user_enrollments = dashboard(ctx, Identity::UserA, "Get Dashboard (User)").await;
    dashboard(ctx, Identity::Admin, "Get Dashboard (Admin)").await;
    ctx.expect_denied("Get Dashboard (Unauthorized)", Request::get("dashboard"))
        .await;
    reflects_enrollment(ctx, user_enrollments);
}

/// Enrollment count on the dashboard, when it loaded
async fn dashboard(ctx: &mut Context, identity: Identity, case: &str) -> Option<usize> {
    let token = ctx.require_token(identity, case)?;
    let response = ctx.client.get("dashboard", Some(&token)).await;

    let enrollments = response.array_len("enrollments");
    let ok = response.success && enrollments.is_some();
    ctx.log.record(
        case,
        ok,
        if ok {
            format!(
                "Dashboard data: {} enrollments, {} recent activities",
                enrollments.unwrap_or(0),
                response
                    .field("activities")
                    .and_then(Value::as_array)
                    .map(Vec::len)
                    .unwrap_or(0)
            )
        } else {
            format!(
                "Expected an enrollments list, got {}: {}",
                response.status,
                response.body_text()
            )
        },
    );
    enrollments.filter(|_| ok)
}

/// A confirmed enrollment shows up on the enrolled user's dashboard
fn reflects_enrollment(ctx: &mut Context, user_enrollments: Option<usize>) {
    let case = "Dashboard Reflects Enrollment";
    if !ctx.session.enrolled {
        ctx.log.skip(case, "no confirmed enrollment");
        return;
    }
    let Some(count) = user_enrollments else {
        ctx.log.skip(case, "user dashboard unavailable");
        return;
    };
    ctx.log.record(
        case,
        count >= 1,
        format!("User dashboard lists {} enrollments", count),
    );
}
