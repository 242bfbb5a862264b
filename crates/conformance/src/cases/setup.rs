//! Readiness check and seed data

use serde_json::Value;

use super::Context;
use crate::client::Request;

pub async fn run(ctx: &mut Context) {
    setup_check(ctx).await;
    seed_data(ctx).await;
}

async fn setup_check(ctx: &mut Context) {
    let response = ctx.client.send(&Request::get("setup/check")).await;
    let ready = response.field("setup").and_then(Value::as_bool).unwrap_or(false);
    ctx.log.record_with_data(
        "Setup Check",
        response.success && ready,
        format!("Setup status: {}", response.body_text()),
        response.body.clone(),
    );
}

/// Seeding twice must not fail; "already exists" is a success response.
async fn seed_data(ctx: &mut Context) {
    let response = ctx.client.send(&Request::post("setup/seed")).await;
    let detail = response
        .str_at("/message")
        .map(str::to_string)
        .unwrap_or_else(|| response.body_text());
    ctx.log.record(
        "Seed Data",
        response.success,
        format!("Seed result: {}", detail),
    );
}
