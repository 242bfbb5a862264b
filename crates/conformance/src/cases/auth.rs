//! Login, identity lookup and signup

use chrono::{DateTime, Utc};
use serde_json::json;

use super::Context;
use crate::client::Request;
use crate::session::Identity;

pub async fn run(ctx: &mut Context) {
    for identity in Identity::ALL {
        login(ctx, identity).await;
    }
    invalid_login(ctx).await;

    auth_me(ctx, Identity::Admin, "Admin Auth Me").await;
    auth_me(ctx, Identity::UserA, "User Auth Me").await;
    auth_me_idempotent(ctx).await;
    ctx.expect_denied("Auth Me Unauthorized", Request::get("auth/me"))
        .await;

    signup(ctx).await;
    duplicate_signup(ctx).await;
    repeated_signup(ctx).await;
}

/// Email that no previous run can have registered
pub fn unique_signup_email(now: DateTime<Utc>) -> String {
    format!("testuser_{}@example.com", now.timestamp_millis())
}

async fn login(ctx: &mut Context, identity: Identity) {
    let case = format!("{} Login", identity.label());
    let credential = identity.credential(&ctx.config.credentials).clone();

    let response = ctx
        .client
        .send(&Request::post("auth/login").json(json!({
            "email": credential.email,
            "password": credential.password,
        })))
        .await;

    let token = response
        .str_at("/token")
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    let role = response.str_at("/user/role").unwrap_or("N/A").to_string();

    let Some(token) = token.filter(|_| response.success) else {
        ctx.log.record(
            &case,
            false,
            format!("Login failed ({}): {}", response.status, response.body_text()),
        );
        return;
    };

    ctx.session.set_token(identity, token);
    let expected = identity.expected_role();
    ctx.log.record(
        &case,
        role == expected,
        if role == expected {
            format!("Logged in successfully. Role: {}", role)
        } else {
            format!("Logged in with role '{}', expected '{}'", role, expected)
        },
    );
}

async fn invalid_login(ctx: &mut Context) {
    let response = ctx
        .client
        .send(&Request::post("auth/login").json(json!({
            "email": "invalid@test.com",
            "password": "wrong",
        })))
        .await;

    let rejected = super::is_denied(&response) && !response.has_key("token");
    ctx.log.record(
        "Invalid Login",
        rejected,
        if rejected {
            format!("Correctly rejected invalid credentials: {}", response.body_text())
        } else {
            format!(
                "Expected 401 without token, got {}: {}",
                response.status,
                response.body_text()
            )
        },
    );
}

async fn auth_me(ctx: &mut Context, identity: Identity, case: &str) {
    let Some(token) = ctx.require_token(identity, case) else {
        return;
    };

    let response = ctx.client.get("auth/me", Some(&token)).await;
    let role = response.str_at("/user/role");
    ctx.log.record(
        case,
        response.success && role == Some(identity.expected_role()),
        format!(
            "User data retrieved: {} (role {})",
            response.str_at("/user/email").unwrap_or("N/A"),
            role.unwrap_or("N/A")
        ),
    );
}

/// Same token, same answer
async fn auth_me_idempotent(ctx: &mut Context) {
    let case = "Auth Me Idempotent";
    let Some(token) = ctx.require_token(Identity::UserA, case) else {
        return;
    };

    let first = ctx.client.get("auth/me", Some(&token)).await;
    let second = ctx.client.get("auth/me", Some(&token)).await;
    let first_role = first.str_at("/user/role");
    let second_role = second.str_at("/user/role");

    ctx.log.record(
        case,
        first.success && second.success && first_role.is_some() && first_role == second_role,
        format!(
            "Roles across calls: {} / {}",
            first_role.unwrap_or("N/A"),
            second_role.unwrap_or("N/A")
        ),
    );
}

async fn signup(ctx: &mut Context) {
    let email = unique_signup_email(Utc::now());
    let response = ctx
        .client
        .send(&Request::post("auth/signup").json(json!({
            "name": "Test User",
            "email": email,
            "password": "password123",
        })))
        .await;

    let has_token = response
        .str_at("/token")
        .map(|t| !t.is_empty())
        .unwrap_or(false);
    let ok = response.success && has_token;
    if ok {
        ctx.session.signup_email = Some(email);
    }
    ctx.log.record(
        "New User Signup",
        ok,
        format!(
            "New user signup: {}",
            response
                .str_at("/user/email")
                .map(str::to_string)
                .unwrap_or_else(|| response.body_text())
        ),
    );
}

async fn expect_conflict(ctx: &mut Context, case: &str, email: String) {
    let response = ctx
        .client
        .send(&Request::post("auth/signup").json(json!({
            "name": "Existing User",
            "email": email,
            "password": "password123",
        })))
        .await;

    let rejected = !response.success && response.is_status(409);
    ctx.log.record(
        case,
        rejected,
        if rejected {
            format!("Correctly rejected duplicate email: {}", response.body_text())
        } else {
            format!("Expected 409, got {}: {}", response.status, response.body_text())
        },
    );
}

/// Registering a pre-seeded email must conflict
async fn duplicate_signup(ctx: &mut Context) {
    let email = ctx.config.credentials.user_a.email.clone();
    expect_conflict(ctx, "Duplicate Signup", email).await;
}

/// The email this run just registered is taken now
async fn repeated_signup(ctx: &mut Context) {
    let case = "Repeated Signup";
    let Some(email) = ctx.require(ctx.session.signup_email.clone(), case, "signup email") else {
        return;
    };
    expect_conflict(ctx, case, email).await;
}
