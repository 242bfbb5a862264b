//! Public course catalogue and enrollment

use serde_json::{json, Value};

use super::{is_already_done, Context};
use crate::client::Request;
use crate::session::{entity_id, Identity};

const ALREADY_ENROLLED_CODE: &str = "ALREADY_ENROLLED";
const ALREADY_ENROLLED_TEXT: &str = "already enrolled";

pub async fn run(ctx: &mut Context) {
    list_courses(ctx).await;
    get_course(ctx).await;
    ctx.expect_missing("Get Non-existent Course", "courses/non-existent-id")
        .await;
    enroll(ctx, "Course Enrollment (Authorized)").await;
    enroll_repeat(ctx).await;
    enroll_unauthorized(ctx).await;
}

/// Anonymous listing; the first entry seeds the dependent cases
async fn list_courses(ctx: &mut Context) {
    let case = "Get All Courses";
    let response = ctx.client.get("courses", None).await;

    let courses = match response.field("courses").and_then(Value::as_array) {
        Some(courses) if response.success => courses,
        _ => {
            ctx.log.record(
                case,
                false,
                format!("Failed to get courses: {}", response.body_text()),
            );
            return;
        }
    };

    if let Some(first) = courses.first() {
        ctx.session.course_id = first.get("id").and_then(entity_id);
        ctx.session.course_title = first
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string);
    }

    let min = ctx.config.expectations.min_courses;
    ctx.log.record(
        case,
        courses.len() >= min,
        format!("Retrieved {} courses (expected at least {})", courses.len(), min),
    );
}

async fn get_course(ctx: &mut Context) {
    let case = "Get Single Course";
    let Some(course_id) = ctx.require(ctx.session.course_id.clone(), case, "course id") else {
        return;
    };

    let response = ctx.client.get(&format!("courses/{}", course_id), None).await;
    let title = response.str_at("/course/title");
    let title_matches = match (&ctx.session.course_title, title) {
        (Some(listed), Some(detail)) => listed == detail,
        (None, _) => true,
        (Some(_), None) => false,
    };

    ctx.log.record(
        case,
        response.success && response.has_key("course") && title_matches,
        match title {
            Some(title) if response.success => format!("Retrieved course: {}", title),
            _ => format!("Unexpected course detail: {}", response.body_text()),
        },
    );
}

fn enroll_request(course_id: &str) -> Request {
    Request::post("courses/enroll").json(json!({ "course_id": course_id }))
}

/// Success, or a conflict saying the enrollment already exists
async fn enroll(ctx: &mut Context, case: &str) {
    let Some(token) = ctx.require_token(Identity::UserA, case) else {
        return;
    };
    let Some(course_id) = ctx.require(ctx.session.course_id.clone(), case, "course id") else {
        return;
    };

    let response = ctx.client.send(&enroll_request(&course_id).bearer(token)).await;
    let already = is_already_done(&response, ALREADY_ENROLLED_CODE, ALREADY_ENROLLED_TEXT);
    let ok = response.success || already;
    if ok {
        ctx.session.enrolled = true;
    }
    ctx.log.record(
        case,
        ok,
        format!("Enrollment result ({}): {}", response.status, response.body_text()),
    );
}

/// A second enrollment must not create a duplicate
async fn enroll_repeat(ctx: &mut Context) {
    let case = "Course Enrollment (Repeat)";
    let Some(token) = ctx.require_token(Identity::UserA, case) else {
        return;
    };
    let Some(course_id) = ctx.require(ctx.session.course_id.clone(), case, "course id") else {
        return;
    };

    let response = ctx.client.send(&enroll_request(&course_id).bearer(token)).await;
    let conflict = is_already_done(&response, ALREADY_ENROLLED_CODE, ALREADY_ENROLLED_TEXT);
    ctx.log.record(
        case,
        conflict,
        if conflict {
            format!("Duplicate enrollment rejected: {}", response.body_text())
        } else {
            format!(
                "Expected 409 already enrolled, got {}: {}",
                response.status,
                response.body_text()
            )
        },
    );
}

async fn enroll_unauthorized(ctx: &mut Context) {
    let case = "Course Enrollment (Unauthorized)";
    let Some(course_id) = ctx.require(ctx.session.course_id.clone(), case, "course id") else {
        return;
    };
    ctx.expect_denied(case, enroll_request(&course_id)).await;
}
