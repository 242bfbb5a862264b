//! Runs the case groups in dependency order

use std::fmt;
use std::future::Future;

use clap::ValueEnum;
use tracing::{info, warn};

use crate::cases::{self, Context};
use crate::report::Summary;

/// A set of cases exercising one backend resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Group {
    Setup,
    Auth,
    Courses,
    Activities,
    Chatbot,
    Analytics,
    Users,
    Dashboard,
}

impl Group {
    /// Canonical order. Auth issues the tokens every later group uses and
    /// courses discovers the id enrollment needs.
    pub const ALL: [Group; 8] = [
        Group::Setup,
        Group::Auth,
        Group::Courses,
        Group::Activities,
        Group::Chatbot,
        Group::Analytics,
        Group::Users,
        Group::Dashboard,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Group::Setup => "setup",
            Group::Auth => "auth",
            Group::Courses => "courses",
            Group::Activities => "activities",
            Group::Chatbot => "chatbot",
            Group::Analytics => "analytics",
            Group::Users => "users",
            Group::Dashboard => "dashboard",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Group::Setup => "SETUP ENDPOINTS",
            Group::Auth => "AUTHENTICATION",
            Group::Courses => "COURSES",
            Group::Activities => "ACTIVITIES",
            Group::Chatbot => "CHATBOT",
            Group::Analytics => "ANALYTICS",
            Group::Users => "USER MANAGEMENT",
            Group::Dashboard => "DASHBOARD",
        }
    }

    pub async fn run(self, ctx: &mut Context) {
        match self {
            Group::Setup => cases::setup::run(ctx).await,
            Group::Auth => cases::auth::run(ctx).await,
            Group::Courses => cases::courses::run(ctx).await,
            Group::Activities => cases::activities::run(ctx).await,
            Group::Chatbot => cases::chatbot::run(ctx).await,
            Group::Analytics => cases::analytics::run(ctx).await,
            Group::Users => cases::users::run(ctx).await,
            Group::Dashboard => cases::dashboard::run(ctx).await,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(Summary),
    /// Stopped by an interrupt; the summary covers the cases that finished
    Interrupted(Summary),
}

impl RunOutcome {
    pub fn summary(&self) -> &Summary {
        match self {
            RunOutcome::Completed(summary) | RunOutcome::Interrupted(summary) => summary,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, RunOutcome::Interrupted(_))
    }

    /// 0 only for a finished run without failures
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Completed(summary) if summary.all_passed() => 0,
            _ => 1,
        }
    }
}

/// Sequential conformance runner
pub struct ConformanceRunner {
    ctx: Context,
    groups: Vec<Group>,
}

impl ConformanceRunner {
    /// Runner over every group
    pub fn new(ctx: Context) -> Self {
        Self::with_groups(ctx, &Group::ALL)
    }

    /// Runner over a subset of groups, still executed in canonical order
    pub fn with_groups(ctx: Context, groups: &[Group]) -> Self {
        let mut groups = groups.to_vec();
        groups.sort();
        groups.dedup();
        Self { ctx, groups }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Run every selected group to completion
    pub async fn run(&mut self) -> Summary {
        self.run_groups().await;
        self.ctx.log.summarize()
    }

    /// Run until finished or until `interrupt` resolves, whichever is first
    pub async fn run_until<F>(&mut self, interrupt: F) -> RunOutcome
    where
        F: Future<Output = ()>,
    {
        let completed = tokio::select! {
            biased;
            () = interrupt => false,
            () = self.run_groups() => true,
        };

        let summary = self.ctx.log.summarize();
        if completed {
            RunOutcome::Completed(summary)
        } else {
            warn!(
                "Run interrupted after {} case(s); remaining cases were not executed",
                summary.total
            );
            RunOutcome::Interrupted(summary)
        }
    }

    async fn run_groups(&mut self) {
        info!("Testing API at: {}", self.ctx.client.api_base());
        for group in self.groups.clone() {
            info!("=== TESTING {} ===", group.title());
            self.ctx.log.enter_group(group.name());
            group.run(&mut self.ctx).await;
        }
    }
}
