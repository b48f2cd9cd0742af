//! Command interpreter
//!
//! Maps free text to a typed [`Intent`]. Matching is an ordered rule table:
//! each rule has a cheap keyword filter on the lowercased text and a regex
//! extractor on the original text. The first rule whose filter passes AND
//! whose extractor succeeds wins. A rule whose keywords match but whose
//! extractor fails is skipped and evaluation continues with the next rule,
//! so "deploy api to staging with canary" (no percentage) still lands on a
//! plain deploy.
//!
//! Order matters: the patterns overlap ("deploy ... canary" must be tried
//! before "deploy ... to").

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

/// Reply for text that matches no rule
pub const HELP_MESSAGE: &str = "I couldn't understand that command. Try commands like:\n\
    • Deploy [service] to [environment]\n\
    • Show status of all pipelines\n\
    • Rollback [service] to previous version\n\
    • Stop all running pipelines";

/// Commands offered as suggestions by the shell
pub const EXAMPLE_COMMANDS: &[&str] = &[
    "Deploy frontend to production with tag v1.2.3",
    "Show status of all pipelines",
    "Rollback backend to previous version",
    "Stop all running pipelines",
    "Run full test suite for payments@feature/upi-qr",
    "Cut release v2.3.0 for mobile-api",
    "Deploy inventory-svc v1.12.4 to staging with canary 10%",
    "Create hotfix from v2.3.0",
    "Plan terraform for network stack in prod",
    "Why did the error rate spike after v2.3.0?",
    "Show change ticket and approvals for the last deploy",
];

/// Classified meaning of a command plus its extracted parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    DeployWithTag {
        service: String,
        tag: String,
    },
    CanaryDeploy {
        service: String,
        version: String,
        environment: String,
        percentage: u8,
    },
    Deploy {
        service: String,
        /// "latest" when the command names no version
        version: String,
        environment: String,
    },
    ShowStatus,
    Rollback {
        service: String,
    },
    StopAllRunning,
    RunTests {
        service: String,
        /// "main" unless given as `service@branch`
        branch: String,
    },
    CutRelease {
        version: String,
        service: String,
    },
    CreateHotfix {
        version: String,
    },
    TerraformPlan {
        stack: String,
        environment: String,
    },
    ObservabilityQuery {
        /// "recent deployment" when the question names no version
        version: String,
    },
    ShowCompliance,
}

/// Outcome of interpreting one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    Recognized(Intent),
    /// Carries the fixed help text
    Unrecognized(&'static str),
}

impl Interpretation {
    pub fn intent(&self) -> Option<&Intent> {
        match self {
            Interpretation::Recognized(intent) => Some(intent),
            Interpretation::Unrecognized(_) => None,
        }
    }
}

struct Rule {
    name: &'static str,
    /// Keyword filter, applied to the lowercased text
    keywords: fn(&str) -> bool,
    /// Parameter extraction, applied to the original text
    extract: fn(&str) -> Option<Intent>,
}

const RULES: &[Rule] = &[
    Rule {
        name: "deploy_with_tag",
        keywords: |t| t.contains("deploy") && t.contains("to production with tag"),
        extract: extract_deploy_with_tag,
    },
    Rule {
        name: "canary_deploy",
        keywords: |t| t.contains("deploy") && t.contains("canary"),
        extract: extract_canary_deploy,
    },
    Rule {
        name: "deploy",
        keywords: |t| t.contains("deploy") && t.contains("to"),
        extract: extract_deploy,
    },
    Rule {
        name: "show_status",
        keywords: |t| t.contains("show status") || t.contains("status of all pipelines"),
        extract: |_| Some(Intent::ShowStatus),
    },
    Rule {
        name: "rollback",
        keywords: |t| t.contains("rollback") && t.contains("to previous"),
        extract: extract_rollback,
    },
    Rule {
        name: "stop_all_running",
        keywords: |t| t.contains("stop") && (t.contains("running") || t.contains("all")),
        extract: |_| Some(Intent::StopAllRunning),
    },
    Rule {
        name: "run_tests",
        keywords: |t| t.contains("run") && (t.contains("test") || t.contains("suite")),
        extract: extract_run_tests,
    },
    Rule {
        name: "cut_release",
        keywords: |t| t.contains("cut release") || t.contains("create release"),
        extract: extract_cut_release,
    },
    Rule {
        name: "create_hotfix",
        keywords: |t| t.contains("hotfix") || t.contains("hot fix"),
        extract: extract_create_hotfix,
    },
    Rule {
        name: "terraform_plan",
        keywords: |t| t.contains("terraform") || t.contains("plan"),
        extract: extract_terraform_plan,
    },
    Rule {
        name: "observability_query",
        keywords: |t| t.contains("why") || t.contains("error rate") || t.contains("spike"),
        extract: extract_observability_query,
    },
    Rule {
        name: "show_compliance",
        keywords: |t| t.contains("show") && (t.contains("change ticket") || t.contains("approval")),
        extract: |_| Some(Intent::ShowCompliance),
    },
];

/// Interprets a free-text command
pub fn interpret(text: &str) -> Interpretation {
    let lower = text.to_lowercase();

    for rule in RULES {
        if !(rule.keywords)(&lower) {
            continue;
        }

        match (rule.extract)(text) {
            Some(intent) => {
                debug!("Command matched rule '{}'", rule.name);
                return Interpretation::Recognized(intent);
            }
            None => debug!(
                "Keywords for rule '{}' matched but parameters did not, falling through",
                rule.name
            ),
        }
    }

    Interpretation::Unrecognized(HELP_MESSAGE)
}

// =============================================================================
// Extractors
// =============================================================================

fn pattern(source: &str) -> Regex {
    Regex::new(source).unwrap_or_else(|e| panic!("invalid built-in pattern {source}: {e}"))
}

static DEPLOY_WITH_TAG: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)deploy\s+(\S+)\s+to production with tag\s+(\S+)"));

static CANARY_DEPLOY: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)deploy\s+(\S+)\s+v?([\d.]+)\s+to\s+(\w+)\s+with canary\s+(\d+)%")
});

static DEPLOY: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)deploy\s+(\S+)(?:\s+v?([\d.]+))?\s+to\s+(\w+)"));

static ROLLBACK: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)rollback\s+(\S+)"));

static RUN_TESTS: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)run.*test.*for\s+([^\s@]+)(?:@(\S+))?"));

static CUT_RELEASE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)(?:cut|create) release\s+v?([\d.]+)\s+for\s+(\S+)"));

static CREATE_HOTFIX: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)create hot\s?fix from\s+v?([\d.]+)"));

static TERRAFORM_PLAN: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)plan terraform for\s+(\S+(?:\s+\S+)?)\s+in\s+(\w+)"));

static OBSERVABILITY: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)why.*(?:after|for)\s+v?([\d.]+)?"));

fn group(captures: &Captures<'_>, index: usize) -> Option<String> {
    captures.get(index).map(|m| m.as_str().to_string())
}

fn extract_deploy_with_tag(text: &str) -> Option<Intent> {
    let caps = DEPLOY_WITH_TAG.captures(text)?;
    Some(Intent::DeployWithTag {
        service: group(&caps, 1)?,
        tag: group(&caps, 2)?,
    })
}

fn extract_canary_deploy(text: &str) -> Option<Intent> {
    let caps = CANARY_DEPLOY.captures(text)?;
    let percentage = caps.get(4)?.as_str().parse::<u8>().ok().filter(|p| *p <= 100)?;
    Some(Intent::CanaryDeploy {
        service: group(&caps, 1)?,
        version: group(&caps, 2)?,
        environment: group(&caps, 3)?,
        percentage,
    })
}

fn extract_deploy(text: &str) -> Option<Intent> {
    let caps = DEPLOY.captures(text)?;
    Some(Intent::Deploy {
        service: group(&caps, 1)?,
        version: group(&caps, 2).unwrap_or_else(|| "latest".to_string()),
        environment: group(&caps, 3)?,
    })
}

fn extract_rollback(text: &str) -> Option<Intent> {
    let caps = ROLLBACK.captures(text)?;
    Some(Intent::Rollback {
        service: group(&caps, 1)?,
    })
}

fn extract_run_tests(text: &str) -> Option<Intent> {
    let caps = RUN_TESTS.captures(text)?;
    Some(Intent::RunTests {
        service: group(&caps, 1)?,
        branch: group(&caps, 2).unwrap_or_else(|| "main".to_string()),
    })
}

fn extract_cut_release(text: &str) -> Option<Intent> {
    let caps = CUT_RELEASE.captures(text)?;
    Some(Intent::CutRelease {
        version: group(&caps, 1)?,
        service: group(&caps, 2)?,
    })
}

fn extract_create_hotfix(text: &str) -> Option<Intent> {
    let caps = CREATE_HOTFIX.captures(text)?;
    Some(Intent::CreateHotfix {
        version: group(&caps, 1)?,
    })
}

fn extract_terraform_plan(text: &str) -> Option<Intent> {
    let caps = TERRAFORM_PLAN.captures(text)?;
    Some(Intent::TerraformPlan {
        stack: group(&caps, 1)?,
        environment: group(&caps, 2)?,
    })
}

fn extract_observability_query(text: &str) -> Option<Intent> {
    let caps = OBSERVABILITY.captures(text)?;
    Some(Intent::ObservabilityQuery {
        version: group(&caps, 1).unwrap_or_else(|| "recent deployment".to_string()),
    })
}
