//! Shell slash commands
//!
//! Anything starting with `/` in the shell is handled here instead of
//! being sent to the command interpreter.

use conduit_core::domain::log::LogType;
use conduit_core::domain::pipeline::PipelineStatus;
use conduit_engine::service::log_service::LogFilter;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Pipelines(Option<PipelineStatus>),
    Logs(LogFilter),
    Export {
        dir: PathBuf,
        filter: LogFilter,
    },
    ClearLogs,
    History,
    Releases,
    New {
        name: String,
        branch: Option<String>,
    },
    Run(u64),
    Retry(u64),
    Delete(u64),
    Quit,
}

pub const SLASH_HELP: &str = "\
/help                       Show this help
/pipelines [status]         List pipelines, optionally by status
/logs [type] [search]       List logs, optionally by type and search text
/export [dir] [type] [search]  Write the filtered logs to pipeline-logs-<date>.txt
/clear-logs                 Remove every log entry
/history                    Show submitted commands
/releases                   Show cut releases
/new <name> [branch]        Create a pipeline
/run <id>                   Run a pipeline
/retry <id>                 Retry a pipeline
/delete <id>                Delete a pipeline
/quit                       Leave the shell";

impl SlashCommand {
    /// Parse a line starting with `/`
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.trim().trim_start_matches('/').split_whitespace();
        let name = words.next().unwrap_or_default();
        let rest: Vec<&str> = words.collect();

        match name {
            "help" | "h" | "?" => Ok(SlashCommand::Help),
            "pipelines" | "p" => match rest.first() {
                None | Some(&"all") => Ok(SlashCommand::Pipelines(None)),
                Some(status) => status.parse().map(|s| SlashCommand::Pipelines(Some(s))),
            },
            "logs" | "l" => Ok(SlashCommand::Logs(parse_log_filter(&rest))),
            "export" => match rest.split_first() {
                None => Ok(SlashCommand::Export {
                    dir: PathBuf::from("."),
                    filter: LogFilter::default(),
                }),
                Some((dir, filter)) => Ok(SlashCommand::Export {
                    dir: PathBuf::from(*dir),
                    filter: parse_log_filter(filter),
                }),
            },
            "clear-logs" => Ok(SlashCommand::ClearLogs),
            "history" => Ok(SlashCommand::History),
            "releases" => Ok(SlashCommand::Releases),
            "new" => match rest.as_slice() {
                [name] => Ok(SlashCommand::New {
                    name: name.to_string(),
                    branch: None,
                }),
                [name, branch] => Ok(SlashCommand::New {
                    name: name.to_string(),
                    branch: Some(branch.to_string()),
                }),
                _ => Err("usage: /new <name> [branch]".to_string()),
            },
            "run" => parse_id(&rest, "run").map(SlashCommand::Run),
            "retry" => parse_id(&rest, "retry").map(SlashCommand::Retry),
            "delete" => parse_id(&rest, "delete").map(SlashCommand::Delete),
            "quit" | "exit" | "q" => Ok(SlashCommand::Quit),
            other => Err(format!("unknown command '/{}', try /help", other)),
        }
    }
}

/// The first word is a type filter when it names a log type;
/// everything else is search text
fn parse_log_filter(rest: &[&str]) -> LogFilter {
    match rest.split_first() {
        Some((first, search)) if *first == "all" => {
            LogFilter::default().with_search(search.join(" "))
        }
        Some((first, search)) => match first.parse::<LogType>() {
            Ok(kind) => LogFilter::of_kind(kind).with_search(search.join(" ")),
            Err(_) => LogFilter::default().with_search(rest.join(" ")),
        },
        None => LogFilter::default(),
    }
}

fn parse_id(rest: &[&str], command: &str) -> Result<u64, String> {
    match rest {
        [id] => id
            .parse::<u64>()
            .map_err(|_| format!("'{}' is not a pipeline id", id)),
        _ => Err(format!("usage: /{} <id>", command)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pipelines() {
        assert_eq!(
            SlashCommand::parse("/pipelines"),
            Ok(SlashCommand::Pipelines(None))
        );
        assert_eq!(
            SlashCommand::parse("/pipelines running"),
            Ok(SlashCommand::Pipelines(Some(PipelineStatus::Running)))
        );
        assert!(SlashCommand::parse("/pipelines sideways").is_err());
    }

    #[test]
    fn test_parse_logs() {
        assert_eq!(
            SlashCommand::parse("/logs error timeout"),
            Ok(SlashCommand::Logs(
                LogFilter::of_kind(LogType::Error).with_search("timeout")
            ))
        );
        assert_eq!(
            SlashCommand::parse("/logs connection timeout"),
            Ok(SlashCommand::Logs(
                LogFilter::default().with_search("connection timeout")
            ))
        );
    }

    #[test]
    fn test_parse_export_keeps_filter() {
        assert_eq!(
            SlashCommand::parse("/export"),
            Ok(SlashCommand::Export {
                dir: PathBuf::from("."),
                filter: LogFilter::default(),
            })
        );
        assert_eq!(
            SlashCommand::parse("/export /tmp/out warning legacy auth"),
            Ok(SlashCommand::Export {
                dir: PathBuf::from("/tmp/out"),
                filter: LogFilter::of_kind(LogType::Warning).with_search("legacy auth"),
            })
        );
        assert_eq!(
            SlashCommand::parse("/export out all etl"),
            Ok(SlashCommand::Export {
                dir: PathBuf::from("out"),
                filter: LogFilter::default().with_search("etl"),
            })
        );
    }

    #[test]
    fn test_parse_pipeline_actions() {
        assert_eq!(
            SlashCommand::parse("/new docs-site preview"),
            Ok(SlashCommand::New {
                name: "docs-site".to_string(),
                branch: Some("preview".to_string()),
            })
        );
        assert_eq!(SlashCommand::parse("/run 4"), Ok(SlashCommand::Run(4)));
        assert!(SlashCommand::parse("/delete four").is_err());
        assert!(SlashCommand::parse("/retry").is_err());
        assert!(SlashCommand::parse("/new").is_err());
    }

    #[test]
    fn test_unknown() {
        assert!(SlashCommand::parse("/frobnicate").is_err());
        assert_eq!(SlashCommand::parse("/quit"), Ok(SlashCommand::Quit));
    }
}
