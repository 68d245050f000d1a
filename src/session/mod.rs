//! Scripted sessions against an in-memory `IssueDesk`.
//!
//! A script is JSON Lines: one command object per line, tagged by `op`.
//! Blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! {"op":"as","identity":"0xabc"}
//! {"op":"create","title":"Pothole","description":"Deep","location":"Ring Road","category":"Road"}
//! {"op":"vote","issue":1}
//! {"op":"query","tab":"pending","sort_by":"most-voted"}
//! ```

use std::io::BufRead;

use civic_core::{
    AdminAction, Caller, CivicError, Comment, Issue, IssueDesk, IssueDraft, IssueQuery,
    IssueStats, VoteReceipt,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{FixdError, Result};
use crate::format::IssueView;

/// One line of a session script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SessionCommand {
    /// Switch the acting identity. `admin` grants privileges outright.
    As {
        #[serde(default)]
        identity: Option<String>,
        #[serde(default)]
        admin: bool,
    },
    Create(IssueDraft),
    Vote {
        issue: u64,
    },
    Comment {
        issue: u64,
        text: String,
        /// Defaults to the acting identity.
        #[serde(default)]
        author: Option<String>,
    },
    Status {
        issue: u64,
        status: String,
        #[serde(default)]
        reason: Option<String>,
    },
    Assign {
        issue: u64,
        department: String,
    },
    Query(IssueQuery),
    Show {
        issue: u64,
    },
    Stats(IssueQuery),
}

impl SessionCommand {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::As { .. } => "as",
            Self::Create(_) => "create",
            Self::Vote { .. } => "vote",
            Self::Comment { .. } => "comment",
            Self::Status { .. } => "status",
            Self::Assign { .. } => "assign",
            Self::Query(_) => "query",
            Self::Show { .. } => "show",
            Self::Stats(_) => "stats",
        }
    }
}

/// A parsed command with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub line: usize,
    pub command: SessionCommand,
}

/// Parse a whole script before anything runs.
///
/// # Errors
///
/// Returns `ScriptParse` naming the first bad line, or `Io`.
pub fn parse_script(reader: impl BufRead) -> Result<Vec<ScriptLine>> {
    let mut commands = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let command = serde_json::from_str(trimmed).map_err(|e| FixdError::ScriptParse {
            line: idx + 1,
            reason: e.to_string(),
        })?;
        commands.push(ScriptLine {
            line: idx + 1,
            command,
        });
    }
    Ok(commands)
}

/// What a command produced.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Caller {
        identity: Option<String>,
        privileged: bool,
    },
    Issue(IssueView),
    Vote(VoteReceipt),
    Comment(Comment),
    Issues(Vec<IssueView>),
    Stats(IssueStats),
}

/// A desk plus the identity commands run as.
#[derive(Debug)]
pub struct Session {
    desk: IssueDesk,
    config: Config,
    caller: Caller,
}

impl Session {
    /// Start a session from configuration, seeding samples if asked.
    ///
    /// # Errors
    ///
    /// Returns `Civic` if seeding fails.
    pub fn new(config: Config, force_admin: bool) -> Result<Self> {
        let mut desk = IssueDesk::with_store(config.build_store())?;
        if config.seed_sample_issues {
            let seeded = desk.seed_samples()?;
            debug!(count = seeded.len(), "session seeded");
        }
        let caller = config.caller_for(config.identity.as_deref(), force_admin);
        Ok(Self {
            desk,
            config,
            caller,
        })
    }

    #[must_use]
    pub const fn caller(&self) -> &Caller {
        &self.caller
    }

    #[must_use]
    pub const fn desk(&self) -> &IssueDesk {
        &self.desk
    }

    /// Run one command.
    ///
    /// # Errors
    ///
    /// Returns the engine's error; state is unchanged on failure.
    pub fn execute(&mut self, command: SessionCommand) -> std::result::Result<Reply, CivicError> {
        match command {
            SessionCommand::As { identity, admin } => {
                self.caller = self.config.caller_for(identity.as_deref(), admin);
                info!(identity = ?self.caller.identity(), privileged = self.caller.privileged, "acting identity changed");
                Ok(Reply::Caller {
                    identity: self.caller.identity().map(String::from),
                    privileged: self.caller.privileged,
                })
            }
            SessionCommand::Create(draft) => {
                let issue = self.desk.create_issue(&self.caller, &draft)?;
                Ok(Reply::Issue(self.view_of(&issue)))
            }
            SessionCommand::Vote { issue } => self
                .desk
                .vote(issue, self.caller.identity())
                .map(Reply::Vote),
            SessionCommand::Comment {
                issue,
                text,
                author,
            } => {
                let author = author.as_deref().or_else(|| self.caller.identity());
                self.desk.add_comment(issue, author, &text).map(Reply::Comment)
            }
            SessionCommand::Status {
                issue,
                status,
                reason,
            } => {
                let action = AdminAction::StatusUpdate {
                    new_status: status,
                    reason,
                };
                let updated = self.desk.apply_admin_action(&self.caller, issue, &action)?;
                Ok(Reply::Issue(self.view_of(&updated)))
            }
            SessionCommand::Assign { issue, department } => {
                let action = AdminAction::AssignDepartment { department };
                let updated = self.desk.apply_admin_action(&self.caller, issue, &action)?;
                Ok(Reply::Issue(self.view_of(&updated)))
            }
            SessionCommand::Query(query) => {
                let view = self.desk.query_issues(&self.caller, &query)?;
                Ok(Reply::Issues(
                    view.into_iter().map(|issue| self.view_of(issue)).collect(),
                ))
            }
            SessionCommand::Show { issue } => {
                let issue = self.desk.get_issue(issue)?;
                Ok(Reply::Issue(self.view_of(issue)))
            }
            SessionCommand::Stats(query) => self.desk.stats(&self.caller, &query).map(Reply::Stats),
        }
    }

    fn view_of(&self, issue: &Issue) -> IssueView {
        let upvoted = self
            .caller
            .identity()
            .is_some_and(|id| self.desk.has_voted(issue.id, id));
        IssueView::new(issue.clone(), upvoted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_core::{ErrorKind, Status};

    fn session() -> Session {
        let config = Config {
            identity: Some("userA".into()),
            ..Config::default()
        };
        Session::new(config, false).unwrap()
    }

    fn run(session: &mut Session, line: &str) -> std::result::Result<Reply, CivicError> {
        let command = serde_json::from_str(line).unwrap();
        session.execute(command)
    }

    const CREATE: &str = r#"{"op":"create","title":"Pothole","description":"Deep","location":"Ring Road","category":"Road"}"#;

    #[test]
    fn test_parse_script_skips_comments_and_blanks() {
        let script = "# setup\n\n{\"op\":\"vote\",\"issue\":1}\n   \n{\"op\":\"show\",\"issue\":1}\n";
        let lines = parse_script(script.as_bytes()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line, 3);
        assert_eq!(lines[0].command, SessionCommand::Vote { issue: 1 });
        assert_eq!(lines[1].line, 5);
    }

    #[test]
    fn test_parse_script_reports_line() {
        let script = "{\"op\":\"vote\",\"issue\":1}\n{\"op\":\"explode\"}\n";
        let err = parse_script(script.as_bytes()).unwrap_err();
        assert!(matches!(err, FixdError::ScriptParse { line: 2, .. }));
    }

    #[test]
    fn test_parse_query_defaults() {
        let lines = parse_script(r#"{"op":"query","sort_by":"oldest"}"#.as_bytes()).unwrap();
        match &lines[0].command {
            SessionCommand::Query(query) => {
                assert_eq!(query.sort_by, civic_core::SortBy::Oldest);
                assert!(query.search_term.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_create_with_missing_fields_is_validation_error() {
        let lines = parse_script(r#"{"op":"create","description":"Deep","location":"Ring Road","category":"Road"}"#.as_bytes())
            .unwrap();
        let mut session = session();
        let command = lines.into_iter().next().unwrap().command;
        let err = session.execute(command).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("title"));
        assert!(session.desk().store().is_empty());
    }

    #[test]
    fn test_comment_as_administrator_rejected() {
        let mut session = session();
        run(&mut session, CREATE).unwrap();
        let err = run(
            &mut session,
            r#"{"op":"comment","issue":1,"text":"Resolved","author":"Administrator"}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(session.desk().get_issue(1).unwrap().comments.is_empty());
    }

    #[test]
    fn test_vote_marks_upvoted() {
        let mut session = session();
        run(&mut session, CREATE).unwrap();
        run(&mut session, r#"{"op":"vote","issue":1}"#).unwrap();

        match run(&mut session, r#"{"op":"show","issue":1}"#).unwrap() {
            Reply::Issue(view) => {
                assert!(view.upvoted);
                assert_eq!(view.issue.votes, 1);
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[test]
    fn test_admin_ops_need_privilege() {
        let mut session = session();
        run(&mut session, CREATE).unwrap();
        let err = run(&mut session, r#"{"op":"status","issue":1,"status":"Resolved"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        run(&mut session, r#"{"op":"as","identity":"ops","admin":true}"#).unwrap();
        assert!(session.caller().privileged);
        run(&mut session, r#"{"op":"assign","issue":1,"department":"Transport"}"#).unwrap();
        assert_eq!(
            session.desk().get_issue(1).unwrap().status,
            Status::InProgress
        );
    }

    #[test]
    fn test_configured_admin_identity() {
        let mut session = session();
        let admin = crate::config::DEFAULT_ADMIN_IDENTITIES[1];
        let line = format!(r#"{{"op":"as","identity":"{admin}"}}"#);
        match run(&mut session, &line).unwrap() {
            Reply::Caller { privileged, .. } => assert!(privileged),
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[test]
    fn test_seeded_session() {
        let config = Config {
            seed_sample_issues: true,
            ..Config::default()
        };
        let mut session = Session::new(config, false).unwrap();
        match run(&mut session, r#"{"op":"stats"}"#).unwrap() {
            Reply::Stats(stats) => {
                assert_eq!(stats.total, 2);
                assert_eq!(stats.in_progress, 1);
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }
}
