mod inspect;
mod issue;

pub use inspect::handle_inspect_command;
pub use issue::{handle_issue_command, handle_issue_rtm_command, IssueRequest};
