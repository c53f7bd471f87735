mod profile;
mod task;

pub use profile::{DEFAULT_NICKNAME, ProcessReport, UserProfile};
pub use task::{
    ACTION_CATALOG, DEFAULT_ACTION, Task, TaskKind, actions_from_codes, normalize_actions,
};

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Current UTC time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
