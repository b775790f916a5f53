//! Exit codes of the `tweetlens` binary. Scripts and the task runner rely on them.

use tweetlens_core::{QueryError, QueryErrorKind};

pub const SUCCESS: i32 = 0;
pub const QUERY_FAILED: i32 = 1; // Input missing, unreadable or undecodable
pub const CONFIG_ERROR: i32 = 2; // Bad flags or config file

pub fn for_query_error(err: &QueryError) -> i32 {
    match err.kind() {
        QueryErrorKind::Usage => CONFIG_ERROR,
        QueryErrorKind::Input | QueryErrorKind::Data | QueryErrorKind::Internal => QUERY_FAILED,
    }
}
