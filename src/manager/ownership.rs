//! Which record sets the engine may touch.
use crate::powerdns::types::{PdnsComment, PdnsRrset};

pub const MANAGED_COMMENT: &str = "Managed by zone-manager";

/// True iff at least one comment on the record set carries `account_name`.
///
/// The zone's own account plays no part here.
pub fn is_managed(rrset: &PdnsRrset, account_name: &str) -> bool {
    rrset
        .comments
        .iter()
        .any(|comment| comment.account == account_name)
}

/// Comment attached to every record set we write.
pub fn ownership_comment(account_name: &str) -> PdnsComment {
    PdnsComment {
        content: MANAGED_COMMENT.to_string(),
        account: account_name.to_string(),
        modified_at: None,
    }
}
