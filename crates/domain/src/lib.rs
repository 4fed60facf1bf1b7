mod deadline;
mod extraction;
mod ledger;
mod scan;
mod shared;
mod tier;
mod user;

pub use deadline::{Deadline, InvalidPriorityError, Priority};
pub use extraction::{
    build_extraction_prompt, parse_extraction_response, ExtractionParseError, DEFAULT_COURSE,
};
pub use ledger::{LedgerKey, LedgerStatistics, NotificationKind, NotificationLedgerEntry};
pub use scan::{CandidateDeadline, ExtractedDeadline, ScanSession};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use tier::{approaching_horizon, classify, InvalidTierError, NotificationTier};
pub use user::User;
