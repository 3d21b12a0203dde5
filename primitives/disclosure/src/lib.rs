//! # Dust Disclosure
//!
//! Read-only audit machinery: serializable view keys and self-authenticating
//! disclosure reports.
//!
//! A wallet hands an auditor a view key (`dvk1:`, or `dvk2:` scoped to a
//! block window). With it the auditor can list the wallet's notes and total
//! its balances. Because every disclosed note carries its blinding, an
//! independent verifier can recompute each commitment and confirm the report
//! was not doctored, without trusting either party.

pub mod csv;
pub mod error;
pub mod report;
pub mod view_key;

pub use csv::to_csv;
pub use error::DisclosureError;
pub use report::{
	compute_report_nullifiers, generate_report, verify_report, BlockRange, DateRange,
	DisclosedNote, DisclosureReport, ReportOptions, VerifyOutcome, REPORT_VERSION,
};
pub use view_key::{parse, serialize_plain, serialize_scoped, ParsedViewKey};
