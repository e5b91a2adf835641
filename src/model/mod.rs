//! Data model for harvested staff directories
//!
//! - `StaffMember`: one validated person record
//! - `StaffDirectory`: the `{staff_members: [...]}` wrapper used on the wire
//! - `PageContent`: a single fetch snapshot
//! - `PageRecords`: the records found on one page of a crawl

mod page;
mod staff;

pub use page::{merge_pages, PageContent, PageRecords};
pub use staff::{
    collapse_whitespace, decode_entities, normalize_email, strip_honorific, StaffDirectory,
    StaffMember, EMAIL_PATTERN,
};
