//! Readers and writers for the marker-table and code text formats.

pub mod codes;
pub mod hits;
pub mod pcl;

/// Sentinel written in place of a null code or an unattempted hit list.
pub const NA_TOKEN: &str = "#N/A";
