//! Asset reconciliation
//!
//! Turns an unordered collection of raw records into a validated, fully
//! linked [`ResourceGraph`]. Any malformed record, orphaned child or
//! unresolved instance link aborts the build; no partial graph is returned.

mod builder;
mod export;
mod reconcile;
mod types;

pub use builder::{AssetBuilder, BuildOptions};
pub use types::*;

use crate::error::Result;
use crate::records::RawRecord;

/// Build a resource graph from raw records
pub fn build(records: &[RawRecord], options: &BuildOptions) -> Result<ResourceGraph> {
    let mut builder = AssetBuilder::new(options.clone());
    for record in records {
        builder.add(record)?;
    }
    builder.finish()
}
