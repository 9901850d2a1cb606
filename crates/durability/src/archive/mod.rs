//! Order archive - XML file with atomic commit
//!
//! ## Archive Format
//!
//! The tag names are kept compatible with existing consumers of the archive:
//!
//! ```text
//! <orders>
//!   <order>
//!     <uid>u1</uid>
//!     <date>2024-01-01T00:00:00Z</date>
//!     <products>
//!       <product><code>p1</code><amount>3</amount></product>
//!     </products>
//!   </order>
//! </orders>
//! ```
//!
//! `date` is RFC 3339 in UTC with as many fractional digits as needed to be
//! exact. `products` is always present, empty for orders without line items.
//!
//! ## Usage
//!
//! ```ignore
//! let writer = ArchiveWriter::new(fs.clone());
//! let info = writer.commit(&archive, Path::new("./orders.xml"))?;
//!
//! let read_back = ArchiveReader::new(fs).read(Path::new("./orders.xml"))?;
//! ```

mod format;
mod reader;
mod writer;

pub use format::{decode_archive, encode_archive, xxh3_hex};
pub use reader::ArchiveReader;
pub use writer::{ArchiveCommitInfo, ArchiveWriter};
