//! # campus - School directory core
//!
//! Building blocks for a small school-locations service that talks to a
//! MySQL-compatible database:
//!
//! - **Hex dumps**: driver-style packet dumps for debug logs ([`dump`])
//! - **Escaping**: identifier and literal escaping for inlined SQL ([`escape`])
//! - **Placeholders**: client-side `?`/`??` substitution ([`query`])
//! - **Distance search**: great-circle distances and a distance-sorted
//!   school directory ([`geo`], [`school`])
//!
//! ## Quick Start
//!
//! ```
//! use campus::{escape_identifier, escape_value, Charset, ConnectionContext, SqlValue};
//!
//! assert_eq!(escape_identifier("schools").unwrap(), "`schools`");
//!
//! let ctx = ConnectionContext::new(Charset::Big5);
//! let literal = escape_value(&ctx, &SqlValue::Bytes(b"test".to_vec())).unwrap();
//! assert_eq!(literal, "_binary'test'");
//! ```
//!
//! All of these functions are pure: configuration such as the connection
//! charset or the dump length cap is passed in explicitly.

pub mod charset;
pub mod dump;
pub mod error;
pub mod escape;
pub mod geo;
pub mod packet;
pub mod query;
pub mod school;
pub mod value;

// Re-export main types at crate root for convenience
pub use charset::Charset;
pub use dump::{format_dump, DumpConfig, DumpRequest};
pub use error::{CampusError, EscapeError, PacketError, Result};
pub use escape::{escape_identifier, escape_string, escape_value, ConnectionContext};
pub use geo::{distance_km, Coordinate};
pub use packet::QueryPacket;
pub use query::format_query;
pub use school::{
    MemoryRepository, NewSchool, School, SchoolRepository, SchoolService, SchoolServiceBuilder,
    SchoolStats, SchoolWithDistance,
};
pub use value::SqlValue;
