//! # streams-rs
//!
//! A lazy sequence pipeline library over in-memory employee records.
//!
//! Pipelines chain deferred transformation stages (filter, map, flat_map,
//! distinct, sorted, limit, skip) over a finite collection or a generative
//! source; nothing is evaluated until a terminal operation (for_each,
//! reduce, collect, count, the match family, min/max, find) pulls elements
//! through the chain.
//!
//! ## Example
//!
//! ```
//! use streams_rs::{Employee, Pipeline, Status};
//!
//! let staff = vec![
//!     Employee::new("ALICE", 35, 5000.55, Status::Busy),
//!     Employee::new("BARB", 23, 6600.55, Status::Idle),
//!     Employee::new("CHUCK", 50, 3211.23, Status::OnLeave),
//! ];
//!
//! let high_earners: Vec<Employee> = Pipeline::from_vec(staff)
//!     .filter(|e| e.salary() > 5000.0)
//!     .collect();
//!
//! assert_eq!(high_earners.len(), 2);
//! ```
//!
//! Unbounded sources are bounded with `limit`:
//!
//! ```
//! use streams_rs::Pipeline;
//!
//! let evens: Vec<i64> = Pipeline::iterate(0, |x| x + 2).limit(5).collect();
//! assert_eq!(evens, vec![0, 2, 4, 6, 8]);
//! ```

pub mod dsl;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod stats;

pub use dsl::{Command, execute_pipeline, parse_commands};
pub use error::PipelineError;
pub use pipeline::Pipeline;
pub use record::{AgeBand, Employee, Status};
pub use stats::Summary;
