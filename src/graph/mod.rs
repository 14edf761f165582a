//! Social graph representation, degree tables and shortest paths

pub mod social;
pub mod builder;
pub mod degree;
pub mod spd;

pub use social::SocialGraph;
pub use builder::GraphBuilder;
pub use degree::DegreeIndex;
pub use spd::SpdTable;
