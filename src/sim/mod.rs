pub mod driver;
pub mod job;
pub mod report;

pub use driver::Sim;
pub use job::{Job, JobInstance, validate_jobs};
pub use report::{JobMetrics, Segment, Simulation};
