//! PostgreSQL inspections behind the dbprobe commands.
//!
//! Every command is an [`Inspection`] run through [`run_inspection`], which
//! owns the connection for the duration of the command and closes it whether
//! the inspection succeeds or not.

pub mod backup;
pub mod connection;
pub mod gantt;
pub mod inspection;
pub mod metrics;
pub mod postgres;
pub mod probe;
pub mod session;

pub use backup::MetricsBackup;
pub use connection::ConnectionDiagnostics;
pub use gantt::GanttTableSetup;
pub use inspection::Inspection;
pub use metrics::RecentMetrics;
pub use probe::WriteProbe;
pub use session::{connect, run_inspection};

pub use dbprobe_core::{Error, Result, Settings};
