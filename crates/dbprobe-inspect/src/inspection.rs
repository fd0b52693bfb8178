use async_trait::async_trait;
use sqlx::PgConnection;

use dbprobe_core::Result;

/// Database work behind one command.
///
/// Implementations only issue queries; connecting and disconnecting is the
/// job of [`crate::run_inspection`].
#[async_trait]
pub trait Inspection: Send + Sync {
    /// What the inspection hands back for rendering.
    type Report: Send;

    /// Short identifier used in log events (e.g. `metrics`).
    fn name(&self) -> &'static str;

    /// Run the inspection's statements against an open connection.
    async fn run(&self, conn: &mut PgConnection) -> Result<Self::Report>;
}
