//! Build-graph generation phases.
//!
//! Each target runs through ingestion, planning and emission, strictly in
//! that order. Targets are independent of each other; the only shared
//! state is the diagnostic sink.

pub mod config;
pub mod emit;
pub mod error;
pub mod plan;

pub use config::TargetConfigGenerator;
pub use emit::JumboWriter;
pub use error::GenError;
pub use plan::JumboPlanner;

use crate::core::context::BuildContext;
use crate::core::target::Target;
use crate::core::value::DeclaredValues;
use crate::util::diagnostic::DiagnosticSink;

/// Run ingestion, planning and emission for one target.
///
/// Ingestion errors abort the target and are returned to the caller.
/// Emission failures are reported to `sink` and abort only this target's
/// emission; aggregates already written stay on disk.
pub fn generate_target(
    target: &mut Target,
    values: &mut DeclaredValues,
    ctx: &BuildContext,
    sink: &DiagnosticSink,
) -> Result<(), GenError> {
    TargetConfigGenerator::new(target, values).run()?;

    if target.jumbo_allowed {
        target.jumbo_files = JumboPlanner::new(target).run();
        tracing::debug!(
            "target {} planned {} jumbo files",
            target.name,
            target.jumbo_files.len()
        );
    }

    JumboWriter::run_and_write_files(target, ctx, sink);
    Ok(())
}
