//! Jumbo aggregate emission.
//!
//! Materializes each planned aggregate as a text file of `#include`
//! directives. Files go through the change-detecting writer, so an
//! unchanged aggregate keeps its timestamp and nothing recompiles.

use miette::Diagnostic as _;

use crate::core::context::BuildContext;
use crate::core::target::{JumboFile, Target};
use crate::gen::error::GenError;
use crate::util::diagnostic::{Diagnostic, DiagnosticSink};
use crate::util::fs::{ensure_dir, write_if_changed};
use crate::util::paths::rebase_for_include;

const JUMBO_FILE_HEADER: &str =
    "/* This is a Jumbo file. Don't edit. Generated with 'slipway gen' command. */\n\n";

/// Writes a target's planned aggregates to disk.
pub struct JumboWriter<'a> {
    target: &'a Target,
    ctx: &'a BuildContext,
}

impl<'a> JumboWriter<'a> {
    /// Emit every aggregate of `target`. I/O failures go to `sink` and
    /// abort the remaining emission for this target; aggregates already
    /// written stay on disk.
    pub fn run_and_write_files(target: &'a Target, ctx: &'a BuildContext, sink: &DiagnosticSink) {
        JumboWriter { target, ctx }.run(sink)
    }

    fn run(&self, sink: &DiagnosticSink) {
        let Some(first) = self.target.jumbo_files.first() else {
            return;
        };

        // All aggregates of a target share one directory.
        let first_path = self.ctx.full_path(first.output());
        if let Some(parent) = first_path.parent() {
            if let Err(cause) = ensure_dir(parent) {
                report_io_failure(
                    sink,
                    GenError::Io {
                        path: parent.to_path_buf(),
                        cause,
                    },
                );
                return;
            }
        }

        for jumbo in &self.target.jumbo_files {
            if let Err(err) = self.write_jumbo_file(jumbo) {
                report_io_failure(sink, err);
                return;
            }
        }
    }

    fn write_jumbo_file(&self, jumbo: &JumboFile) -> Result<(), GenError> {
        let path = self.ctx.full_path(jumbo.output());
        let changed = write_if_changed(&path, self.render(jumbo).as_bytes())
            .map_err(|cause| GenError::Io {
                path: path.clone(),
                cause,
            })?;
        if changed {
            tracing::debug!("wrote jumbo file {}", path.display());
        } else {
            tracing::debug!("jumbo file unchanged: {}", path.display());
        }
        Ok(())
    }

    /// The textual contents of one aggregate: a header comment, a blank
    /// line, then one `#include` per source in planning order.
    fn render(&self, jumbo: &JumboFile) -> String {
        let mut content = String::from(JUMBO_FILE_HEADER);
        for &index in jumbo.included() {
            let source = &self.target.sources[index];
            let rebased = rebase_for_include(source, &self.target.generated_dir);
            content.push_str(&format!("#include \"{}\"\n", rebased));
        }
        content
    }
}

/// Convert an emission failure into a sink diagnostic, keeping the typed
/// error's path and diagnostic code.
fn report_io_failure(sink: &DiagnosticSink, err: GenError) {
    let mut diag = Diagnostic::error(err.to_string());
    if let GenError::Io { ref path, .. } = err {
        diag = diag.with_location(path.clone());
    }
    if let Some(code) = err.code() {
        diag = diag.with_note(format!("code: {code}"));
    }
    sink.report(diag);
}
