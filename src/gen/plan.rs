//! Jumbo aggregate planning.
//!
//! Partitions a target's eligible sources into aggregate files. The plan is
//! deterministic: same inputs, same source order, bit-identical output.

use std::collections::BTreeMap;

use crate::core::source_file::SourceType;
use crate::core::target::{JumboFile, Target};

/// Plans the list of jumbo files for one target.
///
/// Sources are visited in declaration order. Each eligible source lands in
/// the open aggregate of its type, tracked by a most-recently-used cursor;
/// an aggregate closes permanently once it fills to the merge limit or a
/// later aggregate of the same type supersedes it.
pub struct JumboPlanner<'a> {
    target: &'a Target,
    files: Vec<JumboFile>,

    // Next file numbers are separate for each source type.
    numbers: BTreeMap<SourceType, u32>,

    // Most recently used aggregate and its type.
    recent: Option<(usize, SourceType)>,
}

impl<'a> JumboPlanner<'a> {
    pub fn new(target: &'a Target) -> Self {
        JumboPlanner {
            target,
            files: Vec::new(),
            numbers: BTreeMap::new(),
            recent: None,
        }
    }

    /// Produce the aggregate list. Planning never fails; source types that
    /// cannot form an aggregate were rejected during ingestion, so the
    /// remaining skip is silent.
    pub fn run(mut self) -> Vec<JumboFile> {
        for (index, source) in self.target.sources.iter().enumerate() {
            let ty = source.source_type();
            if !ty.is_aggregatable() {
                continue;
            }
            if self.target.jumbo_excluded_sources.contains(source) {
                continue;
            }

            let slot = match self.find_open(ty) {
                Some(slot) => Some(slot),
                None => self.create(ty),
            };
            let Some(slot) = slot else {
                continue;
            };

            self.files[slot].push(index);
            self.recent = Some((slot, ty));
        }
        self.files
    }

    /// The open aggregate for `ty`, if one exists with spare capacity.
    fn find_open(&self, ty: SourceType) -> Option<usize> {
        let limit = self.target.jumbo_file_merge_limit;

        // Reuse the cursor when the type matches. A full cursor aggregate
        // means a fresh one is due; earlier same-type aggregates are closed
        // and never reopened.
        if let Some((recent, recent_ty)) = self.recent {
            if recent_ty == ty {
                return (self.files[recent].included().len() < limit).then_some(recent);
            }
        }

        if !self.numbers.contains_key(&ty) {
            return None;
        }

        // Type switch: the most recent aggregate of the needed type decides.
        let (slot, file) = self
            .files
            .iter()
            .enumerate()
            .rev()
            .find(|(_, file)| file.output().source_type() == ty)?;
        (file.included().len() < limit).then_some(slot)
    }

    /// Open a new aggregate for `ty` and return its slot, or `None` when
    /// the type has no aggregate extension.
    fn create(&mut self, ty: SourceType) -> Option<usize> {
        let ext = ty.jumbo_extension()?;

        let number = self.numbers.get(&ty).map_or(0, |n| n + 1);
        self.numbers.insert(ty, number);

        let file_name = format!("{}_jumbo_{}_{}.{}", self.target.name, ext, number, ext);
        let output = self.target.generated_dir.resolve_file(&file_name);
        tracing::debug!("planned jumbo file {}", output.value());

        self.files.push(JumboFile::new(output));
        Some(self.files.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::BuildContext;
    use crate::core::source_file::{SourceDir, SourceFile};
    use crate::core::target::OutputKind;

    fn test_target(merge_limit: usize, sources: &[&str]) -> Target {
        let ctx = BuildContext::new("/work/src", SourceDir::new("//out/Debug/"));
        let mut target = Target::new(
            "bar",
            SourceDir::new("//foo/"),
            OutputKind::StaticLibrary,
            &ctx,
        );
        target.jumbo_allowed = true;
        target.jumbo_file_merge_limit = merge_limit;
        target.sources = sources.iter().map(|s| SourceFile::new(*s)).collect();
        target
    }

    fn included_values<'t>(target: &'t Target, jumbo: &JumboFile) -> Vec<&'t str> {
        jumbo
            .included()
            .iter()
            .map(|&i| target.sources[i].value())
            .collect()
    }

    fn extension(jumbo: &JumboFile) -> &str {
        jumbo.output().value().rsplit('.').next().unwrap()
    }

    #[test]
    fn basic_list() {
        let target = test_target(
            3,
            &["a.cc", "a.h", "b.cc", "A/c.cc", "B/d.cc", "A/B/e.cc", "A/B/e.h"],
        );

        let jumbo_files = JumboPlanner::new(&target).run();

        assert_eq!(jumbo_files.len(), 2);
        assert_eq!(
            included_values(&target, &jumbo_files[0]),
            vec!["a.cc", "b.cc", "A/c.cc"]
        );
        assert_eq!(
            included_values(&target, &jumbo_files[1]),
            vec!["B/d.cc", "A/B/e.cc"]
        );
    }

    #[test]
    fn default_file_merge_limit() {
        let sources: Vec<String> = (0..105).map(|i| format!("{i}.cc")).collect();
        let refs: Vec<&str> = sources.iter().map(String::as_str).collect();
        let target = test_target(50, &refs);

        let jumbo_files = JumboPlanner::new(&target).run();

        assert_eq!(jumbo_files.len(), 3);
        assert_eq!(jumbo_files[0].included().len(), 50);
        assert_eq!(jumbo_files[1].included().len(), 50);
        assert_eq!(jumbo_files[2].included().len(), 5);
    }

    #[test]
    fn excluded_sources() {
        let mut target = test_target(2, &["a.cc", "b.cc", "c.cc", "d.cc", "e.cc"]);
        target.jumbo_excluded_sources = vec![SourceFile::new("b.cc"), SourceFile::new("d.cc")];

        let jumbo_files = JumboPlanner::new(&target).run();

        assert_eq!(jumbo_files.len(), 2);
        assert_eq!(included_values(&target, &jumbo_files[0]), vec!["a.cc", "c.cc"]);
        assert_eq!(included_values(&target, &jumbo_files[1]), vec!["e.cc"]);
    }

    #[test]
    fn mixed_source_file_types() {
        let target = test_target(
            2,
            &[
                "a.cc", "1.mm", "2.mm", "3.mm", "b.cc", "c.cc", "d.cc", "4.mm", "5.mm", "e.cc",
            ],
        );

        let jumbo_files = JumboPlanner::new(&target).run();

        assert_eq!(jumbo_files.len(), 6);
        assert_eq!(extension(&jumbo_files[0]), "cc");
        assert_eq!(included_values(&target, &jumbo_files[0]), vec!["a.cc", "b.cc"]);
        assert_eq!(extension(&jumbo_files[1]), "mm");
        assert_eq!(included_values(&target, &jumbo_files[1]), vec!["1.mm", "2.mm"]);
        assert_eq!(extension(&jumbo_files[2]), "mm");
        assert_eq!(included_values(&target, &jumbo_files[2]), vec!["3.mm", "4.mm"]);
        assert_eq!(extension(&jumbo_files[3]), "cc");
        assert_eq!(included_values(&target, &jumbo_files[3]), vec!["c.cc", "d.cc"]);
        assert_eq!(extension(&jumbo_files[4]), "mm");
        assert_eq!(included_values(&target, &jumbo_files[4]), vec!["5.mm"]);
        assert_eq!(extension(&jumbo_files[5]), "cc");
        assert_eq!(included_values(&target, &jumbo_files[5]), vec!["e.cc"]);
    }

    #[test]
    fn supported_source_file_types() {
        let target = test_target(
            50,
            &[
                "x.cc", "x.cpp", "x.cxx", "x.h", "x.hpp", "x.hxx", "x.hh", "x.c", "x.m", "x.mm",
                "x.rc", "x.S", "x.s", "x.asm", "x.o", "x.obj", "x.def",
            ],
        );

        let jumbo_files = JumboPlanner::new(&target).run();

        assert_eq!(jumbo_files.len(), 3);
        assert_eq!(extension(&jumbo_files[0]), "cc");
        assert_eq!(jumbo_files[0].included().len(), 3);
        assert_eq!(extension(&jumbo_files[1]), "c");
        assert_eq!(jumbo_files[1].included().len(), 1);
        assert_eq!(extension(&jumbo_files[2]), "mm");
        assert_eq!(jumbo_files[2].included().len(), 1);
    }

    #[test]
    fn file_numbers_are_contiguous_per_type() {
        let target = test_target(
            2,
            &["a.cc", "b.cc", "c.cc", "d.cc", "e.cc", "1.mm", "2.mm", "3.mm"],
        );

        let jumbo_files = JumboPlanner::new(&target).run();

        let cc_names: Vec<&str> = jumbo_files
            .iter()
            .filter(|j| extension(j) == "cc")
            .map(|j| j.output().value())
            .collect();
        assert_eq!(
            cc_names,
            vec![
                "//out/Debug/gen/foo/bar_jumbo_cc_0.cc",
                "//out/Debug/gen/foo/bar_jumbo_cc_1.cc",
                "//out/Debug/gen/foo/bar_jumbo_cc_2.cc",
            ]
        );

        let mm_names: Vec<&str> = jumbo_files
            .iter()
            .filter(|j| extension(j) == "mm")
            .map(|j| j.output().value())
            .collect();
        assert_eq!(
            mm_names,
            vec![
                "//out/Debug/gen/foo/bar_jumbo_mm_0.mm",
                "//out/Debug/gen/foo/bar_jumbo_mm_1.mm",
            ]
        );
    }

    #[test]
    fn empty_and_ineligible_source_lists_plan_nothing() {
        let target = test_target(50, &[]);
        assert!(JumboPlanner::new(&target).run().is_empty());

        let headers_only = test_target(50, &["a.h", "b.h"]);
        assert!(JumboPlanner::new(&headers_only).run().is_empty());

        let mut all_excluded = test_target(50, &["a.cc"]);
        all_excluded.jumbo_excluded_sources = vec![SourceFile::new("a.cc")];
        assert!(JumboPlanner::new(&all_excluded).run().is_empty());
    }

    #[test]
    fn limit_two_with_single_source() {
        let target = test_target(2, &["a.cc"]);

        let jumbo_files = JumboPlanner::new(&target).run();
        assert_eq!(jumbo_files.len(), 1);
        assert_eq!(included_values(&target, &jumbo_files[0]), vec!["a.cc"]);
    }

    #[test]
    fn planning_is_deterministic() {
        let target = test_target(3, &["a.cc", "1.mm", "b.cc", "2.mm", "c.cc"]);

        let first = JumboPlanner::new(&target).run();
        let second = JumboPlanner::new(&target).run();
        assert_eq!(first, second);
    }
}
