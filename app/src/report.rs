use crate::options::Preset;

/// 单个子目录的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubdirOutcome {
    Transferred,
    SkippedMissingLocal,
    /// 已挂载的远端作为源时不存在
    SkippedMissingRemote,
    SkippedNoRemoteTarget,
    Failed { command: String, code: Option<i32> },
}

impl SubdirOutcome {
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            SubdirOutcome::SkippedMissingLocal
                | SubdirOutcome::SkippedMissingRemote
                | SubdirOutcome::SkippedNoRemoteTarget
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SubdirOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdirRecord {
    pub preset: Preset,
    pub name: String,
    pub outcome: SubdirOutcome,
}

/// 一次运行的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    records: Vec<SubdirRecord>,
}

impl SyncReport {
    pub const EXIT_OK: u8 = 0;
    pub const EXIT_PARTIAL: u8 = 2;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, preset: Preset, name: &str, outcome: SubdirOutcome) {
        self.records.push(SubdirRecord {
            preset,
            name: name.to_string(),
            outcome,
        });
    }

    pub fn records(&self) -> &[SubdirRecord] {
        &self.records
    }

    pub fn outcome_of(&self, name: &str) -> Option<&SubdirOutcome> {
        self.records.iter().find(|r| r.name == name).map(|r| &r.outcome)
    }

    pub fn transferred(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome == SubdirOutcome::Transferred)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_skip()).count()
    }

    pub fn failed(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_failure()).count()
    }

    /// 没有失败；`allow_missing` 为 false 时也不能有跳过
    pub fn is_clean(&self, allow_missing: bool) -> bool {
        self.failed() == 0 && (allow_missing || self.skipped() == 0)
    }

    pub fn exit_code(&self, allow_missing: bool) -> u8 {
        if self.is_clean(allow_missing) {
            Self::EXIT_OK
        } else {
            Self::EXIT_PARTIAL
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} transferred, {} skipped, {} failed",
            self.transferred(),
            self.skipped(),
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_count_unless_allowed() {
        let mut report = SyncReport::new();
        report.record(Preset::Data, "Docs", SubdirOutcome::Transferred);
        report.record(Preset::Blob, "Music", SubdirOutcome::SkippedMissingLocal);

        assert_eq!(report.exit_code(false), SyncReport::EXIT_PARTIAL);
        assert_eq!(report.exit_code(true), SyncReport::EXIT_OK);
        assert_eq!(report.summary(), "1 transferred, 1 skipped, 0 failed");
    }

    #[test]
    fn failures_always_count() {
        let mut report = SyncReport::new();
        report.record(
            Preset::Data,
            "Docs",
            SubdirOutcome::Failed {
                command: "rsync".to_string(),
                code: Some(23),
            },
        );

        assert!(!report.is_clean(true));
        assert_eq!(report.exit_code(true), SyncReport::EXIT_PARTIAL);
    }

    #[test]
    fn empty_report_is_clean() {
        assert_eq!(SyncReport::new().exit_code(false), SyncReport::EXIT_OK);
    }
}
