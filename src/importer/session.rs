// ==========================================
// 员工批量导入 - 导入会话
// ==========================================
// 职责: 持有可编辑的候选记录表，驱动阶段流转
// 阶段: Uploading → Parsed → Reviewing ⇄ Reviewing → Importing → Completed
// 红线: 记录只能经 apply_edit 修改，且每次修改后全批次重新校验
// ==========================================

use crate::config::ImportSettings;
use crate::domain::{
    CandidateRecord, CommitOutcome, EmployeeField, ImportPhase, RawRow,
};
use crate::importer::employee_importer_trait::{
    ConflictHandler as ConflictHandlerTrait, FieldMapper as FieldMapperTrait,
    RecordValidator as RecordValidatorTrait,
};
use crate::importer::conflict_handler::ConflictHandler;
use crate::importer::error::{ImportError, ImporterResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 单次修改的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditOutcome {
    Applied,
    IgnoredUnknownField, // 字段名不在员工字段表中
}

/// 员工号冲突（批次内 + 存储）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateConflict {
    pub local_id: String,
    pub employee_id: String,
    pub in_store: bool, // false = 批次内重复
}

// ==========================================
// ImportSession - 导入会话
// ==========================================
pub struct ImportSession {
    session_id: String,
    phase: ImportPhase,
    settings: ImportSettings,
    existing_ids: HashSet<String>,
    records: Vec<CandidateRecord>,
    field_mapper: Box<dyn FieldMapperTrait>,
    validator: Box<dyn RecordValidatorTrait>,
}

impl ImportSession {
    /// 创建空会话（Uploading 阶段）
    pub fn new(
        settings: ImportSettings,
        field_mapper: Box<dyn FieldMapperTrait>,
        validator: Box<dyn RecordValidatorTrait>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            phase: ImportPhase::Uploading,
            settings,
            existing_ids: HashSet::new(),
            records: Vec::new(),
            field_mapper,
            validator,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    pub fn existing_ids(&self) -> &HashSet<String> {
        &self.existing_ids
    }

    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    pub fn record(&self, local_id: &str) -> Option<&CandidateRecord> {
        self.records.iter().find(|r| r.local_id == local_id)
    }

    pub fn valid_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_valid()).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.records.len() - self.valid_count()
    }

    /// 当前所有员工号冲突（批次内在前，存储在后）
    pub fn duplicate_conflicts(&self) -> Vec<DuplicateConflict> {
        let handler = ConflictHandler;
        let batch = handler
            .detect_duplicates(&self.records)
            .into_iter()
            .map(|(local_id, employee_id)| DuplicateConflict {
                local_id,
                employee_id,
                in_store: false,
            });
        let store = handler
            .detect_store_duplicates(&self.records, &self.existing_ids)
            .into_iter()
            .map(|(local_id, employee_id)| DuplicateConflict {
                local_id,
                employee_id,
                in_store: true,
            });
        batch.chain(store).collect()
    }

    fn expect_phase(&self, expected: ImportPhase) -> ImporterResult<()> {
        if self.phase != expected {
            return Err(ImportError::InternalError(format!(
                "会话阶段错误: 期望 {}, 实际 {}",
                expected, self.phase
            )));
        }
        Ok(())
    }

    // ===== 阶段流转 =====

    /// 映射原始行（Uploading → Parsed）
    ///
    /// # 参数
    /// - rows: 解析器输出，首行为表头
    pub(crate) fn load_rows(&mut self, rows: &[RawRow]) -> ImporterResult<()> {
        self.expect_phase(ImportPhase::Uploading)?;

        let (header, data_rows) = rows.split_first().ok_or_else(|| {
            ImportError::InternalError("解析结果为空，无法映射".to_string())
        })?;

        self.records = self.field_mapper.map_rows(header, data_rows);
        self.phase = ImportPhase::Parsed;

        debug!(
            session_id = %self.session_id,
            total_rows = self.records.len(),
            "字段映射完成"
        );
        Ok(())
    }

    /// 首轮校验（Parsed → Reviewing）
    pub(crate) fn begin_review(&mut self, existing_ids: HashSet<String>) -> ImporterResult<()> {
        self.expect_phase(ImportPhase::Parsed)?;

        self.existing_ids = existing_ids;
        self.revalidate();
        self.phase = ImportPhase::Reviewing;

        info!(
            session_id = %self.session_id,
            total_rows = self.records.len(),
            valid = self.valid_count(),
            invalid = self.invalid_count(),
            "进入人工复核"
        );
        Ok(())
    }

    /// 开始提交（Reviewing → Importing），返回有效记录的下标快照
    pub(crate) fn begin_commit(&mut self) -> ImporterResult<Vec<usize>> {
        if !self.phase.accepts_commit() {
            return Err(ImportError::CommitRejected { phase: self.phase });
        }

        self.phase = ImportPhase::Importing;
        Ok(self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_valid())
            .map(|(idx, _)| idx)
            .collect())
    }

    pub(crate) fn set_record_outcome(&mut self, index: usize, outcome: CommitOutcome) {
        if let Some(record) = self.records.get_mut(index) {
            record.set_outcome(outcome);
        }
    }

    /// 提交结束（Importing → Completed）
    pub(crate) fn finish_commit(&mut self) -> ImporterResult<()> {
        self.expect_phase(ImportPhase::Importing)?;
        self.phase = ImportPhase::Completed;
        Ok(())
    }

    // ===== 人工修正 =====

    /// 修改单条记录的一个字段并全批次重新校验
    ///
    /// # 参数
    /// - local_id: 记录地址
    /// - field_name: 字段名（接受与表头相同的别名）
    /// - value: 新的原始文本（按映射规则转换）
    ///
    /// # 返回
    /// - Ok(Applied): 已修改并重新校验
    /// - Ok(IgnoredUnknownField): 字段名未知，未做任何修改
    /// - Err(EditRejected): 当前阶段不允许修改
    /// - Err(RecordNotFound): local_id 不存在
    pub fn apply_edit(
        &mut self,
        local_id: &str,
        field_name: &str,
        value: &str,
    ) -> ImporterResult<EditOutcome> {
        if !self.phase.accepts_edits() {
            return Err(ImportError::EditRejected { phase: self.phase });
        }

        let index = self
            .records
            .iter()
            .position(|r| r.local_id == local_id)
            .ok_or_else(|| ImportError::RecordNotFound(local_id.to_string()))?;

        let field = match self.field_mapper.resolve_header(field_name) {
            Some(field) => field,
            None => {
                warn!(local_id, field_name, "未知字段，忽略修改");
                return Ok(EditOutcome::IgnoredUnknownField);
            }
        };

        self.apply_field_edit(index, field, value);
        Ok(EditOutcome::Applied)
    }

    fn apply_field_edit(&mut self, index: usize, field: EmployeeField, value: &str) {
        let slot = self.field_mapper.coerce(field, value);
        let record = &mut self.records[index];
        record.set_field(field, slot);

        debug!(
            session_id = %self.session_id,
            local_id = %record.local_id,
            field = %field,
            "字段已修改"
        );

        self.revalidate();
    }

    /// 全批次重新校验（一次修改可能产生或消除任意记录间的冲突）
    fn revalidate(&mut self) {
        self.validator
            .validate_batch(&mut self.records, &self.existing_ids);
    }
}

impl std::fmt::Debug for ImportSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportSession")
            .field("session_id", &self.session_id)
            .field("phase", &self.phase)
            .field("records", &self.records.len())
            .field("existing_ids", &self.existing_ids.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldErrorKind;
    use crate::importer::field_mapper::FieldMapper;
    use crate::importer::record_validator::RecordValidator;

    fn row(line: usize, cells: &[&str]) -> RawRow {
        RawRow::new(line, cells.iter().map(|c| c.to_string()).collect())
    }

    fn create_session(rows: &[RawRow], existing: &[&str]) -> ImportSession {
        let settings = ImportSettings::default();
        let validator = RecordValidator::new(settings.rules.clone()).unwrap();
        let mut session = ImportSession::new(
            settings,
            Box::new(FieldMapper::default()),
            Box::new(validator),
        );
        session.load_rows(rows).unwrap();
        session
            .begin_review(existing.iter().map(|s| s.to_string()).collect())
            .unwrap();
        session
    }

    fn duplicate_rows() -> Vec<RawRow> {
        vec![
            row(1, &["employee_id", "name", "age", "department", "salary", "hire_date"]),
            row(2, &["EMP001", "John Doe", "30", "Engineering", "85000", "2024-01-15"]),
            row(3, &["EMP001", "Jane Roe", "41", "Finance", "92000", "2023-06-01"]),
        ]
    }

    #[test]
    fn test_phase_flow_and_initial_validation() {
        let session = create_session(&duplicate_rows(), &[]);

        assert_eq!(session.phase(), ImportPhase::Reviewing);
        assert_eq!(session.records().len(), 2);
        assert_eq!(session.valid_count(), 0);
        assert_eq!(session.duplicate_conflicts().len(), 2);
    }

    #[test]
    fn test_edit_resolves_duplicate_for_both_records() {
        let mut session = create_session(&duplicate_rows(), &[]);

        let outcome = session.apply_edit("row-2", "employee_id", "emp002").unwrap();

        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(session.valid_count(), 2);
        assert_eq!(session.record("row-2").unwrap().employee_id(), Some("EMP002"));
        assert_eq!(session.record("row-1").unwrap().employee_id(), Some("EMP001"));
        assert!(session.duplicate_conflicts().is_empty());
    }

    #[test]
    fn test_edit_can_create_duplicate_elsewhere() {
        let mut session = create_session(&duplicate_rows(), &[]);
        session.apply_edit("row-2", "employee_id", "EMP002").unwrap();

        session.apply_edit("row-1", "Employee ID", "EMP002").unwrap();

        assert_eq!(session.valid_count(), 0);
        let record = session.record("row-2").unwrap();
        assert_eq!(
            record.validation_errors()[&EmployeeField::EmployeeId].kind,
            FieldErrorKind::DuplicateInBatch
        );
    }

    #[test]
    fn test_unknown_field_is_ignored() {
        let mut session = create_session(&duplicate_rows(), &[]);
        let before = session.record("row-1").unwrap().fields().clone();

        let outcome = session.apply_edit("row-1", "favourite_colour", "blue").unwrap();

        assert_eq!(outcome, EditOutcome::IgnoredUnknownField);
        assert_eq!(session.record("row-1").unwrap().fields(), &before);
    }

    #[test]
    fn test_unknown_record_is_error() {
        let mut session = create_session(&duplicate_rows(), &[]);

        let result = session.apply_edit("row-99", "name", "Someone");

        assert!(matches!(result, Err(ImportError::RecordNotFound(id)) if id == "row-99"));
    }

    #[test]
    fn test_existing_id_is_invalid() {
        let rows = vec![
            row(1, &["employee_id", "name", "age", "department", "salary", "hire_date"]),
            row(2, &["EMP007", "John Doe", "30", "Engineering", "85000", "2024-01-15"]),
        ];
        let session = create_session(&rows, &["EMP007"]);

        let record = session.record("row-1").unwrap();
        assert_eq!(
            record.validation_errors()[&EmployeeField::EmployeeId].kind,
            FieldErrorKind::AlreadyExists
        );
    }

    #[test]
    fn test_edits_rejected_after_commit_starts() {
        let mut session = create_session(&duplicate_rows(), &[]);
        session.apply_edit("row-2", "employee_id", "EMP002").unwrap();

        let snapshot = session.begin_commit().unwrap();
        assert_eq!(snapshot, vec![0, 1]);

        let result = session.apply_edit("row-1", "name", "Changed");
        assert!(matches!(
            result,
            Err(ImportError::EditRejected {
                phase: ImportPhase::Importing
            })
        ));

        session.finish_commit().unwrap();
        assert!(matches!(
            session.begin_commit(),
            Err(ImportError::CommitRejected {
                phase: ImportPhase::Completed
            })
        ));
    }
}
