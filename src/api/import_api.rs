// ==========================================
// 员工导入API
// ==========================================
// 职责: 封装会话打开、人工修正、提交、失败明细导出
// 说明: 会话由调用方持有（单操作员独占），API 本身无状态
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::{
    CandidateRecord, CommitFailure, CommitOutcome, EmployeeField, ImportPhase, ImportResult,
};
use crate::importer::{
    DuplicateConflict, EditOutcome, EmployeeImporter, EmployeeImporterImpl, ImportSession,
};
use crate::repository::SqliteEmployeeStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// 单条记录视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordView {
    pub local_id: String,
    pub row_number: usize,
    pub is_valid: bool,
    /// 字段展示文本（无法转换的值保留原文）
    pub fields: BTreeMap<EmployeeField, String>,
    /// 字段错误消息
    pub errors: BTreeMap<EmployeeField, String>,
    pub outcome: CommitOutcome,
}

impl From<&CandidateRecord> for RecordView {
    fn from(record: &CandidateRecord) -> Self {
        Self {
            local_id: record.local_id.clone(),
            row_number: record.row_number,
            is_valid: record.is_valid(),
            fields: record
                .fields()
                .iter()
                .map(|(field, slot)| (*field, slot.display_text()))
                .collect(),
            errors: record
                .validation_errors()
                .iter()
                .map(|(field, err)| (*field, err.message.clone()))
                .collect(),
            outcome: record.outcome().clone(),
        }
    }
}

/// 会话视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: String,
    pub phase: ImportPhase,
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub records: Vec<RecordView>,
    pub conflicts: Vec<DuplicateConflict>,
}

impl From<&ImportSession> for SessionView {
    fn from(session: &ImportSession) -> Self {
        Self {
            session_id: session.session_id().to_string(),
            phase: session.phase(),
            total: session.records().len(),
            valid: session.valid_count(),
            invalid: session.invalid_count(),
            records: session.records().iter().map(RecordView::from).collect(),
            conflicts: session.duplicate_conflicts(),
        }
    }
}

/// 修改响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditResponse {
    pub outcome: EditOutcome,
    pub record: RecordView,
    pub valid: usize,
    pub invalid: usize,
}

/// 提交响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitResponse {
    pub session_id: String,
    pub created: usize,
    pub failed: usize,
    pub created_ids: Vec<String>,
    pub errors: Vec<CommitFailure>,
    pub elapsed_ms: u64,
}

impl From<ImportResult> for CommitResponse {
    fn from(result: ImportResult) -> Self {
        Self {
            session_id: result.session_id.clone(),
            created: result.created(),
            failed: result.failed(),
            created_ids: result.created_ids,
            errors: result.errors,
            elapsed_ms: result.elapsed_ms,
        }
    }
}

/// 导入API
pub struct ImportApi {
    db_path: String,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// 建表（幂等）
    pub fn init_database(&self) -> ApiResult<()> {
        let conn = open_sqlite_connection(&self.db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    /// 创建导入器实例
    fn create_importer(&self) -> ApiResult<EmployeeImporterImpl<SqliteEmployeeStore, ConfigManager>> {
        let store = SqliteEmployeeStore::new(&self.db_path)?;
        let config = ConfigManager::new(&self.db_path)?;
        Ok(EmployeeImporterImpl::new(store, config))
    }

    /// 从文件打开导入会话
    ///
    /// # 返回
    /// - Ok(ImportSession): Reviewing 阶段的会话
    /// - Err(ApiError): 文件不存在 / 解析失败 / 配置错误
    pub async fn open_file(&self, file_path: &str) -> ApiResult<ImportSession> {
        let importer = self.create_importer()?;
        let session = importer.open_session_from_file(Path::new(file_path)).await?;
        Ok(session)
    }

    /// 从文本打开导入会话
    pub async fn open_text(&self, text: &str) -> ApiResult<ImportSession> {
        let importer = self.create_importer()?;
        let session = importer.open_session_from_text(text).await?;
        Ok(session)
    }

    /// 会话视图
    pub fn view(&self, session: &ImportSession) -> SessionView {
        SessionView::from(session)
    }

    /// 修改一个字段
    pub fn apply_edit(
        &self,
        session: &mut ImportSession,
        local_id: &str,
        field: &str,
        value: &str,
    ) -> ApiResult<EditResponse> {
        let outcome = session.apply_edit(local_id, field, value)?;
        let record = session
            .record(local_id)
            .map(RecordView::from)
            .ok_or_else(|| ApiError::NotFound(format!("local_id={}", local_id)))?;

        Ok(EditResponse {
            outcome,
            record,
            valid: session.valid_count(),
            invalid: session.invalid_count(),
        })
    }

    /// 提交有效记录
    pub async fn commit(&self, session: &mut ImportSession) -> ApiResult<CommitResponse> {
        let importer = self.create_importer()?;
        let result = importer.commit(session).await?;
        Ok(CommitResponse::from(result))
    }

    /// 导出提交失败的记录（可直接作为下一次导入的输入）
    ///
    /// 字段分隔符与列表分隔符沿用会话配置。
    ///
    /// # 返回
    /// - Ok(usize): 导出行数
    pub fn export_failures_csv(&self, session: &ImportSession, output: &Path) -> ApiResult<usize> {
        let settings = session.settings();
        let delimiter = u8::try_from(settings.field_delimiter).map_err(|_| {
            ApiError::ExportError(format!(
                "字段分隔符 '{}' 不是单字节字符",
                settings.field_delimiter
            ))
        })?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(output)?;

        let mut header: Vec<&str> = EmployeeField::ALL.iter().map(|f| f.as_str()).collect();
        header.push("error");
        writer.write_record(&header)?;

        let mut count = 0;
        for record in session.records() {
            let CommitOutcome::Failed(message) = record.outcome() else {
                continue;
            };

            let mut row: Vec<String> = EmployeeField::ALL
                .iter()
                .map(|f| record.field(*f).export_text(settings.list_delimiter))
                .collect();
            row.push(message.clone());
            writer.write_record(&row)?;
            count += 1;
        }

        writer
            .flush()
            .map_err(|e| ApiError::ExportError(e.to_string()))?;

        info!(output = %output.display(), count, "失败明细导出完成");
        Ok(count)
    }
}
