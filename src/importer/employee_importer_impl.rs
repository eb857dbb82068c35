// ==========================================
// 员工批量导入 - 导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到会话、从会话到存储
// 流程: 配置快照 → 解析 → 映射 → 拉取已有员工号 → 校验 → (人工修正) → 提交
// ==========================================

use crate::config::{ImportConfigReader, ImportSettings};
use crate::domain::{ImportResult, RawRow};
use crate::importer::committer::CommitOrchestrator;
use crate::importer::employee_importer_trait::{EmployeeImporter, FileParser};
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::DelimitedTextParser;
use crate::importer::record_validator::RecordValidator;
use crate::importer::session::ImportSession;
use crate::repository::EmployeeStore;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// EmployeeImporterImpl - 员工导入器实现
// ==========================================
pub struct EmployeeImporterImpl<S, C>
where
    S: EmployeeStore,
    C: ImportConfigReader,
{
    // 员工存储
    store: S,

    // 配置读取器
    config: C,
}

impl<S, C> EmployeeImporterImpl<S, C>
where
    S: EmployeeStore,
    C: ImportConfigReader,
{
    /// 创建新的 EmployeeImporter 实例
    ///
    /// # 参数
    /// - store: 员工存储
    /// - config: 配置读取器
    pub fn new(store: S, config: C) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn load_settings(&self) -> ImporterResult<ImportSettings> {
        let settings = ImportSettings::load(&self.config).await?;
        debug!(?settings, "导入配置快照");
        Ok(settings)
    }

    /// 拉取已有员工号（失败降级为空集合）
    async fn fetch_existing_ids(&self) -> HashSet<String> {
        match self.store.list_employee_ids().await {
            Ok(ids) => {
                debug!(count = ids.len(), "已有员工号拉取完成");
                ids
            }
            Err(e) => {
                warn!(error = %e, "已有员工号拉取失败，按空集合继续（提交时由存储拦截重复）");
                HashSet::new()
            }
        }
    }

    /// 解析结果 → 复核中的会话
    async fn open_session(
        &self,
        settings: ImportSettings,
        rows: Vec<RawRow>,
    ) -> ImporterResult<ImportSession> {
        let field_mapper = FieldMapper::new(settings.list_delimiter);
        let validator = RecordValidator::new(settings.rules.clone())?;

        let mut session =
            ImportSession::new(settings, Box::new(field_mapper), Box::new(validator));
        tracing::Span::current().record("session_id", session.session_id());

        session.load_rows(&rows)?;
        let existing_ids = self.fetch_existing_ids().await;
        session.begin_review(existing_ids)?;

        Ok(session)
    }
}

#[async_trait::async_trait]
impl<S, C> EmployeeImporter for EmployeeImporterImpl<S, C>
where
    S: EmployeeStore,
    C: ImportConfigReader,
{
    #[instrument(skip(self, file_path), fields(session_id))]
    async fn open_session_from_file(&self, file_path: &Path) -> ImporterResult<ImportSession> {
        info!(file_path = %file_path.display(), "开始导入员工数据");

        let settings = self.load_settings().await?;
        let parser = DelimitedTextParser::new(settings.field_delimiter);
        let rows = parser.parse_file(file_path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;

        self.open_session(settings, rows).await
    }

    #[instrument(skip(self, text), fields(session_id, bytes = text.len()))]
    async fn open_session_from_text(&self, text: &str) -> ImporterResult<ImportSession> {
        let settings = self.load_settings().await?;
        let parser = DelimitedTextParser::new(settings.field_delimiter);
        let rows = parser.parse_text(text).map_err(|e| {
            error!(error = %e, "文本解析失败");
            ImportError::from(e)
        })?;

        self.open_session(settings, rows).await
    }

    #[instrument(skip(self, session), fields(session_id = %session.session_id()))]
    async fn commit(&self, session: &mut ImportSession) -> ImporterResult<ImportResult> {
        let concurrency = session.settings().commit_concurrency;
        CommitOrchestrator::new(&self.store, concurrency)
            .run(session)
            .await
    }
}
