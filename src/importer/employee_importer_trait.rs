// ==========================================
// 员工批量导入 - 导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 解析 → 映射 → 校验(含冲突检测) → 人工修正 → 提交
// ==========================================

use crate::domain::{CandidateRecord, EmployeeField, FieldError, FieldSlot, ImportResult, RawRow};
use crate::importer::error::{ImporterResult, ParseError};
use crate::importer::session::ImportSession;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

// ==========================================
// EmployeeImporter Trait
// ==========================================
// 用途: 员工导入主接口
// 实现者: EmployeeImporterImpl
#[async_trait]
pub trait EmployeeImporter: Send + Sync {
    /// 从文件打开导入会话
    ///
    /// # 流程
    /// 1. 读取配置快照（分隔符、校验规则）
    /// 2. 解析 + 映射
    /// 3. 拉取存储中已有员工号（失败降级为空集合）
    /// 4. 首轮校验，进入 Reviewing 阶段
    async fn open_session_from_file(&self, file_path: &Path) -> ImporterResult<ImportSession>;

    /// 从文本打开导入会话（流程同上）
    async fn open_session_from_text(&self, text: &str) -> ImporterResult<ImportSession>;

    /// 提交会话中当前有效的记录
    ///
    /// # 返回
    /// - Ok(ImportResult): 逐条提交结果（单条失败不中断批次）
    /// - Err: 会话阶段不允许提交
    async fn commit(&self, session: &mut ImportSession) -> ImporterResult<ImportResult>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文本解析接口（阶段 0）
// 实现者: DelimitedTextParser
pub trait FileParser: Send + Sync {
    /// 解析文本为原始行（首行为表头）
    ///
    /// # 返回
    /// - Err(ParseError): 非空行少于两行
    fn parse_text(&self, text: &str) -> Result<Vec<RawRow>, ParseError>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 字段映射接口（阶段 1），人工修正复用同一转换规则
// 实现者: FieldMapper
pub trait FieldMapper: Send + Sync {
    /// 表头 → 字段（未知表头返回 None）
    fn resolve_header(&self, header: &str) -> Option<EmployeeField>;

    /// 单元格 → 字段槽位
    fn coerce(&self, field: EmployeeField, raw: &str) -> FieldSlot;

    /// 表头 + 数据行 → 候选记录（local_id 按数据行位置分配）
    fn map_rows(&self, header: &RawRow, rows: &[RawRow]) -> Vec<CandidateRecord>;
}

// ==========================================
// RecordValidator Trait
// ==========================================
// 用途: 字段规则 + 重复检测（阶段 2）
// 实现者: RecordValidator
pub trait RecordValidator: Send + Sync {
    /// 计算单条记录的校验错误
    ///
    /// # 参数
    /// - batch_duplicates: 本批次内出现多次的员工号
    /// - existing_ids: 存储中已有的员工号
    fn validate_record(
        &self,
        record: &CandidateRecord,
        batch_duplicates: &HashSet<String>,
        existing_ids: &HashSet<String>,
    ) -> BTreeMap<EmployeeField, FieldError>;

    /// 全批次重新校验（整体替换每条记录的错误）
    fn validate_batch(&self, records: &mut [CandidateRecord], existing_ids: &HashSet<String>);
}

// ==========================================
// ConflictHandler Trait
// ==========================================
// 用途: 员工号冲突检测
// 实现者: ConflictHandler
pub trait ConflictHandler: Send + Sync {
    /// 检测同批次内重复员工号
    ///
    /// # 返回
    /// - Vec<(local_id, employee_id)>: 所有参与冲突的记录（包括第一次出现）
    fn detect_duplicates(&self, records: &[CandidateRecord]) -> Vec<(String, String)>;

    /// 检测与存储重复的员工号
    fn detect_store_duplicates(
        &self,
        records: &[CandidateRecord],
        existing_ids: &HashSet<String>,
    ) -> Vec<(String, String)>;

    /// 批次内出现多次的员工号集合
    fn duplicate_ids(&self, records: &[CandidateRecord]) -> HashSet<String>;
}
