// ==========================================
// 员工批量导入 - 员工领域模型
// ==========================================
// 职责: 原始行、候选记录、字段槽位、提交结果
// 红线: is_valid 只由 validation_errors 推导，不单独存储
// ==========================================

use crate::domain::types::EmployeeStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// RawRow - 解析器输出的原始行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line_number: usize, // 源文件行号（1 起）
    pub cells: Vec<String>, // 单元格（未 trim）
}

impl RawRow {
    pub fn new(line_number: usize, cells: Vec<String>) -> Self {
        Self { line_number, cells }
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.cells.get(idx).map(|c| c.as_str())
    }
}

// ==========================================
// EmployeeField - 目标字段表
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeField {
    EmployeeId,
    Name,
    Age,
    Department,
    Salary,
    HireDate,
    Status,
    Skills,
}

/// 字段类型（决定映射时的类型转换规则）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Identifier, // TRIM + UPPER
    Text,       // TRIM
    Integer,    // 十进制整数
    Date,       // 严格 YYYY-MM-DD
    List,       // 按内部分隔符拆分
}

impl EmployeeField {
    pub const ALL: [EmployeeField; 8] = [
        EmployeeField::EmployeeId,
        EmployeeField::Name,
        EmployeeField::Age,
        EmployeeField::Department,
        EmployeeField::Salary,
        EmployeeField::HireDate,
        EmployeeField::Status,
        EmployeeField::Skills,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeField::EmployeeId => "employee_id",
            EmployeeField::Name => "name",
            EmployeeField::Age => "age",
            EmployeeField::Department => "department",
            EmployeeField::Salary => "salary",
            EmployeeField::HireDate => "hire_date",
            EmployeeField::Status => "status",
            EmployeeField::Skills => "skills",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            EmployeeField::EmployeeId => FieldKind::Identifier,
            EmployeeField::Age | EmployeeField::Salary => FieldKind::Integer,
            EmployeeField::HireDate => FieldKind::Date,
            EmployeeField::Skills => FieldKind::List,
            EmployeeField::Name | EmployeeField::Department | EmployeeField::Status => {
                FieldKind::Text
            }
        }
    }

    /// 必填字段（缺失即校验失败）
    pub fn is_required(&self) -> bool {
        !matches!(self, EmployeeField::Status | EmployeeField::Skills)
    }
}

impl fmt::Display for EmployeeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// FieldValue / FieldSlot - 类型化字段值
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
    List(Vec<String>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(v) => write!(f, "{}", v),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            FieldValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

/// 字段槽位: 缺失 / 无法转换（保留原文）/ 已转换
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum FieldSlot {
    #[default]
    Absent,
    Invalid(String),
    Value(FieldValue),
}

impl FieldSlot {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldSlot::Absent)
    }

    pub fn value(&self) -> Option<&FieldValue> {
        match self {
            FieldSlot::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldSlot::Value(FieldValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldSlot::Value(FieldValue::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldSlot::Value(FieldValue::Date(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldSlot::Value(FieldValue::List(v)) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// 展示用文本（Invalid 返回原文，Absent 返回空串）
    pub fn display_text(&self) -> String {
        match self {
            FieldSlot::Absent => String::new(),
            FieldSlot::Invalid(raw) => raw.clone(),
            FieldSlot::Value(v) => v.to_string(),
        }
    }

    /// 写回分隔文本时使用的文本（列表按给定分隔符拼接）
    pub fn export_text(&self, list_delimiter: char) -> String {
        match self {
            FieldSlot::Value(FieldValue::List(items)) => items.join(&list_delimiter.to_string()),
            _ => self.display_text(),
        }
    }
}

static ABSENT: FieldSlot = FieldSlot::Absent;

// ==========================================
// FieldError - 字段级校验错误
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldErrorKind {
    Required,            // 必填缺失
    InvalidFormat,       // 格式不符
    InvalidNumber,       // 非数字
    OutOfRange,          // 超出范围
    TooShort,            // 长度不足
    TooLong,             // 长度超限
    InvalidDate,         // 不符合 YYYY-MM-DD
    InvalidCalendarDate, // 格式正确但日期不存在
    InvalidChoice,       // 不在枚举范围
    DuplicateInBatch,    // 同批次重复
    AlreadyExists,       // 存储中已存在
}

impl FieldErrorKind {
    /// 是否为重复类错误
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            FieldErrorKind::DuplicateInBatch | FieldErrorKind::AlreadyExists
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

// ==========================================
// CommitOutcome - 单条记录提交结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitOutcome {
    #[default]
    Pending,
    Created,
    Failed(String),
}

// ==========================================
// CandidateRecord - 候选记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub local_id: String,   // 会话内稳定地址（不落库）
    pub row_number: usize,  // 源文件行号
    fields: BTreeMap<EmployeeField, FieldSlot>,
    validation_errors: BTreeMap<EmployeeField, FieldError>,
    outcome: CommitOutcome,
}

impl CandidateRecord {
    pub fn new(
        local_id: impl Into<String>,
        row_number: usize,
        fields: BTreeMap<EmployeeField, FieldSlot>,
    ) -> Self {
        Self {
            local_id: local_id.into(),
            row_number,
            fields,
            validation_errors: BTreeMap::new(),
            outcome: CommitOutcome::Pending,
        }
    }

    pub fn field(&self, field: EmployeeField) -> &FieldSlot {
        self.fields.get(&field).unwrap_or(&ABSENT)
    }

    pub fn fields(&self) -> &BTreeMap<EmployeeField, FieldSlot> {
        &self.fields
    }

    pub(crate) fn set_field(&mut self, field: EmployeeField, slot: FieldSlot) {
        self.fields.insert(field, slot);
    }

    /// 已归一化的员工号（仅当转换成功）
    pub fn employee_id(&self) -> Option<&str> {
        self.field(EmployeeField::EmployeeId).as_text()
    }

    pub fn validation_errors(&self) -> &BTreeMap<EmployeeField, FieldError> {
        &self.validation_errors
    }

    /// 整体替换校验结果（不合并，避免残留旧错误）
    pub(crate) fn replace_validation_errors(
        &mut self,
        errors: BTreeMap<EmployeeField, FieldError>,
    ) {
        self.validation_errors = errors;
    }

    pub fn is_valid(&self) -> bool {
        self.validation_errors.is_empty()
    }

    pub fn outcome(&self) -> &CommitOutcome {
        &self.outcome
    }

    pub(crate) fn set_outcome(&mut self, outcome: CommitOutcome) {
        self.outcome = outcome;
    }

    /// 转换为落库载荷
    ///
    /// # 返回
    /// - Some(EmployeeRecord): 必填字段齐全且类型正确
    /// - None: 记录不完整（调用方应只对有效记录调用）
    pub fn to_employee_record(&self) -> Option<EmployeeRecord> {
        let status = match self.field(EmployeeField::Status) {
            FieldSlot::Absent => EmployeeStatus::default(),
            slot => EmployeeStatus::parse(slot.as_text()?)?,
        };

        Some(EmployeeRecord {
            employee_id: self.employee_id()?.to_string(),
            name: self.field(EmployeeField::Name).as_text()?.to_string(),
            age: self.field(EmployeeField::Age).as_integer()?,
            department: self.field(EmployeeField::Department).as_text()?.to_string(),
            salary: self.field(EmployeeField::Salary).as_integer()?,
            hire_date: self.field(EmployeeField::HireDate).as_date()?,
            status,
            skills: self
                .field(EmployeeField::Skills)
                .as_list()
                .map(|items| items.to_vec())
                .unwrap_or_default(),
        })
    }
}

// ==========================================
// EmployeeRecord - 落库载荷
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: String,
    pub name: String,
    pub age: i64,
    pub department: String,
    pub salary: i64,
    pub hire_date: NaiveDate,
    pub status: EmployeeStatus,
    pub skills: Vec<String>,
}

// ==========================================
// ImportResult - 提交结果汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitFailure {
    pub local_id: String,
    pub employee_id: String,
    pub message: String,
}

/// 提交结果（created/failed 为派生计数，保证两者之和等于尝试数）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportResult {
    pub session_id: String,
    pub created_ids: Vec<String>,
    pub errors: Vec<CommitFailure>,
    pub elapsed_ms: u64,
}

impl ImportResult {
    pub fn created(&self) -> usize {
        self.created_ids.len()
    }

    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    pub fn attempted(&self) -> usize {
        self.created() + self.failed()
    }
}
