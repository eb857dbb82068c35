// ==========================================
// 员工批量导入 - 领域类型定义
// ==========================================
// 职责: 导入会话阶段、员工状态等枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 导入会话阶段 (Import Phase)
// ==========================================
// 状态机: Uploading → Parsed → Reviewing ⇄ Reviewing → Importing → Completed
// 红线: Importing / Completed 阶段禁止修改记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportPhase {
    Uploading, // 等待文件
    Parsed,    // 已解析并映射
    Reviewing, // 人工审核/修正中
    Importing, // 提交中
    Completed, // 提交完成（终态）
}

impl ImportPhase {
    /// 当前阶段是否允许人工修正
    pub fn accepts_edits(&self) -> bool {
        matches!(self, ImportPhase::Reviewing)
    }

    /// 当前阶段是否允许开始提交
    pub fn accepts_commit(&self) -> bool {
        matches!(self, ImportPhase::Reviewing)
    }
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportPhase::Uploading => write!(f, "UPLOADING"),
            ImportPhase::Parsed => write!(f, "PARSED"),
            ImportPhase::Reviewing => write!(f, "REVIEWING"),
            ImportPhase::Importing => write!(f, "IMPORTING"),
            ImportPhase::Completed => write!(f, "COMPLETED"),
        }
    }
}

// ==========================================
// 员工状态 (Employee Status)
// ==========================================
// 序列化格式: snake_case (与存储一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[default]
    Active,
    OnLeave,
    Inactive,
}

impl EmployeeStatus {
    /// 解析状态文本（不区分大小写）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "active" => Some(EmployeeStatus::Active),
            "on_leave" => Some(EmployeeStatus::OnLeave),
            "inactive" => Some(EmployeeStatus::Inactive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::OnLeave => "on_leave",
            EmployeeStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_edit_gate() {
        assert!(ImportPhase::Reviewing.accepts_edits());
        assert!(!ImportPhase::Importing.accepts_edits());
        assert!(!ImportPhase::Completed.accepts_edits());
        assert!(!ImportPhase::Completed.accepts_commit());
    }

    #[test]
    fn test_status_parse_case_insensitive() {
        assert_eq!(EmployeeStatus::parse(" On_Leave "), Some(EmployeeStatus::OnLeave));
        assert_eq!(EmployeeStatus::parse("ACTIVE"), Some(EmployeeStatus::Active));
        assert_eq!(EmployeeStatus::parse("retired"), None);
    }
}
