// ==========================================
// 员工批量导入 - 字段映射器实现
// ==========================================
// 阶段 1: 表头 + 数据行 → CandidateRecord
// 职责: 表头别名解析 + 按字段类型转换
// 红线: 转换失败不抛错，保留原文交给校验器报告
// ==========================================

use crate::domain::{
    CandidateRecord, EmployeeField, FieldKind, FieldSlot, FieldValue, RawRow,
};
use crate::importer::employee_importer_trait::FieldMapper as FieldMapperTrait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// 严格日期字面量（YYYY-MM-DD）
pub static DATE_LITERAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

#[derive(Debug, Clone, Copy)]
pub struct FieldMapper {
    list_delimiter: char,
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new(',')
    }
}

impl FieldMapper {
    pub fn new(list_delimiter: char) -> Self {
        Self { list_delimiter }
    }

    /// 表头归一化: TRIM + 小写 + 空格/连字符 → 下划线
    fn normalize_header(header: &str) -> String {
        header
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect()
    }

    /// 解析表头各列对应的字段（重复列只取第一列）
    fn resolve_columns(&self, header: &RawRow) -> Vec<(usize, EmployeeField)> {
        let mut columns: Vec<(usize, EmployeeField)> = Vec::new();

        for (idx, cell) in header.cells.iter().enumerate() {
            match self.resolve_header(cell) {
                Some(field) if columns.iter().any(|(_, f)| *f == field) => {
                    warn!(column = idx + 1, header = %cell, field = %field, "重复表头列，已忽略");
                }
                Some(field) => columns.push((idx, field)),
                None => debug!(column = idx + 1, header = %cell, "未知表头列，已忽略"),
            }
        }

        columns
    }
}

impl FieldMapperTrait for FieldMapper {
    fn resolve_header(&self, header: &str) -> Option<EmployeeField> {
        // 列名别名映射（兼容导出文件表头）
        match Self::normalize_header(header).as_str() {
            "employee_id" | "employeeid" | "emp_id" | "id" => Some(EmployeeField::EmployeeId),
            "name" | "full_name" | "employee_name" => Some(EmployeeField::Name),
            "age" => Some(EmployeeField::Age),
            "department" | "dept" => Some(EmployeeField::Department),
            "salary" | "compensation" => Some(EmployeeField::Salary),
            "hire_date" | "hiredate" | "effective_date" | "start_date" => {
                Some(EmployeeField::HireDate)
            }
            "status" => Some(EmployeeField::Status),
            "skills" | "skill" => Some(EmployeeField::Skills),
            _ => None,
        }
    }

    fn coerce(&self, field: EmployeeField, raw: &str) -> FieldSlot {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FieldSlot::Absent;
        }

        match field.kind() {
            FieldKind::Identifier => FieldSlot::Value(FieldValue::Text(trimmed.to_uppercase())),
            FieldKind::Text => FieldSlot::Value(FieldValue::Text(trimmed.to_string())),
            FieldKind::Integer => trimmed
                .parse::<i64>()
                .map(|v| FieldSlot::Value(FieldValue::Integer(v)))
                .unwrap_or_else(|_| FieldSlot::Invalid(trimmed.to_string())),
            FieldKind::Date => {
                if !DATE_LITERAL_PATTERN.is_match(trimmed) {
                    return FieldSlot::Invalid(trimmed.to_string());
                }
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                    .map(|d| FieldSlot::Value(FieldValue::Date(d)))
                    .unwrap_or_else(|_| FieldSlot::Invalid(trimmed.to_string()))
            }
            FieldKind::List => {
                let items: Vec<String> = trimmed
                    .split(self.list_delimiter)
                    .map(|item| item.trim())
                    .filter(|item| !item.is_empty())
                    .map(|item| item.to_string())
                    .collect();

                if items.is_empty() {
                    FieldSlot::Absent
                } else {
                    FieldSlot::Value(FieldValue::List(items))
                }
            }
        }
    }

    fn map_rows(&self, header: &RawRow, rows: &[RawRow]) -> Vec<CandidateRecord> {
        let columns = self.resolve_columns(header);

        for field in EmployeeField::ALL.iter().filter(|f| f.is_required()) {
            if !columns.iter().any(|(_, f)| f == field) {
                warn!(field = %field, "表头缺少必填字段，所有记录该字段视为缺失");
            }
        }

        rows.iter()
            .enumerate()
            .map(|(idx, row)| {
                let mut fields = BTreeMap::new();
                for field in EmployeeField::ALL {
                    fields.insert(field, FieldSlot::Absent);
                }
                for (col_idx, field) in &columns {
                    let slot = row
                        .get(*col_idx)
                        .map(|raw| self.coerce(*field, raw))
                        .unwrap_or(FieldSlot::Absent);
                    fields.insert(*field, slot);
                }

                CandidateRecord::new(format!("row-{}", idx + 1), row.line_number, fields)
            })
            .collect()
    }
}
