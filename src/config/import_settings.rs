// ==========================================
// 员工批量导入 - 导入配置快照
// ==========================================
// 职责: 会话开始时读取一次配置，整个会话内只读
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::importer::error::ImporterResult;
use serde::{Deserialize, Serialize};

/// 默认员工号格式（EMP + 至少 3 位数字）
pub const DEFAULT_EMPLOYEE_ID_PATTERN: &str = r"^EMP\d{3,}$";

/// 默认姓名字符集（字母、空白、点、连字符、撇号）
pub const DEFAULT_NAME_PATTERN: &str = r"^[a-zA-Z\s\.\-']+$";

// ==========================================
// ValidationRules - 字段校验规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    pub employee_id_pattern: Option<String>, // None 表示不校验格式
    pub employee_id_min_len: usize,
    pub employee_id_max_len: usize,
    pub name_min_len: usize,
    pub name_max_len: usize,
    pub name_pattern: Option<String>,
    pub department_min_len: usize,
    pub department_max_len: usize,
    pub age_min: i64,
    pub age_max: i64,
    pub salary_min: i64,
    pub salary_max: i64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            employee_id_pattern: Some(DEFAULT_EMPLOYEE_ID_PATTERN.to_string()),
            employee_id_min_len: 3,
            employee_id_max_len: 20,
            name_min_len: 2,
            name_max_len: 100,
            name_pattern: Some(DEFAULT_NAME_PATTERN.to_string()),
            department_min_len: 2,
            department_max_len: 50,
            age_min: 18,
            age_max: 100,
            salary_min: 0,
            salary_max: 1_000_000,
        }
    }
}

// ==========================================
// ImportSettings - 会话级配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub field_delimiter: char,
    pub list_delimiter: char,
    pub commit_concurrency: usize, // 1 = 严格串行
    pub rules: ValidationRules,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            field_delimiter: ',',
            list_delimiter: ',',
            commit_concurrency: 1,
            rules: ValidationRules::default(),
        }
    }
}

impl ImportSettings {
    /// 从配置读取器加载快照
    pub async fn load<C>(config: &C) -> ImporterResult<Self>
    where
        C: ImportConfigReader + ?Sized,
    {
        let defaults = ValidationRules::default();
        let (age_min, age_max) = config.get_age_range().await?;
        let (salary_min, salary_max) = config.get_salary_range().await?;

        Ok(Self {
            field_delimiter: config.get_field_delimiter().await?,
            list_delimiter: config.get_list_delimiter().await?,
            commit_concurrency: config.get_commit_concurrency().await?.max(1),
            rules: ValidationRules {
                employee_id_pattern: config.get_employee_id_pattern().await?,
                age_min,
                age_max,
                salary_min,
                salary_max,
                ..defaults
            },
        })
    }
}
