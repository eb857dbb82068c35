// ==========================================
// 员工批量导入 - 配置层
// ==========================================
// 职责: 导入配置读取（分隔符、校验规则、提交并发度）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config_trait;
pub mod import_settings;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImportConfigReader;
pub use import_settings::{
    ImportSettings, ValidationRules, DEFAULT_EMPLOYEE_ID_PATTERN, DEFAULT_NAME_PATTERN,
};
