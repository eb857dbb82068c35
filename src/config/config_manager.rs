// ==========================================
// 员工批量导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (scope_id + key → value)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::config::import_settings::{ValidationRules, DEFAULT_EMPLOYEE_ID_PATTERN};
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::importer::error::{ImportError, ImporterResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ImporterResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(|e| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ImporterResult<Self> {
        {
            let guard = conn.lock().map_err(|e| lock_error(e.to_string()))?;
            configure_sqlite_connection(&guard).map_err(|e| ImportError::ConfigReadError {
                key: "*".to_string(),
                message: e.to_string(),
            })?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ImporterResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| lock_error(e.to_string()))?;

        conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ImporterResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ImporterResult<()> {
        let conn = self.conn.lock().map_err(|e| lock_error(e.to_string()))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> ImporterResult<String> {
        let conn = self.conn.lock().map_err(|e| lock_error(e.to_string()))?;
        let to_err = |e: rusqlite::Error| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        };

        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")
            .map_err(to_err)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(to_err)?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row.map_err(to_err)?;
            config_map.insert(key, value);
        }

        Ok(json!(config_map).to_string())
    }

    /// 读取数值配置，格式错误时记录告警并使用默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ImporterResult<T>
    where
        T: FromStr + Copy,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                    Ok(default)
                }
            },
        }
    }

    /// 读取闭区间配置（min > max 时回退默认值）
    fn get_range_or_default(
        &self,
        min_key: &str,
        max_key: &str,
        default: (i64, i64),
    ) -> ImporterResult<(i64, i64)> {
        let min = self.get_parsed_or_default(min_key, default.0)?;
        let max = self.get_parsed_or_default(max_key, default.1)?;

        if min > max {
            tracing::warn!(min_key, max_key, min, max, "区间配置无效（min > max），使用默认值");
            return Ok(default);
        }
        Ok((min, max))
    }

    /// 读取分隔符配置（支持 "tab" / "\t"）
    fn get_delimiter_or_default(&self, key: &str, default: char) -> ImporterResult<char> {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.as_str() {
            "tab" | "\\t" | "\t" => return Ok('\t'),
            _ => {}
        }

        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c != '"' && c != '\n' && c != '\r' => Ok(c),
            _ => {
                tracing::warn!(config_key = key, raw_value = %raw, "分隔符配置无效，使用默认值");
                Ok(default)
            }
        }
    }
}

fn lock_error(message: String) -> ImportError {
    ImportError::ConfigReadError {
        key: "*".to_string(),
        message: format!("锁获取失败: {}", message),
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_field_delimiter(&self) -> ImporterResult<char> {
        self.get_delimiter_or_default(config_keys::FIELD_DELIMITER, ',')
    }

    async fn get_list_delimiter(&self) -> ImporterResult<char> {
        self.get_delimiter_or_default(config_keys::LIST_DELIMITER, ',')
    }

    async fn get_age_range(&self) -> ImporterResult<(i64, i64)> {
        let defaults = ValidationRules::default();
        self.get_range_or_default(
            config_keys::AGE_MIN,
            config_keys::AGE_MAX,
            (defaults.age_min, defaults.age_max),
        )
    }

    async fn get_salary_range(&self) -> ImporterResult<(i64, i64)> {
        let defaults = ValidationRules::default();
        self.get_range_or_default(
            config_keys::SALARY_MIN,
            config_keys::SALARY_MAX,
            (defaults.salary_min, defaults.salary_max),
        )
    }

    async fn get_employee_id_pattern(&self) -> ImporterResult<Option<String>> {
        match self.get_config_value(config_keys::EMPLOYEE_ID_PATTERN)? {
            None => Ok(Some(DEFAULT_EMPLOYEE_ID_PATTERN.to_string())),
            Some(v) if v.trim().is_empty() => Ok(None),
            Some(v) => Ok(Some(v.trim().to_string())),
        }
    }

    async fn get_commit_concurrency(&self) -> ImporterResult<usize> {
        let value = self.get_parsed_or_default(config_keys::COMMIT_CONCURRENCY, 1usize)?;
        Ok(value.max(1))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 文件格式
    pub const FIELD_DELIMITER: &str = "import_field_delimiter";
    pub const LIST_DELIMITER: &str = "import_list_delimiter";

    // 校验规则
    pub const AGE_MIN: &str = "employee_age_min";
    pub const AGE_MAX: &str = "employee_age_max";
    pub const SALARY_MIN: &str = "employee_salary_min";
    pub const SALARY_MAX: &str = "employee_salary_max";
    pub const EMPLOYEE_ID_PATTERN: &str = "employee_id_pattern";

    // 提交
    pub const COMMIT_CONCURRENCY: &str = "import_commit_concurrency";
}
