// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库初始化、配置写入、可编排的模拟存储
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use employee_import::config::{ConfigManager, ImportConfigReader, ImportSettings};
use employee_import::db::{init_schema, open_sqlite_connection};
use employee_import::domain::EmployeeRecord;
use employee_import::importer::ImporterResult;
use employee_import::repository::{EmployeeStore, RepositoryError, RepositoryResult};
use std::collections::HashSet;
use std::error::Error;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::NamedTempFile;

pub const STANDARD_HEADER: &str = "employee_id,name,age,department,salary,hire_date";

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 写入 global 配置
pub fn insert_test_config(db_path: &str, entries: &[(&str, &str)]) -> Result<(), Box<dyn Error>> {
    let manager = ConfigManager::new(db_path)?;
    for (key, value) in entries {
        manager.set_global_config_value(key, value)?;
    }
    Ok(())
}

/// 把文本写入临时 CSV 文件
pub fn write_temp_csv(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// 标准表头 + 数据行
pub fn csv_with_rows(rows: &[&str]) -> String {
    let mut text = String::from(STANDARD_HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text
}

/// 一行合法数据
pub fn valid_row(employee_id: &str) -> String {
    format!("{},John Doe,30,Engineering,85000,2024-01-15", employee_id)
}

// ==========================================
// MockEmployeeStore - 可编排的模拟存储
// ==========================================
#[derive(Default)]
pub struct MockEmployeeStore {
    existing: Mutex<HashSet<String>>,
    reject_ids: HashSet<String>, // 创建时按重复拒绝
    fail_listing: bool,          // list_employee_ids 返回错误
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    created: Mutex<Vec<String>>,
}

impl MockEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing(ids: &[&str]) -> Self {
        Self {
            existing: Mutex::new(ids.iter().map(|s| s.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn rejecting(mut self, ids: &[&str]) -> Self {
        self.reject_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmployeeStore for MockEmployeeStore {
    async fn list_employee_ids(&self) -> RepositoryResult<HashSet<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            return Err(RepositoryError::DatabaseConnectionError(
                "store unavailable".to_string(),
            ));
        }
        Ok(self.existing.lock().unwrap().clone())
    }

    async fn create_employee(&self, employee: &EmployeeRecord) -> RepositoryResult<String> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let mut existing = self.existing.lock().unwrap();
        if self.reject_ids.contains(&employee.employee_id)
            || existing.contains(&employee.employee_id)
        {
            return Err(RepositoryError::DuplicateKey(employee.employee_id.clone()));
        }

        existing.insert(employee.employee_id.clone());
        self.created.lock().unwrap().push(employee.employee_id.clone());
        Ok(employee.employee_id.clone())
    }
}

// ==========================================
// StaticConfig - 内存配置（不落库）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct StaticConfig(pub ImportSettings);

impl StaticConfig {
    pub fn with_concurrency(concurrency: usize) -> Self {
        Self(ImportSettings {
            commit_concurrency: concurrency,
            ..ImportSettings::default()
        })
    }
}

#[async_trait]
impl ImportConfigReader for StaticConfig {
    async fn get_field_delimiter(&self) -> ImporterResult<char> {
        Ok(self.0.field_delimiter)
    }

    async fn get_list_delimiter(&self) -> ImporterResult<char> {
        Ok(self.0.list_delimiter)
    }

    async fn get_age_range(&self) -> ImporterResult<(i64, i64)> {
        Ok((self.0.rules.age_min, self.0.rules.age_max))
    }

    async fn get_salary_range(&self) -> ImporterResult<(i64, i64)> {
        Ok((self.0.rules.salary_min, self.0.rules.salary_max))
    }

    async fn get_employee_id_pattern(&self) -> ImporterResult<Option<String>> {
        Ok(self.0.rules.employee_id_pattern.clone())
    }

    async fn get_commit_concurrency(&self) -> ImporterResult<usize> {
        Ok(self.0.commit_concurrency)
    }
}
