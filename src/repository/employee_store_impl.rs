// ==========================================
// 员工批量导入 - 员工存储 SQLite 实现
// ==========================================
// 职责: employee 表读写（使用 rusqlite）
// 红线: 只做数据 CRUD，重复员工号由主键约束拦截
// ==========================================

use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::{EmployeeRecord, EmployeeStatus};
use crate::repository::employee_store::EmployeeStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteEmployeeStore
// ==========================================
pub struct SqliteEmployeeStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEmployeeStore {
    /// 创建新的存储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（需已建表）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与 ConfigManager 共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按员工号读取一条记录
    pub fn find_by_id(&self, employee_id: &str) -> RepositoryResult<Option<EmployeeRecord>> {
        let conn = self.get_conn()?;

        let row = conn
            .query_row(
                "SELECT employee_id, name, age, department, salary, hire_date, status, skills
                 FROM employee WHERE employee_id = ?1",
                params![employee_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                        row.get::<_, String>(7)?,
                    ))
                },
            )
            .optional()?;

        let Some((employee_id, name, age, department, salary, hire_date, status, skills)) = row
        else {
            return Ok(None);
        };

        let hire_date = NaiveDate::parse_from_str(&hire_date, "%Y-%m-%d").map_err(|e| {
            RepositoryError::FieldValueError {
                field: "hire_date".to_string(),
                message: e.to_string(),
            }
        })?;
        let status =
            EmployeeStatus::parse(&status).ok_or_else(|| RepositoryError::FieldValueError {
                field: "status".to_string(),
                message: format!("未知状态: {}", status),
            })?;
        let skills: Vec<String> =
            serde_json::from_str(&skills).map_err(|e| RepositoryError::FieldValueError {
                field: "skills".to_string(),
                message: e.to_string(),
            })?;

        Ok(Some(EmployeeRecord {
            employee_id,
            name,
            age,
            department,
            salary,
            hire_date,
            status,
            skills,
        }))
    }

    /// 员工总数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM employee", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl EmployeeStore for SqliteEmployeeStore {
    async fn list_employee_ids(&self) -> RepositoryResult<HashSet<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT employee_id FROM employee")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    async fn create_employee(&self, employee: &EmployeeRecord) -> RepositoryResult<String> {
        let skills = serde_json::to_string(&employee.skills).map_err(|e| {
            RepositoryError::FieldValueError {
                field: "skills".to_string(),
                message: e.to_string(),
            }
        })?;

        let conn = self.get_conn()?;
        let result = conn.execute(
            r#"
            INSERT INTO employee (
                employee_id, name, age, department, salary,
                hire_date, status, skills, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                employee.employee_id,
                employee.name,
                employee.age,
                employee.department,
                employee.salary,
                employee.hire_date.format("%Y-%m-%d").to_string(),
                employee.status.as_str(),
                skills,
                Utc::now().to_rfc3339(),
            ],
        );

        match result.map_err(RepositoryError::from) {
            Ok(_) => Ok(employee.employee_id.clone()),
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                Err(RepositoryError::DuplicateKey(employee.employee_id.clone()))
            }
            Err(e) => Err(e),
        }
    }
}
