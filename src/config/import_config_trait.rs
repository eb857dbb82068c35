// ==========================================
// 员工批量导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::error::ImporterResult;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 文件格式配置 =====

    /// 获取字段分隔符
    ///
    /// # 默认值
    /// - ','
    async fn get_field_delimiter(&self) -> ImporterResult<char>;

    /// 获取列表字段内部分隔符（如 skills）
    ///
    /// # 默认值
    /// - ','
    async fn get_list_delimiter(&self) -> ImporterResult<char>;

    // ===== 校验规则配置 =====

    /// 获取年龄闭区间
    ///
    /// # 默认值
    /// - (18, 100)
    async fn get_age_range(&self) -> ImporterResult<(i64, i64)>;

    /// 获取薪资闭区间
    ///
    /// # 默认值
    /// - (0, 1_000_000)
    async fn get_salary_range(&self) -> ImporterResult<(i64, i64)>;

    /// 获取员工号格式正则
    ///
    /// # 返回
    /// - Some(pattern): 需校验格式
    /// - None: 配置为空串时关闭格式校验
    ///
    /// # 默认值
    /// - ^EMP\d{3,}$
    async fn get_employee_id_pattern(&self) -> ImporterResult<Option<String>>;

    // ===== 提交配置 =====

    /// 获取提交并发度
    ///
    /// # 默认值
    /// - 1（逐条串行提交）
    async fn get_commit_concurrency(&self) -> ImporterResult<usize>;
}
