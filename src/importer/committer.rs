// ==========================================
// 员工批量导入 - 提交编排器
// ==========================================
// 职责: 对有效记录快照逐条调用存储创建，汇总 ImportResult
// 红线: 单条失败不中断批次；结果按行序写回
// 并发: 默认串行（逐条 await）；commit_concurrency > 1 时有序限流
// ==========================================

use crate::domain::{CommitFailure, CommitOutcome, EmployeeRecord, ImportResult};
use crate::i18n::t;
use crate::importer::error::ImporterResult;
use crate::importer::session::ImportSession;
use crate::repository::EmployeeStore;
use futures::stream::{self, StreamExt};
use std::time::Instant;
use tracing::{info, warn};

/// 快照中的一条待提交记录
struct PendingCommit {
    index: usize,
    local_id: String,
    employee_id: String,
    payload: Option<EmployeeRecord>, // None = 记录不完整
}

pub struct CommitOrchestrator<'a, S>
where
    S: EmployeeStore + ?Sized,
{
    store: &'a S,
    concurrency: usize,
}

impl<'a, S> CommitOrchestrator<'a, S>
where
    S: EmployeeStore + ?Sized,
{
    /// # 参数
    /// - concurrency: 同时在途的创建请求数（< 1 按 1 处理）
    pub fn new(store: &'a S, concurrency: usize) -> Self {
        Self {
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// 提交会话中的有效记录
    ///
    /// # 返回
    /// - Ok(ImportResult): created_ids / errors 按行序排列
    /// - Err(CommitRejected): 会话不在 Reviewing 阶段
    pub async fn run(&self, session: &mut ImportSession) -> ImporterResult<ImportResult> {
        let start_time = Instant::now();
        let snapshot = session.begin_commit()?;

        let pending: Vec<PendingCommit> = snapshot
            .into_iter()
            .map(|index| {
                let record = &session.records()[index];
                PendingCommit {
                    index,
                    local_id: record.local_id.clone(),
                    employee_id: record.employee_id().unwrap_or_default().to_string(),
                    payload: record.to_employee_record(),
                }
            })
            .collect();

        info!(
            session_id = %session.session_id(),
            valid = pending.len(),
            concurrency = self.concurrency,
            "开始提交"
        );

        let mut result = ImportResult {
            session_id: session.session_id().to_string(),
            ..ImportResult::default()
        };

        if self.concurrency == 1 {
            for item in pending {
                let outcome = self.attempt(item.payload.as_ref()).await;
                Self::record_outcome(session, &mut result, &item, outcome);
            }
        } else {
            let outcomes: Vec<(PendingCommit, Result<String, String>)> = stream::iter(pending)
                .map(|item| async move {
                    let outcome = self.attempt(item.payload.as_ref()).await;
                    (item, outcome)
                })
                .buffered(self.concurrency)
                .collect()
                .await;

            for (item, outcome) in outcomes {
                Self::record_outcome(session, &mut result, &item, outcome);
            }
        }

        session.finish_commit()?;
        result.elapsed_ms = start_time.elapsed().as_millis() as u64;

        info!(
            session_id = %result.session_id,
            created = result.created(),
            failed = result.failed(),
            elapsed_ms = result.elapsed_ms,
            "提交完成"
        );
        Ok(result)
    }

    async fn attempt(&self, payload: Option<&EmployeeRecord>) -> Result<String, String> {
        let employee = payload.ok_or_else(|| t("commit.incomplete_record"))?;
        self.store
            .create_employee(employee)
            .await
            .map_err(|e| e.to_string())
    }

    fn record_outcome(
        session: &mut ImportSession,
        result: &mut ImportResult,
        item: &PendingCommit,
        outcome: Result<String, String>,
    ) {
        match outcome {
            Ok(stored_id) => {
                session.set_record_outcome(item.index, CommitOutcome::Created);
                result.created_ids.push(stored_id);
            }
            Err(message) => {
                warn!(
                    local_id = %item.local_id,
                    employee_id = %item.employee_id,
                    error = %message,
                    "记录提交失败"
                );
                session.set_record_outcome(item.index, CommitOutcome::Failed(message.clone()));
                result.errors.push(CommitFailure {
                    local_id: item.local_id.clone(),
                    employee_id: item.employee_id.clone(),
                    message,
                });
            }
        }
    }
}
