// ==========================================
// 员工批量导入 - 冲突处理器实现
// ==========================================
// 职责: 检测同批次内 / 与存储重复的 employee_id
// 规则: 同批次冲突双方都标记，不区分先后
// ==========================================

use crate::domain::CandidateRecord;
use crate::importer::employee_importer_trait::ConflictHandler as ConflictHandlerTrait;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictHandler;

impl ConflictHandler {
    /// 员工号出现次数
    fn count_ids(records: &[CandidateRecord]) -> HashMap<&str, usize> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for id in records.iter().filter_map(|r| r.employee_id()) {
            *counts.entry(id).or_insert(0) += 1;
        }
        counts
    }
}

impl ConflictHandlerTrait for ConflictHandler {
    fn detect_duplicates(&self, records: &[CandidateRecord]) -> Vec<(String, String)> {
        let counts = Self::count_ids(records);

        records
            .iter()
            .filter_map(|r| {
                let id = r.employee_id()?;
                (counts.get(id).copied().unwrap_or(0) > 1)
                    .then(|| (r.local_id.clone(), id.to_string()))
            })
            .collect()
    }

    fn detect_store_duplicates(
        &self,
        records: &[CandidateRecord],
        existing_ids: &HashSet<String>,
    ) -> Vec<(String, String)> {
        records
            .iter()
            .filter_map(|r| {
                let id = r.employee_id()?;
                existing_ids
                    .contains(id)
                    .then(|| (r.local_id.clone(), id.to_string()))
            })
            .collect()
    }

    fn duplicate_ids(&self, records: &[CandidateRecord]) -> HashSet<String> {
        Self::count_ids(records)
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(id, _)| id.to_string())
            .collect()
    }
}
