// ==========================================
// 员工批量导入 - 记录校验器实现
// ==========================================
// 职责: 字段规则校验 + 员工号冲突标记
// 红线: 纯函数（不读写存储），每轮整体替换 validation_errors
// ==========================================

use crate::config::config_keys;
use crate::config::ValidationRules;
use crate::domain::{
    CandidateRecord, EmployeeField, EmployeeStatus, FieldError, FieldErrorKind, FieldSlot,
};
use crate::i18n::t_with_args;
use crate::importer::conflict_handler::ConflictHandler;
use crate::importer::employee_importer_trait::{
    ConflictHandler as ConflictHandlerTrait, RecordValidator as RecordValidatorTrait,
};
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::field_mapper::DATE_LITERAL_PATTERN;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

pub struct RecordValidator {
    rules: ValidationRules,
    id_pattern: Option<Regex>,   // None 表示不校验格式
    name_pattern: Option<Regex>, // None 表示不限制字符集
    conflict_handler: ConflictHandler,
}

impl RecordValidator {
    /// 按规则快照构建校验器
    ///
    /// # 返回
    /// - Err(ConfigValueError): 员工号或姓名正则无法编译
    pub fn new(rules: ValidationRules) -> ImporterResult<Self> {
        let id_pattern =
            compile_pattern(config_keys::EMPLOYEE_ID_PATTERN, rules.employee_id_pattern.as_deref())?;
        let name_pattern = compile_pattern("name_pattern", rules.name_pattern.as_deref())?;

        Ok(Self {
            rules,
            id_pattern,
            name_pattern,
            conflict_handler: ConflictHandler,
        })
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    fn required(field: EmployeeField) -> FieldError {
        FieldError::new(
            FieldErrorKind::Required,
            t_with_args("validation.required", &[("field", field.as_str())]),
        )
    }

    fn check_employee_id(
        &self,
        slot: &FieldSlot,
        batch_duplicates: &HashSet<String>,
        existing_ids: &HashSet<String>,
    ) -> Option<FieldError> {
        let field = EmployeeField::EmployeeId;
        let id = match slot {
            FieldSlot::Absent => return Some(Self::required(field)),
            FieldSlot::Value(v) if slot.as_text().is_none() => {
                return Some(self.format_error(&v.to_string()))
            }
            FieldSlot::Invalid(raw) => return Some(self.format_error(raw)),
            _ => slot.as_text()?,
        };

        if let Some(err) = self.check_length(
            field,
            id,
            self.rules.employee_id_min_len,
            self.rules.employee_id_max_len,
        ) {
            return Some(err);
        }

        if let Some(pattern) = &self.id_pattern {
            if !pattern.is_match(id) {
                return Some(self.format_error(id));
            }
        }

        // 格式错误优先于重复（重复只对格式正确的员工号报告）
        if batch_duplicates.contains(id) {
            return Some(FieldError::new(
                FieldErrorKind::DuplicateInBatch,
                t_with_args("validation.duplicate_in_batch", &[("id", id)]),
            ));
        }

        if existing_ids.contains(id) {
            return Some(FieldError::new(
                FieldErrorKind::AlreadyExists,
                t_with_args("validation.already_exists", &[("id", id)]),
            ));
        }

        None
    }

    fn format_error(&self, raw: &str) -> FieldError {
        let pattern = self.rules.employee_id_pattern.as_deref().unwrap_or("-");
        FieldError::new(
            FieldErrorKind::InvalidFormat,
            t_with_args(
                "validation.invalid_employee_id",
                &[("value", raw), ("pattern", pattern)],
            ),
        )
    }

    /// 长度校验（按字符计）
    fn check_length(
        &self,
        field: EmployeeField,
        value: &str,
        min: usize,
        max: usize,
    ) -> Option<FieldError> {
        let len = value.chars().count();
        if len < min {
            return Some(FieldError::new(
                FieldErrorKind::TooShort,
                t_with_args(
                    "validation.too_short",
                    &[("field", field.as_str()), ("min", &min.to_string())],
                ),
            ));
        }
        if len > max {
            return Some(FieldError::new(
                FieldErrorKind::TooLong,
                t_with_args(
                    "validation.too_long",
                    &[("field", field.as_str()), ("max", &max.to_string())],
                ),
            ));
        }
        None
    }

    fn check_text(
        &self,
        field: EmployeeField,
        slot: &FieldSlot,
        min: usize,
        max: usize,
    ) -> Option<FieldError> {
        match slot {
            FieldSlot::Absent => Some(Self::required(field)),
            _ => {
                let text = slot.display_text();
                self.check_length(field, text.trim(), min, max)
            }
        }
    }

    fn check_name(&self, slot: &FieldSlot) -> Option<FieldError> {
        let field = EmployeeField::Name;
        if let Some(err) =
            self.check_text(field, slot, self.rules.name_min_len, self.rules.name_max_len)
        {
            return Some(err);
        }

        let text = slot.display_text();
        let name = text.trim();
        match &self.name_pattern {
            Some(pattern) if !pattern.is_match(name) => Some(FieldError::new(
                FieldErrorKind::InvalidFormat,
                t_with_args("validation.invalid_name", &[("value", name)]),
            )),
            _ => None,
        }
    }

    fn check_integer(
        &self,
        field: EmployeeField,
        slot: &FieldSlot,
        min: i64,
        max: i64,
    ) -> Option<FieldError> {
        let value = match slot {
            FieldSlot::Absent => return Some(Self::required(field)),
            _ => match slot.as_integer() {
                Some(v) => v,
                None => {
                    return Some(FieldError::new(
                        FieldErrorKind::InvalidNumber,
                        t_with_args(
                            "validation.invalid_number",
                            &[("field", field.as_str()), ("value", &slot.display_text())],
                        ),
                    ))
                }
            },
        };

        if value < min || value > max {
            return Some(FieldError::new(
                FieldErrorKind::OutOfRange,
                t_with_args(
                    "validation.out_of_range",
                    &[
                        ("field", field.as_str()),
                        ("min", &min.to_string()),
                        ("max", &max.to_string()),
                    ],
                ),
            ));
        }
        None
    }

    fn check_date(&self, field: EmployeeField, slot: &FieldSlot) -> Option<FieldError> {
        match slot {
            FieldSlot::Absent => Some(Self::required(field)),
            _ if slot.as_date().is_some() => None,
            _ => {
                let raw = slot.display_text();
                // 字面格式正确但日历上不存在（如 2024-02-30）
                let (kind, key) = if DATE_LITERAL_PATTERN.is_match(raw.trim()) {
                    (
                        FieldErrorKind::InvalidCalendarDate,
                        "validation.invalid_calendar_date",
                    )
                } else {
                    (FieldErrorKind::InvalidDate, "validation.invalid_date")
                };
                Some(FieldError::new(
                    kind,
                    t_with_args(key, &[("field", field.as_str()), ("value", &raw)]),
                ))
            }
        }
    }

    fn check_status(&self, slot: &FieldSlot) -> Option<FieldError> {
        if slot.is_absent() {
            return None;
        }
        let raw = slot.display_text();
        if EmployeeStatus::parse(&raw).is_some() {
            return None;
        }
        Some(FieldError::new(
            FieldErrorKind::InvalidChoice,
            t_with_args(
                "validation.invalid_choice",
                &[
                    ("field", EmployeeField::Status.as_str()),
                    ("value", &raw),
                    ("choices", "active, on_leave, inactive"),
                ],
            ),
        ))
    }
}

impl RecordValidatorTrait for RecordValidator {
    fn validate_record(
        &self,
        record: &CandidateRecord,
        batch_duplicates: &HashSet<String>,
        existing_ids: &HashSet<String>,
    ) -> BTreeMap<EmployeeField, FieldError> {
        let rules = &self.rules;
        let mut errors = BTreeMap::new();

        for field in EmployeeField::ALL {
            let slot = record.field(field);
            let error = match field {
                EmployeeField::EmployeeId => {
                    self.check_employee_id(slot, batch_duplicates, existing_ids)
                }
                EmployeeField::Name => self.check_name(slot),
                EmployeeField::Department => self.check_text(
                    field,
                    slot,
                    rules.department_min_len,
                    rules.department_max_len,
                ),
                EmployeeField::Age => self.check_integer(field, slot, rules.age_min, rules.age_max),
                EmployeeField::Salary => {
                    self.check_integer(field, slot, rules.salary_min, rules.salary_max)
                }
                EmployeeField::HireDate => self.check_date(field, slot),
                EmployeeField::Status => self.check_status(slot),
                EmployeeField::Skills => None,
            };

            if let Some(err) = error {
                errors.insert(field, err);
            }
        }

        errors
    }

    fn validate_batch(&self, records: &mut [CandidateRecord], existing_ids: &HashSet<String>) {
        let batch_duplicates = self.conflict_handler.duplicate_ids(records);

        for record in records.iter_mut() {
            let errors = self.validate_record(record, &batch_duplicates, existing_ids);
            record.replace_validation_errors(errors);
        }

        let invalid = records.iter().filter(|r| !r.is_valid()).count();
        tracing::debug!(
            total = records.len(),
            invalid,
            batch_duplicate_ids = batch_duplicates.len(),
            "批次校验完成"
        );
    }
}

fn compile_pattern(key: &str, pattern: Option<&str>) -> ImporterResult<Option<Regex>> {
    match pattern {
        None => Ok(None),
        Some(pattern) => Regex::new(pattern)
            .map(Some)
            .map_err(|e| ImportError::ConfigValueError {
                key: key.to_string(),
                value: pattern.to_string(),
                message: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldValue;
    use chrono::NaiveDate;

    fn text(v: &str) -> FieldSlot {
        FieldSlot::Value(FieldValue::Text(v.to_string()))
    }

    fn int(v: i64) -> FieldSlot {
        FieldSlot::Value(FieldValue::Integer(v))
    }

    fn create_test_record(local_id: &str, employee_id: &str) -> CandidateRecord {
        let mut fields = BTreeMap::new();
        fields.insert(EmployeeField::EmployeeId, text(employee_id));
        fields.insert(EmployeeField::Name, text("John Doe"));
        fields.insert(EmployeeField::Age, int(30));
        fields.insert(EmployeeField::Department, text("Engineering"));
        fields.insert(EmployeeField::Salary, int(85000));
        fields.insert(
            EmployeeField::HireDate,
            FieldSlot::Value(FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())),
        );
        CandidateRecord::new(local_id, 2, fields)
    }

    fn validator() -> RecordValidator {
        RecordValidator::new(ValidationRules::default()).unwrap()
    }

    fn error_kind(
        validator: &RecordValidator,
        record: &CandidateRecord,
        field: EmployeeField,
    ) -> Option<FieldErrorKind> {
        validator
            .validate_record(record, &HashSet::new(), &HashSet::new())
            .get(&field)
            .map(|e| e.kind)
    }

    #[test]
    fn test_complete_record_is_valid() {
        let validator = validator();
        let record = create_test_record("row-1", "EMP001");

        let errors = validator.validate_record(&record, &HashSet::new(), &HashSet::new());

        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_required_fields() {
        let validator = validator();
        let record = CandidateRecord::new("row-1", 2, BTreeMap::new());

        let errors = validator.validate_record(&record, &HashSet::new(), &HashSet::new());

        for field in EmployeeField::ALL.iter().filter(|f| f.is_required()) {
            assert_eq!(errors.get(field).map(|e| e.kind), Some(FieldErrorKind::Required));
        }
        assert!(!errors.contains_key(&EmployeeField::Status));
        assert!(!errors.contains_key(&EmployeeField::Skills));
    }

    #[test]
    fn test_employee_id_format_and_length() {
        let validator = validator();

        let record = create_test_record("row-1", "X1");
        assert_eq!(
            error_kind(&validator, &record, EmployeeField::EmployeeId),
            Some(FieldErrorKind::TooShort)
        );

        let record = create_test_record("row-1", "ABC123");
        assert_eq!(
            error_kind(&validator, &record, EmployeeField::EmployeeId),
            Some(FieldErrorKind::InvalidFormat)
        );

        let record = create_test_record("row-1", "EMP000000000000000001");
        assert_eq!(
            error_kind(&validator, &record, EmployeeField::EmployeeId),
            Some(FieldErrorKind::TooLong)
        );
    }

    #[test]
    fn test_pattern_disabled() {
        let rules = ValidationRules {
            employee_id_pattern: None,
            ..ValidationRules::default()
        };
        let validator = RecordValidator::new(rules).unwrap();
        let record = create_test_record("row-1", "ABC123");

        assert_eq!(error_kind(&validator, &record, EmployeeField::EmployeeId), None);
    }

    #[test]
    fn test_bad_pattern_is_config_error() {
        let rules = ValidationRules {
            employee_id_pattern: Some("EMP(".to_string()),
            ..ValidationRules::default()
        };

        let result = RecordValidator::new(rules);

        assert!(matches!(result, Err(ImportError::ConfigValueError { .. })));
    }

    #[test]
    fn test_numeric_rules() {
        let validator = validator();

        let mut record = create_test_record("row-1", "EMP001");
        record.set_field(EmployeeField::Age, int(17));
        record.set_field(EmployeeField::Salary, FieldSlot::Invalid("85k".to_string()));
        let errors = validator.validate_record(&record, &HashSet::new(), &HashSet::new());
        assert_eq!(errors[&EmployeeField::Age].kind, FieldErrorKind::OutOfRange);
        assert_eq!(errors[&EmployeeField::Salary].kind, FieldErrorKind::InvalidNumber);

        record.set_field(EmployeeField::Age, int(100));
        record.set_field(EmployeeField::Salary, int(0));
        let errors = validator.validate_record(&record, &HashSet::new(), &HashSet::new());
        assert!(errors.is_empty());

        record.set_field(EmployeeField::Salary, int(-1));
        assert_eq!(
            error_kind(&validator, &record, EmployeeField::Salary),
            Some(FieldErrorKind::OutOfRange)
        );
    }

    #[test]
    fn test_calendar_date_is_distinguished_from_pattern() {
        let validator = validator();
        let mut record = create_test_record("row-1", "EMP001");

        record.set_field(EmployeeField::HireDate, FieldSlot::Invalid("2024-02-30".to_string()));
        assert_eq!(
            error_kind(&validator, &record, EmployeeField::HireDate),
            Some(FieldErrorKind::InvalidCalendarDate)
        );

        record.set_field(EmployeeField::HireDate, FieldSlot::Invalid("2024-13-01".to_string()));
        assert_eq!(
            error_kind(&validator, &record, EmployeeField::HireDate),
            Some(FieldErrorKind::InvalidCalendarDate)
        );

        record.set_field(EmployeeField::HireDate, FieldSlot::Invalid("15/01/2024".to_string()));
        assert_eq!(
            error_kind(&validator, &record, EmployeeField::HireDate),
            Some(FieldErrorKind::InvalidDate)
        );
    }

    #[test]
    fn test_text_length_rules() {
        let validator = validator();
        let mut record = create_test_record("row-1", "EMP001");

        record.set_field(EmployeeField::Name, text("J"));
        record.set_field(EmployeeField::Department, text(&"D".repeat(51)));
        let errors = validator.validate_record(&record, &HashSet::new(), &HashSet::new());

        assert_eq!(errors[&EmployeeField::Name].kind, FieldErrorKind::TooShort);
        assert_eq!(errors[&EmployeeField::Department].kind, FieldErrorKind::TooLong);
    }

    #[test]
    fn test_name_character_set() {
        let validator = validator();
        let mut record = create_test_record("row-1", "EMP001");

        for ok in ["Mary-Jane O'Neil", "J. R. Smith", "  Anne Marie  "] {
            record.set_field(EmployeeField::Name, text(ok));
            assert_eq!(error_kind(&validator, &record, EmployeeField::Name), None, "{}", ok);
        }

        for bad in ["R2-D2 <x>", "Smith, Alex", "José"] {
            record.set_field(EmployeeField::Name, text(bad));
            assert_eq!(
                error_kind(&validator, &record, EmployeeField::Name),
                Some(FieldErrorKind::InvalidFormat),
                "{}",
                bad
            );
        }

        // 长度错误优先于字符集错误
        record.set_field(EmployeeField::Name, text("#"));
        assert_eq!(
            error_kind(&validator, &record, EmployeeField::Name),
            Some(FieldErrorKind::TooShort)
        );
    }

    #[test]
    fn test_name_pattern_disabled() {
        let rules = ValidationRules {
            name_pattern: None,
            ..ValidationRules::default()
        };
        let validator = RecordValidator::new(rules).unwrap();
        let mut record = create_test_record("row-1", "EMP001");
        record.set_field(EmployeeField::Name, text("R2-D2 <x>"));

        assert_eq!(error_kind(&validator, &record, EmployeeField::Name), None);
    }

    #[test]
    fn test_department_min_length() {
        let validator = validator();
        let mut record = create_test_record("row-1", "EMP001");

        record.set_field(EmployeeField::Department, text("E"));
        assert_eq!(
            error_kind(&validator, &record, EmployeeField::Department),
            Some(FieldErrorKind::TooShort)
        );

        record.set_field(EmployeeField::Department, text("HR"));
        assert_eq!(error_kind(&validator, &record, EmployeeField::Department), None);
    }

    #[test]
    fn test_status_choice() {
        let validator = validator();
        let mut record = create_test_record("row-1", "EMP001");

        record.set_field(EmployeeField::Status, text("On_Leave"));
        assert_eq!(error_kind(&validator, &record, EmployeeField::Status), None);

        record.set_field(EmployeeField::Status, text("retired"));
        assert_eq!(
            error_kind(&validator, &record, EmployeeField::Status),
            Some(FieldErrorKind::InvalidChoice)
        );
    }

    #[test]
    fn test_validate_batch_flags_duplicates_both_ways() {
        let validator = validator();
        let mut records = vec![
            create_test_record("row-1", "EMP001"),
            create_test_record("row-2", "EMP001"),
            create_test_record("row-3", "EMP003"),
        ];
        let existing: HashSet<String> = ["EMP003".to_string()].into_iter().collect();

        validator.validate_batch(&mut records, &existing);

        assert_eq!(
            records[0].validation_errors()[&EmployeeField::EmployeeId].kind,
            FieldErrorKind::DuplicateInBatch
        );
        assert_eq!(
            records[1].validation_errors()[&EmployeeField::EmployeeId].kind,
            FieldErrorKind::DuplicateInBatch
        );
        assert_eq!(
            records[2].validation_errors()[&EmployeeField::EmployeeId].kind,
            FieldErrorKind::AlreadyExists
        );
        assert!(records[0].validation_errors()[&EmployeeField::EmployeeId]
            .message
            .contains("EMP001"));
    }

    #[test]
    fn test_validate_batch_is_idempotent_and_replaces_errors() {
        let validator = validator();
        let mut records = vec![
            create_test_record("row-1", "EMP001"),
            create_test_record("row-2", "EMP001"),
        ];

        validator.validate_batch(&mut records, &HashSet::new());
        let first: Vec<_> = records.iter().map(|r| r.validation_errors().clone()).collect();
        validator.validate_batch(&mut records, &HashSet::new());
        let second: Vec<_> = records.iter().map(|r| r.validation_errors().clone()).collect();
        assert_eq!(first, second);

        records[1].set_field(EmployeeField::EmployeeId, text("EMP002"));
        validator.validate_batch(&mut records, &HashSet::new());
        assert!(records.iter().all(|r| r.is_valid()));
    }
}
