// ==========================================
// 员工批量导入 - 分隔文本解析器
// ==========================================
// 阶段 0: 原始文本 → RawRow 列表
// 规则: 逐字符扫描，引号切换"引号内"状态，引号外的分隔符结束单元格
// ==========================================

use crate::domain::RawRow;
use crate::importer::employee_importer_trait::FileParser;
use crate::importer::error::{ImportError, ImporterResult, ParseError};
use std::path::Path;
use tracing::{debug, warn};

const QUOTE: char = '"';
const BOM: char = '\u{feff}';

// ==========================================
// DelimitedTextParser
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct DelimitedTextParser {
    delimiter: char,
}

impl Default for DelimitedTextParser {
    fn default() -> Self {
        Self::new(',')
    }
}

impl DelimitedTextParser {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    /// 读取文件并解析（UTF-8）
    pub fn parse_file(&self, file_path: &Path) -> ImporterResult<Vec<RawRow>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let text = std::fs::read_to_string(file_path)?;
        Ok(self.parse_text(&text)?)
    }

    /// 拆分单行为单元格
    ///
    /// 连续两个引号（转义引号）不做特殊处理：状态切换两次，引号本身被丢弃。
    fn split_line(&self, line: &str, line_number: usize) -> Vec<String> {
        let mut cells = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut prev_was_quote = false;
        let mut saw_escaped_quote = false;

        for ch in line.chars() {
            if ch == QUOTE {
                if prev_was_quote {
                    saw_escaped_quote = true;
                }
                in_quotes = !in_quotes;
                prev_was_quote = true;
                continue;
            }
            prev_was_quote = false;

            if ch == self.delimiter && !in_quotes {
                cells.push(std::mem::take(&mut current));
            } else {
                current.push(ch);
            }
        }
        cells.push(current);

        if saw_escaped_quote {
            warn!(
                line_number = line_number,
                "检测到连续双引号，按两次引号切换处理（未解释为转义引号）"
            );
        }
        if in_quotes {
            warn!(line_number = line_number, "引号未闭合，行尾内容并入最后一个单元格");
        }

        cells
    }
}

impl FileParser for DelimitedTextParser {
    fn parse_text(&self, text: &str) -> Result<Vec<RawRow>, ParseError> {
        let text = text.strip_prefix(BOM).unwrap_or(text);

        let rows: Vec<RawRow> = text
            .split('\n')
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.strip_suffix('\r').unwrap_or(line)))
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(line_number, line)| RawRow::new(line_number, self.split_line(line, line_number)))
            .collect();

        match rows.len() {
            0 => Err(ParseError::EmptyInput),
            1 => Err(ParseError::MissingDataRows {
                header_line: rows[0].line_number,
            }),
            n => {
                debug!(rows = n, delimiter = %self.delimiter, "文本解析完成");
                Ok(rows)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn cells(row: &RawRow) -> Vec<&str> {
        row.cells.iter().map(|c| c.as_str()).collect()
    }

    #[test]
    fn test_parse_simple_rows() {
        let parser = DelimitedTextParser::default();
        let rows = parser
            .parse_text("employee_id,name\nEMP001,John\nEMP002,Jane\n")
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(cells(&rows[0]), vec!["employee_id", "name"]);
        assert_eq!(cells(&rows[2]), vec!["EMP002", "Jane"]);
    }

    #[test]
    fn test_quoted_delimiter_is_preserved() {
        let parser = DelimitedTextParser::default();
        let rows = parser
            .parse_text("id,skills,name\nEMP001,\"Rust, Go\",John\n")
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(cells(&rows[1]), vec!["EMP001", "Rust, Go", "John"]);
    }

    #[test]
    fn test_blank_lines_skipped_and_line_numbers_kept() {
        let parser = DelimitedTextParser::default();
        let rows = parser.parse_text("a,b\r\n\r\n   \n1,2\r\n").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].line_number, 4);
        assert_eq!(cells(&rows[1]), vec!["1", "2"]);
    }

    #[test]
    fn test_trailing_empty_cell_emitted() {
        let parser = DelimitedTextParser::default();
        let rows = parser.parse_text("a,b,c\n1,,\n").unwrap();

        assert_eq!(cells(&rows[1]), vec!["1", "", ""]);
    }

    #[test]
    fn test_doubled_quote_toggles_twice() {
        let parser = DelimitedTextParser::default();
        let rows = parser.parse_text("a,b\n\"say \"\"hi\"\"\",x\n").unwrap();

        assert_eq!(cells(&rows[1]), vec!["say hi", "x"]);
    }

    #[test]
    fn test_custom_delimiter() {
        let parser = DelimitedTextParser::new(';');
        let rows = parser.parse_text("a;b\n\"1;5\";2\n").unwrap();

        assert_eq!(cells(&rows[1]), vec!["1;5", "2"]);
    }

    #[test]
    fn test_bom_stripped() {
        let parser = DelimitedTextParser::default();
        let rows = parser.parse_text("\u{feff}employee_id,name\nEMP001,John").unwrap();

        assert_eq!(rows[0].cells[0], "employee_id");
    }

    #[test]
    fn test_empty_input_fails() {
        let parser = DelimitedTextParser::default();
        assert_eq!(parser.parse_text(" \n\n"), Err(ParseError::EmptyInput));
    }

    #[test]
    fn test_header_only_fails() {
        let parser = DelimitedTextParser::default();
        assert_eq!(
            parser.parse_text("\nemployee_id,name\n\n"),
            Err(ParseError::MissingDataRows { header_line: 2 })
        );
    }

    #[test]
    fn test_parse_file_not_found() {
        let parser = DelimitedTextParser::default();
        let result = parser.parse_file(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_parse_file_valid() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "employee_id,name").unwrap();
        writeln!(temp_file, "EMP001,John Doe").unwrap();

        let parser = DelimitedTextParser::default();
        let rows = parser.parse_file(temp_file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].cells[1], "John Doe");
    }
}
