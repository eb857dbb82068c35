// ==========================================
// 员工批量导入 - 命令行入口
// ==========================================
// 用法:
//   employee-import <file> [db_path] [--set local_id:field=value]...
//                   [--commit] [--failures out.csv] [--locale en|zh-CN] [--json]
// ==========================================

use anyhow::{anyhow, bail, Context};
use employee_import::api::{ImportApi, SessionView};
use employee_import::db::default_db_path;
use employee_import::i18n::{is_supported_locale, set_locale, t_with_args};
use employee_import::importer::EditOutcome;
use employee_import::logging;
use std::path::PathBuf;

#[derive(Debug, Default)]
struct CliArgs {
    file: String,
    db_path: Option<String>,
    edits: Vec<(String, String, String)>, // (local_id, field, value)
    commit: bool,
    failures: Option<PathBuf>,
    locale: Option<String>,
    json: bool,
}

fn usage() -> String {
    "usage: employee-import <file> [db_path] [--set local_id:field=value]... \
     [--commit] [--failures out.csv] [--locale en|zh-CN] [--json]"
        .to_string()
}

/// 解析 --set 参数: local_id:field=value
fn parse_edit(raw: &str) -> anyhow::Result<(String, String, String)> {
    let (local_id, rest) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("--set 格式应为 local_id:field=value, 实际: {}", raw))?;
    let (field, value) = rest
        .split_once('=')
        .ok_or_else(|| anyhow!("--set 格式应为 local_id:field=value, 实际: {}", raw))?;
    Ok((local_id.to_string(), field.to_string(), value.to_string()))
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--set" => {
                let raw = args.next().ok_or_else(|| anyhow!("--set 缺少参数"))?;
                cli.edits.push(parse_edit(&raw)?);
            }
            "--commit" => cli.commit = true,
            "--json" => cli.json = true,
            "--failures" => {
                let path = args.next().ok_or_else(|| anyhow!("--failures 缺少参数"))?;
                cli.failures = Some(PathBuf::from(path));
            }
            "--locale" => {
                let locale = args.next().ok_or_else(|| anyhow!("--locale 缺少参数"))?;
                if !is_supported_locale(&locale) {
                    bail!("不支持的语言: {}", locale);
                }
                cli.locale = Some(locale);
            }
            "-h" | "--help" => bail!(usage()),
            other if other.starts_with("--") => bail!("未知参数: {}\n{}", other, usage()),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    cli.file = positional.next().ok_or_else(|| anyhow!(usage()))?;
    cli.db_path = positional.next();
    if let Some(extra) = positional.next() {
        bail!("多余的参数: {}\n{}", extra, usage());
    }

    Ok(cli)
}

fn print_session(view: &SessionView) {
    println!(
        "{}",
        t_with_args(
            "import.session_opened",
            &[
                ("session_id", &view.session_id),
                ("total", &view.total.to_string()),
                ("valid", &view.valid.to_string()),
                ("invalid", &view.invalid.to_string()),
            ],
        )
    );
    for record in view.records.iter().filter(|r| !r.is_valid) {
        for (field, message) in &record.errors {
            println!("  {} (line {}) {}: {}", record.local_id, record.row_number, field, message);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = parse_args(std::env::args().skip(1))?;
    if let Some(locale) = &cli.locale {
        set_locale(locale);
    }

    let db_path = match &cli.db_path {
        Some(path) => path.clone(),
        None => {
            let path = default_db_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("无法创建数据目录: {}", parent.display()))?;
            }
            path.to_string_lossy().to_string()
        }
    };
    tracing::info!(db_path = %db_path, version = employee_import::VERSION, "使用数据库");

    let api = ImportApi::new(db_path);
    api.init_database()?;

    let mut session = api.open_file(&cli.file).await?;

    for (local_id, field, value) in &cli.edits {
        let response = api.apply_edit(&mut session, local_id, field, value)?;
        if response.outcome == EditOutcome::IgnoredUnknownField {
            eprintln!("{}", t_with_args("import.edit_ignored", &[("field", field.as_str())]));
            continue;
        }
        tracing::info!(local_id = %local_id, field = %field, "已应用修改");
    }

    let view = api.view(&session);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_session(&view);
    }

    if !cli.commit {
        return Ok(());
    }

    let response = api.commit(&mut session).await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!(
            "{}",
            t_with_args(
                "import.commit_summary",
                &[
                    ("created", &response.created.to_string()),
                    ("failed", &response.failed.to_string()),
                ],
            )
        );
        for failure in &response.errors {
            println!("  {} {}: {}", failure.local_id, failure.employee_id, failure.message);
        }
    }

    if let Some(path) = &cli.failures {
        api.export_failures_csv(&session, path)?;
    }

    Ok(())
}
