use anyhow::Context;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use where_rule_group::config::FieldCatalog;
use where_rule_group::sql_formatter::SqlFormatter;
use where_rule_group::transform;

/// 字段配置文件名（当前工作目录）
const FIELD_SOURCES_FILE: &str = "field_sources.json";

/// 演示用的复杂 WHERE 子句
const DEMO_WHERE_CLAUSE: &str = r#"
(
  (field1 + field2 * 2 < 100 OR status IN ('active', 'pending'))
  AND field3 IS NOT NULL
  AND discount BETWEEN 10 AND 50
  AND name LIKE 'A%'
  AND COALESCE(price, CASE WHEN category = 'electronics' THEN 99 ELSE 49 END) = 99
  AND field4 IS NULL
  AND score > COALESCE(discounted_price, CASE WHEN field5 = 'gold' THEN 200 ELSE 100 END)
)
"#;

/// 加载字段配置，失败时不使用字段描述
fn load_field_catalog() -> FieldCatalog {
    match FieldCatalog::from_json_file(FIELD_SOURCES_FILE) {
        Ok(catalog) => {
            info!(fields = catalog.len(), "loaded field catalog from {}", FIELD_SOURCES_FILE);
            catalog
        }
        Err(e) => {
            warn!("{}, continuing without field descriptors", e);
            FieldCatalog::default()
        }
    }
}

/// 转换一个 WHERE 子句并打印 RuleGroup JSON 与回转后的 SQL
fn run_once(where_clause: &str, catalog: &FieldCatalog, formatter: &SqlFormatter) -> anyhow::Result<()> {
    let fields = (!catalog.is_empty()).then(|| catalog.as_slice());
    let group = transform(where_clause, fields)?;

    println!("{}", serde_json::to_string_pretty(&group)?);

    // 回转：RuleGroup → SQL
    match formatter.format(&group) {
        Ok(sql) => println!("-- round-trip: {}", sql),
        Err(e) => warn!("round-trip formatting failed: {}", e),
    }
    Ok(())
}

fn repl(catalog: &FieldCatalog, formatter: &SqlFormatter) -> anyhow::Result<()> {
    println!("--- WHERE → RuleGroup ---");
    println!("输入 WHERE 子句；:demo 运行示例，:quit 退出");

    let mut editor = DefaultEditor::new().context("failed to start line editor")?;

    loop {
        match editor.readline("where> ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                editor.add_history_entry(input)?;

                let result = match input {
                    ":quit" | ":q" => break,
                    ":demo" => {
                        println!("{}", DEMO_WHERE_CLAUSE.trim());
                        run_once(DEMO_WHERE_CLAUSE, catalog, formatter)
                    }
                    _ => run_once(input, catalog, formatter),
                };

                if let Err(e) = result {
                    println!("✗ {}", e);
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let catalog = load_field_catalog();
    let formatter = SqlFormatter::new();

    // 有命令行参数时只转换一次
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        return run_once(&args.join(" "), &catalog, &formatter);
    }

    repl(&catalog, &formatter)
}
