//! SQL 生成服务命令行客户端
//!
//! 收集问题、可选 schema 与目标数据库标签，提交给生成服务并展示返回的
//! SQL。交互模式下在本地强制提交冷却时间，避免触发配额限制。

mod api;
mod cooldown;

use std::io::{BufRead, Write as _};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::models::query::{DatabaseType, QueryRequest};

use crate::api::{ApiClient, ClientError};
use crate::cooldown::{GateDecision, SubmissionGate};

#[derive(Parser)]
#[command(name = "sql-console", version, about = "Natural language to SQL using AI")]
struct Cli {
    /// Question to convert into SQL (omit to start interactive mode)
    question: Option<String>,

    /// Generation service URL (defaults to $API_URL, then http://localhost:8000)
    #[arg(long)]
    api_url: Option<String>,

    /// Target database label (PostgreSQL, MySQL, BigQuery, Redshift, Snowflake, SQLite)
    #[arg(long, default_value = "PostgreSQL")]
    database: String,

    /// Read the database schema from this file
    #[arg(long)]
    schema_file: Option<PathBuf>,

    /// Write the generated SQL to this file (one-shot mode only)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志追踪（默认仅告警级别，避免干扰输出）
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let api_url = cli
        .api_url
        .or_else(|| std::env::var("API_URL").ok())
        .unwrap_or_else(|| "http://localhost:8000".to_string());

    let database_type: DatabaseType = cli
        .database
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let schema = match &cli.schema_file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read schema file {}", path.display()))?;
            let trimmed = content.trim().to_string();
            if trimmed.is_empty() { None } else { Some(trimmed) }
        }
        None => None,
    };

    let client = ApiClient::new(&api_url);

    // 启动时探测服务可达性
    if client.health().await {
        println!("API connected: {}", api_url);
    } else {
        println!("API unavailable: {} (is the generation service running?)", api_url);
    }

    match cli.question {
        Some(question) => {
            run_once(&client, &question, schema.as_deref(), database_type, cli.output.as_deref()).await
        }
        None => run_interactive(&client, schema.as_deref(), database_type).await,
    }
}

/// 单次模式：提交一个问题，打印（并可写出）结果
async fn run_once(
    client: &ApiClient,
    question: &str,
    schema: Option<&str>,
    database_type: DatabaseType,
    output: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    if question.trim().is_empty() {
        anyhow::bail!("question must not be empty");
    }

    let req = QueryRequest {
        question: question.trim().to_string(),
        schema: schema.map(String::from),
        database_type,
    };

    match client.generate(&req).await {
        Ok(resp) => {
            println!("\n{}\n", resp.sql_query);
            if let Some(path) = output {
                std::fs::write(path, format!("{}\n", resp.sql_query))
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Saved to {}", path.display());
            }
            Ok(())
        }
        Err(err) => {
            print_client_error(&err);
            Err(anyhow::anyhow!("generation failed"))
        }
    }
}

/// 交互模式：循环读取问题，受本地冷却门限制
async fn run_interactive(
    client: &ApiClient,
    schema: Option<&str>,
    database_type: DatabaseType,
) -> anyhow::Result<()> {
    println!("Target database: {}", database_type);
    println!("Type a question, ':save <path>' to save the last SQL, or 'exit' to quit.\n");

    let mut gate = SubmissionGate::default();
    let mut last_sql: Option<String> = None;

    let stdin = std::io::stdin();
    loop {
        print!("question> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }
        if let Some(path) = input.strip_prefix(":save ") {
            match &last_sql {
                Some(sql) => {
                    std::fs::write(path.trim(), format!("{}\n", sql))
                        .with_context(|| format!("failed to write {}", path.trim()))?;
                    println!("Saved to {}", path.trim());
                }
                None => println!("Nothing to save yet."),
            }
            continue;
        }

        // 冷却检查：窗口内的重复提交不发往服务端
        match gate.check(Instant::now()) {
            GateDecision::Wait(remaining) => {
                println!(
                    "Please wait {} more second(s) before making another request.",
                    remaining.as_secs().max(1)
                );
                continue;
            }
            GateDecision::Allowed => {}
        }

        let req = QueryRequest {
            question: input.to_string(),
            schema: schema.map(String::from),
            database_type,
        };

        gate.record_accepted(Instant::now());
        match client.generate(&req).await {
            Ok(resp) => {
                println!("\n{}\n", resp.sql_query);
                println!("Generated successfully (requests: {})", gate.accepted_count());
                last_sql = Some(resp.sql_query);
            }
            Err(err) => print_client_error(&err),
        }
    }

    Ok(())
}

/// 按错误类别输出人类可读的提示
fn print_client_error(err: &ClientError) {
    match err {
        ClientError::RateLimited(message) => {
            println!("Rate limit exceeded: {}", message);
            println!("Wait a few minutes between requests or check your API quota.");
        }
        ClientError::Network(source) if source.is_timeout() => {
            println!("Request timeout - the API is taking too long to respond.");
        }
        ClientError::Network(source) if source.is_connect() => {
            println!("Cannot connect to the API - make sure the generation service is running.");
        }
        other => println!("Error: {}", other),
    }
}
