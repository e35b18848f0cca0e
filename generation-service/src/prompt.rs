//! 提示词构造模块

/// 固定的 SQL 生成系统指令（v1）
pub const SYSTEM_PROMPT: &str = "\
You are an expert SQL query generator. Convert natural language to valid SQL.
Rules:
- Generate SQL only, no explanations
- Use standard syntax compatible with PostgreSQL, MySQL, BigQuery, Redshift, Snowflake
- Include proper WHERE, JOIN, GROUP BY clauses as needed
- Use appropriate aggregations (SUM, AVG, COUNT)
- Format with proper indentation
- Return query without markdown blocks";

/// 根据问题与可选 schema 构造用户提示词
///
/// schema 为不透明文本，原样插入，不做任何校验。
pub fn build_prompt(question: &str, schema: Option<&str>) -> String {
    match schema {
        Some(schema) => format!(
            "Database Schema:\n{}\n\nQuestion: {}\n\nGenerate SQL query:",
            schema, question
        ),
        None => format!("Convert to SQL: {}", question),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_schema_contains_question_only() {
        let prompt = build_prompt("show total sales by region", None);
        assert!(prompt.contains("show total sales by region"));
        assert!(!prompt.contains("Database Schema"));
    }

    #[test]
    fn test_prompt_with_schema_contains_both_in_order() {
        let schema = "Table: sales_data\nColumns: id, region, sales, date";
        let question = "show total sales by region";
        let prompt = build_prompt(question, Some(schema));

        let schema_pos = prompt.find(schema).expect("schema text present");
        let question_pos = prompt.find(question).expect("question text present");
        assert!(schema_pos < question_pos, "schema block precedes the question");
    }

    #[test]
    fn test_system_prompt_forbids_markdown() {
        assert!(SYSTEM_PROMPT.contains("without markdown"));
    }
}
