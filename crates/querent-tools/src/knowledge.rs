//! Knowledge base lookup over a JSON entry file

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use querent_core::tool::{names, Tool, ToolError, ToolInput};
use querent_core::ToolValue;

pub const NO_ENTRY: &str = "No entry found.";

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeEntry {
    pub name: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeFile {
    #[serde(default)]
    pub entries: Vec<KnowledgeEntry>,
}

impl KnowledgeFile {
    /// First entry whose name contains `query`, ignoring case
    pub fn find(&self, query: &str) -> Option<&KnowledgeEntry> {
        let query = query.trim().to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.name.to_lowercase().contains(&query))
    }
}

/// Reads the entry file on every lookup so edits show up without a restart.
pub struct KnowledgeBaseTool {
    path: PathBuf,
}

impl KnowledgeBaseTool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<KnowledgeFile, ToolError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        serde_json::from_str(&content).map_err(|e| {
            ToolError::Failed(format!(
                "knowledge base '{}' is malformed: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl Tool for KnowledgeBaseTool {
    fn name(&self) -> &str {
        names::KNOWLEDGE_BASE
    }

    fn description(&self) -> &str {
        "Look up a short summary about a person or topic"
    }

    fn operations(&self) -> &[&'static str] {
        &["kb_lookup"]
    }

    async fn call(&self, _operation: &str, input: ToolInput) -> Result<ToolValue, ToolError> {
        let query = input.text("query")?;
        if query.trim().is_empty() {
            return Err(ToolError::invalid("query", "must not be empty"));
        }
        let file = self.load().await?;
        let summary = match file.find(&query) {
            Some(entry) => entry.summary.clone(),
            None => {
                tracing::debug!(query = %query, "no knowledge base entry");
                NO_ENTRY.to_string()
            }
        };
        Ok(ToolValue::Text(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querent_core::ParamValue;
    use std::io::Write;

    const KB: &str = r#"{
        "entries": [
            { "name": "Ada Lovelace", "summary": "Mathematician and first programmer." },
            { "name": "Alan Turing", "summary": "Father of theoretical computer science." }
        ]
    }"#;

    fn kb_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write");
        file
    }

    fn query(text: &str) -> ToolInput {
        ToolInput::new([("query", ParamValue::from(text))].into_iter().collect())
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let file = kb_file(KB);
        let tool = KnowledgeBaseTool::new(file.path());
        let value = tool.call("kb_lookup", query("ada lovelace")).await.expect("lookup");
        assert_eq!(value, ToolValue::from("Mathematician and first programmer."));

        let value = tool.call("kb_lookup", query("Turing")).await.expect("lookup");
        assert_eq!(value, ToolValue::from("Father of theoretical computer science."));
    }

    #[tokio::test]
    async fn test_missing_entry() {
        let file = kb_file(KB);
        let tool = KnowledgeBaseTool::new(file.path());
        let value = tool.call("kb_lookup", query("Grace Hopper")).await.expect("lookup");
        assert_eq!(value, ToolValue::from(NO_ENTRY));
    }

    #[tokio::test]
    async fn test_unreadable_or_malformed_file_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let tool = KnowledgeBaseTool::new(dir.path().join("missing.json"));
        assert!(matches!(
            tool.call("kb_lookup", query("Ada")).await,
            Err(ToolError::Io(_))
        ));

        let file = kb_file("{ not json");
        let tool = KnowledgeBaseTool::new(file.path());
        assert!(matches!(
            tool.call("kb_lookup", query("Ada")).await,
            Err(ToolError::Failed(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let file = kb_file(KB);
        let tool = KnowledgeBaseTool::new(file.path());
        assert!(matches!(
            tool.call("kb_lookup", query("  ")).await,
            Err(ToolError::InvalidParameter { .. })
        ));
    }
}
