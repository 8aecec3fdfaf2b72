//! Remap run options.

/// Options for a remap run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RemapConfig {
    /// Name used in `TODO(<tool>): ...` comments
    pub tool_name: String,
    /// Prefix stripped from `@Shadow` member names before lookup
    pub shadow_prefix: String,
    /// Run the mixin annotation stage
    pub rewrite_mixins: bool,
    /// Insert diagnostic comments into rewritten files
    pub emit_comments: bool,
    /// Threads for the analysis phase (`None` = global rayon pool)
    pub parallelism: Option<usize>,
}

impl Default for RemapConfig {
    fn default() -> Self {
        Self {
            tool_name: "Ravel".to_string(),
            shadow_prefix: "shadow$".to_string(),
            rewrite_mixins: true,
            emit_comments: true,
            parallelism: None,
        }
    }
}

impl RemapConfig {
    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = tool_name.into();
        self
    }

    pub fn with_shadow_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.shadow_prefix = prefix.into();
        self
    }

    pub fn with_mixins(mut self, enabled: bool) -> Self {
        self.rewrite_mixins = enabled;
        self
    }

    pub fn with_comments(mut self, enabled: bool) -> Self {
        self.emit_comments = enabled;
        self
    }

    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads.max(1));
        self
    }

    /// Format a diagnostic comment body, one `//` line per message line.
    pub fn todo_comment(&self, message: &str) -> String {
        let mut out = String::new();
        for (i, line) in message.lines().enumerate() {
            if i == 0 {
                out.push_str(&format!("// TODO({}): {}", self.tool_name, line));
            } else {
                out.push_str("\n// ");
                out.push_str(line);
            }
        }
        out
    }

    /// Load options from JSON. Missing keys keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RemapConfig::default();
        assert_eq!(config.tool_name, "Ravel");
        assert_eq!(config.shadow_prefix, "shadow$");
        assert!(config.rewrite_mixins);
        assert_eq!(config.parallelism, None);
    }

    #[test]
    fn test_todo_comment_lines() {
        let config = RemapConfig::default().with_tool_name("Tool");
        assert_eq!(config.todo_comment("first\nsecond"), "// TODO(Tool): first\n// second");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json_keeps_defaults() {
        let config = RemapConfig::from_json_str(r#"{"shadow_prefix": "s$"}"#).unwrap();
        assert_eq!(config.shadow_prefix, "s$");
        assert_eq!(config.tool_name, "Ravel");
    }
}
