// Tool registry - Capability kinds mapped to their implementations

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::app::step_runner::StepInput;
use crate::domain::errors::*;
use crate::domain::model::*;

/// One processing capability
#[async_trait]
pub trait Tool: Send + Sync {
    fn kind(&self) -> ToolKind;

    /// One-line summary shown to the planner and in tool listings
    fn description(&self) -> &'static str;

    /// Transform `input.video` into a new artifact
    async fn apply(&self, input: &StepInput) -> Result<StepOutput, DomainError>;
}

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// Registration table built once at startup
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<ToolKind, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own kind; a later registration replaces an earlier one
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> &mut Self {
        self.tools.insert(tool.kind(), tool);
        self
    }

    pub fn get(&self, kind: ToolKind) -> Option<Arc<dyn Tool>> {
        self.tools.get(&kind).cloned()
    }

    /// Resolve a plan step name
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>, DomainError> {
        let kind: ToolKind = name.parse()?;
        self.get(kind).ok_or_else(|| DomainError::UnknownTool {
            name: name.to_string(),
        })
    }

    /// Registered names, in canonical order
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().map(|kind| kind.as_str().to_string()).collect()
    }

    pub fn catalog(&self) -> Vec<ToolInfo> {
        self.tools
            .values()
            .map(|tool| ToolInfo {
                name: tool.kind().as_str(),
                description: tool.description(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NamedTool(ToolKind);

    #[async_trait]
    impl Tool for NamedTool {
        fn kind(&self) -> ToolKind {
            self.0
        }

        fn description(&self) -> &'static str {
            "test tool"
        }

        async fn apply(&self, input: &StepInput) -> Result<StepOutput, DomainError> {
            Ok(StepOutput {
                output_path: input.output_path(self.0),
                segments_path: None,
                processing_step: self.0,
            })
        }
    }

    #[test]
    fn test_lookup_registered_and_unknown() {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(NamedTool(ToolKind::AddMusic)))
            .register(Arc::new(NamedTool(ToolKind::RemoveDuplicates)));

        assert_eq!(registry.lookup("add_music").unwrap().kind(), ToolKind::AddMusic);
        assert_eq!(registry.names(), vec!["remove_duplicates", "add_music"]);

        // Valid kind that was never registered
        let err = registry.lookup("add_broll").err().unwrap();
        assert!(matches!(err, DomainError::UnknownTool { ref name } if name == "add_broll"));

        // Not a kind at all
        let err = registry.lookup("explode").err().unwrap();
        assert_eq!(err.to_string(), "No tool registered for 'explode'");
    }

    #[test]
    fn test_catalog_descriptions() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool(ToolKind::AddCaptions)));
        assert_eq!(
            registry.catalog(),
            vec![ToolInfo {
                name: "add_captions",
                description: "test tool"
            }]
        );
        assert_eq!(registry.len(), 1);
    }
}
