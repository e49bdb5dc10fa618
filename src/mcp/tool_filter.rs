//! Which Unity tools the MCP host gets to see and call.

use crate::config::ToolFilter;
use crate::error::{BridgeError, Result};
use crate::mcp::types::ToolDefinition;
use tracing::debug;

fn lists(names: &Option<Vec<String>>, tool_name: &str) -> Option<bool> {
    names
        .as_deref()
        .map(|names| names.iter().any(|name| name == tool_name))
}

impl ToolFilter {
    /// On the include list when there is one, and never on the exclude list
    pub fn allows(&self, tool_name: &str) -> bool {
        lists(&self.include, tool_name).unwrap_or(true)
            && !lists(&self.exclude, tool_name).unwrap_or(false)
    }
}

/// Drop the tools the filter hides from Unity's catalog, keeping Unity's order
pub(crate) fn filter_catalog(
    tools: Vec<ToolDefinition>,
    filter: Option<&ToolFilter>,
) -> Vec<ToolDefinition> {
    let Some(filter) = filter else {
        return tools;
    };

    let (visible, hidden): (Vec<_>, Vec<_>) = tools
        .into_iter()
        .partition(|tool| filter.allows(&tool.name));

    if !hidden.is_empty() {
        let names: Vec<&str> = hidden.iter().map(|tool| tool.name.as_str()).collect();
        debug!("Hiding {} Unity tools: {}", names.len(), names.join(", "));
    }

    visible
}

/// Refuse calls to tools the host was never shown
pub(crate) fn ensure_callable(tool_name: &str, filter: Option<&ToolFilter>) -> Result<()> {
    match filter {
        Some(filter) if !filter.allows(tool_name) => {
            Err(BridgeError::ToolNotAllowed(tool_name.to_string()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filter(include: Option<&[&str]>, exclude: Option<&[&str]>) -> ToolFilter {
        let owned = |names: &[&str]| -> Vec<String> { names.iter().map(|n| n.to_string()).collect() };
        ToolFilter {
            include: include.map(owned),
            exclude: exclude.map(owned),
        }
    }

    fn catalog(names: &[&str]) -> Vec<ToolDefinition> {
        names
            .iter()
            .map(|name| ToolDefinition {
                name: name.to_string(),
                description: None,
                input_schema: json!({"type": "object"}),
            })
            .collect()
    }

    #[test]
    fn test_empty_filter_allows_everything() {
        let open = filter(None, None);
        assert!(open.allows("get_scene"));
        assert!(open.allows(""));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let f = filter(
            Some(&["get_scene", "run_menu_item"]),
            Some(&["run_menu_item"]),
        );
        assert!(f.allows("get_scene"));
        assert!(!f.allows("run_menu_item"));
        assert!(!f.allows("enter_play_mode"));
    }

    #[test]
    fn test_empty_include_list_hides_everything() {
        let f = filter(Some(&[]), None);
        let tools = catalog(&["get_scene", "find_object"]);
        assert!(filter_catalog(tools, Some(&f)).is_empty());
    }

    #[test]
    fn test_filter_catalog_keeps_order() {
        let tools = catalog(&["get_scene", "delete_asset", "find_object", "delete_scene"]);
        let f = filter(None, Some(&["delete_asset", "delete_scene"]));

        let names: Vec<String> = filter_catalog(tools, Some(&f))
            .into_iter()
            .map(|tool| tool.name)
            .collect();
        assert_eq!(names, vec!["get_scene", "find_object"]);

        assert_eq!(filter_catalog(catalog(&["a", "b"]), None).len(), 2);
    }

    #[test]
    fn test_ensure_callable() {
        let f = filter(Some(&["get_scene"]), None);

        assert!(ensure_callable("delete_asset", None).is_ok());
        assert!(ensure_callable("get_scene", Some(&f)).is_ok());
        assert!(matches!(
            ensure_callable("delete_asset", Some(&f)),
            Err(BridgeError::ToolNotAllowed(name)) if name == "delete_asset"
        ));
    }
}
