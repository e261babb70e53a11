use super::entry::SizedItem;
use super::size::format_size;

/// Format options for tree output
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Maximum depth to display
    pub max_depth: Option<usize>,
    /// Show only top N entries per item
    pub top_n: Option<usize>,
    /// Show the number of children of expanded items
    pub show_counts: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(2),
            top_n: Some(15),
            show_counts: false,
        }
    }
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    pub fn with_counts(mut self, show: bool) -> Self {
        self.show_counts = show;
        self
    }

    pub fn unlimited() -> Self {
        Self {
            max_depth: None,
            top_n: None,
            show_counts: false,
        }
    }
}

/// Format an item as a tree string
pub fn format_tree(item: &SizedItem, options: &FormatOptions) -> String {
    let mut output = String::new();
    format_tree_recursive(item, &mut output, "", true, 0, options);
    output
}

fn format_tree_recursive(
    item: &SizedItem,
    output: &mut String,
    prefix: &str,
    is_last: bool,
    depth: usize,
    options: &FormatOptions,
) {
    if let Some(max_depth) = options.max_depth {
        if depth > max_depth {
            return;
        }
    }

    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };

    let error_indicator = if item.error.is_some() { " [!]" } else { "" };

    let count_str = if options.show_counts && !item.children.is_empty() {
        format!(" ({} items)", item.children.len())
    } else {
        String::new()
    };

    output.push_str(&format!(
        "{}{}{:>10}  {}{}{}\n",
        prefix,
        connector,
        format_size(item.size),
        item.name,
        count_str,
        error_indicator
    ));

    if item.children.is_empty() {
        return;
    }

    let new_prefix = if depth == 0 {
        String::new()
    } else if is_last {
        format!("{}    ", prefix)
    } else {
        format!("{}│   ", prefix)
    };

    let shown = options
        .top_n
        .map_or(item.children.len(), |n| n.min(item.children.len()));
    let hidden = item.children.len() - shown;

    // Children past the depth limit are not printed, so neither is the overflow line
    let children_visible = options.max_depth.map_or(true, |max| depth < max);
    if !children_visible {
        return;
    }

    for (i, child) in item.children.iter().take(shown).enumerate() {
        let is_last_child = i + 1 == shown && hidden == 0;
        format_tree_recursive(child, output, &new_prefix, is_last_child, depth + 1, options);
    }

    if hidden > 0 {
        output.push_str(&format!(
            "{}└── ... and {} more entries\n",
            new_prefix, hidden
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_item() -> SizedItem {
        let wrapper = SizedItem::group(
            "wrapper",
            "/g/wrapper",
            vec![SizedItem::new("gradle-8.5-bin", "/g/wrapper/gradle-8.5-bin", 1024)],
        );
        SizedItem::group(
            "Gradle",
            "/g",
            vec![SizedItem::new("caches", "/g/caches", 1048576), wrapper],
        )
    }

    #[test]
    fn test_format_tree_basic() {
        let output = format_tree(&create_test_item(), &FormatOptions::default());

        assert!(output.contains("Gradle"));
        assert!(output.contains("caches"));
        assert!(output.contains("gradle-8.5-bin"));
        assert!(output.contains("1.00 MB"));
    }

    #[test]
    fn test_format_tree_contains_structure() {
        let output = format_tree(&create_test_item(), &FormatOptions::unlimited());
        assert!(output.contains("├──") || output.contains("└──"));
    }

    #[test]
    fn test_format_tree_depth_limit() {
        let options = FormatOptions {
            max_depth: Some(1),
            ..Default::default()
        };
        let output = format_tree(&create_test_item(), &options);

        assert!(output.contains("wrapper"));
        assert!(!output.contains("gradle-8.5-bin"));
    }

    #[test]
    fn test_format_tree_with_counts() {
        let options = FormatOptions::new().with_counts(true);
        let output = format_tree(&create_test_item(), &options);
        assert!(output.contains("(2 items)"));
    }

    #[test]
    fn test_format_tree_top_n() {
        let children = (0..10u64)
            .map(|i| SizedItem::new(format!("item{}", i), format!("/r/item{}", i), 1000 * (10 - i)))
            .collect();
        let root = SizedItem::group("root", "/r", children);

        let output = format_tree(&root, &FormatOptions::new().with_top_n(3));

        assert!(output.contains("item0"));
        assert!(output.contains("item2"));
        assert!(!output.contains("item9"));
        assert!(output.contains("7 more entries"));
    }

    #[test]
    fn test_format_tree_error_entry() {
        let root = SizedItem::group(
            "root",
            "/r",
            vec![SizedItem::new_error(std::path::Path::new("/r/locked"), "Permission denied")],
        );
        let output = format_tree(&root, &FormatOptions::default());
        assert!(output.contains("[!]"));
    }
}
