//! Miscellaneus utilities.

/// Render an error and its chain of sources, one per line, each cause
/// indented one step deeper than the error it caused.
pub fn aggregate_error_tree<Error: std::error::Error + 'static>(
    error: &Error,
    indent_step: usize,
) -> String {
    let mut next: Option<&(dyn std::error::Error)> = Some(error);
    let mut gen: usize = 0;
    let mut aggregated: String = String::new();
    while let Some(node) = next {
        aggregated.push_str(&" ".repeat(gen * indent_step));
        aggregated.push_str(&format!("{}", node));
        aggregated.push('\n');
        next = node.source();
        gen = gen + 1;
    }
    return aggregated;
}

/// Last `count` non-blank lines of `text`, in order.
pub fn tail_lines(text: &str, count: usize) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().collect::<Vec<&str>>();
    let start: usize = lines.len().saturating_sub(count);
    return lines[start..]
        .iter()
        .copied()
        .filter(|n| !n.trim().is_empty())
        .collect::<Vec<&str>>();
}
