//! Full-grammar structural parser backed by tree-sitter.

use faultline_core::Component;
use tree_sitter::{Node, Parser};

use crate::StructureParser;

/// Grammar-based structural parser for Java source.
///
/// Builds a full syntax tree and recurses through nested class
/// declarations, maintaining a class-path stack so inner classes are
/// qualified with dot notation. Emits one [`Component`] per method or
/// constructor declaration. A source with syntax errors yields an empty
/// component list rather than an error.
///
/// # Examples
///
/// ```
/// use faultline_parse::{GrammarJavaParser, StructureParser};
///
/// let source = "\
/// public class Outer {
///     public class Inner {
///         public void run() {
///         }
///     }
/// }
/// ";
/// let components = GrammarJavaParser.parse(source);
/// assert_eq!(components.len(), 1);
/// assert_eq!(components[0].class_path, "Outer.Inner");
/// assert_eq!(components[0].method, "run");
/// ```
pub struct GrammarJavaParser;

impl StructureParser for GrammarJavaParser {
    fn parse(&self, source: &str) -> Vec<Component> {
        let mut parser = Parser::new();
        if parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .is_err()
        {
            return Vec::new();
        }

        let Some(tree) = parser.parse(source, None) else {
            return Vec::new();
        };
        if tree.root_node().has_error() {
            return Vec::new();
        }

        let mut components = Vec::new();
        let mut class_stack = Vec::new();
        collect_components(
            tree.root_node(),
            source.as_bytes(),
            &mut class_stack,
            &mut components,
        );
        components
    }
}

fn collect_components(
    node: Node,
    source: &[u8],
    class_stack: &mut Vec<String>,
    out: &mut Vec<Component>,
) {
    match node.kind() {
        "class_declaration" => {
            let name = find_child_text(&node, "identifier", source);
            let qualified = name.is_some();
            if let Some(name) = name {
                class_stack.push(name);
            }
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                collect_components(child, source, class_stack, out);
            }
            if qualified {
                class_stack.pop();
            }
            return;
        }
        "method_declaration" | "constructor_declaration" => {
            if let Some(name) = find_child_text(&node, "identifier", source) {
                out.push(Component {
                    start_line: node.start_position().row as u32 + 1,
                    end_line: node.end_position().row as u32 + 1,
                    class_path: class_stack.join("."),
                    method: name,
                });
            }
            // Fall through: local classes inside method bodies still count.
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_components(child, source, class_stack, out);
    }
}

fn node_text(node: &Node, source: &[u8]) -> String {
    let start = node.start_byte();
    let end = node.end_byte();
    if start >= source.len() || end > source.len() {
        return String::new();
    }
    String::from_utf8_lossy(&source[start..end]).to_string()
}

fn find_child_text(node: &Node, kind: &str, source: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == kind {
            let text = node_text(&child, source);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeuristicJavaParser;

    fn parse(source: &str) -> Vec<Component> {
        GrammarJavaParser.parse(source)
    }

    #[test]
    fn methods_carry_their_line_ranges() {
        let source = "\
public class Api {
    public String getUrl() {
        return url;
    }

    public void setUrl(String url) {
        this.url = url;
    }
}
";
        let components = parse(source);
        assert_eq!(components.len(), 2);
        let get = components.iter().find(|c| c.method == "getUrl").unwrap();
        assert_eq!((get.start_line, get.end_line), (2, 4));
        let set = components.iter().find(|c| c.method == "setUrl").unwrap();
        assert_eq!((set.start_line, set.end_line), (6, 8));
    }

    #[test]
    fn nested_classes_are_dot_qualified() {
        let source = "\
public class Outer {
    public void top() {
    }

    class Inner {
        void deep() {
        }
    }
}
";
        let components = parse(source);
        let top = components.iter().find(|c| c.method == "top").unwrap();
        assert_eq!(top.class_path, "Outer");
        let deep = components.iter().find(|c| c.method == "deep").unwrap();
        assert_eq!(deep.class_path, "Outer.Inner");
    }

    #[test]
    fn constructors_are_components() {
        let source = "\
public class Api {
    public Api() {
    }
}
";
        let components = parse(source);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].method, "Api");
    }

    #[test]
    fn syntax_error_yields_empty_list() {
        let source = "public class Broken { public void oops( {";
        assert!(parse(source).is_empty());
    }

    #[test]
    fn empty_source_yields_empty_list() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn strategies_agree_on_well_formed_input() {
        let source = "\
public class Api {
    public Api(String url) {
        this.url = url;
    }

    public String getUrl() {
        return url;
    }
}
";
        let grammar: std::collections::BTreeSet<(String, String)> = parse(source)
            .into_iter()
            .map(|c| (c.class_path, c.method))
            .collect();
        let heuristic: std::collections::BTreeSet<(String, String)> =
            HeuristicJavaParser::new()
                .parse(source)
                .into_iter()
                .map(|c| (c.class_path, c.method))
                .collect();
        assert_eq!(grammar, heuristic);
    }
}
