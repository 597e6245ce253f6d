//! Error-tolerant single-pass structural scanner for Java-like source.
//!
//! Recognizes class-declaration and method/constructor-signature lines with
//! compiled patterns and tracks one active class and one active method at a
//! time. The scan is flat: concurrently-open sibling or nested classes are
//! not modeled. Unrecognized constructs are simply not reported, so this
//! strategy never fails.

use faultline_core::Component;
use regex::Regex;

use crate::StructureParser;

/// Line-scan structural parser for Java source.
///
/// # Examples
///
/// ```
/// use faultline_parse::{HeuristicJavaParser, StructureParser};
///
/// let source = "\
/// public class Api {
///     public String getUrl() {
///         return url;
///     }
/// }
/// ";
/// let components = HeuristicJavaParser::new().parse(source);
/// assert_eq!(components.len(), 1);
/// assert_eq!(components[0].class_path, "Api");
/// assert_eq!(components[0].method, "getUrl");
/// assert_eq!((components[0].start_line, components[0].end_line), (2, 4));
/// ```
pub struct HeuristicJavaParser {
    comment: Regex,
    class_decl: Regex,
    method_decl: Regex,
    closing_brace: Regex,
}

/// Scanner state: at most one class and one method are open at a time.
enum ScanState {
    Idle,
    ClassOpen {
        class: String,
    },
    MethodOpen {
        class: String,
        method: String,
        start: u32,
    },
}

impl HeuristicJavaParser {
    /// Build a scanner with its recognition patterns compiled once.
    pub fn new() -> Self {
        Self {
            comment: Regex::new(r"^\s*(//|/\*|\*)").expect("comment pattern"),
            class_decl: Regex::new(
                r"^\s*(?:(?:public|protected|private|static|final|abstract|strictfp)\s+)*class\s+([A-Za-z_$][A-Za-z0-9_$]*)",
            )
            .expect("class pattern"),
            method_decl: Regex::new(
                r"^\s*(?:public|protected|private)\s+(?:(?:static|final|abstract|synchronized|native|strictfp|default)\s+)*(?:[\w$.<>\[\], ?&]+\s+)?([A-Za-z_$][A-Za-z0-9_$]*)\s*\([^)]*\)\s*(?:throws\s+[\w$., ]+)?\s*\{?\s*$",
            )
            .expect("method pattern"),
            closing_brace: Regex::new(r"^\s*\}[;,]?\s*$").expect("closing brace pattern"),
        }
    }
}

impl Default for HeuristicJavaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureParser for HeuristicJavaParser {
    fn parse(&self, source: &str) -> Vec<Component> {
        let mut components = Vec::new();
        let mut state = ScanState::Idle;
        let mut last_brace: Option<u32> = None;
        let mut line_no: u32 = 0;

        for line in source.lines() {
            line_no += 1;

            if self.comment.is_match(line) {
                continue;
            }

            if let Some(caps) = self.class_decl.captures(line) {
                let name = caps[1].to_string();
                state = match state {
                    ScanState::MethodOpen {
                        class,
                        method,
                        start,
                    } => {
                        // A class declaration is a recognized boundary: the
                        // open method closes on the line before it.
                        components.push(close_at_boundary(class, method, start, line_no));
                        ScanState::ClassOpen { class: name }
                    }
                    _ => ScanState::ClassOpen { class: name },
                };
                continue;
            }

            if let Some(caps) = self.method_decl.captures(line) {
                let name = caps[1].to_string();
                state = match state {
                    ScanState::Idle => ScanState::MethodOpen {
                        class: String::new(),
                        method: name,
                        start: line_no,
                    },
                    ScanState::ClassOpen { class } => ScanState::MethodOpen {
                        class,
                        method: name,
                        start: line_no,
                    },
                    ScanState::MethodOpen {
                        class,
                        method,
                        start,
                    } => {
                        components.push(close_at_boundary(class.clone(), method, start, line_no));
                        ScanState::MethodOpen {
                            class,
                            method: name,
                            start: line_no,
                        }
                    }
                };
                continue;
            }

            if self.closing_brace.is_match(line) {
                last_brace = Some(line_no);
                if let ScanState::MethodOpen {
                    class,
                    method,
                    start,
                } = state
                {
                    components.push(Component {
                        start_line: start,
                        end_line: line_no,
                        class_path: class.clone(),
                        method,
                    });
                    state = ScanState::ClassOpen { class };
                }
            }
        }

        // End of input while a method is still open: close it at the
        // last-seen closing-brace line, or the final line when none exists.
        if let ScanState::MethodOpen {
            class,
            method,
            start,
        } = state
        {
            let end = last_brace.unwrap_or(line_no).max(start);
            components.push(Component {
                start_line: start,
                end_line: end,
                class_path: class,
                method,
            });
        }

        components
    }
}

/// Close an open method at the line preceding a newly recognized
/// declaration boundary.
fn close_at_boundary(class: String, method: String, start: u32, boundary: u32) -> Component {
    Component {
        start_line: start,
        end_line: boundary.saturating_sub(1).max(start),
        class_path: class,
        method,
    }
}
