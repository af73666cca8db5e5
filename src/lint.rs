use lazy_static::lazy_static;
use regex::Regex;

pub const PYTHON_KEYWORDS: [&str; 35] = [
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

pub const PYTHON_BUILTINS: [&str; 68] = [
    "abs", "dict", "help", "min", "setattr", "all", "dir", "hex", "next", "slice", "any",
    "divmod", "id", "object", "sorted", "ascii", "enumerate", "input", "oct", "staticmethod",
    "bin", "eval", "int", "open", "str", "bool", "exec", "isinstance", "ord", "sum", "bytearray",
    "filter", "issubclass", "pow", "super", "bytes", "float", "iter", "print", "tuple",
    "callable", "format", "len", "property", "type", "chr", "frozenset", "list", "range", "vars",
    "classmethod", "getattr", "locals", "repr", "zip", "compile", "globals", "map", "reversed",
    "__import__", "complex", "hasattr", "max", "round", "delattr", "hash", "memoryview", "set",
];

pub const COMMON_MODULES: [&str; 7] = ["os", "sys", "json", "re", "math", "datetime", "random"];

lazy_static! {
    static ref COLON_NEEDED: Regex =
        Regex::new(r"^(if|elif|else|for|while|def|class|try|except|finally)\b").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
}

// 1-based; end_column is exclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

pub fn check_python(code: &str) -> Vec<Diagnostic> {
    code.split('\n')
        .enumerate()
        .filter_map(|(i, line)| {
            let trimmed = line.trim();
            if !COLON_NEEDED.is_match(trimmed) || trimmed.ends_with(':') {
                return None;
            }
            let statement = trimmed.split_whitespace().next().unwrap_or(trimmed);
            Some(Diagnostic {
                message: format!("Syntax Error: Missing \":\" after {} statement", statement),
                severity: Severity::Error,
                start_line: i + 1,
                start_column: 1,
                end_line: i + 1,
                end_column: line.chars().count() + 1,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Keyword,
    Function,
    Module,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: &'static str,
    pub kind: CompletionKind,
    pub insert_text: String,
    pub detail: &'static str,
}

pub fn completions() -> Vec<CompletionItem> {
    let keywords = PYTHON_KEYWORDS.into_iter().map(|kw| CompletionItem {
        label: kw,
        kind: CompletionKind::Keyword,
        insert_text: format!("{} ", kw),
        detail: "Python Keyword",
    });
    let builtins = PYTHON_BUILTINS.into_iter().map(|name| CompletionItem {
        label: name,
        kind: CompletionKind::Function,
        insert_text: format!("{}(${{1:args}})", name),
        detail: "Python Built-in",
    });
    let modules = COMMON_MODULES.into_iter().map(|module| CompletionItem {
        label: module,
        kind: CompletionKind::Module,
        insert_text: module.to_string(),
        detail: "Common Python module",
    });

    keywords.chain(builtins).chain(modules).collect()
}

pub fn complete(prefix: &str) -> Vec<CompletionItem> {
    completions()
        .into_iter()
        .filter(|item| item.label.starts_with(prefix))
        .collect()
}
