//! Rule table entries and attribute declarations.

use indexmap::IndexMap;

use crate::ast::NodeId;
use crate::diagnostics::SrcPos;

/// How a label binds: single vs. list, token vs. rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelType {
    Token,
    TokenList,
    Rule,
    RuleList,
}

impl LabelType {
    pub fn describe(self) -> &'static str {
        match self {
            LabelType::Token => "token label",
            LabelType::TokenList => "token list label",
            LabelType::Rule => "rule label",
            LabelType::RuleList => "rule list label",
        }
    }
}

/// One `x=...` / `x+=...` occurrence inside a rule.
#[derive(Debug, Clone)]
pub struct LabelOccurrence {
    pub name: String,
    pub label_type: LabelType,
    pub node: NodeId,
    /// 1-based alternative the label appears in.
    pub alt: usize,
    /// Alt label scoping the occurrence, for rules with labeled alternatives.
    pub alt_label: Option<String>,
}

/// A declared argument, return value, or local.
#[derive(Debug, Clone)]
pub struct AttrDecl {
    pub name: String,
    /// Full declaration text, e.g. `int x`.
    pub decl: String,
    pub pos: SrcPos,
}

/// Operator associativity for left-recursive alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Assoc {
    #[default]
    Left,
    Right,
}

/// One operator alternative of a left-recursive rule.
#[derive(Debug, Clone)]
pub struct OpAltInfo {
    /// Original 1-based alternative number.
    pub alt: usize,
    /// Precedence level; higher binds tighter.
    pub precedence: u32,
    pub assoc: Assoc,
    /// Binary ops also end with a self-reference.
    pub binary: bool,
    pub label: Option<String>,
    pub is_list_label: bool,
    /// Label that was attached to the leading self-reference, if any.
    pub dropped_label: Option<String>,
}

/// Precomputed shape of a rewritten left-recursive rule.
#[derive(Debug, Clone, Default)]
pub struct LeftRecursionInfo {
    /// Original 1-based numbers of the non-recursive alternatives.
    pub primary_alts: Vec<usize>,
    pub op_alts: Vec<OpAltInfo>,
}

/// One grammar rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub index: usize,
    pub node: NodeId,
    pub num_alts: usize,
    pub is_fragment: bool,
    /// Lexer rules: the mode the rule is declared in.
    pub mode: Option<String>,
    pub args: IndexMap<String, AttrDecl>,
    pub retvals: IndexMap<String, AttrDecl>,
    pub locals: IndexMap<String, AttrDecl>,
    /// Labels collected during symbol collection, in appearance order.
    pub labels: Vec<LabelOccurrence>,
    /// Alt label name to the 1-based alts carrying it.
    pub alt_labels: IndexMap<String, Vec<usize>>,
    /// Action and predicate nodes, in appearance order.
    pub actions: Vec<NodeId>,
    pub is_start_rule: bool,
    pub left_recursion: Option<LeftRecursionInfo>,
}

impl Rule {
    pub fn new(name: &str, node: NodeId, num_alts: usize) -> Self {
        Self {
            name: name.to_string(),
            index: 0,
            node,
            num_alts,
            is_fragment: false,
            mode: None,
            args: IndexMap::new(),
            retvals: IndexMap::new(),
            locals: IndexMap::new(),
            labels: Vec::new(),
            alt_labels: IndexMap::new(),
            actions: Vec::new(),
            is_start_rule: false,
            left_recursion: None,
        }
    }

    /// Lexer rules start with an uppercase letter.
    pub fn is_token_rule(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_uppercase)
    }

    pub fn has_alt_labels(&self) -> bool {
        !self.alt_labels.is_empty()
    }
}

/// Parse `[int x, Map<K,V> m = init]` attribute text into declarations.
///
/// Splits on top-level commas (angle brackets nest for generic types),
/// strips initializers, and takes the last identifier as the name.
pub fn parse_attr_defs(text: &str, pos: SrcPos) -> Vec<AttrDecl> {
    let inner = text
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim();
    if inner.is_empty() {
        return Vec::new();
    }

    let mut decls = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = inner.as_bytes();
    for i in 0..=bytes.len() {
        let at_split = i == bytes.len() || (bytes[i] == b',' && depth == 0);
        if i < bytes.len() {
            match bytes[i] {
                b'<' | b'(' | b'[' => depth += 1,
                b'>' | b')' | b']' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        if at_split {
            let decl = inner[start..i].trim();
            if !decl.is_empty() {
                if let Some(name) = attr_name(decl) {
                    decls.push(AttrDecl {
                        name,
                        decl: decl.to_string(),
                        pos,
                    });
                }
            }
            start = i + 1;
        }
    }
    decls
}

/// The declared name: last identifier before any initializer.
fn attr_name(decl: &str) -> Option<String> {
    let head = decl.split('=').next().unwrap_or(decl).trim_end();
    let name_start = head
        .rfind(|c: char| !c.is_alphanumeric() && c != '_')
        .map(|i| i + 1)
        .unwrap_or(0);
    let name = &head[name_start..];
    (!name.is_empty() && name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_'))
        .then(|| name.to_string())
}
