//! The grammar object: AST plus symbol tables.
//!
//! A [`Grammar`] owns its AST arena, its ordered rule table, and the
//! token/literal/channel maps the semantic pipeline fills in. Imported
//! grammars are owned by the root via `imports`; combined grammars grow an
//! `implicit_lexer` during the transform stage.

mod rule;

#[cfg(test)]
mod grammar_tests;

pub use rule::{parse_attr_defs, Assoc, AttrDecl, LabelOccurrence, LabelType, LeftRecursionInfo, OpAltInfo, Rule};

use indexmap::IndexMap;

use parsegen_core::{Atn, GrammarKind, IntervalSet, MIN_USER_CHANNEL_VALUE, MIN_USER_TOKEN_TYPE, TOKEN_EOF, TOKEN_INVALID_TYPE};

use crate::ast::{NodeId, NodeKind, Tree};

/// Default lexer mode name.
pub const DEFAULT_MODE: &str = "DEFAULT_MODE";

/// Options a grammar file may set at grammar level.
pub const GRAMMAR_OPTIONS: &[&str] = &[
    "superClass",
    "language",
    "tokenVocab",
    "TokenLabelType",
    "caseInsensitive",
    "contextSuperClass",
    "exportMacro",
];

/// Options a rule may set.
pub const RULE_OPTIONS: &[&str] = &["caseInsensitive"];

/// Grammar-level options that do not propagate into an extracted lexer.
pub const LEXER_OPTION_BLACKLIST: &[&str] = &["superClass", "TokenLabelType", "tokenVocab"];

#[derive(Debug)]
pub struct Grammar {
    pub name: String,
    pub kind: GrammarKind,
    pub file_name: String,
    pub tree: Tree,
    pub root: NodeId,

    /// Rules in declaration order; a rule's index is its table position.
    pub rules: IndexMap<String, Rule>,

    pub token_name_to_type: IndexMap<String, i32>,
    pub string_literal_to_type: IndexMap<String, i32>,
    /// Reverse of `token_name_to_type`, indexed by type.
    pub type_to_token_name: Vec<Option<String>>,
    /// Reverse of `string_literal_to_type`, indexed by type.
    pub type_to_string_literal: Vec<Option<String>>,
    pub max_token_type: i32,

    pub channel_name_to_value: IndexMap<String, i32>,
    pub channel_value_to_name: Vec<String>,
    pub max_channel_value: i32,

    /// `(scope, name)` to the action's AST node.
    pub named_actions: IndexMap<(String, String), NodeId>,
    /// Predicate AST node to its index in the recognizer.
    pub sempreds: IndexMap<NodeId, usize>,
    /// Lexer action AST node to its index.
    pub lexer_actions: IndexMap<NodeId, usize>,

    /// Mode name to the rules declared in it (lexer grammars).
    pub modes: IndexMap<String, Vec<String>>,

    pub imports: Vec<Grammar>,
    pub implicit_lexer: Option<Box<Grammar>>,

    pub atn: Option<Atn>,
    /// Per-decision, per-alternative lookahead sets from the analysis stage.
    pub decision_lookahead: Vec<Vec<IntervalSet>>,
    /// Decisions whose alternative lookahead sets are pairwise disjoint.
    pub decision_ll1: Vec<bool>,
}

impl Grammar {
    pub fn new(file_name: &str, tree: Tree, root: NodeId) -> Self {
        let &NodeKind::GrammarRoot { kind } = tree.kind(root) else {
            unreachable!("grammar root node expected");
        };
        let name = tree.text(root).to_string();

        let mut g = Self {
            name,
            kind,
            file_name: file_name.to_string(),
            tree,
            root,
            rules: IndexMap::new(),
            token_name_to_type: IndexMap::new(),
            string_literal_to_type: IndexMap::new(),
            type_to_token_name: vec![None; MIN_USER_TOKEN_TYPE as usize],
            type_to_string_literal: vec![None; MIN_USER_TOKEN_TYPE as usize],
            max_token_type: TOKEN_INVALID_TYPE,
            channel_name_to_value: IndexMap::new(),
            channel_value_to_name: Vec::new(),
            max_channel_value: MIN_USER_CHANNEL_VALUE - 1,
            named_actions: IndexMap::new(),
            sempreds: IndexMap::new(),
            lexer_actions: IndexMap::new(),
            modes: IndexMap::new(),
            imports: Vec::new(),
            implicit_lexer: None,
            atn: None,
            decision_lookahead: Vec::new(),
            decision_ll1: Vec::new(),
        };
        // EOF is pre-registered with its sentinel type.
        g.token_name_to_type.insert("EOF".to_string(), TOKEN_EOF);
        if g.kind.is_lexer() || g.kind == GrammarKind::Combined {
            g.modes.insert(DEFAULT_MODE.to_string(), Vec::new());
        }
        g.attach_option_maps();
        g
    }

    /// Mirror parsed `options {}` entries into the option maps on the
    /// grammar root and rule nodes, so scoped lookup works.
    fn attach_option_maps(&mut self) {
        let option_nodes = self
            .tree
            .find_all(self.root, |k| matches!(k, NodeKind::Options));
        for options in option_nodes {
            let owner = match self.tree.node(options).parent {
                Some(p) => p,
                None => continue,
            };
            let entries: Vec<(String, String)> = self
                .tree
                .children(options)
                .iter()
                .map(|&opt| {
                    let key = self.tree.text(opt).to_string();
                    let value = self.tree.text(self.tree.child(opt, 0)).to_string();
                    (key, value)
                })
                .collect();
            for (key, value) in entries {
                self.tree.set_option(owner, &key, &value);
            }
        }
    }

    pub fn is_lexer(&self) -> bool {
        self.kind == GrammarKind::Lexer
    }

    pub fn is_parser(&self) -> bool {
        self.kind == GrammarKind::Parser
    }

    pub fn is_combined(&self) -> bool {
        self.kind == GrammarKind::Combined
    }

    /// Grammar type name used as the default named-action scope.
    pub fn default_action_scope(&self) -> &'static str {
        if self.is_lexer() {
            "lexer"
        } else {
            "parser"
        }
    }

    // ------------------------------------------------------------------
    // Rules
    // ------------------------------------------------------------------

    /// Insert a rule, assigning the next index. Returns `None` (and leaves
    /// the table unchanged) when the name is already defined.
    pub fn define_rule(&mut self, mut rule: Rule) -> Option<usize> {
        if self.rules.contains_key(&rule.name) {
            return None;
        }
        let index = self.rules.len();
        rule.index = index;
        if let Some(mode) = rule.mode.clone() {
            self.modes.entry(mode).or_default().push(rule.name.clone());
        }
        self.rules.insert(rule.name.clone(), rule);
        Some(index)
    }

    /// Remove a rule and renumber the ones after it.
    pub fn remove_rule(&mut self, name: &str) -> Option<Rule> {
        let removed = self.rules.shift_remove(name)?;
        for (i, rule) in self.rules.values_mut().enumerate() {
            rule.index = i;
        }
        for rules in self.modes.values_mut() {
            rules.retain(|r| r != name);
        }
        Some(removed)
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn rule_mut(&mut self, name: &str) -> Option<&mut Rule> {
        self.rules.get_mut(name)
    }

    pub fn rule_by_index(&self, index: usize) -> Option<&Rule> {
        self.rules.get_index(index).map(|(_, r)| r)
    }

    /// Resolve a rule here or in any imported grammar (depth-first).
    pub fn resolve_rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name).or_else(|| {
            self.imports
                .iter()
                .find_map(|delegate| delegate.resolve_rule(name))
        })
    }

    // ------------------------------------------------------------------
    // Token types
    // ------------------------------------------------------------------

    fn new_token_type(&mut self) -> i32 {
        self.max_token_type += 1;
        self.type_to_token_name.push(None);
        self.type_to_string_literal.push(None);
        debug_assert_eq!(self.type_to_token_name.len(), self.max_token_type as usize + 1);
        self.max_token_type
    }

    /// Define (or look up) a symbolic token name.
    pub fn define_token_name(&mut self, name: &str) -> i32 {
        match self.token_name_to_type.get(name) {
            Some(&t) => t,
            None => {
                let t = self.new_token_type();
                self.set_token_name(name, t);
                t
            }
        }
    }

    fn set_token_name(&mut self, name: &str, ttype: i32) {
        self.token_name_to_type.insert(name.to_string(), ttype);
        if ttype >= 0 {
            self.type_to_token_name[ttype as usize] = Some(name.to_string());
        }
    }

    /// Define (or look up) an anonymous string literal.
    pub fn define_string_literal(&mut self, literal: &str) -> i32 {
        match self.string_literal_to_type.get(literal) {
            Some(&t) => t,
            None => {
                let t = self.new_token_type();
                self.set_string_literal(literal, t);
                t
            }
        }
    }

    fn set_string_literal(&mut self, literal: &str, ttype: i32) {
        self.string_literal_to_type.insert(literal.to_string(), ttype);
        if ttype >= 0 && self.type_to_string_literal[ttype as usize].is_none() {
            self.type_to_string_literal[ttype as usize] = Some(literal.to_string());
        }
    }

    /// Alias `literal` to the type of token `name` (from `X : 'lit' ;`).
    pub fn define_token_alias(&mut self, name: &str, literal: &str) -> i32 {
        let ttype = self.define_token_name(name);
        self.set_string_literal(literal, ttype);
        ttype
    }

    /// Drop a literal alias again (ambiguous alias resolution).
    pub fn undefine_string_literal(&mut self, literal: &str) {
        if let Some(t) = self.string_literal_to_type.shift_remove(literal) {
            if t >= 0 && self.type_to_string_literal[t as usize].as_deref() == Some(literal) {
                self.type_to_string_literal[t as usize] = None;
            }
        }
    }

    /// Token type for a name or quoted literal; `TOKEN_INVALID_TYPE` when unknown.
    pub fn token_type(&self, name: &str) -> i32 {
        let found = if name.starts_with('\'') {
            self.string_literal_to_type.get(name)
        } else {
            self.token_name_to_type.get(name)
        };
        found.copied().unwrap_or(TOKEN_INVALID_TYPE)
    }

    /// Display name preferring the literal, then the symbolic name.
    pub fn token_display_name(&self, ttype: i32) -> String {
        if ttype == TOKEN_EOF {
            return "EOF".to_string();
        }
        if ttype >= 0 {
            if let Some(Some(lit)) = self.type_to_string_literal.get(ttype as usize) {
                return lit.clone();
            }
            if let Some(Some(name)) = self.type_to_token_name.get(ttype as usize) {
                return name.clone();
            }
        }
        format!("<{ttype}>")
    }

    /// Copy another grammar's token and channel assignments into this one.
    ///
    /// Used to give a combined grammar's parser part the vocabulary of its
    /// extracted lexer, and to honor imported-grammar vocabularies.
    pub fn import_vocab(&mut self, other: &Grammar) {
        for (name, &ttype) in &other.token_name_to_type {
            if ttype >= MIN_USER_TOKEN_TYPE && !self.token_name_to_type.contains_key(name) {
                while self.max_token_type < ttype {
                    self.new_token_type();
                }
                self.set_token_name(name, ttype);
            }
        }
        for (lit, &ttype) in &other.string_literal_to_type {
            if ttype >= MIN_USER_TOKEN_TYPE && !self.string_literal_to_type.contains_key(lit) {
                while self.max_token_type < ttype {
                    self.new_token_type();
                }
                self.set_string_literal(lit, ttype);
            }
        }
        for (channel, &value) in &other.channel_name_to_value {
            if !self.channel_name_to_value.contains_key(channel) {
                self.channel_name_to_value.insert(channel.clone(), value);
                self.max_channel_value = self.max_channel_value.max(value);
            }
        }
    }

    // ------------------------------------------------------------------
    // Channels
    // ------------------------------------------------------------------

    /// Assign the next channel value to `name`, or return the existing one.
    pub fn define_channel(&mut self, name: &str) -> i32 {
        match self.channel_name_to_value.get(name) {
            Some(&v) => v,
            None => {
                self.max_channel_value += 1;
                let v = self.max_channel_value;
                self.channel_name_to_value.insert(name.to_string(), v);
                self.channel_value_to_name.push(name.to_string());
                v
            }
        }
    }

    pub fn channel_value(&self, name: &str) -> Option<i32> {
        self.channel_name_to_value.get(name).copied()
    }

    // ------------------------------------------------------------------
    // AST access helpers
    // ------------------------------------------------------------------

    /// Grammar-level option value, if set.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.tree.option(self.root, key)
    }

    /// The `Block` child of a rule node.
    pub fn rule_block(&self, rule_node: NodeId) -> Option<NodeId> {
        self.tree
            .children(rule_node)
            .iter()
            .copied()
            .find(|&c| matches!(self.tree.kind(c), NodeKind::Block))
    }

    /// Alternatives of a rule, in order (1-indexed semantics; index 0 here).
    pub fn rule_alts(&self, rule_node: NodeId) -> Vec<NodeId> {
        self.rule_block(rule_node)
            .map(|b| self.tree.children(b).to_vec())
            .unwrap_or_default()
    }

    /// Token vocabulary rows for `.tokens` emission: symbolic names first.
    pub fn token_vocab_entries(&self) -> (Vec<(String, i32)>, Vec<(String, i32)>) {
        let mut names: Vec<(String, i32)> = self
            .token_name_to_type
            .iter()
            .filter(|(_, &t)| t >= MIN_USER_TOKEN_TYPE)
            .map(|(n, &t)| (n.clone(), t))
            .collect();
        names.sort_by_key(|(_, t)| *t);
        let mut literals: Vec<(String, i32)> = self
            .string_literal_to_type
            .iter()
            .filter(|(_, &t)| t >= MIN_USER_TOKEN_TYPE)
            .map(|(l, &t)| (l.clone(), t))
            .collect();
        literals.sort_by_key(|(_, t)| *t);
        (names, literals)
    }
}
