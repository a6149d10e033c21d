//! Recursive-descent parser producing the AST arena.

use parsegen_core::GrammarKind;

use crate::ast::{NodeId, NodeKind, SrcToken, Tree};
use crate::diagnostics::{DiagnosticKind, Diagnostics, SrcPos};

use super::lexer::{lex, lex_slice, Tok, TokKind};

/// Parse one grammar file. Returns the tree and its root, or `None` when
/// the grammar declaration itself is unusable.
pub fn parse_grammar(
    file: &str,
    src: &str,
    diags: &mut Diagnostics,
) -> Option<(Tree, NodeId)> {
    let tokens = lex(src);
    let mut p = Parser {
        file,
        src,
        tokens,
        pos: 0,
        tree: Tree::new(),
        diags,
    };
    let root = p.parse_grammar_spec()?;
    let mut tree = p.tree;
    tree.refresh_parents(root);
    Some((tree, root))
}

struct Parser<'a> {
    file: &'a str,
    src: &'a str,
    tokens: Vec<Tok>,
    pos: usize,
    tree: Tree,
    diags: &'a mut Diagnostics,
}

impl Parser<'_> {
    fn current(&self) -> Option<TokKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn peek(&self, n: usize) -> Option<TokKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn at(&self, kind: TokKind) -> bool {
        self.current() == Some(kind)
    }

    fn bump(&mut self) -> Tok {
        let t = self.tokens[self.pos];
        self.pos += 1;
        t
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn src_token(&self, t: Tok) -> SrcToken {
        SrcToken::new(t.text(self.src), t.line, t.col)
    }

    fn here(&self) -> SrcPos {
        self.tokens
            .get(self.pos)
            .map(|t| SrcPos::new(t.line, t.col))
            .unwrap_or_else(|| {
                self.tokens
                    .last()
                    .map(|t| SrcPos::new(t.line, t.col))
                    .unwrap_or_default()
            })
    }

    fn syntax_error(&mut self, what: &str) {
        let pos = self.here();
        self.diags
            .emit(DiagnosticKind::SyntaxError, self.file, pos, &[what]);
    }

    fn expect(&mut self, kind: TokKind, what: &str) -> Option<Tok> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            self.syntax_error(what);
            None
        }
    }

    /// Skip past the next `;` (or to end of input).
    fn recover_to_semi(&mut self) {
        while !self.at_eof() {
            if self.bump().kind == TokKind::Semi {
                break;
            }
        }
    }

    // ------------------------------------------------------------------
    // Grammar structure
    // ------------------------------------------------------------------

    fn parse_grammar_spec(&mut self) -> Option<NodeId> {
        let kind = match self.current() {
            Some(TokKind::KwLexer) => {
                self.bump();
                GrammarKind::Lexer
            }
            Some(TokKind::KwParser) => {
                self.bump();
                GrammarKind::Parser
            }
            _ => GrammarKind::Combined,
        };
        self.expect(TokKind::KwGrammar, "expected 'grammar' keyword")?;
        let name = self.expect(TokKind::Id, "expected grammar name")?;
        self.expect(TokKind::Semi, "expected ';' after grammar name");

        let name_token = self.src_token(name);
        let root = self.tree.add(NodeKind::GrammarRoot { kind }, name_token);

        // Prequel sections.
        loop {
            let prequel = match self.current() {
                Some(TokKind::KwOptions) => self.parse_options_spec(),
                Some(TokKind::KwTokens) => self.parse_tokens_spec(),
                Some(TokKind::KwChannels) => self.parse_channels_spec(),
                Some(TokKind::KwImport) => self.parse_import(),
                Some(TokKind::At) => self.parse_named_action(),
                _ => break,
            };
            if let Some(p) = prequel {
                self.tree.add_child(root, p);
            }
        }

        // Rules outside any mode.
        let rules = self.tree.add(NodeKind::Rules, SrcToken::default());
        self.tree.add_child(root, rules);
        while !self.at_eof() && !self.at(TokKind::KwMode) {
            if let Some(rule) = self.parse_rule() {
                self.tree.add_child(rules, rule);
            }
        }

        // Lexer mode sections.
        while self.at(TokKind::KwMode) {
            if let Some(mode) = self.parse_mode() {
                self.tree.add_child(root, mode);
            }
        }

        Some(root)
    }

    fn parse_mode(&mut self) -> Option<NodeId> {
        self.bump(); // mode
        let name = self.expect(TokKind::Id, "expected mode name")?;
        self.expect(TokKind::Semi, "expected ';' after mode name");
        let mode = self.tree.add(NodeKind::Mode, self.src_token(name));
        while !self.at_eof() && !self.at(TokKind::KwMode) {
            if let Some(rule) = self.parse_rule() {
                self.tree.add_child(mode, rule);
            }
        }
        Some(mode)
    }

    // ------------------------------------------------------------------
    // Prequels
    // ------------------------------------------------------------------

    /// `options { k = v; ... }`. The brace block arrives as one balanced
    /// token; its interior is re-lexed at its absolute offset.
    fn parse_options_spec(&mut self) -> Option<NodeId> {
        let kw = self.bump();
        let node = self.tree.add(NodeKind::Options, self.src_token(kw));
        let block = self.expect(TokKind::ActionBlock, "expected '{' after 'options'")?;
        let inner = lex_slice(self.src, block.start + 1, block.end - 1);
        let mut i = 0;
        while i < inner.len() {
            // name '=' value ';'
            let name = inner[i];
            if name.kind != TokKind::Id {
                self.emit_at(DiagnosticKind::SyntaxError, name, &["expected option name"]);
                break;
            }
            i += 1;
            if inner.get(i).map(|t| t.kind) != Some(TokKind::Assign) {
                self.emit_at(DiagnosticKind::SyntaxError, name, &["expected '=' in option"]);
                break;
            }
            i += 1;
            let Some(&value) = inner.get(i) else {
                self.emit_at(DiagnosticKind::SyntaxError, name, &["expected option value"]);
                break;
            };
            i += 1;
            // Dotted values (superClass=a.b) collapse into one text.
            let mut value_text = value.text(self.src).to_string();
            while inner.get(i).map(|t| t.kind) == Some(TokKind::Dot) {
                i += 1;
                if let Some(&part) = inner.get(i) {
                    value_text.push('.');
                    value_text.push_str(part.text(self.src));
                    i += 1;
                }
            }
            let opt = self.tree.add(NodeKind::Opt, self.src_token(name));
            let value_node = self.tree.add(NodeKind::Id, {
                let mut t = self.src_token(value);
                t.text = value_text;
                t
            });
            self.tree.add_child(opt, value_node);
            self.tree.add_child(node, opt);

            if inner.get(i).map(|t| t.kind) == Some(TokKind::Semi) {
                i += 1;
            }
        }
        Some(node)
    }

    /// `tokens { A, B }` / `channels { X, Y }`.
    fn parse_id_list_block(&mut self, kind: NodeKind, entry: NodeKind) -> Option<NodeId> {
        let kw = self.bump();
        let node = self.tree.add(kind, self.src_token(kw));
        let block = self.expect(TokKind::ActionBlock, "expected '{' after keyword")?;
        let inner = lex_slice(self.src, block.start + 1, block.end - 1);
        for t in inner {
            match t.kind {
                TokKind::Id => {
                    let child = self.tree.add(entry.clone(), self.src_token(t));
                    self.tree.add_child(node, child);
                }
                TokKind::Comma | TokKind::Semi => {}
                _ => {
                    self.emit_at(DiagnosticKind::SyntaxError, t, &["expected identifier"]);
                    break;
                }
            }
        }
        Some(node)
    }

    fn parse_tokens_spec(&mut self) -> Option<NodeId> {
        self.parse_id_list_block(NodeKind::Tokens, NodeKind::TokenRef)
    }

    fn parse_channels_spec(&mut self) -> Option<NodeId> {
        self.parse_id_list_block(NodeKind::Channels, NodeKind::Id)
    }

    fn parse_import(&mut self) -> Option<NodeId> {
        let kw = self.bump();
        let node = self.tree.add(NodeKind::Import, self.src_token(kw));
        loop {
            let Some(name) = self.expect(TokKind::Id, "expected imported grammar name") else {
                self.recover_to_semi();
                return Some(node);
            };
            let id = self.tree.add(NodeKind::Id, self.src_token(name));
            self.tree.add_child(node, id);
            if self.at(TokKind::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(TokKind::Semi, "expected ';' after import");
        Some(node)
    }

    /// `@name {...}` or `@scope::name {...}`.
    fn parse_named_action(&mut self) -> Option<NodeId> {
        let at = self.bump();
        let node = self.tree.add(NodeKind::NamedAction, self.src_token(at));
        let first = self.expect(TokKind::Id, "expected action name")?;
        if self.at(TokKind::ColonColon) {
            self.bump();
            let name = self.expect(TokKind::Id, "expected action name after '::'")?;
            let scope = self.tree.add(NodeKind::Id, self.src_token(first));
            let name_node = self.tree.add(NodeKind::Id, self.src_token(name));
            self.tree.add_child(node, scope);
            self.tree.add_child(node, name_node);
        } else {
            let name_node = self.tree.add(NodeKind::Id, self.src_token(first));
            self.tree.add_child(node, name_node);
        }
        let body = self.expect(TokKind::ActionBlock, "expected action body")?;
        let action = self.tree.add(NodeKind::Action, self.src_token(body));
        self.tree.add_child(node, action);
        Some(node)
    }

    // ------------------------------------------------------------------
    // Rules
    // ------------------------------------------------------------------

    fn parse_rule(&mut self) -> Option<NodeId> {
        let fragment = if self.at(TokKind::KwFragment) {
            self.bump();
            true
        } else {
            false
        };

        let Some(name) = self.expect(TokKind::Id, "expected rule name") else {
            self.recover_to_semi();
            return None;
        };
        let rule = self
            .tree
            .add(NodeKind::Rule { fragment }, self.src_token(name));

        // Parser-rule prefix: args, returns, locals.
        if self.at(TokKind::BracketBlock) {
            let args = self.bump();
            let node = self.tree.add(NodeKind::ArgAction, self.src_token(args));
            self.tree.add_child(rule, node);
        }
        if self.at(TokKind::KwReturns) {
            let kw = self.bump();
            let node = self.tree.add(NodeKind::Returns, self.src_token(kw));
            if let Some(block) = self.expect(TokKind::BracketBlock, "expected '[...]' after 'returns'") {
                let arg = self.tree.add(NodeKind::ArgAction, self.src_token(block));
                self.tree.add_child(node, arg);
            }
            self.tree.add_child(rule, node);
        }
        if self.at(TokKind::KwLocals) {
            let kw = self.bump();
            let node = self.tree.add(NodeKind::Locals, self.src_token(kw));
            if let Some(block) = self.expect(TokKind::BracketBlock, "expected '[...]' after 'locals'") {
                let arg = self.tree.add(NodeKind::ArgAction, self.src_token(block));
                self.tree.add_child(node, arg);
            }
            self.tree.add_child(rule, node);
        }
        if self.at(TokKind::KwOptions) {
            if let Some(options) = self.parse_options_spec() {
                self.tree.add_child(rule, options);
            }
        }

        if self.expect(TokKind::Colon, "expected ':' in rule").is_none() {
            self.recover_to_semi();
            return Some(rule);
        }

        let block = self.parse_alt_list();
        self.tree.add_child(rule, block);

        if self.expect(TokKind::Semi, "expected ';' at end of rule").is_none() {
            self.recover_to_semi();
        }
        Some(rule)
    }

    fn parse_alt_list(&mut self) -> NodeId {
        let block = self.tree.add(NodeKind::Block, SrcToken::default());
        loop {
            let alt = self.parse_alt();
            self.tree.add_child(block, alt);
            if self.at(TokKind::Pipe) {
                self.bump();
            } else {
                break;
            }
        }
        block
    }

    fn parse_alt(&mut self) -> NodeId {
        let alt = self.tree.add(NodeKind::Alt { label: None }, self.here_token());
        while self.can_start_element() {
            if let Some(e) = self.parse_element() {
                self.tree.add_child(alt, e);
            } else {
                break;
            }
        }
        // Lexer commands: `-> skip, channel(HIDDEN)`.
        if self.at(TokKind::Arrow) {
            let commands = self.parse_lexer_commands();
            self.tree.add_child(alt, commands);
        }
        // Alternative label: `# Name`.
        if self.at(TokKind::Pound) {
            self.bump();
            if let Some(name) = self.expect(TokKind::Id, "expected label after '#'") {
                let label = name.text(self.src).to_string();
                if let NodeKind::Alt { label: slot } = &mut self.tree.node_mut(alt).kind {
                    *slot = Some(label);
                }
            }
        }
        alt
    }

    fn here_token(&self) -> SrcToken {
        self.tokens
            .get(self.pos)
            .map(|&t| SrcToken::new("", t.line, t.col))
            .unwrap_or_default()
    }

    fn can_start_element(&self) -> bool {
        matches!(
            self.current(),
            Some(
                TokKind::Id
                    | TokKind::StrLit
                    | TokKind::BracketBlock
                    | TokKind::LParen
                    | TokKind::Dot
                    | TokKind::Tilde
                    | TokKind::ActionBlock
            )
        )
    }

    fn parse_element(&mut self) -> Option<NodeId> {
        // Labels: `x=atom` or `x+=atom`.
        if self.at(TokKind::Id)
            && matches!(
                self.peek(1),
                Some(TokKind::Assign | TokKind::PlusAssign)
            )
        {
            let name = self.bump();
            let list = self.bump().kind == TokKind::PlusAssign;
            let label = self.tree.add(NodeKind::Label { list }, self.src_token(name));
            let target = self.parse_atom_with_suffix()?;
            self.tree.add_child(label, target);
            return Some(label);
        }
        self.parse_atom_with_suffix()
    }

    fn parse_atom_with_suffix(&mut self) -> Option<NodeId> {
        let atom = self.parse_atom()?;
        Some(self.parse_suffix(atom))
    }

    fn parse_suffix(&mut self, atom: NodeId) -> NodeId {
        let suffix_kind = match self.current() {
            Some(TokKind::Question) => {
                // Distinguish `{..}?` predicates, handled in parse_atom.
                self.bump();
                let greedy = !self.eat_question();
                Some(NodeKind::Optional { greedy })
            }
            Some(TokKind::Star) => {
                self.bump();
                let greedy = !self.eat_question();
                Some(NodeKind::Star { greedy })
            }
            Some(TokKind::Plus) => {
                self.bump();
                let greedy = !self.eat_question();
                Some(NodeKind::Plus { greedy })
            }
            _ => None,
        };
        match suffix_kind {
            Some(kind) => {
                let token = self.tree.node(atom).token.clone();
                let node = self.tree.add(kind, token);
                self.tree.add_child(node, atom);
                node
            }
            None => atom,
        }
    }

    fn eat_question(&mut self) -> bool {
        if self.at(TokKind::Question) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn parse_atom(&mut self) -> Option<NodeId> {
        let node = match self.current() {
            Some(TokKind::Id) => {
                let t = self.bump();
                let text = t.text(self.src);
                let upper = text.chars().next().is_some_and(char::is_uppercase);
                let kind = if upper {
                    NodeKind::TokenRef
                } else {
                    NodeKind::RuleRef
                };
                let node = self.tree.add(kind, self.src_token(t));
                // Rule-call arguments: `expr[5]`.
                if !upper && self.at(TokKind::BracketBlock) {
                    let args = self.bump();
                    let arg_node = self.tree.add(NodeKind::ArgAction, self.src_token(args));
                    self.tree.add_child(node, arg_node);
                }
                node
            }
            Some(TokKind::StrLit) => {
                let t = self.bump();
                let lit = self.tree.add(NodeKind::StringLiteral, self.src_token(t));
                if self.at(TokKind::DotDot) {
                    self.bump();
                    let range = self.tree.add(NodeKind::Range, self.src_token(t));
                    let hi = self.expect(TokKind::StrLit, "expected upper bound of range")?;
                    let hi_node = self.tree.add(NodeKind::StringLiteral, self.src_token(hi));
                    self.tree.add_child(range, lit);
                    self.tree.add_child(range, hi_node);
                    range
                } else {
                    lit
                }
            }
            Some(TokKind::BracketBlock) => {
                let t = self.bump();
                self.tree.add(NodeKind::CharSet, self.src_token(t))
            }
            Some(TokKind::LParen) => {
                self.bump();
                let block = self.parse_alt_list();
                self.expect(TokKind::RParen, "expected ')'");
                block
            }
            Some(TokKind::Dot) => {
                let t = self.bump();
                self.tree.add(NodeKind::Wildcard, self.src_token(t))
            }
            Some(TokKind::Tilde) => {
                let t = self.bump();
                let not = self.tree.add(NodeKind::Not, self.src_token(t));
                let inner = self.parse_atom()?;
                self.tree.add_child(not, inner);
                not
            }
            Some(TokKind::ActionBlock) => {
                let t = self.bump();
                if self.at(TokKind::Question) {
                    self.bump();
                    self.tree.add(NodeKind::Predicate, self.src_token(t))
                } else {
                    self.tree.add(NodeKind::Action, self.src_token(t))
                }
            }
            _ => {
                self.syntax_error("expected grammar element");
                self.bump_checked();
                return None;
            }
        };

        // Element options: `<k=v, flag>`.
        if self.at(TokKind::Lt) {
            self.parse_element_options(node);
        }
        Some(node)
    }

    fn bump_checked(&mut self) {
        if !self.at_eof() {
            self.bump();
        }
    }

    fn parse_element_options(&mut self, node: NodeId) {
        self.bump(); // <
        while !self.at_eof() && !self.at(TokKind::Gt) {
            if let Some(name) = self.expect(TokKind::Id, "expected element option name") {
                let key = name.text(self.src).to_string();
                if self.at(TokKind::Assign) {
                    self.bump();
                    if !self.at_eof() && !self.at(TokKind::Gt) {
                        let value = self.bump();
                        let text = value.text(self.src);
                        // Strip quotes off literal option values.
                        let text = text.strip_prefix('\'').unwrap_or(text);
                        let text = text.strip_suffix('\'').unwrap_or(text);
                        self.tree.set_option(node, &key, text);
                    }
                } else {
                    self.tree.set_option(node, &key, "true");
                }
            } else {
                break;
            }
            if self.at(TokKind::Comma) {
                self.bump();
            }
        }
        if self.at(TokKind::Gt) {
            self.bump();
        }
    }

    fn parse_lexer_commands(&mut self) -> NodeId {
        let arrow = self.bump();
        let commands = self
            .tree
            .add(NodeKind::LexerCommands, self.src_token(arrow));
        loop {
            // `mode` is both a keyword and a command name.
            let name = match self.current() {
                Some(TokKind::Id | TokKind::KwMode) => self.bump(),
                _ => {
                    self.syntax_error("expected lexer command");
                    break;
                }
            };
            let command = self.tree.add(NodeKind::LexerCommand, self.src_token(name));
            if self.at(TokKind::LParen) {
                self.bump();
                match self.current() {
                    Some(TokKind::Id | TokKind::Int) => {
                        let arg = self.bump();
                        let arg_node = self.tree.add(NodeKind::Id, self.src_token(arg));
                        self.tree.add_child(command, arg_node);
                    }
                    _ => self.syntax_error("expected lexer command argument"),
                }
                self.expect(TokKind::RParen, "expected ')' after command argument");
            }
            self.tree.add_child(commands, command);
            if self.at(TokKind::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        commands
    }

    fn emit_at(&mut self, kind: DiagnosticKind, t: Tok, args: &[&str]) {
        self.diags
            .emit(kind, self.file, SrcPos::new(t.line, t.col), args);
    }
}
