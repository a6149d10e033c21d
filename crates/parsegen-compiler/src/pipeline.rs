//! The compilation pipeline facade.
//!
//! Drives one grammar through: parse, grammar construction, import merge,
//! implicit-lexer extraction, block-set reduction, the semantic pipeline,
//! ATN construction, and decision analysis. Stages gate on the error count
//! so a broken grammar stops early but still reports everything found so
//! far.

use std::collections::HashMap;

use crate::analysis::{analyze_decisions, check_left_recursion_cycles};
use crate::ast::NodeKind;
use crate::atn::build_atn;
use crate::diagnostics::{DiagnosticKind, Diagnostics, SrcPos};
use crate::grammar::Grammar;
use crate::semantic::run_semantic_pipeline;
use crate::syntax::parse_grammar;
use crate::transform::{extract_implicit_lexer, merge_imports, reduce_blocks_to_sets};
use crate::{Error, Result};

/// Supplies the source of imported grammars.
///
/// The compiler core never touches the file system; the driver decides how
/// `import X;` resolves to text.
pub trait ImportResolver {
    /// `(file_name, source_text)` for a grammar name, or `None`.
    fn load(&self, name: &str) -> Option<(String, String)>;
}

/// Resolver for grammars without imports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImports;

impl ImportResolver for NoImports {
    fn load(&self, _name: &str) -> Option<(String, String)> {
        None
    }
}

/// In-memory resolver, mainly for tests and embedded use.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    sources: HashMap<String, (String, String)>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, file_name: &str, text: &str) -> &mut Self {
        self.sources
            .insert(name.to_string(), (file_name.to_string(), text.to_string()));
        self
    }
}

impl ImportResolver for MapResolver {
    fn load(&self, name: &str) -> Option<(String, String)> {
        self.sources.get(name).cloned()
    }
}

/// A fully processed grammar.
///
/// For combined grammars, the extracted lexer sits in
/// `grammar.implicit_lexer`, itself fully compiled.
pub struct CompiledGrammar {
    pub grammar: Grammar,
}

impl CompiledGrammar {
    pub fn atn(&self) -> Option<&parsegen_core::Atn> {
        self.grammar.atn.as_ref()
    }

    pub fn lexer(&self) -> Option<&Grammar> {
        self.grammar.implicit_lexer.as_deref()
    }
}

/// Pipeline options.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub warnings_are_errors: bool,
}

/// The tool driver for a single compilation.
pub struct Compiler<'r> {
    resolver: &'r dyn ImportResolver,
    options: CompileOptions,
}

impl Default for Compiler<'_> {
    fn default() -> Self {
        Self::new(&NoImports)
    }
}

impl<'r> Compiler<'r> {
    pub fn new(resolver: &'r dyn ImportResolver) -> Self {
        Self {
            resolver,
            options: CompileOptions::default(),
        }
    }

    pub fn options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Compile one grammar from source text.
    ///
    /// Recoverable problems land in `diags`; the `Err` path is reserved
    /// for unusable input and internal failures.
    pub fn compile(
        &self,
        file_name: &str,
        text: &str,
        diags: &mut Diagnostics,
    ) -> Result<CompiledGrammar> {
        diags.warnings_are_errors = self.options.warnings_are_errors;

        let errors_before = diags.error_count();
        let Some((tree, root)) = parse_grammar(file_name, text, diags) else {
            return Err(Error::Unparsable(
                file_name.to_string(),
                diags.error_count() - errors_before,
            ));
        };
        if diags.error_count() > errors_before {
            // Syntax errors: keep the grammar object for inspection but
            // skip the deeper stages.
            let grammar = Grammar::new(file_name, tree, root);
            return Ok(CompiledGrammar { grammar });
        }

        let mut grammar = Grammar::new(file_name, tree, root);
        self.load_imports(&mut grammar, diags);
        merge_imports(&mut grammar, diags);

        // Combined grammars: split off and fully compile the lexer first,
        // then let the parser half inherit its vocabulary.
        if grammar.is_combined() {
            if let Some(lexer_grammar) = extract_implicit_lexer(&mut grammar) {
                let lexer = self.run_stages(lexer_grammar, diags)?;
                grammar.import_vocab(&lexer);
                grammar.implicit_lexer = Some(Box::new(lexer));
            }
        }

        let implicit_lexer = grammar.implicit_lexer.take();
        let mut grammar = self.run_stages(grammar, diags)?;
        grammar.implicit_lexer = implicit_lexer;
        Ok(CompiledGrammar { grammar })
    }

    /// The shared tail of the pipeline: block-set reduction, semantics,
    /// ATN, analysis.
    fn run_stages(&self, mut grammar: Grammar, diags: &mut Diagnostics) -> Result<Grammar> {
        reduce_blocks_to_sets(&mut grammar, diags);

        if !run_semantic_pipeline(&mut grammar, diags) {
            return Ok(grammar);
        }

        let atn = build_atn(&mut grammar, diags);
        grammar.atn = Some(atn);

        // Lookahead closure over a left-recursive call graph would not
        // terminate; decisions are only analyzed on a cycle-free grammar.
        let errors_before = diags.error_count();
        check_left_recursion_cycles(&grammar, diags);
        if diags.error_count() == errors_before {
            analyze_decisions(&mut grammar);
        }

        Ok(grammar)
    }

    /// Load the grammars named by `import` statements, depth-first.
    fn load_imports(&self, grammar: &mut Grammar, diags: &mut Diagnostics) {
        let mut names: Vec<(String, SrcPos)> = Vec::new();
        for import in grammar
            .tree
            .children(grammar.root)
            .iter()
            .copied()
            .filter(|&c| matches!(grammar.tree.kind(c), NodeKind::Import))
        {
            for &entry in grammar.tree.children(import) {
                names.push((
                    grammar.tree.text(entry).to_string(),
                    grammar.tree.node(entry).pos(),
                ));
            }
        }

        let mut loading = vec![grammar.name.clone()];
        for (name, pos) in names {
            match self.load_one(&name, &mut loading, diags) {
                Some(imported) => grammar.imports.push(imported),
                None => {
                    let file = grammar.file_name.clone();
                    diags.emit(DiagnosticKind::NoSuchGrammar, &file, pos, &[&name]);
                }
            }
        }
    }

    /// Parse one imported grammar, recursing into its own imports.
    /// `loading` breaks cycles.
    fn load_one(
        &self,
        name: &str,
        loading: &mut Vec<String>,
        diags: &mut Diagnostics,
    ) -> Option<Grammar> {
        if loading.iter().any(|n| n == name) {
            return None;
        }
        let (file_name, text) = self.resolver.load(name)?;
        let (tree, root) = parse_grammar(&file_name, &text, diags)?;
        let mut imported = Grammar::new(&file_name, tree, root);

        loading.push(name.to_string());
        let mut nested_names: Vec<(String, SrcPos)> = Vec::new();
        for import in imported
            .tree
            .children(imported.root)
            .iter()
            .copied()
            .filter(|&c| matches!(imported.tree.kind(c), NodeKind::Import))
        {
            for &entry in imported.tree.children(import) {
                nested_names.push((
                    imported.tree.text(entry).to_string(),
                    imported.tree.node(entry).pos(),
                ));
            }
        }
        for (nested, pos) in nested_names {
            match self.load_one(&nested, loading, diags) {
                Some(g) => imported.imports.push(g),
                None => {
                    let file = imported.file_name.clone();
                    diags.emit(DiagnosticKind::NoSuchGrammar, &file, pos, &[&nested]);
                }
            }
        }
        loading.pop();

        // A delegate's own imports fold into it before it merges upward.
        merge_imports(&mut imported, diags);
        Some(imported)
    }
}
