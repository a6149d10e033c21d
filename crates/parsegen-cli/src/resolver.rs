//! File-system import resolution.

use std::path::PathBuf;

use parsegen_compiler::ImportResolver;

/// Resolves `import X;` to `X.g4` (or legacy `X.g`) next to the root
/// grammar.
pub struct FsResolver {
    base: PathBuf,
}

impl FsResolver {
    pub fn for_grammar(grammar_path: &std::path::Path) -> Self {
        let base = grammar_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { base }
    }
}

impl ImportResolver for FsResolver {
    fn load(&self, name: &str) -> Option<(String, String)> {
        for ext in ["g4", "g"] {
            let candidate = self.base.join(format!("{name}.{ext}"));
            if let Ok(text) = std::fs::read_to_string(&candidate) {
                return Some((candidate.display().to_string(), text));
            }
        }
        None
    }
}
