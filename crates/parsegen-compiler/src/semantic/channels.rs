//! Pass 7: channel assignment.

use parsegen_core::COMMON_CONSTANTS;

use crate::ast::NodeKind;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::Grammar;

/// Validate `channels {}` names and assign values after the predefined
/// channels. Names may not collide with the common constants, tokens, or
/// modes.
pub fn assign(g: &mut Grammar, diags: &mut Diagnostics) {
    let file = g.file_name.clone();
    let mode_names: Vec<String> = g.modes.keys().cloned().collect();

    for channels in g.tree.find_all(g.root, |k| matches!(k, NodeKind::Channels)) {
        for &entry in g.tree.children(channels).to_vec().iter() {
            let name = g.tree.text(entry).to_string();
            let pos = g.tree.node(entry).pos();

            if COMMON_CONSTANTS.contains(&name.as_str()) {
                diags.emit(
                    DiagnosticKind::ChannelConflictsWithCommonConstants,
                    &file,
                    pos,
                    &[&name],
                );
                continue;
            }
            if g.token_name_to_type.contains_key(&name) {
                diags.emit(
                    DiagnosticKind::ChannelConflictsWithToken,
                    &file,
                    pos,
                    &[&name],
                );
                continue;
            }
            if mode_names.iter().any(|m| m == &name) {
                diags.emit(
                    DiagnosticKind::ChannelConflictsWithMode,
                    &file,
                    pos,
                    &[&name],
                );
                continue;
            }
            g.define_channel(&name);
        }
    }
}
