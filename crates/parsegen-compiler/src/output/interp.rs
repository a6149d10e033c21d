//! Interpreter dump emission.
//!
//! A fixed-shape plaintext file: token literal names, token symbolic
//! names, rule names, the lexer's channel and mode names, then the
//! serialized ATN integers.

use std::fmt::Write;

use parsegen_core::{serialize, MIN_USER_TOKEN_TYPE};

use crate::grammar::{Grammar, DEFAULT_MODE};
use crate::{Error, Result};

pub fn write_interp_file(g: &Grammar) -> Result<String> {
    let mut out = String::new();
    let w = "String write never fails";

    writeln!(out, "token literal names:").expect(w);
    for t in MIN_USER_TOKEN_TYPE..=g.max_token_type {
        let name = g.type_to_string_literal[t as usize]
            .clone()
            .unwrap_or_else(|| "null".to_string());
        writeln!(out, "{name}").expect(w);
    }
    writeln!(out).expect(w);

    writeln!(out, "token symbolic names:").expect(w);
    for t in MIN_USER_TOKEN_TYPE..=g.max_token_type {
        let name = g.type_to_token_name[t as usize]
            .clone()
            .unwrap_or_else(|| "null".to_string());
        writeln!(out, "{name}").expect(w);
    }
    writeln!(out).expect(w);

    writeln!(out, "rule names:").expect(w);
    for name in g.rules.keys() {
        writeln!(out, "{name}").expect(w);
    }
    writeln!(out).expect(w);

    if g.is_lexer() {
        writeln!(out, "channel names:").expect(w);
        writeln!(out, "DEFAULT_TOKEN_CHANNEL").expect(w);
        writeln!(out, "HIDDEN").expect(w);
        for name in g.channel_name_to_value.keys() {
            writeln!(out, "{name}").expect(w);
        }
        writeln!(out).expect(w);

        writeln!(out, "mode names:").expect(w);
        for name in g.modes.keys() {
            let display = if name == DEFAULT_MODE { "DEFAULT_MODE" } else { name };
            writeln!(out, "{display}").expect(w);
        }
        writeln!(out).expect(w);
    }

    let atn = g
        .atn
        .as_ref()
        .ok_or_else(|| Error::Internal("interp dump requested before ATN build".to_string()))?;
    let words = serialize(atn)
        .map_err(|e| Error::Internal(format!("ATN serialization failed: {e}")))?;
    let rendered: Vec<String> = words.iter().map(|word| word.to_string()).collect();
    writeln!(out, "atn:").expect(w);
    writeln!(out, "[{}]", rendered.join(", ")).expect(w);

    Ok(out)
}
