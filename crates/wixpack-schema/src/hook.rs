use crate::manifest::Hook;
use crate::types::{ExecuteMode, Impersonate};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HookError {
    #[error("hook command {command:?} contains U+{code:04X}, which is not allowed in XML")]
    InvalidCharacter { command: String, code: u32 },
}

/// Prepare a shell command for an installer-script attribute.
///
/// The first whitespace-delimited token is wrapped in double quotes unless
/// the command already starts with one, then the whole string is XML-escaped.
pub fn escape_hook(command: &str) -> Result<String, HookError> {
    let cmd = command.trim();
    let quoted = match cmd.split(char::is_whitespace).next() {
        Some(exe) if !exe.is_empty() && !cmd.starts_with('"') => {
            format!("\"{exe}\"{}", &cmd[exe.len()..])
        }
        _ => cmd.to_owned(),
    };
    escape_xml_text(&quoted).map_err(|c| HookError::InvalidCharacter {
        command: command.to_owned(),
        code: u32::from(c),
    })
}

/// XML character-data escaping. Returns the first character that has no
/// representation in an XML document.
pub fn escape_xml_text(text: &str) -> Result<String, char> {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            c if is_xml_char(c) => out.push(c),
            c => return Err(c),
        }
    }
    Ok(out)
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

impl Hook {
    /// Apply execution defaults and derive the escaped command.
    ///
    /// `execute` defaults to deferred. `impersonate` defaults to `yes` for
    /// immediate hooks, which run in the user's context, and `no` otherwise.
    pub fn normalize(&mut self) -> Result<(), HookError> {
        self.cooked_command = escape_hook(&self.command)?;
        if self.execute.is_empty() {
            ExecuteMode::Deferred.as_str().clone_into(&mut self.execute);
        }
        if self.impersonate.is_empty() {
            let default = if ExecuteMode::from_name(&self.execute) == Some(ExecuteMode::Immediate) {
                Impersonate::Yes
            } else {
                Impersonate::No
            };
            default.as_str().clone_into(&mut self.impersonate);
        }
        Ok(())
    }
}
