// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line-oriented editor command scripts.
//!
//! One command per line; blank lines and lines starting with `#` are
//! skipped.

use thiserror::Error;
use twin_editor_core::{
    Axis, Color, ColorParseError, Shortcut, TransformField, TransformMode, Vector3,
};

/// Error from parsing or running a script line
#[derive(Debug, Error, PartialEq)]
pub enum ScriptError {
    /// First word is not a known command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// A required argument is absent
    #[error("{command}: missing {argument}")]
    MissingArgument {
        /// Command being parsed
        command: &'static str,
        /// Name of the missing argument
        argument: &'static str,
    },

    /// More arguments than the command takes
    #[error("{0}: too many arguments")]
    TooManyArguments(&'static str),

    /// Argument is not a finite number
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    /// Unknown transform mode
    #[error("Invalid mode: {0} (expected translate, rotate or scale)")]
    InvalidMode(String),

    /// Unknown transform field
    #[error("Invalid field: {0} (expected position, rotation or scale)")]
    InvalidField(String),

    /// Unknown axis
    #[error("Invalid axis: {0} (expected x, y or z)")]
    InvalidAxis(String),

    /// Bad colour literal
    #[error("Invalid colour: {0}")]
    InvalidColor(#[from] ColorParseError),

    /// Unparseable key combination
    #[error("Invalid key combination: {0}")]
    InvalidShortcut(String),

    /// No node with this name in the loaded scene
    #[error("No node named {0:?}")]
    UnknownNode(String),

    /// Command needs a selection
    #[error("{0}: nothing selected")]
    NothingSelected(&'static str),
}

/// A parsed script command
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    /// Select a node by name
    Select(String),
    /// Clear the selection
    Deselect,
    /// Switch gizmo mode
    Mode(TransformMode),
    /// Drag the selection so the current mode's vector becomes this value
    Drag(Vector3),
    /// Type a value into one inspector field
    Set {
        /// Position, rotation or scale
        field: TransformField,
        /// Component
        axis: Axis,
        /// New value
        value: f32,
    },
    /// Hide a node
    Hide(String),
    /// Show a node
    Show(String),
    /// Set a node's material colour
    Color(String, Color),
    /// Set a node's material opacity
    Opacity(String, f32),
    /// Undo the last edit
    Undo,
    /// Redo the last undone edit
    Redo,
    /// Clear the history
    Clear,
    /// Press a key combination
    Key(Shortcut),
    /// Type into the hierarchy search box (empty clears)
    Filter(String),
    /// Print the (filtered) hierarchy
    Tree,
    /// Print selection and history status
    Status,
}

/// Parse one script line; `Ok(None)` for blanks and comments
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand>, ScriptError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let mut args = Args::new(rest);

    let command = match word.to_lowercase().as_str() {
        "select" => ScriptCommand::Select(args.rest("select", "name")?),
        "deselect" => args.done("deselect", ScriptCommand::Deselect)?,
        "mode" => {
            let name = args.next("mode", "mode")?;
            let mode = TransformMode::from_name(name)
                .ok_or_else(|| ScriptError::InvalidMode(name.to_string()))?;
            args.done("mode", ScriptCommand::Mode(mode))?
        }
        "drag" => {
            let x = number(args.next("drag", "x")?)?;
            let y = number(args.next("drag", "y")?)?;
            let z = number(args.next("drag", "z")?)?;
            args.done("drag", ScriptCommand::Drag(Vector3::new(x, y, z)))?
        }
        "set" => {
            let field_name = args.next("set", "field")?;
            let field = TransformField::from_name(field_name)
                .ok_or_else(|| ScriptError::InvalidField(field_name.to_string()))?;
            let axis_name = args.next("set", "axis")?;
            let axis = Axis::from_name(axis_name)
                .ok_or_else(|| ScriptError::InvalidAxis(axis_name.to_string()))?;
            let value = number(args.next("set", "value")?)?;
            args.done("set", ScriptCommand::Set { field, axis, value })?
        }
        "hide" => ScriptCommand::Hide(args.rest("hide", "name")?),
        "show" => ScriptCommand::Show(args.rest("show", "name")?),
        "color" | "colour" => {
            let (name, hex) = args.name_then_value("color", "colour")?;
            ScriptCommand::Color(name, Color::from_hex(hex)?)
        }
        "opacity" => {
            let (name, value) = args.name_then_value("opacity", "opacity")?;
            ScriptCommand::Opacity(name, number(value)?)
        }
        "undo" => args.done("undo", ScriptCommand::Undo)?,
        "redo" => args.done("redo", ScriptCommand::Redo)?,
        "clear" => args.done("clear", ScriptCommand::Clear)?,
        "key" => {
            let combo = args.next("key", "combination")?;
            let shortcut = Shortcut::parse(combo)
                .ok_or_else(|| ScriptError::InvalidShortcut(combo.to_string()))?;
            args.done("key", ScriptCommand::Key(shortcut))?
        }
        "filter" => ScriptCommand::Filter(rest.to_string()),
        "tree" => args.done("tree", ScriptCommand::Tree)?,
        "status" => args.done("status", ScriptCommand::Status)?,
        _ => return Err(ScriptError::UnknownCommand(word.to_string())),
    };
    Ok(Some(command))
}

/// Finite `f32`; `NaN` and `inf` parse but are refused
fn number(text: &str) -> Result<f32, ScriptError> {
    match text.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ScriptError::InvalidNumber(text.to_string())),
    }
}

/// Whitespace-separated argument cursor
struct Args<'a> {
    rest: &'a str,
}

impl<'a> Args<'a> {
    fn new(rest: &'a str) -> Self {
        Self { rest }
    }

    fn next(
        &mut self,
        command: &'static str,
        argument: &'static str,
    ) -> Result<&'a str, ScriptError> {
        let rest = self.rest.trim_start();
        if rest.is_empty() {
            return Err(ScriptError::MissingArgument { command, argument });
        }
        let (word, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        self.rest = tail;
        Ok(word)
    }

    /// Everything left, so node names may contain spaces
    fn rest(
        &mut self,
        command: &'static str,
        argument: &'static str,
    ) -> Result<String, ScriptError> {
        let rest = self.rest.trim();
        if rest.is_empty() {
            return Err(ScriptError::MissingArgument { command, argument });
        }
        self.rest = "";
        Ok(rest.to_string())
    }

    /// Node name (may contain spaces) followed by one final value
    fn name_then_value(
        &mut self,
        command: &'static str,
        argument: &'static str,
    ) -> Result<(String, &'a str), ScriptError> {
        let rest = self.rest.trim();
        let Some((name, value)) = rest.rsplit_once(char::is_whitespace) else {
            return Err(ScriptError::MissingArgument {
                command,
                argument: if rest.is_empty() { "name" } else { argument },
            });
        };
        self.rest = "";
        Ok((name.trim_end().to_string(), value))
    }

    fn done(
        &self,
        command: &'static str,
        parsed: ScriptCommand,
    ) -> Result<ScriptCommand, ScriptError> {
        if self.rest.trim().is_empty() {
            Ok(parsed)
        } else {
            Err(ScriptError::TooManyArguments(command))
        }
    }
}
