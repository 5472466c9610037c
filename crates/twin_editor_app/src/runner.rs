// SPDX-License-Identifier: MIT OR Apache-2.0
//! Executes script commands against an editor session.

use crate::script::{parse_line, ScriptCommand, ScriptError};
use std::time::Instant;
use twin_editor_core::{
    Axis, EditorConfig, EditorSession, MemoryScene, Modifiers, NodeId, SceneNode, TransformSnapshot,
    Vector3,
};

/// Simulated frame length used to advance the session between commands
const FRAME_SECS: f32 = 1.0 / 60.0;

/// Headless driver around one editor session
pub struct ScriptRunner {
    session: EditorSession<MemoryScene>,
    clock: Instant,
}

impl ScriptRunner {
    /// Create a runner with `scene` already loaded
    pub fn new(config: EditorConfig, scene: MemoryScene) -> Self {
        let mut session = EditorSession::new(config);
        session.load_model(scene);
        Self {
            session,
            clock: Instant::now(),
        }
    }

    /// The driven session
    pub fn session(&self) -> &EditorSession<MemoryScene> {
        &self.session
    }

    /// Run a whole script, returning printed output. Bad lines are logged
    /// and skipped.
    pub fn run_script(&mut self, script: &str) -> Vec<String> {
        let mut output = Vec::new();
        for (index, line) in script.lines().enumerate() {
            let line_number = index + 1;
            let result = parse_line(line).and_then(|command| match command {
                Some(command) => self.execute(command),
                None => Ok(None),
            });
            match result {
                Ok(Some(text)) => output.push(text),
                Ok(None) => {}
                Err(e) => tracing::error!("Line {line_number}: {e}"),
            }
        }
        output
    }

    /// Execute one command, returning text to print
    pub fn execute(&mut self, command: ScriptCommand) -> Result<Option<String>, ScriptError> {
        tracing::debug!("Executing {command:?}");
        let output = match command {
            ScriptCommand::Select(name) => {
                let id = self.node_named(&name)?;
                self.session.select(Some(id));
                None
            }
            ScriptCommand::Deselect => {
                self.session.select(None);
                None
            }
            ScriptCommand::Mode(mode) => {
                self.session.set_transform_mode(mode);
                None
            }
            ScriptCommand::Drag(target) => Some(self.drag(target)?),
            ScriptCommand::Set { field, axis, value } => {
                if self.session.selected().is_none() {
                    return Err(ScriptError::NothingSelected("set"));
                }
                let recorded = self.session.set_field(field, axis, value);
                Some(commit_message(recorded))
            }
            ScriptCommand::Hide(name) => {
                let id = self.node_named(&name)?;
                self.session.set_visibility(id, false);
                None
            }
            ScriptCommand::Show(name) => {
                let id = self.node_named(&name)?;
                self.session.set_visibility(id, true);
                None
            }
            ScriptCommand::Color(name, color) => {
                let id = self.node_named(&name)?;
                if !self.session.set_color(id, color) {
                    tracing::warn!("{name} has no material");
                }
                None
            }
            ScriptCommand::Opacity(name, opacity) => {
                let id = self.node_named(&name)?;
                if !self.session.set_opacity(id, opacity) {
                    tracing::warn!("{name} has no material");
                }
                None
            }
            ScriptCommand::Undo => {
                self.session.undo();
                None
            }
            ScriptCommand::Redo => {
                self.session.redo();
                None
            }
            ScriptCommand::Clear => {
                self.session.clear_history();
                None
            }
            ScriptCommand::Key(shortcut) => {
                let modifiers = Modifiers {
                    ctrl: shortcut.primary,
                    shift: shortcut.shift,
                    ..Modifiers::NONE
                };
                self.session
                    .handle_shortcut(shortcut.key, modifiers)
                    .map(|action| format!("{shortcut} -> {}", action.id()))
            }
            ScriptCommand::Filter(text) => {
                self.session.set_filter_text(&text, self.clock);
                // let the search box settle
                self.clock += self.session.config().filter_debounce();
                None
            }
            ScriptCommand::Tree => Some(self.render_tree()),
            ScriptCommand::Status => Some(self.render_status()),
        };

        self.session.tick(FRAME_SECS, self.clock);
        Ok(output)
    }

    fn node_named(&self, name: &str) -> Result<NodeId, ScriptError> {
        self.session
            .scene()
            .and_then(|scene| scene.find_by_name(name))
            .ok_or_else(|| ScriptError::UnknownNode(name.to_string()))
    }

    fn drag(&mut self, target: Vector3) -> Result<String, ScriptError> {
        let current = self
            .session
            .selected()
            .and_then(|id| self.session.transform_of(id))
            .ok_or(ScriptError::NothingSelected("drag"))?;

        let field = self.session.transform_mode().field();
        let moved = Axis::ALL.iter().fold(current, |snapshot: TransformSnapshot, axis| {
            snapshot.with_component(field, *axis, target.get(*axis))
        });

        self.session.drag_start();
        self.session.drag_to(moved);
        Ok(commit_message(self.session.drag_end()))
    }

    fn render_tree(&self) -> String {
        let mut text = String::new();
        render_nodes(self.session.filtered_tree(), 0, &mut text);
        text.trim_end().to_string()
    }

    fn render_status(&self) -> String {
        let selected = self
            .session
            .selected()
            .and_then(|id| self.session.mirror().get(id))
            .map_or("none", |node| node.name.as_str());
        let status = self.session.history_status();
        let cursor = status.cursor.map_or_else(|| "-".to_string(), |c| c.to_string());

        let mut text = format!(
            "selected: {selected}\nmode: {}\nhistory: cursor {cursor} of {} (undo: {}, redo: {})",
            self.session.transform_mode().name(),
            status.len,
            yes_no(status.can_undo),
            yes_no(status.can_redo),
        );
        if let Some(fields) = self.session.fields() {
            let t = fields.transform;
            text.push_str(&format!(
                "\nposition: {:?}\nrotation: {:?}\nscale: {:?}",
                t.position.to_array(),
                t.rotation.to_array(),
                t.scale.to_array(),
            ));
        }
        text
    }
}

fn render_nodes(nodes: &[SceneNode], depth: usize, text: &mut String) {
    for node in nodes {
        let hidden = if node.visible { "" } else { " (hidden)" };
        text.push_str(&format!(
            "{}{} [{}]{hidden}\n",
            "  ".repeat(depth),
            node.name,
            node.node_type.name(),
        ));
        render_nodes(&node.children, depth + 1, text);
    }
}

fn commit_message(recorded: bool) -> String {
    if recorded {
        "recorded".to_string()
    } else {
        "no change".to_string()
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twin_editor_core::{SceneDescription, SceneGraph};

    const SCENE: &str = r#"(
        root: (
            name: "DataHall",
            kind: Scene,
            children: [
                (
                    name: "Rack01",
                    kind: Mesh,
                    transform: (position: (x: 1.0, y: 0.0, z: 0.0)),
                ),
                (name: "Rack02", kind: Mesh),
            ],
        ),
    )"#;

    fn runner() -> ScriptRunner {
        let description = SceneDescription::from_ron(SCENE).unwrap();
        let scene = MemoryScene::from_description(&description).unwrap();
        ScriptRunner::new(EditorConfig::default(), scene)
    }

    fn position_of(runner: &ScriptRunner, name: &str) -> Vector3 {
        let scene = runner.session().scene().unwrap();
        let id = scene.find_by_name(name).unwrap();
        scene.transform(id).unwrap().position
    }

    #[test]
    fn test_drag_undo_redo_script() {
        let mut runner = runner();
        let output = runner.run_script("select Rack01\ndrag 5 0 0\nundo\n");
        assert_eq!(output, vec!["recorded".to_string()]);
        assert_eq!(position_of(&runner, "Rack01"), Vector3::new(1.0, 0.0, 0.0));

        runner.run_script("redo");
        assert_eq!(position_of(&runner, "Rack01"), Vector3::new(5.0, 0.0, 0.0));
        assert_eq!(runner.session().history_status().len, 2);
    }

    #[test]
    fn test_bad_lines_are_skipped() {
        let mut runner = runner();
        let output = runner.run_script("select Nowhere\nbogus\nselect Rack02\nset position y 2\n");
        assert_eq!(output, vec!["recorded".to_string()]);
        assert_eq!(position_of(&runner, "Rack02"), Vector3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_drag_requires_selection() {
        let mut runner = runner();
        assert_eq!(
            runner.execute(ScriptCommand::Drag(Vector3::ZERO)),
            Err(ScriptError::NothingSelected("drag"))
        );
    }

    #[test]
    fn test_scale_mode_drag() {
        let mut runner = runner();
        runner.run_script("select Rack02\nmode scale\ndrag 2 2 2");
        let scene = runner.session().scene().unwrap();
        let id = scene.find_by_name("Rack02").unwrap();
        assert_eq!(scene.transform(id).unwrap().scale, Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_tree_filter_and_visibility() {
        let mut runner = runner();
        let output = runner.run_script("hide Rack02\nfilter rack01\ntree\nfilter\ntree");
        assert_eq!(
            output,
            vec![
                "DataHall [scene]\n  Rack01 [mesh]".to_string(),
                "DataHall [scene]\n  Rack01 [mesh]\n  Rack02 [mesh] (hidden)".to_string(),
            ]
        );
    }

    #[test]
    fn test_key_and_status() {
        let mut runner = runner();
        let output = runner.run_script("select Rack01\nkey R\nkey Escape\nstatus");
        assert_eq!(output[0], "R -> transform.scale");
        assert_eq!(output[1], "Esc -> edit.deselect");
        assert!(output[2].starts_with("selected: none\nmode: Scale\nhistory: cursor 0 of 1"));
    }
}
