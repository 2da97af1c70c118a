//! User-editable command groups
//!
//! Each group has a name, an active flag and an ordered list of command labels.
//! Group order matters: the overlay flattens active groups in the order they
//! appear here. The collection is written to the config file as a JSON object
//! (`name -> {active, commands}`) whose key order is the group order.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by group and command editing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("Group name cannot be empty")]
    EmptyName,

    #[error("A group named '{0}' already exists")]
    DuplicateName(String),

    #[error("No group named '{0}'")]
    NotFound(String),

    #[error("Command text cannot be empty")]
    EmptyCommand,

    #[error("Command index {index} is out of range for group '{group}'")]
    CommandOutOfRange { group: String, index: usize },
}

/// Persisted body of a group (the name is the JSON key)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GroupBody {
    #[serde(default = "default_active")]
    active: bool,
    #[serde(default)]
    commands: Vec<String>,
}

fn default_active() -> bool {
    true
}

/// A named, orderable set of command labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGroup {
    pub name: String,
    pub active: bool,
    pub commands: Vec<String>,
}

impl CommandGroup {
    pub fn new(name: impl Into<String>, commands: Vec<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            commands,
        }
    }
}

/// Ordered collection of command groups with unique names
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandGroups {
    groups: Vec<CommandGroup>,
}

impl CommandGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CommandGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut CommandGroup, GroupError> {
        self.groups
            .iter_mut()
            .find(|g| g.name == name)
            .ok_or_else(|| GroupError::NotFound(name.to_string()))
    }

    fn validate_new_name(&self, name: &str) -> Result<String, GroupError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GroupError::EmptyName);
        }
        if self.get(name).is_some() {
            return Err(GroupError::DuplicateName(name.to_string()));
        }
        Ok(name.to_string())
    }

    /// Append a new, active, empty group
    pub fn add_group(&mut self, name: &str) -> Result<(), GroupError> {
        let name = self.validate_new_name(name)?;
        debug!(group = %name, "Adding command group");
        self.groups.push(CommandGroup::new(name, Vec::new()));
        Ok(())
    }

    /// Rename a group in place, keeping its position, flag and commands
    pub fn rename_group(&mut self, old: &str, new: &str) -> Result<(), GroupError> {
        if new.trim() == old {
            self.get_mut(old)?;
            return Ok(());
        }
        let new_name = self.validate_new_name(new)?;
        let group = self.get_mut(old)?;
        debug!(from = %old, to = %new_name, "Renaming command group");
        group.name = new_name;
        Ok(())
    }

    pub fn remove_group(&mut self, name: &str) -> Result<CommandGroup, GroupError> {
        let idx = self
            .index_of(name)
            .ok_or_else(|| GroupError::NotFound(name.to_string()))?;
        debug!(group = %name, "Removing command group");
        Ok(self.groups.remove(idx))
    }

    pub fn set_active(&mut self, name: &str, active: bool) -> Result<(), GroupError> {
        self.get_mut(name)?.active = active;
        Ok(())
    }

    pub fn add_command(&mut self, group: &str, label: &str) -> Result<(), GroupError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(GroupError::EmptyCommand);
        }
        self.get_mut(group)?.commands.push(label.to_string());
        Ok(())
    }

    pub fn remove_command(&mut self, group: &str, index: usize) -> Result<String, GroupError> {
        let entry = self.get_mut(group)?;
        if index >= entry.commands.len() {
            return Err(GroupError::CommandOutOfRange {
                group: group.to_string(),
                index,
            });
        }
        Ok(entry.commands.remove(index))
    }

    /// Move a command within its group; `to` is the final index of the moved item
    pub fn move_command(&mut self, group: &str, from: usize, to: usize) -> Result<(), GroupError> {
        let entry = self.get_mut(group)?;
        let len = entry.commands.len();
        for index in [from, to] {
            if index >= len {
                return Err(GroupError::CommandOutOfRange {
                    group: group.to_string(),
                    index,
                });
            }
        }
        if from != to {
            let item = entry.commands.remove(from);
            entry.commands.insert(to, item);
        }
        Ok(())
    }

    /// Flattened commands of all active groups, in group order then command order
    pub fn active_commands(&self) -> Vec<String> {
        self.groups
            .iter()
            .filter(|g| g.active)
            .flat_map(|g| g.commands.iter().cloned())
            .collect()
    }

    /// Default catalog shipped with the application
    pub fn builtin() -> Self {
        let catalog: [(&str, [&str; 5]); 8] = [
            (
                "Drawing",
                [
                    "LINE (L) - Draw a straight line",
                    "CIRCLE (C) - Draw a circle",
                    "RECTANGLE (REC) - Draw a rectangle",
                    "ARC (A) - Draw an arc",
                    "POLYLINE (PL) - Draw a polyline",
                ],
            ),
            (
                "Modify",
                [
                    "MOVE (M) - Move objects",
                    "COPY (CO) - Copy objects",
                    "ROTATE (RO) - Rotate objects",
                    "SCALE (SC) - Scale objects",
                    "STRETCH (S) - Stretch objects",
                ],
            ),
            (
                "Advanced Modify",
                [
                    "TRIM (TR) - Trim objects",
                    "EXTEND (EX) - Extend objects",
                    "FILLET (F) - Round a corner",
                    "CHAMFER (CHA) - Bevel a corner",
                    "OFFSET (O) - Create a parallel copy",
                ],
            ),
            (
                "Measure",
                [
                    "DISTANCE (DI) - Measure distance",
                    "AREA (AREA) - Calculate area",
                    "LIST (LI) - Show object information",
                    "ALIGN (AL) - Align objects",
                    "MEASURE (ME) - Place marks at intervals",
                ],
            ),
            (
                "Layers & Properties",
                [
                    "LAYER (LA) - Layer manager",
                    "MATCHPROP (MA) - Match properties",
                    "PROPERTIES (PR) - Properties palette",
                    "COLOR (COL) - Change color",
                    "LINETYPE (LT) - Change linetype",
                ],
            ),
            (
                "Text & Dimensions",
                [
                    "TEXT (T) - Add single-line text",
                    "MTEXT (MT) - Add multiline text",
                    "DIMLINEAR (DLI) - Linear dimension",
                    "DIMALIGNED (DAL) - Aligned dimension",
                    "DIMRADIUS (DRA) - Radius dimension",
                ],
            ),
            (
                "Blocks & References",
                [
                    "BLOCK (B) - Create a block",
                    "INSERT (I) - Insert a block",
                    "XREF (XR) - External references",
                    "EXPLODE (X) - Explode a block",
                    "WBLOCK (W) - Write block to file",
                ],
            ),
            (
                "Drafting Aids",
                [
                    "ORTHO (F8) - Toggle ortho mode",
                    "SNAP (F9) - Toggle snap",
                    "GRID (F7) - Toggle grid",
                    "OSNAP (F3) - Object snap settings",
                    "UCS (UC) - User coordinate system",
                ],
            ),
        ];

        Self {
            groups: catalog
                .iter()
                .map(|(name, commands)| {
                    CommandGroup::new(*name, commands.iter().map(|c| c.to_string()).collect())
                })
                .collect(),
        }
    }
}

impl Serialize for CommandGroups {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(
                &group.name,
                &GroupBody {
                    active: group.active,
                    commands: group.commands.clone(),
                },
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CommandGroups {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GroupsVisitor;

        impl<'de> Visitor<'de> for GroupsVisitor {
            type Value = CommandGroups;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object mapping group names to {active, commands}")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut groups: Vec<CommandGroup> = Vec::new();
                while let Some((name, body)) = access.next_entry::<String, GroupBody>()? {
                    // Later duplicates win but keep the first position
                    if let Some(existing) = groups.iter_mut().find(|g| g.name == name) {
                        existing.active = body.active;
                        existing.commands = body.commands;
                    } else {
                        groups.push(CommandGroup {
                            name,
                            active: body.active,
                            commands: body.commands,
                        });
                    }
                }
                Ok(CommandGroups { groups })
            }
        }

        deserializer.deserialize_map(GroupsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CommandGroups {
        let mut groups = CommandGroups::new();
        groups.add_group("Draw").unwrap();
        groups.add_command("Draw", "LINE (L)").unwrap();
        groups.add_command("Draw", "CIRCLE (C)").unwrap();
        groups.add_group("Edit").unwrap();
        groups.add_command("Edit", "MOVE (M)").unwrap();
        groups
    }

    #[test]
    fn test_builtin_catalog() {
        let groups = CommandGroups::builtin();
        assert_eq!(groups.len(), 8);
        assert!(groups.iter().all(|g| g.active));
        assert_eq!(groups.active_commands().len(), 40);
        assert_eq!(groups.active_commands()[0], "LINE (L) - Draw a straight line");
    }

    #[test]
    fn test_add_group_validation() {
        let mut groups = sample();
        assert_eq!(groups.add_group("   "), Err(GroupError::EmptyName));
        assert_eq!(
            groups.add_group(" Draw "),
            Err(GroupError::DuplicateName("Draw".to_string()))
        );

        groups.add_group("  Views ").unwrap();
        let added = groups.get("Views").unwrap();
        assert!(added.active);
        assert!(added.commands.is_empty());
        assert_eq!(groups.index_of("Views"), Some(2));
    }

    #[test]
    fn test_rename_keeps_position_and_contents() {
        let mut groups = sample();
        groups.set_active("Draw", false).unwrap();
        groups.rename_group("Draw", "Drawing").unwrap();

        assert_eq!(groups.index_of("Drawing"), Some(0));
        let renamed = groups.get("Drawing").unwrap();
        assert!(!renamed.active);
        assert_eq!(renamed.commands, vec!["LINE (L)", "CIRCLE (C)"]);
        assert!(groups.get("Draw").is_none());
    }

    #[test]
    fn test_rename_errors() {
        let mut groups = sample();
        assert_eq!(
            groups.rename_group("Draw", "Edit"),
            Err(GroupError::DuplicateName("Edit".to_string()))
        );
        assert_eq!(
            groups.rename_group("Missing", "Other"),
            Err(GroupError::NotFound("Missing".to_string()))
        );
        // Renaming to the same name is accepted as a no-op
        assert_eq!(groups.rename_group("Draw", "Draw"), Ok(()));
    }

    #[test]
    fn test_remove_group() {
        let mut groups = sample();
        let removed = groups.remove_group("Draw").unwrap();
        assert_eq!(removed.commands.len(), 2);
        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups.remove_group("Draw"),
            Err(GroupError::NotFound("Draw".to_string()))
        );
    }

    #[test]
    fn test_command_editing() {
        let mut groups = sample();
        assert_eq!(groups.add_command("Draw", "  "), Err(GroupError::EmptyCommand));
        groups.add_command("Draw", " ARC (A) ").unwrap();
        assert_eq!(groups.get("Draw").unwrap().commands[2], "ARC (A)");

        assert_eq!(groups.remove_command("Draw", 0), Ok("LINE (L)".to_string()));
        assert_eq!(
            groups.remove_command("Draw", 5),
            Err(GroupError::CommandOutOfRange {
                group: "Draw".to_string(),
                index: 5
            })
        );
    }

    #[test]
    fn test_move_command() {
        let mut groups = sample();
        groups.add_command("Draw", "ARC (A)").unwrap();

        groups.move_command("Draw", 0, 2).unwrap();
        assert_eq!(
            groups.get("Draw").unwrap().commands,
            vec!["CIRCLE (C)", "ARC (A)", "LINE (L)"]
        );

        groups.move_command("Draw", 2, 0).unwrap();
        assert_eq!(
            groups.get("Draw").unwrap().commands,
            vec!["LINE (L)", "CIRCLE (C)", "ARC (A)"]
        );

        assert!(groups.move_command("Draw", 0, 3).is_err());
    }

    #[test]
    fn test_active_commands_follow_flags() {
        let mut groups = sample();
        assert_eq!(
            groups.active_commands(),
            vec!["LINE (L)", "CIRCLE (C)", "MOVE (M)"]
        );

        groups.set_active("Draw", false).unwrap();
        assert_eq!(groups.active_commands(), vec!["MOVE (M)"]);

        groups.set_active("Draw", true).unwrap();
        groups.set_active("Edit", false).unwrap();
        assert_eq!(groups.active_commands(), vec!["LINE (L)", "CIRCLE (C)"]);

        assert_eq!(
            groups.set_active("Nope", true),
            Err(GroupError::NotFound("Nope".to_string()))
        );
    }

    #[test]
    fn test_json_object_keeps_group_order() {
        let mut groups = CommandGroups::new();
        for name in ["Zeta", "Alpha", "Mid"] {
            groups.add_group(name).unwrap();
        }
        groups.set_active("Alpha", false).unwrap();

        let json = serde_json::to_string(&groups).unwrap();
        assert_eq!(
            json,
            r#"{"Zeta":{"active":true,"commands":[]},"Alpha":{"active":false,"commands":[]},"Mid":{"active":true,"commands":[]}}"#
        );

        let parsed: CommandGroups = serde_json::from_str(&json).unwrap();
        let names: Vec<&str> = parsed.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
        assert!(!parsed.get("Alpha").unwrap().active);
    }

    #[test]
    fn test_json_missing_fields_default() {
        let parsed: CommandGroups =
            serde_json::from_str(r#"{"Draw":{"commands":["LINE"]},"Empty":{}}"#).unwrap();
        assert!(parsed.get("Draw").unwrap().active);
        assert!(parsed.get("Empty").unwrap().commands.is_empty());
    }

    #[test]
    fn test_json_rejects_wrong_shape() {
        assert!(serde_json::from_str::<CommandGroups>(r#"["Draw"]"#).is_err());
        assert!(serde_json::from_str::<CommandGroups>(r#"{"Draw":{"active":"yes"}}"#).is_err());
    }
}
