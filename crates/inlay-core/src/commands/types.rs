use serde::{Deserialize, Serialize};

/// One structured command from the control channel.
///
/// Each command is a JSON object with `"action"` as the tag field. The
/// `add` coordinates and bounds are in terminal character-cell units and are
/// converted to pixels against the terminal's font cell metrics before they
/// reach the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Command {
    /// Show an image inside the terminal at the given cell rectangle.
    Add {
        /// Path of the image file to load.
        path: String,
        /// Left edge, in cells.
        x: i32,
        /// Top edge, in cells.
        y: i32,
        /// Maximum width of the overlay, in cells.
        max_width: u32,
        /// Maximum height of the overlay, in cells.
        max_height: u32,
    },

    /// Remove the currently displayed image.
    Remove,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_deserializes_from_tagged_json() {
        let cmd: Command = serde_json::from_str(
            r#"{"action":"add","path":"/tmp/a.png","x":2,"y":1,"max_width":10,"max_height":5}"#,
        )
        .expect("add should parse");

        assert_eq!(
            cmd,
            Command::Add {
                path: "/tmp/a.png".to_string(),
                x: 2,
                y: 1,
                max_width: 10,
                max_height: 5,
            }
        );
    }

    #[test]
    fn test_remove_deserializes() {
        let cmd: Command = serde_json::from_str(r#"{"action":"remove"}"#).expect("remove");
        assert_eq!(cmd, Command::Remove);
    }

    #[test]
    fn test_add_missing_field_fails() {
        let result: Result<Command, _> =
            serde_json::from_str(r#"{"action":"add","path":"/tmp/a.png"}"#);
        assert!(result.is_err());
    }
}
