//! Extracting the grid from a model reply.

use super::VisionError;
use inkplay_engine::RawGrid;
use serde_json::Value;
use tracing::{debug, instrument};

/// Parses `{"grid": [[...], ...]}`, tolerating a Markdown code fence.
///
/// Cells must be strings or `null` (read as empty). Row and cell counts are
/// not checked here: a wrongly shaped grid is the validator's to reject.
#[instrument(skip(reply), fields(len = reply.len()))]
pub fn parse_grid_reply(reply: &str) -> Result<RawGrid, VisionError> {
    let body = strip_fence(reply);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| VisionError::new(format!("Reply is not JSON: {}", e)))?;

    let rows = value
        .get("grid")
        .ok_or_else(|| VisionError::new("Reply has no \"grid\" key".to_string()))?
        .as_array()
        .ok_or_else(|| VisionError::new("\"grid\" is not an array".to_string()))?;

    let grid = rows
        .iter()
        .map(|row| {
            row.as_array()
                .ok_or_else(|| VisionError::new("Grid row is not an array".to_string()))?
                .iter()
                .map(cell_text)
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<RawGrid, _>>()?;

    debug!(rows = grid.len(), "Grid parsed");
    Ok(grid)
}

fn cell_text(cell: &Value) -> Result<String, VisionError> {
    match cell {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        other => Err(VisionError::new(format!("Grid cell {} is not a string", other))),
    }
}

fn strip_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_reply() {
        let grid = parse_grid_reply(r#"{"grid": [["X","",""],["","O",""],["","",""]]}"#).unwrap();
        assert_eq!(grid[0][0], "X");
        assert_eq!(grid[1][1], "O");
        assert_eq!(grid[2][2], "");
    }

    #[test]
    fn test_fenced_reply_with_nulls() {
        let reply = "```json\n{\"grid\": [[null, \"x\", \"\"], [\"\", \"\", \"\"], [\"\", \"\", \"o\"]]}\n```";
        let grid = parse_grid_reply(reply).unwrap();
        assert_eq!(grid[0], vec!["", "x", ""]);
        assert_eq!(grid[2][2], "o");
    }

    #[test]
    fn test_shape_is_left_to_the_validator() {
        let grid = parse_grid_reply(r#"{"grid": [["X"]]}"#).unwrap();
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_missing_or_ill_typed_grid() {
        assert!(parse_grid_reply(r#"{"board": []}"#).is_err());
        assert!(parse_grid_reply(r#"{"grid": "X"}"#).is_err());
        assert!(parse_grid_reply(r#"{"grid": [[1, 2, 3]]}"#).is_err());
        assert!(parse_grid_reply("no json here").is_err());
    }
}
