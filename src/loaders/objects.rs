use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use log::{info, warn};

use crate::scene::SceneObject;

/// Either a bare array of objects or `{ "objects": [...] }`. Entries stay
/// raw so one unreadable object cannot fail the list.
#[derive(Deserialize)]
#[serde(untagged)]
enum SceneFile {
    List(Vec<Value>),
    Document { objects: Vec<Value> },
}

/// Loads a JSON object list for the viewport
pub fn load_scene_objects(path: impl AsRef<Path>) -> Result<Vec<SceneObject>> {
    let path = path.as_ref();
    info!("Loading scene objects: {:?}", path);

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene file: {:?}", path))?;
    let objects =
        parse_scene_objects(&text).with_context(|| format!("Failed to parse scene file: {:?}", path))?;

    info!("Loaded {} objects from {:?}", objects.len(), path);
    Ok(objects)
}

/// Parse an object list. Entries that are not a valid object are skipped
/// with a warning; only malformed JSON or a non-list document is an error.
pub fn parse_scene_objects(text: &str) -> Result<Vec<SceneObject>> {
    let entries = match serde_json::from_str(text)? {
        SceneFile::List(entries) => entries,
        SceneFile::Document { objects } => objects,
    };

    let objects: Vec<SceneObject> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(object) => Some(object),
            Err(e) => {
                warn!("Skipping object {}: {}", index, e);
                None
            }
        })
        .collect();

    let unrenderable = objects.iter().filter(|o| o.kind.shape().is_none()).count();
    if unrenderable > 0 {
        warn!("{} objects have a type with no renderable shape and will be skipped", unrenderable);
    }
    Ok(objects)
}
