use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::from_str;
use std::error::Error;

static TEXTS_DIR: Dir = include_dir!("src/texts");

/// A named collection of reference passages, embedded at compile time
#[derive(Deserialize, Clone, Debug)]
pub struct TextSet {
    pub name: String,
    pub size: u32,
    pub passages: Vec<String>,
}

impl TextSet {
    pub fn load(file_name: &str) -> Self {
        read_set_from_file(format!("{file_name}.json")).unwrap()
    }

    /// Whether a set with this name is embedded. `load` panics on unknown
    /// names, so callers taking names from editable config check here first.
    pub fn exists(file_name: &str) -> bool {
        TEXTS_DIR.get_file(format!("{file_name}.json")).is_some()
    }

    /// A random passage from the set
    pub fn pick(&self) -> String {
        self.passages
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default()
    }
}

fn read_set_from_file(file_name: String) -> Result<TextSet, Box<dyn Error>> {
    let file = TEXTS_DIR
        .get_file(file_name)
        .expect("Text set file not found");

    let file_as_str = file
        .contents_utf8()
        .expect("Unable to interpret file as a string");

    let set = from_str(file_as_str).expect("Unable to deserialize text set json");

    Ok(set)
}
