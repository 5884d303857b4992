use std::collections::HashMap;

use indexmap::IndexMap;

/// Two-tone color for a fixed-palette channel value. Labels like `red_blue`
/// split into a start/end pair; plain labels use the same tone for both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPair {
    pub start: String,
    pub end: String,
}

/// Color lookup table expanded from an enumerated value map: every raw
/// channel value inside a `[low, high]` range gets its own entry.
/// Immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    entries: HashMap<u8, ColorPair>,
}

impl ColorTable {
    pub fn from_map(map: &IndexMap<String, (u8, u8)>) -> Self {
        let mut entries = HashMap::new();
        for (label, &(low, high)) in map {
            let pair = match label.split_once('_') {
                Some((start, end)) => ColorPair {
                    start: start.to_string(),
                    end: end.to_string(),
                },
                None => ColorPair {
                    start: label.clone(),
                    end: label.clone(),
                },
            };
            for value in low..=high {
                entries.insert(value, pair.clone());
            }
        }
        ColorTable { entries }
    }

    pub fn get(&self, value: u8) -> Option<&ColorPair> {
        self.entries.get(&value)
    }

    /// Lookup with the renderer's fallback: an unmapped value resolves to
    /// the entry at 0 when one exists.
    pub fn resolve(&self, value: u8) -> Option<&ColorPair> {
        self.entries.get(&value).or_else(|| self.entries.get(&0))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One gobo wheel position. A `dither_` label prefix marks the dithered
/// variant of the pattern; the label `none` means no gobo in the beam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoboEntry {
    pub gobo: String,
    pub dither: bool,
}

impl GoboEntry {
    /// Whether the beam shows no pattern at this position.
    pub fn is_open(&self) -> bool {
        self.gobo == "none"
    }
}

/// Gobo lookup table expanded the same way as [`ColorTable`]. A missing
/// value has no fallback; the renderer hides the pattern instead.
#[derive(Debug, Clone, Default)]
pub struct GoboTable {
    entries: HashMap<u8, GoboEntry>,
}

impl GoboTable {
    pub fn from_map(map: &IndexMap<String, (u8, u8)>) -> Self {
        let mut entries = HashMap::new();
        for (label, &(low, high)) in map {
            let entry = match label.strip_prefix("dither_") {
                Some(pattern) => GoboEntry {
                    gobo: pattern.to_string(),
                    dither: true,
                },
                None => GoboEntry {
                    gobo: label.clone(),
                    dither: false,
                },
            };
            for value in low..=high {
                entries.insert(value, entry.clone());
            }
        }
        GoboTable { entries }
    }

    pub fn get(&self, value: u8) -> Option<&GoboEntry> {
        self.entries.get(&value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(json: &str) -> IndexMap<String, (u8, u8)> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn color_range_expands_inclusively() {
        let table = ColorTable::from_map(&map(r#"{"red_blue": [10, 12]}"#));
        for value in 10..=12 {
            let pair = table.get(value).unwrap();
            assert_eq!(pair.start, "red");
            assert_eq!(pair.end, "blue");
        }
        assert!(table.get(9).is_none());
        assert!(table.get(13).is_none());
    }

    #[test]
    fn plain_label_uses_one_tone_for_both_ends() {
        let table = ColorTable::from_map(&map(r#"{"amber": [0, 4]}"#));
        let pair = table.get(2).unwrap();
        assert_eq!(pair.start, "amber");
        assert_eq!(pair.end, "amber");
    }

    #[test]
    fn resolve_falls_back_to_the_zero_entry() {
        let table = ColorTable::from_map(&map(r#"{"white": [0, 9], "red": [10, 19]}"#));
        assert_eq!(table.resolve(15).unwrap().start, "red");
        assert_eq!(table.resolve(200).unwrap().start, "white");

        let no_zero = ColorTable::from_map(&map(r#"{"red": [10, 19]}"#));
        assert!(no_zero.resolve(200).is_none());
    }

    #[test]
    fn dither_prefix_is_stripped_and_flagged() {
        let table = GoboTable::from_map(&map(r#"{"stars": [0, 4], "dither_stars": [5, 9]}"#));
        let plain = table.get(2).unwrap();
        assert_eq!(plain.gobo, "stars");
        assert!(!plain.dither);

        let dithered = table.get(7).unwrap();
        assert_eq!(dithered.gobo, "stars");
        assert!(dithered.dither);
    }

    #[test]
    fn none_label_is_the_open_position() {
        let table = GoboTable::from_map(&map(r#"{"none": [0, 9]}"#));
        assert!(table.get(3).unwrap().is_open());
        assert!(table.get(100).is_none());
    }

    #[test]
    fn later_labels_overwrite_overlapping_ranges() {
        let table = ColorTable::from_map(&map(r#"{"red": [0, 10], "blue": [5, 10]}"#));
        assert_eq!(table.get(4).unwrap().start, "red");
        assert_eq!(table.get(5).unwrap().start, "blue");
    }
}
