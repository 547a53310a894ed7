//! Mutable game state and its text save format

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SECTION_VARIABLES: &str = "[VARIABLES]";
const SECTION_STRING_VARIABLES: &str = "[STRING_VARIABLES]";
const SECTION_CHOICE_HISTORY: &str = "[CHOICE_HISTORY]";
const SECTION_COLLECTED_ENDINGS: &str = "[COLLECTED_ENDINGS]";
/// A list entry that is the empty string; a blank line would be skipped
const EMPTY_ENTRY: &str = "\\e";

/// Variables, choice history and endings of a running story
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GameState {
    /// Integer variables
    int_vars: BTreeMap<String, i64>,
    /// String variables, a namespace separate from `int_vars`
    string_vars: BTreeMap<String, String>,
    /// Text of every option chosen so far, in order
    choice_history: Vec<String>,
    /// Endings reached in this or earlier runs
    collected_endings: Vec<String>,
    /// Every ending declared by the loaded script. Not part of a save.
    #[serde(skip)]
    all_endings: Vec<String>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from serialized text
    pub fn from_serialized(data: &str) -> Self {
        let mut state = Self::new();
        state.deserialize(data);
        state
    }

    pub fn set_int(&mut self, name: &str, value: i64) {
        self.int_vars.insert(name.to_string(), value);
    }

    /// Value of an integer variable, 0 when unset
    pub fn get_int(&self, name: &str) -> i64 {
        self.int_vars.get(name).copied().unwrap_or(0)
    }

    pub fn has_int(&self, name: &str) -> bool {
        self.int_vars.contains_key(name)
    }

    /// Add `delta` to a variable, treating an unset variable as 0
    pub fn add_int(&mut self, name: &str, delta: i64) {
        let slot = self.int_vars.entry(name.to_string()).or_insert(0);
        *slot = slot.wrapping_add(delta);
    }

    pub fn int_vars(&self) -> &BTreeMap<String, i64> {
        &self.int_vars
    }

    pub fn set_string(&mut self, name: &str, value: impl Into<String>) {
        self.string_vars.insert(name.to_string(), value.into());
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.string_vars.get(name).map(String::as_str)
    }

    pub fn has_string(&self, name: &str) -> bool {
        self.string_vars.contains_key(name)
    }

    pub fn string_vars(&self) -> &BTreeMap<String, String> {
        &self.string_vars
    }

    /// Placeholder resolution rule for `${name}`.
    ///
    /// A non-empty string variable wins. Otherwise the integer variable is
    /// used, which renders as `0` when it is unset too.
    pub fn resolve_placeholder(&self, name: &str) -> String {
        match self.get_string(name) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => self.get_int(name).to_string(),
        }
    }

    /// Replace every `${name}` in `text` with its resolved value.
    /// An unterminated `${` is kept as written.
    pub fn interpolate(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    out.push_str(&self.resolve_placeholder(&after[..end]));
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    return out;
                }
            }
        }

        out.push_str(rest);
        out
    }

    pub fn record_choice(&mut self, text: impl Into<String>) {
        self.choice_history.push(text.into());
    }

    pub fn choice_history(&self) -> &[String] {
        &self.choice_history
    }

    /// Mark an ending as collected. No-op if it already is.
    pub fn add_ending(&mut self, name: &str) {
        if !self.collected_endings.iter().any(|e| e == name) {
            self.collected_endings.push(name.to_string());
        }
    }

    /// Declare an ending that exists in the script. No-op if already declared.
    pub fn register_ending(&mut self, name: &str) {
        if !self.all_endings.iter().any(|e| e == name) {
            self.all_endings.push(name.to_string());
        }
    }

    pub fn collected_endings(&self) -> &[String] {
        &self.collected_endings
    }

    pub fn all_endings(&self) -> &[String] {
        &self.all_endings
    }

    pub fn collected_count(&self) -> usize {
        self.collected_endings.len()
    }

    pub fn total_count(&self) -> usize {
        self.all_endings.len()
    }

    /// Collected endings that the loaded script does not declare
    pub fn undeclared_endings(&self) -> Vec<&str> {
        self.collected_endings
            .iter()
            .filter(|e| !self.all_endings.contains(e))
            .map(String::as_str)
            .collect()
    }

    /// Emit the four save sections in fixed order
    pub fn serialize(&self) -> String {
        let mut out = String::new();

        out.push_str(SECTION_VARIABLES);
        out.push('\n');
        for (name, value) in &self.int_vars {
            out.push_str(&format!("{name}={value}\n"));
        }

        out.push_str(SECTION_STRING_VARIABLES);
        out.push('\n');
        for (name, value) in &self.string_vars {
            out.push_str(&format!("{name}={}\n", escape(value)));
        }

        out.push_str(SECTION_CHOICE_HISTORY);
        out.push('\n');
        for choice in &self.choice_history {
            out.push_str(&encode_entry(choice));
            out.push('\n');
        }

        out.push_str(SECTION_COLLECTED_ENDINGS);
        out.push('\n');
        for ending in &self.collected_endings {
            out.push_str(&encode_entry(ending));
            out.push('\n');
        }

        out
    }

    /// Replace the saved parts of this state with the contents of `data`.
    ///
    /// Declared endings are kept: they come from the script, not the save.
    /// Unknown sections and unparsable integer lines are skipped.
    pub fn deserialize(&mut self, data: &str) {
        self.int_vars.clear();
        self.string_vars.clear();
        self.choice_history.clear();
        self.collected_endings.clear();

        let mut section = "";

        for raw in data.lines() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if line.is_empty() {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                section = match line {
                    SECTION_VARIABLES => SECTION_VARIABLES,
                    SECTION_STRING_VARIABLES => SECTION_STRING_VARIABLES,
                    SECTION_CHOICE_HISTORY => SECTION_CHOICE_HISTORY,
                    SECTION_COLLECTED_ENDINGS => SECTION_COLLECTED_ENDINGS,
                    _ => "",
                };
                continue;
            }

            match section {
                SECTION_VARIABLES => {
                    let Some((name, value)) = line.split_once('=') else {
                        continue;
                    };
                    match value.trim().parse::<i64>() {
                        Ok(value) => {
                            self.int_vars.insert(name.to_string(), value);
                        }
                        Err(_) => {
                            log::warn!("skipping corrupted variable line '{line}'");
                        }
                    }
                }
                SECTION_STRING_VARIABLES => {
                    if let Some((name, value)) = line.split_once('=') {
                        self.string_vars.insert(name.to_string(), unescape(value));
                    }
                }
                SECTION_CHOICE_HISTORY => self.choice_history.push(decode_entry(line)),
                SECTION_COLLECTED_ENDINGS => self.add_ending(&decode_entry(line)),
                _ => {}
            }
        }
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// One line of a list section. A leading `[` is escaped so the entry is not
/// read back as a section header.
fn encode_entry(value: &str) -> String {
    if value.is_empty() {
        return EMPTY_ENTRY.to_string();
    }
    let escaped = escape(value);
    if escaped.starts_with('[') {
        format!("\\{escaped}")
    } else {
        escaped
    }
}

fn decode_entry(line: &str) -> String {
    if line == EMPTY_ENTRY {
        String::new()
    } else {
        unescape(line)
    }
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('[') => out.push('['),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> GameState {
        let mut state = GameState::new();
        state.set_int("hp", 10);
        state.set_int("gold", -3);
        state.set_string("name", "Aki");
        state.set_string("letter", "Dear friend,\nsee you soon.\r\nC:\\path\\n");
        state.set_string("empty", "");
        state.record_choice("Yes");
        state.record_choice("Open the door");
        state.record_choice("[Leave]");
        state.record_choice("");
        state.add_ending("Good End");
        state.add_ending("Bad End");
        state
    }

    #[test]
    fn add_int_on_unset_variable_starts_from_zero() {
        let mut state = GameState::new();
        state.add_int("x", 5);
        assert_eq!(state.get_int("x"), 5);
        state.add_int("x", -7);
        assert_eq!(state.get_int("x"), -2);
    }

    #[test]
    fn unknown_int_defaults_to_zero() {
        let state = GameState::new();
        assert_eq!(state.get_int("missing"), 0);
        assert!(!state.has_int("missing"));
    }

    #[test]
    fn endings_are_idempotent() {
        let mut state = GameState::new();
        state.add_ending("A");
        state.add_ending("A");
        state.register_ending("A");
        state.register_ending("B");
        state.register_ending("B");

        assert_eq!(state.collected_endings(), ["A"]);
        assert_eq!(state.all_endings(), ["A", "B"]);
        assert_eq!(state.collected_count(), 1);
        assert_eq!(state.total_count(), 2);
    }

    #[test]
    fn placeholder_prefers_non_empty_string() {
        let mut state = GameState::new();
        state.set_int("name", 7);
        assert_eq!(state.resolve_placeholder("name"), "7");

        state.set_string("name", "");
        assert_eq!(state.resolve_placeholder("name"), "7");

        state.set_string("name", "Mio");
        assert_eq!(state.resolve_placeholder("name"), "Mio");

        assert_eq!(state.resolve_placeholder("nobody"), "0");
    }

    #[test]
    fn interpolate_replaces_placeholders() {
        let mut state = GameState::new();
        state.set_string("who", "Ren");
        state.set_int("hp", 3);

        assert_eq!(
            state.interpolate("${who} has ${hp} hp, ${unset} keys"),
            "Ren has 3 hp, 0 keys"
        );
        assert_eq!(state.interpolate("broken ${who"), "broken ${who");
    }

    #[test]
    fn serialize_emits_sections_in_order() {
        let text = sample_state().serialize();
        let positions: Vec<usize> = [
            "[VARIABLES]",
            "[STRING_VARIABLES]",
            "[CHOICE_HISTORY]",
            "[COLLECTED_ENDINGS]",
        ]
        .iter()
        .map(|section| text.find(section).unwrap())
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains("hp=10\n"));
        assert!(text.contains("letter=Dear friend,\\nsee you soon.\\r\\nC:\\\\path\\\\n\n"));
    }

    #[test]
    fn round_trip_restores_state() {
        let state = sample_state();
        let restored = GameState::from_serialized(&state.serialize());
        assert_eq!(restored, state);
    }

    #[test]
    fn round_trip_keeps_bracketed_and_empty_entries() {
        let mut state = GameState::new();
        state.record_choice("[Leave]");
        state.record_choice("Stay");
        state.record_choice("");
        state.record_choice("a\\b");
        state.add_ending("[Secret] End");

        let text = state.serialize();
        assert!(text.contains("[CHOICE_HISTORY]\n\\[Leave]\nStay\n\\e\na\\\\b\n"));

        let restored = GameState::from_serialized(&text);
        assert_eq!(restored.choice_history(), ["[Leave]", "Stay", "", "a\\b"]);
        assert_eq!(restored.collected_endings(), ["[Secret] End"]);
        assert_eq!(restored, state);
    }

    #[test]
    fn deserialize_skips_corrupted_lines() {
        let data = "[VARIABLES]\nhp=abc\ngold=12\nnoequals\n[MYSTERY]\nfoo=bar\n[CHOICE_HISTORY]\nLeft\n";
        let state = GameState::from_serialized(data);

        assert!(!state.has_int("hp"));
        assert_eq!(state.get_int("gold"), 12);
        assert!(!state.has_int("foo"));
        assert_eq!(state.choice_history(), ["Left"]);
    }

    #[test]
    fn deserialize_reads_legacy_escaping() {
        let data = "[STRING_VARIABLES]\nnote=line one\\nline two\\tstill\r\n";
        let state = GameState::from_serialized(data);
        assert_eq!(state.get_string("note"), Some("line one\nline two\\tstill"));
    }

    #[test]
    fn deserialize_keeps_declared_endings() {
        let mut state = GameState::new();
        state.register_ending("True End");
        state.set_int("stale", 1);

        state.deserialize("[COLLECTED_ENDINGS]\nTrue End\nTrue End\n");

        assert!(!state.has_int("stale"));
        assert_eq!(state.collected_endings(), ["True End"]);
        assert_eq!(state.all_endings(), ["True End"]);
    }

    #[test]
    fn undeclared_endings_are_listed() {
        let mut state = GameState::new();
        state.register_ending("A");
        state.add_ending("A");
        state.add_ending("Old");
        assert_eq!(state.undeclared_endings(), vec!["Old"]);
    }
}
