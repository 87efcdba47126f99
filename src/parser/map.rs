use super::ExtractError;
use regex::Regex;
use std::str::FromStr;

/// `{<key> ...}:<float>`. The trailing `+` repeats the value group, so when
/// several numbers follow one key only the last repetition is captured.
pub const CARBON_ENTRY_PATTERN: &str = r"\{(\w+)[^}]*\}:(-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)+";

/// `{<key> ...}:<integer>`.
pub const SLO_ENTRY_PATTERN: &str = r"\{(\w+)[^}]*\}:(\d+)";

/// Insertion-ordered key/value pairs with unique keys.
///
/// Re-inserting a key replaces its value but keeps its original position.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedValues<V> {
    entries: Vec<(String, V)>,
}

impl<V> KeyedValues<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, key: String, value: V) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for KeyedValues<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// The two entry grammars found inside simulator `map[...]` literals.
#[derive(Debug, Clone)]
pub struct MapParser {
    carbon: Regex,
    slo: Regex,
}

impl MapParser {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            carbon: Regex::new(CARBON_ENTRY_PATTERN)?,
            slo: Regex::new(SLO_ENTRY_PATTERN)?,
        })
    }

    /// Float-valued carbon emission entries.
    pub fn parse_carbon(&self, map_str: &str) -> KeyedValues<f64> {
        collect_entries(&self.carbon, map_str)
    }

    /// Integer-valued SLO timeout entries.
    pub fn parse_slo(&self, map_str: &str) -> KeyedValues<i64> {
        collect_entries(&self.slo, map_str)
    }
}

fn collect_entries<V: FromStr>(re: &Regex, map_str: &str) -> KeyedValues<V> {
    let mut values = KeyedValues::new();
    for caps in re.captures_iter(map_str) {
        // The grammar only admits numeric text; an i64 overflow is the one way to miss
        if let Ok(value) = caps[2].parse::<V>() {
            values.insert(caps[1].to_string(), value);
        } else {
            tracing::warn!(key = &caps[1], value = &caps[2], "Skipping out-of-range map value");
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> MapParser {
        MapParser::new().unwrap()
    }

    #[test]
    fn test_float_grammar_with_scientific_notation() {
        let parsed = parser().parse_carbon("map[{job1 abc}:1.5 {job2 xyz}:-2.0e1]");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get("job1"), Some(&1.5));
        assert_eq!(parsed.get("job2"), Some(&-20.0));
    }

    #[test]
    fn test_int_grammar() {
        let parsed = parser().parse_slo("map[{job1 abc}:3 {job3 def}:0]");
        assert_eq!(parsed.get("job1"), Some(&3));
        assert_eq!(parsed.get("job3"), Some(&0));
        assert_eq!(parsed.keys().collect::<Vec<_>>(), vec!["job1", "job3"]);
    }

    #[test]
    fn test_go_struct_keys() {
        let parsed = parser()
            .parse_carbon("{resnet50 12.5 1.2 0.3 30}:1.2345e+03 {bert_base 8 1 0.2 20}:55");
        assert_eq!(parsed.get("resnet50"), Some(&1234.5));
        assert_eq!(parsed.get("bert_base"), Some(&55.0));
    }

    #[test]
    fn test_repeated_value_group_keeps_last_repetition() {
        // "1.5-2.5" is two repetitions of the value group
        let parsed = parser().parse_carbon("{job1 x}:1.5-2.5");
        assert_eq!(parsed.get("job1"), Some(&-2.5));
    }

    #[test]
    fn test_recurring_key_last_write_wins_in_place() {
        let parsed = parser().parse_slo("{a x}:1 {b y}:2 {a z}:7");
        assert_eq!(parsed.get("a"), Some(&7));
        assert_eq!(parsed.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_no_entries_is_empty() {
        assert!(parser().parse_carbon("map[]").is_empty());
        assert!(parser().parse_slo("nothing to see").is_empty());
    }

    #[test]
    fn test_slo_grammar_ignores_negative_values() {
        let parsed = parser().parse_slo("{a x}:-4 {b y}:2");
        assert_eq!(parsed.get("a"), None);
        assert_eq!(parsed.get("b"), Some(&2));
    }
}
