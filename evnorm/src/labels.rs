//! Mapping of dataset labels to canonical labels.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use serde::Deserialize;

use crate::dataset::SourceRecord;
use crate::error::EvnormError;

/// Normalize a raw label to its lookup key.
pub fn label_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Mapping from raw labels to canonical labels.
///
/// Lookups are case-insensitive. Labels that are not in the mapping are
/// mapped to their lookup key.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct LabelMap(HashMap<String, String>);

impl LabelMap {
    /// Construct a mapping that maps every label to its lookup key.
    pub fn identity() -> Self {
        LabelMap::default()
    }

    /// Read a mapping from a JSON object.
    pub fn from_json_read(read: impl Read) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, String> = serde_json::from_reader(read)?;
        Ok(raw.into_iter().collect())
    }

    /// Open a mapping file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EvnormError> {
        let path = path.as_ref();
        let read = BufReader::new(File::open(path)?);
        Self::from_json_read(read).map_err(|err| {
            EvnormError::JSonSerialization(
                format!("Cannot read label mapping `{}`", path.to_string_lossy()),
                err,
            )
        })
    }

    /// Map a raw label.
    pub fn map(&self, raw: &str) -> String {
        let key = label_key(raw);
        match self.0.get(&key) {
            Some(canonical) => canonical.clone(),
            None => key,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> std::iter::FromIterator<(K, V)> for LabelMap
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        LabelMap(
            iter.into_iter()
                .map(|(raw, canonical)| (label_key(raw.as_ref()), canonical.into()))
                .collect(),
        )
    }
}

/// Mapper of event types and argument roles.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LabelMapper {
    events: LabelMap,
    roles: LabelMap,
}

impl LabelMapper {
    pub fn new(events: LabelMap, roles: LabelMap) -> Self {
        LabelMapper { events, roles }
    }

    /// Construct a mapper that only normalizes labels.
    pub fn identity() -> Self {
        LabelMapper::default()
    }

    /// Open the event type and role mappings.
    ///
    /// A missing path results in an identity mapping.
    pub fn open<P>(events: Option<P>, roles: Option<P>) -> Result<Self, EvnormError>
    where
        P: AsRef<Path>,
    {
        let events = match events {
            Some(path) => LabelMap::open(path)?,
            None => LabelMap::identity(),
        };
        let roles = match roles {
            Some(path) => LabelMap::open(path)?,
            None => LabelMap::identity(),
        };

        Ok(LabelMapper { events, roles })
    }

    pub fn event_type(&self, raw: &str) -> String {
        self.events.map(raw)
    }

    pub fn role(&self, raw: &str) -> String {
        self.roles.map(raw)
    }
}

/// Raw event types and roles of a dataset, by lookup key.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Vocabulary {
    pub event_types: BTreeSet<String>,
    pub roles: BTreeSet<String>,
}

impl Vocabulary {
    /// Add the labels of a record.
    pub fn add_record(&mut self, record: &SourceRecord) {
        for event in &record.events {
            self.event_types.insert(label_key(&event.event_type));
            self.roles.extend(
                event
                    .arguments
                    .iter()
                    .map(|argument| label_key(&argument.role)),
            );
        }
    }
}

/// Write a label vocabulary, one label per line.
pub fn write_vocabulary(labels: &BTreeSet<String>, mut write: impl Write) -> io::Result<()> {
    for label in labels {
        writeln!(write, "{}", label)?;
    }

    write.flush()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use maplit::hashmap;

    use super::{write_vocabulary, LabelMap, LabelMapper, Vocabulary};
    use crate::dataset::{Dataset, Rams};

    static EVENTS: &str = include_str!("../testdata/events.json");

    #[test]
    fn lookup_is_case_insensitive() {
        let events = LabelMap::from_json_read(EVENTS.as_bytes()).unwrap();
        assert_eq!(events.len(), 3);
        assert!(LabelMap::identity().is_empty());
        let mapper = LabelMapper::new(events, LabelMap::identity());

        assert_eq!(mapper.event_type("Conflict.Attack"), "attack");
        assert_eq!(
            mapper.event_type(" life.die.deathcausedbyviolentevents "),
            "die"
        );
    }

    #[test]
    fn unknown_labels_map_to_their_key() {
        let roles: LabelMap = hashmap! { "Victim" => "patient" }.into_iter().collect();
        let mapper = LabelMapper::new(LabelMap::identity(), roles);

        assert_eq!(mapper.role("victim"), "patient");
        assert_eq!(mapper.role("Place"), "place");
        assert_eq!(LabelMapper::identity().event_type("Movement.Transport"), "movement.transport");
    }

    #[test]
    fn corrupt_mapping_is_an_error() {
        assert!(LabelMap::from_json_read("[\"attack\"]".as_bytes()).is_err());
        assert!(LabelMapper::open(Some("testdata/does-not-exist.json"), None).is_err());
    }

    #[test]
    fn vocabulary_is_written_in_order() {
        let labels: BTreeSet<String> = vec!["place", "attacker", "victim"]
            .into_iter()
            .map(ToOwned::to_owned)
            .collect();

        let mut out = Vec::new();
        write_vocabulary(&labels, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "attacker\nplace\nvictim\n");
    }

    #[test]
    fn vocabulary_collects_label_keys() {
        let rams = Rams;
        let mut vocabulary = Vocabulary::default();
        for (index, line) in include_str!("../testdata/rams.jsonl")
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
        {
            let value = serde_json::from_str(line).unwrap();
            let record = rams.parse_record(value).unwrap();
            if let Ok(source) = rams.extract_spans(index, record) {
                vocabulary.add_record(&source);
            }
        }

        assert_eq!(
            vocabulary.event_types.into_iter().collect::<Vec<_>>(),
            vec![
                "conflict.attack.n/a",
                "justice.arrestjaildetain.arrestjaildetain"
            ]
        );
        assert_eq!(
            vocabulary.roles.into_iter().collect::<Vec<_>>(),
            vec!["attacker", "detainee", "target"]
        );
    }
}
