use super::{keys, load_json_or, save_json, KvStore};
use crate::error::StorageError;
use crate::timer::ModeDurations;

/// Persisted mode durations under the `durations` key.
///
/// No validation happens here; the settings flow validates before saving.
pub struct DurationStore<'a, S: KvStore + ?Sized> {
    kv: &'a S,
}

impl<'a, S: KvStore + ?Sized> DurationStore<'a, S> {
    pub fn new(kv: &'a S) -> Self {
        Self { kv }
    }

    /// Stored durations, or the defaults when absent or malformed.
    pub fn load(&self) -> Result<ModeDurations, StorageError> {
        load_json_or(self.kv, keys::DURATIONS, ModeDurations::default)
    }

    pub fn save(&self, durations: &ModeDurations) -> Result<(), StorageError> {
        save_json(self.kv, keys::DURATIONS, durations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn load_defaults_when_absent() {
        let store = MemoryStore::new();
        assert_eq!(
            DurationStore::new(&store).load().unwrap(),
            ModeDurations::default()
        );
    }

    #[test]
    fn save_then_load_roundtrip() {
        let store = MemoryStore::new();
        let durations = ModeDurations {
            foco: 50 * 60,
            pausa: 10 * 60,
            descanso: 30 * 60,
        };
        let ds = DurationStore::new(&store);
        ds.save(&durations).unwrap();
        assert_eq!(ds.load().unwrap(), durations);
    }

    #[test]
    fn stored_format_matches_record_layout() {
        let store = MemoryStore::new();
        DurationStore::new(&store)
            .save(&ModeDurations::default())
            .unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&store.raw("durations").unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({"foco": 1500, "pausa": 300, "descanso": 900})
        );
    }

    #[test]
    fn malformed_value_falls_back_to_defaults() {
        let store = MemoryStore::new();
        store.set("durations", r#"{"foco": "soon"}"#).unwrap();
        assert_eq!(
            DurationStore::new(&store).load().unwrap(),
            ModeDurations::default()
        );
    }

    #[test]
    fn save_does_not_validate() {
        let store = MemoryStore::new();
        let odd = ModeDurations {
            foco: 5,
            pausa: 5,
            descanso: 5,
        };
        let ds = DurationStore::new(&store);
        ds.save(&odd).unwrap();
        assert_eq!(ds.load().unwrap(), odd);
    }
}
