//! Known weapon kinds, keyed by name

use std::collections::HashMap;

use tracing::warn;

use super::weapon::{WeaponInstance, WeaponStats};

#[derive(Debug, Default)]
pub struct WeaponCatalog {
    kinds: HashMap<String, WeaponStats>,
}

impl WeaponCatalog {
    /// Build from stats; a duplicate name keeps the first entry
    pub fn new(stats: impl IntoIterator<Item = WeaponStats>) -> Self {
        let mut kinds = HashMap::new();
        for entry in stats {
            if kinds.contains_key(&entry.name) {
                warn!(weapon = %entry.name, "Duplicate weapon name ignored");
                continue;
            }
            kinds.insert(entry.name.clone(), entry);
        }
        Self { kinds }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            WeaponStats::rifle(),
            WeaponStats::pistol(),
            WeaponStats::knife(),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&WeaponStats> {
        self.kinds.get(name)
    }

    /// Create a fresh instance. Unknown names are logged and yield nothing.
    pub fn spawn(&self, name: &str) -> Option<WeaponInstance> {
        match self.kinds.get(name) {
            Some(stats) => Some(WeaponInstance::new(stats.clone())),
            None => {
                warn!(weapon = %name, "Unknown weapon kind");
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_keeps_first() {
        let mut other = WeaponStats::rifle();
        other.max_ammo = 99;
        let catalog = WeaponCatalog::new(vec![WeaponStats::rifle(), other]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("Rifle").unwrap().max_ammo, 30);
    }

    #[test]
    fn spawn_gives_distinct_full_instances() {
        let catalog = WeaponCatalog::builtin();
        let a = catalog.spawn("Pistol").unwrap();
        let b = catalog.spawn("Pistol").unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.ammo(), a.max_ammo());
        assert!(catalog.spawn("Railgun").is_none());
    }
}
