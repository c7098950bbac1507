use crate::storage::{KvStore, StorageKey, Synced};

/// Display name and privacy acknowledgement, each under its own key.
#[derive(Debug, Clone)]
pub struct Profile {
    name: Synced<Option<String>>,
    privacy: Synced<bool>,
}

impl Profile {
    pub fn load<S: KvStore + ?Sized>(store: &mut S) -> Self {
        Profile {
            name: Synced::load(store, StorageKey::UserName, || None),
            privacy: Synced::load(store, StorageKey::PrivacyAccepted, || false),
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.name.get().as_deref()
    }

    /// Greeting name, falling back to a generic one.
    pub fn greeting_name(&self) -> &str {
        self.display_name().unwrap_or("Founder")
    }

    pub fn privacy_accepted(&self) -> bool {
        *self.privacy.get()
    }

    /// Blank names clear the stored value.
    pub fn set_display_name<S: KvStore + ?Sized>(&mut self, store: &mut S, name: &str) {
        let name = name.trim();
        let value = (!name.is_empty()).then(|| name.to_string());
        self.name.replace(store, value);
    }

    pub fn accept_privacy<S: KvStore + ?Sized>(&mut self, store: &mut S) {
        self.privacy.replace(store, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn defaults_then_persisted_values() {
        let mut store = MemoryStore::new();
        let mut profile = Profile::load(&mut store);
        assert_eq!(profile.display_name(), None);
        assert_eq!(profile.greeting_name(), "Founder");
        assert!(!profile.privacy_accepted());

        profile.set_display_name(&mut store, "  Grace ");
        profile.accept_privacy(&mut store);

        let reloaded = Profile::load(&mut store);
        assert_eq!(reloaded.display_name(), Some("Grace"));
        assert!(reloaded.privacy_accepted());
    }

    #[test]
    fn blank_name_clears() {
        let mut store = MemoryStore::new();
        let mut profile = Profile::load(&mut store);
        profile.set_display_name(&mut store, "Ada");
        profile.set_display_name(&mut store, "   ");
        assert_eq!(Profile::load(&mut store).display_name(), None);
    }
}
