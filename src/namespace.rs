use std::collections::HashMap;
use std::sync::RwLock;

/// Bidirectional namespace table mapping URIs to prefixes and back.
///
/// Seeded with the reserved `xmlns` pair. The encoder consults it to qualify
/// element names, the decoder to resolve raw prefixes back to URIs. A URI
/// registered with an empty prefix is emitted unqualified. Registering an
/// existing URI or prefix rebinds it, last write wins.
#[derive(Debug)]
pub struct NamespaceTable {
    // One lock over both directions so a registration is atomic for readers.
    maps: RwLock<Maps>,
}

#[derive(Debug)]
struct Maps {
    prefix_by_uri: HashMap<String, String>,
    uri_by_prefix: HashMap<String, String>,
}

impl NamespaceTable {
    pub fn new() -> Self {
        let mut prefix_by_uri = HashMap::new();
        let mut uri_by_prefix = HashMap::new();
        prefix_by_uri.insert("xmlns".to_owned(), "xmlns".to_owned());
        uri_by_prefix.insert("xmlns".to_owned(), "xmlns".to_owned());
        Self {
            maps: RwLock::new(Maps {
                prefix_by_uri,
                uri_by_prefix,
            }),
        }
    }

    /// Binds a URI and a prefix to each other, in both directions at once.
    pub fn register(&self, uri: &str, prefix: &str) {
        let mut maps = self.maps.write().unwrap();
        maps.prefix_by_uri.insert(uri.to_owned(), prefix.to_owned());
        maps.uri_by_prefix.insert(prefix.to_owned(), uri.to_owned());
    }

    /// The prefix bound to `uri`, or `None` when the URI is unregistered.
    pub fn prefix_for(&self, uri: &str) -> Option<String> {
        let maps = self.maps.read().unwrap();
        maps.prefix_by_uri.get(uri).cloned()
    }

    /// The URI bound to `prefix`, or `None` when the prefix is unregistered.
    pub fn uri_for(&self, prefix: &str) -> Option<String> {
        let maps = self.maps.read().unwrap();
        maps.uri_by_prefix.get(prefix).cloned()
    }
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self::new()
    }
}
