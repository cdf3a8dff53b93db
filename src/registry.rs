//! Type descriptors and the descriptor cache.
//!
//! A [`TypeDescriptor`] is the per-type binding plan: the element name the
//! type encodes under, fixed attributes stamped onto every instance, and one
//! [`FieldDescriptor`] per declared field with its parsed tag metadata. The
//! [`Registry`] caches descriptors by `TypeId`, deriving them on first use
//! and supporting explicit registration under a chosen qualified name.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::debug;

use crate::name::{Attribute, QName};
use crate::namespace::NamespaceTable;
use crate::value::{Bindable, ValueRef};

/// Parsed binding metadata for one declared field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Element or attribute name. A prefix written in the binding tag is
    /// resolved to its URI when the descriptor is derived and is not
    /// re-resolved later; an unresolved prefix leaves the name unqualified.
    pub name: QName,
    /// Bound to an attribute on the enclosing element instead of a child.
    pub is_attr: bool,
    /// Skipped on encode when the value is empty.
    pub omit_empty: bool,
    /// Open polymorphic slot (or sequence of them); matches any element
    /// name on decode and takes its runtime type's name on encode.
    pub is_poly: bool,
}

/// The binding plan for one runtime type.
#[derive(Debug)]
pub struct TypeDescriptor {
    /// Element name the type encodes under and is resolved by.
    pub name: QName,
    /// Attributes stamped onto every encoded instance, after field
    /// attributes.
    pub fixed_attrs: Vec<Attribute>,
    /// Field plans in declaration order; indices align with the type's
    /// positional field accessors.
    pub fields: Vec<FieldDescriptor>,
    prototype: Box<dyn Bindable>,
}

impl TypeDescriptor {
    /// A fresh empty instance of the described type.
    pub fn new_value(&self) -> Box<dyn Bindable> {
        self.prototype.new_value()
    }
}

/// Descriptor cache keyed by `TypeId`.
///
/// Lookups derive a descriptor on first use; derivation happens outside the
/// write lock and the first finished writer wins, so concurrent lookups of
/// the same type agree. Explicit registration panics on duplicates since a
/// conflicting binding plan is a configuration error, not a runtime one.
#[derive(Debug)]
pub struct Registry {
    types: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            types: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `value`'s type under its default name (the bare type name,
    /// no namespace) with no fixed attributes.
    ///
    /// # Panics
    ///
    /// Panics when the type or the name is already registered.
    pub fn register(&self, value: &dyn Bindable, namespaces: &NamespaceTable) {
        self.register_as(value, QName::local(value.type_name()), Vec::new(), namespaces);
    }

    /// Registers `value`'s type under an explicit qualified name, with
    /// attributes to stamp onto every encoded instance.
    ///
    /// Registration makes the type resolvable by element name, which
    /// polymorphic decoding requires.
    ///
    /// # Panics
    ///
    /// Panics when the type or the name is already registered.
    pub fn register_as(
        &self,
        value: &dyn Bindable,
        name: QName,
        fixed_attrs: Vec<Attribute>,
        namespaces: &NamespaceTable,
    ) {
        let type_id = value.as_any().type_id();
        let mut desc = derive(value, namespaces);
        desc.name = name;
        desc.fixed_attrs = fixed_attrs;

        let mut types = self.types.write().unwrap();
        if types.contains_key(&type_id) {
            panic!("type '{}' is already registered", value.type_name());
        }
        if types.values().any(|d| d.name == desc.name) {
            panic!("element name '{}' is already registered", desc.name);
        }
        types.insert(type_id, Arc::new(desc));
    }

    /// The descriptor for `value`'s runtime type, deriving and caching it on
    /// first use.
    pub fn descriptor_of(
        &self,
        value: &dyn Bindable,
        namespaces: &NamespaceTable,
    ) -> Arc<TypeDescriptor> {
        let type_id = value.as_any().type_id();
        if let Some(desc) = self.types.read().unwrap().get(&type_id) {
            return Arc::clone(desc);
        }

        debug!("deriving descriptor for type {}", value.type_name());
        let desc = Arc::new(derive(value, namespaces));
        let mut types = self.types.write().unwrap();
        Arc::clone(types.entry(type_id).or_insert(desc))
    }

    /// Reverse lookup: a fresh instance of the type registered under `name`.
    ///
    /// An exact qualified match wins; a type registered without a namespace
    /// also matches a qualified lookup with the same local name.
    pub fn type_by_name(&self, name: &QName) -> Option<Box<dyn Bindable>> {
        let types = self.types.read().unwrap();
        let mut unqualified = None;
        for desc in types.values() {
            if desc.name.local != name.local {
                continue;
            }
            if desc.name.space == name.space {
                return Some(desc.new_value());
            }
            if desc.name.space.is_empty() {
                unqualified = Some(desc);
            }
        }
        unqualified.map(|d| d.new_value())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn derive(value: &dyn Bindable, namespaces: &NamespaceTable) -> TypeDescriptor {
    let mut fields = Vec::new();
    if let ValueRef::Struct(sv) = value.view() {
        for (index, spec) in sv.field_specs().iter().enumerate() {
            let (name, is_attr, omit_empty) = parse_tag(spec.tag, spec.name, namespaces);
            let is_poly = match sv.field(index).map(|f| f.view()) {
                Some(ValueRef::Poly(_)) => true,
                Some(ValueRef::List(list)) => list.item_polymorphic(),
                _ => false,
            };
            fields.push(FieldDescriptor {
                name,
                is_attr,
                omit_empty,
                is_poly,
            });
        }
    }
    TypeDescriptor {
        name: QName::local(value.type_name()),
        fixed_attrs: Vec::new(),
        fields,
        prototype: value.new_value(),
    }
}

// Tag micro-syntax: "[prefix:]localName[,attr][,omitempty]". An empty local
// name falls back to the field identifier; unknown flags are ignored. A
// prefix resolves to its registered URI here, once; an unregistered prefix
// leaves the name unqualified rather than failing.
fn parse_tag(tag: &str, field_name: &str, namespaces: &NamespaceTable) -> (QName, bool, bool) {
    let mut parts = tag.split(',');
    let name_part = parts.next().unwrap_or("");
    let (prefix, local) = match name_part.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", name_part),
    };
    let local = if local.is_empty() { field_name } else { local };
    let space = if prefix.is_empty() {
        String::new()
    } else {
        let resolved = namespaces.uri_for(prefix).unwrap_or_default();
        if resolved.is_empty() {
            debug!("prefix '{}' has no registered URI, leaving '{}' unqualified", prefix, local);
        }
        resolved
    };

    let mut is_attr = false;
    let mut omit_empty = false;
    for flag in parts {
        match flag {
            "attr" => is_attr = true,
            "omitempty" => omit_empty = true,
            _ => debug!("ignoring unknown tag flag '{}'", flag),
        }
    }
    (QName::new(space, local), is_attr, omit_empty)
}
