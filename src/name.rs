use std::fmt;

/// A namespace-qualified XML name.
///
/// Identifies an element or attribute independently of prefix spelling:
/// `space` holds the namespace URI (empty for unqualified names) and `local`
/// the local part. Prefixes are resolved through the
/// [`XmlBinder`](crate::XmlBinder)'s namespace table when tags are read or
/// written; a `QName` never stores a prefix itself.
///
/// # Examples
///
/// ```
/// use xmlbind::QName;
///
/// let plain = QName::local("Person");
/// assert_eq!(plain.to_string(), "Person");
///
/// let qualified = QName::new("urn:example", "Person");
/// assert_eq!(qualified.to_string(), "urn:example:Person");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI, or empty for an unqualified name.
    pub space: String,
    /// Local part of the name.
    pub local: String,
}

impl QName {
    /// Creates a name qualified by a namespace URI.
    pub fn new<S: Into<String>, L: Into<String>>(space: S, local: L) -> Self {
        Self {
            space: space.into(),
            local: local.into(),
        }
    }

    /// Creates an unqualified name.
    pub fn local<L: Into<String>>(local: L) -> Self {
        Self {
            space: String::new(),
            local: local.into(),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.space.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{}:{}", self.space, self.local)
        }
    }
}

/// An XML attribute: a qualified name and its literal text value.
///
/// Used both for fixed attributes supplied at type registration and for
/// attributes captured from a start tag during decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name.
    pub name: QName,
    /// Attribute value, unescaped.
    pub value: String,
}

impl Attribute {
    /// Creates an attribute from a name and value.
    pub fn new<V: Into<String>>(name: QName, value: V) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// An opening tag captured from the token stream: the element name plus its
/// attributes in document order.
///
/// Returned by [`Decoder::find`](crate::Decoder::find) and accepted by
/// [`Decoder::decode_element`](crate::Decoder::decode_element) when an
/// enclosing call has already consumed the tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartTag {
    /// Element name. The namespace part holds the raw prefix until the
    /// decoder resolves it against the namespace table.
    pub name: QName,
    /// Attributes in document order.
    pub attrs: Vec<Attribute>,
}

impl StartTag {
    /// Creates a start tag with no attributes.
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attrs: Vec::new(),
        }
    }
}
