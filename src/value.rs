//! The value model behind the binding engine.
//!
//! Rust has no structural reflection, so every bindable type exposes a
//! uniform view of itself through the [`Bindable`] trait: a scalar leaf, a
//! structured record, a sequence, a nullable slot ([`Option`]) or an open
//! polymorphic slot ([`AnyElement`]). The encoder and decoder walk value
//! graphs exclusively through these views; the [`bind_xml!`](crate::bind_xml)
//! macro generates the implementations for user records.

use std::any::Any;
use std::fmt;
use std::str;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::BindError;

/// A value the engine can encode to and decode from XML.
///
/// Implemented by the built-in scalars (`bool`, integers, floats, `String`,
/// [`Bytes`], `chrono::DateTime<Utc>`), by `Vec<T>` and `Option<T>` over
/// bindable element types, by [`AnyElement`], and by any record declared
/// through [`bind_xml!`](crate::bind_xml).
pub trait Bindable: Any + fmt::Debug + Send + Sync {
    /// Short type name, used as the default element name when the type is
    /// registered without an explicit one.
    fn type_name(&self) -> &'static str;

    /// Upcast for type-identity checks and downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Shared view of the value's shape.
    fn view(&self) -> ValueRef<'_>;

    /// Mutable view of the value's shape.
    fn view_mut(&mut self) -> ValueMut<'_>;

    /// A fresh zero value of this runtime type, boxed. The registry keeps one
    /// as the prototype backing reverse name lookups.
    fn new_value(&self) -> Box<dyn Bindable>;
}

/// A bindable type that can be constructed empty without an instance at hand.
///
/// Backs slot materialization: sequence append, `Option` pointee allocation
/// and the [`bind_xml!`](crate::bind_xml) generated impls.
pub trait BindDefault: Bindable + Sized {
    /// True only for the open polymorphic slot type. Classifies sequence
    /// elements as interface slots during field derivation.
    const POLYMORPHIC: bool = false;

    /// The empty value.
    fn bind_default() -> Self;
}

/// Shared view of a value.
pub enum ValueRef<'a> {
    /// A leaf with a text representation.
    Scalar(ScalarRef<'a>),
    /// A structured record with classified fields.
    Struct(&'a dyn StructValue),
    /// A sequence emitting one sibling element per item.
    List(&'a dyn ListValue),
    /// A nullable slot; `None` emits nothing.
    Nullable(Option<&'a dyn Bindable>),
    /// An open polymorphic slot; the concrete type is only known at runtime.
    Poly(Option<&'a dyn Bindable>),
}

/// Mutable view of a value.
pub enum ValueMut<'a> {
    /// A leaf with a text representation.
    Scalar(ScalarMut<'a>),
    /// A structured record with classified fields.
    Struct(&'a mut dyn StructValue),
    /// A sequence grown one slot at a time.
    List(&'a mut dyn ListValue),
    /// A nullable slot materialized on first use.
    Nullable(&'a mut dyn NullableValue),
    /// An open polymorphic slot resolved by element name.
    Poly(&'a mut AnyElement),
}

/// Shared scalar access used by leaf encoding.
#[derive(Debug, Clone, Copy)]
pub enum ScalarRef<'a> {
    Bool(bool),
    Int(i64),
    Uint(u64),
    F32(f32),
    F64(f64),
    Str(&'a str),
    Bytes(&'a [u8]),
    DateTime(&'a DateTime<Utc>),
}

/// Mutable scalar access used by leaf coercion.
pub enum ScalarMut<'a> {
    Bool(&'a mut bool),
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    F32(&'a mut f32),
    F64(&'a mut f64),
    Str(&'a mut String),
    Bytes(&'a mut Vec<u8>),
    DateTime(&'a mut DateTime<Utc>),
}

/// Declarative binding metadata for one record field, as written in
/// [`bind_xml!`](crate::bind_xml).
///
/// Only fields listed in the binding declaration participate in XML binding;
/// inclusion is an explicit decision, not a visibility convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field identifier; the default local name when the tag leaves it empty.
    pub name: &'static str,
    /// Binding tag micro-syntax: `"[prefix:]localName[,attr][,omitempty]"`.
    pub tag: &'static str,
}

/// A structured record: static field metadata plus positional accessors.
pub trait StructValue: Bindable {
    /// The value as a plain [`Bindable`], for descriptor lookups.
    fn as_bindable(&self) -> &dyn Bindable;

    /// Binding specs in declaration order.
    fn field_specs(&self) -> &'static [FieldSpec];

    /// Field at `index`, in `field_specs` order.
    fn field(&self, index: usize) -> Option<&dyn Bindable>;

    /// Mutable field at `index`.
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Bindable>;
}

/// A sequence decoded by appending one slot per document element.
pub trait ListValue: Bindable {
    /// Current number of items.
    fn len(&self) -> usize;

    /// True when the sequence holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item at `index`.
    fn item(&self, index: usize) -> Option<&dyn Bindable>;

    /// Appends an empty slot and returns it. Backing storage grows
    /// geometrically: capacity doubles, with a floor of four slots.
    fn push_item(&mut self) -> &mut dyn Bindable;

    /// Rolls back the most recent append after a failed decode.
    fn pop_item(&mut self);

    /// True when the element type is the open polymorphic slot.
    fn item_polymorphic(&self) -> bool;
}

/// A nullable slot (`Option<T>`).
pub trait NullableValue: Bindable {
    /// The pointee, if set.
    fn value(&self) -> Option<&dyn Bindable>;

    /// The pointee, allocating a fresh empty one first when unset.
    fn materialize(&mut self) -> &mut dyn Bindable;
}

/// The open polymorphic slot: holds any registered [`Bindable`] value.
///
/// On encode the held value's own registered name becomes the element tag; on
/// decode the incoming element name selects the concrete type through the
/// registry's reverse lookup. Use `Vec<AnyElement>` for a repeated
/// polymorphic field.
///
/// # Examples
///
/// ```
/// use xmlbind::{bind_xml, AnyElement};
///
/// #[derive(Debug, Default)]
/// struct Note {
///     text: String,
/// }
/// bind_xml!(Note { text => "Text" });
///
/// let mut slot = AnyElement::empty();
/// assert!(!slot.is_set());
///
/// slot = AnyElement::new(Note { text: "hi".into() });
/// assert_eq!(slot.downcast_ref::<Note>().unwrap().text, "hi");
/// ```
#[derive(Debug, Default)]
pub struct AnyElement {
    value: Option<Box<dyn Bindable>>,
}

impl AnyElement {
    /// Wraps a concrete value.
    pub fn new<T: Bindable>(value: T) -> Self {
        Self {
            value: Some(Box::new(value)),
        }
    }

    /// An unset slot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when a value is held.
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Replaces the held value.
    pub fn set(&mut self, value: Box<dyn Bindable>) {
        self.value = Some(value);
    }

    /// The held value.
    pub fn get(&self) -> Option<&dyn Bindable> {
        self.value.as_deref()
    }

    /// The held value, mutably.
    pub fn get_mut(&mut self) -> Option<&mut dyn Bindable> {
        self.value.as_deref_mut()
    }

    /// Removes and returns the held value.
    pub fn take(&mut self) -> Option<Box<dyn Bindable>> {
        self.value.take()
    }

    /// The held value downcast to a concrete type.
    pub fn downcast_ref<T: Bindable>(&self) -> Option<&T> {
        self.value.as_deref().and_then(|v| v.as_any().downcast_ref())
    }
}

impl Bindable for AnyElement {
    fn type_name(&self) -> &'static str {
        "AnyElement"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn view(&self) -> ValueRef<'_> {
        ValueRef::Poly(self.value.as_deref())
    }

    fn view_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Poly(self)
    }

    fn new_value(&self) -> Box<dyn Bindable> {
        Box::new(AnyElement::default())
    }
}

impl BindDefault for AnyElement {
    const POLYMORPHIC: bool = true;

    fn bind_default() -> Self {
        AnyElement::default()
    }
}

/// A raw byte leaf.
///
/// Encodes as escaped text and decodes to the element's unescaped bytes
/// verbatim, with no numeric or boolean interpretation. A distinct type so
/// that `Vec<u8>` keeps its ordinary sequence-of-scalars meaning.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    /// Wraps a byte buffer.
    pub fn new<B: Into<Vec<u8>>>(bytes: B) -> Self {
        Self(bytes.into())
    }

    /// The raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

macro_rules! impl_scalar_bindable {
    ($ty:ty, $name:literal, |$r:ident| $as_ref:expr, |$m:ident| $as_mut:expr) => {
        impl Bindable for $ty {
            fn type_name(&self) -> &'static str {
                $name
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }

            fn view(&self) -> ValueRef<'_> {
                let $r = self;
                ValueRef::Scalar($as_ref)
            }

            fn view_mut(&mut self) -> ValueMut<'_> {
                let $m = self;
                ValueMut::Scalar($as_mut)
            }

            fn new_value(&self) -> Box<dyn Bindable> {
                Box::new(<$ty>::default())
            }
        }
    };
}

impl_scalar_bindable!(bool, "bool", |v| ScalarRef::Bool(*v), |m| ScalarMut::Bool(m));
impl_scalar_bindable!(i8, "i8", |v| ScalarRef::Int(i64::from(*v)), |m| ScalarMut::I8(m));
impl_scalar_bindable!(i16, "i16", |v| ScalarRef::Int(i64::from(*v)), |m| ScalarMut::I16(m));
impl_scalar_bindable!(i32, "i32", |v| ScalarRef::Int(i64::from(*v)), |m| ScalarMut::I32(m));
impl_scalar_bindable!(i64, "i64", |v| ScalarRef::Int(*v), |m| ScalarMut::I64(m));
impl_scalar_bindable!(u8, "u8", |v| ScalarRef::Uint(u64::from(*v)), |m| ScalarMut::U8(m));
impl_scalar_bindable!(u16, "u16", |v| ScalarRef::Uint(u64::from(*v)), |m| ScalarMut::U16(m));
impl_scalar_bindable!(u32, "u32", |v| ScalarRef::Uint(u64::from(*v)), |m| ScalarMut::U32(m));
impl_scalar_bindable!(u64, "u64", |v| ScalarRef::Uint(*v), |m| ScalarMut::U64(m));
impl_scalar_bindable!(f32, "f32", |v| ScalarRef::F32(*v), |m| ScalarMut::F32(m));
impl_scalar_bindable!(f64, "f64", |v| ScalarRef::F64(*v), |m| ScalarMut::F64(m));
impl_scalar_bindable!(
    String,
    "String",
    |v| ScalarRef::Str(v.as_str()),
    |m| ScalarMut::Str(m)
);
impl_scalar_bindable!(
    Bytes,
    "Bytes",
    |v| ScalarRef::Bytes(v.0.as_slice()),
    |m| ScalarMut::Bytes(&mut m.0)
);

impl Bindable for DateTime<Utc> {
    fn type_name(&self) -> &'static str {
        "DateTime"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn view(&self) -> ValueRef<'_> {
        ValueRef::Scalar(ScalarRef::DateTime(self))
    }

    fn view_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Scalar(ScalarMut::DateTime(self))
    }

    fn new_value(&self) -> Box<dyn Bindable> {
        Box::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

macro_rules! impl_bind_default {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BindDefault for $ty {
                fn bind_default() -> Self {
                    <$ty>::default()
                }
            }
        )*
    };
}

impl_bind_default!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, String, Bytes);

impl BindDefault for DateTime<Utc> {
    fn bind_default() -> Self {
        DateTime::<Utc>::UNIX_EPOCH
    }
}

impl<T: BindDefault> Bindable for Vec<T> {
    fn type_name(&self) -> &'static str {
        "Vec"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn view(&self) -> ValueRef<'_> {
        ValueRef::List(self)
    }

    fn view_mut(&mut self) -> ValueMut<'_> {
        ValueMut::List(self)
    }

    fn new_value(&self) -> Box<dyn Bindable> {
        Box::new(Vec::<T>::new())
    }
}

impl<T: BindDefault> ListValue for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn item(&self, index: usize) -> Option<&dyn Bindable> {
        self.as_slice().get(index).map(|v| v as &dyn Bindable)
    }

    fn push_item(&mut self) -> &mut dyn Bindable {
        let len = self.as_slice().len();
        if len == self.capacity() {
            let target = usize::max(4, len * 2);
            self.reserve_exact(target - len);
        }
        self.push(T::bind_default());
        &mut self[len]
    }

    fn pop_item(&mut self) {
        self.pop();
    }

    fn item_polymorphic(&self) -> bool {
        T::POLYMORPHIC
    }
}

impl<T: BindDefault> BindDefault for Vec<T> {
    fn bind_default() -> Self {
        Vec::new()
    }
}

impl<T: BindDefault> Bindable for Option<T> {
    fn type_name(&self) -> &'static str {
        "Option"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn view(&self) -> ValueRef<'_> {
        ValueRef::Nullable(self.as_ref().map(|v| v as &dyn Bindable))
    }

    fn view_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Nullable(self)
    }

    fn new_value(&self) -> Box<dyn Bindable> {
        Box::new(None::<T>)
    }
}

impl<T: BindDefault> NullableValue for Option<T> {
    fn value(&self) -> Option<&dyn Bindable> {
        self.as_ref().map(|v| v as &dyn Bindable)
    }

    fn materialize(&mut self) -> &mut dyn Bindable {
        if self.is_none() {
            *self = Some(T::bind_default());
        }
        match self {
            Some(v) => v,
            None => unreachable!(),
        }
    }
}

impl<T: BindDefault> BindDefault for Option<T> {
    fn bind_default() -> Self {
        None
    }
}

fn utf8<'a>(src: &'a [u8], target: &'static str) -> Result<&'a str, BindError> {
    str::from_utf8(src).map_err(|e| {
        BindError::Malformed(format!("invalid UTF-8 in text for {}: {}", target, e))
    })
}

fn parse_signed<T: TryFrom<i64>>(text: &str, target: &'static str) -> Result<T, BindError> {
    let wide: i64 = text.parse().map_err(|e| {
        BindError::Malformed(format!("cannot parse '{}' as {}: {}", text, target, e))
    })?;
    T::try_from(wide)
        .map_err(|_| BindError::Malformed(format!("value '{}' out of range for {}", text, target)))
}

fn parse_unsigned<T: TryFrom<u64>>(text: &str, target: &'static str) -> Result<T, BindError> {
    let wide: u64 = text.parse().map_err(|e| {
        BindError::Malformed(format!("cannot parse '{}' as {}: {}", text, target, e))
    })?;
    T::try_from(wide)
        .map_err(|_| BindError::Malformed(format!("value '{}' out of range for {}", text, target)))
}

fn parse_float<T: str::FromStr>(text: &str, target: &'static str) -> Result<T, BindError>
where
    T::Err: fmt::Display,
{
    text.parse().map_err(|e| {
        BindError::Malformed(format!("cannot parse '{}' as {}: {}", text, target, e))
    })
}

// The literal set strconv.ParseBool accepts.
fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Coerces accumulated leaf text into a scalar destination.
///
/// Integers parse in base 10 at full width and narrow with a range check;
/// booleans parse from trimmed text; strings copy verbatim; byte leaves take
/// the unescaped bytes as-is; timestamps parse RFC 3339.
pub(crate) fn assign_text(dst: ScalarMut<'_>, src: &[u8]) -> Result<(), BindError> {
    match dst {
        ScalarMut::Bool(v) => {
            let text = utf8(src, "bool")?.trim();
            *v = parse_bool(text).ok_or_else(|| {
                BindError::Malformed(format!("cannot parse '{}' as bool", text))
            })?;
        }
        ScalarMut::I8(v) => *v = parse_signed(utf8(src, "i8")?, "i8")?,
        ScalarMut::I16(v) => *v = parse_signed(utf8(src, "i16")?, "i16")?,
        ScalarMut::I32(v) => *v = parse_signed(utf8(src, "i32")?, "i32")?,
        ScalarMut::I64(v) => *v = parse_signed(utf8(src, "i64")?, "i64")?,
        ScalarMut::U8(v) => *v = parse_unsigned(utf8(src, "u8")?, "u8")?,
        ScalarMut::U16(v) => *v = parse_unsigned(utf8(src, "u16")?, "u16")?,
        ScalarMut::U32(v) => *v = parse_unsigned(utf8(src, "u32")?, "u32")?,
        ScalarMut::U64(v) => *v = parse_unsigned(utf8(src, "u64")?, "u64")?,
        ScalarMut::F32(v) => *v = parse_float(utf8(src, "f32")?, "f32")?,
        ScalarMut::F64(v) => *v = parse_float(utf8(src, "f64")?, "f64")?,
        ScalarMut::Str(v) => *v = utf8(src, "String")?.to_owned(),
        ScalarMut::Bytes(v) => {
            v.clear();
            v.extend_from_slice(src);
        }
        ScalarMut::DateTime(v) => {
            let text = utf8(src, "DateTime")?;
            *v = DateTime::parse_from_rfc3339(text)
                .map_err(|e| {
                    BindError::Malformed(format!(
                        "cannot parse '{}' as RFC 3339 timestamp: {}",
                        text, e
                    ))
                })?
                .with_timezone(&Utc);
        }
    }
    Ok(())
}

/// Renders a scalar as unescaped text. Escaping happens at the output sink.
pub(crate) fn render_scalar(src: ScalarRef<'_>) -> String {
    match src {
        ScalarRef::Bool(v) => v.to_string(),
        ScalarRef::Int(v) => v.to_string(),
        ScalarRef::Uint(v) => v.to_string(),
        ScalarRef::F32(v) => v.to_string(),
        ScalarRef::F64(v) => v.to_string(),
        ScalarRef::Str(v) => v.to_owned(),
        ScalarRef::Bytes(v) => String::from_utf8_lossy(v).into_owned(),
        ScalarRef::DateTime(v) => v.to_rfc3339_opts(SecondsFormat::AutoSi, true),
    }
}

/// Leaf-encodes a value, failing for kinds with no text representation.
pub(crate) fn scalar_text(val: &dyn Bindable) -> Result<String, BindError> {
    match val.view() {
        ValueRef::Scalar(s) => Ok(render_scalar(s)),
        _ => Err(BindError::UnsupportedType(val.type_name().to_owned())),
    }
}

/// The emptiness rule behind `omitempty`: zero-length sequences, strings and
/// byte leaves, `false`, numeric zero, and unset nullable/polymorphic slots
/// are empty. Records and timestamps never are.
pub(crate) fn is_empty_value(val: &dyn Bindable) -> bool {
    match val.view() {
        ValueRef::Scalar(ScalarRef::Bool(v)) => !v,
        ValueRef::Scalar(ScalarRef::Int(v)) => v == 0,
        ValueRef::Scalar(ScalarRef::Uint(v)) => v == 0,
        ValueRef::Scalar(ScalarRef::F32(v)) => v == 0.0,
        ValueRef::Scalar(ScalarRef::F64(v)) => v == 0.0,
        ValueRef::Scalar(ScalarRef::Str(v)) => v.is_empty(),
        ValueRef::Scalar(ScalarRef::Bytes(v)) => v.is_empty(),
        ValueRef::Scalar(ScalarRef::DateTime(_)) => false,
        ValueRef::List(l) => l.is_empty(),
        ValueRef::Nullable(v) => v.is_none(),
        ValueRef::Poly(v) => v.is_none(),
        ValueRef::Struct(_) => false,
    }
}

/// Declares the XML binding for a record type.
///
/// Generates the [`Bindable`], [`StructValue`] and [`BindDefault`]
/// implementations from a field → binding-tag list. The type must implement
/// `Debug` and `Default`. Fields appear in the XML in the order listed;
/// fields not listed are invisible to the engine.
///
/// Each tag follows the micro-syntax `"[prefix:]localName[,attr][,omitempty]"`:
/// an empty local name defaults to the field identifier, `attr` binds the
/// field to an attribute instead of a child element, `omitempty` skips the
/// field on encode when its value is empty, and unknown flags are ignored.
///
/// # Examples
///
/// ```
/// use xmlbind::{bind_xml, XmlBinder};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Person {
///     id: u32,
///     name: String,
///     nickname: String,
/// }
///
/// bind_xml!(Person {
///     id => "id,attr",
///     name => "Name",
///     nickname => "Nickname,omitempty",
/// });
///
/// let binder = XmlBinder::new();
/// let person = Person {
///     id: 7,
///     name: "Ada".into(),
///     nickname: String::new(),
/// };
/// let xml = binder.marshal(&person).unwrap();
/// assert_eq!(
///     String::from_utf8(xml).unwrap(),
///     r#"<Person id="7"><Name>Ada</Name></Person>"#
/// );
/// ```
#[macro_export]
macro_rules! bind_xml {
    ($ty:ident { $( $field:ident => $tag:literal ),* $(,)? }) => {
        impl $crate::Bindable for $ty {
            fn type_name(&self) -> &'static str {
                stringify!($ty)
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn view(&self) -> $crate::ValueRef<'_> {
                $crate::ValueRef::Struct(self)
            }

            fn view_mut(&mut self) -> $crate::ValueMut<'_> {
                $crate::ValueMut::Struct(self)
            }

            fn new_value(&self) -> ::std::boxed::Box<dyn $crate::Bindable> {
                ::std::boxed::Box::new(<$ty as ::std::default::Default>::default())
            }
        }

        impl $crate::StructValue for $ty {
            fn as_bindable(&self) -> &dyn $crate::Bindable {
                self
            }

            fn field_specs(&self) -> &'static [$crate::FieldSpec] {
                const SPECS: &[$crate::FieldSpec] = &[
                    $( $crate::FieldSpec { name: stringify!($field), tag: $tag }, )*
                ];
                SPECS
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn field(&self, index: usize) -> ::std::option::Option<&dyn $crate::Bindable> {
                let mut next = 0usize;
                $(
                    if index == next {
                        return ::std::option::Option::Some(&self.$field);
                    }
                    next += 1;
                )*
                ::std::option::Option::None
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::std::option::Option<&mut dyn $crate::Bindable> {
                let mut next = 0usize;
                $(
                    if index == next {
                        return ::std::option::Option::Some(&mut self.$field);
                    }
                    next += 1;
                )*
                ::std::option::Option::None
            }
        }

        impl $crate::BindDefault for $ty {
            fn bind_default() -> Self {
                <$ty as ::std::default::Default>::default()
            }
        }
    };
}
