//! Turning values into comparable trees
//!
//! Values are serialized through [`serde`] into a [`serde_json::Value`].  Struct
//! fields keep their declaration order while map entries are sorted by key, so
//! rendering the same value under the same [`Rules`] is byte-for-byte stable.

use std::collections::BTreeSet;

use serde::ser;
use serde::Serialize;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use crate::Error;

/// Nesting beyond this is assumed to be an unregistered cycle
pub const MAX_DEPTH: usize = 128;
/// Key of the marker substituted for an already visited instance
pub const REFERENCE_KEY: &str = "$ref";
const ROOT: &str = "$";

/// What to leave out of a tree and which types may reference themselves
///
/// Type names are serde container names, the bare struct or enum identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rules {
    ignored_paths: BTreeSet<String>,
    ignored_types: BTreeSet<String>,
    circular_types: BTreeSet<String>,
}

impl Rules {
    pub fn new() -> Self {
        Default::default()
    }

    /// Leave out the field at a dotted path, e.g. `parent.child.name`
    pub fn ignore_path(&mut self, path: impl Into<String>) {
        self.ignored_paths.insert(path.into());
    }

    /// Leave out every value of a type, wherever it appears
    pub fn ignore_type(&mut self, name: impl Into<String>) {
        self.ignored_types.insert(name.into());
    }

    /// Replace repeated visits of an instance of this type by a reference marker
    pub fn circular_type(&mut self, name: impl Into<String>) {
        self.circular_types.insert(name.into());
    }

    pub fn ignored_paths(&self) -> impl Iterator<Item = &str> {
        self.ignored_paths.iter().map(String::as_str)
    }

    pub fn ignored_types(&self) -> impl Iterator<Item = &str> {
        self.ignored_types.iter().map(String::as_str)
    }

    pub fn circular_types(&self) -> impl Iterator<Item = &str> {
        self.circular_types.iter().map(String::as_str)
    }

    /// Serialize `value` into a [`Tree`]
    pub fn build<T: Serialize + ?Sized>(&self, value: &T) -> crate::Result<Tree> {
        let mut builder = Builder {
            rules: self,
            path: Vec::new(),
            ancestors: Vec::new(),
            depth: 0,
            visited: BTreeSet::new(),
            hidden: BTreeSet::new(),
            maps: BTreeSet::new(),
            types: BTreeSet::new(),
        };
        let value = match value.serialize(&mut builder)? {
            Slot::Value(value) => value,
            Slot::Skip => Value::Null,
        };
        if is_opaque(&value) {
            builder.hidden.insert(String::new());
        }
        Ok(Tree {
            value,
            visited: builder.visited,
            hidden: builder.hidden,
            maps: builder.maps,
            types: builder.types,
        })
    }

    /// Fail when a configured path, `extra_paths` included, or a configured
    /// type is found in none of `trees`
    pub fn validate<'a>(
        &'a self,
        trees: &[&Tree],
        extra_paths: impl IntoIterator<Item = &'a str>,
    ) -> crate::Result<()> {
        for path in self.ignored_paths().chain(extra_paths) {
            if !trees.iter().any(|tree| tree.resolves(path)) {
                return Err(Error::configuration(format_args!("{path} does not exist")));
            }
        }
        for name in self.ignored_types().chain(self.circular_types()) {
            if !trees.iter().any(|tree| tree.may_contain_type(name)) {
                return Err(Error::configuration(format_args!(
                    "type {name} does not exist"
                )));
            }
        }
        Ok(())
    }

    fn is_ignored_type(&self, name: &str) -> bool {
        self.ignored_types.contains(name)
    }
}

/// The serde name of `T`, as used by [`Rules::ignore_type`]
pub fn type_name_of<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}

/// A serialized value plus the field paths and types seen while building it
#[derive(Clone, Debug)]
pub struct Tree {
    value: Value,
    visited: BTreeSet<String>,
    /// Nulls and empty sequences
    hidden: BTreeSet<String>,
    maps: BTreeSet<String>,
    types: BTreeSet<&'static str>,
}

impl Tree {
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Whether a configured field path exists in this value's shape
    ///
    /// Below a null or an empty sequence nothing can be observed, so any path
    /// underneath resolves.  Map keys vary between values: a single segment
    /// below a map resolves, deeper ones only when the key is present.
    pub fn resolves(&self, path: &str) -> bool {
        if self.visited.contains(path) || self.hidden.contains("") {
            return true;
        }
        let parent = path.rfind('.').map_or("", |index| &path[..index]);
        if self.maps.contains(parent) {
            return true;
        }
        path.match_indices('.')
            .any(|(index, _)| self.hidden.contains(&path[..index]))
    }

    /// Whether a value of the named type was seen, or could hide behind a
    /// null or an empty sequence
    pub fn may_contain_type(&self, name: &str) -> bool {
        self.types.contains(name) || !self.hidden.is_empty()
    }

    pub fn to_pretty(&self) -> String {
        to_pretty(&self.value)
    }
}

/// Render with two-space indentation
pub fn to_pretty(value: &Value) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => rendered,
        Err(_) => value.to_string(),
    }
}

/// Whether a value is compared by equality alone
pub fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Take everything at a dotted path out of `value`
///
/// Sequences are transparent: the path applies to each element, and what is
/// found through one comes back as an array, empty when no element has the
/// field.  `None` when nothing is at the path.
pub fn remove_path(value: &mut Value, path: &str) -> Option<Value> {
    let segments: Vec<&str> = path.split('.').collect();
    remove_segments(value, &segments)
}

fn remove_segments(value: &mut Value, segments: &[&str]) -> Option<Value> {
    let (first, rest) = segments.split_first()?;
    match value {
        Value::Object(map) => {
            if rest.is_empty() {
                map.shift_remove(*first)
            } else {
                remove_segments(map.get_mut(*first)?, rest)
            }
        }
        Value::Array(items) => {
            let found = items
                .iter_mut()
                .filter_map(|item| remove_segments(item, segments))
                .collect();
            Some(Value::Array(found))
        }
        _ => None,
    }
}

/// Location of the first difference between two trees, `$` for the root
pub fn first_difference(expected: &Value, actual: &Value) -> Option<String> {
    let mut path = String::from(ROOT);
    if find_difference(expected, actual, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn find_difference(expected: &Value, actual: &Value, path: &mut String) -> bool {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => {
            let keys = expected
                .keys()
                .chain(actual.keys().filter(|k| !expected.contains_key(*k)));
            for key in keys {
                let len = path.len();
                path.push('.');
                path.push_str(key);
                match (expected.get(key), actual.get(key)) {
                    (Some(e), Some(a)) => {
                        if find_difference(e, a, path) {
                            return true;
                        }
                    }
                    _ => return true,
                }
                path.truncate(len);
            }
            false
        }
        (Value::Array(expected), Value::Array(actual)) => {
            for (index, (e, a)) in expected.iter().zip(actual).enumerate() {
                let len = path.len();
                path.push_str(&format!("[{index}]"));
                if find_difference(e, a, path) {
                    return true;
                }
                path.truncate(len);
            }
            if expected.len() != actual.len() {
                let index = expected.len().min(actual.len());
                path.push_str(&format!("[{index}]"));
                return true;
            }
            false
        }
        (expected, actual) => expected != actual,
    }
}

fn is_opaque(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn reference_to(path: &str) -> Value {
    let target = if path.is_empty() {
        ROOT.to_owned()
    } else {
        format!("{ROOT}.{path}")
    };
    let mut marker = Map::new();
    marker.insert(REFERENCE_KEY.to_owned(), Value::String(target));
    Value::Object(marker)
}

fn address_of<T: ?Sized>(value: &T) -> usize {
    value as *const T as *const () as usize
}

pub(crate) enum Slot {
    Value(Value),
    Skip,
}

struct Ancestor {
    name: &'static str,
    address: usize,
    path: String,
}

/// Where an instance stands among the circular types being serialized
enum Visit {
    Untracked,
    First,
    /// Already an ancestor, living at the given path
    Repeat(String),
}

struct Builder<'r> {
    rules: &'r Rules,
    path: Vec<String>,
    ancestors: Vec<Ancestor>,
    depth: usize,
    visited: BTreeSet<String>,
    hidden: BTreeSet<String>,
    maps: BTreeSet<String>,
    types: BTreeSet<&'static str>,
}

impl<'r> Builder<'r> {
    fn current_path(&self) -> String {
        self.path.join(".")
    }

    /// Record a named container, returning whether it is ignored
    fn container(&mut self, name: &'static str) -> bool {
        self.types.insert(name);
        self.rules.is_ignored_type(name)
    }

    fn enter(&mut self, name: &str) -> crate::Result<()> {
        self.depth += 1;
        if MAX_DEPTH < self.depth {
            return Err(Error::configuration(format_args!(
                "exceeded the maximum depth of {MAX_DEPTH} while serializing `{name}`; \
                 if it references itself, register it with `circular_reference`"
            )));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Start a named container with fields or elements
    fn open(&mut self, name: &'static str) -> crate::Result<State> {
        if self.container(name) {
            return Ok(State::Skipped);
        }
        self.enter(name)?;
        if self.rules.circular_types.contains(name) {
            Ok(State::Unidentified)
        } else {
            Ok(State::Plain)
        }
    }

    /// Instances of circular types are identified by type and by the address
    /// of their first field; a first visit is pushed onto the ancestors
    fn visit(&mut self, name: &'static str, address: usize) -> Visit {
        if !self.rules.circular_types.contains(name) {
            return Visit::Untracked;
        }
        let seen = self
            .ancestors
            .iter()
            .find(|a| a.name == name && a.address == address);
        if let Some(ancestor) = seen {
            crate::debug!("Cycle through `{}` at `{}`", name, ancestor.path);
            return Visit::Repeat(ancestor.path.clone());
        }
        let path = self.current_path();
        self.ancestors.push(Ancestor {
            name,
            address,
            path,
        });
        Visit::First
    }

    /// Serialize the content of a newtype struct, or of a newtype variant
    /// tagged with `variant`
    fn newtype<T: Serialize + ?Sized>(
        &mut self,
        name: &'static str,
        variant: Option<&'static str>,
        value: &T,
    ) -> crate::Result<Slot> {
        let tracked = match self.visit(name, address_of(value)) {
            Visit::Repeat(path) => return Ok(Slot::Value(reference_to(&path))),
            Visit::First => true,
            Visit::Untracked => false,
        };
        self.enter(name)?;
        let slot = value.serialize(&mut *self)?;
        self.leave();
        if tracked {
            self.ancestors.pop();
        }
        let Some(variant) = variant else {
            return Ok(slot);
        };
        let content = match slot {
            Slot::Value(content) => content,
            Slot::Skip => Value::Null,
        };
        Ok(Slot::Value(tagged(variant, content)))
    }

    fn field<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> crate::Result<Option<Value>> {
        self.path.push(key.to_owned());
        let path = self.current_path();
        self.visited.insert(path.clone());
        let result = if self.rules.ignored_paths.contains(&path) {
            Ok(None)
        } else {
            match value.serialize(&mut *self) {
                Ok(Slot::Value(value)) => {
                    if is_opaque(&value) {
                        self.hidden.insert(path);
                    }
                    Ok(Some(value))
                }
                Ok(Slot::Skip) => Ok(None),
                Err(err) => Err(err),
            }
        };
        self.path.pop();
        result
    }

    fn element<T: Serialize + ?Sized>(&mut self, value: &T) -> crate::Result<Option<Value>> {
        match value.serialize(&mut *self)? {
            Slot::Value(value) => Ok(Some(value)),
            Slot::Skip => Ok(None),
        }
    }

    fn key<T: Serialize + ?Sized>(&mut self, key: &T) -> crate::Result<String> {
        match self.element(key)? {
            Some(Value::String(key)) => Ok(key),
            Some(Value::Number(key)) => Ok(key.to_string()),
            Some(Value::Bool(key)) => Ok(key.to_string()),
            _ => Err(Error::new(
                crate::ErrorKind::Serialize,
                format_args!("map key at `{}` must be a string", self.current_path()),
            )),
        }
    }

    fn anonymous_seq(&mut self) -> crate::Result<SeqBuilder<'_, 'r>> {
        self.enter("sequence")?;
        Ok(SeqBuilder {
            builder: self,
            name: "sequence",
            items: Vec::new(),
            state: State::Plain,
            variant: None,
        })
    }
}

fn tagged(variant: &'static str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(variant.to_owned(), value);
    Value::Object(map)
}

fn number<N: Into<Number>>(n: N) -> crate::Result<Slot> {
    Ok(Slot::Value(Value::Number(n.into())))
}

impl<'a, 'r> ser::Serializer for &'a mut Builder<'r> {
    type Ok = Slot;
    type Error = Error;

    type SerializeSeq = SeqBuilder<'a, 'r>;
    type SerializeTuple = SeqBuilder<'a, 'r>;
    type SerializeTupleStruct = SeqBuilder<'a, 'r>;
    type SerializeTupleVariant = SeqBuilder<'a, 'r>;
    type SerializeMap = MapBuilder<'a, 'r>;
    type SerializeStruct = StructBuilder<'a, 'r>;
    type SerializeStructVariant = StructBuilder<'a, 'r>;

    fn serialize_bool(self, v: bool) -> crate::Result<Slot> {
        Ok(Slot::Value(Value::Bool(v)))
    }

    fn serialize_i8(self, v: i8) -> crate::Result<Slot> {
        number(v)
    }

    fn serialize_i16(self, v: i16) -> crate::Result<Slot> {
        number(v)
    }

    fn serialize_i32(self, v: i32) -> crate::Result<Slot> {
        number(v)
    }

    fn serialize_i64(self, v: i64) -> crate::Result<Slot> {
        number(v)
    }

    fn serialize_i128(self, v: i128) -> crate::Result<Slot> {
        match i64::try_from(v) {
            Ok(v) => number(v),
            Err(_) => Ok(Slot::Value(Value::String(v.to_string()))),
        }
    }

    fn serialize_u8(self, v: u8) -> crate::Result<Slot> {
        number(v)
    }

    fn serialize_u16(self, v: u16) -> crate::Result<Slot> {
        number(v)
    }

    fn serialize_u32(self, v: u32) -> crate::Result<Slot> {
        number(v)
    }

    fn serialize_u64(self, v: u64) -> crate::Result<Slot> {
        number(v)
    }

    fn serialize_u128(self, v: u128) -> crate::Result<Slot> {
        match u64::try_from(v) {
            Ok(v) => number(v),
            Err(_) => Ok(Slot::Value(Value::String(v.to_string()))),
        }
    }

    fn serialize_f32(self, v: f32) -> crate::Result<Slot> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> crate::Result<Slot> {
        let value = Number::from_f64(v).map_or(Value::Null, Value::Number);
        Ok(Slot::Value(value))
    }

    fn serialize_char(self, v: char) -> crate::Result<Slot> {
        Ok(Slot::Value(Value::String(v.to_string())))
    }

    fn serialize_str(self, v: &str) -> crate::Result<Slot> {
        Ok(Slot::Value(Value::String(v.to_owned())))
    }

    fn serialize_bytes(self, v: &[u8]) -> crate::Result<Slot> {
        let items = v.iter().map(|b| Value::Number((*b).into())).collect();
        Ok(Slot::Value(Value::Array(items)))
    }

    fn serialize_none(self) -> crate::Result<Slot> {
        Ok(Slot::Value(Value::Null))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> crate::Result<Slot> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> crate::Result<Slot> {
        Ok(Slot::Value(Value::Null))
    }

    fn serialize_unit_struct(self, name: &'static str) -> crate::Result<Slot> {
        if self.container(name) {
            return Ok(Slot::Skip);
        }
        Ok(Slot::Value(Value::Null))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> crate::Result<Slot> {
        if self.container(name) {
            return Ok(Slot::Skip);
        }
        Ok(Slot::Value(Value::String(variant.to_owned())))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> crate::Result<Slot> {
        if self.container(name) {
            return Ok(Slot::Skip);
        }
        self.newtype(name, None, value)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> crate::Result<Slot> {
        if self.container(name) {
            return Ok(Slot::Skip);
        }
        self.newtype(name, Some(variant), value)
    }

    fn serialize_seq(self, _len: Option<usize>) -> crate::Result<SeqBuilder<'a, 'r>> {
        self.anonymous_seq()
    }

    fn serialize_tuple(self, _len: usize) -> crate::Result<SeqBuilder<'a, 'r>> {
        self.anonymous_seq()
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> crate::Result<SeqBuilder<'a, 'r>> {
        let state = self.open(name)?;
        Ok(SeqBuilder {
            builder: self,
            name,
            items: Vec::new(),
            state,
            variant: None,
        })
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> crate::Result<SeqBuilder<'a, 'r>> {
        let state = self.open(name)?;
        Ok(SeqBuilder {
            builder: self,
            name,
            items: Vec::new(),
            state,
            variant: Some(variant),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> crate::Result<MapBuilder<'a, 'r>> {
        self.enter("map")?;
        Ok(MapBuilder {
            builder: self,
            entries: Vec::new(),
            next_key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> crate::Result<StructBuilder<'a, 'r>> {
        let state = self.open(name)?;
        Ok(StructBuilder {
            builder: self,
            name,
            variant: None,
            fields: Map::new(),
            state,
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> crate::Result<StructBuilder<'a, 'r>> {
        let state = self.open(name)?;
        Ok(StructBuilder {
            builder: self,
            name,
            variant: Some(variant),
            fields: Map::new(),
            state,
        })
    }
}

/// Progress of a named container through its fields or elements
enum State {
    Plain,
    Skipped,
    /// Circular type whose identity is taken from its first field
    Unidentified,
    /// Circular type pushed onto the ancestor stack
    Identified,
    /// Repeated visit, replaced by a reference to the given path
    Cycle(String),
}

impl State {
    /// Whether the next field is serialized
    fn admit(&mut self, builder: &mut Builder<'_>, name: &'static str, address: usize) -> bool {
        match self {
            State::Skipped | State::Cycle(_) => false,
            State::Unidentified => {
                *self = match builder.visit(name, address) {
                    Visit::Repeat(path) => State::Cycle(path),
                    Visit::First => State::Identified,
                    Visit::Untracked => State::Plain,
                };
                !matches!(self, State::Cycle(_))
            }
            State::Plain | State::Identified => true,
        }
    }

    fn close(self, builder: &mut Builder<'_>, content: Value, variant: Option<&'static str>) -> Slot {
        let content = match self {
            State::Skipped => return Slot::Skip,
            State::Cycle(path) => {
                builder.leave();
                return Slot::Value(reference_to(&path));
            }
            State::Identified => {
                builder.ancestors.pop();
                content
            }
            State::Plain | State::Unidentified => content,
        };
        builder.leave();
        let value = match variant {
            Some(variant) => tagged(variant, content),
            None => content,
        };
        Slot::Value(value)
    }
}

pub(crate) struct SeqBuilder<'a, 'r> {
    builder: &'a mut Builder<'r>,
    name: &'static str,
    items: Vec<Value>,
    state: State,
    variant: Option<&'static str>,
}

impl SeqBuilder<'_, '_> {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> crate::Result<()> {
        if !self.state.admit(self.builder, self.name, address_of(value)) {
            return Ok(());
        }
        if let Some(value) = self.builder.element(value)? {
            self.items.push(value);
        }
        Ok(())
    }

    fn finish(self) -> crate::Result<Slot> {
        let content = Value::Array(self.items);
        Ok(self.state.close(self.builder, content, self.variant))
    }
}

impl ser::SerializeSeq for SeqBuilder<'_, '_> {
    type Ok = Slot;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> crate::Result<()> {
        self.push(value)
    }

    fn end(self) -> crate::Result<Slot> {
        self.finish()
    }
}

impl ser::SerializeTuple for SeqBuilder<'_, '_> {
    type Ok = Slot;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> crate::Result<()> {
        self.push(value)
    }

    fn end(self) -> crate::Result<Slot> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SeqBuilder<'_, '_> {
    type Ok = Slot;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> crate::Result<()> {
        self.push(value)
    }

    fn end(self) -> crate::Result<Slot> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SeqBuilder<'_, '_> {
    type Ok = Slot;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> crate::Result<()> {
        self.push(value)
    }

    fn end(self) -> crate::Result<Slot> {
        self.finish()
    }
}

pub(crate) struct MapBuilder<'a, 'r> {
    builder: &'a mut Builder<'r>,
    entries: Vec<(String, Value)>,
    next_key: Option<String>,
}

impl ser::SerializeMap for MapBuilder<'_, '_> {
    type Ok = Slot;
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> crate::Result<()> {
        self.next_key = Some(self.builder.key(key)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> crate::Result<()> {
        let Some(key) = self.next_key.take() else {
            return Err(Error::new(
                crate::ErrorKind::Serialize,
                "map value serialized before its key",
            ));
        };
        if let Some(value) = self.builder.field(&key, value)? {
            self.entries.push((key, value));
        }
        Ok(())
    }

    fn end(mut self) -> crate::Result<Slot> {
        self.builder.leave();
        // Entry order of e.g. `HashMap` is arbitrary
        self.entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        let path = self.builder.current_path();
        self.builder.maps.insert(path);
        let map: Map<String, Value> = self.entries.into_iter().collect();
        Ok(Slot::Value(Value::Object(map)))
    }
}

pub(crate) struct StructBuilder<'a, 'r> {
    builder: &'a mut Builder<'r>,
    name: &'static str,
    variant: Option<&'static str>,
    fields: Map<String, Value>,
    state: State,
}

impl StructBuilder<'_, '_> {
    fn push<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> crate::Result<()> {
        if !self.state.admit(self.builder, self.name, address_of(value)) {
            return Ok(());
        }
        if let Some(value) = self.builder.field(key, value)? {
            self.fields.insert(key.to_owned(), value);
        }
        Ok(())
    }

    fn finish(self) -> crate::Result<Slot> {
        let content = Value::Object(self.fields);
        Ok(self.state.close(self.builder, content, self.variant))
    }
}

impl ser::SerializeStruct for StructBuilder<'_, '_> {
    type Ok = Slot;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> crate::Result<()> {
        self.push(key, value)
    }

    fn end(self) -> crate::Result<Slot> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for StructBuilder<'_, '_> {
    type Ok = Slot;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> crate::Result<()> {
        self.push(key, value)
    }

    fn end(self) -> crate::Result<Slot> {
        self.finish()
    }
}
