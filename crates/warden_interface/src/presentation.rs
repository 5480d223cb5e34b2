//! Presentation types.
//!
//! A presentation type is a named semantic type for read items, such as
//! `UserID` or `MatrixRoomAlias`. Parameters name the presentation type they
//! accept, and help output uses the names to describe commands.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use warden_document::InnerNode;
use warden_foundation::{Error, ErrorKind, Registry, Result, RoomKind};

use crate::reader::ReadItem;

/// Checks an item, returning a message for the operator on failure.
pub type Validator = Arc<dyn Fn(&ReadItem) -> std::result::Result<(), String> + Send + Sync>;

/// A named semantic type with a validator.
#[derive(Clone)]
pub struct PresentationType {
    name: String,
    validator: Validator,
    general: bool,
}

impl PresentationType {
    /// Creates a presentation type from a validator.
    pub fn new(
        name: impl Into<String>,
        validator: impl Fn(&ReadItem) -> std::result::Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            validator: Arc::new(validator),
            general: false,
        }
    }

    /// Creates a presentation type from a predicate, with a standard
    /// message when it does not match.
    pub fn simple(
        name: impl Into<String>,
        predicate: impl Fn(&ReadItem) -> bool + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let expected = name.clone();
        Self::new(name, move |item| {
            if predicate(item) {
                Ok(())
            } else {
                Err(format!(
                    "Was expecting a match for the presentation type: {expected} but got {item}."
                ))
            }
        })
    }

    /// Marks this type as one that accepts everything some other type
    /// accepts, so that it loses to more specific types in
    /// [`PresentationTypes::presentation_type_of`].
    #[must_use]
    pub fn general(mut self) -> Self {
        self.general = true;
        self
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this type was marked as general.
    #[must_use]
    pub const fn is_general(&self) -> bool {
        self.general
    }

    /// Validates an item.
    ///
    /// # Errors
    ///
    /// Returns a message describing the mismatch.
    pub fn validate(&self, item: &ReadItem) -> std::result::Result<(), String> {
        (self.validator)(item)
    }

    /// Returns true if the item is accepted.
    #[must_use]
    pub fn accepts(&self, item: &ReadItem) -> bool {
        self.validate(item).is_ok()
    }
}

impl fmt::Debug for PresentationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentationType")
            .field("name", &self.name)
            .field("general", &self.general)
            .finish_non_exhaustive()
    }
}

/// Combines types into one that accepts anything a member accepts.
///
/// Members are tried in order. The name is the member names joined by
/// ` | `.
#[must_use]
pub fn union(members: &[PresentationType]) -> PresentationType {
    let name = members
        .iter()
        .map(PresentationType::name)
        .collect::<Vec<_>>()
        .join(" | ");
    let members = members.to_vec();
    let expected = name.clone();
    PresentationType::new(name, move |item| {
        if members.iter().any(|member| member.accepts(item)) {
            Ok(())
        } else {
            Err(format!(
                "Read item didn't match any of the presentation types {expected}"
            ))
        }
    })
}

/// An append-only registry of presentation types, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct PresentationTypes {
    types: Vec<PresentationType>,
    by_name: HashMap<String, usize>,
}

impl PresentationTypes {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the standard types.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for presentation_type in standard_types() {
            registry.insert(presentation_type);
        }
        registry
    }

    fn insert(&mut self, presentation_type: PresentationType) {
        self.by_name
            .insert(presentation_type.name.clone(), self.types.len());
        self.types.push(presentation_type);
    }

    /// Registers a type.
    ///
    /// # Errors
    ///
    /// Fails if a type with the same name is already registered.
    pub fn register(&mut self, presentation_type: PresentationType) -> Result<()> {
        if self.by_name.contains_key(presentation_type.name()) {
            return Err(Error::duplicate(
                Registry::PresentationType,
                presentation_type.name(),
            ));
        }
        self.insert(presentation_type);
        Ok(())
    }

    /// Looks up a type by name.
    ///
    /// # Errors
    ///
    /// Fails if no type has that name.
    pub fn find(&self, name: &str) -> Result<&PresentationType> {
        self.by_name
            .get(name)
            .map(|&index| &self.types[index])
            .ok_or_else(|| Error::not_registered(Registry::PresentationType, name))
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Finds the single type that best describes an item.
    ///
    /// `any` is never a candidate, and general types only count when no
    /// specific type accepts the item.
    ///
    /// # Errors
    ///
    /// Fails if more than one candidate remains.
    pub fn presentation_type_of(&self, item: &ReadItem) -> Result<Option<&PresentationType>> {
        let candidates: Vec<&PresentationType> = self
            .types
            .iter()
            .filter(|t| t.name != "any" && t.accepts(item))
            .collect();
        let specific: Vec<&PresentationType> =
            candidates.iter().copied().filter(|t| !t.general).collect();
        let chosen = if specific.is_empty() {
            candidates
        } else {
            specific
        };
        match chosen.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(only)),
            several => Err(Error::new(ErrorKind::AmbiguousPresentation {
                value: item.to_string(),
                candidates: several.iter().map(|t| t.name.clone()).collect(),
            })),
        }
    }
}

/// The `boolean` type, accepting the words `true` and `false`.
#[must_use]
pub fn boolean() -> PresentationType {
    PresentationType::simple("boolean", |item| {
        matches!(item.as_str(), Some("true" | "false"))
    })
}

fn standard_types() -> Vec<PresentationType> {
    vec![
        PresentationType::simple("string", |item| matches!(item, ReadItem::String(_)))
            .general(),
        PresentationType::simple("Keyword", ReadItem::is_keyword),
        boolean(),
        PresentationType::simple("any", |_| true).general(),
        PresentationType::simple("integer", |item| {
            item.as_str().is_some_and(|word| word.parse::<i64>().is_ok())
        }),
        PresentationType::simple("UserID", |item| matches!(item, ReadItem::User(_))),
        PresentationType::simple("MatrixRoomReference", |item| {
            matches!(item, ReadItem::Room(_))
        })
        .general(),
        PresentationType::simple("MatrixRoomID", |item| {
            matches!(item, ReadItem::Room(room) if room.kind() == RoomKind::Id)
        }),
        PresentationType::simple("MatrixRoomAlias", |item| {
            matches!(item, ReadItem::Room(room) if room.kind() == RoomKind::Alias)
        }),
        PresentationType::simple("MatrixEventReference", |item| {
            matches!(item, ReadItem::Event(_))
        }),
    ]
}

/// Appends the presentation of an item to a document node.
///
/// References become links to their permalinks; everything else is text.
pub fn append_presentation(node: &mut InnerNode, item: &ReadItem) {
    match item {
        ReadItem::Room(room) => {
            node.anchor(room.to_permalink()).text(room.as_str());
        }
        ReadItem::User(user) => {
            node.anchor(user.to_permalink()).text(user.as_str());
        }
        ReadItem::Event(event) => {
            let permalink = event.to_permalink();
            node.anchor(permalink.clone()).text(permalink);
        }
        ReadItem::Keyword(_) | ReadItem::String(_) => {
            node.text(item.to_string());
        }
    }
}
