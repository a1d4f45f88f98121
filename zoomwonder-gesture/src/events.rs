//! Lifecycle notifications and the listener registry.
//!
//! Listeners subscribe with dotted typenames: `"zoom"`, `"zoom.minimap"`,
//! or several separated by whitespace (`"start.log end.log"`). A name keeps
//! one listener per event type; registering it again replaces the old
//! listener and moves it to the end of the emission order.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use zoomwonder_core::Transform;

use crate::error::ZoomError;
use crate::input::InputEvent;
use crate::target::TargetId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    Zoom,
    /// Advisory frame from an in-progress touch gesture; the final
    /// transform follows as a regular `zoom` when the touch ends.
    ZoomSuggest,
    End,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Start,
        EventKind::Zoom,
        EventKind::ZoomSuggest,
        EventKind::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::Zoom => "zoom",
            EventKind::ZoomSuggest => "zoom-suggest",
            EventKind::End => "end",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ZoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ZoomError::UnknownEvent(s.to_string()))
    }
}

/// Notification delivered to listeners.
pub struct ZoomEvent<'a, D> {
    pub kind: EventKind,
    pub target: TargetId,
    /// Transform committed at the time of emission.
    pub transform: &'a Transform,
    /// Input event that drove the gesture, if any.
    pub source: Option<&'a InputEvent>,
    pub datum: &'a D,
}

pub type Listener<D> = Rc<dyn Fn(&ZoomEvent<'_, D>)>;

struct Registration<D> {
    kind: EventKind,
    name: String,
    listener: Listener<D>,
}

/// Parsed `type.name`; a missing type means "every type".
struct Typename {
    kind: Option<EventKind>,
    name: String,
}

fn parse_typenames(typenames: &str) -> Result<Vec<Typename>, ZoomError> {
    typenames
        .split_whitespace()
        .map(|typename| -> Result<Typename, ZoomError> {
            let (kind, name) = typename.split_once('.').unwrap_or((typename, ""));
            let kind = if kind.is_empty() {
                None
            } else {
                Some(kind.parse()?)
            };
            Ok(Typename {
                kind,
                name: name.to_string(),
            })
        })
        .collect()
}

pub struct Listeners<D> {
    entries: Vec<Registration<D>>,
}

impl<D> Listeners<D> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register `listener` under each typename, or remove the named
    /// registrations when `listener` is `None`. Nothing changes if any
    /// typename names an unknown event type.
    pub fn on(&mut self, typenames: &str, listener: Option<Listener<D>>) -> Result<(), ZoomError> {
        let parsed = parse_typenames(typenames)?;
        for typename in parsed {
            match (typename.kind, &listener) {
                (Some(kind), Some(listener)) => {
                    self.remove(Some(kind), &typename.name);
                    self.entries.push(Registration {
                        kind,
                        name: typename.name,
                        listener: Rc::clone(listener),
                    });
                }
                (kind, None) => self.remove(kind, &typename.name),
                (None, Some(_)) => {
                    log::warn!("Ignoring listener registered without an event type");
                }
            }
        }
        Ok(())
    }

    /// The listener registered under the first typename, if any.
    pub fn get(&self, typenames: &str) -> Result<Option<Listener<D>>, ZoomError> {
        let parsed = parse_typenames(typenames)?;
        Ok(parsed.first().and_then(|typename| {
            self.entries
                .iter()
                .find(|entry| {
                    typename.kind.map_or(true, |kind| kind == entry.kind)
                        && entry.name == typename.name
                })
                .map(|entry| Rc::clone(&entry.listener))
        }))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Call every listener of `event.kind`, in registration order.
    pub fn emit(&self, event: &ZoomEvent<'_, D>) {
        for entry in self.entries.iter().filter(|entry| entry.kind == event.kind) {
            (entry.listener)(event);
        }
    }

    fn remove(&mut self, kind: Option<EventKind>, name: &str) {
        self.entries.retain(|entry| {
            !(kind.map_or(true, |kind| kind == entry.kind) && entry.name == name)
        });
    }
}

impl<D> Default for Listeners<D> {
    fn default() -> Self {
        Self::new()
    }
}
