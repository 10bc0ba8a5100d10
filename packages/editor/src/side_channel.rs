//! # Modal Side Channels
//!
//! Link, equation, reference and shortcut dialogs live outside the editable
//! tree. Each one is driven through a [`SideChannel`]: callers queue `show` and
//! `reset` commands, and the editor applies them in order when it flushes.
//! Queuing `show` then `reset` before a flush therefore ends idle, never
//! visible.
//!
//! Confirming a dialog follows a fixed order (see [`confirm`]): restore the
//! selection captured at show time, mutate the document, return focus to the
//! editor, then queue the reset.
//!
//! Only one overlay may be open across every editor sharing an
//! [`OverlayRegistry`]; a newly shown overlay closes whichever was open before.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use folio_model::{Path, Range};
use tracing::debug;

use crate::{Editor, EditorResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalKind {
    Link,
    Equation,
    Reference,
    Shortcuts,
}

impl fmt::Display for ModalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModalKind::Link => "link",
            ModalKind::Equation => "equation",
            ModalKind::Reference => "reference",
            ModalKind::Shortcuts => "shortcuts",
        };
        f.write_str(name)
    }
}

/// Who opened a modal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Toolbar button or hotkey
    User,
    /// The caret moved into a node the modal edits
    Caret,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalState<P> {
    Idle,
    Visible {
        selection: Option<Range>,
        payload: P,
        origin: Origin,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Command<P> {
    Show {
        selection: Option<Range>,
        payload: P,
        origin: Origin,
    },
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPayload {
    pub url: String,
    pub text: String,
    /// The link being edited, if any
    pub link_path: Option<Path>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquationPayload {
    pub latex: String,
    pub inline: bool,
    pub equation_path: Option<Path>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencePayload {
    pub query: String,
    pub reference_path: Option<Path>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(u64);

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "editor-{}", self.0)
    }
}

pub struct SideChannel<P> {
    kind: ModalKind,
    state: ModalState<P>,
    queue: VecDeque<Command<P>>,
}

impl<P: Clone + fmt::Debug> SideChannel<P> {
    pub fn new(kind: ModalKind) -> Self {
        Self {
            kind,
            state: ModalState::Idle,
            queue: VecDeque::new(),
        }
    }

    pub fn kind(&self) -> ModalKind {
        self.kind
    }

    pub fn show(&mut self, selection: Option<Range>, payload: P, origin: Origin) {
        debug!(modal = %self.kind, ?origin, "Queued show");
        self.queue.push_back(Command::Show {
            selection,
            payload,
            origin,
        });
    }

    pub fn reset(&mut self) {
        debug!(modal = %self.kind, "Queued reset");
        self.queue.push_back(Command::Reset);
    }

    pub fn state(&self) -> &ModalState<P> {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, ModalState::Visible { .. })
    }

    pub fn origin(&self) -> Option<Origin> {
        match &self.state {
            ModalState::Visible { origin, .. } => Some(*origin),
            ModalState::Idle => None,
        }
    }

    /// Captured selection and payload while visible
    pub fn data(&self) -> Option<(Option<&Range>, &P)> {
        match &self.state {
            ModalState::Visible {
                selection, payload, ..
            } => Some((selection.as_ref(), payload)),
            ModalState::Idle => None,
        }
    }

    /// Edit the payload of a visible modal in place, e.g. as the user types a URL
    pub fn update_payload(&mut self, update: impl FnOnce(&mut P)) {
        if let ModalState::Visible { payload, .. } = &mut self.state {
            update(payload);
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Apply queued commands in order and report the last one applied
    fn drain(&mut self) -> Drained {
        let mut drained = Drained::Unchanged;
        while let Some(command) = self.queue.pop_front() {
            match command {
                Command::Show {
                    selection,
                    payload,
                    origin,
                } => {
                    self.state = ModalState::Visible {
                        selection,
                        payload,
                        origin,
                    };
                    drained = Drained::Shown;
                }
                Command::Reset => {
                    self.state = ModalState::Idle;
                    drained = Drained::Reset;
                }
            }
        }
        drained
    }

    /// Close without going through the queue; used when another overlay takes over
    fn close(&mut self) {
        self.queue.clear();
        self.state = ModalState::Idle;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drained {
    Unchanged,
    Shown,
    Reset,
}

/// The modals installed by an editor's plugins
#[derive(Default)]
pub struct Modals {
    pub link: Option<SideChannel<LinkPayload>>,
    pub equation: Option<SideChannel<EquationPayload>>,
    pub reference: Option<SideChannel<ReferencePayload>>,
    pub shortcuts: Option<SideChannel<()>>,
    /// Caret-opened link modal the user dismissed; not reopened while the caret stays in it
    pub(crate) dismissed_link: Option<Path>,
}

impl Modals {
    pub fn link_mut(&mut self) -> Option<&mut SideChannel<LinkPayload>> {
        self.link.as_mut()
    }

    pub fn equation_mut(&mut self) -> Option<&mut SideChannel<EquationPayload>> {
        self.equation.as_mut()
    }

    pub fn reference_mut(&mut self) -> Option<&mut SideChannel<ReferencePayload>> {
        self.reference.as_mut()
    }

    pub fn shortcuts_mut(&mut self) -> Option<&mut SideChannel<()>> {
        self.shortcuts.as_mut()
    }

    /// The visible modal, if any
    pub fn visible(&self) -> Option<ModalKind> {
        let link = self.link.as_ref().filter(|channel| channel.is_visible()).map(SideChannel::kind);
        let equation = self.equation.as_ref().filter(|channel| channel.is_visible()).map(SideChannel::kind);
        let reference = self.reference.as_ref().filter(|channel| channel.is_visible()).map(SideChannel::kind);
        let shortcuts = self.shortcuts.as_ref().filter(|channel| channel.is_visible()).map(SideChannel::kind);
        link.or(equation).or(reference).or(shortcuts)
    }

    /// Apply every queued command and keep the overlay registry in sync
    pub(crate) fn drain(&mut self, overlays: &OverlayRegistry, owner: EditorId) {
        let outcomes = [
            self.link.as_mut().map(|channel| (channel.kind(), channel.drain())),
            self.equation.as_mut().map(|channel| (channel.kind(), channel.drain())),
            self.reference.as_mut().map(|channel| (channel.kind(), channel.drain())),
            self.shortcuts.as_mut().map(|channel| (channel.kind(), channel.drain())),
        ];

        for (kind, drained) in outcomes.into_iter().flatten() {
            match drained {
                Drained::Shown => {
                    overlays.claim(owner, kind);
                    self.close_others(kind);
                }
                Drained::Reset => overlays.release(owner, kind),
                Drained::Unchanged => {}
            }
        }
    }

    /// Close every modal except `keep`
    pub(crate) fn close_others(&mut self, keep: ModalKind) {
        if keep != ModalKind::Link {
            if let Some(channel) = &mut self.link {
                channel.close();
            }
        }
        if keep != ModalKind::Equation {
            if let Some(channel) = &mut self.equation {
                channel.close();
            }
        }
        if keep != ModalKind::Reference {
            if let Some(channel) = &mut self.reference {
                channel.close();
            }
        }
        if keep != ModalKind::Shortcuts {
            if let Some(channel) = &mut self.shortcuts {
                channel.close();
            }
        }
    }

    pub(crate) fn close_all(&mut self) {
        if let Some(channel) = &mut self.link {
            channel.close();
        }
        if let Some(channel) = &mut self.equation {
            channel.close();
        }
        if let Some(channel) = &mut self.reference {
            channel.close();
        }
        if let Some(channel) = &mut self.shortcuts {
            channel.close();
        }
    }
}

#[derive(Debug, Default)]
struct OverlayState {
    next_editor: u64,
    active: Option<(EditorId, ModalKind)>,
}

/// Shared between editors on one page so only one overlay is open at a time
#[derive(Debug, Clone, Default)]
pub struct OverlayRegistry {
    inner: Rc<RefCell<OverlayState>>,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register_editor(&self) -> EditorId {
        let mut state = self.inner.borrow_mut();
        state.next_editor += 1;
        EditorId(state.next_editor)
    }

    fn claim(&self, editor: EditorId, modal: ModalKind) {
        let mut state = self.inner.borrow_mut();
        if let Some((previous_editor, previous_modal)) = state.active {
            if (previous_editor, previous_modal) != (editor, modal) {
                debug!(%previous_editor, %previous_modal, %editor, %modal, "Overlay superseded");
            }
        }
        state.active = Some((editor, modal));
    }

    fn release(&self, editor: EditorId, modal: ModalKind) {
        let mut state = self.inner.borrow_mut();
        if state.active == Some((editor, modal)) {
            state.active = None;
        }
    }

    /// The editor and modal that currently own the overlay slot
    pub fn active(&self) -> Option<(EditorId, ModalKind)> {
        self.inner.borrow().active
    }

    /// Whether `editor` may keep an overlay open
    pub(crate) fn owns(&self, editor: EditorId) -> bool {
        self.active().is_some_and(|(owner, _)| owner == editor)
    }
}

/// Run a modal's confirm step: restore the captured selection, mutate, focus
/// the editor, queue the reset. Returns `None` when the modal is not visible.
pub fn confirm<P, T>(
    editor: &mut Editor,
    channel: fn(&mut Modals) -> Option<&mut SideChannel<P>>,
    mutate: impl FnOnce(&mut Editor, P) -> EditorResult<T>,
) -> EditorResult<Option<T>>
where
    P: Clone + fmt::Debug,
{
    let Some(ModalState::Visible {
        selection, payload, ..
    }) = channel(editor.modals_mut()).map(|channel| channel.state().clone())
    else {
        return Ok(None);
    };

    // The tree may have moved on while the modal was open
    let restorable = selection.filter(|range| {
        let document = editor.document();
        document.contains_point(&range.anchor) && document.contains_point(&range.focus)
    });
    if restorable.is_some() {
        editor.set_selection(restorable)?;
    }
    let result = mutate(editor, payload)?;
    editor.focus();
    if let Some(channel) = channel(editor.modals_mut()) {
        channel.reset();
    }
    Ok(Some(result))
}
