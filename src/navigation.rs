//! Keyboard selection over the result window.
//!
//! [`next_index`] is the pure cursor transition; [`Selection`] wraps it with
//! the index state and turns key input into [`Transition`]s. Whoever owns the
//! window calls [`Selection::reset`] every time the window is recomputed.

/// A key, reduced to what the search box reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
    Delete,
    Backspace,
    Char(char),
}

/// Modifier state accompanying a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        meta: false,
        shift: false,
        alt: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn meta() -> Self {
        Self {
            meta: true,
            ..Self::NONE
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A single key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

impl From<Key> for KeyInput {
    fn from(key: Key) -> Self {
        Self::plain(key)
    }
}

/// Cursor movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Action requested on the highlighted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Open(usize),
    Edit(usize),
    Delete(usize),
}

/// Outcome of feeding one key to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The cursor moved to this index.
    Moved(usize),
    /// An action on the row at the current index.
    Dispatch(Intent),
    /// The key means nothing here, or the window is empty.
    Ignored,
}

/// Move the cursor one step, wrapping at both ends.
///
/// `len` must be non-zero.
pub fn next_index(index: usize, len: usize, direction: Direction) -> usize {
    debug_assert!(len > 0);
    match direction {
        Direction::Down => (index + 1) % len,
        Direction::Up => (index + len - 1) % len,
    }
}

/// Selection index over the current result window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    index: usize,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Back to the first row; called whenever the window changes.
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Process one key against a window of `len` rows.
    pub fn handle(&mut self, len: usize, input: KeyInput) -> Transition {
        if len == 0 {
            return Transition::Ignored;
        }
        // A window can only shrink through a recompute, which resets us; clamp
        // anyway so a caller that forgot cannot index out of bounds.
        if self.index >= len {
            self.index = 0;
        }

        let KeyInput { key, modifiers } = input;
        match key {
            Key::ArrowDown => {
                self.index = next_index(self.index, len, Direction::Down);
                Transition::Moved(self.index)
            }
            Key::ArrowUp => {
                self.index = next_index(self.index, len, Direction::Up);
                Transition::Moved(self.index)
            }
            Key::Enter => Transition::Dispatch(Intent::Open(self.index)),
            Key::Char(c) if modifiers.command() && c.eq_ignore_ascii_case(&'e') => {
                Transition::Dispatch(Intent::Edit(self.index))
            }
            Key::Delete | Key::Backspace if modifiers.shift => {
                Transition::Dispatch(Intent::Delete(self.index))
            }
            _ => Transition::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(index: usize) -> Selection {
        Selection { index }
    }

    #[test]
    fn test_next_index_wraps() {
        assert_eq!(next_index(2, 3, Direction::Down), 0);
        assert_eq!(next_index(0, 3, Direction::Up), 2);
        assert_eq!(next_index(1, 3, Direction::Down), 2);
        assert_eq!(next_index(1, 3, Direction::Up), 0);
        assert_eq!(next_index(0, 1, Direction::Down), 0);
        assert_eq!(next_index(0, 1, Direction::Up), 0);
    }

    #[test]
    fn test_arrow_keys_move_and_wrap() {
        let mut sel = at(2);
        assert_eq!(sel.handle(3, Key::ArrowDown.into()), Transition::Moved(0));
        assert_eq!(sel.handle(3, Key::ArrowUp.into()), Transition::Moved(2));
        assert_eq!(sel.handle(3, Key::ArrowUp.into()), Transition::Moved(1));
        assert_eq!(sel.index(), 1);
    }

    #[test]
    fn test_empty_window_is_noop() {
        let mut sel = Selection::new();
        for key in [Key::ArrowDown, Key::ArrowUp, Key::Enter, Key::Delete] {
            assert_eq!(sel.handle(0, KeyInput::new(key, Modifiers::shift())), Transition::Ignored);
        }
        assert_eq!(sel.index(), 0);
    }

    #[test]
    fn test_enter_opens_current_row() {
        let mut sel = at(1);
        assert_eq!(
            sel.handle(3, Key::Enter.into()),
            Transition::Dispatch(Intent::Open(1))
        );
        assert_eq!(sel.index(), 1);
    }

    #[test]
    fn test_edit_shortcut() {
        let mut sel = at(2);
        assert_eq!(
            sel.handle(4, KeyInput::new(Key::Char('e'), Modifiers::ctrl())),
            Transition::Dispatch(Intent::Edit(2))
        );
        assert_eq!(
            sel.handle(4, KeyInput::new(Key::Char('E'), Modifiers::meta())),
            Transition::Dispatch(Intent::Edit(2))
        );
        // plain `e` is just typing
        assert_eq!(sel.handle(4, Key::Char('e').into()), Transition::Ignored);
    }

    #[test]
    fn test_delete_shortcut_needs_shift() {
        let mut sel = at(0);
        assert_eq!(
            sel.handle(2, KeyInput::new(Key::Delete, Modifiers::shift())),
            Transition::Dispatch(Intent::Delete(0))
        );
        assert_eq!(
            sel.handle(2, KeyInput::new(Key::Backspace, Modifiers::shift())),
            Transition::Dispatch(Intent::Delete(0))
        );
        assert_eq!(sel.handle(2, Key::Backspace.into()), Transition::Ignored);
    }

    #[test]
    fn test_reset() {
        let mut sel = at(5);
        sel.reset();
        assert_eq!(sel.index(), 0);
    }

    #[test]
    fn test_stale_index_is_clamped() {
        let mut sel = at(6);
        assert_eq!(
            sel.handle(2, Key::Enter.into()),
            Transition::Dispatch(Intent::Open(0))
        );
    }
}
