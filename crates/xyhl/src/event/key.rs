use std::ops::Add;

/// Keyboard modifier state.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Hash)]
pub struct Mods {
    /// Shift held.
    pub shift: bool,
    /// Control held.
    pub ctrl: bool,
    /// Alt held.
    pub alt: bool,
}

impl Add<KeyCode> for Mods {
    type Output = Key;

    fn add(self, other: KeyCode) -> Self::Output {
        Key(Some(self), other)
    }
}

impl Add<Self> for Mods {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self {
            shift: self.shift || other.shift,
            ctrl: self.ctrl || other.ctrl,
            alt: self.alt || other.alt,
        }
    }
}

/// No modifiers.
#[allow(non_upper_case_globals)]
pub const Empty: Mods = Mods {
    shift: false,
    ctrl: false,
    alt: false,
};

/// Shift only.
#[allow(non_upper_case_globals)]
pub const Shift: Mods = Mods {
    shift: true,
    ctrl: false,
    alt: false,
};

/// Control only.
#[allow(non_upper_case_globals)]
pub const Ctrl: Mods = Mods {
    shift: false,
    ctrl: true,
    alt: false,
};

/// Key identifiers the controller cares about.
#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash)]
pub enum KeyCode {
    Left,
    Right,
    Up,
    Down,
    Esc,
}

impl KeyCode {
    /// Direction of an arrow key.
    pub fn direction(&self) -> Option<geom::Direction> {
        match self {
            Self::Left => Some(geom::Direction::Left),
            Self::Right => Some(geom::Direction::Right),
            Self::Up => Some(geom::Direction::Up),
            Self::Down => Some(geom::Direction::Down),
            Self::Esc => None,
        }
    }
}

/// A keystroke: optional modifiers plus a key code.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Key(pub Option<Mods>, pub KeyCode);

impl Key {
    /// Modifiers, treating "unknown" as none.
    pub fn mods(&self) -> Mods {
        self.0.unwrap_or(Empty)
    }

    /// The key code.
    pub fn code(&self) -> KeyCode {
        self.1
    }
}

impl From<KeyCode> for Key {
    fn from(c: KeyCode) -> Self {
        Self(None, c)
    }
}
