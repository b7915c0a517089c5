/// The eight physical pad buttons, numbered the way the engine expects them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    A = 0,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];

    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Host-side actions that share the key vocabulary but never reach the pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetaAction {
    SaveState,
    RestoreState,
}

/// What a host key resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Binding {
    Button(Button),
    Meta(MetaAction),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_button_codes() {
        assert_eq!(Button::A.code(), 0);
        assert_eq!(Button::B.code(), 1);
        assert_eq!(Button::Select.code(), 2);
        assert_eq!(Button::Start.code(), 3);
        assert_eq!(Button::Up.code(), 4);
        assert_eq!(Button::Down.code(), 5);
        assert_eq!(Button::Left.code(), 6);
        assert_eq!(Button::Right.code(), 7);
    }
}
