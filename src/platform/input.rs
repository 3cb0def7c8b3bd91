//! Input reduction
//!
//! Raw keyboard and touch events come in, a normalized intent comes out.
//! The host forwards DOM events; nothing here touches the DOM.

use glam::Vec2;

/// Minimum swipe distance (pixels) before a canvas swipe counts as movement
const SWIPE_THRESHOLD: f32 = 30.0;
/// Fraction of the joystick radius ignored around its center
const JOYSTICK_DEADZONE: f32 = 0.2;
/// Right-hand fraction of the canvas that acts as the fire zone for touches
const TOUCH_FIRE_ZONE: f32 = 0.8;

/// What the player wants to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Intent {
    /// Unit-length (or zero) movement direction, +y is down
    pub movement: Vec2,
    /// Fire button held
    pub fire: bool,
    /// Special (boost/ability) button held
    pub special: bool,
}

/// Held-button state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Keys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    pub special: bool,
}

impl Keys {
    fn clear_movement(&mut self) {
        self.up = false;
        self.down = false;
        self.left = false;
        self.right = false;
    }
}

/// Logical buttons a key name can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Button {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Special,
}

fn button_for_key(key: &str) -> Option<Button> {
    match key {
        "ArrowUp" | "w" | "W" => Some(Button::Up),
        "ArrowDown" | "s" | "S" => Some(Button::Down),
        "ArrowLeft" | "a" | "A" => Some(Button::Left),
        "ArrowRight" | "d" | "D" => Some(Button::Right),
        " " => Some(Button::Fire),
        "Shift" => Some(Button::Special),
        _ => None,
    }
}

/// Reduces device events into an [`Intent`]
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: Keys,
    touch_active: bool,
    touch_anchor: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Keys {
        self.keys
    }

    /// Key pressed. Returns true if the key is bound.
    pub fn key_down(&mut self, key: &str) -> bool {
        self.set_key(key, true)
    }

    /// Key released. Returns true if the key is bound.
    pub fn key_up(&mut self, key: &str) -> bool {
        self.set_key(key, false)
    }

    fn set_key(&mut self, key: &str, held: bool) -> bool {
        let Some(button) = button_for_key(key) else {
            return false;
        };
        match button {
            Button::Up => self.keys.up = held,
            Button::Down => self.keys.down = held,
            Button::Left => self.keys.left = held,
            Button::Right => self.keys.right = held,
            Button::Fire => self.keys.fire = held,
            Button::Special => self.keys.special = held,
        }
        true
    }

    /// Touch began on the canvas. The right edge of the canvas fires; its
    /// bottom-right corner also triggers special.
    pub fn touch_start(&mut self, pos: Vec2, canvas_size: Vec2) {
        self.touch_active = true;
        self.touch_anchor = pos;
        if pos.x > canvas_size.x * TOUCH_FIRE_ZONE {
            self.keys.fire = true;
            if pos.y > canvas_size.y * TOUCH_FIRE_ZONE {
                self.keys.special = true;
            }
        }
    }

    /// Touch moved on the canvas: swipes past the threshold steer along the
    /// dominant axis and re-anchor.
    pub fn touch_move(&mut self, pos: Vec2) {
        if !self.touch_active {
            return;
        }
        let delta = pos - self.touch_anchor;
        self.keys.clear_movement();

        if delta.x.abs() > SWIPE_THRESHOLD || delta.y.abs() > SWIPE_THRESHOLD {
            if delta.x.abs() > delta.y.abs() {
                self.keys.left = delta.x < 0.0;
                self.keys.right = delta.x > 0.0;
            } else {
                self.keys.up = delta.y < 0.0;
                self.keys.down = delta.y > 0.0;
            }
            self.touch_anchor = pos;
        }
    }

    /// Touch lifted from the canvas
    pub fn touch_end(&mut self) {
        self.touch_active = false;
        self.keys.fire = false;
        self.keys.special = false;
        self.keys.clear_movement();
    }

    /// On-screen joystick moved. `offset` is the knob offset from the pad
    /// center, `radius` the pad radius.
    pub fn joystick(&mut self, offset: Vec2, radius: f32) {
        let deadzone = radius * JOYSTICK_DEADZONE;
        if offset.length() > deadzone {
            self.keys.left = offset.x < -deadzone;
            self.keys.right = offset.x > deadzone;
            self.keys.up = offset.y < -deadzone;
            self.keys.down = offset.y > deadzone;
        } else {
            self.keys.clear_movement();
        }
    }

    pub fn joystick_release(&mut self) {
        self.keys.clear_movement();
    }

    /// Dedicated touch buttons
    pub fn set_fire(&mut self, held: bool) {
        self.keys.fire = held;
    }

    pub fn set_special(&mut self, held: bool) {
        self.keys.special = held;
    }

    /// Drop every held button (focus loss, restart)
    pub fn release_all(&mut self) {
        self.keys = Keys::default();
        self.touch_active = false;
    }

    /// Movement direction; diagonals are normalized to unit length
    pub fn movement_direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.keys.left {
            dir.x -= 1.0;
        }
        if self.keys.right {
            dir.x += 1.0;
        }
        if self.keys.up {
            dir.y -= 1.0;
        }
        if self.keys.down {
            dir.y += 1.0;
        }
        dir.normalize_or_zero()
    }

    pub fn intent(&self) -> Intent {
        Intent {
            movement: self.movement_direction(),
            fire: self.keys.fire,
            special: self.keys.special,
        }
    }
}
