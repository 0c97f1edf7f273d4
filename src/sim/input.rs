//! Keyboard and virtual-joystick input folded into a per-tick intent
//!
//! Hosts forward raw key and touch events; the simulation only ever sees
//! the [`Intent`] returned by [`InputController::current_intent`].

use glam::DVec2;

use crate::consts::*;

/// Logical keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Pause,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value; unknown names yield `None`
    pub fn from_name(name: &str) -> Option<Key> {
        match name {
            "ArrowUp" | "w" | "W" => Some(Key::Up),
            "ArrowDown" | "s" | "S" => Some(Key::Down),
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            " " | "Spacebar" | "Enter" => Some(Key::Fire),
            "Escape" | "p" | "P" => Some(Key::Pause),
            _ => None,
        }
    }
}

/// What the player wants this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intent {
    /// Desired heading (radians, 0 = up)
    pub heading: f64,
    /// Throttle, 0.0 - 1.0
    pub magnitude: f64,
    /// Move backwards along the heading
    pub reverse: bool,
    /// A shot was requested since the last intent
    pub fire: bool,
}

impl Intent {
    /// Hold position facing `heading`
    pub fn idle(heading: f64) -> Self {
        Self {
            heading,
            magnitude: 0.0,
            reverse: false,
            fire: false,
        }
    }
}

#[derive(Debug, Clone)]
struct JoystickTouch {
    id: i32,
    origin: DVec2,
    current: DVec2,
    started_ms: f64,
    moved: bool,
}

impl JoystickTouch {
    /// Drag vector clamped to the joystick radius
    fn drag(&self) -> DVec2 {
        (self.current - self.origin).clamp_length_max(JOYSTICK_RADIUS)
    }
}

/// Tracks held keys and active touches between frames
#[derive(Debug, Clone, Default)]
pub struct InputController {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    fire_requested: bool,
    pause_requested: bool,
    joystick: Option<JoystickTouch>,
    /// Secondary touches (fire buttons)
    fire_touches: Vec<i32>,
    last_touch_fire_ms: Option<f64>,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Up => self.up = true,
            Key::Down => self.down = true,
            Key::Left => self.left = true,
            Key::Right => self.right = true,
            // Auto-repeat re-requests; the player cooldown paces it
            Key::Fire => self.fire_requested = true,
            Key::Pause => self.pause_requested = true,
        }
    }

    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::Up => self.up = false,
            Key::Down => self.down = false,
            Key::Left => self.left = false,
            Key::Right => self.right = false,
            Key::Fire | Key::Pause => {}
        }
    }

    /// A new touch: the first one becomes the joystick, later ones fire
    pub fn touch_start(&mut self, id: i32, pos: DVec2, now_ms: f64) {
        if self.is_tracked(id) {
            return;
        }
        if self.joystick.is_none() {
            self.joystick = Some(JoystickTouch {
                id,
                origin: pos,
                current: pos,
                started_ms: now_ms,
                moved: false,
            });
        } else {
            self.fire_touches.push(id);
            self.touch_fire(now_ms);
        }
    }

    pub fn touch_move(&mut self, id: i32, pos: DVec2) {
        if let Some(stick) = self.joystick.as_mut().filter(|s| s.id == id) {
            if pos.distance(stick.origin) > TAP_MAX_TRAVEL {
                stick.moved = true;
            }
            stick.current = pos;
        }
    }

    /// Release a touch; a quick, still joystick touch counts as a tap
    pub fn touch_end(&mut self, id: i32, now_ms: f64) {
        if let Some(stick) = self.joystick.take_if(|s| s.id == id) {
            if !stick.moved && now_ms - stick.started_ms < TAP_MAX_MS {
                self.touch_fire(now_ms);
            }
            return;
        }
        self.fire_touches.retain(|t| *t != id);
    }

    /// The platform aborted a touch; never counts as a tap
    pub fn touch_cancel(&mut self, id: i32) {
        if self.joystick.as_ref().is_some_and(|s| s.id == id) {
            self.joystick = None;
        }
        self.fire_touches.retain(|t| *t != id);
    }

    fn is_tracked(&self, id: i32) -> bool {
        self.joystick.as_ref().is_some_and(|s| s.id == id) || self.fire_touches.contains(&id)
    }

    fn touch_fire(&mut self, now_ms: f64) {
        let ready = self
            .last_touch_fire_ms
            .is_none_or(|last| now_ms - last > TOUCH_FIRE_INTERVAL_MS);
        if ready {
            self.fire_requested = true;
            self.last_touch_fire_ms = Some(now_ms);
        }
    }

    /// Current joystick drag, if a joystick touch is held
    pub fn joystick_drag(&self) -> Option<DVec2> {
        self.joystick.as_ref().map(JoystickTouch::drag)
    }

    /// Fold held input into an intent for this tick
    ///
    /// Consumes any pending fire request.
    pub fn current_intent(&mut self, heading: f64) -> Intent {
        let fire = std::mem::take(&mut self.fire_requested);

        if let Some(drag) = self.joystick_drag().filter(|d| *d != DVec2::ZERO) {
            return Intent {
                heading: drag.y.atan2(drag.x) + std::f64::consts::FRAC_PI_2,
                magnitude: (drag.length() / JOYSTICK_RADIUS).min(1.0),
                reverse: false,
                fire,
            };
        }

        let mut heading = heading;
        if self.left {
            heading -= TURN_STEP;
        }
        if self.right {
            heading += TURN_STEP;
        }

        let (magnitude, reverse) = match (self.up, self.down) {
            (true, true) => (0.5, false),
            (true, false) => (1.0, false),
            (false, true) => (0.5, true),
            (false, false) => (0.0, false),
        };

        Intent {
            heading,
            magnitude,
            reverse,
            fire,
        }
    }

    /// Take a pending pause toggle
    pub fn take_pause_request(&mut self) -> bool {
        std::mem::take(&mut self.pause_requested)
    }

    /// Forget every held key and touch
    pub fn reset(&mut self) {
        let last_touch_fire_ms = self.last_touch_fire_ms;
        *self = Self {
            last_touch_fire_ms,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("ArrowUp"), Some(Key::Up));
        assert_eq!(Key::from_name("w"), Some(Key::Up));
        assert_eq!(Key::from_name(" "), Some(Key::Fire));
        assert_eq!(Key::from_name("Enter"), Some(Key::Fire));
        assert_eq!(Key::from_name("Escape"), Some(Key::Pause));
        assert_eq!(Key::from_name("p"), Some(Key::Pause));
        assert_eq!(Key::from_name("F5"), None);
    }

    #[test]
    fn test_keyboard_throttle() {
        let mut input = InputController::new();
        assert_eq!(input.current_intent(0.0).magnitude, 0.0);

        input.key_down(Key::Up);
        let intent = input.current_intent(0.0);
        assert_eq!((intent.magnitude, intent.reverse), (1.0, false));

        input.key_down(Key::Down);
        let intent = input.current_intent(0.0);
        assert_eq!((intent.magnitude, intent.reverse), (0.5, false));

        input.key_up(Key::Up);
        let intent = input.current_intent(0.0);
        assert_eq!((intent.magnitude, intent.reverse), (0.5, true));
    }

    #[test]
    fn test_keyboard_rotation() {
        let mut input = InputController::new();
        input.key_down(Key::Right);
        assert!((input.current_intent(1.0).heading - 1.05).abs() < 1e-12);
        input.key_down(Key::Left);
        assert!((input.current_intent(1.0).heading - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fire_is_consumed_once() {
        let mut input = InputController::new();
        input.key_down(Key::Fire);
        assert!(input.current_intent(0.0).fire);
        assert!(!input.current_intent(0.0).fire);
    }

    #[test]
    fn test_joystick_heading_and_magnitude() {
        let mut input = InputController::new();
        input.touch_start(1, DVec2::new(100.0, 100.0), 0.0);
        input.touch_move(1, DVec2::new(135.0, 100.0));

        let intent = input.current_intent(0.0);
        assert!((intent.heading - FRAC_PI_2).abs() < 1e-12);
        assert!((intent.magnitude - 0.5).abs() < 1e-12);

        // Dragging past the rim saturates
        input.touch_move(1, DVec2::new(100.0, 400.0));
        let intent = input.current_intent(0.0);
        assert_eq!(intent.magnitude, 1.0);
        assert!((intent.heading - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_joystick_overrides_keyboard() {
        let mut input = InputController::new();
        input.key_down(Key::Down);
        input.touch_start(1, DVec2::ZERO, 0.0);
        input.touch_move(1, DVec2::new(0.0, -70.0));
        let intent = input.current_intent(2.0);
        assert!(intent.heading.abs() < 1e-12);
        assert!(!intent.reverse);
        assert_eq!(intent.magnitude, 1.0);
    }

    #[test]
    fn test_tap_fires_on_release() {
        let mut input = InputController::new();
        input.touch_start(7, DVec2::new(50.0, 50.0), 1000.0);
        input.touch_end(7, 1100.0);
        assert!(input.current_intent(0.0).fire);
        assert!(input.joystick_drag().is_none());
    }

    #[test]
    fn test_slow_or_moved_touch_is_not_a_tap() {
        let mut input = InputController::new();
        input.touch_start(1, DVec2::ZERO, 0.0);
        input.touch_end(1, 250.0);
        assert!(!input.current_intent(0.0).fire);

        input.touch_start(2, DVec2::ZERO, 1000.0);
        input.touch_move(2, DVec2::new(20.0, 0.0));
        input.touch_move(2, DVec2::ZERO);
        input.touch_end(2, 1050.0);
        assert!(!input.current_intent(0.0).fire);
    }

    #[test]
    fn test_second_touch_fires_rate_limited() {
        let mut input = InputController::new();
        input.touch_start(1, DVec2::ZERO, 0.0);
        input.touch_start(2, DVec2::new(300.0, 300.0), 1000.0);
        assert!(input.current_intent(0.0).fire);

        input.touch_end(2, 1050.0);
        input.touch_start(3, DVec2::new(300.0, 300.0), 1100.0);
        assert!(!input.current_intent(0.0).fire);

        input.touch_start(4, DVec2::new(300.0, 300.0), 1300.0);
        assert!(input.current_intent(0.0).fire);
    }

    #[test]
    fn test_unknown_touch_ids_ignored() {
        let mut input = InputController::new();
        input.touch_move(9, DVec2::new(10.0, 10.0));
        input.touch_end(9, 0.0);
        input.touch_cancel(9);
        assert!(input.joystick_drag().is_none());
        assert!(!input.current_intent(0.0).fire);
    }

    #[test]
    fn test_pause_request_and_reset() {
        let mut input = InputController::new();
        input.key_down(Key::Pause);
        input.key_down(Key::Up);
        input.touch_start(1, DVec2::ZERO, 0.0);
        assert!(input.take_pause_request());
        assert!(!input.take_pause_request());

        input.reset();
        assert!(input.joystick_drag().is_none());
        assert_eq!(input.current_intent(0.0).magnitude, 0.0);
    }
}
