use log::warn;
use nalgebra::Vector2;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, NativeKeyCode, PhysicalKey};

const NUM_KEYS: usize = 194;
const NUM_MOUSE_BUTTONS: usize = 5;

const MOUSE_SENSITIVITY: f64 = 0.002;

#[derive(Copy, Clone, PartialEq, Debug)]
enum KeyState {
    Released,
    Pressed,
    Repeat,
    JustReleased,
}

impl KeyState {
    fn is_down(self) -> bool {
        self == Self::Pressed || self == Self::Repeat
    }

    fn next(self, event: ElementState) -> Self {
        match (event, self.is_down()) {
            (ElementState::Pressed, true) => Self::Repeat,
            (ElementState::Pressed, false) => Self::Pressed,
            (ElementState::Released, true) => Self::JustReleased,
            (ElementState::Released, false) => Self::Released,
        }
    }
}

/// Keyboard and mouse state polled once per frame by the camera and the scene driver.
#[derive(Debug)]
pub struct Input {
    key_states: [KeyState; NUM_KEYS],
    mouse_button_states: [KeyState; NUM_MOUSE_BUTTONS],
    device_offset: Vector2<f32>,
    mouse_on_window: bool,
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

impl Input {
    pub fn new() -> Self {
        Self {
            key_states: [KeyState::Released; NUM_KEYS],
            mouse_button_states: [KeyState::Released; NUM_MOUSE_BUTTONS],
            device_offset: Vector2::zeros(),
            mouse_on_window: false,
        }
    }

    pub fn key_pressed(&self, key_code: KeyCode) -> bool {
        self.key_state(key_code) == KeyState::Pressed
    }

    pub fn key_down(&self, key_code: KeyCode) -> bool {
        self.key_state(key_code).is_down()
    }

    pub fn key_just_released(&self, key_code: KeyCode) -> bool {
        self.key_state(key_code) == KeyState::JustReleased
    }

    pub fn mouse_button_down(&self, mouse_button: MouseButton) -> bool {
        Self::mouse_button_to_index(mouse_button)
            .is_some_and(|index| self.mouse_button_states[index].is_down())
    }

    pub fn mouse_button_just_released(&self, mouse_button: MouseButton) -> bool {
        Self::mouse_button_to_index(mouse_button)
            .is_some_and(|index| self.mouse_button_states[index] == KeyState::JustReleased)
    }

    /// Raw mouse motion since the last frame, scaled by the sensitivity.
    pub fn device_offset(&self) -> Vector2<f32> {
        self.device_offset
    }

    pub fn mouse_on_window(&self) -> bool {
        self.mouse_on_window
    }

    /// Call at the end of every frame.
    pub fn reset_internal_state(&mut self) {
        self.key_states
            .iter_mut()
            .chain(self.mouse_button_states.iter_mut())
            .filter(|state| **state == KeyState::JustReleased)
            .for_each(|state| *state = KeyState::Released);

        self.device_offset = Vector2::zeros();
    }

    pub fn process_window_event(&mut self, window_event: &WindowEvent) {
        match window_event {
            WindowEvent::KeyboardInput { event, .. } => self.process_key_event(event),
            WindowEvent::MouseInput { state, button, .. } => {
                self.process_mouse_button_event(*button, *state)
            }
            WindowEvent::CursorEntered { .. } => self.mouse_on_window = true,
            WindowEvent::CursorLeft { .. } => self.mouse_on_window = false,
            WindowEvent::Focused(false) => self.release_all(),
            _ => (),
        };
    }

    pub fn process_device_event(&mut self, device_event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = device_event {
            self.device_offset += Vector2::new(
                (delta.0 * MOUSE_SENSITIVITY) as f32,
                (delta.1 * MOUSE_SENSITIVITY) as f32,
            );
        }
    }

    pub(crate) fn set_key_state(&mut self, key_code: KeyCode, state: ElementState) {
        if let Some(key_state) = self.key_states.get_mut(key_code as usize) {
            *key_state = key_state.next(state);
        }
    }

    fn key_state(&self, key_code: KeyCode) -> KeyState {
        self.key_states
            .get(key_code as usize)
            .copied()
            .unwrap_or(KeyState::Released)
    }

    fn release_all(&mut self) {
        self.key_states
            .iter_mut()
            .chain(self.mouse_button_states.iter_mut())
            .for_each(|state| *state = state.next(ElementState::Released));
    }

    fn process_key_event(&mut self, key_event: &KeyEvent) {
        match key_event.physical_key {
            PhysicalKey::Code(key_code) => self.set_key_state(key_code, key_event.state),
            PhysicalKey::Unidentified(native_key_code) => {
                let (platform, code) = match native_key_code {
                    NativeKeyCode::Windows(code) => ("Windows", code as u32),
                    NativeKeyCode::MacOS(code) => ("MacOS", code as u32),
                    NativeKeyCode::Android(code) => ("Android", code),
                    NativeKeyCode::Xkb(code) => ("XKB", code),
                    NativeKeyCode::Unidentified => {
                        warn!("Unidentified key event received");
                        return;
                    }
                };

                warn!("Unidentified {} key event {}", platform, code)
            }
        }
    }

    fn process_mouse_button_event(&mut self, button: MouseButton, state: ElementState) {
        match Self::mouse_button_to_index(button) {
            Some(index) => {
                let button_state = &mut self.mouse_button_states[index];
                *button_state = button_state.next(state);
            }
            None => warn!("Unidentified mouse button event received {:?}", button),
        }
    }

    fn mouse_button_to_index(button: MouseButton) -> Option<usize> {
        match button {
            MouseButton::Left => Some(0),
            MouseButton::Right => Some(1),
            MouseButton::Middle => Some(2),
            MouseButton::Back => Some(3),
            MouseButton::Forward => Some(4),
            MouseButton::Other(_) => None,
        }
    }
}
