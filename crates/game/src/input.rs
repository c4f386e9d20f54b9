//! Player input handling.
//!
//! Raw input (keys, mouse) is converted into a [`PlayerCommand`] that the
//! player controller consumes once per tick.

use serde::{Deserialize, Serialize};

/// Raw player input for a single tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement keys pressed.
    pub movement: MovementInput,

    /// Mouse delta this tick (pixels).
    pub mouse_delta: (f32, f32),

    /// Action buttons pressed.
    pub actions: ActionInput,
}

/// Movement key states.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Action button states.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActionInput {
    /// Fire the hitscan-speed bullet.
    pub fire: bool,
    /// Fire a rocket.
    pub alt_fire: bool,
    pub jump: bool,
    pub sprint: bool,
}

/// Button bits carried by a [`PlayerCommand`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandButtons(pub u8);

impl CommandButtons {
    pub const FIRE: u8 = 1 << 0;
    pub const ALT_FIRE: u8 = 1 << 1;
    pub const JUMP: u8 = 1 << 2;
    pub const SPRINT: u8 = 1 << 3;

    /// Mark a button as held.
    #[inline]
    pub fn press(&mut self, button: u8) {
        self.0 |= button;
    }

    /// Check if a button is held.
    #[inline]
    pub fn pressed(self, button: u8) -> bool {
        (self.0 & button) != 0
    }
}

/// Movement intent for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerCommand {
    /// -1 (back) to 1 (forward).
    pub forward_move: f32,

    /// -1 (left) to 1 (right).
    pub right_move: f32,

    /// Change in (pitch, yaw), radians.
    pub view_delta: (f32, f32),

    pub buttons: CommandButtons,
}

impl PlayerCommand {
    #[inline]
    pub fn wants_jump(&self) -> bool {
        self.buttons.pressed(CommandButtons::JUMP)
    }

    #[inline]
    pub fn wants_sprint(&self) -> bool {
        self.buttons.pressed(CommandButtons::SPRINT)
    }

    #[inline]
    pub fn wants_fire(&self) -> bool {
        self.buttons.pressed(CommandButtons::FIRE)
    }

    #[inline]
    pub fn wants_alt_fire(&self) -> bool {
        self.buttons.pressed(CommandButtons::ALT_FIRE)
    }
}

impl PlayerInput {
    /// Convert to a movement command.
    ///
    /// # Arguments
    ///
    /// * `mouse_sensitivity` - Mouse sensitivity multiplier
    pub fn to_command(&self, mouse_sensitivity: f32) -> PlayerCommand {
        let mut cmd = PlayerCommand::default();

        if self.movement.forward {
            cmd.forward_move += 1.0;
        }
        if self.movement.backward {
            cmd.forward_move -= 1.0;
        }
        if self.movement.right {
            cmd.right_move += 1.0;
        }
        if self.movement.left {
            cmd.right_move -= 1.0;
        }

        // Normalize diagonal movement
        let move_magnitude = (cmd.forward_move.powi(2) + cmd.right_move.powi(2)).sqrt();
        if move_magnitude > 1.0 {
            cmd.forward_move /= move_magnitude;
            cmd.right_move /= move_magnitude;
        }

        // Mouse right turns right, which is a decreasing yaw about +Z.
        let sensitivity_radians = mouse_sensitivity * 0.001;
        cmd.view_delta = (
            -self.mouse_delta.1 * sensitivity_radians,
            -self.mouse_delta.0 * sensitivity_radians,
        );

        if self.actions.fire {
            cmd.buttons.press(CommandButtons::FIRE);
        }
        if self.actions.alt_fire {
            cmd.buttons.press(CommandButtons::ALT_FIRE);
        }
        if self.actions.jump {
            cmd.buttons.press(CommandButtons::JUMP);
        }
        if self.actions.sprint {
            cmd.buttons.press(CommandButtons::SPRINT);
        }

        cmd
    }

    /// Check if any movement input is active.
    pub fn has_movement(&self) -> bool {
        self.movement.forward || self.movement.backward || self.movement.left || self.movement.right
    }
}
