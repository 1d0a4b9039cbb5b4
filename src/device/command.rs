use std::fmt;

/// One of the fixed motion instructions understood by the vehicle. Each is sent as a
/// single ASCII byte over the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionCommand {
    Forward,
    Left,
    Stop,
    Right,
    Reverse,
}

/// Pad order: START, then LEFT / STOP / RIGHT, then REVERSE.
pub const MOTION_COMMANDS: [MotionCommand; 5] = [
    MotionCommand::Forward,
    MotionCommand::Left,
    MotionCommand::Stop,
    MotionCommand::Right,
    MotionCommand::Reverse,
];

impl MotionCommand {
    pub fn byte(self) -> u8 {
        match self {
            MotionCommand::Stop => b'0',
            MotionCommand::Forward => b'1',
            MotionCommand::Left => b'2',
            MotionCommand::Right => b'3',
            MotionCommand::Reverse => b'4',
        }
    }

    /// Caption shown on the motion pad.
    pub fn label(self) -> &'static str {
        match self {
            MotionCommand::Forward => "START",
            MotionCommand::Left => "LEFT",
            MotionCommand::Stop => "STOP",
            MotionCommand::Right => "RIGHT",
            MotionCommand::Reverse => "REVERSE",
        }
    }
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = match self {
            MotionCommand::Forward => "forward",
            MotionCommand::Left => "left",
            MotionCommand::Stop => "stop",
            MotionCommand::Right => "right",
            MotionCommand::Reverse => "reverse",
        };

        write!(f, "{}", result)
    }
}
