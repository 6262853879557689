use core::fmt;

use ufmt::derive::uDebug;

/// Longest command line the tokenizer will buffer, `t f 100` and friends fit comfortably
pub const LINE_BUFFER_SIZE: usize = 16;

#[derive(uDebug, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElevatorDirection {
    Up,
    Center,
    Down,
}

impl ElevatorDirection {
    pub fn from_letter(letter: u8) -> Option<Self> {
        match letter {
            b'u' => Some(Self::Up),
            b'c' => Some(Self::Center),
            b'd' => Some(Self::Down),
            _ => None,
        }
    }
    pub fn letter(self) -> char {
        match self {
            Self::Up => 'u',
            Self::Center => 'c',
            Self::Down => 'd',
        }
    }
}

#[derive(uDebug, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RudderDirection {
    Left,
    Center,
    Right,
}

impl RudderDirection {
    pub fn from_letter(letter: u8) -> Option<Self> {
        match letter {
            b'l' => Some(Self::Left),
            b'c' => Some(Self::Center),
            b'r' => Some(Self::Right),
            _ => None,
        }
    }
    pub fn letter(self) -> char {
        match self {
            Self::Left => 'l',
            Self::Center => 'c',
            Self::Right => 'r',
        }
    }
}

#[derive(uDebug, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThrottleDirection {
    Forward,
    Reverse,
}

impl ThrottleDirection {
    pub fn from_letter(letter: u8) -> Option<Self> {
        match letter {
            b'f' => Some(Self::Forward),
            b'r' => Some(Self::Reverse),
            _ => None,
        }
    }
    pub fn letter(self) -> char {
        match self {
            Self::Forward => 'f',
            Self::Reverse => 'r',
        }
    }
}

/// One decoded remote command. Deflections are degrees, speed is a percentage.
/// Values are carried exactly as received, clamping is left to whoever acts on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Hail,
    Status,
    Elevators {
        direction: ElevatorDirection,
        deflection: u8,
    },
    Rudder {
        direction: RudderDirection,
        deflection: u8,
    },
    Throttle {
        direction: ThrottleDirection,
        speed: u8,
    },
    Instruments {
        id: char,
    },
    Autopilot {
        mode: char,
    },
}

/// Writes the command in the same form [parse_line] reads
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Hail => write!(f, "h"),
            Command::Status => write!(f, "s"),
            Command::Elevators {
                direction,
                deflection,
            } => write!(f, "e {} {}", direction.letter(), deflection),
            Command::Rudder {
                direction,
                deflection,
            } => write!(f, "r {} {}", direction.letter(), deflection),
            Command::Throttle { direction, speed } => {
                write!(f, "t {} {}", direction.letter(), speed)
            }
            Command::Instruments { id } => write!(f, "i {}", id),
            Command::Autopilot { mode } => write!(f, "a {}", mode),
        }
    }
}

#[derive(uDebug, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnknownCommand,
    MissingDirection,
    InvalidDirection,
    MissingValue,
    MissingId,
    TrailingInput,
    Overflow,
}

struct Tokens<'a> {
    rest: &'a [u8],
}

impl<'a> Tokens<'a> {
    fn skip_spaces(&mut self) {
        while let Some((b' ', rest)) = self.rest.split_first() {
            self.rest = rest;
        }
    }
    fn letter(&mut self) -> Option<u8> {
        self.skip_spaces();
        let (letter, rest) = self.rest.split_first()?;
        self.rest = rest;
        Some(*letter)
    }
    /// Decimal number saturating at 255
    fn number(&mut self) -> Option<u8> {
        self.skip_spaces();
        let digits = self.rest.iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return None;
        }
        let mut value: u16 = 0;
        for digit in &self.rest[..digits] {
            value = (value * 10 + (digit - b'0') as u16).min(u8::MAX as u16);
        }
        self.rest = &self.rest[digits..];
        Some(value as u8)
    }
    fn finish(mut self, command: Command) -> Result<Command, ParseError> {
        self.skip_spaces();
        if self.rest.is_empty() {
            Ok(command)
        } else {
            Err(ParseError::TrailingInput)
        }
    }
}

/// Tokenizes one command line (without its line ending)
pub fn parse_line(line: &[u8]) -> Result<Command, ParseError> {
    let mut tokens = Tokens { rest: line };
    let command = match tokens.letter().ok_or(ParseError::Empty)? {
        b'h' => Command::Hail,
        b's' => Command::Status,
        b'e' => {
            let letter = tokens.letter().ok_or(ParseError::MissingDirection)?;
            let direction =
                ElevatorDirection::from_letter(letter).ok_or(ParseError::InvalidDirection)?;
            let deflection = tokens.number().ok_or(ParseError::MissingValue)?;
            Command::Elevators {
                direction,
                deflection,
            }
        }
        b'r' => {
            let letter = tokens.letter().ok_or(ParseError::MissingDirection)?;
            let direction =
                RudderDirection::from_letter(letter).ok_or(ParseError::InvalidDirection)?;
            let deflection = tokens.number().ok_or(ParseError::MissingValue)?;
            Command::Rudder {
                direction,
                deflection,
            }
        }
        b't' => {
            let letter = tokens.letter().ok_or(ParseError::MissingDirection)?;
            let direction =
                ThrottleDirection::from_letter(letter).ok_or(ParseError::InvalidDirection)?;
            let speed = tokens.number().ok_or(ParseError::MissingValue)?;
            Command::Throttle { direction, speed }
        }
        b'i' => Command::Instruments {
            id: tokens.letter().ok_or(ParseError::MissingId)? as char,
        },
        b'a' => Command::Autopilot {
            mode: tokens.letter().ok_or(ParseError::MissingId)? as char,
        },
        _ => return Err(ParseError::UnknownCommand),
    };
    tokens.finish(command)
}

/// Accumulates serial bytes into lines and tokenizes each completed line
pub struct CommandParser {
    buffer: [u8; LINE_BUFFER_SIZE],
    len: usize,
    overflowed: bool,
}

impl CommandParser {
    pub const fn new() -> Self {
        Self {
            buffer: [0u8; LINE_BUFFER_SIZE],
            len: 0,
            overflowed: false,
        }
    }

    /// Feeds one byte. Returns a result once a non-empty line has been terminated by `\n`
    pub fn push(&mut self, byte: u8) -> Option<Result<Command, ParseError>> {
        match byte {
            b'\r' => None,
            b'\n' => {
                let result = if self.overflowed {
                    Some(Err(ParseError::Overflow))
                } else if self.len == 0 {
                    None
                } else {
                    Some(parse_line(&self.buffer[..self.len]))
                };
                self.len = 0;
                self.overflowed = false;
                result
            }
            _ => {
                if self.len < LINE_BUFFER_SIZE {
                    self.buffer[self.len] = byte;
                    self.len += 1;
                } else {
                    self.overflowed = true;
                }
                None
            }
        }
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}
