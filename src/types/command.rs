//! Pre-parsed form of a script line

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text colour understood by `say`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    Black,
    Blue,
    Green,
    Aqua,
    Red,
    Purple,
    Yellow,
    #[default]
    White,
}

impl FromStr for TextColor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "black" => Ok(Self::Black),
            "blue" => Ok(Self::Blue),
            "green" => Ok(Self::Green),
            "aqua" => Ok(Self::Aqua),
            "red" => Ok(Self::Red),
            "purple" => Ok(Self::Purple),
            "yellow" => Ok(Self::Yellow),
            "white" => Ok(Self::White),
            _ => Err(()),
        }
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Black => "black",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Aqua => "aqua",
            Self::Red => "red",
            Self::Purple => "purple",
            Self::Yellow => "yellow",
            Self::White => "white",
        };
        f.write_str(name)
    }
}

/// Default per-line presentation time for `say`, in seconds
pub const DEFAULT_SAY_SECONDS: f64 = 0.5;

/// Arguments of `say`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SayArgs {
    /// Raw text, `${name}` placeholders not yet resolved
    pub text: String,
    pub color: TextColor,
    pub seconds: f64,
}

impl Default for SayArgs {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: TextColor::default(),
            seconds: DEFAULT_SAY_SECONDS,
        }
    }
}

/// Assignment operator of `set`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetOp {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl FromStr for SetOp {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Self::Assign),
            "+=" => Ok(Self::Add),
            "-=" => Ok(Self::Subtract),
            "*=" => Ok(Self::Multiply),
            "/=" => Ok(Self::Divide),
            _ => Err(()),
        }
    }
}

/// One option of `choose`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Jump target taken when this option is picked
    pub label: String,
    /// Text shown to the player and recorded in the choice history
    pub text: String,
}

/// A script line, classified by its first token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Blank line
    Empty,
    /// `//` or `#` comment
    Comment,
    /// `name:` declaration
    Label { name: String },
    End,
    EndName { name: String },
    Wait { millis: u64 },
    Say(SayArgs),
    /// Legacy: show an integer variable
    SayVar {
        name: String,
        color: TextColor,
        seconds: f64,
    },
    Input { prompt: String, var: String },
    Show { file: String },
    Choose { options: Vec<ChoiceOption> },
    Clear,
    Random { var: String, min: i64, max: i64 },
    Set { var: String, op: SetOp, value: i64 },
    Jump { target: String },
    If { condition: String, target: String },
    Plugin { name: String, args: String },
    Use { name: String, version: Option<String> },
    Unknown { command: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_parse_and_display() {
        for name in ["black", "blue", "green", "aqua", "red", "purple", "yellow", "white"] {
            let color: TextColor = name.parse().unwrap();
            assert_eq!(color.to_string(), name);
        }
        assert!("magenta".parse::<TextColor>().is_err());
    }

    #[test]
    fn colors_ignore_case() {
        assert_eq!("RED".parse::<TextColor>(), Ok(TextColor::Red));
        assert_eq!("Aqua".parse::<TextColor>(), Ok(TextColor::Aqua));
    }

    #[test]
    fn set_operators() {
        assert_eq!("+=".parse::<SetOp>(), Ok(SetOp::Add));
        assert_eq!("/=".parse::<SetOp>(), Ok(SetOp::Divide));
        assert!("%=".parse::<SetOp>().is_err());
    }
}
