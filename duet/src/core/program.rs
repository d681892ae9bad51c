//! Immutable, shareable instruction sequence.

use std::sync::Arc;

use thiserror::Error;

use crate::core::instruction::{DecodeError, Instruction};

/// Line-level decode failure while loading a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid instruction on line {line}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    #[source]
    pub source: DecodeError,
}

/// Ordered instructions shared read-only by every machine that runs them.
///
/// Cloning is cheap: clones share the same backing slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Arc<[Instruction]>,
}

impl Program {
    /// Decode one instruction per line. Stops at the first malformed line.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let instructions = text
            .lines()
            .enumerate()
            .map(|(index, line)| {
                line.parse::<Instruction>().map_err(|source| ParseError {
                    line: index + 1,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from(instructions))
    }

    /// Instruction at `pc`, or `None` when `pc` lies outside the program.
    pub fn get(&self, pc: i64) -> Option<&Instruction> {
        usize::try_from(pc)
            .ok()
            .and_then(|index| self.instructions.get(index))
    }

    pub fn contains(&self, pc: i64) -> bool {
        self.get(pc).is_some()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }
}

impl From<Vec<Instruction>> for Program {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions: instructions.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{PAIR_EXAMPLE, SOUND_EXAMPLE};

    #[test]
    fn parses_fixture_programs() {
        assert_eq!(Program::parse(SOUND_EXAMPLE).expect("parse").len(), 10);
        assert_eq!(Program::parse(PAIR_EXAMPLE).expect("parse").len(), 7);
    }

    #[test]
    fn reports_one_based_line_of_first_failure() {
        let err = Program::parse("set a 1\nadd a 2\nnop\nbad a").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.source, DecodeError::UnknownOpcode("nop".to_string()));
    }

    #[test]
    fn blank_line_is_rejected() {
        let err = Program::parse("snd 1\n\nrcv a\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.source, DecodeError::Empty);
    }

    #[test]
    fn trailing_newline_is_accepted() {
        let program = Program::parse("snd 1\nrcv a\n").expect("parse");
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn get_rejects_negative_and_past_end() {
        let program = Program::parse("snd 1\nrcv a").expect("parse");
        assert!(program.get(-1).is_none());
        assert!(program.get(2).is_none());
        assert!(program.contains(0));
        assert!(program.contains(1));
    }

    #[test]
    fn clones_share_instructions() {
        let program = Program::parse(PAIR_EXAMPLE).expect("parse");
        let clone = program.clone();
        assert!(Arc::ptr_eq(&program.instructions, &clone.instructions));
    }
}
