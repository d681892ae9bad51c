//! Decoded instruction set for duet assembly.
//!
//! Every line of a program decodes into one [`Instruction`]. Operand kinds are
//! fixed at decode time, so execution never has to re-inspect raw tokens.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Single-letter register name (`a` through `z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Register(char);

impl Register {
    /// Register preloaded with the program id in paired mode.
    pub const PROGRAM_ID: Register = Register('p');

    /// Returns `None` unless `name` is a lowercase ASCII letter.
    pub fn new(name: char) -> Option<Self> {
        name.is_ascii_lowercase().then_some(Self(name))
    }

    pub fn name(self) -> char {
        self.0
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source operand: either a register read or an integer constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Register(Register),
    Immediate(i64),
}

impl Value {
    fn decode(token: &str) -> Result<Self, DecodeError> {
        if let Ok(n) = token.parse::<i64>() {
            return Ok(Value::Immediate(n));
        }
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(name), None) => Register::new(name)
                .map(Value::Register)
                .ok_or_else(|| DecodeError::InvalidOperand(token.to_string())),
            _ => Err(DecodeError::InvalidOperand(token.to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Register(register) => write!(f, "{register}"),
            Value::Immediate(n) => write!(f, "{n}"),
        }
    }
}

/// Instruction mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Snd,
    Set,
    Add,
    Mul,
    Mod,
    Rcv,
    Jgz,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Snd => "snd",
            Opcode::Set => "set",
            Opcode::Add => "add",
            Opcode::Mul => "mul",
            Opcode::Mod => "mod",
            Opcode::Rcv => "rcv",
            Opcode::Jgz => "jgz",
        }
    }

    /// Number of operands the opcode takes.
    pub fn arity(self) -> usize {
        match self {
            Opcode::Snd | Opcode::Rcv => 1,
            Opcode::Set | Opcode::Add | Opcode::Mul | Opcode::Mod | Opcode::Jgz => 2,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl FromStr for Opcode {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snd" => Ok(Opcode::Snd),
            "set" => Ok(Opcode::Set),
            "add" => Ok(Opcode::Add),
            "mul" => Ok(Opcode::Mul),
            "mod" => Ok(Opcode::Mod),
            "rcv" => Ok(Opcode::Rcv),
            "jgz" => Ok(Opcode::Jgz),
            other => Err(DecodeError::UnknownOpcode(other.to_string())),
        }
    }
}

/// One decoded program line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Snd(Value),
    Set(Register, Value),
    Add(Register, Value),
    Mul(Register, Value),
    Mod(Register, Value),
    Rcv(Register),
    Jgz(Value, Value),
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Snd(_) => Opcode::Snd,
            Instruction::Set(..) => Opcode::Set,
            Instruction::Add(..) => Opcode::Add,
            Instruction::Mul(..) => Opcode::Mul,
            Instruction::Mod(..) => Opcode::Mod,
            Instruction::Rcv(_) => Opcode::Rcv,
            Instruction::Jgz(..) => Opcode::Jgz,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opcode = self.opcode();
        match self {
            Instruction::Snd(x) => write!(f, "{opcode} {x}"),
            Instruction::Rcv(r) => write!(f, "{opcode} {r}"),
            Instruction::Set(r, y)
            | Instruction::Add(r, y)
            | Instruction::Mul(r, y)
            | Instruction::Mod(r, y) => write!(f, "{opcode} {r} {y}"),
            Instruction::Jgz(x, y) => write!(f, "{opcode} {x} {y}"),
        }
    }
}

impl FromStr for Instruction {
    type Err = DecodeError;

    /// Decode `opcode operand1 [operand2]`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let opcode: Opcode = tokens.next().ok_or(DecodeError::Empty)?.parse()?;
        let operands: Vec<&str> = tokens.collect();
        if operands.len() != opcode.arity() {
            return Err(DecodeError::Arity {
                opcode,
                expected: opcode.arity(),
                found: operands.len(),
            });
        }

        let value = |index: usize| Value::decode(operands[index]);
        let register = |index: usize| -> Result<Register, DecodeError> {
            match Value::decode(operands[index])? {
                Value::Register(register) => Ok(register),
                Value::Immediate(_) => Err(DecodeError::ExpectedRegister {
                    opcode,
                    token: operands[index].to_string(),
                }),
            }
        };

        let instruction = match opcode {
            Opcode::Snd => Instruction::Snd(value(0)?),
            Opcode::Set => Instruction::Set(register(0)?, value(1)?),
            Opcode::Add => Instruction::Add(register(0)?, value(1)?),
            Opcode::Mul => Instruction::Mul(register(0)?, value(1)?),
            Opcode::Mod => Instruction::Mod(register(0)?, value(1)?),
            Opcode::Rcv => Instruction::Rcv(register(0)?),
            Opcode::Jgz => Instruction::Jgz(value(0)?, value(1)?),
        };
        Ok(instruction)
    }
}

/// Reasons a single line fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty instruction")]
    Empty,
    #[error("unknown opcode `{0}`")]
    UnknownOpcode(String),
    #[error("`{opcode}` takes {expected} operand(s), found {found}")]
    Arity {
        opcode: Opcode,
        expected: usize,
        found: usize,
    },
    #[error("operand `{0}` is neither a register nor an integer")]
    InvalidOperand(String),
    #[error("`{opcode}` writes its first operand, so it must be a register, got `{token}`")]
    ExpectedRegister { opcode: Opcode, token: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(name: char) -> Register {
        Register::new(name).expect("register")
    }

    #[test]
    fn decodes_register_and_immediate_operands() {
        let instruction: Instruction = "add a b".parse().expect("decode");
        assert_eq!(
            instruction,
            Instruction::Add(reg('a'), Value::Register(reg('b')))
        );

        let instruction: Instruction = "jgz 1 -2".parse().expect("decode");
        assert_eq!(
            instruction,
            Instruction::Jgz(Value::Immediate(1), Value::Immediate(-2))
        );
    }

    #[test]
    fn accepts_plus_signed_immediates() {
        let instruction: Instruction = "set x +7".parse().expect("decode");
        assert_eq!(instruction, Instruction::Set(reg('x'), Value::Immediate(7)));
    }

    #[test]
    fn snd_accepts_immediate_operand() {
        let instruction: Instruction = "snd 5".parse().expect("decode");
        assert_eq!(instruction, Instruction::Snd(Value::Immediate(5)));
    }

    #[test]
    fn rejects_unknown_opcode() {
        let err = "jnz a 2".parse::<Instruction>().unwrap_err();
        assert_eq!(err, DecodeError::UnknownOpcode("jnz".to_string()));
    }

    #[test]
    fn rejects_wrong_arity() {
        let err = "set a".parse::<Instruction>().unwrap_err();
        assert_eq!(
            err,
            DecodeError::Arity {
                opcode: Opcode::Set,
                expected: 2,
                found: 1,
            }
        );

        let err = "rcv a b".parse::<Instruction>().unwrap_err();
        assert!(matches!(err, DecodeError::Arity { found: 2, .. }));
    }

    #[test]
    fn rejects_immediate_destination() {
        for line in ["set 1 2", "add 3 a", "mul 0 0", "mod 4 2", "rcv 5"] {
            let err = line.parse::<Instruction>().unwrap_err();
            assert!(
                matches!(err, DecodeError::ExpectedRegister { .. }),
                "{line}: {err}"
            );
        }
    }

    #[test]
    fn rejects_malformed_operands() {
        for token in ["ab", "A", "1x", "_"] {
            let line = format!("snd {token}");
            let err = line.parse::<Instruction>().unwrap_err();
            assert_eq!(err, DecodeError::InvalidOperand(token.to_string()));
        }
    }

    #[test]
    fn rejects_empty_line() {
        assert_eq!("   ".parse::<Instruction>().unwrap_err(), DecodeError::Empty);
    }

    #[test]
    fn display_renders_canonical_text() {
        let instruction: Instruction = "mod  a   -5".parse().expect("decode");
        assert_eq!(instruction.to_string(), "mod a -5");
        let instruction: Instruction = "rcv z".parse().expect("decode");
        assert_eq!(instruction.to_string(), "rcv z");
    }
}
