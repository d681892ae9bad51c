//! Per-machine register file.

use std::collections::BTreeMap;

use crate::core::instruction::{Register, Value};

/// Register bank owned by a single machine.
///
/// Every register reads as `0` until it is first written. Reads never insert,
/// so [`RegisterBank::iter`] only yields registers that were actually written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterBank {
    cells: BTreeMap<Register, i64>,
}

impl RegisterBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, register: Register) -> i64 {
        self.cells.get(&register).copied().unwrap_or(0)
    }

    pub fn set(&mut self, register: Register, value: i64) {
        self.cells.insert(register, value);
    }

    /// Resolve an operand: registers are read, immediates pass through.
    pub fn resolve(&self, value: Value) -> i64 {
        match value {
            Value::Register(register) => self.get(register),
            Value::Immediate(n) => n,
        }
    }

    /// Written registers in name order.
    pub fn iter(&self) -> impl Iterator<Item = (Register, i64)> + '_ {
        self.cells.iter().map(|(register, value)| (*register, *value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(name: char) -> Register {
        Register::new(name).expect("register")
    }

    #[test]
    fn unwritten_register_reads_zero_without_inserting() {
        let bank = RegisterBank::new();
        assert_eq!(bank.get(reg('q')), 0);
        assert_eq!(bank.iter().count(), 0);
    }

    #[test]
    fn resolve_reads_registers_and_passes_immediates() {
        let mut bank = RegisterBank::new();
        bank.set(reg('a'), -12);
        assert_eq!(bank.resolve(Value::Register(reg('a'))), -12);
        assert_eq!(bank.resolve(Value::Register(reg('b'))), 0);
        assert_eq!(bank.resolve(Value::Immediate(99)), 99);
    }

    #[test]
    fn iter_is_ordered_by_name() {
        let mut bank = RegisterBank::new();
        bank.set(reg('z'), 1);
        bank.set(reg('a'), 2);
        let names: Vec<char> = bank.iter().map(|(register, _)| register.name()).collect();
        assert_eq!(names, vec!['a', 'z']);
    }
}
