//! Binary-operator precedence table.

use rustc_hash::FxHashMap;

/// Mapping from operator character to precedence.
///
/// Only positive precedences are stored; a missing entry means "not a
/// binary operator". The table is seeded with the built-in operators and
/// extended when a user-defined binary operator is lowered.
#[derive(Debug, Clone)]
pub struct OperatorTable {
    precedence: FxHashMap<char, i32>,
}

impl OperatorTable {
    pub fn new() -> Self {
        let mut precedence = FxHashMap::default();
        precedence.insert('=', 2);
        precedence.insert('<', 10);
        precedence.insert('+', 20);
        precedence.insert('-', 20);
        precedence.insert('*', 40);
        precedence.insert('/', 40);
        OperatorTable { precedence }
    }

    /// Precedence of `op`, if it is a declared binary operator.
    pub fn precedence(&self, op: char) -> Option<i32> {
        self.precedence.get(&op).copied().filter(|p| *p > 0)
    }

    /// Declare (or re-declare) a binary operator.
    pub fn define(&mut self, op: char, precedence: i32) {
        debug_assert!(precedence > 0, "operator precedence must be positive");
        self.precedence.insert(op, precedence);
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        OperatorTable::new()
    }
}
