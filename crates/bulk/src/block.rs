use crate::Statement;
use core::fmt;
use std::sync::Arc;

/// An ordered group of statements delivered to subscribers as one unit.
///
/// While the segmenter is still accumulating, it owns the block by value. On
/// delivery the block is moved out and subscribers only ever see it closed.
/// Cloning is cheap: statements are shared, not copied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Block {
    statements: Vec<Arc<Statement>>,
}

impl Block {
    pub const fn new() -> Self {
        Self {
            statements: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, statement: Arc<Statement>) {
        self.statements.push(statement);
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn statements(&self) -> &[Arc<Statement>] {
        &self.statements
    }

    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().map(AsRef::as_ref)
    }

    /// Statement texts in block order.
    pub fn texts(&self) -> Vec<&str> {
        self.iter().map(Statement::text).collect()
    }
}

impl FromIterator<Arc<Statement>> for Block {
    fn from_iter<I: IntoIterator<Item = Arc<Statement>>>(iter: I) -> Self {
        Self {
            statements: iter.into_iter().collect(),
        }
    }
}

/// Renders `a, b, c`.
impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(statement.text())?;
        }
        Ok(())
    }
}
