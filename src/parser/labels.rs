use super::error::AssemblerError;
use hashbrown::HashMap;

/// Longest label accepted when strict label checking is on
pub const MAX_STRICT_LABEL_LEN: usize = 6;

/// Maps label names to the address of the line that defines them. Filled during the first pass,
/// only read during the second.
#[derive(Debug, Default)]
pub struct SymbolTable {
    labels: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines `label` at `address`. Labels are case-sensitive and may only be defined once.
    pub fn define(&mut self, label: &str, address: usize) -> Result<(), AssemblerError> {
        if let Some(&first) = self.labels.get(label) {
            return Err(AssemblerError::DuplicateLabel {
                label: label.to_owned(),
                first,
            });
        }
        self.labels.insert(label.to_owned(), address);
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied()
    }

    pub fn resolve(&self, label: &str) -> Result<usize, AssemblerError> {
        self.get(label)
            .ok_or_else(|| AssemblerError::UndefinedLabel(label.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Strict label syntax: an ASCII letter followed by ASCII alphanumerics, at most
/// [`MAX_STRICT_LABEL_LEN`] characters
pub fn validate_strict(label: &str) -> Result<(), AssemblerError> {
    let mut chars = label.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric())
        && label.len() <= MAX_STRICT_LABEL_LEN;

    if valid {
        Ok(())
    } else {
        Err(AssemblerError::InvalidLabel(label.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_resolve() {
        let mut table = SymbolTable::new();
        table.define("start", 0).unwrap();
        table.define("Start", 4).unwrap();

        assert_eq!(table.resolve("start").unwrap(), 0);
        assert_eq!(table.resolve("Start").unwrap(), 4);
        assert!(matches!(
            table.resolve("START"),
            Err(AssemblerError::UndefinedLabel(l)) if l == "START"
        ));
    }

    #[test]
    fn test_duplicate() {
        let mut table = SymbolTable::new();
        table.define("loop", 2).unwrap();
        let err = table.define("loop", 9).unwrap_err();
        assert!(matches!(
            err,
            AssemblerError::DuplicateLabel { label, first: 2 } if label == "loop"
        ));
        // the first definition wins
        assert_eq!(table.get("loop"), Some(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_strict_labels() {
        assert!(validate_strict("loop").is_ok());
        assert!(validate_strict("a1b2c3").is_ok());
        assert!(validate_strict("toolong").is_err());
        assert!(validate_strict("1abc").is_err());
        assert!(validate_strict("my_lb").is_err());
        assert!(validate_strict("").is_err());
    }
}
