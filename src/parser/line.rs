//! Splits one line of source into its label, mnemonic and operands.

/// Everything after this character is a comment
pub const COMMENT: char = ';';

/// The eight instructions plus `.fill`. A first token that is one of these is a mnemonic,
/// anything else is a label.
pub const MNEMONICS: [&str; 9] = [
    "add", "nand", "lw", "sw", "beq", "jalr", "halt", "noop", ".fill",
];

/// At most this many operands are kept, extra tokens are ignored
pub const MAX_OPERANDS: usize = 3;

pub fn is_mnemonic(token: &str) -> bool {
    MNEMONICS.contains(&token)
}

/// One source line, split into tokens. A blank or comment-only line gives the empty
/// `ParsedLine`, which still takes up an address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLine {
    pub label: Option<String>,
    pub mnemonic: String,
    pub operands: Vec<String>,
}

impl ParsedLine {
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.mnemonic.is_empty()
    }

    pub fn operand(&self, i: usize) -> Option<&str> {
        self.operands.get(i).map(String::as_str)
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT) {
        Some(i) => &line[..i],
        None => line,
    }
}

/// `[label] mnemonic [op0 [op1 [op2]]] [; comment]`
///
/// Label syntax isn't checked here. A line holding only a label gets an empty mnemonic, which the
/// encoder later rejects.
pub fn parse_line(line: &str) -> ParsedLine {
    let mut tokens = strip_comment(line).split_whitespace();

    let first = match tokens.next() {
        Some(t) => t,
        None => return ParsedLine::default(),
    };

    let (label, mnemonic) = if is_mnemonic(first) {
        (None, first.to_owned())
    } else {
        let mnemonic = tokens.next().unwrap_or_default().to_owned();
        (Some(first.to_owned()), mnemonic)
    };

    let operands = tokens.take(MAX_OPERANDS).map(str::to_owned).collect();

    ParsedLine {
        label,
        mnemonic,
        operands,
    }
}
