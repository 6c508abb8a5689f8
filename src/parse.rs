//! Parse path-description strings into command tokens.
//!
//! The pest grammar (`pathdata.pest`) is permissive: garbage bytes are
//! skipped, so this stage cannot fail on malformed input - it just
//! produces fewer tokens. Semantic validation (argument arity, command
//! vocabulary) happens in the geometry builder.

use pest::Parser;

use crate::log::warn;
use crate::{PathdataParser, Rule};

/// One `(command, numbers)` pair from a path description.
#[derive(Debug, Clone, PartialEq)]
pub struct PathToken {
    /// The command letter, case preserved (uppercase = absolute).
    pub cmd: char,
    pub args: Vec<f64>,
}

/// Tokenize a path description into `(command, numbers)` pairs.
///
/// Numbers that fail to parse as floats are dropped; input with no
/// recognizable commands yields an empty token list.
pub fn tokenize(d: &str) -> Vec<PathToken> {
    let Ok(pairs) = PathdataParser::parse(Rule::pathdata, d) else {
        warn!("unparseable path description, producing no tokens");
        return Vec::new();
    };

    let mut tokens = Vec::new();
    for pair in pairs {
        if pair.as_rule() != Rule::pathdata {
            continue;
        }
        for tok in pair.into_inner() {
            if tok.as_rule() != Rule::token {
                continue;
            }
            let mut inner = tok.into_inner();
            // the token rule always starts with a command letter
            let cmd = inner.next().unwrap().as_str().chars().next().unwrap();
            let args = inner
                .filter(|n| n.as_rule() == Rule::number)
                .filter_map(|n| n.as_str().parse::<f64>().ok())
                .collect();
            tokens.push(PathToken { cmd, args });
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_commands_with_args() {
        let tokens = tokenize("M 10 20 L 30,40");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].cmd, 'M');
        assert_eq!(tokens[0].args, vec![10.0, 20.0]);
        assert_eq!(tokens[1].cmd, 'L');
        assert_eq!(tokens[1].args, vec![30.0, 40.0]);
    }

    #[test]
    fn case_is_preserved() {
        let tokens = tokenize("m5,5l10,0");
        assert_eq!(tokens[0].cmd, 'm');
        assert_eq!(tokens[1].cmd, 'l');
    }

    #[test]
    fn negative_and_fractional_numbers() {
        let tokens = tokenize("c-10.5,0 .25,-3 4,4");
        assert_eq!(tokens[0].args, vec![-10.5, 0.0, 0.25, -3.0, 4.0, 4.0]);
    }

    #[test]
    fn bare_commands_have_no_args() {
        let tokens = tokenize("m0,0h30v30h-30z");
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[4].cmd, 'z');
        assert!(tokens[4].args.is_empty());
    }

    #[test]
    fn garbage_degrades_instead_of_failing() {
        let tokens = tokenize("##&& M 10 20 !! L 30 40");
        assert_eq!(tokens.len(), 2);
        // leading numbers without a command are skipped
        let tokens = tokenize("1 2 3 l 5 5");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].cmd, 'l');
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }
}
