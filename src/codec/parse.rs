//! Command and response line parsing.
//!
//! Grounded on the antecedent's line-tokenizing `parse.rs`: a `nom`-based
//! tokenizer that splits a command line into a canonical uppercase verb and
//! its raw argument tokens, plus a response-line parser for the
//! client-side path the Peer Synchronizer uses against remote peers.

use nom::Finish;
use nom::bytes::complete::{take_while, take_while1};
use nom::character::complete::{digit1, space0, space1};
use nom::combinator::{map, opt, rest};
use nom::sequence::{preceded, tuple};
use nom::IResult;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command line")]
    Empty,
    #[error("malformed command line: {0:?}")]
    MalformedCommand(String),
    #[error("malformed response line: {0:?}")]
    MalformedResponse(String),
}

/// A client command line split into its canonical-uppercase verb and
/// whitespace-separated argument tokens, exactly as received (no further
/// interpretation of argument shape — that is left to each handler, per
/// the `<mid>` vs numeric vs invalid argument rules).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: String,
    pub args: Vec<String>,
}

fn is_verb_char(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn verb(input: &str) -> IResult<&str, &str> {
    take_while1(is_verb_char)(input)
}

fn argument_tokens(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

fn command_line(input: &str) -> IResult<&str, Command> {
    map(
        tuple((space0, verb, space0, rest)),
        |(_, v, _, tail): (&str, &str, &str, &str)| Command {
            verb: v.to_ascii_uppercase(),
            args: argument_tokens(tail),
        },
    )(input)
}

/// Tokenize a single command line (already stripped of its CRLF/LF
/// terminator by the framing layer).
///
/// # Errors
///
/// Returns `Empty` for a blank line, or `MalformedCommand` if no verb token
/// can be parsed at all.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    if line.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    command_line(line)
        .finish()
        .map(|(_, cmd)| cmd)
        .map_err(|_| ParseError::MalformedCommand(line.to_string()))
}

/// A parsed response status line: three-digit code plus free-form text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseLine {
    pub code: u16,
    pub text: String,
}

fn response_line(input: &str) -> IResult<&str, ResponseLine> {
    map(
        tuple((digit1, opt(preceded(space1, rest)))),
        |(code, text): (&str, Option<&str>)| ResponseLine {
            code: code.parse().unwrap_or(0),
            text: text.unwrap_or("").to_string(),
        },
    )(input)
}

/// Parse a response status line received from a remote peer during
/// synchronization (`NEWGROUPS`/`NEWNEWS`/`ARTICLE`/`IHAVE` replies).
///
/// # Errors
///
/// Returns `MalformedResponse` if the line does not start with a 3-digit
/// code.
pub fn parse_response_line(line: &str) -> Result<ResponseLine, ParseError> {
    let (_, code_digits) = take_while::<_, &str, ()>(|c: char| c.is_ascii_digit())(line)
        .unwrap_or(("", ""));
    if code_digits.len() != 3 {
        return Err(ParseError::MalformedResponse(line.to_string()));
    }
    response_line(line)
        .finish()
        .map(|(_, resp)| resp)
        .map_err(|_| ParseError::MalformedResponse(line.to_string()))
}

/// The argument shape a command argument takes, per the Protocol Engine's
/// `<mid>` vs numeric vs invalid rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentShape {
    MessageId(String),
    ArticleNumber(u32),
    Invalid(String),
}

/// Classify a single command argument token.
#[must_use]
pub fn classify_argument(token: &str) -> ArgumentShape {
    if crate::domain::MessageId::is_valid(token) {
        ArgumentShape::MessageId(token.to_string())
    } else if let Ok(n) = token.parse::<u32>() {
        ArgumentShape::ArticleNumber(n)
    } else {
        ArgumentShape::Invalid(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_verb_and_args_case_insensitively() {
        let cmd = parse_command("group comp.lang.rust").unwrap();
        assert_eq!(cmd.verb, "GROUP");
        assert_eq!(cmd.args, vec!["comp.lang.rust".to_string()]);
    }

    #[test]
    fn parses_bare_verb_with_no_args() {
        let cmd = parse_command("QUIT").unwrap();
        assert_eq!(cmd.verb, "QUIT");
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn parses_multi_word_verb_like_mode_reader() {
        let cmd = parse_command("MODE READER").unwrap();
        assert_eq!(cmd.verb, "MODE");
        assert_eq!(cmd.args, vec!["READER".to_string()]);
    }

    #[test]
    fn empty_line_is_an_error() {
        assert_eq!(parse_command("   "), Err(ParseError::Empty));
    }

    #[test]
    fn parses_response_line_with_text() {
        let resp = parse_response_line("211 1 1 1 comp.lang.rust").unwrap();
        assert_eq!(resp.code, 211);
        assert_eq!(resp.text, "1 1 1 comp.lang.rust");
    }

    #[test]
    fn parses_response_line_without_text() {
        let resp = parse_response_line("205").unwrap();
        assert_eq!(resp.code, 205);
        assert_eq!(resp.text, "");
    }

    #[test]
    fn non_numeric_response_is_malformed() {
        assert!(matches!(
            parse_response_line("oops"),
            Err(ParseError::MalformedResponse(_))
        ));
    }

    #[test]
    fn classifies_message_id_numeric_and_invalid_arguments() {
        assert_eq!(
            classify_argument("<a@h>"),
            ArgumentShape::MessageId("<a@h>".to_string())
        );
        assert_eq!(classify_argument("42"), ArgumentShape::ArticleNumber(42));
        assert_eq!(
            classify_argument("not-valid"),
            ArgumentShape::Invalid("not-valid".to_string())
        );
    }
}
