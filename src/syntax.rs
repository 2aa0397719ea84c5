//! Stores are written as space-separated symbols. `&` (or `ε`) is the empty word, a leading `^`
//! puts the head one to the left of the word, a trailing `^` puts it one past the end and `[x]`
//! puts it on the symbol `x`. Configurations separate their stores with `,` and transitions
//! separate their sides with `->` (or `→`). A transition without arrow has an empty right-hand
//! side, which is how accept patterns are written.
//!
//! Symbols are `|-`, `-|`, `#`, `$` or runs of ASCII letters, digits, `_` and `.`; `_` is the
//! blank. Everything after `//` is a comment.
use std::str::FromStr;

use chumsky::prelude::*;
use itertools::Itertools;

use crate::{
    configuration::{Configuration, Transition},
    error::ParseError,
    store::Store,
    symbol::{Symbol, Word},
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Symbol(Symbol),
    Caret,
    Epsilon,
    Open,
    Close,
    Comma,
    Arrow,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Symbol(s) => write!(f, "{s}"),
            Token::Caret => write!(f, "^"),
            Token::Epsilon => write!(f, "&"),
            Token::Open => write!(f, "["),
            Token::Close => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Arrow => write!(f, "->"),
        }
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn lexer<'a>() -> impl Parser<'a, &'a str, Vec<Token>, extra::Err<Rich<'a, char>>> {
    // `->` has to be tried before `-|`
    let punct = choice((
        just("->").to(Token::Arrow),
        just('→').to(Token::Arrow),
        just('^').to(Token::Caret),
        just('&').to(Token::Epsilon),
        just('ε').to(Token::Epsilon),
        just('[').to(Token::Open),
        just(']').to(Token::Close),
        just(',').to(Token::Comma),
    ));
    let special = choice((just("|-"), just("-|"), just("#"), just("$")))
        .map(|s: &str| Token::Symbol(Symbol::new(s)));
    let name = any()
        .filter(|c: &char| is_symbol_char(*c))
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| Token::Symbol(Symbol::new(s)));
    let comment = just("//").then(any().repeated());

    choice((punct, special, name))
        .padded()
        .repeated()
        .collect()
        .then_ignore(comment.padded().or_not())
        .then_ignore(end())
}

fn lex(input: &str) -> Result<Vec<Token>, ParseError> {
    lexer().parse(input).into_result().map_err(|errors| {
        let Some(error) = errors.into_iter().next() else {
            return ParseError::Syntax("invalid input".into());
        };
        match error.found() {
            Some(&character) => ParseError::UnexpectedCharacter {
                character,
                offset: error.span().start,
            },
            None => ParseError::Syntax(error.to_string()),
        }
    })
}

type Extra<'a> = extra::Err<Rich<'a, Token>>;

#[derive(Debug, Clone)]
enum Cell {
    Plain(Symbol),
    Head(Symbol),
}

/// A store as written, before its head markers are checked.
#[derive(Debug, Clone)]
struct WrittenStore {
    left: bool,
    cells: Vec<Cell>,
    right: bool,
}

impl WrittenStore {
    fn into_store(self) -> Result<Store, ParseError> {
        let mut position = self.left.then_some(-1);
        let mut values = Vec::with_capacity(self.cells.len());
        for cell in self.cells {
            match cell {
                Cell::Plain(symbol) => values.push(symbol),
                Cell::Head(symbol) => {
                    if position.replace(values.len() as isize).is_some() {
                        return Err(ParseError::MultipleHeads);
                    }
                    values.push(symbol);
                }
            }
        }
        if self.right && position.replace(values.len() as isize).is_some() {
            return Err(ParseError::MultipleHeads);
        }
        Ok(Store::from_parts(Word::from(values), position.unwrap_or(0)))
    }
}

fn configuration_of(stores: Vec<WrittenStore>) -> Result<Configuration, ParseError> {
    stores
        .into_iter()
        .map(WrittenStore::into_store)
        .collect::<Result<Vec<_>, _>>()
        .map(Configuration::new)
}

fn symbol<'a>() -> impl Parser<'a, &'a [Token], Symbol, Extra<'a>> + Clone {
    select! { Token::Symbol(s) => s }.labelled("symbol")
}

fn word<'a>() -> impl Parser<'a, &'a [Token], Vec<Symbol>, Extra<'a>> + Clone {
    choice((
        just(Token::Epsilon).to(vec![]),
        symbol().repeated().collect(),
    ))
}

fn store<'a>() -> impl Parser<'a, &'a [Token], WrittenStore, Extra<'a>> + Clone {
    let cell = choice((
        symbol().map(Cell::Plain),
        symbol()
            .delimited_by(just(Token::Open), just(Token::Close))
            .map(Cell::Head),
    ));
    let cells = choice((
        just(Token::Epsilon).to(vec![]),
        cell.repeated().at_least(1).collect(),
    ));

    just(Token::Caret)
        .or_not()
        .then(cells)
        .then(just(Token::Caret).or_not())
        .map(|((left, cells), right)| WrittenStore {
            left: left.is_some(),
            cells,
            right: right.is_some(),
        })
        .labelled("store")
}

fn configuration<'a>() -> impl Parser<'a, &'a [Token], Vec<WrittenStore>, Extra<'a>> + Clone {
    store()
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect()
}

fn transition<'a>(
) -> impl Parser<'a, &'a [Token], (Vec<WrittenStore>, Option<Vec<WrittenStore>>), Extra<'a>> + Clone
{
    configuration().then(just(Token::Arrow).ignore_then(configuration()).or_not())
}

/// Runs `parser` on the whole of `tokens`.
fn parse<'a, O>(
    parser: impl Parser<'a, &'a [Token], O, Extra<'a>>,
    tokens: &'a [Token],
) -> Result<O, ParseError> {
    parser
        .then_ignore(end())
        .parse(tokens)
        .into_result()
        .map_err(|errors| ParseError::Syntax(errors.iter().map(ToString::to_string).join("; ")))
}

impl FromStr for Word {
    type Err = ParseError;

    /// Parses space-separated symbols; `&` is the empty word.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = lex(s)?;
        parse(word(), &tokens).map(Word::from)
    }
}

impl FromStr for Store {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = lex(s)?;
        parse(store(), &tokens)?.into_store()
    }
}

impl FromStr for Configuration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = lex(s)?;
        configuration_of(parse(configuration(), &tokens)?)
    }
}

impl FromStr for Transition {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = lex(s)?;
        let (lhs, rhs) = parse(transition(), &tokens)?;
        let rhs = match rhs {
            Some(rhs) => configuration_of(rhs)?,
            None => Configuration::default(),
        };
        Ok(Transition::new(configuration_of(lhs)?, rhs))
    }
}

impl TryFrom<&str> for Transition {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&String> for Transition {
    type Error = ParseError;

    fn try_from(value: &String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
