use crate::models::CATEGORY_NAME_PATTERN;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref COMMAND: Regex = Regex::new(r"^\s*([A-Za-z]+)(?:\s+(.*?))?\s*$").unwrap();
    static ref SCORE_PAIR: Regex =
        Regex::new(&format!(r"^({})\s*[=:]\s*(-?\d+)$", CATEGORY_NAME_PATTERN)).unwrap();
    static ref BARE_SCORE: Regex = Regex::new(r"^-?\d+$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateInput {
    /// `rate 7`: the same score for every category.
    Uniform(i32),
    /// `rate humour=8 appearance=6 ...`
    PerCategory(Vec<(String, i32)>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoStep {
    Next,
    Previous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Rate(RateInput),
    Skip,
    Board(Option<String>),
    Reset,
    Photo(PhotoStep),
    Categories,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("type a command, or 'help' for the list")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{0}' is not a score; use category=value")]
    BadScore(String),
    #[error("'rate' needs scores, e.g. 'rate 7' or 'rate humour=8 appearance=6'")]
    MissingScores,
    #[error("'photo' takes 'next' or 'prev'")]
    BadPhotoStep,
}

/// Parses one line typed at the prompt.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    if line.trim().is_empty() {
        return Err(CommandError::Empty);
    }
    let caps = COMMAND
        .captures(line)
        .ok_or_else(|| CommandError::Unknown(line.trim().to_string()))?;
    let verb = caps[1].to_ascii_lowercase();
    let args = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    match verb.as_str() {
        "show" | "s" => Ok(Command::Show),
        "rate" | "r" => parse_rate(args).map(Command::Rate),
        "skip" | "n" => Ok(Command::Skip),
        "board" | "leaderboard" | "b" => Ok(Command::Board(
            Some(args.trim()).filter(|a| !a.is_empty()).map(str::to_string),
        )),
        "reset" => Ok(Command::Reset),
        "photo" | "p" => match args.trim().to_ascii_lowercase().as_str() {
            "" | "next" | ">" => Ok(Command::Photo(PhotoStep::Next)),
            "prev" | "previous" | "<" => Ok(Command::Photo(PhotoStep::Previous)),
            _ => Err(CommandError::BadPhotoStep),
        },
        "categories" => Ok(Command::Categories),
        "help" | "h" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        _ => Err(CommandError::Unknown(verb)),
    }
}

fn parse_rate(args: &str) -> Result<RateInput, CommandError> {
    let tokens: Vec<&str> = args
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    match tokens.as_slice() {
        [] => Err(CommandError::MissingScores),
        [single] if BARE_SCORE.is_match(single) => single
            .parse()
            .map(RateInput::Uniform)
            .map_err(|_| CommandError::BadScore(single.to_string())),
        _ => tokens
            .iter()
            .map(|token| {
                let caps = SCORE_PAIR
                    .captures(token)
                    .ok_or_else(|| CommandError::BadScore(token.to_string()))?;
                let value = caps[2]
                    .parse::<i32>()
                    .map_err(|_| CommandError::BadScore(token.to_string()))?;
                Ok((caps[1].to_string(), value))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(RateInput::PerCategory),
    }
}

pub const HELP: &str = "\
Commands:
  show                      show the current person
  rate <n>                  give every category the same score (0-10)
  rate humour=8 appearance=6 ...
                            score each category
  skip                      move on without rating
  photo next|prev           flip through the current person's photos
  board [category]          top 10 overall, or for one category
  categories                list the categories
  reset                     start over
  quit";
