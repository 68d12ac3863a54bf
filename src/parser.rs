//! GNU-style command-line token parser.
//!
//! The scanner walks the tokens left to right:
//!
//! - `--name`, `--name=value`, `--name value` for long options. A long option
//!   may be abbreviated to any prefix that matches exactly one flag.
//! - `-x`, `-xvalue`, `-x value`, and bundles such as `-vq` for short aliases.
//!   In a bundle the first option that takes a value consumes the rest of the
//!   bundle, or the next token when the bundle ends.
//! - `--` ends option parsing; every later token is positional.
//! - `-` alone and anything not starting with `-` is positional. Options and
//!   positionals may be interleaved; positionals keep their relative order.
//!
//! Immediate options (see [`Setting::immediate`](crate::Setting::immediate))
//! stop the scan the moment they are seen. Tokens after them are not parsed
//! at all and end up in [`ParsedArgs::unparsed`], so an immediate option
//! should be given last. This is intended behavior.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::ParseError;
use crate::registry::Registry;
use crate::setting::FlagEffect;
use crate::value::SettingKind;

/// What a flag occurrence said about its setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliValue {
    Enable,
    Disable,
    Text(String),
}

/// One option occurrence, in token order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Setting name.
    pub setting: String,
    pub value: CliValue,
    /// The option as it resolved, e.g. `--no-verbose` or `-o`.
    pub option: String,
}

/// The immediate option that ended the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmediateAction {
    pub setting: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub assignments: Vec<Assignment>,
    pub immediate: Option<ImmediateAction>,
    pub positionals: Vec<String>,
    /// Tokens left unread because an immediate option stopped the scan.
    pub unparsed: Vec<String>,
}

impl ParsedArgs {
    /// Text values given to `setting`, in order.
    pub fn texts_for<'a>(&'a self, setting: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.assignments
            .iter()
            .filter(move |a| a.setting == setting)
            .filter_map(|a| match &a.value {
                CliValue::Text(s) => Some(s.as_str()),
                _ => None,
            })
    }

    /// Final on/off state of a boolean `setting` on the command line, if given.
    pub fn flag_for(&self, setting: &str) -> Option<bool> {
        self.assignments
            .iter()
            .rev()
            .filter(|a| a.setting == setting)
            .find_map(|a| match a.value {
                CliValue::Enable => Some(true),
                CliValue::Disable => Some(false),
                CliValue::Text(_) => None,
            })
    }
}

/// Parse `tokens` (without the program name) against `registry`.
pub fn parse<I, S>(registry: &Registry, tokens: I) -> Result<ParsedArgs, ParseError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Scanner {
        registry,
        tokens: tokens.into_iter().map(Into::into).collect(),
        parsed: ParsedArgs::default(),
    }
    .run()
}

/// What to do after one token.
enum Step {
    Continue,
    /// `--` seen: the rest is positional.
    Terminate,
    /// Immediate option seen: the rest is not parsed.
    Stop,
}

struct Scanner<'r> {
    registry: &'r Registry,
    tokens: VecDeque<String>,
    parsed: ParsedArgs,
}

impl Scanner<'_> {
    fn run(mut self) -> Result<ParsedArgs, ParseError> {
        while let Some(token) = self.tokens.pop_front() {
            let step = if token == "--" {
                Step::Terminate
            } else if let Some(body) = token.strip_prefix("--") {
                self.long_option(&token, body)?
            } else if token.len() > 1 && token.starts_with('-') {
                self.short_options(&token)?
            } else {
                self.parsed.positionals.push(token);
                Step::Continue
            };

            match step {
                Step::Continue => {}
                Step::Terminate => {
                    self.parsed.positionals.extend(self.tokens.drain(..));
                    break;
                }
                Step::Stop => {
                    self.parsed.unparsed.extend(self.tokens.drain(..));
                    break;
                }
            }
        }
        Ok(self.parsed)
    }

    fn long_option(&mut self, token: &str, body: &str) -> Result<Step, ParseError> {
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (body, None),
        };
        let (flag, index, effect) = self.lookup_long(token, name)?;
        let option = format!("--{flag}");

        match effect {
            FlagEffect::Enable | FlagEffect::Disable => {
                if let Some(value) = inline {
                    return Err(ParseError::UnexpectedArgument { option, value });
                }
                let value = if effect == FlagEffect::Enable {
                    CliValue::Enable
                } else {
                    CliValue::Disable
                };
                Ok(self.assign(index, value, option))
            }
            FlagEffect::Assign => {
                let value = match inline {
                    Some(value) => value,
                    None => self.take_argument(index, &option)?,
                };
                Ok(self.assign(index, CliValue::Text(value), option))
            }
        }
    }

    /// Exact match first, then a unique prefix.
    fn lookup_long(
        &self,
        token: &str,
        name: &str,
    ) -> Result<(String, usize, FlagEffect), ParseError> {
        if name.is_empty() {
            return Err(ParseError::UnknownOption {
                token: token.to_string(),
            });
        }
        if let Some((index, effect)) = self.registry.long_flag(name) {
            return Ok((name.to_string(), index, effect));
        }

        let candidates: Vec<_> = self.registry.long_flags_with_prefix(name).collect();
        match candidates.as_slice() {
            [] => Err(ParseError::UnknownOption {
                token: format!("--{name}"),
            }),
            [(flag, index, effect)] => Ok((flag.to_string(), *index, *effect)),
            many => Err(ParseError::AmbiguousOption {
                token: format!("--{name}"),
                candidates: many.iter().map(|(flag, _, _)| format!("--{flag}")).collect(),
            }),
        }
    }

    fn short_options(&mut self, token: &str) -> Result<Step, ParseError> {
        let body = &token[1..];
        for (pos, c) in body.char_indices() {
            let option = format!("-{c}");
            let Some(index) = self.registry.short_flag(c) else {
                return Err(ParseError::UnknownOption { token: option });
            };

            if self.registry.at(index).kind().takes_value() {
                let rest = &body[pos + c.len_utf8()..];
                let value = if rest.is_empty() {
                    self.take_argument(index, &option)?
                } else {
                    rest.to_string()
                };
                return Ok(self.assign(index, CliValue::Text(value), option));
            }

            if let Step::Stop = self.assign(index, CliValue::Enable, option) {
                return Ok(Step::Stop);
            }
        }
        Ok(Step::Continue)
    }

    /// Consume the next token as the argument of `option`.
    ///
    /// A token that looks like an option is refused, except a negative number
    /// given to an integer setting.
    fn take_argument(&mut self, index: usize, option: &str) -> Result<String, ParseError> {
        let numeric = *self.registry.at(index).kind() == SettingKind::Integer;
        match self.tokens.pop_front() {
            Some(next)
                if !looks_like_option(&next) || (numeric && next.parse::<i64>().is_ok()) =>
            {
                Ok(next)
            }
            Some(next) => {
                self.tokens.push_front(next);
                Err(ParseError::MissingArgument {
                    option: option.to_string(),
                })
            }
            None => Err(ParseError::MissingArgument {
                option: option.to_string(),
            }),
        }
    }

    fn assign(&mut self, index: usize, value: CliValue, option: String) -> Step {
        let setting = self.registry.at(index);
        if setting.is_immediate() {
            debug!(%option, "immediate option, stopping the scan");
            self.parsed.immediate = Some(ImmediateAction {
                setting: setting.name().to_string(),
                value: match value {
                    CliValue::Text(s) => Some(s),
                    CliValue::Enable | CliValue::Disable => None,
                },
            });
            return Step::Stop;
        }
        self.parsed.assignments.push(Assignment {
            setting: setting.name().to_string(),
            value,
            option,
        });
        Step::Continue
    }
}

fn looks_like_option(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}
