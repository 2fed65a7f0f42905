//! core::flags::parser
//!
//! Left-to-right flag token scanner.
//!
//! # Syntax
//!
//! - `--` ends flag scanning; everything after it is positional verbatim
//! - `--name=value` and `--name value`; a boolean `--name` alone binds true
//! - `-x`, `-x=value`, `-x value`, and clusters such as `-vq` or `-nalice`
//! - `-` on its own is a positional
//!
//! Unknown flag tokens are errors in strict mode and positionals otherwise.
//!
//! # Invariants
//!
//! Every input token is either consumed by a flag or returned as a
//! positional, never both: `consumed + positionals.len() == tokens.len()`.

use tracing::debug;

use super::precedence::{Resolved, ResolvedFlags, Scope, Source};
use super::value::FlagValue;
use super::{Flag, FlagError, FlagSet};

/// Result of scanning a token list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Tokens that were not flags or flag values, in input order.
    pub positionals: Vec<String>,
    /// Number of tokens consumed as flags, flag values, or the `--` marker.
    pub consumed: usize,
}

/// An ordered stack of registries searched front to back.
///
/// The first layer's strict mode decides how unknown tokens are treated.
#[derive(Debug, Clone)]
pub struct FlagScopes<'a> {
    layers: Vec<(Scope, &'a FlagSet)>,
}

impl<'a> FlagScopes<'a> {
    pub fn new(layers: Vec<(Scope, &'a FlagSet)>) -> Self {
        Self { layers }
    }

    pub fn single(scope: Scope, set: &'a FlagSet) -> Self {
        Self::new(vec![(scope, set)])
    }

    fn strict(&self) -> bool {
        self.layers.first().is_some_and(|(_, set)| set.is_strict())
    }

    fn find_long(&self, name: &str) -> Option<(Scope, &'a Flag)> {
        self.layers
            .iter()
            .find_map(|&(scope, set)| set.lookup(name).map(|f| (scope, f)))
    }

    fn find_short(&self, short: char) -> Option<(Scope, &'a Flag)> {
        self.layers
            .iter()
            .find_map(|&(scope, set)| set.lookup_short(short).map(|f| (scope, f)))
    }

    /// Scan `tokens`, binding flags into `resolved`.
    pub fn parse(
        &self,
        tokens: &[String],
        resolved: &mut ResolvedFlags,
    ) -> Result<ParseOutcome, FlagError> {
        let mut out = ParseOutcome::default();
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            i += 1;

            if token == "--" {
                out.consumed += 1;
                out.positionals.extend(tokens[i..].iter().cloned());
                break;
            }

            if let Some(body) = token.strip_prefix("--") {
                let (name, inline) = match body.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (body, None),
                };
                let Some((scope, flag)) = self.find_long(name) else {
                    self.unknown(token, &mut out)?;
                    continue;
                };
                out.consumed += 1;
                let raw = match inline {
                    Some(value) => value.to_string(),
                    None if flag.is_bool() => "true".to_string(),
                    None => match tokens.get(i) {
                        Some(next) => {
                            i += 1;
                            out.consumed += 1;
                            next.clone()
                        }
                        None => return Err(FlagError::MissingValue(flag.name().to_string())),
                    },
                };
                bind(resolved, scope, flag, &raw)?;
                continue;
            }

            if token.len() > 1 && token.starts_with('-') {
                let Some(bindings) = self.expand_shorts(&token[1..]) else {
                    self.unknown(token, &mut out)?;
                    continue;
                };
                out.consumed += 1;
                for (scope, flag, raw) in bindings {
                    let raw = match raw {
                        Some(raw) => raw,
                        None => match tokens.get(i) {
                            Some(next) => {
                                i += 1;
                                out.consumed += 1;
                                next.clone()
                            }
                            None => {
                                return Err(FlagError::MissingValue(flag.name().to_string()))
                            }
                        },
                    };
                    bind(resolved, scope, flag, &raw)?;
                }
                continue;
            }

            out.positionals.push(token.clone());
        }

        Ok(out)
    }

    /// Resolve a short-flag cluster into (flag, value) pairs.
    ///
    /// A `None` value means the flag takes the next token. Returns `None`
    /// when any letter before the first value-taking flag is unknown.
    fn expand_shorts(&self, body: &str) -> Option<Vec<(Scope, &'a Flag, Option<String>)>> {
        let (cluster, inline) = match body.split_once('=') {
            Some((cluster, value)) => (cluster, Some(value)),
            None => (body, None),
        };
        let chars: Vec<char> = cluster.chars().collect();
        if chars.is_empty() {
            return None;
        }

        let mut bindings = Vec::new();
        for (pos, &c) in chars.iter().enumerate() {
            let (scope, flag) = self.find_short(c)?;
            let last = pos + 1 == chars.len();
            if flag.is_bool() {
                let raw = match inline {
                    Some(value) if last => value.to_string(),
                    _ => "true".to_string(),
                };
                bindings.push((scope, flag, Some(raw)));
                continue;
            }

            let rest: String = chars[pos + 1..].iter().collect();
            let raw = match (rest.is_empty(), inline) {
                (true, Some(value)) => Some(value.to_string()),
                (true, None) => None,
                (false, Some(value)) => Some(format!("{rest}={value}")),
                (false, None) => Some(rest),
            };
            bindings.push((scope, flag, raw));
            break;
        }
        Some(bindings)
    }

    fn unknown(&self, token: &str, out: &mut ParseOutcome) -> Result<(), FlagError> {
        if self.strict() {
            return Err(FlagError::UnknownFlag(token.to_string()));
        }
        out.positionals.push(token.to_string());
        Ok(())
    }
}

/// Coerce, validate, and record a command-line value.
fn bind(
    resolved: &mut ResolvedFlags,
    scope: Scope,
    flag: &Flag,
    raw: &str,
) -> Result<(), FlagError> {
    let value = flag.accept(raw, Source::CommandLine)?;
    // A boolean supplied on the command line reads true whatever literal
    // followed `=`; the literal still has to parse as a boolean.
    let value = if flag.is_bool() {
        FlagValue::Bool(true)
    } else {
        value
    };
    debug!(flag = flag.name(), ?scope, "bound from command line");
    resolved.insert(
        scope,
        flag.name(),
        Resolved {
            value,
            source: Source::CommandLine,
            origin: None,
        },
    );
    Ok(())
}

impl FlagSet {
    /// Scan `tokens` against this registry alone.
    pub fn parse(
        &self,
        scope: Scope,
        tokens: &[String],
        resolved: &mut ResolvedFlags,
    ) -> Result<ParseOutcome, FlagError> {
        FlagScopes::single(scope, self).parse(tokens, resolved)
    }

    /// Bind leftover tokens to positional flags in registration order.
    ///
    /// Positionals the command line already bound by name are skipped.
    /// Tokens beyond the unbound positionals are returned, not rejected.
    pub fn map_positionals(
        &self,
        scope: Scope,
        tokens: &[String],
        resolved: &mut ResolvedFlags,
    ) -> Result<Vec<String>, FlagError> {
        let mut rest = tokens.iter();
        let unbound: Vec<&Flag> = self
            .positionals()
            .filter(|f| !resolved.is_cli_set_in(scope, f.name()))
            .collect();
        for flag in unbound {
            let Some(token) = rest.next() else {
                break;
            };
            bind(resolved, scope, flag, token)?;
        }
        Ok(rest.cloned().collect())
    }
}
