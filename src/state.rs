//! Compiled lexer states and match resolution.
//!
//! Each state is an ordered list of rules. Resolving a state against a
//! subject finds the rule whose match starts earliest; ties go to the rule
//! declared first, with include rules expanded in place.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use regex::Regex;

use crate::error::{Error, Result};
use crate::rule::{self, PatternRule, Rule, RuleSpec};
use crate::token::TokenType;

/// Name of the state every tokenize call starts in.
pub const ROOT: &str = "root";

/// Index of a state within its [`StateMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(usize);

impl StateId {
    #[cfg(test)]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }
}

/// A named, ordered set of rules.
#[derive(Debug, Clone)]
pub struct State {
    name: Arc<str>,
    rules: Vec<Rule>,
}

impl State {
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// The winning rule for a subject and where its match begins.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    pub offset: usize,
    pub rule: &'a PatternRule,
}

/// Every state of one lexer, compiled.
///
/// Immutable once built and safe to share between concurrent tokenize calls.
#[derive(Debug, Clone)]
pub struct StateMap {
    states: Vec<State>,
    by_name: HashMap<Arc<str>, StateId>,
    root: StateId,
}

impl StateMap {
    /// Compile state specs: build every regex, resolve includes and
    /// transition targets to ids, and check sub-type counts.
    pub fn compile(lexer: &str, specs: &BTreeMap<String, Vec<RuleSpec>>) -> Result<Self> {
        let by_name: HashMap<Arc<str>, StateId> = specs
            .keys()
            .enumerate()
            .map(|(index, name)| (Arc::from(name.as_str()), StateId(index)))
            .collect();
        let root = by_name
            .get(ROOT)
            .copied()
            .ok_or_else(|| Error::MissingRootState(lexer.to_owned()))?;

        let resolve = |name: &str| by_name.get(name).copied();
        let unknown = |state: &str, target: &str| Error::UnknownState {
            lexer: lexer.to_owned(),
            state: state.to_owned(),
            target: target.to_owned(),
        };

        let mut states = Vec::with_capacity(specs.len());
        for (name, rule_specs) in specs {
            let mut rules = Vec::with_capacity(rule_specs.len());
            for spec in rule_specs {
                let rule = match spec {
                    RuleSpec::Include(include) => Rule::Include(
                        resolve(&include.include).ok_or_else(|| unknown(name, &include.include))?,
                    ),
                    RuleSpec::Pattern(pattern) => {
                        let regex =
                            Regex::new(&pattern.pattern).map_err(|source| Error::InvalidPattern {
                                lexer: lexer.to_owned(),
                                state: name.clone(),
                                source,
                            })?;
                        if let Some(sub_types) = &pattern.sub_types {
                            let groups = regex.captures_len() - 1;
                            if groups != sub_types.len() {
                                return Err(Error::SubTypeMismatch {
                                    lexer: lexer.to_owned(),
                                    state: name.clone(),
                                    pattern: pattern.pattern.clone(),
                                    groups,
                                    sub_types: sub_types.len(),
                                });
                            }
                        }
                        let transitions = match &pattern.next {
                            Some(expression) => rule::parse_transition(expression, resolve)
                                .map_err(|target| unknown(name, target))?,
                            None => Vec::new(),
                        };
                        Rule::Pattern(PatternRule::new(
                            regex,
                            pattern.kind,
                            pattern.sub_types.clone(),
                            transitions,
                            pattern.extend,
                        ))
                    }
                };
                rules.push(rule);
            }
            states.push(State {
                name: Arc::from(name.as_str()),
                rules,
            });
        }

        Ok(Self {
            states,
            by_name,
            root,
        })
    }

    pub const fn root(&self) -> StateId {
        self.root
    }

    pub fn id(&self, name: &str) -> Option<StateId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: StateId) -> &State {
        &self.states[id.0]
    }

    pub fn name(&self, id: StateId) -> &Arc<str> {
        &self.states[id.0].name
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Find the rule of state `id` that matches `subject` earliest.
    pub fn resolve(&self, id: StateId, subject: &str) -> Option<Resolution<'_>> {
        let mut visiting = Vec::new();
        self.resolve_in(id, subject, &mut visiting)
    }

    fn resolve_in<'a>(
        &'a self,
        id: StateId,
        subject: &str,
        visiting: &mut Vec<StateId>,
    ) -> Option<Resolution<'a>> {
        // A state already being resolved further up contributes nothing new.
        if visiting.contains(&id) {
            return None;
        }
        visiting.push(id);

        let mut best: Option<Resolution<'a>> = None;
        for rule in &self.states[id.0].rules {
            let found = match rule {
                Rule::Pattern(pattern) => pattern
                    .find(subject)
                    .map(|offset| Resolution { offset, rule: pattern }),
                Rule::Include(target) => self.resolve_in(*target, subject, visiting),
            };
            if let Some(found) = found
                && best.is_none_or(|b| found.offset < b.offset)
            {
                best = Some(found);
                if found.offset == 0 {
                    break;
                }
            }
        }

        visiting.pop();
        best
    }

    /// Match state `id` against the start of `subject`.
    ///
    /// Returns the consumed length, the winning rule and the typed pieces of
    /// its match, or `None` when no rule matches at offset 0.
    pub fn match_start<'s>(
        &self,
        id: StateId,
        subject: &'s str,
    ) -> Option<(usize, &PatternRule, Vec<(TokenType, &'s str)>)> {
        let found = self.resolve(id, subject)?;
        if found.offset != 0 {
            return None;
        }
        let (consumed, pieces) = found.rule.apply(subject)?;
        Some((consumed, found.rule, pieces))
    }
}
