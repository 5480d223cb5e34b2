//! Parameter descriptions and argument parsing.
//!
//! A [`ParameterList`] walks an [`ArgumentStream`] once, left to right,
//! binding each fixed parameter to one item, then giving whatever is left
//! to the rest parameter. Keyword arguments may appear anywhere and are
//! collected into [`ParsedKeywords`] as they are met. Nothing backtracks.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use warden_foundation::{Error, Registry, Result};

use crate::error::{ArgumentParseError, CommandError};
use crate::presentation::{PresentationType, boolean};
use crate::reader::ReadItem;
use crate::stream::ArgumentStream;

/// Suggested values offered when prompting for a parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromptOptions {
    /// Candidate values, in the order they should be offered.
    pub suggestions: Vec<ReadItem>,
    /// A value to offer ahead of the suggestions.
    pub default: Option<ReadItem>,
}

impl PromptOptions {
    /// Creates options from suggestions.
    #[must_use]
    pub fn new(suggestions: Vec<ReadItem>) -> Self {
        Self {
            suggestions,
            default: None,
        }
    }

    /// Sets the default.
    #[must_use]
    pub fn with_default(mut self, default: ReadItem) -> Self {
        self.default = Some(default);
        self
    }

    /// Returns every candidate, the default first.
    #[must_use]
    pub fn candidates(&self) -> Vec<ReadItem> {
        self.default
            .iter()
            .chain(self.suggestions.iter().filter(|s| Some(*s) != self.default.as_ref()))
            .cloned()
            .collect()
    }
}

/// Produces prompt options for a parameter that was not given.
#[async_trait]
pub trait Prompter<C>: Send + Sync {
    /// Returns the options to offer.
    async fn prompt(&self, parameter: &ParameterDescription<C>, context: &C) -> PromptOptions;
}

#[async_trait]
impl<C: Sync> Prompter<C> for PromptOptions {
    async fn prompt(&self, _parameter: &ParameterDescription<C>, _context: &C) -> PromptOptions {
        self.clone()
    }
}

/// Describes one positional parameter of a command.
pub struct ParameterDescription<C> {
    name: String,
    acceptor: PresentationType,
    description: Option<String>,
    prompt: Option<Arc<dyn Prompter<C>>>,
}

/// Describes the parameter that takes every remaining item.
pub type RestDescription<C> = ParameterDescription<C>;

impl<C> ParameterDescription<C> {
    /// Creates a parameter that accepts items of `acceptor`.
    #[must_use]
    pub fn new(name: impl Into<String>, acceptor: PresentationType) -> Self {
        Self {
            name: name.into(),
            acceptor,
            description: None,
            prompt: None,
        }
    }

    /// Sets the description shown in help.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Makes the parameter promptable.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Prompter<C> + 'static) -> Self {
        self.prompt = Some(Arc::new(prompt));
        self
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the presentation type items must match.
    #[must_use]
    pub const fn acceptor(&self) -> &PresentationType {
        &self.acceptor
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the prompter, if the parameter is promptable.
    #[must_use]
    pub fn prompter(&self) -> Option<&dyn Prompter<C>> {
        self.prompt.as_deref()
    }

    /// Returns true if a missing value may be prompted for.
    #[must_use]
    pub const fn is_promptable(&self) -> bool {
        self.prompt.is_some()
    }
}

impl<C> Clone for ParameterDescription<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            acceptor: self.acceptor.clone(),
            description: self.description.clone(),
            prompt: self.prompt.clone(),
        }
    }
}

impl<C> fmt::Debug for ParameterDescription<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterDescription")
            .field("name", &self.name)
            .field("acceptor", &self.acceptor.name())
            .field("promptable", &self.is_promptable())
            .finish()
    }
}

/// Describes one keyword argument.
#[derive(Clone, Debug)]
pub struct KeywordPropertyDescription {
    /// The designator, without leading dashes.
    pub name: String,
    /// The presentation type of the associated value.
    pub acceptor: PresentationType,
    /// Description shown in help.
    pub description: Option<String>,
    /// Whether the keyword may appear without a value.
    pub is_flag: bool,
}

/// Describes every keyword argument of a command.
#[derive(Clone, Debug, Default)]
pub struct KeywordsDescription {
    properties: Vec<KeywordPropertyDescription>,
    allow_other_keys: bool,
}

impl KeywordsDescription {
    /// Creates a description accepting no keywords.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a flag, whose presence records `true`.
    ///
    /// A flag followed by `true` or `false` takes that item as its value.
    #[must_use]
    pub fn flag(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.properties.push(KeywordPropertyDescription {
            name: name.into(),
            acceptor: boolean(),
            description: Some(description.into()),
            is_flag: true,
        });
        self
    }

    /// Adds a keyword that requires a value.
    #[must_use]
    pub fn property(
        mut self,
        name: impl Into<String>,
        acceptor: PresentationType,
        description: impl Into<String>,
    ) -> Self {
        self.properties.push(KeywordPropertyDescription {
            name: name.into(),
            acceptor,
            description: Some(description.into()),
            is_flag: false,
        });
        self
    }

    /// Accepts keywords that were not described, recording them as flags.
    #[must_use]
    pub const fn allow_other_keys(mut self) -> Self {
        self.allow_other_keys = true;
        self
    }

    /// Returns the described keywords.
    #[must_use]
    pub fn properties(&self) -> &[KeywordPropertyDescription] {
        &self.properties
    }

    /// Looks up a described keyword.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&KeywordPropertyDescription> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Returns true if undescribed keywords are accepted.
    #[must_use]
    pub const fn allows_other_keys(&self) -> bool {
        self.allow_other_keys
    }
}

/// The value recorded for a keyword.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeywordValue {
    /// The keyword appeared without a value.
    Flag,
    /// The keyword took the following item.
    Item(ReadItem),
}

/// Keyword values of one invocation.
#[derive(Clone, Debug, Default)]
pub struct ParsedKeywords {
    description: KeywordsDescription,
    values: HashMap<String, KeywordValue>,
}

impl ParsedKeywords {
    /// Returns the value recorded for `name`, if the keyword was given.
    ///
    /// # Errors
    ///
    /// Fails if `name` is not a keyword of this command.
    pub fn get(&self, name: &str) -> Result<Option<&KeywordValue>> {
        if self.description.find(name).is_none() && !self.description.allows_other_keys() {
            return Err(Error::not_registered(Registry::Keyword, name));
        }
        Ok(self.values.get(name))
    }

    /// Returns the item given for `name`, if any.
    ///
    /// # Errors
    ///
    /// Fails if `name` is not a keyword of this command.
    pub fn item(&self, name: &str) -> Result<Option<&ReadItem>> {
        Ok(match self.get(name)? {
            Some(KeywordValue::Item(item)) => Some(item),
            Some(KeywordValue::Flag) | None => None,
        })
    }

    /// Returns true if the flag `name` was given and not set to `false`.
    ///
    /// # Errors
    ///
    /// Fails if `name` is not a keyword of this command.
    pub fn flag(&self, name: &str) -> Result<bool> {
        Ok(match self.get(name)? {
            Some(KeywordValue::Flag) => true,
            Some(KeywordValue::Item(item)) => item.as_str() != Some("false"),
            None => false,
        })
    }

    /// Returns the number of keywords given.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no keywords were given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The result of parsing one invocation.
#[derive(Clone, Debug, Default)]
pub struct ParsedArguments {
    /// One item per fixed parameter, in order.
    pub immediate: Vec<ReadItem>,
    /// Items taken by the rest parameter, if the command has one.
    pub rest: Option<Vec<ReadItem>>,
    /// Keyword values.
    pub keywords: ParsedKeywords,
}

/// Collects keywords for one invocation.
struct KeywordParser<'d> {
    description: &'d KeywordsDescription,
    values: HashMap<String, KeywordValue>,
}

impl<'d> KeywordParser<'d> {
    fn new(description: &'d KeywordsDescription) -> Self {
        Self {
            description,
            values: HashMap::new(),
        }
    }

    /// Consumes keywords, and their values, until a non-keyword is next.
    fn parse_keywords<C>(
        &mut self,
        stream: &mut ArgumentStream<'_, C>,
    ) -> std::result::Result<(), CommandError> {
        while let Some(ReadItem::Keyword(keyword)) = stream.peek() {
            let designator = keyword.designator().to_string();
            stream.read();
            if let Some(property) = self.description.find(&designator) {
                let value = Self::associated_value(property, stream)?;
                self.values.insert(property.name.clone(), value);
            } else if self.description.allows_other_keys() {
                self.values.insert(designator, KeywordValue::Flag);
            } else {
                return Err(CommandError::UnexpectedArgument {
                    message: format!("Encountered unexpected keyword argument: {designator}"),
                    position: stream.position().saturating_sub(1),
                    items: stream.source().to_vec(),
                });
            }
        }
        Ok(())
    }

    fn associated_value<C>(
        property: &KeywordPropertyDescription,
        stream: &mut ArgumentStream<'_, C>,
    ) -> std::result::Result<KeywordValue, CommandError> {
        let verdict = match stream.peek() {
            Some(item) if !item.is_keyword() => Some(property.acceptor.validate(item)),
            _ => None,
        };
        match verdict {
            Some(Ok(())) => Ok(stream
                .read()
                .map_or(KeywordValue::Flag, KeywordValue::Item)),
            Some(Err(_)) | None if property.is_flag => Ok(KeywordValue::Flag),
            Some(Err(message)) => Err(parse_error(
                &property.name,
                &property.acceptor,
                stream,
                message,
            )),
            None => Err(parse_error(
                &property.name,
                &property.acceptor,
                stream,
                format!(
                    "An associated argument was not provided for the keyword {}.",
                    property.name
                ),
            )),
        }
    }

    fn finish(self) -> ParsedKeywords {
        ParsedKeywords {
            description: self.description.clone(),
            values: self.values,
        }
    }
}

fn parse_error<C>(
    parameter: &str,
    acceptor: &PresentationType,
    stream: &ArgumentStream<'_, C>,
    message: String,
) -> CommandError {
    CommandError::ArgumentParse(ArgumentParseError {
        parameter: parameter.to_string(),
        acceptor: acceptor.name().to_string(),
        position: stream.position(),
        items: stream.source().to_vec(),
        message,
    })
}

/// The parameters of a command.
pub struct ParameterList<C> {
    parameters: Vec<ParameterDescription<C>>,
    rest: Option<RestDescription<C>>,
    keywords: KeywordsDescription,
}

impl<C> Default for ParameterList<C> {
    fn default() -> Self {
        Self {
            parameters: Vec::new(),
            rest: None,
            keywords: KeywordsDescription::new(),
        }
    }
}

impl<C> fmt::Debug for ParameterList<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterList")
            .field("parameters", &self.parameters)
            .field("rest", &self.rest)
            .field("keywords", &self.keywords)
            .finish()
    }
}

impl<C> ParameterList<C> {
    /// Creates an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fixed parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: ParameterDescription<C>) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Sets the rest parameter.
    #[must_use]
    pub fn rest(mut self, rest: RestDescription<C>) -> Self {
        self.rest = Some(rest);
        self
    }

    /// Sets the keyword arguments.
    #[must_use]
    pub fn keywords(mut self, keywords: KeywordsDescription) -> Self {
        self.keywords = keywords;
        self
    }

    /// Returns the fixed parameters.
    #[must_use]
    pub fn descriptions(&self) -> &[ParameterDescription<C>] {
        &self.parameters
    }

    /// Returns the rest parameter, if any.
    #[must_use]
    pub const fn rest_description(&self) -> Option<&RestDescription<C>> {
        self.rest.as_ref()
    }

    /// Returns the keyword arguments.
    #[must_use]
    pub const fn keyword_descriptions(&self) -> &KeywordsDescription {
        &self.keywords
    }
}

impl<C: Sync> ParameterList<C> {
    /// Parses the arguments of one invocation.
    ///
    /// Missing fixed arguments are prompted for when both the parameter and
    /// the stream allow it.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::ArgumentParse`] when an argument is missing or
    /// rejected by its acceptor, [`CommandError::UnexpectedArgument`] when
    /// items are left over, and any error raised while prompting.
    pub async fn parse(
        &self,
        stream: &mut ArgumentStream<'_, C>,
    ) -> std::result::Result<ParsedArguments, CommandError> {
        let mut keywords = KeywordParser::new(&self.keywords);
        let mut immediate = Vec::with_capacity(self.parameters.len());
        let mut prompted = false;
        for parameter in &self.parameters {
            keywords.parse_keywords(stream)?;
            if stream.peek().is_none() {
                if parameter.is_promptable() && stream.is_promptable() {
                    debug!(parameter = parameter.name(), "prompting for missing argument");
                    stream.prompt(parameter).await?;
                    prompted = true;
                } else {
                    return Err(parse_error(
                        parameter.name(),
                        parameter.acceptor(),
                        stream,
                        format!(
                            "An argument for the parameter {} was expected but was not provided.",
                            parameter.name()
                        ),
                    ));
                }
            }
            accept_next(parameter, stream)?;
            immediate.extend(stream.read());
        }
        let rest = match &self.rest {
            Some(rest) => {
                let should_prompt = prompted || self.parameters.is_empty();
                Some(parse_rest(rest, stream, should_prompt, &mut keywords).await?)
            }
            None => {
                keywords.parse_keywords(stream)?;
                if let Some(item) = stream.peek() {
                    return Err(CommandError::UnexpectedArgument {
                        message: format!("There is an unexpected non-keyword argument {item}"),
                        position: stream.position(),
                        items: stream.source().to_vec(),
                    });
                }
                None
            }
        };
        Ok(ParsedArguments {
            immediate,
            rest,
            keywords: keywords.finish(),
        })
    }
}

fn accept_next<C>(
    parameter: &ParameterDescription<C>,
    stream: &ArgumentStream<'_, C>,
) -> std::result::Result<(), CommandError> {
    let Some(item) = stream.peek() else {
        return Err(parse_error(
            parameter.name(),
            parameter.acceptor(),
            stream,
            format!(
                "An argument for the parameter {} was expected but was not provided.",
                parameter.name()
            ),
        ));
    };
    parameter
        .acceptor()
        .validate(item)
        .map_err(|message| parse_error(parameter.name(), parameter.acceptor(), stream, message))
}

async fn parse_rest<C: Sync>(
    rest: &RestDescription<C>,
    stream: &mut ArgumentStream<'_, C>,
    should_prompt: bool,
    keywords: &mut KeywordParser<'_>,
) -> std::result::Result<Vec<ReadItem>, CommandError> {
    if should_prompt && rest.is_promptable() && stream.is_promptable() && stream.is_exhausted() {
        stream.prompt(rest).await?;
    }
    let mut items = Vec::new();
    loop {
        keywords.parse_keywords(stream)?;
        if stream.is_exhausted() {
            break;
        }
        accept_next(rest, stream)?;
        items.extend(stream.read());
    }
    Ok(items)
}
