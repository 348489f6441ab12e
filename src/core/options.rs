//! Purpose: Declare, parse, and merge per-module options from CLI tokens or kwargs.
//! Exports: `OptionValue`, `OptionKind`, `OptionSpec`, `OptionDecls`, `OptionBag`,
//! `Kwargs`, `parse_kwargs`, `module_command`, `bag_from_matches`.
//! Role: The argument contract shared by the CLI and library front ends.
//! Invariants: After merge, every declared option is present in the bag.
//! Invariants: Flags follow presence semantics on both call paths: any supplied
//! value, including an explicit `false`, means the flag is set.
//! Invariants: Reserved names (`input`, `output`, `iterate`, `generate`) are
//! framework parameters and never enter the module bag.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::core::error::{Error, ErrorKind};

/// Kwarg names owned by the framework; supplying them as module options is
/// caller misuse and fails before any transform runs.
pub const RESERVED_KWARGS: &[&str] = &["input", "output", "iterate", "generate"];

#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OptionKind {
    Flag,
    Int,
    Float,
    Str,
}

#[derive(Clone, Debug)]
pub struct OptionSpec {
    pub name: String,
    pub short: Option<char>,
    pub help: String,
    pub kind: OptionKind,
    pub default: OptionValue,
    pub choices: Vec<String>,
}

/// Mutable declaration surface handed to a module's `declare_options` hook.
#[derive(Debug, Default)]
pub struct OptionDecls {
    specs: Vec<OptionSpec>,
    suppressed: BTreeSet<String>,
}

impl OptionDecls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag(&mut self, name: &str, short: Option<char>, help: &str) {
        self.specs.push(OptionSpec {
            name: name.to_string(),
            short,
            help: help.to_string(),
            kind: OptionKind::Flag,
            default: OptionValue::Bool(false),
            choices: Vec::new(),
        });
    }

    pub fn int(&mut self, name: &str, short: Option<char>, help: &str, default: i64) {
        self.specs.push(OptionSpec {
            name: name.to_string(),
            short,
            help: help.to_string(),
            kind: OptionKind::Int,
            default: OptionValue::Int(default),
            choices: Vec::new(),
        });
    }

    pub fn float(&mut self, name: &str, short: Option<char>, help: &str, default: f64) {
        self.specs.push(OptionSpec {
            name: name.to_string(),
            short,
            help: help.to_string(),
            kind: OptionKind::Float,
            default: OptionValue::Float(default),
            choices: Vec::new(),
        });
    }

    pub fn text(&mut self, name: &str, short: Option<char>, help: &str, default: &str) {
        self.specs.push(OptionSpec {
            name: name.to_string(),
            short,
            help: help.to_string(),
            kind: OptionKind::Str,
            default: OptionValue::Str(default.to_string()),
            choices: Vec::new(),
        });
    }

    pub fn choice(
        &mut self,
        name: &str,
        short: Option<char>,
        help: &str,
        choices: &[&str],
        default: &str,
    ) {
        self.specs.push(OptionSpec {
            name: name.to_string(),
            short,
            help: help.to_string(),
            kind: OptionKind::Str,
            default: OptionValue::Str(default.to_string()),
            choices: choices.iter().map(|choice| choice.to_string()).collect(),
        });
    }

    /// Hide a cross-cutting option from this module's help text. The option
    /// keeps functioning; only its visibility changes.
    pub fn suppress(&mut self, name: &str) {
        self.suppressed.insert(name.to_string());
    }

    pub fn is_suppressed(&self, name: &str) -> bool {
        self.suppressed.contains(name)
    }

    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    pub fn specs(&self) -> &[OptionSpec] {
        &self.specs
    }
}

/// The merged, validated set of named values controlling one invocation.
#[derive(Clone, Debug, Default)]
pub struct OptionBag {
    values: BTreeMap<String, OptionValue>,
}

impl OptionBag {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn bool(&self, name: &str) -> Result<bool, Error> {
        match self.values.get(name) {
            Some(OptionValue::Bool(value)) => Ok(*value),
            other => Err(missing(name, other)),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64, Error> {
        match self.values.get(name) {
            Some(OptionValue::Int(value)) => Ok(*value),
            other => Err(missing(name, other)),
        }
    }

    pub fn float(&self, name: &str) -> Result<f64, Error> {
        match self.values.get(name) {
            Some(OptionValue::Float(value)) => Ok(*value),
            other => Err(missing(name, other)),
        }
    }

    pub fn str(&self, name: &str) -> Result<&str, Error> {
        match self.values.get(name) {
            Some(OptionValue::Str(value)) => Ok(value),
            other => Err(missing(name, other)),
        }
    }
}

fn missing(name: &str, found: Option<&OptionValue>) -> Error {
    // Only reachable when a module reads an option it never declared.
    Error::new(ErrorKind::Internal).with_message(format!(
        "option '{name}' absent or mistyped in merged bag (found {found:?})"
    ))
}

pub type Kwargs = BTreeMap<String, OptionValue>;

/// Merge caller kwargs over declared defaults, coercing each supplied value
/// to its declared kind. Reserved and unrecognized names fail with `Key`
/// before any value is merged.
pub fn parse_kwargs(decls: &OptionDecls, kwargs: &Kwargs) -> Result<OptionBag, Error> {
    for key in kwargs.keys() {
        if RESERVED_KWARGS.contains(&key.as_str()) {
            return Err(Error::new(ErrorKind::Key)
                .with_message(format!("invalid argument provided: '{key}'"))
                .with_hint("This name is a framework parameter, not a module option."));
        }
        if decls.get(key).is_none() {
            return Err(Error::new(ErrorKind::Key)
                .with_message(format!("unrecognized option: '{key}'")));
        }
    }

    let mut values = BTreeMap::new();
    for spec in decls.specs() {
        let value = match kwargs.get(&spec.name) {
            Some(supplied) => coerce(spec, supplied)?,
            None => spec.default.clone(),
        };
        check_choices(spec, &value)?;
        values.insert(spec.name.clone(), value);
    }
    Ok(OptionBag { values })
}

fn coerce(spec: &OptionSpec, value: &OptionValue) -> Result<OptionValue, Error> {
    match spec.kind {
        // Presence semantics: the flag was supplied, so it is set.
        OptionKind::Flag => Ok(OptionValue::Bool(true)),
        OptionKind::Int => match value {
            OptionValue::Int(value) => Ok(OptionValue::Int(*value)),
            OptionValue::Str(text) => text
                .trim()
                .parse::<i64>()
                .map(OptionValue::Int)
                .map_err(|err| bad_value(spec, text, err)),
            other => Err(bad_kind(spec, other)),
        },
        OptionKind::Float => match value {
            OptionValue::Float(value) => Ok(OptionValue::Float(*value)),
            OptionValue::Int(value) => Ok(OptionValue::Float(*value as f64)),
            OptionValue::Str(text) => text
                .trim()
                .parse::<f64>()
                .map(OptionValue::Float)
                .map_err(|err| bad_value(spec, text, err)),
            other => Err(bad_kind(spec, other)),
        },
        OptionKind::Str => match value {
            OptionValue::Str(text) => Ok(OptionValue::Str(text.clone())),
            OptionValue::Int(value) => Ok(OptionValue::Str(value.to_string())),
            OptionValue::Float(value) => Ok(OptionValue::Str(value.to_string())),
            other => Err(bad_kind(spec, other)),
        },
    }
}

fn bad_value(
    spec: &OptionSpec,
    text: &str,
    err: impl std::error::Error + Send + Sync + 'static,
) -> Error {
    Error::new(ErrorKind::Value)
        .with_message(format!(
            "option '{}': cannot interpret '{text}' as {:?}",
            spec.name, spec.kind
        ))
        .with_source(err)
}

fn bad_kind(spec: &OptionSpec, value: &OptionValue) -> Error {
    Error::new(ErrorKind::Value).with_message(format!(
        "option '{}': expected {:?}, found {value:?}",
        spec.name, spec.kind
    ))
}

fn check_choices(spec: &OptionSpec, value: &OptionValue) -> Result<(), Error> {
    if spec.choices.is_empty() {
        return Ok(());
    }
    if let OptionValue::Str(text) = value {
        if spec.choices.iter().any(|choice| choice == text) {
            return Ok(());
        }
        return Err(Error::new(ErrorKind::Value)
            .with_message(format!("option '{}': invalid choice '{text}'", spec.name))
            .with_hint(format!("Choose one of: {}.", spec.choices.join(", "))));
    }
    Ok(())
}

/// Build the per-module clap command. Cross-cutting options are re-declared so
/// they may appear after the module path on the command line; `suppress`ed
/// ones are hidden from help but keep parsing.
pub fn module_command(name: &str, about: &str, decls: &OptionDecls) -> Command {
    let mut cmd = Command::new(name.to_string())
        .about(about.to_string())
        .no_binary_name(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("show extra information")
                .hide(decls.is_suppressed("verbose")),
        )
        .arg(
            Arg::new("input")
                .long("input")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .hide(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("write output to a file instead of stdout")
                .hide(decls.is_suppressed("output")),
        )
        .arg(
            Arg::new("iterate")
                .short('i')
                .long("iterate")
                .action(ArgAction::SetTrue)
                .help("iterate input over newlines")
                .hide(decls.is_suppressed("iterate")),
        )
        .arg(
            Arg::new("generate")
                .short('g')
                .long("generate")
                .action(ArgAction::SetTrue)
                .help("generate output with newlines")
                .hide(decls.is_suppressed("generate")),
        );

    for spec in decls.specs() {
        let mut arg = Arg::new(spec.name.clone())
            .long(spec.name.clone())
            .help(spec.help.clone());
        if let Some(short) = spec.short {
            arg = arg.short(short);
        }
        arg = match spec.kind {
            OptionKind::Flag => arg.action(ArgAction::SetTrue),
            OptionKind::Int => arg
                .value_name(spec.name.to_uppercase())
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
            OptionKind::Float => arg
                .value_name(spec.name.to_uppercase())
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(f64)),
            OptionKind::Str => {
                if spec.choices.is_empty() {
                    arg.value_name(spec.name.to_uppercase())
                        .value_parser(clap::value_parser!(String))
                } else {
                    let choices: Vec<String> = spec.choices.clone();
                    arg.value_name(spec.name.to_uppercase()).value_parser(choices)
                }
            }
        };
        cmd = cmd.arg(arg);
    }

    cmd
}

/// Extract the merged option bag from parsed module matches, filling declared
/// defaults for anything the caller left out.
pub fn bag_from_matches(decls: &OptionDecls, matches: &ArgMatches) -> Result<OptionBag, Error> {
    let mut values = BTreeMap::new();
    for spec in decls.specs() {
        let value = match spec.kind {
            OptionKind::Flag => OptionValue::Bool(matches.get_flag(&spec.name)),
            OptionKind::Int => match matches.get_one::<i64>(&spec.name) {
                Some(value) => OptionValue::Int(*value),
                None => spec.default.clone(),
            },
            OptionKind::Float => match matches.get_one::<f64>(&spec.name) {
                Some(value) => OptionValue::Float(*value),
                None => spec.default.clone(),
            },
            OptionKind::Str => match matches.get_one::<String>(&spec.name) {
                Some(value) => OptionValue::Str(value.clone()),
                None => spec.default.clone(),
            },
        };
        check_choices(spec, &value)?;
        values.insert(spec.name.clone(), value);
    }
    Ok(OptionBag { values })
}
