//! Reified generic shapes and type tokens
//!
//! A [`GenericTypeDescriptor`] is the parsed form of a type name: the raw type plus its
//! ordered type arguments. A [`TypeToken`] couples a descriptor with the static type it
//! stands for, and is what token based resolution takes.

use std::{any::type_name, fmt::Display, marker::PhantomData};

use crate::{errors::DiError, key};

const WILDCARD: &str = "_";

/// A fully spelled out generic shape, e.g. `Repository<Product>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenericTypeDescriptor {
    raw_type: String,
    type_arguments: Vec<GenericTypeDescriptor>,
}

impl GenericTypeDescriptor {
    pub fn new(raw_type: impl Into<String>, type_arguments: Vec<GenericTypeDescriptor>) -> Self {
        GenericTypeDescriptor {
            raw_type: raw_type.into(),
            type_arguments,
        }
    }

    /// A type without arguments
    pub fn leaf(raw_type: impl Into<String>) -> Self {
        Self::new(raw_type, Vec::new())
    }

    /// A `_` placeholder, matching any argument
    pub fn wildcard() -> Self {
        Self::leaf(WILDCARD)
    }

    /// Reifies the descriptor of `T` from its type name
    pub fn of<T: ?Sized + 'static>() -> Self {
        let name = type_name::<T>();
        Self::parse(name).unwrap_or_else(|_| Self::leaf(name))
    }

    /// Parses a type name such as `app::Mapper<app::ProductDto, app::Product>`.
    ///
    /// Tuples, references, slices and function pointers are kept as opaque leaves.
    pub fn parse(text: &str) -> Result<Self, DiError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DiError::InvalidArgument("empty type name".to_string()));
        }

        let brackets = Brackets::scan(text)?;
        let Some(open) = brackets.first_angle else {
            return Ok(Self::leaf(text));
        };

        let raw_type = text[..open].trim();
        let opaque = raw_type.is_empty() || raw_type.starts_with(['(', '[', '&', '*']);
        if opaque || brackets.first_angle_close != Some(text.len() - 1) {
            return Ok(Self::leaf(text));
        }

        let type_arguments = split_top_level(&text[open + 1..text.len() - 1])
            .into_iter()
            .map(Self::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(raw_type, type_arguments))
    }

    pub fn raw_type(&self) -> &str {
        &self.raw_type
    }

    pub fn type_arguments(&self) -> &[GenericTypeDescriptor] {
        &self.type_arguments
    }

    pub fn is_wildcard(&self) -> bool {
        self.raw_type == WILDCARD
    }

    /// True if no wildcard appears anywhere in the shape
    pub fn is_concrete(&self) -> bool {
        !self.is_wildcard() && self.type_arguments.iter().all(Self::is_concrete)
    }

    /// Simple raw name used for erased keys
    pub fn raw_simple_name(&self) -> String {
        key::raw_simple_name(&self.raw_type)
    }

    /// Compares shapes ignoring module paths and `dyn`
    pub fn matches(&self, other: &GenericTypeDescriptor) -> bool {
        bare_name(&self.raw_type) == bare_name(&other.raw_type)
            && self.type_arguments.len() == other.type_arguments.len()
            && self
                .type_arguments
                .iter()
                .zip(&other.type_arguments)
                .all(|(a, b)| a.matches(b))
    }
}

impl Display for GenericTypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw_type)?;
        if self.type_arguments.is_empty() {
            return Ok(());
        }

        f.write_str("<")?;
        for (i, argument) in self.type_arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{argument}")?;
        }
        f.write_str(">")
    }
}

fn bare_name(raw_type: &str) -> String {
    let simple = key::simple_name(raw_type);
    match simple.strip_prefix("dyn ") {
        Some(bare) => bare.to_owned(),
        None => simple,
    }
}

/// Positions of interest found while checking bracket balance
struct Brackets {
    first_angle: Option<usize>,
    first_angle_close: Option<usize>,
}

impl Brackets {
    fn scan(text: &str) -> Result<Self, DiError> {
        let mut stack = Vec::new();
        let mut first_angle = None;
        let mut first_angle_close = None;
        let mut previous = ' ';

        for (i, c) in text.char_indices() {
            match c {
                '<' | '(' | '[' => {
                    if c == '<' && stack.is_empty() && first_angle.is_none() {
                        first_angle = Some(i);
                    }
                    stack.push(c);
                }
                // `->` of function pointers is not a bracket
                '>' if previous == '-' => {}
                '>' | ')' | ']' => {
                    let expected = match c {
                        '>' => '<',
                        ')' => '(',
                        _ => '[',
                    };
                    if stack.pop() != Some(expected) {
                        return Err(unbalanced(text));
                    }
                    if c == '>' && stack.is_empty() && first_angle_close.is_none() {
                        first_angle_close = Some(i);
                    }
                }
                _ => {}
            }
            previous = c;
        }

        if !stack.is_empty() {
            return Err(unbalanced(text));
        }

        Ok(Brackets {
            first_angle,
            first_angle_close,
        })
    }
}

fn unbalanced(text: &str) -> DiError {
    DiError::InvalidArgument(format!("unbalanced brackets in type name '{text}'"))
}

/// Splits on commas which are not nested in any bracket
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut previous = ' ';

    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' if previous == '-' => {}
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        previous = c;
    }
    parts.push(&text[start..]);
    parts
}

/// A captured generic type, used to resolve `T` through its reified shape
pub struct TypeToken<T: ?Sized> {
    descriptor: GenericTypeDescriptor,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized + 'static> TypeToken<T> {
    /// Captures the shape of `T`
    pub fn new() -> Self {
        TypeToken {
            descriptor: GenericTypeDescriptor::of::<T>(),
            _marker: PhantomData,
        }
    }

    /// A token with a caller supplied shape, e.g. parsed from text.
    ///
    /// The shape is validated when the token is used for resolution.
    pub fn with_descriptor(descriptor: GenericTypeDescriptor) -> Self {
        TypeToken {
            descriptor,
            _marker: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &GenericTypeDescriptor {
        &self.descriptor
    }
}

impl<T: ?Sized + 'static> Default for TypeToken<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for TypeToken<T> {
    fn clone(&self) -> Self {
        TypeToken {
            descriptor: self.descriptor.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for TypeToken<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TypeToken").field(&self.descriptor).finish()
    }
}
