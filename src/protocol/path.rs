//! Typed path expressions over a parsed response
//!
//! Supports the small subset of XPath the API needs:
//! - Child steps (`query/pages/page`)
//! - Descendant steps (`//query-continue`, `query//rev`)
//! - Wildcard element steps (`*`)
//! - A terminal attribute step: `@name`, `@*`, or a choice `@(apfrom|apcontinue)`
//!
//! Paths starting with `/` are absolute (evaluated from the document node);
//! anything else is evaluated relative to the element it is applied to.

use super::document::Element;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Element name test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    Any,
    Named(String),
}

impl NameTest {
    fn matches(&self, element: &Element) -> bool {
        match self {
            NameTest::Any => true,
            NameTest::Named(n) => element.name() == n,
        }
    }
}

/// Attribute name test for the terminal step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrTest {
    Any,
    /// Matches when the attribute name equals any of the candidates.
    OneOf(Vec<String>),
}

impl AttrTest {
    fn matches(&self, name: &str) -> bool {
        match self {
            AttrTest::Any => true,
            AttrTest::OneOf(names) => names.iter().any(|n| n == name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Child(NameTest),
    Descendant(NameTest),
    Attribute(AttrTest),
}

/// One match of a path: an element, or an attribute of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selected<'a> {
    Element(&'a Element),
    Attribute { name: &'a str, value: &'a str },
}

impl<'a> Selected<'a> {
    /// Attribute value, or the element's text.
    pub fn value(&self) -> Option<String> {
        match self {
            Selected::Element(e) => e.text(),
            Selected::Attribute { value, .. } => Some(value.to_string()),
        }
    }

    pub fn as_element(&self) -> Option<&'a Element> {
        match self {
            Selected::Element(e) => Some(*e),
            Selected::Attribute { .. } => None,
        }
    }
}

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocPath {
    absolute: bool,
    steps: Vec<Step>,
}

impl DocPath {
    /// Empty path evaluated from the element it is applied to.
    pub fn relative() -> Self {
        Self {
            absolute: false,
            steps: Vec::new(),
        }
    }

    /// Empty path evaluated from the document node.
    pub fn absolute() -> Self {
        Self {
            absolute: true,
            steps: Vec::new(),
        }
    }

    pub fn child(mut self, name: impl Into<String>) -> Self {
        self.steps.push(Step::Child(name_test(name.into())));
        self
    }

    pub fn descendant(mut self, name: impl Into<String>) -> Self {
        self.steps.push(Step::Descendant(name_test(name.into())));
        self
    }

    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let test = if name == "*" {
            AttrTest::Any
        } else {
            AttrTest::OneOf(vec![name])
        };
        self.steps.push(Step::Attribute(test));
        self
    }

    /// Terminal step matching the first attribute whose name is one of `names`.
    pub fn attribute_any_of<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.into_iter().map(Into::into).collect();
        self.steps.push(Step::Attribute(AttrTest::OneOf(names)));
        self
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Prefix this (relative) path with `base`. Absolute paths are returned unchanged.
    pub fn scoped_under(self, base: &DocPath) -> DocPath {
        if self.absolute {
            return self;
        }
        let mut steps = base.steps.clone();
        steps.extend(self.steps);
        DocPath {
            absolute: base.absolute,
            steps,
        }
    }

    /// All matches in document order.
    pub fn select<'a>(&self, root: &'a Element) -> Vec<Selected<'a>> {
        let mut steps = self.steps.iter();

        let mut nodes: Vec<&'a Element> = if self.absolute {
            // The document node has a single child: the root element.
            match steps.next() {
                None => return Vec::new(),
                Some(Step::Child(test)) => {
                    if test.matches(root) {
                        vec![root]
                    } else {
                        Vec::new()
                    }
                }
                Some(Step::Descendant(test)) => std::iter::once(root)
                    .chain(root.descendants())
                    .filter(|e| test.matches(e))
                    .collect(),
                Some(Step::Attribute(_)) => return Vec::new(),
            }
        } else {
            vec![root]
        };

        for step in steps {
            match step {
                Step::Child(test) => {
                    nodes = nodes
                        .into_iter()
                        .flat_map(|n| n.elements().filter(move |e| test.matches(e)))
                        .collect();
                }
                Step::Descendant(test) => {
                    let single = nodes.len() == 1;
                    let mut out: Vec<&'a Element> = Vec::new();
                    for node in nodes {
                        for e in node.descendants() {
                            if !test.matches(e) {
                                continue;
                            }
                            // nested context nodes share descendants
                            if single || !out.iter().any(|seen| std::ptr::eq(*seen, e)) {
                                out.push(e);
                            }
                        }
                    }
                    nodes = out;
                }
                Step::Attribute(test) => {
                    return nodes
                        .into_iter()
                        .flat_map(|n| {
                            n.attributes()
                                .filter(move |(name, _)| test.matches(name))
                                .map(|(name, value)| Selected::Attribute { name, value })
                        })
                        .collect();
                }
            }
        }

        nodes.into_iter().map(Selected::Element).collect()
    }

    pub fn first<'a>(&self, root: &'a Element) -> Option<Selected<'a>> {
        self.select(root).into_iter().next()
    }

    pub fn first_element<'a>(&self, root: &'a Element) -> Option<&'a Element> {
        self.select(root).into_iter().find_map(|s| s.as_element())
    }

    /// Value of the first match (attribute value or element text).
    pub fn first_value(&self, root: &Element) -> Option<String> {
        self.first(root).and_then(|s| s.value())
    }
}

fn name_test(name: String) -> NameTest {
    if name == "*" {
        NameTest::Any
    } else {
        NameTest::Named(name)
    }
}

impl FromStr for DocPath {
    type Err = PathError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(PathError::InvalidPath("empty path".to_string()));
        }

        let mut path = if expr.starts_with('/') {
            DocPath::absolute()
        } else {
            DocPath::relative()
        };

        let mut rest = expr;
        while !rest.is_empty() {
            let descendant = if let Some(r) = rest.strip_prefix("//") {
                rest = r;
                true
            } else if let Some(r) = rest.strip_prefix('/') {
                rest = r;
                false
            } else {
                // only the first segment of a relative path lacks a separator
                if !path.steps.is_empty() {
                    return Err(PathError::InvalidPath(expr.to_string()));
                }
                false
            };

            let end = segment_end(rest);
            let segment = &rest[..end];
            rest = &rest[end..];

            if segment.is_empty() {
                return Err(PathError::InvalidPath(format!("empty step in '{}'", expr)));
            }
            if matches!(path.steps.last(), Some(Step::Attribute(_))) {
                return Err(PathError::InvalidPath(format!(
                    "attribute step must be last in '{}'",
                    expr
                )));
            }

            if let Some(attr) = segment.strip_prefix('@') {
                if descendant {
                    return Err(PathError::InvalidPath(format!(
                        "attribute step cannot follow '//' in '{}'",
                        expr
                    )));
                }
                path = match attr.strip_prefix('(').and_then(|a| a.strip_suffix(')')) {
                    Some(choice) => {
                        path.attribute_any_of(choice.split('|').map(str::trim).filter(|s| !s.is_empty()))
                    }
                    None if !attr.is_empty() => path.attribute(attr),
                    None => {
                        return Err(PathError::InvalidPath(format!(
                            "empty attribute name in '{}'",
                            expr
                        )))
                    }
                };
            } else if descendant {
                path = path.descendant(segment);
            } else {
                path = path.child(segment);
            }
        }

        Ok(path)
    }
}

// A choice like `@(a|b)` never contains '/', so the segment ends at the next slash.
fn segment_end(s: &str) -> usize {
    s.find('/').unwrap_or(s.len())
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            let sep = match step {
                Step::Descendant(_) => "//",
                _ if i == 0 && !self.absolute => "",
                _ => "/",
            };
            f.write_str(sep)?;
            match step {
                Step::Child(t) | Step::Descendant(t) => match t {
                    NameTest::Any => f.write_str("*")?,
                    NameTest::Named(n) => f.write_str(n)?,
                },
                Step::Attribute(AttrTest::Any) => f.write_str("@*")?,
                Step::Attribute(AttrTest::OneOf(names)) if names.len() == 1 => {
                    write!(f, "@{}", names[0])?
                }
                Step::Attribute(AttrTest::OneOf(names)) => write!(f, "@({})", names.join("|"))?,
            }
        }
        Ok(())
    }
}
