//! Dataset descriptors.
//!
//! A descriptor names the grid type and dimensions, the element type and the
//! raw files holding per-vertex means and standard deviations:
//!
//! ```text
//! ; 64³ scalar Gaussian field
//! gtype regular
//! xdim 64
//! ydim 64
//! zdim 64
//! dtype gaussian
//! tuples 1
//! mfile mean.raw
//! sfile "std dev.raw"
//! ```
//!
//! The text form is the INFO property-tree format: `key value` per line, `;`
//! starts a comment, values may be quoted and `{ }` opens a nested block.
//! Descriptors ending in `.json` are read with `serde_json` instead.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LoadError;

/// Grid types the loader can build.
pub const SUPPORTED_GTYPES: &[&str] = &["regular"];
/// Element types the loader can build.
pub const SUPPORTED_DTYPES: &[&str] = &["gaussian"];

/// How loaded values are exposed to queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemPolicy {
    /// Distributions are interpolated, callers sample the result.
    #[default]
    Raw,
    /// Every vertex is sampled on access, samples are interpolated.
    Sampled {
        /// Seed for reproducible draws; OS entropy when absent
        seed: Option<u64>,
    },
}

/// Parsed dataset descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    /// Grid type
    pub gtype: String,
    /// Vertex count along x
    pub xdim: usize,
    /// Vertex count along y
    pub ydim: usize,
    /// Vertex count along z
    pub zdim: usize,
    /// Element type
    pub dtype: String,
    /// Components per vertex (1 = scalar, 3 = vector)
    pub tuples: usize,
    /// Mean array file
    pub mfile: PathBuf,
    /// Standard deviation array file
    pub sfile: PathBuf,
    /// Access policy (`raw` or `sampled`)
    #[serde(default)]
    pub policy: Option<String>,
    /// Seed for the sampled policy
    #[serde(default)]
    pub seed: Option<u64>,
}

impl DatasetDescriptor {
    /// Read a descriptor file, choosing the format by extension.
    ///
    /// # Errors
    /// [`LoadError::Io`] if the file cannot be read, otherwise any parse or
    /// configuration error of the content.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&text)
        } else {
            Self::from_info(&text)
        }
    }

    /// Parse a JSON descriptor.
    ///
    /// # Errors
    /// [`LoadError::Parse`] for malformed JSON or missing fields.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        serde_json::from_str(text).map_err(|e| LoadError::Parse {
            line: e.line(),
            message: e.to_string(),
        })
    }

    /// Parse an INFO-format descriptor.
    ///
    /// # Errors
    /// [`LoadError::Parse`] for malformed syntax, [`LoadError::Configuration`]
    /// for a missing key, a non-numeric number, or an unsupported `gtype`.
    pub fn from_info(text: &str) -> Result<Self, LoadError> {
        let tree = InfoTree::parse(text)?;

        let gtype = tree.required("gtype")?.to_string();
        if !SUPPORTED_GTYPES.contains(&gtype.as_str()) {
            return Err(LoadError::config(format!("gtype not supported: {gtype}")));
        }

        let descriptor = Self {
            gtype,
            xdim: tree.number("xdim")?,
            ydim: tree.number("ydim")?,
            zdim: tree.number("zdim")?,
            dtype: tree.required("dtype")?.to_string(),
            tuples: tree.number("tuples")?,
            mfile: PathBuf::from(tree.required("mfile")?),
            sfile: PathBuf::from(tree.required("sfile")?),
            policy: tree.get("policy").map(|n| n.value.clone()),
            seed: tree.get("seed").map(|_| tree.number("seed")).transpose()?,
        };
        debug!(?descriptor, "descriptor parsed");
        Ok(descriptor)
    }

    /// Vertex counts along x, y and z.
    #[must_use]
    pub fn dimensions(&self) -> [usize; 3] {
        [self.xdim, self.ydim, self.zdim]
    }

    /// Reject grid types, element types, tuple counts and policies the loader
    /// cannot build.
    ///
    /// # Errors
    /// [`LoadError::Configuration`] naming the unsupported value.
    pub fn validate(&self) -> Result<(), LoadError> {
        if !SUPPORTED_GTYPES.contains(&self.gtype.as_str()) {
            return Err(LoadError::config(format!("gtype not supported: {}", self.gtype)));
        }
        if !SUPPORTED_DTYPES.contains(&self.dtype.as_str()) {
            return Err(LoadError::config(format!("dtype not supported: {}", self.dtype)));
        }
        if self.tuples != 1 && self.tuples != 3 {
            return Err(LoadError::config(format!(
                "tuple size {} not supported",
                self.tuples
            )));
        }
        self.item_policy().map(|_| ())
    }

    /// Access policy requested by the descriptor (`raw` when absent).
    ///
    /// # Errors
    /// [`LoadError::Configuration`] for an unknown policy name.
    pub fn item_policy(&self) -> Result<ItemPolicy, LoadError> {
        match self.policy.as_deref() {
            None | Some("raw") => Ok(ItemPolicy::Raw),
            Some("sampled") => Ok(ItemPolicy::Sampled { seed: self.seed }),
            Some(other) => Err(LoadError::config(format!("policy not supported: {other}"))),
        }
    }

    /// Resolve bare file names against `dir` (the descriptor's directory).
    ///
    /// Paths with a directory part are left untouched.
    pub fn resolve_paths(&mut self, dir: &Path) {
        for file in [&mut self.mfile, &mut self.sfile] {
            if is_filename_only(file) {
                *file = dir.join(&*file);
            }
        }
    }
}

fn is_filename_only(path: &Path) -> bool {
    let mut components = path.components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Node of an INFO property tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoTree {
    /// Value of this node (empty when only children are given)
    pub value: String,
    /// Child nodes in file order; keys may repeat
    pub children: Vec<(String, InfoTree)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Open,
    Close,
    Newline,
}

impl InfoTree {
    /// Parse INFO text into a tree rooted at an unnamed node.
    ///
    /// # Errors
    /// [`LoadError::Parse`] for unbalanced braces or unterminated quotes.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let tokens = tokenize(text)?;
        let mut pos = 0;
        let children = parse_block(&tokens, &mut pos, None)?;
        Ok(Self {
            value: String::new(),
            children,
        })
    }

    /// First child with `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&InfoTree> {
        self.children
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    fn required(&self, key: &str) -> Result<&str, LoadError> {
        self.get(key)
            .map(|node| node.value.as_str())
            .ok_or_else(|| LoadError::config(format!("missing key: {key}")))
    }

    fn number<T: FromStr>(&self, key: &str) -> Result<T, LoadError> {
        let raw = self.required(key)?;
        raw.parse()
            .map_err(|_| LoadError::config(format!("{key}: expected a number, got '{raw}'")))
    }
}

fn tokenize(text: &str) -> Result<Vec<(usize, Token)>, LoadError> {
    let mut tokens = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let mut chars = line.chars().peekable();
        while let Some(&c) = chars.peek() {
            match c {
                ';' => break,
                '{' => {
                    chars.next();
                    tokens.push((line_no, Token::Open));
                }
                '}' => {
                    chars.next();
                    tokens.push((line_no, Token::Close));
                }
                '"' => {
                    chars.next();
                    let mut word = String::new();
                    let mut closed = false;
                    while let Some(c) = chars.next() {
                        match c {
                            '"' => {
                                closed = true;
                                break;
                            }
                            '\\' => {
                                if let Some(escaped) = chars.next() {
                                    word.push(match escaped {
                                        'n' => '\n',
                                        't' => '\t',
                                        other => other,
                                    });
                                }
                            }
                            other => word.push(other),
                        }
                    }
                    if !closed {
                        return Err(LoadError::Parse {
                            line: line_no,
                            message: "unterminated string".to_string(),
                        });
                    }
                    tokens.push((line_no, Token::Word(word)));
                }
                c if c.is_whitespace() => {
                    chars.next();
                }
                _ => {
                    let mut word = String::new();
                    while let Some(&c) = chars.peek() {
                        if c.is_whitespace() || matches!(c, ';' | '{' | '}' | '"') {
                            break;
                        }
                        word.push(c);
                        chars.next();
                    }
                    tokens.push((line_no, Token::Word(word)));
                }
            }
        }
        tokens.push((line_no, Token::Newline));
    }
    Ok(tokens)
}

/// Parse entries until the matching `}` (when `opened_at` is set) or the end.
fn parse_block(
    tokens: &[(usize, Token)],
    pos: &mut usize,
    opened_at: Option<usize>,
) -> Result<Vec<(String, InfoTree)>, LoadError> {
    let mut entries: Vec<(String, InfoTree)> = Vec::new();
    while let Some((line, token)) = tokens.get(*pos) {
        *pos += 1;
        match token {
            Token::Newline => {}
            Token::Close => {
                return match opened_at {
                    Some(_) => Ok(entries),
                    None => Err(LoadError::Parse {
                        line: *line,
                        message: "unexpected '}'".to_string(),
                    }),
                };
            }
            // A brace on its own line belongs to the previous key
            Token::Open => {
                let Some((_, parent)) = entries.last_mut() else {
                    return Err(LoadError::Parse {
                        line: *line,
                        message: "'{' without a key".to_string(),
                    });
                };
                if !parent.children.is_empty() {
                    return Err(LoadError::Parse {
                        line: *line,
                        message: "second block for one key".to_string(),
                    });
                }
                parent.children = parse_block(tokens, pos, Some(*line))?;
            }
            Token::Word(key) => {
                let mut node = InfoTree::default();
                if let Some((_, Token::Word(value))) = tokens.get(*pos) {
                    node.value.clone_from(value);
                    *pos += 1;
                }
                if let Some((open_line, Token::Open)) = tokens.get(*pos) {
                    *pos += 1;
                    node.children = parse_block(tokens, pos, Some(*open_line))?;
                }
                entries.push((key.clone(), node));
            }
        }
    }
    match opened_at {
        Some(line) => Err(LoadError::Parse {
            line,
            message: "unclosed '{'".to_string(),
        }),
        None => Ok(entries),
    }
}
