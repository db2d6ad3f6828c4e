//! Minimal WKT1 reader for shapefile `.prj` sidecars (OGC and ESRI flavours).

use anyhow::{anyhow, bail, ensure, Result};

/// A single value inside a WKT node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WktValue {
    Str(String),
    Num(f64),
    Ident(String),
    Node(WktNode),
}

/// `KEYWORD["name", value, CHILD[...], ...]`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WktNode {
    pub(crate) keyword: String,
    pub(crate) args: Vec<WktValue>,
}

impl WktNode {
    /// The quoted name, i.e. the first string argument.
    pub(crate) fn name(&self) -> Option<&str> {
        self.args.iter().find_map(|arg| match arg {
            WktValue::Str(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// The `n`th numeric argument.
    pub(crate) fn number(&self, n: usize) -> Option<f64> {
        self.args.iter()
            .filter_map(|arg| match arg {
                WktValue::Num(v) => Some(*v),
                _ => None,
            })
            .nth(n)
    }

    /// Direct child nodes with the given keyword.
    pub(crate) fn children<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a WktNode> + 'a {
        self.args.iter().filter_map(move |arg| match arg {
            WktValue::Node(node) if node.keyword == keyword => Some(node),
            _ => None,
        })
    }

    /// First direct child node with the given keyword.
    pub(crate) fn child<'a>(&'a self, keyword: &'a str) -> Option<&'a WktNode> {
        self.children(keyword).next()
    }

    /// `AUTHORITY["EPSG","4326"]` on this node, as a number.
    pub(crate) fn epsg(&self) -> Option<u32> {
        let authority = self.child("AUTHORITY")?;
        let mut strings = authority.args.iter().filter_map(|arg| match arg {
            WktValue::Str(s) => Some(s.as_str()),
            _ => None,
        });
        match (strings.next(), strings.next()) {
            (Some(name), Some(code)) if name.eq_ignore_ascii_case("EPSG") => code.trim().parse().ok(),
            (Some(name), None) if name.eq_ignore_ascii_case("EPSG") => authority.number(0).map(|v| v as u32),
            _ => None,
        }
    }
}

/// Parse WKT text into its root node.
pub(crate) fn parse(text: &str) -> Result<WktNode> {
    let mut parser = Parser { src: text.as_bytes(), pos: 0 };
    parser.skip_ws();
    ensure!(parser.pos < parser.src.len(), "empty CRS definition");

    let root = parser.node()?;
    parser.skip_ws();
    ensure!(parser.pos == parser.src.len(), "trailing characters after CRS definition at byte {}", parser.pos);
    Ok(root)
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> { self.src.get(self.pos).copied() }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) { self.pos += 1 }
    }

    fn ident(&mut self) -> Result<String> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_') { self.pos += 1 }
        ensure!(self.pos > start, "expected keyword at byte {}", start);
        Ok(String::from_utf8_lossy(&self.src[start..self.pos]).to_ascii_uppercase())
    }

    fn node(&mut self) -> Result<WktNode> {
        let keyword = self.ident()?;
        self.skip_ws();
        let close = match self.peek() {
            Some(b'[') => b']',
            Some(b'(') => b')',
            _ => bail!("expected '[' after {keyword} at byte {}", self.pos),
        };
        self.pos += 1;

        let mut args = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b) if b == close => {
                    self.pos += 1;
                    break;
                }
                None => bail!("unterminated {keyword} node"),
                _ => {}
            }
            if !args.is_empty() {
                ensure!(self.peek() == Some(b','), "expected ',' in {keyword} at byte {}", self.pos);
                self.pos += 1;
                self.skip_ws();
            }
            args.push(self.value()?);
        }

        Ok(WktNode { keyword, args })
    }

    fn value(&mut self) -> Result<WktValue> {
        match self.peek().ok_or_else(|| anyhow!("unexpected end of CRS definition"))? {
            b'"' => self.string().map(WktValue::Str),
            b'-' | b'+' | b'.' | b'0'..=b'9' => self.number().map(WktValue::Num),
            b if b.is_ascii_alphabetic() => {
                let start = self.pos;
                let ident = self.ident()?;
                self.skip_ws();
                if matches!(self.peek(), Some(b'[') | Some(b'(')) {
                    self.pos = start;
                    self.node().map(WktValue::Node)
                } else {
                    Ok(WktValue::Ident(ident))
                }
            }
            other => bail!("unexpected character {:?} at byte {}", other as char, self.pos),
        }
    }

    fn string(&mut self) -> Result<String> {
        self.pos += 1; // opening quote
        let mut out = Vec::new();
        loop {
            match self.peek() {
                None => bail!("unterminated string in CRS definition"),
                Some(b'"') if self.src.get(self.pos + 1) == Some(&b'"') => {
                    out.push(b'"');
                    self.pos += 2;
                }
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b) => {
                    out.push(b);
                    self.pos += 1;
                }
            }
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn number(&mut self) -> Result<f64> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E')) {
            self.pos += 1
        }
        let text = std::str::from_utf8(&self.src[start..self.pos])?;
        text.parse::<f64>()
            .map_err(|e| anyhow!("invalid number {text:?} at byte {start}: {e}"))
    }
}
