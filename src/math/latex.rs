//! LaTeX to presentation MathML.
//!
//! The converter is a pluggable collaborator behind [`LatexToMathMl`]. The
//! built-in implementation is a small recursive-descent parser covering the
//! notation that shows up in ordinary documents: groups, scripts,
//! fractions, roots, Greek letters, common operators, `\text` and
//! `\left`/`\right` delimiters. Anything it does not understand is a
//! [`Error::LatexSyntax`].

use crate::error::{Error, Result};
use crate::model::xml::XmlElement;

/// MathML namespace for the root `math` element.
pub const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";

/// Converts LaTeX source into a MathML `math` element.
pub trait LatexToMathMl: Send + Sync {
    /// Name of this converter (for diagnostics).
    fn name(&self) -> &str;

    /// Convert `latex` into a MathML tree rooted at `math`.
    fn to_mathml(&self, latex: &str, display: bool) -> Result<XmlElement>;
}

/// The built-in recursive-descent converter.
#[derive(Debug, Clone, Default)]
pub struct BuiltinLatex {
    _private: (),
}

impl BuiltinLatex {
    /// Create the built-in converter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl LatexToMathMl for BuiltinLatex {
    fn name(&self) -> &str {
        "builtin"
    }

    fn to_mathml(&self, latex: &str, display: bool) -> Result<XmlElement> {
        let mut parser = Parser::new(latex);
        let items = parser.parse_expr(Stop::End)?;
        if items.is_empty() {
            return Err(syntax("empty formula"));
        }
        let mut math = XmlElement::new("math")
            .with_attr("xmlns", MATHML_NS)
            .with_attr("display", if display { "block" } else { "inline" });
        for item in items {
            math.push(item);
        }
        Ok(math)
    }
}

/// A converter that is never available.
///
/// Every conversion fails, so spans stay unconverted and are reported.
#[derive(Debug, Clone, Default)]
pub struct NoLatex {
    _private: (),
}

impl NoLatex {
    /// Create the absent converter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl LatexToMathMl for NoLatex {
    fn name(&self) -> &str {
        "none"
    }

    fn to_mathml(&self, _latex: &str, _display: bool) -> Result<XmlElement> {
        Err(Error::Conversion("no LaTeX converter available".into()))
    }
}

fn syntax(msg: impl Into<String>) -> Error {
    Error::LatexSyntax(msg.into())
}

fn leaf(name: &str, text: impl Into<String>) -> XmlElement {
    XmlElement::new(name).with_text(text)
}

/// Collapse a list of items into one element, wrapping in `mrow` if needed.
fn row(mut items: Vec<XmlElement>) -> XmlElement {
    if items.len() == 1 {
        if let Some(only) = items.pop() {
            return only;
        }
    }
    let mut mrow = XmlElement::new("mrow");
    for item in items {
        mrow.push(item);
    }
    mrow
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    End,
    Brace,
    Bracket,
    Right,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn at_command(&self, name: &str) -> bool {
        if self.peek() != Some('\\') {
            return false;
        }
        let mut end = self.pos + 1;
        for c in name.chars() {
            if self.chars.get(end) != Some(&c) {
                return false;
            }
            end += 1;
        }
        !self.chars.get(end).is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn parse_expr(&mut self, stop: Stop) -> Result<Vec<XmlElement>> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None => match stop {
                    Stop::End => break,
                    Stop::Brace => return Err(syntax("missing closing brace")),
                    Stop::Bracket => return Err(syntax("missing closing bracket")),
                    Stop::Right => return Err(syntax("\\left without matching \\right")),
                },
                Some('}') => {
                    if stop == Stop::Brace {
                        self.pos += 1;
                        break;
                    }
                    return Err(syntax("unexpected closing brace"));
                }
                Some(']') if stop == Stop::Bracket => {
                    self.pos += 1;
                    break;
                }
                Some('\\') if stop == Stop::Right && self.at_command("right") => break,
                Some('^') | Some('_') => {
                    let base = items.pop().unwrap_or_else(|| XmlElement::new("mrow"));
                    items.push(self.parse_scripts(base)?);
                }
                Some(_) => {
                    if let Some(atom) = self.parse_atom()? {
                        items.push(atom);
                    }
                }
            }
        }
        Ok(items)
    }

    fn parse_scripts(&mut self, base: XmlElement) -> Result<XmlElement> {
        let mut sub = None;
        let mut sup = None;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('^') if sup.is_none() => {
                    self.pos += 1;
                    sup = Some(self.parse_argument()?);
                }
                Some('_') if sub.is_none() => {
                    self.pos += 1;
                    sub = Some(self.parse_argument()?);
                }
                Some('^') => return Err(syntax("double superscript")),
                Some('_') => return Err(syntax("double subscript")),
                _ => break,
            }
        }
        Ok(match (sub, sup) {
            (Some(b), Some(p)) => XmlElement::new("msubsup")
                .with_child(base)
                .with_child(b)
                .with_child(p),
            (Some(b), None) => XmlElement::new("msub").with_child(base).with_child(b),
            (None, Some(p)) => XmlElement::new("msup").with_child(base).with_child(p),
            (None, None) => base,
        })
    }

    /// A braced group or a single atom.
    fn parse_argument(&mut self) -> Result<XmlElement> {
        self.skip_ws();
        if self.peek() == Some('{') {
            self.pos += 1;
            return Ok(row(self.parse_expr(Stop::Brace)?));
        }
        match self.peek() {
            None | Some('}') | Some('^') | Some('_') => Err(syntax("missing argument")),
            Some(_) => self
                .parse_atom()?
                .ok_or_else(|| syntax("missing argument")),
        }
    }

    fn parse_atom(&mut self) -> Result<Option<XmlElement>> {
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        match c {
            '{' => {
                self.pos += 1;
                Ok(Some(row(self.parse_expr(Stop::Brace)?)))
            }
            '\\' => {
                self.pos += 1;
                self.parse_command()
            }
            c if c.is_ascii_digit() || (c == '.' && self.next_is_digit()) => {
                Ok(Some(leaf("mn", self.take_number())))
            }
            c if c.is_alphabetic() => {
                self.pos += 1;
                Ok(Some(leaf("mi", c.to_string())))
            }
            '\'' => {
                self.pos += 1;
                Ok(Some(leaf("mo", "\u{2032}")))
            }
            '&' | '#' | '$' | '%' => Err(syntax(format!("unexpected character '{}'", c))),
            c => {
                self.pos += 1;
                Ok(Some(leaf("mo", c.to_string())))
            }
        }
    }

    fn next_is_digit(&self) -> bool {
        self.chars
            .get(self.pos + 1)
            .is_some_and(|c| c.is_ascii_digit())
    }

    fn take_number(&mut self) -> String {
        let mut number = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || (c == '.' && self.next_is_digit()) {
                number.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        number
    }

    fn command_name(&mut self) -> Result<String> {
        let mut name = String::new();
        while let Some(c) = self.peek().filter(char::is_ascii_alphabetic) {
            name.push(c);
            self.pos += 1;
        }
        if name.is_empty() {
            let c = self.bump().ok_or_else(|| syntax("dangling backslash"))?;
            name.push(c);
        }
        Ok(name)
    }

    /// Raw text up to the matching closing brace.
    fn braced_text(&mut self) -> Result<String> {
        self.skip_ws();
        if self.bump() != Some('{') {
            return Err(syntax("expected '{'"));
        }
        let mut depth = 0usize;
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(syntax("missing closing brace")),
                Some('{') => {
                    depth += 1;
                    text.push('{');
                }
                Some('}') if depth == 0 => break,
                Some('}') => {
                    depth -= 1;
                    text.push('}');
                }
                Some(c) => text.push(c),
            }
        }
        Ok(text)
    }

    fn parse_delimiter(&mut self) -> Result<Option<String>> {
        self.skip_ws();
        match self.bump() {
            None => Err(syntax("missing delimiter")),
            Some('.') => Ok(None),
            Some('\\') => {
                let name = self.command_name()?;
                let symbol = match name.as_str() {
                    "{" => "{",
                    "}" => "}",
                    "|" => "\u{2016}",
                    "langle" => "\u{27E8}",
                    "rangle" => "\u{27E9}",
                    "lfloor" => "\u{230A}",
                    "rfloor" => "\u{230B}",
                    "lceil" => "\u{2308}",
                    "rceil" => "\u{2309}",
                    "vert" => "|",
                    "Vert" => "\u{2016}",
                    other => return Err(syntax(format!("unknown delimiter \\{}", other))),
                };
                Ok(Some(symbol.to_string()))
            }
            Some(c) => Ok(Some(c.to_string())),
        }
    }

    fn parse_command(&mut self) -> Result<Option<XmlElement>> {
        let name = self.command_name()?;
        let el = match name.as_str() {
            "frac" | "dfrac" | "tfrac" => {
                let num = self.parse_argument()?;
                let den = self.parse_argument()?;
                XmlElement::new("mfrac").with_child(num).with_child(den)
            }
            "sqrt" => {
                self.skip_ws();
                let index = if self.peek() == Some('[') {
                    self.pos += 1;
                    Some(row(self.parse_expr(Stop::Bracket)?))
                } else {
                    None
                };
                let radicand = self.parse_argument()?;
                match index {
                    Some(index) => XmlElement::new("mroot").with_child(radicand).with_child(index),
                    None => XmlElement::new("msqrt").with_child(radicand),
                }
            }
            "text" | "textrm" | "textit" | "textbf" | "mbox" | "mathrm" => {
                leaf("mtext", self.braced_text()?)
            }
            "operatorname" => leaf("mi", self.braced_text()?),
            "mathbf" | "mathit" | "mathbb" | "mathcal" | "mathsf" | "mathtt" | "boldsymbol" => {
                self.parse_argument()?
            }
            "left" => {
                let open = self.parse_delimiter()?;
                let body = self.parse_expr(Stop::Right)?;
                // parse_expr stopped on \right
                self.pos += 1;
                self.command_name()?;
                let close = self.parse_delimiter()?;
                let mut items = Vec::new();
                if let Some(open) = open {
                    items.push(leaf("mo", open));
                }
                items.extend(body);
                if let Some(close) = close {
                    items.push(leaf("mo", close));
                }
                let mut mrow = XmlElement::new("mrow");
                for item in items {
                    mrow.push(item);
                }
                mrow
            }
            "right" => return Err(syntax("\\right without matching \\left")),
            "," | ";" | ":" | "!" | " " | "\\" | "displaystyle" | "textstyle" | "limits"
            | "nolimits" => return Ok(None),
            "quad" | "qquad" => leaf("mtext", "\u{2003}"),
            "{" | "}" | "%" | "$" | "#" | "&" | "_" => leaf("mo", name.clone()),
            "|" => leaf("mo", "\u{2016}"),
            other => {
                if let Some(letter) = greek(other) {
                    leaf("mi", letter)
                } else if let Some(op) = operator(other) {
                    leaf("mo", op)
                } else if let Some(symbol) = identifier(other) {
                    leaf("mi", symbol)
                } else if FUNCTIONS.contains(&other) {
                    leaf("mi", other)
                } else {
                    return Err(syntax(format!("unknown command \\{}", other)));
                }
            }
        };
        Ok(Some(el))
    }
}

const FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "cot", "sec", "csc", "arcsin", "arccos", "arctan", "sinh", "cosh",
    "tanh", "log", "ln", "lg", "exp", "lim", "max", "min", "sup", "inf", "det", "gcd", "deg",
    "arg", "dim", "ker", "Pr",
];

fn greek(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "\u{3B1}",
        "beta" => "\u{3B2}",
        "gamma" => "\u{3B3}",
        "delta" => "\u{3B4}",
        "epsilon" => "\u{3F5}",
        "varepsilon" => "\u{3B5}",
        "zeta" => "\u{3B6}",
        "eta" => "\u{3B7}",
        "theta" => "\u{3B8}",
        "vartheta" => "\u{3D1}",
        "iota" => "\u{3B9}",
        "kappa" => "\u{3BA}",
        "lambda" => "\u{3BB}",
        "mu" => "\u{3BC}",
        "nu" => "\u{3BD}",
        "xi" => "\u{3BE}",
        "pi" => "\u{3C0}",
        "varpi" => "\u{3D6}",
        "rho" => "\u{3C1}",
        "varrho" => "\u{3F1}",
        "sigma" => "\u{3C3}",
        "varsigma" => "\u{3C2}",
        "tau" => "\u{3C4}",
        "upsilon" => "\u{3C5}",
        "phi" => "\u{3D5}",
        "varphi" => "\u{3C6}",
        "chi" => "\u{3C7}",
        "psi" => "\u{3C8}",
        "omega" => "\u{3C9}",
        "Gamma" => "\u{393}",
        "Delta" => "\u{394}",
        "Theta" => "\u{398}",
        "Lambda" => "\u{39B}",
        "Xi" => "\u{39E}",
        "Pi" => "\u{3A0}",
        "Sigma" => "\u{3A3}",
        "Upsilon" => "\u{3A5}",
        "Phi" => "\u{3A6}",
        "Psi" => "\u{3A8}",
        "Omega" => "\u{3A9}",
        _ => return None,
    })
}

fn operator(name: &str) -> Option<&'static str> {
    Some(match name {
        "cdot" => "\u{22C5}",
        "times" => "\u{D7}",
        "div" => "\u{F7}",
        "pm" => "\u{B1}",
        "mp" => "\u{2213}",
        "le" | "leq" => "\u{2264}",
        "ge" | "geq" => "\u{2265}",
        "ne" | "neq" => "\u{2260}",
        "approx" => "\u{2248}",
        "equiv" => "\u{2261}",
        "sim" => "\u{223C}",
        "propto" => "\u{221D}",
        "sum" => "\u{2211}",
        "prod" => "\u{220F}",
        "int" => "\u{222B}",
        "iint" => "\u{222C}",
        "oint" => "\u{222E}",
        "to" | "rightarrow" => "\u{2192}",
        "leftarrow" => "\u{2190}",
        "Rightarrow" | "implies" => "\u{21D2}",
        "Leftarrow" => "\u{21D0}",
        "leftrightarrow" => "\u{2194}",
        "Leftrightarrow" | "iff" => "\u{21D4}",
        "mapsto" => "\u{21A6}",
        "in" => "\u{2208}",
        "notin" => "\u{2209}",
        "subset" => "\u{2282}",
        "subseteq" => "\u{2286}",
        "supset" => "\u{2283}",
        "supseteq" => "\u{2287}",
        "cup" => "\u{222A}",
        "cap" => "\u{2229}",
        "setminus" => "\u{2216}",
        "forall" => "\u{2200}",
        "exists" => "\u{2203}",
        "neg" | "lnot" => "\u{AC}",
        "land" | "wedge" => "\u{2227}",
        "lor" | "vee" => "\u{2228}",
        "ldots" | "dots" => "\u{2026}",
        "cdots" => "\u{22EF}",
        "vdots" => "\u{22EE}",
        "ddots" => "\u{22F1}",
        "circ" => "\u{2218}",
        "bullet" => "\u{2219}",
        "ast" => "\u{2217}",
        "star" => "\u{22C6}",
        "oplus" => "\u{2295}",
        "otimes" => "\u{2297}",
        "perp" => "\u{22A5}",
        "parallel" => "\u{2225}",
        "mid" => "\u{2223}",
        "langle" => "\u{27E8}",
        "rangle" => "\u{27E9}",
        "prime" => "\u{2032}",
        _ => return None,
    })
}

fn identifier(name: &str) -> Option<&'static str> {
    Some(match name {
        "infty" => "\u{221E}",
        "partial" => "\u{2202}",
        "nabla" => "\u{2207}",
        "emptyset" | "varnothing" => "\u{2205}",
        "angle" => "\u{2220}",
        "hbar" => "\u{210F}",
        "ell" => "\u{2113}",
        "Re" => "\u{211C}",
        "Im" => "\u{2111}",
        "aleph" => "\u{2135}",
        "degree" => "\u{B0}",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(latex: &str) -> Result<XmlElement> {
        BuiltinLatex::new().to_mathml(latex, false)
    }

    fn names(el: &XmlElement) -> Vec<&str> {
        el.elements().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_simple_sum() {
        let math = convert("a+b").unwrap();
        assert_eq!(math.attr("display"), Some("inline"));
        assert_eq!(names(&math), vec!["mi", "mo", "mi"]);
        assert_eq!(math.text_content(), "a+b");
    }

    #[test]
    fn test_numbers_are_grouped() {
        let math = convert("3.14 + 10").unwrap();
        assert_eq!(names(&math), vec!["mn", "mo", "mn"]);
        assert_eq!(math.elements().next().unwrap().text_content(), "3.14");
    }

    #[test]
    fn test_fraction_and_scripts() {
        let math = convert("\\frac{x^2}{y_1}").unwrap();
        let frac = math.elements().next().unwrap();
        assert_eq!(frac.name, "mfrac");
        assert_eq!(names(frac), vec!["msup", "msub"]);
    }

    #[test]
    fn test_subsup_in_either_order() {
        for src in ["x_i^2", "x^2_i"] {
            let math = convert(src).unwrap();
            let el = math.elements().next().unwrap();
            assert_eq!(el.name, "msubsup");
            let parts: Vec<_> = el.elements().map(|e| e.text_content()).collect();
            assert_eq!(parts, vec!["x", "i", "2"]);
        }
    }

    #[test]
    fn test_roots() {
        let math = convert("\\sqrt{2}").unwrap();
        assert_eq!(names(&math), vec!["msqrt"]);
        let math = convert("\\sqrt[3]{x}").unwrap();
        let root = math.elements().next().unwrap();
        assert_eq!(root.name, "mroot");
        assert_eq!(root.text_content(), "x3");
    }

    #[test]
    fn test_symbols_and_text() {
        let math = convert("\\alpha \\leq \\infty \\text{ if } \\sin x").unwrap();
        assert_eq!(math.text_content(), "\u{3B1}\u{2264}\u{221E} if sinx");
        assert_eq!(names(&math), vec!["mi", "mo", "mi", "mtext", "mi", "mi"]);
    }

    #[test]
    fn test_left_right() {
        let math = convert("\\left( \\frac{a}{b} \\right)").unwrap();
        let group = math.elements().next().unwrap();
        assert_eq!(names(group), vec!["mo", "mfrac", "mo"]);
        let math = convert("\\left. x \\right|").unwrap();
        assert_eq!(names(math.elements().next().unwrap()), vec!["mi", "mo"]);
    }

    #[test]
    fn test_syntax_errors() {
        for bad in ["", "  ", "{a", "a}", "x^", "\\frac{a}", "\\unknowncmd", "\\left( x", "x^1^2"] {
            assert!(
                matches!(convert(bad), Err(Error::LatexSyntax(_))),
                "expected syntax error for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_no_latex_always_fails() {
        assert!(matches!(
            NoLatex::new().to_mathml("x", true),
            Err(Error::Conversion(_))
        ));
    }
}
