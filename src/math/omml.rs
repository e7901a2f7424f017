//! Presentation MathML to Office math (OMML).
//!
//! The conversion is a recursive element rewrite driven by [`RULES`]. Each
//! MathML element name maps to one [`Rewrite`]; elements not in the table
//! pass their children through.

use crate::model::xml::XmlElement;

/// How one MathML element is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    /// Emit the converted children in place
    Passthrough,
    /// A text leaf becomes an `m:r` run; `plain` switches off math italics
    Leaf { plain: bool },
    /// Positional children are placed into named slots of a container
    Slots {
        tag: &'static str,
        slots: &'static [&'static str],
    },
    /// Square root: radical with a hidden degree
    SquareRoot,
    /// Root with an explicit index (radicand first, index second)
    Root,
}

/// The rewrite table, keyed by MathML local name.
pub const RULES: &[(&str, Rewrite)] = &[
    ("math", Rewrite::Passthrough),
    ("mrow", Rewrite::Passthrough),
    ("mi", Rewrite::Leaf { plain: false }),
    ("mn", Rewrite::Leaf { plain: false }),
    ("mo", Rewrite::Leaf { plain: false }),
    ("mtext", Rewrite::Leaf { plain: true }),
    (
        "mfrac",
        Rewrite::Slots {
            tag: "m:f",
            slots: &["m:num", "m:den"],
        },
    ),
    (
        "msup",
        Rewrite::Slots {
            tag: "m:sSup",
            slots: &["m:e", "m:sup"],
        },
    ),
    (
        "msub",
        Rewrite::Slots {
            tag: "m:sSub",
            slots: &["m:e", "m:sub"],
        },
    ),
    (
        "msubsup",
        Rewrite::Slots {
            tag: "m:sSubSup",
            slots: &["m:e", "m:sub", "m:sup"],
        },
    ),
    (
        "munderover",
        Rewrite::Slots {
            tag: "m:sSubSup",
            slots: &["m:e", "m:sub", "m:sup"],
        },
    ),
    ("msqrt", Rewrite::SquareRoot),
    ("mroot", Rewrite::Root),
];

/// Look up the rewrite for an element name.
pub fn rewrite_for(local_name: &str) -> Rewrite {
    RULES
        .iter()
        .find(|(name, _)| *name == local_name)
        .map(|(_, rewrite)| *rewrite)
        .unwrap_or(Rewrite::Passthrough)
}

/// Convert a MathML `math` tree into an `m:oMath` element.
pub fn mathml_to_omml(math: &XmlElement) -> XmlElement {
    let mut omath = XmlElement::new("m:oMath");
    for el in convert(math) {
        omath.push(el);
    }
    omath
}

fn convert(el: &XmlElement) -> Vec<XmlElement> {
    match rewrite_for(el.local_name()) {
        Rewrite::Passthrough => convert_children(el),
        Rewrite::Leaf { plain } => vec![math_run(&el.text_content(), plain)],
        Rewrite::Slots { tag, slots } => {
            let args: Vec<&XmlElement> = el.elements().collect();
            let mut out = XmlElement::new(tag);
            for (i, slot) in slots.iter().enumerate() {
                out.push(container(slot, args.get(i).map(|a| convert(a)).unwrap_or_default()));
            }
            vec![out]
        }
        Rewrite::SquareRoot => vec![XmlElement::new("m:rad")
            .with_child(
                XmlElement::new("m:radPr")
                    .with_child(XmlElement::new("m:degHide").with_attr("m:val", "1")),
            )
            .with_child(XmlElement::new("m:deg"))
            .with_child(container("m:e", convert_children(el)))],
        Rewrite::Root => {
            let args: Vec<&XmlElement> = el.elements().collect();
            let part = |i: usize| args.get(i).map(|a| convert(a)).unwrap_or_default();
            vec![XmlElement::new("m:rad")
                .with_child(container("m:deg", part(1)))
                .with_child(container("m:e", part(0)))]
        }
    }
}

fn convert_children(el: &XmlElement) -> Vec<XmlElement> {
    el.elements().flat_map(convert).collect()
}

fn container(name: &str, children: Vec<XmlElement>) -> XmlElement {
    let mut el = XmlElement::new(name);
    for child in children {
        el.push(child);
    }
    el
}

fn math_run(text: &str, plain: bool) -> XmlElement {
    let mut run = XmlElement::new("m:r");
    if plain {
        run.push(
            XmlElement::new("m:rPr").with_child(XmlElement::new("m:sty").with_attr("m:val", "p")),
        );
    }
    let mut t = XmlElement::new("m:t");
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        t = t.with_attr("xml:space", "preserve");
    }
    run.push(t.with_text(text));
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::latex::{BuiltinLatex, LatexToMathMl};

    fn omml(latex: &str) -> XmlElement {
        mathml_to_omml(&BuiltinLatex::new().to_mathml(latex, false).unwrap())
    }

    fn names(el: &XmlElement) -> Vec<&str> {
        el.elements().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_leaves_become_runs() {
        let math = omml("a+b");
        assert_eq!(math.name, "m:oMath");
        assert_eq!(names(&math), vec!["m:r", "m:r", "m:r"]);
        assert_eq!(math.text_content(), "a+b");
    }

    #[test]
    fn test_fraction_slots() {
        let math = omml("\\frac{1}{x}");
        let f = math.child("m:f").unwrap();
        assert_eq!(names(f), vec!["m:num", "m:den"]);
        assert_eq!(f.child("m:den").unwrap().text_content(), "x");
    }

    #[test]
    fn test_scripts() {
        assert_eq!(names(omml("x^2").child("m:sSup").unwrap()), vec!["m:e", "m:sup"]);
        assert_eq!(names(omml("x_2").child("m:sSub").unwrap()), vec!["m:e", "m:sub"]);
        let both = omml("x_i^n");
        let el = both.child("m:sSubSup").unwrap();
        assert_eq!(names(el), vec!["m:e", "m:sub", "m:sup"]);
        assert_eq!(el.child("m:sup").unwrap().text_content(), "n");
    }

    #[test]
    fn test_square_root_hides_degree() {
        let math = omml("\\sqrt{x+1}");
        let rad = math.child("m:rad").unwrap();
        assert_eq!(names(rad), vec!["m:radPr", "m:deg", "m:e"]);
        assert_eq!(rad.find("m:degHide").unwrap().attr("m:val"), Some("1"));
        assert_eq!(rad.child("m:e").unwrap().text_content(), "x+1");
    }

    #[test]
    fn test_nth_root_keeps_degree() {
        let rad = omml("\\sqrt[3]{y}").child("m:rad").cloned().unwrap();
        assert_eq!(names(&rad), vec!["m:deg", "m:e"]);
        assert_eq!(rad.child("m:deg").unwrap().text_content(), "3");
    }

    #[test]
    fn test_unknown_elements_pass_through() {
        let math = XmlElement::new("math").with_child(
            XmlElement::new("mstyle").with_child(XmlElement::new("mi").with_text("z")),
        );
        let out = mathml_to_omml(&math);
        assert_eq!(names(&out), vec!["m:r"]);
        assert_eq!(rewrite_for("mpadded"), Rewrite::Passthrough);
    }

    #[test]
    fn test_text_is_upright() {
        let math = omml("\\text{ if }");
        let run = math.child("m:r").unwrap();
        assert!(run.find("m:sty").is_some());
        assert_eq!(run.child("m:t").unwrap().attr("xml:space"), Some("preserve"));
    }
}
