//! LaTeX math detection and conversion to Office math.
//!
//! Conversion runs in two stages: LaTeX is parsed into a presentation
//! MathML tree by a [`LatexToMathMl`] front end, and the MathML tree is
//! rewritten into OMML by [`mathml_to_omml`]. At most one span per
//! paragraph is converted.
//!
//! # Example
//!
//! ```
//! use docfmt::math::MathConverter;
//! use docfmt::model::{MathKind, Paragraph};
//!
//! let mut p = Paragraph::with_text("$$E = mc^2$$");
//! let outcome = MathConverter::builtin().convert_paragraph(&mut p).unwrap();
//! assert!(outcome.is_converted());
//! assert_eq!(p.math_kind(), Some(MathKind::Display));
//! ```

mod convert;
pub mod detect;
pub mod latex;
pub mod omml;

pub use convert::{Conversion, MathConverter};
pub use detect::{find_span, MathSpan};
pub use latex::{BuiltinLatex, LatexToMathMl, NoLatex};
pub use omml::mathml_to_omml;
