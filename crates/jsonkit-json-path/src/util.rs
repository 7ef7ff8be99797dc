//! Canonical text rendering of compiled paths.
//!
//! Compiling the rendered text of a path yields an equal token list.

use std::fmt::{self, Display, Write};

use jsonkit_node::{is_plain_name, write_name_segment, write_quoted_name, JsonValue};

use crate::types::{FilterExpr, Operand, PathToken, RegexLiteral, Slice};
use crate::JsonPath;

impl Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut after_descendant = false;
        for token in self.tokens() {
            write_token(f, token, after_descendant)?;
            after_descendant = matches!(token, PathToken::Descendant);
        }
        Ok(())
    }
}

fn write_token(f: &mut fmt::Formatter<'_>, token: &PathToken, after_descendant: bool) -> fmt::Result {
    match token {
        PathToken::Root => f.write_char('$'),
        PathToken::Current => f.write_char('@'),
        PathToken::Name(name) if after_descendant && is_plain_name(name) => f.write_str(name),
        PathToken::Name(name) => write_name_segment(f, name),
        PathToken::Index(index) => write!(f, "[{index}]"),
        PathToken::Wildcard if after_descendant => f.write_char('*'),
        PathToken::Wildcard => f.write_str(".*"),
        PathToken::Descendant => f.write_str(".."),
        PathToken::Slice(slice) => write!(f, "[{slice}]"),
        PathToken::Union(members) => {
            f.write_char('[')?;
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                match member {
                    PathToken::Name(name) => write_quoted_name(f, name)?,
                    PathToken::Index(index) => write!(f, "{index}")?,
                    PathToken::Slice(slice) => write!(f, "{slice}")?,
                    other => write_token(f, other, false)?,
                }
            }
            f.write_char(']')
        }
        PathToken::Function { name, args } => {
            write!(f, ".{name}(")?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_literal(f, arg)?;
            }
            f.write_char(')')
        }
        PathToken::Filter(expr) => write!(f, "[?{expr}]"),
        PathToken::Append => f.write_str("[-]"),
    }
}

impl Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_token(f, self, false)
    }
}

impl Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        f.write_char(':')?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        if self.step != 1 {
            write!(f, ":{}", self.step)?;
        }
        Ok(())
    }
}

impl Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::Or(left, right) => write!(f, "{left} || {right}"),
            FilterExpr::And(left, right) => write!(f, "{left} && {right}"),
            FilterExpr::Not(inner) => write!(f, "!{inner}"),
            FilterExpr::Group(inner) => write!(f, "({inner})"),
            FilterExpr::Compare { op, left, right } => {
                write!(f, "{left} {} {right}", op.as_str())
            }
            FilterExpr::Match { left, regex } => write!(f, "{left} =~ {regex}"),
            FilterExpr::Truthy(operand) => write!(f, "{operand}"),
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(value) => write_literal(f, value),
            Operand::Path(path) => write!(f, "{path}"),
            Operand::Call { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_char(')')
            }
        }
    }
}

impl Display for RegexLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('/')?;
        for c in self.pattern().chars() {
            if c == '/' {
                f.write_str("\\/")?;
            } else {
                f.write_char(c)?;
            }
        }
        write!(f, "/{}", self.flags())
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &JsonValue) -> fmt::Result {
    match value {
        JsonValue::String(text) => write_quoted_name(f, text),
        other => write!(f, "{other}"),
    }
}

#[cfg(test)]
mod tests {
    use crate::JsonPath;

    fn canonical(expr: &str) -> String {
        JsonPath::compile(expr).unwrap().to_string()
    }

    #[test]
    fn member_rendering() {
        assert_eq!(canonical("$.store.book"), "$.store.book");
        assert_eq!(canonical("$['store']['a b']"), "$.store['a b']");
        assert_eq!(canonical("$[\"it's\"]"), "$['it\\'s']");
        assert_eq!(canonical("$['']"), "$['']");
    }

    #[test]
    fn descendant_rendering() {
        assert_eq!(canonical("$..author"), "$..author");
        assert_eq!(canonical("$..['a b']"), "$..['a b']");
        assert_eq!(canonical("$..*"), "$..*");
        assert_eq!(canonical("$..[0]"), "$..[0]");
    }

    #[test]
    fn selector_rendering() {
        assert_eq!(canonical("$.*"), "$.*");
        assert_eq!(canonical("$[*]"), "$.*");
        assert_eq!(canonical("$[1:3]"), "$[1:3]");
        assert_eq!(canonical("$[1:3:1]"), "$[1:3]");
        assert_eq!(canonical("$[::-1]"), "$[::-1]");
        assert_eq!(canonical("$[0, 'a', 1:2]"), "$[0,'a',1:2]");
        assert_eq!(canonical("$.a[-]"), "$.a[-]");
        assert_eq!(canonical("/a/-"), "$.a[-]");
    }

    #[test]
    fn function_and_filter_rendering() {
        assert_eq!(canonical("$.a.index( -1 )"), "$.a.index(-1)");
        assert_eq!(canonical("$.a.match(\"x\",1)"), "$.a.match('x', 1)");
        assert_eq!(
            canonical("$[?(@.price<10&&!@.gift)]"),
            "$[?(@.price < 10 && !@.gift)]"
        );
        assert_eq!(canonical("$[?@.name =~ /a\\/b/i]"), "$[?@.name =~ /a\\/b/i]");
        assert_eq!(
            canonical("$[?length(@.tags) >= 2 || @.x == 'y']"),
            "$[?length(@.tags) >= 2 || @.x == 'y']"
        );
    }
}
