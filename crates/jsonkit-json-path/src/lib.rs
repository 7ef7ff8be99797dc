//! JSONPath and JSON Pointer over any [`Node`](jsonkit_node::Node) tree.
//!
//! Both dialects compile to the same [`JsonPath`] token list. Text starting
//! with `$` or `@` is JSONPath; anything else, including the empty string,
//! is a JSON Pointer.
//!
//! A compiled path is used in one of two modes:
//!
//! - **find**: [`JsonPath::find_all`], [`JsonPath::find_one`] and
//!   [`JsonPath::eval`] walk every branch the path selects and never fail on
//!   a missing location.
//! - **single location**: [`JsonPath::get`], [`JsonPath::add`],
//!   [`JsonPath::replace`], [`JsonPath::remove`], [`JsonPath::ensure_put`]
//!   and friends accept names, indices and a trailing `-` only, and report
//!   where a walk failed.
//!
//! # Example
//!
//! ```
//! use jsonkit_json_path::JsonPath;
//! use jsonkit_node::JsonValue;
//!
//! let mut doc = JsonValue::parse(r#"{"books": [{"price": 8}, {"price": 23}]}"#).unwrap();
//!
//! let cheap = JsonPath::compile("$.books[?@.price < 10]").unwrap();
//! assert_eq!(cheap.find_all(&doc).len(), 1);
//!
//! JsonPath::compile("/books/0/price")
//!     .unwrap()
//!     .replace(&mut doc, JsonValue::from(9))
//!     .unwrap();
//! let total = JsonPath::compile("$.books[*].price.sum()").unwrap().eval(&doc).unwrap();
//! assert_eq!(total, Some(JsonValue::from(32)));
//! ```

mod types;
pub use types::{CompareOp, FilterExpr, Operand, PathToken, RegexLiteral, Slice};

mod path;
pub use path::JsonPath;

mod parser;

mod util;

mod cache;
pub use cache::{PathCache, PATH_CACHE_CAPACITY};

mod eval;
pub use eval::JsonPathEval;

mod locate;

mod function;
pub use function::{PathFunction, PathFunctionRegistry};
