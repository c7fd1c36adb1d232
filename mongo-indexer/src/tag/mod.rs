//! Index annotation mini-language.
//!
//! An annotation is a comma-separated list of tokens evaluated left to right:
//!
//! ```text
//! unique,asc,name=email_idx
//! desc,ttl=3600
//! asc,partial={"age":{"$gt":18}}
//! ```
//!
//! Later tokens override earlier ones (`asc,desc` is descending). Unknown
//! tokens are ignored so the language can grow without breaking older
//! consumers; only `ttl=` and `partial=` values are validated.

mod tokenizer;

use std::fmt;

use serde_json::{Map, Value};

use crate::errors::{IndexerError, IndexerResult};
use crate::types::{IndexDirection, IndexOptionSet};

use tokenizer::tokenize;

const NAME_PREFIX: &str = "name=";
const TTL_PREFIX: &str = "ttl=";
pub(crate) const PARTIAL_PREFIX: &str = "partial=";

/// Non-fatal observation made while parsing an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagWarning {
    /// Token not understood by this version of the parser.
    UnknownToken(String),
    /// `asc` and `desc` both appeared; the later one won.
    DirectionOverridden {
        previous: IndexDirection,
        current: IndexDirection,
    },
    /// A valued option appeared more than once; the later value won.
    OptionRepeated(&'static str),
}

impl fmt::Display for TagWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownToken(token) => write!(f, "unknown token `{token}` ignored"),
            Self::DirectionOverridden { previous, current } => {
                write!(f, "direction `{previous}` overridden by later `{current}`")
            }
            Self::OptionRepeated(option) => write!(f, "option `{option}` repeated, last value wins"),
        }
    }
}

/// Receives warnings emitted by [`parse_tag_with`].
pub trait TagObserver {
    fn warn(&mut self, warning: TagWarning);
}

impl<F> TagObserver for F
where
    F: FnMut(TagWarning),
{
    fn warn(&mut self, warning: TagWarning) {
        self(warning)
    }
}

/// Observer that forwards warnings to the `log` facade at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWarnings;

impl TagObserver for LogWarnings {
    fn warn(&mut self, warning: TagWarning) {
        log::debug!("mongoindexer: {warning}");
    }
}

/// Observer that keeps every warning for later inspection.
#[derive(Debug, Default, Clone)]
pub struct CollectWarnings {
    pub warnings: Vec<TagWarning>,
}

impl CollectWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl TagObserver for CollectWarnings {
    fn warn(&mut self, warning: TagWarning) {
        self.warnings.push(warning);
    }
}

/// Parse an index annotation, logging warnings.
pub fn parse_tag(tag: &str) -> IndexerResult<IndexOptionSet> {
    parse_tag_with(tag, &mut LogWarnings)
}

/// Parse an index annotation, reporting warnings to `observer`.
pub fn parse_tag_with<O>(tag: &str, observer: &mut O) -> IndexerResult<IndexOptionSet>
where
    O: TagObserver + ?Sized,
{
    let mut options = IndexOptionSet::default();
    let mut explicit_direction: Option<IndexDirection> = None;

    for token in tokenize(tag) {
        match token {
            "unique" => options.unique = true,
            "sparse" => options.sparse = true,
            "asc" => set_direction(&mut options, &mut explicit_direction, IndexDirection::Ascending, observer),
            "desc" => set_direction(&mut options, &mut explicit_direction, IndexDirection::Descending, observer),
            _ => {
                if let Some(name) = token.strip_prefix(NAME_PREFIX) {
                    if options.name.is_some() {
                        observer.warn(TagWarning::OptionRepeated("name"));
                    }
                    options.name = Some(name.to_string());
                } else if let Some(raw) = token.strip_prefix(TTL_PREFIX) {
                    if options.ttl_seconds.is_some() {
                        observer.warn(TagWarning::OptionRepeated("ttl"));
                    }
                    options.ttl_seconds = Some(parse_ttl(raw)?);
                } else if let Some(raw) = token.strip_prefix(PARTIAL_PREFIX) {
                    if options.partial_filter.is_some() {
                        observer.warn(TagWarning::OptionRepeated("partial"));
                    }
                    options.partial_filter = Some(parse_partial_filter(raw)?);
                } else {
                    observer.warn(TagWarning::UnknownToken(token.to_string()));
                }
            }
        }
    }

    Ok(options)
}

fn set_direction<O>(
    options: &mut IndexOptionSet,
    explicit: &mut Option<IndexDirection>,
    direction: IndexDirection,
    observer: &mut O,
) where
    O: TagObserver + ?Sized,
{
    if let Some(previous) = *explicit
        && previous != direction
    {
        observer.warn(TagWarning::DirectionOverridden {
            previous,
            current: direction,
        });
    }
    *explicit = Some(direction);
    options.direction = direction;
}

/// Seconds must fit the server's 32-bit signed range and be non-negative.
fn parse_ttl(raw: &str) -> IndexerResult<u32> {
    let invalid = || IndexerError::InvalidTtl { value: raw.to_string() };
    let seconds: i64 = raw.parse().map_err(|_| invalid())?;
    if !(0..=i64::from(i32::MAX)).contains(&seconds) {
        return Err(invalid());
    }
    u32::try_from(seconds).map_err(|_| invalid())
}

fn parse_partial_filter(raw: &str) -> IndexerResult<Map<String, Value>> {
    serde_json::from_str(raw).map_err(IndexerError::InvalidPartialFilter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_to_plain_ascending() {
        let options = parse_tag("asc").unwrap();
        assert_eq!(options, IndexOptionSet::default());
        assert_eq!(options.direction, IndexDirection::Ascending);
    }

    #[test]
    fn parses_unique_named_index() {
        let options = parse_tag("unique,asc,name=email_idx").unwrap();
        assert!(options.unique);
        assert!(!options.sparse);
        assert_eq!(options.direction, IndexDirection::Ascending);
        assert_eq!(options.name.as_deref(), Some("email_idx"));
    }

    #[test]
    fn name_value_is_kept_verbatim() {
        let options = parse_tag("name=Email_IDX-v2").unwrap();
        assert_eq!(options.name.as_deref(), Some("Email_IDX-v2"));

        let options = parse_tag("name=a=b").unwrap();
        assert_eq!(options.name.as_deref(), Some("a=b"));
    }

    #[test]
    fn last_direction_wins() {
        assert_eq!(parse_tag("asc,desc").unwrap().direction, IndexDirection::Descending);
        assert_eq!(parse_tag("desc,asc").unwrap().direction, IndexDirection::Ascending);
        assert_eq!(parse_tag("desc,unique").unwrap().direction, IndexDirection::Descending);
    }

    #[test]
    fn parses_ttl() {
        let options = parse_tag("desc,ttl=3600").unwrap();
        assert_eq!(options.ttl_seconds, Some(3600));
        assert_eq!(options.direction, IndexDirection::Descending);

        assert_eq!(parse_tag("ttl=0").unwrap().ttl_seconds, Some(0));
    }

    #[test]
    fn rejects_malformed_ttl() {
        let err = parse_tag("ttl=notint").unwrap_err();
        assert!(matches!(err, IndexerError::InvalidTtl { ref value } if value == "notint"));
        assert!(err.to_string().contains("notint"));
    }

    #[test]
    fn rejects_out_of_range_ttl() {
        assert!(matches!(parse_tag("ttl=-1"), Err(IndexerError::InvalidTtl { .. })));
        assert!(matches!(parse_tag("ttl=99999999999"), Err(IndexerError::InvalidTtl { .. })));
        assert!(matches!(parse_tag("ttl="), Err(IndexerError::InvalidTtl { .. })));
    }

    #[test]
    fn parses_partial_filter() {
        let options = parse_tag(r#"asc,partial={"age":{"$gt":18}}"#).unwrap();
        let filter = options.partial_filter.expect("partial filter set");
        assert_eq!(Value::Object(filter), json!({"age": {"$gt": 18}}));
    }

    #[test]
    fn parses_multi_key_partial_filter() {
        let options = parse_tag(r#"partial={"a":1,"b":{"$in":[1,2]}},unique"#).unwrap();
        assert!(options.unique);
        let filter = options.partial_filter.expect("partial filter set");
        assert_eq!(Value::Object(filter), json!({"a": 1, "b": {"$in": [1, 2]}}));
    }

    #[test]
    fn rejects_malformed_partial_filter() {
        assert!(matches!(
            parse_tag("partial={bad json"),
            Err(IndexerError::InvalidPartialFilter(_))
        ));
        assert!(matches!(parse_tag("partial=[1,2]"), Err(IndexerError::InvalidPartialFilter(_))));
        assert!(matches!(parse_tag("partial=18"), Err(IndexerError::InvalidPartialFilter(_))));
    }

    #[test]
    fn unknown_tokens_do_not_change_outcome() {
        let plain = parse_tag("unique,desc,sparse").unwrap();
        let noisy = parse_tag("background,unique,collation=en,desc,UNIQUE,sparse,2dsphere").unwrap();
        assert_eq!(plain, noisy);
    }

    #[test]
    fn stray_commas_and_whitespace_are_ignored() {
        let options = parse_tag(" , unique ,, sparse , ").unwrap();
        assert!(options.unique);
        assert!(options.sparse);
    }

    #[test]
    fn observer_sees_warnings() {
        let mut collected = CollectWarnings::new();
        let options = parse_tag_with("asc,desc,hidden,name=a,name=b", &mut collected).unwrap();

        assert_eq!(options.direction, IndexDirection::Descending);
        assert_eq!(options.name.as_deref(), Some("b"));
        assert_eq!(
            collected.warnings,
            vec![
                TagWarning::DirectionOverridden {
                    previous: IndexDirection::Ascending,
                    current: IndexDirection::Descending,
                },
                TagWarning::UnknownToken("hidden".to_string()),
                TagWarning::OptionRepeated("name"),
            ]
        );
    }

    #[test]
    fn repeated_direction_is_not_a_conflict() {
        let mut count = 0;
        parse_tag_with("desc,desc", &mut |_: TagWarning| count += 1).unwrap();
        assert_eq!(count, 0);
    }
}
