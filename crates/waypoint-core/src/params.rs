// Parameter maps, link arguments and query strings

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::value::ParamValue;
use crate::NAME_SEPARATOR;

/// String-keyed request parameters. A `Null` entry means the key is
/// explicitly bound to null.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// Arguments handed to `link()`: positional values matched against the
/// signal handler's parameter list plus already named values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkArgs {
    pub positional: Vec<ParamValue>,
    pub named: ParamMap,
}

impl LinkArgs {
    /// Create empty arguments
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments made of positional values only
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        LinkArgs {
            positional: values.into_iter().map(Into::into).collect(),
            named: ParamMap::new(),
        }
    }

    /// Add a positional value
    pub fn push(mut self, value: impl Into<ParamValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add a named value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Whether a positional argument exists at `index`
    pub fn has_index(&self, index: usize) -> bool {
        index < self.positional.len()
    }
}

impl From<ParamMap> for LinkArgs {
    fn from(named: ParamMap) -> Self {
        LinkArgs { positional: Vec::new(), named }
    }
}

impl From<Vec<ParamValue>> for LinkArgs {
    fn from(positional: Vec<ParamValue>) -> Self {
        LinkArgs { positional, named: ParamMap::new() }
    }
}

/// Parses a form-urlencoded query string. Keys ending in `[]` collect their
/// values into a list, everything else binds as a string (last one wins).
pub fn parse_query(query: &str) -> ParamMap {
    let mut params = ParamMap::new();
    for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
        if let Some(list_key) = key.strip_suffix("[]") {
            let entry = params
                .entry(list_key.to_string())
                .or_insert_with(|| ParamValue::List(Vec::new()));
            match entry {
                ParamValue::List(items) => items.push(ParamValue::Str(value.into_owned())),
                other => *other = ParamValue::List(vec![ParamValue::Str(value.into_owned())]),
            }
        } else {
            params.insert(key.into_owned(), ParamValue::Str(value.into_owned()));
        }
    }
    params
}

/// Renders parameters as a form-urlencoded query string. Nulls are dropped,
/// booleans render as `1`/`0`, lists as `key[]` pairs and composites as
/// `key[sub]` pairs.
pub fn encode_query(params: &ParamMap) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        append_pair(&mut serializer, key, value);
    }
    serializer.finish()
}

fn append_pair(serializer: &mut form_urlencoded::Serializer<'_, String>, key: &str, value: &ParamValue) {
    match value {
        ParamValue::Null => {}
        ParamValue::Bool(b) => {
            serializer.append_pair(key, if *b { "1" } else { "0" });
        }
        ParamValue::List(items) => {
            let list_key = format!("{}[]", key);
            for item in items {
                append_pair(serializer, &list_key, item);
            }
        }
        ParamValue::Object(fields) => {
            for (field, item) in fields {
                append_pair(serializer, &format!("{}[{}]", key, field), item);
            }
        }
        scalar => {
            serializer.append_pair(key, &scalar.as_text().unwrap_or_default());
        }
    }
}

/// Splits flat request parameters into per-component slices. `a-b-name`
/// belongs to component `a-b`; keys without a separator belong to the
/// request root, stored under the empty id.
pub fn partition_global_params(params: &ParamMap) -> BTreeMap<String, ParamMap> {
    let mut global: BTreeMap<String, ParamMap> = BTreeMap::new();
    for (key, value) in params {
        let (id, name) = match key.rfind(NAME_SEPARATOR) {
            Some(pos) if pos > 0 => (&key[..pos], &key[pos + 1..]),
            _ => ("", key.as_str()),
        };
        global
            .entry(id.to_string())
            .or_default()
            .insert(name.to_string(), value.clone());
    }
    global
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_query_collects_lists() {
        let params = parse_query("?page=2&tag[]=a&tag[]=b&q=hello+world");
        assert_eq!(params.get("page"), Some(&ParamValue::from("2")));
        assert_eq!(params.get("q"), Some(&ParamValue::from("hello world")));
        assert_eq!(
            params.get("tag"),
            Some(&ParamValue::List(vec![ParamValue::from("a"), ParamValue::from("b")]))
        );
    }

    #[test]
    fn test_encode_query_skips_nulls() {
        let mut params = ParamMap::new();
        params.insert("a".to_string(), ParamValue::Int(1));
        params.insert("b".to_string(), ParamValue::Null);
        params.insert("c".to_string(), ParamValue::from(vec!["x", "y"]));
        params.insert("d".to_string(), ParamValue::Bool(false));
        assert_eq!(encode_query(&params), "a=1&c%5B%5D=x&c%5B%5D=y&d=0");
    }

    #[test]
    fn test_partition_global_params() {
        let mut params = ParamMap::new();
        params.insert("page".to_string(), ParamValue::from("1"));
        params.insert("poll-vote".to_string(), ParamValue::from("3"));
        params.insert("poll-chart-zoom".to_string(), ParamValue::from("2"));

        let global = partition_global_params(&params);
        assert_eq!(global[""]["page"], ParamValue::from("1"));
        assert_eq!(global["poll"]["vote"], ParamValue::from("3"));
        assert_eq!(global["poll-chart"]["zoom"], ParamValue::from("2"));
    }

    #[test]
    fn test_link_args_builders() {
        let args = LinkArgs::positional([1, 2]).with("sort", "name");
        assert!(args.has_index(1));
        assert!(!args.has_index(2));
        assert!(!args.is_empty());
        assert!(LinkArgs::new().is_empty());
    }
}
