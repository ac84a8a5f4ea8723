use serde::ser::{Serialize, SerializeMap, Serializer};

/// One decoded row, keyed by header name in column order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Record { fields: Vec::new() }
    }

    pub fn from_pairs(headers: &[String], values: Vec<String>) -> Self {
        Record {
            fields: headers.iter().cloned().zip(values).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of `name`, or empty text when the field is absent.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Overwrites an existing field in place, or appends a new one.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Values in `order`, with absent fields as empty text.
    pub fn values_in(&self, order: &[String]) -> Vec<String> {
        order.iter().map(|h| self.text(h).to_string()).collect()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_keeps_insertion_order() {
        let mut r = Record::new();
        r.set("Title", "A");
        r.set("Theme", "B");
        r.set("Title", "C");
        assert_eq!(serde_json::to_string(&r).unwrap(), r#"{"Title":"C","Theme":"B"}"#);
        assert_eq!(r.get("Title"), Some("C"));
        assert_eq!(r.text("Missing"), "");
    }

    #[test]
    fn serializes_as_ordered_object() {
        let headers = vec!["Zeta".to_string(), "Alpha".to_string()];
        let r = Record::from_pairs(&headers, vec!["1".into(), "2".into()]);
        assert_eq!(serde_json::to_string(&r).unwrap(), r#"{"Zeta":"1","Alpha":"2"}"#);
    }
}
