//! Surface prop bags.

use serde_json::{Map, Value};

/// Dynamic props attached to an open surface.
///
/// Props are an ordered JSON object. Surfaces receive the whole bag at render
/// time; `update_props` patches merge shallowly (key-wise replace, no deep
/// merge), matching the partial-update contract of the controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceProps {
    values: Map<String, Value>,
}

impl SurfaceProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds props from a JSON value.
    ///
    /// Panics if `value` is not a JSON object. Passing a non-object prop bag
    /// is a defect in the calling code, not a runtime condition.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            other => panic!("surface props must be a JSON object, got {other}"),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Shallow merge: every key in `patch` replaces the stored value for that
    /// key; keys absent from `patch` are left untouched.
    pub fn merge(&mut self, patch: SurfaceProps) {
        for (key, value) in patch.values {
            self.values.insert(key, value);
        }
    }

    /// Removes a key, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub(crate) fn into_values(self) -> Map<String, Value> {
        self.values
    }

    pub(crate) fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl From<Value> for SurfaceProps {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::SurfaceProps;
    use serde_json::json;

    #[test]
    fn merge_replaces_only_patched_keys() {
        let mut props = SurfaceProps::from_value(json!({"a": 1, "b": "keep"}));
        props.merge(SurfaceProps::from_value(json!({"a": 2, "c": true})));

        assert_eq!(props.get("a"), Some(&json!(2)));
        assert_eq!(props.get("b"), Some(&json!("keep")));
        assert_eq!(props.get("c"), Some(&json!(true)));
    }

    #[test]
    fn merge_is_shallow() {
        let mut props = SurfaceProps::from_value(json!({"nested": {"x": 1, "y": 2}}));
        props.merge(SurfaceProps::from_value(json!({"nested": {"x": 3}})));

        assert_eq!(props.get("nested"), Some(&json!({"x": 3})));
    }

    #[test]
    #[should_panic(expected = "must be a JSON object")]
    fn non_object_props_are_a_defect() {
        let _ = SurfaceProps::from_value(json!([1, 2, 3]));
    }
}
