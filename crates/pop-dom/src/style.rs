//! Inline style declarations
//!
//! Stored in camelCase as scripts write them (`backgroundColor`) and
//! flattened to `property:value;` pairs with hyphenated names on output.

/// Ordered inline style declarations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclaration {
    declarations: Vec<(String, String)>,
}

impl StyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing an existing value in place
    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        let value = value.into();
        match self.declarations.iter_mut().find(|(name, _)| name == property) {
            Some((_, existing)) => *existing = value,
            None => self.declarations.push((property.to_string(), value)),
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        let index = self.declarations.iter().position(|(name, _)| name == property)?;
        Some(self.declarations.remove(index).1)
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Flatten to `prop-name:value;` text
    pub fn to_css_text(&self) -> String {
        let mut css = String::new();
        for (name, value) in &self.declarations {
            css.push_str(&hyphenate(name));
            css.push(':');
            css.push_str(value);
            css.push(';');
        }
        css
    }
}

/// `borderTopWidth` -> `border-top-width`
fn hyphenate(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_text_hyphenates_camel_case() {
        let mut style = StyleDeclaration::new();
        style.set("backgroundColor", "red");
        style.set("width", "320px");
        style.set("borderTopWidth", "1px");

        assert_eq!(
            style.to_css_text(),
            "background-color:red;width:320px;border-top-width:1px;"
        );
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut style = StyleDeclaration::new();
        style.set("width", "1px");
        style.set("height", "2px");
        style.set("width", "3px");

        assert_eq!(style.len(), 2);
        assert_eq!(style.to_css_text(), "width:3px;height:2px;");
        assert_eq!(style.remove("width").as_deref(), Some("3px"));
        assert_eq!(style.get("width"), None);
    }
}
