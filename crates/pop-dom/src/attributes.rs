//! Element Attributes
//!
//! Namespaced attribute table: get, set, remove, has.
//!
//! Attributes are grouped by namespace in first-use order, and keep their
//! insertion order inside a group. Serialization walks them in that order.

/// Single attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local_name: String,
    pub value: String,
}

impl Attr {
    /// Build an attribute from a possibly prefixed name (`xlink:href`)
    pub fn new(namespace: Option<&str>, qualified_name: &str, value: impl Into<String>) -> Self {
        let (prefix, local_name) = match qualified_name.split_once(':') {
            Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
            None => (None, qualified_name.to_string()),
        };
        Self {
            namespace: namespace.map(str::to_string),
            prefix,
            local_name,
            value: value.into(),
        }
    }

    /// Name as written in markup, `prefix:local` when prefixed
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local_name),
            None => self.local_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct NamespaceGroup {
    namespace: Option<String>,
    attrs: Vec<Attr>,
}

/// Attribute table keyed by (namespace, local name)
#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    groups: Vec<NamespaceGroup>,
}

impl AttributeTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn group(&self, namespace: Option<&str>) -> Option<&NamespaceGroup> {
        self.groups.iter().find(|g| g.namespace.as_deref() == namespace)
    }

    fn group_mut(&mut self, namespace: Option<&str>) -> Option<&mut NamespaceGroup> {
        self.groups.iter_mut().find(|g| g.namespace.as_deref() == namespace)
    }

    /// Get number of attributes
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.attrs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up an attribute by namespace and local name
    pub fn get_named_item(&self, namespace: Option<&str>, local_name: &str) -> Option<&Attr> {
        self.group(namespace)?
            .attrs
            .iter()
            .find(|a| a.local_name == local_name)
    }

    /// Get attribute value
    pub fn get(&self, namespace: Option<&str>, local_name: &str) -> Option<&str> {
        self.get_named_item(namespace, local_name).map(|a| a.value.as_str())
    }

    /// Set attribute, replacing value and prefix of an existing entry in place.
    /// Returns the previous attribute, if any.
    pub fn set(&mut self, namespace: Option<&str>, qualified_name: &str, value: &str) -> Option<Attr> {
        let attr = Attr::new(namespace, qualified_name, value);
        match self.group_mut(namespace) {
            Some(group) => {
                if let Some(existing) = group.attrs.iter_mut().find(|a| a.local_name == attr.local_name) {
                    return Some(std::mem::replace(existing, attr));
                }
                group.attrs.push(attr);
            }
            None => self.groups.push(NamespaceGroup {
                namespace: namespace.map(str::to_string),
                attrs: vec![attr],
            }),
        }
        None
    }

    /// Remove attribute by namespace and local name
    pub fn remove(&mut self, namespace: Option<&str>, local_name: &str) -> Option<Attr> {
        let group = self.group_mut(namespace)?;
        let index = group.attrs.iter().position(|a| a.local_name == local_name)?;
        Some(group.attrs.remove(index))
    }

    /// Check if attribute exists
    pub fn has(&self, namespace: Option<&str>, local_name: &str) -> bool {
        self.get_named_item(namespace, local_name).is_some()
    }

    /// Iterate over attributes in serialization order
    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.groups.iter().flat_map(|g| g.attrs.iter())
    }
}
