use std::collections::BTreeMap;

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};
use tracing::debug;

use super::{DescriptorError, Mutation};

/// A named module: header metadata, ordered mutations and child references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDescriptor {
  pub name: String,
  pub category: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub load_message: Option<String>,
  mutations: Vec<Mutation>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  children: Vec<String>,
}

impl ModuleDescriptor {
  pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      category: category.into(),
      load_message: None,
      mutations: Vec::new(),
      children: Vec::new(),
    }
  }

  pub fn with_load_message(mut self, message: Option<String>) -> Self {
    self.load_message = message.filter(|m| !m.is_empty());
    self
  }

  pub fn mutations(&self) -> &[Mutation] {
    &self.mutations
  }

  /// Child module names in creation order.
  pub fn children(&self) -> &[String] {
    &self.children
  }

  /// Append a record built from its command-line kind spelling.
  pub fn add_mutation(&mut self, kind: &str, args: Vec<String>) -> Result<&Mutation, DescriptorError> {
    let mutation = Mutation::parse(kind, args)?;
    Ok(self.push(mutation))
  }

  /// Append an already validated record.
  pub fn push(&mut self, mutation: Mutation) -> &Mutation {
    debug!(module = %self.name, mutation = %mutation, "adding mutation");
    self.mutations.push(mutation);
    &self.mutations[self.mutations.len() - 1]
  }

  pub fn extend(&mut self, mutations: impl IntoIterator<Item = Mutation>) -> usize {
    let before = self.mutations.len();
    for mutation in mutations {
      self.push(mutation);
    }
    self.mutations.len() - before
  }

  pub(crate) fn link_child(&mut self, name: &str) -> Result<(), DescriptorError> {
    if self.children.iter().any(|c| c == name) || name == self.name {
      return Err(DescriptorError::DuplicateName(name.to_string()));
    }
    self.children.push(name.to_string());
    Ok(())
  }

  pub(crate) fn unlink_child(&mut self, name: &str) -> Result<(), DescriptorError> {
    let position = self
      .children
      .iter()
      .position(|c| c == name)
      .ok_or_else(|| DescriptorError::NotFound(name.to_string()))?;
    self.children.remove(position);
    Ok(())
  }
}

/// The two-level descriptor tree of one virtual environment.
///
/// The root owns the order of its children through [`ModuleDescriptor::children`];
/// the tree holds the child descriptors themselves. Removed children are kept
/// aside until the caller has deleted their files.
#[derive(Debug, Clone)]
pub struct ModuleTree {
  root: ModuleDescriptor,
  children: BTreeMap<String, ModuleDescriptor>,
  removed: Vec<String>,
}

impl Serialize for ModuleTree {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("ModuleTree", 2)?;
    state.serialize_field("root", &self.root)?;
    state.serialize_field("applications", &self.children().collect::<Vec<_>>())?;
    state.end()
  }
}

impl ModuleTree {
  /// Create a tree around a root with no children.
  pub fn new(root: ModuleDescriptor) -> Self {
    Self {
      root,
      children: BTreeMap::new(),
      removed: Vec::new(),
    }
  }

  /// Rebuild a tree from a loaded root and its loaded children.
  ///
  /// Every name listed by the root must be provided, and nothing else.
  pub fn from_parts(root: ModuleDescriptor, children: Vec<ModuleDescriptor>) -> Result<Self, DescriptorError> {
    let mut by_name = BTreeMap::new();
    for child in children {
      if !root.children.contains(&child.name) || by_name.contains_key(&child.name) {
        return Err(DescriptorError::DuplicateName(child.name));
      }
      by_name.insert(child.name.clone(), child);
    }
    if let Some(missing) = root.children.iter().find(|name| !by_name.contains_key(*name)) {
      return Err(DescriptorError::NotFound(missing.clone()));
    }
    Ok(Self {
      root,
      children: by_name,
      removed: Vec::new(),
    })
  }

  pub fn root(&self) -> &ModuleDescriptor {
    &self.root
  }

  pub fn root_mut(&mut self) -> &mut ModuleDescriptor {
    &mut self.root
  }

  /// Children in creation order.
  pub fn children(&self) -> impl Iterator<Item = &ModuleDescriptor> {
    self.root.children.iter().filter_map(|name| self.children.get(name))
  }

  pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
    if name == self.root.name {
      return Some(&self.root);
    }
    self.children.get(name)
  }

  /// Mutable access to the root or one of its children by module name.
  pub fn get_mut(&mut self, name: &str) -> Result<&mut ModuleDescriptor, DescriptorError> {
    if name == self.root.name {
      return Ok(&mut self.root);
    }
    self
      .children
      .get_mut(name)
      .ok_or_else(|| DescriptorError::NotFound(name.to_string()))
  }

  /// Create a child module and link it at the end of the root's children.
  pub fn create_child(&mut self, name: &str, category: &str) -> Result<&mut ModuleDescriptor, DescriptorError> {
    self.root.link_child(name)?;
    debug!(parent = %self.root.name, child = %name, "creating child module");
    self.removed.retain(|removed| removed != name);
    Ok(
      self
        .children
        .entry(name.to_string())
        .or_insert_with(|| ModuleDescriptor::new(name, category)),
    )
  }

  /// Unlink a child from the root and mark it for deletion.
  pub fn remove_child(&mut self, name: &str) -> Result<ModuleDescriptor, DescriptorError> {
    self.root.unlink_child(name)?;
    let removed = self
      .children
      .remove(name)
      .ok_or_else(|| DescriptorError::NotFound(name.to_string()))?;
    debug!(parent = %self.root.name, child = %name, "removed child module");
    self.removed.push(name.to_string());
    Ok(removed)
  }

  /// Names of children removed since the tree was loaded.
  pub fn removed(&self) -> &[String] {
    &self.removed
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::module::MutationKind;

  fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
  }

  #[test]
  fn mutations_keep_insertion_order() {
    let mut module = ModuleDescriptor::new("env", "venvmod");
    module.add_mutation("setenv", strings(&["B", "2"])).unwrap();
    module.add_mutation("prepend-path", strings(&["PATH", "/b"])).unwrap();
    module.add_mutation("setenv", strings(&["A", "1"])).unwrap();

    let kinds: Vec<_> = module.mutations().iter().map(|m| m.kind()).collect();
    assert_eq!(
      kinds,
      vec![MutationKind::Setenv, MutationKind::PrependPath, MutationKind::Setenv]
    );
    assert_eq!(module.mutations()[2].args(), &strings(&["A", "1"]));
  }

  #[test]
  fn failed_add_leaves_module_unchanged() {
    let mut module = ModuleDescriptor::new("env", "venvmod");
    assert!(module.add_mutation("export", strings(&["A=1"])).is_err());
    assert!(module.add_mutation("setenv", vec![]).is_err());
    assert!(module.mutations().is_empty());
  }

  #[test]
  fn create_child_rejects_duplicates() {
    let mut tree = ModuleTree::new(ModuleDescriptor::new("env", "venvmod"));
    tree.create_child("env-a", "venvmod-a").unwrap();

    let err = tree.create_child("env-a", "venvmod-a").unwrap_err();
    assert!(matches!(err, DescriptorError::DuplicateName(ref n) if n == "env-a"));

    let err = tree.create_child("env", "venvmod").unwrap_err();
    assert!(matches!(err, DescriptorError::DuplicateName(_)));
    assert_eq!(tree.root().children(), &strings(&["env-a"]));
  }

  #[test]
  fn children_keep_creation_order() {
    let mut tree = ModuleTree::new(ModuleDescriptor::new("env", "venvmod"));
    for name in ["env-zeta", "env-alpha", "env-mid"] {
      tree.create_child(name, "venvmod").unwrap();
    }
    let names: Vec<_> = tree.children().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["env-zeta", "env-alpha", "env-mid"]);
  }

  #[test]
  fn removing_missing_child_leaves_children_unchanged() {
    let mut tree = ModuleTree::new(ModuleDescriptor::new("env", "venvmod"));
    tree.create_child("env-a", "venvmod").unwrap();
    tree.create_child("env-b", "venvmod").unwrap();

    let err = tree.remove_child("env-c").unwrap_err();
    assert!(matches!(err, DescriptorError::NotFound(ref n) if n == "env-c"));
    assert_eq!(tree.root().children(), &strings(&["env-a", "env-b"]));
    assert!(tree.removed().is_empty());
  }

  #[test]
  fn removing_child_unlinks_and_marks_it() {
    let mut tree = ModuleTree::new(ModuleDescriptor::new("env", "venvmod"));
    tree.create_child("env-a", "venvmod").unwrap();
    tree.create_child("env-b", "venvmod").unwrap();

    let removed = tree.remove_child("env-a").unwrap();
    assert_eq!(removed.name, "env-a");
    assert_eq!(tree.root().children(), &strings(&["env-b"]));
    assert_eq!(tree.removed(), &strings(&["env-a"]));
    assert!(tree.get("env-a").is_none());
  }

  #[test]
  fn from_parts_requires_every_listed_child() {
    let mut root = ModuleDescriptor::new("env", "venvmod");
    root.link_child("env-a").unwrap();
    let err = ModuleTree::from_parts(root.clone(), vec![]).unwrap_err();
    assert!(matches!(err, DescriptorError::NotFound(_)));

    let tree = ModuleTree::from_parts(root, vec![ModuleDescriptor::new("env-a", "venvmod")]).unwrap();
    assert_eq!(tree.children().count(), 1);
  }

  #[test]
  fn tree_serializes_applications_in_creation_order() {
    let mut tree = ModuleTree::new(ModuleDescriptor::new("env", "venvmod"));
    tree.create_child("env-b", "venvmod").unwrap();
    tree.create_child("env-a", "venvmod").unwrap();

    let json = serde_json::to_value(&tree).unwrap();
    let names: Vec<_> = json["applications"]
      .as_array()
      .unwrap()
      .iter()
      .map(|c| c["name"].as_str().unwrap().to_string())
      .collect();
    assert_eq!(names, vec!["env-b", "env-a"]);
    assert_eq!(json["root"]["children"], serde_json::json!(["env-b", "env-a"]));
  }
}
