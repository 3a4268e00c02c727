use serde::{Deserialize, Serialize};

/// 元素上的 CSS 类集合，保持添加顺序且不重复。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ClassList(Vec<String>);

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, class: &str) {
        if !class.is_empty() && !self.contains(class) {
            self.0.push(class.to_string());
        }
    }

    pub fn remove(&mut self, class: &str) {
        self.0.retain(|existing| existing != class);
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.iter().any(|existing| existing == class)
    }

    /// 添加 `on` 的同时移除 `off`，两者互斥。
    pub fn swap(&mut self, on: &str, off: &str) {
        self.remove(off);
        self.add(on);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
