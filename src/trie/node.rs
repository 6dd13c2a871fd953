//! Trie node types

/// A node in the binary trie
///
/// The node's depth below its root is the number of address bits consumed
/// to reach it. A node can carry a value and still have children, which is
/// how a network and its more specific subnets coexist on one path.
#[derive(Clone, Debug)]
pub struct TrieNode<T> {
    /// Subtree for the next bit being 0
    zero: Option<Box<TrieNode<T>>>,
    /// Subtree for the next bit being 1
    one: Option<Box<TrieNode<T>>>,
    /// Value of the network that ends exactly at this node
    value: Option<T>,
}

impl<T> TrieNode<T> {
    /// Create an empty node
    pub fn empty() -> Self {
        TrieNode {
            zero: None,
            one: None,
            value: None,
        }
    }

    /// Get the value at this exact node (if any)
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Mutable access to the value at this exact node
    pub fn value_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    /// Check if a network ends at this node
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Check if this node has neither children nor a value
    pub fn is_empty(&self) -> bool {
        self.zero.is_none() && self.one.is_none() && self.value.is_none()
    }

    /// The child reached by appending `bit`
    pub fn child(&self, bit: bool) -> Option<&TrieNode<T>> {
        if bit {
            self.one.as_deref()
        } else {
            self.zero.as_deref()
        }
    }

    /// The child reached by appending `bit`, allocating it if unexplored.
    ///
    /// Returns the child and whether it was newly created.
    pub(crate) fn child_or_insert(&mut self, bit: bool) -> (&mut TrieNode<T>, bool) {
        let slot = if bit { &mut self.one } else { &mut self.zero };
        let created = slot.is_none();
        let child = slot.get_or_insert_with(|| Box::new(TrieNode::empty()));
        (&mut **child, created)
    }

    /// Store `value` here, returning the value it replaced
    pub(crate) fn set_value(&mut self, value: T) -> Option<T> {
        self.value.replace(value)
    }
}

impl<T> Default for TrieNode<T> {
    fn default() -> Self {
        TrieNode::empty()
    }
}
