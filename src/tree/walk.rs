use crate::tree::SyntaxTree;

/// Pre-order iterator over a node and its descendants.
///
/// Children are visited in the tree's own order. Cloning the iterator gives
/// an independent walk from the same point.
pub struct Walk<'t, T: SyntaxTree> {
    tree: &'t T,
    stack: Vec<T::Node>,
}

impl<'t, T: SyntaxTree> Walk<'t, T> {
    pub fn new(tree: &'t T, start: T::Node) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }
}

impl<T: SyntaxTree> Clone for Walk<'_, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
        }
    }
}

impl<T: SyntaxTree> Iterator for Walk<'_, T> {
    type Item = T::Node;

    fn next(&mut self) -> Option<T::Node> {
        let node = self.stack.pop()?;
        let mark = self.stack.len();
        self.stack.extend(self.tree.children(node));
        self.stack[mark..].reverse();
        Some(node)
    }
}
