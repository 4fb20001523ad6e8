use crate::connection::ConnectionId;

/// Handle of one label in a [`JourneysTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelId(usize);

/// Arena holding every label created during a scan, as a forest of
/// backward chains.
///
/// A label chain is the singly-linked history of the decisions that
/// produced a journey: each node stores the connection that was taken at
/// its stop and the handle of the label it continues into (the label at
/// that connection's arrival stop). Nodes are never mutated after
/// creation, so chains can be shared freely between frontier entries and
/// walked independently by the journey extractor.
///
/// Data is stored as parallel vectors indexed by [`LabelId`].
#[derive(Debug, Clone)]
pub struct JourneysTree<C> {
    criterias: Vec<C>,
    connections: Vec<Option<ConnectionId>>,
    parents: Vec<Option<LabelId>>,
}

impl<C> Default for JourneysTree<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> JourneysTree<C> {
    pub fn new() -> Self {
        Self {
            criterias: Vec::new(),
            connections: Vec::new(),
            parents: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.criterias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criterias.is_empty()
    }

    /// Create a new label. `connection` is the connection whose boarding
    /// produced it (`None` for a label that does not leave its stop, such
    /// as a pure departure marker), `parent` the label it chains into.
    pub fn extend(
        &mut self,
        criteria: C,
        connection: Option<ConnectionId>,
        parent: Option<LabelId>,
    ) -> LabelId {
        debug_assert!(self.criterias.len() == self.connections.len());
        debug_assert!(self.criterias.len() == self.parents.len());
        let id = LabelId(self.criterias.len());
        self.criterias.push(criteria);
        self.connections.push(connection);
        self.parents.push(parent);
        id
    }

    pub fn criteria(&self, id: LabelId) -> &C {
        &self.criterias[id.0]
    }

    pub fn connection(&self, id: LabelId) -> Option<ConnectionId> {
        self.connections[id.0]
    }

    pub fn parent(&self, id: LabelId) -> Option<LabelId> {
        self.parents[id.0]
    }

    /// Walk a chain from `terminal` through its predecessors, in journey
    /// order (origin first, since chains point from origin toward target).
    pub fn chain(&self, terminal: LabelId) -> Chain<'_, C> {
        Chain {
            tree: self,
            next: Some(terminal),
        }
    }

    pub fn clear(&mut self) {
        self.criterias.clear();
        self.connections.clear();
        self.parents.clear();
    }
}

pub struct Chain<'tree, C> {
    tree: &'tree JourneysTree<C>,
    next: Option<LabelId>,
}

impl<'tree, C> Iterator for Chain<'tree, C> {
    type Item = LabelId;

    fn next(&mut self) -> Option<LabelId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionId;

    #[test]
    fn chain_walks_to_the_root() {
        let mut tree: JourneysTree<u32> = JourneysTree::new();
        let root = tree.extend(0, None, None);
        let middle = tree.extend(1, Some(ConnectionId(7)), Some(root));
        let leaf = tree.extend(2, Some(ConnectionId(3)), Some(middle));
        let chain: Vec<LabelId> = tree.chain(leaf).collect();
        assert_eq!(chain, vec![leaf, middle, root]);
        assert_eq!(tree.connection(middle), Some(ConnectionId(7)));
        assert_eq!(*tree.criteria(root), 0);
    }
}
