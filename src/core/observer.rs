//! core::observer
//!
//! Typed change listeners.
//!
//! Two independent event kinds are delivered synchronously:
//! - structure changed (nodes or edges were added)
//! - selection changed (payload: the affected node)
//!
//! Listeners get no handle to the lattice, so they cannot mutate it while a
//! notification is in flight.

use super::types::NodeId;

/// Handle returned on registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type StructureListener = Box<dyn FnMut()>;
type SelectionListener = Box<dyn FnMut(NodeId)>;

/// Listener registry.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    structure: Vec<(ListenerId, StructureListener)>,
    selection: Vec<(ListenerId, SelectionListener)>,
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("structure", &self.structure.len())
            .field("selection", &self.selection.len())
            .finish()
    }
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn add_structure(&mut self, listener: impl FnMut() + 'static) -> ListenerId {
        let id = self.allocate();
        self.structure.push((id, Box::new(listener)));
        id
    }

    pub fn add_selection(&mut self, listener: impl FnMut(NodeId) + 'static) -> ListenerId {
        let id = self.allocate();
        self.selection.push((id, Box::new(listener)));
        id
    }

    /// Unregister a listener of either kind. Returns false if unknown.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.structure.len() + self.selection.len();
        self.structure.retain(|(lid, _)| *lid != id);
        self.selection.retain(|(lid, _)| *lid != id);
        before != self.structure.len() + self.selection.len()
    }

    pub fn len(&self) -> usize {
        self.structure.len() + self.selection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn structure_changed(&mut self) {
        for (_, listener) in &mut self.structure {
            listener();
        }
    }

    pub fn selection_changed(&mut self, node: NodeId) {
        for (_, listener) in &mut self.selection {
            listener(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn delivers_to_matching_kind_only() {
        let mut observers = Observers::new();
        let structural = Rc::new(RefCell::new(0));
        let selected = Rc::new(RefCell::new(Vec::new()));

        let s = Rc::clone(&structural);
        observers.add_structure(move || *s.borrow_mut() += 1);
        let n = Rc::clone(&selected);
        observers.add_selection(move |id| n.borrow_mut().push(id));

        observers.selection_changed(NodeId::new(3));
        assert_eq!(*structural.borrow(), 0);
        assert_eq!(*selected.borrow(), vec![NodeId::new(3)]);

        observers.structure_changed();
        assert_eq!(*structural.borrow(), 1);
        assert_eq!(selected.borrow().len(), 1);
    }

    #[test]
    fn removed_listener_is_silent() {
        let mut observers = Observers::new();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        let id = observers.add_structure(move || *c.borrow_mut() += 1);

        assert!(observers.remove(id));
        assert!(!observers.remove(id));
        assert!(observers.is_empty());

        observers.structure_changed();
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn ids_are_unique_across_kinds() {
        let mut observers = Observers::new();
        let a = observers.add_structure(|| {});
        let b = observers.add_selection(|_| {});
        assert_ne!(a, b);
        assert_eq!(observers.len(), 2);
    }
}
