//! Derived-type tree of a pattern type, nodes linked by index.
//!
//! Union and extensible enum hierarchies are checked with one recursive
//! pass over this tree instead of walking inheritance per rule.

use super::{constructors, Accessibility, ConstructorFact};
use crate::semantic::{Compilation, TypeId};
use crate::syntax::ast::ModifierKind;

#[derive(Debug, Clone)]
pub struct DerivedTypeNode {
    pub id: TypeId,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub depth: usize,
    pub is_sealed: bool,
    pub is_abstract: bool,
    /// Instance constructors, implicit ones included.
    pub constructors: Vec<ConstructorFact>,
}

impl DerivedTypeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn non_private_constructors(&self) -> impl Iterator<Item = &ConstructorFact> {
        self.constructors
            .iter()
            .filter(|c| c.accessibility != Accessibility::Private)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeViolationKind {
    /// A concrete type without subtypes that is not sealed.
    NotSealed,
    NonPrivateConstructor(ConstructorFact),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeViolation {
    pub node: usize,
    pub kind: TreeViolationKind,
}

/// Node 0 is the root.
#[derive(Debug, Clone)]
pub struct DerivedTypeTree {
    nodes: Vec<DerivedTypeNode>,
}

impl DerivedTypeTree {
    pub fn build(compilation: &Compilation, root: TypeId) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.insert(compilation, root, None, 0);
        tree
    }

    fn insert(&mut self, compilation: &Compilation, id: TypeId, parent: Option<usize>, depth: usize) {
        // cyclic base lists are rejected by the compiler; don't loop on them
        if self.nodes.iter().any(|n| n.id == id) {
            return;
        }
        let decl = compilation.symbols().decl(id);
        let index = self.nodes.len();
        self.nodes.push(DerivedTypeNode {
            id,
            parent,
            children: Vec::new(),
            depth,
            is_sealed: decl.has_modifier(ModifierKind::Sealed),
            is_abstract: decl.has_modifier(ModifierKind::Abstract),
            // the generator emits the root's constructor when none is written
            constructors: constructors(decl, parent.is_some()),
        });
        if let Some(p) = parent {
            self.nodes[p].children.push(index);
        }
        for child in compilation.derived_types(id) {
            self.insert(compilation, *child, Some(index), depth + 1);
        }
    }

    pub fn root(&self) -> &DerivedTypeNode {
        &self.nodes[0]
    }

    pub fn node(&self, index: usize) -> &DerivedTypeNode {
        &self.nodes[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn has_derived_types(&self) -> bool {
        !self.root().children.is_empty()
    }

    /// All nodes below the root, depth first.
    pub fn descendants(&self) -> impl Iterator<Item = (usize, &DerivedTypeNode)> {
        let mut order = Vec::with_capacity(self.nodes.len());
        self.collect_preorder(0, &mut order);
        order
            .into_iter()
            .skip(1)
            .map(move |i| (i, &self.nodes[i]))
    }

    fn collect_preorder(&self, index: usize, out: &mut Vec<usize>) {
        out.push(index);
        for child in &self.nodes[index].children {
            self.collect_preorder(*child, out);
        }
    }

    /// Sealing and constructor-privacy violations of every node below the
    /// root. Abstract nodes are exempt from sealing only.
    pub fn violations(&self) -> Vec<TreeViolation> {
        let mut out = Vec::new();
        for child in &self.root().children {
            self.visit(*child, &mut out);
        }
        out
    }

    fn visit(&self, index: usize, out: &mut Vec<TreeViolation>) {
        let node = &self.nodes[index];
        if node.is_leaf() && !node.is_sealed && !node.is_abstract {
            out.push(TreeViolation {
                node: index,
                kind: TreeViolationKind::NotSealed,
            });
        }
        out.extend(node.non_private_constructors().map(|c| TreeViolation {
            node: index,
            kind: TreeViolationKind::NonPrivateConstructor(*c),
        }));
        for child in &node.children {
            self.visit(*child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn tree(src: &str, root: &str) -> (Compilation, DerivedTypeTree) {
        let c = Compilation::from_sources("App", &[("a.cs", src)]);
        let id = c
            .symbols()
            .ids()
            .find(|id| c.symbols().get(*id).name == root)
            .expect("root");
        let t = DerivedTypeTree::build(&c, id);
        (c, t)
    }

    #[test]
    fn builds_nested_hierarchy() {
        let (c, t) = tree(
            indoc! {"
                [Union]
                public abstract partial record Shape
                {
                    private Shape() { }
                    public abstract record Polygon : Shape { }
                    public sealed record Square : Polygon { private Square() { } }
                    public record Circle : Shape { }
                }
            "},
            "Shape",
        );
        assert_eq!(t.len(), 4);
        assert!(t.has_derived_types());
        let names: Vec<&str> = t
            .descendants()
            .map(|(_, n)| c.symbols().get(n.id).name.as_str())
            .collect();
        assert_eq!(names, vec!["Polygon", "Square", "Circle"]);
        assert_eq!(t.descendants().map(|(_, n)| n.depth).max(), Some(2));
    }

    #[test]
    fn reports_unsealed_leaves_and_visible_constructors() {
        let (c, t) = tree(
            indoc! {"
                public abstract partial class Shape
                {
                    private Shape() { }
                    public abstract class Polygon : Shape { }
                    public sealed class Square : Polygon { private Square() { } }
                    public class Circle : Shape { private Circle() { } }
                }
            "},
            "Shape",
        );
        let found: Vec<(String, TreeViolationKind)> = t
            .violations()
            .into_iter()
            .map(|v| (c.symbols().get(t.node(v.node).id).name.clone(), v.kind))
            .collect();
        assert_eq!(found.len(), 2);
        assert!(matches!(
            &found[0],
            (name, TreeViolationKind::NonPrivateConstructor(fact))
                if name == "Polygon" && fact.implicit && fact.accessibility == Accessibility::Protected
        ));
        assert!(matches!(&found[1], (name, TreeViolationKind::NotSealed) if name == "Circle"));
    }
}
