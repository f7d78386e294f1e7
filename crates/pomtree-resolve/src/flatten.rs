use indexmap::IndexSet;

use crate::graph::EffectiveDependency;

/// Collapses a dependency tree into the set of every node it contains.
///
/// Nodes are returned without children, in first-discovery order. A coordinate that
/// occurs both as a duplicate marker and as an expanded node is reported once, with the
/// expanded node's attributes. Only non-duplicate nodes contribute their subtrees.
/// Flattening an already flat set returns it unchanged.
pub fn flatten<'a, I>(tree: I) -> IndexSet<EffectiveDependency>
where
    I: IntoIterator<Item = &'a EffectiveDependency>,
{
    let mut out = IndexSet::new();
    collect(tree, &mut out);
    out
}

fn collect<'a, I>(nodes: I, out: &mut IndexSet<EffectiveDependency>)
where
    I: IntoIterator<Item = &'a EffectiveDependency>,
{
    for node in nodes {
        let flat = node.without_children();
        match out.get_index_of(&flat) {
            None => {
                out.insert(flat);
            }
            Some(index) if out[index].duplicate && !flat.duplicate => {
                out.replace_full(flat);
            }
            Some(_) => {}
        }
        if !node.duplicate {
            collect(&node.children, out);
        }
    }
}
