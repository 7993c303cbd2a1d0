use fnv::FnvHashMap as HashMap;
use std::hash::Hash;

/// Partition membership vector into groups of indexes
/// # Arguments
/// * `membership` - a vector of membership (E.g., target gene of each edge)
/// # Returns
/// Distinct group names in order of first appearance, and a map from
/// each group name to the indexes of its elements (in input order)
pub fn partition_by_membership<T>(membership: &[T]) -> (Vec<T>, HashMap<T, Vec<usize>>)
where
    T: Eq + Hash + Clone,
{
    let mut order: Vec<T> = vec![];
    let mut groups: HashMap<T, Vec<usize>> = HashMap::default();
    for (i, k) in membership.iter().enumerate() {
        let elems = groups.entry(k.clone()).or_insert_with(|| {
            order.push(k.clone());
            vec![]
        });
        elems.push(i);
    }
    (order, groups)
}
