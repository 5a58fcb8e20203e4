use crate::api::{ApiError, ApiResult};
use crate::genetics::types::CoiEstimate;
use crate::store::PedigreeStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, VecDeque};
use tracing::debug;

pub const DEFAULT_GENERATIONS: u32 = 6;
/// Path enumeration grows exponentially with depth; deeper requests are capped here.
pub const MAX_GENERATIONS: u32 = 12;

/// Known parents of one dog. Either side may be unrecorded.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Parents {
    #[serde(default)]
    pub sire: Option<String>,
    #[serde(default)]
    pub dam: Option<String>,
}

impl Parents {
    pub fn new(sire: Option<&str>, dam: Option<&str>) -> Self {
        Self {
            sire: sire.map(str::to_string),
            dam: dam.map(str::to_string),
        }
    }

    fn iter(&self) -> impl Iterator<Item = &str> {
        self.sire.as_deref().into_iter().chain(self.dam.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.sire.is_none() && self.dam.is_none()
    }
}

/// Ancestry of the dogs around one pairing, keyed by dog id.
#[derive(Debug, Clone, Default)]
pub struct PedigreeGraph {
    parents: HashMap<String, Parents>,
}

impl PedigreeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dog_id: impl Into<String>, parents: Parents) {
        self.parents.insert(dog_id.into(), parents);
    }

    pub fn parents_of(&self, dog_id: &str) -> Option<&Parents> {
        self.parents.get(dog_id)
    }

    pub fn has_ancestry(&self, dog_id: &str) -> bool {
        self.parents_of(dog_id).map_or(false, |p| !p.is_empty())
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Breadth-first walk from `roots`, fetching at most `generations` levels of parents.
    pub fn fetch<S: PedigreeStore + ?Sized>(
        store: &S,
        roots: &[&str],
        generations: u32,
    ) -> ApiResult<Self> {
        let mut graph = PedigreeGraph::new();
        let mut queue: VecDeque<(String, u32)> =
            roots.iter().map(|id| (id.to_string(), 0)).collect();

        while let Some((dog_id, depth)) = queue.pop_front() {
            if depth >= generations || graph.parents.contains_key(&dog_id) {
                continue;
            }
            let parents = store.fetch_parents(&dog_id)?.unwrap_or_default();
            for parent in parents.iter() {
                queue.push_back((parent.to_string(), depth + 1));
            }
            graph.insert(dog_id, parents);
        }

        Ok(graph)
    }
}

/// Every ancestral path from `start` (inclusive) up to `limit` generations back.
/// Paths never revisit a dog, so malformed cyclic pedigrees terminate.
fn ancestor_paths<'g>(graph: &'g PedigreeGraph, start: &'g str, limit: u32) -> Vec<Vec<&'g str>> {
    let mut complete = Vec::new();
    let mut stack = vec![vec![start]];

    while let Some(path) = stack.pop() {
        let generations = (path.len() - 1) as u32;
        if generations < limit {
            if let Some(parents) = path.last().and_then(|last| graph.parents_of(last)) {
                for parent in parents.iter() {
                    if !path.contains(&parent) {
                        let mut next = path.clone();
                        next.push(parent);
                        stack.push(next);
                    }
                }
            }
        }
        complete.push(path);
    }

    complete
}

/// Two paths meeting at a common ancestor count only if that ancestor is the sole dog they share.
fn joins_only_at_end(left: &[&str], right: &[&str]) -> bool {
    let (Some(end), Some(_)) = (left.last(), right.last()) else {
        return false;
    };
    left[..left.len() - 1]
        .iter()
        .all(|dog| dog != end && !right.contains(dog))
}

struct WrightCalculator<'g> {
    graph: &'g PedigreeGraph,
    memo: HashMap<(&'g str, u32), f64>,
}

impl<'g> WrightCalculator<'g> {
    fn new(graph: &'g PedigreeGraph) -> Self {
        Self {
            graph,
            memo: HashMap::new(),
        }
    }

    /// F of the hypothetical offspring of `sire` x `dam`.
    fn pair(&mut self, sire: &'g str, dam: &'g str, limit: u32, ancestors: &mut BTreeSet<String>) -> f64 {
        let sire_paths = ancestor_paths(self.graph, sire, limit);
        let dam_paths = ancestor_paths(self.graph, dam, limit);

        let mut by_ancestor: HashMap<&str, Vec<&Vec<&str>>> = HashMap::new();
        for path in &dam_paths {
            if let Some(&end) = path.last() {
                by_ancestor.entry(end).or_default().push(path);
            }
        }

        let mut total = 0.0;
        for sire_path in &sire_paths {
            let Some(&ancestor) = sire_path.last() else {
                continue;
            };
            let Some(matching) = by_ancestor.get(ancestor) else {
                continue;
            };
            for dam_path in matching {
                if !joins_only_at_end(sire_path, dam_path) {
                    continue;
                }
                let (n1, n2) = (sire_path.len() - 1, dam_path.len() - 1);
                let remaining = limit.saturating_sub(n1.max(n2) as u32);
                let f_ancestor = self.individual(ancestor, remaining);
                total += 0.5f64.powi((n1 + n2) as i32 + 1) * (1.0 + f_ancestor);
                ancestors.insert(ancestor.to_string());
            }
        }
        total
    }

    /// F of a dog already in the pedigree, from its own parents.
    fn individual(&mut self, dog: &'g str, limit: u32) -> f64 {
        if limit == 0 {
            return 0.0;
        }
        if let Some(f) = self.memo.get(&(dog, limit)) {
            return *f;
        }

        let graph = self.graph;
        let f = match graph.parents_of(dog) {
            Some(Parents {
                sire: Some(sire),
                dam: Some(dam),
            }) => self.pair(sire, dam, limit - 1, &mut BTreeSet::new()),
            _ => 0.0,
        };
        self.memo.insert((dog, limit), f);
        f
    }
}

/// Wright's path coefficient for the offspring of `sire` x `dam`, tracing at most
/// `generations` generations above each parent.
///
/// Without any recorded ancestry for either parent the result is
/// `InsufficientPedigree`; a known pedigree with no common ancestor is a real 0.0.
pub fn wright_coefficient<'g>(
    graph: &'g PedigreeGraph,
    sire: &'g str,
    dam: &'g str,
    generations: u32,
) -> CoiEstimate {
    if !graph.has_ancestry(sire) && !graph.has_ancestry(dam) {
        return CoiEstimate::InsufficientPedigree;
    }

    let mut ancestors = BTreeSet::new();
    let mut calculator = WrightCalculator::new(graph);
    let coefficient = calculator.pair(sire, dam, generations, &mut ancestors);

    CoiEstimate::Pedigree {
        coefficient: coefficient.clamp(0.0, 1.0),
        common_ancestors: ancestors.into_iter().collect(),
        generations,
    }
}

/// Produces the inbreeding estimate for a prospective pairing.
pub struct InbreedingEstimator<'a> {
    pedigree: &'a dyn PedigreeStore,
    generations: u32,
}

impl<'a> InbreedingEstimator<'a> {
    pub fn new(pedigree: &'a dyn PedigreeStore) -> Self {
        Self {
            pedigree,
            generations: DEFAULT_GENERATIONS,
        }
    }

    /// Clamped to `MAX_GENERATIONS`.
    pub fn with_generations(mut self, generations: u32) -> Self {
        self.generations = generations.min(MAX_GENERATIONS);
        self
    }

    /// Precalculated coefficient for the sire if one was stored, otherwise Wright's
    /// coefficient over the fetched pedigree, otherwise `InsufficientPedigree`.
    pub fn estimate(&self, sire_id: &str, dam_id: &str) -> ApiResult<CoiEstimate> {
        if let Some(coefficient) = self.pedigree.fetch_precalculated_coi(sire_id)? {
            if !coefficient.is_finite() || !(0.0..=1.0).contains(&coefficient) {
                return Err(ApiError::InvalidInput(format!(
                    "Stored inbreeding coefficient {} for {} is not a fraction in [0, 1]",
                    coefficient, sire_id
                )));
            }
            debug!(sire_id, coefficient, "Using precalculated inbreeding coefficient");
            return Ok(CoiEstimate::Precalculated { coefficient });
        }

        let graph = PedigreeGraph::fetch(self.pedigree, &[sire_id, dam_id], self.generations)?;
        let estimate = wright_coefficient(&graph, sire_id, dam_id, self.generations);
        debug!(sire_id, dam_id, nodes = graph.len(), ?estimate, "Computed pedigree inbreeding coefficient");
        Ok(estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, Option<&str>, Option<&str>)]) -> PedigreeGraph {
        let mut g = PedigreeGraph::new();
        for (dog, sire, dam) in edges {
            g.insert(*dog, Parents::new(*sire, *dam));
        }
        g
    }

    fn coefficient(estimate: &CoiEstimate) -> f64 {
        estimate.coefficient().expect("pedigree coefficient")
    }

    #[test]
    fn test_no_ancestry_is_insufficient() {
        let g = PedigreeGraph::new();
        assert_eq!(
            wright_coefficient(&g, "sire", "dam", 6),
            CoiEstimate::InsufficientPedigree
        );
    }

    #[test]
    fn test_unrelated_parents_are_zero() {
        let g = graph(&[
            ("sire", Some("a"), Some("b")),
            ("dam", Some("c"), Some("d")),
        ]);
        let estimate = wright_coefficient(&g, "sire", "dam", 6);
        assert_eq!(coefficient(&estimate), 0.0);
        match estimate {
            CoiEstimate::Pedigree { common_ancestors, .. } => assert!(common_ancestors.is_empty()),
            other => panic!("unexpected estimate {:?}", other),
        }
    }

    #[test]
    fn test_full_siblings() {
        // Full-sib mating: two shared parents, each contributes (1/2)^3.
        let g = graph(&[
            ("sire", Some("grandsire"), Some("granddam")),
            ("dam", Some("grandsire"), Some("granddam")),
        ]);
        let estimate = wright_coefficient(&g, "sire", "dam", 6);
        assert!((coefficient(&estimate) - 0.25).abs() < 1e-12);
        match estimate {
            CoiEstimate::Pedigree { common_ancestors, .. } => {
                assert_eq!(common_ancestors, vec!["granddam".to_string(), "grandsire".to_string()])
            }
            other => panic!("unexpected estimate {:?}", other),
        }
    }

    #[test]
    fn test_half_siblings() {
        let g = graph(&[
            ("sire", Some("shared"), Some("m1")),
            ("dam", Some("shared"), Some("m2")),
        ]);
        assert!((coefficient(&wright_coefficient(&g, "sire", "dam", 6)) - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_parent_offspring() {
        // The sire is the dam's own sire: one path of length 1.
        let g = graph(&[("dam", Some("sire"), Some("other"))]);
        assert!((coefficient(&wright_coefficient(&g, "sire", "dam", 6)) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_inbred_common_ancestor() {
        // Half-sib mating where the shared sire is itself from a full-sib mating (F_A = 0.25).
        let g = graph(&[
            ("sire", Some("a"), Some("m1")),
            ("dam", Some("a"), Some("m2")),
            ("a", Some("x"), Some("y")),
            ("x", Some("p"), Some("q")),
            ("y", Some("p"), Some("q")),
        ]);
        let f = coefficient(&wright_coefficient(&g, "sire", "dam", 6));
        assert!((f - 0.125 * 1.25).abs() < 1e-12, "got {}", f);
    }

    #[test]
    fn test_generation_limit_cuts_paths() {
        // Common ancestor three generations up is invisible with a two-generation limit.
        let g = graph(&[
            ("sire", Some("s1"), None),
            ("s1", Some("s2"), None),
            ("s2", Some("root"), None),
            ("dam", Some("d1"), None),
            ("d1", Some("d2"), None),
            ("d2", Some("root"), None),
        ]);
        assert_eq!(coefficient(&wright_coefficient(&g, "sire", "dam", 2)), 0.0);
        let deep = coefficient(&wright_coefficient(&g, "sire", "dam", 3));
        assert!((deep - 0.5f64.powi(7)).abs() < 1e-12);
    }

    #[test]
    fn test_cyclic_pedigree_terminates() {
        let g = graph(&[
            ("sire", Some("a"), None),
            ("a", Some("sire"), None),
            ("dam", Some("a"), None),
        ]);
        let f = coefficient(&wright_coefficient(&g, "sire", "dam", 10));
        assert!((0.0..=1.0).contains(&f));
    }

    #[test]
    fn test_wright_is_commutative() {
        let g = graph(&[
            ("sire", Some("a"), Some("b")),
            ("dam", Some("a"), Some("c")),
            ("b", Some("c"), None),
        ]);
        let forward = coefficient(&wright_coefficient(&g, "sire", "dam", 6));
        let reverse = coefficient(&wright_coefficient(&g, "dam", "sire", 6));
        assert!((forward - reverse).abs() < 1e-12);
    }
    #[test]
    fn test_requested_depth_is_capped() {
        // Sire and dam share an ancestor 13 generations up.
        let mut dogs = Vec::new();
        for side in ["s", "d"] {
            let root = if side == "s" { "sire" } else { "dam" };
            dogs.push(format!(r#"{{ "id": "{root}", "name": "{root}", "sireId": "{side}1" }}"#));
            for n in 1..13 {
                dogs.push(format!(r#"{{ "id": "{side}{n}", "name": "{side}{n}", "sireId": "{side}{}" }}"#, n + 1));
            }
            dogs.push(format!(r#"{{ "id": "{side}13", "name": "{side}13", "sireId": "founder" }}"#));
        }
        let json = format!(r#"{{ "dogs": [{}] }}"#, dogs.join(","));
        let store = crate::store::JsonKennelStore::from_json(&json).unwrap();

        let estimator = InbreedingEstimator::new(&store).with_generations(40);
        assert_eq!(estimator.generations, MAX_GENERATIONS);
        match estimator.estimate("sire", "dam").unwrap() {
            CoiEstimate::Pedigree {
                coefficient,
                generations,
                ..
            } => {
                assert_eq!(coefficient, 0.0);
                assert_eq!(generations, MAX_GENERATIONS);
            }
            other => panic!("expected pedigree estimate, got {:?}", other),
        }
    }
}
