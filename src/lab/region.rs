//! Parameter regions: named axes of candidate values and their lazy
//! Cartesian expansion.
//!
//! A sweep is written as nested expansions, e.g. every `(n, v)` pair of the
//! lab region, then every `(t, Tool)` pair of each of those sub-regions.
//! A [`RegionFilter`] prunes the expansion as soon as a partially bound
//! region is known to be invalid.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// One candidate value of an axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

impl From<u32> for ParamValue {
    fn from(i: u32) -> Self {
        ParamValue::Int(i64::from(i))
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Float(x)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

/// Decides whether a (possibly partially bound) region may contain valid
/// points. Must admit regions whose relevant axes are still open.
pub trait RegionFilter: Send + Sync {
    fn admits(&self, region: &Region) -> bool;
}

impl<F> RegionFilter for F
where
    F: Fn(&Region) -> bool + Send + Sync,
{
    fn admits(&self, region: &Region) -> bool {
        self(region)
    }
}

/// Keeps only regions with `t < n` once both are bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct TWayFilter;

impl RegionFilter for TWayFilter {
    fn admits(&self, region: &Region) -> bool {
        match (region.int("t"), region.int("n")) {
            (Some(t), Some(n)) => t < n,
            _ => true,
        }
    }
}

#[derive(Clone, Default)]
pub struct Region {
    axes: Vec<(String, Vec<ParamValue>)>,
    filter: Option<Arc<dyn RegionFilter>>,
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("axes", &self.axes)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, values)) in self.axes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match values.as_slice() {
                [single] => write!(f, "{}={}", name, single)?,
                many => write!(f, "{}=[{} values]", name, many.len())?,
            }
        }
        Ok(())
    }
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the candidate values of an axis, replacing any previous ones.
    pub fn add<I, V>(&mut self, name: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        let values: Vec<ParamValue> = values.into_iter().map(Into::into).collect();
        match self.axes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = values,
            None => self.axes.push((name.to_string(), values)),
        }
        self
    }

    /// Integers `min..=max`.
    pub fn add_range(&mut self, name: &str, min: i64, max: i64) -> &mut Self {
        self.add(name, min..=max)
    }

    /// Integers `min, min + step, ...` up to and including `max`.
    pub fn add_range_step(&mut self, name: &str, min: i64, max: i64, step: i64) -> &mut Self {
        let step = step.max(1) as usize;
        self.add(name, (min..=max).step_by(step))
    }

    pub fn with_filter(mut self, filter: impl RegionFilter + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn admits(&self) -> bool {
        self.filter.as_ref().map_or(true, |f| f.admits(self))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.axes.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self, name: &str) -> Option<&[ParamValue]> {
        self.axes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// The value of an axis bound to exactly one candidate.
    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        match self.values(name) {
            Some([single]) => Some(single),
            _ => None,
        }
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.value(name).and_then(ParamValue::as_int)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(ParamValue::as_float)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(ParamValue::as_text)
    }

    /// Number of points, ignoring the filter.
    pub fn size(&self) -> usize {
        self.axes.iter().map(|(_, v)| v.len()).product()
    }

    fn fixed(&self, name: &str, value: &ParamValue) -> Region {
        let mut child = self.clone();
        child.add(name, [value.clone()]);
        child
    }

    /// Every sub-region with each axis of `axes` bound to one value.
    ///
    /// Expansion is lazy and proceeds axis by axis in the given order, the
    /// first listed axis varying slowest. Names absent from the region are
    /// ignored.
    pub fn all(&self, axes: &[&str]) -> Expansion {
        let stack = if self.admits() {
            vec![(self.clone(), 0)]
        } else {
            Vec::new()
        };
        Expansion {
            axes: axes.iter().map(|a| a.to_string()).collect(),
            stack,
        }
    }
}

/// Lazy iterator returned by [`Region::all`].
#[derive(Clone)]
pub struct Expansion {
    axes: Vec<String>,
    stack: Vec<(Region, usize)>,
}

impl Iterator for Expansion {
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        while let Some((region, depth)) = self.stack.pop() {
            let Some(name) = self.axes.get(depth) else {
                return Some(region);
            };
            let Some(values) = region.values(name) else {
                self.stack.push((region, depth + 1));
                continue;
            };
            let children: Vec<Region> = values
                .iter()
                .map(|v| region.fixed(name, v))
                .filter(Region::admits)
                .collect();
            self.stack
                .extend(children.into_iter().rev().map(|child| (child, depth + 1)));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lab_region() -> Region {
        let mut r = Region::new();
        r.add_range("t", 2, 3)
            .add_range("n", 2, 4)
            .add("Tool", ["Jenny", "CASA"]);
        r.with_filter(TWayFilter)
    }

    #[test]
    fn expands_in_listed_order() {
        let r = lab_region();
        let points: Vec<(i64, i64)> = r
            .all(&["t", "n"])
            .map(|p| (p.int("t").unwrap(), p.int("n").unwrap()))
            .collect();
        assert_eq!(points, vec![(2, 3), (2, 4), (3, 4)]);
    }

    #[test]
    fn unlisted_axes_stay_open() {
        let r = lab_region();
        let first = r.all(&["n"]).next().unwrap();
        assert_eq!(first.int("n"), Some(2));
        assert!(!first.is_bound("t"));
        assert_eq!(first.values("Tool").map(|v| v.len()), Some(2));
    }

    #[test]
    fn nested_expansion_matches_flat_one() {
        let r = lab_region();
        let nested: Vec<String> = r
            .all(&["n"])
            .flat_map(|outer| outer.all(&["t", "Tool"]).collect::<Vec<_>>())
            .map(|p| p.to_string())
            .collect();
        let flat: Vec<String> = r.all(&["n", "t", "Tool"]).map(|p| p.to_string()).collect();
        assert_eq!(nested, flat);
        assert_eq!(flat.len(), 6);
    }

    #[test]
    fn tway_filter_bounds() {
        for t in 1..6 {
            for n in 1..6 {
                let mut r = Region::new();
                r.add("t", [t as i64]).add("n", [n as i64]);
                assert_eq!(TWayFilter.admits(&r), t < n, "t={} n={}", t, n);
            }
        }
        let mut open = Region::new();
        open.add("t", [5i64]).add_range("n", 2, 3);
        assert!(TWayFilter.admits(&open));
    }

    #[test]
    fn expansion_is_restartable() {
        let r = lab_region();
        let it = r.all(&["t", "n", "Tool"]);
        let copy = it.clone();
        assert_eq!(it.count(), 6);
        assert_eq!(copy.count(), 6);
        assert_eq!(r.all(&["t", "n", "Tool"]).count(), 6);
    }

    #[test]
    fn closures_are_filters() {
        let mut r = Region::new();
        r.add("fp", [0.0, 0.1, 0.5]).add("fv", [0.0, 0.1, 0.5]);
        let r = r.with_filter(|r: &Region| match (r.float("fp"), r.float("fv")) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        });
        assert_eq!(r.all(&["fp", "fv"]).count(), 3);
    }

    #[test]
    fn ranges_and_values() {
        let mut r = Region::new();
        r.add_range_step("k", 0, 10, 4).add("name", ["x"]);
        let ks: Vec<_> = r.values("k").unwrap().iter().map(|v| v.as_int().unwrap()).collect();
        assert_eq!(ks, vec![0, 4, 8]);
        assert_eq!(r.text("name"), Some("x"));
        assert_eq!(r.size(), 3);
        assert_eq!(r.all(&["missing"]).count(), 1);
    }
}
