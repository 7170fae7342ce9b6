//! Sizing of containers onto the platform's fixed instance classes.
//!
//! The platform does not take arbitrary cpu and memory amounts,
//! only one of five classes. A container gets the class that fits
//! the larger of its requests and limits, and the class is used
//! for both the requests and the limits of the workload container.

use resources::objects::{
    pod,
    quantity::{Quantity, GI},
    workload::{ResourceRequirements, StringMap},
};

/// Assumed when a container does not say, matches the smallest class.
pub const DEFAULT_CPU: Quantity = Quantity::decimal(1);
pub const DEFAULT_MEMORY: Quantity = Quantity::binary(2 * GI);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceClass {
    /// 1 for the smallest class, 5 for the largest.
    pub tier: u8,
    pub cpu: String,
    pub memory: String,
}

impl ResourceClass {
    pub fn new(tier: u8, cpu: &str, memory: &str) -> Self {
        Self {
            tier,
            cpu: cpu.to_owned(),
            memory: memory.to_owned(),
        }
    }

    pub fn resources(&self) -> StringMap {
        StringMap::from([
            ("cpu".to_string(), self.cpu.to_owned()),
            ("memory".to_string(), self.memory.to_owned()),
        ])
    }
}

/// The interval `(above, at_most]`, either end may be open.
#[derive(Debug, Clone, Copy)]
struct Range {
    above: Option<Quantity>,
    at_most: Option<Quantity>,
}

impl Range {
    const ANY: Range = Range::new(None, None);

    const fn new(above: Option<Quantity>, at_most: Option<Quantity>) -> Self {
        Range {
            above,
            at_most,
        }
    }

    fn contains(&self, value: Quantity) -> bool {
        self.above.map_or(true, |above| value > above)
            && self.at_most.map_or(true, |at_most| value <= at_most)
    }
}

#[derive(Debug, Clone, Copy)]
enum Match {
    /// cpu or memory in range
    Either,
    /// cpu and memory in range
    Both,
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    cpu: Range,
    memory: Range,
    matching: Match,
    tier: u8,
}

impl Rule {
    fn matches(&self, cpu: Quantity, memory: Quantity) -> bool {
        match self.matching {
            Match::Either => self.cpu.contains(cpu) || self.memory.contains(memory),
            Match::Both => self.cpu.contains(cpu) && self.memory.contains(memory),
        }
    }
}

const CPU_1: Quantity = Quantity::decimal(1);
const CPU_2: Quantity = Quantity::decimal(2);
const CPU_4: Quantity = Quantity::decimal(4);
const MEM_2GI: Quantity = Quantity::binary(2 * GI);
const MEM_4GI: Quantity = Quantity::binary(4 * GI);
const MEM_8GI: Quantity = Quantity::binary(8 * GI);
const MEM_16GI: Quantity = Quantity::binary(16 * GI);

/// Evaluated top to bottom, the first match wins, tier 1 otherwise.
///
/// Note the lower rows: with at most 1 cpu, exactly 4Gi still lands in
/// tier 2 through (2Gi, 4Gi], the same as with 2 cpus.
/// Both sides of those boundaries are pinned by tests, keep them as they are.
const RULES: [Rule; 6] = [
    Rule {
        cpu: Range::new(Some(CPU_4), None),
        memory: Range::new(Some(MEM_16GI), None),
        matching: Match::Either,
        tier: 5,
    },
    Rule {
        cpu: Range::new(Some(CPU_2), Some(CPU_4)),
        memory: Range::new(Some(MEM_8GI), Some(MEM_16GI)),
        matching: Match::Either,
        tier: 4,
    },
    Rule {
        cpu: Range::new(Some(CPU_1), Some(CPU_2)),
        memory: Range::new(Some(MEM_4GI), None),
        matching: Match::Both,
        tier: 3,
    },
    Rule {
        cpu: Range::new(Some(CPU_1), Some(CPU_2)),
        memory: Range::ANY,
        matching: Match::Both,
        tier: 2,
    },
    Rule {
        cpu: Range::new(None, Some(CPU_1)),
        memory: Range::new(Some(MEM_4GI), Some(MEM_8GI)),
        matching: Match::Both,
        tier: 3,
    },
    Rule {
        cpu: Range::new(None, Some(CPU_1)),
        memory: Range::new(Some(MEM_2GI), Some(MEM_4GI)),
        matching: Match::Both,
        tier: 2,
    },
];

/// Tier for the effective cpu and memory of a container.
pub fn classify(cpu: Quantity, memory: Quantity) -> u8 {
    RULES
        .iter()
        .find(|rule| rule.matches(cpu, memory))
        .map_or(1, |rule| rule.tier)
}

/// Larger of the requested and limit amount of a resource.
pub fn effective(
    requirements: &pod::ResourceRequirements,
    resource: &str,
    default: Quantity,
) -> Quantity {
    let requested = requirements.requested(resource).unwrap_or(default);
    let limit = requirements.limit(resource).unwrap_or(default);
    requested.max(limit)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceClassSelector {
    classes: [ResourceClass; 5],
}

impl Default for ResourceClassSelector {
    fn default() -> Self {
        Self::new([
            ResourceClass::new(1, "1", "2Gi"),
            ResourceClass::new(2, "2", "4Gi"),
            ResourceClass::new(3, "2", "8Gi"),
            ResourceClass::new(4, "4", "16Gi"),
            ResourceClass::new(5, "8", "32Gi"),
        ])
    }
}

impl ResourceClassSelector {
    /// `classes` are ordered from tier 1 to tier 5.
    pub fn new(classes: [ResourceClass; 5]) -> Self {
        Self {
            classes,
        }
    }

    pub fn select(&self, requirements: &pod::ResourceRequirements) -> &ResourceClass {
        let cpu = effective(requirements, "cpu", DEFAULT_CPU);
        let memory = effective(requirements, "memory", DEFAULT_MEMORY);
        &self.classes[classify(cpu, memory) as usize - 1]
    }

    /// Workload resources for a container, requests and limits are the same class.
    pub fn resources(&self, requirements: &pod::ResourceRequirements) -> ResourceRequirements {
        let class = self.select(requirements);
        ResourceRequirements {
            requests: class.resources(),
            limits: class.resources(),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use resources::objects::pod::ResourceList;

    use super::*;

    fn q(s: &str) -> Quantity {
        s.parse().unwrap()
    }

    fn tier(cpu: &str, memory: &str) -> u8 {
        classify(q(cpu), q(memory))
    }

    fn list(cpu: &str, memory: &str) -> ResourceList {
        ResourceList::from([
            ("cpu".to_string(), q(cpu)),
            ("memory".to_string(), q(memory)),
        ])
    }

    #[test]
    fn defaults_are_tier_one() {
        let selector = ResourceClassSelector::default();
        let class = selector.select(&pod::ResourceRequirements::default());
        assert_eq!(class.tier, 1);

        let resources = selector.resources(&pod::ResourceRequirements::default());
        assert_eq!(resources.requests["cpu"], "1");
        assert_eq!(resources.requests["memory"], "2Gi");
        assert_eq!(resources.requests, resources.limits);
    }

    #[test]
    fn cpu_boundaries() {
        assert_eq!(tier("1", "1Gi"), 1);
        assert_eq!(tier("1001m", "1Gi"), 2);
        assert_eq!(tier("2", "1Gi"), 2);
        assert_eq!(tier("2001m", "1Gi"), 4);
        assert_eq!(tier("4", "1Gi"), 4);
        assert_eq!(tier("4001m", "1Gi"), 5);
    }

    #[test]
    fn memory_boundaries_with_small_cpu() {
        assert_eq!(tier("1", "2Gi"), 1);
        assert_eq!(tier("1", "2049Mi"), 2);
        assert_eq!(tier("1", "4Gi"), 2);
        assert_eq!(tier("1", "4097Mi"), 3);
        assert_eq!(tier("1", "8Gi"), 3);
        assert_eq!(tier("1", "8193Mi"), 4);
        assert_eq!(tier("1", "16Gi"), 4);
        assert_eq!(tier("1", "16385Mi"), 5);
    }

    #[test]
    fn memory_boundaries_with_two_cpus() {
        assert_eq!(tier("2", "2Gi"), 2);
        assert_eq!(tier("2", "4Gi"), 2);
        assert_eq!(tier("2", "4097Mi"), 3);
        assert_eq!(tier("2", "8Gi"), 3);
        assert_eq!(tier("2", "8193Mi"), 4);
    }

    // Suspicious but kept: exactly 1 cpu with exactly 4Gi is tier 2,
    // while 4Gi plus one byte is tier 3 for both 1 and 2 cpus.
    #[test]
    fn pinned_lower_tier_asymmetry() {
        assert_eq!(tier("1", "4Gi"), tier("2", "4Gi"));
        assert_eq!(tier("1", "4294967297"), 3);
        assert_eq!(tier("2", "4294967297"), 3);
        assert_eq!(tier("0", "0"), 1);
    }

    #[test]
    fn effective_is_max_of_request_and_limit() {
        let selector = ResourceClassSelector::default();
        let requirements = pod::ResourceRequirements {
            requests: Some(list("0.99", "1.5G")),
            limits: Some(list("3999m", "8010M")),
        };
        assert_eq!(selector.select(&requirements).tier, 4);

        let swapped = pod::ResourceRequirements {
            requests: requirements.limits.clone(),
            limits: requirements.requests.clone(),
        };
        assert_eq!(selector.select(&swapped).tier, 4);
    }

    #[test]
    fn missing_side_uses_default() {
        let selector = ResourceClassSelector::default();
        let requirements = pod::ResourceRequirements {
            requests: Some(list("500m", "512Mi")),
            limits: None,
        };
        assert_eq!(selector.select(&requirements).tier, 1);

        let requirements = pod::ResourceRequirements {
            requests: None,
            limits: Some(list("1500m", "6Gi")),
        };
        let resources = selector.resources(&requirements);
        assert_eq!(resources.limits["cpu"], "2");
        assert_eq!(resources.limits["memory"], "8Gi");
    }

    #[test]
    fn custom_classes() {
        let selector = ResourceClassSelector::new([
            ResourceClass::new(1, "a", "1"),
            ResourceClass::new(2, "b", "2"),
            ResourceClass::new(3, "c", "3"),
            ResourceClass::new(4, "d", "4"),
            ResourceClass::new(5, "e", "5"),
        ]);
        let requirements = pod::ResourceRequirements {
            requests: Some(list("8", "1Gi")),
            limits: None,
        };
        assert_eq!(selector.select(&requirements).cpu, "e");
    }

    proptest! {
        #[test]
        fn tier_is_monotonic(
            cpu in 0i64..10_000,
            memory in 0i64..40 * 1024,
            cpu_step in 0i64..3_000,
            memory_step in 0i64..10 * 1024,
        ) {
            let cpu_of = |millis: i64| q(&format!("{}m", millis));
            let memory_of = |mib: i64| q(&format!("{}Mi", mib));
            let base = classify(cpu_of(cpu), memory_of(memory));
            prop_assert!(classify(cpu_of(cpu + cpu_step), memory_of(memory)) >= base);
            prop_assert!(classify(cpu_of(cpu), memory_of(memory + memory_step)) >= base);
        }

        #[test]
        fn tier_only_depends_on_effective_values(
            requested_cpu in 0i64..6_000,
            limit_cpu in 0i64..6_000,
            requested_memory in 0i64..20 * 1024,
            limit_memory in 0i64..20 * 1024,
        ) {
            let selector = ResourceClassSelector::default();
            let requirements = pod::ResourceRequirements {
                requests: Some(list(
                    &format!("{}m", requested_cpu),
                    &format!("{}Mi", requested_memory),
                )),
                limits: Some(list(
                    &format!("{}m", limit_cpu),
                    &format!("{}Mi", limit_memory),
                )),
            };
            let expected = classify(
                q(&format!("{}m", requested_cpu.max(limit_cpu))),
                q(&format!("{}Mi", requested_memory.max(limit_memory))),
            );
            prop_assert_eq!(selector.select(&requirements).tier, expected);
        }
    }
}
