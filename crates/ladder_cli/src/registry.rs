//! Named test cases and selection.

use ladder_config::DesignParams;
use ladder_sim::Directed;

use crate::cases;

/// Seed of the `random` case when none is given.
pub const DEFAULT_SEED: u64 = 1;

/// Inputs available to a case builder.
#[derive(Debug, Clone)]
pub struct CaseContext {
    /// Parameters of the design under test.
    pub params: DesignParams,
    /// Seed for randomized cases.
    pub seed: u64,
}

/// A registered test case.
#[derive(Debug)]
pub struct Case {
    /// Name used on the command line.
    pub name: &'static str,
    /// One-line description shown by `ladder list`.
    pub description: &'static str,
    build: fn(&CaseContext) -> Directed,
}

impl Case {
    /// Builds the program for this case.
    pub fn build(&self, ctx: &CaseContext) -> Directed {
        (self.build)(ctx)
    }
}

/// Every registered case, in run order.
pub const CASES: &[Case] = &[
    Case {
        name: "smoke",
        description: "add, replace, delete and query on one context",
        build: cases::smoke,
    },
    Case {
        name: "add_overflow",
        description: "capacity eviction on add",
        build: cases::add_overflow,
    },
    Case {
        name: "replace_delete",
        description: "replace and delete at and behind the head",
        build: cases::replace_delete,
    },
    Case {
        name: "clear_all",
        description: "clear populated and empty contexts",
        build: cases::clear_all,
    },
    Case {
        name: "query_sweep",
        description: "query every level of every context",
        build: cases::query_sweep,
    },
    Case {
        name: "reset_midstream",
        description: "reset with updates in flight",
        build: cases::reset_midstream,
    },
    Case {
        name: "random",
        description: "seeded random traffic on both interfaces",
        build: cases::random,
    },
];

/// Looks up a case by exact name.
pub fn find(name: &str) -> Option<&'static Case> {
    CASES.iter().find(|c| c.name == name)
}

/// Selects cases by name and/or substring filter.
///
/// Explicit names are returned in the order given and must all exist. With
/// no names, `all` or a `filter` selects from the registry; with neither,
/// nothing is selected.
pub fn select(
    names: &[String],
    all: bool,
    filter: Option<&str>,
) -> Result<Vec<&'static Case>, String> {
    let mut selected = Vec::new();
    for name in names {
        let case = find(name).ok_or_else(|| format!("unknown test case '{name}'"))?;
        selected.push(case);
    }
    if names.is_empty() && (all || filter.is_some()) {
        selected.extend(CASES.iter());
    }
    if let Some(f) = filter {
        selected.retain(|c| c.name.contains(f));
    }
    Ok(selected)
}
