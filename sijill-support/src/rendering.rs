//! Display helpers for resolution paths and binding hints.
//!
//! The resolver keys everything by `std::any::type_name`, which is long and
//! fully qualified. These helpers turn such names into the short forms used
//! in panic messages: `&Config` for a record slot, `Arc<dyn Logger>` for a
//! parameter type, and an indented tree for the path that led to a failure.

use std::fmt::Write;

/// Separator between the steps of a one-line resolution path.
pub const ARROW: &str = " → ";

/// Drops module paths from every segment of a type name.
///
/// ```
/// use sijill_support::rendering::short_type_name;
///
/// assert_eq!(short_type_name("app::billing::Invoice"), "Invoice");
/// assert_eq!(
///     short_type_name("sijill_container::entity::Ref<app::Limits>"),
///     "Ref<Limits>"
/// );
/// assert_eq!(short_type_name("alloc::sync::Arc<dyn app::Logger>"), "Arc<dyn Logger>");
/// ```
pub fn short_type_name(type_name: &str) -> String {
    type_name
        .split_inclusive(|c: char| !(c.is_alphanumeric() || c == '_' || c == ':'))
        .map(|piece| piece.rsplit("::").next().unwrap_or(piece))
        .collect()
}

/// Short name of a registry slot; record slots carry a `&` marker.
///
/// ```
/// use sijill_support::rendering::slot_name;
///
/// assert_eq!(slot_name("app::Limits", true), "&Limits");
/// assert_eq!(slot_name("app::Clock", false), "Clock");
/// ```
pub fn slot_name(type_name: &str, record: bool) -> String {
    let short = short_type_name(type_name);
    if record { format!("&{short}") } else { short }
}

/// Joins already shortened slot names into a one-line resolution path.
///
/// ```
/// use sijill_support::rendering::render_path;
///
/// assert_eq!(render_path(&["Billing", "&Limits"]), "Billing → &Limits");
/// ```
pub fn render_path<S: AsRef<str>>(names: &[S]) -> String {
    let mut out = String::new();
    for (index, name) in names.iter().enumerate() {
        if index > 0 {
            out.push_str(ARROW);
        }
        out.push_str(name.as_ref());
    }
    out
}

/// One construction on a resolution path.
#[derive(Debug, Clone, Copy)]
pub struct PathStep<'a> {
    /// Full type name of the entity being built.
    pub type_name: &'a str,
    /// Entity kind label, e.g. `Class` or `Record`.
    pub kind: &'a str,
    /// Whether the slot is a pointer-to-record slot.
    pub record: bool,
    /// How the entity is handed to the step above it (`shared`, `handle`,
    /// `copy`). `None` for the outermost request or an untyped lookup.
    pub passing: Option<&'a str>,
}

/// Renders a resolution path as an indented tree, outermost request first.
///
/// `note` is appended to the innermost step.
///
/// ```
/// use sijill_support::rendering::{PathStep, render_steps};
///
/// let steps = [
///     PathStep { type_name: "app::Billing", kind: "Class", record: false, passing: None },
///     PathStep { type_name: "app::Limits", kind: "Record", record: true, passing: Some("copy") },
/// ];
/// assert_eq!(
///     render_steps(&steps, Some("constructing")),
///     "Billing [Class]\n└─ copy &Limits [Record]  ← constructing\n"
/// );
/// ```
pub fn render_steps(steps: &[PathStep<'_>], note: Option<&str>) -> String {
    let mut out = String::new();
    for (depth, step) in steps.iter().enumerate() {
        if depth > 0 {
            out.push_str(&"   ".repeat(depth - 1));
            out.push_str("└─ ");
            if let Some(passing) = step.passing {
                out.push_str(passing);
                out.push(' ');
            }
        }
        let _ = write!(out, "{} [{}]", slot_name(step.type_name, step.record), step.kind);
        if depth + 1 == steps.len()
            && let Some(note) = note
        {
            let _ = write!(out, "  ← {note}");
        }
        out.push('\n');
    }
    out
}

/// A class declared to implement the interface being resolved.
#[derive(Debug, Clone, Copy)]
pub struct Implementor<'a> {
    /// Full type name of the class.
    pub type_name: &'a str,
    /// Whether the session already holds a singleton of it.
    pub stored: bool,
}

/// Picks the implementors worth suggesting for an unbound interface.
///
/// Implementors the session already holds come first, since binding them
/// reuses the existing singleton. Within each group, classes whose short
/// name ends with the interface's short name (`FileLogger` for
/// `dyn Logger`) rank above the rest; ties are broken by name.
///
/// ```
/// use sijill_support::rendering::{Implementor, suggest_bindings};
///
/// let known = [
///     Implementor { type_name: "app::NullSink", stored: false },
///     Implementor { type_name: "app::FileLogger", stored: false },
///     Implementor { type_name: "app::Console", stored: true },
/// ];
/// assert_eq!(
///     suggest_bindings("dyn app::Logger", &known, 2),
///     vec!["app::Console", "app::FileLogger"]
/// );
/// ```
pub fn suggest_bindings(interface: &str, implementors: &[Implementor<'_>], limit: usize) -> Vec<String> {
    let wanted = short_type_name(interface.trim_start_matches("dyn "));
    let wanted = wanted.split(' ').next().unwrap_or_default().to_lowercase();

    let mut ranked: Vec<(bool, bool, &str)> = implementors
        .iter()
        .map(|implementor| {
            let short = short_type_name(implementor.type_name).to_lowercase();
            let named_after = !wanted.is_empty() && short.ends_with(&wanted);
            (!implementor.stored, !named_after, implementor.type_name)
        })
        .collect();
    ranked.sort_unstable();
    ranked.dedup_by_key(|(_, _, name)| *name);

    ranked
        .into_iter()
        .take(limit)
        .map(|(_, _, name)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step<'a>(type_name: &'a str, kind: &'a str, record: bool, passing: Option<&'a str>) -> PathStep<'a> {
        PathStep {
            type_name,
            kind,
            record,
            passing,
        }
    }

    #[test]
    fn short_names_of_handles_and_slots() {
        assert_eq!(short_type_name("u16"), "u16");
        assert_eq!(short_type_name("*const app::Limits"), "*const Limits");
        assert_eq!(
            short_type_name("std::collections::HashMap<alloc::string::String, app::Port>"),
            "HashMap<String, Port>"
        );
        assert_eq!(slot_name("sijill_container::registry::Registry", false), "Registry");
    }

    #[test]
    fn one_line_cycle_path() {
        let names = ["Ping", "Pong", "Ping"].map(String::from);
        assert_eq!(render_path(&names), "Ping → Pong → Ping");
        assert_eq!(render_path::<&str>(&[]), "");
    }

    #[test]
    fn tree_shows_passing_and_record_marker() {
        let steps = [
            step("app::Billing", "Class", false, None),
            step("app::Ledger", "Class", false, Some("shared")),
            step("app::Limits", "Record", true, Some("handle")),
        ];
        let rendered = render_steps(&steps, Some("constructing"));
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "Billing [Class]");
        assert_eq!(lines[1], "└─ shared Ledger [Class]");
        assert_eq!(lines[2], "   └─ handle &Limits [Record]  ← constructing");
    }

    #[test]
    fn tree_without_passing_or_note() {
        let steps = [step("app::Top", "Class", false, None), step("dyn app::Logger", "Interface", false, None)];
        assert_eq!(render_steps(&steps, None), "Top [Class]\n└─ dyn Logger [Interface]\n");
        assert_eq!(render_steps(&[], Some("constructing")), "");
    }

    #[test]
    fn stored_implementors_rank_first() {
        let known = [
            Implementor {
                type_name: "app::FileLogger",
                stored: false,
            },
            Implementor {
                type_name: "app::Recorder",
                stored: true,
            },
        ];
        assert_eq!(
            suggest_bindings("dyn app::Logger", &known, 3),
            vec!["app::Recorder", "app::FileLogger"]
        );
    }

    #[test]
    fn named_after_interface_ranks_above_others() {
        let known = [
            Implementor {
                type_name: "app::Audit",
                stored: false,
            },
            Implementor {
                type_name: "app::StderrLogger",
                stored: false,
            },
            Implementor {
                type_name: "app::StderrLogger",
                stored: false,
            },
        ];
        let suggestions = suggest_bindings("dyn app::Logger + Send", &known, 3);
        assert_eq!(suggestions, vec!["app::StderrLogger", "app::Audit"]);
    }

    #[test]
    fn no_implementors_no_suggestions() {
        assert!(suggest_bindings("dyn app::Logger", &[], 3).is_empty());
        let known = [Implementor {
            type_name: "app::FileLogger",
            stored: true,
        }];
        assert!(suggest_bindings("dyn app::Logger", &known, 0).is_empty());
    }
}
